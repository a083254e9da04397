//! Form input and its validation.

use serde::{Deserialize, Serialize};

use evplan_store::Gender;

use crate::error::PlanError;

/// Transient form state describing the person and the occasion.
///
/// Absent fields deserialize as empty so they fail [`FormInput::validate`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FormInput {
    pub name: String,
    /// Age as typed; kept as a string because it is only ever echoed back.
    pub age: String,
    pub gender: Gender,
    pub event_type: String,
}

impl FormInput {
    pub fn new(
        name: impl Into<String>,
        age: impl Into<String>,
        gender: Gender,
        event_type: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            age: age.into(),
            gender,
            event_type: event_type.into(),
        }
    }

    /// Check that every required field has non-whitespace content.
    ///
    /// Gender always has a value and is never reported.
    pub fn validate(&self) -> Result<(), PlanError> {
        let missing: Vec<&'static str> = [
            ("name", &self.name),
            ("age", &self.age),
            ("eventType", &self.event_type),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(field, _)| field)
        .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(PlanError::Validation { missing })
        }
    }

    /// Mutable access to a text field; `None` for [`FormField::Gender`].
    pub fn text_mut(&mut self, field: FormField) -> Option<&mut String> {
        match field {
            FormField::Name => Some(&mut self.name),
            FormField::Age => Some(&mut self.age),
            FormField::EventType => Some(&mut self.event_type),
            FormField::Gender => None,
        }
    }
}

/// The form's fields, in tab order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FormField {
    #[default]
    Name,
    Age,
    Gender,
    EventType,
}

impl FormField {
    pub const ALL: [FormField; 4] = [Self::Name, Self::Age, Self::Gender, Self::EventType];

    pub fn next(self) -> Self {
        match self {
            Self::Name => Self::Age,
            Self::Age => Self::Gender,
            Self::Gender => Self::EventType,
            Self::EventType => Self::Name,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            Self::Name => Self::EventType,
            Self::Age => Self::Name,
            Self::Gender => Self::Age,
            Self::EventType => Self::Gender,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Name => "Name",
            Self::Age => "Age",
            Self::Gender => "Gender",
            Self::EventType => "Event type",
        }
    }
}
