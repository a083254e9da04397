use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Gender of the person an event is planned for.
///
/// Serialized with the same labels the form shows, so stored collections
/// read naturally (`"Non-binary"` rather than `"non_binary"`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    #[default]
    Any,
    Male,
    Female,
    #[serde(rename = "Non-binary")]
    NonBinary,
}

impl Gender {
    /// All variants, in form order.
    pub const ALL: [Gender; 4] = [Self::Any, Self::Male, Self::Female, Self::NonBinary];

    /// The next variant in form order, wrapping around.
    pub fn next(self) -> Self {
        match self {
            Self::Any => Self::Male,
            Self::Male => Self::Female,
            Self::Female => Self::NonBinary,
            Self::NonBinary => Self::Any,
        }
    }

    /// The previous variant in form order, wrapping around.
    pub fn prev(self) -> Self {
        match self {
            Self::Any => Self::NonBinary,
            Self::Male => Self::Any,
            Self::Female => Self::Male,
            Self::NonBinary => Self::Female,
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Any => "Any",
            Self::Male => "Male",
            Self::Female => "Female",
            Self::NonBinary => "Non-binary",
        };
        f.write_str(s)
    }
}

impl FromStr for Gender {
    type Err = GenderParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "any" => Ok(Self::Any),
            "male" => Ok(Self::Male),
            "female" => Ok(Self::Female),
            "non-binary" | "nonbinary" | "non_binary" => Ok(Self::NonBinary),
            _ => Err(GenderParseError(s.to_owned())),
        }
    }
}

/// Error returned when parsing an invalid [`Gender`] string.
#[derive(Debug, Clone)]
pub struct GenderParseError(pub String);

impl fmt::Display for GenderParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid gender: {:?} (expected any, male, female, or non-binary)",
            self.0
        )
    }
}

impl std::error::Error for GenderParseError {}

// ---------------------------------------------------------------------------
// Entities
// ---------------------------------------------------------------------------

/// A planned event: the submitted form fields plus the generated suggestions.
///
/// Suggestion lists default to empty when absent from stored data, so older
/// or partially-written collections still load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventPlan {
    pub id: i64,
    pub name: String,
    pub age: String,
    #[serde(default)]
    pub gender: Gender,
    #[serde(rename = "eventType")]
    pub event_type: String,
    #[serde(rename = "createdAt")]
    pub created_at: String,
    #[serde(default)]
    pub theme_suggestions: Vec<String>,
    #[serde(default)]
    pub activities: Vec<String>,
    #[serde(default)]
    pub todo_list: Vec<String>,
    #[serde(default)]
    pub gift_ideas: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gender_display_roundtrips_through_from_str() {
        for g in Gender::ALL {
            let parsed: Gender = g.to_string().parse().unwrap();
            assert_eq!(parsed, g);
        }
    }

    #[test]
    fn gender_parse_accepts_cli_spellings() {
        assert_eq!("nonbinary".parse::<Gender>().unwrap(), Gender::NonBinary);
        assert_eq!(" FEMALE ".parse::<Gender>().unwrap(), Gender::Female);
        assert!("robot".parse::<Gender>().is_err());
    }

    #[test]
    fn gender_cycles_in_form_order() {
        assert_eq!(Gender::NonBinary.next(), Gender::Any);
        assert_eq!(Gender::Any.prev(), Gender::NonBinary);
        assert_eq!(Gender::Male.next().prev(), Gender::Male);
    }

    #[test]
    fn gender_serializes_with_form_labels() {
        let json = serde_json::to_string(&Gender::NonBinary).unwrap();
        assert_eq!(json, "\"Non-binary\"");
    }

    #[test]
    fn event_plan_uses_camel_case_for_form_fields() {
        let plan = EventPlan {
            id: 1,
            name: "Mia".to_string(),
            age: "7".to_string(),
            gender: Gender::Female,
            event_type: "Birthday".to_string(),
            created_at: "October 16, 2026".to_string(),
            theme_suggestions: vec!["Unicorns".to_string()],
            activities: vec![],
            todo_list: vec![],
            gift_ideas: vec![],
        };
        let value = serde_json::to_value(&plan).unwrap();
        assert_eq!(value["eventType"], "Birthday");
        assert_eq!(value["createdAt"], "October 16, 2026");
        assert_eq!(value["theme_suggestions"][0], "Unicorns");
    }

    #[test]
    fn event_plan_tolerates_missing_suggestion_lists() {
        let json = r#"{"id":5,"name":"Sam","age":"40","gender":"Any",
                       "eventType":"Retirement","createdAt":"May 1, 2026"}"#;
        let plan: EventPlan = serde_json::from_str(json).unwrap();
        assert!(plan.theme_suggestions.is_empty());
        assert!(plan.activities.is_empty());
        assert!(plan.todo_list.is_empty());
        assert!(plan.gift_ideas.is_empty());
    }
}
