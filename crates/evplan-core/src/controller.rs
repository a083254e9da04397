//! Form/modal controller.
//!
//! Owns the transient form input and the modal, loading, and error flags.
//! Submission is split in two so an async front-end can run the network
//! request off its event loop:
//!
//! ```text
//! begin_submit()  -> Some(Submission { ticket, input })   loading = true
//!     ... pipeline.generate_plan(&input).await ...
//! finish_submit(ticket, result, &mut list)                loading = false
//! ```
//!
//! Closing the modal abandons the in-flight submission: when its result
//! arrives the ticket no longer matches and the result is dropped.

use tracing::debug;

use evplan_store::{EventList, EventPlan, StoreError};

use crate::error::PlanError;
use crate::form::{FormField, FormInput};
use crate::pipeline::PlanPipeline;

/// An in-flight submission handed out by [`FormController::begin_submit`].
#[derive(Debug, Clone)]
pub struct Submission {
    pub ticket: u64,
    pub input: FormInput,
}

/// What happened when a submission settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// A plan was created and prepended to the list.
    Created(i64),
    /// The pipeline failed; the error slot is set and the modal stays open.
    Failed,
    /// The submission was abandoned before it settled; nothing changed.
    Discarded,
    /// A submission was already in flight; nothing was started.
    Busy,
}

/// State behind the "new plan" modal.
#[derive(Debug, Default)]
pub struct FormController {
    input: FormInput,
    focus: FormField,
    modal_open: bool,
    loading: bool,
    error: Option<String>,
    next_ticket: u64,
    pending: Option<u64>,
}

impl FormController {
    pub fn new() -> Self {
        Self::default()
    }

    // -- Accessors --

    pub fn input(&self) -> &FormInput {
        &self.input
    }

    pub fn focus(&self) -> FormField {
        self.focus
    }

    pub fn is_open(&self) -> bool {
        self.modal_open
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Whether the submit action is currently enabled.
    pub fn can_submit(&self) -> bool {
        self.modal_open && !self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    // -- Modal --

    /// Show the modal. Clears the error but keeps whatever was typed.
    pub fn open_modal(&mut self) {
        self.modal_open = true;
        self.error = None;
    }

    /// Hide the modal, abandoning any in-flight submission.
    pub fn close_modal(&mut self) {
        self.modal_open = false;
        if let Some(ticket) = self.pending.take() {
            debug!(ticket, "modal closed while loading; result will be discarded");
            self.loading = false;
        }
    }

    // -- Editing --

    pub fn set_input(&mut self, input: FormInput) {
        self.input = input;
    }

    pub fn focus_next(&mut self) {
        self.focus = self.focus.next();
    }

    pub fn focus_prev(&mut self) {
        self.focus = self.focus.prev();
    }

    /// Type a character into the focused field.
    ///
    /// Age accepts digits only; the gender field ignores typing.
    pub fn type_char(&mut self, c: char) {
        if self.focus == FormField::Age && !c.is_ascii_digit() {
            return;
        }
        if let Some(text) = self.input.text_mut(self.focus) {
            text.push(c);
        }
    }

    pub fn backspace(&mut self) {
        if let Some(text) = self.input.text_mut(self.focus) {
            text.pop();
        }
    }

    /// Step the gender selection forward or backward.
    pub fn cycle_gender(&mut self, forward: bool) {
        self.input.gender = if forward {
            self.input.gender.next()
        } else {
            self.input.gender.prev()
        };
    }

    // -- Submission --

    /// Start a submission.
    ///
    /// Returns `None` while the modal is closed or another submission is
    /// loading.
    pub fn begin_submit(&mut self) -> Option<Submission> {
        if !self.can_submit() {
            return None;
        }
        self.loading = true;
        self.error = None;
        self.next_ticket += 1;
        let ticket = self.next_ticket;
        self.pending = Some(ticket);
        Some(Submission {
            ticket,
            input: self.input.clone(),
        })
    }

    /// Apply the result of the submission identified by `ticket`.
    ///
    /// On success the modal closes, the input resets, and the plan is
    /// prepended to `list`. A store write failure is returned after the
    /// in-memory state has been updated.
    pub fn finish_submit(
        &mut self,
        ticket: u64,
        result: Result<EventPlan, PlanError>,
        list: &mut EventList,
    ) -> Result<SubmitOutcome, StoreError> {
        if self.pending != Some(ticket) {
            debug!(ticket, "discarding result of abandoned submission");
            return Ok(SubmitOutcome::Discarded);
        }
        self.pending = None;
        self.loading = false;

        match result {
            Ok(plan) => {
                let id = plan.id;
                self.modal_open = false;
                self.input = FormInput::default();
                self.focus = FormField::default();
                list.insert_front(plan)?;
                Ok(SubmitOutcome::Created(id))
            }
            Err(e) => {
                self.error = Some(e.user_message().to_string());
                Ok(SubmitOutcome::Failed)
            }
        }
    }

    /// Run a whole submission against `pipeline`.
    pub async fn submit(
        &mut self,
        pipeline: &PlanPipeline,
        list: &mut EventList,
    ) -> Result<SubmitOutcome, StoreError> {
        let Some(submission) = self.begin_submit() else {
            return Ok(SubmitOutcome::Busy);
        };
        let result = pipeline.generate_plan(&submission.input).await;
        self.finish_submit(submission.ticket, result, list)
    }
}
