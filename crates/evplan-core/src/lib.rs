//! Plan generation and presentation logic for evplan.
//!
//! The request pipeline runs
//! [`FormInput`] -> [`build_prompt`](prompt::build_prompt) ->
//! [`GenerativeClient`] -> [`parse_suggestions`](extract::parse_suggestions) ->
//! [`EventPlan`](evplan_store::EventPlan), and [`FormController`] drives it
//! from a modal form. [`card`] turns stored plans into display views.

pub mod card;
pub mod client;
pub mod controller;
pub mod error;
pub mod extract;
pub mod form;
pub mod ids;
pub mod pipeline;
pub mod prompt;

pub use card::{Card, CardSection, CardView, card_view};
pub use client::{GeminiClient, GeminiConfig, GenerativeClient};
pub use controller::{FormController, SubmitOutcome, Submission};
pub use error::PlanError;
pub use extract::Suggestions;
pub use form::{FormField, FormInput};
pub use ids::{IdGenerator, MonotonicIds};
pub use pipeline::PlanPipeline;
