//! The plan request pipeline: validate, prompt, call, parse, construct.

use std::sync::Arc;

use chrono::{DateTime, Local};
use tracing::{info, warn};

use evplan_store::EventPlan;

use crate::client::GenerativeClient;
use crate::error::PlanError;
use crate::extract::{Suggestions, parse_suggestions};
use crate::form::FormInput;
use crate::ids::IdGenerator;
use crate::prompt::build_prompt;

/// Turns form input into a new [`EventPlan`].
///
/// Cheap to clone; clones share the client and id generator.
#[derive(Clone)]
pub struct PlanPipeline {
    client: Arc<dyn GenerativeClient>,
    ids: Arc<dyn IdGenerator>,
}

impl PlanPipeline {
    pub fn new(client: Arc<dyn GenerativeClient>, ids: Arc<dyn IdGenerator>) -> Self {
        Self { client, ids }
    }

    /// Run the full pipeline for one submission.
    ///
    /// Validation failures return before any network traffic. On any error
    /// no plan is built and no id is consumed.
    pub async fn generate_plan(&self, input: &FormInput) -> Result<EventPlan, PlanError> {
        input.validate()?;

        let prompt = build_prompt(input);
        info!(name = %input.name, event_type = %input.event_type, "requesting event plan");

        let result = async {
            let text = self.client.generate_text(&prompt).await?;
            parse_suggestions(&text)
        }
        .await;

        let suggestions = result.inspect_err(|e| {
            warn!(kind = e.kind(), error = %e, "event plan request failed");
        })?;

        let plan = build_plan(input, suggestions, self.ids.next_id(), Local::now());
        info!(
            id = plan.id,
            themes = plan.theme_suggestions.len(),
            activities = plan.activities.len(),
            todos = plan.todo_list.len(),
            gifts = plan.gift_ideas.len(),
            "event plan generated"
        );
        Ok(plan)
    }
}

/// Merge validated input and parsed suggestions into a new entity.
pub fn build_plan(
    input: &FormInput,
    suggestions: Suggestions,
    id: i64,
    created: DateTime<Local>,
) -> EventPlan {
    EventPlan {
        id,
        name: input.name.clone(),
        age: input.age.clone(),
        gender: input.gender,
        event_type: input.event_type.clone(),
        created_at: format_created_at(created),
        theme_suggestions: suggestions.theme_suggestions,
        activities: suggestions.activities,
        todo_list: suggestions.todo_list,
        gift_ideas: suggestions.gift_ideas,
    }
}

/// Human-readable creation date, e.g. `October 16, 2026`.
pub fn format_created_at(when: DateTime<Local>) -> String {
    when.format("%B %-d, %Y").to_string()
}
