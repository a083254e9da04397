//! CLI handlers for the one-shot plan commands.
//!
//! Implements:
//! - `evplan new --name N --age A [--gender G] --event E`
//! - `evplan list`
//! - `evplan show <id> [--expanded]`
//! - `evplan delete <id>`

use std::sync::Arc;

use anyhow::{Context, Result, bail};

use evplan_core::{
    FormController, FormInput, GeminiClient, MonotonicIds, PlanPipeline, SubmitOutcome, card_view,
};
use evplan_store::{EventList, EventPlan, PlanStore};

use crate::config::EvplanConfig;

// -----------------------------------------------------------------------
// Shared setup
// -----------------------------------------------------------------------

/// Load the collection from the configured data directory, or start an
/// empty in-memory one when `ephemeral` is set.
pub fn open_list(config: &EvplanConfig, ephemeral: bool) -> EventList {
    let store = if ephemeral {
        PlanStore::in_memory()
    } else {
        PlanStore::open(&config.store)
    };
    EventList::load(store)
}

/// Build the request pipeline, seeding ids past everything in `list`.
pub fn build_pipeline(config: &EvplanConfig, list: &EventList) -> Result<PlanPipeline> {
    let client = GeminiClient::new(config.gemini()?).context("failed to set up HTTP client")?;
    let ids = MonotonicIds::starting_after(list.max_id().unwrap_or(0));
    Ok(PlanPipeline::new(Arc::new(client), Arc::new(ids)))
}

// -----------------------------------------------------------------------
// evplan new
// -----------------------------------------------------------------------

/// Generate one plan, persist it, and print its card.
pub async fn cmd_new(config: &EvplanConfig, list: &mut EventList, input: FormInput) -> Result<()> {
    if let Err(e) = input.validate() {
        bail!("{} ({e})", e.user_message());
    }
    let pipeline = build_pipeline(config, list)?;

    let mut form = FormController::new();
    form.set_input(input);
    form.open_modal();

    println!("Generating plan...");
    match form.submit(&pipeline, list).await {
        Ok(SubmitOutcome::Created(id)) => {
            let plan = list
                .get(id)
                .with_context(|| format!("plan {id} missing after insert"))?;
            print!("{}", card_view(plan, true).to_text());
            Ok(())
        }
        Ok(_) => bail!("{}", form.error().unwrap_or("plan was not created")),
        Err(e) => Err(e).context("plan generated but could not be saved"),
    }
}

// -----------------------------------------------------------------------
// evplan list / show
// -----------------------------------------------------------------------

pub fn cmd_list(list: &EventList) {
    print!("{}", render_list(list.all()));
}

fn render_list(plans: &[EventPlan]) -> String {
    if plans.is_empty() {
        return "No event plans yet. Create one with `evplan new`.\n".to_string();
    }
    plans
        .iter()
        .map(|p| card_view(p, false).to_text())
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn cmd_show(list: &EventList, id: i64, expanded: bool) -> Result<()> {
    let plan = list.get(id).with_context(|| format!("plan {id} not found"))?;
    print!("{}", card_view(plan, expanded).to_text());
    Ok(())
}

// -----------------------------------------------------------------------
// evplan delete
// -----------------------------------------------------------------------

/// Remove a plan. Deleting an id that is not there is reported, not an error.
pub fn cmd_delete(list: &mut EventList, id: i64) -> Result<()> {
    let removed = list
        .remove_by_id(id)
        .context("plan removed but the change could not be saved")?;
    if removed {
        println!("Deleted plan {id}.");
    } else {
        println!("No plan with id {id}; nothing deleted.");
    }
    Ok(())
}
