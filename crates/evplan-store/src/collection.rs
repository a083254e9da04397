//! In-memory event collection with write-through persistence.

use tracing::{debug, warn};

use crate::error::StoreError;
use crate::models::EventPlan;
use crate::store::PlanStore;

/// Ordered collection of planned events, newest first.
///
/// This is the sole owner of the collection. Every successful mutation is
/// followed by exactly one full write of the collection to the backing
/// [`PlanStore`]. If that write fails the in-memory change is kept and the
/// error is returned.
#[derive(Debug)]
pub struct EventList {
    plans: Vec<EventPlan>,
    store: PlanStore,
}

impl EventList {
    /// Load the collection from `store`. This is the only read of the store.
    pub fn load(store: PlanStore) -> Self {
        let plans = store.load();
        Self { plans, store }
    }

    /// Read-only view of the collection, newest first.
    pub fn all(&self) -> &[EventPlan] {
        &self.plans
    }

    pub fn get(&self, id: i64) -> Option<&EventPlan> {
        self.plans.iter().find(|p| p.id == id)
    }

    pub fn len(&self) -> usize {
        self.plans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plans.is_empty()
    }

    /// Largest id in the collection, used to seed id generators.
    pub fn max_id(&self) -> Option<i64> {
        self.plans.iter().map(|p| p.id).max()
    }

    /// Place `plan` at position 0 and persist.
    ///
    /// The caller guarantees the id is unique.
    pub fn insert_front(&mut self, plan: EventPlan) -> Result<(), StoreError> {
        debug!(id = plan.id, name = %plan.name, "inserting plan");
        self.plans.insert(0, plan);
        self.persist()
    }

    /// Remove the plan with `id`, if present, and persist.
    ///
    /// Returns `Ok(false)` without touching the store when no plan matches.
    pub fn remove_by_id(&mut self, id: i64) -> Result<bool, StoreError> {
        let before = self.plans.len();
        self.plans.retain(|p| p.id != id);
        if self.plans.len() == before {
            debug!(id, "remove_by_id: no matching plan");
            return Ok(false);
        }
        self.persist()?;
        Ok(true)
    }

    fn persist(&self) -> Result<(), StoreError> {
        self.store.save(&self.plans).inspect_err(|e| {
            warn!(key = self.store.key(), error = %e, "failed to persist plans");
        })
    }
}
