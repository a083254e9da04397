//! TUI application state: the plan list, per-card expansion, and the form modal.

use std::collections::HashSet;
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tokio::sync::mpsc;

use evplan_core::{Card, FormController, FormField, PlanError, PlanPipeline, SubmitOutcome};
use evplan_store::{EventList, EventPlan};

/// A settled request, tagged with the ticket it was started under.
type Settled = (u64, Result<EventPlan, PlanError>);

/// Application state for the TUI.
pub struct App {
    pub list: EventList,
    /// `None` when no API key is configured; browsing still works.
    pipeline: Option<PlanPipeline>,
    pipeline_error: Option<String>,
    pub selected: usize,
    /// Ids of cards currently expanded. Never persisted.
    pub expanded: HashSet<i64>,
    pub form: FormController,
    pub tick_rate: Duration,
    pub should_quit: bool,
    pub status_message: Option<String>,
    tx: mpsc::UnboundedSender<Settled>,
    rx: mpsc::UnboundedReceiver<Settled>,
}

impl App {
    pub fn new(list: EventList, pipeline: Result<PlanPipeline, String>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let (pipeline, pipeline_error) = match pipeline {
            Ok(p) => (Some(p), None),
            Err(e) => (None, Some(e)),
        };
        Self {
            list,
            pipeline,
            pipeline_error,
            selected: 0,
            expanded: HashSet::new(),
            form: FormController::new(),
            tick_rate: Duration::from_millis(100),
            should_quit: false,
            status_message: None,
            tx,
            rx,
        }
    }

    pub fn selected_plan(&self) -> Option<&EventPlan> {
        self.list.all().get(self.selected)
    }

    pub fn is_expanded(&self, id: i64) -> bool {
        self.expanded.contains(&id)
    }

    // -- Input --

    /// Route a key press to the modal when it is open, else to the list.
    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }
        if self.form.is_open() {
            self.handle_form_key(key);
        } else {
            self.handle_list_key(key);
        }
    }

    fn handle_list_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('j') | KeyCode::Down => self.move_down(),
            KeyCode::Char('k') | KeyCode::Up => self.move_up(),
            KeyCode::Enter | KeyCode::Char(' ') => self.toggle_selected(),
            KeyCode::Char('n') => self.form.open_modal(),
            KeyCode::Char('d') | KeyCode::Delete => self.delete_selected(),
            _ => {}
        }
    }

    fn handle_form_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.form.close_modal(),
            KeyCode::Enter => self.submit(),
            KeyCode::Tab | KeyCode::Down => self.form.focus_next(),
            KeyCode::BackTab | KeyCode::Up => self.form.focus_prev(),
            KeyCode::Left if self.form.focus() == FormField::Gender => self.form.cycle_gender(false),
            KeyCode::Right if self.form.focus() == FormField::Gender => self.form.cycle_gender(true),
            KeyCode::Char(' ') if self.form.focus() == FormField::Gender => {
                self.form.cycle_gender(true)
            }
            KeyCode::Backspace => self.form.backspace(),
            KeyCode::Char(c) => self.form.type_char(c),
            _ => {}
        }
    }

    // -- List --

    pub fn move_up(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn move_down(&mut self) {
        if self.selected + 1 < self.list.len() {
            self.selected += 1;
        }
    }

    pub fn toggle_selected(&mut self) {
        let Some(id) = self.selected_plan().map(|p| p.id) else {
            return;
        };
        if !self.expanded.remove(&id) {
            self.expanded.insert(id);
        }
    }

    pub fn delete_selected(&mut self) {
        let mut target = None;
        if let Some(plan) = self.selected_plan() {
            Card::new(plan).request_delete(|id| target = Some(id));
        }
        let Some(id) = target else {
            return;
        };

        self.expanded.remove(&id);
        match self.list.remove_by_id(id) {
            Ok(_) => self.status_message = Some("Plan deleted".to_string()),
            Err(e) => self.status_message = Some(format!("Deleted, but saving failed: {e}")),
        }
        if self.selected >= self.list.len() {
            self.selected = self.list.len().saturating_sub(1);
        }
    }

    // -- Submission --

    /// Start a request in the background. The result comes back through
    /// [`App::poll_results`].
    pub fn submit(&mut self) {
        let Some(pipeline) = self.pipeline.clone() else {
            self.status_message = self.pipeline_error.clone();
            return;
        };
        let Some(submission) = self.form.begin_submit() else {
            return;
        };

        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = pipeline.generate_plan(&submission.input).await;
            // The receiver only goes away when the dashboard exits.
            let _ = tx.send((submission.ticket, result));
        });
    }

    /// Apply every request that has settled since the last call.
    pub fn poll_results(&mut self) {
        while let Ok((ticket, result)) = self.rx.try_recv() {
            self.settle(ticket, result);
        }
    }

    /// Wait for the next settled request and apply it.
    #[cfg(test)]
    pub async fn wait_for_result(&mut self) {
        if let Some((ticket, result)) = self.rx.recv().await {
            self.settle(ticket, result);
        }
    }

    fn settle(&mut self, ticket: u64, result: Result<EventPlan, PlanError>) {
        match self.form.finish_submit(ticket, result, &mut self.list) {
            Ok(SubmitOutcome::Created(_)) => {
                self.selected = 0;
                self.status_message = Some("Plan created".to_string());
            }
            Ok(_) => {}
            Err(e) => {
                self.selected = 0;
                self.status_message = Some(format!("Plan created, but saving failed: {e}"));
            }
        }
    }
}
