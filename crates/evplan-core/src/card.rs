//! Card presentation for a single plan.
//!
//! [`card_view`] is a pure function of a plan and an `expanded` flag; the
//! TUI and the plain-text CLI output both render from the [`CardView`] it
//! returns. [`Card`] adds the transient per-card UI state.

use std::fmt::Write as _;

use evplan_store::EventPlan;

/// Items shown per list while a card is collapsed.
pub const COLLAPSED_ITEMS: usize = 3;

/// One labelled list on a card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardSection<'a> {
    pub title: &'static str,
    /// Items to display.
    pub items: &'a [String],
    /// Items not displayed because the card is collapsed.
    pub hidden: usize,
}

/// Everything needed to draw one card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardView<'a> {
    pub id: i64,
    pub name: &'a str,
    pub age: &'a str,
    pub gender: String,
    pub event_type: &'a str,
    pub created_at: &'a str,
    /// One chip per theme suggestion.
    pub chips: &'a [String],
    /// To-do, activities, and gift ideas, in that order.
    pub sections: [CardSection<'a>; 3],
    pub expanded: bool,
}

impl CardView<'_> {
    /// Whether toggling would show or hide anything.
    pub fn can_expand(&self) -> bool {
        self.sections
            .iter()
            .any(|s| s.hidden > 0 || s.items.len() > COLLAPSED_ITEMS)
    }

    /// Render as plain text for terminal output.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{} ({})", self.name, self.id);
        let _ = writeln!(
            out,
            "  {} | Age {} | {} | Created {}",
            self.event_type, self.age, self.gender, self.created_at
        );
        if !self.chips.is_empty() {
            let chips: Vec<String> = self.chips.iter().map(|c| format!("[{c}]")).collect();
            let _ = writeln!(out, "  Themes: {}", chips.join(" "));
        }
        for section in &self.sections {
            let _ = writeln!(out, "  {}:", section.title);
            if section.items.is_empty() {
                let _ = writeln!(out, "    (none)");
            }
            for item in section.items {
                let _ = writeln!(out, "    - {item}");
            }
            if section.hidden > 0 {
                let _ = writeln!(out, "    ... {} more", section.hidden);
            }
        }
        out
    }
}

/// Build the view of `plan`, capping each list unless `expanded`.
pub fn card_view(plan: &EventPlan, expanded: bool) -> CardView<'_> {
    CardView {
        id: plan.id,
        name: &plan.name,
        age: &plan.age,
        gender: plan.gender.to_string(),
        event_type: &plan.event_type,
        created_at: &plan.created_at,
        chips: &plan.theme_suggestions,
        sections: [
            section("To-Do", &plan.todo_list, expanded),
            section("Activities", &plan.activities, expanded),
            section("Gift Ideas", &plan.gift_ideas, expanded),
        ],
        expanded,
    }
}

fn section<'a>(title: &'static str, items: &'a [String], expanded: bool) -> CardSection<'a> {
    let shown = if expanded {
        items.len()
    } else {
        items.len().min(COLLAPSED_ITEMS)
    };
    CardSection {
        title,
        items: &items[..shown],
        hidden: items.len() - shown,
    }
}

/// A plan plus its transient expand/collapse state.
///
/// The state starts collapsed every time a card is built and is never
/// persisted.
#[derive(Debug, Clone, Copy)]
pub struct Card<'a> {
    plan: &'a EventPlan,
    expanded: bool,
}

impl<'a> Card<'a> {
    pub fn new(plan: &'a EventPlan) -> Self {
        Self {
            plan,
            expanded: false,
        }
    }

    pub fn expanded(&self) -> bool {
        self.expanded
    }

    pub fn toggle(&mut self) {
        self.expanded = !self.expanded;
    }

    pub fn view(&self) -> CardView<'a> {
        card_view(self.plan, self.expanded)
    }

    /// Ask the owner of the collection to delete this card's plan.
    pub fn request_delete(&self, on_delete: impl FnOnce(i64)) {
        on_delete(self.plan.id);
    }
}
