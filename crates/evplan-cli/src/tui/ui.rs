//! TUI rendering using ratatui.

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use evplan_core::{CardView, FormController, FormField, card_view};

use super::app::App;

/// Render the dashboard, with the form modal on top when it is open.
pub fn render(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),    // cards
            Constraint::Length(1), // status bar
        ])
        .split(f.area());

    render_cards(f, app, chunks[0]);
    render_status_bar(f, app, chunks[1]);

    if app.form.is_open() {
        render_modal(f, &app.form, f.area());
    }
}

fn render_cards(f: &mut Frame, app: &App, area: Rect) {
    let outer = Block::default()
        .borders(Borders::ALL)
        .title(format!(" Event Plans ({}) ", app.list.len()));
    let inner = outer.inner(area);
    f.render_widget(outer, area);

    if app.list.is_empty() {
        let empty = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(
                "  No event plans yet. Press n to create one.",
                Style::default().fg(Color::DarkGray),
            )),
        ]);
        f.render_widget(empty, inner);
        return;
    }

    let cards: Vec<Vec<Line>> = app
        .list
        .all()
        .iter()
        .map(|plan| card_lines(&card_view(plan, app.is_expanded(plan.id))))
        .collect();
    let heights: Vec<u16> = cards
        .iter()
        .map(|lines| u16::try_from(lines.len() + 2).unwrap_or(u16::MAX))
        .collect();

    // Back up from the selected card while the previous ones still fit.
    let selected = app.selected.min(cards.len() - 1);
    let mut first = selected;
    let mut used = heights[selected];
    while first > 0 && used.saturating_add(heights[first - 1]) <= inner.height {
        first -= 1;
        used += heights[first];
    }

    let mut y = inner.y;
    let bottom = inner.y + inner.height;
    for (i, lines) in cards.into_iter().enumerate().skip(first) {
        if y >= bottom {
            break;
        }
        let height = heights[i].min(bottom - y);
        let rect = Rect::new(inner.x, y, inner.width, height);

        let border = if i == selected {
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let card = Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .block(Block::default().borders(Borders::ALL).border_style(border));
        f.render_widget(card, rect);
        y += height;
    }
}

/// The body lines of one card.
fn card_lines<'a>(view: &CardView<'a>) -> Vec<Line<'a>> {
    let mut lines = Vec::new();

    lines.push(Line::from(vec![
        Span::styled(
            view.name,
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("  {}", view.event_type),
            Style::default().fg(Color::Magenta),
        ),
    ]));
    lines.push(Line::from(Span::styled(
        format!(
            "Age {} · {} · Created {}",
            view.age, view.gender, view.created_at
        ),
        Style::default().fg(Color::DarkGray),
    )));

    if !view.chips.is_empty() {
        let mut chips = Vec::with_capacity(view.chips.len() * 2);
        for chip in view.chips {
            chips.push(Span::styled(
                format!(" {chip} "),
                Style::default().bg(Color::Blue).fg(Color::White),
            ));
            chips.push(Span::raw(" "));
        }
        lines.push(Line::from(chips));
    }

    for section in &view.sections {
        lines.push(Line::from(Span::styled(
            section.title,
            Style::default().fg(Color::Yellow),
        )));
        if section.items.is_empty() {
            lines.push(Line::from(Span::styled(
                "  (none)",
                Style::default().fg(Color::DarkGray),
            )));
        }
        for item in section.items {
            lines.push(Line::from(format!("  • {item}")));
        }
        if section.hidden > 0 {
            lines.push(Line::from(Span::styled(
                format!("  … {} more (Enter to expand)", section.hidden),
                Style::default().fg(Color::DarkGray),
            )));
        }
    }

    if view.expanded && view.can_expand() {
        lines.push(Line::from(Span::styled(
            "Enter to collapse",
            Style::default().fg(Color::DarkGray),
        )));
    }

    lines
}

fn render_modal(f: &mut Frame, form: &FormController, area: Rect) {
    let rect = centered_rect(60, 14, area);
    f.render_widget(Clear, rect);

    let input = form.input();
    let mut lines = vec![Line::from("")];
    for field in FormField::ALL {
        let focused = field == form.focus();
        let value = match field {
            FormField::Name => input.name.clone(),
            FormField::Age => input.age.clone(),
            FormField::EventType => input.event_type.clone(),
            FormField::Gender => format!("< {} >", input.gender),
        };
        let cursor = if focused && field != FormField::Gender { "▏" } else { "" };
        let label_style = if focused {
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Yellow)
        };
        lines.push(Line::from(vec![
            Span::styled(format!("  {:<11}", field.label()), label_style),
            Span::raw(value),
            Span::raw(cursor),
        ]));
    }
    lines.push(Line::from(""));

    if let Some(error) = form.error() {
        lines.push(Line::from(Span::styled(
            format!("  {error}"),
            Style::default().fg(Color::Red),
        )));
    } else if form.is_loading() {
        lines.push(Line::from(Span::styled(
            "  Generating plan...",
            Style::default().fg(Color::Green),
        )));
    } else {
        lines.push(Line::from(""));
    }
    lines.push(Line::from(""));

    let hint = if form.can_submit() {
        "  Enter: generate  Tab: next field  ←/→: gender  Esc: close"
    } else {
        "  Waiting for the planner...  Esc: close"
    };
    lines.push(Line::from(Span::styled(
        hint,
        Style::default().fg(Color::DarkGray),
    )));

    let modal = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(" New Event Plan "),
    );
    f.render_widget(modal, rect);
}

fn render_status_bar(f: &mut Frame, app: &App, area: Rect) {
    let status_msg = app.status_message.as_deref().unwrap_or("");

    let bar = Line::from(vec![
        Span::styled(
            " evplan ",
            Style::default().bg(Color::Blue).fg(Color::White),
        ),
        Span::raw("  "),
        Span::styled(status_msg, Style::default().fg(Color::Green)),
        Span::raw("  n:new  Enter:expand  d:delete  j/k:move  q:quit"),
    ]);

    f.render_widget(Paragraph::new(bar), area);
}

// -- Helpers --

/// A `width` x `height` rect centered in `area`, clipped to fit.
fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

#[cfg(test)]
mod tests {
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    use evplan_store::{EventList, PlanStore};
    use evplan_test_utils::sample_plan;

    use super::*;

    fn draw(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(90, 40)).unwrap();
        terminal.draw(|f| render(f, app)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    fn app_with(ids: &[i64]) -> App {
        let mut list = EventList::load(PlanStore::in_memory());
        for id in ids {
            list.insert_front(sample_plan(*id)).unwrap();
        }
        App::new(list, Err("no key".to_string()))
    }

    #[test]
    fn empty_dashboard_shows_hint() {
        let screen = draw(&app_with(&[]));
        assert!(screen.contains("No event plans yet"));
        assert!(screen.contains("Event Plans (0)"));
    }

    #[test]
    fn collapsed_card_caps_lists() {
        let screen = draw(&app_with(&[1]));
        assert!(screen.contains("Mia"));
        assert!(screen.contains("Unicorns"));
        assert!(screen.contains("Invites"));
        assert!(!screen.contains("Cleanup"));
        assert!(screen.contains("2 more"));
    }

    #[test]
    fn expanded_card_shows_all_items() {
        let mut app = app_with(&[1]);
        app.toggle_selected();
        let screen = draw(&app);
        assert!(screen.contains("Cleanup"));
        assert!(screen.contains("Enter to collapse"));
    }

    #[test]
    fn modal_shows_fields_and_error() {
        let mut app = app_with(&[]);
        app.form.open_modal();
        let sub = app.form.begin_submit().unwrap();
        let err = sub.input.validate().unwrap_err();
        app.form
            .finish_submit(sub.ticket, Err(err), &mut app.list)
            .unwrap();

        let screen = draw(&app);
        assert!(screen.contains("New Event Plan"));
        assert!(screen.contains("Event type"));
        assert!(screen.contains("< Any >"));
        assert!(screen.contains("Please fill in all fields."));
    }

    #[test]
    fn centered_rect_clips_to_area() {
        let area = Rect::new(0, 0, 40, 10);
        let r = centered_rect(60, 14, area);
        assert_eq!(r, area);
        let r = centered_rect(20, 4, area);
        assert_eq!((r.x, r.y, r.width, r.height), (10, 3, 20, 4));
    }
}
