//! Shared UI components (status bar, error banner, modal dialogs).
//!
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use crate::app::controller::{AppState, DELETE_PROMPT, Operation};
use crate::app::keymap::KeyAction;
use crate::app::{Focus, ModalState, Theme, ViewState};

/// Render the bottom status bar with mode, focus and request activity.
pub fn render_status_bar(
    f: &mut Frame,
    area: Rect,
    state: &AppState,
    view: &ViewState,
    in_flight: Option<Operation>,
) {
    let mode = if state.is_editing() { "EDIT" } else { "CREATE" };
    let focus = match view.focus {
        Focus::List => "list",
        Focus::Form => "form",
    };
    let activity = match in_flight {
        Some(Operation::Refresh) => "  fetching…",
        Some(Operation::Save) => "  saving…",
        Some(Operation::Delete) => "  deleting…",
        None => "",
    };
    let tail = match &view.notice {
        Some(notice) => format!("  | {notice}"),
        None => "  | ?: help  q: quit".to_string(),
    };
    let msg = format!(
        "mode: {mode}  focus: {focus}  users:{}{activity}{tail}",
        state.users.len()
    );
    let style = Style::default().fg(view.theme.status_fg).bg(view.theme.status_bg);
    f.render_widget(Paragraph::new(msg).style(style), area);
}

/// One-line banner with the last user-facing error.
pub fn render_error_banner(f: &mut Frame, area: Rect, message: &str, theme: &Theme) {
    let p = Paragraph::new(Line::from(vec![
        Span::styled("✖ ", Style::default().fg(theme.error_fg).add_modifier(Modifier::BOLD)),
        Span::styled(message.to_string(), Style::default().fg(theme.error_fg)),
    ]));
    f.render_widget(p, area);
}

/// Compute a rectangle centered within `area` with a maximum size.
pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect {
        x,
        y,
        width: width.min(area.width),
        height: height.min(area.height),
    }
}

pub fn render_modal(f: &mut Frame, area: Rect, view: &ViewState) {
    match &view.modal {
        Some(ModalState::ConfirmDelete { user, selected }) => {
            render_confirm_modal(f, area, &view.theme, &user.name, &user.email, *selected)
        }
        Some(ModalState::Help { scroll }) => render_help_modal(f, area, view, *scroll),
        None => {}
    }
}

fn render_confirm_modal(
    f: &mut Frame,
    area: Rect,
    theme: &Theme,
    name: &str,
    email: &str,
    selected: usize,
) {
    let rect = centered_rect(54, 8, area);
    let yes = if selected == 0 { "[Yes]" } else { " Yes " };
    let no = if selected == 1 { "[No]" } else { " No  " };
    let body = format!("{DELETE_PROMPT}\n\n  {name} <{email}>\n\n  {yes}    {no}");
    let p = Paragraph::new(body).wrap(Wrap { trim: false }).block(
        Block::default()
            .title("Confirm delete")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.border)),
    );
    f.render_widget(Clear, rect);
    f.render_widget(p, rect);
}

/// Help modal; list-pane keys come from the active keymap.
fn render_help_modal(f: &mut Frame, area: Rect, view: &ViewState, scroll: u16) {
    let width = 64u16.min(area.width.saturating_sub(4)).max(40);
    let height = 20u16.min(area.height.saturating_sub(4)).max(10);
    let rect = centered_rect(width, height, area);

    let bold = Style::default().add_modifier(Modifier::BOLD);
    let section = |title: &'static str| Line::from(Span::styled(title, bold));
    let row = |label: &str, keys: String| {
        Line::from(vec![
            Span::raw(format!("  {label:<18}")),
            Span::styled(keys, Style::default().add_modifier(Modifier::ITALIC)),
        ])
    };
    let keys = |action: KeyAction| view.keymap.keys_for(action).join(", ");

    let lines = vec![
        section("Users list"),
        row("Move", format!("{} / {}", keys(KeyAction::MoveUp), keys(KeyAction::MoveDown))),
        row("Page", format!("{} / {}", keys(KeyAction::PageUp), keys(KeyAction::PageDown))),
        row("Edit user", keys(KeyAction::EditSelection)),
        row("Delete user", keys(KeyAction::DeleteSelection)),
        row("New user", keys(KeyAction::NewUser)),
        row("Go to form", keys(KeyAction::FocusForm)),
        row("Reload list", keys(KeyAction::Refresh)),
        row("Help", keys(KeyAction::OpenHelp)),
        row("Quit", keys(KeyAction::Quit)),
        Line::raw(""),
        section("Form"),
        row("Next field", "Tab, Up, Down".to_string()),
        row("Save", "Enter".to_string()),
        row("Cancel", "Esc".to_string()),
        row("Clear field", "Ctrl+u".to_string()),
        Line::raw(""),
        row("Close help", "Esc, Enter, q".to_string()),
    ];

    let p = Paragraph::new(lines).wrap(Wrap { trim: false }).scroll((scroll, 0)).block(
        Block::default()
            .title("Help")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(view.theme.border)),
    );
    f.render_widget(Clear, rect);
    f.render_widget(p, rect);
}
