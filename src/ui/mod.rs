//! Rendering. Views read `&AppState` as props; their own transient state
//! (list cursor, form fields, modals) lives in [`ViewState`].
//!
pub mod components;
pub mod form;
pub mod users;

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::Style;
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::app::controller::{AppState, Operation};
use crate::app::{Focus, ViewState};

pub fn render(f: &mut Frame, state: &AppState, view: &mut ViewState, in_flight: Option<Operation>) {
    let banner = u16::from(state.error.is_some());
    let root = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(banner),
            Constraint::Min(5),
            Constraint::Length(1),
        ])
        .split(f.area());
    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(root[2]);

    let header = Paragraph::new(format!("User Management System  ({})", view.endpoint))
        .block(
            Block::default()
                .title("user-manager")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(view.theme.border)),
        )
        .style(Style::default().fg(view.theme.header_fg).bg(view.theme.header_bg));
    f.render_widget(header, root[0]);

    if let Some(message) = &state.error {
        components::render_error_banner(f, root[1], message, &view.theme);
    }

    let theme = view.theme;
    let modal_open = view.modal.is_some();
    form::render_form(
        f,
        body[0],
        state,
        &view.form,
        &theme,
        view.focus == Focus::Form && !modal_open,
    );
    let list_focused = view.focus == Focus::List;
    users::render_users_table(f, body[1], state, &mut view.cursor, &theme, list_focused);

    components::render_status_bar(f, root[3], state, view, in_flight);

    if modal_open {
        components::render_modal(f, f.area(), view);
    }
}
