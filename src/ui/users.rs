//! Users list: a table of (name, email) rows with a cursor.
//!
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState, Wrap};

use crate::api::User;
use crate::app::controller::AppState;
use crate::app::{Intent, Theme};

pub const EMPTY_PLACEHOLDER: &str = "No users found. Add one above!";
pub const LOADING_PLACEHOLDER: &str = "Loading...";

/// Cursor over the rendered rows. Pure view state; never touches `AppState`.
#[derive(Clone, Debug)]
pub struct ListCursor {
    pub index: usize,
    pub rows_per_page: usize,
}

impl Default for ListCursor {
    fn default() -> Self {
        Self {
            index: 0,
            rows_per_page: 10,
        }
    }
}

impl ListCursor {
    /// Keep the cursor inside `len` rows.
    pub fn clamp(&mut self, len: usize) {
        self.index = self.index.min(len.saturating_sub(1));
    }

    pub fn up(&mut self, by: usize) {
        self.index = self.index.saturating_sub(by);
    }

    pub fn down(&mut self, by: usize, len: usize) {
        self.index = self.index.saturating_add(by).min(len.saturating_sub(1));
    }

    pub fn current<'a>(&self, users: &'a [User]) -> Option<&'a User> {
        users.get(self.index)
    }

    /// Edit intent for the highlighted row.
    pub fn edit(&self, users: &[User]) -> Option<Intent> {
        self.current(users).cloned().map(Intent::Edit)
    }
}

pub fn render_users_table(
    f: &mut Frame,
    area: Rect,
    state: &AppState,
    cursor: &mut ListCursor,
    theme: &Theme,
    focused: bool,
) {
    let border = if focused { theme.focus_border } else { theme.border };
    let block = Block::default()
        .title(format!("Users List ({})", state.users.len()))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border));

    if state.loading || state.users.is_empty() {
        let text = if state.loading { LOADING_PLACEHOLDER } else { EMPTY_PLACEHOLDER };
        let p = Paragraph::new(text)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .style(Style::default().fg(theme.muted))
            .block(block);
        f.render_widget(p, area);
        return;
    }

    let body_height = area.height.saturating_sub(3) as usize;
    if body_height > 0 {
        cursor.rows_per_page = body_height;
    }
    cursor.clamp(state.users.len());

    let editing = state.selected_user.as_ref().map(|u| &u.id);
    let rows = state.users.iter().map(|u| {
        let style = if Some(&u.id) == editing {
            Style::default().fg(theme.title).add_modifier(Modifier::ITALIC)
        } else {
            Style::default().fg(theme.text)
        };
        Row::new(vec![Cell::from(u.name.clone()), Cell::from(u.email.clone())]).style(style)
    });

    let widths = [Constraint::Percentage(40), Constraint::Percentage(60)];
    let header = Row::new(vec!["Name", "Email"])
        .style(Style::default().fg(theme.title).add_modifier(Modifier::BOLD));

    let table = Table::new(rows, widths)
        .header(header)
        .block(block)
        .row_highlight_style(
            Style::default()
                .fg(theme.highlight_fg)
                .bg(theme.highlight_bg)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("▶ ")
        .column_spacing(1);

    let mut table_state = TableState::default().with_selected(Some(cursor.index));
    f.render_stateful_widget(table, area, &mut table_state);
}
