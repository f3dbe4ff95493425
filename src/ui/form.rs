//! Create/edit form: local field state, key handling and rendering.
//!
//! The form owns only transient input. It is re-seeded from the selected
//! user whenever that selection changes and emits [`Intent::Save`] /
//! [`Intent::Cancel`] upward.
//!
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::api::{User, UserDraft};
use crate::app::controller::{AppState, SAVE_FAILED};
use crate::app::{Intent, Theme};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FormField {
    Name,
    Email,
}

impl FormField {
    fn next(self) -> Self {
        match self {
            Self::Name => Self::Email,
            Self::Email => Self::Name,
        }
    }
}

#[derive(Clone, Debug)]
pub struct FormState {
    pub name: String,
    pub email: String,
    pub field: FormField,
    /// Inline message for locally refused submissions.
    pub hint: Option<String>,
    /// Selection the fields were seeded from.
    source: Option<User>,
    /// A submitted draft is awaiting the controller.
    pending: bool,
}

impl Default for FormState {
    fn default() -> Self {
        Self {
            name: String::new(),
            email: String::new(),
            field: FormField::Name,
            hint: None,
            source: None,
            pending: false,
        }
    }
}

impl FormState {
    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Re-seed the fields if the selected user differs from the one they came from.
    pub fn sync(&mut self, selected: Option<&User>) {
        if self.source.as_ref() != selected {
            self.reset(selected);
        }
    }

    fn reset(&mut self, selected: Option<&User>) {
        let draft = selected.map(User::draft).unwrap_or_default();
        self.name = draft.name;
        self.email = draft.email;
        self.field = FormField::Name;
        self.hint = None;
        self.source = selected.cloned();
    }

    /// Called once the controller is idle after a submission: a successful save
    /// blanks the form, a failed one keeps the typed values for a retry.
    pub fn finish_submit(&mut self, state: &AppState) {
        self.pending = false;
        if state.error.as_deref() != Some(SAVE_FAILED) {
            self.reset(state.selected_user.as_ref());
        }
    }

    /// The submitted draft was not accepted; keep the input and explain why.
    pub fn abandon_submit(&mut self, hint: &str) {
        self.pending = false;
        self.hint = Some(hint.to_string());
    }

    fn draft(&self) -> UserDraft {
        UserDraft::new(self.name.trim(), self.email.trim())
    }

    fn value_mut(&mut self) -> &mut String {
        match self.field {
            FormField::Name => &mut self.name,
            FormField::Email => &mut self.email,
        }
    }

    /// Apply a keystroke; returns the intent it produced, if any.
    pub fn handle_key(&mut self, key: &KeyEvent) -> Option<Intent> {
        match key.code {
            KeyCode::Esc => {
                self.reset(None);
                Some(Intent::Cancel)
            }
            KeyCode::Enter => {
                let draft = self.draft();
                if draft.name.is_empty() {
                    self.hint = Some("Name is required".to_string());
                    self.field = FormField::Name;
                    return None;
                }
                if draft.email.is_empty() {
                    self.hint = Some("Email is required".to_string());
                    self.field = FormField::Email;
                    return None;
                }
                self.hint = None;
                self.pending = true;
                Some(Intent::Save(draft))
            }
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => {
                self.field = self.field.next();
                None
            }
            KeyCode::Backspace => {
                self.value_mut().pop();
                None
            }
            KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.value_mut().clear();
                None
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.value_mut().push(c);
                self.hint = None;
                None
            }
            _ => None,
        }
    }
}

/// Render the form; `focused` highlights the border and places the cursor.
pub fn render_form(
    f: &mut Frame,
    area: Rect,
    state: &AppState,
    form: &FormState,
    theme: &Theme,
    focused: bool,
) {
    let title = if state.is_editing() { "Edit User" } else { "Add New User" };
    let border = if focused { theme.focus_border } else { theme.border };
    let label_style = Style::default().fg(theme.title).add_modifier(Modifier::BOLD);
    let marker = |field: FormField| if focused && form.field == field { "▶ " } else { "  " };

    let mut lines = vec![
        Line::from(vec![
            Span::raw(marker(FormField::Name)),
            Span::styled("Name:  ", label_style),
            Span::raw(form.name.clone()),
        ]),
        Line::from(vec![
            Span::raw(marker(FormField::Email)),
            Span::styled("Email: ", label_style),
            Span::raw(form.email.clone()),
        ]),
        Line::raw(""),
    ];
    if let Some(hint) = &form.hint {
        lines.push(Line::from(Span::styled(hint.clone(), Style::default().fg(theme.error_fg))));
    }
    let submit = if state.is_editing() { "Update" } else { "Create" };
    lines.push(Line::from(Span::styled(
        format!("Enter: {submit}   Esc: Cancel   Tab: next field"),
        Style::default().fg(theme.muted),
    )));

    let p = Paragraph::new(lines).style(Style::default().fg(theme.text)).block(
        Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border)),
    );
    f.render_widget(p, area);

    if focused {
        // "▶ " + label is 9 columns wide; +1 for the border
        let (row, value) = match form.field {
            FormField::Name => (0, &form.name),
            FormField::Email => (1, &form.email),
        };
        let typed = u16::try_from(value.chars().count()).unwrap_or(u16::MAX);
        let x = area.x.saturating_add(1 + 9).saturating_add(typed);
        let y = area.y.saturating_add(1 + row);
        if x < area.right().saturating_sub(1) && y < area.bottom().saturating_sub(1) {
            f.set_cursor_position((x, y));
        }
    }
}
