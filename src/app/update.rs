use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::Terminal;
use ratatui::backend::Backend;
use std::time::Duration;
use tracing::debug;

use crate::app::keymap::KeyAction;
use crate::app::{Controller, Focus, Intent, ModalState, ViewState};
use crate::ui;

/// Shown when an action is refused because another request is running.
pub const BUSY_HINT: &str = "Busy, try again in a moment";

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Main loop: fold finished requests into the state, redraw, handle one key.
pub fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    controller: &mut Controller,
    view: &mut ViewState,
) -> Result<()> {
    // initial mount
    send(controller, Intent::Refresh);

    loop {
        controller.poll();
        sync_view(controller, view);

        terminal.draw(|f| {
            ui::render(f, controller.state(), view, controller.in_flight());
        })?;

        if event::poll(Duration::from_millis(100))?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
            && handle_key(controller, view, &key) == Flow::Quit
        {
            break;
        }
    }

    Ok(())
}

/// Bring view-local state in line with the latest `AppState`.
pub fn sync_view(controller: &Controller, view: &mut ViewState) {
    let state = controller.state();
    if view.form.is_pending() && !controller.is_busy() {
        view.form.finish_submit(state);
    }
    view.form.sync(state.selected_user.as_ref());
    view.cursor.clamp(state.users.len());
}

/// Dispatch an intent that never asks for confirmation.
fn send(controller: &mut Controller, intent: Intent) -> bool {
    controller.dispatch(intent, &mut false)
}

pub fn handle_key(controller: &mut Controller, view: &mut ViewState, key: &KeyEvent) -> Flow {
    view.notice = None;
    if view.modal.is_some() {
        handle_modal_key(controller, view, key.code);
        return Flow::Continue;
    }
    match view.focus {
        Focus::Form => handle_form_key(controller, view, key),
        Focus::List => return handle_list_key(controller, view, key),
    }
    Flow::Continue
}

fn handle_form_key(controller: &mut Controller, view: &mut ViewState, key: &KeyEvent) {
    let Some(intent) = view.form.handle_key(key) else {
        return;
    };
    match intent {
        Intent::Cancel => {
            send(controller, Intent::Cancel);
            view.focus = Focus::List;
        }
        save @ Intent::Save(_) => {
            if !send(controller, save) {
                view.form.abandon_submit(BUSY_HINT);
            }
        }
        other => {
            send(controller, other);
        }
    }
}

fn handle_list_key(controller: &mut Controller, view: &mut ViewState, key: &KeyEvent) -> Flow {
    let Some(action) = view.keymap.resolve(key) else {
        return Flow::Continue;
    };
    let users = &controller.state().users;
    match action {
        KeyAction::Quit => return Flow::Quit,
        KeyAction::OpenHelp => view.modal = Some(ModalState::Help { scroll: 0 }),
        KeyAction::NewUser => {
            send(controller, Intent::Cancel);
            view.focus = Focus::Form;
        }
        KeyAction::EditSelection => {
            if let Some(intent) = view.cursor.edit(users) {
                send(controller, intent);
                view.focus = Focus::Form;
            }
        }
        KeyAction::DeleteSelection => {
            if controller.is_busy() {
                view.notice = Some(BUSY_HINT.to_string());
            } else if let Some(user) = view.cursor.current(users) {
                view.modal = Some(ModalState::ConfirmDelete {
                    user: user.clone(),
                    selected: 1,
                });
            }
        }
        KeyAction::Refresh => {
            if !send(controller, Intent::Refresh) {
                view.notice = Some(BUSY_HINT.to_string());
            }
        }
        KeyAction::FocusForm => view.focus = Focus::Form,
        KeyAction::MoveUp => view.cursor.up(1),
        KeyAction::MoveDown => view.cursor.down(1, users.len()),
        KeyAction::PageUp => {
            let rpp = view.cursor.rows_per_page.max(1);
            view.cursor.up(rpp);
        }
        KeyAction::PageDown => {
            let rpp = view.cursor.rows_per_page.max(1);
            view.cursor.down(rpp, users.len());
        }
        KeyAction::Ignore => {}
    }
    Flow::Continue
}

fn handle_modal_key(controller: &mut Controller, view: &mut ViewState, code: KeyCode) {
    match &mut view.modal {
        Some(ModalState::ConfirmDelete { user, selected }) => {
            let answer = match code {
                KeyCode::Left
                | KeyCode::Right
                | KeyCode::Tab
                | KeyCode::Char('h')
                | KeyCode::Char('l') => {
                    *selected = 1 - (*selected).min(1);
                    None
                }
                KeyCode::Char('y') | KeyCode::Char('Y') => Some(true),
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => Some(false),
                KeyCode::Enter => Some(*selected == 0),
                _ => None,
            };
            if let Some(mut confirmed) = answer {
                let id = user.id.clone();
                view.modal = None;
                let started = controller.dispatch(Intent::Delete(id.clone()), &mut confirmed);
                debug!(%id, confirmed, started, "delete prompt answered");
                if confirmed && !started {
                    view.notice = Some(BUSY_HINT.to_string());
                }
            }
        }
        Some(ModalState::Help { scroll }) => match code {
            KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q') | KeyCode::Char('?') => {
                view.modal = None
            }
            KeyCode::Up | KeyCode::Char('k') => *scroll = scroll.saturating_sub(1),
            KeyCode::Down | KeyCode::Char('j') => *scroll = scroll.saturating_add(1),
            _ => {}
        },
        None => {}
    }
}
