//! Application state and the controller that owns it.
//!
//! Views only ever see `&AppState`; the only way to change it is to hand an
//! [`Intent`] to [`Controller::dispatch`]. Network calls run as tokio tasks
//! and report back over a channel; their results are folded into the state
//! by [`Controller::poll`] / [`Controller::settle`].
//!
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tracing::{debug, error, info};

use crate::api::{User, UserDraft, UserId, UserService};
use crate::error::ApiResult;

pub const FETCH_FAILED: &str = "Failed to fetch users";
pub const SAVE_FAILED: &str = "Failed to save user";
pub const DELETE_FAILED: &str = "Failed to delete user";
pub const DELETE_PROMPT: &str = "Are you sure you want to delete this user?";

/// Canonical client-side state. Replaced as a whole on every transition.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AppState {
    /// Last snapshot of the server collection.
    pub users: Vec<User>,
    /// Record being edited; `None` means the form creates.
    pub selected_user: Option<User>,
    /// True only while a list fetch is outstanding.
    pub loading: bool,
    /// User-facing message of the last failed operation.
    pub error: Option<String>,
}

impl AppState {
    pub fn is_editing(&self) -> bool {
        self.selected_user.is_some()
    }
}

/// User actions emitted by the views.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Intent {
    Refresh,
    Save(UserDraft),
    Delete(UserId),
    Edit(User),
    Cancel,
}

/// Blocking yes/no question asked before a delete.
pub trait ConfirmPrompt {
    fn confirm(&mut self, message: &str) -> bool;
}

/// An answer already collected by the UI (e.g. from a modal dialog).
impl ConfirmPrompt for bool {
    fn confirm(&mut self, _message: &str) -> bool {
        *self
    }
}

/// Request currently awaiting its response.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Operation {
    Refresh,
    Save,
    Delete,
}

/// Result of a finished network call.
#[derive(Debug)]
enum Completion {
    Fetched(ApiResult<Vec<User>>),
    Saved(ApiResult<User>),
    Deleted(UserId, ApiResult<()>),
}

pub struct Controller {
    state: AppState,
    service: Arc<dyn UserService>,
    runtime: Handle,
    tx: UnboundedSender<Completion>,
    rx: UnboundedReceiver<Completion>,
    in_flight: Option<Operation>,
}

impl Controller {
    /// Create a controller bound to the current tokio runtime.
    ///
    /// Must be called from within a runtime context (`#[tokio::main]`,
    /// `#[tokio::test]` or a `Runtime::enter` guard).
    pub fn new(service: Arc<dyn UserService>) -> Self {
        Self::with_runtime(service, Handle::current())
    }

    pub fn with_runtime(service: Arc<dyn UserService>, runtime: Handle) -> Self {
        let (tx, rx) = unbounded_channel();
        Self {
            state: AppState::default(),
            service,
            runtime,
            tx,
            rx,
            in_flight: None,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn in_flight(&self) -> Option<Operation> {
        self.in_flight
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Handle one intent. Returns `false` when the intent was dropped: either
    /// another request is still outstanding, or a delete was not confirmed.
    pub fn dispatch(&mut self, intent: Intent, prompt: &mut dyn ConfirmPrompt) -> bool {
        match intent {
            Intent::Edit(user) => {
                debug!(id = %user.id, "edit");
                self.transition(|s| s.selected_user = Some(user));
                true
            }
            Intent::Cancel => {
                self.transition(|s| s.selected_user = None);
                true
            }
            Intent::Refresh => self.begin(Operation::Refresh, |c| c.start_refresh()),
            Intent::Save(draft) => self.begin(Operation::Save, |c| c.start_save(draft)),
            Intent::Delete(id) => {
                if self.is_busy() {
                    debug!(current = ?self.in_flight, "delete ignored, request in flight");
                    return false;
                }
                if !prompt.confirm(DELETE_PROMPT) {
                    debug!(%id, "delete not confirmed");
                    return false;
                }
                self.begin(Operation::Delete, |c| c.start_delete(id))
            }
        }
    }

    /// Apply every completion that has already arrived, without waiting.
    pub fn poll(&mut self) -> bool {
        let mut changed = false;
        while let Ok(done) = self.rx.try_recv() {
            self.complete(done);
            changed = true;
        }
        changed
    }

    /// Wait until no request is outstanding, applying completions as they come.
    pub async fn settle(&mut self) {
        while self.in_flight.is_some() {
            match self.rx.recv().await {
                Some(done) => self.complete(done),
                None => break,
            }
        }
    }

    fn begin(&mut self, op: Operation, start: impl FnOnce(&mut Self)) -> bool {
        if let Some(current) = self.in_flight {
            debug!(requested = ?op, ?current, "intent ignored, request in flight");
            return false;
        }
        self.in_flight = Some(op);
        start(self);
        true
    }

    fn start_refresh(&mut self) {
        self.in_flight = Some(Operation::Refresh);
        self.transition(|s| {
            s.loading = true;
            s.error = None;
        });
        let service = Arc::clone(&self.service);
        let tx = self.tx.clone();
        self.runtime.spawn(async move {
            let _ = tx.send(Completion::Fetched(service.list_users().await));
        });
    }

    fn start_save(&mut self, draft: UserDraft) {
        self.transition(|s| s.error = None);
        let target = self.state.selected_user.as_ref().map(|u| u.id.clone());
        let service = Arc::clone(&self.service);
        let tx = self.tx.clone();
        self.runtime.spawn(async move {
            let result = match target {
                Some(id) => service.update_user(&id, &draft).await,
                None => service.create_user(&draft).await,
            };
            let _ = tx.send(Completion::Saved(result));
        });
    }

    fn start_delete(&mut self, id: UserId) {
        self.transition(|s| s.error = None);
        let service = Arc::clone(&self.service);
        let tx = self.tx.clone();
        self.runtime.spawn(async move {
            let result = service.delete_user(&id).await;
            let _ = tx.send(Completion::Deleted(id, result));
        });
    }

    fn complete(&mut self, done: Completion) {
        match done {
            Completion::Fetched(Ok(users)) => {
                debug!(count = users.len(), "users fetched");
                self.in_flight = None;
                self.transition(|s| {
                    s.users = users;
                    s.loading = false;
                });
            }
            Completion::Fetched(Err(err)) => {
                error!(kind = err.kind(), error = %err, "Error fetching users");
                self.in_flight = None;
                self.transition(|s| {
                    s.loading = false;
                    s.error = Some(FETCH_FAILED.to_string());
                });
            }
            Completion::Saved(Ok(user)) => {
                info!(id = %user.id, "user saved");
                self.transition(|s| s.selected_user = None);
                self.start_refresh();
            }
            Completion::Saved(Err(err)) => {
                error!(kind = err.kind(), error = %err, "Error saving user");
                self.in_flight = None;
                self.transition(|s| s.error = Some(SAVE_FAILED.to_string()));
            }
            Completion::Deleted(id, Ok(())) => {
                info!(%id, "user deleted");
                self.transition(|s| {
                    if s.selected_user.as_ref().is_some_and(|u| u.id == id) {
                        s.selected_user = None;
                    }
                });
                self.start_refresh();
            }
            Completion::Deleted(id, Err(err)) => {
                error!(%id, kind = err.kind(), error = %err, "Error deleting user");
                self.in_flight = None;
                self.transition(|s| s.error = Some(DELETE_FAILED.to_string()));
            }
        }
    }

    /// Build the next state from the current one and swap it in.
    fn transition(&mut self, f: impl FnOnce(&mut AppState)) {
        let mut next = self.state.clone();
        f(&mut next);
        self.state = next;
    }
}
