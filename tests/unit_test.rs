// Unit tests for user-manager
// Controller behaviour against an in-process backend that records calls
// and can be told to fail the next one.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use user_manager::api::{InMemoryUserService, User, UserDraft, UserId, UserService};
use user_manager::app::controller::{
    AppState, ConfirmPrompt, Controller, DELETE_FAILED, DELETE_PROMPT, FETCH_FAILED, Intent,
    Operation, SAVE_FAILED,
};
use user_manager::error::{ApiError, ApiResult};

#[derive(Clone, Debug, PartialEq, Eq)]
enum Call {
    List,
    Get(UserId),
    Create(UserDraft),
    Update(UserId, UserDraft),
    Delete(UserId),
}

#[derive(Default)]
struct Recording {
    inner: InMemoryUserService,
    calls: Mutex<Vec<Call>>,
    fail_next: Mutex<Option<ApiError>>,
}

impl Recording {
    fn with_users(users: Vec<User>) -> Self {
        Self {
            inner: InMemoryUserService::with_users(users),
            ..Default::default()
        }
    }

    fn record(&self, call: Call) -> ApiResult<()> {
        self.calls.lock().unwrap().push(call);
        match self.fail_next.lock().unwrap().take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn fail_next(&self, err: ApiError) {
        *self.fail_next.lock().unwrap() = Some(err);
    }

    fn take_calls(&self) -> Vec<Call> {
        std::mem::take(&mut *self.calls.lock().unwrap())
    }

    fn server_users(&self) -> Vec<User> {
        self.inner.snapshot()
    }
}

#[async_trait]
impl UserService for Recording {
    async fn list_users(&self) -> ApiResult<Vec<User>> {
        self.record(Call::List)?;
        self.inner.list_users().await
    }

    async fn get_user(&self, id: &UserId) -> ApiResult<User> {
        self.record(Call::Get(id.clone()))?;
        self.inner.get_user(id).await
    }

    async fn create_user(&self, draft: &UserDraft) -> ApiResult<User> {
        self.record(Call::Create(draft.clone()))?;
        self.inner.create_user(draft).await
    }

    async fn update_user(&self, id: &UserId, draft: &UserDraft) -> ApiResult<User> {
        self.record(Call::Update(id.clone(), draft.clone()))?;
        self.inner.update_user(id, draft).await
    }

    async fn delete_user(&self, id: &UserId) -> ApiResult<()> {
        self.record(Call::Delete(id.clone()))?;
        self.inner.delete_user(id).await
    }
}

/// Prompt that answers a fixed value and remembers what it was asked.
struct ScriptedPrompt {
    answer: bool,
    asked: Vec<String>,
}

impl ScriptedPrompt {
    fn new(answer: bool) -> Self {
        Self { answer, asked: Vec::new() }
    }
}

impl ConfirmPrompt for ScriptedPrompt {
    fn confirm(&mut self, message: &str) -> bool {
        self.asked.push(message.to_string());
        self.answer
    }
}

fn user(id: u64, name: &str) -> User {
    User {
        id: UserId::from(id),
        name: name.to_string(),
        email: format!("{}@x.io", name.to_lowercase()),
    }
}

fn seeded() -> Vec<User> {
    vec![user(1, "Ann"), user(2, "Bob"), user(3, "Cid")]
}

/// Controller that has completed its initial refresh; call log cleared.
async fn mounted(backend: &Arc<Recording>) -> Controller {
    let mut controller = Controller::new(backend.clone());
    assert!(controller.dispatch(Intent::Refresh, &mut false));
    controller.settle().await;
    backend.take_calls();
    controller
}

#[cfg(test)]
mod refresh_tests {
    use super::*;

    #[tokio::test]
    async fn empty_backend_yields_empty_list() {
        let backend = Arc::new(Recording::default());
        let mut controller = Controller::new(backend.clone());
        assert_eq!(controller.state(), &AppState::default());

        assert!(controller.dispatch(Intent::Refresh, &mut false));
        assert!(controller.state().loading);
        assert_eq!(controller.in_flight(), Some(Operation::Refresh));

        controller.settle().await;
        let state = controller.state();
        assert!(state.users.is_empty());
        assert!(!state.loading);
        assert_eq!(state.error, None);
        assert_eq!(backend.take_calls(), vec![Call::List]);
    }

    #[tokio::test]
    async fn failed_refresh_keeps_previous_users() {
        let backend = Arc::new(Recording::with_users(seeded()));
        let mut controller = mounted(&backend).await;
        assert_eq!(controller.state().users, seeded());

        backend.fail_next(ApiError::Network("connection refused".into()));
        controller.dispatch(Intent::Refresh, &mut false);
        assert!(controller.state().loading);
        controller.settle().await;

        let state = controller.state();
        assert!(!state.loading);
        assert_eq!(state.error.as_deref(), Some(FETCH_FAILED));
        assert_eq!(state.users, seeded());
    }

    #[tokio::test]
    async fn refresh_clears_previous_error() {
        let backend = Arc::new(Recording::with_users(seeded()));
        let mut controller = mounted(&backend).await;

        backend.fail_next(ApiError::Network("down".into()));
        controller.dispatch(Intent::Refresh, &mut false);
        controller.settle().await;
        assert!(controller.state().error.is_some());

        controller.dispatch(Intent::Refresh, &mut false);
        assert_eq!(controller.state().error, None);
        controller.settle().await;
        assert_eq!(controller.state().error, None);
    }
}

#[cfg(test)]
mod save_tests {
    use super::*;

    #[tokio::test]
    async fn save_without_selection_creates() {
        let backend = Arc::new(Recording::default());
        let mut controller = mounted(&backend).await;

        let draft = UserDraft::new("Ann", "ann@x.io");
        assert!(controller.dispatch(Intent::Save(draft.clone()), &mut false));
        assert!(!controller.state().loading);
        controller.settle().await;

        assert_eq!(backend.take_calls(), vec![Call::Create(draft), Call::List]);
        let state = controller.state();
        assert_eq!(state.users.len(), 1);
        assert_eq!(state.users[0].name, "Ann");
        assert_eq!(state.selected_user, None);
        assert!(!state.loading);
    }

    #[tokio::test]
    async fn save_with_selection_updates_that_id() {
        let backend = Arc::new(Recording::with_users(seeded()));
        let mut controller = mounted(&backend).await;

        let bob = controller.state().users[1].clone();
        assert!(controller.dispatch(Intent::Edit(bob.clone()), &mut false));
        assert_eq!(controller.state().selected_user.as_ref(), Some(&bob));
        assert!(backend.take_calls().is_empty());

        let draft = UserDraft::new("Robert", "robert@x.io");
        controller.dispatch(Intent::Save(draft.clone()), &mut false);
        controller.settle().await;

        assert_eq!(backend.take_calls(), vec![Call::Update(bob.id.clone(), draft), Call::List]);
        let state = controller.state();
        assert_eq!(state.selected_user, None);
        assert_eq!(state.users[1].name, "Robert");
        assert_eq!(state.users, backend.server_users());
    }

    #[tokio::test]
    async fn failed_update_keeps_selection_and_users() {
        let backend = Arc::new(Recording::with_users(seeded()));
        let mut controller = mounted(&backend).await;

        let bob = controller.state().users[1].clone();
        controller.dispatch(Intent::Edit(bob.clone()), &mut false);
        backend.fail_next(ApiError::Validation("email invalid".into()));
        controller.dispatch(Intent::Save(UserDraft::new("Bob", "nope")), &mut false);
        controller.settle().await;

        let state = controller.state();
        assert_eq!(state.error.as_deref(), Some(SAVE_FAILED));
        assert_eq!(state.selected_user.as_ref(), Some(&bob));
        assert_eq!(state.users, seeded());
        // no refresh after a failed mutation
        assert_eq!(backend.take_calls().len(), 1);
    }

    #[tokio::test]
    async fn failed_create_stays_in_create_mode() {
        let backend = Arc::new(Recording::default());
        let mut controller = mounted(&backend).await;

        backend.fail_next(ApiError::Network("reset".into()));
        controller.dispatch(Intent::Save(UserDraft::new("Ann", "ann@x.io")), &mut false);
        controller.settle().await;
        assert_eq!(controller.state().selected_user, None);
        assert_eq!(controller.state().error.as_deref(), Some(SAVE_FAILED));

        // retry succeeds and clears the message
        controller.dispatch(Intent::Save(UserDraft::new("Ann", "ann@x.io")), &mut false);
        assert_eq!(controller.state().error, None);
        controller.settle().await;
        assert_eq!(controller.state().users.len(), 1);
    }

    #[tokio::test]
    async fn edit_and_cancel_are_pure() {
        let backend = Arc::new(Recording::with_users(seeded()));
        let mut controller = mounted(&backend).await;

        let ann = controller.state().users[0].clone();
        controller.dispatch(Intent::Edit(ann.clone()), &mut false);
        assert!(controller.state().is_editing());
        controller.dispatch(Intent::Cancel, &mut false);
        assert_eq!(controller.state().selected_user, None);
        assert!(!controller.is_busy());
        assert!(backend.take_calls().is_empty());
    }
}

#[cfg(test)]
mod delete_tests {
    use super::*;

    #[tokio::test]
    async fn declined_delete_does_nothing() {
        let backend = Arc::new(Recording::with_users(seeded()));
        let mut controller = mounted(&backend).await;
        let before = controller.state().clone();

        let mut prompt = ScriptedPrompt::new(false);
        assert!(!controller.dispatch(Intent::Delete(UserId::from(3u64)), &mut prompt));

        assert_eq!(prompt.asked, vec![DELETE_PROMPT.to_string()]);
        assert_eq!(controller.state(), &before);
        assert!(!controller.is_busy());
        assert!(backend.take_calls().is_empty());
    }

    #[tokio::test]
    async fn confirmed_delete_removes_and_refreshes() {
        let backend = Arc::new(Recording::with_users(seeded()));
        let mut controller = mounted(&backend).await;

        let mut prompt = ScriptedPrompt::new(true);
        assert!(controller.dispatch(Intent::Delete(UserId::from(3u64)), &mut prompt));
        controller.settle().await;

        assert_eq!(backend.take_calls(), vec![Call::Delete(UserId::from(3u64)), Call::List]);
        let state = controller.state();
        assert!(state.users.iter().all(|u| u.id != UserId::from(3u64)));
        assert_eq!(state.users.len(), 2);
        assert_eq!(state.error, None);
    }

    #[tokio::test]
    async fn failed_delete_reports_and_keeps_users() {
        let backend = Arc::new(Recording::with_users(seeded()));
        let mut controller = mounted(&backend).await;

        controller.dispatch(Intent::Delete(UserId::from(99u64)), &mut true);
        controller.settle().await;

        let state = controller.state();
        assert_eq!(state.error.as_deref(), Some(DELETE_FAILED));
        assert_eq!(state.users, seeded());
        assert_eq!(backend.take_calls(), vec![Call::Delete(UserId::from(99u64))]);
    }

    #[tokio::test]
    async fn deleting_the_selected_user_clears_selection() {
        let backend = Arc::new(Recording::with_users(seeded()));
        let mut controller = mounted(&backend).await;

        let ann = controller.state().users[0].clone();
        let bob = controller.state().users[1].clone();

        controller.dispatch(Intent::Edit(ann.clone()), &mut false);
        controller.dispatch(Intent::Delete(bob.id.clone()), &mut true);
        controller.settle().await;
        assert_eq!(controller.state().selected_user.as_ref(), Some(&ann));

        controller.dispatch(Intent::Delete(ann.id.clone()), &mut true);
        controller.settle().await;
        assert_eq!(controller.state().selected_user, None);
    }

    #[tokio::test]
    async fn failed_delete_of_selected_keeps_selection() {
        let backend = Arc::new(Recording::with_users(seeded()));
        let mut controller = mounted(&backend).await;

        let cid = controller.state().users[2].clone();
        controller.dispatch(Intent::Edit(cid.clone()), &mut false);
        backend.fail_next(ApiError::NotFound(cid.id.to_string()));
        controller.dispatch(Intent::Delete(cid.id.clone()), &mut true);
        controller.settle().await;

        assert_eq!(controller.state().selected_user.as_ref(), Some(&cid));
        assert_eq!(controller.state().error.as_deref(), Some(DELETE_FAILED));
    }
}

#[cfg(test)]
mod serialization_tests {
    use super::*;

    #[tokio::test]
    async fn second_request_is_rejected_while_one_is_in_flight() {
        let backend = Arc::new(Recording::default());
        let mut controller = mounted(&backend).await;

        assert!(controller.dispatch(Intent::Save(UserDraft::new("Ann", "ann@x.io")), &mut false));
        assert_eq!(controller.in_flight(), Some(Operation::Save));
        assert!(!controller.dispatch(Intent::Save(UserDraft::new("Bea", "bea@x.io")), &mut false));
        assert!(!controller.dispatch(Intent::Refresh, &mut false));

        // a busy controller does not even ask for confirmation
        let mut prompt = ScriptedPrompt::new(true);
        assert!(!controller.dispatch(Intent::Delete(UserId::from(1u64)), &mut prompt));
        assert!(prompt.asked.is_empty());

        controller.settle().await;
        assert_eq!(controller.in_flight(), None);
        assert_eq!(controller.state().users.len(), 1);
        assert_eq!(backend.take_calls().len(), 2);
    }

    #[tokio::test]
    async fn loading_is_only_set_during_refresh() {
        let backend = Arc::new(Recording::with_users(seeded()));
        let mut controller = Controller::new(backend.clone());
        assert!(!controller.state().loading);

        controller.dispatch(Intent::Refresh, &mut false);
        assert!(controller.state().loading);
        controller.settle().await;
        assert!(!controller.state().loading);

        backend.fail_next(ApiError::Server {
            status: reqwest::StatusCode::BAD_GATEWAY,
            message: "upstream".into(),
        });
        controller.dispatch(Intent::Refresh, &mut false);
        assert!(controller.state().loading);
        controller.settle().await;
        assert!(!controller.state().loading);
    }

    #[tokio::test]
    async fn users_track_server_after_every_mutation() {
        let backend = Arc::new(Recording::default());
        let mut controller = mounted(&backend).await;

        for (name, email) in [("Ann", "ann@x.io"), ("Bob", "bob@x.io"), ("Cid", "cid@x.io")] {
            controller.dispatch(Intent::Save(UserDraft::new(name, email)), &mut false);
            controller.settle().await;
            assert_eq!(controller.state().users, backend.server_users());
        }

        let bob = controller.state().users[1].clone();
        controller.dispatch(Intent::Edit(bob.clone()), &mut false);
        controller.dispatch(Intent::Save(UserDraft::new("Bobby", "bob@x.io")), &mut false);
        controller.settle().await;
        assert_eq!(controller.state().users, backend.server_users());

        controller.dispatch(Intent::Delete(bob.id.clone()), &mut true);
        controller.settle().await;
        assert_eq!(controller.state().users, backend.server_users());
        assert_eq!(controller.state().users.len(), 2);
    }

    #[tokio::test]
    async fn poll_applies_arrived_completions() {
        let backend = Arc::new(Recording::with_users(seeded()));
        let mut controller = Controller::new(backend.clone());
        controller.dispatch(Intent::Refresh, &mut false);

        while controller.is_busy() {
            tokio::task::yield_now().await;
            controller.poll();
        }
        assert_eq!(controller.state().users, seeded());
        assert!(!controller.poll());
    }
}
