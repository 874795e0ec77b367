//! Runs the popup state machine against a visitor's session.
//!
//! Each popup request rebuilds a [`PopupController`] from the route config,
//! the session flag and the manual trigger, feeds it one event, then carries
//! out the returned effects: session writes, tracking, and the redirect that
//! is handed back to the browser.

use std::time::Duration;

use tracing::instrument;
use tradepath_core::popup::{DISMISSED_SESSION_KEY, LEGACY_DISMISSAL_KEYS, SUBMISSION_SOURCE};
use tradepath_core::{
    Email, PopupConfig, PopupController, PopupEffect, PopupEvent, PopupMetric, PopupOutcome,
};

use super::storage::{SessionStorage, StorageError};
use super::subscriber::{NewsletterSubscriber, SubscribeRequest};
use crate::config::PopupSettings;
use crate::error::add_breadcrumb;

/// Value written under [`DISMISSED_SESSION_KEY`].
const DISMISSED_VALUE: &str = "true";

/// Full-page navigation the browser performs after a delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PopupRedirect {
    pub location: &'static str,
    pub after: Duration,
}

/// What the response has to tell the browser once effects ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Applied {
    /// The popup went away; the page should drop it.
    pub closed: bool,
    pub redirect: Option<PopupRedirect>,
}

/// Whether the visitor dismissed the popup earlier in this session.
///
/// # Errors
///
/// Returns `StorageError` if the session cannot be read.
pub async fn dismissed_in_session<S: SessionStorage>(storage: &S) -> Result<bool, StorageError> {
    Ok(storage.get(DISMISSED_SESSION_KEY).await?.is_some())
}

/// Mount a controller for one request.
///
/// # Errors
///
/// Returns `StorageError` if the session cannot be read.
pub async fn mount<S: SessionStorage>(
    storage: &S,
    config: PopupConfig,
    manual_trigger: bool,
) -> Result<PopupController, StorageError> {
    let dismissed = dismissed_in_session(storage).await?;
    Ok(PopupController::mount(config, dismissed, manual_trigger))
}

/// Clear dismissal state at the start of a full page load.
///
/// Long-lived keys from earlier releases are always removed. The session
/// flag is removed only when `reset_on_page_load` is set.
///
/// # Errors
///
/// Returns `StorageError` if the session cannot be written.
pub async fn reset_on_page_load<S: SessionStorage>(
    storage: &S,
    settings: &PopupSettings,
) -> Result<(), StorageError> {
    for key in LEGACY_DISMISSAL_KEYS {
        storage.remove(key).await?;
    }

    if settings.reset_on_page_load {
        storage.remove(DISMISSED_SESSION_KEY).await?;
    }

    Ok(())
}

/// Carry out effects in order.
///
/// # Errors
///
/// Returns `StorageError` if recording the dismissal fails. Effects before
/// the failing one have already run.
pub async fn apply<S: SessionStorage>(
    storage: &S,
    effects: &[PopupEffect],
    page: &str,
) -> Result<Applied, StorageError> {
    let mut applied = Applied::default();

    for effect in effects {
        match *effect {
            PopupEffect::RecordDismissal => {
                storage.set(DISMISSED_SESSION_KEY, DISMISSED_VALUE).await?;
            }
            PopupEffect::NotifyClosed => applied.closed = true,
            PopupEffect::Track(metric) => track(metric, page),
            PopupEffect::Redirect { location, after } => {
                applied.redirect = Some(PopupRedirect { location, after });
            }
        }
    }

    Ok(applied)
}

/// Emit a popup observability event.
pub fn track(metric: PopupMetric, page: &str) {
    tracing::info!(target: "popup", event = metric.as_str(), page = %page, "popup event");
    add_breadcrumb(
        "popup",
        &format!("Popup {}", metric.as_str()),
        Some(&[("page", page)]),
    );
}

/// Send one submission and translate the result into a controller event.
#[instrument(skip(subscriber), fields(email = %email))]
pub async fn submit<N: NewsletterSubscriber>(
    subscriber: &N,
    email: &Email,
    page: &str,
) -> PopupEvent {
    let request = SubscribeRequest::now(email.clone(), SUBMISSION_SOURCE, page);

    match subscriber.subscribe(&request).await {
        Ok(()) => {
            tracing::info!("Popup subscription accepted");
            PopupEvent::SubmissionSucceeded
        }
        Err(e) => {
            tracing::warn!(error = %e, "Popup subscription failed");
            PopupEvent::SubmissionFailed
        }
    }
}

/// Resolve what the visitor did with a visible popup.
///
/// A failed submission leaves the controller untouched; the caller can tell
/// it apart from success by the missing redirect.
///
/// # Errors
///
/// Returns `StorageError` if recording the dismissal fails.
pub async fn handle_outcome<S, N>(
    controller: &mut PopupController,
    storage: &S,
    subscriber: &N,
    outcome: PopupOutcome,
    page: &str,
) -> Result<Applied, StorageError>
where
    S: SessionStorage,
    N: NewsletterSubscriber,
{
    let event = match outcome {
        PopupOutcome::Closed => PopupEvent::Closed,
        PopupOutcome::DismissedForSession => PopupEvent::DismissedForSession,
        PopupOutcome::Submitted(email) => submit(subscriber, &email, page).await,
    };

    let effects = controller.handle(event);
    apply(storage, &effects, page).await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;

    use tradepath_core::PopupState;

    use super::*;
    use crate::services::storage::MemoryStorage;
    use crate::services::subscriber::SubscribeError;

    const ENABLED: PopupConfig = PopupConfig {
        enabled: true,
        show_after_seconds: 5,
    };

    /// Records requests and answers with a fixed status.
    struct FakeSubscriber {
        status: Option<u16>,
        requests: Mutex<Vec<SubscribeRequest>>,
    }

    impl FakeSubscriber {
        fn accepting() -> Self {
            Self {
                status: None,
                requests: Mutex::new(Vec::new()),
            }
        }

        fn failing(status: u16) -> Self {
            Self {
                status: Some(status),
                requests: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> usize {
            self.requests.lock().unwrap().len()
        }
    }

    impl NewsletterSubscriber for FakeSubscriber {
        async fn subscribe(&self, request: &SubscribeRequest) -> Result<(), SubscribeError> {
            self.requests.lock().unwrap().push(request.clone());
            match self.status {
                None => Ok(()),
                Some(status) => Err(SubscribeError::Status { status }),
            }
        }
    }

    fn email() -> Email {
        Email::parse("lead@example.com").unwrap()
    }

    #[tokio::test]
    async fn test_mount_reads_flag() {
        let storage = MemoryStorage::new();
        let popup = mount(&storage, ENABLED, false).await.unwrap();
        assert_eq!(popup.state(), PopupState::Eligible);

        storage.set(DISMISSED_SESSION_KEY, "true").await.unwrap();
        let popup = mount(&storage, ENABLED, false).await.unwrap();
        assert_eq!(popup.state(), PopupState::Dismissed);
        assert!(!popup.should_render());
    }

    #[tokio::test]
    async fn test_successful_submission_records_flag_and_redirects() {
        let storage = MemoryStorage::new();
        let subscriber = FakeSubscriber::accepting();
        let mut popup = mount(&storage, ENABLED, false).await.unwrap();

        let applied = handle_outcome(
            &mut popup,
            &storage,
            &subscriber,
            PopupOutcome::Submitted(email()),
            "/pricing",
        )
        .await
        .unwrap();

        assert_eq!(
            applied.redirect,
            Some(PopupRedirect {
                location: "/bonus",
                after: Duration::from_millis(500),
            })
        );
        assert_eq!(
            storage.get(DISMISSED_SESSION_KEY).await.unwrap().as_deref(),
            Some("true")
        );
        assert_eq!(subscriber.calls(), 1);

        let sent = subscriber.requests.lock().unwrap().first().cloned().unwrap();
        assert_eq!(sent.source, "exit_intent_popup");
        assert_eq!(sent.page, "/pricing");
        assert_eq!(sent.email.as_str(), "lead@example.com");
    }

    #[tokio::test]
    async fn test_failed_submission_changes_nothing() {
        let storage = MemoryStorage::new();
        let subscriber = FakeSubscriber::failing(500);
        let mut popup = mount(&storage, ENABLED, false).await.unwrap();
        popup.handle(PopupEvent::IntentDetected);

        let applied = handle_outcome(
            &mut popup,
            &storage,
            &subscriber,
            PopupOutcome::Submitted(email()),
            "/",
        )
        .await
        .unwrap();

        assert_eq!(applied, Applied::default());
        assert_eq!(popup.state(), PopupState::Visible);
        assert!(storage.keys().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_close_leaves_session_untouched() {
        let storage = MemoryStorage::new();
        let subscriber = FakeSubscriber::accepting();
        let mut popup = mount(&storage, ENABLED, false).await.unwrap();

        let applied = handle_outcome(&mut popup, &storage, &subscriber, PopupOutcome::Closed, "/")
            .await
            .unwrap();

        assert!(applied.closed);
        assert_eq!(applied.redirect, None);
        assert!(storage.keys().unwrap().is_empty());
        assert_eq!(subscriber.calls(), 0);
    }

    #[tokio::test]
    async fn test_dismiss_records_flag() {
        let storage = MemoryStorage::new();
        let subscriber = FakeSubscriber::accepting();
        let mut popup = mount(&storage, ENABLED, false).await.unwrap();

        let applied = handle_outcome(
            &mut popup,
            &storage,
            &subscriber,
            PopupOutcome::DismissedForSession,
            "/",
        )
        .await
        .unwrap();

        assert!(applied.closed);
        assert!(dismissed_in_session(&storage).await.unwrap());
        assert!(!mount(&storage, ENABLED, false).await.unwrap().should_render());
        assert!(mount(&storage, ENABLED, true).await.unwrap().should_render());
    }

    #[tokio::test]
    async fn test_reset_on_page_load() {
        let storage = MemoryStorage::new();
        storage.set(DISMISSED_SESSION_KEY, "true").await.unwrap();
        storage.set("popup_dismissed_until", "2099-01-01").await.unwrap();
        storage.set("popup_dismissed", "true").await.unwrap();

        let keep_flag = PopupSettings {
            reset_on_page_load: false,
            ..PopupSettings::default()
        };
        reset_on_page_load(&storage, &keep_flag).await.unwrap();
        assert_eq!(storage.keys().unwrap(), vec![DISMISSED_SESSION_KEY.to_string()]);

        reset_on_page_load(&storage, &PopupSettings::default()).await.unwrap();
        assert!(storage.keys().unwrap().is_empty());
    }
}
