//! Exit-intent popup visibility and dismissal state machine.
//!
//! The presentational popup (markup plus a small script in the site crate)
//! detects exit intent and reports what the visitor did. This module decides
//! whether the popup may render and what has to happen after each event. It
//! performs no I/O: every transition returns the [`PopupEffect`]s the caller
//! must carry out (record the session flag, emit tracking events, redirect).
//!
//! ```text
//!              enabled=false
//!   Hidden <-------------------- (any)
//!
//!   Eligible --IntentDetected--> Visible --Closed--------------> Eligible
//!                                   |    --DismissedForSession--> Dismissed
//!                                   |    --SubmissionSucceeded--> Dismissed (+ redirect)
//!                                   '----SubmissionFailed------> Visible
//! ```
//!
//! Rendering is a pure function of `(config, dismissed, manual_trigger)`:
//! the popup renders iff it is enabled and either not dismissed or manually
//! triggered.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::Email;

/// Session key recording a dismissal for the current browsing session.
pub const DISMISSED_SESSION_KEY: &str = "popup_dismissed_session";

/// Long-lived dismissal keys from earlier releases, cleared on page load.
pub const LEGACY_DISMISSAL_KEYS: [&str; 2] = ["popup_dismissed_until", "popup_dismissed"];

/// Where visitors land after subscribing.
pub const BONUS_PATH: &str = "/bonus";

/// Delay before the post-subscribe redirect, leaving tracking calls time to flush.
pub const REDIRECT_DELAY: Duration = Duration::from_millis(500);

/// `source` reported to the subscription endpoint.
pub const SUBMISSION_SOURCE: &str = "exit_intent_popup";

/// Popup settings for the current route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopupConfig {
    pub enabled: bool,
    pub show_after_seconds: u32,
}

impl PopupConfig {
    /// A config that never renders.
    #[must_use]
    pub const fn disabled() -> Self {
        Self {
            enabled: false,
            show_after_seconds: 0,
        }
    }
}

/// Observable controller state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopupState {
    /// Disabled for this route.
    Hidden,
    /// May be shown on the next exit intent.
    Eligible,
    /// On screen.
    Visible,
    /// Suppressed for the rest of the session.
    Dismissed,
}

/// What the visitor did with a visible popup.
///
/// Closing and dismissing are distinct outcomes: a close only hides the popup
/// until the next exit intent, a dismissal suppresses it for the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PopupOutcome {
    Closed,
    DismissedForSession,
    Submitted(Email),
}

/// Input to [`PopupController::handle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopupEvent {
    /// The presentational popup detected exit intent (after its own delay).
    IntentDetected,
    Closed,
    DismissedForSession,
    /// The subscription endpoint answered with a success status.
    SubmissionSucceeded,
    /// The subscription endpoint failed or answered with an error status.
    SubmissionFailed,
}

/// Tracking events emitted by transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopupMetric {
    Shown,
    Closed,
    Dismissed,
    Converted,
}

impl PopupMetric {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Shown => "shown",
            Self::Closed => "closed",
            Self::Dismissed => "dismissed",
            Self::Converted => "converted",
        }
    }
}

/// Side effects requested by a transition, in the order they should run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopupEffect {
    /// Write [`DISMISSED_SESSION_KEY`] to session storage.
    RecordDismissal,
    /// Tell the surrounding page the popup went away.
    NotifyClosed,
    Track(PopupMetric),
    /// Full-page navigation after `after`.
    Redirect {
        location: &'static str,
        after: Duration,
    },
}

/// Popup controller for one page view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopupController {
    config: PopupConfig,
    dismissed: bool,
    manual_trigger: bool,
    visible: bool,
}

impl PopupController {
    /// Mount the controller.
    ///
    /// `dismissed_in_session` is the current value of the session flag.
    #[must_use]
    pub const fn mount(config: PopupConfig, dismissed_in_session: bool, manual_trigger: bool) -> Self {
        Self {
            config,
            dismissed: dismissed_in_session,
            manual_trigger,
            visible: false,
        }
    }

    /// Re-read the session flag after the route config changed.
    pub fn reconfigure(&mut self, config: PopupConfig, dismissed_in_session: bool) {
        self.config = config;
        self.dismissed = dismissed_in_session;
        if !self.should_render() {
            self.visible = false;
        }
    }

    #[must_use]
    pub const fn config(&self) -> PopupConfig {
        self.config
    }

    #[must_use]
    pub const fn manual_trigger(&self) -> bool {
        self.manual_trigger
    }

    #[must_use]
    pub const fn is_dismissed(&self) -> bool {
        self.dismissed
    }

    /// Whether the popup markup is rendered at all.
    #[must_use]
    pub const fn should_render(&self) -> bool {
        self.config.enabled && (!self.dismissed || self.manual_trigger)
    }

    #[must_use]
    pub const fn state(&self) -> PopupState {
        if !self.config.enabled {
            PopupState::Hidden
        } else if self.visible {
            PopupState::Visible
        } else if self.dismissed {
            PopupState::Dismissed
        } else {
            PopupState::Eligible
        }
    }

    /// Apply one event and return the effects the caller must perform.
    pub fn handle(&mut self, event: PopupEvent) -> Vec<PopupEffect> {
        match event {
            PopupEvent::IntentDetected => {
                if !self.should_render() || self.visible {
                    return Vec::new();
                }
                self.visible = true;
                vec![PopupEffect::Track(PopupMetric::Shown)]
            }
            PopupEvent::Closed => {
                self.visible = false;
                vec![
                    PopupEffect::NotifyClosed,
                    PopupEffect::Track(PopupMetric::Closed),
                ]
            }
            PopupEvent::DismissedForSession => {
                self.visible = false;
                self.dismissed = true;
                vec![
                    PopupEffect::RecordDismissal,
                    PopupEffect::NotifyClosed,
                    PopupEffect::Track(PopupMetric::Dismissed),
                ]
            }
            PopupEvent::SubmissionSucceeded => {
                self.visible = false;
                self.dismissed = true;
                vec![
                    PopupEffect::RecordDismissal,
                    PopupEffect::Track(PopupMetric::Converted),
                    PopupEffect::Redirect {
                        location: BONUS_PATH,
                        after: REDIRECT_DELAY,
                    },
                ]
            }
            PopupEvent::SubmissionFailed => Vec::new(),
        }
    }
}
