//! Exit-intent popup fragment handlers.
//!
//! `static/js/popup.js` mounts the fragment returned here, arms the
//! exit-intent listener after `show_after_seconds` and reports what the
//! visitor did. Every handler rebuilds the controller from the session, so
//! the fragment it answers with is always what should be on screen now.
//! Failures never surface as error pages: the popup just stays as it was.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    http::{HeaderName, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;
use tradepath_core::popup::{BONUS_PATH, REDIRECT_DELAY};
use tradepath_core::{Email, PopupConfig, PopupController, PopupEvent, PopupOutcome};

use crate::services::popup::{self, Applied, PopupRedirect};
use crate::state::AppState;

/// Header telling the page the popup went away.
pub const POPUP_CLOSED_HEADER: HeaderName = HeaderName::from_static("x-popup-closed");

const INVALID_EMAIL_MESSAGE: &str = "Please enter a valid email address.";
const RETRY_MESSAGE: &str = "Something went wrong. Please try again.";
const MAX_PAGE_LEN: usize = 512;

/// Popup parameters sent with every popup request.
#[derive(Debug, Deserialize)]
pub struct PopupParams {
    #[serde(default)]
    pub page: String,
    #[serde(default)]
    pub manual: bool,
}

/// Popup subscription form data.
#[derive(Debug, Deserialize)]
pub struct SubscribeForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub page: String,
    #[serde(default)]
    pub manual: bool,
}

/// Data for rendering the popup form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopupView {
    pub page: String,
    pub show_after_seconds: u32,
    pub manual: bool,
    /// Open immediately instead of waiting for exit intent.
    pub open: bool,
    pub email: String,
    pub message: Option<&'static str>,
}

impl PopupView {
    #[must_use]
    pub fn new(page: &str, config: PopupConfig, manual: bool) -> Self {
        Self {
            page: page.to_string(),
            show_after_seconds: config.show_after_seconds,
            manual,
            open: false,
            email: String::new(),
            message: None,
        }
    }

    /// The same popup, already open, showing `message` under the form.
    #[must_use]
    pub fn with_message(mut self, email: &str, message: &'static str) -> Self {
        self.open = true;
        self.email = email.to_string();
        self.message = Some(message);
        self
    }
}

/// Popup form fragment.
#[derive(Template, WebTemplate)]
#[template(path = "popup/popup.html")]
pub struct PopupTemplate {
    pub popup: PopupView,
}

/// Success fragment carrying the delayed redirect.
#[derive(Template, WebTemplate)]
#[template(path = "popup/success.html")]
pub struct PopupSuccessTemplate {
    pub location: &'static str,
    pub after_ms: u128,
}

impl From<PopupRedirect> for PopupSuccessTemplate {
    fn from(redirect: PopupRedirect) -> Self {
        Self {
            location: redirect.location,
            after_ms: redirect.after.as_millis(),
        }
    }
}

/// Restrict the reported page to a local path.
#[must_use]
pub fn normalize_page(page: &str) -> String {
    let page = page.trim();
    if page.starts_with('/') && !page.starts_with("//") && page.len() <= MAX_PAGE_LEN {
        page.to_string()
    } else {
        "/".to_string()
    }
}

/// Fragment for whatever the controller says should be on screen.
fn fragment(controller: &PopupController, page: &str, open: bool) -> Response {
    if controller.should_render() {
        let mut popup = PopupView::new(page, controller.config(), controller.manual_trigger());
        popup.open = open;
        PopupTemplate { popup }.into_response()
    } else {
        Html("").into_response()
    }
}

fn closed(mut response: Response) -> Response {
    response
        .headers_mut()
        .insert(POPUP_CLOSED_HEADER, HeaderValue::from_static("true"));
    response
}

async fn mount(
    state: &AppState,
    session: &Session,
    page: &str,
    manual: bool,
) -> Option<PopupController> {
    let config = state.config().popup.config_for(page);
    match popup::mount(session, config, manual).await {
        Ok(controller) => Some(controller),
        Err(e) => {
            tracing::warn!(error = %e, "Could not read popup session state");
            None
        }
    }
}

/// Render the popup fragment for a page (empty when it must not render).
///
/// `manual=true` comes from the header button and opens the popup even
/// after a dismissal.
#[instrument(skip(state, session), fields(page = %params.page))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    Query(params): Query<PopupParams>,
) -> Response {
    let page = normalize_page(&params.page);
    match mount(&state, &session, &page, params.manual).await {
        Some(controller) => fragment(&controller, &page, params.manual),
        None => Html("").into_response(),
    }
}

/// Record that exit intent opened the popup.
#[instrument(skip(state, session), fields(page = %form.page))]
pub async fn shown(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<PopupParams>,
) -> StatusCode {
    let page = normalize_page(&form.page);
    if let Some(mut controller) = mount(&state, &session, &page, form.manual).await {
        let effects = controller.handle(PopupEvent::IntentDetected);
        if let Err(e) = popup::apply(&session, &effects, &page).await {
            tracing::warn!(error = %e, "Could not apply popup effects");
        }
    }
    StatusCode::NO_CONTENT
}

async fn resolve(
    state: &AppState,
    session: &Session,
    form: &PopupParams,
    outcome: PopupOutcome,
) -> Response {
    let page = normalize_page(&form.page);
    let Some(mut controller) = mount(state, session, &page, form.manual).await else {
        return closed(Html("").into_response());
    };

    if let Err(e) =
        popup::handle_outcome(&mut controller, session, state.subscriber(), outcome, &page).await
    {
        tracing::warn!(error = %e, "Could not apply popup effects");
    }

    closed(fragment(&controller, &page, false))
}

/// Close the popup until the next exit intent.
#[instrument(skip(state, session), fields(page = %form.page))]
pub async fn close(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<PopupParams>,
) -> Response {
    resolve(&state, &session, &form, PopupOutcome::Closed).await
}

/// Dismiss the popup for the rest of the session.
#[instrument(skip(state, session), fields(page = %form.page))]
pub async fn dismiss(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<PopupParams>,
) -> Response {
    resolve(&state, &session, &form, PopupOutcome::DismissedForSession).await
}

/// Submit the popup form.
///
/// Success answers with a fragment carrying the bonus redirect; any failure
/// keeps the form open with a message.
#[instrument(skip(state, session, form), fields(page = %form.page))]
pub async fn subscribe(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<SubscribeForm>,
) -> Response {
    let page = normalize_page(&form.page);
    let config = state.config().popup.config_for(&page);
    let retry_view = || PopupView::new(&page, config, form.manual);

    let Some(mut controller) = mount(&state, &session, &page, form.manual).await else {
        return PopupTemplate {
            popup: retry_view().with_message(&form.email, RETRY_MESSAGE),
        }
        .into_response();
    };

    if !controller.should_render() {
        return Html("").into_response();
    }

    let Ok(email) = Email::parse(&form.email) else {
        return PopupTemplate {
            popup: retry_view().with_message(&form.email, INVALID_EMAIL_MESSAGE),
        }
        .into_response();
    };

    match popup::handle_outcome(
        &mut controller,
        &session,
        state.subscriber(),
        PopupOutcome::Submitted(email),
        &page,
    )
    .await
    {
        Ok(Applied {
            redirect: Some(redirect),
            ..
        }) => PopupSuccessTemplate::from(redirect).into_response(),
        Ok(_) => PopupTemplate {
            popup: retry_view().with_message(&form.email, RETRY_MESSAGE),
        }
        .into_response(),
        Err(e) => {
            // The subscription went through; only the session flag was lost.
            tracing::warn!(error = %e, "Could not record popup dismissal");
            PopupSuccessTemplate::from(PopupRedirect {
                location: BONUS_PATH,
                after: REDIRECT_DELAY,
            })
            .into_response()
        }
    }
}
