//! Full page route handlers.
//!
//! Every full page load first clears popup dismissal state (see
//! [`popup::reset_on_page_load`]) and then embeds the popup fragment when the
//! page is allowed to show it.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;
use tower_sessions::Session;
use tracing::instrument;
use tradepath_core::popup::BONUS_PATH;

use crate::error::Result;
use crate::filters;
use crate::routes::popup::PopupView;
use crate::services::popup;
use crate::state::AppState;

/// Landing page template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/home.html")]
pub struct HomeTemplate {
    pub page: String,
    pub popup: Option<PopupView>,
}

/// Bonus page template, shown after subscribing.
#[derive(Template, WebTemplate)]
#[template(path = "pages/bonus.html")]
pub struct BonusTemplate {
    pub page: String,
    pub popup: Option<PopupView>,
}

/// Reset dismissal state and decide whether `path` embeds the popup.
async fn page_popup(state: &AppState, session: &Session, path: &str) -> Result<Option<PopupView>> {
    let settings = &state.config().popup;
    popup::reset_on_page_load(session, settings).await?;

    let config = settings.config_for(path);
    let controller = popup::mount(session, config, false).await?;

    Ok(controller
        .should_render()
        .then(|| PopupView::new(path, config, false)))
}

/// Display the landing page.
///
/// # Errors
///
/// Returns 500 if the session store is unavailable.
#[instrument(skip(state, session))]
pub async fn home(State(state): State<AppState>, session: Session) -> Result<HomeTemplate> {
    let path = "/";
    Ok(HomeTemplate {
        page: path.to_string(),
        popup: page_popup(&state, &session, path).await?,
    })
}

/// Display the subscriber bonus page.
///
/// # Errors
///
/// Returns 500 if the session store is unavailable.
#[instrument(skip(state, session))]
pub async fn bonus(State(state): State<AppState>, session: Session) -> Result<BonusTemplate> {
    Ok(BonusTemplate {
        page: BONUS_PATH.to_string(),
        popup: page_popup(&state, &session, BONUS_PATH).await?,
    })
}
