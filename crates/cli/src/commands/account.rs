//! Order history, reports, and the stored session.

use corner_store_core::Role;
use corner_store_storefront::error::{AppError, Result, clear_sentry_user, set_sentry_user};
use corner_store_storefront::session::{Session, User};
use corner_store_storefront::state::AppState;
use corner_store_storefront::views::{OrderHistoryView, ReportsView};
use secrecy::SecretString;

use crate::SessionAction;

pub async fn orders(state: &AppState) -> Result<()> {
    let mut view = OrderHistoryView::new(state.user().cloned());
    view.mount(state.api()).await;
    super::show(state, &view.render()?)
}

pub async fn reports(state: &AppState) -> Result<()> {
    let mut view = ReportsView::new(state.user().cloned());
    view.mount(state.api()).await;
    super::show(state, &view.render()?)
}

pub fn session(state: &AppState, action: SessionAction) -> Result<()> {
    match action {
        SessionAction::Login { name, role, token } => {
            let role: Role = role.parse().map_err(AppError::BadRequest)?;
            if name.trim().is_empty() || token.trim().is_empty() {
                return Err(AppError::BadRequest(
                    "Name and token must not be empty".to_string(),
                ));
            }

            let user = User::new(name.trim(), role);
            state.sessions().save(&Session {
                user: user.clone(),
                token: SecretString::from(token),
            })?;
            set_sentry_user(&user.name, &user.role);
            tracing::info!(user = %user.name, %role, "Signed in");
            super::say(&format!("Hello, {} ({role})", user.name))
        }
        SessionAction::Logout => {
            state.sessions().clear()?;
            clear_sentry_user();
            super::say("Signed out")
        }
        SessionAction::Show => match state.user() {
            Some(user) => super::say(&format!("Hello, {} ({})", user.name, user.role)),
            None => super::say("Not signed in"),
        },
    }
}
