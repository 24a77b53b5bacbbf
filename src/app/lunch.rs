use crate::state;
use crate::types::menu::Menu;
use crate::types::message::LunchMessage;

use axum::Json;
use axum::extract::State;
use tracing::info;

/// Starts the batched fan-out and answers before any batch is sent.
pub(crate) async fn notify_lunch(State(state): State<state::AppState>) -> &'static str {
    info!("POST /lunch");
    let subscribers = state.subscribers.list_all().await;
    let displays = state.displays.list_all().await.into_keys().collect();
    let message = LunchMessage::from_menu(state.menu.current().as_ref());
    let dispatch = state.dispatcher.dispatch(subscribers, displays, message);
    info!(batches = dispatch.batches.len(), "lunch dispatch scheduled");
    "Notifying"
}

pub(crate) async fn current_menu(State(state): State<state::AppState>) -> Json<Option<Menu>> {
    Json(state.menu.current())
}
