use crate::state;

use axum::extract::{Form, Path, State};
use axum::http::StatusCode;
use serde::Deserialize;
use tracing::{info, warn};

#[derive(Debug, Deserialize)]
pub(crate) struct DisplayForm {
    #[serde(rename = "newRoom")]
    pub(crate) new_room: Option<String>,
    #[serde(rename = "oldRoom")]
    pub(crate) old_room: Option<String>,
}

pub(crate) async fn register_display(
    State(state): State<state::AppState>,
    Form(form): Form<DisplayForm>,
) -> Result<&'static str, (StatusCode, &'static str)> {
    info!(new_room = ?form.new_room, old_room = ?form.old_room, "POST /display");
    state
        .displays
        .rename(form.new_room.as_deref(), form.old_room.as_deref())
        .await
        .map_err(|err| {
            warn!(error = %err, "display registration rejected");
            (StatusCode::BAD_REQUEST, "Error")
        })?;
    Ok("done")
}

pub(crate) async fn remove_display(
    State(state): State<state::AppState>,
    Path(room): Path<String>,
) -> &'static str {
    info!(room = %room, "DELETE /display");
    state.displays.remove(&room).await;
    "done"
}
