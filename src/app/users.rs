use crate::signup;
use crate::state;
use crate::types::registry::RegistryState;

use axum::Json;
use axum::extract::{Form, State};
use axum::http::header::CONTENT_TYPE;
use axum::response::IntoResponse;
use serde::Deserialize;
use tracing::info;

/// Inbound SMS webhook payload.
#[derive(Debug, Deserialize)]
pub(crate) struct TextCommandForm {
    #[serde(rename = "From", default)]
    pub(crate) from: String,
    #[serde(rename = "Body", default)]
    pub(crate) body: String,
}

pub(crate) async fn text_command(
    State(state): State<state::AppState>,
    Form(form): Form<TextCommandForm>,
) -> impl IntoResponse {
    info!(from = %form.from, "POST /users");
    let reply = signup::handle_text_command(&*state.subscribers, &form.from, &form.body).await;
    ([(CONTENT_TYPE, "text/xml")], render_twiml(&reply.messages))
}

pub(crate) async fn list_users(State(state): State<state::AppState>) -> Json<RegistryState> {
    info!("GET /users");
    Json(RegistryState {
        subscribers: state.subscribers.list_all().await,
        displays: state.displays.list_all().await,
    })
}

pub(crate) fn render_twiml(messages: &[String]) -> String {
    let mut twiml = String::from("<Response>");
    for message in messages {
        twiml.push_str("<Message>");
        twiml.push_str(&escape_xml(message));
        twiml.push_str("</Message>");
    }
    twiml.push_str("</Response>");
    twiml
}

fn escape_xml(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
