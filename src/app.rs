use crate::adapters::{Cater2MeClient, JsonFileStore, SlackClient, TokioTimeProvider, TwilioClient};
use crate::config;
use crate::dispatch::BatchDispatcher;
use crate::menu::{self, MenuCache, MenuSchedule};
use crate::ports::StoreError;
use crate::registry::{DisplayRegistry, SubscriberRegistry};
use crate::state;

use axum::Router;
use axum::routing::{delete, get, post};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

mod displays;
mod lunch;
mod users;

/// Stored snapshots that cannot be read refuse startup instead of being
/// replaced by an empty registry on the next write.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("failed to load {path}: {source}")]
    Snapshot { path: PathBuf, source: StoreError },
}

pub fn app(config: config::AppConfig) -> Result<Router, StartupError> {
    let providers = &config.providers;
    let twilio = TwilioClient::new(providers.twilio.clone());
    let slack = SlackClient::new(providers.slack.clone());

    let users_path = config.users_path();
    let subscribers = SubscriberRegistry::load(twilio.clone(), JsonFileStore::new(&users_path))
        .map_err(|source| StartupError::Snapshot {
            path: users_path,
            source,
        })?;
    let displays_path = config.displays_path();
    let displays = DisplayRegistry::load(JsonFileStore::new(&displays_path)).map_err(|source| {
        StartupError::Snapshot {
            path: displays_path,
            source,
        }
    })?;

    let dispatcher = BatchDispatcher::new(
        TokioTimeProvider,
        twilio.clone(),
        slack,
        twilio,
        config.dispatch,
    );
    let menu_cache = MenuCache::default();
    maybe_start_menu_refresh(&config, &menu_cache);

    let state = state::AppState {
        config,
        subscribers: Arc::new(subscribers),
        displays: Arc::new(displays),
        dispatcher,
        menu: menu_cache,
    };

    Ok(Router::new()
        .route("/users", get(users::list_users).post(users::text_command))
        .route("/lunch", post(lunch::notify_lunch))
        .route("/menu", get(lunch::current_menu))
        .route("/display", post(displays::register_display))
        .route("/display/{room}", delete(displays::remove_display))
        .route("/health", get(health))
        .with_state(state))
}

fn maybe_start_menu_refresh(config: &config::AppConfig, cache: &MenuCache) {
    let Some(cater2me) = config.providers.cater2me.clone() else {
        info!("cater2me not configured, menu refresh disabled");
        return;
    };
    let schedule = config.providers.menu.schedule().unwrap_or_else(|err| {
        warn!(error = %err, "invalid menu schedule, using defaults");
        MenuSchedule::default()
    });
    let source = Cater2MeClient::new(Some(cater2me), schedule.offset);
    menu::spawn_refresh(TokioTimeProvider, source, cache.clone(), schedule);
}

pub(crate) async fn health() -> &'static str {
    "ok"
}
