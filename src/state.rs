use crate::adapters::{JsonFileStore, SlackClient, TokioTimeProvider, TwilioClient};
use crate::config::AppConfig;
use crate::dispatch::BatchDispatcher;
use crate::menu::MenuCache;
use crate::registry::{DisplayRegistry, SubscriberRegistry};
use crate::types::registry::{DisplayMap, SubscriberMap};

use std::sync::Arc;

pub type Subscribers = SubscriberRegistry<TwilioClient, JsonFileStore<SubscriberMap>>;
pub type Displays = DisplayRegistry<JsonFileStore<DisplayMap>>;
pub type Dispatcher = BatchDispatcher<TokioTimeProvider, TwilioClient, SlackClient, TwilioClient>;

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub subscribers: Arc<Subscribers>,
    pub displays: Arc<Displays>,
    pub dispatcher: Dispatcher,
    pub menu: MenuCache,
}
