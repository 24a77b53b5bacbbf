use std::time::Duration;

use time::OffsetDateTime;

use crate::ports;

mod cater2me;
mod json_store;
mod slack;
mod twilio;

pub use cater2me::Cater2MeClient;
pub use json_store::JsonFileStore;
pub use slack::SlackClient;
pub use twilio::TwilioClient;

/// Upper bound on any single provider request.
pub(crate) const PROVIDER_TIMEOUT: Duration = Duration::from_secs(10);

pub(crate) fn provider_http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(PROVIDER_TIMEOUT)
        .connect_timeout(PROVIDER_TIMEOUT)
        .build()
        .unwrap_or_default()
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TokioTimeProvider;

impl ports::TimeProvider for TokioTimeProvider {
    type Sleep<'a>
        = tokio::time::Sleep
    where
        Self: 'a;

    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }

    fn sleep<'a>(&'a self, duration: Duration) -> Self::Sleep<'a> {
        tokio::time::sleep(duration)
    }
}
