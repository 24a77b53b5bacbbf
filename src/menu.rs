use crate::ports::{MenuSource, TimeProvider};
use crate::types::menu::Menu;

use std::sync::{Arc, RwLock};
use std::time::Duration;
use time::{OffsetDateTime, Time, UtcOffset, Weekday};
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Latest fetched menu. Only the refresh job writes it.
#[derive(Debug, Clone, Default)]
pub struct MenuCache {
    inner: Arc<RwLock<Option<Menu>>>,
}

impl MenuCache {
    pub fn current(&self) -> Option<Menu> {
        self.inner.read().expect("menu cache lock").clone()
    }

    fn replace(&self, menu: Option<Menu>) {
        *self.inner.write().expect("menu cache lock") = menu;
    }
}

/// Weekday refresh time, expressed in a fixed UTC offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuSchedule {
    pub hour: u8,
    pub offset: UtcOffset,
}

impl Default for MenuSchedule {
    fn default() -> Self {
        Self {
            hour: 8,
            offset: UtcOffset::from_hms(-8, 0, 0).unwrap_or(UtcOffset::UTC),
        }
    }
}

/// Next weekday at `schedule.hour:00` strictly after `now`.
pub fn next_refresh(now: OffsetDateTime, schedule: MenuSchedule) -> OffsetDateTime {
    let local = now.to_offset(schedule.offset);
    let at = Time::from_hms(schedule.hour.min(23), 0, 0).unwrap_or(Time::MIDNIGHT);
    let mut candidate = local.replace_time(at);
    if candidate <= local {
        candidate += time::Duration::days(1);
    }
    while matches!(candidate.weekday(), Weekday::Saturday | Weekday::Sunday) {
        candidate += time::Duration::days(1);
    }
    candidate
}

fn compute_delay<T: TimeProvider>(time: &T, at: OffsetDateTime) -> Option<Duration> {
    let delay = at - time.now();
    if delay.is_positive() {
        match delay.try_into() {
            Ok(std_delay) => Some(std_delay),
            Err(_) => Some(Duration::MAX),
        }
    } else {
        None
    }
}

/// Fetches today's menu into `cache`. A failed fetch clears the cache so a
/// previous day's vendor is never announced.
pub async fn refresh_once<T, M>(time: &T, source: &M, cache: &MenuCache, schedule: MenuSchedule)
where
    T: TimeProvider,
    M: MenuSource,
{
    let today = time.now().to_offset(schedule.offset).date();
    match source.fetch(today).await {
        Ok(menu) => {
            info!(%menu, "menu refreshed");
            cache.replace(Some(menu));
        }
        Err(err) => {
            warn!(error = %err, %today, "failed to load menu");
            cache.replace(None);
        }
    }
}

/// Refreshes once immediately, then every weekday at the scheduled hour.
pub fn spawn_refresh<T, M>(
    time: T,
    source: M,
    cache: MenuCache,
    schedule: MenuSchedule,
) -> JoinHandle<()>
where
    T: TimeProvider,
    M: MenuSource,
{
    tokio::spawn(async move {
        loop {
            refresh_once(&time, &source, &cache, schedule).await;
            let next = next_refresh(time.now(), schedule);
            info!(%next, "next menu refresh scheduled");
            if let Some(delay) = compute_delay(&time, next) {
                time.sleep(delay).await;
            }
        }
    })
}
