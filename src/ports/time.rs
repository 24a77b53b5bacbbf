use std::time::Duration;

use time::OffsetDateTime;

/// Clock seam for batch cooldowns and the weekday menu refresh. Tests swap in
/// a manual clock whose sleeps resolve only when triggered.
pub trait TimeProvider: Clone + Send + Sync + 'static {
    type Sleep<'a>: Future<Output = ()> + Send + 'a
    where
        Self: 'a;

    fn now(&self) -> OffsetDateTime;
    fn sleep<'a>(&'a self, duration: Duration) -> Self::Sleep<'a>;
}
