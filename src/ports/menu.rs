use crate::types::menu::Menu;

use time::Date;

#[derive(Debug, thiserror::Error)]
pub enum MenuError {
    #[error("menu source is not configured")]
    NotConfigured,
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("no order found for {0}")]
    NoOrder(Date),
    #[error("no menu found for order {0}")]
    NoMenu(String),
}

pub trait MenuSource: Clone + Send + Sync + 'static {
    type Fut<'a>: Future<Output = Result<Menu, MenuError>> + Send + 'a
    where
        Self: 'a;

    fn fetch(&self, date: Date) -> Self::Fut<'_>;
}
