use crate::config::Cater2MeConfig;
use crate::ports::{MenuError, MenuSource};
use crate::types::menu::{Menu, MenuItem};

use serde::Deserialize;
use std::pin::Pin;
use std::sync::Arc;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime, UtcOffset};

const BASE_URL: &str = "https://cater2.me/clients";

/// Reads today's catering order and its menu from Cater2Me.
#[derive(Clone)]
pub struct Cater2MeClient {
    config: Option<Arc<Cater2MeConfig>>,
    offset: UtcOffset,
    http: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct OrdersFeed {
    #[serde(default)]
    orders: Vec<Order>,
}

#[derive(Debug, Deserialize)]
struct Order {
    id: serde_json::Value,
    order_for: String,
}

#[derive(Debug, Deserialize)]
struct OrderDetailsResponse {
    order: Option<OrderDetails>,
}

#[derive(Debug, Deserialize)]
struct OrderDetails {
    vendor_name: Option<String>,
    vendor_image_timeline_url: Option<String>,
    office_name: Option<String>,
    #[serde(default)]
    menu_items: Vec<OrderItem>,
}

#[derive(Debug, Deserialize)]
struct OrderItem {
    #[serde(default)]
    item_display_name: String,
    item_notes: Option<String>,
    item_description: Option<String>,
}

impl Order {
    fn id(&self) -> String {
        match &self.id {
            serde_json::Value::String(id) => id.clone(),
            other => other.to_string(),
        }
    }
}

impl From<OrderDetails> for Menu {
    fn from(details: OrderDetails) -> Self {
        let items = details
            .menu_items
            .into_iter()
            .map(|item| {
                let notes = item
                    .item_notes
                    .filter(|notes| !notes.trim().is_empty())
                    .map(|notes| format!(" ({notes})"))
                    .unwrap_or_default();
                MenuItem {
                    item: format!("{}{notes}", item.item_display_name),
                    description: item.item_description,
                }
            })
            .collect();
        Menu {
            vendor: details.vendor_name.unwrap_or_else(|| "unknown".to_string()),
            vendor_image: details.vendor_image_timeline_url,
            office: details.office_name.unwrap_or_else(|| "unknown".to_string()),
            items,
        }
    }
}

impl Cater2MeClient {
    pub fn new(config: Option<Cater2MeConfig>, offset: UtcOffset) -> Self {
        Self {
            config: config.map(Arc::new),
            offset,
            http: super::provider_http_client(),
        }
    }

    async fn fetch_menu(&self, date: Date) -> Result<Menu, MenuError> {
        let config = self.config.as_ref().ok_or(MenuError::NotConfigured)?;
        let feed: OrdersFeed = self
            .http
            .get(format!(
                "{BASE_URL}/{}/calendars/orders_feed.json",
                config.client_id
            ))
            .query(&[
                ("cal_by_profile_ids", config.profile_ids.join(",")),
                ("cal_sort_by", "order_for".to_string()),
                ("cal_by_user_id", config.user_id.clone()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let order = find_order(&feed, date, self.offset).ok_or(MenuError::NoOrder(date))?;
        let order_id = order.id();
        let details: OrderDetailsResponse = self
            .http
            .get(format!(
                "{BASE_URL}/{}/calendars/order_details.json",
                config.client_id
            ))
            .query(&[("order_id", order_id.as_str())])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let details = details.order.ok_or(MenuError::NoMenu(order_id))?;
        Ok(Menu::from(details))
    }
}

impl MenuSource for Cater2MeClient {
    type Fut<'a>
        = Pin<Box<dyn Future<Output = Result<Menu, MenuError>> + Send + 'a>>
    where
        Self: 'a;

    fn fetch(&self, date: Date) -> Self::Fut<'_> {
        Box::pin(self.fetch_menu(date))
    }
}

fn find_order(feed: &OrdersFeed, date: Date, offset: UtcOffset) -> Option<&Order> {
    feed.orders
        .iter()
        .find(|order| order_date(&order.order_for, offset) == Some(date))
}

/// `order_for` is either a full timestamp or starts with a plain date.
fn order_date(raw: &str, offset: UtcOffset) -> Option<Date> {
    if let Ok(at) = OffsetDateTime::parse(raw, &Rfc3339) {
        return Some(at.to_offset(offset).date());
    }
    let day = raw.get(..10)?;
    Date::parse(day, format_description!("[year]-[month]-[day]")).ok()
}

#[cfg(test)]
#[allow(non_snake_case)]
mod tests {
    use super::*;
    use time::macros::{date, offset};

    #[test]
    fn find_order__should_match_order_on_local_date() {
        // Given
        let feed: OrdersFeed = serde_json::from_str(
            r#"{ "orders": [
                { "id": 11, "order_for": "2025-01-12T12:00:00-08:00" },
                { "id": 12, "order_for": "2025-01-13T12:00:00-08:00" },
                { "id": "13", "order_for": "2025-01-14" }
            ] }"#,
        )
        .expect("parse feed");

        // When
        let monday = find_order(&feed, date!(2025 - 01 - 13), offset!(-8));
        let tuesday = find_order(&feed, date!(2025 - 01 - 14), offset!(-8));
        let friday = find_order(&feed, date!(2025 - 01 - 17), offset!(-8));

        // Then
        assert_eq!(monday.expect("monday order").id(), "12");
        assert_eq!(tuesday.expect("tuesday order").id(), "13");
        assert!(friday.is_none());
    }

    #[test]
    fn order_date__should_convert_timestamp_into_offset() {
        // 03:00 UTC is still the previous evening in -08:00
        assert_eq!(
            order_date("2025-01-14T03:00:00Z", offset!(-8)),
            Some(date!(2025 - 01 - 13))
        );
        assert_eq!(order_date("garbage", offset!(-8)), None);
    }

    #[test]
    fn menu_from_details__should_apply_defaults_and_notes() {
        // Given
        let response: OrderDetailsResponse = serde_json::from_str(
            r#"{ "order": {
                "vendor_image_timeline_url": "https://img.example/v.png",
                "menu_items": [
                    { "item_display_name": "Carnitas", "item_notes": "GF", "item_description": "Pork" },
                    { "item_display_name": "Rice", "item_notes": "" }
                ]
            } }"#,
        )
        .expect("parse details");

        // When
        let menu = Menu::from(response.order.expect("order"));

        // Then
        assert_eq!(menu.vendor, "unknown");
        assert_eq!(menu.office, "unknown");
        assert_eq!(menu.vendor_image.as_deref(), Some("https://img.example/v.png"));
        assert_eq!(menu.items[0].item, "Carnitas (GF)");
        assert_eq!(menu.items[0].description.as_deref(), Some("Pork"));
        assert_eq!(menu.items[1].item, "Rice");
    }

    #[tokio::test]
    async fn fetch__should_fail_without_config() {
        let client = Cater2MeClient::new(None, offset!(-8));
        let result = client.fetch(date!(2025 - 01 - 13)).await;
        assert!(matches!(result, Err(MenuError::NotConfigured)));
    }
}
