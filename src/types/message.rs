use crate::types::menu::Menu;

use serde::Serialize;

const SLACK_HEADLINE: &str = "*Lunch has arrived!*";
const TEXT_HEADLINE: &str = "Lunch has arrived!";

/// Payload of one dispatch, rendered once and shared by every send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LunchMessage {
    pub headline: String,
    pub text: String,
    pub attachments: Vec<SlackAttachment>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlackAttachment {
    pub title: String,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl LunchMessage {
    pub fn from_menu(menu: Option<&Menu>) -> Self {
        let Some(menu) = menu else {
            return Self {
                headline: SLACK_HEADLINE.to_string(),
                text: TEXT_HEADLINE.to_string(),
                attachments: Vec::new(),
            };
        };

        let items: Vec<String> = menu
            .items
            .iter()
            .map(|item| match item.description.as_deref() {
                Some(description) if !description.trim().is_empty() => {
                    format!("{}: {}", item.item, description.trim())
                }
                _ => item.item.clone(),
            })
            .collect();

        Self {
            headline: SLACK_HEADLINE.to_string(),
            text: format!("{TEXT_HEADLINE} Today's vendor is {}.", menu.vendor),
            attachments: vec![SlackAttachment {
                title: menu.vendor.clone(),
                text: items.join("\n"),
                image_url: menu.vendor_image.clone(),
            }],
        }
    }
}
