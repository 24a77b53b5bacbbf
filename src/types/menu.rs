use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Menu {
    pub vendor: String,
    pub vendor_image: Option<String>,
    pub office: String,
    pub items: Vec<MenuItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuItem {
    pub item: String,
    pub description: Option<String>,
}

impl fmt::Display for Menu {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let items: Vec<&str> = self.items.iter().map(|item| item.item.as_str()).collect();
        write!(
            f,
            "Menu {{ vendor: {}, office: {}, items: {} }}",
            self.vendor,
            self.office,
            items.join(", ")
        )
    }
}
