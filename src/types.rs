pub mod menu;
pub mod message;
pub mod registry;
