pub mod gateway;
pub mod templates;

pub use gateway::{NotificationGateway, TwilioGateway};
pub use templates::NotificationTemplates;
