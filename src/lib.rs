pub mod advisory;
pub mod api;
pub mod dispatch;
pub mod domain;
pub mod entities;
pub mod escalation;
pub mod metrics;
pub mod migrator;
pub mod notifications;
pub mod store;
pub mod telemetry;
pub mod triage;
pub mod worker;

pub use redis;
pub use sea_orm;
