pub mod stale_paths;
pub mod webhook;

pub use stale_paths::{StaleBatch, StalePaths};
pub use webhook::WebhookRevalidator;
