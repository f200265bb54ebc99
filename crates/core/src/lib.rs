pub mod domain;
pub mod error;
pub mod revalidate;
pub mod store;
pub mod types;
