use serde::Serialize;

pub mod health;
pub mod stale_paths;
pub mod threads;

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}
