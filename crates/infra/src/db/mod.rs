pub mod migrations;
pub mod pool;
pub mod threads_repo;

pub use migrations::run_migrations;
pub use pool::{connect_lazy, DbConnector, DbPool, DbPoolError};
pub use threads_repo::{PgThreadStore, ThreadsRepoError};
