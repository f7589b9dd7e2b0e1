pub mod memory_store;
pub mod pg_store;
pub mod post_repository;
pub mod user_repository;

use thiserror::Error;

pub use memory_store::MemoryStore;
pub use pg_store::PgStore;
pub use post_repository::PostRepository;
pub use user_repository::UserRepository;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("postgres error: {0}")]
    Postgres(#[from] tokio_postgres::Error),
    #[error("pool error: {0}")]
    Pool(#[from] deadpool_postgres::PoolError),
}
