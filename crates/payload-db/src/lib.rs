pub mod error;
pub mod file_data;
#[cfg(any(test, feature = "memory"))]
pub mod memory;
pub mod migrate;
pub mod store;
pub mod types;

pub use error::StoreError;
#[cfg(any(test, feature = "memory"))]
pub use memory::MemoryFileStore;
pub use sqlx::postgres::PgPool;
pub use store::{FileStore, PgFileStore};
pub use types::*;
