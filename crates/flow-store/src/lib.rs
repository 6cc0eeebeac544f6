pub mod config;
pub mod error;
pub mod memory;

#[cfg(feature = "postgres")]
pub mod pg;

pub use config::{init_dotenv, StoreConfig};
pub use error::StoreError;
pub use memory::InMemoryStore;

#[cfg(feature = "postgres")]
pub use pg::{build_pool, PgStore};
