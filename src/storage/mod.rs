pub mod database;
pub mod in_memory;
pub mod query;
pub mod traits;

pub use database::DatabaseStorage;
pub use in_memory::InMemoryStorage;
pub use query::*;
pub use traits::Storage;
