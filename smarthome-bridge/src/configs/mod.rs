mod schema;
mod settings;
mod storage;

pub use schema::SchemaManager;
pub use settings::{Broker, Database, Logger, Reconnect, Settings, Topic};
pub use storage::Storage;
