pub mod bridge;
pub mod message;
pub mod session;
pub mod storage;

pub use bridge::BridgeError;
pub use message::MessageError;
pub use session::SessionError;
pub use storage::StorageError;
