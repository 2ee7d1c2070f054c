pub mod backoff;
pub mod decoder;
pub mod dispatcher;
pub mod gateway;
pub mod router;
pub mod subscriber_service;
pub mod supervisor;

pub use backoff::Backoff;
pub use decoder::Payload;
pub use dispatcher::{DispatchOutcome, Dispatcher, DropReason};
pub use gateway::PersistenceGateway;
pub use router::{MessageKind, Route, RoutedMessage, TopicRouter};
pub use subscriber_service::SubscriberService;
pub use supervisor::{SessionState, Supervisor};
