use std::future::Future;
use std::sync::Arc;

use crate::configs::{SchemaManager, Settings, Storage};
use crate::errors::BridgeError;
use crate::services::{Dispatcher, SubscriberService, TopicRouter};

pub mod configs;
pub mod errors;
pub mod models;
pub mod repositories;
pub mod services;

/// Connects storage, then keeps the broker session alive until `shutdown`
/// resolves or the session fails fatally.
pub async fn run<F>(settings: &Arc<Settings>, shutdown: F) -> Result<(), BridgeError>
where
    F: Future<Output = ()>,
{
    tracing::info!(
        "broker {}:{}, database {}, namespace {}",
        settings.broker.host,
        settings.broker.port,
        settings.database.url,
        settings.topic.namespace
    );

    let storage = Arc::new(
        Storage::new(settings.database.clone(), SchemaManager::default())
            .await
            .inspect_err(|e| tracing::error!("cannot connect to database: {}", e))?,
    );

    tracing::info!("database ok");

    let router = TopicRouter::new(&settings.topic);
    let subscriber = SubscriberService::new(&settings.broker, router.subscription());
    let dispatcher = Dispatcher::new(router, storage.clone());

    let result = subscriber.run(&dispatcher, shutdown).await;

    storage.close().await;

    Ok(result?)
}
