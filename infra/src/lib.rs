//! # Infrastructure Layer
//!
//! Concrete implementations of the QuickSign core contracts:
//!
//! - **Cache**: Redis-backed and in-memory [`CacheStore`](qs_core::CacheStore)s
//! - **SMS**: provider trait, mock provider, and the queued delivery worker
//!   behind [`CodeDelivery`](qs_core::CodeDelivery)
//! - **Logging**: `tracing` subscriber setup from the logging configuration

use std::sync::Arc;

use qs_core::CacheStore;
use qs_shared::config::{AppConfig, CacheType};
use tokio::task::JoinHandle;

pub mod cache;
pub mod logging;
pub mod sms;

pub use cache::{MemoryCacheStore, RedisCacheStore, RedisClient};
pub use logging::init_tracing;
pub use sms::{create_sms_service, MockSmsService, SmsDeliveryQueue, SmsDeliveryWorker, SmsService};

/// Shared handles built at startup
pub struct InfrastructureServices {
    /// Cache store shared by every service
    pub cache: Arc<dyn CacheStore>,
    /// Queue verification codes are handed to
    pub delivery: Arc<SmsDeliveryQueue>,
    /// Background task draining the delivery queue
    pub delivery_worker: JoinHandle<()>,
}

/// Initialize infrastructure services
///
/// Connects the configured cache store and starts the SMS delivery worker
/// on the current runtime.
pub async fn initialize(config: &AppConfig) -> Result<InfrastructureServices, InfrastructureError> {
    tracing::info!(
        environment = %config.environment,
        cache_type = ?config.cache.cache_type,
        sms_provider = %config.sms.provider,
        "Initializing infrastructure services..."
    );

    let cache: Arc<dyn CacheStore> = match config.cache.cache_type {
        CacheType::Redis => {
            let client = RedisClient::new(config.cache.clone()).await?;
            Arc::new(RedisCacheStore::new(client))
        }
        CacheType::Memory => {
            if config.environment.is_production() {
                tracing::warn!("In-memory cache store is not shared between workers");
            }
            Arc::new(MemoryCacheStore::new())
        }
    };

    let sms = create_sms_service(&config.sms);
    let (queue, worker) = SmsDeliveryQueue::channel(sms, &config.sms, config.otp.code_ttl_minutes());
    let delivery_worker = worker.spawn();

    tracing::info!("Infrastructure services initialized successfully");

    Ok(InfrastructureServices {
        cache,
        delivery: Arc::new(queue),
        delivery_worker,
    })
}

/// Load configuration, install logging and initialize infrastructure
pub async fn bootstrap() -> anyhow::Result<(AppConfig, InfrastructureServices)> {
    use anyhow::Context;

    let config = AppConfig::load().context("Failed to load configuration")?;
    init_tracing(&config.logging).context("Failed to initialize logging")?;
    let services = initialize(&config)
        .await
        .context("Failed to initialize infrastructure")?;

    Ok((config, services))
}

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// Redis cache error
    #[error("Cache error: {0}")]
    Cache(#[from] redis::RedisError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// SMS service error
    #[error("SMS service error: {0}")]
    Sms(String),

    /// General infrastructure error
    #[error("Infrastructure error: {0}")]
    General(String),
}
