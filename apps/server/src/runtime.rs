//! Process bootstrap: telemetry, service wiring, shutdown.

use anyhow::Result;
use parley_chats::{ChatEvent, MessageService, RoomService};
use parley_config::AppConfig;
use parley_database::initialize_database;
use parley_users::UserService;
use sqlx::SqlitePool;
use tokio::sync::broadcast;
use tracing::info;

pub mod telemetry {
    use anyhow::Result;
    use tracing::Level;
    use tracing_subscriber::{fmt::SubscriberBuilder, EnvFilter};

    pub fn init_tracing() -> Result<()> {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        let subscriber = SubscriberBuilder::default()
            .with_max_level(Level::INFO)
            .with_env_filter(env_filter)
            .finish();

        tracing::subscriber::set_global_default(subscriber)
            .map_err(|error| anyhow::anyhow!("failed to set tracing subscriber: {error}"))
    }
}

/// Capacity of the committed-event fanout channel
const EVENT_CHANNEL_CAPACITY: usize = 256;

#[derive(Clone)]
pub struct BackendServices {
    pub db_pool: SqlitePool,
    pub user_service: UserService,
    pub room_service: RoomService,
    pub message_service: MessageService,
    pub events: broadcast::Sender<ChatEvent>,
}

impl BackendServices {
    pub async fn initialise(config: &AppConfig) -> Result<Self> {
        let db_pool = initialize_database(&config.database).await?;

        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        let user_service = UserService::new(db_pool.clone(), &config.auth);
        let room_service = RoomService::new(db_pool.clone(), events.clone());
        let message_service = MessageService::new(db_pool.clone(), events.clone());

        info!("backend services initialised");

        Ok(Self {
            db_pool,
            user_service,
            room_service,
            message_service,
            events,
        })
    }
}

pub async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::warn!(?error, "failed to listen for shutdown signal");
    }
    info!("shutdown signal received");
}
