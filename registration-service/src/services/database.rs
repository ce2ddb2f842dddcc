use crate::config::MongoConfig;
use crate::models::User;
use crate::services::store::{StoreError, UserStore};
use async_trait::async_trait;
use dashmap::DashSet;
use mongodb::{
    bson::doc,
    error::{ErrorKind, WriteFailure},
    event::sdam::{
        SdamEventHandler, ServerClosedEvent, ServerHeartbeatFailedEvent,
        ServerHeartbeatSucceededEvent,
    },
    options::{ClientOptions, IndexOptions, ServerAddress, ServerApi, ServerApiVersion},
    Client as MongoClient, Collection, IndexModel,
};
use secrecy::ExposeSecret;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

const DUPLICATE_KEY_CODE: i32 = 11000;
const EMAIL_INDEX_NAME: &str = "email_unique";

/// Tracks which servers the driver's monitors currently reach.
///
/// Heartbeats run on the driver's background monitors, so readers only ever
/// see the latest observed topology state.
pub struct ConnectivityMonitor {
    reachable: DashSet<ServerAddress>,
    state: watch::Sender<bool>,
}

impl ConnectivityMonitor {
    fn new() -> Self {
        let (state, _) = watch::channel(false);
        Self {
            reachable: DashSet::new(),
            state,
        }
    }

    fn publish(&self) {
        let connected = !self.reachable.is_empty();
        self.state.send_if_modified(|current| {
            if *current != connected {
                *current = connected;
                true
            } else {
                false
            }
        });
    }

    pub fn is_connected(&self) -> bool {
        *self.state.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.state.subscribe()
    }
}

impl SdamEventHandler for ConnectivityMonitor {
    fn handle_server_heartbeat_succeeded_event(&self, event: ServerHeartbeatSucceededEvent) {
        self.reachable.insert(event.server_address);
        self.publish();
    }

    fn handle_server_heartbeat_failed_event(&self, event: ServerHeartbeatFailedEvent) {
        tracing::debug!(server = %event.server_address, error = %event.failure, "MongoDB heartbeat failed");
        self.reachable.remove(&event.server_address);
        self.publish();
    }

    fn handle_server_closed_event(&self, event: ServerClosedEvent) {
        self.reachable.remove(&event.address);
        self.publish();
    }
}

pub struct MongoUserStore {
    client: MongoClient,
    users: Collection<User>,
    monitor: Arc<ConnectivityMonitor>,
    operation_timeout: Duration,
    closed: AtomicBool,
}

impl MongoUserStore {
    /// Connects and proves reachability with a `ping` bounded by
    /// `config.connect_timeout`.
    pub async fn connect(config: &MongoConfig) -> Result<Self, StoreError> {
        tracing::info!(database = %config.database, "Connecting to MongoDB");

        let mut options = ClientOptions::parse(config.uri.expose_secret())
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;
        options.app_name = Some(crate::config::SERVICE_NAME.to_string());
        options.connect_timeout = Some(config.connect_timeout);
        options.server_selection_timeout = Some(config.connect_timeout);
        options.server_api = Some(
            ServerApi::builder()
                .version(ServerApiVersion::V1)
                .strict(true)
                .deprecation_errors(true)
                .build(),
        );

        let monitor = Arc::new(ConnectivityMonitor::new());
        options.sdam_event_handler = Some(monitor.clone() as Arc<dyn SdamEventHandler>);

        let client = MongoClient::with_options(options)
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        tokio::time::timeout(
            config.connect_timeout,
            client.database("admin").run_command(doc! { "ping": 1 }, None),
        )
        .await
        .map_err(|_| {
            StoreError::Connection(format!("no response within {:?}", config.connect_timeout))
        })?
        .map_err(|e| StoreError::Connection(e.to_string()))?;

        let users = client
            .database(&config.database)
            .collection::<User>(&config.collection);

        tracing::info!(database = %config.database, "Successfully connected to MongoDB database");

        Ok(Self {
            client,
            users,
            monitor,
            operation_timeout: config.operation_timeout,
            closed: AtomicBool::new(false),
        })
    }

    /// Creates the unique index that makes concurrent duplicate inserts fail
    /// deterministically.
    pub async fn ensure_indexes(&self) -> Result<(), StoreError> {
        let email_index = IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(
                IndexOptions::builder()
                    .name(EMAIL_INDEX_NAME.to_string())
                    .unique(true)
                    .build(),
            )
            .build();

        self.bounded(self.users.create_index(email_index, None))
            .await?
            .map_err(|e| {
                tracing::error!("Failed to create unique email index on users collection: {}", e);
                StoreError::Write(e)
            })?;
        tracing::info!("Created unique index on users.email");

        Ok(())
    }

    pub fn connectivity(&self) -> watch::Receiver<bool> {
        self.monitor.subscribe()
    }

    pub fn client(&self) -> &MongoClient {
        &self.client
    }

    async fn bounded<T, F>(&self, operation: F) -> Result<mongodb::error::Result<T>, StoreError>
    where
        F: Future<Output = mongodb::error::Result<T>>,
    {
        tokio::time::timeout(self.operation_timeout, operation)
            .await
            .map_err(|_| StoreError::Timeout(self.operation_timeout))
    }
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    matches!(
        err.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(write_error))
            if write_error.code == DUPLICATE_KEY_CODE
    )
}

#[async_trait]
impl UserStore for MongoUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        self.bounded(self.users.find_one(doc! { "email": email }, None))
            .await?
            .map_err(StoreError::Query)
    }

    async fn insert(&self, user: User) -> Result<Option<String>, StoreError> {
        let result = self
            .bounded(self.users.insert_one(user, None))
            .await?
            .map_err(|e| {
                if is_duplicate_key(&e) {
                    StoreError::Duplicate("email")
                } else {
                    StoreError::Write(e)
                }
            })?;

        Ok(result.inserted_id.as_object_id().map(|id| id.to_hex()))
    }

    fn is_connected(&self) -> bool {
        !self.closed.load(Ordering::SeqCst) && self.monitor.is_connected()
    }

    async fn close(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        tracing::info!("Closing MongoDB connection");
        self.client.clone().shutdown().await;
    }
}

/// Logs connectivity transitions until the store is dropped.
pub async fn watch_connectivity(mut connectivity: watch::Receiver<bool>) -> anyhow::Result<()> {
    while connectivity.changed().await.is_ok() {
        if *connectivity.borrow_and_update() {
            tracing::info!("MongoDB connection established");
        } else {
            tracing::warn!("MongoDB connection lost; driver will keep retrying");
        }
    }
    Ok(())
}
