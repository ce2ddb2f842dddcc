#![allow(dead_code)]

use registration_service::config::MongoConfig;
use registration_service::services::{InMemoryUserStore, MongoUserStore, UserStore};
use registration_service::startup::Application;
use std::sync::Arc;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use uuid::Uuid;

pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub store: Arc<dyn UserStore>,
    pub memory: Option<Arc<InMemoryUserStore>>,
    pub mongo: Option<(mongodb::Client, String)>,
    shutdown: Option<oneshot::Sender<()>>,
    server: JoinHandle<anyhow::Result<()>>,
}

impl TestApp {
    /// Spawns the service on a random port against an in-memory store.
    pub async fn spawn() -> Self {
        let memory = Arc::new(InMemoryUserStore::new());
        let mut app = Self::spawn_with_store(memory.clone()).await;
        app.memory = Some(memory);
        app
    }

    /// Spawns the service against a throwaway MongoDB database.
    pub async fn spawn_with_mongo() -> Self {
        let uri = std::env::var("TEST_MONGODB_URI")
            .unwrap_or_else(|_| "mongodb://localhost:27017".to_string());
        let db_name = format!("registration_test_{}", Uuid::new_v4().simple());

        let store = MongoUserStore::connect(&MongoConfig::new(uri, db_name.clone()))
            .await
            .expect("Failed to connect to MongoDB");
        store
            .ensure_indexes()
            .await
            .expect("Failed to create indexes");
        let client = store.client().clone();

        let mut app = Self::spawn_with_store(Arc::new(store)).await;
        app.mongo = Some((client, db_name));
        app
    }

    async fn spawn_with_store(store: Arc<dyn UserStore>) -> Self {
        let app = Application::build_with_store(0, store.clone())
            .await
            .expect("Failed to build test application");

        let port = app.port();
        let address = format!("http://127.0.0.1:{}", port);
        let (tx, rx) = oneshot::channel::<()>();

        let server = tokio::spawn(app.run_until_stopped(async move {
            rx.await.ok();
        }));

        // Wait for HTTP server to be ready by polling health endpoint
        let client = reqwest::Client::new();
        let health_url = format!("{}/api/health", address);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
        }

        TestApp {
            address,
            port,
            store,
            memory: None,
            mongo: None,
            shutdown: Some(tx),
            server,
        }
    }

    pub fn memory(&self) -> &InMemoryUserStore {
        self.memory
            .as_deref()
            .expect("TestApp was not spawned with an in-memory store")
    }

    pub async fn register(&self, body: serde_json::Value) -> reqwest::Response {
        reqwest::Client::new()
            .post(format!("{}/api/register", self.address))
            .json(&body)
            .send()
            .await
            .expect("Failed to execute request")
    }

    /// Triggers graceful shutdown and waits for the server to stop.
    pub async fn stop(self) {
        // The store is closed by shutdown, so drop test data first.
        self.cleanup().await;

        let TestApp {
            shutdown, server, ..
        } = self;
        if let Some(tx) = shutdown {
            let _ = tx.send(());
        }
        server
            .await
            .expect("Server task panicked")
            .expect("Server returned an error");
    }

    /// Drops the throwaway database, if any.
    pub async fn cleanup(&self) {
        if let Some((client, db_name)) = &self.mongo {
            let _ = client.database(db_name).drop(None).await;
        }
    }
}
