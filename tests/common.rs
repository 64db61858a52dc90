#![allow(dead_code)]
use exercise_tracker::adapters::memory::MemoryUserStore;
use exercise_tracker::api::{MgmtState, app_router, mgmt_router};
use exercise_tracker::config::{Config, StorageBackend};
use exercise_tracker::AppBuilder;
use reqwest::header::CONTENT_TYPE;
use std::sync::{Arc, Once};
use tokio::net::TcpListener;

static INIT: Once = Once::new();

pub fn setup_tracing() {
    INIT.call_once(|| {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "warn".into())
            .add_directive("exercise_tracker=debug".parse().unwrap())
            .add_directive("tower=warn".parse().unwrap())
            .add_directive("hyper=warn".parse().unwrap())
            .add_directive("reqwest=warn".parse().unwrap());

        let _ = tracing_subscriber::fmt().with_env_filter(filter).with_test_writer().try_init();
    });
}

pub fn get_test_config() -> Config {
    let mut config = Config::default();
    config.server.host = "127.0.0.1".to_string();
    config.server.port = 0;
    config.server.mgmt_port = 0;
    config.storage.backend = StorageBackend::Memory;
    config
}

pub fn generate_username(prefix: &str) -> String {
    format!("{prefix}_{}", &uuid::Uuid::new_v4().simple().to_string()[..8])
}

/// Encodes `fields` as an `application/x-www-form-urlencoded` body.
/// Values must not need percent-encoding beyond spaces.
pub fn form_body(fields: &[(&str, &str)]) -> String {
    fields.iter().map(|(k, v)| format!("{k}={}", v.replace(' ', "+"))).collect::<Vec<_>>().join("&")
}

#[derive(Debug)]
pub struct TestUser {
    pub user_id: String,
    pub username: String,
}

pub struct TestApp {
    pub server_url: String,
    pub mgmt_url: String,
    pub client: reqwest::Client,
    pub config: Config,
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with_config(get_test_config()).await
    }

    pub async fn spawn_with_config(config: Config) -> Self {
        setup_tracing();

        let store = Arc::new(MemoryUserStore::new(config.storage.default_entry_date));
        let app = AppBuilder::new(config.clone()).with_store(store).build().await.unwrap();

        let router = app_router(config.clone(), app.services);
        let mgmt = mgmt_router(MgmtState { health_service: app.health_service });

        let listener = TcpListener::bind(format!("{}:{}", config.server.host, config.server.port)).await.unwrap();
        let server_url = format!("http://{}", listener.local_addr().unwrap());
        let mgmt_listener =
            TcpListener::bind(format!("{}:{}", config.server.host, config.server.mgmt_port)).await.unwrap();
        let mgmt_url = format!("http://{}", mgmt_listener.local_addr().unwrap());

        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        tokio::spawn(async move {
            axum::serve(mgmt_listener, mgmt).await.unwrap();
        });

        Self { server_url, mgmt_url, client: reqwest::Client::new(), config }
    }

    pub async fn post_form(&self, path: &str, fields: &[(&str, &str)]) -> reqwest::Response {
        self.client
            .post(format!("{}{path}", self.server_url))
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(form_body(fields))
            .send()
            .await
            .unwrap()
    }

    pub async fn register_user(&self, username: &str) -> TestUser {
        let resp = self.post_form("/api/exercise/new-user", &[("username", username)]).await;
        assert_eq!(resp.status(), reqwest::StatusCode::CREATED);

        let json: serde_json::Value = resp.json().await.unwrap();
        TestUser {
            user_id: json["_id"].as_str().unwrap().to_string(),
            username: json["username"].as_str().unwrap().to_string(),
        }
    }

    pub async fn add_exercise(&self, fields: &[(&str, &str)]) -> reqwest::Response {
        self.post_form("/api/exercise/add", fields).await
    }

    pub async fn get_log(&self, user_id: &str) -> reqwest::Response {
        self.client.get(format!("{}/api/exercise/log?userId={user_id}", self.server_url)).send().await.unwrap()
    }
}
