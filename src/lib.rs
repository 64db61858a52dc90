#![forbid(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::todo)]
#![warn(clippy::panic)]
#![warn(clippy::dbg_macro)]
#![warn(clippy::print_stdout)]
#![warn(clippy::print_stderr)]
#![warn(clippy::clone_on_ref_ptr)]
#![warn(unreachable_pub)]
#![warn(missing_debug_implementations)]
#![warn(unused_qualifications)]
#![deny(unused_must_use)]

pub mod adapters;
pub mod api;
pub mod config;
pub mod domain;
pub mod error;
pub mod services;
pub mod telemetry;

use crate::adapters::database::user_repo::PgUserStore;
use crate::adapters::memory::MemoryUserStore;
use crate::api::ServiceContainer;
use crate::config::{Config, StorageBackend};
use crate::services::exercise_service::ExerciseService;
use crate::services::health_service::HealthService;
use crate::services::registration_service::RegistrationService;
use crate::services::user_store::UserStore;
use anyhow::Context;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

/// Fully wired application components, ready to be mounted on routers.
#[derive(Debug)]
pub struct App {
    pub services: ServiceContainer,
    pub health_service: HealthService,
}

/// Wires services around a single shared record store.
#[derive(Debug)]
pub struct AppBuilder {
    config: Config,
    store: Option<Arc<dyn UserStore>>,
}

impl AppBuilder {
    #[must_use]
    pub const fn new(config: Config) -> Self {
        Self { config, store: None }
    }

    #[must_use]
    pub fn with_store(mut self, store: Arc<dyn UserStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Builds the application, connecting the configured store if none was supplied.
    ///
    /// # Errors
    /// Returns an error if the store cannot be connected or migrated.
    pub async fn build(self) -> anyhow::Result<App> {
        let store = match self.store {
            Some(store) => store,
            None => connect_store(&self.config).await?,
        };

        Ok(App {
            services: ServiceContainer {
                registration_service: RegistrationService::new(Arc::clone(&store)),
                exercise_service: ExerciseService::new(Arc::clone(&store)),
            },
            health_service: HealthService::new(store),
        })
    }
}

/// Opens the record store selected by the configuration.
///
/// # Errors
/// Returns an error if the postgres store has no URL, cannot connect, or fails to migrate.
pub async fn connect_store(config: &Config) -> anyhow::Result<Arc<dyn UserStore>> {
    let policy = config.storage.default_entry_date;
    match config.storage.backend {
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory store; records will not survive a restart");
            Ok(Arc::new(MemoryUserStore::new(policy)))
        }
        StorageBackend::Postgres => {
            let url = config
                .database
                .url
                .as_deref()
                .context("EXERCISE_DATABASE_URL is required for the postgres store")?;
            let pool = adapters::database::init_pool(&config.database, url).await?;
            adapters::database::run_migrations(&pool).await?;
            Ok(Arc::new(PgUserStore::new(pool, policy)))
        }
    }
}

/// Routes panics through `tracing` before the default hook runs.
pub fn setup_panic_hook() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        tracing::error!(panic = %info, "Process panicked");
        default_hook(info);
    }));
}

/// Resolves `grace` after the shutdown flag turns `true`.
///
/// Never resolves if the sender is dropped without signalling.
pub async fn drain_deadline(mut shutdown_rx: watch::Receiver<bool>, grace: Duration) {
    if shutdown_rx.wait_for(|&s| s).await.is_err() {
        std::future::pending::<()>().await;
    }
    tokio::time::sleep(grace).await;
}

/// Flips `shutdown_tx` to `true` on SIGINT or SIGTERM.
pub fn spawn_signal_handler(shutdown_tx: watch::Sender<bool>) {
    tokio::spawn(async move {
        let ctrl_c = async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for Ctrl+C");
                std::future::pending::<()>().await;
            }
        };

        #[cfg(unix)]
        let terminate = async {
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(mut signal) => {
                    signal.recv().await;
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to listen for SIGTERM");
                    std::future::pending::<()>().await;
                }
            }
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            () = ctrl_c => {},
            () = terminate => {},
        }

        tracing::info!("Shutdown signal received");
        let _ = shutdown_tx.send(true);
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_drain_deadline_waits_for_signal_then_grace() {
        let (tx, rx) = watch::channel(false);
        let deadline = tokio::spawn(drain_deadline(rx, Duration::from_millis(200)));

        tokio::time::sleep(Duration::from_millis(300)).await;
        assert!(!deadline.is_finished(), "no signal yet");

        tx.send(true).unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!deadline.is_finished(), "still inside the grace period");

        tokio::time::timeout(Duration::from_secs(2), deadline).await.unwrap().unwrap();
    }
}
