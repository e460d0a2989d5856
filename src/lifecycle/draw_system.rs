use crate::clients::DrawClient;
use crate::config::EngineConfig;
use crate::engine::DrawContext;
use crate::error::DrawError;
use crate::notify::{Mailer, Notifier};
use crate::rng::DrawRng;
use crate::store::DrawStore;
use std::sync::Arc;
use store_actor::StoreActor;
use tokio::task::JoinHandle;
use tracing::{error, info};

/// The running draw engine.
///
/// `DrawSystem` owns the actor tasks:
/// - **Store actor**: holds the [`DrawStore`] and runs every command as a transaction
/// - **Mailer actor**: delivers notifications released by committed commands
///
/// # Example
///
/// ```ignore
/// let system = DrawSystem::new(EngineConfig::from_env()?);
/// let draw = system.client.create_draw(params).await?;
/// system.shutdown().await?;
/// ```
pub struct DrawSystem {
    /// Client for the store actor.
    pub client: DrawClient,

    store_handle: JoinHandle<()>,
    mailer_handle: Option<JoinHandle<u64>>,
}

impl DrawSystem {
    /// Starts the store actor and a mailer actor.
    pub fn new(config: EngineConfig) -> Self {
        let (mailer, mailer_client) = Mailer::new();
        let mailer_handle = tokio::spawn(mailer.run());
        let mut system = Self::start(config, Arc::new(mailer_client));
        system.mailer_handle = Some(mailer_handle);
        system
    }

    /// Starts the store actor with a caller-supplied notifier and no mailer.
    pub fn with_notifier(config: EngineConfig, notifier: Arc<dyn Notifier>) -> Self {
        Self::start(config, notifier)
    }

    fn start(config: EngineConfig, notifier: Arc<dyn Notifier>) -> Self {
        let rng = match config.rng_seed {
            Some(seed) => DrawRng::from_seed(seed),
            None => DrawRng::from_entropy(),
        };
        let context = DrawContext::new(rng, config.policy, notifier);
        let (actor, store_client) = StoreActor::new(DrawStore::new(), config.buffer_size);
        let store_handle = tokio::spawn(actor.run(context));
        info!(
            buffer_size = config.buffer_size,
            seeded = config.rng_seed.is_some(),
            "Draw system started"
        );

        Self {
            client: DrawClient::new(store_client),
            store_handle,
            mailer_handle: None,
        }
    }

    /// Stops every actor and waits for them.
    ///
    /// Dropping the client closes the store's channel. The store's context (and the mailer
    /// client inside it) goes with the store task, which in turn ends the mailer.
    pub async fn shutdown(self) -> Result<(), DrawError> {
        info!("Shutting down draw system...");
        drop(self.client);

        if let Err(e) = self.store_handle.await {
            error!(error = ?e, "Store task failed");
            return Err(DrawError::Store(format!("store task failed: {e}")));
        }
        if let Some(handle) = self.mailer_handle {
            match handle.await {
                Ok(delivered) => info!(delivered, "Mailer drained"),
                Err(e) => {
                    error!(error = ?e, "Mailer task failed");
                    return Err(DrawError::Store(format!("mailer task failed: {e}")));
                }
            }
        }

        info!("Draw system shutdown complete.");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::*;

    #[tokio::test]
    async fn test_mailer_receives_every_notification_of_a_large_commit() {
        let config = EngineConfig {
            buffer_size: 1,
            ..EngineConfig::default()
        };
        let system = DrawSystem::new(config);
        let client = &system.client;

        let draw = client
            .create_draw(DrawCreate {
                name: "Winter".into(),
                allow_clipping: false,
            })
            .await
            .unwrap();
        let mut students = Vec::new();
        for n in 0..70 {
            let user = client
                .create_user(UserCreate::student(format!("Student {n}"), Intent::OnCampus))
                .await
                .unwrap();
            client.add_student_to_draw(draw, user).await.unwrap();
            let suite = client
                .create_suite(SuiteCreate::singles("Hall", n.to_string(), 1))
                .await
                .unwrap();
            client.add_suite_to_draw(draw, suite).await.unwrap();
            students.push(user);
        }
        client.advance_phase(draw).await.unwrap();
        for user in students {
            client
                .create_group(GroupCreate {
                    leader: user,
                    size: 1,
                    invite: vec![],
                })
                .await
                .unwrap();
        }

        // One commit, 70 disband notices.
        client.archive_draw(draw).await.unwrap();

        let DrawSystem {
            client,
            store_handle,
            mailer_handle,
        } = system;
        drop(client);
        store_handle.await.unwrap();
        let delivered = mailer_handle.unwrap().await.unwrap();
        assert_eq!(delivered, 70 + 70);
    }
}
