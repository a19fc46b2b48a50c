use std::sync::Arc;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use tracing::info;

use crate::auth::{
    memory_repo::MemoryUserRepo,
    password::PasswordHasher,
    repo::{PgUserRepo, UserRepo},
};
use crate::config::{AppConfig, StoreBackend};

#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepo>,
    pub config: Arc<AppConfig>,
    pub hasher: PasswordHasher,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let users = match config.store {
            StoreBackend::Postgres => {
                let url = config
                    .database_url
                    .as_deref()
                    .context("DATABASE_URL must be set")?;
                let db = PgPoolOptions::new()
                    .max_connections(config.max_connections)
                    .acquire_timeout(config.store_timeout)
                    .connect(url)
                    .await
                    .context("connect to database")?;

                sqlx::migrate!("./migrations")
                    .run(&db)
                    .await
                    .context("run migrations")?;

                Arc::new(PgUserRepo::new(db)) as Arc<dyn UserRepo>
            }
            StoreBackend::Memory => {
                info!("using in-memory user store; data is lost on restart");
                Arc::new(MemoryUserRepo::new()) as Arc<dyn UserRepo>
            }
        };

        Self::from_parts(users, config)
    }

    pub fn from_parts(users: Arc<dyn UserRepo>, config: Arc<AppConfig>) -> anyhow::Result<Self> {
        let hasher = PasswordHasher::new(&config.hashing)?;
        Ok(Self {
            users,
            config,
            hasher,
        })
    }

    #[cfg(test)]
    pub fn fake(users: Arc<dyn UserRepo>) -> Self {
        use crate::config::{HashingConfig, JwtConfig};
        use std::time::Duration;

        let config = Arc::new(AppConfig {
            store: StoreBackend::Memory,
            database_url: None,
            max_connections: 1,
            jwt: JwtConfig {
                secret: "test".into(),
                issuer: "test-issuer".into(),
                audience: "test-aud".into(),
                ttl_minutes: 5,
            },
            hashing: HashingConfig {
                memory_kib: 256,
                iterations: 1,
                parallelism: 1,
            },
            cookie_secure: false,
            store_timeout: Duration::from_millis(200),
            hash_timeout: Duration::from_secs(5),
        });
        Self::from_parts(users, config).expect("test state")
    }
}
