use std::time::Duration;

use anyhow::Context;

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
}

/// Argon2id work factor.
#[derive(Debug, Clone)]
pub struct HashingConfig {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for HashingConfig {
    fn default() -> Self {
        Self {
            memory_kib: argon2::Params::DEFAULT_M_COST,
            iterations: argon2::Params::DEFAULT_T_COST,
            parallelism: argon2::Params::DEFAULT_P_COST,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

impl std::str::FromStr for StoreBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "pg" => Ok(Self::Postgres),
            "memory" | "mem" => Ok(Self::Memory),
            other => anyhow::bail!("unknown USER_STORE backend: {other}"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub store: StoreBackend,
    pub database_url: Option<String>,
    pub max_connections: u32,
    pub jwt: JwtConfig,
    pub hashing: HashingConfig,
    pub cookie_secure: bool,
    pub store_timeout: Duration,
    pub hash_timeout: Duration,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let store = match std::env::var("USER_STORE") {
            Ok(v) => v.parse()?,
            Err(_) => StoreBackend::Postgres,
        };
        let database_url = std::env::var("DATABASE_URL").ok();
        if store == StoreBackend::Postgres && database_url.is_none() {
            anyhow::bail!("DATABASE_URL must be set when USER_STORE=postgres");
        }

        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET").context("JWT_SECRET must be set")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "chatauth".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "chatauth-users".into()),
            ttl_minutes: check_ttl(env_parse("JWT_TTL_MINUTES").unwrap_or(60 * 24 * 7))?,
        };

        let defaults = HashingConfig::default();
        let hashing = HashingConfig {
            memory_kib: env_parse("HASH_MEMORY_KIB").unwrap_or(defaults.memory_kib),
            iterations: env_parse("HASH_ITERATIONS").unwrap_or(defaults.iterations),
            parallelism: env_parse("HASH_PARALLELISM").unwrap_or(defaults.parallelism),
        };

        Ok(Self {
            store,
            database_url,
            max_connections: env_parse("DATABASE_MAX_CONNECTIONS").unwrap_or(10),
            jwt,
            hashing,
            cookie_secure: env_parse("COOKIE_SECURE").unwrap_or(true),
            store_timeout: Duration::from_millis(env_parse("STORE_TIMEOUT_MS").unwrap_or(5_000)),
            hash_timeout: Duration::from_millis(env_parse("HASH_TIMEOUT_MS").unwrap_or(5_000)),
        })
    }
}

/// Token lifetime must be positive and fit in seconds.
fn check_ttl(minutes: i64) -> anyhow::Result<i64> {
    if minutes <= 0 {
        anyhow::bail!("JWT_TTL_MINUTES must be positive, got {minutes}");
    }
    minutes
        .checked_mul(60)
        .context("JWT_TTL_MINUTES is too large")?;
    Ok(minutes)
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse::<T>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_backend_parses_known_names() {
        assert_eq!("postgres".parse::<StoreBackend>().unwrap(), StoreBackend::Postgres);
        assert_eq!(" Memory ".parse::<StoreBackend>().unwrap(), StoreBackend::Memory);
        assert!("mongo".parse::<StoreBackend>().is_err());
    }

    #[test]
    fn ttl_must_be_positive_and_bounded() {
        assert_eq!(check_ttl(60).unwrap(), 60);
        assert!(check_ttl(0).is_err());
        assert!(check_ttl(-5).is_err());
        assert!(check_ttl(i64::MAX).is_err());
    }

    #[test]
    fn hashing_defaults_match_argon2() {
        let cfg = HashingConfig::default();
        assert_eq!(cfg.memory_kib, argon2::Params::DEFAULT_M_COST);
        assert_eq!(cfg.iterations, argon2::Params::DEFAULT_T_COST);
    }
}
