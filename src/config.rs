use std::env;

use chrono::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

/// Thresholds and windows shared by the throttle, budget and maintenance code.
#[derive(Debug, Clone)]
pub struct Policy {
    pub max_login_attempts: u32,
    pub lockout_minutes: i64,
    pub retention_days: i64,
    pub utc_offset_hours: i32,
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            max_login_attempts: 5,
            lockout_minutes: 30,
            retention_days: 30,
            utc_offset_hours: 9,
        }
    }
}

const MAX_LOCKOUT_MINUTES: i64 = 525_600;
const MAX_RETENTION_DAYS: i64 = 36_500;

impl Policy {
    /// Rejects values that would disable a guard or overflow chrono's
    /// `Duration` constructors.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.max_login_attempts == 0 {
            anyhow::bail!("MAX_LOGIN_ATTEMPTS must be at least 1");
        }
        if !(1..=MAX_LOCKOUT_MINUTES).contains(&self.lockout_minutes) {
            anyhow::bail!("LOCKOUT_MINUTES must be between 1 and {MAX_LOCKOUT_MINUTES}");
        }
        if !(1..=MAX_RETENTION_DAYS).contains(&self.retention_days) {
            anyhow::bail!("ORDER_RETENTION_DAYS must be between 1 and {MAX_RETENTION_DAYS}");
        }
        if !(-23..=23).contains(&self.utc_offset_hours) {
            anyhow::bail!("BUSINESS_UTC_OFFSET_HOURS must be between -23 and 23");
        }
        Ok(())
    }

    pub fn lockout_duration(&self) -> Duration {
        Duration::minutes(self.lockout_minutes)
    }

    pub fn retention(&self) -> Duration {
        Duration::days(self.retention_days)
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: Option<String>,
    pub backend: StoreBackend,
    pub host: String,
    pub port: u16,
    pub admin_api_key: Option<String>,
    pub cors_allow_origin: Option<String>,
    pub policy: Policy,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let backend = match env::var("STORE_BACKEND").as_deref() {
            Ok("memory") => StoreBackend::Memory,
            Ok("postgres") | Err(_) => StoreBackend::Postgres,
            Ok(other) => anyhow::bail!("unknown STORE_BACKEND {other}"),
        };
        let database_url = env::var("DATABASE_URL").ok();
        if backend == StoreBackend::Postgres && database_url.is_none() {
            anyhow::bail!("DATABASE_URL is required for the postgres store backend");
        }
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(3000);
        let admin_api_key = env::var("ADMIN_API_KEY").ok().filter(|k| !k.trim().is_empty());
        let cors_allow_origin = env::var("CORS_ALLOW_ORIGIN").ok();

        let defaults = Policy::default();
        let policy = Policy {
            max_login_attempts: env_or("MAX_LOGIN_ATTEMPTS", defaults.max_login_attempts),
            lockout_minutes: env_or("LOCKOUT_MINUTES", defaults.lockout_minutes),
            retention_days: env_or("ORDER_RETENTION_DAYS", defaults.retention_days),
            utc_offset_hours: env_or("BUSINESS_UTC_OFFSET_HOURS", defaults.utc_offset_hours),
        };
        policy.validate()?;

        Ok(Self {
            database_url,
            backend,
            host,
            port,
            admin_api_key,
            cors_allow_origin,
            policy,
        })
    }

    pub fn require_database_url(&self) -> anyhow::Result<&str> {
        self.database_url
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("DATABASE_URL is not set"))
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}
