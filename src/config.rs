use std::env;
use std::str::FromStr;

use anyhow::{Context, Result, bail};
use chrono::FixedOffset;
use strum_macros::{Display, EnumString};

use crate::attendance::AttendancePolicy;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum StoreBackend {
    Mysql,
    Memory,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: Option<String>,
    pub jwt_secret: String,
    pub server_addr: String,
    pub log_dir: String,

    pub store_backend: StoreBackend,
    pub policy: AttendancePolicy,

    // Rate limiting
    pub rate_protected_per_min: u32,

    pub api_prefix: String,
}

fn var_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .parse()
            .map_err(|e| anyhow::anyhow!("{key}={raw:?} is invalid: {e}")),
        Err(_) => Ok(default),
    }
}

fn check_policy(policy: &AttendancePolicy) -> Result<()> {
    // A zero minimum would allow punch_out == punch_in
    if policy.min_session_minutes == 0 {
        bail!("MIN_SESSION_MINUTES must be at least 1");
    }

    for (key, value) in [
        ("ABSENT_BELOW_HOURS", policy.absent_below_hours),
        ("FULL_DAY_HOURS", policy.full_day_hours),
        ("GEOFENCE_DEFAULT_RADIUS_METERS", policy.default_geofence_radius_meters),
    ] {
        if !value.is_finite() || value < 0.0 {
            bail!("{key}={value} must be a finite, non-negative number");
        }
    }

    if policy.absent_below_hours > policy.full_day_hours {
        bail!("ABSENT_BELOW_HOURS must not exceed FULL_DAY_HOURS");
    }
    Ok(())
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let store_backend = var_or("ATTENDANCE_STORE", StoreBackend::Mysql)?;
        let database_url = env::var("DATABASE_URL").ok();
        if store_backend == StoreBackend::Mysql && database_url.is_none() {
            bail!("DATABASE_URL must be set when ATTENDANCE_STORE=mysql");
        }

        let defaults = AttendancePolicy::default();
        let offset_minutes: i32 = var_or("ATTENDANCE_UTC_OFFSET_MINUTES", 0)?;
        let zone = FixedOffset::east_opt(offset_minutes * 60)
            .with_context(|| format!("ATTENDANCE_UTC_OFFSET_MINUTES={offset_minutes} is out of range"))?;

        let policy = AttendancePolicy {
            zone,
            min_session_minutes: var_or("MIN_SESSION_MINUTES", defaults.min_session_minutes)?,
            absent_below_hours: var_or("ABSENT_BELOW_HOURS", defaults.absent_below_hours)?,
            full_day_hours: var_or("FULL_DAY_HOURS", defaults.full_day_hours)?,
            default_geofence_radius_meters: var_or(
                "GEOFENCE_DEFAULT_RADIUS_METERS",
                defaults.default_geofence_radius_meters,
            )?,
        };
        check_policy(&policy)?;

        Ok(Self {
            server_addr: env::var("SERVER_ADDR").context("SERVER_ADDR must be set")?,
            database_url,
            jwt_secret: env::var("JWT_SECRET").context("JWT_SECRET must be set")?,
            log_dir: env::var("LOG_DIR").unwrap_or_else(|_| "logs".to_string()),
            store_backend,
            policy,
            rate_protected_per_min: var_or("RATE_PROTECTED_PER_MIN", 1000)?,
            api_prefix: env::var("API_PREFIX").unwrap_or_else(|_| "/api".to_string()),
        })
    }
}

#[cfg(test)]
impl Config {
    pub fn for_tests(jwt_secret: &str) -> Self {
        Self {
            database_url: None,
            jwt_secret: jwt_secret.to_string(),
            server_addr: "127.0.0.1:0".to_string(),
            log_dir: "logs".to_string(),
            store_backend: StoreBackend::Memory,
            policy: AttendancePolicy::default(),
            rate_protected_per_min: 1000,
            api_prefix: "/api".to_string(),
        }
    }
}
