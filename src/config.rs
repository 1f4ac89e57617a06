//! Runtime configuration loaded from the environment (and `.env`).

use std::env;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use rust_decimal::Decimal;

use crate::estimate::{PricingConfig, SeasonalMultipliers};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} has invalid value '{value}'")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub database_max_connections: u32,
    pub bind_addr: SocketAddr,
    pub reference_cache_ttl: Duration,
    pub pricing: PricingConfig,
}

impl Config {
    /// Read configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let defaults = PricingConfig::default();
        let multipliers = SeasonalMultipliers {
            peak_spring: multiplier(&lookup, "MULTIPLIER_PEAK_SPRING", defaults.multipliers.peak_spring)?,
            peak_september: multiplier(
                &lookup,
                "MULTIPLIER_PEAK_SEPTEMBER",
                defaults.multipliers.peak_september,
            )?,
            standard: multiplier(&lookup, "MULTIPLIER_STANDARD", defaults.multipliers.standard)?,
        };

        Ok(Self {
            database_url,
            database_max_connections: parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", 5)?,
            bind_addr: parse_or(&lookup, "BIND_ADDR", SocketAddr::from(([0, 0, 0, 0], 3000)))?,
            reference_cache_ttl: cache_ttl(&lookup, "REFERENCE_CACHE_TTL_SECS", 600)?,
            pricing: PricingConfig {
                price_per_km: parse_or(&lookup, "PRICE_PER_KM", defaults.price_per_km)?,
                multipliers,
            },
        })
    }
}

fn parse_or<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(name) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
    }
}

/// Cache TTL in seconds; it doubles as the warmer period, so it must be non-zero.
fn cache_ttl<F>(lookup: &F, name: &'static str, default: u64) -> Result<Duration, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let secs: u64 = parse_or(lookup, name, default)?;
    if secs == 0 {
        return Err(ConfigError::Invalid {
            name,
            value: secs.to_string(),
        });
    }
    Ok(Duration::from_secs(secs))
}

fn multiplier<F>(lookup: &F, name: &'static str, default: Decimal) -> Result<Decimal, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let value: Decimal = parse_or(lookup, name, default)?;
    if value.is_sign_negative() && !value.is_zero() {
        return Err(ConfigError::Invalid {
            name,
            value: value.to_string(),
        });
    }
    Ok(value)
}
