//! Environment-driven configuration.
//!
//! Every setting has a default so the server starts with an empty
//! environment; `.env` is loaded first when present.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_STORE_DIR: &str = "./data/vouchers";
const DEFAULT_PREVIEW_TTL_SECS: u64 = 10 * 60;
const DEFAULT_ALLOWED_ORIGINS: &str = "http://localhost:5173,http://localhost:3000";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} must be a valid {expected}, got '{value}'")]
    Invalid {
        name: &'static str,
        expected: &'static str,
        value: String,
    },
}

/// Identity printed in the voucher header and grid.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, ToSchema)]
pub struct OrganizationProfile {
    pub country: String,
    pub province: String,
    pub city: String,
    pub barangay: String,
    pub office: String,
}

impl Default for OrganizationProfile {
    fn default() -> Self {
        Self {
            country: "Republic of the Philippines".to_string(),
            province: "Province".to_string(),
            city: "City".to_string(),
            barangay: "Barangay".to_string(),
            office: "Office of the Barangay Treasurer".to_string(),
        }
    }
}

impl OrganizationProfile {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            country: env_or("BARANGAY_COUNTRY", &defaults.country),
            province: env_or("BARANGAY_PROVINCE", &defaults.province),
            city: env_or("BARANGAY_CITY", &defaults.city),
            barangay: env_or("BARANGAY_NAME", &defaults.barangay),
            office: env_or("BARANGAY_OFFICE", &defaults.office),
        }
    }

    /// The fixed header lines, top to bottom.
    pub fn header_lines(&self) -> [String; 5] {
        [
            self.country.clone(),
            format!("Province of {}", self.province),
            format!("City of {}", self.city),
            format!("BARANGAY {}", self.barangay.to_uppercase()),
            self.office.clone(),
        ]
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub store_dir: PathBuf,
    pub preview_ttl: Duration,
    pub allowed_origins: Vec<String>,
    pub left_logo: Option<PathBuf>,
    pub right_logo: Option<PathBuf>,
    pub organization: OrganizationProfile,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let allowed_origins = env_or("VOUCHER_ALLOWED_ORIGINS", DEFAULT_ALLOWED_ORIGINS)
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(String::from)
            .collect();

        Ok(Self {
            host: env_or("VOUCHER_HOST", DEFAULT_HOST),
            port: parse_env("VOUCHER_PORT", "port number", DEFAULT_PORT)?,
            store_dir: PathBuf::from(env_or("VOUCHER_STORE_DIR", DEFAULT_STORE_DIR)),
            preview_ttl: Duration::from_secs(parse_env(
                "VOUCHER_PREVIEW_TTL_SECS",
                "number of seconds",
                DEFAULT_PREVIEW_TTL_SECS,
            )?),
            allowed_origins,
            left_logo: env_path("VOUCHER_LOGO_LEFT"),
            right_logo: env_path("VOUCHER_LOGO_RIGHT"),
            organization: OrganizationProfile::from_env(),
        })
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            store_dir: PathBuf::from(DEFAULT_STORE_DIR),
            preview_ttl: Duration::from_secs(DEFAULT_PREVIEW_TTL_SECS),
            allowed_origins: Vec::new(),
            left_logo: None,
            right_logo: None,
            organization: OrganizationProfile::default(),
        }
    }
}

fn env_or(name: &str, default: &str) -> String {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn env_path(name: &str) -> Option<PathBuf> {
    env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .map(PathBuf::from)
}

fn parse_env<T: FromStr>(
    name: &'static str,
    expected: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => {
            raw.trim().parse().map_err(|_| ConfigError::Invalid {
                name,
                expected,
                value: raw,
            })
        }
        _ => Ok(default),
    }
}
