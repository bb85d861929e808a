//! Configuration module for balancing-service.

use std::env;
use std::path::PathBuf;

use chrono::NaiveDate;
use service_core::config as core_config;
use service_core::error::AppError;

use crate::services::paging::DEFAULT_PAGE_SIZE;
use crate::services::range::{RangePreset, RangeSelection};

#[derive(Debug, Clone)]
pub struct BalancingConfig {
    pub common: core_config::Config,
    pub service_name: String,
    pub service_version: String,
    pub log_level: String,
    pub database: DatabaseConfig,
    pub report: ReportConfig,
    pub range: RangeConfig,
    pub export: ExportConfig,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

#[derive(Debug, Clone)]
pub struct ReportConfig {
    /// Keys per IN-list request; the backend caps query-parameter size.
    pub chunk_size: usize,
    /// Transaction types counted as purchase payments.
    pub finance_types: Vec<String>,
    pub page_size: usize,
}

impl ReportConfig {
    /// Checked at the start of every load, before any network call.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.chunk_size == 0 {
            return Err(AppError::Env(
                "REPORT_CHUNK_SIZE must be at least 1".to_string(),
            ));
        }
        if self.finance_types.is_empty() {
            return Err(AppError::Env(
                "REPORT_FINANCE_TYPES must name at least one transaction type".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct RangeConfig {
    pub preset: RangePreset,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl RangeConfig {
    pub fn selection(&self) -> RangeSelection {
        match (self.preset, self.from, self.to) {
            (RangePreset::Custom, Some(from), Some(to)) => RangeSelection::custom(from, to),
            (preset, _, _) => RangeSelection::new(preset),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ExportConfig {
    pub dir: PathBuf,
}

impl BalancingConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let common = core_config::Config::load()?;

        let preset = RangePreset::from_str(
            &env::var("REPORT_RANGE").unwrap_or_else(|_| "monthly".to_string()),
        );
        let from = date_var("REPORT_FROM")?;
        let to = date_var("REPORT_TO")?;
        if preset == RangePreset::Custom && (from.is_none() || to.is_none()) {
            return Err(AppError::Env(
                "REPORT_FROM and REPORT_TO are required when REPORT_RANGE=custom".to_string(),
            ));
        }

        let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| common.log_level.clone());

        Ok(Self {
            common,
            service_name: env::var("SERVICE_NAME")
                .unwrap_or_else(|_| "balancing-service".to_string()),
            service_version: env::var("SERVICE_VERSION")
                .unwrap_or_else(|_| env!("CARGO_PKG_VERSION").to_string()),
            log_level,
            database: DatabaseConfig {
                url: env::var("DATABASE_URL")
                    .map_err(|_| AppError::Env("DATABASE_URL is required".to_string()))?,
                max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(10),
                min_connections: env::var("DATABASE_MIN_CONNECTIONS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(2),
            },
            report: ReportConfig {
                chunk_size: env::var("REPORT_CHUNK_SIZE")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(50),
                finance_types: env::var("REPORT_FINANCE_TYPES")
                    .unwrap_or_else(|_| "coffee_purchase,purchase_payment".to_string())
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from)
                    .collect(),
                page_size: env::var("REPORT_PAGE_SIZE")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_PAGE_SIZE),
            },
            range: RangeConfig { preset, from, to },
            export: ExportConfig {
                dir: PathBuf::from(env::var("EXPORT_DIR").unwrap_or_else(|_| "exports".to_string())),
            },
        })
    }
}

fn date_var(name: &str) -> Result<Option<NaiveDate>, AppError> {
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map(Some)
            .map_err(|_| AppError::Env(format!("{name} must be an ISO date (YYYY-MM-DD)"))),
        Err(_) => Ok(None),
    }
}
