//! 설정 관리 — stockwatch.toml 파싱 및 런타임 설정
//!
//! [`StockwatchConfig`]는 파일/환경변수로 조정 가능한 설정(로깅, 보고 주기,
//! 종료 대기 한도)을 담습니다. 센서 목록과 풀 용량은 [`FleetConfig`]로
//! 코드에서만 지정하며 파일이나 환경변수로 노출하지 않습니다.
//!
//! # 설정 로딩 우선순위
//! 1. CLI 인자 (최고 우선)
//! 2. 환경변수 (`STOCKWATCH_REPORT_INTERVAL_SECS=10` 형식)
//! 3. 설정 파일 (`stockwatch.toml`)
//! 4. 기본값 (`Default` 구현)
//!
//! # 사용 예시
//! ```no_run
//! # async fn example() -> Result<(), stockwatch_core::error::StockwatchError> {
//! use stockwatch_core::config::StockwatchConfig;
//!
//! // 파일에서 로드 + 환경변수 오버라이드
//! let config = StockwatchConfig::load("stockwatch.toml").await?;
//!
//! // TOML 문자열에서 직접 파싱
//! let config = StockwatchConfig::parse("[general]\nlog_level = \"debug\"")?;
//! # Ok(())
//! # }
//! ```

use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ConfigError, PoolError, StockwatchError};
use crate::record::SensorId;

/// 기본 풀 용량
pub const DEFAULT_POOL_CAPACITY: usize = 3;
/// 기본 센서 수 (ID 1..=10)
pub const DEFAULT_SENSOR_COUNT: u32 = 10;
/// 기본 보고 주기 (초)
pub const DEFAULT_REPORT_INTERVAL_SECS: u64 = 5;
/// 기본 스캔 종료 대기 한도 (T1, 초)
pub const DEFAULT_SCAN_DRAIN_TIMEOUT_SECS: u64 = 120;
/// 기본 보고 종료 대기 한도 (T2, 초)
pub const DEFAULT_REPORT_DRAIN_TIMEOUT_SECS: u64 = 30;

/// Stockwatch 통합 설정
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StockwatchConfig {
    /// 일반 설정
    #[serde(default)]
    pub general: GeneralConfig,
    /// 보고 설정
    #[serde(default)]
    pub report: ReportConfig,
    /// 종료 설정
    #[serde(default)]
    pub shutdown: ShutdownConfig,
}

impl StockwatchConfig {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용합니다.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, StockwatchError> {
        let mut config = Self::from_file(path).await?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// TOML 파일에서 설정을 로드합니다 (환경변수 오버라이드 없음).
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, StockwatchError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StockwatchError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                StockwatchError::Io(e)
            }
        })?;
        let config = Self::parse(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, StockwatchError> {
        toml::from_str(toml_str).map_err(|e| {
            StockwatchError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `STOCKWATCH_{SECTION}_{FIELD}`
    pub fn apply_env_overrides(&mut self) {
        // General
        override_string(&mut self.general.log_level, "STOCKWATCH_GENERAL_LOG_LEVEL");
        override_string(&mut self.general.log_format, "STOCKWATCH_GENERAL_LOG_FORMAT");

        // Report
        override_u64(
            &mut self.report.interval_secs,
            "STOCKWATCH_REPORT_INTERVAL_SECS",
        );

        // Shutdown
        override_u64(
            &mut self.shutdown.scan_drain_timeout_secs,
            "STOCKWATCH_SHUTDOWN_SCAN_DRAIN_TIMEOUT_SECS",
        );
        override_u64(
            &mut self.shutdown.report_drain_timeout_secs,
            "STOCKWATCH_SHUTDOWN_REPORT_DRAIN_TIMEOUT_SECS",
        );
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), StockwatchError> {
        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.general.log_format.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_format".to_owned(),
                reason: format!("must be one of: {}", valid_formats.join(", ")),
            }
            .into());
        }

        if self.general.log_level.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "general.log_level".to_owned(),
                reason: "log level filter must not be empty".to_owned(),
            }
            .into());
        }

        if self.report.interval_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "report.interval_secs".to_owned(),
                reason: "must be greater than 0".to_owned(),
            }
            .into());
        }

        if self.shutdown.scan_drain_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "shutdown.scan_drain_timeout_secs".to_owned(),
                reason: "must be greater than 0".to_owned(),
            }
            .into());
        }

        if self.shutdown.report_drain_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "shutdown.report_drain_timeout_secs".to_owned(),
                reason: "must be greater than 0".to_owned(),
            }
            .into());
        }

        Ok(())
    }
}

/// 일반 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// 로그 필터 (`info`, `stockwatch=debug,info` 등 EnvFilter 지시어)
    pub log_level: String,
    /// 로그 형식 (json, pretty)
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_owned(),
            log_format: "pretty".to_owned(),
        }
    }
}

/// 보고 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// 보고 주기 (초, fixed-rate)
    pub interval_secs: u64,
}

impl ReportConfig {
    /// 보고 주기
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            interval_secs: DEFAULT_REPORT_INTERVAL_SECS,
        }
    }
}

/// 종료 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShutdownConfig {
    /// 스캔 풀 종료 대기 한도 (초)
    pub scan_drain_timeout_secs: u64,
    /// 보고 스케줄러 종료 대기 한도 (초)
    pub report_drain_timeout_secs: u64,
}

impl ShutdownConfig {
    /// 스캔 풀 종료 대기 한도 (T1)
    pub fn scan_drain_timeout(&self) -> Duration {
        Duration::from_secs(self.scan_drain_timeout_secs)
    }

    /// 보고 스케줄러 종료 대기 한도 (T2)
    pub fn report_drain_timeout(&self) -> Duration {
        Duration::from_secs(self.report_drain_timeout_secs)
    }
}

impl Default for ShutdownConfig {
    fn default() -> Self {
        Self {
            scan_drain_timeout_secs: DEFAULT_SCAN_DRAIN_TIMEOUT_SECS,
            report_drain_timeout_secs: DEFAULT_REPORT_DRAIN_TIMEOUT_SECS,
        }
    }
}

/// 센서 플릿 구성
///
/// 스캔할 센서 ID 집합과 동시 실행 용량을 명시합니다.
/// 센서 ID는 호출자가 직접 지정하며, 개수에서 범위를 유도하지 않습니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FleetConfig {
    /// 스캔할 센서 ID (제출 순서)
    pub sensor_ids: Vec<SensorId>,
    /// 동시에 실행되는 최대 스캔 수 (K)
    pub pool_capacity: usize,
}

impl FleetConfig {
    /// 센서 ID 목록과 풀 용량으로 플릿을 구성합니다.
    pub fn new(sensor_ids: impl IntoIterator<Item = SensorId>, pool_capacity: usize) -> Self {
        Self {
            sensor_ids: sensor_ids.into_iter().collect(),
            pool_capacity,
        }
    }

    /// 풀 용량과 센서 ID 집합을 검증합니다.
    ///
    /// 센서 ID는 양의 정수여야 하며 중복될 수 없습니다.
    pub fn validate(&self) -> Result<(), StockwatchError> {
        if self.pool_capacity == 0 {
            return Err(PoolError::InvalidCapacity(self.pool_capacity).into());
        }

        let mut seen = HashSet::with_capacity(self.sensor_ids.len());
        for sensor_id in &self.sensor_ids {
            if sensor_id.get() == 0 {
                return Err(ConfigError::InvalidValue {
                    field: "fleet.sensor_ids".to_owned(),
                    reason: "sensor id must be a positive integer".to_owned(),
                }
                .into());
            }
            if !seen.insert(*sensor_id) {
                return Err(ConfigError::InvalidValue {
                    field: "fleet.sensor_ids".to_owned(),
                    reason: format!("sensor id {sensor_id} appears more than once"),
                }
                .into());
            }
        }
        Ok(())
    }
}

impl Default for FleetConfig {
    fn default() -> Self {
        Self::new(
            (1..=DEFAULT_SENSOR_COUNT).map(SensorId::new),
            DEFAULT_POOL_CAPACITY,
        )
    }
}

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val;
    }
}

fn override_u64(target: &mut u64, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<u64>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse u64 from env var, ignoring"
            ),
        }
    }
}
