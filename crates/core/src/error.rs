//! 에러 타입 — 도메인별 에러 정의
//!
//! 중복 레코드는 에러가 아닙니다. 집계기(`Aggregator`)의 정상 결과로 로그만 남깁니다.
//! 종료 타임아웃 역시 에러가 아니라 종료 단계의 결과 값으로 표현됩니다.

use crate::record::SensorId;

/// Stockwatch 최상위 에러 타입
#[derive(Debug, thiserror::Error)]
pub enum StockwatchError {
    /// 설정 관련 에러
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// 워커 풀 에러
    #[error("pool error: {0}")]
    Pool(#[from] PoolError),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// 설정 관련 에러
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 설정 파일을 찾을 수 없음
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    /// 설정 파싱 실패
    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    /// 유효하지 않은 설정 값
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// 스캔 작업 에러
///
/// 스캔 태스크 경계에서 격리되며, 다른 태스크나 집계기에는 전파되지 않습니다.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScanError {
    /// 외부 스캐너 호출 실패
    #[error("sensor {sensor_id} scan failed: {cause}")]
    Collaborator { sensor_id: SensorId, cause: String },

    /// 결과 대기 중 취소/중단됨
    #[error("wait for sensor {sensor_id} interrupted")]
    Interrupted { sensor_id: SensorId },
}

impl ScanError {
    /// 외부 스캐너 실패 에러를 생성합니다.
    pub fn collaborator(sensor_id: SensorId, cause: impl Into<String>) -> Self {
        Self::Collaborator {
            sensor_id,
            cause: cause.into(),
        }
    }

    /// 에러가 발생한 센서 ID
    pub fn sensor_id(&self) -> SensorId {
        match self {
            Self::Collaborator { sensor_id, .. } | Self::Interrupted { sensor_id } => *sensor_id,
        }
    }

    /// 대기 중단 에러 여부
    pub fn is_interrupted(&self) -> bool {
        matches!(self, Self::Interrupted { .. })
    }
}

/// 워커 풀 에러
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PoolError {
    /// 종료가 시작되어 더 이상 작업을 받지 않음
    #[error("worker pool is closed, submission rejected")]
    Closed,

    /// 잘못된 풀 용량
    #[error("invalid pool capacity: {0} (must be at least 1)")]
    InvalidCapacity(usize),
}
