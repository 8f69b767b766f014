//! Stockwatch 공통 타입, trait, 에러, 설정
//!
//! 다른 크레이트는 이 크레이트의 타입으로 스캔 협력자, 집계기, 오케스트레이터를 연결합니다.

pub mod config;
pub mod error;
pub mod metrics;
pub mod record;
pub mod scanner;

// --- 주요 타입 re-export ---

// 에러
pub use error::{ConfigError, PoolError, ScanError, StockwatchError};

// 설정
pub use config::{FleetConfig, StockwatchConfig};

// 도메인 타입
pub use record::{Record, SensorId};

// 스캐너 trait
pub use scanner::{BoxFuture, DynScanner, ScanOutcome, Scanner};
