//! 스캐너 trait — 외부 스캔 협력자 계약
//!
//! [`Scanner`]는 센서 ID를 받아 0개 이상의 [`Record`]를 반환하거나 실패합니다.
//! 실제 레코드 생성은 이 크레이트의 범위 밖이며, 구현체가 담당합니다.
//!
//! `Scanner`는 RPITIT를 사용하므로 `dyn Scanner`가 불가합니다.
//! 워커 풀처럼 스캐너를 `Arc<dyn ...>`로 공유해야 하는 곳은
//! 자동 구현되는 [`DynScanner`]를 사용합니다.

use std::future::Future;
use std::pin::Pin;

use crate::error::ScanError;
use crate::record::{Record, SensorId};

/// 박싱된 `Send` future
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// 스캔 결과: 성공(레코드 목록, 빈 목록 포함) 또는 실패 원인
pub type ScanOutcome = Result<Vec<Record>, ScanError>;

/// 외부 스캔 협력자
///
/// # 구현 예시
/// ```ignore
/// struct FixedScanner;
///
/// impl Scanner for FixedScanner {
///     async fn scan(&self, sensor_id: SensorId) -> ScanOutcome {
///         Ok(vec![Record::with_id(format!("SKU-{sensor_id}"))])
///     }
/// }
/// ```
pub trait Scanner: Send + Sync {
    /// 센서 하나를 스캔합니다.
    ///
    /// 재시도는 하지 않습니다. 실패는 [`ScanError::Collaborator`]로 반환합니다.
    fn scan(&self, sensor_id: SensorId) -> impl Future<Output = ScanOutcome> + Send;
}

/// dyn-compatible 스캐너 trait
pub trait DynScanner: Send + Sync {
    /// 센서 하나를 스캔합니다.
    fn scan(&self, sensor_id: SensorId) -> BoxFuture<'_, ScanOutcome>;
}

/// Scanner를 구현한 타입은 자동으로 DynScanner도 구현됩니다.
impl<T: Scanner> DynScanner for T {
    fn scan(&self, sensor_id: SensorId) -> BoxFuture<'_, ScanOutcome> {
        Box::pin(Scanner::scan(self, sensor_id))
    }
}
