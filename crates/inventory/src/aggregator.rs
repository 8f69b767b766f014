//! 집계기 — 중복 없는 공유 인벤토리
//!
//! [`Aggregator`]는 인벤토리(본 ID 집합 + 수락된 레코드 목록)의 유일한 소유자입니다.
//! 모든 읽기/쓰기는 하나의 뮤텍스를 거치며, 배치 삽입 전체가 그 락 아래에서 실행됩니다.
//!
//! # 불변식
//!
//! - `ids.len() == records.len()`
//! - 같은 ID를 가진 레코드는 최대 하나만 저장됨
//! - 인벤토리는 커지기만 함 (삭제/갱신 연산 없음)
//!
//! # 사용 예시
//!
//! ```
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! use stockwatch_core::Record;
//! use stockwatch_inventory::Aggregator;
//!
//! let aggregator = Aggregator::new();
//! let report = aggregator
//!     .add_items(vec![Record::with_id("A"), Record::with_id("A")])
//!     .await;
//! assert_eq!(report.accepted, 1);
//! assert_eq!(report.duplicates, vec!["A".to_owned()]);
//!
//! let summary = aggregator.summary("doc").await;
//! assert_eq!(summary.total, 1);
//! # }
//! ```

use std::collections::HashSet;
use std::fmt;

use tokio::sync::Mutex;
use tracing::{debug, warn};

use stockwatch_core::metrics as m;
use stockwatch_core::record::Record;

/// 인벤토리 상태 (락 내부)
#[derive(Debug, Default)]
struct Inventory {
    /// 저장된 레코드 ID
    ids: HashSet<String>,
    /// 수락 순서대로 저장된 레코드
    records: Vec<Record>,
}

/// 배치 삽입 결과
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    /// 새로 수락된 레코드 수
    pub accepted: usize,
    /// 중복으로 거부된 레코드 ID (입력 순서)
    pub duplicates: Vec<String>,
}

impl BatchReport {
    /// 거부된 레코드 수
    pub fn rejected(&self) -> usize {
        self.duplicates.len()
    }
}

/// 인벤토리 요약
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    /// 현재 고유 레코드 수
    pub total: usize,
    /// 요약을 요청한 호출자 컨텍스트 태그
    pub context: String,
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Total items so far: {} (context: {})",
            self.total, self.context
        )
    }
}

/// 중복 없는 공유 인벤토리
///
/// 오케스트레이터가 한 번 생성하여 `Arc<Aggregator>`로 필요한 협력자에게 주입합니다.
#[derive(Debug, Default)]
pub struct Aggregator {
    inventory: Mutex<Inventory>,
}

impl Aggregator {
    /// 빈 인벤토리로 집계기를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 레코드 배치를 원자적으로 삽입합니다.
    ///
    /// 호출 전체 동안 락을 유지하므로 다른 `add_items`/`summary` 호출과
    /// 부분 배치가 섞이지 않습니다. 이미 저장된 ID의 레코드는 거부되며
    /// 기존 레코드는 바뀌지 않습니다.
    pub async fn add_items(&self, records: Vec<Record>) -> BatchReport {
        let mut report = BatchReport::default();
        if records.is_empty() {
            return report;
        }

        let mut inventory = self.inventory.lock().await;
        for record in records {
            if inventory.ids.contains(record.id()) {
                warn!(item_id = %record.id(), "Duplicate goods found! ID: {}", record.id());
                report.duplicates.push(record.id().to_owned());
                continue;
            }
            inventory.ids.insert(record.id().to_owned());
            inventory.records.push(record);
            report.accepted += 1;
        }
        let total = inventory.records.len();
        drop(inventory);

        metrics::counter!(m::INVENTORY_RECORDS_ACCEPTED_TOTAL).increment(report.accepted as u64);
        metrics::counter!(m::INVENTORY_DUPLICATES_TOTAL).increment(report.rejected() as u64);
        #[allow(clippy::cast_precision_loss)]
        metrics::gauge!(m::INVENTORY_SIZE).set(total as f64);

        debug!(
            accepted = report.accepted,
            duplicates = report.rejected(),
            total,
            "batch aggregated"
        );
        report
    }

    /// 현재 고유 레코드 수를 반환합니다.
    ///
    /// 같은 락 아래에서 읽으므로 항상 완료된 배치들의 결과만 반영합니다.
    pub async fn summary(&self, context: &str) -> Summary {
        let inventory = self.inventory.lock().await;
        Summary {
            total: inventory.records.len(),
            context: context.to_owned(),
        }
    }

    /// ID가 저장되어 있는지 확인합니다.
    pub async fn contains(&self, id: &str) -> bool {
        self.inventory.lock().await.ids.contains(id)
    }

    /// 저장된 레코드의 일관된 복사본을 수락 순서대로 반환합니다.
    pub async fn snapshot(&self) -> Vec<Record> {
        self.inventory.lock().await.records.clone()
    }
}
