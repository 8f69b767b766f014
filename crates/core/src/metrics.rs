//! 메트릭 상수
//!
//! 모든 메트릭의 이름을 중앙에서 정의합니다.
//! 각 모듈은 이 상수를 사용하여 `metrics::counter!()`, `metrics::gauge!()`
//! 매크로를 호출합니다. 레코더가 설치되지 않으면 기록은 no-op입니다.
//!
//! # 네이밍 컨벤션
//!
//! - 접두어: `stockwatch_`
//! - 모듈명: `inventory_`, `scan_`, `reporter_`, `shutdown_`
//! - 접미어: `_total` (counter), 없음 (gauge)

// ─── 레이블 키 상수 ────────────────────────────────────────────────

/// 결과 레이블 키 (success, failure)
pub const LABEL_RESULT: &str = "result";

/// 종료 단계 레이블 키 (scan, report)
pub const LABEL_PHASE: &str = "phase";

// ─── Inventory 메트릭 ──────────────────────────────────────────────

/// Inventory: 수락된 레코드 수 (counter)
pub const INVENTORY_RECORDS_ACCEPTED_TOTAL: &str = "stockwatch_inventory_records_accepted_total";

/// Inventory: 중복으로 거부된 레코드 수 (counter)
pub const INVENTORY_DUPLICATES_TOTAL: &str = "stockwatch_inventory_duplicates_total";

/// Inventory: 현재 고유 레코드 수 (gauge)
pub const INVENTORY_SIZE: &str = "stockwatch_inventory_size";

// ─── Scan 메트릭 ───────────────────────────────────────────────────

/// Scan: 종료된 스캔 태스크 수 (counter, label: result)
pub const SCAN_TASKS_TOTAL: &str = "stockwatch_scan_tasks_total";

// ─── Reporter 메트릭 ───────────────────────────────────────────────

/// Reporter: 실행된 보고 횟수 (counter)
pub const REPORTER_RUNS_TOTAL: &str = "stockwatch_reporter_runs_total";

// ─── Shutdown 메트릭 ───────────────────────────────────────────────

/// Shutdown: 강제 취소 횟수 (counter, label: phase)
pub const SHUTDOWN_FORCED_CANCEL_TOTAL: &str = "stockwatch_shutdown_forced_cancel_total";
