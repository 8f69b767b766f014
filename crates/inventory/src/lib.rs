//! Stockwatch 인벤토리 — 스캔 결과를 하나의 중복 없는 공유 인벤토리로 병합
//!
//! # Module Structure
//!
//! - [`aggregator`]: 인벤토리 소유자 (`Aggregator`, `BatchReport`, `Summary`)
//!
//! # Architecture
//!
//! ```text
//! consumer 1 --+
//! consumer 2 --+--> add_items() --> [ Mutex<Inventory> ] <-- summary() <-- reporter
//! consumer N --+                                           <-- summary() <-- final report
//! ```

pub mod aggregator;

pub use aggregator::{Aggregator, BatchReport, Summary};
