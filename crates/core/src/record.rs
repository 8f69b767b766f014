//! 도메인 타입 — 센서 ID와 스캔 레코드
//!
//! [`Record`]는 외부 스캐너가 생성하며, core는 고유 식별자(`id`)만 해석합니다.
//! 나머지 페이로드는 불투명한 바이트로 그대로 전달됩니다.

use std::fmt;

use bytes::Bytes;

/// 센서 식별자 (양의 정수)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SensorId(u32);

impl SensorId {
    /// 새 센서 ID를 생성합니다.
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// 원시 값을 반환합니다.
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for SensorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for SensorId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

/// 스캔된 레코드
///
/// 생성 후 변경할 수 없습니다. 집계기에 소유권째 넘겨지며,
/// 이후 어느 쪽에서도 수정하지 않습니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    id: String,
    payload: Bytes,
}

impl Record {
    /// 페이로드와 함께 레코드를 생성합니다.
    pub fn new(id: impl Into<String>, payload: impl Into<Bytes>) -> Self {
        Self {
            id: id.into(),
            payload: payload.into(),
        }
    }

    /// 페이로드 없이 ID만 가진 레코드를 생성합니다.
    pub fn with_id(id: impl Into<String>) -> Self {
        Self::new(id, Bytes::new())
    }

    /// 레코드 고유 식별자
    pub fn id(&self) -> &str {
        &self.id
    }

    /// 불투명 페이로드
    pub fn payload(&self) -> &Bytes {
        &self.payload
    }
}
