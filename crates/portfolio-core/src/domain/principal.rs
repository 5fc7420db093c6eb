//! 인증된 요청 주체.
//!
//! 요청 전역 상태 대신 모든 저장소 호출에 명시적으로 전달됩니다.

use serde::{Deserialize, Serialize};

/// 호출을 수행하는 관리자.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Principal {
    /// 관리자 사용자 ID
    pub admin_id: i64,
}

impl Principal {
    pub fn admin(admin_id: i64) -> Self {
        Self { admin_id }
    }
}
