//! 포트폴리오 지표 엔진 CLI 도구.
//!
//! 이 crate는 다음 기능을 제공합니다:
//! - 단일 자산 지표 조회
//! - 포트폴리오 이력 적재
//! - 포트폴리오 지표 계산
//! - 데이터베이스 마이그레이션과 상태 점검

pub mod commands;
