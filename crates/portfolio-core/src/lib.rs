//! # Portfolio Core
//!
//! 포트폴리오 지표 엔진의 핵심 도메인 모델 및 타입을 제공합니다.
//!
//! - 가격 레코드와 시계열
//! - 지표 계산 결과 구조체
//! - 티커 정규화
//! - 에러 분류
//! - 설정 관리
//! - 로깅 인프라

pub mod config;
pub mod domain;
pub mod error;
pub mod logging;
pub mod types;

pub use self::config::*;
pub use domain::*;
pub use error::*;
pub use logging::*;
pub use types::*;
