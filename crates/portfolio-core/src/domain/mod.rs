//! 포트폴리오 지표 엔진의 도메인 모델.

mod indicators;
mod price;
mod principal;

pub use indicators::*;
pub use price::*;
pub use principal::*;
