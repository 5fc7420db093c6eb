//! # Portfolio Analytics
//!
//! 가격 시계열로부터 위험/성과 지표를 계산합니다.
//!
//! 모든 계산은 순수 함수이며 상태를 갖지 않습니다.
//!
//! - [`statistics`]: 수익률, 평균, 표본 분산/공분산
//! - [`asset`]: 단일 자산 지표
//! - [`portfolio`]: 날짜 정렬, 베타, 공분산 행렬, 동일 가중 포트폴리오 집계

pub mod asset;
pub mod portfolio;
pub mod statistics;

pub use asset::{calculate_index_asset, AssetIndicatorCalculator};
pub use portfolio::PortfolioAggregator;
