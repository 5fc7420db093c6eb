//! 다중 자산 포트폴리오 지표.

pub mod aggregator;
pub mod alignment;
pub mod covariance;

pub use aggregator::PortfolioAggregator;
pub use alignment::{align_on_common_dates, AlignedPrices};
pub use covariance::{beta_covariance, empirical_covariance};
