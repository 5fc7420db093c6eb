//! 시세 데이터 Provider 모듈.
//!
//! 외부 시세 소스에서 원시 가격 테이블을 가져옵니다.
//!
//! ## 조회 모드
//! - 요약 조회 (`Summary`): 단일 자산 지표용, 기본 `1y` 기간 / `5d` 간격
//! - 일별 이력 (`History`): 적재용, 기본 `3mo` 기간 / `1d` 간격
//!
//! ## Provider
//! - `YahooFinanceProvider`: Yahoo Finance 차트 API

pub mod yahoo;

pub use yahoo::YahooFinanceProvider;

use async_trait::async_trait;
use portfolio_core::{MarketDataConfig, PortfolioError, PortfolioResult, Ticker};
use std::time::Duration;
use tracing::{debug, instrument, warn};

use crate::error::Result;
use crate::normalizer::RawPriceTable;

/// 조회 결과.
///
/// 데이터가 없는 것은 에러가 아니라 명시적인 결과입니다.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    Data(RawPriceTable),
    NoData,
}

impl FetchOutcome {
    /// 빈 테이블도 `NoData`로 취급합니다.
    pub fn from_table(table: RawPriceTable) -> Self {
        if table.is_empty() {
            FetchOutcome::NoData
        } else {
            FetchOutcome::Data(table)
        }
    }
}

/// 조회 모드.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchMode {
    /// 단일 자산 요약 조회
    Summary,
    /// 적재용 일별 이력
    History,
}

/// 기간/간격이 확정된 조회 요청.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub period: String,
    pub interval: String,
}

impl FetchRequest {
    pub fn new(period: impl Into<String>, interval: impl Into<String>) -> Self {
        Self {
            period: period.into(),
            interval: interval.into(),
        }
    }

    /// 설정의 모드별 기본 기간/간격으로 요청을 만듭니다.
    pub fn for_mode(mode: FetchMode, config: &MarketDataConfig) -> Self {
        match mode {
            FetchMode::Summary => Self::new(&config.summary_period, &config.summary_interval),
            FetchMode::History => Self::new(&config.history_period, &config.history_interval),
        }
    }
}

/// 시세 데이터 Provider trait.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Provider 이름.
    fn name(&self) -> &str;

    /// 티커의 원시 가격 테이블을 조회합니다.
    async fn fetch(&self, ticker: &Ticker, request: &FetchRequest) -> Result<FetchOutcome>;
}

/// 타임아웃을 걸고 조회합니다.
///
/// 타임아웃과 Provider 오류는 모두 `UpstreamFetch`로 변환됩니다.
#[instrument(skip(provider, ticker), fields(provider = provider.name(), ticker = %ticker))]
pub async fn fetch_with_timeout(
    provider: &dyn MarketDataProvider,
    ticker: &Ticker,
    request: &FetchRequest,
    timeout: Duration,
) -> PortfolioResult<FetchOutcome> {
    match tokio::time::timeout(timeout, provider.fetch(ticker, request)).await {
        Ok(Ok(outcome)) => {
            debug!(
                has_data = matches!(outcome, FetchOutcome::Data(_)),
                "시세 조회 완료"
            );
            Ok(outcome)
        }
        Ok(Err(e)) => {
            warn!(error = %e, "시세 조회 실패");
            Err(PortfolioError::UpstreamFetch(e.to_string()))
        }
        Err(_) => {
            warn!(timeout_secs = timeout.as_secs(), "시세 조회 타임아웃");
            Err(PortfolioError::UpstreamFetch(format!(
                "{} timed out after {:?} for {}",
                provider.name(),
                timeout,
                ticker
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DataError;

    struct SlowProvider;

    #[async_trait]
    impl MarketDataProvider for SlowProvider {
        fn name(&self) -> &str {
            "slow"
        }

        async fn fetch(&self, _ticker: &Ticker, _request: &FetchRequest) -> Result<FetchOutcome> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(FetchOutcome::NoData)
        }
    }

    struct FailingProvider;

    #[async_trait]
    impl MarketDataProvider for FailingProvider {
        fn name(&self) -> &str {
            "failing"
        }

        async fn fetch(&self, _ticker: &Ticker, _request: &FetchRequest) -> Result<FetchOutcome> {
            Err(DataError::FetchError("HTTP 503".to_string()))
        }
    }

    fn ticker() -> Ticker {
        Ticker::canonical("PETR4", ".SA").unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_maps_to_upstream_fetch() {
        let request = FetchRequest::new("1y", "5d");
        let result =
            fetch_with_timeout(&SlowProvider, &ticker(), &request, Duration::from_secs(1)).await;
        assert!(matches!(result, Err(PortfolioError::UpstreamFetch(_))));
    }

    #[tokio::test]
    async fn test_provider_error_maps_to_upstream_fetch() {
        let request = FetchRequest::new("1y", "5d");
        let err = fetch_with_timeout(&FailingProvider, &ticker(), &request, Duration::from_secs(5))
            .await
            .unwrap_err();
        assert!(err.is_retryable());
        assert!(err.to_string().contains("503"));
    }

    #[test]
    fn test_request_for_mode() {
        let config = MarketDataConfig::default();
        assert_eq!(
            FetchRequest::for_mode(FetchMode::Summary, &config),
            FetchRequest::new("1y", "5d")
        );
        assert_eq!(
            FetchRequest::for_mode(FetchMode::History, &config),
            FetchRequest::new("3mo", "1d")
        );
    }

    #[test]
    fn test_empty_table_is_no_data() {
        let table = RawPriceTable::new(["Date", "Close"]);
        assert_eq!(FetchOutcome::from_table(table), FetchOutcome::NoData);
    }
}
