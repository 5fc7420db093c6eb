//! 포트폴리오 지표 서비스.
//!
//! 시세 조회, 정규화, 지표 계산, 적재를 하나의 흐름으로 묶습니다.
//!
//! - 단일 자산 조회: 조회 → 정규화 → 단일 자산 지표
//! - 이력 적재: 조회 → 정규화 → 적재 조정
//! - 포트폴리오 지표: 저장된 시계열 로드 → 포트폴리오 집계

use portfolio_analytics::{AssetIndicatorCalculator, PortfolioAggregator};
use portfolio_core::{
    AppConfig, AssetLookup, IngestionReport, MarketDataConfig, PortfolioIndicators,
    PortfolioResult, Principal, Ticker,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument, warn};

use crate::ingestion::IngestionReconciler;
use crate::normalizer::normalize;
use crate::provider::{fetch_with_timeout, FetchMode, FetchOutcome, FetchRequest, MarketDataProvider};
use crate::storage::PriceStore;

/// 단일 자산 조회 결과.
#[derive(Debug, Clone, PartialEq)]
pub enum AssetLookupOutcome {
    /// 지표 계산 결과 (가격이 2개 미만이면 빈 결과)
    Found(AssetLookup),
    /// 시세 제공자가 데이터를 돌려주지 않음
    NoData { ticker: String },
}

/// 포트폴리오 지표 서비스.
#[derive(Clone)]
pub struct PortfolioService {
    provider: Arc<dyn MarketDataProvider>,
    store: Arc<dyn PriceStore>,
    market: MarketDataConfig,
    calculator: AssetIndicatorCalculator,
    aggregator: PortfolioAggregator,
}

impl PortfolioService {
    pub fn new(
        provider: Arc<dyn MarketDataProvider>,
        store: Arc<dyn PriceStore>,
        config: &AppConfig,
    ) -> Self {
        Self {
            provider,
            store,
            market: config.market_data.clone(),
            calculator: AssetIndicatorCalculator::from_config(&config.indicators),
            aggregator: PortfolioAggregator::from_config(&config.indicators),
        }
    }

    fn canonical_ticker(&self, raw: &str) -> PortfolioResult<Ticker> {
        Ticker::canonical(raw, &self.market.market_suffix)
    }

    fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.market.fetch_timeout_secs)
    }

    /// 단일 자산의 지표를 조회합니다.
    ///
    /// `request`가 없으면 설정의 요약 조회 기간/간격을 사용합니다.
    #[instrument(skip(self, request))]
    pub async fn lookup_asset(
        &self,
        raw_ticker: &str,
        request: Option<FetchRequest>,
    ) -> PortfolioResult<AssetLookupOutcome> {
        let ticker = self.canonical_ticker(raw_ticker)?;
        let request =
            request.unwrap_or_else(|| FetchRequest::for_mode(FetchMode::Summary, &self.market));

        let table = match fetch_with_timeout(
            self.provider.as_ref(),
            &ticker,
            &request,
            self.fetch_timeout(),
        )
        .await?
        {
            FetchOutcome::Data(table) => table,
            FetchOutcome::NoData => {
                warn!(ticker = %ticker, "시세 데이터 없음");
                return Ok(AssetLookupOutcome::NoData {
                    ticker: ticker.into_inner(),
                });
            }
        };

        let bars = normalize(&table)?;
        Ok(AssetLookupOutcome::Found(self.calculator.calculate(&bars)))
    }

    /// 일별 이력을 조회해 포트폴리오에 적재합니다.
    ///
    /// 시세 데이터가 없으면 모든 건수가 0인 결과를 반환합니다.
    #[instrument(skip(self))]
    pub async fn ingest_history(
        &self,
        principal: Principal,
        portfolio_id: i64,
        raw_ticker: &str,
    ) -> PortfolioResult<IngestionReport> {
        let ticker = self.canonical_ticker(raw_ticker)?;
        let request = FetchRequest::for_mode(FetchMode::History, &self.market);

        let candidates = match fetch_with_timeout(
            self.provider.as_ref(),
            &ticker,
            &request,
            self.fetch_timeout(),
        )
        .await?
        {
            FetchOutcome::Data(table) => normalize(&table)?
                .into_iter()
                .map(|bar| (bar.date, bar.close))
                .collect::<Vec<_>>(),
            FetchOutcome::NoData => {
                warn!(ticker = %ticker, "적재할 시세 데이터 없음");
                Vec::new()
            }
        };

        IngestionReconciler::new(self.store.as_ref())
            .reconcile(principal, portfolio_id, &ticker, &candidates)
            .await
    }

    /// 포트폴리오에 저장된 모든 자산으로 지표를 계산합니다.
    #[instrument(skip(self))]
    pub async fn portfolio_indicators(
        &self,
        principal: Principal,
        portfolio_id: i64,
    ) -> PortfolioResult<PortfolioIndicators> {
        let series = self.store.load_all_series(principal, portfolio_id).await?;
        let indicators = self.aggregator.aggregate(&series)?;

        info!(
            portfolio_id,
            assets = indicators.ordered_tickers.len(),
            aligned_dates = indicators.aligned_dates,
            "포트폴리오 지표 계산"
        );

        Ok(indicators)
    }
}
