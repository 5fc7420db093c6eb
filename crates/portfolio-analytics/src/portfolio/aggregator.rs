//! 포트폴리오 지표 집계.
//!
//! 여러 자산의 종가 시계열을 공통 날짜로 정렬한 뒤 다음을 계산합니다:
//! - 자산별 기대 수익률, 표준편차, 성과 지수, 샤프 지수
//! - 벤치마크 대비 베타
//! - 표본 공분산 행렬과 베타 기반 공분산 행렬
//! - 비벤치마크 자산 동일 가중 포트폴리오의 수익률, 분산, 표준편차
//!
//! 벤치마크는 자산별 표에 포함되지만(베타 1.0) 가중치는 0입니다.

use portfolio_core::{
    IndicatorConfig, PortfolioError, PortfolioIndicatorSet, PortfolioIndicators,
    PortfolioResult, PriceSeries, TickerMap,
};
use std::collections::HashSet;
use tracing::{debug, instrument};

use super::alignment::align_on_common_dates;
use super::covariance::{beta_covariance, empirical_covariance, matrix_entry, quadratic_form};
use crate::statistics::{guarded_ratio, mean, pct_returns, sample_std_dev};

/// 포트폴리오 지표 집계기.
#[derive(Debug, Clone)]
pub struct PortfolioAggregator {
    benchmark: String,
    daily_risk_free_rate: f64,
}

impl Default for PortfolioAggregator {
    fn default() -> Self {
        Self::from_config(&IndicatorConfig::default())
    }
}

impl PortfolioAggregator {
    /// 벤치마크 티커와 일간 무위험 수익률(%)로 집계기를 생성합니다.
    pub fn new(benchmark: impl Into<String>, daily_risk_free_rate: f64) -> Self {
        Self {
            benchmark: benchmark.into(),
            daily_risk_free_rate,
        }
    }

    /// 설정에서 집계기를 생성합니다.
    pub fn from_config(config: &IndicatorConfig) -> Self {
        Self::new(config.benchmark_ticker.clone(), config.daily_risk_free_rate())
    }

    pub fn benchmark(&self) -> &str {
        &self.benchmark
    }

    /// 자산 시계열 목록으로 포트폴리오 지표를 계산합니다.
    ///
    /// # 에러
    ///
    /// - `InvalidInput`: 같은 티커가 두 번 이상 들어옴
    /// - `InsufficientData`: 공통 날짜가 2개 미만이거나 비벤치마크 자산이 없음
    /// - `MissingBenchmark`: 벤치마크 티커의 시계열이 없음
    #[instrument(skip_all, fields(assets = series.len(), benchmark = %self.benchmark))]
    pub fn aggregate(&self, series: &[PriceSeries]) -> PortfolioResult<PortfolioIndicators> {
        let mut seen = HashSet::new();
        for s in series {
            if !seen.insert(s.ticker()) {
                return Err(PortfolioError::InvalidInput(format!(
                    "duplicate ticker in portfolio input: {}",
                    s.ticker()
                )));
            }
        }

        let aligned = align_on_common_dates(series);
        if aligned.is_empty() {
            return Err(PortfolioError::InsufficientData(
                "no common dates across portfolio assets".to_string(),
            ));
        }

        if !seen.contains(self.benchmark.as_str()) {
            return Err(PortfolioError::MissingBenchmark(self.benchmark.clone()));
        }

        if aligned.dates.len() < 2 {
            return Err(PortfolioError::InsufficientData(format!(
                "{} common date(s), at least 2 required",
                aligned.dates.len()
            )));
        }

        // 벤치마크는 항상 마지막
        let mut ordered_tickers: Vec<String> = aligned
            .columns
            .iter()
            .map(|(ticker, _)| ticker.clone())
            .filter(|ticker| *ticker != self.benchmark)
            .collect();
        let asset_count = ordered_tickers.len();
        if asset_count == 0 {
            return Err(PortfolioError::InsufficientData(
                "portfolio has no assets besides the benchmark".to_string(),
            ));
        }
        ordered_tickers.push(self.benchmark.clone());

        let returns: Vec<(String, Vec<f64>)> = ordered_tickers
            .iter()
            .map(|ticker| {
                let closes = aligned.closes(ticker).unwrap_or_default();
                (ticker.clone(), pct_returns(closes))
            })
            .collect();

        let mut expected_return = TickerMap::new();
        let mut std_dev = TickerMap::new();
        let mut performance_index = TickerMap::new();
        let mut sharpe_index = TickerMap::new();
        for (ticker, r) in &returns {
            let er = mean(r);
            let sd = sample_std_dev(r);
            expected_return.insert(ticker.clone(), er);
            std_dev.insert(ticker.clone(), sd);
            performance_index.insert(ticker.clone(), guarded_ratio(er, sd));
            sharpe_index.insert(
                ticker.clone(),
                guarded_ratio(er - self.daily_risk_free_rate, sd),
            );
        }

        let equal_weight = 1.0 / asset_count as f64;
        let weight: TickerMap = ordered_tickers
            .iter()
            .map(|ticker| {
                let w = if *ticker == self.benchmark {
                    0.0
                } else {
                    equal_weight
                };
                (ticker.clone(), w)
            })
            .collect();

        let covariance = empirical_covariance(&returns);
        let benchmark_variance = matrix_entry(&covariance, &self.benchmark, &self.benchmark);

        let beta: TickerMap = ordered_tickers
            .iter()
            .map(|ticker| {
                let b = if *ticker == self.benchmark {
                    1.0
                } else {
                    guarded_ratio(
                        matrix_entry(&covariance, ticker, &self.benchmark),
                        benchmark_variance,
                    )
                };
                (ticker.clone(), b)
            })
            .collect();

        let covariance_beta =
            beta_covariance(&ordered_tickers, &beta, benchmark_variance, &covariance);

        let asset_weights: TickerMap = weight
            .iter()
            .filter(|(ticker, _)| **ticker != self.benchmark)
            .map(|(ticker, w)| (ticker.clone(), *w))
            .collect();

        let portfolio_return: f64 = asset_weights
            .iter()
            .map(|(ticker, w)| w * expected_return.get(ticker).copied().unwrap_or(0.0))
            .sum();
        let variance = quadratic_form(&asset_weights, &covariance).max(0.0);
        let portfolio_std = variance.sqrt();

        let portfolio = PortfolioIndicatorSet {
            expected_return: portfolio_return,
            variance,
            std_dev: portfolio_std,
            performance_index: guarded_ratio(portfolio_return, portfolio_std),
            sharpe_index: guarded_ratio(
                portfolio_return - self.daily_risk_free_rate,
                portfolio_std,
            ),
        };

        debug!(
            aligned_dates = aligned.dates.len(),
            assets = asset_count,
            portfolio_return,
            portfolio_std,
            "포트폴리오 지표 계산 완료"
        );

        Ok(PortfolioIndicators {
            ordered_tickers,
            benchmark: self.benchmark.clone(),
            aligned_dates: aligned.dates.len(),
            first_date: aligned.dates.first().copied(),
            last_date: aligned.dates.last().copied(),
            expected_return,
            std_dev,
            performance_index,
            sharpe_index,
            weight,
            beta,
            covariance,
            covariance_beta,
            portfolio,
        })
    }
}
