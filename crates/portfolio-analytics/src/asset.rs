//! 단일 자산 지표 계산.
//!
//! 정규화된 일별 가격 레코드로부터 다음을 계산합니다:
//! - 기대 수익률 (백분율 수익률 평균)
//! - 표본 표준편차
//! - 연율화 변동성 (표준편차 × √거래일수)
//! - 성과 지수 (기대 수익률 / 표준편차)
//! - 샤프 지수 ((기대 수익률 - 무위험 수익률) / 표준편차)
//!
//! 결과 수치는 소수점 4자리, 화면 표시용 시계열은 소수점 2자리로 반올림합니다.

use portfolio_core::{AssetIndicatorSet, AssetLookup, HistoricalBar, IndicatorConfig, PriceBar};
use tracing::debug;

use crate::statistics::{guarded_ratio, mean, pct_returns, round_to, sample_std_dev};

/// 결과 지표 반올림 자릿수
const RESULT_DECIMALS: i32 = 4;

/// 표시용 시계열 반올림 자릿수
const DISPLAY_DECIMALS: i32 = 2;

/// 단일 자산 지표 계산기.
#[derive(Debug, Clone)]
pub struct AssetIndicatorCalculator {
    annualization_factor: f64,
    daily_risk_free_rate: f64,
}

impl Default for AssetIndicatorCalculator {
    fn default() -> Self {
        Self::from_config(&IndicatorConfig::default())
    }
}

impl AssetIndicatorCalculator {
    /// 설정에서 계산기를 생성합니다.
    pub fn from_config(config: &IndicatorConfig) -> Self {
        Self {
            annualization_factor: config.annualization_factor(),
            daily_risk_free_rate: config.daily_risk_free_rate(),
        }
    }

    /// 종가 시계열의 지표를 반올림 없이 계산합니다.
    ///
    /// 수익률이 하나도 없으면(가격 2개 미만) `None`.
    pub fn indicators(&self, closes: &[f64]) -> Option<AssetIndicatorSet> {
        let returns = pct_returns(closes);
        if returns.is_empty() {
            return None;
        }

        let expected_return = mean(&returns);
        let std_dev = sample_std_dev(&returns);

        Some(AssetIndicatorSet {
            expected_return,
            std_dev,
            annualized_volatility: std_dev * self.annualization_factor,
            performance_index: guarded_ratio(expected_return, std_dev),
            sharpe_index: guarded_ratio(expected_return - self.daily_risk_free_rate, std_dev),
        })
    }

    /// 가격 레코드로 단일 자산 조회 결과를 만듭니다.
    ///
    /// 가격이 2개 미만이면 데이터 부족으로 보고 빈 결과를 반환합니다 (에러 아님).
    pub fn calculate(&self, bars: &[PriceBar]) -> AssetLookup {
        let closes: Vec<f64> = bars.iter().map(|bar| bar.close).collect();

        let Some(indicators) = self.indicators(&closes) else {
            debug!(points = bars.len(), "수익률 계산 불가, 빈 결과 반환");
            return AssetLookup::empty();
        };

        let historical_series: Vec<HistoricalBar> =
            bars.iter().filter_map(display_bar).collect();

        debug!(
            points = bars.len(),
            displayed = historical_series.len(),
            expected_return = indicators.expected_return,
            std_dev = indicators.std_dev,
            "단일 자산 지표 계산 완료"
        );

        AssetLookup {
            results: Some(round_indicators(indicators)),
            historical_series,
        }
    }
}

/// 표시용 레코드 변환. 유한하지 않은 값이 있으면 건너뜀.
fn display_bar(bar: &PriceBar) -> Option<HistoricalBar> {
    let values = [bar.close, bar.high, bar.low, bar.open];
    if values.iter().any(|v| !v.is_finite()) {
        return None;
    }

    Some(HistoricalBar {
        date: bar.date.format("%Y-%m-%d").to_string(),
        close: round_to(bar.close, DISPLAY_DECIMALS),
        high: round_to(bar.high, DISPLAY_DECIMALS),
        low: round_to(bar.low, DISPLAY_DECIMALS),
        open: round_to(bar.open, DISPLAY_DECIMALS),
    })
}

fn round_indicators(set: AssetIndicatorSet) -> AssetIndicatorSet {
    AssetIndicatorSet {
        expected_return: round_to(set.expected_return, RESULT_DECIMALS),
        std_dev: round_to(set.std_dev, RESULT_DECIMALS),
        annualized_volatility: round_to(set.annualized_volatility, RESULT_DECIMALS),
        performance_index: round_to(set.performance_index, RESULT_DECIMALS),
        sharpe_index: round_to(set.sharpe_index, RESULT_DECIMALS),
    }
}

/// 기본 설정으로 단일 자산 조회 결과를 계산합니다.
pub fn calculate_index_asset(bars: &[PriceBar]) -> AssetLookup {
    AssetIndicatorCalculator::default().calculate(bars)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn bars(closes: &[f64]) -> Vec<PriceBar> {
        closes
            .iter()
            .enumerate()
            .map(|(i, close)| {
                let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
                    + chrono::Duration::days(i as i64);
                PriceBar::from_close(date, *close)
            })
            .collect()
    }

    #[test]
    fn test_scenario_four_prices() {
        let lookup = calculate_index_asset(&bars(&[100.0, 102.0, 101.0, 105.0]));
        let results = lookup.results.unwrap();

        assert_eq!(results.expected_return, 1.66);
        assert_eq!(results.std_dev, 2.4879);
        assert!((results.annualized_volatility - 2.48788 * 252f64.sqrt()).abs() < 1e-2);
        assert_eq!(results.performance_index, 0.6672);
        assert_eq!(lookup.historical_series.len(), 4);
        assert_eq!(lookup.historical_series[0].date, "2024-01-01");
    }

    #[test]
    fn test_single_price_is_empty() {
        let lookup = calculate_index_asset(&bars(&[100.0]));
        assert_eq!(lookup, AssetLookup::empty());

        let lookup = calculate_index_asset(&[]);
        assert_eq!(lookup, AssetLookup::empty());
    }

    #[test]
    fn test_constant_prices_zero_guard() {
        let lookup = calculate_index_asset(&bars(&[50.0, 50.0, 50.0]));
        let results = lookup.results.unwrap();
        assert_eq!(results.std_dev, 0.0);
        assert_eq!(results.performance_index, 0.0);
        assert_eq!(results.sharpe_index, 0.0);
        assert!(!results.performance_index.is_nan());
    }

    #[test]
    fn test_two_prices_single_return() {
        let lookup = calculate_index_asset(&bars(&[10.0, 11.0]));
        let results = lookup.results.unwrap();
        assert_eq!(results.expected_return, 10.0);
        assert_eq!(results.std_dev, 0.0);
        assert_eq!(results.performance_index, 0.0);
    }

    #[test]
    fn test_display_rounding_and_skip() {
        let mut input = bars(&[10.123, 11.456, 12.789]);
        input[1].high = f64::NAN;

        let lookup = calculate_index_asset(&input);
        assert_eq!(lookup.historical_series.len(), 2);
        assert_eq!(lookup.historical_series[0].close, 10.12);
        assert_eq!(lookup.historical_series[1].close, 12.79);
    }

    #[test]
    fn test_sharpe_uses_daily_risk_free_rate() {
        let config = IndicatorConfig {
            risk_free_rate_annual_pct: 252.0,
            ..Default::default()
        };
        let calculator = AssetIndicatorCalculator::from_config(&config);
        let set = calculator.indicators(&[100.0, 102.0, 101.0, 105.0]).unwrap();

        // 일간 무위험 수익률 = 1.0
        let expected = (set.expected_return - 1.0) / set.std_dev;
        assert!((set.sharpe_index - expected).abs() < 1e-12);
    }
}
