//! 포트폴리오 지표 통합 테스트.
//!
//! 집계기의 핵심 성질을 검증합니다:
//! - 벤치마크 누락/벤치마크만 있는 포트폴리오 에러
//! - 동일 가중치 합 = 1
//! - 벤치마크 베타 = 1.0
//! - 베타 공분산 대각 = 표본 분산
//! - 날짜가 어긋난 시계열의 내부 조인

use chrono::NaiveDate;
use portfolio_analytics::portfolio::covariance::matrix_entry;
use portfolio_analytics::{calculate_index_asset, PortfolioAggregator};
use portfolio_core::{IndicatorConfig, PortfolioError, PriceBar, PriceSeries};
use proptest::prelude::*;

// ================================================================================================
// 헬퍼 함수
// ================================================================================================

const BENCHMARK: &str = "BOVA11.SA";

fn day(offset: i64) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 2).unwrap() + chrono::Duration::days(offset)
}

/// 연속된 날짜의 종가 시계열 생성.
fn series(ticker: &str, closes: &[f64]) -> PriceSeries {
    PriceSeries::from_points(
        ticker,
        closes
            .iter()
            .enumerate()
            .map(|(i, close)| (day(i as i64), *close)),
    )
    .unwrap()
}

fn aggregator() -> PortfolioAggregator {
    PortfolioAggregator::from_config(&IndicatorConfig::default())
}

// ================================================================================================
// 에러 시나리오
// ================================================================================================

#[test]
fn benchmark_absent_is_missing_benchmark() {
    let input = vec![
        series("PETR4.SA", &[30.0, 30.6, 30.1, 31.2]),
        series("VALE3.SA", &[60.0, 61.0, 60.2, 60.9]),
    ];

    let err = aggregator().aggregate(&input).unwrap_err();

    assert!(matches!(err, PortfolioError::MissingBenchmark(ref t) if t == BENCHMARK));
    assert!(err.to_string().contains(BENCHMARK));
}

#[test]
fn benchmark_only_is_insufficient_data() {
    let input = vec![series(BENCHMARK, &[100.0, 101.0, 99.5, 102.0])];

    let err = aggregator().aggregate(&input).unwrap_err();

    assert!(matches!(err, PortfolioError::InsufficientData(_)));
}

#[test]
fn disjoint_dates_is_insufficient_data() {
    let a = PriceSeries::from_points("PETR4.SA", vec![(day(0), 30.0), (day(1), 31.0)]).unwrap();
    let m = PriceSeries::from_points(BENCHMARK, vec![(day(5), 100.0), (day(6), 101.0)]).unwrap();

    let err = aggregator().aggregate(&[a, m]).unwrap_err();

    assert!(matches!(err, PortfolioError::InsufficientData(_)));
}

// ================================================================================================
// 집계 결과
// ================================================================================================

#[test]
fn misaligned_series_use_common_dates_only() {
    let a = PriceSeries::from_points(
        "PETR4.SA",
        vec![(day(0), 30.0), (day(1), 31.0), (day(2), 30.5), (day(3), 32.0)],
    )
    .unwrap();
    let b = PriceSeries::from_points(
        "VALE3.SA",
        vec![(day(1), 60.0), (day(2), 61.0), (day(3), 59.0), (day(4), 62.0)],
    )
    .unwrap();
    let m = PriceSeries::from_points(
        BENCHMARK,
        vec![(day(0), 100.0), (day(1), 101.0), (day(2), 102.0), (day(3), 100.5)],
    )
    .unwrap();

    let result = aggregator().aggregate(&[a, b, m]).unwrap();

    assert_eq!(result.aligned_dates, 3);
    assert_eq!(result.first_date, Some(day(1)));
    assert_eq!(result.last_date, Some(day(3)));
    // 31.0 → 30.5 → 32.0
    let expected = ((30.5 - 31.0) / 31.0 * 100.0 + (32.0 - 30.5) / 30.5 * 100.0) / 2.0;
    assert!((result.expected_return["PETR4.SA"] - expected).abs() < 1e-12);
}

#[test]
fn weights_and_benchmark_beta() {
    let input = vec![
        series("PETR4.SA", &[30.0, 30.6, 30.1, 31.2, 31.0]),
        series(BENCHMARK, &[100.0, 101.0, 99.5, 102.0, 101.5]),
        series("VALE3.SA", &[60.0, 61.0, 60.2, 60.9, 62.3]),
        series("ITUB4.SA", &[25.0, 25.4, 25.1, 25.8, 25.6]),
    ];

    let result = aggregator().aggregate(&input).unwrap();

    assert_eq!(
        result.ordered_tickers,
        vec!["PETR4.SA", "VALE3.SA", "ITUB4.SA", BENCHMARK]
    );
    assert_eq!(result.beta[BENCHMARK], 1.0);
    assert_eq!(result.weight[BENCHMARK], 0.0);
    for ticker in ["PETR4.SA", "VALE3.SA", "ITUB4.SA"] {
        assert!((result.weight[ticker] - 1.0 / 3.0).abs() < 1e-12);
    }

    let expected_return: f64 = ["PETR4.SA", "VALE3.SA", "ITUB4.SA"]
        .iter()
        .map(|t| result.expected_return[*t] / 3.0)
        .sum();
    assert!((result.portfolio.expected_return - expected_return).abs() < 1e-12);
    assert!((result.portfolio.std_dev.powi(2) - result.portfolio.variance).abs() < 1e-9);
}

#[test]
fn single_asset_stats_agree_with_calculator() {
    let closes = [30.0, 30.6, 30.1, 31.2, 31.0];
    let input = vec![
        series("PETR4.SA", &closes),
        series(BENCHMARK, &[100.0, 101.0, 99.5, 102.0, 101.5]),
    ];
    let bars: Vec<PriceBar> = closes
        .iter()
        .enumerate()
        .map(|(i, c)| PriceBar::from_close(day(i as i64), *c))
        .collect();

    let result = aggregator().aggregate(&input).unwrap();
    let lookup = calculate_index_asset(&bars).results.unwrap();

    assert!((result.expected_return["PETR4.SA"] - lookup.expected_return).abs() < 1e-4);
    assert!((result.std_dev["PETR4.SA"] - lookup.std_dev).abs() < 1e-4);
}

#[test]
fn result_serializes_with_camel_case_keys() {
    let input = vec![
        series("PETR4.SA", &[30.0, 30.6, 30.1]),
        series(BENCHMARK, &[100.0, 101.0, 99.5]),
    ];
    let result = aggregator().aggregate(&input).unwrap();

    let json = serde_json::to_value(&result).unwrap();

    assert!(json.get("covarianceBeta").is_some());
    assert!(json["portfolio"].get("return").is_some());
    assert_eq!(json["beta"][BENCHMARK], 1.0);
}

// ================================================================================================
// 성질 테스트
// ================================================================================================

fn closes_strategy(len: usize) -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(1.0f64..500.0, len)
}

proptest! {
    #[test]
    fn prop_weights_sum_to_one(
        asset_count in 1usize..6,
        data in prop::collection::vec(closes_strategy(8), 7),
    ) {
        let mut input: Vec<PriceSeries> = (0..asset_count)
            .map(|i| series(&format!("ASSET{i}.SA"), &data[i]))
            .collect();
        input.push(series(BENCHMARK, &data[6]));

        let result = aggregator().aggregate(&input).unwrap();

        let total: f64 = result.weight.values().sum();
        prop_assert!((total - 1.0).abs() < 1e-9);
        prop_assert_eq!(result.beta[BENCHMARK], 1.0);
    }

    #[test]
    fn prop_beta_covariance_diagonal_is_empirical_variance(
        data in prop::collection::vec(closes_strategy(10), 3),
    ) {
        let input = vec![
            series("PETR4.SA", &data[0]),
            series("VALE3.SA", &data[1]),
            series(BENCHMARK, &data[2]),
        ];

        let result = aggregator().aggregate(&input).unwrap();

        for ticker in &result.ordered_tickers {
            prop_assert_eq!(
                matrix_entry(&result.covariance_beta, ticker, ticker),
                matrix_entry(&result.covariance, ticker, ticker)
            );
        }
        prop_assert!(result.portfolio.variance >= 0.0);
    }
}
