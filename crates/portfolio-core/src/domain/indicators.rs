//! 지표 계산 결과 모델.
//!
//! 호출자에게 노출되는 구조체들입니다. 전송 형식과 무관하며 serde로 직렬화할 때
//! 필드명은 camelCase를 사용합니다.

use chrono::NaiveDate;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;

/// 티커 쌍 → 공분산 (중첩 맵).
pub type CovarianceMatrix = BTreeMap<String, BTreeMap<String, f64>>;

/// 티커 → 값.
pub type TickerMap = BTreeMap<String, f64>;

/// 단일 자산 지표.
///
/// 표준편차가 0이면 성과 지수와 샤프 지수는 0입니다.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetIndicatorSet {
    /// 기대 수익률 (일간 수익률 평균, %)
    pub expected_return: f64,
    /// 표본 표준편차 (n-1, %)
    pub std_dev: f64,
    /// 연율화 변동성 (표준편차 × √거래일수)
    pub annualized_volatility: f64,
    /// 기대 수익률 / 표준편차
    pub performance_index: f64,
    /// (기대 수익률 - 무위험 수익률) / 표준편차
    pub sharpe_index: f64,
}

/// 화면 표시용 과거 시세 한 줄.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoricalBar {
    /// ISO 날짜 (YYYY-MM-DD)
    pub date: String,
    pub close: f64,
    pub high: f64,
    pub low: f64,
    pub open: f64,
}

/// 단일 자산 조회 결과.
///
/// 데이터가 부족하면 `results`는 `None`이며 빈 객체(`{}`)로 직렬화됩니다.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetLookup {
    #[serde(serialize_with = "serialize_results")]
    pub results: Option<AssetIndicatorSet>,
    pub historical_series: Vec<HistoricalBar>,
}

impl AssetLookup {
    /// 데이터 부족 결과 (지표 없음, 시계열 없음).
    pub fn empty() -> Self {
        Self {
            results: None,
            historical_series: Vec::new(),
        }
    }
}

fn serialize_results<S>(value: &Option<AssetIndicatorSet>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match value {
        Some(set) => set.serialize(serializer),
        None => BTreeMap::<String, f64>::new().serialize(serializer),
    }
}

/// 포트폴리오 집계 지표.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioIndicatorSet {
    /// 가중 기대 수익률
    #[serde(rename = "return")]
    pub expected_return: f64,
    /// wᵗΣw
    pub variance: f64,
    /// √variance
    pub std_dev: f64,
    pub performance_index: f64,
    pub sharpe_index: f64,
}

/// 포트폴리오 지표 계산 전체 결과.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioIndicators {
    /// 출력 순서 (벤치마크는 항상 마지막)
    pub ordered_tickers: Vec<String>,
    /// 벤치마크 티커
    pub benchmark: String,
    /// 정렬된 공통 날짜 수
    pub aligned_dates: usize,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
    pub expected_return: TickerMap,
    pub std_dev: TickerMap,
    pub performance_index: TickerMap,
    pub sharpe_index: TickerMap,
    pub weight: TickerMap,
    pub beta: TickerMap,
    /// 표본 공분산 행렬
    pub covariance: CovarianceMatrix,
    /// 베타 기반 공분산 행렬 (대각선은 표본 분산)
    pub covariance_beta: CovarianceMatrix,
    pub portfolio: PortfolioIndicatorSet,
}

/// 적재 결과.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestionReport {
    /// 정규화된 티커
    pub ticker_resolved: String,
    /// 후보 포인트 수
    pub total_records: usize,
    /// 새로 저장된 포인트 수
    pub inserted_records: usize,
    /// 이미 존재해서 건너뛴 포인트 수
    pub existing_records: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_lookup_serializes_results_as_object() {
        let json = serde_json::to_value(AssetLookup::empty()).unwrap();
        assert_eq!(json["results"], serde_json::json!({}));
        assert_eq!(json["historicalSeries"], serde_json::json!([]));
    }

    #[test]
    fn test_lookup_field_names() {
        let lookup = AssetLookup {
            results: Some(AssetIndicatorSet {
                expected_return: 1.66,
                std_dev: 2.4879,
                annualized_volatility: 39.4942,
                performance_index: 0.6672,
                sharpe_index: 0.6664,
            }),
            historical_series: vec![],
        };
        let json = serde_json::to_value(lookup).unwrap();
        assert_eq!(json["results"]["expectedReturn"], 1.66);
        assert!(json["results"].get("annualizedVolatility").is_some());
    }

    #[test]
    fn test_portfolio_set_return_field() {
        let set = PortfolioIndicatorSet {
            expected_return: 0.1,
            variance: 0.04,
            std_dev: 0.2,
            performance_index: 0.5,
            sharpe_index: 0.49,
        };
        let json = serde_json::to_value(set).unwrap();
        assert_eq!(json["return"], 0.1);
        assert_eq!(json["stdDev"], 0.2);
    }
}
