//! 가격 데이터 도메인 모델.
//!
//! - `PriceBar`: 정규화된 일별 OHLC 레코드 (종가 필수, 나머지는 종가로 대체 가능)
//! - `PricePoint`: 저장 단위 (티커, 날짜, 종가)
//! - `PriceSeries`: 한 티커의 날짜 오름차순 종가 시계열

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{PortfolioError, PortfolioResult};

/// 정규화된 일별 가격 레코드.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub close: f64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
}

impl PriceBar {
    /// 종가만 있는 레코드를 생성합니다. 시가/고가/저가는 종가로 채웁니다.
    pub fn from_close(date: NaiveDate, close: f64) -> Self {
        Self {
            date,
            close,
            open: close,
            high: close,
            low: close,
        }
    }
}

/// 저장 단위 가격 포인트.
///
/// (포트폴리오, 티커, 날짜) 당 하나만 존재합니다. 유일성은 저장소 제약으로 보장됩니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub ticker: String,
    pub date: NaiveDate,
    pub close: f64,
}

impl PricePoint {
    pub fn new(ticker: impl Into<String>, date: NaiveDate, close: f64) -> Self {
        Self {
            ticker: ticker.into(),
            date,
            close,
        }
    }
}

/// 한 티커의 종가 시계열.
///
/// 날짜는 엄격하게 증가하며 같은 날짜가 두 번 나오지 않습니다.
/// 요청마다 저장된 데이터나 새로 받은 데이터로부터 만들어지며 따로 저장되지 않습니다.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    ticker: String,
    dates: Vec<NaiveDate>,
    closes: Vec<f64>,
}

impl PriceSeries {
    /// 순서가 보장되지 않는 (날짜, 종가) 목록으로 시계열을 생성합니다.
    ///
    /// 날짜순으로 정렬하고, 같은 날짜에 같은 종가가 반복되면 하나로 합칩니다.
    /// 같은 날짜에 다른 종가가 들어오면 `DuplicateConflict`를 반환합니다.
    /// 종가가 유한한 양수가 아니면 `DataShape`를 반환합니다.
    pub fn from_points(
        ticker: impl Into<String>,
        points: impl IntoIterator<Item = (NaiveDate, f64)>,
    ) -> PortfolioResult<Self> {
        let ticker = ticker.into();
        let mut sorted: Vec<(NaiveDate, f64)> = points.into_iter().collect();
        sorted.sort_by_key(|(date, _)| *date);

        let mut dates = Vec::with_capacity(sorted.len());
        let mut closes: Vec<f64> = Vec::with_capacity(sorted.len());

        for (date, close) in sorted {
            if !close.is_finite() || close <= 0.0 {
                return Err(PortfolioError::DataShape(format!(
                    "close for {ticker} on {date} must be a positive number, got {close}"
                )));
            }
            if dates.last() == Some(&date) {
                let existing = closes[closes.len() - 1];
                if existing != close {
                    return Err(PortfolioError::DuplicateConflict {
                        ticker,
                        date,
                        existing,
                        incoming: close,
                    });
                }
                continue;
            }
            dates.push(date);
            closes.push(close);
        }

        Ok(Self {
            ticker,
            dates,
            closes,
        })
    }

    /// 정규화된 가격 레코드로 시계열을 생성합니다.
    pub fn from_bars(ticker: impl Into<String>, bars: &[PriceBar]) -> PortfolioResult<Self> {
        Self::from_points(ticker, bars.iter().map(|bar| (bar.date, bar.close)))
    }

    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn closes(&self) -> &[f64] {
        &self.closes
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// 특정 날짜의 종가를 조회합니다.
    pub fn close_on(&self, date: NaiveDate) -> Option<f64> {
        self.dates
            .binary_search(&date)
            .ok()
            .map(|idx| self.closes[idx])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    #[test]
    fn test_from_points_sorts_by_date() {
        let series =
            PriceSeries::from_points("PETR4.SA", vec![(d(3), 31.0), (d(1), 30.0), (d(2), 30.5)])
                .unwrap();

        assert_eq!(series.dates(), &[d(1), d(2), d(3)]);
        assert_eq!(series.closes(), &[30.0, 30.5, 31.0]);
    }

    #[test]
    fn test_from_points_merges_identical_duplicates() {
        let series =
            PriceSeries::from_points("PETR4.SA", vec![(d(1), 30.0), (d(1), 30.0), (d(2), 31.0)])
                .unwrap();
        assert_eq!(series.len(), 2);
    }

    #[test]
    fn test_from_points_rejects_conflicting_duplicates() {
        let result = PriceSeries::from_points("PETR4.SA", vec![(d(1), 30.0), (d(1), 29.0)]);
        assert!(matches!(
            result,
            Err(PortfolioError::DuplicateConflict { .. })
        ));
    }

    #[test]
    fn test_from_points_rejects_non_positive_close() {
        for bad in [0.0, -1.0, f64::NAN] {
            let result = PriceSeries::from_points("PETR4.SA", vec![(d(1), 30.0), (d(2), bad)]);
            assert!(matches!(result, Err(PortfolioError::DataShape(_))));
        }
    }

    #[test]
    fn test_close_on() {
        let series = PriceSeries::from_points("VALE3.SA", vec![(d(1), 60.0), (d(5), 62.0)]).unwrap();
        assert_eq!(series.close_on(d(5)), Some(62.0));
        assert_eq!(series.close_on(d(2)), None);
    }

    #[test]
    fn test_bar_from_close_fills_ohl() {
        let bar = PriceBar::from_close(d(1), 10.5);
        assert_eq!(bar.open, 10.5);
        assert_eq!(bar.high, 10.5);
        assert_eq!(bar.low, 10.5);
    }
}
