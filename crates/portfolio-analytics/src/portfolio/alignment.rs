//! 여러 자산 시계열의 날짜 정렬.
//!
//! 모든 자산에 존재하는 날짜만 남기는 내부 조인(inner join)을 수행합니다.

use chrono::NaiveDate;
use portfolio_core::PriceSeries;
use std::collections::BTreeSet;

/// 공통 날짜로 정렬된 가격 행렬.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedPrices {
    /// 공통 날짜 (오름차순)
    pub dates: Vec<NaiveDate>,
    /// 입력 순서대로의 (티커, 공통 날짜 종가) 목록
    pub columns: Vec<(String, Vec<f64>)>,
}

impl AlignedPrices {
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// 티커의 정렬된 종가를 조회합니다.
    pub fn closes(&self, ticker: &str) -> Option<&[f64]> {
        self.columns
            .iter()
            .find(|(t, _)| t == ticker)
            .map(|(_, closes)| closes.as_slice())
    }
}

/// 모든 시계열에 공통으로 존재하는 날짜로 정렬합니다.
///
/// 시계열이 하나도 없으면 공통 날짜도 없습니다.
pub fn align_on_common_dates(series: &[PriceSeries]) -> AlignedPrices {
    let mut iter = series.iter();
    let Some(first) = iter.next() else {
        return AlignedPrices {
            dates: Vec::new(),
            columns: Vec::new(),
        };
    };

    let mut common: BTreeSet<NaiveDate> = first.dates().iter().copied().collect();
    for s in iter {
        let dates: BTreeSet<NaiveDate> = s.dates().iter().copied().collect();
        common = common.intersection(&dates).copied().collect();
        if common.is_empty() {
            break;
        }
    }

    let dates: Vec<NaiveDate> = common.into_iter().collect();
    let columns = series
        .iter()
        .map(|s| {
            let closes = dates
                .iter()
                .filter_map(|date| s.close_on(*date))
                .collect::<Vec<f64>>();
            (s.ticker().to_string(), closes)
        })
        .collect();

    AlignedPrices { dates, columns }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, day).unwrap()
    }

    fn series(ticker: &str, points: &[(u32, f64)]) -> PriceSeries {
        PriceSeries::from_points(ticker, points.iter().map(|(day, close)| (d(*day), *close)))
            .unwrap()
    }

    #[test]
    fn test_inner_join_drops_missing_dates() {
        let a = series("A", &[(1, 10.0), (2, 11.0), (3, 12.0), (4, 13.0)]);
        let b = series("B", &[(1, 20.0), (3, 22.0), (4, 23.0)]);
        let m = series("M", &[(1, 100.0), (2, 101.0), (3, 102.0), (4, 103.0), (5, 104.0)]);

        let aligned = align_on_common_dates(&[a, b, m]);

        assert_eq!(aligned.dates, vec![d(1), d(3), d(4)]);
        assert_eq!(aligned.closes("A").unwrap(), &[10.0, 12.0, 13.0]);
        assert_eq!(aligned.closes("B").unwrap(), &[20.0, 22.0, 23.0]);
        assert_eq!(aligned.closes("M").unwrap(), &[100.0, 102.0, 103.0]);
    }

    #[test]
    fn test_disjoint_series_is_empty() {
        let a = series("A", &[(1, 10.0), (2, 11.0)]);
        let b = series("B", &[(3, 20.0), (4, 21.0)]);
        assert!(align_on_common_dates(&[a, b]).is_empty());
    }

    #[test]
    fn test_no_series_is_empty() {
        assert!(align_on_common_dates(&[]).is_empty());
    }

    #[test]
    fn test_column_order_follows_input() {
        let b = series("B", &[(1, 1.0)]);
        let a = series("A", &[(1, 2.0)]);
        let aligned = align_on_common_dates(&[b, a]);
        let tickers: Vec<&str> = aligned.columns.iter().map(|(t, _)| t.as_str()).collect();
        assert_eq!(tickers, vec!["B", "A"]);
    }
}
