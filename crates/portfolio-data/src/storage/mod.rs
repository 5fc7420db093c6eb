//! 가격 저장소 모듈.
//!
//! 포트폴리오별 일별 종가를 저장하고 조회합니다.
//! (포트폴리오, 티커, 날짜) 당 하나의 레코드만 존재합니다.
//!
//! - `PgPriceStore`: PostgreSQL 저장소
//! - `InMemoryPriceStore`: 테스트/로컬 실행용 메모리 저장소

pub mod memory;
pub mod postgres;

pub use memory::InMemoryPriceStore;
pub use postgres::{Database, PgPriceStore, StoredPriceRecord};

use async_trait::async_trait;
use chrono::NaiveDate;
use portfolio_core::{PricePoint, PriceSeries, Principal};
use std::collections::HashMap;

use crate::error::{DataError, Result};

/// 포트폴리오 가격 저장소 trait.
#[async_trait]
pub trait PriceStore: Send + Sync {
    /// 주체가 포트폴리오를 소유하는지 확인합니다.
    async fn portfolio_owned_by(&self, principal: Principal, portfolio_id: i64) -> Result<bool>;

    /// 포트폴리오의 모든 티커별 종가 시계열을 불러옵니다.
    ///
    /// 티커는 처음 등록된 순서로 반환됩니다. 소유하지 않은 포트폴리오는 `NotFound`.
    async fn load_all_series(
        &self,
        principal: Principal,
        portfolio_id: i64,
    ) -> Result<Vec<PriceSeries>>;

    /// 쓰기 트랜잭션을 시작합니다.
    async fn begin(&self) -> Result<Box<dyn PriceTransaction + '_>>;
}

/// 가격 쓰기 트랜잭션.
///
/// `commit` 없이 버리면 모든 쓰기가 롤백됩니다.
#[async_trait]
pub trait PriceTransaction: Send {
    /// (포트폴리오, 티커, 날짜) 레코드의 저장된 종가를 조회합니다.
    async fn stored_close(
        &mut self,
        portfolio_id: i64,
        ticker: &str,
        date: NaiveDate,
    ) -> Result<Option<f64>>;

    /// (포트폴리오, 티커, 날짜) 레코드가 있는지 확인합니다.
    async fn exists(&mut self, portfolio_id: i64, ticker: &str, date: NaiveDate) -> Result<bool> {
        Ok(self.stored_close(portfolio_id, ticker, date).await?.is_some())
    }

    /// 주어진 날짜 중 이미 저장된 날짜와 그 종가를 조회합니다.
    ///
    /// 기본 구현은 날짜마다 `stored_close`를 호출합니다.
    async fn existing_closes(
        &mut self,
        portfolio_id: i64,
        ticker: &str,
        dates: &[NaiveDate],
    ) -> Result<HashMap<NaiveDate, f64>> {
        let mut found = HashMap::new();
        for date in dates {
            if let Some(close) = self.stored_close(portfolio_id, ticker, *date).await? {
                found.insert(*date, close);
            }
        }
        Ok(found)
    }

    /// 가격 포인트를 일괄 저장합니다. 저장된 레코드 수를 반환합니다.
    async fn bulk_insert(&mut self, portfolio_id: i64, points: &[PricePoint]) -> Result<u64>;

    /// 트랜잭션을 커밋합니다.
    async fn commit(self: Box<Self>) -> Result<()>;
}

/// 조회된 행을 티커별 시계열로 묶습니다. 티커는 처음 나온 순서를 유지합니다.
pub(crate) fn group_into_series(points: Vec<PricePoint>) -> Result<Vec<PriceSeries>> {
    let mut grouped: Vec<(String, Vec<(NaiveDate, f64)>)> = Vec::new();
    for point in points {
        match grouped.iter_mut().find(|(ticker, _)| *ticker == point.ticker) {
            Some((_, values)) => values.push((point.date, point.close)),
            None => grouped.push((point.ticker, vec![(point.date, point.close)])),
        }
    }

    grouped
        .into_iter()
        .map(|(ticker, values)| {
            PriceSeries::from_points(ticker, values)
                .map_err(|e| DataError::InvalidData(e.to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 2, day).unwrap()
    }

    #[test]
    fn test_group_into_series_keeps_first_seen_order() {
        let points = vec![
            PricePoint::new("VALE3.SA", d(1), 60.0),
            PricePoint::new("BOVA11.SA", d(1), 100.0),
            PricePoint::new("VALE3.SA", d(2), 61.0),
            PricePoint::new("BOVA11.SA", d(2), 101.0),
        ];

        let series = group_into_series(points).unwrap();

        assert_eq!(series.len(), 2);
        assert_eq!(series[0].ticker(), "VALE3.SA");
        assert_eq!(series[0].closes(), &[60.0, 61.0]);
        assert_eq!(series[1].ticker(), "BOVA11.SA");
    }
}
