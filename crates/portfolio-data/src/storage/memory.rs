//! 메모리 가격 저장소.
//!
//! 테스트와 데이터베이스 없는 로컬 실행에 사용합니다.
//! 트랜잭션 안의 쓰기는 커밋 전까지 버퍼에만 쌓이므로, 커밋하지 않고 버리면
//! 저장소에는 아무것도 남지 않습니다.

use async_trait::async_trait;
use chrono::NaiveDate;
use portfolio_core::{PricePoint, PriceSeries, Principal};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::{group_into_series, PriceStore, PriceTransaction};
use crate::error::{DataError, Result};

#[derive(Debug, Clone, PartialEq)]
struct StoredRow {
    portfolio_id: i64,
    point: PricePoint,
}

#[derive(Debug, Default)]
struct MemoryState {
    /// 포트폴리오 ID → 소유 관리자 ID
    owners: HashMap<i64, i64>,
    /// 저장 순서대로의 레코드
    rows: Vec<StoredRow>,
    /// 다음 일괄 저장을 실패시킴
    fail_next_insert: bool,
}

impl MemoryState {
    fn find(&self, portfolio_id: i64, ticker: &str, date: NaiveDate) -> Option<&PricePoint> {
        self.rows
            .iter()
            .find(|row| {
                row.portfolio_id == portfolio_id
                    && row.point.ticker == ticker
                    && row.point.date == date
            })
            .map(|row| &row.point)
    }

    fn contains(&self, portfolio_id: i64, ticker: &str, date: NaiveDate) -> bool {
        self.find(portfolio_id, ticker, date).is_some()
    }
}

/// 메모리 가격 저장소.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPriceStore {
    state: Arc<RwLock<MemoryState>>,
}

impl InMemoryPriceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 관리자 소유의 포트폴리오를 등록합니다.
    pub async fn register_portfolio(&self, portfolio_id: i64, admin_id: i64) {
        self.state.write().await.owners.insert(portfolio_id, admin_id);
    }

    /// 트랜잭션 없이 레코드를 바로 저장합니다.
    pub async fn seed(&self, portfolio_id: i64, points: &[PricePoint]) -> Result<()> {
        let mut state = self.state.write().await;
        for point in points {
            if state.contains(portfolio_id, &point.ticker, point.date) {
                return Err(duplicate(portfolio_id, point));
            }
            state.rows.push(StoredRow {
                portfolio_id,
                point: point.clone(),
            });
        }
        Ok(())
    }

    /// 포트폴리오의 저장된 레코드를 저장 순서대로 반환합니다.
    pub async fn points(&self, portfolio_id: i64) -> Vec<PricePoint> {
        self.state
            .read()
            .await
            .rows
            .iter()
            .filter(|row| row.portfolio_id == portfolio_id)
            .map(|row| row.point.clone())
            .collect()
    }

    /// 다음 `bulk_insert` 호출을 실패시킵니다.
    pub async fn fail_next_insert(&self) {
        self.state.write().await.fail_next_insert = true;
    }
}

fn duplicate(portfolio_id: i64, point: &PricePoint) -> DataError {
    DataError::DuplicateError(format!(
        "asset_prices ({}, {}, {}) already exists",
        portfolio_id, point.ticker, point.date
    ))
}

#[async_trait]
impl PriceStore for InMemoryPriceStore {
    async fn portfolio_owned_by(&self, principal: Principal, portfolio_id: i64) -> Result<bool> {
        let state = self.state.read().await;
        Ok(state.owners.get(&portfolio_id) == Some(&principal.admin_id))
    }

    async fn load_all_series(
        &self,
        principal: Principal,
        portfolio_id: i64,
    ) -> Result<Vec<PriceSeries>> {
        if !self.portfolio_owned_by(principal, portfolio_id).await? {
            return Err(DataError::NotFound(format!(
                "portfolio {portfolio_id} not found or not authorized"
            )));
        }
        group_into_series(self.points(portfolio_id).await)
    }

    async fn begin(&self) -> Result<Box<dyn PriceTransaction + '_>> {
        Ok(Box::new(MemoryTransaction {
            store: self,
            pending: Vec::new(),
        }))
    }
}

/// 메모리 저장소 트랜잭션.
struct MemoryTransaction<'a> {
    store: &'a InMemoryPriceStore,
    pending: Vec<StoredRow>,
}

impl MemoryTransaction<'_> {
    fn pending_find(&self, portfolio_id: i64, ticker: &str, date: NaiveDate) -> Option<f64> {
        self.pending
            .iter()
            .find(|row| {
                row.portfolio_id == portfolio_id
                    && row.point.ticker == ticker
                    && row.point.date == date
            })
            .map(|row| row.point.close)
    }

    fn pending_contains(&self, portfolio_id: i64, ticker: &str, date: NaiveDate) -> bool {
        self.pending_find(portfolio_id, ticker, date).is_some()
    }
}

#[async_trait]
impl<'a> PriceTransaction for MemoryTransaction<'a> {
    async fn stored_close(
        &mut self,
        portfolio_id: i64,
        ticker: &str,
        date: NaiveDate,
    ) -> Result<Option<f64>> {
        if let Some(close) = self.pending_find(portfolio_id, ticker, date) {
            return Ok(Some(close));
        }
        let state = self.store.state.read().await;
        Ok(state
            .find(portfolio_id, ticker, date)
            .map(|point| point.close))
    }

    async fn bulk_insert(&mut self, portfolio_id: i64, points: &[PricePoint]) -> Result<u64> {
        {
            let mut state = self.store.state.write().await;
            if state.fail_next_insert {
                state.fail_next_insert = false;
                return Err(DataError::InsertError("injected insert failure".to_string()));
            }
            for point in points {
                if state.contains(portfolio_id, &point.ticker, point.date) {
                    return Err(duplicate(portfolio_id, point));
                }
            }
        }

        for point in points {
            if self.pending_contains(portfolio_id, &point.ticker, point.date) {
                return Err(duplicate(portfolio_id, point));
            }
            self.pending.push(StoredRow {
                portfolio_id,
                point: point.clone(),
            });
        }
        Ok(points.len() as u64)
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        let MemoryTransaction { store, pending } = *self;
        let mut state = store.state.write().await;
        for row in &pending {
            if state.contains(row.portfolio_id, &row.point.ticker, row.point.date) {
                return Err(duplicate(row.portfolio_id, &row.point));
            }
        }
        state.rows.extend(pending);
        Ok(())
    }
}
