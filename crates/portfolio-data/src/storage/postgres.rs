//! PostgreSQL 가격 저장소 구현.
//!
//! `asset_prices` 테이블에 포트폴리오별 일별 종가를 저장합니다.
//! 종가는 `NUMERIC`으로 저장하고 저장소 경계에서 `f64`로 변환합니다.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use portfolio_core::{DatabaseConfig, PricePoint, PriceSeries, Principal};
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::{FromRow, Postgres, Transaction};
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, info, instrument};

use super::{group_into_series, PriceStore, PriceTransaction};
use crate::error::{DataError, Result};

/// 한 번의 INSERT에 넣을 최대 행 수.
const INSERT_CHUNK_SIZE: usize = 500;

/// 데이터베이스 연결 풀 래퍼.
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// 새로운 데이터베이스 연결 풀을 생성합니다.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        info!("Connecting to database...");

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
            .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
            .connect(&config.url)
            .await
            .map_err(|e| DataError::ConnectionError(e.to_string()))?;

        info!("Database connection established");

        Ok(Self { pool })
    }

    /// 첫 쿼리 시점에 연결하는 풀을 생성합니다.
    pub fn connect_lazy(config: &DatabaseConfig) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
            .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
            .connect_lazy(&config.url)
            .map_err(|e| DataError::ConnectionError(e.to_string()))?;

        Ok(Self { pool })
    }

    /// 내부 연결 풀을 반환합니다.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// 데이터베이스 마이그레이션을 실행합니다.
    pub async fn migrate(&self) -> Result<()> {
        info!("Running database migrations...");

        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| DataError::MigrationError(e.to_string()))?;

        info!("Migrations completed successfully");
        Ok(())
    }

    /// 데이터베이스 상태를 확인합니다.
    pub async fn health_check(&self) -> Result<bool> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| DataError::QueryError(e.to_string()))?;
        Ok(true)
    }
}

/// 가격 레코드 데이터베이스 행.
#[derive(Debug, Clone, FromRow)]
pub struct StoredPriceRecord {
    pub portfolio_id: i64,
    pub ticker: String,
    pub price_date: NaiveDate,
    pub close: Decimal,
    pub created_at: DateTime<Utc>,
}

impl StoredPriceRecord {
    /// 도메인 가격 포인트로 변환합니다.
    pub fn to_point(&self) -> Result<PricePoint> {
        let close = decimal_to_close(self.close, &self.ticker, self.price_date)?;
        Ok(PricePoint::new(self.ticker.clone(), self.price_date, close))
    }
}

/// 저장된 `Decimal` 종가를 `f64`로 변환합니다.
fn decimal_to_close(close: Decimal, ticker: &str, date: NaiveDate) -> Result<f64> {
    close.to_f64().ok_or_else(|| {
        DataError::InvalidData(format!("close {close} out of range for {ticker} {date}"))
    })
}

/// 종가를 저장용 `Decimal`로 변환합니다.
pub fn close_to_decimal(close: f64) -> Result<Decimal> {
    Decimal::from_f64(close)
        .ok_or_else(|| DataError::InvalidData(format!("close {close} is not representable")))
}

/// PostgreSQL 가격 저장소.
#[derive(Clone)]
pub struct PgPriceStore {
    db: Database,
}

impl PgPriceStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl PriceStore for PgPriceStore {
    #[instrument(skip(self))]
    async fn portfolio_owned_by(&self, principal: Principal, portfolio_id: i64) -> Result<bool> {
        let owned: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1
                FROM portfolios p
                JOIN clients c ON c.id = p.client_id
                WHERE p.id = $1 AND c.admin_id = $2
            )
            "#,
        )
        .bind(portfolio_id)
        .bind(principal.admin_id)
        .fetch_one(self.db.pool())
        .await?;

        Ok(owned)
    }

    #[instrument(skip(self))]
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

        let records: Vec<StoredPriceRecord> = sqlx::query_as(
            r#"
            SELECT portfolio_id, ticker, price_date, close, created_at
            FROM asset_prices
            WHERE portfolio_id = $1
            ORDER BY id ASC
            "#,
        )
        .bind(portfolio_id)
        .fetch_all(self.db.pool())
        .await?;

        debug!(rows = records.len(), "가격 레코드 조회");

        let points = records
            .iter()
            .map(StoredPriceRecord::to_point)
            .collect::<Result<Vec<_>>>()?;

        group_into_series(points)
    }

    async fn begin(&self) -> Result<Box<dyn PriceTransaction + '_>> {
        let tx = self
            .db
            .pool()
            .begin()
            .await
            .map_err(|e| DataError::TransactionError(e.to_string()))?;
        Ok(Box::new(PgPriceTransaction { tx }))
    }
}

/// PostgreSQL 쓰기 트랜잭션.
///
/// sqlx 트랜잭션은 커밋 없이 드롭되면 롤백됩니다.
pub struct PgPriceTransaction {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl PriceTransaction for PgPriceTransaction {
    async fn stored_close(
        &mut self,
        portfolio_id: i64,
        ticker: &str,
        date: NaiveDate,
    ) -> Result<Option<f64>> {
        let close: Option<Decimal> = sqlx::query_scalar(
            r#"
            SELECT close FROM asset_prices
            WHERE portfolio_id = $1 AND ticker = $2 AND price_date = $3
            "#,
        )
        .bind(portfolio_id)
        .bind(ticker)
        .bind(date)
        .fetch_optional(&mut *self.tx)
        .await?;

        close
            .map(|close| decimal_to_close(close, ticker, date))
            .transpose()
    }

    async fn existing_closes(
        &mut self,
        portfolio_id: i64,
        ticker: &str,
        dates: &[NaiveDate],
    ) -> Result<HashMap<NaiveDate, f64>> {
        if dates.is_empty() {
            return Ok(HashMap::new());
        }

        let dates: Vec<NaiveDate> = dates.to_vec();
        let rows: Vec<(NaiveDate, Decimal)> = sqlx::query_as(
            r#"
            SELECT price_date, close FROM asset_prices
            WHERE portfolio_id = $1 AND ticker = $2 AND price_date = ANY($3)
            "#,
        )
        .bind(portfolio_id)
        .bind(ticker)
        .bind(&dates)
        .fetch_all(&mut *self.tx)
        .await?;

        rows.into_iter()
            .map(|(date, close)| Ok((date, decimal_to_close(close, ticker, date)?)))
            .collect()
    }

    #[instrument(skip(self, points), fields(count = points.len()))]
    async fn bulk_insert(&mut self, portfolio_id: i64, points: &[PricePoint]) -> Result<u64> {
        let mut inserted = 0u64;

        // UNNEST 패턴으로 일괄 삽입
        for chunk in points.chunks(INSERT_CHUNK_SIZE) {
            let portfolio_ids: Vec<i64> = chunk.iter().map(|_| portfolio_id).collect();
            let tickers: Vec<&str> = chunk.iter().map(|p| p.ticker.as_str()).collect();
            let dates: Vec<NaiveDate> = chunk.iter().map(|p| p.date).collect();
            let closes: Vec<Decimal> = chunk
                .iter()
                .map(|p| close_to_decimal(p.close))
                .collect::<Result<_>>()?;

            let result = sqlx::query(
                r#"
                INSERT INTO asset_prices (portfolio_id, ticker, price_date, close)
                SELECT * FROM UNNEST($1::bigint[], $2::text[], $3::date[], $4::numeric[])
                "#,
            )
            .bind(&portfolio_ids)
            .bind(&tickers)
            .bind(&dates)
            .bind(&closes)
            .execute(&mut *self.tx)
            .await
            .map_err(DataError::from)?;

            inserted += result.rows_affected();
        }

        Ok(inserted)
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        self.tx
            .commit()
            .await
            .map_err(|e| DataError::TransactionError(e.to_string()))
    }
}
