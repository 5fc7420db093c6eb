//! # Portfolio Data
//!
//! 시세 조회, 원시 테이블 정규화, 가격 저장소, 적재 조정을 담당합니다.
//!
//! - [`normalizer`]: 원시 가격 테이블 → 정규화된 일별 가격 레코드
//! - [`provider`]: 시세 Provider trait과 Yahoo Finance 구현
//! - [`storage`]: 가격 저장소 trait과 PostgreSQL/메모리 구현
//! - [`ingestion`]: 새 레코드만 골라 하나의 트랜잭션으로 저장
//! - [`service`]: 조회/적재/집계 흐름

pub mod error;
pub mod ingestion;
pub mod normalizer;
pub mod provider;
pub mod service;
pub mod storage;

pub use error::{DataError, Result};
pub use ingestion::IngestionReconciler;
pub use normalizer::{normalize, Cell, ColumnLabel, RawPriceTable, ResolvedSchema};
pub use provider::{
    fetch_with_timeout, FetchMode, FetchOutcome, FetchRequest, MarketDataProvider,
    YahooFinanceProvider,
};
pub use service::{AssetLookupOutcome, PortfolioService};
pub use storage::{Database, InMemoryPriceStore, PgPriceStore, PriceStore, PriceTransaction};
