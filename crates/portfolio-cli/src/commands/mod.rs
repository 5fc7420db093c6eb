//! CLI 명령어 구현 모듈.

pub mod asset;
pub mod database;
pub mod indicators;
pub mod ingest;

use anyhow::Result;
use portfolio_core::AppConfig;
use portfolio_data::{Database, PgPriceStore, PortfolioService, YahooFinanceProvider};
use serde::Serialize;
use std::sync::Arc;

/// 결과를 보기 좋은 JSON으로 표준 출력에 씁니다.
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Yahoo Finance Provider와 PostgreSQL 저장소로 서비스를 구성합니다.
///
/// `lazy`이면 첫 쿼리 전까지 데이터베이스에 연결하지 않습니다.
pub async fn build_service(config: &AppConfig, lazy: bool) -> Result<PortfolioService> {
    let provider = YahooFinanceProvider::new()?;

    let db = if lazy {
        Database::connect_lazy(&config.database)?
    } else {
        Database::connect(&config.database).await?
    };

    Ok(PortfolioService::new(
        Arc::new(provider),
        Arc::new(PgPriceStore::new(db)),
        config,
    ))
}
