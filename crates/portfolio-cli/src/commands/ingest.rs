//! 이력 적재 명령어.
//!
//! 시세 제공자에서 일별 이력을 받아 포트폴리오에 저장합니다.
//! 이미 저장된 날짜는 건너뜁니다.
//!
//! ```bash
//! portfolio ingest -p 3 -t PETR4 --admin 21
//! ```

use anyhow::Result;
use portfolio_core::{portfolio_span, AppConfig, Principal};
use tracing::{info, Instrument};

use super::{build_service, print_json};

/// 티커 이력을 포트폴리오에 적재하고 결과를 출력합니다.
pub async fn run_ingest(
    config: &AppConfig,
    portfolio_id: i64,
    ticker: &str,
    admin_id: i64,
) -> Result<()> {
    let service = build_service(config, false).await?;

    let report = service
        .ingest_history(Principal::admin(admin_id), portfolio_id, ticker)
        .instrument(portfolio_span!("ingest", portfolio_id, ticker))
        .await?;

    info!(
        ticker = %report.ticker_resolved,
        inserted = report.inserted_records,
        existing = report.existing_records,
        "적재 명령 완료"
    );

    print_json(&report)
}
