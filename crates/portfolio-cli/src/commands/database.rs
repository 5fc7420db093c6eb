//! 데이터베이스 관리 명령어.

use anyhow::Result;
use portfolio_core::AppConfig;
use portfolio_data::Database;
use serde_json::json;
use tracing::{error, info};

use super::print_json;

/// 마이그레이션을 실행합니다.
pub async fn run_migrate(config: &AppConfig) -> Result<()> {
    let db = Database::connect(&config.database).await?;
    db.migrate().await?;
    info!("마이그레이션 완료");
    Ok(())
}

/// 데이터베이스 연결 상태를 확인해 출력합니다.
pub async fn run_health(config: &AppConfig) -> Result<()> {
    info!("Checking system health...");

    let database = match Database::connect(&config.database).await {
        Ok(db) => match db.health_check().await {
            Ok(_) => "ok".to_string(),
            Err(e) => {
                error!(error = %e, "데이터베이스 상태 확인 실패");
                format!("error: {e}")
            }
        },
        Err(e) => {
            error!(error = %e, "데이터베이스 연결 실패");
            format!("unreachable: {e}")
        }
    };

    print_json(&json!({
        "cli": "ok",
        "database": database,
        "benchmark": config.indicators.benchmark_ticker,
    }))
}
