//! 단일 자산 지표 조회 명령어.
//!
//! # 사용 예시
//!
//! ```bash
//! # 기본 요약 기간(1y, 5d)으로 조회
//! portfolio asset -t PETR4
//!
//! # 기간과 간격 지정
//! portfolio asset -t VALE3 --period 6mo --interval 1d
//! ```

use anyhow::Result;
use portfolio_core::AppConfig;
use portfolio_data::{AssetLookupOutcome, FetchRequest};
use serde_json::json;
use tracing::{info, warn};

use super::{build_service, print_json};

/// 자산 조회 옵션.
#[derive(Debug, Clone)]
pub struct AssetCommand {
    pub ticker: String,
    pub period: Option<String>,
    pub interval: Option<String>,
}

impl AssetCommand {
    /// 기간/간격 중 하나라도 지정되면 나머지는 설정값으로 채웁니다.
    fn request(&self, config: &AppConfig) -> Option<FetchRequest> {
        if self.period.is_none() && self.interval.is_none() {
            return None;
        }
        let market = &config.market_data;
        Some(FetchRequest::new(
            self.period.as_deref().unwrap_or(&market.summary_period),
            self.interval.as_deref().unwrap_or(&market.summary_interval),
        ))
    }
}

/// 자산 지표를 조회해 JSON으로 출력합니다.
pub async fn run_asset(config: &AppConfig, command: AssetCommand) -> Result<()> {
    // 조회만 하므로 데이터베이스 연결은 지연
    let service = build_service(config, true).await?;

    match service
        .lookup_asset(&command.ticker, command.request(config))
        .await?
    {
        AssetLookupOutcome::Found(lookup) => {
            info!(
                ticker = %command.ticker,
                bars = lookup.historical_series.len(),
                "자산 지표 조회 완료"
            );
            print_json(&lookup)
        }
        AssetLookupOutcome::NoData { ticker } => {
            warn!(ticker = %ticker, "시세 데이터 없음");
            print_json(&json!({
                "ticker": ticker,
                "message": format!("no market data for {ticker}"),
            }))
        }
    }
}
