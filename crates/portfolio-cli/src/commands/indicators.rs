//! 포트폴리오 지표 명령어.
//!
//! ```bash
//! portfolio indicators -p 3 --admin 21
//! ```

use anyhow::Result;
use portfolio_core::{portfolio_span, AppConfig, Principal};
use tracing::Instrument;

use super::{build_service, print_json};

/// 포트폴리오에 저장된 자산으로 지표를 계산해 출력합니다.
pub async fn run_indicators(config: &AppConfig, portfolio_id: i64, admin_id: i64) -> Result<()> {
    let service = build_service(config, false).await?;

    let indicators = service
        .portfolio_indicators(Principal::admin(admin_id), portfolio_id)
        .instrument(portfolio_span!("indicators", portfolio_id))
        .await?;

    print_json(&indicators)
}
