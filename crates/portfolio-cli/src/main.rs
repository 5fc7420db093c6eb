//! 포트폴리오 지표 엔진 CLI.
//!
//! # 사용 예시
//!
//! ```bash
//! # 단일 자산 지표 조회
//! portfolio asset -t PETR4
//!
//! # 포트폴리오에 일별 이력 적재
//! portfolio ingest -p 3 -t PETR4 --admin 21
//!
//! # 포트폴리오 지표 계산
//! portfolio indicators -p 3 --admin 21
//!
//! # 스키마 마이그레이션
//! portfolio migrate
//! ```

use clap::{Parser, Subcommand};
use portfolio_core::{init_logging, AppConfig, LogConfig, LOG_FORMAT_ENV};
use tracing::{error, info};

use portfolio_cli::commands::asset::{run_asset, AssetCommand};
use portfolio_cli::commands::database::{run_health, run_migrate};
use portfolio_cli::commands::indicators::run_indicators;
use portfolio_cli::commands::ingest::run_ingest;

#[derive(Parser)]
#[command(name = "portfolio")]
#[command(about = "Portfolio indicator engine CLI - 자산/포트폴리오 지표 계산", long_about = None)]
#[command(version)]
struct Cli {
    /// 설정 파일 경로
    #[arg(short, long, global = true, default_value = "config/default.toml")]
    config: String,

    /// 데이터베이스 URL (기본: 설정 파일 또는 DATABASE_URL 환경변수)
    #[arg(long, global = true)]
    db_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 단일 자산 지표 조회 (시세 조회 → 정규화 → 지표)
    Asset {
        /// 티커 (예: PETR4, 시장 접미사 자동 추가)
        #[arg(short, long)]
        ticker: String,

        /// 조회 기간 (예: 1y, 6mo)
        #[arg(long)]
        period: Option<String>,

        /// 조회 간격 (예: 1d, 5d)
        #[arg(long)]
        interval: Option<String>,
    },

    /// 티커의 일별 이력을 포트폴리오에 적재
    Ingest {
        /// 포트폴리오 ID
        #[arg(short, long)]
        portfolio: i64,

        /// 티커 (예: PETR4)
        #[arg(short, long)]
        ticker: String,

        /// 요청 관리자 ID
        #[arg(long)]
        admin: i64,
    },

    /// 포트폴리오 지표 계산
    Indicators {
        /// 포트폴리오 ID
        #[arg(short, long)]
        portfolio: i64,

        /// 요청 관리자 ID
        #[arg(long)]
        admin: i64,
    },

    /// 데이터베이스 마이그레이션 실행
    Migrate,

    /// 시스템 상태 확인
    Health,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let mut config = AppConfig::load(&cli.config)?;
    if let Some(url) = cli
        .db_url
        .clone()
        .or_else(|| std::env::var("DATABASE_URL").ok())
    {
        config.database.url = url;
    }

    let log_config = LogConfig::from(&config.logging)
        .with_format_override(std::env::var(LOG_FORMAT_ENV).ok().as_deref());
    init_logging(&log_config)?;
    info!(config = %cli.config, "설정 로드 완료");

    let result = match cli.command {
        Commands::Asset {
            ticker,
            period,
            interval,
        } => {
            run_asset(
                &config,
                AssetCommand {
                    ticker,
                    period,
                    interval,
                },
            )
            .await
        }
        Commands::Ingest {
            portfolio,
            ticker,
            admin,
        } => run_ingest(&config, portfolio, &ticker, admin).await,
        Commands::Indicators { portfolio, admin } => {
            run_indicators(&config, portfolio, admin).await
        }
        Commands::Migrate => run_migrate(&config).await,
        Commands::Health => run_health(&config).await,
    };

    if let Err(e) = &result {
        error!(error = %e, "명령 실행 실패");
    }
    result
}
