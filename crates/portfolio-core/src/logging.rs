//! tracing 기반 로깅 초기화.
//!
//! 표준 출력은 CLI 결과 JSON 전용이므로 모든 로그는 stderr로 보냅니다.
//! 출력 형식은 pretty, json, compact 중 하나입니다.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::config::LoggingConfig;
use crate::error::{PortfolioError, PortfolioResult};

/// 설정 파일의 로그 형식을 덮어쓰는 환경 변수.
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

/// 로그 출력 형식.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// 사람이 읽기 쉬운 여러 줄 형식
    #[default]
    Pretty,
    /// 로그 수집기용 JSON 한 줄 형식
    Json,
    /// 간결한 한 줄 형식
    Compact,
}

impl std::str::FromStr for LogFormat {
    type Err = PortfolioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            "compact" => Ok(Self::Compact),
            other => Err(PortfolioError::Config(format!("unknown log format: {other}"))),
        }
    }
}

/// 로깅 초기화 설정.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// `RUST_LOG`이 없을 때 쓰는 필터 (예: "info", "portfolio_data=debug")
    pub level: String,
    pub format: LogFormat,
    /// 파일명과 줄 번호 포함 여부
    pub with_location: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
            with_location: true,
        }
    }
}

impl LogConfig {
    pub fn new(level: impl Into<String>) -> Self {
        Self {
            level: level.into(),
            ..Default::default()
        }
    }

    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// `LOG_FORMAT` 같은 외부 값으로 형식을 덮어씁니다.
    ///
    /// 값이 없거나 알 수 없는 형식이면 기존 형식을 유지합니다.
    pub fn with_format_override(self, raw: Option<&str>) -> Self {
        match raw.map(str::parse::<LogFormat>) {
            Some(Ok(format)) => self.with_format(format),
            _ => self,
        }
    }
}

impl From<&LoggingConfig> for LogConfig {
    fn from(config: &LoggingConfig) -> Self {
        Self::new(config.level.clone()).with_format(config.format.parse().unwrap_or_default())
    }
}

/// 전역 로깅 구독자를 설치합니다.
///
/// `RUST_LOG`이 설정되어 있으면 `config.level`보다 우선합니다.
/// 이미 구독자가 설치되어 있으면 `Config` 에러를 반환합니다.
pub fn init_logging(config: &LogConfig) -> PortfolioResult<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .map_err(|e| PortfolioError::Config(format!("invalid log filter: {e}")))?;

    let base = fmt::layer()
        .with_writer(std::io::stderr)
        .with_file(config.with_location)
        .with_line_number(config.with_location);

    let fmt_layer = match config.format {
        LogFormat::Pretty => base.pretty().boxed(),
        LogFormat::Json => base.json().boxed(),
        LogFormat::Compact => base.compact().boxed(),
    };

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(env_filter)
        .try_init()
        .map_err(|e| PortfolioError::Config(format!("logging already initialized: {e}")))?;

    tracing::debug!(format = ?config.format, level = %config.level, "로깅 초기화");
    Ok(())
}

/// 포트폴리오/티커 컨텍스트 필드가 포함된 span을 생성하는 매크로.
#[macro_export]
macro_rules! portfolio_span {
    ($name:expr, $portfolio_id:expr) => {
        tracing::info_span!($name, portfolio_id = %$portfolio_id)
    };
    ($name:expr, $portfolio_id:expr, $ticker:expr) => {
        tracing::info_span!($name, portfolio_id = %$portfolio_id, ticker = %$ticker)
    };
}
