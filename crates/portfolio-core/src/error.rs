//! 포트폴리오 지표 엔진의 에러 타입.
//!
//! 구조적/전제 조건 실패만 에러로 올립니다. 표준편차 0, 분산 0, 빈 시계열 같은
//! 수치적 경계 상황은 각 계산 지점에서 0으로 대체하고 에러로 취급하지 않습니다.

use chrono::NaiveDate;
use thiserror::Error;

/// 포트폴리오 지표 엔진 에러.
#[derive(Debug, Error)]
pub enum PortfolioError {
    /// 가격 테이블에 필수 컬럼(날짜 축, 종가)이 없음
    #[error("데이터 형식 에러: {0}")]
    DataShape(String),

    /// 공통 날짜가 없거나 비벤치마크 자산이 없음
    #[error("데이터 부족: {0}")]
    InsufficientData(String),

    /// 벤치마크 티커가 자산 목록에 없음
    #[error("벤치마크 누락: {0} 티커가 포트폴리오에 필요합니다")]
    MissingBenchmark(String),

    /// 저장소 작업 실패 (진행 중인 배치는 롤백됨)
    #[error("저장소 에러: {0}")]
    Persistence(String),

    /// 시세 제공자 호출 실패 또는 타임아웃
    #[error("시세 조회 에러: {0}")]
    UpstreamFetch(String),

    /// 포트폴리오를 찾을 수 없거나 접근 권한 없음
    #[error("찾을 수 없음: {0}")]
    NotFound(String),

    /// 같은 (티커, 날짜) 키에 서로 다른 종가가 들어옴
    #[error("중복 키 충돌: {ticker} {date} ({existing} != {incoming})")]
    DuplicateConflict {
        ticker: String,
        date: NaiveDate,
        existing: f64,
        incoming: f64,
    },

    /// 잘못된 입력
    #[error("잘못된 입력: {0}")]
    InvalidInput(String),

    /// 설정 에러
    #[error("설정 에러: {0}")]
    Config(String),
}

/// 포트폴리오 엔진 작업을 위한 Result 타입.
pub type PortfolioResult<T> = Result<T, PortfolioError>;

impl PortfolioError {
    /// 재시도 가능한 에러인지 확인합니다.
    ///
    /// 엔진 내부에서는 재시도하지 않습니다. 호출자가 백오프 여부를 결정합니다.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            PortfolioError::Persistence(_) | PortfolioError::UpstreamFetch(_)
        )
    }

    /// 호출자가 입력을 고쳐서 해결할 수 있는 에러인지 확인합니다.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            PortfolioError::DataShape(_)
                | PortfolioError::InsufficientData(_)
                | PortfolioError::MissingBenchmark(_)
                | PortfolioError::NotFound(_)
                | PortfolioError::DuplicateConflict { .. }
                | PortfolioError::InvalidInput(_)
        )
    }
}

impl From<serde_json::Error> for PortfolioError {
    fn from(err: serde_json::Error) -> Self {
        PortfolioError::InvalidInput(err.to_string())
    }
}

impl From<::config::ConfigError> for PortfolioError {
    fn from(err: ::config::ConfigError) -> Self {
        PortfolioError::Config(err.to_string())
    }
}
