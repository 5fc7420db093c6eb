//! 티커 정규화.
//!
//! 사용자 입력 티커(예: "petr4")를 저장소와 시세 제공자가 공통으로 쓰는
//! 정규 형식(예: "PETR4.SA")으로 변환합니다.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{PortfolioError, PortfolioResult};

/// 정규화된 티커 심볼.
///
/// 항상 대문자이며 거래소 시장 접미사를 포함합니다.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ticker(String);

impl Ticker {
    /// 원시 티커를 정규 형식으로 변환합니다.
    ///
    /// 공백을 제거하고 대문자로 바꾼 뒤, 접미사가 없으면 `market_suffix`를 붙입니다.
    /// 접미사 비교는 대소문자를 구분하지 않습니다.
    ///
    /// # 예시
    ///
    /// ```
    /// use portfolio_core::Ticker;
    ///
    /// let ticker = Ticker::canonical("petr4", ".SA").unwrap();
    /// assert_eq!(ticker.as_str(), "PETR4.SA");
    /// ```
    pub fn canonical(raw: &str, market_suffix: &str) -> PortfolioResult<Self> {
        let upper = raw.trim().to_uppercase();
        if upper.is_empty() {
            return Err(PortfolioError::InvalidInput(
                "ticker must not be empty".to_string(),
            ));
        }

        let suffix = market_suffix.trim().to_uppercase();
        if suffix.is_empty() || upper.ends_with(&suffix) {
            return Ok(Self(upper));
        }

        Ok(Self(format!("{}{}", upper, suffix)))
    }

    /// 문자열 참조를 반환합니다.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// 내부 문자열을 반환합니다.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Ticker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Ticker {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
