//! Yahoo Finance 시세 Provider.
//!
//! `yahoo_finance_api` 크레이트로 차트 데이터를 조회해 `Date` 인덱스를 가진
//! 원시 가격 테이블(`Open`, `High`, `Low`, `Close`, `Adj Close`, `Volume`)로 변환합니다.

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use portfolio_core::Ticker;
use tracing::debug;
use yahoo_finance_api as yahoo;

use super::{FetchOutcome, FetchRequest, MarketDataProvider};
use crate::error::{DataError, Result};
use crate::normalizer::{Cell, RawPriceTable};

/// 테이블 컬럼 순서.
const COLUMNS: [&str; 6] = ["Open", "High", "Low", "Close", "Adj Close", "Volume"];

/// Yahoo Finance Provider.
pub struct YahooFinanceProvider {
    connector: yahoo::YahooConnector,
}

impl YahooFinanceProvider {
    pub fn new() -> Result<Self> {
        let connector = yahoo::YahooConnector::new()
            .map_err(|e| DataError::ConnectionError(format!("Yahoo Finance 연결 실패: {}", e)))?;
        Ok(Self { connector })
    }
}

/// Yahoo 시세 목록을 원시 테이블로 변환합니다.
///
/// 유효하지 않은 타임스탬프는 누락 날짜로 두고 정규화 단계에서 걸러냅니다.
pub(crate) fn quotes_to_table(quotes: &[yahoo::Quote]) -> RawPriceTable {
    let mut table = RawPriceTable::new(COLUMNS).with_index("Date");
    for q in quotes {
        let date = Utc
            .timestamp_opt(q.timestamp as i64, 0)
            .single()
            .map(|dt| Cell::Date(dt.date_naive()))
            .unwrap_or(Cell::Missing);

        table.push_indexed_row(
            date,
            vec![
                Cell::Number(q.open),
                Cell::Number(q.high),
                Cell::Number(q.low),
                Cell::Number(q.close),
                Cell::Number(q.adjclose),
                Cell::Number(q.volume as f64),
            ],
        );
    }
    table
}

#[async_trait]
impl MarketDataProvider for YahooFinanceProvider {
    fn name(&self) -> &str {
        "yahoo"
    }

    async fn fetch(&self, ticker: &Ticker, request: &FetchRequest) -> Result<FetchOutcome> {
        debug!(
            ticker = %ticker,
            interval = %request.interval,
            range = %request.period,
            "Yahoo Finance API 호출"
        );

        let response = self
            .connector
            .get_quote_range(ticker.as_str(), &request.interval, &request.period)
            .await
            .map_err(|e| {
                DataError::FetchError(format!("Yahoo Finance API 오류 ({}): {}", ticker, e))
            })?;

        let quotes = response
            .quotes()
            .map_err(|e| DataError::ParseError(format!("Quote 파싱 오류: {}", e)))?;

        debug!(ticker = %ticker, quotes = quotes.len(), "Yahoo Finance 응답 수신");

        Ok(FetchOutcome::from_table(quotes_to_table(&quotes)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalizer::normalize;
    use chrono::NaiveDate;

    fn quote(timestamp: i64, close: f64, adjclose: f64) -> yahoo::Quote {
        yahoo::Quote {
            timestamp: timestamp as _,
            open: close - 0.5,
            high: close + 1.0,
            low: close - 1.0,
            volume: 1_000,
            close,
            adjclose,
        }
    }

    #[test]
    fn test_quotes_normalize_with_plain_close() {
        // 2024-01-02 13:00 UTC, 2024-01-03 13:00 UTC
        let quotes = vec![quote(1_704_200_400, 30.0, 29.5), quote(1_704_286_800, 31.0, 30.5)];

        let bars = normalize(&quotes_to_table(&quotes)).unwrap();

        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].date, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        assert_eq!(bars[0].close, 30.0);
        assert_eq!(bars[1].high, 32.0);
    }

    #[test]
    fn test_no_quotes_is_no_data() {
        assert_eq!(FetchOutcome::from_table(quotes_to_table(&[])), FetchOutcome::NoData);
    }
}
