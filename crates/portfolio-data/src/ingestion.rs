//! 가격 적재 조정기.
//!
//! 새로 받은 가격 포인트를 저장된 레코드와 대조해 새 레코드만 저장합니다.
//!
//! # 동작 방식
//!
//! 1. 주체의 포트폴리오 소유 여부 확인
//! 2. 후보 검증 (종가는 유한한 양수)
//! 3. 후보 안의 같은 날짜 정리 (같은 값은 건너뜀, 다른 값은 충돌)
//! 4. 하나의 트랜잭션 안에서 기존 날짜 조회 후 새 레코드 일괄 저장
//! 5. 커밋. 중간에 실패하면 트랜잭션을 버려 전부 롤백

use chrono::NaiveDate;
use portfolio_core::{
    IngestionReport, PortfolioError, PortfolioResult, PricePoint, Principal, Ticker,
};
use std::collections::HashMap;
use tracing::{debug, info, instrument, warn};

use crate::storage::PriceStore;

/// 가격 적재 조정기.
pub struct IngestionReconciler<'a> {
    store: &'a dyn PriceStore,
}

impl<'a> IngestionReconciler<'a> {
    pub fn new(store: &'a dyn PriceStore) -> Self {
        Self { store }
    }

    /// 후보 포인트 중 저장되지 않은 것만 저장합니다.
    ///
    /// # 에러
    ///
    /// - `NotFound`: 포트폴리오가 없거나 주체 소유가 아님
    /// - `DataShape`: 종가가 양수가 아니거나 유한하지 않음
    /// - `DuplicateConflict`: 후보 안에서 같은 날짜에 다른 종가
    /// - `Persistence`: 저장 실패 (아무것도 저장되지 않음)
    #[instrument(skip(self, ticker, candidates), fields(ticker = %ticker, candidates = candidates.len()))]
    pub async fn reconcile(
        &self,
        principal: Principal,
        portfolio_id: i64,
        ticker: &Ticker,
        candidates: &[(NaiveDate, f64)],
    ) -> PortfolioResult<IngestionReport> {
        if !self.store.portfolio_owned_by(principal, portfolio_id).await? {
            return Err(PortfolioError::NotFound(format!(
                "portfolio {portfolio_id} not found or not authorized"
            )));
        }

        let total_records = candidates.len();
        if total_records == 0 {
            return Ok(IngestionReport {
                ticker_resolved: ticker.to_string(),
                total_records: 0,
                inserted_records: 0,
                existing_records: 0,
            });
        }

        let unique = dedupe_candidates(ticker, candidates)?;
        let batch_duplicates = total_records - unique.len();

        let dates: Vec<NaiveDate> = unique.iter().map(|(date, _)| *date).collect();

        let mut tx = self.store.begin().await?;
        let existing = tx
            .existing_closes(portfolio_id, ticker.as_str(), &dates)
            .await?;

        // 저장된 값은 덮어쓰지 않고 차이만 기록
        let revised = revised_closes(&unique, &existing);
        for (date, stored, incoming) in &revised {
            warn!(
                ticker = %ticker,
                %date,
                stored = *stored,
                incoming = *incoming,
                "저장된 종가와 새 종가가 다름, 기존 값 유지"
            );
        }

        let novel: Vec<PricePoint> = unique
            .iter()
            .filter(|(date, _)| !existing.contains_key(date))
            .map(|(date, close)| PricePoint::new(ticker.as_str(), *date, *close))
            .collect();

        if !novel.is_empty() {
            let written = tx.bulk_insert(portfolio_id, &novel).await?;
            if written != novel.len() as u64 {
                // tx는 커밋 없이 버려져 롤백됨
                return Err(PortfolioError::Persistence(format!(
                    "expected {} inserted rows, store reported {}",
                    novel.len(),
                    written
                )));
            }
        }
        tx.commit().await?;

        let report = IngestionReport {
            ticker_resolved: ticker.to_string(),
            total_records,
            inserted_records: novel.len(),
            existing_records: existing.len() + batch_duplicates,
        };

        info!(
            portfolio_id,
            inserted = report.inserted_records,
            existing = report.existing_records,
            total = report.total_records,
            revised = revised.len(),
            "가격 적재 완료"
        );

        Ok(report)
    }
}

/// 이미 저장된 날짜 중 종가가 달라진 (날짜, 저장된 종가, 새 종가)를 찾습니다.
fn revised_closes(
    candidates: &[(NaiveDate, f64)],
    existing: &HashMap<NaiveDate, f64>,
) -> Vec<(NaiveDate, f64, f64)> {
    candidates
        .iter()
        .filter_map(|&(date, incoming)| match existing.get(&date) {
            Some(&stored) if stored != incoming => Some((date, stored, incoming)),
            _ => None,
        })
        .collect()
}

/// 후보를 검증하고 같은 날짜를 하나로 합칩니다. 입력 순서를 유지합니다.
fn dedupe_candidates(
    ticker: &Ticker,
    candidates: &[(NaiveDate, f64)],
) -> PortfolioResult<Vec<(NaiveDate, f64)>> {
    let mut seen: HashMap<NaiveDate, f64> = HashMap::with_capacity(candidates.len());
    let mut unique = Vec::with_capacity(candidates.len());

    for &(date, close) in candidates {
        if !close.is_finite() || close <= 0.0 {
            warn!(ticker = %ticker, %date, close, "잘못된 종가");
            return Err(PortfolioError::DataShape(format!(
                "close for {ticker} on {date} must be a positive number, got {close}"
            )));
        }

        match seen.get(&date) {
            Some(&existing) if existing == close => {
                debug!(ticker = %ticker, %date, "후보 안의 중복 날짜 건너뜀");
            }
            Some(&existing) => {
                return Err(PortfolioError::DuplicateConflict {
                    ticker: ticker.to_string(),
                    date,
                    existing,
                    incoming: close,
                });
            }
            None => {
                seen.insert(date, close);
                unique.push((date, close));
            }
        }
    }

    Ok(unique)
}
