//! 원시 가격 테이블 정규화.
//!
//! 시세 제공자가 돌려주는 테이블은 컬럼 이름과 날짜 축 위치가 제각각입니다.
//! 여기서는 후보 이름을 순서대로 대조해 [`ResolvedSchema`]를 만든 뒤,
//! 날짜 오름차순의 [`PriceBar`] 목록으로 변환합니다.
//!
//! # 처리 규칙
//!
//! - 다단 컬럼 레이블은 첫 단계만 사용
//! - 날짜 축: `Date`, `Datetime`, `date`, `datetime` 컬럼 순, 그다음 이름 있는 인덱스
//! - 종가: `close`가 수정 종가(`Adj Close` 등)보다 우선 (대소문자 무시)
//! - 종가가 없거나 숫자가 아닌 행은 버림
//! - 날짜를 해석할 수 없는 행은 경고 로그 후 건너뜀
//! - 시가/고가/저가가 없으면 종가로 채움
//! - 같은 날짜가 여러 번 나오면 마지막 행을 사용

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use portfolio_core::{PortfolioError, PortfolioResult, PriceBar};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// 날짜 컬럼 후보 (우선순위 순).
const DATE_CANDIDATES: [&str; 4] = ["Date", "Datetime", "date", "datetime"];

/// 수정 종가 레이블 (소문자, 공백/구분자 제거 후 비교).
const ADJUSTED_CLOSE_LABELS: [&str; 2] = ["adjclose", "adjustedclose"];

/// 테이블 셀 값.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Number(f64),
    Text(String),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    Missing,
}

impl Cell {
    /// 유한한 숫자로 해석합니다.
    fn as_number(&self) -> Option<f64> {
        let value = match self {
            Cell::Number(v) => *v,
            Cell::Text(s) => s.trim().parse::<f64>().ok()?,
            _ => return None,
        };
        value.is_finite().then_some(value)
    }

    /// 달력 날짜로 해석합니다.
    fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Cell::Date(d) => Some(*d),
            Cell::DateTime(dt) => Some(dt.date()),
            Cell::Text(s) => parse_date_text(s),
            Cell::Number(_) | Cell::Missing => None,
        }
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Number(value)
    }
}

impl From<NaiveDate> for Cell {
    fn from(value: NaiveDate) -> Self {
        Cell::Date(value)
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

impl<T: Into<Cell>> From<Option<T>> for Cell {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Cell::Missing)
    }
}

fn parse_date_text(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S") {
        return Some(dt.date());
    }
    // "2024-01-02 00:00:00-03:00" 같은 형식은 앞 10자리만 사용
    text.get(..10)
        .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok())
}

/// 컬럼 레이블. 다단 레이블은 단계별 문자열 목록입니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnLabel(Vec<String>);

impl ColumnLabel {
    pub fn single(name: impl Into<String>) -> Self {
        Self(vec![name.into()])
    }

    pub fn multi<I, S>(levels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(levels.into_iter().map(Into::into).collect())
    }

    /// 첫 단계 레이블 (평탄화 결과).
    pub fn flattened(&self) -> &str {
        self.0.first().map(String::as_str).unwrap_or("")
    }
}

impl From<&str> for ColumnLabel {
    fn from(value: &str) -> Self {
        Self::single(value)
    }
}

/// 테이블 인덱스 (행 레이블).
#[derive(Debug, Clone, PartialEq)]
pub struct RawIndex {
    pub name: Option<String>,
    pub values: Vec<Cell>,
}

/// 시세 제공자가 돌려준 원시 가격 테이블.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawPriceTable {
    columns: Vec<ColumnLabel>,
    rows: Vec<Vec<Cell>>,
    index: Option<RawIndex>,
}

impl RawPriceTable {
    /// 컬럼 레이블로 빈 테이블을 생성합니다.
    pub fn new<I, L>(columns: I) -> Self
    where
        I: IntoIterator<Item = L>,
        L: Into<ColumnLabel>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
            index: None,
        }
    }

    /// 이름 있는 인덱스를 설정합니다. 인덱스 값은 행 추가 시 함께 넣습니다.
    pub fn with_index(mut self, name: impl Into<String>) -> Self {
        self.index = Some(RawIndex {
            name: Some(name.into()),
            values: Vec::new(),
        });
        self
    }

    /// 행을 추가합니다. 컬럼 수보다 짧은 행은 누락 셀로 채웁니다.
    pub fn push_row(&mut self, mut cells: Vec<Cell>) {
        cells.resize(self.columns.len(), Cell::Missing);
        self.rows.push(cells);
    }

    /// 인덱스 값과 함께 행을 추가합니다.
    pub fn push_indexed_row(&mut self, index_value: Cell, cells: Vec<Cell>) {
        let index = self.index.get_or_insert_with(|| RawIndex {
            name: None,
            values: Vec::new(),
        });
        // 앞선 행에 인덱스가 없었다면 누락으로 채움
        index.values.resize(self.rows.len(), Cell::Missing);
        index.values.push(index_value);
        self.push_row(cells);
    }

    pub fn columns(&self) -> &[ColumnLabel] {
        &self.columns
    }

    pub fn index(&self) -> Option<&RawIndex> {
        self.index.as_ref()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn cell(&self, row: usize, column: usize) -> &Cell {
        self.rows
            .get(row)
            .and_then(|cells| cells.get(column))
            .unwrap_or(&Cell::Missing)
    }

    fn index_cell(&self, row: usize) -> &Cell {
        self.index
            .as_ref()
            .and_then(|index| index.values.get(row))
            .unwrap_or(&Cell::Missing)
    }
}

/// 날짜 축 위치.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateSource {
    Column(usize),
    Index,
}

/// 컬럼 해석 결과.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSchema {
    pub date: DateSource,
    pub close: usize,
    pub open: Option<usize>,
    pub high: Option<usize>,
    pub low: Option<usize>,
}

fn label_key(label: &str) -> String {
    label
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

impl ResolvedSchema {
    /// 테이블의 날짜 축과 가격 컬럼을 해석합니다.
    ///
    /// # 에러
    ///
    /// 날짜 축이나 종가 컬럼을 찾지 못하면 `DataShape`.
    pub fn resolve(table: &RawPriceTable) -> PortfolioResult<Self> {
        let labels: Vec<&str> = table.columns.iter().map(ColumnLabel::flattened).collect();
        let find_exact = |name: &str| labels.iter().position(|label| *label == name);
        let find_key = |key: &str| labels.iter().position(|label| label_key(label) == key);

        let index_name = table.index.as_ref().and_then(|index| index.name.as_deref());

        let date = DATE_CANDIDATES
            .iter()
            .find_map(|candidate| {
                find_exact(*candidate)
                    .map(DateSource::Column)
                    .or_else(|| (index_name == Some(*candidate)).then_some(DateSource::Index))
            })
            .or_else(|| index_name.map(|_| DateSource::Index))
            .ok_or_else(|| {
                PortfolioError::DataShape(format!("no date axis among columns {:?}", labels))
            })?;

        let close = find_key("close")
            .or_else(|| ADJUSTED_CLOSE_LABELS.iter().find_map(|key| find_key(*key)))
            .ok_or_else(|| {
                PortfolioError::DataShape(format!("no close column among {:?}", labels))
            })?;

        Ok(Self {
            date,
            close,
            open: find_key("open"),
            high: find_key("high"),
            low: find_key("low"),
        })
    }
}

/// 원시 테이블을 날짜 오름차순의 정규화된 가격 레코드로 변환합니다.
///
/// 정리 후 레코드가 하나도 없어도 정상 결과입니다.
pub fn normalize(table: &RawPriceTable) -> PortfolioResult<Vec<PriceBar>> {
    let schema = ResolvedSchema::resolve(table)?;

    let mut by_date: BTreeMap<NaiveDate, PriceBar> = BTreeMap::new();
    let mut dropped_close = 0usize;
    let mut skipped_date = 0usize;

    for row in 0..table.row_count() {
        // 종가는 유한한 양수만 사용
        let Some(close) = table
            .cell(row, schema.close)
            .as_number()
            .filter(|close| *close > 0.0)
        else {
            dropped_close += 1;
            continue;
        };

        let date_cell = match schema.date {
            DateSource::Column(idx) => table.cell(row, idx),
            DateSource::Index => table.index_cell(row),
        };
        let Some(date) = date_cell.as_date() else {
            warn!(row, value = ?date_cell, "날짜 해석 실패, 행 건너뜀");
            skipped_date += 1;
            continue;
        };

        let price_or_close = |column: Option<usize>| {
            column
                .and_then(|idx| table.cell(row, idx).as_number())
                .unwrap_or(close)
        };

        // 같은 날짜는 마지막 행으로 덮어씀
        by_date.insert(
            date,
            PriceBar {
                date,
                close,
                open: price_or_close(schema.open),
                high: price_or_close(schema.high),
                low: price_or_close(schema.low),
            },
        );
    }

    debug!(
        rows = table.row_count(),
        bars = by_date.len(),
        dropped_close,
        skipped_date,
        "가격 테이블 정규화 완료"
    );

    Ok(by_date.into_values().collect())
}

/// 정규화된 레코드를 표준 형식의 테이블로 되돌립니다.
///
/// `Date` 컬럼과 `Open`, `High`, `Low`, `Close` 컬럼을 갖습니다.
pub fn bars_to_table(bars: &[PriceBar]) -> RawPriceTable {
    let mut table = RawPriceTable::new(["Date", "Open", "High", "Low", "Close"]);
    for bar in bars {
        table.push_row(vec![
            Cell::Date(bar.date),
            Cell::Number(bar.open),
            Cell::Number(bar.high),
            Cell::Number(bar.low),
            Cell::Number(bar.close),
        ]);
    }
    table
}
