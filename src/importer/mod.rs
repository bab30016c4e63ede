//! 엑셀 일괄 가져오기
//!
//! 첫 시트의 첫 행을 헤더로 보고 나머지 행을 정비 레코드 초안으로 변환한다.
//! 셀 값의 해석은 coerce.rs 의 전체 함수가 담당하므로 컨테이너를 읽을 수만
//! 있으면 행 단위로는 실패하지 않는다.

pub mod cell;
pub mod coerce;

pub use cell::CellValue;

use crate::error::{ReportError, Result};
use calamine::{open_workbook_auto_from_rs, Reader};
use chrono::{Local, NaiveDate, NaiveDateTime};
use coerce::{coerce_completed, coerce_date, coerce_department, coerce_text, coerce_time};
use npk_sop_common::layout::{
    COL_ACTION, COL_CAUSE, COL_EQUIPMENT, COL_FAIL_DATE, COL_FAIL_TIME, COL_NOTIFICATION_NO,
    COL_STATUS, COL_WORK_CONTENT, COL_WORK_DEPT,
};
use npk_sop_common::locale::format_created_at;
use npk_sop_common::ReportDraft;
use std::collections::HashMap;
use std::io::Cursor;
use std::path::Path;

/// 헤더 이름 → 셀 값
pub type RawRow = HashMap<String, CellValue>;

static EMPTY_CELL: CellValue = CellValue::Empty;

/// 양식의 예시 행 제거 정책
///
/// 데이터 행이 2개 이상이면 첫 행은 양식에 들어 있던 예시로 보고 버린다.
/// 1개뿐이면 그대로 둔다.
pub fn drop_template_example_row<T>(rows: Vec<T>) -> Vec<T> {
    if rows.len() > 1 {
        rows.into_iter().skip(1).collect()
    } else {
        rows
    }
}

/// 바이트 → 레코드 초안 (현재 시각 기준)
pub fn parse_reports(bytes: &[u8]) -> Result<Vec<ReportDraft>> {
    parse_reports_at(bytes, Local::now().naive_local())
}

/// 바이트 → 레코드 초안
///
/// `now` 는 빈 날짜 셀의 기본값과 등록일시에 쓰인다.
pub fn parse_reports_at(bytes: &[u8], now: NaiveDateTime) -> Result<Vec<ReportDraft>> {
    let rows = read_rows(bytes)?;
    let today = now.date();
    let created_at = format_created_at(today);

    let drafts: Vec<ReportDraft> = drop_template_example_row(rows)
        .iter()
        .map(|row| import_row(row, today, &created_at))
        .collect();

    tracing::info!(count = drafts.len(), "엑셀 가져오기 완료");
    Ok(drafts)
}

pub fn parse_reports_file(path: &Path) -> Result<Vec<ReportDraft>> {
    if !path.exists() {
        return Err(ReportError::FileNotFound(path.display().to_string()));
    }
    let bytes = std::fs::read(path)?;
    tracing::debug!(path = %path.display(), size = bytes.len(), "엑셀 파일 읽기");
    parse_reports(&bytes)
}

/// 첫 시트를 헤더 기준 행 목록으로 읽는다 (완전히 빈 행은 건너뜀)
pub fn read_rows(bytes: &[u8]) -> Result<Vec<RawRow>> {
    let cursor = Cursor::new(bytes.to_vec());
    let mut workbook =
        open_workbook_auto_from_rs(cursor).map_err(|e| ReportError::Parse(e.to_string()))?;

    let range = match workbook.worksheet_range_at(0) {
        Some(range) => range.map_err(|e| ReportError::Parse(e.to_string()))?,
        None => return Err(ReportError::Parse("워크시트가 없습니다".into())),
    };

    let mut sheet_rows = range.rows();
    let headers: Vec<String> = match sheet_rows.next() {
        Some(header_row) => header_row
            .iter()
            .map(|data| data.to_string().trim().to_string())
            .collect(),
        None => return Ok(Vec::new()),
    };

    let rows = sheet_rows
        .map(|cells| {
            headers
                .iter()
                .zip(cells.iter())
                .filter(|(header, _)| !header.is_empty())
                .map(|(header, data)| (header.clone(), CellValue::from(data)))
                .collect::<RawRow>()
        })
        .filter(|row| row.values().any(|value| !value.is_blank()))
        .collect();

    Ok(rows)
}

fn cell<'a>(row: &'a RawRow, header: &str) -> &'a CellValue {
    row.get(header).unwrap_or(&EMPTY_CELL)
}

/// 행 하나를 초안으로 변환 (실패 없음)
pub fn import_row(row: &RawRow, today: NaiveDate, created_at: &str) -> ReportDraft {
    ReportDraft {
        notification_no: coerce_text(cell(row, COL_NOTIFICATION_NO)),
        work_dept: coerce_department(cell(row, COL_WORK_DEPT)),
        equipment_name: coerce_text(cell(row, COL_EQUIPMENT)),
        fail_date: coerce_date(cell(row, COL_FAIL_DATE), today),
        fail_time: coerce_time(cell(row, COL_FAIL_TIME)),
        work_content: coerce_text(cell(row, COL_WORK_CONTENT)),
        cause: coerce_text(cell(row, COL_CAUSE)),
        action: coerce_text(cell(row, COL_ACTION)),
        is_completed: coerce_completed(cell(row, COL_STATUS)),
        created_at: created_at.to_string(),
    }
}
