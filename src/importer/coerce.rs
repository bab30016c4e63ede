//! 필드별 변환 규칙
//!
//! 모든 함수는 전체 함수다. 어떤 셀 값이 와도 실패하지 않고
//! 정해진 기본값으로 떨어진다.

use super::cell::CellValue;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use npk_sop_common::locale::{iso_date, COMPLETE_MARKER};
use npk_sop_common::Department;
use regex::Regex;

/// 1970-01-01 의 엑셀 일련번호 (1899-12-30 기준)
pub const EXCEL_EPOCH_OFFSET_DAYS: f64 = 25569.0;
pub const MILLIS_PER_DAY: f64 = 86_400_000.0;
/// 이 값보다 작은 숫자만 날짜 일련번호로 본다
pub const SERIAL_UPPER_BOUND: f64 = 100_000.0;
pub const DEFAULT_TIME: &str = "00:00";

lazy_static::lazy_static! {
    // YYYYMMDD
    static ref COMPACT_DATE_RE: Regex = Regex::new(r"^[0-9]{8}$").unwrap();
}

/// 엑셀 날짜 일련번호 → 날짜시간 (밀리초 단위 반올림)
pub fn serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() {
        return None;
    }
    let millis = ((serial - EXCEL_EPOCH_OFFSET_DAYS) * MILLIS_PER_DAY).round();
    if millis.abs() > 8.0e15 {
        return None;
    }
    DateTime::from_timestamp_millis(millis as i64).map(|at| at.naive_utc())
}

/// "20240510" → "2024-05-10"
pub fn split_compact_date(text: &str) -> Option<String> {
    if COMPACT_DATE_RE.is_match(text) {
        Some(format!("{}-{}-{}", &text[0..4], &text[4..6], &text[6..8]))
    } else {
        None
    }
}

/// 발생날짜
///
/// 1. 날짜 셀 → 달력 날짜
/// 2. 8자리 숫자 문자열 → YYYY-MM-DD
/// 3. 100000 미만 숫자 → 엑셀 일련번호
/// 4. 8자리 숫자 → 2번과 동일
/// 5. 그 외 → 공백 제거한 문자열 그대로
/// 6. 결과가 비면 오늘 날짜
pub fn coerce_date(value: &CellValue, today: NaiveDate) -> String {
    let coerced = match value {
        CellValue::DateTime(at) => iso_date(at.date()),
        other => {
            let text = other.string_form().trim().to_string();
            match (split_compact_date(&text), other) {
                (Some(date), _) => date,
                (None, CellValue::Number(number)) if *number < SERIAL_UPPER_BOUND => {
                    serial_to_datetime(*number)
                        .map(|at| iso_date(at.date()))
                        .unwrap_or(text)
                }
                (None, CellValue::Number(number)) => {
                    split_compact_date(&number.to_string()).unwrap_or(text)
                }
                (None, _) => text,
            }
        }
    };

    if coerced.is_empty() {
        iso_date(today)
    } else {
        coerced
    }
}

/// 발생시간: 날짜 셀이면 HH:MM, 아니면 문자열 그대로 (비면 00:00)
pub fn coerce_time(value: &CellValue) -> String {
    match value {
        CellValue::DateTime(at) => at.format("%H:%M").to_string(),
        other => {
            let text = other.string_form().trim().to_string();
            if text.is_empty() {
                DEFAULT_TIME.to_string()
            } else {
                text
            }
        }
    }
}

/// 작업부서: 첫 단어만 사용 ("공무 (외주)" → 공무), 목록에 없으면 기본 부서
pub fn coerce_department(value: &CellValue) -> Department {
    let text = value.string_form();
    let token = text.split_whitespace().next().unwrap_or("");
    Department::from_label_or_default(token)
}

/// 조치상태: "완료" 를 포함하면 true
pub fn coerce_completed(value: &CellValue) -> bool {
    value.string_form().contains(COMPLETE_MARKER)
}

pub fn coerce_text(value: &CellValue) -> String {
    value.string_form().trim().to_string()
}
