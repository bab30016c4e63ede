//! ko-KR 표시 형식

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};

/// 조치상태 셀에서 완료를 뜻하는 표시
pub const COMPLETE_MARKER: &str = "완료";
pub const IN_PROGRESS_LABEL: &str = "진행중";

pub fn status_label(is_completed: bool) -> &'static str {
    if is_completed {
        COMPLETE_MARKER
    } else {
        IN_PROGRESS_LABEL
    }
}

/// YYYY-MM-DD
pub fn iso_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// 등록일시: "2024. 5. 10."
pub fn format_created_at(date: NaiveDate) -> String {
    format!("{}. {}. {}.", date.year(), date.month(), date.day())
}

/// 출력 일시: "2024. 5. 10. 오후 2:30:05"
pub fn format_print_timestamp(at: NaiveDateTime) -> String {
    let (is_pm, hour12) = at.hour12();
    format!(
        "{} {} {}:{:02}:{:02}",
        format_created_at(at.date()),
        if is_pm { "오후" } else { "오전" },
        hour12,
        at.minute(),
        at.second()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 10)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    #[test]
    fn test_status_label() {
        assert_eq!(status_label(true), "완료");
        assert_eq!(status_label(false), "진행중");
    }

    #[test]
    fn test_created_at_has_no_zero_padding() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        assert_eq!(format_created_at(date), "2024. 5. 1.");
        assert_eq!(iso_date(date), "2024-05-01");
    }

    #[test]
    fn test_print_timestamp_twelve_hour_clock() {
        assert_eq!(format_print_timestamp(at(14, 30, 5)), "2024. 5. 10. 오후 2:30:05");
        assert_eq!(format_print_timestamp(at(0, 5, 0)), "2024. 5. 10. 오전 12:05:00");
        assert_eq!(format_print_timestamp(at(12, 0, 0)), "2024. 5. 10. 오후 12:00:00");
    }
}
