//! 셀 값 모델
//!
//! calamine 의 셀 타입을 가져오기 규칙에 필요한 형태로만 좁힌다.

use super::coerce::serial_to_datetime;
use calamine::Data;
use chrono::{NaiveDate, NaiveDateTime};

#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    /// 날짜 서식 셀 (로컬 달력 기준, 시간대 없음)
    DateTime(NaiveDateTime),
}

impl CellValue {
    /// 셀의 문자열 형태. 숫자는 불필요한 소수점 없이 표시된다 (20240510.0 → "20240510")
    pub fn string_form(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Text(text) => text.clone(),
            CellValue::Number(number) => number.to_string(),
            CellValue::Bool(flag) => flag.to_string(),
            CellValue::DateTime(at) => at.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }

    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(text) => text.trim().is_empty(),
            _ => false,
        }
    }
}

impl From<&Data> for CellValue {
    fn from(data: &Data) -> Self {
        match data {
            Data::Empty => CellValue::Empty,
            Data::String(text) => CellValue::Text(text.clone()),
            Data::Int(number) => CellValue::Number(*number as f64),
            Data::Float(number) => CellValue::Number(*number),
            Data::Bool(flag) => CellValue::Bool(*flag),
            Data::DateTime(excel) => {
                // 초 단위로 반올림해 14:29:59.999 같은 오차를 없앤다
                let serial = (excel.as_f64() * 86_400.0).round() / 86_400.0;
                serial_to_datetime(serial)
                    .map(CellValue::DateTime)
                    .unwrap_or(CellValue::Number(excel.as_f64()))
            }
            Data::DateTimeIso(text) => parse_iso_datetime(text)
                .map(CellValue::DateTime)
                .unwrap_or_else(|| CellValue::Text(text.clone())),
            Data::DurationIso(text) => CellValue::Text(text.clone()),
            Data::Error(_) => CellValue::Text(data.to_string()),
        }
    }
}

fn parse_iso_datetime(text: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S"))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_form_of_numbers() {
        assert_eq!(CellValue::Number(20240510.0).string_form(), "20240510");
        assert_eq!(CellValue::Number(14.5).string_form(), "14.5");
        assert_eq!(CellValue::Bool(true).string_form(), "true");
        assert_eq!(CellValue::Empty.string_form(), "");
    }

    #[test]
    fn test_from_calamine_data() {
        assert_eq!(CellValue::from(&Data::Int(7)), CellValue::Number(7.0));
        assert_eq!(
            CellValue::from(&Data::String("회전".into())),
            CellValue::Text("회전".into())
        );
        assert_eq!(CellValue::from(&Data::Empty), CellValue::Empty);
    }

    #[test]
    fn test_iso_datetime_cells() {
        let value = CellValue::from(&Data::DateTimeIso("2024-05-10T14:30:00".into()));
        let expected = NaiveDate::from_ymd_opt(2024, 5, 10)
            .unwrap()
            .and_hms_opt(14, 30, 0)
            .unwrap();
        assert_eq!(value, CellValue::DateTime(expected));

        let garbage = CellValue::from(&Data::DateTimeIso("not a date".into()));
        assert_eq!(garbage, CellValue::Text("not a date".into()));
    }

    #[test]
    fn test_blank() {
        assert!(CellValue::Text("   ".into()).is_blank());
        assert!(!CellValue::Number(0.0).is_blank());
    }
}
