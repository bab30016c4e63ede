//! 엑셀 생성 (공통 라이브러리)
//!
//! layout.rs 의 열 정의를 사용해 정비이력 시트와 일괄 업로드 양식을 만든다.
//! 입력은 이미 메모리에 있는 레코드뿐이므로 네트워크를 기다리지 않는다.

use crate::error::Result;
use crate::layout::{SHEET_COLUMNS, TEMPLATE_COLUMNS};
use crate::locale::status_label;
use crate::types::MaintenanceReport;
use rust_xlsxwriter::*;

pub const EXPORT_SHEET_NAME: &str = "정비이력";
pub const TEMPLATE_SHEET_NAME: &str = "업로드양식";

/// 시트 한 행 (순번은 내보낼 때마다 다시 계산)
#[derive(Debug, Clone, PartialEq)]
pub struct ExportRow {
    pub sequence: usize,
    /// 순번을 제외한 SHEET_COLUMNS 순서의 값
    pub values: Vec<String>,
}

/// 레코드 하나를 표시용 행으로 투영
pub fn export_row(report: &MaintenanceReport, sequence: usize) -> ExportRow {
    ExportRow {
        sequence,
        values: vec![
            report.notification_no.clone(),
            report.work_dept.label().to_string(),
            report.equipment_name.clone(),
            report.fail_date.clone(),
            report.fail_time.clone(),
            report.work_content.clone(),
            report.cause.clone(),
            report.action.clone(),
            status_label(report.is_completed).to_string(),
            report.created_at.clone(),
        ],
    }
}

/// 입력 순서를 유지하고 순번은 내림차순 (전체 건수 → 1)
pub fn export_rows(reports: &[MaintenanceReport]) -> Vec<ExportRow> {
    let total = reports.len();
    reports
        .iter()
        .enumerate()
        .map(|(index, report)| export_row(report, total - index))
        .collect()
}

fn header_format() -> Format {
    Format::new()
        .set_bold()
        .set_background_color(Color::RGB(0xF5F7FA))
        .set_border(FormatBorder::Thin)
        .set_border_color(Color::RGB(0xCCCCCC))
}

/// 정비이력 엑셀을 버퍼에 생성
pub fn generate_export_buffer(reports: &[MaintenanceReport]) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let header = header_format();

    let worksheet = workbook.add_worksheet();
    worksheet.set_name(EXPORT_SHEET_NAME)?;

    for (col, label) in SHEET_COLUMNS.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, *label, &header)?;
    }

    for (index, row) in export_rows(reports).iter().enumerate() {
        let sheet_row = index as u32 + 1;
        worksheet.write_number(sheet_row, 0, row.sequence as f64)?;
        for (offset, value) in row.values.iter().enumerate() {
            worksheet.write_string(sheet_row, offset as u16 + 1, value)?;
        }
    }

    Ok(workbook.save_to_buffer()?)
}

/// 일괄 업로드 양식 (예시 1행 + 열 너비)
pub fn generate_template_buffer() -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let header = header_format();

    let worksheet = workbook.add_worksheet();
    worksheet.set_name(TEMPLATE_SHEET_NAME)?;

    for (col, column) in TEMPLATE_COLUMNS.iter().enumerate() {
        let col = col as u16;
        worksheet.set_column_width(col, column.width)?;
        worksheet.write_string_with_format(0, col, column.label, &header)?;
        worksheet.write_string(1, col, column.example)?;
    }

    Ok(workbook.save_to_buffer()?)
}
