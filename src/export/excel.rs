//! 엑셀 출력 (CLI)
//!
//! 시트 생성은 공통 라이브러리의 excel_core 가 맡고 여기서는 파일명만 붙인다.

use super::OutputFile;
use crate::error::Result;
use chrono::NaiveDate;
use npk_sop_common::export::excel_core::{generate_export_buffer, generate_template_buffer};
use npk_sop_common::locale::iso_date;
use npk_sop_common::MaintenanceReport;

pub const TEMPLATE_FILENAME: &str = "NPK_정비보고서_일괄업로드_양식.xlsx";

pub fn export_filename(today: NaiveDate) -> String {
    format!("NPK_정비이력_{}.xlsx", iso_date(today))
}

/// 주어진 순서 그대로 정비이력 시트를 만든다
pub fn export_reports(reports: &[MaintenanceReport], today: NaiveDate) -> Result<OutputFile> {
    let bytes = generate_export_buffer(reports)?;
    tracing::debug!(rows = reports.len(), size = bytes.len(), "정비이력 엑셀 생성");
    Ok(OutputFile::new(export_filename(today), bytes))
}

/// 일괄 업로드 양식
pub fn download_template() -> Result<OutputFile> {
    let bytes = generate_template_buffer()?;
    Ok(OutputFile::new(TEMPLATE_FILENAME, bytes))
}
