//! NPK SOP Common Library
//!
//! CLI와 렌더러가 공유하는 레코드 모델, 레이아웃 정의, 내보내기 코어

pub mod types;
pub mod layout;
pub mod locale;
pub mod error;
pub mod export;

pub use types::{
    Attachment, DashboardStats, Department, MaintenanceReport, ReportDraft, ReportForm,
};
pub use layout::{PageGeometry, SheetColumn, SHEET_COLUMNS, TEMPLATE_COLUMNS};
pub use error::{Error, Result};
