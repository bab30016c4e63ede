//! Export core modules shared by the CLI renderer and exporters.

pub mod pdf_core;

#[cfg(feature = "excel")]
pub mod excel_core;
