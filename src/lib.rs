pub mod advice;
pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod font;
pub mod importer;
pub mod logging;
pub mod store;
