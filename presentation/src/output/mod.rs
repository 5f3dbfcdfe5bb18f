//! Output formatting for room reports

pub mod console;
pub mod formatter;
pub mod report;
