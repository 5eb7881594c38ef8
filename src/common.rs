pub mod access;
pub mod error;
pub mod month;
pub mod report;
pub mod sheet;
