//! Data models

pub mod student;
pub mod assessment;

pub use student::*;
pub use assessment::*;
