pub mod aggregate;
pub mod config;
pub mod consolidate;
pub mod error;
pub mod headings;
pub mod io;
pub mod model;
pub mod month;

pub use error::{Result, ReportError};
