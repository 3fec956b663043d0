//! Core library for the gst-report command line application.
//!
//! The library consolidates monthly GST return workbooks into a single
//! report. Configuration lives in [`gst::report::config`], spreadsheet
//! adapters under [`gst::report::io`], the in-memory result sheet in
//! [`gst::report::model`], the per-category row filtering and summing in
//! [`gst::report::aggregate`], and the run orchestration in
//! [`gst::report::consolidate`].

pub mod gst;

pub use gst::report::{
    Result, ReportError, aggregate, config, consolidate, error, headings, io, model, month,
};
