//! Output formats for a finished documentation model.
//!
//! JSON is the only format; page rendering happens downstream.

pub mod json;
