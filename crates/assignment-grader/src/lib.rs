//! Assignment grading core: configuration, telemetry bootstrap, the
//! application error type, and the grading pipeline.

pub mod config;
pub mod error;
pub mod grading;
pub mod telemetry;
