//! Diagnostic aggregation: classes, response probability and alerts

pub mod alerts;
pub mod report;

pub use alerts::{AlertCard, Severity};
pub use report::{diagnose, DiagnosticReport, MacroInterpretation};
