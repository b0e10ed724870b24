//! Serialisable output structures.

pub mod report;

pub use report::{AnalysisReport, CommitReport, OutputFormat, ReportSummary, StrategyCount};
