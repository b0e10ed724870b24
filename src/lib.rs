//! # cadence
//!
//! Scores git commit pairs for signs of AI-generated or automated changes.
//!
//! A [`detector::DetectionEngine`] runs an ordered set of independent
//! strategies over each [`git::CommitPair`] and aggregates their findings
//! into a [`detector::Verdict`]. History is read with [`git::GitRepository`];
//! pushes can also be scored live through the [`webhook`] server.
//!
//! ## Quick Start
//!
//! ```no_run
//! use cadence::detector::DetectionEngine;
//! use cadence::git::{GitRepository, HistoryOptions};
//! use cadence::metrics::RepositoryStats;
//!
//! let repo = GitRepository::open()?;
//! let pairs = repo.commit_pairs(&HistoryOptions::default())?;
//! let stats = RepositoryStats::from_pairs(&pairs);
//! let engine = DetectionEngine::with_default_strategies();
//! for (pair, verdict) in pairs.iter().zip(engine.evaluate_many(&pairs, &stats)) {
//!     println!("{} flagged={}", pair.current.short_hash(), verdict.flagged);
//! }
//! # Ok::<(), anyhow::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod ai;
pub mod cli;
pub mod config;
pub mod data;
pub mod detector;
pub mod git;
pub mod metrics;
pub mod web;
pub mod webhook;

pub use crate::cli::Cli;

/// The current version of cadence.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
