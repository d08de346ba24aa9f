//! # nps-stats: Net Promoter Score Statistics
//!
//! Scores survey responses and tells you which slicers of a population
//! perform differently from the population as a whole.
//!
//! - **Distribution building**: raw 0–10 ratings, response records and
//!   pre-tallied counts normalize into one promoter/neutral/detractor tally
//! - **Statistics**: NPS, variance, standard deviation and standard error,
//!   with an explicit "undefined" result for empty input
//! - **Segmentation**: per-slicer control limits around the population score
//!   and the funnel-shaped confidence band used to chart them
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │                      API Layer                       │
//! │          NpsEngine · SurveyRow · Reports             │
//! ├──────────────────────────────────────────────────────┤
//! │  Core                         │  I/O                 │
//! │ • Distribution builder        │ • CSV rows           │
//! │ • Statistics                  │ • JSON/YAML/table    │
//! │ • Segmentation                │   reports            │
//! │ • Config                      │                      │
//! └──────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use nps_stats::{NpsConfig, NpsEngine};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let engine = NpsEngine::new(NpsConfig::default())?;
//!     let report = engine.segment_csv("survey.csv")?;
//!
//!     for group in &report.segmentation.groups {
//!         println!("{}: {:?}", group.label, group.series);
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_precision_loss)]

// Core scoring modules
pub mod core {
    //! Core NPS algorithms and data structures.

    pub mod config;
    pub mod distribution;
    pub mod errors;
    pub mod segmentation;
    pub mod stats;
}

// Survey ingestion and reporting
pub mod io {
    //! CSV ingestion and report rendering.

    pub mod csv_rows;
    pub mod reports;
}

// Public API and engine interface
pub mod api {
    //! High-level API and engine interface.

    pub mod engine;
    pub mod results;
    pub mod rows;
}

// Re-export primary types for convenience
pub use crate::api::engine::NpsEngine;
pub use crate::api::results::{ChartSeries, SegmentationReport};
pub use crate::api::rows::SurveyRow;
pub use crate::core::config::NpsConfig;
pub use crate::core::distribution::{
    build_distribution, Category, Distribution, DistributionBuilder, FieldMap, Response, Tally,
};
pub use crate::core::errors::{NpsError, Result};
pub use crate::core::segmentation::{segment, GroupRecord, Segmentation, SegmentationConfig, Segmenter, Series};
pub use crate::core::stats::{Stats, Tallied};
pub use crate::io::reports::{render_report, ReportFormat};

/// Library version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
