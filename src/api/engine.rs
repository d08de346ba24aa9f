//! Main NPS engine implementation.

use std::path::Path;

use serde_json::Value;
use tracing::{debug, info};

use crate::api::results::SegmentationReport;
use crate::api::rows::SurveyRow;
use crate::core::config::NpsConfig;
use crate::core::distribution::{DistributionBuilder, Response, Tally};
use crate::core::errors::Result;
use crate::core::segmentation::{GroupRecord, Segmenter};
use crate::core::stats::Stats;
use crate::io::csv_rows::{read_rows, read_rows_from_path, RowBatch};

/// Scores survey responses and segments slicers against their population.
#[derive(Debug, Clone)]
pub struct NpsEngine {
    config: NpsConfig,
}

impl NpsEngine {
    /// Create a new engine with the given configuration
    pub fn new(config: NpsConfig) -> Result<Self> {
        config.validate()?;
        debug!(z_value = config.segmentation.z_value, "NPS engine initialized");
        Ok(Self { config })
    }

    /// Active configuration
    pub fn config(&self) -> &NpsConfig {
        &self.config
    }

    /// Statistics over every row combined
    pub fn population(&self, rows: &[SurveyRow]) -> Stats {
        let tally: Tally = rows.iter().map(SurveyRow::reconciled_tally).sum();
        tally.distribution().stats()
    }

    /// Score every row and classify it against the combined population.
    pub fn segment_rows(&self, rows: &[SurveyRow]) -> SegmentationReport {
        let groups: Vec<GroupRecord> = rows.iter().map(SurveyRow::to_group).collect();
        let population: Stats = groups
            .iter()
            .map(|g| *g.distribution.tally())
            .sum::<Tally>()
            .distribution()
            .stats();

        let segmentation =
            Segmenter::new(&population, self.config.segmentation).segment(&groups);

        let warnings = rows
            .iter()
            .filter(|row| row.has_short_total())
            .map(|row| {
                format!(
                    "row '{}' declared total {} but its counts sum to {}",
                    row.label,
                    row.total.unwrap_or_default(),
                    row.counted()
                )
            })
            .collect();

        info!(
            groups = segmentation.groups.len(),
            respondents = population.total(),
            "Segmentation completed"
        );

        SegmentationReport {
            population,
            segmentation,
            warnings,
        }
    }

    /// Segment a loaded CSV batch. Rejected rows become report warnings.
    pub fn segment_batch(&self, batch: &RowBatch) -> SegmentationReport {
        let mut report = self.segment_rows(&batch.rows);
        report
            .warnings
            .extend(batch.rejected.iter().map(|rejection| match rejection.line {
                Some(line) => format!("line {}: {}", line, rejection.message),
                None => rejection.message.clone(),
            }));
        report
    }

    /// Read CSV rows from any reader and segment them
    pub fn segment_reader<R: std::io::Read>(&self, reader: R) -> Result<SegmentationReport> {
        let batch = read_rows(reader, &self.config.csv)?;
        Ok(self.segment_batch(&batch))
    }

    /// Read a CSV file and segment its rows
    pub fn segment_csv(&self, path: impl AsRef<Path>) -> Result<SegmentationReport> {
        let path = path.as_ref();
        info!("Segmenting survey file: {}", path.display());
        let batch = read_rows_from_path(path, &self.config.csv)?;
        Ok(self.segment_batch(&batch))
    }

    /// Score an ad-hoc batch of responses
    pub fn score_responses(&self, responses: &[Response]) -> Stats {
        let mut builder = DistributionBuilder::new(self.config.fields.clone());
        builder.extend(responses);
        builder.build().stats()
    }

    /// Score any supported JSON input: a rating, a record, or an array of either
    pub fn score_json(&self, value: &Value) -> Stats {
        self.score_responses(&Response::from_json(value))
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
