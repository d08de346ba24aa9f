//! Segmentation reports and the chart contract handed to renderers.

use serde::{Deserialize, Serialize};

use crate::core::segmentation::{BandPoint, Segmentation, SeriesPoint};
use crate::core::stats::Stats;

/// Population statistics together with the per-group segmentation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SegmentationReport {
    /// Statistics over every row combined
    pub population: Stats,

    /// Per-group classification and control-limit band
    pub segmentation: Segmentation,

    /// Warnings raised while building the report
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

/// The five series a scatter chart with control limits needs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartSeries {
    /// Groups above their upper limit
    pub outperform: Vec<SeriesPoint>,
    /// Groups below their lower limit
    pub underperform: Vec<SeriesPoint>,
    /// Groups within their limits
    pub average: Vec<SeriesPoint>,
    /// Lower control-limit curve
    pub lcl: Vec<BandPoint>,
    /// Upper control-limit curve
    pub ucl: Vec<BandPoint>,
}

impl SegmentationReport {
    /// Number of groups in the report
    pub fn group_count(&self) -> usize {
        self.segmentation.groups.len()
    }

    /// Whether any group was left unclassified
    pub fn has_insufficient(&self) -> bool {
        !self.segmentation.insufficient.is_empty()
    }

    /// Chart series for the rendering layer
    pub fn chart_series(&self) -> ChartSeries {
        let segmentation = &self.segmentation;
        ChartSeries {
            outperform: segmentation.outperform.clone(),
            underperform: segmentation.underperform.clone(),
            average: segmentation.average.clone(),
            lcl: segmentation.band.lower.clone(),
            ucl: segmentation.band.upper.clone(),
        }
    }
}
