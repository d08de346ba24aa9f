//! Slicer segmentation against a population baseline.
//!
//! Each group ("slicer") is compared with the population score using a
//! normal-approximation confidence interval. The interval for a group of
//! size `n` is built from the *population* standard deviation, since the
//! question being asked is whether a sample of that size drawn from the
//! population could land this far from the population score by chance.
//!
//! The same interval, evaluated over a logarithmic grid of sample sizes,
//! gives the funnel-shaped control-limit curves used to plot the groups.

use std::fmt;

use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal};
use tracing::debug;

use crate::core::config::validation::validate_positive_f64;
use crate::core::distribution::Distribution;
use crate::core::errors::{NpsError, Result};
use crate::core::stats::Stats;

/// Lowest attainable Net Promoter Score.
pub const NPS_MIN: f64 = -1.0;

/// Highest attainable Net Promoter Score.
pub const NPS_MAX: f64 = 1.0;

/// Two-sided z value for 95% confidence.
pub const DEFAULT_Z_VALUE: f64 = 1.96;

/// Control-limit settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SegmentationConfig {
    /// Number of standard errors between the baseline and each limit
    #[serde(default = "SegmentationConfig::default_z_value")]
    pub z_value: f64,
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self {
            z_value: Self::default_z_value(),
        }
    }
}

impl SegmentationConfig {
    const fn default_z_value() -> f64 {
        DEFAULT_Z_VALUE
    }

    /// Derive the two-sided z value for a confidence level in `(0, 1)`.
    pub fn from_confidence_level(level: f64) -> Result<Self> {
        if !level.is_finite() || level <= 0.0 || level >= 1.0 {
            return Err(NpsError::validation_field(
                format!("confidence level must be strictly between 0 and 1, got {level}"),
                "confidence_level",
            ));
        }

        let normal = Normal::new(0.0, 1.0)
            .map_err(|e| NpsError::internal(format!("standard normal unavailable: {e}")))?;

        Ok(Self {
            z_value: normal.inverse_cdf(1.0 - (1.0 - level) / 2.0),
        })
    }

    /// Validate control-limit settings
    pub fn validate(&self) -> Result<()> {
        if !self.z_value.is_finite() {
            return Err(NpsError::validation_field(
                "z_value must be finite",
                "segmentation.z_value",
            ));
        }
        validate_positive_f64(self.z_value, "segmentation.z_value")
    }
}

/// Performance classification of a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Series {
    /// Score above the upper control limit
    Outperform,
    /// Score below the lower control limit
    Underperform,
    /// Score within the control limits
    Average,
}

impl fmt::Display for Series {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Outperform => "Outperform",
            Self::Underperform => "Underperform",
            Self::Average => "Average",
        };
        f.write_str(name)
    }
}

/// Lower and upper control limits, clamped to the valid score range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ControlLimits {
    /// Lower control limit
    pub lcl: f64,
    /// Upper control limit
    pub ucl: f64,
}

impl ControlLimits {
    /// Limits `baseline ± z·stderr`, clamped to `[-1, 1]`.
    pub fn around(baseline: f64, stderr: f64, z_value: f64) -> Self {
        let margin = z_value * stderr;
        Self {
            lcl: (baseline - margin).max(NPS_MIN),
            ucl: (baseline + margin).min(NPS_MAX),
        }
    }

    /// Classify a score. A score equal to a limit is still average.
    pub fn classify(&self, nps: f64) -> Series {
        if nps > self.ucl {
            Series::Outperform
        } else if nps < self.lcl {
            Series::Underperform
        } else {
            Series::Average
        }
    }
}

/// A labeled sub-population to compare with the baseline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupRecord {
    /// Slicer label
    pub label: String,
    /// Responses for this group
    pub distribution: Distribution,
}

impl GroupRecord {
    /// Create a group record
    pub fn new(label: impl Into<String>, distribution: impl Into<Distribution>) -> Self {
        Self {
            label: label.into(),
            distribution: distribution.into(),
        }
    }
}

/// Classification result for one group.
///
/// Numeric fields are `None` when either the group or the population has
/// no respondents; such a group carries no series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentedGroup {
    /// Slicer label
    pub label: String,
    /// Group size
    pub total: u64,
    /// Group score
    pub nps: Option<f64>,
    /// Standard error for a sample of this size from the population
    pub stderr: Option<f64>,
    /// Lower control limit
    pub lcl: Option<f64>,
    /// Upper control limit
    pub ucl: Option<f64>,
    /// Performance classification
    pub series: Option<Series>,
}

impl SegmentedGroup {
    /// Scatter point for the rendering layer, if the group has a score.
    pub fn point(&self) -> Option<SeriesPoint> {
        self.nps.map(|y| SeriesPoint {
            name: self.label.clone(),
            x: self.total,
            y,
        })
    }
}

/// A labeled scatter point: sample size against score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    /// Group label
    pub name: String,
    /// Sample size
    pub x: u64,
    /// Score
    pub y: f64,
}

/// A `(sample size, bound)` point on a control-limit curve.
///
/// Serializes as a two-element array.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BandPoint(pub u64, pub f64);

impl BandPoint {
    /// Sample size
    pub fn x(&self) -> u64 {
        self.0
    }

    /// Bound value
    pub fn y(&self) -> f64 {
        self.1
    }
}

/// Lower and upper control-limit curves.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceBand {
    /// Lower control-limit curve
    pub lower: Vec<BandPoint>,
    /// Upper control-limit curve
    pub upper: Vec<BandPoint>,
}

impl ConfidenceBand {
    /// Whether the band has no points
    pub fn is_empty(&self) -> bool {
        self.lower.is_empty()
    }
}

/// Full segmentation output, already partitioned for rendering.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Segmentation {
    /// Every group in input order
    pub groups: Vec<SegmentedGroup>,
    /// Control-limit curves
    pub band: ConfidenceBand,
    /// Groups above their upper limit
    pub outperform: Vec<SeriesPoint>,
    /// Groups below their lower limit
    pub underperform: Vec<SeriesPoint>,
    /// Groups within their limits
    pub average: Vec<SeriesPoint>,
    /// Labels of groups that could not be classified
    pub insufficient: Vec<String>,
}

/// Population score and spread the groups are compared against.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Baseline {
    nps: f64,
    stddev: f64,
}

/// Classifies groups against a population baseline.
#[derive(Debug, Clone)]
pub struct Segmenter {
    baseline: Option<Baseline>,
    config: SegmentationConfig,
}

impl Segmenter {
    /// Create a segmenter for the given population.
    pub fn new(population: &Stats, config: SegmentationConfig) -> Self {
        let baseline = population
            .nps()
            .zip(population.stddev())
            .map(|(nps, stddev)| Baseline { nps, stddev });

        Self { baseline, config }
    }

    /// Control limits for a sample of `n` respondents.
    pub fn limits_for(&self, n: u64) -> Option<(f64, ControlLimits)> {
        let baseline = self.baseline?;
        if n == 0 {
            return None;
        }
        let stderr = baseline.stddev / (n as f64).sqrt();
        Some((
            stderr,
            ControlLimits::around(baseline.nps, stderr, self.config.z_value),
        ))
    }

    /// Classify a single group.
    pub fn segment_group(&self, group: &GroupRecord) -> SegmentedGroup {
        let total = group.distribution.total();
        let nps = group.distribution.nps();
        let limits = self.limits_for(total);

        SegmentedGroup {
            label: group.label.clone(),
            total,
            nps,
            stderr: limits.map(|(stderr, _)| stderr),
            lcl: limits.map(|(_, l)| l.lcl),
            ucl: limits.map(|(_, l)| l.ucl),
            series: limits.zip(nps).map(|((_, l), nps)| l.classify(nps)),
        }
    }

    /// Classify every group and build the control-limit band.
    pub fn segment(&self, groups: &[GroupRecord]) -> Segmentation {
        let segmented: Vec<SegmentedGroup> =
            groups.iter().map(|g| self.segment_group(g)).collect();
        let max_total = segmented.iter().map(|g| g.total).max().unwrap_or(0);

        let mut result = Segmentation {
            band: self.confidence_band(max_total),
            ..Segmentation::default()
        };

        for group in &segmented {
            match (group.series, group.point()) {
                (Some(Series::Outperform), Some(point)) => result.outperform.push(point),
                (Some(Series::Underperform), Some(point)) => result.underperform.push(point),
                (Some(Series::Average), Some(point)) => result.average.push(point),
                _ => result.insufficient.push(group.label.clone()),
            }
        }

        debug!(
            groups = segmented.len(),
            outperform = result.outperform.len(),
            underperform = result.underperform.len(),
            average = result.average.len(),
            insufficient = result.insufficient.len(),
            "Segmented groups"
        );

        result.groups = segmented;
        result
    }

    /// Control-limit curves over the sample-size grid up to `max_total`.
    ///
    /// Empty when the population has no respondents.
    pub fn confidence_band(&self, max_total: u64) -> ConfidenceBand {
        if self.baseline.is_none() {
            return ConfidenceBand::default();
        }

        let (lower, upper) = band_grid(max_total)
            .into_iter()
            .filter_map(|x| self.limits_for(x).map(|(_, limits)| (x, limits)))
            .map(|(x, limits)| (BandPoint(x, limits.lcl), BandPoint(x, limits.ucl)))
            .unzip();

        ConfidenceBand { lower, upper }
    }
}

/// Sample sizes at which the band is evaluated.
///
/// Starts at 1 and advances by the current power of ten (1..9, 10, 20, ..,
/// 90, 100, 200, ..). The last value is the first grid point at or above
/// `max_total`.
pub fn band_grid(max_total: u64) -> Vec<u64> {
    let mut grid = Vec::new();
    let mut x: u64 = 1;

    while x < max_total {
        grid.push(x);
        x = x.saturating_add(10u64.pow(x.ilog10()));
    }
    grid.push(x);

    grid
}

/// Segment groups against a population in one call.
pub fn segment(population: &Stats, groups: &[GroupRecord], config: SegmentationConfig) -> Segmentation {
    Segmenter::new(population, config).segment(groups)
}

#[cfg(test)]
#[path = "segmentation_tests.rs"]
mod tests;
