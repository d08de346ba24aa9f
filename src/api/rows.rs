//! Per-slicer survey rows, as loaded from CSV or JSON.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::core::distribution::Tally;
use crate::core::segmentation::GroupRecord;

/// One slicer's aggregated survey counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurveyRow {
    /// Slicer label
    pub label: String,
    /// Promoter count
    #[serde(default)]
    pub promoters: u64,
    /// Passive (neutral) count
    #[serde(default, alias = "neutrals")]
    pub passives: u64,
    /// Detractor count
    #[serde(default)]
    pub detractors: u64,
    /// Total as declared by the source, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
}

impl SurveyRow {
    /// Create a row without a declared total
    pub fn new(label: impl Into<String>, promoters: u64, passives: u64, detractors: u64) -> Self {
        Self {
            label: label.into(),
            promoters,
            passives,
            detractors,
            total: None,
        }
    }

    /// Attach a declared total
    pub fn with_total(mut self, total: u64) -> Self {
        self.total = Some(total);
        self
    }

    /// Sum of the three explicit counts
    pub fn counted(&self) -> u64 {
        self.promoters
            .saturating_add(self.passives)
            .saturating_add(self.detractors)
    }

    /// Counts for this row.
    ///
    /// Respondents in a declared total that the counts do not account for
    /// are passives, so an export without a passives column still scores
    /// against its full total.
    pub fn tally(&self) -> Tally {
        let unaccounted = self
            .total
            .map_or(0, |declared| declared.saturating_sub(self.counted()));
        Tally::new(
            self.promoters,
            self.detractors,
            self.passives.saturating_add(unaccounted),
        )
    }

    /// Whether the declared total is smaller than the counts it should cover
    pub fn has_short_total(&self) -> bool {
        self.total.is_some_and(|declared| declared < self.counted())
    }

    /// Counts for this row, warning when the declared total is too small.
    pub fn reconciled_tally(&self) -> Tally {
        if let Some(declared) = self.total.filter(|_| self.has_short_total()) {
            warn!(
                "Row '{}' declares total {} but its counts sum to {}; using the sum",
                self.label,
                declared,
                self.counted()
            );
        }
        self.tally()
    }

    /// Group record for segmentation
    pub fn to_group(&self) -> GroupRecord {
        GroupRecord::new(self.label.clone(), self.reconciled_tally())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tally_maps_passives_to_neutrals() {
        let tally = SurveyRow::new("a", 5, 3, 2).tally();
        assert_eq!(tally.promoters(), 5);
        assert_eq!(tally.neutrals(), 3);
        assert_eq!(tally.detractors(), 2);
        assert_eq!(tally.total(), 10);
    }

    #[test]
    fn test_unaccounted_total_counts_as_passives() {
        let row = SurveyRow::new("a", 50, 0, 10).with_total(100);
        let tally = row.tally();

        assert!(!row.has_short_total());
        assert_eq!(tally.neutrals(), 40);
        assert_eq!(tally.total(), 100);
        assert_eq!(row.to_group().distribution.nps(), Some(0.4));
    }

    #[test]
    fn test_short_total_uses_sum() {
        let row = SurveyRow::new("a", 5, 3, 2).with_total(8);
        assert!(row.has_short_total());
        assert_eq!(row.reconciled_tally().total(), 10);
        assert_eq!(row.to_group().distribution.total(), 10);

        assert!(!SurveyRow::new("b", 1, 1, 1).with_total(3).has_short_total());
        assert!(!SurveyRow::new("c", 1, 1, 1).has_short_total());
    }

    #[test]
    fn test_total_only_row_is_all_passives() {
        let group = SurveyRow::new("quiet", 0, 0, 0).with_total(40).to_group();

        assert_eq!(group.distribution.total(), 40);
        assert_eq!(group.distribution.tally().neutrals(), 40);
        assert_eq!(group.distribution.nps(), Some(0.0));
    }

    #[test]
    fn test_huge_counts_saturate() {
        let row = SurveyRow::new("big", u64::MAX, 1, 1).with_total(5);
        assert_eq!(row.counted(), u64::MAX);
        assert_eq!(row.tally().total(), u64::MAX);
    }

    #[test]
    fn test_deserializes_neutrals_alias() {
        let row: SurveyRow =
            serde_json::from_str(r#"{"label":"x","promoters":2,"neutrals":1}"#).unwrap();
        assert_eq!(row, SurveyRow::new("x", 2, 1, 0));
    }
}
