//! Property-based tests for scoring and segmentation
//!
//! Covers the algebraic properties of the score and the shape guarantees of
//! the control limits over arbitrary tallies.

use approx::assert_relative_eq;
use proptest::prelude::*;

use nps_stats::core::segmentation::{band_grid, NPS_MAX, NPS_MIN};
use nps_stats::core::stats;
use nps_stats::{
    build_distribution, FieldMap, GroupRecord, Response, SegmentationConfig, Segmenter, Series,
    Tally, Tallied,
};

fn ratings_for(promoters: u64, detractors: u64, neutrals: u64) -> Vec<Response> {
    let mut ratings = Vec::new();
    ratings.extend((0..promoters).map(|i| Response::Rating(9.0 + (i % 2) as f64)));
    ratings.extend((0..detractors).map(|i| Response::Rating((i % 7) as f64)));
    ratings.extend((0..neutrals).map(|i| Response::Rating(7.0 + (i % 2) as f64)));
    ratings
}

proptest! {
    /// Equal promoters and detractors always score zero
    #[test]
    fn prop_balanced_tally_scores_zero(
        balanced in 1u64..10_000,
        neutrals in 0u64..10_000,
    ) {
        let tally = Tally::new(balanced, balanced, neutrals);
        prop_assert_eq!(stats::score(&tally), Some(0.0));
    }

    /// Extremes are reached only by one-sided tallies
    #[test]
    fn prop_extremes_are_one_sided(
        promoters in 0u64..200,
        detractors in 0u64..200,
        neutrals in 0u64..200,
    ) {
        let tally = Tally::new(promoters, detractors, neutrals);
        let score = stats::score(&tally);

        prop_assert_eq!(
            score == Some(1.0),
            detractors == 0 && neutrals == 0 && promoters > 0
        );
        prop_assert_eq!(
            score == Some(-1.0),
            promoters == 0 && neutrals == 0 && detractors > 0
        );
    }

    /// Rebuilding a tally from ratings reproduces it exactly
    #[test]
    fn prop_ratings_round_trip(
        promoters in 0u64..300,
        detractors in 0u64..300,
        neutrals in 0u64..300,
    ) {
        let responses = ratings_for(promoters, detractors, neutrals);
        let distribution = build_distribution(&responses, &FieldMap::default());
        let tally = distribution.tally();

        prop_assert_eq!(tally.promoters(), promoters);
        prop_assert_eq!(tally.detractors(), detractors);
        prop_assert_eq!(tally.neutrals(), neutrals);
        prop_assert_eq!(tally.total(), promoters + detractors + neutrals);
    }

    /// A distribution's stored score is returned as-is
    #[test]
    fn prop_stored_score_is_reused(
        promoters in 0u64..1_000,
        detractors in 0u64..1_000,
        neutrals in 0u64..1_000,
    ) {
        let distribution = Tally::new(promoters, detractors, neutrals).distribution();
        prop_assert_eq!(distribution.score(), distribution.nps());
        prop_assert_eq!(distribution.stats().nps(), distribution.nps());
    }

    /// Variance stays within the bounds of a {-1, 0, 1} variable
    #[test]
    fn prop_variance_is_bounded(
        promoters in 0u64..1_000,
        detractors in 0u64..1_000,
        neutrals in 1u64..1_000,
    ) {
        let stats = Tally::new(promoters, detractors, neutrals).distribution().stats();
        let variance = stats.variance().unwrap();

        prop_assert!(variance >= 0.0);
        prop_assert!(variance <= 1.0 + 1e-12);
    }

    /// Every group lands in exactly one series
    #[test]
    fn prop_classification_is_exclusive(
        population in (1u64..500, 0u64..500, 0u64..500),
        groups in prop::collection::vec((0u64..100, 0u64..100, 0u64..100), 1..20),
    ) {
        let pop = Tally::new(population.0, population.1, population.2).distribution().stats();
        let records: Vec<GroupRecord> = groups
            .iter()
            .enumerate()
            .map(|(i, (p, d, n))| GroupRecord::new(format!("g{i}"), Tally::new(*p, *d, *n)))
            .collect();

        let result = Segmenter::new(&pop, SegmentationConfig::default()).segment(&records);

        let classified = result.outperform.len() + result.underperform.len() + result.average.len();
        prop_assert_eq!(classified + result.insufficient.len(), records.len());

        for group in &result.groups {
            prop_assert_eq!(group.series.is_none(), group.total == 0);
            if let (Some(series), Some(nps), Some(lcl), Some(ucl)) =
                (group.series, group.nps, group.lcl, group.ucl)
            {
                let expected = if nps > ucl {
                    Series::Outperform
                } else if nps < lcl {
                    Series::Underperform
                } else {
                    Series::Average
                };
                prop_assert_eq!(series, expected);
            }
        }
    }

    /// The band narrows with sample size and never leaves [-1, 1]
    #[test]
    fn prop_band_narrows_within_range(
        promoters in 0u64..500,
        detractors in 0u64..500,
        neutrals in 1u64..500,
        max_total in 1u64..100_000,
    ) {
        let pop = Tally::new(promoters, detractors, neutrals).distribution().stats();
        let band = Segmenter::new(&pop, SegmentationConfig::default()).confidence_band(max_total);

        prop_assert_eq!(band.lower.len(), band_grid(max_total).len());

        let mut previous_width = f64::INFINITY;
        for (lower, upper) in band.lower.iter().zip(&band.upper) {
            prop_assert!((NPS_MIN..=NPS_MAX).contains(&lower.y()));
            prop_assert!((NPS_MIN..=NPS_MAX).contains(&upper.y()));

            let width = upper.y() - lower.y();
            prop_assert!(width <= previous_width);
            previous_width = width;
        }
    }

    /// The grid starts at 1 and ends at the first point covering max_total
    #[test]
    fn prop_band_grid_covers_max(max_total in 0u64..1_000_000) {
        let grid = band_grid(max_total);

        prop_assert_eq!(grid[0], 1);
        prop_assert!(grid.windows(2).all(|w| w[0] < w[1]));

        let last = *grid.last().unwrap();
        prop_assert!(last >= max_total);
        if grid.len() > 1 {
            prop_assert!(grid[grid.len() - 2] < max_total);
        }
    }
}

#[test]
fn scenario_ratings() {
    let score = |ratings: &[u8]| {
        let responses: Vec<Response> = ratings.iter().copied().map(Response::from).collect();
        build_distribution(&responses, &FieldMap::default()).nps()
    };

    assert_eq!(score(&[9, 10, 9, 10, 10, 10]), Some(1.0));
    assert_eq!(score(&[7, 7, 7, 8, 8, 8]), Some(0.0));
    assert_relative_eq!(
        score(&[1, 2, 3, 4, 5, 6, 1, 2, 3, 4, 7, 8, 7, 8, 7, 8, 9, 10, 9, 10]).unwrap(),
        -0.3,
        epsilon = 1e-12
    );
}

#[test]
fn scenario_pretallied_object() {
    let value = serde_json::json!({"promoters": 8, "detractors": 2, "neutrals": 0});
    let distribution = build_distribution(&Response::from_json(&value), &FieldMap::default());
    assert_relative_eq!(distribution.nps().unwrap(), 0.6, epsilon = 1e-12);
}

#[test]
fn scenario_uniform_population_has_no_spread() {
    let stats = Tally::new(650, 0, 0).distribution().stats();

    assert_eq!(stats.variance(), Some(0.0));
    assert_eq!(stats.stddev(), Some(0.0));
    assert_eq!(stats.stderr(), Some(0.0));
}

#[test]
fn empty_input_is_undefined() {
    let stats = build_distribution(&[], &FieldMap::default()).stats();

    assert_eq!(stats.nps(), None);
    assert_eq!(stats.variance(), None);
    assert_eq!(stats.stddev(), None);
    assert_eq!(stats.stderr(), None);
}
