//! Distribution building for survey responses.
//!
//! Survey batches arrive in several shapes: raw 0-10 ratings, response
//! objects carrying a rating field, objects carrying pre-tallied counts, or
//! any mix of those. This module normalizes all of them into a canonical
//! promoter/neutral/detractor [`Tally`] and its [`Distribution`].
//!
//! Normalization is tolerant. Elements that cannot be interpreted are
//! skipped and counted, never raised as errors.

use std::iter::Sum;
use std::ops::{Add, AddAssign};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::core::config::validation::validate_field_name;
use crate::core::errors::Result;
use crate::core::stats;

/// Lowest valid rating on the likelihood-to-recommend scale.
pub const MIN_RATING: f64 = 0.0;

/// Highest valid rating on the likelihood-to-recommend scale.
pub const MAX_RATING: f64 = 10.0;

/// Respondent category derived from a single rating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Ratings 9 and 10
    Promoter,
    /// Ratings 7 and 8 (also called passives)
    Neutral,
    /// Ratings 0 through 6
    Detractor,
}

impl Category {
    /// Classify a rating, returning `None` for anything that is not an
    /// integer in `[0, 10]`.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn classify(rating: f64) -> Option<Self> {
        if !rating.is_finite()
            || rating.fract() != 0.0
            || !(MIN_RATING..=MAX_RATING).contains(&rating)
        {
            return None;
        }

        match rating as u8 {
            9 | 10 => Some(Self::Promoter),
            7 | 8 => Some(Self::Neutral),
            _ => Some(Self::Detractor),
        }
    }

    /// Per-respondent score contribution (+1, 0 or -1).
    pub fn value(self) -> f64 {
        match self {
            Self::Promoter => 1.0,
            Self::Neutral => 0.0,
            Self::Detractor => -1.0,
        }
    }
}

/// Promoter/neutral/detractor counts for a population.
///
/// `total` is always the sum of the three counts. It is recomputed on every
/// construction, including deserialization, so a serialized total that
/// disagrees with its counts is never trusted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "TallyCounts")]
pub struct Tally {
    promoters: u64,
    detractors: u64,
    neutrals: u64,
    total: u64,
}

/// Wire form of a tally; any subset of counts may be present.
#[derive(Deserialize)]
struct TallyCounts {
    #[serde(default)]
    promoters: u64,
    #[serde(default)]
    detractors: u64,
    #[serde(default)]
    neutrals: u64,
}

impl From<TallyCounts> for Tally {
    fn from(counts: TallyCounts) -> Self {
        Self::new(counts.promoters, counts.detractors, counts.neutrals)
    }
}

impl Tally {
    /// Create a tally from its three counts.
    ///
    /// Counts whose sum exceeds `u64::MAX` saturate the total; use
    /// [`Tally::checked_new`] to detect that case.
    pub fn new(promoters: u64, detractors: u64, neutrals: u64) -> Self {
        Self {
            promoters,
            detractors,
            neutrals,
            total: promoters.saturating_add(detractors).saturating_add(neutrals),
        }
    }

    /// Create a tally, or `None` if the total would overflow.
    pub fn checked_new(promoters: u64, detractors: u64, neutrals: u64) -> Option<Self> {
        let total = promoters.checked_add(detractors)?.checked_add(neutrals)?;
        Some(Self {
            promoters,
            detractors,
            neutrals,
            total,
        })
    }

    /// Combine two tallies, or `None` if any count would overflow.
    pub fn checked_add(self, rhs: Tally) -> Option<Self> {
        Self::checked_new(
            self.promoters.checked_add(rhs.promoters)?,
            self.detractors.checked_add(rhs.detractors)?,
            self.neutrals.checked_add(rhs.neutrals)?,
        )
    }

    /// Number of promoters
    pub fn promoters(&self) -> u64 {
        self.promoters
    }

    /// Number of detractors
    pub fn detractors(&self) -> u64 {
        self.detractors
    }

    /// Number of neutrals (passives)
    pub fn neutrals(&self) -> u64 {
        self.neutrals
    }

    /// Total number of respondents
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Whether the tally holds no respondents.
    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// Count of respondents in one category.
    pub fn count(&self, category: Category) -> u64 {
        match category {
            Category::Promoter => self.promoters,
            Category::Neutral => self.neutrals,
            Category::Detractor => self.detractors,
        }
    }


    /// Attach the score to this tally.
    pub fn distribution(&self) -> Distribution {
        Distribution::from(*self)
    }
}

impl From<Category> for Tally {
    fn from(category: Category) -> Self {
        match category {
            Category::Promoter => Tally::new(1, 0, 0),
            Category::Detractor => Tally::new(0, 1, 0),
            Category::Neutral => Tally::new(0, 0, 1),
        }
    }
}

impl Add for Tally {
    type Output = Tally;

    fn add(self, rhs: Tally) -> Tally {
        Tally::new(
            self.promoters.saturating_add(rhs.promoters),
            self.detractors.saturating_add(rhs.detractors),
            self.neutrals.saturating_add(rhs.neutrals),
        )
    }
}

impl AddAssign for Tally {
    fn add_assign(&mut self, rhs: Tally) {
        *self = *self + rhs;
    }
}

impl Sum for Tally {
    fn sum<I: Iterator<Item = Tally>>(iter: I) -> Self {
        iter.fold(Tally::default(), Add::add)
    }
}

impl<'a> Sum<&'a Tally> for Tally {
    fn sum<I: Iterator<Item = &'a Tally>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

/// A tally together with its Net Promoter Score.
///
/// `nps` is `None` when the tally is empty; there is no score for a
/// population without respondents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Tally")]
pub struct Distribution {
    #[serde(flatten)]
    tally: Tally,
    nps: Option<f64>,
}

impl From<Tally> for Distribution {
    fn from(tally: Tally) -> Self {
        Self {
            nps: stats::score(&tally),
            tally,
        }
    }
}

impl Distribution {
    /// Underlying counts
    pub fn tally(&self) -> &Tally {
        &self.tally
    }

    /// Net Promoter Score in `[-1, 1]`, or `None` for an empty tally.
    pub fn nps(&self) -> Option<f64> {
        self.nps
    }

    /// Net Promoter Score on the conventional -100..100 scale.
    pub fn nps_percent(&self) -> Option<f64> {
        self.nps.map(|nps| nps * 100.0)
    }

    /// Total number of respondents
    pub fn total(&self) -> u64 {
        self.tally.total()
    }

    /// Derive variance, standard deviation and standard error.
    pub fn stats(&self) -> stats::Stats {
        stats::stats(self)
    }
}

/// Field names used to read counts and ratings out of response records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldMap {
    /// Field holding a promoter count
    pub promoters: String,
    /// Field holding a detractor count
    pub detractors: String,
    /// Field holding a neutral (passive) count
    pub neutrals: String,
    /// Field holding a single respondent's rating
    pub nps: String,
}

impl Default for FieldMap {
    fn default() -> Self {
        Self {
            promoters: "promoters".to_string(),
            detractors: "detractors".to_string(),
            neutrals: "neutrals".to_string(),
            nps: "nps".to_string(),
        }
    }
}

impl FieldMap {
    /// Override the promoter count field name
    pub fn with_promoters(mut self, name: impl Into<String>) -> Self {
        self.promoters = name.into();
        self
    }

    /// Override the detractor count field name
    pub fn with_detractors(mut self, name: impl Into<String>) -> Self {
        self.detractors = name.into();
        self
    }

    /// Override the neutral count field name
    pub fn with_neutrals(mut self, name: impl Into<String>) -> Self {
        self.neutrals = name.into();
        self
    }

    /// Override the rating field name
    pub fn with_nps(mut self, name: impl Into<String>) -> Self {
        self.nps = name.into();
        self
    }

    /// Validate that every field name is usable.
    pub fn validate(&self) -> Result<()> {
        validate_field_name(&self.promoters, "fields.promoters")?;
        validate_field_name(&self.detractors, "fields.detractors")?;
        validate_field_name(&self.neutrals, "fields.neutrals")?;
        validate_field_name(&self.nps, "fields.nps")?;
        Ok(())
    }
}

/// One element of a survey batch.
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    /// A single respondent's raw rating
    Rating(f64),
    /// A response object read through a [`FieldMap`]; it may carry counts,
    /// a rating, or both
    Record(Map<String, Value>),
    /// An already-tallied distribution
    Tallied(Tally),
    /// An element with no usable shape
    Ignored,
}

impl Response {
    /// Normalize JSON input into responses.
    ///
    /// Arrays yield one response per element; any other value is treated as
    /// a batch of one.
    pub fn from_json(value: &Value) -> Vec<Response> {
        match value {
            Value::Array(items) => items.iter().map(Self::from_json_element).collect(),
            other => vec![Self::from_json_element(other)],
        }
    }

    fn from_json_element(value: &Value) -> Response {
        match value {
            Value::Number(number) => number.as_f64().map_or(Self::Ignored, Self::Rating),
            Value::Object(map) => Self::Record(map.clone()),
            _ => Self::Ignored,
        }
    }
}

impl From<f64> for Response {
    fn from(rating: f64) -> Self {
        Self::Rating(rating)
    }
}

impl From<u8> for Response {
    fn from(rating: u8) -> Self {
        Self::Rating(f64::from(rating))
    }
}

impl From<Tally> for Response {
    fn from(tally: Tally) -> Self {
        Self::Tallied(tally)
    }
}

impl From<Map<String, Value>> for Response {
    fn from(record: Map<String, Value>) -> Self {
        Self::Record(record)
    }
}

/// Accumulates responses into a tally.
#[derive(Debug, Clone, Default)]
pub struct DistributionBuilder {
    fields: FieldMap,
    tally: Tally,
    skipped: usize,
}

impl DistributionBuilder {
    /// Create a builder reading records through the given field names.
    pub fn new(fields: FieldMap) -> Self {
        Self {
            fields,
            tally: Tally::default(),
            skipped: 0,
        }
    }

    /// Add one response.
    pub fn push(&mut self, response: &Response) -> &mut Self {
        match response {
            Response::Rating(rating) => match Category::classify(*rating) {
                Some(category) => self.absorb(Tally::from(category)),
                None => self.skipped += 1,
            },
            Response::Record(record) => self.push_record(record),
            Response::Tallied(tally) => self.absorb(*tally),
            Response::Ignored => self.skipped += 1,
        }
        self
    }

    /// Add every response from an iterator.
    pub fn extend<'a, I>(&mut self, responses: I) -> &mut Self
    where
        I: IntoIterator<Item = &'a Response>,
    {
        for response in responses {
            self.push(response);
        }
        self
    }

    /// Counts accumulated so far.
    pub fn tally(&self) -> Tally {
        self.tally
    }

    /// Number of elements skipped as unusable.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Produce the distribution for everything pushed so far.
    pub fn build(&self) -> Distribution {
        debug!(
            total = self.tally.total(),
            skipped = self.skipped,
            "Built NPS distribution"
        );
        self.tally.distribution()
    }

    // An element that would overflow the running tally is skipped whole.
    fn absorb(&mut self, counts: Tally) {
        match self.tally.checked_add(counts) {
            Some(tally) => self.tally = tally,
            None => {
                debug!(total = self.tally.total(), "Skipping response that overflows the tally");
                self.skipped += 1;
            }
        }
    }

    // Counts and rating are additive: one record may contribute both.
    fn push_record(&mut self, record: &Map<String, Value>) {
        let category = record
            .get(&self.fields.nps)
            .and_then(Value::as_f64)
            .and_then(Category::classify);

        let counts = Tally::checked_new(
            count_field(record, &self.fields.promoters),
            count_field(record, &self.fields.detractors),
            count_field(record, &self.fields.neutrals),
        )
        .and_then(|counts| match category {
            Some(category) => counts.checked_add(Tally::from(category)),
            None => Some(counts),
        });

        match counts {
            Some(counts) if !counts.is_empty() => self.absorb(counts),
            _ => self.skipped += 1,
        }
    }
}

/// Read a non-negative integral count; anything else counts as zero.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn count_field(record: &Map<String, Value>, name: &str) -> u64 {
    let Some(Value::Number(number)) = record.get(name) else {
        return 0;
    };

    number
        .as_u64()
        .or_else(|| {
            number
                .as_f64()
                .filter(|n| n.is_finite() && *n >= 0.0 && n.fract() == 0.0)
                .map(|n| n as u64)
        })
        .unwrap_or(0)
}

/// Normalize a batch of responses into a distribution.
pub fn build_distribution(responses: &[Response], fields: &FieldMap) -> Distribution {
    DistributionBuilder::new(fields.clone())
        .extend(responses)
        .build()
}

#[cfg(test)]
#[path = "distribution_tests.rs"]
mod tests;
