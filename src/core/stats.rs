//! Net Promoter Score statistics.
//!
//! Each respondent contributes +1 (promoter), 0 (neutral) or -1
//! (detractor). The NPS is the mean of those values, and the variance,
//! standard deviation and standard error below describe that same
//! per-respondent distribution.
//!
//! Every function returns `None` for an empty tally instead of NaN, so
//! callers must decide explicitly how to present "no data".

use serde::{Deserialize, Serialize};

use crate::core::distribution::{Category, Distribution, Tally};

/// Anything that carries a tally and can report its score.
///
/// Implementors that already hold a score return it from [`Tallied::score`]
/// rather than recomputing it. Every implementor in this crate is immutable,
/// so a held score always matches its tally.
pub trait Tallied {
    /// Underlying counts
    fn tally(&self) -> &Tally;

    /// Net Promoter Score, computed from the tally unless already known.
    fn score(&self) -> Option<f64> {
        net_score(self.tally())
    }
}

impl Tallied for Tally {
    fn tally(&self) -> &Tally {
        self
    }
}

impl Tallied for Distribution {
    fn tally(&self) -> &Tally {
        Distribution::tally(self)
    }

    fn score(&self) -> Option<f64> {
        self.nps()
    }
}

impl Tallied for Stats {
    fn tally(&self) -> &Tally {
        self.distribution.tally()
    }

    fn score(&self) -> Option<f64> {
        self.distribution.nps()
    }
}

fn net_score(tally: &Tally) -> Option<f64> {
    if tally.is_empty() {
        return None;
    }
    let promoters = tally.promoters() as f64;
    let detractors = tally.detractors() as f64;
    Some((promoters - detractors) / tally.total() as f64)
}

/// Net Promoter Score in `[-1, 1]`.
pub fn score(t: &impl Tallied) -> Option<f64> {
    t.score()
}

/// Population variance of the per-respondent +1/0/-1 values.
pub fn variance(t: &impl Tallied) -> Option<f64> {
    let tally = t.tally();
    if tally.is_empty() {
        return None;
    }
    let nps = t.score()?;

    let sum_sq: f64 = [Category::Promoter, Category::Neutral, Category::Detractor]
        .into_iter()
        .map(|category| (category.value() - nps).powi(2) * tally.count(category) as f64)
        .sum();

    Some(sum_sq / tally.total() as f64)
}

/// Standard deviation of the per-respondent values.
pub fn stddev(t: &impl Tallied) -> Option<f64> {
    variance(t).map(f64::sqrt)
}

/// Standard error of the score for a sample of this size.
pub fn stderr(t: &impl Tallied) -> Option<f64> {
    let total = t.tally().total() as f64;
    stddev(t).map(|sd| sd / total.sqrt())
}

/// Score, variance, standard deviation and standard error in one record.
pub fn stats(t: &impl Tallied) -> Stats {
    let variance = variance(t);
    let stddev = variance.map(f64::sqrt);
    let total = t.tally().total() as f64;

    Stats {
        distribution: Distribution::from(*t.tally()),
        variance,
        stddev,
        stderr: stddev.map(|sd| sd / total.sqrt()),
    }
}

/// A distribution extended with its dispersion measures.
///
/// All measures are `None` exactly when the tally is empty.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Tally")]
pub struct Stats {
    #[serde(flatten)]
    distribution: Distribution,
    variance: Option<f64>,
    stddev: Option<f64>,
    stderr: Option<f64>,
}

impl From<Tally> for Stats {
    fn from(tally: Tally) -> Self {
        stats(&tally)
    }
}

impl Stats {
    /// Distribution these measures were derived from
    pub fn distribution(&self) -> &Distribution {
        &self.distribution
    }

    /// Net Promoter Score
    pub fn nps(&self) -> Option<f64> {
        self.distribution.nps()
    }

    /// Total number of respondents
    pub fn total(&self) -> u64 {
        self.distribution.total()
    }

    /// Population variance
    pub fn variance(&self) -> Option<f64> {
        self.variance
    }

    /// Standard deviation
    pub fn stddev(&self) -> Option<f64> {
        self.stddev
    }

    /// Standard error of the score
    pub fn stderr(&self) -> Option<f64> {
        self.stderr
    }
}

#[cfg(test)]
#[path = "stats_tests.rs"]
mod tests;
