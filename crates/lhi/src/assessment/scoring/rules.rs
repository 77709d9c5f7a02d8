use super::super::catalog::Catalog;
use super::policy::Level;
use super::{AnswerMap, DimensionResult};

/// Substituted for any item the respondent skipped.
const NEUTRAL_ANSWER: i32 = 3;
const SCALE_MIDPOINT: f64 = 3.0;
const SCALE_SPREAD: f64 = 1.0;
const REVERSE_PIVOT: i64 = 6;

pub(crate) struct DimensionSignals {
    pub results: Vec<DimensionResult>,
    /// Mean of the unrounded health z-scores.
    pub mean_z: f64,
}

pub(crate) fn score_dimensions(answers: &AnswerMap, catalog: &Catalog) -> DimensionSignals {
    let mut results = Vec::with_capacity(catalog.dimensions().len());
    let mut total_z = 0.0;

    for dimension in catalog.dimensions() {
        let mut sum = 0i64;
        let mut count = 0usize;

        for item in catalog.items_for(&dimension.id) {
            let raw = i64::from(answers.get(&item.id).copied().unwrap_or(NEUTRAL_ANSWER));
            sum += if item.is_reverse {
                REVERSE_PIVOT - raw
            } else {
                raw
            };
            count += 1;
        }

        let average = if count == 0 {
            SCALE_MIDPOINT
        } else {
            sum as f64 / count as f64
        };
        let z_score = (SCALE_MIDPOINT - average) / SCALE_SPREAD;
        let stored_z = round_to_hundredths(z_score);

        results.push(DimensionResult {
            id: dimension.id.clone(),
            name: dimension.name_cn.clone(),
            raw_score: round_to_hundredths(average),
            z_score: stored_z,
            t_score: t_score(stored_z),
            level: Level::from_z_score(z_score),
        });

        total_z += z_score;
    }

    let mean_z = if results.is_empty() {
        0.0
    } else {
        total_z / results.len() as f64
    };

    DimensionSignals { results, mean_z }
}

/// Conventional T transform (mean 50, SD 10) of a health-signed z-score.
pub(crate) fn t_score(z_score: f64) -> i32 {
    round_half_up(50.0 + 10.0 * z_score) as i32
}

pub(crate) fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

/// Ties round away from zero.
pub(crate) fn round_to_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
