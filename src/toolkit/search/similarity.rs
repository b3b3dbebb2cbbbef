

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};


#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, EnumString, IntoStaticStr, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SimilarityMeasure {
    /// Cosine similarity, in [-1, 1].
    #[default]
    Cosine,
    /// `exp(-d)` of the Euclidean distance `d`, in (0, 1].
    Euclidean,
}

impl SimilarityMeasure {
    pub fn similarity(&self, a: &[f32], b: &[f32]) -> f64 {
        match self {
            Self::Cosine => cosine_similarity(a, b),
            Self::Euclidean => (-euclidean_distance(a, b)).exp(),
        }
    }


    /// Row `i`, column `j` holds the similarity of `rows[i]` and `columns[j]`.
    pub fn matrix(&self, rows: &[&[f32]], columns: &[&[f32]]) -> Vec<Vec<f64>> {
        rows.iter()
            .map(|row| columns.iter().map(|col| self.similarity(row, col)).collect())
            .collect()
    }
}


pub fn cosine_similarity(vec1: &[f32], vec2: &[f32]) -> f64 {
    if vec1.is_empty() || vec2.is_empty() || vec1.len() != vec2.len() {
        return 0.0;
    }

    let dot_product: f64 = vec1.iter().zip(vec2.iter()).map(|(a, b)| f64::from(a * b)).sum();
    let mag1: f64 = vec1.iter().map(|a| f64::from(a * a)).sum::<f64>().sqrt();
    let mag2: f64 = vec2.iter().map(|b| f64::from(b * b)).sum::<f64>().sqrt();

    if mag1 == 0.0 || mag2 == 0.0 {
        return 0.0;
    }

    (dot_product / (mag1 * mag2)).clamp(-1.0, 1.0)
}


/// Mismatched widths count as infinitely far apart.
pub fn euclidean_distance(vec1: &[f32], vec2: &[f32]) -> f64 {
    if vec1.len() != vec2.len() {
        return f64::INFINITY;
    }

    vec1.iter()
        .zip(vec2.iter())
        .map(|(a, b)| {
            let d = f64::from(a - b);
            d * d
        })
        .sum::<f64>()
        .sqrt()
}
