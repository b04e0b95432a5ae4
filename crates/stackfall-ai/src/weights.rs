use serde::{Deserialize, Serialize};

use crate::BoardAnalysis;

/// Coefficients of the linear placement heuristic.
///
/// A placement is scored as
///
/// ```text
/// height * aggregate_height + holes * holes + bumpiness * bumpiness
///     + lines * cleared² + well_depth * total_well_depth
///     + multiple_wells * max(well_count - 1, 0)
/// ```
///
/// Higher is better.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeightSet {
    pub height: f32,
    pub holes: f32,
    pub bumpiness: f32,
    pub lines: f32,
    pub well_depth: f32,
    pub multiple_wells: f32,
}

impl Default for WeightSet {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl WeightSet {
    pub const DEFAULT: Self = Self {
        height: -0.5,
        holes: -3.5,
        bumpiness: -0.2,
        lines: 3.0,
        well_depth: 0.1,
        multiple_wells: -10.0,
    };

    /// Scores a board after a placement that cleared `cleared_rows` rows.
    #[must_use]
    #[expect(clippy::cast_precision_loss)]
    pub fn evaluate(&self, analysis: &BoardAnalysis, cleared_rows: usize) -> f32 {
        let cleared = cleared_rows as f32;
        let extra_wells = analysis.well_count().saturating_sub(1);
        self.height * analysis.aggregate_height() as f32
            + self.holes * analysis.num_holes() as f32
            + self.bumpiness * analysis.bumpiness() as f32
            + self.lines * cleared * cleared
            + self.well_depth * analysis.total_well_depth() as f32
            + self.multiple_wells * extra_wells as f32
    }
}

#[cfg(test)]
mod tests {
    use stackfall_engine::Board;

    use super::*;

    #[test]
    fn test_default_weights_score_features() {
        let board = Board::from_ascii(
            r"
            #.........
            ##.#......
            ",
        );
        let analysis = BoardAnalysis::from_board(&board);
        // Heights 2,1,0,1: aggregate 4, bumpiness 1+1+1+1, one well of depth 1
        // at column 2.
        let expected = -0.5 * 4.0 - 0.2 * 4.0 + 0.1 * 1.0;
        let score = WeightSet::DEFAULT.evaluate(&analysis, 0);
        assert!((score - expected).abs() < 1e-5, "{score} != {expected}");

        let with_lines = WeightSet::DEFAULT.evaluate(&analysis, 2);
        assert!((with_lines - score - 12.0).abs() < 1e-5);
    }

    #[test]
    fn test_partial_weights_from_json() {
        let weights: WeightSet = serde_json::from_str(r#"{"holes": -7.0}"#).unwrap();
        assert!((weights.holes + 7.0).abs() < f32::EPSILON);
        assert!((weights.lines - WeightSet::DEFAULT.lines).abs() < f32::EPSILON);
    }
}
