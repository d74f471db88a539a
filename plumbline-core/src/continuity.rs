use serde::Serialize;
use tracing::debug;

use crate::{
    calibrate::CalibratedPoint,
    consts::DEFAULT_TOLERANCE,
    error::PlumblineError,
    extract::PageSet,
};

/// Classification of one lower-sheet element against the upper sheet.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum Continuity {
    /// A nearby element exists on the upper sheet; `distance` is the
    /// achieved minimum in normalized page points.
    Continuous { distance: f32 },
    /// Nothing on the upper sheet within tolerance.
    Discontinuous,
}

/// Verdict for one element on the lower sheet of an adjacent pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContinuityVerdict {
    /// Lower page index of the compared pair.
    pub lower: usize,
    /// Upper page index of the compared pair.
    pub upper: usize,
    /// Label of the originating lower-sheet element.
    pub label: String,
    #[serde(flatten)]
    pub state: Continuity,
}

/// Nearest-neighbor continuity matching between adjacent sheets.
///
/// Pure function of its normalized input: no I/O, no state beyond the
/// tolerance. O(N*M) per sheet pair, which is fine at the tens-to-hundreds
/// of tags a structural sheet carries; a spatial index could be swapped in
/// without changing the contract.
#[derive(Debug, Clone, Copy)]
pub struct ContinuityChecker {
    tolerance: f32,
}

impl Default for ContinuityChecker {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
        }
    }
}

impl ContinuityChecker {
    pub fn new(tolerance: f32) -> Self {
        Self { tolerance }
    }

    pub fn tolerance(&self) -> f32 {
        self.tolerance
    }

    /// Verifies every adjacent sheet pair in the dataset.
    ///
    /// Adjacency comes from the sorted set of page indices that actually
    /// carry points: a page with zero extracted elements contributes no
    /// verdicts and does not break the chain around it, so 17 and 19 become
    /// adjacent when 18 is empty. Output order is deterministic: by pair,
    /// then by the lower sheet's original element order.
    pub fn verify(&self, sheets: &PageSet<CalibratedPoint>) -> Vec<ContinuityVerdict> {
        let pages: Vec<usize> = sheets
            .iter()
            .filter(|(_, points)| !points.is_empty())
            .map(|(&page, _)| page)
            .collect();

        let mut verdicts = Vec::new();
        for pair in pages.windows(2) {
            let (lower, upper) = (pair[0], pair[1]);
            verdicts.extend(self.check_sheets(&sheets[&lower], &sheets[&upper], lower, upper));
        }

        verdicts
    }

    /// Verifies one explicit pair of sheets.
    ///
    /// Referencing a page index that was never scanned is caller misuse and
    /// fails fast, unlike a scanned-but-empty page which yields no verdicts.
    pub fn verify_pair(
        &self,
        sheets: &PageSet<CalibratedPoint>,
        lower: usize,
        upper: usize,
    ) -> Result<Vec<ContinuityVerdict>, PlumblineError> {
        let lower_points = sheets
            .get(&lower)
            .ok_or(PlumblineError::PageNotFound { page: lower })?;
        let upper_points = sheets
            .get(&upper)
            .ok_or(PlumblineError::PageNotFound { page: upper })?;

        if lower_points.is_empty() || upper_points.is_empty() {
            return Ok(Vec::new());
        }

        Ok(self.check_sheets(lower_points, upper_points, lower, upper))
    }

    fn check_sheets(
        &self,
        lower_points: &[CalibratedPoint],
        upper_points: &[CalibratedPoint],
        lower: usize,
        upper: usize,
    ) -> Vec<ContinuityVerdict> {
        lower_points
            .iter()
            .map(|element| {
                // Strict `<` keeps the first of equidistant candidates, so
                // ties resolve to the lowest upper-element index.
                let mut nearest: Option<f32> = None;
                for candidate in upper_points {
                    let distance = element.local.distance(candidate.local);
                    if nearest.is_none_or(|best| distance < best) {
                        nearest = Some(distance);
                    }
                }

                let state = match nearest {
                    Some(distance) if distance <= self.tolerance => {
                        Continuity::Continuous { distance }
                    }
                    _ => Continuity::Discontinuous,
                };
                debug!(
                    "pair {} -> {}: `{}` {:?}",
                    lower, upper, element.point.label, state
                );

                ContinuityVerdict {
                    lower,
                    upper,
                    label: element.point.label.clone(),
                    state,
                }
            })
            .collect()
    }
}
