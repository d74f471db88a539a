use std::collections::BTreeMap;

use glam::Vec2;
use serde::Serialize;
use tracing::debug;

use crate::extract::{LabeledPoint, PageSet};

/// Per-page origin overrides, fully populated before normalization.
///
/// Anchors come from an operator who picked a shared reference point on
/// each sheet (a grid intersection, typically). The map is handed to
/// `normalize` by reference and never mutated afterwards, so there is no
/// ordering hazard between registration and use.
#[derive(Debug, Clone, Default)]
pub struct AnchorMap {
    anchors: BTreeMap<usize, Vec2>,
}

impl AnchorMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the raw page coordinates to treat as (0,0) for `page`.
    /// Registering twice for the same page keeps the latest origin.
    pub fn set_anchor(&mut self, page: usize, origin_x: f32, origin_y: f32) {
        debug!("anchor for page {}: ({}, {})", page, origin_x, origin_y);
        self.anchors.insert(page, Vec2::new(origin_x, origin_y));
    }

    pub fn origin(&self, page: usize) -> Option<Vec2> {
        self.anchors.get(&page).copied()
    }

    pub fn contains(&self, page: usize) -> bool {
        self.anchors.contains_key(&page)
    }

    pub fn is_empty(&self) -> bool {
        self.anchors.is_empty()
    }
}

/// A labeled point with its page-local coordinates.
///
/// Wraps rather than overwrites: the raw extraction record stays intact
/// for audit, `local` is what the matcher consumes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalibratedPoint {
    #[serde(flatten)]
    pub point: LabeledPoint,
    pub local: Vec2,
}

/// Maps every point onto its page's local frame by subtracting the page's
/// anchor origin. A pure per-page translation; no rotation or scale is
/// modeled, and normalizing one page never affects another.
///
/// Pages without a registered anchor pass through identity-anchored
/// (`local == center`). Cross-sheet comparison is only meaningful when
/// every participating page is anchored; the caller surfaces that gap.
pub fn normalize(points: &PageSet<LabeledPoint>, anchors: &AnchorMap) -> PageSet<CalibratedPoint> {
    points
        .iter()
        .map(|(&page, page_points)| {
            let origin = anchors.origin(page).unwrap_or(Vec2::ZERO);
            let calibrated = page_points
                .iter()
                .map(|point| CalibratedPoint {
                    point: point.clone(),
                    local: point.center - origin,
                })
                .collect();
            (page, calibrated)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::bbox::Bbox;

    fn point(page: usize, label: &str, center: (f32, f32)) -> LabeledPoint {
        LabeledPoint::new(
            page,
            label.to_string(),
            Bbox::new(
                Vec2::new(center.0 - 5.0, center.1 - 5.0),
                Vec2::new(center.0 + 5.0, center.1 + 5.0),
            ),
        )
    }

    #[test]
    fn test_normalize_subtracts_anchor_origin() {
        let mut points: PageSet<LabeledPoint> = PageSet::new();
        points.insert(17, vec![point(17, "COL-1", (1990.0, 1270.0))]);

        let mut anchors = AnchorMap::new();
        anchors.set_anchor(17, 1980.0, 1267.0);

        let local = normalize(&points, &anchors);

        assert_eq!(local[&17][0].local, Vec2::new(10.0, 3.0));
        // Raw coordinates preserved on the wrapped point
        assert_eq!(local[&17][0].point.center, Vec2::new(1990.0, 1270.0));
    }

    #[test]
    fn test_unanchored_page_passes_through() {
        // A page absent from the anchor registry keeps its raw coordinates
        // verbatim as local coordinates.
        let mut points: PageSet<LabeledPoint> = PageSet::new();
        points.insert(3, vec![point(3, "F30", (250.0, 400.0))]);

        let local = normalize(&points, &AnchorMap::new());

        assert_eq!(local[&3][0].local, Vec2::new(250.0, 400.0));
    }

    #[test]
    fn test_normalize_is_per_page() {
        let mut points: PageSet<LabeledPoint> = PageSet::new();
        points.insert(0, vec![point(0, "COL-1", (100.0, 100.0))]);
        points.insert(1, vec![point(1, "COL-1", (300.0, 300.0))]);

        let mut anchors = AnchorMap::new();
        anchors.set_anchor(0, 100.0, 100.0);
        anchors.set_anchor(1, 290.0, 290.0);

        let local = normalize(&points, &anchors);

        // Each page only sees its own origin
        assert_eq!(local[&0][0].local, Vec2::ZERO);
        assert_eq!(local[&1][0].local, Vec2::new(10.0, 10.0));
    }

    #[test]
    fn test_empty_pages_survive_normalization() {
        let mut points: PageSet<LabeledPoint> = PageSet::new();
        points.insert(5, Vec::new());

        let local = normalize(&points, &AnchorMap::new());

        assert!(local.contains_key(&5));
        assert!(local[&5].is_empty());
    }

    #[test]
    fn test_latest_anchor_wins() {
        let mut anchors = AnchorMap::new();
        anchors.set_anchor(2, 1.0, 1.0);
        anchors.set_anchor(2, 7.0, 9.0);

        assert_eq!(anchors.origin(2), Some(Vec2::new(7.0, 9.0)));
    }
}
