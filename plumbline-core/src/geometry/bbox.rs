use serde::Serialize;

/// A 2D axis-aligned bounding box represented by minimum and maximum points.
///
/// Extracted tokens carry their box in page coordinates (top-left origin,
/// Y increasing downward); OCR tokens carry it in raster pixels until the
/// extractor rescales them. The box is retained on every labeled point for
/// provenance; matching math only ever uses the derived center.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Bbox {
    /// The minimum point of the bounding box.
    pub min: glam::Vec2,
    /// The maximum point of the bounding box.
    pub max: glam::Vec2,
}

impl Bbox {
    /// Creates a new bounding box from minimum and maximum points.
    ///
    /// # Example
    /// ```
    /// use glam::Vec2;
    /// use plumbline_core::geometry::bbox::Bbox;
    /// let bbox = Bbox::new(Vec2::new(0.0, 0.0), Vec2::new(10.0, 5.0));
    /// ```
    pub fn new(min: glam::Vec2, max: glam::Vec2) -> Self {
        Self { min, max }
    }

    /// Creates a new bounding box from a minimum point and size vector.
    ///
    /// This is the shape OCR output arrives in: Tesseract reports word boxes
    /// as `(left, top, width, height)` in pixels.
    ///
    /// # Example
    /// ```
    /// use glam::Vec2;
    /// use plumbline_core::geometry::bbox::Bbox;
    /// let bbox = Bbox::new_from_min_size(Vec2::new(1.0, 2.0), Vec2::new(5.0, 3.0));
    /// // Creates a bbox from (1,2) to (6,5)
    /// ```
    pub fn new_from_min_size(min: glam::Vec2, size: glam::Vec2) -> Self {
        Self {
            min,
            max: min + size,
        }
    }

    /// Calculates the center point of the bounding box.
    ///
    /// # Example
    /// ```
    /// use glam::Vec2;
    /// use plumbline_core::geometry::bbox::Bbox;
    /// let bbox = Bbox::new(Vec2::new(0.0, 0.0), Vec2::new(4.0, 2.0));
    /// assert_eq!(bbox.center(), Vec2::new(2.0, 1.0));
    /// ```
    pub fn center(&self) -> glam::Vec2 {
        (self.min + self.max) / 2.0
    }

    /// Width and height of the bounding box.
    pub fn size(&self) -> glam::Vec2 {
        self.max - self.min
    }

    /// Creates a union bounding box that encompasses both this bounding box
    /// and another. Used when merging per-character boxes into word boxes.
    pub fn union(&self, other: &Self) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Uniformly rescales both corners, e.g. raster pixels to page points.
    pub fn scaled(&self, factor: f32) -> Self {
        Self {
            min: self.min * factor,
            max: self.max * factor,
        }
    }

    /// Flips the Y axis against the given extent, converting between
    /// bottom-left-origin page space and top-left-origin raster space.
    pub fn flip_y(&self, extent: f32) -> Self {
        let min = glam::Vec2::new(self.min.x, extent - self.max.y);
        let max = glam::Vec2::new(self.max.x, extent - self.min.y);

        Self::new(min, max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bbox_center() {
        // Center of rectangle starting at origin
        let bbox = Bbox::new_from_min_size(glam::Vec2::ZERO, glam::Vec2::new(2.0, 3.0));
        assert_eq!(bbox.center(), glam::Vec2::new(1.0, 1.5));

        // Center of offset rectangle
        let offset_bbox = Bbox::new(glam::Vec2::new(10.0, 20.0), glam::Vec2::new(14.0, 26.0));
        assert_eq!(offset_bbox.center(), glam::Vec2::new(12.0, 23.0));

        // Center with negative coordinates
        let negative = Bbox::new(glam::Vec2::new(-4.0, -2.0), glam::Vec2::new(0.0, 2.0));
        assert_eq!(negative.center(), glam::Vec2::new(-2.0, 0.0));
    }

    #[test]
    fn test_bbox_from_min_size() {
        let bbox = Bbox::new_from_min_size(glam::Vec2::new(100.0, 100.0), glam::Vec2::new(50.0, 20.0));
        assert_eq!(bbox.min, glam::Vec2::new(100.0, 100.0));
        assert_eq!(bbox.max, glam::Vec2::new(150.0, 120.0));
        assert_eq!(bbox.center(), glam::Vec2::new(125.0, 110.0));
        assert_eq!(bbox.size(), glam::Vec2::new(50.0, 20.0));
    }

    #[test]
    fn test_bbox_union() {
        // Two overlapping boxes
        let bbox1 = Bbox::new(glam::Vec2::new(0.0, 0.0), glam::Vec2::new(5.0, 5.0));
        let bbox2 = Bbox::new(glam::Vec2::new(3.0, 3.0), glam::Vec2::new(8.0, 8.0));
        let union = bbox1.union(&bbox2);
        assert_eq!(union.min, glam::Vec2::new(0.0, 0.0));
        assert_eq!(union.max, glam::Vec2::new(8.0, 8.0));

        // Adjacent character boxes merging into a word box
        let c1 = Bbox::new(glam::Vec2::new(10.0, 10.0), glam::Vec2::new(14.0, 18.0));
        let c2 = Bbox::new(glam::Vec2::new(14.0, 10.0), glam::Vec2::new(18.0, 18.0));
        let word = c1.union(&c2);
        assert_eq!(word.min, glam::Vec2::new(10.0, 10.0));
        assert_eq!(word.max, glam::Vec2::new(18.0, 18.0));

        // Union symmetry
        assert_eq!(bbox1.union(&bbox2), bbox2.union(&bbox1));
    }

    #[test]
    fn test_bbox_scaled() {
        // 200 DPI raster pixels back to 72-point page units: factor 72/200 = 0.36
        let px = Bbox::new_from_min_size(glam::Vec2::new(100.0, 100.0), glam::Vec2::new(50.0, 20.0));
        let pt = px.scaled(72.0 / 200.0);
        assert!((pt.center().x - 45.0).abs() < 1e-4);
        assert!((pt.center().y - 39.6).abs() < 1e-4);
    }

    #[test]
    fn test_bbox_flip_y() {
        // Page-space box (bottom-left origin) against a 100-unit tall page
        let bbox = Bbox::new(glam::Vec2::new(10.0, 20.0), glam::Vec2::new(50.0, 80.0));
        let flipped = bbox.flip_y(100.0);
        assert_eq!(flipped.min, glam::Vec2::new(10.0, 20.0));
        assert_eq!(flipped.max, glam::Vec2::new(50.0, 80.0));

        // Box near the top of the page lands near origin after flipping
        let top = Bbox::new(glam::Vec2::new(0.0, 90.0), glam::Vec2::new(20.0, 100.0));
        let top_flipped = top.flip_y(100.0);
        assert_eq!(top_flipped.min, glam::Vec2::new(0.0, 0.0));
        assert_eq!(top_flipped.max, glam::Vec2::new(20.0, 10.0));

        // Flipping twice is the identity
        assert_eq!(bbox.flip_y(100.0).flip_y(100.0), bbox);
    }
}
