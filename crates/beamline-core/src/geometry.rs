//! Longitudinal geometry primitives.
//!
//! Everything in a beamline lives on a single axis. An element is described by
//! its center and length; [`Extent`] is the closed interval it occupies.

/// Distance below which two longitudinal positions are considered equal.
///
/// This is an absolute tolerance in lattice length units and applies to every
/// sequence regardless of its length.
pub const ZERO_DISTANCE: f64 = 1.0e-5;

/// The closed interval `[start, end]` occupied by an element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extent {
    start: f64,
    end: f64,
}

impl Extent {
    /// Create an extent from explicit bounds.
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    /// Create the extent of an element of `length` centered at `center`.
    ///
    /// # Examples
    ///
    /// ```
    /// use beamline_core::geometry::Extent;
    ///
    /// let extent = Extent::from_center(0.5, 0.2);
    /// assert!((extent.start() - 0.4).abs() < 1e-12);
    /// assert!((extent.end() - 0.6).abs() < 1e-12);
    /// ```
    pub fn from_center(center: f64, length: f64) -> Self {
        Self {
            start: center - length / 2.0,
            end: center + length / 2.0,
        }
    }

    pub fn start(&self) -> f64 {
        self.start
    }

    pub fn end(&self) -> f64 {
        self.end
    }

    pub fn length(&self) -> f64 {
        self.end - self.start
    }

    pub fn center(&self) -> f64 {
        0.5 * (self.start + self.end)
    }

    /// Returns `true` if `position` lies inside the extent, both ends
    /// inclusive and widened by `tolerance`.
    pub fn contains(&self, position: f64, tolerance: f64) -> bool {
        position >= self.start - tolerance && position <= self.end + tolerance
    }

    /// Signed distance from the end of `self` to the start of `next`.
    ///
    /// Negative values mean the two extents overlap.
    pub fn gap_to(&self, next: &Extent) -> f64 {
        next.start - self.end
    }

    /// Shift the extent by `offset`.
    pub fn translate(&self, offset: f64) -> Self {
        Self {
            start: self.start + offset,
            end: self.end + offset,
        }
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;

    use super::*;

    #[test]
    fn test_from_center() {
        let extent = Extent::from_center(1.0, 0.5);
        assert_approx_eq!(f64, extent.start(), 0.75);
        assert_approx_eq!(f64, extent.end(), 1.25);
        assert_approx_eq!(f64, extent.length(), 0.5);
        assert_approx_eq!(f64, extent.center(), 1.0);
    }

    #[test]
    fn test_zero_length_extent() {
        let extent = Extent::from_center(0.3, 0.0);
        assert_approx_eq!(f64, extent.start(), 0.3);
        assert_approx_eq!(f64, extent.end(), 0.3);
        assert!(extent.contains(0.3, 0.0));
    }

    #[test]
    fn test_contains_is_inclusive() {
        let extent = Extent::new(0.4, 0.6);
        assert!(extent.contains(0.4, 0.0));
        assert!(extent.contains(0.6, 0.0));
        assert!(extent.contains(0.5, 0.0));
        assert!(!extent.contains(0.61, 0.0));
    }

    #[test]
    fn test_contains_with_tolerance() {
        let extent = Extent::new(0.4, 0.6);
        assert!(extent.contains(0.6 + 0.5 * ZERO_DISTANCE, ZERO_DISTANCE));
        assert!(extent.contains(0.4 - 0.5 * ZERO_DISTANCE, ZERO_DISTANCE));
        assert!(!extent.contains(0.6 + 2.0 * ZERO_DISTANCE, ZERO_DISTANCE));
    }

    #[test]
    fn test_gap_to() {
        let first = Extent::new(0.0, 0.4);
        let second = Extent::new(0.5, 0.7);
        assert_approx_eq!(f64, first.gap_to(&second), 0.1, epsilon = 1e-12);

        let overlapping = Extent::new(0.39, 0.5);
        assert!(first.gap_to(&overlapping) < 0.0);
    }

    #[test]
    fn test_translate() {
        let extent = Extent::new(0.1, 0.2).translate(2.0);
        assert_approx_eq!(f64, extent.start(), 2.1);
        assert_approx_eq!(f64, extent.end(), 2.2);
    }
}
