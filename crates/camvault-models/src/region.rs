use serde::{Deserialize, Serialize};

/// A pixel-space rectangle marking a detected face within a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaceRegion {
    /// X coordinate of the top-left corner in pixels
    pub x: u32,
    /// Y coordinate of the top-left corner in pixels
    pub y: u32,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl FaceRegion {
    /// Create a new face region.
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Check whether the region has zero extent on either axis.
    pub fn is_degenerate(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Area in pixels.
    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Shorter side in pixels. Used to reject regions too small to encode.
    pub fn min_side(&self) -> u32 {
        self.width.min(self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_degenerate_region() {
        assert!(FaceRegion::new(0, 0, 0, 10).is_degenerate());
        assert!(FaceRegion::new(0, 0, 10, 0).is_degenerate());
        assert!(!FaceRegion::new(5, 5, 10, 10).is_degenerate());
    }

    #[test]
    fn test_area_and_min_side() {
        let r = FaceRegion::new(10, 20, 30, 40);
        assert_eq!(r.area(), 1200);
        assert_eq!(r.min_side(), 30);
    }
}
