/// Axis-aligned pixel rectangle given by its two corners (x1, y1) and (x2, y2).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl BoundingBox {
    pub fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Build from float corners, truncating toward zero like an integer cast.
    pub fn from_corners_f32(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self::new(x1 as i32, y1 as i32, x2 as i32, y2 as i32)
    }

    pub fn width(&self) -> i32 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> i32 {
        self.y2 - self.y1
    }

    /// Clip to `[0, width-1] x [0, height-1]`; `None` when nothing is left.
    pub fn clipped(&self, width: u32, height: u32) -> Option<BoundingBox> {
        if width == 0 || height == 0 {
            return None;
        }
        let max_x = width as i32 - 1;
        let max_y = height as i32 - 1;
        let (lx, hx) = (self.x1.min(self.x2), self.x1.max(self.x2));
        let (ly, hy) = (self.y1.min(self.y2), self.y1.max(self.y2));
        if hx < 0 || hy < 0 || lx > max_x || ly > max_y {
            return None;
        }
        Some(BoundingBox::new(
            lx.clamp(0, max_x),
            ly.clamp(0, max_y),
            hx.clamp(0, max_x),
            hy.clamp(0, max_y),
        ))
    }
}

/// One unfiltered candidate as reported by a detector.
#[derive(Debug, Clone, PartialEq)]
pub struct RawCandidate {
    pub bbox: BoundingBox,
    pub class_index: usize,
    pub confidence: f32,
}

/// Canonical detection record handed to the compositor.
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    pub bbox: BoundingBox,
    /// Detector score in [0, 1].
    pub confidence: f32,
    pub label: String,
}
