use serde::{Deserialize, Serialize};

/// A face rectangle reported by the analysis service, in the pixel
/// coordinate space of the captured image.
///
/// Field names match the wire format (`{ "x", "y", "w", "h" }`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaceBox {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl FaceBox {
    pub fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    /// Expands the box by `padding` on every side.
    ///
    /// Coordinates come straight off the wire, so all arithmetic here
    /// saturates at the `i32` bounds.
    pub fn padded(&self, padding: i32) -> FaceBox {
        let both = padding.saturating_mul(2);
        FaceBox {
            x: self.x.saturating_sub(padding),
            y: self.y.saturating_sub(padding),
            w: self.w.saturating_add(both),
            h: self.h.saturating_add(both),
        }
    }

    pub fn translated(&self, dx: i32, dy: i32) -> FaceBox {
        FaceBox {
            x: self.x.saturating_add(dx),
            y: self.y.saturating_add(dy),
            ..*self
        }
    }

    pub fn right(&self) -> i32 {
        self.x.saturating_add(self.w)
    }

    pub fn bottom(&self) -> i32 {
        self.y.saturating_add(self.h)
    }
}
