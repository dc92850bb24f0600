use image::Rgba;

use crate::shared::face_box::FaceBox;

pub type Color = Rgba<u8>;

pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Color {
    Rgba([r, g, b, a])
}

pub const WHITE: Color = rgba(255, 255, 255, 255);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> i32 {
        self.x.saturating_add(self.width)
    }

    pub fn bottom(&self) -> i32 {
        self.y.saturating_add(self.height)
    }
}

impl From<FaceBox> for Rect {
    fn from(b: FaceBox) -> Self {
        Rect::new(b.x, b.y, b.w, b.h)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Paint {
    Solid(Color),
    /// Linear gradient along the segment `start → end`; points beyond
    /// either end take the nearest end color.
    LinearGradient {
        start: (f32, f32),
        end: (f32, f32),
        from: Color,
        to: Color,
    },
}

impl Paint {
    pub fn color_at(&self, x: f32, y: f32) -> Color {
        match self {
            Paint::Solid(c) => *c,
            Paint::LinearGradient {
                start,
                end,
                from,
                to,
            } => {
                let (dx, dy) = (end.0 - start.0, end.1 - start.1);
                let len_sq = dx * dx + dy * dy;
                let t = if len_sq == 0.0 {
                    0.0
                } else {
                    (((x - start.0) * dx + (y - start.1) * dy) / len_sq).clamp(0.0, 1.0)
                };
                lerp(*from, *to, t)
            }
        }
    }
}

fn lerp(a: Color, b: Color, t: f32) -> Color {
    let mut out = [0u8; 4];
    for (i, v) in out.iter_mut().enumerate() {
        *v = (a.0[i] as f32 + (b.0[i] as f32 - a.0[i] as f32) * t).round() as u8;
    }
    Rgba(out)
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    pub size: f32,
    pub bold: bool,
    pub color: Color,
}

/// One drawing instruction. Coordinates are surface pixels; strokes are
/// centred on the outline like a 2D canvas stroke.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// Draws the decoded source image at the origin.
    SourceImage,
    FillRect {
        rect: Rect,
        paint: Paint,
    },
    StrokeRect {
        rect: Rect,
        paint: Paint,
        width: u32,
    },
    Polyline {
        points: Vec<(i32, i32)>,
        color: Color,
        width: u32,
    },
    /// Text centred on `center`.
    Text {
        text: String,
        center: (i32, i32),
        style: TextStyle,
    },
}

/// A full description of one annotated view. Presenting a scene always
/// replaces whatever the surface showed before.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub width: u32,
    pub height: u32,
    pub commands: Vec<DrawCommand>,
}

impl Scene {
    pub fn texts(&self) -> Vec<&str> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}
