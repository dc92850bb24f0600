use std::path::PathBuf;

use image::RgbaImage;
use thiserror::Error;

use crate::analysis::domain::analysis_result::{DetectionResult, EmotionResult};
use crate::rendering::domain::scene::{
    rgba, Color, DrawCommand, Paint, Rect, Scene, TextStyle, WHITE,
};
use crate::shared::captured_image::CapturedImage;
use crate::shared::face_box::FaceBox;

pub const NO_FACES_MESSAGE: &str = "No faces detected";
pub const DISPLAY_ERROR_MESSAGE: &str = "Error displaying results";

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Error displaying results: {0}")]
    Decode(#[source] image::ImageError),
    #[error("failed to load font {path}: {reason}")]
    Font { path: PathBuf, reason: String },
    #[error("failed to write {path}: {reason}")]
    Write { path: PathBuf, reason: String },
}

/// Geometry and colors of the detection overlay.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayStyle {
    pub padding: i32,
    pub shadow_offset: i32,
    pub shadow_width: u32,
    pub shadow_color: Color,
    pub box_width: u32,
    pub gradient_from: Color,
    pub gradient_to: Color,
    pub corner_size: i32,
    pub corner_width: u32,
    pub corner_color: Color,
    pub label_width: i32,
    pub label_height: i32,
    pub label_text_size: f32,
    pub empty_fill: Color,
    pub empty_text_size: f32,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            padding: 10,
            shadow_offset: 3,
            shadow_width: 6,
            shadow_color: rgba(0, 0, 0, 77),
            box_width: 4,
            gradient_from: rgba(0x63, 0x66, 0xf1, 255),
            gradient_to: rgba(0x8b, 0x5c, 0xf6, 255),
            corner_size: 25,
            corner_width: 5,
            corner_color: rgba(0x8b, 0x5c, 0xf6, 255),
            label_width: 80,
            label_height: 30,
            label_text_size: 14.0,
            empty_fill: rgba(0, 0, 0, 178),
            empty_text_size: 24.0,
        }
    }
}

/// A captured image decoded to pixels, ready to be drawn.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    pixels: RgbaImage,
    generation: u64,
}

impl DecodedImage {
    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Text for the emotion badge and its confidence field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmotionBadge {
    pub label: String,
    pub confidence: String,
}

/// Turns analysis results into something displayable.
///
/// Detection rendering is two-phase: [`decode`](Self::decode) the captured
/// image first, then build the scene from the decoded pixels, so drawing
/// can never start on an image that has not finished decoding.
pub struct ResultRenderer {
    style: OverlayStyle,
}

impl ResultRenderer {
    pub fn new(style: OverlayStyle) -> Self {
        Self { style }
    }

    pub fn decode(&self, image: &CapturedImage) -> Result<DecodedImage, RenderError> {
        let pixels = image::load_from_memory(image.payload())
            .map_err(RenderError::Decode)?
            .to_rgba8();
        Ok(DecodedImage {
            pixels,
            generation: image.generation(),
        })
    }

    /// Source image plus one labelled box per face, or the "no faces"
    /// overlay when the list is empty.
    pub fn render_detection(&self, image: &DecodedImage, faces: &DetectionResult) -> Scene {
        let (width, height) = (image.width(), image.height());
        let mut commands = vec![DrawCommand::SourceImage];

        if faces.is_empty() {
            commands.push(DrawCommand::FillRect {
                rect: Rect::new(0, 0, width as i32, height as i32),
                paint: Paint::Solid(self.style.empty_fill),
            });
            commands.push(DrawCommand::Text {
                text: NO_FACES_MESSAGE.to_string(),
                center: (width as i32 / 2, height as i32 / 2),
                style: TextStyle {
                    size: self.style.empty_text_size,
                    bold: false,
                    color: WHITE,
                },
            });
        } else {
            for (index, face) in faces.faces.iter().enumerate() {
                self.push_face(&mut commands, index + 1, face);
            }
        }

        Scene {
            width,
            height,
            commands,
        }
    }

    pub fn render_emotion(&self, emotion: &EmotionResult) -> EmotionBadge {
        EmotionBadge {
            label: emotion.emotion.clone(),
            confidence: emotion.confidence_display(),
        }
    }

    fn push_face(&self, commands: &mut Vec<DrawCommand>, number: usize, face: &FaceBox) {
        let s = &self.style;
        let outline = face.padded(s.padding);
        let (x, y) = (outline.x, outline.y);
        let (right, bottom) = (outline.right(), outline.bottom());
        let gradient = Paint::LinearGradient {
            start: (x as f32, y as f32),
            end: (right as f32, bottom as f32),
            from: s.gradient_from,
            to: s.gradient_to,
        };

        commands.push(DrawCommand::StrokeRect {
            rect: outline.translated(s.shadow_offset, s.shadow_offset).into(),
            paint: Paint::Solid(s.shadow_color),
            width: s.shadow_width,
        });
        commands.push(DrawCommand::StrokeRect {
            rect: outline.into(),
            paint: gradient.clone(),
            width: s.box_width,
        });

        let c = s.corner_size;
        let (x_in, y_in) = (x.saturating_add(c), y.saturating_add(c));
        let (right_in, bottom_in) = (right.saturating_sub(c), bottom.saturating_sub(c));
        let corners = [
            vec![(x, y_in), (x, y), (x_in, y)],
            vec![(right_in, y), (right, y), (right, y_in)],
            vec![(x, bottom_in), (x, bottom), (x_in, bottom)],
            vec![(right_in, bottom), (right, bottom), (right, bottom_in)],
        ];
        for points in corners {
            commands.push(DrawCommand::Polyline {
                points,
                color: s.corner_color,
                width: s.corner_width,
            });
        }

        commands.push(DrawCommand::FillRect {
            rect: Rect::new(
                x,
                y.saturating_sub(s.label_height),
                s.label_width,
                s.label_height,
            ),
            paint: gradient,
        });
        commands.push(DrawCommand::Text {
            text: format!("Face {number}"),
            center: (
                x.saturating_add(s.label_width / 2),
                y.saturating_sub(s.label_height / 2),
            ),
            style: TextStyle {
                size: s.label_text_size,
                bold: true,
                color: WHITE,
            },
        });
    }
}

impl Default for ResultRenderer {
    fn default() -> Self {
        Self::new(OverlayStyle::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::domain::analysis_result::Confidence;
    use crate::shared::captured_image::JPEG_MIME;

    fn decoded(width: u32, height: u32) -> DecodedImage {
        DecodedImage {
            pixels: RgbaImage::new(width, height),
            generation: 1,
        }
    }

    fn jpeg(width: u32, height: u32) -> CapturedImage {
        let img = image::RgbImage::from_pixel(width, height, image::Rgb([90, 90, 90]));
        let mut buf = std::io::Cursor::new(Vec::new());
        img.write_to(&mut buf, image::ImageFormat::Jpeg).unwrap();
        CapturedImage::new(buf.into_inner(), JPEG_MIME, width, height, 3)
    }

    fn stroke_rects(scene: &Scene, width: u32) -> Vec<Rect> {
        scene
            .commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::StrokeRect { rect, width: w, .. } if *w == width => Some(*rect),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_decode_keeps_native_size_and_generation() {
        let image = ResultRenderer::default().decode(&jpeg(64, 48)).unwrap();
        assert_eq!((image.width(), image.height()), (64, 48));
        assert_eq!(image.generation(), 3);
    }

    #[test]
    fn test_decode_garbage_fails() {
        let bad = CapturedImage::new(vec![1, 2, 3], JPEG_MIME, 1, 1, 1);
        let err = ResultRenderer::default().decode(&bad).unwrap_err();
        assert!(err.to_string().starts_with("Error displaying results"));
    }

    #[test]
    fn test_empty_detection_draws_overlay_and_message() {
        let scene = ResultRenderer::default()
            .render_detection(&decoded(200, 100), &DetectionResult::default());

        assert_eq!((scene.width, scene.height), (200, 100));
        assert_eq!(scene.commands[0], DrawCommand::SourceImage);
        assert_eq!(
            scene.commands[1],
            DrawCommand::FillRect {
                rect: Rect::new(0, 0, 200, 100),
                paint: Paint::Solid(rgba(0, 0, 0, 178)),
            }
        );
        match &scene.commands[2] {
            DrawCommand::Text { text, center, .. } => {
                assert_eq!(text, NO_FACES_MESSAGE);
                assert_eq!(*center, (100, 50));
            }
            other => panic!("expected text, got {other:?}"),
        }
        assert_eq!(scene.commands.len(), 3);
    }

    #[test]
    fn test_labels_follow_response_order() {
        let faces = DetectionResult::new(vec![
            FaceBox::new(300, 200, 50, 50),
            FaceBox::new(20, 40, 60, 60),
            FaceBox::new(150, 150, 10, 10),
        ]);
        let scene = ResultRenderer::default().render_detection(&decoded(640, 480), &faces);
        assert_eq!(scene.texts(), vec!["Face 1", "Face 2", "Face 3"]);
    }

    #[test]
    fn test_boxes_are_padded_on_all_sides() {
        let faces = DetectionResult::new(vec![
            FaceBox::new(100, 80, 40, 50),
            FaceBox::new(300, 200, 20, 30),
        ]);
        let scene = ResultRenderer::default().render_detection(&decoded(640, 480), &faces);

        assert_eq!(
            stroke_rects(&scene, 4),
            vec![Rect::new(90, 70, 60, 70), Rect::new(290, 190, 40, 50)]
        );
        // shadows sit 3px down-right of the box
        assert_eq!(
            stroke_rects(&scene, 6),
            vec![Rect::new(93, 73, 60, 70), Rect::new(293, 193, 40, 50)]
        );
    }

    #[test]
    fn test_label_sits_above_box() {
        let faces = DetectionResult::new(vec![FaceBox::new(100, 80, 40, 50)]);
        let scene = ResultRenderer::default().render_detection(&decoded(640, 480), &faces);

        let label = scene.commands.iter().find_map(|c| match c {
            DrawCommand::FillRect { rect, .. } => Some(*rect),
            _ => None,
        });
        assert_eq!(label, Some(Rect::new(90, 40, 80, 30)));
        let center = scene.commands.iter().find_map(|c| match c {
            DrawCommand::Text { center, .. } => Some(*center),
            _ => None,
        });
        assert_eq!(center, Some((130, 55)));
    }

    #[test]
    fn test_four_corner_accents_per_face() {
        let faces = DetectionResult::new(vec![FaceBox::new(100, 100, 50, 50)]);
        let scene = ResultRenderer::default().render_detection(&decoded(640, 480), &faces);

        let corners: Vec<&Vec<(i32, i32)>> = scene
            .commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Polyline { points, .. } => Some(points),
                _ => None,
            })
            .collect();
        assert_eq!(corners.len(), 4);
        // padded box spans (90, 90)–(160, 160)
        assert_eq!(*corners[0], vec![(90, 115), (90, 90), (115, 90)]);
        assert_eq!(*corners[3], vec![(135, 160), (160, 160), (160, 135)]);
    }

    #[test]
    fn test_face_near_coordinate_limit_does_not_overflow() {
        let faces = DetectionResult::new(vec![
            FaceBox::new(i32::MAX - 5, 10, 20, 20),
            FaceBox::new(i32::MIN, i32::MIN, i32::MAX, i32::MAX),
        ]);
        let scene = ResultRenderer::default().render_detection(&decoded(64, 64), &faces);

        assert_eq!(scene.texts(), vec!["Face 1", "Face 2"]);
        let outlines = stroke_rects(&scene, 4);
        assert_eq!(outlines[0].x, i32::MAX - 15);
        assert_eq!(outlines[0].right(), i32::MAX);
    }

    #[test]
    fn test_render_is_deterministic() {
        let faces = DetectionResult::new(vec![FaceBox::new(10, 10, 20, 20)]);
        let renderer = ResultRenderer::default();
        let image = decoded(100, 100);
        assert_eq!(
            renderer.render_detection(&image, &faces),
            renderer.render_detection(&image, &faces)
        );
    }

    #[test]
    fn test_render_emotion_badge() {
        let badge = ResultRenderer::default().render_emotion(&EmotionResult::new(
            "Happy",
            Some(Confidence::Text("92%".into())),
        ));
        assert_eq!(
            badge,
            EmotionBadge {
                label: "Happy".into(),
                confidence: "92%".into(),
            }
        );
    }

    #[test]
    fn test_render_emotion_without_confidence() {
        let badge = ResultRenderer::default().render_emotion(&EmotionResult::new("no_face", None));
        assert_eq!(badge.label, "no_face");
        assert_eq!(badge.confidence, "N/A");
    }
}
