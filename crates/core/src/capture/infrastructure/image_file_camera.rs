use std::fs;
use std::path::{Path, PathBuf};

use crate::capture::domain::camera::{Camera, StreamConstraints, VideoStream};
use crate::shared::constants::IMAGE_EXTENSIONS;
use crate::shared::frame::Frame;

/// A camera backed by still image files.
///
/// `source` is either one image file or a directory; a directory yields its
/// image files in name order, cycling back to the first after the last.
/// Frames larger than the requested constraints are downscaled to fit,
/// preserving aspect ratio.
pub struct ImageFileCamera {
    source: PathBuf,
}

impl ImageFileCamera {
    pub fn new(source: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
        }
    }
}

impl Camera for ImageFileCamera {
    fn acquire(
        &mut self,
        constraints: &StreamConstraints,
    ) -> Result<Box<dyn VideoStream>, Box<dyn std::error::Error>> {
        let paths = list_frames(&self.source)?;
        if paths.is_empty() {
            return Err(format!("No image frames found in {}", self.source.display()).into());
        }
        log::info!(
            "Camera stream from {} ({} frame file(s), ideal {}x{} {:?})",
            self.source.display(),
            paths.len(),
            constraints.width,
            constraints.height,
            constraints.facing
        );
        Ok(Box::new(ImageFileStream {
            paths,
            constraints: *constraints,
            sequence: 0,
        }))
    }
}

struct ImageFileStream {
    paths: Vec<PathBuf>,
    constraints: StreamConstraints,
    sequence: u64,
}

impl VideoStream for ImageFileStream {
    fn grab(&mut self) -> Result<Frame, Box<dyn std::error::Error>> {
        if self.paths.is_empty() {
            return Err("Camera stream has been stopped".into());
        }
        let path = &self.paths[(self.sequence % self.paths.len() as u64) as usize];
        let img = image::open(path)?.to_rgb8();
        let img = fit_within(img, self.constraints.width, self.constraints.height);
        let frame = Frame::from_rgb_image(img, self.sequence);
        self.sequence += 1;
        Ok(frame)
    }

    fn stop(&mut self) {
        self.paths.clear();
    }
}

fn list_frames(source: &Path) -> Result<Vec<PathBuf>, Box<dyn std::error::Error>> {
    if !source.exists() {
        return Err(format!("Camera source not found: {}", source.display()).into());
    }
    if source.is_file() {
        return Ok(vec![source.to_path_buf()]);
    }
    let mut paths: Vec<PathBuf> = fs::read_dir(source)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file() && is_image(p))
        .collect();
    paths.sort();
    Ok(paths)
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

fn fit_within(img: image::RgbImage, max_w: u32, max_h: u32) -> image::RgbImage {
    let (w, h) = img.dimensions();
    if max_w == 0 || max_h == 0 || (w <= max_w && h <= max_h) {
        return img;
    }
    let scale = (max_w as f64 / w as f64).min(max_h as f64 / h as f64);
    let new_w = ((w as f64 * scale).round() as u32).max(1);
    let new_h = ((h as f64 * scale).round() as u32).max(1);
    image::imageops::resize(&img, new_w, new_h, image::imageops::FilterType::Triangle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::domain::camera::FacingMode;

    fn write_image(dir: &Path, name: &str, width: u32, height: u32, value: u8) -> PathBuf {
        let path = dir.join(name);
        let img = image::RgbImage::from_pixel(width, height, image::Rgb([value, value, value]));
        img.save(&path).unwrap();
        path
    }

    fn constraints(width: u32, height: u32, facing: FacingMode) -> StreamConstraints {
        StreamConstraints {
            width,
            height,
            facing,
        }
    }

    #[test]
    fn test_single_file_yields_same_frame_repeatedly() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_image(dir.path(), "frame.png", 40, 30, 77);
        let mut stream = ImageFileCamera::new(path)
            .acquire(&StreamConstraints::default())
            .unwrap();

        let first = stream.grab().unwrap();
        let second = stream.grab().unwrap();
        assert_eq!(first.width(), 40);
        assert_eq!(first.data()[0], 77);
        assert_eq!(second.data()[0], 77);
        assert_eq!(second.sequence(), 1);
    }

    #[test]
    fn test_directory_cycles_in_name_order() {
        let dir = tempfile::tempdir().unwrap();
        write_image(dir.path(), "b.png", 10, 10, 200);
        write_image(dir.path(), "a.png", 10, 10, 100);
        std::fs::write(dir.path().join("notes.txt"), b"ignored").unwrap();

        let mut stream = ImageFileCamera::new(dir.path())
            .acquire(&StreamConstraints::default())
            .unwrap();

        let values: Vec<u8> = (0..3).map(|_| stream.grab().unwrap().data()[0]).collect();
        assert_eq!(values, vec![100, 200, 100]);
    }

    #[test]
    fn test_large_frames_are_fitted_to_constraints() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_image(dir.path(), "big.png", 400, 200, 10);
        let mut stream = ImageFileCamera::new(path)
            .acquire(&constraints(100, 100, FacingMode::User))
            .unwrap();

        let frame = stream.grab().unwrap();
        assert_eq!((frame.width(), frame.height()), (100, 50));
    }

    #[test]
    fn test_rear_facing_request_yields_same_frames() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_image(dir.path(), "frame.png", 20, 10, 33);
        let mut stream = ImageFileCamera::new(path)
            .acquire(&constraints(1280, 720, FacingMode::Environment))
            .unwrap();

        let frame = stream.grab().unwrap();
        assert_eq!((frame.width(), frame.height()), (20, 10));
        assert_eq!(frame.data()[0], 33);
    }

    #[test]
    fn test_grab_after_stop_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_image(dir.path(), "frame.png", 8, 8, 1);
        let mut stream = ImageFileCamera::new(path)
            .acquire(&StreamConstraints::default())
            .unwrap();

        stream.stop();
        assert!(stream.grab().is_err());
    }

    #[test]
    fn test_missing_source_is_an_error() {
        let result = ImageFileCamera::new("/nonexistent/frames").acquire(&StreamConstraints::default());
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = ImageFileCamera::new(dir.path()).acquire(&StreamConstraints::default());
        assert!(result.is_err());
    }
}
