pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:8000";
pub const PROCESS_PATH: &str = "/process";
pub const HEALTH_PATH: &str = "/health";

pub const DEFAULT_JPEG_QUALITY: u8 = 90;
pub const DEFAULT_CAMERA_WIDTH: u32 = 1280;
pub const DEFAULT_CAMERA_HEIGHT: u32 = 720;

/// How long a confirmation label stays on a control before it reverts.
pub const DEFAULT_CONFIRMATION_MS: u64 = 2000;

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tiff", "tif", "webp"];
