mod settings;

use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;

use facelens_core::analysis::domain::analysis_task::AnalysisTask;
use facelens_core::analysis::infrastructure::http_analysis_client::HttpAnalysisClient;
use facelens_core::capture::capture_source::CaptureSource;
use facelens_core::capture::domain::camera::{FacingMode, StreamConstraints};
use facelens_core::capture::infrastructure::image_file_camera::ImageFileCamera;
use facelens_core::pipeline::annotation_session::{AnnotationSession, SessionEvent};
use facelens_core::pipeline::notifier::Notifier;
use facelens_core::rendering::infrastructure::raster_surface::{write_captured, RasterSurface};
use facelens_core::session::result_summary::ResultSummary;
use facelens_core::session::revert_scheduler::SystemClock;

use settings::Settings;

/// Timeout used for waiting on results when none is configured.
const DEFAULT_WAIT_SECS: u64 = 30;

/// Capture frames, send them for face analysis and draw the results.
#[derive(Parser)]
#[command(name = "facelens")]
struct Cli {
    /// Image file or directory of frames used as the camera.
    #[arg(required_unless_present = "health")]
    source: Option<PathBuf>,

    /// Annotated PNG output for detection results.
    output: Option<PathBuf>,

    /// Analysis server base URL.
    #[arg(long)]
    server: Option<String>,

    /// Analyses to run on each capture (comma-separated).
    #[arg(long, value_delimiter = ',', default_value = "detection,emotion")]
    task: Vec<AnalysisTask>,

    /// Number of frames to capture.
    #[arg(long, default_value = "1")]
    captures: usize,

    /// Also write the raw captured JPEG here.
    #[arg(long)]
    raw_output: Option<PathBuf>,

    /// TrueType/OpenType font for overlay labels. Without one, the annotated
    /// image has face boxes but no "Face <n>" or "No faces detected" text.
    #[arg(long)]
    font: Option<PathBuf>,

    /// JPEG encoding quality (1-100).
    #[arg(long)]
    jpeg_quality: Option<u8>,

    /// Request timeout in seconds.
    #[arg(long)]
    timeout: Option<u64>,

    /// Settings file (defaults to the user config directory).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Only check that the analysis server is up.
    #[arg(long)]
    health: bool,
}

struct StderrNotifier;

impl Notifier for StderrNotifier {
    fn alert(&mut self, message: &str) {
        eprintln!("{message}");
    }
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let settings = resolve_settings(&cli)?;
    validate(&cli)?;

    let timeout = settings.request_timeout_secs.map(Duration::from_secs);
    let client = HttpAnalysisClient::new(&settings.server_url, timeout)?;

    if cli.health {
        let status = client.health()?;
        println!("{}: {status}", client.base_url());
        return Ok(());
    }

    let source_path = cli.source.as_deref().ok_or("A source is required")?;
    let mut camera = ImageFileCamera::new(source_path);
    let mut source = CaptureSource::new(settings.jpeg_quality);
    let constraints = StreamConstraints {
        width: settings.camera_width,
        height: settings.camera_height,
        facing: FacingMode::User,
    };
    source.start(&mut camera, &constraints)?;

    let surface = match &settings.font_path {
        Some(path) => RasterSurface::with_font(RasterSurface::load_font(path)?),
        None => {
            log::warn!("No font configured (see --font), overlay labels will not be drawn");
            RasterSurface::new()
        }
    };

    let mut session = AnnotationSession::new(
        source,
        Arc::new(client),
        Box::new(StderrNotifier),
        Box::new(SystemClock::new()),
        Duration::from_millis(settings.confirmation_ms),
    )
    .with_surface(surface);

    let wait = Duration::from_secs(settings.request_timeout_secs.unwrap_or(DEFAULT_WAIT_SECS) + 5);
    let mut failures = 0;

    for n in 1..=cli.captures {
        let image = session.capture()?;
        if let Some(raw) = &cli.raw_output {
            let path = numbered(raw, n, cli.captures);
            write_captured(&path, &image)?;
            log::info!("Raw capture written to {}", path.display());
        }

        for task in &cli.task {
            session.request(*task)?;
        }
        let events = session.run_until_settled(wait);
        failures += events
            .iter()
            .filter(|e| matches!(e, SessionEvent::Failed { .. }))
            .count();
        if session.any_in_flight() {
            return Err("Timed out waiting for the analysis server".into());
        }

        print_summary(n, session.summary());

        if let Some(output) = &cli.output {
            if session.summary().annotation_visible {
                let path = numbered(output, n, cli.captures);
                session.surface().save(&path)?;
                log::info!("Annotated output written to {}", path.display());
            }
        }
    }

    if failures > 0 {
        return Err(format!("{failures} analysis request(s) failed").into());
    }
    Ok(())
}

fn resolve_settings(cli: &Cli) -> Result<Settings, Box<dyn std::error::Error>> {
    let mut settings = Settings::load(cli.config.as_deref())?;
    if let Some(server) = &cli.server {
        settings.server_url = server.clone();
    }
    if let Some(q) = cli.jpeg_quality {
        settings.jpeg_quality = q;
    }
    if let Some(t) = cli.timeout {
        settings.request_timeout_secs = Some(t);
    }
    if let Some(font) = &cli.font {
        settings.font_path = Some(font.clone());
    }
    settings.validate()?;
    Ok(settings)
}

fn validate(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    if cli.health {
        return Ok(());
    }
    if let Some(source) = &cli.source {
        if !source.exists() {
            return Err(format!("Source not found: {}", source.display()).into());
        }
    }
    if cli.captures == 0 {
        return Err("--captures must be at least 1".into());
    }
    if cli.output.is_some() && !cli.task.contains(&AnalysisTask::Detection) {
        return Err("An output image needs the detection task".into());
    }
    Ok(())
}

fn print_summary(n: usize, summary: &ResultSummary) {
    println!("Capture {n}");
    println!("  Faces:           {}", summary.face_count);
    println!("  Confidence:      {}", summary.confidence);
    println!("  Processing time: {}", summary.processing_time);
    if !summary.emotion_badge.is_empty() {
        println!("  Emotion:         {}", summary.emotion_badge);
    }
}

/// `out.png` stays as is for a single capture; otherwise `out-<n>.png`.
fn numbered(path: &Path, n: usize, total: usize) -> PathBuf {
    if total <= 1 {
        return path.to_path_buf();
    }
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match path.extension() {
        Some(ext) => format!("{stem}-{n}.{}", ext.to_string_lossy()),
        None => format!("{stem}-{n}"),
    };
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numbered_single_capture_keeps_path() {
        assert_eq!(
            numbered(Path::new("out/result.png"), 1, 1),
            PathBuf::from("out/result.png")
        );
    }

    #[test]
    fn test_numbered_multiple_captures() {
        assert_eq!(
            numbered(Path::new("out/result.png"), 3, 5),
            PathBuf::from("out/result-3.png")
        );
        assert_eq!(numbered(Path::new("frame"), 2, 2), PathBuf::from("frame-2"));
    }

    #[test]
    fn test_cli_parses_task_list() {
        let cli = Cli::parse_from(["facelens", "in.jpg", "--task", "emotion"]);
        assert_eq!(cli.task, vec![AnalysisTask::Emotion]);
        let cli = Cli::parse_from(["facelens", "in.jpg"]);
        assert_eq!(cli.task, AnalysisTask::ALL.to_vec());
    }

    #[test]
    fn test_font_help_says_labels_need_it() {
        use clap::CommandFactory;

        let help = Cli::command().render_long_help().to_string();
        assert!(help.contains("Without one, the annotated"));
        assert!(help.contains("No faces detected"));

        let cli = Cli::parse_from(["facelens", "in.jpg", "--font", "DejaVuSans.ttf"]);
        assert_eq!(cli.font, Some(PathBuf::from("DejaVuSans.ttf")));
    }

    #[test]
    fn test_health_needs_no_source() {
        let cli = Cli::parse_from(["facelens", "--health"]);
        assert!(cli.health);
        assert!(cli.source.is_none());
        assert!(validate(&cli).is_ok());
        assert!(Cli::try_parse_from(["facelens"]).is_err());
    }

    #[test]
    fn test_validate_requires_detection_for_output() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("frame.png");
        std::fs::write(&source, b"x").unwrap();
        let source = source.to_str().unwrap();

        let cli = Cli::parse_from(["facelens", source, "out.png", "--task", "emotion"]);
        assert!(validate(&cli).is_err());
        let cli = Cli::parse_from(["facelens", source, "out.png"]);
        assert!(validate(&cli).is_ok());
    }
}
