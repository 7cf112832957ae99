//! Thumbnail demo application
//!
//! Renders a handful of procedural models through the offscreen pipeline and
//! writes one PNG per view plus a contact sheet per model.
//!
//! ```text
//! thumbnails [config.toml|config.ron] [output-dir]
//! ```

mod shapes;

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use offscreen_engine::config::{Config, ConfigError};
use offscreen_engine::core::config::PipelineConfig;
use offscreen_engine::engine::RenderLoop;
use offscreen_engine::foundation::logging;
use offscreen_engine::pipeline::{PipelineHandle, RenderRequest};
use offscreen_engine::preview::compose_grid;
use offscreen_engine::render::{RenderError, RenderedFrame, SoftwareBackend};
use offscreen_engine::viewpoint::{golden_spiral_views, ViewpointStrategy};
use thiserror::Error;

/// Time allowed for all frames to arrive
const RENDER_TIMEOUT: Duration = Duration::from_secs(120);

/// Views on the turntable sheet
const TURNTABLE_VIEWS: usize = 8;

/// Application-level errors
#[derive(Error, Debug)]
enum AppError {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Timed out before any frame arrived ({expected} models submitted)")]
    Timeout { expected: usize },
}

fn load_config(path: Option<&Path>) -> Result<PipelineConfig, AppError> {
    let config = match path {
        Some(path) => PipelineConfig::load_from_file(path)?,
        None => PipelineConfig::with_strategy(ViewpointStrategy::MultiViewMixed),
    };
    config.validate().map_err(AppError::InvalidConfig)?;
    Ok(config)
}

/// Tracks which submitted models have all their frames in.
///
/// Frames arrive grouped in submission order, so a model is finished once its
/// last view arrives or a frame of a later model shows up. Skipped views are
/// never waited for.
struct Progress<'a> {
    submitted: &'a [String],
    finished: HashSet<usize>,
}

impl<'a> Progress<'a> {
    fn new(submitted: &'a [String]) -> Self {
        Self {
            submitted,
            finished: HashSet::new(),
        }
    }

    fn record(&mut self, frame: &RenderedFrame) {
        if let Some(position) = self.submitted.iter().position(|id| *id == frame.model_id) {
            self.finished.extend(0..position);
            if frame.is_last_view() {
                self.finished.insert(position);
            }
        }
    }

    fn finished(&self) -> usize {
        self.finished.len()
    }

    fn is_complete(&self) -> bool {
        self.finished.len() == self.submitted.len()
    }
}

/// Poll frames until every submitted model is finished.
///
/// On timeout the frames received so far are kept.
fn collect_frames(
    handle: &PipelineHandle,
    submitted: &[String],
) -> Result<Vec<RenderedFrame>, AppError> {
    let deadline = Instant::now() + RENDER_TIMEOUT;
    let mut frames = Vec::new();
    let mut progress = Progress::new(submitted);

    while !progress.is_complete() {
        match handle.retrieve()? {
            Some(frame) => {
                log::debug!(
                    "Received view {}/{} of '{}'",
                    frame.view_index + 1,
                    frame.view_count,
                    frame.model_id
                );
                progress.record(&frame);
                frames.push(frame);
            }
            None if Instant::now() > deadline => {
                if frames.is_empty() {
                    return Err(AppError::Timeout {
                        expected: submitted.len(),
                    });
                }
                log::warn!(
                    "Timed out with {} of {} models finished, keeping {} frames",
                    progress.finished(),
                    submitted.len(),
                    frames.len()
                );
                break;
            }
            None => std::thread::sleep(Duration::from_millis(5)),
        }
    }
    Ok(frames)
}

fn write_outputs(frames: &[RenderedFrame], output: &Path) -> Result<(), AppError> {
    let mut by_model: BTreeMap<&str, Vec<&RenderedFrame>> = BTreeMap::new();
    for frame in frames {
        by_model.entry(frame.model_id.as_str()).or_default().push(frame);
    }

    for (model_id, group) in by_model {
        for frame in &group {
            let path = output.join(format!("{}_{:02}.png", model_id, frame.view_index));
            frame.image.save(&path)?;
        }

        if group.len() > 1 {
            let images: Vec<_> = group.iter().map(|f| &f.image).collect();
            let columns = (group.len() as f64).sqrt().ceil() as u32;
            let sheet = compose_grid(&images, columns)?;
            sheet.save(output.join(format!("{}_sheet.png", model_id)))?;
        }
        log::info!("Wrote {} views of '{}'", group.len(), model_id);
    }
    Ok(())
}

fn run() -> Result<(), AppError> {
    let mut args = std::env::args().skip(1);
    let config_path = args.next().map(PathBuf::from);
    let output = args.next().map_or_else(|| PathBuf::from("thumbnails"), PathBuf::from);

    let config = load_config(config_path.as_deref())?;
    logging::init_with_filter(&config.engine.log_level);
    log::info!(
        "Rendering with strategy {:?} at {}x{}",
        config.viewpoint.strategy,
        config.window.width,
        config.window.height
    );

    std::fs::create_dir_all(&output)?;

    let zoom = config.viewpoint.zoom;
    let render_loop = RenderLoop::spawn(config, |config| SoftwareBackend::new(&config.window))?;
    let handle = render_loop.handle();

    let mut submitted = Vec::new();
    for model in shapes::catalog() {
        submitted.push(model.id.clone());
        handle.submit(model)?;
    }

    let turntable = RenderRequest::new(shapes::pyramid("pyramid_turntable"))
        .with_views(golden_spiral_views(TURNTABLE_VIEWS, zoom));
    submitted.push(turntable.model_id().to_string());
    handle.submit_request(turntable)?;

    let frames = collect_frames(&handle, &submitted);
    render_loop.shutdown()?;
    let frames = frames?;

    write_outputs(&frames, &output)?;
    log::info!("{} thumbnails written to {}", frames.len(), output.display());
    Ok(())
}

fn main() {
    if let Err(error) = run() {
        logging::init();
        log::error!("Thumbnail run failed: {}", error);
        eprintln!("error: {}", error);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbaImage;
    use offscreen_engine::viewpoint::ViewVector;

    fn frame(model_id: &str, view_index: usize, view_count: usize) -> RenderedFrame {
        RenderedFrame {
            model_id: model_id.to_string(),
            view: ViewVector::front(1.0),
            view_index,
            view_count,
            image: RgbaImage::new(1, 1),
        }
    }

    fn ids(names: &[&str]) -> Vec<String> {
        names.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_last_view_finishes_model() {
        let submitted = ids(&["a"]);
        let mut progress = Progress::new(&submitted);

        progress.record(&frame("a", 0, 2));
        assert!(!progress.is_complete());
        progress.record(&frame("a", 1, 2));
        assert!(progress.is_complete());
    }

    #[test]
    fn test_later_model_finishes_earlier_ones_with_skipped_views() {
        let submitted = ids(&["a", "b", "c"]);
        let mut progress = Progress::new(&submitted);

        // Last view of "a" and the whole of "b" were skipped.
        progress.record(&frame("a", 0, 4));
        progress.record(&frame("c", 0, 1));

        assert_eq!(progress.finished(), 3);
        assert!(progress.is_complete());
    }

    #[test]
    fn test_unknown_model_is_ignored() {
        let submitted = ids(&["a"]);
        let mut progress = Progress::new(&submitted);

        progress.record(&frame("other", 0, 1));
        assert_eq!(progress.finished(), 0);
    }
}
