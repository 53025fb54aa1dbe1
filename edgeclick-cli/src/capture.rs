//! Primary-monitor capture with optional persistence.

use crate::runner::ScreenSource;
use chrono::NaiveDateTime;
use edgeclick::image::io::load_dynamic_image;
use edgeclick::{EdgeClickError, EdgeClickResult};
use image::DynamicImage;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::info;
use xcap::Monitor;

pub struct ScreenCapture {
    save_dir: Option<PathBuf>,
}

impl ScreenCapture {
    /// Creates `save_dir` up front so the first cycle cannot fail on it.
    pub fn new(save_dir: Option<&Path>) -> io::Result<Self> {
        if let Some(dir) = save_dir {
            fs::create_dir_all(dir)?;
        }
        Ok(Self {
            save_dir: save_dir.map(Path::to_path_buf),
        })
    }
}

impl ScreenSource for ScreenCapture {
    /// Captures the primary monitor.
    ///
    /// With a save directory the capture is written as PNG and decoded back
    /// from disk, so what gets matched is exactly what was persisted.
    fn grab(&mut self) -> EdgeClickResult<DynamicImage> {
        let rgba = primary_monitor()?
            .capture_image()
            .map_err(|err| capture_error("capture", err))?;
        let Some(dir) = &self.save_dir else {
            return Ok(DynamicImage::ImageRgba8(rgba));
        };
        let path = dir.join(screenshot_file_name(&chrono::Local::now().naive_local()));
        rgba.save(&path)
            .map_err(|err| capture_error("save screenshot", err))?;
        info!(path = %path.display(), "Screenshot captured");
        load_dynamic_image(&path)
    }
}

fn primary_monitor() -> EdgeClickResult<Monitor> {
    let monitors = Monitor::all().map_err(|err| capture_error("enumerate monitors", err))?;
    let mut fallback = None;
    for monitor in monitors {
        if monitor.is_primary().unwrap_or(false) {
            return Ok(monitor);
        }
        fallback.get_or_insert(monitor);
    }
    fallback.ok_or_else(|| EdgeClickError::Capture {
        reason: "no monitor found".to_string(),
    })
}

fn capture_error(action: &str, err: impl std::fmt::Display) -> EdgeClickError {
    EdgeClickError::Capture {
        reason: format!("{action}: {err}"),
    }
}

pub fn screenshot_file_name(at: &NaiveDateTime) -> String {
    format!("screenshot_{}.png", at.format("%Y%m%d_%H%M%S"))
}

#[cfg(test)]
mod tests {
    use super::screenshot_file_name;
    use chrono::NaiveDate;

    #[test]
    fn file_name_is_zero_padded_timestamp() {
        let at = NaiveDate::from_ymd_opt(2024, 3, 5)
            .unwrap()
            .and_hms_opt(9, 7, 1)
            .unwrap();
        assert_eq!(screenshot_file_name(&at), "screenshot_20240305_090701.png");
    }
}
