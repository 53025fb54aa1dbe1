//! Pointer control through `enigo`, guarded by the corner fail-safe.

use crate::runner::GuardedSink;
use edgeclick::{ClickPoint, ClickSink, EdgeClickError, EdgeClickResult};
use enigo::{Button, Coordinate, Direction, Enigo, Mouse, Settings};

pub struct EnigoSink {
    enigo: Enigo,
    failsafe: bool,
}

impl EnigoSink {
    pub fn new(failsafe: bool) -> EdgeClickResult<Self> {
        let enigo = Enigo::new(&Settings::default()).map_err(dispatch_error)?;
        Ok(Self { enigo, failsafe })
    }
}

impl GuardedSink for EnigoSink {
    /// Fails with `FailSafe` while the pointer sits in a corner of the main
    /// display.
    fn check_failsafe(&self) -> EdgeClickResult<()> {
        if !self.failsafe {
            return Ok(());
        }
        let position = self.enigo.location().map_err(dispatch_error)?;
        let display = self.enigo.main_display().map_err(dispatch_error)?;
        if in_corner(position, display) {
            return Err(EdgeClickError::FailSafe {
                x: position.0,
                y: position.1,
            });
        }
        Ok(())
    }
}

impl ClickSink for EnigoSink {
    fn click(&mut self, point: ClickPoint) -> EdgeClickResult<()> {
        self.check_failsafe()?;
        self.enigo
            .move_mouse(point.x, point.y, Coordinate::Abs)
            .map_err(dispatch_error)?;
        self.enigo
            .button(Button::Left, Direction::Click)
            .map_err(dispatch_error)
    }
}

fn dispatch_error(err: impl std::fmt::Display) -> EdgeClickError {
    EdgeClickError::Dispatch {
        reason: err.to_string(),
    }
}

/// True when `(x, y)` is on one of the four corner pixels of a
/// `width × height` display, or beyond it.
pub fn in_corner((x, y): (i32, i32), (width, height): (i32, i32)) -> bool {
    let at_x_edge = x <= 0 || x >= width - 1;
    let at_y_edge = y <= 0 || y >= height - 1;
    at_x_edge && at_y_edge
}
