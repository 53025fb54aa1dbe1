//! The polling loop: fail-safe check, capture, select, decide, sleep.

use edgeclick::{
    ClickDecision, ClickSink, CooldownState, Decision, EdgeClickError, EdgeClickResult,
    TargetSelector, TemplateStore,
};
use image::DynamicImage;
use std::io;
use std::ops::ControlFlow;
use std::time::{Duration, Instant};
use tokio::sync::oneshot;
use tracing::{error, info, warn};

/// Source of screen images, one per cycle.
pub trait ScreenSource {
    fn grab(&mut self) -> EdgeClickResult<DynamicImage>;
}

/// A click sink that can also veto the whole cycle.
pub trait GuardedSink: ClickSink {
    /// Returns `FailSafe` when the user asked the loop to stop.
    fn check_failsafe(&self) -> EdgeClickResult<()>;
}

pub struct ScreenMonitor<S, P> {
    store: TemplateStore,
    selector: TargetSelector,
    decision: ClickDecision,
    cooldowns: CooldownState,
    source: S,
    /// `None` in dry-run mode: decisions are logged but never dispatched.
    sink: Option<P>,
    interval: Duration,
}

impl<S: ScreenSource, P: GuardedSink> ScreenMonitor<S, P> {
    pub fn new(
        store: TemplateStore,
        selector: TargetSelector,
        decision: ClickDecision,
        source: S,
        sink: Option<P>,
        interval: Duration,
    ) -> Self {
        let cooldowns = CooldownState::new(store.names());
        Self {
            store,
            selector,
            decision,
            cooldowns,
            source,
            sink,
            interval,
        }
    }

    /// Runs cycles until the fail-safe trips or Ctrl-C arrives.
    ///
    /// The interrupt listener is installed before the first cycle; a Ctrl-C
    /// that lands mid-cycle ends the loop once that cycle finishes.
    pub async fn run(mut self) {
        let mut interrupt = Interrupt::listen().await;
        info!(
            interval_secs = self.interval.as_secs_f64(),
            dry_run = self.sink.is_none(),
            "Screen monitoring started"
        );
        loop {
            if self.step().is_break() {
                return;
            }
            if interrupt.sleep(self.interval).await.is_break() {
                info!("Screen monitoring stopped by user");
                return;
            }
        }
    }

    /// Runs one cycle and logs its outcome. Breaks only on the fail-safe.
    pub fn step(&mut self) -> ControlFlow<()> {
        match self.cycle() {
            Ok(decision) => {
                log_decision(&decision, self.sink.is_none());
                ControlFlow::Continue(())
            }
            Err(err) if err.is_abort() => {
                warn!(%err, "Fail-safe triggered, screen monitoring stopped");
                ControlFlow::Break(())
            }
            Err(err @ EdgeClickError::CaptureRead { .. }) => {
                warn!(%err, "Could not read screenshot, skipping cycle");
                ControlFlow::Continue(())
            }
            Err(err) => {
                error!(%err, "Unexpected error during cycle");
                ControlFlow::Continue(())
            }
        }
    }

    fn cycle(&mut self) -> EdgeClickResult<Decision> {
        if let Some(sink) = &self.sink {
            sink.check_failsafe()?;
        }
        let screen = self.source.grab()?;
        let selection = self.selector.select_best(&screen, &self.store)?;
        let now = Instant::now();
        match &mut self.sink {
            Some(sink) => self
                .decision
                .decide(&selection, &mut self.cooldowns, now, sink),
            None => self.decision.evaluate(&selection, &self.cooldowns, now),
        }
    }
}

/// Ctrl-C listener that outlives individual sleeps.
pub struct Interrupt {
    rx: oneshot::Receiver<io::Result<()>>,
    armed: bool,
}

impl Interrupt {
    /// Spawns the listener and yields once so it is registered on return.
    pub async fn listen() -> Self {
        let (tx, rx) = oneshot::channel();
        tokio::spawn(async move {
            let _ = tx.send(tokio::signal::ctrl_c().await);
        });
        tokio::task::yield_now().await;
        Self { rx, armed: true }
    }

    /// Sleeps for `interval`; breaks early when the interrupt fires.
    ///
    /// A listener that failed to install is logged once and ignored.
    pub async fn sleep(&mut self, interval: Duration) -> ControlFlow<()> {
        let sleep = tokio::time::sleep(interval);
        tokio::pin!(sleep);
        loop {
            tokio::select! {
                received = &mut self.rx, if self.armed => match received {
                    Ok(Ok(())) => return ControlFlow::Break(()),
                    Ok(Err(err)) => {
                        error!(%err, "Cannot listen for Ctrl-C, continuing without it");
                        self.armed = false;
                    }
                    Err(_) => self.armed = false,
                },
                _ = &mut sleep => return ControlFlow::Continue(()),
            }
        }
    }
}

fn log_decision(decision: &Decision, dry_run: bool) {
    match decision {
        Decision::Click {
            name,
            confidence,
            point,
        } if dry_run => info!("Would click '{name}' at {point} [conf={confidence:.3}]"),
        Decision::Click {
            name,
            confidence,
            point,
        } => info!("Clicked '{name}' at {point} [conf={confidence:.3}]"),
        Decision::CooldownActive {
            name,
            confidence,
            remaining,
        } => info!(
            "Cooldown active for '{name}', {:.1}s remaining [conf={confidence:.3}]",
            remaining.as_secs_f64()
        ),
        Decision::NoButton { best_confidence } => {
            info!("No button found. Best confidence={best_confidence:.3}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{GuardedSink, Interrupt, ScreenMonitor, ScreenSource};
    use edgeclick::{
        ClickDecision, ClickPoint, ClickSink, EdgeClickError, EdgeClickResult, EdgeParams,
        MatchConfig, ScaleSweep, TargetSelector, TemplateStore,
    };
    use image::{DynamicImage, GrayImage, Luma};
    use std::collections::VecDeque;
    use std::ops::ControlFlow;
    use std::time::Duration;
    use tokio::sync::oneshot;

    fn button() -> GrayImage {
        GrayImage::from_fn(40, 20, |x, y| {
            let body = (6..34).contains(&x) && (6..14).contains(&y);
            Luma([if body { 40 } else { 230 }])
        })
    }

    fn screen_with_button() -> DynamicImage {
        let mut screen = GrayImage::from_pixel(160, 100, Luma([230]));
        for (x, y, px) in button().enumerate_pixels() {
            screen.put_pixel(50 + x, 30 + y, *px);
        }
        DynamicImage::ImageLuma8(screen)
    }

    fn blank_screen() -> DynamicImage {
        DynamicImage::ImageLuma8(GrayImage::from_pixel(160, 100, Luma([230])))
    }

    /// Hands out queued results, then blank screens.
    struct ScriptedSource(VecDeque<EdgeClickResult<DynamicImage>>);

    impl ScreenSource for ScriptedSource {
        fn grab(&mut self) -> EdgeClickResult<DynamicImage> {
            self.0.pop_front().unwrap_or_else(|| Ok(blank_screen()))
        }
    }

    #[derive(Default)]
    struct FakePointer {
        cornered: bool,
        click_error: Option<EdgeClickError>,
        clicks: Vec<ClickPoint>,
    }

    impl ClickSink for FakePointer {
        fn click(&mut self, point: ClickPoint) -> EdgeClickResult<()> {
            if let Some(err) = self.click_error.clone() {
                return Err(err);
            }
            self.clicks.push(point);
            Ok(())
        }
    }

    impl GuardedSink for FakePointer {
        fn check_failsafe(&self) -> EdgeClickResult<()> {
            if self.cornered {
                return Err(EdgeClickError::FailSafe { x: 0, y: 0 });
            }
            Ok(())
        }
    }

    fn build_monitor(
        frames: Vec<EdgeClickResult<DynamicImage>>,
        pointer: Option<FakePointer>,
    ) -> ScreenMonitor<ScriptedSource, FakePointer> {
        let store = TemplateStore::from_images(
            [("OK", DynamicImage::ImageLuma8(button()))],
            EdgeParams::default(),
        )
        .unwrap();
        let selector = TargetSelector::new(MatchConfig {
            sweep: ScaleSweep {
                min: 1.0,
                max: 1.0,
                steps: 1,
            },
            ..MatchConfig::default()
        });
        ScreenMonitor::new(
            store,
            selector,
            ClickDecision::default(),
            ScriptedSource(frames.into()),
            pointer,
            Duration::from_millis(1),
        )
    }

    fn clicks(monitor: &ScreenMonitor<ScriptedSource, FakePointer>) -> &[ClickPoint] {
        &monitor.sink.as_ref().unwrap().clicks
    }

    #[test]
    fn capture_read_failure_skips_the_cycle() {
        let frames = vec![
            Err(EdgeClickError::CaptureRead {
                reason: "truncated png".to_string(),
            }),
            Ok(screen_with_button()),
        ];
        let mut monitor = build_monitor(frames, Some(FakePointer::default()));
        assert_eq!(monitor.step(), ControlFlow::Continue(()));
        assert!(clicks(&monitor).is_empty());
        assert_eq!(monitor.step(), ControlFlow::Continue(()));
        assert_eq!(clicks(&monitor), &[ClickPoint { x: 70, y: 40 }]);
    }

    #[test]
    fn other_errors_are_logged_and_the_loop_continues() {
        let frames = vec![Err(EdgeClickError::Capture {
            reason: "no monitor found".to_string(),
        })];
        let mut monitor = build_monitor(frames, Some(FakePointer::default()));
        assert_eq!(monitor.step(), ControlFlow::Continue(()));

        let pointer = FakePointer {
            click_error: Some(EdgeClickError::Dispatch {
                reason: "device busy".to_string(),
            }),
            ..FakePointer::default()
        };
        let mut monitor = monitor_with_button(pointer);
        assert_eq!(monitor.step(), ControlFlow::Continue(()));
        // A failed dispatch does not start the cooldown.
        assert!(monitor.cooldowns.last_click("OK").unwrap().is_none());
    }

    fn monitor_with_button(pointer: FakePointer) -> ScreenMonitor<ScriptedSource, FakePointer> {
        build_monitor(vec![Ok(screen_with_button())], Some(pointer))
    }

    #[test]
    fn failsafe_before_the_cycle_stops_without_capturing() {
        let pointer = FakePointer {
            cornered: true,
            ..FakePointer::default()
        };
        let mut monitor = monitor_with_button(pointer);
        assert_eq!(monitor.step(), ControlFlow::Break(()));
        assert_eq!(monitor.source.0.len(), 1);
    }

    #[test]
    fn failsafe_from_the_sink_stops_the_loop() {
        let pointer = FakePointer {
            click_error: Some(EdgeClickError::FailSafe { x: 1919, y: 0 }),
            ..FakePointer::default()
        };
        let mut monitor = monitor_with_button(pointer);
        assert_eq!(monitor.step(), ControlFlow::Break(()));
    }

    #[test]
    fn dry_run_never_needs_a_pointer() {
        let mut monitor = build_monitor(vec![Ok(screen_with_button())], None);
        assert_eq!(monitor.step(), ControlFlow::Continue(()));
        assert!(monitor.cooldowns.last_click("OK").unwrap().is_none());
    }

    #[tokio::test]
    async fn interrupt_breaks_the_sleep() {
        let (tx, rx) = oneshot::channel();
        let mut interrupt = Interrupt { rx, armed: true };
        tx.send(Ok(())).unwrap();
        let flow = interrupt.sleep(Duration::from_secs(60)).await;
        assert_eq!(flow, ControlFlow::Break(()));
    }

    #[tokio::test]
    async fn failed_listener_falls_back_to_plain_sleeps() {
        let (tx, rx) = oneshot::channel();
        let mut interrupt = Interrupt { rx, armed: true };
        tx.send(Err(std::io::Error::other("no signal support"))).unwrap();
        let flow = interrupt.sleep(Duration::from_millis(5)).await;
        assert_eq!(flow, ControlFlow::Continue(()));
        assert!(!interrupt.armed);
        let flow = interrupt.sleep(Duration::from_millis(5)).await;
        assert_eq!(flow, ControlFlow::Continue(()));
    }
}
