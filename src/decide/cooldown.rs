//! Per-target click timestamps.

use crate::util::{EdgeClickError, EdgeClickResult};
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Last successful click per target.
///
/// Created with every known target set to "never clicked"; names outside
/// that set are rejected rather than silently added.
#[derive(Clone, Debug, Default)]
pub struct CooldownState {
    last_click: HashMap<String, Option<Instant>>,
}

impl CooldownState {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            last_click: names.into_iter().map(|n| (n.into(), None)).collect(),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.last_click.contains_key(name)
    }

    /// When `name` was last clicked, `None` if never.
    pub fn last_click(&self, name: &str) -> EdgeClickResult<Option<Instant>> {
        self.last_click
            .get(name)
            .copied()
            .ok_or_else(|| EdgeClickError::UnknownTarget(name.to_string()))
    }

    /// Time left before `name` may be clicked again, `None` if it may be
    /// clicked now.
    pub fn remaining(
        &self,
        name: &str,
        now: Instant,
        cooldown: Duration,
    ) -> EdgeClickResult<Option<Duration>> {
        let Some(last) = self.last_click(name)? else {
            return Ok(None);
        };
        let elapsed = now.saturating_duration_since(last);
        if elapsed < cooldown {
            Ok(Some(cooldown - elapsed))
        } else {
            Ok(None)
        }
    }

    pub fn record(&mut self, name: &str, now: Instant) -> EdgeClickResult<()> {
        let slot = self
            .last_click
            .get_mut(name)
            .ok_or_else(|| EdgeClickError::UnknownTarget(name.to_string()))?;
        *slot = Some(now);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::CooldownState;
    use crate::EdgeClickError;
    use std::time::{Duration, Instant};

    #[test]
    fn starts_never_clicked() {
        let state = CooldownState::new(["OK", "I AM AVAILABLE"]);
        assert_eq!(state.last_click("OK").unwrap(), None);
        let now = Instant::now();
        assert_eq!(
            state.remaining("OK", now, Duration::from_secs(15)).unwrap(),
            None
        );
    }

    #[test]
    fn remaining_counts_down_and_expires() {
        let mut state = CooldownState::new(["OK"]);
        let t0 = Instant::now();
        state.record("OK", t0).unwrap();
        let cooldown = Duration::from_secs(15);

        assert_eq!(
            state.remaining("OK", t0, cooldown).unwrap(),
            Some(cooldown)
        );
        assert_eq!(
            state
                .remaining("OK", t0 + Duration::from_secs(10), cooldown)
                .unwrap(),
            Some(Duration::from_secs(5))
        );
        assert_eq!(
            state
                .remaining("OK", t0 + Duration::from_secs(15), cooldown)
                .unwrap(),
            None
        );
    }

    #[test]
    fn unknown_targets_are_rejected() {
        let mut state = CooldownState::new(["OK"]);
        assert_eq!(
            state.record("Cancel", Instant::now()).unwrap_err(),
            EdgeClickError::UnknownTarget("Cancel".to_string())
        );
        assert!(state.last_click("Cancel").is_err());
    }
}
