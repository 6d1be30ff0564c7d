use crate::error::{EnhanceError, Result};
use std::time::Duration;

/// Parses a `data-counter` value. Only non-negative integers are accepted.
pub fn parse_counter_target(raw: &str) -> Result<u64> {
    raw.trim()
        .parse::<u64>()
        .map_err(|_| EnhanceError::InvalidCounterTarget {
            raw: raw.to_string(),
        })
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CounterFrame {
    pub display: u64,
    pub done: bool,
}

/// Linear ramp from zero to `target` over `duration`, one step per tick.
#[derive(Clone, Debug, PartialEq)]
pub struct CounterAnimation {
    target: u64,
    step: f64,
    current: f64,
}

impl CounterAnimation {
    pub fn new(target: u64, duration: Duration, tick: Duration) -> Self {
        let tick_ms = tick.as_secs_f64() * 1000.0;
        let ticks = if tick_ms > 0.0 {
            (duration.as_secs_f64() * 1000.0) / tick_ms
        } else {
            0.0
        };
        // A zero-length ramp jumps straight to the target on the first tick.
        let step = if ticks >= 1.0 {
            target as f64 / ticks
        } else {
            target as f64
        };
        Self {
            target,
            step,
            current: 0.0,
        }
    }

    pub fn tick(&mut self) -> CounterFrame {
        self.current += self.step;
        if self.current >= self.target as f64 {
            return CounterFrame {
                display: self.target,
                done: true,
            };
        }
        CounterFrame {
            display: self.current.floor() as u64,
            done: false,
        }
    }
}

/// Style mutations for one progress bar: reset to zero, then after the delay
/// transition back to the width captured at page load.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProgressPlan {
    pub target_width: String,
    pub delay: Duration,
    pub transition: String,
}

impl ProgressPlan {
    pub const START_WIDTH: &'static str = "0%";

    pub fn new(target_width: impl Into<String>, delay: Duration, transition: Duration) -> Self {
        Self {
            target_width: target_width.into(),
            delay,
            transition: format!("width {}ms ease-in-out", transition.as_millis()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(target: u64) -> Vec<u64> {
        let mut counter =
            CounterAnimation::new(target, Duration::from_millis(1000), Duration::from_millis(16));
        let mut frames = Vec::new();
        for _ in 0..10_000 {
            let frame = counter.tick();
            frames.push(frame.display);
            if frame.done {
                return frames;
            }
        }
        panic!("counter for {target} never finished");
    }

    #[test]
    fn counter_terminates_at_exact_target() {
        for target in [0, 1, 7, 62, 63, 100, 1234, 1_000_000] {
            let frames = run(target);
            assert_eq!(*frames.last().unwrap(), target);
            assert!(frames.windows(2).all(|w| w[0] <= w[1]), "{target}: {frames:?}");
            assert!(frames.len() <= 64, "{target} took {} ticks", frames.len());
        }
    }

    #[test]
    fn zero_target_finishes_on_first_tick() {
        assert_eq!(run(0), vec![0]);
    }

    #[test]
    fn zero_duration_jumps_to_target() {
        let mut counter = CounterAnimation::new(50, Duration::ZERO, Duration::from_millis(16));
        assert_eq!(counter.tick(), CounterFrame { display: 50, done: true });
    }

    #[test]
    fn rejects_negative_and_non_numeric_targets() {
        assert_eq!(parse_counter_target(" 42 ").unwrap(), 42);
        for raw in ["-3", "abc", "", "4.5", "12px"] {
            assert!(matches!(
                parse_counter_target(raw),
                Err(EnhanceError::InvalidCounterTarget { .. })
            ));
        }
    }

    #[test]
    fn progress_plan_formats_transition() {
        let plan = ProgressPlan::new("75%", Duration::from_millis(300), Duration::from_millis(1000));
        assert_eq!(plan.transition, "width 1000ms ease-in-out");
        assert_eq!(plan.target_width, "75%");
        assert_eq!(ProgressPlan::START_WIDTH, "0%");
    }
}
