//! Timing primitives.
//!
//! The HUD runs on two clocks: simulation *tics*, which happen exactly
//! [`TICRATE`] times per second no matter how fast frames are drawn, and
//! rendered frames. [`TicClock`] converts wall time into tics to run;
//! [`FrameTimer`] paces and measures frames; [`SystemTimer`] breaks frame time
//! down by system for the render-stats widget.

use std::sync::Mutex;
use std::thread;
use std::time::Duration;
use std::time::Instant;

use chashmap::CHashMap;

/// Simulation tics per second.
pub const TICRATE: u32 = 35;

/// The most tics a single frame will catch up on.
///
/// A frame that arrives later than this drops the excess tics instead of
/// running them all back to back.
pub const MAX_CATCHUP: u32 = 8;

/// Converts wall time into a number of simulation tics to run.
pub struct TicClock {
  start: Instant,
  tics_run: u64,
  dropped: u64,
}

impl TicClock {
  /// Creates a new `TicClock` starting now.
  pub fn new() -> Self {
    Self {
      start: Instant::now(),
      tics_run: 0,
      dropped: 0,
    }
  }

  /// Returns the number of tics run so far.
  pub fn tics(&self) -> u64 {
    self.tics_run
  }

  /// Returns how many tics should be run this frame.
  ///
  /// The returned tics are considered run.
  pub fn tics_due(&mut self) -> u32 {
    self.advance_to(self.start.elapsed())
  }

  /// Like [`tics_due()`](Self::tics_due), for a clock that has been running
  /// for `elapsed`.
  pub fn advance_to(&mut self, elapsed: Duration) -> u32 {
    let target = elapsed.as_nanos() * TICRATE as u128 / 1_000_000_000;
    let target = (target as u64).saturating_sub(self.dropped);
    let due = target.saturating_sub(self.tics_run);
    let run = due.min(MAX_CATCHUP as u64);
    self.dropped += due - run;
    self.tics_run += run;
    run as u32
  }
}

impl Default for TicClock {
  fn default() -> Self {
    Self::new()
  }
}

/// Paces frames and measures the frame rate.
pub struct FrameTimer {
  frame_count: u64,
  last_frame: Instant,

  fps: f64,
  last_measurement: Instant,
  last_measurement_frame: u64,
}

impl FrameTimer {
  /// Creates a new `FrameTimer`.
  pub fn new() -> Self {
    Self {
      frame_count: 0,
      last_frame: Instant::now(),
      fps: 0.0,
      last_measurement: Instant::now(),
      last_measurement_frame: 0,
    }
  }

  /// Returns the frame rate, re-measured once per `interval`.
  ///
  /// Call this once per frame; between measurements it returns the cached
  /// value.
  pub fn measure_fps(&mut self, interval: Duration) -> f64 {
    let elapsed = self.last_measurement.elapsed();
    if elapsed < interval {
      return self.fps;
    }

    let frames = (self.frame_count - self.last_measurement_frame) as f64;
    self.fps = frames / elapsed.as_secs_f64();
    self.last_measurement = Instant::now();
    self.last_measurement_frame = self.frame_count;
    self.fps
  }

  /// Ends a frame, sleeping off whatever is left of a frame at `target_fps`.
  pub fn end_frame(&mut self, target_fps: u32) {
    let frame_time = Duration::from_secs(1) / target_fps.max(1);
    if let Some(left) = frame_time.checked_sub(self.last_frame.elapsed()) {
      thread::sleep(left);
    }
    self.last_frame = Instant::now();
    self.frame_count += 1;
  }
}

impl Default for FrameTimer {
  fn default() -> Self {
    Self::new()
  }
}

/// Measures the average time spent in each of several systems.
///
/// Systems are identified by a static tag such as `"hud::tick()"`.
pub struct SystemTimer {
  table: CHashMap<&'static str, Samples>,
  // Tags in first-seen order, so reports are stable.
  tags: Mutex<Vec<&'static str>>,
}

impl SystemTimer {
  /// Creates a new `SystemTimer`.
  pub fn new() -> Self {
    Self {
      table: CHashMap::new(),
      tags: Mutex::new(Vec::new()),
    }
  }

  /// Starts timing `system`; the sample is recorded when the returned guard
  /// is dropped.
  #[must_use]
  pub fn start(&self, system: &'static str) -> SystemTimerGuard<'_> {
    let tags = &self.tags;
    self.table.upsert(
      system,
      move || {
        tags
          .lock()
          .unwrap_or_else(|poison| poison.into_inner())
          .push(system);
        Samples::new()
      },
      |s| s.started = Instant::now(),
    );
    SystemTimerGuard(self, system)
  }

  /// Returns the average time of every system, re-measured once per
  /// `interval`, in first-seen order.
  pub fn averages(&self, interval: Duration) -> Vec<(&'static str, Duration)> {
    let now = Instant::now();
    let tags = self
      .tags
      .lock()
      .unwrap_or_else(|poison| poison.into_inner())
      .clone();
    tags
      .into_iter()
      .filter_map(|tag| {
        let mut samples = self.table.get_mut(tag)?;
        Some((tag, samples.average(interval, now)))
      })
      .collect()
  }
}

impl Default for SystemTimer {
  fn default() -> Self {
    Self::new()
  }
}

struct Samples {
  started: Instant,
  sum: Duration,
  count: u32,

  average: Duration,
  last_average: Instant,
}

impl Samples {
  fn new() -> Self {
    Self {
      started: Instant::now(),
      sum: Duration::default(),
      count: 0,
      average: Duration::default(),
      last_average: Instant::now(),
    }
  }

  fn average(&mut self, interval: Duration, now: Instant) -> Duration {
    if now - self.last_average < interval || self.count == 0 {
      return self.average;
    }

    self.average = self.sum / self.count;
    self.sum = Duration::default();
    self.count = 0;
    self.last_average = now;
    self.average
  }
}

/// A guard for a [`SystemTimer::start()`] call.
pub struct SystemTimerGuard<'a>(&'a SystemTimer, &'static str);

impl Drop for SystemTimerGuard<'_> {
  fn drop(&mut self) {
    if let Some(mut samples) = self.0.table.get_mut(self.1) {
      let elapsed = samples.started.elapsed();
      samples.sum += elapsed;
      samples.count += 1;
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn tics_follow_wall_time() {
    let mut clock = TicClock::new();
    assert_eq!(clock.advance_to(Duration::from_millis(10)), 0);
    assert_eq!(clock.advance_to(Duration::from_millis(100)), 3);
    assert_eq!(clock.advance_to(Duration::from_millis(100)), 0);
    assert_eq!(clock.advance_to(Duration::from_millis(143)), 2);
    assert_eq!(clock.tics(), 5);
  }

  #[test]
  fn catchup_is_capped() {
    let mut clock = TicClock::new();
    assert_eq!(clock.advance_to(Duration::from_secs(10)), MAX_CATCHUP);
    // The skipped tics are gone for good.
    assert_eq!(clock.advance_to(Duration::from_secs(10)), 0);
    assert_eq!(clock.advance_to(Duration::from_millis(10_029)), 1);
  }

  #[test]
  fn system_timer_averages_samples() {
    let timer = SystemTimer::new();
    drop(timer.start("a"));
    drop(timer.start("b"));
    drop(timer.start("a"));
    let tags: Vec<_> = timer
      .averages(Duration::default())
      .into_iter()
      .map(|(tag, _)| tag)
      .collect();
    assert_eq!(tags, vec!["a", "b"]);
    // Nothing new was sampled; the cached averages come back.
    assert_eq!(timer.averages(Duration::default()).len(), 2);
  }
}
