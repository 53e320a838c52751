use chrono::{DateTime, Duration, Utc};
use log::{debug, info};

use crate::preferences::{DurationSet, ModeKey};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerStatus {
    Idle,
    Running,
    Paused,
    Completed,
}

impl TimerStatus {
    /// Label for the start/pause/restart control.
    pub fn label(&self) -> &'static str {
        match self {
            TimerStatus::Idle | TimerStatus::Paused => "Start",
            TimerStatus::Running => "Pause",
            TimerStatus::Completed => "Restart",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TimerState {
    pub mode: ModeKey,
    pub status: TimerStatus,
    pub remaining_seconds: u32,
    /// Only set while running.
    pub end_timestamp: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderEvent {
    pub remaining_seconds: u32,
    pub progress_fraction: f32,
    /// Jump straight to the new offset instead of animating.
    pub snap: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TimerEvent {
    Render(RenderEvent),
    Completed { mode: ModeKey },
}

/// The single registered periodic tick source.
#[derive(Debug, Clone, Copy)]
struct Ticker {
    period: Duration,
    next_due: DateTime<Utc>,
}

pub struct TimerEngine {
    state: TimerState,
    durations: DurationSet,
    tick_period: Duration,
    ticker: Option<Ticker>,
    events: Vec<TimerEvent>,
}

impl TimerEngine {
    pub fn new(durations: DurationSet, mode: ModeKey, tick_period: Duration) -> Self {
        let mut engine = Self {
            state: TimerState {
                mode,
                status: TimerStatus::Idle,
                remaining_seconds: 0,
                end_timestamp: None,
            },
            durations: durations.clone(),
            tick_period,
            ticker: None,
            events: Vec::new(),
        };
        engine.reset(durations, mode);
        engine
    }

    #[cfg(test)]
    pub fn state(&self) -> &TimerState {
        &self.state
    }

    pub fn status(&self) -> TimerStatus {
        self.state.status
    }

    pub fn status_label(&self) -> &'static str {
        self.state.status.label()
    }

    #[cfg(test)]
    pub fn has_pending_tick(&self) -> bool {
        self.ticker.is_some()
    }

    pub fn reset(&mut self, durations: DurationSet, mode: ModeKey) {
        self.ticker = None;
        self.durations = durations;
        self.state = TimerState {
            mode,
            status: TimerStatus::Idle,
            remaining_seconds: self.durations[mode],
            end_timestamp: None,
        };
        debug!("Timer reset to {} ({}s)", mode, self.state.remaining_seconds);
        self.events.push(TimerEvent::Render(RenderEvent {
            remaining_seconds: self.state.remaining_seconds,
            progress_fraction: 0.0,
            snap: true,
        }));
    }

    pub fn start(&mut self, now: DateTime<Utc>) {
        match self.state.status {
            TimerStatus::Running => return,
            TimerStatus::Completed => {
                let durations = self.durations.clone();
                self.reset(durations, self.state.mode);
            }
            TimerStatus::Idle | TimerStatus::Paused => {}
        }

        self.state.end_timestamp =
            Some(now + Duration::seconds(i64::from(self.state.remaining_seconds)));
        self.state.status = TimerStatus::Running;
        self.ticker = Some(Ticker {
            period: self.tick_period,
            next_due: now + self.tick_period,
        });
        info!("Timer started: {} with {}s left", self.state.mode, self.state.remaining_seconds);
    }

    /// Freezes the countdown at the last ticked value, which is the value
    /// on screen.
    pub fn pause(&mut self) {
        if self.state.status != TimerStatus::Running {
            return;
        }
        self.ticker = None;
        self.state.status = TimerStatus::Paused;
        self.state.end_timestamp = None;
        info!(
            "Timer paused: {} with {}s left",
            self.state.mode, self.state.remaining_seconds
        );
    }

    /// Start/pause/restart control.
    pub fn toggle(&mut self, now: DateTime<Utc>) {
        if self.state.status == TimerStatus::Running {
            self.pause();
        } else {
            self.start(now);
        }
    }

    /// Recomputes the remaining time from the wall clock.
    pub fn tick(&mut self, now: DateTime<Utc>) {
        if self.state.status != TimerStatus::Running {
            return;
        }
        let remaining = self.remaining_at(now);
        self.state.remaining_seconds = remaining;

        if remaining == 0 {
            self.ticker = None;
            self.state.status = TimerStatus::Completed;
            self.state.end_timestamp = None;
            info!("Time's up! {} finished", self.state.mode);
            self.events.push(TimerEvent::Completed { mode: self.state.mode });
        }

        debug!("Tick: {}s left", remaining);
        self.events.push(TimerEvent::Render(RenderEvent {
            remaining_seconds: remaining,
            progress_fraction: self.progress_fraction(),
            snap: false,
        }));
    }

    /// Fires the registered tick once if it is due. Missed periods collapse
    /// into a single tick.
    pub fn poll(&mut self, now: DateTime<Utc>) -> bool {
        let Some(ticker) = self.ticker.as_mut() else {
            return false;
        };
        if now < ticker.next_due {
            return false;
        }
        ticker.next_due = now + ticker.period;
        self.tick(now);
        true
    }

    /// Time until the registered tick is due, if one is registered.
    pub fn next_tick_in(&self, now: DateTime<Utc>) -> Option<Duration> {
        self.ticker
            .map(|ticker| (ticker.next_due - now).max(Duration::zero()))
    }

    pub fn progress_fraction(&self) -> f32 {
        let total = self.durations[self.state.mode];
        if total == 0 {
            return 1.0;
        }
        (1.0 - self.state.remaining_seconds as f32 / total as f32).clamp(0.0, 1.0)
    }

    pub fn take_events(&mut self) -> Vec<TimerEvent> {
        std::mem::take(&mut self.events)
    }

    fn remaining_at(&self, now: DateTime<Utc>) -> u32 {
        let Some(end) = self.state.end_timestamp else {
            return self.state.remaining_seconds;
        };
        let millis = (end - now).num_milliseconds();
        if millis <= 0 {
            return 0;
        }
        (millis as f64 / 1000.0).round() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()
    }

    fn engine() -> TimerEngine {
        TimerEngine::new(DurationSet::defaults(), ModeKey::Pomodoro, Duration::seconds(1))
    }

    fn renders(events: &[TimerEvent]) -> Vec<RenderEvent> {
        events
            .iter()
            .filter_map(|event| match event {
                TimerEvent::Render(render) => Some(*render),
                TimerEvent::Completed { .. } => None,
            })
            .collect()
    }

    #[test]
    fn test_reset_every_mode() {
        let mut timer = engine();
        let durations = DurationSet::defaults();
        for mode in ModeKey::ALL {
            timer.reset(durations.clone(), mode);
            assert_eq!(timer.state().remaining_seconds, durations[mode]);
            assert_eq!(timer.status(), TimerStatus::Idle);
            assert_eq!(timer.state().end_timestamp, None);
            assert_eq!(timer.progress_fraction(), 0.0);

            let events = timer.take_events();
            assert_eq!(
                events.last(),
                Some(&TimerEvent::Render(RenderEvent {
                    remaining_seconds: durations[mode],
                    progress_fraction: 0.0,
                    snap: true,
                }))
            );
        }
    }

    #[test]
    fn test_start_sets_end_and_registers_tick() {
        let mut timer = engine();
        timer.start(t0());
        assert_eq!(timer.status(), TimerStatus::Running);
        assert_eq!(timer.state().end_timestamp, Some(t0() + Duration::seconds(1500)));
        assert!(timer.has_pending_tick());
        assert_eq!(timer.status_label(), "Pause");
    }

    #[test]
    fn test_start_while_running_is_noop() {
        let mut timer = engine();
        timer.start(t0());
        timer.start(t0() + Duration::seconds(10));
        assert_eq!(timer.state().end_timestamp, Some(t0() + Duration::seconds(1500)));
    }

    #[test]
    fn test_start_then_pause_keeps_remaining() {
        let mut timer = engine();
        timer.start(t0());
        timer.pause();

        assert_eq!(timer.status(), TimerStatus::Paused);
        assert!(!timer.has_pending_tick());
        assert_eq!(timer.state().end_timestamp, None);
        assert_eq!(timer.state().remaining_seconds, 1500);
        assert_eq!(timer.status_label(), "Start");
    }

    #[test]
    fn test_pause_between_ticks_keeps_last_tick_value() {
        let mut timer = engine();
        timer.start(t0());
        timer.tick(t0() + Duration::seconds(1));
        timer.take_events();

        // Wall clock would round to 1498 here; the ticked 1499 is kept.
        timer.toggle(t0() + Duration::milliseconds(1600));
        assert_eq!(timer.status(), TimerStatus::Paused);
        assert_eq!(timer.state().remaining_seconds, 1499);
        assert!(timer.take_events().is_empty());

        timer.start(t0() + Duration::seconds(10));
        timer.tick(t0() + Duration::seconds(11));
        assert_eq!(timer.state().remaining_seconds, 1498);
    }

    #[test]
    fn test_pause_never_completes() {
        let mut timer = engine();
        timer.start(t0());
        timer.tick(t0() + Duration::seconds(1499));
        timer.take_events();

        timer.pause();
        assert_eq!(timer.status(), TimerStatus::Paused);
        assert_eq!(timer.state().remaining_seconds, 1);
        assert!(timer.take_events().is_empty());
    }

    #[test]
    fn test_resume_after_pause() {
        let mut timer = engine();
        timer.start(t0());
        timer.tick(t0() + Duration::seconds(100));
        timer.pause();
        assert_eq!(timer.state().remaining_seconds, 1400);

        // Paused time does not count.
        let resumed = t0() + Duration::seconds(500);
        timer.start(resumed);
        timer.tick(resumed + Duration::seconds(10));
        assert_eq!(timer.state().remaining_seconds, 1390);
    }

    #[test]
    fn test_pause_only_from_running() {
        let mut timer = engine();
        timer.pause();
        assert_eq!(timer.status(), TimerStatus::Idle);
    }

    #[test]
    fn test_tick_uses_wall_clock() {
        let mut timer = engine();
        timer.start(t0());
        timer.take_events();

        // A single late tick still lands on the right value.
        timer.tick(t0() + Duration::seconds(600));
        assert_eq!(timer.state().remaining_seconds, 900);

        let events = renders(&timer.take_events());
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].remaining_seconds, 900);
        assert!((events[0].progress_fraction - 0.4).abs() < 1e-6);
        assert!(!events[0].snap);
    }

    #[test]
    fn test_tick_rounds_to_nearest_second() {
        let mut timer = engine();
        timer.start(t0());
        timer.tick(t0() + Duration::milliseconds(1400));
        assert_eq!(timer.state().remaining_seconds, 1499);
        timer.tick(t0() + Duration::milliseconds(2600));
        assert_eq!(timer.state().remaining_seconds, 1497);
    }

    #[test]
    fn test_completion_fires_once_and_never_negative() {
        let mut timer = engine();
        timer.start(t0());
        timer.take_events();

        timer.tick(t0() + Duration::seconds(2000));
        assert_eq!(timer.state().remaining_seconds, 0);
        assert_eq!(timer.status(), TimerStatus::Completed);
        assert!(!timer.has_pending_tick());

        let events = timer.take_events();
        let completions = events
            .iter()
            .filter(|event| matches!(event, TimerEvent::Completed { .. }))
            .count();
        assert_eq!(completions, 1);
        assert_eq!(renders(&events)[0].progress_fraction, 1.0);

        timer.tick(t0() + Duration::seconds(2001));
        assert!(!timer.poll(t0() + Duration::seconds(2002)));
        assert!(timer.take_events().is_empty());
        assert_eq!(timer.status_label(), "Restart");
    }

    #[test]
    fn test_restart_after_completion() {
        let mut timer = engine();
        timer.start(t0());
        let done = t0() + Duration::seconds(1500);
        timer.tick(done);
        assert_eq!(timer.status(), TimerStatus::Completed);

        timer.toggle(done);
        assert_eq!(timer.status(), TimerStatus::Running);
        assert_eq!(timer.state().remaining_seconds, 1500);
        assert_eq!(timer.state().end_timestamp, Some(done + Duration::seconds(1500)));
    }

    #[test]
    fn test_poll_fires_when_due_and_rearms() {
        let mut timer = engine();
        timer.start(t0());
        assert!(!timer.poll(t0() + Duration::milliseconds(500)));
        assert_eq!(timer.next_tick_in(t0() + Duration::milliseconds(500)), Some(Duration::milliseconds(500)));

        assert!(timer.poll(t0() + Duration::seconds(1)));
        assert_eq!(timer.state().remaining_seconds, 1499);

        // Throttled delivery: one tick, correct value.
        assert!(timer.poll(t0() + Duration::seconds(30)));
        assert_eq!(timer.state().remaining_seconds, 1470);
        assert_eq!(timer.next_tick_in(t0() + Duration::seconds(30)), Some(Duration::seconds(1)));
    }

    #[test]
    fn test_reset_cancels_pending_tick() {
        let mut timer = engine();
        timer.start(t0());
        timer.reset(DurationSet::defaults(), ModeKey::Short);
        assert!(!timer.has_pending_tick());
        assert!(!timer.poll(t0() + Duration::seconds(5)));
        assert_eq!(timer.state().remaining_seconds, 300);
        assert_eq!(timer.state().mode, ModeKey::Short);
    }

    #[test]
    fn test_toggle_cycles_start_pause() {
        let mut timer = engine();
        timer.toggle(t0());
        assert_eq!(timer.status(), TimerStatus::Running);
        timer.tick(t0() + Duration::seconds(3));
        timer.toggle(t0() + Duration::seconds(3));
        assert_eq!(timer.status(), TimerStatus::Paused);
        assert_eq!(timer.state().remaining_seconds, 1497);
        timer.toggle(t0() + Duration::seconds(4));
        assert_eq!(timer.status(), TimerStatus::Running);
    }
}
