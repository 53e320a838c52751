use chrono::{DateTime, Duration, Utc};
use log::{debug, info};

use crate::preferences::{
    parse_minutes, DurationSet, ModeKey, PerMode, PreferenceState, MAX_MINUTES, MIN_MINUTES,
};
use crate::storage::KeyValueStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelState {
    Closed,
    Open,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    ExplicitClose,
    OutsideClick,
    Escape,
    /// The commit already ran; nothing is reverted.
    Apply,
}

/// Where a pointer press landed, relative to the panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickTarget {
    InsidePanel,
    Trigger,
    Apply,
    Elsewhere,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepDirection {
    Up,
    Down,
}

/// An increment/decrement control currently held down.
#[derive(Debug, Clone, Copy)]
struct Hold {
    mode: ModeKey,
    direction: StepDirection,
    next_fire: DateTime<Utc>,
}

pub struct SettingsPanel {
    state: PanelState,
    drafts: PerMode<String>,
    hold: Option<Hold>,
    hold_period: Duration,
}

fn drafts_from(durations: &DurationSet) -> PerMode<String> {
    PerMode::from_fn(|mode| durations.minutes(mode).to_string())
}

impl SettingsPanel {
    pub fn new(confirmed: &DurationSet, hold_period: Duration) -> Self {
        Self {
            state: PanelState::Closed,
            drafts: drafts_from(confirmed),
            hold: None,
            hold_period,
        }
    }

    pub fn is_open(&self) -> bool {
        self.state == PanelState::Open
    }

    #[cfg(test)]
    pub fn drafts(&self) -> &PerMode<String> {
        &self.drafts
    }

    pub fn draft_mut(&mut self, mode: ModeKey) -> &mut String {
        &mut self.drafts[mode]
    }

    /// Opens the panel with the minute drafts seeded from the confirmed
    /// durations.
    pub fn open<S: KeyValueStore>(&mut self, prefs: &PreferenceState<S>) {
        if self.state == PanelState::Open {
            return;
        }
        self.drafts = drafts_from(&prefs.confirmed().durations);
        self.state = PanelState::Open;
        info!("Settings opened");
    }

    /// Closes the panel. Every reason except `Apply` discards the preview.
    /// Returns whether the panel was open.
    pub fn close<S: KeyValueStore>(
        &mut self,
        reason: CloseReason,
        prefs: &mut PreferenceState<S>,
    ) -> bool {
        if self.state == PanelState::Closed {
            return false;
        }
        if reason != CloseReason::Apply {
            prefs.revert();
            self.drafts = drafts_from(&prefs.confirmed().durations);
        }
        self.hold = None;
        self.state = PanelState::Closed;
        info!("Settings closed ({:?})", reason);
        true
    }

    /// Pointer press anywhere in the window. Presses on the trigger and the
    /// Apply control are left to those controls.
    pub fn pointer_down<S: KeyValueStore>(
        &mut self,
        target: ClickTarget,
        prefs: &mut PreferenceState<S>,
    ) -> bool {
        if self.state == PanelState::Open && target == ClickTarget::Elsewhere {
            return self.close(CloseReason::OutsideClick, prefs);
        }
        false
    }

    /// Commits the preview and the minute drafts, then closes.
    pub fn apply<S: KeyValueStore>(&mut self, prefs: &mut PreferenceState<S>) -> DurationSet {
        let durations = prefs.commit(&self.drafts);
        self.drafts = drafts_from(&durations);
        self.close(CloseReason::Apply, prefs);
        durations
    }

    pub fn step(&mut self, mode: ModeKey, direction: StepDirection) {
        let current = parse_minutes(&self.drafts[mode]).unwrap_or(MIN_MINUTES);
        let next = match direction {
            StepDirection::Up => (current + 1).min(MAX_MINUTES),
            StepDirection::Down => current.saturating_sub(1).max(MIN_MINUTES),
        };
        self.drafts[mode] = next.to_string();
    }

    /// Press on a stepper: steps once now, then repeats while held.
    pub fn press_step(&mut self, mode: ModeKey, direction: StepDirection, now: DateTime<Utc>) {
        self.step(mode, direction);
        self.hold = Some(Hold {
            mode,
            direction,
            next_fire: now + self.hold_period,
        });
        debug!("Hold started on {} {:?}", mode, direction);
    }

    /// Release, leave or pointer-out on a stepper.
    pub fn release_step(&mut self) {
        if self.hold.take().is_some() {
            debug!("Hold released");
        }
    }

    #[cfg(test)]
    pub fn is_holding(&self) -> bool {
        self.hold.is_some()
    }

    /// Applies every repeat that came due since the last poll.
    pub fn poll_hold(&mut self, now: DateTime<Utc>) -> usize {
        let Some(mut hold) = self.hold else {
            return 0;
        };
        let mut fired = 0;
        while hold.next_fire <= now {
            self.step(hold.mode, hold.direction);
            hold.next_fire = hold.next_fire + self.hold_period;
            fired += 1;
        }
        self.hold = Some(hold);
        fired
    }

    pub fn next_hold_in(&self, now: DateTime<Utc>) -> Option<Duration> {
        self.hold
            .map(|hold| (hold.next_fire - now).max(Duration::zero()))
    }
}
