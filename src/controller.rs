use chrono::{DateTime, Duration, Utc};
use log::info;

use crate::config::Config;
use crate::mode_selector::ModeSelector;
use crate::preferences::{ColorChoice, FontChoice, ModeKey, PreferenceState, Preferences};
use crate::progress::ProgressRing;
use crate::settings_panel::{ClickTarget, CloseReason, SettingsPanel, StepDirection};
use crate::storage::KeyValueStore;
use crate::timer::{TimerEngine, TimerEvent};

/// Owns all widget state and exposes the operations the UI triggers.
pub struct PomodoroController<S: KeyValueStore> {
    prefs: PreferenceState<S>,
    timer: TimerEngine,
    ring: ProgressRing,
    panel: SettingsPanel,
    modes: ModeSelector,
}

impl<S: KeyValueStore> PomodoroController<S> {
    pub fn new(store: S, config: &Config) -> Self {
        let prefs = PreferenceState::new(store);
        let durations = prefs.confirmed().durations.clone();
        let mode = ModeKey::Pomodoro;

        let mut controller = Self {
            timer: TimerEngine::new(
                durations.clone(),
                mode,
                Duration::milliseconds(config.tick_interval_ms),
            ),
            ring: ProgressRing::new(durations[mode]),
            panel: SettingsPanel::new(&durations, Duration::milliseconds(config.hold_repeat_ms)),
            modes: ModeSelector::new(mode),
            prefs,
        };
        controller.drain_timer_events();
        controller
    }

    #[cfg(test)]
    pub fn preferences(&self) -> &PreferenceState<S> {
        &self.prefs
    }

    pub fn timer(&self) -> &TimerEngine {
        &self.timer
    }

    pub fn ring(&self) -> &ProgressRing {
        &self.ring
    }

    pub fn ring_mut(&mut self) -> &mut ProgressRing {
        &mut self.ring
    }

    pub fn panel(&self) -> &SettingsPanel {
        &self.panel
    }

    pub fn panel_mut(&mut self) -> &mut SettingsPanel {
        &mut self.panel
    }

    pub fn modes(&self) -> &ModeSelector {
        &self.modes
    }

    pub fn modes_mut(&mut self) -> &mut ModeSelector {
        &mut self.modes
    }

    /// Live (preview) look of the widget.
    pub fn look(&self) -> &Preferences {
        self.prefs.preview()
    }

    pub fn accent(&self) -> ColorChoice {
        self.prefs.preview().color
    }

    #[cfg(test)]
    pub fn stroke_hex(&self) -> &'static str {
        self.accent().hex()
    }

    /// Runs due scheduler callbacks and feeds render events to the ring.
    pub fn frame(&mut self, now: DateTime<Utc>) {
        self.timer.poll(now);
        self.panel.poll_hold(now);
        self.drain_timer_events();
    }

    /// How long the frame loop may sleep before something is due.
    pub fn next_wake(&self, now: DateTime<Utc>) -> Option<Duration> {
        match (self.timer.next_tick_in(now), self.panel.next_hold_in(now)) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    pub fn toggle_timer(&mut self, now: DateTime<Utc>) {
        self.timer.toggle(now);
        self.drain_timer_events();
    }

    pub fn select_mode(&mut self, mode: ModeKey) {
        self.modes.select(mode);
        self.timer.reset(self.prefs.confirmed().durations.clone(), mode);
        self.drain_timer_events();
    }

    pub fn open_settings(&mut self) {
        self.panel.open(&self.prefs);
    }

    pub fn close_settings(&mut self, reason: CloseReason) {
        self.panel.close(reason, &mut self.prefs);
    }

    pub fn pointer_down(&mut self, target: ClickTarget) {
        self.panel.pointer_down(target, &mut self.prefs);
    }

    pub fn apply_settings(&mut self) {
        let durations = self.panel.apply(&mut self.prefs);
        self.timer.reset(durations, self.modes.active());
        self.drain_timer_events();
        info!("Settings applied, timer reset to {}", self.modes.active());
    }

    pub fn preview_font(&mut self, font: FontChoice) {
        self.prefs.set_preview_font(font);
    }

    pub fn preview_color(&mut self, color: ColorChoice) {
        self.prefs.set_preview_color(color);
    }

    pub fn press_step(&mut self, mode: ModeKey, direction: StepDirection, now: DateTime<Utc>) {
        self.panel.press_step(mode, direction, now);
    }

    pub fn release_step(&mut self) {
        self.panel.release_step();
    }

    fn drain_timer_events(&mut self) {
        for event in self.timer.take_events() {
            match event {
                TimerEvent::Render(render) => self.ring.apply(&render),
                TimerEvent::Completed { mode } => {
                    info!("Session complete: {}", mode.label());
                }
            }
        }
    }
}
