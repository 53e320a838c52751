use anyhow::{anyhow, Result};
use log::{debug, info, warn};
use std::fmt;
use std::ops::{Index, IndexMut};
use std::str::FromStr;

use crate::storage::KeyValueStore;

pub const KEY_FONT: &str = "selectedFont";
pub const KEY_COLOR: &str = "selectedColor";

/// Accepted range for a mode duration, in whole minutes.
pub const MIN_MINUTES: u32 = 1;
pub const MAX_MINUTES: u32 = 99;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModeKey {
    Pomodoro,
    Short,
    Long,
}

impl ModeKey {
    pub const ALL: [ModeKey; 3] = [ModeKey::Pomodoro, ModeKey::Short, ModeKey::Long];

    pub fn as_str(&self) -> &'static str {
        match self {
            ModeKey::Pomodoro => "pomodoro",
            ModeKey::Short => "short",
            ModeKey::Long => "long",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ModeKey::Pomodoro => "pomodoro",
            ModeKey::Short => "short break",
            ModeKey::Long => "long break",
        }
    }

    /// Name of the persisted minute count for this mode.
    pub fn storage_key(&self) -> &'static str {
        match self {
            ModeKey::Pomodoro => "pomodoroTime",
            ModeKey::Short => "shortTime",
            ModeKey::Long => "longTime",
        }
    }

    pub fn default_minutes(&self) -> u32 {
        match self {
            ModeKey::Pomodoro => 25,
            ModeKey::Short => 5,
            ModeKey::Long => 15,
        }
    }
}

impl fmt::Display for ModeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FontChoice {
    #[default]
    Kumbh,
    Roboto,
    Space,
}

impl FontChoice {
    pub const ALL: [FontChoice; 3] = [FontChoice::Kumbh, FontChoice::Roboto, FontChoice::Space];

    pub fn as_str(&self) -> &'static str {
        match self {
            FontChoice::Kumbh => "kumbh",
            FontChoice::Roboto => "roboto",
            FontChoice::Space => "space",
        }
    }
}

impl FromStr for FontChoice {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        FontChoice::ALL
            .into_iter()
            .find(|font| font.as_str() == s)
            .ok_or_else(|| anyhow!("unknown font '{}'", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ColorChoice {
    #[default]
    Red,
    Cyan,
    Purple,
}

impl ColorChoice {
    pub const ALL: [ColorChoice; 3] = [ColorChoice::Red, ColorChoice::Cyan, ColorChoice::Purple];

    pub fn as_str(&self) -> &'static str {
        match self {
            ColorChoice::Red => "red",
            ColorChoice::Cyan => "cyan",
            ColorChoice::Purple => "purple",
        }
    }

    pub fn hex(&self) -> &'static str {
        match self {
            ColorChoice::Red => "#F87070",
            ColorChoice::Cyan => "#70F3F8",
            ColorChoice::Purple => "#D881F8",
        }
    }

    pub fn rgb(&self) -> [u8; 3] {
        match self {
            ColorChoice::Red => [0xF8, 0x70, 0x70],
            ColorChoice::Cyan => [0x70, 0xF3, 0xF8],
            ColorChoice::Purple => [0xD8, 0x81, 0xF8],
        }
    }
}

impl FromStr for ColorChoice {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        ColorChoice::ALL
            .into_iter()
            .find(|color| color.as_str() == s)
            .ok_or_else(|| anyhow!("unknown color '{}'", s))
    }
}

/// One value per timer mode.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PerMode<T> {
    pub pomodoro: T,
    pub short: T,
    pub long: T,
}

impl<T> PerMode<T> {
    pub fn from_fn(mut f: impl FnMut(ModeKey) -> T) -> Self {
        Self {
            pomodoro: f(ModeKey::Pomodoro),
            short: f(ModeKey::Short),
            long: f(ModeKey::Long),
        }
    }
}

impl<T> Index<ModeKey> for PerMode<T> {
    type Output = T;

    fn index(&self, mode: ModeKey) -> &T {
        match mode {
            ModeKey::Pomodoro => &self.pomodoro,
            ModeKey::Short => &self.short,
            ModeKey::Long => &self.long,
        }
    }
}

impl<T> IndexMut<ModeKey> for PerMode<T> {
    fn index_mut(&mut self, mode: ModeKey) -> &mut T {
        match mode {
            ModeKey::Pomodoro => &mut self.pomodoro,
            ModeKey::Short => &mut self.short,
            ModeKey::Long => &mut self.long,
        }
    }
}

/// Mode durations in seconds. Every value stays within
/// `MIN_MINUTES * 60 ..= MAX_MINUTES * 60`.
pub type DurationSet = PerMode<u32>;

impl DurationSet {
    pub fn from_minutes(minutes: &PerMode<u32>) -> Self {
        PerMode::from_fn(|mode| clamp_minutes(i64::from(minutes[mode])) * 60)
    }

    pub fn minutes(&self, mode: ModeKey) -> u32 {
        self[mode] / 60
    }

    pub fn defaults() -> Self {
        PerMode::from_fn(|mode| mode.default_minutes() * 60)
    }
}

pub fn clamp_minutes(minutes: i64) -> u32 {
    minutes.clamp(i64::from(MIN_MINUTES), i64::from(MAX_MINUTES)) as u32
}

/// Parses a raw minute input. Returns `None` for non-numeric text; numeric
/// values are clamped into the accepted range.
pub fn parse_minutes(raw: &str) -> Option<u32> {
    raw.trim().parse::<i64>().ok().map(clamp_minutes)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preferences {
    pub font: FontChoice,
    pub color: ColorChoice,
    pub durations: DurationSet,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            font: FontChoice::default(),
            color: ColorChoice::default(),
            durations: DurationSet::defaults(),
        }
    }
}

/// Reads the persisted preferences, substituting the default for every key
/// that is missing or malformed.
pub fn load_confirmed(store: &dyn KeyValueStore) -> Preferences {
    let font = read_or_default(store, KEY_FONT, FontChoice::default(), |raw| raw.parse().ok());
    let color = read_or_default(store, KEY_COLOR, ColorChoice::default(), |raw| raw.parse().ok());
    let minutes = PerMode::from_fn(|mode| {
        read_or_default(store, mode.storage_key(), mode.default_minutes(), |raw| parse_minutes(&raw))
    });

    Preferences {
        font,
        color,
        durations: DurationSet::from_minutes(&minutes),
    }
}

fn read_or_default<T: fmt::Debug>(
    store: &dyn KeyValueStore,
    key: &str,
    default: T,
    parse: impl FnOnce(String) -> Option<T>,
) -> T {
    match store.get(key) {
        None => default,
        Some(raw) => match parse(raw.clone()) {
            Some(value) => value,
            None => {
                warn!("Ignoring malformed {}={:?}, using {:?}", key, raw, default);
                default
            }
        },
    }
}

/// Confirmed (applied, persisted) preferences plus the live-edited preview.
pub struct PreferenceState<S: KeyValueStore> {
    store: S,
    confirmed: Preferences,
    preview: Preferences,
}

impl<S: KeyValueStore> PreferenceState<S> {
    pub fn new(store: S) -> Self {
        let confirmed = load_confirmed(&store);
        info!(
            "Loaded preferences: font={}, color={}, durations={:?}",
            confirmed.font.as_str(),
            confirmed.color.as_str(),
            confirmed.durations
        );
        Self {
            store,
            preview: confirmed.clone(),
            confirmed,
        }
    }

    pub fn confirmed(&self) -> &Preferences {
        &self.confirmed
    }

    pub fn preview(&self) -> &Preferences {
        &self.preview
    }

    #[cfg(test)]
    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn set_preview_font(&mut self, font: FontChoice) {
        self.preview.font = font;
    }

    pub fn set_preview_color(&mut self, color: ColorChoice) {
        debug!("Previewing color {} ({})", color.as_str(), color.hex());
        self.preview.color = color;
    }

    /// Applies the preview font/color and the parsed minute inputs, persists
    /// them and returns the new confirmed durations. A non-numeric input
    /// keeps the currently confirmed value for that mode.
    pub fn commit(&mut self, raw_minutes: &PerMode<String>) -> DurationSet {
        let minutes = PerMode::from_fn(|mode| {
            parse_minutes(&raw_minutes[mode]).unwrap_or_else(|| {
                warn!(
                    "Rejected {} duration {:?}, keeping {} minutes",
                    mode,
                    raw_minutes[mode],
                    self.confirmed.durations.minutes(mode)
                );
                self.confirmed.durations.minutes(mode)
            })
        });

        self.confirmed = Preferences {
            font: self.preview.font,
            color: self.preview.color,
            durations: DurationSet::from_minutes(&minutes),
        };
        self.preview = self.confirmed.clone();
        self.persist();

        info!(
            "Committed preferences: font={}, color={}, minutes={:?}",
            self.confirmed.font.as_str(),
            self.confirmed.color.as_str(),
            minutes
        );
        self.confirmed.durations.clone()
    }

    pub fn revert(&mut self) {
        self.preview = self.confirmed.clone();
    }

    fn persist(&mut self) {
        let mut entries = vec![
            (KEY_FONT, self.confirmed.font.as_str().to_string()),
            (KEY_COLOR, self.confirmed.color.as_str().to_string()),
        ];
        for mode in ModeKey::ALL {
            entries.push((mode.storage_key(), self.confirmed.durations.minutes(mode).to_string()));
        }

        for (key, value) in entries {
            if let Err(e) = self.store.set(key, &value) {
                warn!("Failed to persist {}: {}", key, e);
            }
        }
    }
}
