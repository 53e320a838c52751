use log::info;

use crate::preferences::ModeKey;

pub const HOVER_OPACITY: f32 = 0.7;

/// How a mode tab should be filled with the accent color.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TabFill {
    pub rgb: [u8; 3],
    pub opacity: f32,
}

#[derive(Debug, Clone)]
pub struct ModeSelector {
    active: ModeKey,
    hovered: Option<ModeKey>,
}

impl ModeSelector {
    pub fn new(active: ModeKey) -> Self {
        Self {
            active,
            hovered: None,
        }
    }

    pub fn active(&self) -> ModeKey {
        self.active
    }

    /// Makes `mode` the only active tab. Returns whether the active tab changed.
    pub fn select(&mut self, mode: ModeKey) -> bool {
        if self.active == mode {
            return false;
        }
        info!("Mode changed: {} -> {}", self.active, mode);
        self.active = mode;
        true
    }

    pub fn hover(&mut self, mode: Option<ModeKey>) {
        self.hovered = mode;
    }

    pub fn tab_fill(&self, mode: ModeKey, accent: [u8; 3]) -> Option<TabFill> {
        if mode == self.active {
            Some(TabFill {
                rgb: accent,
                opacity: 1.0,
            })
        } else if self.hovered == Some(mode) {
            Some(TabFill {
                rgb: accent,
                opacity: HOVER_OPACITY,
            })
        } else {
            None
        }
    }
}
