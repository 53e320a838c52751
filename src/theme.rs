use egui::{Color32, FontData, FontDefinitions, FontFamily};
use log::{debug, info};
use std::path::Path;

use crate::preferences::{ColorChoice, FontChoice, Preferences};

pub const BACKGROUND: Color32 = Color32::from_rgb(0x1E, 0x21, 0x3F);
pub const SURFACE: Color32 = Color32::from_rgb(0x16, 0x19, 0x32);
pub const TEXT: Color32 = Color32::from_rgb(0xD7, 0xE0, 0xFF);
pub const PANEL: Color32 = Color32::from_rgb(0xFF, 0xFF, 0xFF);
pub const PANEL_TEXT: Color32 = Color32::from_rgb(0x16, 0x19, 0x32);

pub fn accent_color(color: ColorChoice) -> Color32 {
    let [r, g, b] = color.rgb();
    Color32::from_rgb(r, g, b)
}

pub fn font_family(font: FontChoice) -> FontFamily {
    FontFamily::Name(font.as_str().into())
}

/// Colors and font the widget is painted with this frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    pub accent: Color32,
    pub family: FontFamily,
}

impl Theme {
    pub fn from_preferences(prefs: &Preferences) -> Self {
        Self {
            accent: accent_color(prefs.color),
            family: font_family(prefs.font),
        }
    }

    pub fn font(&self, size: f32) -> egui::FontId {
        egui::FontId::new(size, self.family.clone())
    }
}

fn font_file(font: FontChoice) -> &'static str {
    match font {
        FontChoice::Kumbh => "KumbhSans-Bold.ttf",
        FontChoice::Roboto => "RobotoSlab-Bold.ttf",
        FontChoice::Space => "SpaceMono-Bold.ttf",
    }
}

/// Reads whichever font files are present in `fonts_dir`.
pub fn load_font_files(fonts_dir: Option<&Path>) -> Vec<(FontChoice, Vec<u8>)> {
    let Some(dir) = fonts_dir else {
        return Vec::new();
    };
    FontChoice::ALL
        .into_iter()
        .filter_map(|font| {
            let path = dir.join(font_file(font));
            match std::fs::read(&path) {
                Ok(bytes) => {
                    info!("Loaded font {}", path.display());
                    Some((font, bytes))
                }
                Err(e) => {
                    debug!("Font {} unavailable: {}", path.display(), e);
                    None
                }
            }
        })
        .collect()
}

/// Registers one named family per font choice. Choices without a loaded
/// file fall back to the built-in proportional or monospace fonts.
pub fn build_font_definitions(loaded: Vec<(FontChoice, Vec<u8>)>) -> FontDefinitions {
    let mut fonts = FontDefinitions::default();
    let mut custom = Vec::new();
    for (font, bytes) in loaded {
        fonts
            .font_data
            .insert(font.as_str().to_string(), FontData::from_owned(bytes));
        custom.push(font);
    }

    for font in FontChoice::ALL {
        let builtin = match font {
            FontChoice::Space => FontFamily::Monospace,
            FontChoice::Kumbh | FontChoice::Roboto => FontFamily::Proportional,
        };
        let mut chain = Vec::new();
        if custom.contains(&font) {
            chain.push(font.as_str().to_string());
        }
        chain.extend(fonts.families.get(&builtin).cloned().unwrap_or_default());
        fonts.families.insert(font_family(font), chain);
    }
    fonts
}

pub fn install(ctx: &egui::Context, fonts_dir: Option<&Path>) {
    ctx.set_fonts(build_font_definitions(load_font_files(fonts_dir)));

    let mut visuals = egui::Visuals::dark();
    visuals.panel_fill = BACKGROUND;
    visuals.window_fill = PANEL;
    visuals.override_text_color = Some(TEXT);
    ctx.set_visuals(visuals);
}
