use crate::{
    config::Config,
    controller::PomodoroController,
    preferences::{ColorChoice, FontChoice, ModeKey},
    progress::{RingTween, RING_RADIUS},
    settings_panel::{ClickTarget, CloseReason, StepDirection},
    storage::JsonFileStore,
    theme::{self, Theme},
    timer::TimerStatus,
};
use chrono::Utc;
use eframe::egui;
use std::f32::consts::TAU;

const RING_TRANSITION_SECS: f64 = 1.0;
const RING_STROKE: f32 = 10.0;

pub struct PomodoroApp {
    controller: PomodoroController<JsonFileStore>,
    ring_tween: RingTween,
    held_stepper: Option<(ModeKey, StepDirection)>,
}

impl PomodoroApp {
    pub fn new(cc: &eframe::CreationContext<'_>, config: &Config, store: JsonFileStore) -> Self {
        theme::install(&cc.egui_ctx, config.fonts_dir.as_deref());
        let controller = PomodoroController::new(store, config);
        let ring_tween = RingTween::new(controller.ring().visible_fraction(), RING_TRANSITION_SECS);
        Self {
            controller,
            ring_tween,
            held_stepper: None,
        }
    }

    fn render_tabs(&mut self, ui: &mut egui::Ui, theme: &Theme) {
        let accent = self.controller.accent().rgb();
        let mut hovered = None;
        let mut clicked = None;

        egui::Frame::none()
            .fill(theme::SURFACE)
            .rounding(32.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    for mode in ModeKey::ALL {
                        let fill = self.controller.modes().tab_fill(mode, accent);
                        let (bg, fg) = match fill {
                            Some(fill) => {
                                let [r, g, b] = fill.rgb;
                                (
                                    egui::Color32::from_rgb(r, g, b).gamma_multiply(fill.opacity),
                                    theme::SURFACE,
                                )
                            }
                            None => (egui::Color32::TRANSPARENT, theme::TEXT),
                        };
                        let label = egui::RichText::new(mode.label())
                            .font(theme.font(14.0))
                            .color(fg);
                        let response = ui.add(
                            egui::Button::new(label)
                                .fill(bg)
                                .rounding(24.0)
                                .min_size(egui::vec2(120.0, 48.0)),
                        );
                        if response.hovered() {
                            hovered = Some(mode);
                        }
                        if response.clicked() {
                            clicked = Some(mode);
                        }
                    }
                });
            });

        self.controller.modes_mut().hover(hovered);
        if let Some(mode) = clicked {
            self.controller.select_mode(mode);
        }
    }

    fn render_ring(&mut self, ui: &mut egui::Ui, theme: &Theme) {
        let size = egui::vec2(2.0 * RING_RADIUS + 80.0, 2.0 * RING_RADIUS + 80.0);
        let (rect, _) = ui.allocate_exact_size(size, egui::Sense::hover());
        let center = rect.center();
        let painter = ui.painter_at(rect);

        painter.circle_filled(center, RING_RADIUS + 30.0, theme::SURFACE);

        let now = ui.input(|i| i.time);
        let animate = self.controller.ring_mut().begin_frame();
        self.ring_tween
            .retarget(self.controller.ring().visible_fraction(), now, animate);
        let visible = self.ring_tween.value(now);
        if self.ring_tween.is_animating(now) {
            ui.ctx().request_repaint();
        }

        if visible > 0.0 {
            let steps = 180;
            let points: Vec<egui::Pos2> = (0..=steps)
                .map(|i| {
                    let angle = -TAU / 4.0 + TAU * visible * i as f32 / steps as f32;
                    center + RING_RADIUS * egui::vec2(angle.cos(), angle.sin())
                })
                .collect();
            painter.add(egui::Shape::line(
                points,
                egui::Stroke::new(RING_STROKE, theme.accent),
            ));
        }

        painter.text(
            center,
            egui::Align2::CENTER_CENTER,
            self.controller.ring().display(),
            theme.font(72.0),
            theme::TEXT,
        );

        let label = self.controller.timer().status_label().to_uppercase();
        let label_color = if self.controller.timer().status() == TimerStatus::Completed {
            theme.accent
        } else {
            theme::TEXT
        };
        let button_rect =
            egui::Rect::from_center_size(center + egui::vec2(0.0, 64.0), egui::vec2(140.0, 28.0));
        let response = ui.put(
            button_rect,
            egui::Button::new(
                egui::RichText::new(label)
                    .font(theme.font(16.0))
                    .color(label_color),
            )
            .frame(false),
        );
        if response.clicked() {
            self.controller.toggle_timer(Utc::now());
        }
    }

    /// Draws the settings window. Returns the window rect and the Apply
    /// button rect.
    fn render_settings(&mut self, ctx: &egui::Context, theme: &Theme) -> (egui::Rect, egui::Rect) {
        let now = Utc::now();
        let mut close = false;
        let mut apply = false;
        let mut apply_rect = egui::Rect::NOTHING;
        let mut still_held = None;

        let response = egui::Window::new(
            egui::RichText::new("Settings")
                .font(theme.font(24.0))
                .color(theme::PANEL_TEXT),
        )
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
        .show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(
                    egui::RichText::new("TIME (MINUTES)")
                        .font(theme.font(13.0))
                        .color(theme::PANEL_TEXT),
                );
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button("✕").clicked() {
                        close = true;
                    }
                });
            });
            ui.separator();

            ui.horizontal(|ui| {
                for mode in ModeKey::ALL {
                    ui.vertical(|ui| {
                        ui.label(egui::RichText::new(mode.label()).color(theme::PANEL_TEXT));
                        ui.horizontal(|ui| {
                            ui.add(
                                egui::TextEdit::singleline(
                                    self.controller.panel_mut().draft_mut(mode),
                                )
                                .desired_width(48.0),
                            );
                            ui.vertical(|ui| {
                                for (direction, glyph) in
                                    [(StepDirection::Up, "▲"), (StepDirection::Down, "▼")]
                                {
                                    let response = ui.small_button(glyph);
                                    if response.is_pointer_button_down_on()
                                        && response.contains_pointer()
                                    {
                                        still_held = Some((mode, direction));
                                    }
                                }
                            });
                        });
                    });
                }
            });
            ui.separator();

            ui.horizontal(|ui| {
                ui.label(egui::RichText::new("FONT").color(theme::PANEL_TEXT));
                for font in FontChoice::ALL {
                    let selected = self.controller.look().font == font;
                    let (bg, fg) = if selected {
                        (theme::PANEL_TEXT, theme::PANEL)
                    } else {
                        (theme::TEXT, theme::PANEL_TEXT)
                    };
                    let label = egui::RichText::new("Aa")
                        .font(egui::FontId::new(15.0, theme::font_family(font)))
                        .color(fg);
                    let clicked = ui
                        .add(
                            egui::Button::new(label)
                                .fill(bg)
                                .rounding(20.0)
                                .min_size(egui::vec2(40.0, 40.0)),
                        )
                        .clicked();
                    if clicked {
                        self.controller.preview_font(font);
                    }
                }
            });
            ui.separator();

            ui.horizontal(|ui| {
                ui.label(egui::RichText::new("COLOR").color(theme::PANEL_TEXT));
                for color in ColorChoice::ALL {
                    let selected = self.controller.accent() == color;
                    let mark = if selected { "✔" } else { " " };
                    let clicked = ui
                        .add(
                            egui::Button::new(
                                egui::RichText::new(mark).color(theme::PANEL_TEXT),
                            )
                            .fill(theme::accent_color(color))
                            .rounding(20.0)
                            .min_size(egui::vec2(40.0, 40.0)),
                        )
                        .clicked();
                    if clicked {
                        self.controller.preview_color(color);
                    }
                }
            });

            ui.add_space(12.0);
            ui.vertical_centered(|ui| {
                let response = ui.add(
                    egui::Button::new(
                        egui::RichText::new("Apply")
                            .font(theme.font(16.0))
                            .color(theme::PANEL),
                    )
                    .fill(theme.accent)
                    .rounding(26.0)
                    .min_size(egui::vec2(140.0, 52.0)),
                );
                apply_rect = response.rect;
                if response.clicked() {
                    apply = true;
                }
            });
        });

        if still_held != self.held_stepper {
            if self.held_stepper.is_some() {
                self.controller.release_step();
            }
            if let Some((mode, direction)) = still_held {
                self.controller.press_step(mode, direction, now);
            }
            self.held_stepper = still_held;
        }

        if apply {
            self.controller.apply_settings();
        } else if close {
            self.controller.close_settings(CloseReason::ExplicitClose);
        }

        let panel_rect = response.map_or(egui::Rect::NOTHING, |inner| inner.response.rect);
        (panel_rect, apply_rect)
    }
}

impl eframe::App for PomodoroApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = Utc::now();
        self.controller.frame(now);
        let theme = Theme::from_preferences(self.controller.look());

        if self.controller.panel().is_open() && ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
            self.controller.close_settings(CloseReason::Escape);
        }

        let mut trigger_rect = egui::Rect::NOTHING;
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.add_space(24.0);
                ui.label(
                    egui::RichText::new("pomodoro")
                        .font(theme.font(32.0))
                        .color(theme::TEXT),
                );
                ui.add_space(24.0);
                self.render_tabs(ui, &theme);
                ui.add_space(24.0);
                self.render_ring(ui, &theme);
                ui.add_space(24.0);

                let trigger = ui.add(
                    egui::Button::new(egui::RichText::new("⚙").size(28.0).color(theme::TEXT))
                        .frame(false),
                );
                trigger_rect = trigger.rect;
                if trigger.clicked() {
                    self.controller.open_settings();
                }
            });
        });

        if self.controller.panel().is_open() {
            let (panel_rect, apply_rect) = self.render_settings(ctx, &theme);

            let pressed_at = ctx.input(|i| {
                if i.pointer.any_pressed() {
                    i.pointer.interact_pos()
                } else {
                    None
                }
            });
            if let Some(pos) = pressed_at {
                let target = if apply_rect.contains(pos) {
                    ClickTarget::Apply
                } else if panel_rect.contains(pos) {
                    ClickTarget::InsidePanel
                } else if trigger_rect.contains(pos) {
                    ClickTarget::Trigger
                } else {
                    ClickTarget::Elsewhere
                };
                self.controller.pointer_down(target);
            }
        } else if self.held_stepper.take().is_some() {
            self.controller.release_step();
        }

        if let Some(wait) = self.controller.next_wake(Utc::now()) {
            ctx.request_repaint_after(wait.to_std().unwrap_or_default());
        }
    }
}
