//! Generator window
//!
//! A thin egui shell over `AppState`: widgets edit the state's fields in
//! place, buttons become `UiAction`s and every `Notice` is shown as a native
//! message box.

use eframe::egui;

use crate::app::{AppState, Mode, Notice, NoticeLevel};
use crate::error::{Result, SublayerError};
use crate::playback::POLL_INTERVAL;

const WINDOW_TITLE: &str = "Subliminal Affirmations Generator";

const BACKGROUND: egui::Color32 = egui::Color32::from_rgb(0x2b, 0x2b, 0x2b);
const FOREGROUND: egui::Color32 = egui::Color32::from_rgb(0x00, 0xff, 0x00);

/// Button presses collected during one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UiAction {
    AddLayer,
    RemoveLayer(usize),
    ClearManual,
    CopyManual,
    ClearAutomatic,
    GenerateAutomatic,
    Generate,
    Save,
    Play,
    Stop,
    ToggleFullscreen,
}

pub struct GeneratorApp {
    state: AppState,
}

impl GeneratorApp {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }

    fn handle_ui_action(&mut self, action: UiAction, ctx: &egui::Context) {
        tracing::debug!(?action, "ui action");
        let notice = match action {
            UiAction::AddLayer => {
                self.state.add_layer();
                None
            }
            UiAction::RemoveLayer(index) => {
                self.state.remove_layer(index);
                None
            }
            UiAction::ClearManual => {
                self.state.clear_manual();
                None
            }
            UiAction::CopyManual => {
                self.state.copy_manual_layers();
                None
            }
            UiAction::ClearAutomatic => {
                self.state.clear_automatic();
                None
            }
            UiAction::GenerateAutomatic => Some(self.state.generate_automatic()),
            UiAction::Generate => Some(self.state.generate()),
            UiAction::Save => self.save_dialog(),
            UiAction::Play => self.state.play(),
            UiAction::Stop => self.state.stop(),
            UiAction::ToggleFullscreen => {
                toggle_fullscreen(ctx);
                None
            }
        };

        if let Some(notice) = notice {
            show_notice(&notice);
        }
    }

    fn save_dialog(&mut self) -> Option<Notice> {
        let path = rfd::FileDialog::new()
            .add_filter("WAV files", &["wav"])
            .set_title("Save Audio")
            .set_file_name(AppState::default_export_name())
            .save_file()?;
        Some(self.state.save_to(&path))
    }

    fn show_mode_switch(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.radio_value(&mut self.state.mode, Mode::Manual, "Manual");
            ui.radio_value(&mut self.state.mode, Mode::Automatic, "Automatic");
            ui.separator();
            ui.label(format!("Voice: {}", self.state.synth_name()));
        });
    }

    fn show_manual(&mut self, ui: &mut egui::Ui, actions: &mut Vec<UiAction>) {
        ui.horizontal(|ui| {
            if ui.button("Add Layer").clicked() {
                actions.push(UiAction::AddLayer);
            }
            if ui.button("Clear Text (Manual)").clicked() {
                actions.push(UiAction::ClearManual);
            }
            if ui.button("Copy Manual Layers").clicked() {
                actions.push(UiAction::CopyManual);
            }
        });
        ui.add_space(8.0);

        egui::ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                for (idx, layer) in self.state.layers.iter_mut().enumerate() {
                    ui.horizontal(|ui| {
                        ui.label(format!("Layer {} Text:", idx + 1));
                        ui.add(egui::TextEdit::singleline(&mut layer.text).desired_width(360.0));
                        ui.label("Volume (dB):");
                        ui.add(egui::TextEdit::singleline(&mut layer.gain).desired_width(50.0));
                        ui.label("Play Rate:");
                        ui.add(egui::TextEdit::singleline(&mut layer.rate).desired_width(50.0));
                        if ui.button("Remove Layer").clicked() {
                            actions.push(UiAction::RemoveLayer(idx));
                        }
                    });
                }
            });
    }

    fn show_automatic(&mut self, ui: &mut egui::Ui, actions: &mut Vec<UiAction>) {
        egui::Grid::new("automatic_form")
            .num_columns(2)
            .spacing([10.0, 8.0])
            .show(ui, |ui| {
                ui.label("Number of Layers:");
                ui.add(egui::TextEdit::singleline(&mut self.state.auto_count).desired_width(60.0));
                ui.end_row();

                ui.label("Affirmation Text:");
                ui.add(egui::TextEdit::singleline(&mut self.state.auto_text).desired_width(480.0));
                ui.end_row();
            });
        ui.add_space(8.0);

        ui.horizontal(|ui| {
            if ui.button("Clear Text (Automatic)").clicked() {
                actions.push(UiAction::ClearAutomatic);
            }
            if ui.button("Generate Automatic Layers").clicked() {
                actions.push(UiAction::GenerateAutomatic);
            }
        });
    }

    fn show_controls(&mut self, ui: &mut egui::Ui, actions: &mut Vec<UiAction>) {
        let can_save = self.state.can_save();
        let can_play = self.state.can_play();
        let can_stop = self.state.can_stop();

        ui.horizontal(|ui| {
            if ui.button("Generate").clicked() {
                actions.push(UiAction::Generate);
            }
            if ui.add_enabled(can_save, egui::Button::new("Save Audio")).clicked() {
                actions.push(UiAction::Save);
            }
            if ui.add_enabled(can_play, egui::Button::new("Play")).clicked() {
                actions.push(UiAction::Play);
            }
            if ui.add_enabled(can_stop, egui::Button::new("Stop")).clicked() {
                actions.push(UiAction::Stop);
            }
            ui.checkbox(&mut self.state.looping, "Loop");
            if ui.button("Toggle Fullscreen").clicked() {
                actions.push(UiAction::ToggleFullscreen);
            }
        });

        // Generation blocks inside `update`, so the bar shows each run's final value
        let fraction = (self.state.progress() / 100.0) as f32;
        ui.add(egui::ProgressBar::new(fraction).show_percentage());
    }
}

impl eframe::App for GeneratorApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if ctx.input(|i| i.key_pressed(egui::Key::F11)) {
            toggle_fullscreen(ctx);
        }

        let mut actions = Vec::new();

        egui::TopBottomPanel::bottom("controls").show(ctx, |ui| {
            ui.add_space(6.0);
            self.show_controls(ui, &mut actions);
            ui.add_space(6.0);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            self.show_mode_switch(ui);
            ui.separator();
            match self.state.mode {
                Mode::Manual => self.show_manual(ui, &mut actions),
                Mode::Automatic => self.show_automatic(ui, &mut actions),
            }
        });

        for action in actions {
            self.handle_ui_action(action, ctx);
        }

        // Keep polling so the Stop button disables when playback ends
        if self.state.can_stop() {
            ctx.request_repaint_after(POLL_INTERVAL);
        }
    }
}

fn toggle_fullscreen(ctx: &egui::Context) {
    let is_fullscreen = ctx.input(|i| i.viewport().fullscreen).unwrap_or(false);
    ctx.send_viewport_cmd(egui::ViewportCommand::Fullscreen(!is_fullscreen));
}

fn show_notice(notice: &Notice) {
    let level = match notice.level {
        NoticeLevel::Info => rfd::MessageLevel::Info,
        NoticeLevel::Warning => rfd::MessageLevel::Warning,
        NoticeLevel::Error => rfd::MessageLevel::Error,
    };
    rfd::MessageDialog::new()
        .set_level(level)
        .set_title(notice.title.as_str())
        .set_description(notice.message.as_str())
        .set_buttons(rfd::MessageButtons::Ok)
        .show();
}

fn theme() -> egui::Visuals {
    let mut visuals = egui::Visuals::dark();
    visuals.override_text_color = Some(FOREGROUND);
    visuals.panel_fill = BACKGROUND;
    visuals.window_fill = BACKGROUND;
    visuals.extreme_bg_color = BACKGROUND;
    visuals.selection.stroke.color = FOREGROUND;
    visuals
}

/// Open the generator window and block until it closes
pub fn run(state: AppState) -> Result<()> {
    tracing::info!(engine = state.synth_name(), "starting generator window");

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(WINDOW_TITLE)
            .with_inner_size([1100.0, 700.0])
            .with_maximized(true),
        ..Default::default()
    };

    eframe::run_native(
        WINDOW_TITLE,
        native_options,
        Box::new(move |cc| {
            cc.egui_ctx.set_visuals(theme());
            Ok(Box::new(GeneratorApp::new(state)))
        }),
    )
    .map_err(|e| SublayerError::Gui {
        reason: format!("eframe error: {}", e),
    })
}
