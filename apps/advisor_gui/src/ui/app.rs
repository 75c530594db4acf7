use std::time::Duration;

use client_core::{CycleError, Field, FieldError, FormInput, FormState};
use crossbeam_channel::{Receiver, Sender};
use eframe::egui;
use shared::domain::{label_for, ACTION_CATALOG};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::{
    events::UiEvent,
    orchestration::dispatch_backend_command,
    reducer::{apply_event, Notice, FEEDBACK_THANKS},
};

const NUMERIC_FIELDS: [(Field, &str); 4] = [
    (Field::Temperature, "Temperatura:"),
    (Field::Humidity, "Vlaga (%):"),
    (Field::Frames, "Broj ramova:"),
    (Field::Strength, "Snaga zajednice (1-10):"),
];

/// Raw text for the numeric inputs, so partially typed values survive
/// repaints while the parsed value lives in `FormInput`.
#[derive(Default)]
struct FieldBuffers {
    temperature: String,
    humidity: String,
    frames: String,
    strength: String,
}

impl FieldBuffers {
    fn from_form(form: &FormInput) -> Self {
        Self {
            temperature: form.display_value(Field::Temperature),
            humidity: form.display_value(Field::Humidity),
            frames: form.display_value(Field::Frames),
            strength: form.display_value(Field::Strength),
        }
    }

    fn get_mut(&mut self, field: Field) -> Option<&mut String> {
        match field {
            Field::Temperature => Some(&mut self.temperature),
            Field::Humidity => Some(&mut self.humidity),
            Field::Frames => Some(&mut self.frames),
            Field::Strength => Some(&mut self.strength),
            Field::Varroa => None,
        }
    }
}

enum UserAction {
    Submit,
    Accept,
    OpenCorrection,
    CancelCorrection,
    ChooseCorrection(&'static str),
    SendCorrection,
}

pub struct AdvisorApp {
    cmd_tx: Sender<BackendCommand>,
    ui_rx: Receiver<UiEvent>,
    state: FormState,
    buffers: FieldBuffers,
    status: String,
    notice: Option<String>,
    feedback_pending: bool,
}

impl AdvisorApp {
    pub fn new(cmd_tx: Sender<BackendCommand>, ui_rx: Receiver<UiEvent>) -> Self {
        let state = FormState::default();
        let buffers = FieldBuffers::from_form(&state.form);
        Self {
            cmd_tx,
            ui_rx,
            state,
            buffers,
            status: "Pokretanje...".to_string(),
            notice: None,
            feedback_pending: false,
        }
    }

    fn process_ui_events(&mut self) {
        while let Ok(event) = self.ui_rx.try_recv() {
            if matches!(event, UiEvent::FeedbackSent | UiEvent::FeedbackFailed(_)) {
                self.feedback_pending = false;
            }
            match apply_event(&mut self.state, event) {
                Some(Notice::Status(message)) => self.status = message,
                Some(Notice::FeedbackAccepted) => {
                    self.buffers = FieldBuffers::from_form(&self.state.form);
                    self.notice = Some(FEEDBACK_THANKS.to_string());
                }
                None => {}
            }
        }
    }

    fn handle_action(&mut self, action: UserAction) {
        match action {
            UserAction::Submit => {
                if self.feedback_pending {
                    return;
                }
                self.notice = None;
                if let Ok(observation) = self.state.begin_submission() {
                    dispatch_backend_command(
                        &self.cmd_tx,
                        BackendCommand::Predict { observation },
                        &mut self.state,
                    );
                }
            }
            UserAction::Accept => self.queue_feedback(true, None),
            UserAction::OpenCorrection => self.state.open_correction(),
            UserAction::CancelCorrection => self.state.cancel_correction(),
            UserAction::ChooseCorrection(code) => {
                if let Err(err) = self.state.choose_correction(code) {
                    self.state.set_error(err.to_string());
                }
            }
            UserAction::SendCorrection => match self.state.correction_choice() {
                Some(code) => {
                    let code = code.to_string();
                    self.queue_feedback(false, Some(&code));
                }
                None => self.state.set_error(FieldError::Correction.to_string()),
            },
        }
    }

    fn queue_feedback(&mut self, correct: bool, corrected_label: Option<&str>) {
        if self.feedback_pending {
            return;
        }
        match self.state.feedback_record(correct, corrected_label) {
            Ok(Some(record)) => {
                self.feedback_pending = dispatch_backend_command(
                    &self.cmd_tx,
                    BackendCommand::SendFeedback { record },
                    &mut self.state,
                );
            }
            Ok(None) => {}
            Err(err @ (CycleError::Validation(_) | CycleError::NoPrediction)) => {
                self.state.set_error(err.to_string());
            }
            Err(err) => tracing::warn!("feedback not queued: {err}"),
        }
    }

    fn show_form(&mut self, ui: &mut egui::Ui, actions: &mut Vec<UserAction>) {
        let enabled = self.state.inputs_enabled();
        let can_submit = enabled && !self.feedback_pending;

        for (field, label) in NUMERIC_FIELDS {
            ui.label(egui::RichText::new(label).strong());
            let Some(buffer) = self.buffers.get_mut(field) else {
                continue;
            };
            let response = ui.add_enabled(
                enabled,
                egui::TextEdit::singleline(&mut *buffer).desired_width(f32::INFINITY),
            );
            if response.changed() {
                self.state.form.set_field(field, buffer);
            }
            ui.add_space(6.0);
        }

        ui.label(egui::RichText::new("Prisustvo varoe:").strong());
        let selected = match self.state.form.varroa {
            Some(1) => "Da",
            Some(0) => "Ne",
            _ => "Odaberi...",
        };
        ui.add_enabled_ui(enabled, |ui| {
            egui::ComboBox::from_id_salt("varroa")
                .selected_text(selected)
                .width(ui.available_width())
                .show_ui(ui, |ui| {
                    ui.selectable_value(&mut self.state.form.varroa, Some(0), "Ne");
                    ui.selectable_value(&mut self.state.form.varroa, Some(1), "Da");
                });
        });
        ui.add_space(12.0);

        let button_text = if self.state.is_processing() {
            "Agent obrađuje..."
        } else {
            "Pošalji podatke"
        };
        let submit = ui.add_enabled(
            can_submit,
            egui::Button::new(button_text).min_size(egui::vec2(ui.available_width(), 32.0)),
        );
        if submit.clicked() {
            actions.push(UserAction::Submit);
        }

        if self.state.is_processing() && self.state.progress() > 0.0 {
            ui.add_space(8.0);
            ui.add(egui::ProgressBar::new(self.state.progress() / 100.0).show_percentage());
        }
    }

    fn show_recommendation(&mut self, ui: &mut egui::Ui, actions: &mut Vec<UserAction>) {
        let Some(prediction) = self.state.prediction() else {
            return;
        };
        let heading = match prediction.confidence {
            Some(confidence) => format!(
                "Preporuka agenta: {} ({:.0}%)",
                prediction.label(),
                confidence * 100.0
            ),
            None => format!("Preporuka agenta: {}", prediction.label()),
        };

        ui.add_space(18.0);
        ui.heading(heading);
        ui.add(
            egui::TextEdit::multiline(&mut self.state.comment)
                .hint_text("Komentar (opcionalno)")
                .desired_rows(3)
                .desired_width(f32::INFINITY),
        );
        ui.add_space(6.0);
        ui.horizontal(|ui| {
            let ready = !self.feedback_pending;
            if ui.add_enabled(ready, egui::Button::new("Prihvati")).clicked() {
                actions.push(UserAction::Accept);
            }
            if ui
                .add_enabled(ready, egui::Button::new("Odbaci / Ispravi"))
                .clicked()
            {
                actions.push(UserAction::OpenCorrection);
            }
        });
    }

    fn show_correction_modal(&mut self, ctx: &egui::Context, actions: &mut Vec<UserAction>) {
        if !self.state.correction_open() {
            return;
        }
        let selected = self
            .state
            .correction_choice()
            .map_or("Odaberi akciju...", label_for)
            .to_string();
        let current = self.state.correction_choice().map(str::to_string);

        egui::Window::new("Unesi ispravnu akciju")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
            .show(ctx, |ui| {
                egui::ComboBox::from_id_salt("correction")
                    .selected_text(selected)
                    .width(280.0)
                    .show_ui(ui, |ui| {
                        for option in ACTION_CATALOG.iter() {
                            let is_selected = current.as_deref() == Some(option.code);
                            if ui.selectable_label(is_selected, option.label).clicked() {
                                actions.push(UserAction::ChooseCorrection(option.code));
                            }
                        }
                    });
                ui.add_space(10.0);
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui
                        .add_enabled(!self.feedback_pending, egui::Button::new("Pošalji"))
                        .clicked()
                    {
                        actions.push(UserAction::SendCorrection);
                    }
                    if ui.button("Otkaži").clicked() {
                        actions.push(UserAction::CancelCorrection);
                    }
                });
            });
    }
}

impl eframe::App for AdvisorApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_ui_events();

        let mut actions = Vec::new();
        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            ui.weak(&self.status);
        });
        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                ui.vertical_centered(|ui| {
                    ui.heading("🐝 BeeAgent — Pametni savjetnik");
                });
                ui.add_space(12.0);

                if let Some(error) = self.state.error() {
                    ui.colored_label(egui::Color32::RED, error);
                }
                if let Some(info) = self.state.info() {
                    ui.colored_label(egui::Color32::from_rgb(0x21, 0x96, 0xF3), info);
                }
                if let Some(notice) = &self.notice {
                    ui.colored_label(egui::Color32::from_rgb(0x4C, 0xAF, 0x50), notice);
                }
                ui.add_space(8.0);

                self.show_form(ui, &mut actions);
                self.show_recommendation(ui, &mut actions);
            });
        });
        self.show_correction_modal(ctx, &mut actions);

        for action in actions {
            self.handle_action(action);
        }

        ctx.request_repaint_after(Duration::from_millis(100));
    }
}
