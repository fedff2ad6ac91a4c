use eframe::egui::{self, Color32, RichText, Ui};

use crate::state::{AppState, UiAction};

// ---------------------------------------------------------------------------
// Left side panel – year selection widgets
// ---------------------------------------------------------------------------

/// Render the left selection panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Years");
    ui.label(RichText::new(state.broadcaster.current().to_string()).strong());
    ui.separator();

    range_slider(ui, state);
    ui.add_space(6.0);
    year_pips(ui, state);
    ui.separator();
    year_dropdown(ui, state);
    ui.separator();

    ui.horizontal(|ui: &mut Ui| {
        let play_label = if state.playback.is_running() { "⏸ Pause" } else { "▶ Play" };
        if ui.button(play_label).clicked() {
            state.queue(UiAction::TogglePlayback);
        }
        if ui.button("Reset").clicked() {
            state.queue(UiAction::Reset);
        }
    });
}

/// Two handles over the hard range; the candidate is only published when a
/// drag ends.
fn range_slider(ui: &mut Ui, state: &mut AppState) {
    let bounds = state.slider.bounds();
    let hard = bounds.hard_min as f64..=bounds.hard_max as f64;

    for (handle, label) in [(0, "From"), (1, "To")] {
        let mut value = state.slider.handles()[handle];
        let out = state.slider.is_out_of_bounds(handle);
        let response = ui
            .horizontal(|ui: &mut Ui| {
                let text = if out {
                    RichText::new(label).color(Color32::RED)
                } else {
                    RichText::new(label)
                };
                ui.label(text);
                ui.add(
                    egui::Slider::new(&mut value, hard.clone())
                        .step_by(1.0)
                        .fixed_decimals(0),
                )
            })
            .inner;

        if response.changed() {
            state.slider.drag(handle, value);
        }
        // Keyboard edits have no drag phase.
        if response.drag_stopped() || (response.changed() && !response.dragged()) {
            let (min, max) = state.slider.release();
            state.queue(UiAction::SetRange(min, max));
        }
    }

    if (0..2).any(|h| state.slider.is_out_of_bounds(h)) {
        ui.label(
            RichText::new(format!(
                "Selection snaps to {}–{}",
                bounds.soft_min, bounds.soft_max
            ))
            .small()
            .color(Color32::RED),
        );
    }
}

fn year_pips(ui: &mut Ui, state: &mut AppState) {
    let current = state.broadcaster.current();
    ui.horizontal_wrapped(|ui: &mut Ui| {
        for year in state.slider.pips() {
            let label = RichText::new(year.to_string()).small();
            if ui.selectable_label(current.contains(year), label).clicked() {
                state.slider.click_pip(year);
                let [min, max] = state.slider.handles();
                state.queue(UiAction::SetRange(min, max));
            }
        }
    });
}

fn year_dropdown(ui: &mut Ui, state: &mut AppState) {
    let bounds = state.broadcaster.bounds();
    let current = state.broadcaster.current();
    let selected = if current.min() == current.max() {
        current.min().to_string()
    } else {
        format!("{}-{}", current.min(), current.max())
    };

    let mut options = vec![format!("{}-{}", bounds.soft_min, bounds.soft_max)];
    options.extend((bounds.soft_min..=bounds.soft_max).map(|y| y.to_string()));

    ui.strong("Select years");
    egui::ComboBox::from_id_salt("year_dropdown")
        .selected_text(&selected)
        .show_ui(ui, |ui: &mut Ui| {
            for option in options {
                if ui.selectable_label(selected == option, &option).clicked() {
                    state.queue(UiAction::SetText(option));
                }
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open folder…").clicked() {
                open_folder_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        match &state.data_dir {
            Some(dir) => ui.label(format!(
                "{} rows loaded from {}, showing {}",
                state.dataset.len(),
                dir.display(),
                state.broadcaster.current()
            )),
            None => ui.label("No data loaded"),
        };

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// Folder dialog
// ---------------------------------------------------------------------------

pub fn open_folder_dialog(state: &mut AppState) {
    let mut dialog = rfd::FileDialog::new().set_title("Open happiness data folder");
    if let Some(dir) = &state.data_dir {
        dialog = dialog.set_directory(dir);
    }
    if let Some(dir) = dialog.pick_folder() {
        state.queue(UiAction::OpenFolder(dir));
    }
}
