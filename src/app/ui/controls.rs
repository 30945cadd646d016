use eframe::egui::{self, Ui};

use super::super::ViewModel;

/// Path field plus load button. Returns `true` when a load was requested.
pub(in crate::app) fn draw_source_picker(ui: &mut Ui, path_input: &mut String, is_loading: bool) -> bool {
    ui.heading("Graph Source");
    ui.add_space(4.0);
    ui.label("Graph JSON file")
        .on_hover_text("A scanner result: {\"nodes\": [...], \"edges\": [...]} or {\"graph\": {...}}.");

    let response = ui.text_edit_singleline(path_input);
    let submitted = response.lost_focus() && ui.input(|input| input.key_pressed(egui::Key::Enter));

    let clicked = ui
        .add_enabled(
            !is_loading && !path_input.trim().is_empty(),
            egui::Button::new("Load graph"),
        )
        .clicked();

    (clicked || submitted) && !is_loading && !path_input.trim().is_empty()
}

impl ViewModel {
    pub(in crate::app) fn draw_controls(&mut self, ui: &mut Ui) {
        ui.heading("Graph Controls");
        ui.separator();
        ui.add_space(4.0);

        ui.label("Search (endpoint, label or URL)")
            .on_hover_text("Fuzzy-highlight matching nodes without changing the layout.");
        ui.text_edit_singleline(&mut self.search);

        ui.separator();

        ui.checkbox(&mut self.live_physics, "Live physics")
            .on_hover_text("Pause to freeze the layout; dragging still moves the grabbed node.");

        ui.horizontal(|ui| {
            if ui
                .button("Reheat")
                .on_hover_text("Restart the layout from a warm temperature.")
                .clicked()
            {
                let alpha = self.simulation.config().drag_alpha_target;
                self.simulation.warm(alpha);
            }
            if ui
                .button("Stop")
                .on_hover_text("Freeze every node where it is.")
                .clicked()
            {
                self.simulation.stop();
            }
            if ui.button("Reset view").clicked() {
                self.viewport.reset();
            }
        });

        ui.separator();

        let mut config = self.simulation.config();
        let mut changed = false;
        changed |= ui
            .add(egui::Slider::new(&mut config.rest_distance, 40.0..=400.0).text("Link distance"))
            .on_hover_text("Length every link relaxes toward.")
            .changed();
        changed |= ui
            .add(egui::Slider::new(&mut config.charge, -1200.0..=-20.0).text("Repulsion"))
            .on_hover_text("Many-body charge; more negative pushes nodes further apart.")
            .changed();
        changed |= ui
            .add(egui::Slider::new(&mut config.center_strength, 0.0..=1.0).text("Centering"))
            .on_hover_text("How quickly the layout drifts back to the middle of the canvas.")
            .changed();
        changed |= ui
            .add(egui::Slider::new(&mut config.velocity_decay, 0.05..=0.9).text("Friction"))
            .on_hover_text("Share of velocity lost every tick; higher values settle sooner.")
            .changed();
        if changed {
            self.simulation.set_config(config);
            self.simulation.warm(config.drag_alpha_target);
        }

        ui.separator();
        ui.label(format!("zoom: {:.0}%", self.viewport.scale() * 100.0));
        if let Some(dragged) = self.interaction.dragged_id() {
            ui.label(format!("dragging: {dragged}"));
        }
    }
}
