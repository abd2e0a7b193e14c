// src/app/ui/navbar.rs
use eframe::egui as eg;

impl crate::app::PopcornApp {
    // ---------- NAVBAR ----------
    pub(crate) fn ui_render_navbar(&mut self, ui: &mut eg::Ui) {
        ui.horizontal_centered(|ui| {
            // Logo
            ui.label(eg::RichText::new("🍿 usePopcorn").size(22.0).strong());

            ui.separator();

            // Search
            let resp = ui.add(
                eg::TextEdit::singleline(&mut self.query)
                    .id(self.search_id)
                    .hint_text("Search movies...")
                    .desired_width(320.0),
            );
            if resp.changed() {
                self.apply_query();
            }

            ui.with_layout(eg::Layout::right_to_left(eg::Align::Center), |ui| {
                // Result count
                ui.label("results");
                ui.label(
                    eg::RichText::new(self.search.results().len().to_string()).strong(),
                );
                ui.label("Found");
            });
        });
    }
}
