// src/app/ui/mod.rs
pub mod lists;
pub mod navbar;

use eframe::egui as eg;
use egui_extras::{Size, StripBuilder};

use crate::app::detail::DetailOutcome;

impl crate::app::PopcornApp {
    pub(crate) fn ui_render(&mut self, ctx: &eg::Context) {
        eg::TopBottomPanel::top("navbar")
            .exact_height(52.0)
            .show(ctx, |ui| self.ui_render_navbar(ui));

        if let Some(msg) = self.status.clone() {
            eg::TopBottomPanel::bottom("status").show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.label(eg::RichText::new(msg).color(eg::Color32::LIGHT_RED));
                    if ui.small_button("Dismiss").clicked() {
                        self.status = None;
                    }
                });
            });
        }

        eg::CentralPanel::default().show(ctx, |ui| {
            StripBuilder::new(ui)
                .size(Size::relative(0.5))
                .size(Size::remainder())
                .horizontal(|mut strip| {
                    strip.cell(|ui| self.ui_render_results_box(ui));
                    strip.cell(|ui| self.ui_render_right_box(ui));
                });
        });
    }

    fn ui_render_results_box(&mut self, ui: &mut eg::Ui) {
        let mut open = self.results_open;
        lists::toggle_box(ui, "results_box", &mut open, |ui| {
            if self.search.is_loading() {
                lists::loader(ui);
            } else if let Some(err) = self.search.error() {
                lists::error_message(ui, err);
            } else if let Some(id) = self.ui_render_movie_list(ui) {
                self.select_movie(&id);
            }
        });
        self.results_open = open;
    }

    fn ui_render_right_box(&mut self, ui: &mut eg::Ui) {
        let mut open = self.watched_open;
        lists::toggle_box(ui, "watched_box", &mut open, |ui| {
            if self.detail.is_some() {
                match self.ui_render_detail(ui) {
                    Some(DetailOutcome::Close) => self.close_movie(),
                    Some(DetailOutcome::Add(entry)) => {
                        if let Err(e) = self.add_watched(entry) {
                            self.status = Some(e.to_string());
                        }
                        self.close_movie();
                    }
                    None => {}
                }
            } else {
                self.ui_render_watched_summary(ui);
                ui.separator();
                if let Some(id) = self.ui_render_watched_list(ui) {
                    self.delete_watched(&id);
                }
            }
        });
        self.watched_open = open;
    }
}
