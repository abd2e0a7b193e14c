// src/app/ui/lists.rs
use eframe::egui as eg;

use crate::app::gfx::poster_placeholder;
use crate::app::posters::PosterLoader;

const THUMB: eg::Vec2 = eg::vec2(40.0, 60.0);

/// Box with a –/+ toggle in the corner; contents only render while open.
pub(crate) fn toggle_box(
    ui: &mut eg::Ui,
    id: &str,
    open: &mut bool,
    add_contents: impl FnOnce(&mut eg::Ui),
) {
    eg::Frame::group(ui.style())
        .rounding(eg::Rounding::same(9.0))
        .inner_margin(eg::Margin::same(8.0))
        .show(ui, |ui| {
            ui.set_min_size(ui.available_size());
            ui.push_id(id, |ui| {
                ui.with_layout(eg::Layout::right_to_left(eg::Align::Min), |ui| {
                    if ui.button(if *open { "–" } else { "+" }).clicked() {
                        *open = !*open;
                    }
                });
                if *open {
                    add_contents(ui);
                }
            });
        });
}

pub(crate) fn loader(ui: &mut eg::Ui) {
    ui.add_space(24.0);
    ui.vertical_centered(|ui| {
        ui.add(eg::Spinner::new().size(22.0));
        ui.label("Loading...");
    });
}

pub(crate) fn error_message(ui: &mut eg::Ui, message: &str) {
    ui.add_space(24.0);
    ui.vertical_centered(|ui| {
        ui.label(
            eg::RichText::new(format!("⛔ {message}"))
                .size(16.0)
                .color(eg::Color32::LIGHT_RED),
        );
    });
}

fn thumb(ui: &mut eg::Ui, posters: &mut PosterLoader, url: &str) {
    posters.request(url);
    match posters.texture(url) {
        Some(tex) => {
            ui.image((tex.id(), THUMB));
        }
        None => {
            poster_placeholder(ui, THUMB, "");
        }
    }
}

impl crate::app::PopcornApp {
    /// Returns the id of a clicked row.
    pub(crate) fn ui_render_movie_list(&mut self, ui: &mut eg::Ui) -> Option<String> {
        let selected = self.selected_id().map(str::to_string);
        let mut clicked = None;
        let posters = &mut self.posters;
        let movies = self.search.results();

        eg::ScrollArea::vertical()
            .auto_shrink([false; 2])
            .show(ui, |ui| {
                for movie in movies {
                    let row = ui.horizontal(|ui| {
                        thumb(ui, posters, &movie.poster);
                        ui.vertical(|ui| {
                            ui.label(eg::RichText::new(&movie.title).strong().size(15.0));
                            ui.label(format!("🗓 {}", movie.year));
                        });
                        ui.allocate_space(eg::vec2(ui.available_width(), 0.0));
                    });
                    let rect = row.response.rect;
                    let resp = ui.interact(
                        rect,
                        eg::Id::new(("movie_row", &movie.imdb_id)),
                        eg::Sense::click(),
                    );
                    if resp.hovered() {
                        ui.painter().rect_filled(
                            rect,
                            4.0,
                            eg::Color32::from_white_alpha(8),
                        );
                    }
                    if selected.as_deref() == Some(movie.imdb_id.as_str()) {
                        ui.painter().rect_stroke(
                            rect.expand(1.0),
                            4.0,
                            eg::Stroke::new(1.5, eg::Color32::YELLOW),
                        );
                    }
                    if resp.clicked() {
                        clicked = Some(movie.imdb_id.clone());
                    }
                    ui.separator();
                }
            });

        clicked
    }

    pub(crate) fn ui_render_watched_summary(&self, ui: &mut eg::Ui) {
        let s = self.watched.summary();
        ui.heading("Movies you watched");
        ui.horizontal_wrapped(|ui| {
            ui.label(format!("#️⃣ {} movies", s.count));
            ui.separator();
            ui.label(format!("⭐ {:.2}", s.avg_imdb_rating));
            ui.separator();
            ui.label(format!("🌟 {:.2}", s.avg_user_rating));
            ui.separator();
            ui.label(format!("⏳ {:.0} min", s.avg_runtime));
        });
    }

    /// Returns the id whose delete button was pressed.
    pub(crate) fn ui_render_watched_list(&mut self, ui: &mut eg::Ui) -> Option<String> {
        let mut delete = None;
        let posters = &mut self.posters;
        let entries = self.watched.entries();

        if entries.is_empty() {
            ui.label(eg::RichText::new("Rate a movie to start your list.").weak());
            return None;
        }

        eg::ScrollArea::vertical()
            .auto_shrink([false; 2])
            .show(ui, |ui| {
                for entry in entries {
                    ui.push_id(&entry.imdb_id, |ui| {
                        ui.horizontal(|ui| {
                            thumb(ui, posters, &entry.poster);
                            ui.vertical(|ui| {
                                ui.label(eg::RichText::new(&entry.title).strong().size(15.0));
                                ui.horizontal(|ui| {
                                    ui.label(format!("⭐ {}", entry.imdb_rating));
                                    ui.label(format!("🌟 {}", entry.user_rating));
                                    ui.label(format!("⏳ {} min", entry.runtime));
                                });
                            });
                            ui.with_layout(eg::Layout::right_to_left(eg::Align::Center), |ui| {
                                if ui
                                    .button("X")
                                    .on_hover_text("Remove from watched")
                                    .clicked()
                                {
                                    delete = Some(entry.imdb_id.clone());
                                }
                            });
                        });
                    });
                    ui.separator();
                }
            });

        delete
    }
}
