// src/app/detail.rs
use std::sync::Arc;

use eframe::egui as eg;
use tracing::{debug, info, warn};

use crate::app::api::MovieApi;
use crate::app::cancel::{Task, TaskState};
use crate::app::keys::{KeyAction, KeyGuard, KeyRegistry};
use crate::app::rating::StarRating;
use crate::app::types::{MovieDetails, WatchedEntry};
use crate::app::utils::or_dash;
use crate::app::window::{TitleGuard, TitleSink};
use crate::app::APP_TITLE;

const DETAIL_STARS: u8 = 10;

/// Loads one full record. Loading a different id cancels the previous request.
pub struct DetailsFetch {
    api: Arc<dyn MovieApi>,
    imdb_id: String,
    details: Option<MovieDetails>,
    is_loading: bool,
    error: Option<String>,
    task: Option<Task<MovieDetails>>,
}

impl DetailsFetch {
    pub fn new(api: Arc<dyn MovieApi>) -> Self {
        Self {
            api,
            imdb_id: String::new(),
            details: None,
            is_loading: false,
            error: None,
            task: None,
        }
    }

    pub fn load(&mut self, imdb_id: &str) {
        if imdb_id == self.imdb_id && (self.is_loading || self.details.is_some()) {
            return;
        }
        if let Some(prev) = self.task.take() {
            prev.cancel();
        }
        self.imdb_id = imdb_id.to_string();
        self.is_loading = true;
        self.error = None;

        let api = Arc::clone(&self.api);
        let id = imdb_id.to_string();
        info!(imdb_id = %id, "loading details");
        self.task = Some(Task::spawn(move |token| api.details(&id, token)));
    }

    pub fn imdb_id(&self) -> &str {
        &self.imdb_id
    }

    pub fn details(&self) -> Option<&MovieDetails> {
        self.details.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Returns true when a fresh record was committed.
    pub fn poll(&mut self) -> bool {
        let state = match &self.task {
            Some(task) => task.state(),
            None => return false,
        };
        let TaskState::Finished(res) = state else {
            return false;
        };
        self.task = None;
        self.is_loading = false;
        match res {
            Ok(d) => {
                self.details = Some(d);
                true
            }
            Err(e) if e.is_cancelled() => false,
            Err(e) => {
                warn!("details for {} failed: {e}", self.imdb_id);
                self.error = Some(e.to_string());
                false
            }
        }
    }
}

/// One open details panel. Owns its Escape listener and the window title;
/// both are released when the view is dropped.
pub struct DetailView {
    fetch: DetailsFetch,
    stars: StarRating,
    user_rating: u8,
    rating_decisions: u32,
    title_sink: Arc<dyn TitleSink>,
    title_guard: Option<TitleGuard>,
    _escape: KeyGuard,
}

impl DetailView {
    pub fn open(
        imdb_id: &str,
        api: Arc<dyn MovieApi>,
        keys: &KeyRegistry,
        title_sink: Arc<dyn TitleSink>,
    ) -> Self {
        let mut fetch = DetailsFetch::new(api);
        fetch.load(imdb_id);
        Self {
            fetch,
            stars: StarRating::new(DETAIL_STARS).size(24.0),
            user_rating: 0,
            rating_decisions: 0,
            title_sink,
            title_guard: None,
            _escape: keys.register(eg::Key::Escape, KeyAction::CloseDetails),
        }
    }

    pub fn imdb_id(&self) -> &str {
        self.fetch.imdb_id()
    }

    pub fn fetch(&self) -> &DetailsFetch {
        &self.fetch
    }

    pub fn user_rating(&self) -> u8 {
        self.user_rating
    }

    pub fn rating_decisions(&self) -> u32 {
        self.rating_decisions
    }

    pub fn poll(&mut self) -> bool {
        if !self.fetch.poll() {
            return false;
        }
        if let Some(d) = self.fetch.details() {
            // drop the previous guard first so it cannot restore over us
            self.title_guard = None;
            self.title_guard = Some(TitleGuard::set(
                Arc::clone(&self.title_sink),
                &format!("Movie | {}", d.title),
                APP_TITLE,
            ));
        }
        true
    }

    /// Each change to a different non-zero rating counts as one decision.
    pub fn set_user_rating(&mut self, rating: u8) {
        if rating == 0 || rating == self.user_rating {
            return;
        }
        self.user_rating = rating;
        self.rating_decisions += 1;
        debug!(rating, decisions = self.rating_decisions, "rating changed");
    }

    /// The entry "+ Add to list" would create, once loaded and rated.
    pub fn watched_entry(&self) -> Option<WatchedEntry> {
        if self.user_rating == 0 {
            return None;
        }
        let d = self.fetch.details()?;
        let mut entry = d.to_watched(self.user_rating, Some(self.rating_decisions));
        entry.imdb_id = self.fetch.imdb_id().to_string();
        Some(entry)
    }
}

pub(crate) enum DetailOutcome {
    Close,
    Add(WatchedEntry),
}

impl crate::app::PopcornApp {
    pub(crate) fn ui_render_detail(&mut self, ui: &mut eg::Ui) -> Option<DetailOutcome> {
        let Some(view) = self.detail.as_mut() else {
            return None;
        };
        let mut outcome = None;

        if view.fetch.is_loading() {
            ui.add_space(24.0);
            ui.vertical_centered(|ui| {
                ui.add(eg::Spinner::new().size(22.0));
                ui.label("Loading...");
            });
            return None;
        }

        if let Some(err) = view.fetch.error() {
            ui.horizontal(|ui| {
                if ui.button("←").clicked() {
                    outcome = Some(DetailOutcome::Close);
                }
                ui.label(eg::RichText::new(format!("⛔ {err}")).color(eg::Color32::LIGHT_RED));
            });
            return outcome;
        }

        let Some(d) = view.fetch.details().cloned() else {
            return None;
        };
        let prior = self.watched.get(view.imdb_id()).map(|w| w.user_rating);

        eg::ScrollArea::vertical()
            .auto_shrink([false; 2])
            .show(ui, |ui| {
                ui.horizontal_top(|ui| {
                    if ui.button("←").on_hover_text("Back (Esc)").clicked() {
                        outcome = Some(DetailOutcome::Close);
                    }

                    let poster_size = eg::vec2(110.0, 165.0);
                    self.posters.request(&d.poster);
                    if let Some(tex) = self.posters.texture(&d.poster) {
                        ui.image((tex.id(), poster_size));
                    } else {
                        crate::app::gfx::poster_placeholder(ui, poster_size, "No poster");
                    }

                    ui.vertical(|ui| {
                        ui.heading(&d.title);
                        let released = d
                            .released_date()
                            .map(|date| date.format("%-d %b %Y").to_string())
                            .unwrap_or_else(|| or_dash(&d.released).to_string());
                        ui.label(format!("{released} • {}", or_dash(&d.runtime)));
                        ui.label(or_dash(&d.genre));
                        ui.label(format!("⭐ {} IMDb rating", or_dash(&d.imdb_rating)));
                    });
                });

                ui.add_space(10.0);
                ui.group(|ui| {
                    ui.set_width(ui.available_width());
                    match prior {
                        Some(r) => {
                            ui.label(format!("You rated this movie {r} ⭐"));
                        }
                        None => {
                            let mut committed = None;
                            view.stars.show(ui, |r| committed = Some(r));
                            if let Some(r) = committed {
                                view.set_user_rating(r);
                            }
                            if view.user_rating() > 0 && ui.button("+ Add to list").clicked() {
                                if let Some(entry) = view.watched_entry() {
                                    outcome = Some(DetailOutcome::Add(entry));
                                }
                            }
                        }
                    }
                });

                ui.add_space(10.0);
                ui.label(eg::RichText::new(or_dash(&d.plot)).italics());
                ui.add_space(6.0);
                ui.label(format!("Starring {}", or_dash(&d.actors)));
                ui.label(format!("Directed by {}", or_dash(&d.director)));
            });

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::search::tests::FakeApi;
    use crate::app::window::tests::RecordingTitle;
    use std::time::{Duration, Instant};

    fn settle(view: &mut DetailView) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while view.fetch().is_loading() {
            view.poll();
            assert!(Instant::now() < deadline, "details never settled");
            std::thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn loads_details_and_sets_title_until_dropped() {
        let keys = KeyRegistry::new();
        let rec = Arc::new(RecordingTitle::default());
        let mut view = DetailView::open("tt0133093", Arc::new(FakeApi::default()), &keys, rec.clone());
        assert_eq!(keys.dispatch(eg::Key::Escape), vec![KeyAction::CloseDetails]);

        settle(&mut view);
        assert_eq!(view.fetch().details().unwrap().imdb_id, "tt0133093");
        assert_eq!(rec.last().as_deref(), Some("Movie | Title tt0133093"));

        drop(view);
        assert_eq!(rec.last().as_deref(), Some(APP_TITLE));
        assert!(keys.dispatch(eg::Key::Escape).is_empty());
    }

    #[test]
    fn rating_decisions_count_changes_only() {
        let keys = KeyRegistry::new();
        let rec = Arc::new(RecordingTitle::default());
        let mut view = DetailView::open("tt1", Arc::new(FakeApi::default()), &keys, rec);
        settle(&mut view);
        assert!(view.watched_entry().is_none());

        view.set_user_rating(4);
        view.set_user_rating(4);
        view.set_user_rating(7);
        view.set_user_rating(9);
        assert_eq!(view.rating_decisions(), 3);

        let entry = view.watched_entry().unwrap();
        assert_eq!(entry.user_rating, 9);
        assert_eq!(entry.count_rating_decisions, Some(3));
        assert_eq!(entry.runtime, 136);
    }

    #[test]
    fn switching_id_cancels_stale_request() {
        let api = Arc::new(
            FakeApi::default()
                .with_delay("tt-slow", Duration::from_millis(300))
                .with_delay("tt-fast", Duration::from_millis(5)),
        );
        let mut fetch = DetailsFetch::new(api);
        fetch.load("tt-slow");
        fetch.load("tt-fast");

        let deadline = Instant::now() + Duration::from_secs(5);
        while fetch.is_loading() {
            fetch.poll();
            assert!(Instant::now() < deadline);
            std::thread::sleep(Duration::from_millis(5));
        }
        std::thread::sleep(Duration::from_millis(350));
        fetch.poll();
        assert_eq!(fetch.details().unwrap().imdb_id, "tt-fast");
        assert_eq!(fetch.error(), None);
    }
}
