// src/app/mod.rs: search-as-you-type, details panel, persisted watched list

// ---- Standard lib imports ----
use std::sync::Arc;
use std::time::Duration;

// ---- Crates ----
use eframe::egui as eg;
use tracing::{error, info, warn};

// ---- Local modules ----
pub mod api;
pub mod cache;
pub mod cancel;
pub mod detail;
pub mod gfx;
pub mod keys;
pub mod posters;
pub mod rating;
pub mod search;
pub mod store;
pub mod types;
pub mod ui;
pub mod utils;
pub mod watched;
pub mod window;

use crate::app::api::{MovieApi, OmdbClient, UnavailableApi};
use crate::app::detail::DetailView;
use crate::app::keys::{KeyAction, KeyGuard, KeyRegistry};
use crate::app::posters::PosterLoader;
use crate::app::search::SearchHook;
use crate::app::store::WatchedStore;
use crate::app::types::WatchedEntry;
use crate::app::watched::{WatchedError, WatchedList};
use crate::app::window::TitleSink;
use crate::config::AppConfig;

pub const APP_TITLE: &str = "usePopcorn";

// ---- Tunables ----
const REPAINT_WHILE_BUSY_MS: u64 = 60;

pub struct PopcornApp {
    // data sources
    api: Arc<dyn MovieApi>,
    store: Option<WatchedStore>,

    // search box + results
    query: String,
    search: SearchHook,
    search_id: eg::Id,

    // right-hand panel
    detail: Option<DetailView>,
    watched: WatchedList,

    // window-wide plumbing
    keys: KeyRegistry,
    _enter: KeyGuard,
    title_sink: Arc<dyn TitleSink>,
    posters: PosterLoader,

    // collapsible boxes
    results_open: bool,
    watched_open: bool,

    // last user-visible problem outside the result list
    status: Option<String>,
}

impl PopcornApp {
    pub fn new(cc: &eframe::CreationContext<'_>, config: AppConfig) -> Self {
        let api: Arc<dyn MovieApi> = match OmdbClient::from_config(&config) {
            Ok(client) => Arc::new(client),
            Err(e) => {
                error!("OMDb client unavailable: {e}");
                Arc::new(UnavailableApi(e.to_string()))
            }
        };

        let store = match WatchedStore::open_or_memory(&config.local_db_path()) {
            Ok(s) => Some(s),
            Err(e) => {
                error!("no storage available: {e}");
                None
            }
        };

        let posters = PosterLoader::new(
            cache::poster_cache_dir(&config.data_dir),
            config.poster_workers,
        );
        let title_sink: Arc<dyn TitleSink> = Arc::new(cc.egui_ctx.clone());

        Self::with_parts(api, store, title_sink, posters)
    }

    pub fn with_parts(
        api: Arc<dyn MovieApi>,
        store: Option<WatchedStore>,
        title_sink: Arc<dyn TitleSink>,
        posters: PosterLoader,
    ) -> Self {
        let watched = store
            .as_ref()
            .map(|s| WatchedList::from_entries(s.load()))
            .unwrap_or_default();
        info!("loaded {} watched entries", watched.len());

        let keys = KeyRegistry::new();
        let enter = keys.register(eg::Key::Enter, KeyAction::FocusSearch);

        Self {
            search: SearchHook::new(Arc::clone(&api)),
            api,
            store,
            query: String::new(),
            search_id: eg::Id::new("search_box"),
            detail: None,
            watched,
            keys,
            _enter: enter,
            title_sink,
            posters,
            results_open: true,
            watched_open: true,
            status: None,
        }
    }

    pub fn watched(&self) -> &WatchedList {
        &self.watched
    }

    pub fn selected_id(&self) -> Option<&str> {
        self.detail.as_ref().map(|d| d.imdb_id())
    }

    pub fn search(&self) -> &SearchHook {
        &self.search
    }

    /// Push the search box text into the search hook. A new search closes
    /// the details panel.
    pub(crate) fn apply_query(&mut self) {
        let detail = &mut self.detail;
        self.search.set_query(&self.query, || *detail = None);
    }

    pub fn set_query(&mut self, q: &str) {
        self.query = q.to_string();
        self.apply_query();
    }

    /// Selecting the open title again closes it.
    pub fn select_movie(&mut self, imdb_id: &str) {
        if self.selected_id() == Some(imdb_id) {
            self.close_movie();
            return;
        }
        // release the old view's listener and title before the new one registers
        self.detail = None;
        self.detail = Some(DetailView::open(
            imdb_id,
            Arc::clone(&self.api),
            &self.keys,
            Arc::clone(&self.title_sink),
        ));
    }

    pub fn close_movie(&mut self) {
        self.detail = None;
    }

    pub fn add_watched(&mut self, entry: WatchedEntry) -> Result<(), WatchedError> {
        self.watched.add(entry)?;
        self.persist_watched();
        Ok(())
    }

    pub fn delete_watched(&mut self, imdb_id: &str) {
        if self.watched.remove(imdb_id).is_some() {
            self.persist_watched();
        }
    }

    fn persist_watched(&mut self) {
        let Some(store) = &self.store else {
            return;
        };
        match store.save(self.watched.entries()) {
            Ok(()) => self.status = None,
            Err(e) => {
                warn!("saving watched list failed: {e}");
                self.status = Some(format!("Could not save your list: {e}"));
            }
        }
    }

    /// Route this frame's key presses to whatever listeners are alive.
    fn handle_keys(&mut self, ctx: &eg::Context) {
        for key in keys::pressed_keys(ctx) {
            for action in self.keys.dispatch(key) {
                self.run_key_action(ctx, action);
            }
        }
    }

    fn run_key_action(&mut self, ctx: &eg::Context, action: KeyAction) {
        match action {
            KeyAction::CloseDetails => self.close_movie(),
            KeyAction::FocusSearch => {
                // Enter inside the box belongs to the box
                if ctx.memory(|m| m.has_focus(self.search_id)) {
                    return;
                }
                ctx.memory_mut(|m| m.request_focus(self.search_id));
                self.set_query("");
            }
        }
    }

    fn busy(&self) -> bool {
        self.search.is_loading()
            || self.detail.as_ref().is_some_and(|d| d.fetch().is_loading())
            || self.posters.has_pending()
    }
}

impl eframe::App for PopcornApp {
    fn update(&mut self, ctx: &eg::Context, _frame: &mut eframe::Frame) {
        self.handle_keys(ctx);

        self.search.poll();
        if let Some(view) = self.detail.as_mut() {
            view.poll();
        }
        self.posters.poll(ctx);

        self.ui_render(ctx);
        self.apply_query();

        if self.busy() {
            ctx.request_repaint_after(Duration::from_millis(REPAINT_WHILE_BUSY_MS));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::search::tests::FakeApi;
    use crate::app::store::KvStore;
    use crate::app::watched::tests::entry;
    use crate::app::window::tests::RecordingTitle;

    fn app_with(store: Option<WatchedStore>) -> (PopcornApp, tempfile::TempDir) {
        app_from(
            Arc::new(FakeApi::default()),
            store,
            Arc::new(RecordingTitle::default()),
        )
    }

    fn app_from(
        api: Arc<dyn MovieApi>,
        store: Option<WatchedStore>,
        title_sink: Arc<dyn TitleSink>,
    ) -> (PopcornApp, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let app = PopcornApp::with_parts(
            api,
            store,
            title_sink,
            PosterLoader::new(dir.path().to_path_buf(), 1),
        );
        (app, dir)
    }

    fn settle_detail(app: &mut PopcornApp) {
        let deadline = std::time::Instant::now() + Duration::from_secs(5);
        while let Some(view) = app.detail.as_mut() {
            if !view.fetch().is_loading() {
                break;
            }
            view.poll();
            assert!(std::time::Instant::now() < deadline, "details never settled");
            std::thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn selecting_same_id_toggles_closed() {
        let (mut app, _dir) = app_with(None);
        app.select_movie("tt1");
        assert_eq!(app.selected_id(), Some("tt1"));
        app.select_movie("tt2");
        assert_eq!(app.selected_id(), Some("tt2"));
        app.select_movie("tt2");
        assert_eq!(app.selected_id(), None);
    }

    #[test]
    fn only_one_escape_listener_across_selections() {
        let (mut app, _dir) = app_with(None);
        app.select_movie("tt1");
        app.select_movie("tt2");
        assert_eq!(app.keys.dispatch(eg::Key::Escape).len(), 1);
        app.close_movie();
        assert!(app.keys.dispatch(eg::Key::Escape).is_empty());
        // the search box listener stays for the app's lifetime
        assert_eq!(app.keys.dispatch(eg::Key::Enter), vec![KeyAction::FocusSearch]);
    }

    #[test]
    fn new_search_closes_details() {
        let (mut app, _dir) = app_with(None);
        app.select_movie("tt1");
        app.set_query("ab");
        assert_eq!(app.selected_id(), Some("tt1"));
        app.set_query("abc");
        assert_eq!(app.selected_id(), None);
    }

    #[test]
    fn watched_changes_are_persisted_immediately() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("popcorn.db");
        {
            let store = WatchedStore::new(KvStore::open(&path).unwrap());
            let (mut app, _posters) = app_with(Some(store));
            app.add_watched(entry("tt1", 148, 8.8, 10)).unwrap();
            app.add_watched(entry("tt2", 116, 8.5, 9)).unwrap();
            assert!(app.add_watched(entry("tt1", 148, 8.8, 2)).is_err());
            app.add_watched(entry("tt3", 90, 6.0, 5)).unwrap();
            app.delete_watched("tt2");
        }

        let store = WatchedStore::new(KvStore::open(&path).unwrap());
        let (app, _posters) = app_with(Some(store));
        let ids: Vec<&str> = app
            .watched()
            .entries()
            .iter()
            .map(|e| e.imdb_id.as_str())
            .collect();
        assert_eq!(ids, ["tt1", "tt3"]);
        assert_eq!(app.watched().entries()[0].user_rating, 10);
    }

    #[test]
    fn failed_details_show_error_and_release_listener() {
        let rec = Arc::new(RecordingTitle::default());
        let api = Arc::new(FakeApi::default().with_status("tt1", 503));
        let (mut app, _dir) = app_from(api, None, rec.clone());

        app.select_movie("tt1");
        settle_detail(&mut app);
        let fetch = app.detail.as_ref().unwrap().fetch();
        assert_eq!(
            fetch.error(),
            Some("Something went wrong while contacting the movie database (HTTP 503)")
        );
        assert!(fetch.details().is_none());
        assert!(rec.0.lock().unwrap().is_empty());

        app.close_movie();
        assert!(app.keys.dispatch(eg::Key::Escape).is_empty());
        assert!(rec.0.lock().unwrap().is_empty());
    }

    #[test]
    fn enter_focuses_and_clears_search_box() {
        let ctx = eg::Context::default();
        let (mut app, _dir) = app_with(None);

        app.set_query("ma");
        app.run_key_action(&ctx, KeyAction::FocusSearch);
        assert_eq!(app.query, "");
        assert!(ctx.memory(|m| m.has_focus(app.search_id)));

        // typing into the focused box keeps its text
        app.set_query("ma");
        app.run_key_action(&ctx, KeyAction::FocusSearch);
        assert_eq!(app.query, "ma");
        assert!(ctx.memory(|m| m.has_focus(app.search_id)));
    }
}
