// src/app/posters.rs
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use eframe::egui::{self as eg, TextureHandle};
use tracing::{debug, warn};

use crate::app::cache::{download_and_store_resized_with_client, url_to_cache_key};
use crate::app::utils::usable_url;

const RESIZE_MAX_W: u32 = 320;
const RESIZE_QUALITY: u8 = 75;
const MAX_DONE_PER_FRAME: usize = 12;
const MAX_UPLOADS_PER_FRAME: usize = 4;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PosterState {
    Pending, // queued or downloading
    Cached,  // file present on disk (ready to upload)
    Ready,   // texture uploaded
    Failed,  // permanent failure
}

struct PosterSlot {
    key: String,
    state: PosterState,
    path: Option<PathBuf>,
    tex: Option<TextureHandle>, // UI thread only
}

struct WorkItem {
    url: String,
    key: String,
}

struct PosterDone {
    url: String,
    result: Result<PathBuf, String>,
}

/// Poster downloads on a small worker pool; textures are uploaded on the UI
/// thread a few per frame. Workers start on the first request.
pub struct PosterLoader {
    cache_dir: PathBuf,
    workers: usize,
    slots: HashMap<String, PosterSlot>,
    work_tx: Option<Sender<WorkItem>>,
    done_rx: Option<Receiver<PosterDone>>,
    disabled: bool,
}

impl PosterLoader {
    pub fn new(cache_dir: PathBuf, workers: usize) -> Self {
        Self {
            cache_dir,
            workers: workers.max(1),
            slots: HashMap::new(),
            work_tx: None,
            done_rx: None,
            disabled: false,
        }
    }

    fn start_workers(&mut self) -> bool {
        if self.work_tx.is_some() {
            return true;
        }
        if self.disabled {
            return false;
        }

        // One shared HTTP client.
        let client = match reqwest::blocking::Client::builder()
            .user_agent("popcorn/posters")
            .timeout(Duration::from_secs(20))
            .pool_max_idle_per_host(self.workers)
            .build()
        {
            Ok(c) => Arc::new(c),
            Err(e) => {
                warn!("poster http client build failed: {e}; posters disabled");
                self.disabled = true;
                return false;
            }
        };

        let (work_tx, work_rx) = mpsc::channel::<WorkItem>();
        let (done_tx, done_rx) = mpsc::channel::<PosterDone>();
        let work_rx = Arc::new(Mutex::new(work_rx));

        for _ in 0..self.workers {
            let work_rx = Arc::clone(&work_rx);
            let done_tx = done_tx.clone();
            let client = Arc::clone(&client);
            let dir = self.cache_dir.clone();

            std::thread::spawn(move || loop {
                let job = match work_rx.lock() {
                    Ok(rx) => rx.recv(),
                    Err(_) => break,
                };
                let Ok(WorkItem { url, key }) = job else {
                    break;
                };
                let result = download_and_store_resized_with_client(
                    &client,
                    &url,
                    &dir,
                    &key,
                    RESIZE_MAX_W,
                    RESIZE_QUALITY,
                );
                if done_tx.send(PosterDone { url, result }).is_err() {
                    break;
                }
            });
        }

        self.work_tx = Some(work_tx);
        self.done_rx = Some(done_rx);
        true
    }

    /// Queue `url` once. "N/A" and non-http values are ignored.
    pub fn request(&mut self, url: &str) {
        let Some(url) = usable_url(url) else {
            return;
        };
        if self.slots.contains_key(url) {
            return;
        }

        let key = url_to_cache_key(url);
        let cached = self.cache_dir.join(format!("{key}.jpg"));
        if cached.exists() {
            self.slots.insert(
                url.to_string(),
                PosterSlot {
                    key,
                    state: PosterState::Cached,
                    path: Some(cached),
                    tex: None,
                },
            );
            return;
        }

        if !self.start_workers() {
            return;
        }
        let queued = self
            .work_tx
            .as_ref()
            .map(|tx| {
                tx.send(WorkItem {
                    url: url.to_string(),
                    key: key.clone(),
                })
                .is_ok()
            })
            .unwrap_or(false);

        self.slots.insert(
            url.to_string(),
            PosterSlot {
                key,
                state: if queued {
                    PosterState::Pending
                } else {
                    PosterState::Failed
                },
                path: None,
                tex: None,
            },
        );
    }

    pub fn state(&self, url: &str) -> Option<PosterState> {
        self.slots.get(url.trim()).map(|s| s.state)
    }

    pub fn texture(&self, url: &str) -> Option<&TextureHandle> {
        self.slots.get(url.trim()).and_then(|s| s.tex.as_ref())
    }

    /// Drain finished downloads and upload a bounded number of textures.
    pub fn poll(&mut self, ctx: &eg::Context) -> bool {
        let mut changed = false;
        let mut drained = 0usize;

        while drained < MAX_DONE_PER_FRAME {
            let Some(rx) = &self.done_rx else {
                break;
            };
            match rx.try_recv() {
                Ok(msg) => {
                    drained += 1;
                    changed = true;
                    let Some(slot) = self.slots.get_mut(&msg.url) else {
                        continue;
                    };
                    match msg.result {
                        Ok(path) => {
                            slot.path = Some(path);
                            slot.state = PosterState::Cached;
                        }
                        Err(e) => {
                            debug!("poster {} failed: {e}", msg.url);
                            slot.state = PosterState::Failed;
                        }
                    }
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }

        let mut uploads_left = MAX_UPLOADS_PER_FRAME;
        for slot in self.slots.values_mut() {
            if uploads_left == 0 {
                break;
            }
            if slot.state != PosterState::Cached {
                continue;
            }
            let Some(path) = slot.path.as_ref() else {
                continue;
            };
            match crate::app::gfx::load_texture_from_path(ctx, path, &slot.key) {
                Ok(tex) => {
                    slot.tex = Some(tex);
                    slot.state = PosterState::Ready;
                }
                Err(e) => {
                    debug!("poster upload failed: {e}");
                    slot.state = PosterState::Failed;
                }
            }
            uploads_left -= 1;
            changed = true;
        }

        changed
    }

    pub fn has_pending(&self) -> bool {
        self.slots
            .values()
            .any(|s| matches!(s.state, PosterState::Pending | PosterState::Cached))
    }
}
