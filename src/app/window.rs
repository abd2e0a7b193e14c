// src/app/window.rs
use std::sync::Arc;

use eframe::egui as eg;
use tracing::debug;

/// Where the window title goes. The egui context in the app, a recorder in tests.
pub trait TitleSink {
    fn set_title(&self, title: &str);
}

impl TitleSink for eg::Context {
    fn set_title(&self, title: &str) {
        self.send_viewport_cmd(eg::ViewportCommand::Title(title.to_string()));
    }
}

/// Holds the window title while alive and puts `restore` back on drop.
pub struct TitleGuard {
    sink: Arc<dyn TitleSink>,
    restore: String,
}

impl TitleGuard {
    pub fn set(sink: Arc<dyn TitleSink>, title: &str, restore: &str) -> Self {
        debug!(%title, "window title");
        sink.set_title(title);
        Self {
            sink,
            restore: restore.to_string(),
        }
    }
}

impl Drop for TitleGuard {
    fn drop(&mut self) {
        self.sink.set_title(&self.restore);
    }
}
