// src/main.rs
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use popcorn::config::{load_config, RendererKind};

fn pick_renderer(kind: Option<RendererKind>) -> eframe::Renderer {
    match kind {
        Some(RendererKind::Glow) => eframe::Renderer::Glow,
        Some(RendererKind::Wgpu) => eframe::Renderer::Wgpu,
        None => {
            // Default: Windows = WGPU (DX12), Others = Glow (GL)
            #[cfg(target_os = "windows")]
            { eframe::Renderer::Wgpu }
            #[cfg(not(target_os = "windows"))]
            { eframe::Renderer::Glow }
        }
    }
}

fn main() -> eframe::Result<()> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init();

    let config = load_config();
    info!("data dir: {}", config.data_dir.display());

    let options = eframe::NativeOptions {
        renderer: pick_renderer(config.renderer),
        multisampling: 0,
        viewport: egui::ViewportBuilder::default()
            .with_title(popcorn::app::APP_TITLE)
            .with_inner_size([1100.0, 760.0]),
        ..Default::default()
    };

    match eframe::run_native(
        popcorn::app::APP_TITLE,
        options,
        Box::new(move |cc| Ok(Box::new(popcorn::app::PopcornApp::new(cc, config)))),
    ) {
        Ok(_) => Ok(()),
        Err(e) => {
            error!("eframe failed to start: {e:?}");
            error!("Hint: set \"renderer\" to \"glow\" or \"wgpu\" in config.json.");
            Err(e)
        }
    }
}
