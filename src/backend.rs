use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
    sync::{
        mpsc::{Receiver, Sender},
        Arc,
    },
};

use color_eyre::eyre::{self, WrapErr};
use starchart::{
    bodies::{CelestialObject, SystemData},
    layout::{LayoutEngine, LayoutMap},
    viewmode::ViewModeConfig,
};
use tracing::info;

use crate::i18n;

pub enum HReq {
    LoadSystem(PathBuf),
    ComputeLayout {
        generation: u64,
        objects: Arc<Vec<CelestialObject>>,
        config: Arc<ViewModeConfig>,
    },
}

pub enum HRes {
    LoadedSystem(SystemData),
    ComputedLayout {
        generation: u64,
        layouts: Arc<LayoutMap>,
    },
}

/// The handler thread: system file loading and layout computation off
/// the render thread. Layout responses carry their request generation;
/// the UI side drops any that a newer request has superseded.
#[allow(clippy::needless_pass_by_value)]
pub fn handler_thread(
    rx: Receiver<(usize, egui::Context, HReq)>,
    tx: Sender<(usize, eyre::Result<HRes>)>,
) {
    let mut engine = LayoutEngine::new();
    while let Ok((txi, ctx, req)) = rx.recv() {
        let res = match req {
            HReq::LoadSystem(path) => {
                // A fresh system invalidates every cached layout.
                engine.clear();
                load_system(&path)
                    .wrap_err_with(|| i18n!("error-load-system"))
                    .map(HRes::LoadedSystem)
            }
            HReq::ComputeLayout {
                generation,
                objects,
                config,
            } => {
                let layouts = engine.layout(&objects, &config);
                Ok(HRes::ComputedLayout {
                    generation,
                    layouts,
                })
            }
        };
        if tx.send((txi, res)).is_err() {
            break;
        }
        ctx.request_repaint();
    }
}

fn load_system(path: &Path) -> eyre::Result<SystemData> {
    let file = File::open(path).wrap_err_with(|| format!("opening {}", path.display()))?;
    let system: SystemData = serde_json::from_reader(BufReader::new(file))
        .wrap_err_with(|| format!("parsing {}", path.display()))?;
    system.validate()?;
    info!(
        system = %system.id,
        objects = system.objects.len(),
        "loaded system file"
    );
    Ok(system)
}
