//! Load coordination: one background decode per navigation event, with at
//! most one committed result per navigation generation.
//!
//! Commit happens in the worker under the table and image locks. The check
//! is a generation comparison rather than raw index equality, so a stale
//! decode can never win just because the user navigated away and back to the
//! same index before it finished. The drained outcome only drives alerts,
//! view policies and the GPU upload on the frame loop.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::mpsc::SyncSender;

use tracing::{debug, warn};

use crate::context::ViewerContext;
use crate::decode::{self, DecodeOptions};
use crate::error::LoadError;
use crate::histogram;
use crate::scanner::FormatKind;

/// Everything a decode worker needs, captured at dispatch time.
#[derive(Debug, Clone)]
pub struct LoadRequest {
    pub path: PathBuf,
    pub index: usize,
    pub kind: FormatKind,
    /// Navigation generation this load was dispatched for.
    pub nav_gen: u64,
    /// Scan that produced the entry; flag writes are skipped once the table
    /// has been replaced.
    pub scan_id: u64,
    /// The file arrived via drag-and-drop rather than directory navigation.
    pub dropped: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct LoadOptions {
    pub parse_exif: bool,
    pub calculate_histograms: bool,
    pub max_gpu: u32,
}

/// Terminal state of one load, reported to the frame loop.
#[derive(Debug)]
pub enum LoadOutcome {
    Committed { index: usize },
    /// The decode finished fine but navigation had moved on. Not an error.
    Superseded { index: usize },
    Failed { index: usize, error: LoadError },
}

/// Dispatches a background load for `index` and makes it the current image.
///
/// Returns `false` without spawning when the index is out of range or a load
/// for it is already in flight. In the latter case the in-flight decode is
/// re-adopted as the current generation, so navigating back to a
/// still-loading entry does not orphan its result.
pub fn request_load(
    shared: &Arc<ViewerContext>,
    egui_ctx: &egui::Context,
    outcome_tx: &SyncSender<LoadOutcome>,
    index: usize,
    dropped: bool,
    options: LoadOptions,
) -> bool {
    let request = {
        let mut table = shared.table.lock().unwrap();
        if index >= table.len() {
            return false;
        }
        table.current = index;
        if table.entries[index].loading {
            table.nav_gen = table.entries[index].pending_gen;
            debug!(index, "load already in flight, re-adopted");
            return false;
        }
        table.nav_gen += 1;
        let nav_gen = table.nav_gen;
        let scan_id = table.scan_id;
        let entry = &mut table.entries[index];
        entry.loading = true;
        entry.pending_gen = nav_gen;
        LoadRequest {
            path: entry.path.clone(),
            index,
            kind: entry.kind,
            nav_gen,
            scan_id,
            dropped,
        }
    };

    debug!(
        index,
        nav_gen = request.nav_gen,
        dropped,
        path = %request.path.display(),
        "dispatching load"
    );

    let shared = Arc::clone(shared);
    let tx = outcome_tx.clone();
    let egui_ctx = egui_ctx.clone();
    std::thread::spawn(move || {
        let outcome = run_load(&shared, &request, &options);
        let _ = tx.send(outcome);
        egui_ctx.request_repaint();
    });
    true
}

/// Decodes and, if the navigation generation still matches, commits.
pub(crate) fn run_load(
    shared: &ViewerContext,
    request: &LoadRequest,
    options: &LoadOptions,
) -> LoadOutcome {
    let decode_options = DecodeOptions {
        parse_exif: options.parse_exif,
        max_gpu: options.max_gpu,
    };
    match decode::decode(&request.path, request.kind, &decode_options) {
        Ok(image) => commit(shared, request, options, image),
        Err(error) => {
            warn!(index = request.index, %error, "load failed");
            let mut table = shared.table.lock().unwrap();
            if request.scan_id == table.scan_id {
                if let Some(entry) = table.entries.get_mut(request.index) {
                    entry.loading = false;
                    entry.failed = true;
                }
            }
            LoadOutcome::Failed {
                index: request.index,
                error,
            }
        }
    }
}

fn commit(
    shared: &ViewerContext,
    request: &LoadRequest,
    options: &LoadOptions,
    image: crate::decode::DecodedImage,
) -> LoadOutcome {
    // Histograms only make sense for stills; animation frames churn too fast.
    let hist = (options.calculate_histograms && !image.is_animated())
        .then(|| image.frame(0).map(histogram::compute))
        .flatten();

    let mut table = shared.table.lock().unwrap();
    if request.nav_gen != table.nav_gen {
        if request.scan_id == table.scan_id {
            if let Some(entry) = table.entries.get_mut(request.index) {
                entry.loading = false;
            }
        }
        debug!(index = request.index, "decode superseded, discarding");
        return LoadOutcome::Superseded {
            index: request.index,
        };
    }

    if let Some(entry) = table.entries.get_mut(request.index) {
        entry.loading = false;
        entry.failed = false;
    }

    let previous = {
        let mut slot = shared.image.lock().unwrap();
        slot.install(image, request.index, hist)
    };
    drop(table);
    // The old buffer is released only now, after the new one is in place.
    drop(previous);

    LoadOutcome::Committed {
        index: request.index,
    }
}
