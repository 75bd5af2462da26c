//! Background thumbnail builder and the fixed-capacity atlas it fills.
//!
//! The builder walks outward from the current index so thumbnails closest to
//! the viewing position materialize first. Cells are written straight into
//! the atlas texture as partial updates; one atlas cell per directory index,
//! capped at the atlas capacity. Single-file failures are skipped silently.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::Ordering;

use tracing::debug;

use crate::context::ViewerContext;

pub const CELL_DIM: usize = 128;
pub const ATLAS_DIM: usize = 4096;

/// Bookkeeping for the square thumbnail texture: which cells hold a finished
/// thumbnail and where each index lands. The texture itself is allocated by
/// the frame loop and attached once.
#[derive(Debug)]
pub struct ThumbnailAtlas {
    texture: Option<egui::TextureId>,
    ready: Vec<bool>,
}

impl ThumbnailAtlas {
    pub fn new() -> Self {
        Self {
            texture: None,
            ready: vec![false; Self::capacity()],
        }
    }

    pub const fn cells_per_row() -> usize {
        ATLAS_DIM / CELL_DIM
    }

    /// Hard cap on how many directory entries get thumbnails.
    pub const fn capacity() -> usize {
        Self::cells_per_row() * Self::cells_per_row()
    }

    pub fn attach(&mut self, texture: egui::TextureId) {
        self.texture = Some(texture);
        if self.ready.len() != Self::capacity() {
            self.ready = vec![false; Self::capacity()];
        }
    }

    pub fn texture(&self) -> Option<egui::TextureId> {
        self.texture
    }

    /// Forget all cells; called when a new directory replaces the table.
    pub fn reset(&mut self) {
        self.ready.fill(false);
    }

    /// Top-left pixel of the cell for `index`, `None` beyond capacity.
    pub fn cell_origin(index: usize) -> Option<[usize; 2]> {
        if index >= Self::capacity() {
            return None;
        }
        let x = (index % Self::cells_per_row()) * CELL_DIM;
        let y = (index / Self::cells_per_row()) * CELL_DIM;
        Some([x, y])
    }

    /// Normalized texture coordinates of the cell for `index`.
    pub fn uv_rect(index: usize) -> Option<egui::Rect> {
        let [x, y] = Self::cell_origin(index)?;
        let dim = ATLAS_DIM as f32;
        Some(egui::Rect::from_min_max(
            egui::pos2(x as f32 / dim, y as f32 / dim),
            egui::pos2(
                (x + CELL_DIM) as f32 / dim,
                (y + CELL_DIM) as f32 / dim,
            ),
        ))
    }

    pub fn mark_ready(&mut self, index: usize) -> bool {
        match self.ready.get_mut(index) {
            Some(slot) => {
                *slot = true;
                true
            }
            None => false,
        }
    }

    pub fn is_ready(&self, index: usize) -> bool {
        self.ready.get(index).copied().unwrap_or(false)
    }
}

/// Visits `current, current-1, current+1, current-2, ...` within `0..count`.
pub struct OutwardWalk {
    up: i64,
    down: i64,
    count: i64,
    upward: bool,
}

impl OutwardWalk {
    pub fn new(current: usize, count: usize) -> Self {
        Self {
            up: current as i64,
            down: current as i64 - 1,
            count: count as i64,
            upward: true,
        }
    }
}

impl Iterator for OutwardWalk {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        loop {
            if self.up >= self.count && self.down < 0 {
                return None;
            }
            if self.upward {
                self.upward = false;
                if self.up < self.count {
                    let v = self.up;
                    self.up += 1;
                    return Some(v as usize);
                }
            } else {
                self.upward = true;
                if self.down >= 0 {
                    let v = self.down;
                    self.down -= 1;
                    return Some(v as usize);
                }
            }
        }
    }
}

/// Spawns the long-lived builder for the scan identified by `scan_id`.
pub fn start(
    shared: Arc<ViewerContext>,
    egui_ctx: egui::Context,
    scan_id: u64,
) -> std::thread::JoinHandle<()> {
    std::thread::spawn(move || build(&shared, &egui_ctx, scan_id))
}

pub(crate) fn build(shared: &ViewerContext, egui_ctx: &egui::Context, scan_id: u64) {
    let (current, count) = {
        let table = shared.table.lock().unwrap();
        if table.scan_id != scan_id {
            return;
        }
        (table.current, table.len())
    };
    debug!(scan_id, count, "thumbnail builder started");

    for index in OutwardWalk::new(current, count) {
        // A newer scan owns the atlas now; bow out between files.
        if shared.scan_gen.load(Ordering::SeqCst) != scan_id {
            debug!(scan_id, "thumbnail builder superseded by a newer scan");
            return;
        }
        if index >= ThumbnailAtlas::capacity() {
            continue;
        }

        let Some(path) = ({
            let table = shared.table.lock().unwrap();
            (table.scan_id == scan_id)
                .then(|| table.entries.get(index).map(|e| e.path.clone()))
                .flatten()
        }) else {
            return;
        };

        let Some(cell) = render_cell(&path) else {
            continue;
        };

        {
            let mut atlas = shared.atlas.lock().unwrap();
            if shared.scan_gen.load(Ordering::SeqCst) != scan_id {
                return;
            }
            let Some(texture) = atlas.texture() else {
                return;
            };
            let Some(origin) = ThumbnailAtlas::cell_origin(index) else {
                continue;
            };
            let image =
                egui::ColorImage::from_rgba_unmultiplied([CELL_DIM, CELL_DIM], &cell);
            egui_ctx.tex_manager().write().set(
                texture,
                egui::epaint::ImageDelta::partial(origin, image, egui::TextureOptions::LINEAR),
            );
            atlas.mark_ready(index);
        }
        {
            let mut table = shared.table.lock().unwrap();
            if table.scan_id == scan_id {
                if let Some(entry) = table.entries.get_mut(index) {
                    entry.thumb_ready = true;
                }
            }
        }
        egui_ctx.request_repaint();
    }
    debug!(scan_id, "thumbnail builder finished");
}

/// Decodes one file down to a square atlas cell: embedded preview when the
/// codec has one, full decode otherwise, then center-crop and scale.
fn render_cell(path: &Path) -> Option<Vec<u8>> {
    let img = crate::decode::generic::open_preview(path)?;
    let (w, h) = (img.width(), img.height());
    if w == 0 || h == 0 {
        return None;
    }
    let square = w.min(h);
    let cropped = img.crop_imm((w - square) / 2, (h - square) / 2, square, square);
    let thumb = cropped.thumbnail_exact(CELL_DIM as u32, CELL_DIM as u32);
    Some(thumb.to_rgba8().into_raw())
}
