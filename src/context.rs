use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use crate::decode::DecodedImage;
use crate::histogram::Histogram;
use crate::metadata::ImageMetadata;
use crate::scanner::DirectoryTable;
use crate::thumbs::ThumbnailAtlas;

/// Fallback GPU texture size limit when the backend does not report one.
pub const DEFAULT_MAX_GPU: u32 = 16384;

/// The one live decoded image plus everything derived from it at commit
/// time. Swapped transactionally by the load worker; the previous image is
/// dropped as part of the swap.
#[derive(Debug, Default)]
pub struct ImageSlot {
    pub image: Option<DecodedImage>,
    pub histogram: Option<Histogram>,
    /// Directory index the image was committed for.
    pub index: usize,
    /// Set by the committing worker, cleared by the frame loop once the
    /// buffer has been handed to the GPU.
    pub upload_pending: bool,
}

impl ImageSlot {
    /// Installs a freshly decoded image and returns the one it replaces so
    /// the caller controls when the old buffer is dropped.
    pub fn install(
        &mut self,
        image: DecodedImage,
        index: usize,
        histogram: Option<Histogram>,
    ) -> Option<DecodedImage> {
        self.histogram = histogram;
        self.index = index;
        self.upload_pending = true;
        self.image.replace(image)
    }
}

/// All state shared between the frame loop and the background workers.
/// Created once at startup and passed explicitly to every component.
///
/// Lock order: `table` before `image`. `atlas` and `sort_gate` are
/// independent and never held across a blocking decode.
pub struct ViewerContext {
    pub table: Mutex<DirectoryTable>,
    pub image: Mutex<ImageSlot>,
    pub atlas: Mutex<ThumbnailAtlas>,
    /// Excludes overlapping shell-order resolutions.
    pub sort_gate: Mutex<()>,
    /// True while a resolution is rewriting the table; navigation waits it out.
    pub sorting: AtomicBool,
    /// Bumped on every accepted scan; the thumbnail builder compares against
    /// it once per file and exits when a newer scan took over.
    pub scan_gen: AtomicU64,
    pub max_gpu: u32,
}

impl ViewerContext {
    pub fn new(max_gpu: u32) -> Arc<Self> {
        Arc::new(Self {
            table: Mutex::new(DirectoryTable::default()),
            image: Mutex::new(ImageSlot::default()),
            atlas: Mutex::new(ThumbnailAtlas::new()),
            sort_gate: Mutex::new(()),
            sorting: AtomicBool::new(false),
            scan_gen: AtomicU64::new(0),
            max_gpu,
        })
    }

    pub fn file_count(&self) -> usize {
        self.table.lock().unwrap().len()
    }

    pub fn current_index(&self) -> usize {
        self.table.lock().unwrap().current
    }

    pub fn current_file_name(&self) -> Option<String> {
        self.table
            .lock()
            .unwrap()
            .current_entry()
            .map(|e| e.name.clone())
    }

    /// `(loading, failed)` of the current entry.
    pub fn current_flags(&self) -> (bool, bool) {
        self.table
            .lock()
            .unwrap()
            .current_entry()
            .map(|e| (e.loading, e.failed))
            .unwrap_or((false, false))
    }

    pub fn is_sorting(&self) -> bool {
        self.sorting.load(Ordering::SeqCst)
    }

    pub fn histogram_snapshot(&self) -> Option<Histogram> {
        self.image.lock().unwrap().histogram.clone()
    }

    pub fn metadata_snapshot(&self) -> Option<ImageMetadata> {
        self.image
            .lock()
            .unwrap()
            .image
            .as_ref()
            .and_then(|img| img.metadata.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::DecodedImage;

    #[test]
    fn install_returns_the_previous_image() {
        let mut slot = ImageSlot::default();
        assert!(
            slot.install(DecodedImage::from_rgba(1, 1, vec![0; 4]), 3, None)
                .is_none()
        );
        assert!(slot.upload_pending);
        assert_eq!(slot.index, 3);

        let old = slot.install(DecodedImage::from_rgba(2, 2, vec![0; 16]), 4, None);
        assert_eq!(old.map(|i| (i.width, i.height)), Some((1, 1)));
        assert_eq!(slot.index, 4);
    }

    #[test]
    fn accessors_on_an_empty_context() {
        let ctx = ViewerContext::new(DEFAULT_MAX_GPU);
        assert_eq!(ctx.file_count(), 0);
        assert_eq!(ctx.current_index(), 0);
        assert_eq!(ctx.current_file_name(), None);
        assert_eq!(ctx.current_flags(), (false, false));
        assert!(ctx.histogram_snapshot().is_none());
    }
}
