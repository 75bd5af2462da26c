//! Best-effort resolution of the file order the user sees in their desktop
//! file manager.
//!
//! The shell query itself is injected so the reordering logic stays testable;
//! every failure mode (no query source, no matching folder view, path
//! mismatch) silently leaves the table in scan order.

use std::path::{Path, PathBuf};
use std::sync::atomic::Ordering;

use tracing::debug;

use crate::context::ViewerContext;

/// Source of the user-visible item order for a directory.
pub trait ShellQuery {
    /// Full paths of `dir`'s items in display order, or `None` when the
    /// shell has no open view of `dir` (or no such API exists here).
    fn folder_items(&self, dir: &Path) -> Option<Vec<PathBuf>>;
}

/// Default provider. No portable desktop API exposes a folder view's order,
/// so this reports unavailable and the table keeps scan order.
pub struct SystemShell;

impl ShellQuery for SystemShell {
    fn folder_items(&self, dir: &Path) -> Option<Vec<PathBuf>> {
        debug!(dir = %dir.display(), "no shell ordering source on this platform");
        None
    }
}

/// Reorders the table to match the shell's view of `base_dir`.
///
/// Returns `true` when the table was reordered. Runs synchronously on the
/// scanning thread; overlapping invocations are skipped via the sort gate.
pub fn resolve(
    shared: &ViewerContext,
    query: &dyn ShellQuery,
    base_dir: &Path,
    current_name: Option<&str>,
) -> bool {
    let Ok(_gate) = shared.sort_gate.try_lock() else {
        debug!("shell-order resolution already in progress, skipping");
        return false;
    };
    shared.sorting.store(true, Ordering::SeqCst);
    let reordered = resolve_locked(shared, query, base_dir, current_name);
    shared.sorting.store(false, Ordering::SeqCst);
    reordered
}

fn resolve_locked(
    shared: &ViewerContext,
    query: &dyn ShellQuery,
    base_dir: &Path,
    current_name: Option<&str>,
) -> bool {
    let Some(items) = query.folder_items(base_dir) else {
        return false;
    };
    // A view of some other directory is not usable.
    if !items.iter().any(|p| p.parent() == Some(base_dir)) {
        debug!("shell folder view does not match the open directory");
        return false;
    }

    let mut table = shared.table.lock().unwrap();
    for entry in table.entries.iter_mut() {
        entry.shell_index = items.iter().position(|p| p == &entry.path);
    }
    // Unresolved entries keep their relative scan order at the end.
    table
        .entries
        .sort_by_key(|e| e.shell_index.unwrap_or(usize::MAX));

    if let Some(name) = current_name {
        if let Some(idx) = table.entries.iter().position(|e| e.name == name) {
            table.current = idx;
        }
    }
    for entry in table.entries.iter_mut() {
        entry.loading = false;
        entry.failed = false;
    }
    debug!(count = table.len(), "table reordered to shell order");
    true
}
