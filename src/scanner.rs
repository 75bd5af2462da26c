use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::ScanError;

/// Decode path chosen for a file, derived from its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormatKind {
    #[default]
    Unknown,
    StaticRaster,
    Gif,
    Webp,
    Ppm,
    /// Everything else (RAW, HEIF, TIFF, ...) goes through the installed
    /// codec stack and gets an EXIF parse attempt.
    GenericCodec,
}

static RASTER_EXTS: &[&str] = &["png", "bmp", "dib", "tga", "qoi"];

static GENERIC_EXTS: &[&str] = &[
    "jpg", "jpeg", "jpe", "jfif", "tif", "tiff", "ico", "cur", "avif", "dds", "exif", "hdr",
    // RAW formats, decoded through rawler
    "3fr", "ari", "arw", "cr2", "cr3", "crw", "dcr", "dng", "erf", "iiq", "kdc", "mef", "mos",
    "mrw", "nef", "nrw", "orf", "ori", "pef", "raf", "raw", "rw2", "rwl", "sr2", "srf", "srw",
    "x3f",
];

static RAW_EXTS: &[&str] = &[
    "3fr", "ari", "arw", "cr2", "cr3", "crw", "dcr", "dng", "erf", "iiq", "kdc", "mef", "mos",
    "mrw", "nef", "nrw", "orf", "ori", "pef", "raf", "raw", "rw2", "rwl", "sr2", "srf", "srw",
    "x3f",
];

impl FormatKind {
    pub fn from_extension(ext: &str) -> FormatKind {
        let ext = ext.to_ascii_lowercase();
        match ext.as_str() {
            "gif" => FormatKind::Gif,
            "webp" => FormatKind::Webp,
            "ppm" => FormatKind::Ppm,
            e if RASTER_EXTS.contains(&e) => FormatKind::StaticRaster,
            e if GENERIC_EXTS.contains(&e) => FormatKind::GenericCodec,
            _ => FormatKind::Unknown,
        }
    }
}

/// Returns `true` if the extension belongs to a RAW format rawler can open.
pub fn is_raw_extension(ext: &str) -> bool {
    RAW_EXTS.iter().any(|known| ext.eq_ignore_ascii_case(known))
}

/// One discovered file in the open directory.
#[derive(Debug, Clone)]
pub struct FileEntry {
    pub path: PathBuf,
    pub name: String,
    pub kind: FormatKind,
    /// Position reported by the desktop shell, `None` until resolved.
    pub shell_index: Option<usize>,
    pub loading: bool,
    pub failed: bool,
    pub thumb_ready: bool,
    /// Navigation generation of the decode currently in flight for this entry.
    pub pending_gen: u64,
    // Per-file display memory, in-memory only.
    pub last_pos: (f32, f32),
    pub last_scale: f32,
    pub manually_scaled: bool,
}

impl FileEntry {
    fn new(path: PathBuf, name: String, kind: FormatKind) -> Self {
        Self {
            path,
            name,
            kind,
            shell_index: None,
            loading: false,
            failed: false,
            thumb_ready: false,
            pending_gen: 0,
            last_pos: (0.0, 0.0),
            last_scale: 1.0,
            manually_scaled: false,
        }
    }
}

/// Ordered table of the files in the open directory, plus the cursor into it.
///
/// Replaced wholesale on every successful scan. `scan_id` identifies the scan
/// that produced the table; `nav_gen` increases on every navigation and is
/// the generation a decode result must match to be committed.
#[derive(Debug, Default)]
pub struct DirectoryTable {
    pub entries: Vec<FileEntry>,
    pub current: usize,
    pub scan_id: u64,
    pub nav_gen: u64,
}

impl DirectoryTable {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn current_entry(&self) -> Option<&FileEntry> {
        self.entries.get(self.current)
    }
}

/// Result of resolving and enumerating a path, ready to become the new table.
#[derive(Debug)]
pub struct ScanResult {
    pub entries: Vec<FileEntry>,
    pub current: usize,
    pub base_dir: PathBuf,
    pub requested_name: Option<String>,
    pub opened_directory: bool,
}

fn extension_of(path: &Path) -> Option<String> {
    path.extension().map(|e| e.to_string_lossy().into_owned())
}

/// Resolves `path` (file or directory) and enumerates its directory into an
/// ordered list of supported files.
///
/// Unrecognized extensions are skipped, except when the skipped entry is the
/// requested file itself, which fails the whole scan with
/// [`ScanError::UnsupportedFormat`]. The current index points at the requested
/// file when present, index 0 otherwise.
pub fn scan(path: &Path) -> Result<ScanResult, ScanError> {
    let meta =
        std::fs::metadata(path).map_err(|_| ScanError::InvalidPath(path.to_path_buf()))?;

    let (base_dir, requested_name, opened_directory) = if meta.is_dir() {
        (path.to_path_buf(), None, true)
    } else {
        let parent = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let name = path.file_name().map(|n| n.to_string_lossy().into_owned());
        (parent, name, false)
    };

    let read_dir =
        std::fs::read_dir(&base_dir).map_err(|_| ScanError::InvalidPath(base_dir.clone()))?;

    let mut entries = Vec::new();
    for entry in read_dir.flatten() {
        let entry_path = entry.path();
        if !entry_path.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        let ext = extension_of(&entry_path);
        let kind = ext
            .as_deref()
            .map(FormatKind::from_extension)
            .unwrap_or(FormatKind::Unknown);
        if kind == FormatKind::Unknown {
            if requested_name.as_deref() == Some(name.as_str()) {
                return Err(ScanError::UnsupportedFormat(ext.unwrap_or_default()));
            }
            continue;
        }
        entries.push(FileEntry::new(entry_path, name, kind));
    }

    if entries.is_empty() {
        return Err(ScanError::Empty(base_dir));
    }

    let current = requested_name
        .as_deref()
        .and_then(|name| entries.iter().position(|e| e.name == name))
        .unwrap_or(0);

    debug!(
        dir = %base_dir.display(),
        count = entries.len(),
        current,
        "scanned directory"
    );

    Ok(ScanResult {
        entries,
        current,
        base_dir,
        requested_name,
        opened_directory,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn touch(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, b"data").expect("failed to create test file");
        path
    }

    #[test]
    fn classifies_extensions_case_insensitively() {
        assert_eq!(FormatKind::from_extension("GIF"), FormatKind::Gif);
        assert_eq!(FormatKind::from_extension("WebP"), FormatKind::Webp);
        assert_eq!(FormatKind::from_extension("PPM"), FormatKind::Ppm);
        assert_eq!(FormatKind::from_extension("png"), FormatKind::StaticRaster);
        assert_eq!(FormatKind::from_extension("JPEG"), FormatKind::GenericCodec);
        assert_eq!(FormatKind::from_extension("NEF"), FormatKind::GenericCodec);
        assert_eq!(FormatKind::from_extension("xyz"), FormatKind::Unknown);
    }

    #[test]
    fn scan_keeps_only_supported_files() {
        let tmp = tempdir().expect("tempdir");
        let a = touch(tmp.path(), "a.png");
        touch(tmp.path(), "b.xyz");
        touch(tmp.path(), "c.gif");
        touch(tmp.path(), "notes.txt");

        let result = scan(&a).expect("scan should succeed");
        assert_eq!(result.entries.len(), 2);
        assert!(result.entries.iter().all(|e| e.kind != FormatKind::Unknown));
    }

    #[test]
    fn scan_preserves_enumeration_order_relative_to_skips() {
        let tmp = tempdir().expect("tempdir");
        for name in ["a.png", "b.xyz", "c.gif", "d.doc", "e.webp"] {
            touch(tmp.path(), name);
        }

        let result = scan(tmp.path()).expect("scan should succeed");
        let mut names: Vec<_> = result.entries.iter().map(|e| e.name.clone()).collect();
        names.sort();
        assert_eq!(names, ["a.png", "c.gif", "e.webp"]);
    }

    #[test]
    fn scan_locates_the_requested_file() {
        let tmp = tempdir().expect("tempdir");
        touch(tmp.path(), "a.png");
        let b = touch(tmp.path(), "b.png");
        touch(tmp.path(), "c.png");

        let result = scan(&b).expect("scan should succeed");
        assert_eq!(result.entries[result.current].name, "b.png");
        assert_eq!(result.requested_name.as_deref(), Some("b.png"));
        assert!(!result.opened_directory);
    }

    #[test]
    fn scan_of_directory_defaults_to_index_zero() {
        let tmp = tempdir().expect("tempdir");
        touch(tmp.path(), "a.png");
        touch(tmp.path(), "b.png");

        let result = scan(tmp.path()).expect("scan should succeed");
        assert_eq!(result.current, 0);
        assert!(result.opened_directory);
        assert!(result.requested_name.is_none());
    }

    #[test]
    fn requesting_an_unsupported_file_fails_and_names_the_extension() {
        let tmp = tempdir().expect("tempdir");
        touch(tmp.path(), "a.png");
        let b = touch(tmp.path(), "b.xyz");

        let err = scan(&b).expect_err("scan should fail");
        match err {
            ScanError::UnsupportedFormat(ext) => assert_eq!(ext, "xyz"),
            other => panic!("expected UnsupportedFormat, got {other:?}"),
        }
    }

    #[test]
    fn nonexistent_path_is_invalid() {
        let err = scan(Path::new("/definitely/not/here.png")).expect_err("scan should fail");
        assert!(matches!(err, ScanError::InvalidPath(_)));
    }

    #[test]
    fn directory_without_supported_files_is_empty() {
        let tmp = tempdir().expect("tempdir");
        touch(tmp.path(), "readme.txt");

        let err = scan(tmp.path()).expect_err("scan should fail");
        assert!(matches!(err, ScanError::Empty(_)));
    }

    #[test]
    fn requesting_a_missing_file_is_an_invalid_path() {
        let tmp = tempdir().expect("tempdir");
        touch(tmp.path(), "a.png");
        let ghost = tmp.path().join("b.png");

        let err = scan(&ghost).expect_err("missing file is an invalid path");
        assert!(matches!(err, ScanError::InvalidPath(_)));
    }
}
