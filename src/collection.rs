use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::backend::Backend;
use crate::entry::ImageEntry;
use crate::files::{is_image_file, PathKind};

/// Walks `start` by `offset` single steps over `0..len`, wrapping past either
/// end. Stepping (rather than modular arithmetic) is intentional: offsets in
/// use are small and the boundary behaviour for tiny lengths must not change.
pub fn step_wrapped(start: usize, len: usize, offset: isize) -> usize {
    if len <= 1 || offset == 0 {
        return start;
    }
    let mut idx = start;
    if offset < 0 {
        for _ in 0..offset.unsigned_abs() {
            idx = if idx == 0 { len - 1 } else { idx - 1 };
        }
    } else {
        for _ in 0..offset {
            idx += 1;
            if idx >= len {
                idx = 0;
            }
        }
    }
    idx
}

/// The images of one directory (or a single file) plus a cursor.
pub struct ImageCollection {
    source: PathBuf,
    entries: Vec<ImageEntry>,
    cursor: usize,
    /// `None` until the first `is_showable` scan.
    showable: Option<bool>,
}

impl ImageCollection {
    /// Builds a collection from a directory (supported extensions only, in
    /// listing order) or from a single file. Missing paths give an empty,
    /// unshowable collection.
    pub fn open(source: &Path, backend: &Rc<dyn Backend>) -> Self {
        let paths: Vec<PathBuf> = match backend.path_kind(source) {
            PathKind::Directory => match backend.list_dir(source) {
                Ok(listing) => listing.into_iter().filter(|p| is_image_file(p)).collect(),
                Err(e) => {
                    log::warn!("cannot list {}: {e}", source.display());
                    Vec::new()
                }
            },
            PathKind::File => vec![source.to_path_buf()],
            PathKind::Missing | PathKind::Other => {
                log::warn!("{} is neither a directory nor a file", source.display());
                Vec::new()
            }
        };

        let showable = if paths.is_empty() { Some(false) } else { None };
        let entries = paths
            .into_iter()
            .map(|p| ImageEntry::new(p, Rc::clone(backend)))
            .collect();

        Self {
            source: source.to_path_buf(),
            entries,
            cursor: 0,
            showable,
        }
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn entries(&self) -> &[ImageEntry] {
        &self.entries
    }

    pub fn entries_mut(&mut self) -> std::slice::IterMut<'_, ImageEntry> {
        self.entries.iter_mut()
    }

    pub fn entry_mut(&mut self, index: usize) -> Option<&mut ImageEntry> {
        self.entries.get_mut(index)
    }

    pub fn offset_index(&self, offset: isize) -> usize {
        step_wrapped(self.cursor, self.entries.len(), offset)
    }

    /// Finds the first showable entry and parks the cursor on it. The answer
    /// is cached; later changes to the entries are not rescanned.
    pub fn is_showable(&mut self) -> bool {
        if let Some(showable) = self.showable {
            return showable;
        }
        let first = self.entries.iter_mut().position(|e| e.probe_showable());
        if let Some(idx) = first {
            self.cursor = idx;
        }
        self.showable = Some(first.is_some());
        first.is_some()
    }

    pub fn entry_at(&self, offset: isize) -> Option<&ImageEntry> {
        self.entries.get(self.offset_index(offset))
    }

    pub fn move_by(&mut self, offset: isize) -> Option<&mut ImageEntry> {
        self.cursor = self.offset_index(offset);
        self.entries.get_mut(self.cursor)
    }

    pub fn jump_to_start(&mut self) -> Option<&mut ImageEntry> {
        self.cursor = 0;
        self.entries.get_mut(self.cursor)
    }

    pub fn jump_to_end(&mut self) -> Option<&mut ImageEntry> {
        self.cursor = self.entries.len().saturating_sub(1);
        self.entries.get_mut(self.cursor)
    }

    pub fn current(&self) -> Option<&ImageEntry> {
        self.entries.get(self.cursor)
    }

    pub fn current_mut(&mut self) -> Option<&mut ImageEntry> {
        self.entries.get_mut(self.cursor)
    }

    /// Drops the current entry. The cursor keeps its index, wrapping to the
    /// first entry when the last one was removed.
    pub fn remove_current(&mut self) -> Option<ImageEntry> {
        if self.entries.is_empty() {
            return None;
        }
        let removed = self.entries.remove(self.cursor);
        if self.cursor >= self.entries.len() {
            self.cursor = 0;
        }
        Some(removed)
    }
}
