use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::backend::Backend;
use crate::files::PathKind;
use crate::loader::{is_width_bound, DecodedImage, LoadError, ScaleMode};

/// Scores at or above this keep an entry decoded.
pub const LOAD_THRESHOLD: f64 = 1.0;

/// Result of probing an entry's backing file. Once it leaves `Unchecked`
/// it is never probed again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Validity {
    Unchecked,
    Showable,
    Broken,
}

/// One image file: its path, whether it can be shown, its decoded pixels
/// (when resident) and the heat score that decides residency.
pub struct ImageEntry {
    path: PathBuf,
    score: f64,
    validity: Validity,
    original: Option<Rc<DecodedImage>>,
    /// Display-ready copy and the mode it was produced with.
    scaled: Option<(ScaleMode, Rc<DecodedImage>)>,
    backend: Rc<dyn Backend>,
}

impl ImageEntry {
    pub fn new(path: PathBuf, backend: Rc<dyn Backend>) -> Self {
        Self {
            path,
            score: 0.0,
            validity: Validity::Unchecked,
            original: None,
            scaled: None,
            backend,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }

    pub fn score(&self) -> f64 {
        self.score
    }

    pub fn validity(&self) -> Validity {
        self.validity
    }

    pub fn is_checked(&self) -> bool {
        self.validity != Validity::Unchecked
    }

    pub fn is_loaded(&self) -> bool {
        self.original.is_some()
    }

    pub fn original(&self) -> Option<&DecodedImage> {
        self.original.as_deref()
    }

    /// The image produced by the last [`render_for_display`](Self::render_for_display).
    pub fn display_image(&self) -> Option<&DecodedImage> {
        self.scaled.as_ref().map(|(_, image)| &**image)
    }

    /// Whether the file exists and decodes. Only the first call touches storage;
    /// it decodes the image, so the entry is left loaded when it succeeds.
    pub fn probe_showable(&mut self) -> bool {
        if self.validity == Validity::Unchecked {
            self.load();
        }
        self.validity == Validity::Showable
    }

    pub fn load(&mut self) -> bool {
        if self.original.is_some() {
            return true;
        }
        if self.validity == Validity::Broken {
            return false;
        }

        match self.read_pixels() {
            Ok(decoded) => {
                log::debug!(
                    "loaded {} ({}x{}, {} bytes)",
                    self.path.display(),
                    decoded.width,
                    decoded.height,
                    decoded.mem_size()
                );
                self.validity = Validity::Showable;
                self.original = Some(Rc::new(decoded));
                self.scaled = None;
                true
            }
            Err(e) => {
                log::warn!("{e}");
                self.validity = Validity::Broken;
                false
            }
        }
    }

    fn read_pixels(&self) -> Result<DecodedImage, LoadError> {
        match self.backend.path_kind(&self.path) {
            PathKind::File => self.backend.decode(&self.path),
            PathKind::Missing => Err(LoadError::Missing(self.path.clone())),
            PathKind::Directory | PathKind::Other => Err(LoadError::NotAFile(self.path.clone())),
        }
    }

    pub fn unload(&mut self) -> bool {
        if self.original.take().is_some() {
            log::debug!("unloaded {}", self.path.display());
        }
        self.scaled = None;
        true
    }

    /// Stores `value` clamped below at 0. Reaching 0 evicts the pixels,
    /// reaching [`LOAD_THRESHOLD`] decodes them (a failed decode is ignored).
    pub fn score_set(&mut self, value: f64) -> f64 {
        // NaN lands here too
        if !(value > 0.0) {
            self.score = 0.0;
            self.unload();
        } else {
            self.score = value;
            if value >= LOAD_THRESHOLD {
                self.load();
            }
        }
        self.score
    }

    pub fn score_add(&mut self, delta: f64) -> f64 {
        self.score_set(self.score + delta)
    }

    pub fn delete_backing_file(&mut self) -> bool {
        self.unload();
        if self.backend.path_kind(&self.path) != PathKind::File {
            log::warn!("cannot delete {}: not a regular file", self.path.display());
            return false;
        }
        match self.backend.remove_file(&self.path) {
            Ok(()) => {
                log::info!("deleted {}", self.path.display());
                self.validity = Validity::Broken;
                true
            }
            Err(e) => {
                log::warn!("cannot delete {}: {e}", self.path.display());
                false
            }
        }
    }

    /// Refreshes the display image for a `target` sized area. Returns whether
    /// the display image was replaced, so callers can skip redundant repaints.
    pub fn render_for_display(&mut self, target: (u32, u32), mode: ScaleMode) -> bool {
        if !self.probe_showable() || !self.load() {
            return false;
        }
        let Some(original) = self.original.clone() else {
            return false;
        };
        let (tw, th) = target;
        if tw == 0 || th == 0 {
            return false;
        }

        let source = (original.width, original.height);
        let current = match &self.scaled {
            Some((used, image)) if *used == mode => Some((image.width, image.height)),
            _ => None,
        };
        let stale = match (mode, current) {
            (_, None) => true,
            (ScaleMode::Fit, Some((w, h))) => {
                if is_width_bound(source, target) {
                    w != tw
                } else {
                    h != th
                }
            }
            (ScaleMode::Original, Some(size)) => size != source,
            (ScaleMode::Stretch, Some(size)) => size != target,
            (ScaleMode::FitHeight, Some((_, h))) => h != th,
            (ScaleMode::FitWidth, Some((w, _))) => w != tw,
        };
        if !stale {
            return false;
        }

        let image = match mode {
            ScaleMode::Original => original,
            _ => Rc::new(self.backend.scale(&original, target, mode)),
        };
        log::trace!(
            "rescaled {} to {}x{} ({})",
            self.path.display(),
            image.width,
            image.height,
            mode.label()
        );
        self.scaled = Some((mode, image));
        true
    }
}
