use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::files::{self, PathKind};
use crate::loader::{self, DecodedImage, LoadError, ScaleMode};

/// Platform services the core depends on. Entries, collections and the
/// navigator never touch the filesystem or a codec except through this.
pub trait Backend {
    fn path_kind(&self, path: &Path) -> PathKind;

    fn list_dir(&self, dir: &Path) -> io::Result<Vec<PathBuf>>;

    fn decode(&self, path: &Path) -> Result<DecodedImage, LoadError>;

    fn scale(&self, image: &DecodedImage, target: (u32, u32), mode: ScaleMode) -> DecodedImage;

    fn remove_file(&self, path: &Path) -> io::Result<()>;
}

/// The real filesystem and the `image` crate codecs.
#[derive(Debug, Default, Clone, Copy)]
pub struct DiskBackend;

impl Backend for DiskBackend {
    fn path_kind(&self, path: &Path) -> PathKind {
        files::probe_path(path)
    }

    fn list_dir(&self, dir: &Path) -> io::Result<Vec<PathBuf>> {
        files::list_dir(dir)
    }

    fn decode(&self, path: &Path) -> Result<DecodedImage, LoadError> {
        loader::decode_image(path)
    }

    fn scale(&self, image: &DecodedImage, target: (u32, u32), mode: ScaleMode) -> DecodedImage {
        loader::scale_image(image, target, mode)
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        fs::remove_file(path)
    }
}
