//! In-memory [`Backend`] for unit tests.

use std::cell::{Cell, RefCell};
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::backend::Backend;
use crate::files::PathKind;
use crate::loader::{scaled_dimensions, DecodedImage, LoadError, ScaleMode};

enum FakeFile {
    Image(u32, u32),
    Corrupt,
}

#[derive(Default)]
pub struct FakeBackend {
    dirs: RefCell<Vec<PathBuf>>,
    files: RefCell<Vec<(PathBuf, FakeFile)>>,
    deny_delete: Cell<bool>,
    pub decode_calls: Cell<usize>,
    pub scale_calls: Cell<usize>,
}

impl FakeBackend {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub fn handle(self: &Rc<Self>) -> Rc<dyn Backend> {
        Rc::clone(self) as Rc<dyn Backend>
    }

    pub fn add_dir(&self, path: &str) {
        self.dirs.borrow_mut().push(PathBuf::from(path));
    }

    pub fn add_image(&self, path: &str, width: u32, height: u32) {
        self.files
            .borrow_mut()
            .push((PathBuf::from(path), FakeFile::Image(width, height)));
    }

    pub fn add_corrupt(&self, path: &str) {
        self.files.borrow_mut().push((PathBuf::from(path), FakeFile::Corrupt));
    }

    /// A directory holding `count` images named `000.png`, `001.png`, ...
    pub fn add_gallery(&self, dir: &str, count: usize) {
        self.add_dir(dir);
        for i in 0..count {
            self.add_image(&format!("{dir}/{i:03}.png"), 64, 48);
        }
    }

    pub fn deny_delete(&self) {
        self.deny_delete.set(true);
    }

    pub fn exists(&self, path: &str) -> bool {
        self.files.borrow().iter().any(|(p, _)| p == Path::new(path))
    }
}

impl Backend for FakeBackend {
    fn path_kind(&self, path: &Path) -> PathKind {
        if self.dirs.borrow().iter().any(|d| d == path) {
            PathKind::Directory
        } else if self.files.borrow().iter().any(|(p, _)| p == path) {
            PathKind::File
        } else {
            PathKind::Missing
        }
    }

    fn list_dir(&self, dir: &Path) -> io::Result<Vec<PathBuf>> {
        if !self.dirs.borrow().iter().any(|d| d == dir) {
            return Err(io::Error::new(io::ErrorKind::NotFound, "no such directory"));
        }
        let dirs = self.dirs.borrow();
        let files = self.files.borrow();
        let children = dirs
            .iter()
            .chain(files.iter().map(|(p, _)| p))
            .filter(|p| p.parent() == Some(dir))
            .cloned()
            .collect();
        Ok(children)
    }

    fn decode(&self, path: &Path) -> Result<DecodedImage, LoadError> {
        self.decode_calls.set(self.decode_calls.get() + 1);
        let files = self.files.borrow();
        match files.iter().find(|(p, _)| p == path) {
            Some((_, FakeFile::Image(width, height))) => Ok(DecodedImage {
                rgba_bytes: vec![0; (*width * *height * 4) as usize],
                width: *width,
                height: *height,
                file_size: 1024,
                format_name: "PNG".into(),
            }),
            Some((_, FakeFile::Corrupt)) => Err(LoadError::Empty(path.to_path_buf())),
            None => Err(LoadError::Missing(path.to_path_buf())),
        }
    }

    fn scale(&self, image: &DecodedImage, target: (u32, u32), mode: ScaleMode) -> DecodedImage {
        self.scale_calls.set(self.scale_calls.get() + 1);
        let (width, height) = scaled_dimensions((image.width, image.height), target, mode);
        DecodedImage {
            rgba_bytes: vec![0; (width * height * 4) as usize],
            width,
            height,
            file_size: image.file_size,
            format_name: image.format_name.clone(),
        }
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        if self.deny_delete.get() {
            return Err(io::Error::new(io::ErrorKind::PermissionDenied, "read-only"));
        }
        let mut files = self.files.borrow_mut();
        let before = files.len();
        files.retain(|(p, _)| p != path);
        if files.len() == before {
            return Err(io::Error::new(io::ErrorKind::NotFound, "no such file"));
        }
        Ok(())
    }
}
