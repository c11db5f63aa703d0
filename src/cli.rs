use clap::Parser;
use std::path::PathBuf;

use crate::loader::ScaleMode;

pub const HELP_KEYS: &str = "\
Key Bindings:
  Esc / q             : Quit
  Right / Space / l   : Next image
  Left / Backspace / h: Previous image
  PageDown / PageUp   : Skip 10 images forward / back
  Home / End          : First / last image
  Down / j, Up / k    : Next / previous collection
  w                   : Close current collection
  Delete              : Delete current file from disk
  s                   : Cycle scale mode
  f                   : Toggle fullscreen
  m                   : Mark current file (write path to output)
  Wheel               : Previous / next image
  Drop file or folder : Open it as a new collection
";

#[derive(Parser, Debug)]
#[command(name = "pv", about = "A predictive-loading image viewer", after_help = HELP_KEYS)]
pub struct Cli {
    /// Directories or image files to open, one collection each (default: current directory)
    pub paths: Vec<PathBuf>,

    /// Initial scale mode
    #[arg(short, long, value_enum, default_value_t = ScaleMode::Fit)]
    pub scale: ScaleMode,

    /// Output file for marked images (appends path). Defaults to stdout if not set.
    #[arg(short = 'o', long, value_name = "FILE")]
    pub marked_file_output: Option<PathBuf>,
}

impl Cli {
    /// Paths to open at startup, falling back to the working directory.
    pub fn startup_paths(&self) -> Vec<PathBuf> {
        if self.paths.is_empty() {
            vec![PathBuf::from(".")]
        } else {
            self.paths.clone()
        }
    }
}
