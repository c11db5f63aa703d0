mod backend;
mod cli;
mod collection;
mod entry;
mod files;
mod loader;
mod navigator;
mod ui;

#[cfg(test)]
mod testing;

use clap::Parser;
use std::rc::Rc;
use winit::event_loop::EventLoop;

use crate::backend::{Backend, DiskBackend};
use crate::cli::Cli;
use crate::navigator::Navigator;
use crate::ui::state::ViewerState;
use crate::ui::App;

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let backend: Rc<dyn Backend> = Rc::new(DiskBackend);
    let mut navigator = Navigator::new(backend);

    // Each open goes to the front, so open in reverse to keep the first
    // argument active.
    for path in cli.startup_paths().iter().rev() {
        navigator.open(path);
    }
    if navigator.is_empty() {
        log::warn!("No showable images found; drop a file or folder onto the window.");
    }

    let event_loop = EventLoop::new().expect("create event loop");
    let state = ViewerState::new(navigator, cli.scale, cli.marked_file_output);
    let mut app = App::new(state);

    event_loop.run_app(&mut app).expect("run event loop");
}
