use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use winit::keyboard::{Key, NamedKey};

use crate::loader::ScaleMode;
use crate::navigator::{Navigator, Refresh};
use crate::ui::render::{blit, centered_origin, rgb, BG_COLOR};

/// Entries skipped by PageUp / PageDown.
const PAGE_STEP: isize = 10;

// ---------------------------------------------------------------------------
// Input mapping
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Quit,
    Move(isize),
    First,
    Last,
    SwitchCollection(isize),
    CloseCollection,
    Delete,
    CycleScale,
    ToggleFullscreen,
    Mark,
}

pub fn command_for_key(key: &Key) -> Option<Command> {
    match key {
        Key::Named(named) => match named {
            NamedKey::Escape => Some(Command::Quit),
            NamedKey::ArrowRight | NamedKey::Space => Some(Command::Move(1)),
            NamedKey::ArrowLeft | NamedKey::Backspace => Some(Command::Move(-1)),
            NamedKey::PageDown => Some(Command::Move(PAGE_STEP)),
            NamedKey::PageUp => Some(Command::Move(-PAGE_STEP)),
            NamedKey::Home => Some(Command::First),
            NamedKey::End => Some(Command::Last),
            NamedKey::ArrowDown => Some(Command::SwitchCollection(1)),
            NamedKey::ArrowUp => Some(Command::SwitchCollection(-1)),
            NamedKey::Delete => Some(Command::Delete),
            _ => None,
        },
        Key::Character(s) => match s.as_str() {
            "q" => Some(Command::Quit),
            "l" => Some(Command::Move(1)),
            "h" => Some(Command::Move(-1)),
            "j" => Some(Command::SwitchCollection(1)),
            "k" => Some(Command::SwitchCollection(-1)),
            "w" => Some(Command::CloseCollection),
            "s" => Some(Command::CycleScale),
            "f" => Some(Command::ToggleFullscreen),
            "m" => Some(Command::Mark),
            _ => None,
        },
        _ => None,
    }
}

/// What the window has to do after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Idle,
    Redraw,
    ToggleFullscreen,
    Quit,
}

impl From<Refresh> for Outcome {
    fn from(refresh: Refresh) -> Self {
        match refresh {
            Refresh::Unchanged => Outcome::Idle,
            Refresh::Render | Refresh::Clear => Outcome::Redraw,
        }
    }
}

fn redraw_if(changed: bool) -> Outcome {
    if changed { Outcome::Redraw } else { Outcome::Idle }
}

// ---------------------------------------------------------------------------
// Viewer state
// ---------------------------------------------------------------------------

pub struct ViewerState {
    pub navigator: Navigator,
    pub scale_mode: ScaleMode,
    pub marked_file_output: Option<PathBuf>,
    pub is_fullscreen: bool,
}

impl ViewerState {
    pub fn new(navigator: Navigator, scale_mode: ScaleMode, marked_file_output: Option<PathBuf>) -> Self {
        Self {
            navigator,
            scale_mode,
            marked_file_output,
            is_fullscreen: false,
        }
    }

    pub fn apply(&mut self, command: Command) -> Outcome {
        match command {
            Command::Quit => Outcome::Quit,
            Command::Move(offset) => redraw_if(self.navigator.move_current(offset).is_some()),
            Command::First => redraw_if(self.navigator.jump_to_start().is_some()),
            Command::Last => redraw_if(self.navigator.jump_to_end().is_some()),
            Command::SwitchCollection(offset) => redraw_if(self.navigator.switch_active(offset)),
            Command::CloseCollection => self.navigator.close_active(0).into(),
            Command::Delete => self.navigator.delete_current().into(),
            Command::CycleScale => {
                self.scale_mode = self.scale_mode.next();
                log::info!("scale mode: {}", self.scale_mode.label());
                Outcome::Redraw
            }
            Command::ToggleFullscreen => {
                self.is_fullscreen = !self.is_fullscreen;
                Outcome::ToggleFullscreen
            }
            Command::Mark => {
                self.mark_current_file();
                Outcome::Idle
            }
        }
    }

    pub fn open(&mut self, path: &Path) -> Outcome {
        self.navigator.open(path).into()
    }

    fn mark_current_file(&self) {
        let Some(entry) = self.navigator.current_entry() else {
            return;
        };
        let path = entry.path();
        if let Some(ref out_path) = self.marked_file_output {
            match fs::OpenOptions::new().create(true).append(true).open(out_path) {
                Ok(mut file) => {
                    if let Err(e) = writeln!(file, "{}", path.display()) {
                        log::error!("Failed to write to mark file: {}", e);
                    }
                }
                Err(e) => {
                    log::error!("Failed to open mark file: {}", e);
                }
            }
        } else {
            println!("{}", path.display());
        }
    }

    pub fn title(&self) -> String {
        let Some(collection) = self.navigator.active_collection() else {
            return "pv - drop a folder or image to open it".to_string();
        };
        let Some(entry) = collection.current() else {
            return format!("pv - {}", collection.source().display());
        };

        let mut title = format!(
            "pv - {} [{}/{}]",
            entry.file_name(),
            collection.cursor() + 1,
            collection.len()
        );
        if self.navigator.len() > 1 {
            title.push_str(&format!(
                " - collection {}/{}",
                self.navigator.active_index() + 1,
                self.navigator.len()
            ));
        }
        if let Some(image) = entry.original() {
            title.push_str(&format!(" - {}x{} {}", image.width, image.height, image.format_name));
        } else if entry.is_checked() && !entry.is_loaded() {
            title.push_str(" - unreadable");
        }
        title.push_str(&format!(" - {}", self.scale_mode.label()));
        title
    }

    /// Render into the softbuffer framebuffer (u32 per pixel, 0x00RRGGBB).
    pub fn render(&mut self, frame: &mut [u32], fb_w: u32, fb_h: u32) {
        frame.fill(rgb(BG_COLOR[0], BG_COLOR[1], BG_COLOR[2]));

        self.navigator.render_current((fb_w, fb_h), self.scale_mode);
        let Some(image) = self.navigator.current_entry().and_then(|e| e.display_image()) else {
            return;
        };
        blit(
            frame, fb_w, fb_h,
            &image.rgba_bytes, image.width, image.height,
            centered_origin(fb_w, image.width),
            centered_origin(fb_h, image.height),
        );
    }
}
