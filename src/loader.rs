use image::imageops::{self, FilterType};
use image::{GenericImageView, ImageBuffer, Rgba, RgbaImage};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Decoded image data
// ---------------------------------------------------------------------------

pub struct DecodedImage {
    pub rgba_bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub file_size: u64,
    pub format_name: String,
}

impl DecodedImage {
    pub fn mem_size(&self) -> u64 {
        self.rgba_bytes.len() as u64
    }
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("{} does not exist", .0.display())]
    Missing(PathBuf),
    #[error("{} is not a regular file", .0.display())]
    NotAFile(PathBuf),
    #[error("failed to decode {}: {source}", .path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("{} decodes to an empty image", .0.display())]
    Empty(PathBuf),
}

pub fn decode_image(path: &Path) -> Result<DecodedImage, LoadError> {
    let file_size = fs::metadata(path).map(|m| m.len()).unwrap_or(0);
    let img = image::open(path).map_err(|source| LoadError::Decode {
        path: path.to_path_buf(),
        source,
    })?;

    let (width, height) = img.dimensions();
    if width == 0 || height == 0 {
        return Err(LoadError::Empty(path.to_path_buf()));
    }

    let format_name = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("unknown")
        .to_uppercase();

    Ok(DecodedImage {
        rgba_bytes: img.to_rgba8().into_raw(),
        width,
        height,
        file_size,
        format_name,
    })
}

// ---------------------------------------------------------------------------
// Scaling
// ---------------------------------------------------------------------------

/// How a decoded image is fitted to the display area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
#[repr(u8)]
pub enum ScaleMode {
    /// Fit within the window, keeping the aspect ratio.
    Fit = 0,
    /// Show at 1:1.
    Original = 1,
    /// Fill the window, ignoring the aspect ratio.
    Stretch = 2,
    /// Match the window height; width may overflow up to twice the window.
    FitHeight = 3,
    /// Match the window width; height may overflow up to twice the window.
    FitWidth = 4,
}

impl ScaleMode {
    pub fn index(self) -> u8 {
        self as u8
    }

    pub fn next(self) -> Self {
        match self {
            ScaleMode::Fit => ScaleMode::Original,
            ScaleMode::Original => ScaleMode::Stretch,
            ScaleMode::Stretch => ScaleMode::FitHeight,
            ScaleMode::FitHeight => ScaleMode::FitWidth,
            ScaleMode::FitWidth => ScaleMode::Fit,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ScaleMode::Fit => "fit",
            ScaleMode::Original => "1:1",
            ScaleMode::Stretch => "stretch",
            ScaleMode::FitHeight => "fit height",
            ScaleMode::FitWidth => "fit width",
        }
    }
}

/// True when fitting `source` inside `target` is limited by the width, i.e.
/// the target is at least as tall (relative to its width) as the source.
pub fn is_width_bound(source: (u32, u32), target: (u32, u32)) -> bool {
    let (sw, sh) = source;
    let (tw, th) = target;
    th as u64 * sw as u64 >= sh as u64 * tw as u64
}

fn fit_within(source: (u32, u32), bounds: (u32, u32)) -> (u32, u32) {
    let (sw, sh) = source;
    let (bw, bh) = bounds;
    if sw == 0 || sh == 0 {
        return (bw.max(1), bh.max(1));
    }
    if is_width_bound(source, bounds) {
        let h = (sh as f64 * bw as f64 / sw as f64).round() as u32;
        (bw.max(1), h.max(1))
    } else {
        let w = (sw as f64 * bh as f64 / sh as f64).round() as u32;
        (w.max(1), bh.max(1))
    }
}

/// Output dimensions for scaling `source` to `target` under `mode`.
pub fn scaled_dimensions(source: (u32, u32), target: (u32, u32), mode: ScaleMode) -> (u32, u32) {
    let (tw, th) = target;
    match mode {
        ScaleMode::Fit => fit_within(source, target),
        ScaleMode::Original => source,
        ScaleMode::Stretch => (tw.max(1), th.max(1)),
        ScaleMode::FitHeight => fit_within(source, (tw.saturating_mul(2), th)),
        ScaleMode::FitWidth => fit_within(source, (tw, th.saturating_mul(2))),
    }
}

pub fn scale_image(image: &DecodedImage, target: (u32, u32), mode: ScaleMode) -> DecodedImage {
    let (width, height) = scaled_dimensions((image.width, image.height), target, mode);
    let view = ImageBuffer::<Rgba<u8>, &[u8]>::from_raw(image.width, image.height, &image.rgba_bytes[..]);
    let resized = match view {
        Some(view) => imageops::resize(&view, width, height, FilterType::Triangle),
        None => {
            log::warn!(
                "pixel buffer does not match {}x{}, scaling a blank image",
                image.width,
                image.height
            );
            RgbaImage::new(width, height)
        }
    };

    DecodedImage {
        rgba_bytes: resized.into_raw(),
        width,
        height,
        file_size: image.file_size,
        format_name: image.format_name.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;
    use tempfile::tempdir;

    #[test]
    fn fit_keeps_aspect_ratio() {
        // Tall target: width is the constraint.
        assert_eq!(scaled_dimensions((100, 50), (200, 400), ScaleMode::Fit), (200, 100));
        // Wide target: height is the constraint.
        assert_eq!(scaled_dimensions((100, 50), (800, 200), ScaleMode::Fit), (400, 200));
    }

    #[test]
    fn other_modes() {
        assert_eq!(scaled_dimensions((100, 50), (640, 480), ScaleMode::Original), (100, 50));
        assert_eq!(scaled_dimensions((100, 50), (640, 480), ScaleMode::Stretch), (640, 480));
        // Height fit with a 2x width budget.
        assert_eq!(scaled_dimensions((100, 50), (300, 200), ScaleMode::FitHeight), (400, 200));
        // Width fit with a 2x height budget.
        assert_eq!(scaled_dimensions((50, 100), (200, 300), ScaleMode::FitWidth), (200, 400));
    }

    #[test]
    fn width_bound_matches_aspect_comparison() {
        assert!(is_width_bound((100, 50), (100, 50)));
        assert!(is_width_bound((100, 50), (200, 400)));
        assert!(!is_width_bound((100, 50), (800, 200)));
    }

    #[test]
    fn mode_cycle_visits_every_mode() {
        let mut mode = ScaleMode::Fit;
        let mut seen = vec![mode.index()];
        for _ in 0..4 {
            mode = mode.next();
            seen.push(mode.index());
        }
        assert_eq!(seen, [0, 1, 2, 3, 4]);
        assert_eq!(mode.next(), ScaleMode::Fit);
    }

    #[test]
    fn decode_and_scale_real_png() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("pic.png");
        RgbImage::new(8, 4).save(&path).expect("save png");

        let decoded = decode_image(&path).expect("decode");
        assert_eq!((decoded.width, decoded.height), (8, 4));
        assert_eq!(decoded.mem_size(), 8 * 4 * 4);
        assert_eq!(decoded.format_name, "PNG");

        let scaled = scale_image(&decoded, (4, 4), ScaleMode::Fit);
        assert_eq!((scaled.width, scaled.height), (4, 2));
        assert_eq!(scaled.rgba_bytes.len(), 4 * 2 * 4);
    }

    #[test]
    fn corrupt_file_is_a_decode_error() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("broken.png");
        fs::write(&path, b"definitely not a png").expect("write");

        assert!(matches!(decode_image(&path), Err(LoadError::Decode { .. })));
    }
}
