//! Resource Loading and Atlas Baking
//!
//! The grid's front faces sample one big texture atlas with a tile per cell.
//! This module rasterizes a view definition into that atlas (text through a
//! built-in 5x7 pixel font, images by scaled blit) and tracks image loading
//! progress for the loading indicator.
//!
//! Atlas convention: RGB carries image pixels and glyph color, alpha is the
//! content mask the cell shader mixes tints by. Background stays fully
//! transparent.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use log::{debug, warn};

use crate::grid::{ContentItem, GridConfig, ViewDefinition};

/// Side length of one atlas tile in pixels.
pub const TILE_PX: u32 = 32;

/// A CPU-side RGBA8 raster.
#[derive(Clone, Debug, PartialEq)]
pub struct RasterSurface {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl RasterSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; (width * height * 4) as usize],
        }
    }

    pub fn put_pixel(&mut self, x: u32, y: u32, rgba: [u8; 4]) {
        if x < self.width && y < self.height {
            let i = ((y * self.width + x) * 4) as usize;
            self.pixels[i..i + 4].copy_from_slice(&rgba);
        }
    }

    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = ((y * self.width + x) * 4) as usize;
        [
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ]
    }

    pub fn fill_rect(&mut self, x: u32, y: u32, w: u32, h: u32, rgba: [u8; 4]) {
        for py in y..(y + h).min(self.height) {
            for px in x..(x + w).min(self.width) {
                self.put_pixel(px, py, rgba);
            }
        }
    }

    /// Nearest-neighbor blit of `src` into the destination rectangle.
    pub fn blit_scaled(&mut self, src: &RasterSurface, x: u32, y: u32, w: u32, h: u32) {
        if src.width == 0 || src.height == 0 || w == 0 || h == 0 {
            return;
        }
        for dy in 0..h {
            for dx in 0..w {
                let sx = dx * src.width / w;
                let sy = dy * src.height / h;
                self.put_pixel(x + dx, y + dy, src.pixel(sx, sy));
            }
        }
    }
}

/// 5x7 bitmap glyph rows, most significant of the low 5 bits is the left
/// column. Lowercase folds to uppercase; unknown characters raster as blanks.
fn glyph_rows(c: char) -> [u8; 7] {
    match c.to_ascii_uppercase() {
        'A' => [0b01110, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001],
        'B' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10001, 0b10001, 0b11110],
        'C' => [0b01110, 0b10001, 0b10000, 0b10000, 0b10000, 0b10001, 0b01110],
        'D' => [0b11110, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b11110],
        'E' => [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b11111],
        'F' => [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b10000],
        'G' => [0b01110, 0b10001, 0b10000, 0b10111, 0b10001, 0b10001, 0b01111],
        'H' => [0b10001, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001],
        'I' => [0b01110, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
        'J' => [0b00111, 0b00010, 0b00010, 0b00010, 0b00010, 0b10010, 0b01100],
        'K' => [0b10001, 0b10010, 0b10100, 0b11000, 0b10100, 0b10010, 0b10001],
        'L' => [0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b11111],
        'M' => [0b10001, 0b11011, 0b10101, 0b10101, 0b10001, 0b10001, 0b10001],
        'N' => [0b10001, 0b11001, 0b10101, 0b10011, 0b10001, 0b10001, 0b10001],
        'O' => [0b01110, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110],
        'P' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10000, 0b10000, 0b10000],
        'Q' => [0b01110, 0b10001, 0b10001, 0b10001, 0b10101, 0b10010, 0b01101],
        'R' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10100, 0b10010, 0b10001],
        'S' => [0b01111, 0b10000, 0b10000, 0b01110, 0b00001, 0b00001, 0b11110],
        'T' => [0b11111, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100],
        'U' => [0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110],
        'V' => [0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01010, 0b00100],
        'W' => [0b10001, 0b10001, 0b10001, 0b10101, 0b10101, 0b11011, 0b10001],
        'X' => [0b10001, 0b10001, 0b01010, 0b00100, 0b01010, 0b10001, 0b10001],
        'Y' => [0b10001, 0b10001, 0b01010, 0b00100, 0b00100, 0b00100, 0b00100],
        'Z' => [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b10000, 0b11111],
        '0' => [0b01110, 0b10001, 0b10011, 0b10101, 0b11001, 0b10001, 0b01110],
        '1' => [0b00100, 0b01100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
        '2' => [0b01110, 0b10001, 0b00001, 0b00010, 0b00100, 0b01000, 0b11111],
        '3' => [0b11111, 0b00010, 0b00100, 0b00010, 0b00001, 0b10001, 0b01110],
        '4' => [0b00010, 0b00110, 0b01010, 0b10010, 0b11111, 0b00010, 0b00010],
        '5' => [0b11111, 0b10000, 0b11110, 0b00001, 0b00001, 0b10001, 0b01110],
        '6' => [0b00110, 0b01000, 0b10000, 0b11110, 0b10001, 0b10001, 0b01110],
        '7' => [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b01000, 0b01000],
        '8' => [0b01110, 0b10001, 0b10001, 0b01110, 0b10001, 0b10001, 0b01110],
        '9' => [0b01110, 0b10001, 0b10001, 0b01111, 0b00001, 0b00010, 0b01100],
        '.' => [0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b01100, 0b01100],
        '-' => [0b00000, 0b00000, 0b00000, 0b11111, 0b00000, 0b00000, 0b00000],
        '/' => [0b00001, 0b00010, 0b00100, 0b00100, 0b00100, 0b01000, 0b10000],
        ':' => [0b00000, 0b01100, 0b01100, 0b00000, 0b01100, 0b01100, 0b00000],
        '@' => [0b01110, 0b10001, 0b10111, 0b10101, 0b10111, 0b10000, 0b01110],
        '_' => [0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b11111],
        _ => [0; 7],
    }
}

/// Loads and caches image resources, reporting aggregate progress.
pub trait ResourceLoader {
    /// Queue a resource for loading.
    fn request(&mut self, path: &str);
    /// Do a bounded amount of loading work. Called once per frame.
    fn advance(&mut self);
    /// Fraction of requested resources now available, in 0..=1.
    fn progress(&self) -> f32;
    fn is_complete(&self) -> bool {
        self.progress() >= 1.0
    }
    /// A loaded image, if available yet.
    fn image(&self, path: &str) -> Option<&RasterSurface>;
}

/// Loads images from disk with the `image` crate, one file per `advance`
/// call so the loading indicator gets frames to animate in.
#[derive(Default)]
pub struct DiskLoader {
    root: PathBuf,
    pending: Vec<String>,
    loaded: HashMap<String, RasterSurface>,
    failed: usize,
}

impl DiskLoader {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            ..Default::default()
        }
    }

    fn decode(&self, path: &str) -> Option<RasterSurface> {
        let full = self.root.join(path);
        match image::open(&full) {
            Ok(img) => {
                let rgba = img.to_rgba8();
                Some(RasterSurface {
                    width: rgba.width(),
                    height: rgba.height(),
                    pixels: rgba.into_raw(),
                })
            }
            Err(err) => {
                warn!("failed to load {}: {err}", full.display());
                None
            }
        }
    }
}

impl ResourceLoader for DiskLoader {
    fn request(&mut self, path: &str) {
        if !self.loaded.contains_key(path) && !self.pending.iter().any(|p| p == path) {
            self.pending.push(path.to_string());
        }
    }

    fn advance(&mut self) {
        let Some(path) = self.pending.pop() else {
            return;
        };
        match self.decode(&path) {
            Some(surface) => {
                debug!("loaded {path} ({}x{})", surface.width, surface.height);
                self.loaded.insert(path, surface);
            }
            // Failed loads still count toward progress so loading terminates
            None => self.failed += 1,
        }
    }

    fn progress(&self) -> f32 {
        let done = self.loaded.len() + self.failed;
        let total = done + self.pending.len();
        if total == 0 {
            1.0
        } else {
            done as f32 / total as f32
        }
    }

    fn image(&self, path: &str) -> Option<&RasterSurface> {
        self.loaded.get(path)
    }
}

/// Rasterizes view definitions into the per-buffer texture atlas.
pub struct AtlasBaker {
    count_x: u32,
    count_y: u32,
}

impl AtlasBaker {
    pub fn new(grid: &GridConfig) -> Self {
        Self {
            count_x: grid.count_x,
            count_y: grid.count_y,
        }
    }

    pub fn atlas_size(&self) -> (u32, u32) {
        (self.count_x * TILE_PX, self.count_y * TILE_PX)
    }

    /// Bake a full view into a fresh atlas. Atlas rows run top-down, same as
    /// content rows, so no flip happens here.
    pub fn bake(&self, view: &ViewDefinition, loader: &dyn ResourceLoader) -> RasterSurface {
        let (w, h) = self.atlas_size();
        let mut atlas = RasterSurface::new(w, h);
        for item in &view.items {
            match item {
                ContentItem::Text {
                    x,
                    y,
                    value,
                    padding_left,
                    ..
                } => self.bake_text(&mut atlas, *x, *y, value, *padding_left),
                ContentItem::SplitText { x, y, value, .. } => {
                    self.bake_text(&mut atlas, *x, *y, value, 0.0)
                }
                ContentItem::Image {
                    x,
                    y,
                    width,
                    height,
                    value,
                } => self.bake_image(&mut atlas, *x, *y, *width, *height, value, loader),
            }
        }
        atlas
    }

    fn bake_text(&self, atlas: &mut RasterSurface, x: u32, y: u32, value: &str, padding: f32) {
        let offset = (padding.clamp(0.0, 1.0) * TILE_PX as f32) as u32;
        for (i, c) in value.chars().enumerate() {
            let tile_x = x + i as u32;
            if tile_x >= self.count_x || y >= self.count_y {
                continue;
            }
            self.bake_glyph(atlas, tile_x * TILE_PX + offset, y * TILE_PX, c);
        }
    }

    fn bake_glyph(&self, atlas: &mut RasterSurface, origin_x: u32, origin_y: u32, c: char) {
        let rows = glyph_rows(c);
        let margin = TILE_PX / 8;
        let scale = ((TILE_PX - 2 * margin) / 5).min((TILE_PX - 2 * margin) / 7).max(1);
        let x0 = origin_x + (TILE_PX - scale * 5) / 2;
        let y0 = origin_y + (TILE_PX - scale * 7) / 2;
        for (row, bits) in rows.iter().enumerate() {
            for col in 0..5u32 {
                if bits & (1 << (4 - col)) != 0 {
                    atlas.fill_rect(
                        x0 + col * scale,
                        y0 + row as u32 * scale,
                        scale,
                        scale,
                        [255, 255, 255, 255],
                    );
                }
            }
        }
    }

    fn bake_image(
        &self,
        atlas: &mut RasterSurface,
        x: u32,
        y: u32,
        width: u32,
        height: u32,
        path: &str,
        loader: &dyn ResourceLoader,
    ) {
        let w = width.min(self.count_x.saturating_sub(x)) * TILE_PX;
        let h = height.min(self.count_y.saturating_sub(y)) * TILE_PX;
        match loader.image(path) {
            Some(src) => atlas.blit_scaled(src, x * TILE_PX, y * TILE_PX, w, h),
            // Not loaded yet: a solid block keeps the region visibly lit
            None => atlas.fill_rect(x * TILE_PX, y * TILE_PX, w, h, [90, 90, 95, 255]),
        }
    }
}
