use std::fmt::Debug;

use crate::font::{self, ADVANCE, GLYPH_HEIGHT, GLYPH_WIDTH};

/// The canvas width the widget is laid out on
pub const VIRTUAL_WIDTH: usize = 320;
/// The canvas height the widget is laid out on
pub const VIRTUAL_HEIGHT: usize = 200;

/// The palette the widget is drawn with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Color {
    #[default]
    Background,
    Panel,
    Foreground,
    Muted,
    Primary,
    Accent,
    Item,
    Destructive,
}

impl Color {
    /// The RGBA value of the color
    pub const fn rgba(self) -> u32 {
        match self {
            Color::Background => 0x1A1A1AFF,
            Color::Panel => 0x26262EFF,
            Color::Foreground => 0xF2F2F2FF,
            Color::Muted => 0x6B6B78FF,
            Color::Primary => 0x8B5CF6FF,
            Color::Accent => 0x22D3EEFF,
            Color::Item => 0x2563EBFF,
            Color::Destructive => 0xDC2626FF,
        }
    }
}

/// An axis aligned rectangle in virtual pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

impl Rect {
    pub const fn new(x: usize, y: usize, width: usize, height: usize) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub const fn contains(&self, x: usize, y: usize) -> bool {
        x >= self.x && x < self.x + self.width && y >= self.y && y < self.y + self.height
    }
}

/// A virtual display for drawing the widget at a scaled resolution
///
/// This is a palette-indexed pixel buffer. Drawing happens in virtual coordinates and every
/// virtual pixel covers a `scale_factor * scale_factor` block of real pixels.
pub struct VirtualDisplay {
    /// The internal pixel buffer at the scaled resolution. Stored as a 1D array
    buffer: Vec<Color>,
    /// The scaled up width in pixels of the display buffer
    scaled_width: usize,
    /// The scaled up height in pixels of the display buffer
    scaled_height: usize,
    /// The scaling factor used to convert virtual pixels to real pixels
    scale_factor: usize,
}

impl VirtualDisplay {
    /// Construct a new [`VirtualDisplay`] with a given scale factor.
    ///
    /// The total buffer dimentions are determined by the virtual size multiplied by the scale
    /// factor.
    ///
    /// # Arguments
    /// * `scale_factor` - The number of real pixels per virtual pixel
    pub fn new(scale_factor: usize) -> Self {
        let scale_factor = scale_factor.max(1);
        let scaled_width = VIRTUAL_WIDTH * scale_factor;
        let scaled_height = VIRTUAL_HEIGHT * scale_factor;

        Self {
            buffer: vec![Color::Background; scaled_width * scaled_height],
            scaled_width,
            scaled_height,
            scale_factor,
        }
    }

    /// Returns the scaled width in pixels
    pub const fn scaled_width(&self) -> usize {
        self.scaled_width
    }

    /// Returns the scaled height in pixels
    pub const fn scaled_height(&self) -> usize {
        self.scaled_height
    }

    /// Fills the entire display with one color
    pub fn clear(&mut self, color: Color) {
        log::trace!("Clearing display");
        self.buffer.fill(color);
    }

    /// Renders the internal buffer into a given RGBA byte frame.
    ///
    /// Each pixel is expanded into four bytes using [`Color::rgba`].
    ///
    /// # Panics
    ///
    /// If the provided frame is not large enough to hold the display data
    pub fn render_to_buffer(&self, frame: &mut [u8]) {
        for (index, color) in self.buffer.iter().enumerate() {
            let start = index * 4;
            frame[start..start + 4].copy_from_slice(&color.rgba().to_be_bytes());
        }
    }

    /// Converts a real pixel position into virtual coordinates
    pub const fn to_virtual(&self, x: usize, y: usize) -> (usize, usize) {
        (x / self.scale_factor, y / self.scale_factor)
    }

    /// Returns the color of a virtual pixel, or [`None`] outside the canvas
    #[cfg(test)]
    pub fn get_pixel(&self, x: usize, y: usize) -> Option<Color> {
        if x >= VIRTUAL_WIDTH || y >= VIRTUAL_HEIGHT {
            return None;
        }

        let real_index = y * self.scale_factor * self.scaled_width + x * self.scale_factor;
        self.buffer.get(real_index).copied()
    }

    /// Sets a virtual pixel at the given coordinates. Pixels outside the canvas are clipped.
    pub fn set_pixel(&mut self, x: usize, y: usize, color: Color) {
        if x >= VIRTUAL_WIDTH || y >= VIRTUAL_HEIGHT {
            return;
        }

        let start_x = x * self.scale_factor;
        let start_y = y * self.scale_factor;

        for real_y in start_y..start_y + self.scale_factor {
            let row = real_y * self.scaled_width;
            self.buffer[row + start_x..row + start_x + self.scale_factor].fill(color);
        }
    }

    pub fn fill_rect(&mut self, rect: Rect, color: Color) {
        for y in rect.y..rect.y + rect.height {
            for x in rect.x..rect.x + rect.width {
                self.set_pixel(x, y, color);
            }
        }
    }

    /// Draws the one pixel wide outline of `rect`
    pub fn stroke_rect(&mut self, rect: Rect, color: Color) {
        if rect.width == 0 || rect.height == 0 {
            return;
        }

        let right = rect.x + rect.width - 1;
        let bottom = rect.y + rect.height - 1;
        for x in rect.x..=right {
            self.set_pixel(x, rect.y, color);
            self.set_pixel(x, bottom, color);
        }
        for y in rect.y..=bottom {
            self.set_pixel(rect.x, y, color);
            self.set_pixel(right, y, color);
        }
    }

    /// Draws `text` with its top-left corner at `(x, y)`.
    ///
    /// Only the set bits of each glyph are painted, so whatever is underneath shows through.
    /// Returns the x coordinate just past the last glyph.
    pub fn draw_text(&mut self, x: usize, y: usize, text: &str, color: Color) -> usize {
        let mut cursor = x;

        for c in text.chars() {
            for (row_index, row) in font::glyph(c).iter().enumerate().take(GLYPH_HEIGHT) {
                for bit in 0..GLYPH_WIDTH {
                    if row & (1 << (GLYPH_WIDTH - 1 - bit)) > 0 {
                        self.set_pixel(cursor + bit, y + row_index, color);
                    }
                }
            }
            cursor += ADVANCE;
        }

        cursor
    }
}

impl Debug for VirtualDisplay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VirtualDisplay")
            .field("scaled_width", &self.scaled_width)
            .field("scaled_height", &self.scaled_height)
            .field("scale_factor", &self.scale_factor)
            .finish()
    }
}

impl<'a> IntoIterator for &'a VirtualDisplay {
    type Item = &'a Color;
    type IntoIter = std::slice::Iter<'a, Color>;

    fn into_iter(self) -> Self::IntoIter {
        self.buffer.iter()
    }
}
