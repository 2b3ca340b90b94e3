//! Title and caption painting.
//!
//! Text is rasterized into a floating-point coverage mask, a blurred copy of
//! the mask becomes the drop shadow, and both are blended onto the canvas.
//! Two faces are supported: an outline font loaded from TTF/OTF bytes, and a
//! built-in scalable 5x7 bitmap face so boards render without any font asset.

use std::fmt;

use image::{ImageBuffer, Luma, Rgba, RgbaImage};
use imageproc::filter::gaussian_blur_f32;
use rusttype::{point, Font, PositionedGlyph, Scale};

use crate::error::FaceboardError;
use crate::render::source_over;

const GOLD: Rgba<u8> = Rgba([0xff, 0xdd, 0x57, 0xff]);
const WHITE: Rgba<u8> = Rgba([0xff, 0xff, 0xff, 0xff]);

/// How a single run of text is painted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct TextStyle {
    pub size: f32,
    pub bold: bool,
    pub color: Rgba<u8>,
}

/// Title style for a full composite: bold golden text.
pub(crate) const COMPOSITE_TITLE: TextStyle = TextStyle {
    size: 28.0,
    bold: true,
    color: GOLD,
};

/// Caption style for a full composite.
pub(crate) const COMPOSITE_CAPTION: TextStyle = TextStyle {
    size: 20.0,
    bold: false,
    color: GOLD,
};

/// Title style for a text-only refresh: regular white text.
pub(crate) const REFRESH_TITLE: TextStyle = TextStyle {
    size: 28.0,
    bold: false,
    color: WHITE,
};

/// Caption style for a text-only refresh.
pub(crate) const REFRESH_CAPTION: TextStyle = TextStyle {
    size: 20.0,
    bold: false,
    color: WHITE,
};

/// Title baseline, in pixels from the canvas top.
pub(crate) const TITLE_BASELINE: f32 = 40.0;

/// Caption baseline, in pixels up from the canvas bottom.
pub(crate) const CAPTION_RISE: f32 = 40.0;

const SHADOW_ALPHA: f32 = 0.7;

/// Gaussian sigma matching a canvas blur radius of 4.
const SHADOW_SIGMA: f32 = 2.0;

type CoverageMask = ImageBuffer<Luma<f32>, Vec<f32>>;

/// The face used for titles and captions.
///
/// Defaults to the built-in bitmap face; [`Typeface::from_font_bytes`] swaps
/// in a real outline font.
pub enum Typeface {
    /// Scalable 5x7 bitmap face, always available.
    Builtin,
    /// An outline font parsed from TTF/OTF bytes.
    Outline(Font<'static>),
}

impl Typeface {
    /// Parse TTF/OTF bytes into an outline typeface.
    pub fn from_font_bytes(bytes: Vec<u8>) -> Result<Self, FaceboardError> {
        let font = Font::try_from_vec(bytes)
            .ok_or_else(|| FaceboardError::FontLoad("unrecognized font data".to_string()))?;
        Ok(Typeface::Outline(font))
    }
}

impl Default for Typeface {
    fn default() -> Self {
        Typeface::Builtin
    }
}

impl fmt::Debug for Typeface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Typeface::Builtin => f.write_str("Typeface::Builtin"),
            Typeface::Outline(_) => f.write_str("Typeface::Outline(..)"),
        }
    }
}

/// Paint `text` horizontally centered on `center_x` with its baseline at
/// `baseline`, shadow first, fill on top. Empty text paints nothing.
pub(crate) fn draw_text_centered(
    canvas: &mut RgbaImage,
    typeface: &Typeface,
    text: &str,
    center_x: f32,
    baseline: f32,
    style: &TextStyle,
) {
    if text.is_empty() {
        return;
    }

    let mask = coverage_mask(
        canvas.width(),
        canvas.height(),
        typeface,
        text,
        center_x,
        baseline,
        style,
    );
    let shadow = gaussian_blur_f32(&mask, SHADOW_SIGMA);

    for (x, y, px) in canvas.enumerate_pixels_mut() {
        let s = shadow.get_pixel(x, y).0[0].clamp(0.0, 1.0);
        if s > 0.0 {
            source_over(px, Rgba([0, 0, 0, (s * SHADOW_ALPHA * 255.0).round() as u8]));
        }
    }
    for (x, y, px) in canvas.enumerate_pixels_mut() {
        let v = mask.get_pixel(x, y).0[0].clamp(0.0, 1.0);
        if v > 0.0 {
            let Rgba([r, g, b, _]) = style.color;
            source_over(px, Rgba([r, g, b, (v * 255.0).round() as u8]));
        }
    }
}

fn coverage_mask(
    width: u32,
    height: u32,
    typeface: &Typeface,
    text: &str,
    center_x: f32,
    baseline: f32,
    style: &TextStyle,
) -> CoverageMask {
    let mut mask = CoverageMask::new(width, height);
    // Bold is a double strike, one pixel apart.
    let strikes: &[f32] = if style.bold { &[0.0, 1.0] } else { &[0.0] };

    match typeface {
        Typeface::Builtin => {
            let cell = builtin_cell(style.size);
            let left = center_x - builtin_text_width(text, cell) / 2.0;
            for dx in strikes {
                rasterize_builtin(&mut mask, text, left + dx, baseline, cell);
            }
        }
        Typeface::Outline(font) => {
            let scale = Scale::uniform(style.size);
            let left = center_x - outline_text_width(font, text, scale) / 2.0;
            for dx in strikes {
                rasterize_outline(&mut mask, font, text, left + dx, baseline, scale);
            }
        }
    }

    mask
}

fn stamp(mask: &mut CoverageMask, x: i64, y: i64, v: f32) {
    if x < 0 || y < 0 || x >= mask.width() as i64 || y >= mask.height() as i64 {
        return;
    }
    let px = mask.get_pixel_mut(x as u32, y as u32);
    if v > px.0[0] {
        px.0[0] = v;
    }
}

fn outline_text_width(font: &Font<'_>, text: &str, scale: Scale) -> f32 {
    let glyphs: Vec<PositionedGlyph<'_>> = font.layout(text, scale, point(0.0, 0.0)).collect();
    match glyphs.last() {
        Some(last) => last.position().x + last.unpositioned().h_metrics().advance_width,
        None => 0.0,
    }
}

fn rasterize_outline(
    mask: &mut CoverageMask,
    font: &Font<'static>,
    text: &str,
    left: f32,
    baseline: f32,
    scale: Scale,
) {
    for glyph in font.layout(text, scale, point(left, baseline)) {
        if let Some(bb) = glyph.pixel_bounding_box() {
            glyph.draw(|gx, gy, v| {
                stamp(mask, bb.min.x as i64 + gx as i64, bb.min.y as i64 + gy as i64, v);
            });
        }
    }
}

/// Pixels per 5x7 grid cell for a nominal size, never below one.
fn builtin_cell(size: f32) -> u32 {
    (size / 7.0).round().max(1.0) as u32
}

/// Advance is six cells per character; the trailing gap is not counted.
fn builtin_text_width(text: &str, cell: u32) -> f32 {
    let count = text.chars().count() as u32;
    if count == 0 {
        return 0.0;
    }
    (count * 6 * cell - cell) as f32
}

fn rasterize_builtin(mask: &mut CoverageMask, text: &str, left: f32, baseline: f32, cell: u32) {
    let top = baseline - (7 * cell) as f32;
    let mut pen_x = left;

    for ch in text.chars() {
        if let Some(rows) = glyph5x7(ch) {
            for (row, bits) in rows.iter().enumerate() {
                for col in 0..5usize {
                    if bits & (1 << (4 - col)) != 0 {
                        fill_cell(
                            mask,
                            pen_x + (col as u32 * cell) as f32,
                            top + (row as u32 * cell) as f32,
                            cell,
                        );
                    }
                }
            }
        }
        pen_x += (6 * cell) as f32;
    }
}

fn fill_cell(mask: &mut CoverageMask, x: f32, y: f32, cell: u32) {
    let x0 = x.round() as i64;
    let y0 = y.round() as i64;
    for dy in 0..cell as i64 {
        for dx in 0..cell as i64 {
            stamp(mask, x0 + dx, y0 + dy, 1.0);
        }
    }
}

/// 5x7 glyph rows, bit 4 the leftmost column. Lowercase maps onto the
/// uppercase form; characters without a glyph advance the pen unpainted.
fn glyph5x7(ch: char) -> Option<[u8; 7]> {
    let rows = match ch.to_ascii_uppercase() {
        ' ' => [0b00000; 7],
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
        ',' => [0b00000, 0b00000, 0b00000, 0b00000, 0b01100, 0b00100, 0b01000],
        '!' => [0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00000, 0b00100],
        '?' => [0b01110, 0b10001, 0b00001, 0b00010, 0b00100, 0b00000, 0b00100],
        '-' => [0b00000, 0b00000, 0b00000, 0b11111, 0b00000, 0b00000, 0b00000],
        '\'' => [0b01100, 0b00100, 0b01000, 0b00000, 0b00000, 0b00000, 0b00000],
        ':' => [0b00000, 0b01100, 0b01100, 0b00000, 0b01100, 0b01100, 0b00000],
        '&' => [0b01100, 0b10010, 0b10100, 0b01000, 0b10101, 0b10010, 0b01101],
        _ => return None,
    };
    Some(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SLATE: Rgba<u8> = Rgba([60, 60, 60, 255]);

    fn canvas() -> RgbaImage {
        RgbaImage::from_pixel(200, 100, SLATE)
    }

    fn crisp_pixels(img: &RgbaImage, color: Rgba<u8>) -> Vec<(u32, u32)> {
        img.enumerate_pixels()
            .filter(|(_, _, px)| **px == color)
            .map(|(x, y, _)| (x, y))
            .collect()
    }

    #[test]
    fn empty_text_paints_nothing() {
        let mut img = canvas();
        draw_text_centered(&mut img, &Typeface::Builtin, "", 100.0, 70.0, &COMPOSITE_TITLE);
        assert!(img.pixels().all(|p| *p == SLATE));
    }

    #[test]
    fn text_is_centered_on_the_anchor() {
        let mut img = canvas();
        draw_text_centered(&mut img, &Typeface::Builtin, "HI", 100.0, 70.0, &REFRESH_TITLE);

        let crisp = crisp_pixels(&img, REFRESH_TITLE.color);
        assert!(!crisp.is_empty());
        let min_x = crisp.iter().map(|&(x, _)| x).min().unwrap();
        let max_x = crisp.iter().map(|&(x, _)| x).max().unwrap();
        let mid = (min_x + max_x) as f32 / 2.0;
        assert!((mid - 100.0).abs() <= 4.0, "text midpoint {mid} is off center");
    }

    #[test]
    fn text_sits_above_the_baseline() {
        let mut img = canvas();
        draw_text_centered(&mut img, &Typeface::Builtin, "HI", 100.0, 70.0, &REFRESH_TITLE);

        let crisp = crisp_pixels(&img, REFRESH_TITLE.color);
        // 28 px title, cell 4: glyphs occupy rows 42..=69
        assert!(crisp.iter().all(|&(_, y)| y < 70), "paint below the baseline");
        assert!(crisp.iter().all(|&(_, y)| y >= 42), "paint above the glyph box");
    }

    #[test]
    fn shadow_softens_the_surroundings() {
        let mut img = canvas();
        draw_text_centered(&mut img, &Typeface::Builtin, "HI", 100.0, 70.0, &COMPOSITE_TITLE);

        let softened = img
            .pixels()
            .filter(|p| p[0] < SLATE[0] && **p != COMPOSITE_TITLE.color)
            .count();
        assert!(softened > 0, "no blurred shadow around the glyphs");
    }

    #[test]
    fn composite_and_refresh_styles_differ() {
        assert_ne!(COMPOSITE_TITLE.color, REFRESH_TITLE.color);
        assert!(COMPOSITE_TITLE.bold);
        assert!(!REFRESH_TITLE.bold);
        assert_eq!(COMPOSITE_CAPTION.color, COMPOSITE_TITLE.color);
        assert_eq!(COMPOSITE_CAPTION.size, REFRESH_CAPTION.size);
    }

    #[test]
    fn bold_covers_more_pixels_than_regular() {
        let mut regular = canvas();
        let plain = TextStyle {
            bold: false,
            ..COMPOSITE_TITLE
        };
        draw_text_centered(&mut regular, &Typeface::Builtin, "H", 100.0, 70.0, &plain);

        let mut bold = canvas();
        draw_text_centered(&mut bold, &Typeface::Builtin, "H", 100.0, 70.0, &COMPOSITE_TITLE);

        let regular_count = crisp_pixels(&regular, COMPOSITE_TITLE.color).len();
        let bold_count = crisp_pixels(&bold, COMPOSITE_TITLE.color).len();
        assert!(bold_count > regular_count);
    }

    #[test]
    fn unknown_characters_advance_without_painting() {
        let mut with_gap = canvas();
        draw_text_centered(&mut with_gap, &Typeface::Builtin, "A\u{263a}B", 100.0, 70.0, &REFRESH_TITLE);

        let mut with_space = canvas();
        draw_text_centered(&mut with_space, &Typeface::Builtin, "A B", 100.0, 70.0, &REFRESH_TITLE);

        assert_eq!(with_gap.as_raw(), with_space.as_raw());
        assert!(!crisp_pixels(&with_gap, REFRESH_TITLE.color).is_empty());
    }

    #[test]
    fn junk_font_bytes_are_rejected() {
        let err = Typeface::from_font_bytes(vec![0, 1, 2, 3]).unwrap_err();
        assert!(matches!(err, FaceboardError::FontLoad(_)));
    }

    #[test]
    fn cell_scales_with_the_nominal_size() {
        assert_eq!(builtin_cell(28.0), 4);
        assert_eq!(builtin_cell(20.0), 3);
        assert_eq!(builtin_cell(7.0), 1);
        assert_eq!(builtin_cell(1.0), 1);
    }

    #[test]
    fn width_counts_advances_without_the_trailing_gap() {
        assert_eq!(builtin_text_width("HI", 4), 44.0);
        assert_eq!(builtin_text_width("H", 4), 20.0);
        assert_eq!(builtin_text_width("", 4), 0.0);
    }
}
