//! The compositing pipeline: background, oval-masked faces, title, caption.

use image::imageops::{self, FilterType};
use image::RgbaImage;

use crate::face_detector::FaceBox;
use crate::geometry::{clamp_to_image, ellipse_contains, face_crop_rect, place_in_slot};
use crate::render::source_over;
use crate::template::{Slot, Template};
use crate::text::{
    draw_text_centered, Typeface, CAPTION_RISE, COMPOSITE_CAPTION, COMPOSITE_TITLE, TITLE_BASELINE,
};
use crate::MAX_FACES;

/// Everything a full composite produces.
pub(crate) struct CompositeOutput {
    pub base: RgbaImage,
    pub display: RgbaImage,
    pub previews: Vec<RgbaImage>,
    pub faces_painted: usize,
}

/// A face crop scaled for one slot, plus where it lands.
struct ScaledFace {
    image: RgbaImage,
    /// Canvas y of the top edge.
    top: f64,
    /// Top edge relative to the slot, for the preview tile.
    top_in_slot: f64,
}

/// Repaint the whole board: the background stretched over the canvas, up to
/// four faces masked into their slots in detection order, then title and
/// caption in the composite style. Returns the pre-text base alongside the
/// finished display frame and one preview tile per consumed detection.
pub(crate) fn compose_board(
    template: &Template,
    background: &RgbaImage,
    photo: &RgbaImage,
    detections: &[FaceBox],
    title: &str,
    caption: &str,
    typeface: &Typeface,
    width: u32,
    height: u32,
) -> CompositeOutput {
    let mut base = imageops::resize(background, width, height, FilterType::Lanczos3);

    let used = detections.len().min(MAX_FACES).min(template.slots.len());
    if detections.len() > used {
        log::warn!(
            "dropping {} of {} detections, template {} takes {}",
            detections.len() - used,
            detections.len(),
            template.id,
            used
        );
    }

    let mut previews = Vec::with_capacity(used);
    let mut faces_painted = 0;

    for (slot, face) in template.slots.iter().zip(detections.iter().take(used)) {
        match scale_face_for_slot(photo, face, slot) {
            Some(scaled) => {
                paint_masked_face(&mut base, slot, &scaled);
                previews.push(preview_tile(slot, &scaled));
                faces_painted += 1;
            }
            None => {
                log::warn!("face crop lies outside the photo, leaving the slot empty");
                previews.push(blank_tile(slot));
            }
        }
    }

    let mut display = base.clone();
    let center_x = width as f32 / 2.0;
    draw_text_centered(
        &mut display,
        typeface,
        title,
        center_x,
        TITLE_BASELINE,
        &COMPOSITE_TITLE,
    );
    draw_text_centered(
        &mut display,
        typeface,
        caption,
        center_x,
        height as f32 - CAPTION_RISE,
        &COMPOSITE_CAPTION,
    );

    log::debug!(
        "composited {} of {} detections onto template {}",
        faces_painted,
        detections.len(),
        template.id
    );

    CompositeOutput {
        base,
        display,
        previews,
        faces_painted,
    }
}

/// Crop the detection (top 10% trimmed), clamp it to the photo, and scale it
/// to slot width. `None` when nothing of the crop is visible.
fn scale_face_for_slot(photo: &RgbaImage, face: &FaceBox, slot: &Slot) -> Option<ScaledFace> {
    let rect = clamp_to_image(&face_crop_rect(face), photo.width(), photo.height())?;
    let cropped = imageops::crop_imm(photo, rect.x, rect.y, rect.width, rect.height).to_image();

    let placement = place_in_slot(slot, rect.width, rect.height);
    let target_w = placement.width.round().max(1.0) as u32;
    let target_h = placement.height.round().max(1.0) as u32;
    let image = imageops::resize(&cropped, target_w, target_h, FilterType::Lanczos3);

    Some(ScaledFace {
        image,
        top: placement.y,
        top_in_slot: placement.y - slot.y,
    })
}

/// Blit the scaled face through the slot's inscribed ellipse.
fn paint_masked_face(canvas: &mut RgbaImage, slot: &Slot, face: &ScaledFace) {
    let left = slot.x.round() as i64;
    let top = face.top.round() as i64;

    for (fx, fy, px) in face.image.enumerate_pixels() {
        let cx = left + fx as i64;
        let cy = top + fy as i64;
        if cx < 0 || cy < 0 || cx >= canvas.width() as i64 || cy >= canvas.height() as i64 {
            continue;
        }
        let (cx, cy) = (cx as u32, cy as u32);
        if !ellipse_contains(slot, cx, cy) {
            continue;
        }
        source_over(canvas.get_pixel_mut(cx, cy), *px);
    }
}

/// The same scaled crop, unmasked, on a transparent slot-sized tile.
fn preview_tile(slot: &Slot, face: &ScaledFace) -> RgbaImage {
    let mut tile = blank_tile(slot);
    let top = face.top_in_slot.round() as i64;

    for (fx, fy, px) in face.image.enumerate_pixels() {
        let tx = fx as i64;
        let ty = top + fy as i64;
        if tx < 0 || ty < 0 || tx >= tile.width() as i64 || ty >= tile.height() as i64 {
            continue;
        }
        source_over(tile.get_pixel_mut(tx as u32, ty as u32), *px);
    }
    tile
}

fn blank_tile(slot: &Slot) -> RgbaImage {
    RgbaImage::new(
        slot.width.round().max(1.0) as u32,
        slot.height.round().max(1.0) as u32,
    )
}
