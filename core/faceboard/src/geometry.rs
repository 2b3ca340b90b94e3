use crate::face_detector::FaceBox;
use crate::template::Slot;

/// Fraction of the detection box height trimmed off the top of the face crop.
/// Detectors box the whole head; the trim drops forehead/hair overshoot.
const TOP_TRIM: f64 = 0.10;

/// Fraction of the detection box height the face crop keeps.
const KEPT_HEIGHT: f64 = 0.90;

/// Face crop rectangle in photo coordinates, before clamping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CropRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Integer pixel rectangle, guaranteed to lie inside an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Where a scaled face lands on the canvas, in template coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Calculate the face crop for a detection: full box width, top edge moved
/// down by 10% of the box height, height reduced to 90%.
pub fn face_crop_rect(face: &FaceBox) -> CropRect {
    CropRect {
        x: face.x,
        y: face.y + face.height * TOP_TRIM,
        width: face.width,
        height: face.height * KEPT_HEIGHT,
    }
}

/// Clamp a crop rectangle to the image bounds and convert it to integer
/// pixel coordinates. Returns `None` when the visible intersection is
/// smaller than one pixel.
pub fn clamp_to_image(rect: &CropRect, image_width: u32, image_height: u32) -> Option<PixelRect> {
    let left = rect.x.max(0.0);
    let top = rect.y.max(0.0);
    let right = (rect.x + rect.width).min(image_width as f64);
    let bottom = (rect.y + rect.height).min(image_height as f64);

    if right - left < 1.0 || bottom - top < 1.0 {
        return None;
    }

    let x = left.floor() as u32;
    let y = top.floor() as u32;
    let width = ((right - x as f64).round() as u32).min(image_width - x);
    let height = ((bottom - y as f64).round() as u32).min(image_height - y);

    if width == 0 || height == 0 {
        return None;
    }

    Some(PixelRect {
        x,
        y,
        width,
        height,
    })
}

/// Scale a crop into a slot: the face takes the full slot width, keeps the
/// crop's aspect ratio, and is centered vertically within the slot.
///
/// Callers must clamp the crop first; `crop_width` is never zero.
pub fn place_in_slot(slot: &Slot, crop_width: u32, crop_height: u32) -> Placement {
    let width = slot.width;
    let height = width * (crop_height as f64 / crop_width as f64);

    Placement {
        x: slot.x,
        y: slot.y + (slot.height - height) / 2.0,
        width,
        height,
    }
}

/// Whether the canvas pixel `(px, py)` falls inside the ellipse inscribed in
/// the slot rectangle, sampled at the pixel center.
pub fn ellipse_contains(slot: &Slot, px: u32, py: u32) -> bool {
    let rx = slot.width / 2.0;
    let ry = slot.height / 2.0;
    if rx <= 0.0 || ry <= 0.0 {
        return false;
    }

    let cx = slot.x + rx;
    let cy = slot.y + ry;
    let nx = (px as f64 + 0.5 - cx) / rx;
    let ny = (py as f64 + 0.5 - cy) / ry;
    nx * nx + ny * ny <= 1.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn face(x: f64, y: f64, w: f64, h: f64) -> FaceBox {
        FaceBox {
            x,
            y,
            width: w,
            height: h,
            confidence: 1.0,
        }
    }

    fn slot(x: f64, y: f64, w: f64, h: f64) -> Slot {
        Slot {
            x,
            y,
            width: w,
            height: h,
        }
    }

    #[test]
    fn crop_trims_ten_percent_off_the_top() {
        let crop = face_crop_rect(&face(0.0, 0.0, 100.0, 100.0));
        assert_eq!(crop.x, 0.0);
        assert_eq!(crop.y, 10.0);
        assert_eq!(crop.width, 100.0);
        assert_eq!(crop.height, 90.0);
    }

    #[test]
    fn crop_keeps_the_bottom_edge_fixed() {
        // y + 0.10h + 0.90h lands exactly on the original bottom edge
        let crop = face_crop_rect(&face(40.0, 60.0, 80.0, 120.0));
        assert_eq!(crop.y + crop.height, 60.0 + 120.0);
    }

    #[test]
    fn crop_leaves_x_and_width_alone() {
        let crop = face_crop_rect(&face(33.0, 5.0, 71.0, 44.0));
        assert_eq!(crop.x, 33.0);
        assert_eq!(crop.width, 71.0);
    }

    #[test]
    fn clamp_inside_image_is_identity() {
        let rect = CropRect {
            x: 10.0,
            y: 20.0,
            width: 50.0,
            height: 40.0,
        };
        let clamped = clamp_to_image(&rect, 200, 200).unwrap();
        assert_eq!(
            clamped,
            PixelRect {
                x: 10,
                y: 20,
                width: 50,
                height: 40
            }
        );
    }

    #[test]
    fn clamp_cuts_overhang_on_the_right() {
        let rect = CropRect {
            x: 150.0,
            y: 0.0,
            width: 100.0,
            height: 50.0,
        };
        let clamped = clamp_to_image(&rect, 200, 200).unwrap();
        assert_eq!(
            clamped,
            PixelRect {
                x: 150,
                y: 0,
                width: 50,
                height: 50
            }
        );
    }

    #[test]
    fn clamp_cuts_a_negative_origin() {
        let rect = CropRect {
            x: -30.0,
            y: -10.0,
            width: 60.0,
            height: 40.0,
        };
        let clamped = clamp_to_image(&rect, 200, 200).unwrap();
        assert_eq!(
            clamped,
            PixelRect {
                x: 0,
                y: 0,
                width: 30,
                height: 30
            }
        );
    }

    #[test]
    fn clamp_rejects_zero_area() {
        let rect = CropRect {
            x: 10.0,
            y: 10.0,
            width: 0.0,
            height: 40.0,
        };
        assert!(clamp_to_image(&rect, 200, 200).is_none());
    }

    #[test]
    fn clamp_rejects_fully_outside() {
        let rect = CropRect {
            x: 300.0,
            y: 10.0,
            width: 50.0,
            height: 40.0,
        };
        assert!(clamp_to_image(&rect, 200, 200).is_none());
    }

    #[test]
    fn clamp_rejects_degenerate_image() {
        let rect = CropRect {
            x: 0.0,
            y: 0.0,
            width: 10.0,
            height: 10.0,
        };
        assert!(clamp_to_image(&rect, 0, 200).is_none());
    }

    #[test]
    fn placement_fills_the_slot_width() {
        let p = place_in_slot(&slot(100.0, 320.0, 150.0, 150.0), 100, 90);
        assert_eq!(p.width, 150.0);
        assert_eq!(p.x, 100.0);
    }

    #[test]
    fn placement_preserves_the_crop_aspect() {
        // 150 wide at the crop's 100:90 aspect → 135 tall
        let p = place_in_slot(&slot(100.0, 320.0, 150.0, 150.0), 100, 90);
        assert_eq!(p.height, 135.0);
        assert!((p.height / p.width - 90.0 / 100.0).abs() < 1e-9);
    }

    #[test]
    fn placement_centers_vertically() {
        let p = place_in_slot(&slot(100.0, 320.0, 150.0, 150.0), 100, 90);
        // (150 - 135) / 2 = 7.5 below the slot top
        assert_eq!(p.y, 327.5);
        // equal space above and below
        assert_eq!(p.y - 320.0, (320.0 + 150.0) - (p.y + p.height));
    }

    #[test]
    fn tall_crop_overflows_the_slot_symmetrically() {
        // crop taller than the slot: the placement sticks out both ends equally
        let p = place_in_slot(&slot(0.0, 100.0, 100.0, 100.0), 50, 100);
        assert_eq!(p.height, 200.0);
        assert_eq!(p.y, 50.0);
    }

    #[test]
    fn ellipse_center_is_inside() {
        let s = slot(100.0, 100.0, 150.0, 150.0);
        assert!(ellipse_contains(&s, 175, 175));
    }

    #[test]
    fn ellipse_corners_are_outside() {
        let s = slot(100.0, 100.0, 150.0, 150.0);
        assert!(!ellipse_contains(&s, 100, 100));
        assert!(!ellipse_contains(&s, 249, 100));
        assert!(!ellipse_contains(&s, 100, 249));
        assert!(!ellipse_contains(&s, 249, 249));
    }

    #[test]
    fn ellipse_edge_midpoints_are_inside() {
        let s = slot(0.0, 0.0, 100.0, 60.0);
        assert!(ellipse_contains(&s, 50, 0));
        assert!(ellipse_contains(&s, 0, 30));
        assert!(ellipse_contains(&s, 99, 30));
        assert!(ellipse_contains(&s, 50, 59));
    }

    #[test]
    fn degenerate_slot_contains_nothing() {
        let s = slot(10.0, 10.0, 0.0, 60.0);
        assert!(!ellipse_contains(&s, 10, 30));
    }
}
