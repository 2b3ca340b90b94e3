//! Render a complete board from synthetic artwork, no external files needed.
//!
//! Usage:
//!   cargo run --example render_board
//!
//! Output goes to `tests/fixtures/output/`.

use std::path::Path;

use faceboard::{encode_png, FaceBox, FaceDetector, MemoryAssets, SessionBuilder, TemplateCatalog};
use image::{Rgba, RgbaImage};

const FIXTURE_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../../tests/fixtures");

const CATALOG: &str = r#"[
    {
        "id": "night-sky",
        "label": "Night Sky",
        "background": "night_sky_bg.png",
        "slots": [
            { "x": 90, "y": 300, "width": 150, "height": 150 },
            { "x": 325, "y": 260, "width": 150, "height": 150 },
            { "x": 560, "y": 300, "width": 150, "height": 150 }
        ]
    }
]"#;

/// Boxes matching the three heads painted by `group_photo`.
struct ScriptedDetector;

impl FaceDetector for ScriptedDetector {
    fn detect(&self, _gray: &[u8], _width: u32, _height: u32) -> Vec<FaceBox> {
        vec![
            FaceBox {
                x: 40.0,
                y: 60.0,
                width: 120.0,
                height: 120.0,
                confidence: 9.5,
            },
            FaceBox {
                x: 240.0,
                y: 40.0,
                width: 130.0,
                height: 130.0,
                confidence: 8.1,
            },
            FaceBox {
                x: 440.0,
                y: 70.0,
                width: 110.0,
                height: 110.0,
                confidence: 7.4,
            },
        ]
    }
}

fn starfield(width: u32, height: u32) -> RgbaImage {
    let mut img = RgbaImage::from_pixel(width, height, Rgba([8, 10, 40, 255]));
    for i in 0..400u32 {
        // deterministic scatter
        let x = (i * 73 + 19) % width;
        let y = (i * 151 + 7) % height;
        img.put_pixel(x, y, Rgba([230, 230, 255, 255]));
    }
    img
}

fn group_photo(width: u32, height: u32) -> RgbaImage {
    let mut img = RgbaImage::from_pixel(width, height, Rgba([90, 140, 90, 255]));
    // three round heads where the scripted detector reports faces
    let heads: [(i64, i64, i64); 3] = [(100, 120, 60), (305, 105, 65), (495, 125, 55)];
    for (cx, cy, r) in heads {
        for y in (cy - r).max(0)..(cy + r).min(height as i64) {
            for x in (cx - r).max(0)..(cx + r).min(width as i64) {
                let dx = x - cx;
                let dy = y - cy;
                if dx * dx + dy * dy <= r * r {
                    img.put_pixel(x as u32, y as u32, Rgba([225, 180, 150, 255]));
                }
            }
        }
    }
    img
}

fn main() {
    env_logger::init();

    let output_dir = Path::new(FIXTURE_DIR).join("output");
    std::fs::create_dir_all(&output_dir).expect("failed to create output directory");

    let assets = MemoryAssets::new();
    assets.insert("night_sky_bg.png", encode_png(&starfield(400, 300)).unwrap());

    let catalog = TemplateCatalog::from_json(CATALOG).unwrap();
    let mut session = SessionBuilder::new(catalog, Box::new(assets))
        .face_detector(Box::new(ScriptedDetector))
        .build()
        .unwrap();

    session.select_template("night-sky").unwrap();

    let photo = encode_png(&group_photo(600, 400)).unwrap();
    let report = session
        .upload_photo(&photo, "NIGHT CREW", "ALL TOGETHER")
        .unwrap();
    println!(
        "composited: {} detected, {} painted, {} slots unfilled",
        report.faces_detected, report.faces_painted, report.slots_unfilled
    );

    let board_path = output_dir.join("board.png");
    std::fs::write(&board_path, session.render().to_png().unwrap()).unwrap();
    println!("  board: {}", board_path.display());

    for (i, preview) in session.previews().iter().enumerate() {
        let path = output_dir.join(format!("preview_{i}.png"));
        std::fs::write(&path, encode_png(preview).unwrap()).unwrap();
        println!(
            "  preview {i}: {} ({}x{})",
            path.display(),
            preview.width(),
            preview.height()
        );
    }

    // swap the caption without recompositing
    session.refresh_text("NIGHT CREW", "WINTER TOUR");
    let refreshed_path = output_dir.join("board_refreshed.png");
    std::fs::write(&refreshed_path, session.render().to_png().unwrap()).unwrap();
    println!("  refreshed: {}", refreshed_path.display());
}
