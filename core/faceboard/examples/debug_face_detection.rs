//! Run SeetaFace detection on a photo and print the crops the board
//! pipeline would cut from it.
//!
//! Usage:
//!   cargo run --example debug_face_detection --features rustface -- <model.bin> <photo>

use faceboard::{FaceDetector, RustfaceDetector};

fn main() {
    let mut args = std::env::args().skip(1);
    let (model_path, photo_path) = match (args.next(), args.next()) {
        (Some(m), Some(p)) => (m, p),
        _ => {
            eprintln!("usage: debug_face_detection <model.bin> <photo>");
            std::process::exit(2);
        }
    };

    let detector = RustfaceDetector::from_model_path(&model_path).expect("failed to load model");

    let input = std::fs::read(&photo_path).expect("failed to read photo");
    let image = image::load_from_memory(&input).expect("failed to decode photo");
    let gray = image::imageops::grayscale(&image);
    let (width, height) = (gray.width(), gray.height());

    println!("=== {photo_path} ({width}x{height}) ===");

    let faces = detector.detect(gray.as_raw(), width, height);
    if faces.is_empty() {
        println!("  NO FACES DETECTED");
        return;
    }

    println!("  Found {} face(s):", faces.len());
    for (i, face) in faces.iter().enumerate() {
        // the pipeline trims the top 10% of each box before scaling
        let crop_y = face.y + face.height * 0.10;
        let crop_h = face.height * 0.90;
        println!(
            "    face {i}: score={:.2}, bbox=({:.0}, {:.0}, {:.0}x{:.0}), crop=({:.0}, {:.0}, {:.0}x{:.0})",
            face.confidence,
            face.x,
            face.y,
            face.width,
            face.height,
            face.x,
            crop_y,
            face.width,
            crop_h,
        );
    }
}
