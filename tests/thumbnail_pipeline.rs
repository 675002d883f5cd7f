//! End-to-end tests of the public API: load → orient → thumbnail → save /
//! display, against real files in a temp directory.
//!
//! Run with: cargo test --test thumbnail_pipeline

use image::{DynamicImage, ImageEncoder, RgbImage};
use simple_thumb::config::ThumbConfig;
use simple_thumb::imaging::{FormatTag, Image, ImageBackend, ImageError, RustBackend, TempFiles};
use std::path::Path;
use tempfile::TempDir;

/// A JPEG whose pixels are wider than tall, tagged with an EXIF orientation.
fn tagged_jpeg(path: &Path, width: u32, height: u32, orientation: u16) {
    let pixels = RgbImage::from_fn(width, height, |x, _| image::Rgb([(x % 256) as u8, 40, 200]));
    let mut jpeg = Vec::new();
    image::codecs::jpeg::JpegEncoder::new(&mut jpeg)
        .write_image(pixels.as_raw(), width, height, image::ExtendedColorType::Rgb8)
        .unwrap();

    let mut exif = b"Exif\0\0MM\0\x2a\0\0\0\x08".to_vec();
    exif.extend_from_slice(&[0x00, 0x01, 0x01, 0x12, 0x00, 0x03, 0x00, 0x00, 0x00, 0x01]);
    exif.extend_from_slice(&orientation.to_be_bytes());
    exif.extend_from_slice(&[0x00, 0x00, 0x00, 0x00, 0x00, 0x00]);

    let mut out = jpeg[..2].to_vec();
    out.extend_from_slice(&[0xFF, 0xE1]);
    out.extend_from_slice(&((exif.len() + 2) as u16).to_be_bytes());
    out.extend_from_slice(&exif);
    out.extend_from_slice(&jpeg[2..]);
    std::fs::write(path, out).unwrap();
}

fn png(path: &Path, width: u32, height: u32) {
    DynamicImage::new_rgb8(width, height).save(path).unwrap();
}

#[test]
fn phone_photo_becomes_upright_thumbnail() {
    let backend = RustBackend::new();
    let tmp = TempDir::new().unwrap();
    let source = tmp.path().join("phone.jpg");
    tagged_jpeg(&source, 800, 600, 6);

    let photo = Image::load(&backend, &source).unwrap();
    assert_eq!((photo.width(), photo.height()), (800, 600));

    let mut thumb = photo
        .apply_exif_orientation(&backend)
        .unwrap()
        .thumbnail(&backend, 400)
        .unwrap();
    assert_eq!((thumb.width(), thumb.height()), (300, 400));

    let out_dir = tmp.path().join("thumbs");
    std::fs::create_dir(&out_dir).unwrap();
    let target = out_dir.join("phone.jpg");
    let written = thumb.save(&backend, &target).unwrap();
    assert_eq!(written, target);

    let probe = backend.probe(&written).unwrap();
    assert_eq!(probe.format, FormatTag::Jpeg);
    assert_eq!((probe.dimensions.width, probe.dimensions.height), (300, 400));
    // Encoded output carries no metadata
    assert!(backend.read_orientation(&written).orientation().is_none());
}

#[test]
fn one_source_feeds_several_thumbnails() {
    let backend = RustBackend::new();
    let tmp = TempDir::new().unwrap();
    let source = tmp.path().join("wide.png");
    png(&source, 1000, 250);

    let photo = Image::load(&backend, &source).unwrap();
    for (max, expected) in [(500, (500, 125)), (100, (100, 25)), (2000, (1000, 250))] {
        let thumb = photo.thumbnail(&backend, max).unwrap();
        assert_eq!((thumb.width(), thumb.height()), expected, "max {max}");
    }
    assert_eq!((photo.width(), photo.height()), (1000, 250));
}

#[test]
fn save_into_directory_keeps_file_name() {
    let backend = RustBackend::new();
    let tmp = TempDir::new().unwrap();
    let source = tmp.path().join("cover.png");
    png(&source, 64, 64);
    let out_dir = TempDir::new().unwrap();

    let mut image = Image::load(&backend, &source).unwrap();
    let written = image.save(&backend, out_dir.path()).unwrap();
    assert_eq!(written, out_dir.path().join("cover.png"));
    assert_eq!(image.last_saved_path(), Some(written.as_path()));
}

#[test]
fn format_follows_content_not_extension() {
    let backend = RustBackend::new();
    let tmp = TempDir::new().unwrap();
    let misnamed = tmp.path().join("actually_png.jpg");
    png(&misnamed, 10, 10);

    let mut image = Image::load(&backend, &misnamed).unwrap();
    assert_eq!(image.format(), Some(FormatTag::Png));

    let copy = tmp.path().join("copy.jpg");
    image.save(&backend, &copy).unwrap();
    assert_eq!(backend.probe(&copy).unwrap().format, FormatTag::Png);
}

#[test]
fn wbmp_round_trip() {
    let backend = RustBackend::new();
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("icon.wbmp");

    let mut image = Image::create(&backend, 13, 7).unwrap();
    image.set_format(FormatTag::Wbmp);
    image.save(&backend, &path).unwrap();

    let reloaded = Image::load(&backend, &path).unwrap();
    assert_eq!(reloaded.format(), Some(FormatTag::Wbmp));
    assert_eq!((reloaded.width(), reloaded.height()), (13, 7));
}

#[test]
fn display_response_then_scratch_file_is_gone() {
    let config = ThumbConfig::default();
    let backend = config.backend();
    let tmp = TempDir::new().unwrap();
    let scratch = TempDir::new().unwrap();
    let source = tmp.path().join("phone.jpg");
    tagged_jpeg(&source, 640, 480, 8);

    let mut thumb = Image::load(&backend, &source)
        .unwrap()
        .apply_exif_orientation(&backend)
        .unwrap()
        .thumbnail(&backend, 200)
        .unwrap();
    thumb.set_format(FormatTag::Webp);

    let temp = TempFiles {
        dir: scratch.path().to_path_buf(),
        prefix: config.display.temp_prefix.clone(),
    };
    let mut response = Vec::new();
    let shown = thumb.display_with(&backend, &temp, &mut response).unwrap();

    let head = format!(
        "Content-Type: image/webp\r\nContent-Length: {}\r\n\r\n",
        shown.body_bytes
    );
    assert!(response.starts_with(head.as_bytes()));
    let body = &response[head.len()..];
    assert_eq!(body.len() as u64, shown.body_bytes);
    assert_eq!(&body[..4], b"RIFF");

    let decoded = image::load_from_memory(body).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (150, 200));

    assert!(!shown.path.exists());
    assert_eq!(std::fs::read_dir(scratch.path()).unwrap().count(), 0);
}

#[test]
fn errors_are_typed() {
    let backend = RustBackend::new();
    let tmp = TempDir::new().unwrap();

    assert!(matches!(
        Image::load(&backend, tmp.path().join("missing.png")),
        Err(ImageError::NotFound(_))
    ));
    assert!(matches!(
        Image::create(&backend, 0, 0),
        Err(ImageError::Allocation { .. })
    ));

    let blank = Image::create(&backend, 4, 4).unwrap();
    assert!(matches!(
        blank.apply_exif_orientation(&backend),
        Err(ImageError::Precondition(_))
    ));
    assert!(matches!(
        blank.thumbnail(&backend, 0),
        Err(ImageError::Precondition(_))
    ));
}
