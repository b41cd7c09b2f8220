//! In-memory image fixtures for pipeline tests.

use exif::experimental::Writer;
use exif::{Field, In, Tag, Value};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use std::io::Cursor;
use std::path::{Path, PathBuf};

/// A small baseline JPEG whose pixels depend on `seed`.
pub fn jpeg_bytes(width: u32, height: u32, seed: u8) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, y| {
        Rgb([
            (x as u8).wrapping_mul(7) ^ seed,
            (y as u8).wrapping_mul(13),
            seed.wrapping_add((x + y) as u8),
        ])
    });
    let mut buf = Vec::new();
    DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut buf), ImageFormat::Jpeg)
        .unwrap();
    buf
}

pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_pixel(width, height, Rgb([10, 200, 30]));
    let mut buf = Vec::new();
    DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .unwrap();
    buf
}

/// EXIF APP1 segment holding a single primary-IFD field.
fn app1_segment(field: Field) -> Vec<u8> {
    let mut writer = Writer::new();
    writer.push_field(&field);
    let mut tiff = Cursor::new(Vec::new());
    writer.write(&mut tiff, false).unwrap();
    let tiff = tiff.into_inner();

    // Length covers itself, the "Exif\0\0" header and the TIFF block
    let len = u16::try_from(2 + 6 + tiff.len()).unwrap();
    let mut segment = vec![0xFF, 0xE1];
    segment.extend_from_slice(&len.to_be_bytes());
    segment.extend_from_slice(b"Exif\0\0");
    segment.extend_from_slice(&tiff);
    segment
}

/// Splice an EXIF segment in right after the JPEG SOI marker.
fn splice_after_soi(jpeg: &[u8], segment: &[u8]) -> Vec<u8> {
    assert_eq!(&jpeg[..2], &[0xFF, 0xD8]);
    let mut out = Vec::with_capacity(jpeg.len() + segment.len());
    out.extend_from_slice(&jpeg[..2]);
    out.extend_from_slice(segment);
    out.extend_from_slice(&jpeg[2..]);
    out
}

/// The same JPEG with tag 306 (DateTime) set to `datetime`.
pub fn with_exif_datetime(jpeg: &[u8], datetime: &str) -> Vec<u8> {
    let field = Field {
        tag: Tag::DateTime,
        ifd_num: In::PRIMARY,
        value: Value::Ascii(vec![datetime.as_bytes().to_vec()]),
    };
    splice_after_soi(jpeg, &app1_segment(field))
}

/// The same JPEG with an EXIF block that has no date tag.
pub fn with_exif_make(jpeg: &[u8], make: &str) -> Vec<u8> {
    let field = Field {
        tag: Tag::Make,
        ifd_num: In::PRIMARY,
        value: Value::Ascii(vec![make.as_bytes().to_vec()]),
    };
    splice_after_soi(jpeg, &app1_segment(field))
}

/// The same JPEG with tag 306 stored as a number instead of text.
pub fn with_numeric_datetime(jpeg: &[u8]) -> Vec<u8> {
    let field = Field {
        tag: Tag::DateTime,
        ifd_num: In::PRIMARY,
        value: Value::Long(vec![1_577_872_800]),
    };
    splice_after_soi(jpeg, &app1_segment(field))
}

pub fn write(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, bytes).unwrap();
    path
}
