//! Build a PDF with one full-page image per page.

use std::fs;
use std::path::{Path, PathBuf};

use image::{DynamicImage, GenericImageView, ImageFormat, ImageReader, Rgb, RgbImage};
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, Stream};
use tracing::{info, warn};

use crate::error::{Result, ToolError};
use crate::report::Report;

/// Extensions picked up when a directory is given as input.
pub const IMAGE_EXTENSIONS: [&str; 7] = ["jpg", "jpeg", "png", "bmp", "gif", "tiff", "webp"];

/// Image data ready to be written as an XObject.
struct EmbeddedImage {
    width: u32,
    height: u32,
    stream: Stream,
}

fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| IMAGE_EXTENSIONS.iter().any(|x| e.eq_ignore_ascii_case(x)))
}

/// Expand directories (non-recursive, sorted by name) and keep files as given.
pub fn collect_images(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut images = Vec::new();
    for input in inputs {
        if input.is_dir() {
            let mut found: Vec<PathBuf> = fs::read_dir(input)?
                .filter_map(|entry| entry.ok().map(|e| e.path()))
                .filter(|p| p.is_file() && has_image_extension(p))
                .collect();
            found.sort();
            images.extend(found);
        } else if input.is_file() {
            images.push(input.clone());
        } else {
            return Err(ToolError::MissingInput(input.clone()));
        }
    }
    Ok(images)
}

/// Composite transparent pixels over white and drop the alpha channel.
fn flatten_on_white(image: &DynamicImage) -> RgbImage {
    let rgba = image.to_rgba8();
    let mut out = RgbImage::new(rgba.width(), rgba.height());
    for (x, y, px) in rgba.enumerate_pixels() {
        let [r, g, b, a] = px.0;
        let alpha = a as u32;
        let blend = |c: u8| ((c as u32 * alpha + 255 * (255 - alpha)) / 255) as u8;
        out.put_pixel(x, y, Rgb([blend(r), blend(g), blend(b)]));
    }
    out
}

/// Number of color components declared by the first SOF segment of a JPEG
/// stream, or `None` when no frame header is found.
fn jpeg_components(bytes: &[u8]) -> Option<u8> {
    if !bytes.starts_with(&[0xFF, 0xD8]) {
        return None;
    }
    let mut pos = 2;
    while pos + 1 < bytes.len() {
        if bytes[pos] != 0xFF {
            return None;
        }
        let marker = bytes[pos + 1];
        pos += 2;
        match marker {
            // fill bytes
            0xFF => pos -= 1,
            0x01 | 0xD0..=0xD7 => {}
            0xD9 | 0xDA => return None,
            _ => {
                let length = u16::from_be_bytes([*bytes.get(pos)?, *bytes.get(pos + 1)?]) as usize;
                // SOF0..SOF15, minus DHT (C4), JPG (C8) and DAC (CC)
                if (0xC0..=0xCF).contains(&marker) && !matches!(marker, 0xC4 | 0xC8 | 0xCC) {
                    return bytes.get(pos + 7).copied();
                }
                pos += length;
            }
        }
    }
    None
}

fn embed(path: &Path) -> Result<EmbeddedImage> {
    let reader = ImageReader::open(path)?.with_guessed_format()?;
    let format = reader.format();
    let image = reader.decode()?;
    let (width, height) = image.dimensions();

    let mut dict = Dictionary::new();
    dict.set("Type", Object::Name(b"XObject".to_vec()));
    dict.set("Subtype", Object::Name(b"Image".to_vec()));
    dict.set("Width", Object::Integer(width as i64));
    dict.set("Height", Object::Integer(height as i64));
    dict.set("BitsPerComponent", Object::Integer(8));

    // JPEGs in gray or RGB are passed through untouched. CMYK and YCCK
    // data decodes to RGB, so the raw stream would not match DeviceRGB.
    let passthrough = match format {
        Some(ImageFormat::Jpeg) => {
            let bytes = fs::read(path)?;
            match (jpeg_components(&bytes), image.color()) {
                (Some(1), image::ColorType::L8) => Some(("DeviceGray", bytes)),
                (Some(3), image::ColorType::Rgb8) => Some(("DeviceRGB", bytes)),
                _ => None,
            }
        }
        _ => None,
    };
    let stream = match passthrough {
        Some((space, bytes)) => {
            dict.set("ColorSpace", Object::Name(space.as_bytes().to_vec()));
            dict.set("Filter", Object::Name(b"DCTDecode".to_vec()));
            Stream::new(dict, bytes).with_compression(false)
        }
        None => {
            dict.set("ColorSpace", Object::Name(b"DeviceRGB".to_vec()));
            Stream::new(dict, flatten_on_white(&image).into_raw())
        }
    };

    Ok(EmbeddedImage {
        width,
        height,
        stream,
    })
}

/// Write every readable image in `inputs` to `output`, one page each.
pub fn images_to_pdf(inputs: &[PathBuf], output: &Path) -> Result<Report> {
    let images = collect_images(inputs)?;
    if images.is_empty() {
        return Err(ToolError::InvalidInput("no image files found".to_string()));
    }

    let mut report = Report::new("image-to-pdf");
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let mut kids = Vec::new();

    for path in &images {
        let embedded = match embed(path) {
            Ok(embedded) => embedded,
            Err(e) => {
                warn!("Skipping {}: {}", path.display(), e);
                report.push_failure(path, &e);
                continue;
            }
        };

        let (w, h) = (embedded.width as f32, embedded.height as f32);
        let image_id = doc.add_object(embedded.stream);
        let content = Content {
            operations: vec![
                Operation::new("q", vec![]),
                Operation::new("cm", vec![w.into(), 0.into(), 0.into(), h.into(), 0.into(), 0.into()]),
                Operation::new("Do", vec![Object::Name(b"Im0".to_vec())]),
                Operation::new("Q", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(Dictionary::new(), content.encode()?));

        let mut xobjects = Dictionary::new();
        xobjects.set("Im0", Object::Reference(image_id));
        let mut resources = Dictionary::new();
        resources.set("XObject", Object::Dictionary(xobjects));

        let mut page = Dictionary::new();
        page.set("Type", Object::Name(b"Page".to_vec()));
        page.set("Parent", Object::Reference(pages_id));
        page.set(
            "MediaBox",
            Object::Array(vec![0.into(), 0.into(), w.into(), h.into()]),
        );
        page.set("Resources", Object::Dictionary(resources));
        page.set("Contents", Object::Reference(content_id));
        kids.push(Object::Reference(doc.add_object(page)));
    }

    if kids.is_empty() {
        return Err(ToolError::InvalidInput(format!(
            "none of the {} images could be read",
            images.len()
        )));
    }

    let page_count = kids.len();
    let mut pages = Dictionary::new();
    pages.set("Type", Object::Name(b"Pages".to_vec()));
    pages.set("Count", Object::Integer(page_count as i64));
    pages.set("Kids", Object::Array(kids));
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let mut catalog = Dictionary::new();
    catalog.set("Type", Object::Name(b"Catalog".to_vec()));
    catalog.set("Pages", Object::Reference(pages_id));
    let catalog_id = doc.add_object(catalog);
    doc.trailer.set("Root", Object::Reference(catalog_id));

    doc.compress();
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    doc.save(output)?;
    info!("Wrote {} pages to {}", page_count, output.display());

    report.push_output(output);
    Ok(report.with_summary(format!(
        "converted {} of {} images",
        page_count,
        images.len()
    )))
}
