//! Serialize laid-out pages into a PDF byte stream.
//!
//! The writer only uses the standard Helvetica faces, so no font program is
//! embedded. Nothing time- or randomness-dependent is written; the same
//! pages always produce the same bytes.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream, StringFormat};

use super::fonts::{text_width, FontWeight};
use super::logo::{JpegImage, LogoSet};
use super::page::{Align, DrawOp, LogoSlot, Page, PAGE_HEIGHT, PAGE_WIDTH};
use super::GeneratorError;

const PDF_VERSION: &str = "1.5";

/// Write `pages` as a PDF document. Image placeholders whose slot has no
/// logo in `logos` are skipped.
pub fn write_pdf(pages: &[Page], logos: &LogoSet) -> Result<Vec<u8>, GeneratorError> {
    let mut doc = Document::with_version(PDF_VERSION);
    let pages_id = doc.new_object_id();

    let mut fonts = Dictionary::new();
    for weight in [FontWeight::Regular, FontWeight::Bold] {
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => weight.base_font(),
            "Encoding" => "WinAnsiEncoding",
        });
        fonts.set(weight.resource_name(), font_id);
    }

    let mut xobjects = Dictionary::new();
    let mut has_logos = false;
    for slot in [LogoSlot::Left, LogoSlot::Right] {
        if let Some(image) = logos.get(slot) {
            let image_id = doc.add_object(image_stream(image));
            xobjects.set(xobject_name(slot), image_id);
            has_logos = true;
        }
    }

    let mut resources = dictionary! { "Font" => fonts };
    if has_logos {
        resources.set("XObject", xobjects);
    }
    let resources_id = doc.add_object(resources);

    let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
    for page in pages {
        let content = Content {
            operations: page_operations(page, logos),
        };
        let encoded = content
            .encode()
            .map_err(|e| GeneratorError::Pdf(e.to_string()))?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));
        let page_id: ObjectId = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let page_count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_count,
            "Resources" => resources_id,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                real(PAGE_WIDTH),
                real(PAGE_HEIGHT),
            ],
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)
        .map_err(|e| GeneratorError::Pdf(e.to_string()))?;
    Ok(bytes)
}

fn xobject_name(slot: LogoSlot) -> &'static str {
    match slot {
        LogoSlot::Left => "LogoLeft",
        LogoSlot::Right => "LogoRight",
    }
}

fn image_stream(image: &JpegImage) -> Stream {
    let mut stream = Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => i64::from(image.width),
            "Height" => i64::from(image.height),
            "ColorSpace" => image.color_space.pdf_name(),
            "BitsPerComponent" => 8_i64,
            "Filter" => "DCTDecode",
        },
        image.data.clone(),
    );
    // Already DCT-compressed.
    stream.allows_compression = false;
    stream
}

fn page_operations(page: &Page, logos: &LogoSet) -> Vec<Operation> {
    let mut ops = Vec::new();
    for op in &page.ops {
        match op {
            DrawOp::Text {
                x,
                y,
                size,
                weight,
                align,
                content,
            } => {
                let width = text_width(content, *weight, *size);
                let left = match align {
                    Align::Left => *x,
                    Align::Center => *x - width / 2.0,
                    Align::Right => *x - width,
                };
                ops.push(Operation::new("BT", vec![]));
                ops.push(Operation::new(
                    "Tf",
                    vec![weight.resource_name().into(), real(*size)],
                ));
                ops.push(Operation::new("Td", vec![real(left), real(flip(*y))]));
                ops.push(Operation::new(
                    "Tj",
                    vec![Object::String(win_ansi(content), StringFormat::Literal)],
                ));
                ops.push(Operation::new("ET", vec![]));
            }
            DrawOp::Line {
                x1,
                y1,
                x2,
                y2,
                width,
            } => {
                ops.push(Operation::new("q", vec![]));
                ops.push(Operation::new("w", vec![real(*width)]));
                ops.push(Operation::new("m", vec![real(*x1), real(flip(*y1))]));
                ops.push(Operation::new("l", vec![real(*x2), real(flip(*y2))]));
                ops.push(Operation::new("S", vec![]));
                ops.push(Operation::new("Q", vec![]));
            }
            DrawOp::Rect {
                x,
                y,
                width,
                height,
                fill_gray,
                stroke,
            } => {
                let paint = match (fill_gray, *stroke) {
                    (Some(_), true) => "B",
                    (Some(_), false) => "f",
                    (None, true) => "S",
                    (None, false) => continue,
                };
                ops.push(Operation::new("q", vec![]));
                if let Some(gray) = fill_gray {
                    ops.push(Operation::new("g", vec![real(*gray)]));
                }
                ops.push(Operation::new("w", vec![real(0.75)]));
                ops.push(Operation::new(
                    "re",
                    vec![
                        real(*x),
                        real(flip(*y + *height)),
                        real(*width),
                        real(*height),
                    ],
                ));
                ops.push(Operation::new(paint, vec![]));
                ops.push(Operation::new("Q", vec![]));
            }
            DrawOp::Image {
                slot,
                x,
                y,
                width,
                height,
            } => {
                let Some(image) = logos.get(*slot) else {
                    continue;
                };
                // Fit inside the placeholder, keeping the aspect ratio.
                let scale = (*width / f32::from(image.width))
                    .min(*height / f32::from(image.height));
                let drawn_width = f32::from(image.width) * scale;
                let drawn_height = f32::from(image.height) * scale;
                let left = *x + (*width - drawn_width) / 2.0;
                let top = *y + (*height - drawn_height) / 2.0;

                ops.push(Operation::new("q", vec![]));
                ops.push(Operation::new(
                    "cm",
                    vec![
                        real(drawn_width),
                        real(0.0),
                        real(0.0),
                        real(drawn_height),
                        real(left),
                        real(flip(top + drawn_height)),
                    ],
                ));
                ops.push(Operation::new("Do", vec![xobject_name(*slot).into()]));
                ops.push(Operation::new("Q", vec![]));
            }
        }
    }
    ops
}

/// Top-down layout space to bottom-up PDF space.
fn flip(y: f32) -> f32 {
    PAGE_HEIGHT - y
}

fn real(value: f32) -> Object {
    Object::Real(value)
}

/// Encode text for a WinAnsi font. Characters outside Latin-1 print as `?`.
fn win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|ch| match ch as u32 {
            code @ 0x20..=0x7E | code @ 0xA0..=0xFF => code as u8,
            _ => b'?',
        })
        .collect()
}
