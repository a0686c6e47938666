//! PDF emission with printpdf

use crate::error::{ExportError, Result};
use crate::layout::{Element, Page, PAGE_HEIGHT, PAGE_WIDTH};
use printpdf::{BuiltinFont, Image, ImageTransform, Mm, PdfDocument};
use tracing::debug;

const MM_PER_PT: f64 = 25.4 / 72.0;

fn mm(pt: f64) -> Mm {
    Mm((pt * MM_PER_PT) as f32)
}

/// Top-down points to the PDF's bottom-up millimetres.
fn flip(y: f64) -> Mm {
    mm(PAGE_HEIGHT - y)
}

/// Write `pages` to PDF bytes, embedding `png` wherever an image element
/// appears.
pub fn render_pdf(title: &str, pages: &[Page], png: &[u8]) -> Result<Vec<u8>> {
    let pdf_err = |e: &dyn std::fmt::Display| ExportError::Pdf(e.to_string());

    let (doc, first_page, first_layer) =
        PdfDocument::new(title, mm(PAGE_WIDTH), mm(PAGE_HEIGHT), "Layer 1");
    let regular = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| pdf_err(&e))?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| pdf_err(&e))?;

    let decoded = printpdf::image_crate::load_from_memory(png).map_err(|e| pdf_err(&e))?;
    let (px_w, px_h) = (decoded.width(), decoded.height());
    let rgb = printpdf::image_crate::DynamicImage::ImageRgb8(decoded.to_rgb8());

    for (i, page) in pages.iter().enumerate() {
        let (page_idx, layer_idx) = if i == 0 {
            (first_page, first_layer)
        } else {
            doc.add_page(mm(PAGE_WIDTH), mm(PAGE_HEIGHT), format!("Layer {}", i + 1))
        };
        let layer = doc.get_page(page_idx).get_layer(layer_idx);

        for element in &page.elements {
            match element {
                Element::Text { text, x, y, size, bold: is_bold } => {
                    let font = if *is_bold { &bold } else { &regular };
                    layer.use_text(text.clone(), *size as f32, mm(*x), flip(*y), font);
                }
                Element::Image { x, y, width, height } => {
                    // At 72 dpi one pixel is one point before scaling.
                    let image = Image::from_dynamic_image(&rgb);
                    image.add_to_layer(
                        layer.clone(),
                        ImageTransform {
                            translate_x: Some(mm(*x)),
                            translate_y: Some(flip(y + height)),
                            scale_x: Some((*width / f64::from(px_w)) as f32),
                            scale_y: Some((*height / f64::from(px_h)) as f32),
                            dpi: Some(72.0),
                            ..Default::default()
                        },
                    );
                }
            }
        }
    }

    let bytes = doc.save_to_bytes().map_err(|e| pdf_err(&e))?;
    debug!("Wrote {} page(s), {} bytes", pages.len(), bytes.len());
    Ok(bytes)
}
