//! Page layout of the exported document
//!
//! Coordinates are PDF points measured from the top-left corner of the page;
//! text `y` is the baseline. Conversion to the PDF's bottom-up space happens
//! only when the document is written.

use crate::error::{ExportError, Result};
use mindmap_core::GraphStore;

/// A4 landscape, in points.
pub const PAGE_WIDTH: f64 = 841.89;
pub const PAGE_HEIGHT: f64 = 595.28;

pub const TITLE_SIZE: f64 = 20.0;
pub const TITLE_Y: f64 = 40.0;
/// Height reserved at the top of the first page for the title.
pub const TITLE_BAND: f64 = 60.0;

pub const HEADER_SIZE: f64 = 16.0;
pub const HEADER_Y: f64 = 50.0;
pub const DETAILS_HEADER: &str = "Node details";
pub const DETAILS_HEADER_CONTINUED: &str = "Node details (continued)";

pub const BODY_SIZE: f64 = 10.0;
pub const BODY_START_Y: f64 = 80.0;
pub const NAME_X: f64 = 40.0;
pub const FIELD_X: f64 = 50.0;
pub const LINE_HEIGHT: f64 = 12.0;
pub const BLOCK_SPACING: f64 = 15.0;
/// A new entry starts on a fresh page once `y` passes this.
pub const ENTRY_LIMIT_Y: f64 = PAGE_HEIGHT - 60.0;
/// Lowest baseline a description line may use.
pub const LINE_LIMIT_Y: f64 = PAGE_HEIGHT - 20.0;

/// Helvetica advance widths for ASCII 32..=126, in thousandths of an em.
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '../
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // 0..?
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // @..O
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // P.._
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // `..o
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // p..~
];
const DEFAULT_WIDTH: u16 = 556;

/// Rendered width of `text` in Helvetica at `size` points.
pub fn text_width(text: &str, size: f64) -> f64 {
    let units: u32 = text
        .chars()
        .map(|c| {
            let code = c as u32;
            if (32..=126).contains(&code) {
                u32::from(HELVETICA_WIDTHS[(code - 32) as usize])
            } else {
                u32::from(DEFAULT_WIDTH)
            }
        })
        .sum();
    f64::from(units) * size / 1000.0
}

/// Greedy word wrap to `max_width`. Words wider than a line are broken.
pub fn wrap_text(text: &str, max_width: f64, size: f64) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{current} {word}")
        };
        if text_width(&candidate, size) <= max_width {
            current = candidate;
            continue;
        }
        if !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        for ch in word.chars() {
            current.push(ch);
            if text_width(&current, size) > max_width && current.chars().count() > 1 {
                current.pop();
                lines.push(std::mem::take(&mut current));
                current.push(ch);
            }
        }
    }
    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    Text { text: String, x: f64, y: f64, size: f64, bold: bool },
    /// The captured diagram; `y` is the top edge.
    Image { x: f64, y: f64, width: f64, height: f64 },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub elements: Vec<Element>,
}

impl Page {
    fn text(&mut self, text: impl Into<String>, x: f64, y: f64, size: f64, bold: bool) {
        self.elements.push(Element::Text { text: text.into(), x, y, size, bold });
    }

    /// All text on the page, in drawing order.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.elements.iter().filter_map(|e| match e {
            Element::Text { text, .. } => Some(text.as_str()),
            Element::Image { .. } => None,
        })
    }
}

/// One node as listed in the details section.
#[derive(Debug, Clone, PartialEq)]
pub struct DetailEntry {
    pub label: String,
    pub is_custom: bool,
    pub category: String,
    pub description: String,
}

/// Non-root nodes sorted by label, ignoring case.
pub fn detail_entries(store: &GraphStore) -> Vec<DetailEntry> {
    let mut entries: Vec<DetailEntry> = store
        .all()
        .filter(|n| !n.is_central)
        .map(|n| DetailEntry {
            label: n.label.clone(),
            is_custom: n.is_custom,
            category: n.category.clone(),
            description: n.description.clone(),
        })
        .collect();
    entries.sort_by(|a, b| {
        a.label
            .to_lowercase()
            .cmp(&b.label.to_lowercase())
            .then_with(|| a.label.cmp(&b.label))
    });
    entries
}

/// Placement of an image of `image_px` pixels on the first page: as large as
/// fits below the title band, aspect ratio kept, centred.
pub fn fit_image(image_px: (u32, u32)) -> Result<Element> {
    let (w, h) = image_px;
    if w == 0 || h == 0 {
        return Err(ExportError::Layout(format!("image has no area ({w}x{h})")));
    }
    let area_width = PAGE_WIDTH - 40.0;
    let area_height = PAGE_HEIGHT - TITLE_BAND - 20.0;
    let ratio = f64::from(w) / f64::from(h);

    let (mut width, mut height) = (area_width, area_width / ratio);
    if height > area_height {
        height = area_height;
        width = area_height * ratio;
    }
    let x = (PAGE_WIDTH - width) / 2.0;
    let y = (TITLE_BAND + (area_height - height) / 2.0).max(TITLE_BAND);
    Ok(Element::Image { x, y, width, height })
}

fn or_na(value: &str) -> &str {
    if value.trim().is_empty() { "N/A" } else { value }
}

/// Lay out the whole document: a title page with the diagram, then the
/// paginated details section when there are entries.
pub fn layout(title: &str, image_px: (u32, u32), entries: &[DetailEntry]) -> Result<Vec<Page>> {
    let mut first = Page::default();
    let title_x = (PAGE_WIDTH - text_width(title, TITLE_SIZE)) / 2.0;
    first.text(title, title_x, TITLE_Y, TITLE_SIZE, true);
    first.elements.push(fit_image(image_px)?);

    let mut pages = vec![first];
    if entries.is_empty() {
        return Ok(pages);
    }

    let max_width = PAGE_WIDTH - 80.0;
    let mut page = Page::default();
    page.text(DETAILS_HEADER, NAME_X, HEADER_Y, HEADER_SIZE, true);
    let mut y = BODY_START_Y;

    let mut next_page = |page: &mut Page| {
        pages.push(std::mem::take(page));
        page.text(DETAILS_HEADER_CONTINUED, NAME_X, HEADER_Y, HEADER_SIZE, true);
        BODY_START_Y
    };

    for entry in entries {
        if y > ENTRY_LIMIT_Y {
            y = next_page(&mut page);
        }

        let name = if entry.is_custom {
            format!("Node: {} (custom)", entry.label)
        } else {
            format!("Node: {}", entry.label)
        };
        page.text(name, NAME_X, y, BODY_SIZE, true);
        y += LINE_HEIGHT + 2.0;

        page.text(format!("Category: {}", or_na(&entry.category)), FIELD_X, y, BODY_SIZE, false);
        y += LINE_HEIGHT + 2.0;

        let description = format!("Description: {}", or_na(&entry.description));
        for line in wrap_text(&description, max_width, BODY_SIZE) {
            if y > LINE_LIMIT_Y {
                y = next_page(&mut page);
            }
            page.text(line, FIELD_X, y, BODY_SIZE, false);
            y += LINE_HEIGHT;
        }
        y += BLOCK_SPACING;
    }
    pages.push(page);
    Ok(pages)
}
