//! PDF rendering of meeting minutes.
//!
//! Each section renders as a bold heading derived from its key, followed by
//! one body paragraph per line of text. Line wrapping and pagination are
//! delegated to genpdf.

use crate::error::{ReferatError, Result};
use crate::extraction::Category;
use genpdf::elements::{Break, Paragraph};
use genpdf::fonts::{FontData, FontFamily};
use genpdf::style::Style;
use genpdf::{Element, PaperSize, SimplePageDecorator};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

/// Common system locations searched for a usable sans-serif TTF pair.
const FONT_CANDIDATES: &[(&str, Option<&str>)] = &[
    (
        "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
        Some("/usr/share/fonts/truetype/liberation/LiberationSans-Bold.ttf"),
    ),
    (
        "/usr/share/fonts/truetype/liberation2/LiberationSans-Regular.ttf",
        Some("/usr/share/fonts/truetype/liberation2/LiberationSans-Bold.ttf"),
    ),
    (
        "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
        Some("/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf"),
    ),
    (
        "/usr/share/fonts/TTF/DejaVuSans.ttf",
        Some("/usr/share/fonts/TTF/DejaVuSans-Bold.ttf"),
    ),
    (
        "/usr/share/fonts/truetype/freefont/FreeSans.ttf",
        Some("/usr/share/fonts/truetype/freefont/FreeSansBold.ttf"),
    ),
    ("/System/Library/Fonts/Supplemental/Arial.ttf", None),
];

/// Renders section maps into paginated PDF documents.
pub struct PdfRenderer {
    font_dir: Option<PathBuf>,
}

impl PdfRenderer {
    /// Create a renderer. When `font_dir` is set, it is searched for TTF
    /// fonts before the system locations.
    pub fn new(font_dir: Option<PathBuf>) -> Self {
        Self { font_dir }
    }

    /// Render sections to a PDF at `dest`, in the given order.
    #[instrument(skip(self, sections), fields(sections = sections.len(), dest = %dest.display()))]
    pub fn render(&self, sections: &[(String, String)], dest: &Path) -> Result<()> {
        let fonts = self.load_fonts()?;

        let mut doc = genpdf::Document::new(fonts);
        doc.set_title("Meeting Minutes");
        doc.set_paper_size(PaperSize::Letter);

        let mut decorator = SimplePageDecorator::new();
        decorator.set_margins(15);
        doc.set_page_decorator(decorator);

        for (key, text) in sections {
            let heading_style = Style::new().bold().with_font_size(16);
            doc.push(Paragraph::new(heading_from_key(key)).styled(heading_style));
            doc.push(Break::new(0.5));

            for line in text.split('\n') {
                if line.trim().is_empty() {
                    doc.push(Break::new(0.5));
                } else {
                    doc.push(Paragraph::new(line.to_string()));
                }
            }

            // Vertical gap between sections.
            doc.push(Break::new(1.5));
        }

        if let Some(parent) = dest.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        doc.render_to_file(dest)
            .map_err(|e| ReferatError::Render(e.to_string()))?;

        info!("Wrote PDF to {}", dest.display());
        Ok(())
    }

    /// Locate and load a regular/bold font pair.
    fn load_fonts(&self) -> Result<FontFamily<FontData>> {
        let (regular_path, bold_path) = self.locate_fonts().ok_or_else(|| {
            ReferatError::Render(
                "No usable TTF font found; set render.font_dir to a directory with TTF fonts"
                    .to_string(),
            )
        })?;

        debug!("Using font {}", regular_path.display());

        let regular = load_font_data(&regular_path)?;
        let bold = match bold_path {
            Some(path) => load_font_data(&path)?,
            None => regular.clone(),
        };

        Ok(FontFamily {
            regular: regular.clone(),
            bold: bold.clone(),
            italic: regular,
            bold_italic: bold,
        })
    }

    fn locate_fonts(&self) -> Option<(PathBuf, Option<PathBuf>)> {
        if let Some(dir) = &self.font_dir {
            if let Some(found) = scan_font_dir(dir) {
                return Some(found);
            }
        }

        for (regular, bold) in FONT_CANDIDATES {
            let regular = PathBuf::from(regular);
            if regular.exists() {
                let bold = bold.map(PathBuf::from).filter(|p| p.exists());
                return Some((regular, bold));
            }
        }

        None
    }
}

fn load_font_data(path: &Path) -> Result<FontData> {
    let bytes = std::fs::read(path)?;
    FontData::new(bytes, None)
        .map_err(|e| ReferatError::Render(format!("Failed to load font {}: {}", path.display(), e)))
}

/// Pick a regular/bold TTF pair out of a user-provided font directory.
fn scan_font_dir(dir: &Path) -> Option<(PathBuf, Option<PathBuf>)> {
    let entries = std::fs::read_dir(dir).ok()?;

    let mut ttfs: Vec<PathBuf> = entries
        .flatten()
        .map(|e| e.path())
        .filter(|p| {
            p.extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("ttf"))
        })
        .collect();
    ttfs.sort();

    let is_bold = |p: &PathBuf| {
        p.file_stem()
            .and_then(|s| s.to_str())
            .is_some_and(|s| s.to_lowercase().contains("bold"))
    };

    let regular = ttfs.iter().find(|p| !is_bold(p))?.clone();
    let bold = ttfs.iter().find(|p| is_bold(p)).cloned();
    Some((regular, bold))
}

/// Derive a human-readable heading from a section key.
///
/// Splits on underscores, hyphens and whitespace, then capitalizes each word:
/// `action_items` becomes `Action Items`.
pub fn heading_from_key(key: &str) -> String {
    key.split(['_', '-', ' '])
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Order arbitrary section maps for rendering: the known categories first in
/// canonical order, then any extra sections alphabetically.
pub fn order_sections(sections: &HashMap<String, String>) -> Vec<(String, String)> {
    let mut ordered = Vec::with_capacity(sections.len());

    for category in Category::ALL {
        if let Some(text) = sections.get(category.key()) {
            ordered.push((category.key().to_string(), text.clone()));
        }
    }

    let mut extras: Vec<&String> = sections
        .keys()
        .filter(|k| Category::ALL.iter().all(|c| c.key() != k.as_str()))
        .collect();
    extras.sort();

    for key in extras {
        ordered.push((key.clone(), sections[key].clone()));
    }

    ordered
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heading_from_key_capitalizes_words() {
        assert_eq!(heading_from_key("action_items"), "Action Items");
        assert_eq!(heading_from_key("abstract_summary"), "Abstract Summary");
        assert_eq!(heading_from_key("some-custom section"), "Some Custom Section");
        assert_eq!(heading_from_key("sentiment"), "Sentiment");
    }

    #[test]
    fn test_order_sections_puts_categories_first() {
        let mut sections = HashMap::new();
        sections.insert("sentiment".to_string(), "neutral".to_string());
        sections.insert("zz_extra".to_string(), "extra".to_string());
        sections.insert("abstract_summary".to_string(), "summary".to_string());
        sections.insert("attendees".to_string(), "Alice, Bob".to_string());

        let keys: Vec<String> = order_sections(&sections)
            .into_iter()
            .map(|(k, _)| k)
            .collect();
        assert_eq!(
            keys,
            vec!["abstract_summary", "sentiment", "attendees", "zz_extra"]
        );
    }

    #[test]
    fn test_render_writes_pdf_file() {
        let renderer = PdfRenderer::new(None);
        if renderer.load_fonts().is_err() {
            // No TTF fonts available on this machine.
            return;
        }

        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("minutes.pdf");
        let sections = vec![(
            "action_items".to_string(),
            "Buy milk\nCall Bob".to_string(),
        )];

        renderer.render(&sections, &dest).unwrap();

        let bytes = std::fs::read(&dest).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }
}
