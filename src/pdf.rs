//! Minimal PDF 1.4 writer for plain text reports: A4 pages, one built-in
//! Helvetica font, one line of text per row.

use std::fmt::Write as _;

const PAGE_WIDTH: f32 = 595.28;
const PAGE_HEIGHT: f32 = 841.89;
const MARGIN: f32 = 28.35; // 10 mm
const FONT_SIZE: f32 = 12.0;
const LINE_HEIGHT: f32 = 28.35; // 10 mm rows

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
}

#[derive(Debug, Clone, PartialEq)]
struct Line {
    text: String,
    align: Align,
}

/// Text document laid out top to bottom, breaking onto a new page when a
/// row would cross the bottom margin.
#[derive(Debug, Default)]
pub struct TextDocument {
    lines: Vec<Line>,
}

impl TextDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn line(&mut self, text: impl Into<String>, align: Align) -> &mut Self {
        self.lines.push(Line {
            text: text.into(),
            align,
        });
        self
    }

    pub fn blank(&mut self) -> &mut Self {
        self.line("", Align::Left)
    }

    fn rows_per_page() -> usize {
        ((PAGE_HEIGHT - 2.0 * MARGIN) / LINE_HEIGHT).floor() as usize
    }

    fn pages(&self) -> Vec<&[Line]> {
        if self.lines.is_empty() {
            return vec![&self.lines[..]];
        }
        self.lines.chunks(Self::rows_per_page()).collect()
    }

    fn content_stream(lines: &[Line]) -> String {
        let mut stream = String::new();
        let _ = writeln!(stream, "BT\n/F1 {} Tf", FONT_SIZE);
        for (row, line) in lines.iter().enumerate() {
            if line.text.is_empty() {
                continue;
            }
            let encoded = encode_text(&line.text);
            let x = match line.align {
                Align::Left => MARGIN,
                Align::Center => ((PAGE_WIDTH - text_width(&encoded)) / 2.0).max(MARGIN),
            };
            // Baseline sits near the bottom of the row, as a 10 mm cell would render it
            let y = PAGE_HEIGHT - MARGIN - (row as f32 + 1.0) * LINE_HEIGHT + LINE_HEIGHT * 0.35;
            let _ = writeln!(stream, "1 0 0 1 {:.2} {:.2} Tm ({}) Tj", x, y, escape(&encoded));
        }
        stream.push_str("ET\n");
        stream
    }

    /// Serializes the document into PDF bytes.
    pub fn render(&self) -> Vec<u8> {
        let pages = self.pages();
        // 1 catalog, 2 page tree, 3 font, then a (page, contents) pair per page
        let page_ids: Vec<usize> = (0..pages.len()).map(|i| 4 + 2 * i).collect();

        let mut objects: Vec<Vec<u8>> = Vec::new();
        objects.push(b"<< /Type /Catalog /Pages 2 0 R >>".to_vec());
        let kids = page_ids.iter().map(|id| format!("{} 0 R", id)).collect::<Vec<_>>().join(" ");
        objects.push(format!("<< /Type /Pages /Kids [{}] /Count {} >>", kids, pages.len()).into_bytes());
        objects.push(
            b"<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>".to_vec(),
        );

        for (page, id) in pages.iter().zip(&page_ids) {
            objects.push(
                format!(
                    "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {:.2} {:.2}] \
                     /Resources << /Font << /F1 3 0 R >> >> /Contents {} 0 R >>",
                    PAGE_WIDTH,
                    PAGE_HEIGHT,
                    id + 1
                )
                .into_bytes(),
            );
            let stream = Self::content_stream(page);
            let mut contents = format!("<< /Length {} >>\nstream\n", stream.len()).into_bytes();
            contents.extend_from_slice(stream.as_bytes());
            contents.extend_from_slice(b"endstream");
            objects.push(contents);
        }

        let mut out: Vec<u8> = b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n".to_vec();
        let mut offsets = Vec::with_capacity(objects.len());
        for (index, body) in objects.iter().enumerate() {
            offsets.push(out.len());
            out.extend_from_slice(format!("{} 0 obj\n", index + 1).as_bytes());
            out.extend_from_slice(body);
            out.extend_from_slice(b"\nendobj\n");
        }

        let xref_offset = out.len();
        let mut xref = format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1);
        for offset in offsets {
            let _ = write!(xref, "{:010} 00000 n \n", offset);
        }
        let _ = write!(
            xref,
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
            objects.len() + 1,
            xref_offset
        );
        out.extend_from_slice(xref.as_bytes());
        out
    }
}

/// Maps text to single-byte WinAnsi codes; anything outside Latin-1 becomes `?`.
fn encode_text(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c as u32 {
            0x20..=0x7E | 0xA0..=0xFF => c as u32 as u8,
            _ => b'?',
        })
        .collect()
}

fn escape(encoded: &[u8]) -> String {
    let mut escaped = String::with_capacity(encoded.len());
    for &byte in encoded {
        match byte {
            b'(' | b')' | b'\\' => {
                escaped.push('\\');
                escaped.push(byte as char);
            }
            0x20..=0x7E => escaped.push(byte as char),
            _ => {
                let _ = write!(escaped, "\\{:03o}", byte);
            }
        }
    }
    escaped
}

/// Approximate Helvetica advance width, good enough for centring a title.
fn text_width(encoded: &[u8]) -> f32 {
    let units: u32 = encoded
        .iter()
        .map(|&b| match b {
            b'i' | b'j' | b'l' | b'.' | b',' | b':' | b';' | b'\'' | b'|' => 222,
            b' ' | b'f' | b't' | b'I' | b'!' | b'/' | b'(' | b')' | b'[' | b']' => 278,
            b'r' | b'-' => 333,
            b'm' | b'M' | b'W' => 833,
            b'A'..=b'Z' => 667,
            _ => 556,
        })
        .sum();
    units as f32 * FONT_SIZE / 1000.0
}
