//! Text export of an abstract as a PDF document.
//!
//! Produces a plain PDF 1.4 file using the built-in Helvetica font with
//! `WinAnsiEncoding`, so no font files or rendering backend are needed.
//! Long abstracts continue on further pages. Characters outside WinAnsi are
//! transliterated to ASCII.
use deunicode::deunicode_char;

use crate::models::abstracts::Abstract;
use crate::models::track::Track;

const PAGE_WIDTH: u32 = 595; // A4 in points
const PAGE_HEIGHT: u32 = 842;
const MARGIN: u32 = 56;
const FONT_SIZE: u32 = 11;
const LEADING: u32 = 15;
const TITLE_FONT_SIZE: u32 = 16;
const TITLE_LEADING: u32 = 21;
const FOOTER_FONT_SIZE: u32 = 9;
const WRAP_COLUMNS: usize = 85;
const TITLE_WRAP_COLUMNS: usize = 58;

// Code points 0x80..=0x9F of WinAnsiEncoding; 0xA0..=0xFF match Latin-1.
const WIN_ANSI_EXTRA: [(char, u8); 27] = [
    ('\u{20AC}', 0x80),
    ('\u{201A}', 0x82),
    ('\u{0192}', 0x83),
    ('\u{201E}', 0x84),
    ('\u{2026}', 0x85),
    ('\u{2020}', 0x86),
    ('\u{2021}', 0x87),
    ('\u{02C6}', 0x88),
    ('\u{2030}', 0x89),
    ('\u{0160}', 0x8A),
    ('\u{2039}', 0x8B),
    ('\u{0152}', 0x8C),
    ('\u{017D}', 0x8E),
    ('\u{2018}', 0x91),
    ('\u{2019}', 0x92),
    ('\u{201C}', 0x93),
    ('\u{201D}', 0x94),
    ('\u{2022}', 0x95),
    ('\u{2013}', 0x96),
    ('\u{2014}', 0x97),
    ('\u{02DC}', 0x98),
    ('\u{2122}', 0x99),
    ('\u{0161}', 0x9A),
    ('\u{203A}', 0x9B),
    ('\u{0153}', 0x9C),
    ('\u{017E}', 0x9E),
    ('\u{0178}', 0x9F),
];

#[derive(Debug, Clone, PartialEq)]
struct Line {
    text: String,
    size: u32,
    leading: u32,
}

impl Line {
    fn title(text: String) -> Self {
        Line { text, size: TITLE_FONT_SIZE, leading: TITLE_LEADING }
    }

    fn body(text: String) -> Self {
        Line { text, size: FONT_SIZE, leading: LEADING }
    }
}

pub struct AbstractToPdf<'a> {
    event_title: &'a str,
    abstract_: &'a Abstract,
    tracks: &'a [Track],
}

impl<'a> AbstractToPdf<'a> {
    pub fn new(event_title: &'a str, abstract_: &'a Abstract, tracks: &'a [Track]) -> Self {
        Self {
            event_title,
            abstract_,
            tracks,
        }
    }

    fn lines(&self) -> Vec<Line> {
        let heading = format!("Abstract #{}: {}", self.abstract_.friendly_id, self.abstract_.title);
        let mut lines: Vec<Line> = wrap(&heading, TITLE_WRAP_COLUMNS)
            .into_iter()
            .map(Line::title)
            .collect();

        let mut body = vec![String::new()];
        body.extend(wrap(self.event_title, WRAP_COLUMNS));
        body.push(String::new());
        body.push(format!("State: {}", self.abstract_.state.title()));
        if !self.tracks.is_empty() {
            let names: Vec<&str> = self.tracks.iter().map(|t| t.title.as_str()).collect();
            body.extend(wrap(&format!("Tracks: {}", names.join(", ")), WRAP_COLUMNS));
        }
        body.push(String::new());
        for paragraph in self.abstract_.description.lines() {
            body.extend(wrap(paragraph, WRAP_COLUMNS));
        }
        lines.extend(body.into_iter().map(Line::body));
        lines
    }

    /// Splits the lines into pages; every page keeps room for its footer.
    fn pages(&self) -> Vec<Vec<Line>> {
        let available = PAGE_HEIGHT - 2 * MARGIN - LEADING;
        let mut pages = Vec::new();
        let mut current = Vec::new();
        let mut used = 0;
        for line in self.lines() {
            if used + line.leading > available && !current.is_empty() {
                pages.push(std::mem::take(&mut current));
                used = 0;
            }
            used += line.leading;
            current.push(line);
        }
        if !current.is_empty() || pages.is_empty() {
            pages.push(current);
        }
        pages
    }

    fn content_stream(lines: &[Line], page: usize, page_count: usize) -> String {
        let mut stream = format!("BT\n{} {} Td\n", MARGIN, PAGE_HEIGHT - MARGIN);
        for line in lines {
            stream.push_str(&format!(
                "/F1 {} Tf\n({}) Tj\n0 -{} Td\n",
                line.size,
                encode(&line.text),
                line.leading
            ));
        }
        stream.push_str("ET\n");
        stream.push_str(&format!(
            "BT\n/F1 {} Tf\n{} {} Td\n(Page {} of {}) Tj\nET\n",
            FOOTER_FONT_SIZE,
            MARGIN,
            MARGIN / 2,
            page,
            page_count
        ));
        stream
    }

    /// Renders the document.
    pub fn generate(&self) -> Vec<u8> {
        let pages = self.pages();
        // 1: catalog, 2: page tree, 3: font, then a page and its content per page
        let page_ref = |index: usize| 4 + 2 * index;
        let kids: Vec<String> = (0..pages.len()).map(|i| format!("{} 0 R", page_ref(i))).collect();

        let mut objects = vec![
            "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
            format!("<< /Type /Pages /Kids [{}] /Count {} >>", kids.join(" "), pages.len()),
            "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>"
                .to_string(),
        ];
        for (index, lines) in pages.iter().enumerate() {
            let content = Self::content_stream(lines, index + 1, pages.len());
            objects.push(format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {} {}] \
                 /Resources << /Font << /F1 3 0 R >> >> /Contents {} 0 R >>",
                PAGE_WIDTH,
                PAGE_HEIGHT,
                page_ref(index) + 1
            ));
            objects.push(format!("<< /Length {} >>\nstream\n{}endstream", content.len(), content));
        }

        let mut out = b"%PDF-1.4\n".to_vec();
        let mut offsets = Vec::with_capacity(objects.len());
        for (index, body) in objects.iter().enumerate() {
            offsets.push(out.len());
            out.extend_from_slice(format!("{} 0 obj\n{}\nendobj\n", index + 1, body).as_bytes());
        }
        let xref_offset = out.len();
        let mut xref = format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1);
        for offset in offsets {
            xref.push_str(&format!("{:010} 00000 n \n", offset));
        }
        xref.push_str(&format!(
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
            objects.len() + 1,
            xref_offset
        ));
        out.extend_from_slice(xref.as_bytes());
        out
    }
}

fn win_ansi(c: char) -> Option<u8> {
    match u32::from(c) {
        code @ 0xA0..=0xFF => u8::try_from(code).ok(),
        _ => WIN_ANSI_EXTRA.iter().find(|(ch, _)| *ch == c).map(|(_, byte)| *byte),
    }
}

fn push_ascii(out: &mut String, c: char) {
    match c {
        '(' | ')' | '\\' => {
            out.push('\\');
            out.push(c);
        }
        ' '..='~' => out.push(c),
        '\t' => out.push(' '),
        _ => out.push('?'),
    }
}

/// Encodes text as the body of a PDF literal string in WinAnsiEncoding.
///
/// The output stays ASCII: WinAnsi characters above 0x7F are written as octal
/// escapes, anything else is transliterated.
fn encode(text: &str) -> String {
    let mut encoded = String::with_capacity(text.len());
    for c in text.chars() {
        if c.is_ascii() {
            push_ascii(&mut encoded, c);
        } else if let Some(byte) = win_ansi(c) {
            encoded.push_str(&format!("\\{:03o}", byte));
        } else {
            match deunicode_char(c) {
                Some(ascii) => ascii.chars().for_each(|a| push_ascii(&mut encoded, a)),
                None => encoded.push('?'),
            }
        }
    }
    encoded
}

fn wrap(paragraph: &str, columns: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in paragraph.split_whitespace() {
        if !current.is_empty() && current.chars().count() + 1 + word.chars().count() > columns {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    lines.push(current);
    lines
}
