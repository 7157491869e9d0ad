//! Static glyph-width tables for the two PDF base fonts, used for word-wrap
//! and centering.
//!
//! Widths are the Adobe AFM advance widths in 1/1000 em. Tables cover ASCII
//! 0x20..=0x7E; index = (char as usize) - 32. Other Latin-1 characters fall back
//! to `average_width`.
//!
//! ```text
//! [0]=sp  [1]=!  ... [15]=/  [16..25]=0-9  [26]=: ... [32]=@
//! [33..58]=A-Z  [59]=[ ... [64]=`  [65..90]=a-z  [91]={ ... [94]=~
//! ```

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PdfFont {
    Regular,
    Bold,
}

pub struct FontMetricTable {
    widths: [u16; 95],
    average_width: u16,
}

impl FontMetricTable {
    pub fn for_font(font: PdfFont) -> &'static FontMetricTable {
        match font {
            PdfFont::Regular => &HELVETICA,
            PdfFont::Bold => &HELVETICA_BOLD,
        }
    }

    fn char_width(&self, c: char) -> u16 {
        let code = c as usize;
        if (32..=126).contains(&code) {
            self.widths[code - 32]
        } else {
            self.average_width
        }
    }

    /// Rendered width in points at `size_pt`.
    pub fn measure(&self, s: &str, size_pt: f32) -> f32 {
        let units: u32 = s.chars().map(|c| u32::from(self.char_width(c))).sum();
        units as f32 * size_pt / 1000.0
    }

    /// Greedy word-wrap to `max_width_pt`. A single word wider than the line is
    /// split at character boundaries. Always returns at least one line.
    pub fn wrap(&self, text: &str, size_pt: f32, max_width_pt: f32) -> Vec<String> {
        let mut lines = Vec::new();
        let mut current = String::new();

        for word in text.split_whitespace() {
            let candidate = if current.is_empty() {
                word.to_string()
            } else {
                format!("{current} {word}")
            };
            if self.measure(&candidate, size_pt) <= max_width_pt {
                current = candidate;
                continue;
            }
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            if self.measure(word, size_pt) <= max_width_pt {
                current = word.to_string();
            } else {
                for chunk in self.split_word(word, size_pt, max_width_pt) {
                    if !current.is_empty() {
                        lines.push(std::mem::take(&mut current));
                    }
                    current = chunk;
                }
            }
        }

        if !current.is_empty() || lines.is_empty() {
            lines.push(current);
        }
        lines
    }

    fn split_word(&self, word: &str, size_pt: f32, max_width_pt: f32) -> Vec<String> {
        let mut chunks = Vec::new();
        let mut chunk = String::new();
        for c in word.chars() {
            chunk.push(c);
            if chunk.chars().count() > 1 && self.measure(&chunk, size_pt) > max_width_pt {
                chunk.pop();
                chunks.push(std::mem::take(&mut chunk));
                chunk.push(c);
            }
        }
        if !chunk.is_empty() {
            chunks.push(chunk);
        }
        chunks
    }
}

static HELVETICA: FontMetricTable = FontMetricTable {
    #[rustfmt::skip]
    widths: [
        // sp   !    "    #    $    %    &    '    (    )    *    +    ,    -    .    /
        278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
        // 0-9
        556, 556, 556, 556, 556, 556, 556, 556, 556, 556,
        // :    ;    <    =    >    ?    @
        278, 278, 584, 584, 584, 556, 1015,
        // A    B    C    D    E    F    G    H    I    J    K    L    M
        667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833,
        // N    O    P    Q    R    S    T    U    V    W    X    Y    Z
        722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,
        // [    \    ]    ^    _    `
        278, 278, 278, 469, 556, 333,
        // a    b    c    d    e    f    g    h    i    j    k    l    m
        556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833,
        // n    o    p    q    r    s    t    u    v    w    x    y    z
        556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500,
        // {    |    }    ~
        334, 260, 334, 584,
    ],
    average_width: 556,
};

static HELVETICA_BOLD: FontMetricTable = FontMetricTable {
    #[rustfmt::skip]
    widths: [
        // sp   !    "    #    $    %    &    '    (    )    *    +    ,    -    .    /
        278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
        // 0-9
        556, 556, 556, 556, 556, 556, 556, 556, 556, 556,
        // :    ;    <    =    >    ?    @
        333, 333, 584, 584, 584, 611, 975,
        // A    B    C    D    E    F    G    H    I    J    K    L    M
        722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833,
        // N    O    P    Q    R    S    T    U    V    W    X    Y    Z
        722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,
        // [    \    ]    ^    _    `
        333, 278, 333, 584, 556, 333,
        // a    b    c    d    e    f    g    h    i    j    k    l    m
        556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889,
        // n    o    p    q    r    s    t    u    v    w    x    y    z
        611, 611, 611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500,
        // {    |    }    ~
        389, 280, 389, 584,
    ],
    average_width: 584,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_measure_scales_with_size() {
        let table = FontMetricTable::for_font(PdfFont::Regular);
        // "Hi" = 722 + 222
        assert!((table.measure("Hi", 10.0) - 9.44).abs() < 1e-4);
        assert!((table.measure("Hi", 20.0) - 18.88).abs() < 1e-4);
    }

    #[test]
    fn test_bold_is_wider() {
        let regular = FontMetricTable::for_font(PdfFont::Regular);
        let bold = FontMetricTable::for_font(PdfFont::Bold);
        assert!(bold.measure("Experience", 11.0) > regular.measure("Experience", 11.0));
    }

    #[test]
    fn test_wrap_respects_width() {
        let table = FontMetricTable::for_font(PdfFont::Regular);
        let text = "Designed and built a distributed ingestion pipeline handling millions of events";
        let lines = table.wrap(text, 10.0, 150.0);
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(table.measure(line, 10.0) <= 150.0, "too wide: {line}");
        }
        assert_eq!(lines.join(" "), text);
    }

    #[test]
    fn test_wrap_splits_overlong_word() {
        let table = FontMetricTable::for_font(PdfFont::Regular);
        let word = "x".repeat(200);
        let lines = table.wrap(&word, 10.0, 100.0);
        assert!(lines.len() > 1);
        assert_eq!(lines.concat(), word);
    }

    #[test]
    fn test_wrap_empty_text_yields_one_empty_line() {
        let table = FontMetricTable::for_font(PdfFont::Bold);
        assert_eq!(table.wrap("   ", 10.0, 100.0), vec![String::new()]);
    }
}
