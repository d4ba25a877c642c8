//! 文字度量与断行
//!
//! 使用 PDF 内置 Helvetica / Helvetica-Bold 字体的 AFM 字宽（千分之一字号），
//! 文字按 WinAnsi 单字节编码输出。

/// 字重
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FontWeight {
    #[default]
    Regular,
    Bold,
}

/// 一段同字重的文字
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub text: String,
    pub weight: FontWeight,
}

impl Span {
    pub fn regular(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            weight: FontWeight::Regular,
        }
    }

    pub fn bold(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            weight: FontWeight::Bold,
        }
    }
}

/// 单词内同字重的一段
#[derive(Debug, Clone, PartialEq)]
pub struct Run {
    pub text: String,
    pub weight: FontWeight,
    pub width: f32,
}

/// 一个单词（不含空白，可能跨多个字重）
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Word {
    pub runs: Vec<Run>,
    pub width: f32,
}

impl Word {
    fn push(&mut self, c: char, weight: FontWeight, font_size: f32) {
        let w = char_width(c, weight) * font_size;
        match self.runs.last_mut() {
            Some(run) if run.weight == weight => {
                run.text.push(c);
                run.width += w;
            }
            _ => self.runs.push(Run {
                text: c.to_string(),
                weight,
                width: w,
            }),
        }
        self.width += w;
    }

    pub fn text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }
}

/// 断行后的一行
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Line {
    pub words: Vec<Word>,
    /// 自然宽度（单词宽度 + 单倍空格）
    pub width: f32,
    /// 段落最后一行（两端对齐时不拉伸）
    pub ends_paragraph: bool,
}

impl Line {
    pub fn text(&self) -> String {
        self.words.iter().map(Word::text).collect::<Vec<_>>().join(" ")
    }

    pub fn is_bold(&self) -> bool {
        self.words
            .iter()
            .flat_map(|w| w.runs.iter())
            .any(|r| r.weight == FontWeight::Bold)
    }
}

// Helvetica, 0x20..=0x7E
const HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // 0x20
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // 0x30
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // 0x40
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // 0x50
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // 0x60
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // 0x70
];

// Helvetica-Bold, 0x20..=0x7E
const HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278, // 0x20
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611, // 0x30
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778, // 0x40
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556, // 0x50
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611, // 0x60
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584, // 0x70
];

const DEFAULT_WIDTH: u16 = 556;

/// 字符的 WinAnsi 编码；无法编码的字符替换为 '?'
pub fn winansi_byte(c: char) -> u8 {
    match c {
        ' '..='~' => c as u8,
        '\u{2013}' => 0x96,
        '\u{2014}' => 0x97,
        '\u{2026}' => 0x85,
        '\u{2018}' => 0x91,
        '\u{2019}' => 0x92,
        '\u{201C}' => 0x93,
        '\u{201D}' => 0x94,
        '\u{2022}' => 0x95,
        '\u{00A0}'..='\u{00FF}' => c as u8,
        _ => b'?',
    }
}

/// 把字符串编码为 WinAnsi 字节
pub fn encode_winansi(text: &str) -> Vec<u8> {
    text.chars().map(winansi_byte).collect()
}

/// 单个字符宽度（以字号为 1 计）
pub fn char_width(c: char, weight: FontWeight) -> f32 {
    let byte = winansi_byte(c);
    let units = match byte {
        0x20..=0x7E => {
            let table = match weight {
                FontWeight::Regular => &HELVETICA,
                FontWeight::Bold => &HELVETICA_BOLD,
            };
            table[(byte - 0x20) as usize]
        }
        0x96 => 556,
        0x97 | 0x85 => 1000,
        0x91 | 0x92 => 222,
        0x93 | 0x94 => 333,
        0x95 => 350,
        _ => DEFAULT_WIDTH,
    };
    units as f32 / 1000.0
}

/// 文字宽度
pub fn text_width(text: &str, weight: FontWeight, font_size: f32) -> f32 {
    text.chars().map(|c| char_width(c, weight)).sum::<f32>() * font_size
}

/// 空格宽度（两种字重相同）
pub fn space_width(font_size: f32) -> f32 {
    char_width(' ', FontWeight::Regular) * font_size
}

/// 行高
pub fn line_height(font_size: f32, line_gap: f32) -> f32 {
    font_size * 1.2 + line_gap
}

enum Token {
    Word(Word),
    Break,
}

fn tokenize(spans: &[Span], font_size: f32) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut current = Word::default();
    for span in spans {
        for c in span.text.chars() {
            if c == '\n' {
                if !current.is_empty() {
                    tokens.push(Token::Word(std::mem::take(&mut current)));
                }
                tokens.push(Token::Break);
            } else if c.is_whitespace() {
                if !current.is_empty() {
                    tokens.push(Token::Word(std::mem::take(&mut current)));
                }
            } else {
                current.push(c, span.weight, font_size);
            }
        }
    }
    if !current.is_empty() {
        tokens.push(Token::Word(current));
    }
    tokens
}

// 超宽单词按字符切开
fn split_overlong(word: Word, max_width: f32, font_size: f32) -> Vec<Word> {
    if word.width <= max_width {
        return vec![word];
    }
    let mut pieces = Vec::new();
    let mut current = Word::default();
    for run in word.runs {
        for c in run.text.chars() {
            let w = char_width(c, run.weight) * font_size;
            if !current.is_empty() && current.width + w > max_width {
                pieces.push(std::mem::take(&mut current));
            }
            current.push(c, run.weight, font_size);
        }
    }
    if !current.is_empty() {
        pieces.push(current);
    }
    pieces
}

/// 贪心断行
///
/// `\n` 强制换行并结束段落，连续的 `\n` 产生空行
pub fn wrap(spans: &[Span], max_width: f32, font_size: f32) -> Vec<Line> {
    let space = space_width(font_size);
    let mut lines = Vec::new();
    let mut current = Line::default();

    for token in tokenize(spans, font_size) {
        match token {
            Token::Break => {
                current.ends_paragraph = true;
                lines.push(std::mem::take(&mut current));
            }
            Token::Word(word) => {
                for piece in split_overlong(word, max_width, font_size) {
                    if current.words.is_empty() {
                        current.width = piece.width;
                        current.words.push(piece);
                    } else if current.width + space + piece.width <= max_width {
                        current.width += space + piece.width;
                        current.words.push(piece);
                    } else {
                        lines.push(std::mem::take(&mut current));
                        current.width = piece.width;
                        current.words.push(piece);
                    }
                }
            }
        }
    }
    if !current.words.is_empty() {
        current.ends_paragraph = true;
        lines.push(current);
    }
    lines
}

/// 纯文字的快捷断行
pub fn wrap_plain(text: &str, weight: FontWeight, max_width: f32, font_size: f32) -> Vec<Line> {
    wrap(
        &[Span {
            text: text.to_string(),
            weight,
        }],
        max_width,
        font_size,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_widths_follow_afm_tables() {
        assert!((text_width("a", FontWeight::Regular, 10.0) - 5.56).abs() < 1e-4);
        assert!((text_width("i", FontWeight::Regular, 10.0) - 2.22).abs() < 1e-4);
        assert!((text_width("i", FontWeight::Bold, 10.0) - 2.78).abs() < 1e-4);
        assert!((text_width("~", FontWeight::Regular, 1000.0) - 584.0).abs() < 1e-2);
    }

    #[test]
    fn test_winansi_mapping() {
        assert_eq!(encode_winansi("A–B…"), vec![b'A', 0x96, b'B', 0x85]);
        assert_eq!(winansi_byte('历'), b'?');
    }

    #[test]
    fn test_wrap_respects_width() {
        let text = "The Harappan civilisation flourished along the banks of the river Indus and its tributaries.";
        let lines = wrap_plain(text, FontWeight::Regular, 150.0, 10.0);
        assert!(lines.len() > 1);
        assert!(lines.iter().all(|l| l.width <= 150.0 + 1e-3));
        assert!(!lines[0].ends_paragraph);
        assert!(lines.last().map(|l| l.ends_paragraph).unwrap_or(false));
        let joined: Vec<String> = lines.iter().map(Line::text).collect();
        assert_eq!(joined.join(" "), text);
    }

    #[test]
    fn test_hard_breaks_and_blank_lines() {
        let lines = wrap_plain("Image to be inserted\n\nStudy the picture.", FontWeight::Regular, 400.0, 10.0);
        assert_eq!(lines.len(), 3);
        assert!(lines[0].ends_paragraph);
        assert!(lines[1].words.is_empty());
        assert_eq!(lines[2].text(), "Study the picture.");
    }

    #[test]
    fn test_glued_spans_form_one_word() {
        let spans = vec![Span::bold("Reason"), Span::regular("(R)")];
        let lines = wrap(&spans, 400.0, 10.0);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].words.len(), 1);
        assert_eq!(lines[0].words[0].runs.len(), 2);
        assert!(lines[0].is_bold());
    }

    #[test]
    fn test_overlong_word_is_split() {
        let lines = wrap_plain(&"x".repeat(100), FontWeight::Regular, 50.0, 10.0);
        assert!(lines.len() > 1);
        assert!(lines.iter().all(|l| l.width <= 50.0 + 1e-3));
    }
}
