//! Pagination-aware text flow.
//!
//! [`TextFlow`] owns a cursor on the current page and hands positioned
//! strings to a [`PageSink`]. It knows nothing about PDF; the sink decides
//! how a page, a font change or a string is materialised.

use crate::utils::error::Result;

/// Characters per wrapped sub-line.
pub const WRAP_WIDTH: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontFace {
    Regular,
    Bold,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FontSpec {
    pub face: FontFace,
    pub size: f32,
}

impl FontSpec {
    pub const BODY: FontSpec = FontSpec {
        face: FontFace::Regular,
        size: 10.0,
    };
    pub const TITLE: FontSpec = FontSpec {
        face: FontFace::Bold,
        size: 14.0,
    };
    pub const SUMMARY: FontSpec = FontSpec {
        face: FontFace::Bold,
        size: 12.0,
    };
}

/// Fixed page size and the margins text must stay within.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub width: f32,
    pub height: f32,
    pub margin_x: f32,
    pub margin_y: f32,
    pub line_height: f32,
}

impl PageGeometry {
    /// US letter, 40pt margins, 14pt leading.
    pub const fn letter() -> Self {
        Self {
            width: 612.0,
            height: 792.0,
            margin_x: 40.0,
            margin_y: 40.0,
            line_height: 14.0,
        }
    }

    /// Baseline of the first line on a page.
    pub fn top(&self) -> f32 {
        self.height - self.margin_y
    }

    /// Sub-lines that fit between the margins; never less than one.
    pub fn capacity(&self) -> usize {
        let usable = self.height - 2.0 * self.margin_y;
        ((usable / self.line_height).floor() as usize).max(1)
    }
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self::letter()
    }
}

/// Backend receiving the laid-out text.
pub trait PageSink {
    fn begin_page(&mut self, geometry: &PageGeometry) -> Result<()>;
    fn set_font(&mut self, font: FontSpec) -> Result<()>;
    fn draw_text(&mut self, x: f32, y: f32, text: &str) -> Result<()>;
    fn end_page(&mut self) -> Result<()>;
}

/// Column stops tabs expand to before wrapping.
pub const TAB_SIZE: usize = 8;

/// Greedy word wrap.
///
/// Tabs expand to the next multiple of [`TAB_SIZE`], then every whitespace
/// character counts as one space and interior runs are kept, so padded
/// labels stay aligned. Hyphenated words may break after a hyphen that sits
/// between letters (`well-` / `known`). Whitespace is dropped where a line
/// breaks, words longer than `width` are split, and blank input yields no
/// lines at all. Double-hyphen dashes are not treated as break points.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut chunks = split_chunks(text);
    chunks.reverse();
    let mut lines = Vec::new();

    while !chunks.is_empty() {
        if !lines.is_empty() && chunks.last().is_some_and(|c| is_blank(c)) {
            chunks.pop();
        }

        let mut line: Vec<Vec<char>> = Vec::new();
        let mut line_len = 0usize;
        while let Some(chunk) = chunks.last() {
            if line_len + chunk.len() > width {
                break;
            }
            line_len += chunk.len();
            if let Some(chunk) = chunks.pop() {
                line.push(chunk);
            }
        }

        if let Some(chunk) = chunks.last_mut() {
            if chunk.len() > width {
                let room = width - line_len;
                line.push(chunk.drain(..room).collect());
            }
        }

        if line.last().is_some_and(|c| is_blank(c)) {
            line.pop();
        }
        if !line.is_empty() {
            lines.push(line.concat().into_iter().collect());
        }
    }

    lines
}

/// Alternating runs of whitespace and non-whitespace, whitespace normalised to
/// spaces and hyphenated words split after each breakable hyphen.
fn split_chunks(text: &str) -> Vec<Vec<char>> {
    let mut runs: Vec<Vec<char>> = Vec::new();
    let mut previous_blank: Option<bool> = None;

    for ch in expand_tabs(text).chars() {
        let blank = ch.is_whitespace();
        let ch = if blank { ' ' } else { ch };
        match runs.last_mut() {
            Some(run) if previous_blank == Some(blank) => run.push(ch),
            _ => runs.push(vec![ch]),
        }
        previous_blank = Some(blank);
    }

    runs.into_iter()
        .flat_map(|run| {
            if is_blank(&run) {
                vec![run]
            } else {
                split_hyphenated(run)
            }
        })
        .collect()
}

fn expand_tabs(text: &str) -> String {
    let mut expanded = String::with_capacity(text.len());
    let mut column = 0usize;
    for ch in text.chars() {
        match ch {
            '\t' => {
                let pad = TAB_SIZE - column % TAB_SIZE;
                expanded.extend(std::iter::repeat(' ').take(pad));
                column += pad;
            }
            '\n' | '\r' => {
                expanded.push(ch);
                column = 0;
            }
            _ => {
                expanded.push(ch);
                column += 1;
            }
        }
    }
    expanded
}

/// Splits `word` after each hyphen preceded by two letters (or by
/// letter-hyphen-letter) and followed by a letter, an optional hyphen and
/// another letter.
fn split_hyphenated(word: Vec<char>) -> Vec<Vec<char>> {
    let letter = |i: usize| word.get(i).is_some_and(|c| c.is_alphabetic() || *c == '_');
    let mut pieces = Vec::new();
    let mut start = 0usize;

    for i in 1..word.len() {
        if word[i] != '-' {
            continue;
        }
        let before = letter(i - 1)
            && ((i >= 2 && letter(i - 2)) || (i >= 3 && word[i - 2] == '-' && letter(i - 3)));
        let after = letter(i + 1)
            && (letter(i + 2) || (word.get(i + 2) == Some(&'-') && letter(i + 3)));
        if before && after {
            pieces.push(word[start..=i].to_vec());
            start = i + 1;
        }
    }
    pieces.push(word[start..].to_vec());
    pieces
}

fn is_blank(chunk: &[char]) -> bool {
    chunk.iter().all(|c| *c == ' ')
}

/// Cursor state machine: emits wrapped lines, breaking pages when full.
pub struct TextFlow<S: PageSink> {
    sink: S,
    geometry: PageGeometry,
    wrap_width: usize,
    font: FontSpec,
    page_open: bool,
    lines_on_page: usize,
    pages_started: usize,
}

impl<S: PageSink> TextFlow<S> {
    pub fn new(sink: S, geometry: PageGeometry) -> Self {
        Self {
            sink,
            geometry,
            wrap_width: WRAP_WIDTH,
            font: FontSpec::BODY,
            page_open: false,
            lines_on_page: 0,
            pages_started: 0,
        }
    }

    pub fn with_wrap_width(mut self, wrap_width: usize) -> Self {
        self.wrap_width = wrap_width.max(1);
        self
    }

    /// Baseline the next sub-line would be drawn at on the current page.
    pub fn cursor_y(&self) -> f32 {
        self.geometry.top() - self.lines_on_page as f32 * self.geometry.line_height
    }

    pub fn pages_started(&self) -> usize {
        self.pages_started
    }

    /// Font for subsequent lines; a page break resets it to [`FontSpec::BODY`].
    pub fn set_font(&mut self, font: FontSpec) -> Result<()> {
        self.font = font;
        if self.page_open {
            self.sink.set_font(font)?;
        }
        Ok(())
    }

    /// Wraps `line` and draws each sub-line, breaking pages as needed.
    pub fn emit(&mut self, line: &str) -> Result<()> {
        for sub_line in wrap_text(line, self.wrap_width) {
            self.reserve_line()?;
            let y = self.cursor_y();
            self.sink.draw_text(self.geometry.margin_x, y, &sub_line)?;
            self.lines_on_page += 1;
        }
        Ok(())
    }

    /// Closes the last page and returns the sink. An untouched flow still yields one page.
    pub fn finalize(mut self) -> Result<S> {
        if !self.page_open {
            self.open_page()?;
        }
        self.sink.end_page()?;
        Ok(self.sink)
    }

    fn reserve_line(&mut self) -> Result<()> {
        if !self.page_open {
            self.open_page()?;
        } else if self.lines_on_page >= self.geometry.capacity() {
            self.sink.end_page()?;
            self.font = FontSpec::BODY;
            self.open_page()?;
        }
        Ok(())
    }

    fn open_page(&mut self) -> Result<()> {
        self.sink.begin_page(&self.geometry)?;
        self.sink.set_font(self.font)?;
        self.page_open = true;
        self.lines_on_page = 0;
        self.pages_started += 1;
        Ok(())
    }
}
