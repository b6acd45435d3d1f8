//! Markdown → ratatui `Text` renderer.
//!
//! Thin wrapper around `pulldown_cmark` that converts markdown events into
//! styled `Line`/`Span` values. Headings, emphasis, strikethrough, inline
//! code, fenced code blocks (with syntect highlighting), lists, blockquotes,
//! tables, links and bare URLs.
//!
//! Raw HTML is never interpreted: it comes out as the literal source text.

use std::sync::LazyLock;

use pulldown_cmark::{
    Alignment, CodeBlockKind, CowStr, Event, HeadingLevel, LinkType, Options, Parser, Tag, TagEnd,
};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use syntect::easy::HighlightLines;
use syntect::highlighting::ThemeSet;
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;
use unicode_width::UnicodeWidthStr;

static SYNTAX_SET: LazyLock<SyntaxSet> = LazyLock::new(SyntaxSet::load_defaults_newlines);
static THEME_SET: LazyLock<ThemeSet> = LazyLock::new(ThemeSet::load_defaults);

const CODE_THEME: &str = "base16-ocean.dark";
const URL_PREFIXES: [&str; 3] = ["https://", "http://", "www."];

fn link_style() -> Style {
    Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::UNDERLINED)
}

/// Parse markdown content into styled `Text`.
///
/// Returns owned text (`'static`) so callers aren't constrained by input lifetime.
pub fn render(content: &str, base_fg: Color) -> Text<'static> {
    let mut opts = Options::empty();
    opts.insert(Options::ENABLE_STRIKETHROUGH);
    opts.insert(Options::ENABLE_TASKLISTS);
    opts.insert(Options::ENABLE_TABLES);

    let events: Vec<Event<'_>> = Parser::new_ext(content, opts).collect();
    let mut w = Writer::new(base_fg);
    for event in events {
        w.handle(event);
    }
    w.text
}

// ── Tables ──────────────────────────────────────────────────────────────────

type Cell = Vec<Span<'static>>;

/// Cells are buffered until the table ends, since column widths depend on
/// every row.
#[derive(Default)]
struct TableBuilder {
    alignments: Vec<Alignment>,
    header_rows: usize,
    rows: Vec<Vec<Cell>>,
    row: Vec<Cell>,
    cell: Cell,
}

impl TableBuilder {
    fn new(alignments: Vec<Alignment>) -> Self {
        Self {
            alignments,
            ..Default::default()
        }
    }

    fn end_cell(&mut self) {
        self.row.push(std::mem::take(&mut self.cell));
    }

    fn end_row(&mut self) {
        self.rows.push(std::mem::take(&mut self.row));
    }

    fn into_lines(self) -> Vec<Line<'static>> {
        let columns = self.rows.iter().map(Vec::len).max().unwrap_or(0);
        let mut widths = vec![0usize; columns];
        for row in &self.rows {
            for (c, cell) in row.iter().enumerate() {
                widths[c] = widths[c].max(cell_width(cell));
            }
        }

        let border = Style::default().fg(Color::DarkGray);
        let mut lines = Vec::with_capacity(self.rows.len() + 1);
        for (r, row) in self.rows.into_iter().enumerate() {
            let mut spans = Vec::new();
            let mut cells = row.into_iter();
            for (c, width) in widths.iter().enumerate() {
                if c > 0 {
                    spans.push(Span::styled(" │ ", border));
                }
                let cell = cells.next().unwrap_or_default();
                let gap = width.saturating_sub(cell_width(&cell));
                let (left, right) = match self.alignments.get(c) {
                    Some(Alignment::Right) => (gap, 0),
                    Some(Alignment::Center) => (gap / 2, gap - gap / 2),
                    _ => (0, gap),
                };
                if left > 0 {
                    spans.push(Span::raw(" ".repeat(left)));
                }
                spans.extend(cell);
                if right > 0 {
                    spans.push(Span::raw(" ".repeat(right)));
                }
            }
            lines.push(Line::from(spans));

            if r + 1 == self.header_rows {
                let rule: Vec<String> = widths.iter().map(|w| "─".repeat(*w)).collect();
                lines.push(Line::from(Span::styled(rule.join("─┼─"), border)));
            }
        }
        lines
    }
}

fn cell_width(cell: &Cell) -> usize {
    cell.iter().map(|s| s.content.width()).sum()
}

// ── Bare URLs ───────────────────────────────────────────────────────────────

/// Splits `text` into runs, flagging the runs that are bare URLs.
fn split_bare_urls(text: &str) -> Vec<(&str, bool)> {
    let mut pieces = Vec::new();
    let mut cursor = 0;
    let mut search = 0;
    while let Some(rel) = next_url_start(&text[search..]) {
        let start = search + rel;
        let tail = &text[start..];
        let end = tail.find(char::is_whitespace).unwrap_or(tail.len());
        let url = tail[..end].trim_end_matches(['.', ',', ';', ':', '!', '?', ')', '\'', '"']);
        let has_body = URL_PREFIXES
            .iter()
            .any(|p| url.len() > p.len() && url.starts_with(p));
        if has_body {
            if start > cursor {
                pieces.push((&text[cursor..start], false));
            }
            pieces.push((url, true));
            cursor = start + url.len();
            search = cursor;
        } else {
            search = start + end;
        }
    }
    if cursor < text.len() {
        pieces.push((&text[cursor..], false));
    }
    pieces
}

/// Byte offset of the next URL prefix that starts a word.
fn next_url_start(s: &str) -> Option<usize> {
    let mut prev: Option<char> = None;
    for (i, ch) in s.char_indices() {
        let at_boundary = prev.is_none_or(|p| p.is_whitespace() || p == '(');
        if at_boundary && URL_PREFIXES.iter().any(|p| s[i..].starts_with(p)) {
            return Some(i);
        }
        prev = Some(ch);
    }
    None
}

// ── Writer ──────────────────────────────────────────────────────────────────

struct Writer {
    text: Text<'static>,
    base_fg: Color,
    /// Inline style stack (bold, italic, heading text, etc.). Styles compose
    /// via `patch` so nested bold+italic works.
    styles: Vec<Style>,
    /// Per-line prefix spans (blockquote `│`).
    line_prefixes: Vec<Span<'static>>,
    /// List nesting: None = unordered, Some(n) = ordered at index n.
    list_indices: Vec<Option<u64>>,
    /// Active syntax highlighter for fenced code blocks.
    highlighter: Option<HighlightLines<'static>>,
    /// True when inside a fenced code block without syntax highlighting.
    in_plain_code: bool,
    /// Stored link URL, appended after the link text closes.
    link_url: Option<String>,
    /// True while inside any link, so bare-URL detection stays out of the way.
    in_link: bool,
    /// Table being collected, if any.
    table: Option<TableBuilder>,
    /// Whether the next block element should be preceded by a blank line.
    needs_newline: bool,
}

impl Writer {
    fn new(base_fg: Color) -> Self {
        Self {
            text: Text::default(),
            base_fg,
            styles: vec![],
            line_prefixes: vec![],
            list_indices: vec![],
            highlighter: None,
            in_plain_code: false,
            link_url: None,
            in_link: false,
            table: None,
            needs_newline: false,
        }
    }

    // ── Style helpers ───────────────────────────────────────────────────

    /// Current effective style: top of stack, or base foreground color.
    fn style(&self) -> Style {
        self.styles
            .last()
            .copied()
            .unwrap_or_else(|| Style::default().fg(self.base_fg))
    }

    /// Push a style that composes with the current one (inherits parent modifiers).
    fn push_style(&mut self, overlay: Style) {
        self.styles.push(self.style().patch(overlay));
    }

    fn pop_style(&mut self) {
        self.styles.pop();
    }

    // ── Line/span helpers ───────────────────────────────────────────────

    fn push_line(&mut self, line: Line<'static>) {
        let mut out = line;
        for pfx in self.line_prefixes.iter().rev().cloned() {
            out.spans.insert(0, pfx);
        }
        self.text.lines.push(out);
    }

    fn push_span(&mut self, span: Span<'static>) {
        if let Some(table) = self.table.as_mut() {
            table.cell.push(span);
            return;
        }
        if let Some(line) = self.text.lines.last_mut() {
            line.push_span(span);
        } else {
            self.push_line(Line::from(vec![span]));
        }
    }

    fn blank_line_if_needed(&mut self) {
        if self.needs_newline {
            self.push_line(Line::default());
            self.needs_newline = false;
        }
    }

    // ── Event dispatch ──────────────────────────────────────────────────

    fn handle(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.open(tag),
            Event::End(tag) => self.close(tag),
            Event::Text(t) => self.text(t),
            Event::Code(c) => self.inline_code(c),
            Event::SoftBreak => self.push_span(Span::raw(" ")),
            Event::HardBreak => self.push_line(Line::default()),
            Event::Rule => {
                self.blank_line_if_needed();
                self.push_line(Line::from(Span::styled(
                    "─".repeat(40),
                    Style::default().fg(Color::DarkGray),
                )));
                self.needs_newline = true;
            }
            Event::TaskListMarker(checked) => {
                let marker = if checked { "[x] " } else { "[ ] " };
                self.push_span(Span::raw(marker));
            }
            Event::Html(html) => {
                // Block-level HTML: shown verbatim, one line per source line
                let style = Style::default().fg(self.base_fg);
                for line in html.lines() {
                    self.push_line(Line::from(Span::styled(line.to_owned(), style)));
                }
                self.needs_newline = true;
            }
            Event::InlineHtml(html) => {
                let style = self.style();
                self.push_span(Span::styled(html.to_string(), style));
            }
            _ => {} // footnotes, math
        }
    }

    fn open(&mut self, tag: Tag<'_>) {
        match tag {
            // ── Block elements ──────────────────────────────────────────
            Tag::Paragraph => {
                self.blank_line_if_needed();
                self.push_line(Line::default());
            }
            Tag::Heading { level, .. } => {
                self.blank_line_if_needed();
                let hs = heading_style(self.base_fg, level);
                let depth = heading_depth(level) as usize;
                self.push_line(Line::from(Span::styled(
                    format!("{} ", "#".repeat(depth)),
                    hs,
                )));
                // Push heading style so text() inherits it, not just the `##` prefix
                self.push_style(hs);
            }
            Tag::BlockQuote(_) => {
                self.blank_line_if_needed();
                self.line_prefixes.push(Span::styled(
                    "│ ",
                    Style::default().fg(Color::DarkGray),
                ));
                self.push_style(
                    Style::default()
                        .fg(self.base_fg)
                        .add_modifier(Modifier::DIM | Modifier::ITALIC),
                );
            }
            Tag::CodeBlock(kind) => {
                if !self.text.lines.is_empty() {
                    self.push_line(Line::default());
                }
                let lang = match &kind {
                    CodeBlockKind::Fenced(l) => l.as_ref(),
                    CodeBlockKind::Indented => "",
                };

                // Top border: ╭── lang  or just ╭──
                let bs = Style::default().fg(Color::DarkGray);
                let top = if lang.is_empty() {
                    Line::from(Span::styled("╭──", bs))
                } else {
                    Line::from(vec![
                        Span::styled("╭── ", bs),
                        Span::styled(
                            lang.to_owned(),
                            bs.add_modifier(Modifier::BOLD),
                        ),
                        Span::styled(" ──", bs),
                    ])
                };
                self.push_line(top);

                // Left border prefix for code content
                self.line_prefixes
                    .push(Span::styled("│ ", bs));

                // Syntax highlighting setup
                if !lang.is_empty()
                    && let Some(syn) = SYNTAX_SET.find_syntax_by_token(lang)
                    && let Some(theme) = THEME_SET.themes.get(CODE_THEME)
                {
                    self.highlighter = Some(HighlightLines::new(syn, theme));
                }
                if self.highlighter.is_none() {
                    self.in_plain_code = true;
                }
            }
            Tag::List(start) => {
                if self.list_indices.is_empty() {
                    self.blank_line_if_needed();
                }
                self.list_indices.push(start);
            }
            Tag::Item => {
                self.push_line(Line::default());
                let depth = self.list_indices.len().saturating_sub(1);
                let indent = "  ".repeat(depth);
                if let Some(idx) = self.list_indices.last_mut() {
                    let marker = match idx {
                        None => format!("{indent}- "),
                        Some(n) => {
                            let s = format!("{indent}{}. ", n);
                            *n += 1;
                            s
                        }
                    };
                    self.push_span(Span::styled(
                        marker,
                        Style::default().fg(Color::DarkGray),
                    ));
                }
            }

            // ── Inline elements ─────────────────────────────────────────
            Tag::Emphasis => self.push_style(Style::default().add_modifier(Modifier::ITALIC)),
            Tag::Strong => self.push_style(Style::default().add_modifier(Modifier::BOLD)),
            Tag::Strikethrough => {
                self.push_style(Style::default().add_modifier(Modifier::CROSSED_OUT))
            }
            Tag::Link {
                link_type,
                dest_url,
                ..
            } => {
                // <https://...> autolinks already show their URL as the text
                if !matches!(link_type, LinkType::Autolink | LinkType::Email) {
                    self.link_url = Some(dest_url.to_string());
                }
                self.in_link = true;
                self.push_style(link_style());
            }
            Tag::Table(alignments) => {
                self.blank_line_if_needed();
                self.table = Some(TableBuilder::new(alignments));
            }
            Tag::TableHead => self.push_style(Style::default().add_modifier(Modifier::BOLD)),
            Tag::TableRow | Tag::TableCell => {}
            _ => {} // images, definitions
        }
    }

    fn close(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => self.needs_newline = true,
            TagEnd::Heading(_) => {
                self.pop_style();
                self.needs_newline = true;
            }
            TagEnd::BlockQuote(_) => {
                self.line_prefixes.pop();
                self.pop_style();
                self.needs_newline = true;
            }
            TagEnd::CodeBlock => {
                self.highlighter = None;
                self.in_plain_code = false;
                self.line_prefixes.pop(); // remove │ prefix before bottom border
                let bs = Style::default().fg(Color::DarkGray);
                self.push_line(Line::from(Span::styled("╰──", bs)));
                self.needs_newline = true;
            }
            TagEnd::List(_) => {
                self.list_indices.pop();
                self.needs_newline = true;
            }
            TagEnd::Item => {}
            TagEnd::Emphasis | TagEnd::Strong | TagEnd::Strikethrough => self.pop_style(),
            TagEnd::Link => {
                self.pop_style();
                self.in_link = false;
                if let Some(url) = self.link_url.take() {
                    self.push_span(Span::raw(" ("));
                    self.push_span(Span::styled(url, link_style()));
                    self.push_span(Span::raw(")"));
                }
            }
            TagEnd::TableCell => {
                if let Some(table) = self.table.as_mut() {
                    table.end_cell();
                }
            }
            TagEnd::TableHead => {
                self.pop_style();
                if let Some(table) = self.table.as_mut() {
                    table.end_row();
                    table.header_rows = table.rows.len();
                }
            }
            TagEnd::TableRow => {
                if let Some(table) = self.table.as_mut() {
                    table.end_row();
                }
            }
            TagEnd::Table => {
                if let Some(table) = self.table.take() {
                    for line in table.into_lines() {
                        self.push_line(line);
                    }
                }
                self.needs_newline = true;
            }
            _ => {}
        }
    }

    // ── Content handlers ────────────────────────────────────────────────

    fn text(&mut self, cow: CowStr<'_>) {
        // Expand tabs → 4 spaces (ratatui renders \t as zero-width)
        let raw = cow.to_string();
        let text = if raw.contains('\t') {
            raw.replace('\t', "    ")
        } else {
            raw
        };

        // Syntax-highlighted code block: take highlighter out to avoid
        // double-mutable-borrow (highlight_line borrows it, push_line borrows self)
        if let Some(mut hl) = self.highlighter.take() {
            for line in LinesWithEndings::from(text.as_str()) {
                if let Ok(ranges) = hl.highlight_line(line, &SYNTAX_SET) {
                    let spans: Vec<Span<'static>> = ranges
                        .into_iter()
                        .filter_map(|(hl_style, frag)| {
                            let content = frag.trim_end_matches('\n').replace('\t', "    ");
                            if content.is_empty() {
                                return None;
                            }
                            let fg = Color::Rgb(
                                hl_style.foreground.r,
                                hl_style.foreground.g,
                                hl_style.foreground.b,
                            );
                            Some(Span::styled(content, Style::default().fg(fg)))
                        })
                        .collect();
                    if !spans.is_empty() {
                        self.push_line(Line::from(spans));
                    }
                }
            }
            self.highlighter = Some(hl);
            return;
        }

        // Plain code block (no highlighting available)
        if self.in_plain_code {
            let code_style = Style::default().fg(Color::White);
            for line in text.lines() {
                self.push_line(Line::from(Span::styled(line.to_owned(), code_style)));
            }
            return;
        }

        // Normal text inherits current style (heading, bold, etc.)
        let style = self.style();
        if self.in_link {
            self.push_span(Span::styled(text, style));
            return;
        }
        for (piece, is_url) in split_bare_urls(&text) {
            let piece_style = if is_url { style.patch(link_style()) } else { style };
            self.push_span(Span::styled(piece.to_owned(), piece_style));
        }
    }

    fn inline_code(&mut self, cow: CowStr<'_>) {
        let style = Style::default().fg(Color::White).bg(Color::DarkGray);
        self.push_span(Span::styled(cow.to_string(), style));
    }
}

// ── Helpers ─────────────────────────────────────────────────────────────────

fn heading_style(base_fg: Color, level: HeadingLevel) -> Style {
    match level {
        HeadingLevel::H1 => Style::default()
            .fg(base_fg)
            .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        HeadingLevel::H2 => Style::default()
            .fg(base_fg)
            .add_modifier(Modifier::BOLD),
        _ => Style::default()
            .fg(base_fg)
            .add_modifier(Modifier::BOLD | Modifier::ITALIC),
    }
}

fn heading_depth(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heading_text_inherits_heading_style() {
        let text = render("## Hello", Color::Blue);
        // Line 0 should contain "## " and "Hello", both with bold + blue
        let line = &text.lines[0];
        assert!(line.spans.len() >= 2, "expected >= 2 spans, got {:?}", line);
        let prefix_style = line.spans[0].style;
        let text_style = line.spans[1].style;
        // Both should have BOLD and blue foreground
        assert!(prefix_style.add_modifier.contains(Modifier::BOLD));
        assert!(text_style.add_modifier.contains(Modifier::BOLD));
        assert_eq!(text_style.fg, Some(Color::Blue));
    }

    #[test]
    fn bold_text_is_bold() {
        let text = render("Some **bold** text", Color::Blue);
        let line = &text.lines[0];
        // Find the "bold" span
        let bold_span = line.spans.iter().find(|s| s.content == "bold").unwrap();
        assert!(bold_span.style.add_modifier.contains(Modifier::BOLD));
    }

    #[test]
    fn inline_code_styled() {
        let text = render("Use `foo()` here", Color::Blue);
        let line = &text.lines[0];
        let code_span = line.spans.iter().find(|s| s.content == "foo()").unwrap();
        assert_eq!(code_span.style.fg, Some(Color::White));
        assert_eq!(code_span.style.bg, Some(Color::DarkGray));
    }

    #[test]
    fn code_block_has_border_structure() {
        let text = render("```\nline1\nline2\n```", Color::Blue);
        let all_content: Vec<String> = text
            .lines
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect::<String>())
            .collect();
        // Top border
        assert!(all_content[0].starts_with('╭'), "expected top border, got {:?}", all_content[0]);
        // Content lines with left border
        assert!(all_content[1].starts_with("│ "), "expected │ prefix, got {:?}", all_content[1]);
        assert!(all_content[1].contains("line1"));
        assert!(all_content[2].starts_with("│ "), "expected │ prefix, got {:?}", all_content[2]);
        assert!(all_content[2].contains("line2"));
        // Bottom border
        let last = all_content.last().unwrap();
        assert!(last.starts_with('╰'), "expected bottom border, got {:?}", last);
    }

    #[test]
    fn plain_text_uses_base_color() {
        let text = render("hello", Color::Green);
        let line = &text.lines[0];
        let span = &line.spans[0];
        assert_eq!(span.style.fg, Some(Color::Green));
    }

    fn line_texts(text: &Text<'_>) -> Vec<String> {
        text.lines
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect::<String>())
            .collect()
    }

    #[test]
    fn strikethrough_is_crossed_out() {
        let text = render("~~gone~~", Color::Blue);
        let span = text.lines[0].spans.iter().find(|s| s.content == "gone").unwrap();
        assert!(span.style.add_modifier.contains(Modifier::CROSSED_OUT));
    }

    #[test]
    fn table_columns_are_aligned() {
        let text = render("| a | bbb |\n|---|---:|\n| cc | d |", Color::Blue);
        let lines = line_texts(&text);
        assert_eq!(lines[0], "a  │ bbb");
        assert_eq!(lines[1], "───┼────");
        assert_eq!(lines[2], "cc │   d");
        let header = text.lines[0].spans.iter().find(|s| s.content == "a").unwrap();
        assert!(header.style.add_modifier.contains(Modifier::BOLD));
    }

    #[test]
    fn bare_url_is_linked() {
        let text = render("see https://example.com/docs.", Color::Blue);
        let url = text.lines[0]
            .spans
            .iter()
            .find(|s| s.content == "https://example.com/docs")
            .unwrap();
        assert!(url.style.add_modifier.contains(Modifier::UNDERLINED));
        assert_eq!(line_texts(&text)[0], "see https://example.com/docs.");
    }

    #[test]
    fn angle_autolink_is_not_duplicated() {
        let text = render("<https://example.com>", Color::Blue);
        assert_eq!(line_texts(&text)[0], "https://example.com");
    }

    #[test]
    fn named_link_appends_url() {
        let text = render("[docs](https://example.com)", Color::Blue);
        assert_eq!(line_texts(&text)[0], "docs (https://example.com)");
    }

    #[test]
    fn raw_html_is_literal() {
        let inline = render("a <b>bold</b> claim", Color::Blue);
        assert_eq!(line_texts(&inline)[0], "a <b>bold</b> claim");

        let block = render("<script>alert(1)</script>", Color::Blue);
        assert!(line_texts(&block).iter().any(|l| l == "<script>alert(1)</script>"));
    }

    #[test]
    fn split_bare_urls_cases() {
        assert_eq!(split_bare_urls("no links"), vec![("no links", false)]);
        assert_eq!(
            split_bare_urls("(www.rust-lang.org)"),
            vec![("(", false), ("www.rust-lang.org", true), (")", false)]
        );
        // Prefix alone or mid-word is not a link
        assert_eq!(split_bare_urls("https:// x"), vec![("https:// x", false)]);
        assert_eq!(split_bare_urls("xhttp://a"), vec![("xhttp://a", false)]);
    }

    #[test]
    fn tabs_expanded_to_spaces() {
        let text = render("```\n\tindented\n```", Color::Blue);
        let has_spaces = text.lines.iter().any(|l| {
            l.spans.iter().any(|s| s.content.starts_with("    "))
        });
        assert!(has_spaces, "tabs should be expanded to 4 spaces");
        let has_tabs = text.lines.iter().any(|l| {
            l.spans.iter().any(|s| s.content.contains('\t'))
        });
        assert!(!has_tabs, "no raw tabs should remain");
    }
}
