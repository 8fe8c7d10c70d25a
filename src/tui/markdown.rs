//! Assistant replies arrive as markdown; this turns them into ratatui `Text`.
//!
//! Covered: paragraphs, headings, emphasis, inline code, fenced code
//! (highlighted with syntect when the language is known), lists, block
//! quotes and links. Tables and images fall through as plain text.

use std::sync::LazyLock;

use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use syntect::easy::HighlightLines;
use syntect::highlighting::ThemeSet;
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;

static SYNTAXES: LazyLock<SyntaxSet> = LazyLock::new(SyntaxSet::load_defaults_newlines);
static THEMES: LazyLock<ThemeSet> = LazyLock::new(ThemeSet::load_defaults);

const CODE_THEME: &str = "base16-ocean.dark";
const MUTED: Color = Color::DarkGray;

pub fn render(content: &str, base_fg: Color) -> Text<'static> {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);

    let mut renderer = Renderer::new(base_fg);
    for event in Parser::new_ext(content, options) {
        renderer.event(event);
    }
    renderer.finish()
}

enum CodeBlock {
    Highlighted(HighlightLines<'static>),
    Plain,
}

struct Renderer {
    lines: Vec<Line<'static>>,
    base: Style,
    inline: Vec<Style>,
    /// `None` for bullets, `Some(n)` for the next ordered number.
    lists: Vec<Option<u64>>,
    quote_depth: usize,
    code: Option<CodeBlock>,
    link: Option<String>,
    pending_gap: bool,
}

impl Renderer {
    fn new(base_fg: Color) -> Self {
        Self {
            lines: Vec::new(),
            base: Style::default().fg(base_fg),
            inline: Vec::new(),
            lists: Vec::new(),
            quote_depth: 0,
            code: None,
            link: None,
            pending_gap: false,
        }
    }

    fn finish(self) -> Text<'static> {
        Text::from(self.lines)
    }

    fn current(&self) -> Style {
        self.inline.last().copied().unwrap_or(self.base)
    }

    fn push_inline(&mut self, overlay: Style) {
        self.inline.push(self.current().patch(overlay));
    }

    /// Starts a new line, carrying one `│ ` per enclosing block quote.
    fn new_line(&mut self) {
        let spans = (0..self.quote_depth)
            .map(|_| Span::styled("│ ", Style::default().fg(MUTED)))
            .collect::<Vec<_>>();
        self.lines.push(Line::from(spans));
    }

    fn span(&mut self, span: Span<'static>) {
        if self.lines.is_empty() {
            self.new_line();
        }
        if let Some(line) = self.lines.last_mut() {
            line.push_span(span);
        }
    }

    fn start_block(&mut self) {
        if self.pending_gap && !self.lines.is_empty() {
            self.new_line();
        }
        self.pending_gap = false;
    }

    fn event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(tag) => self.end(tag),
            Event::Text(text) => self.text(&text),
            Event::Code(code) => self.span(Span::styled(
                code.into_string(),
                Style::default().fg(Color::White).bg(MUTED),
            )),
            Event::SoftBreak => self.span(Span::raw(" ")),
            Event::HardBreak => self.new_line(),
            Event::Rule => {
                self.start_block();
                self.new_line();
                self.span(Span::styled("─".repeat(32), Style::default().fg(MUTED)));
                self.pending_gap = true;
            }
            _ => {}
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph => {
                if self.lists.is_empty() {
                    self.start_block();
                    self.new_line();
                } else {
                    self.pending_gap = false;
                }
            }
            Tag::Heading { level, .. } => {
                self.start_block();
                self.new_line();
                let style = self.base.patch(heading_style(level));
                self.span(Span::styled(format!("{} ", "#".repeat(level as usize)), style));
                self.inline.push(style);
            }
            Tag::BlockQuote(_) => {
                self.start_block();
                self.quote_depth += 1;
                self.push_inline(Style::default().add_modifier(Modifier::ITALIC));
            }
            Tag::CodeBlock(kind) => {
                self.start_block();
                let lang = match kind {
                    CodeBlockKind::Fenced(lang) => lang.into_string(),
                    CodeBlockKind::Indented => String::new(),
                };
                self.new_line();
                let label = if lang.is_empty() {
                    "╭──".to_string()
                } else {
                    format!("╭── {lang}")
                };
                self.span(Span::styled(label, Style::default().fg(MUTED)));

                let syntax = (!lang.is_empty())
                    .then(|| SYNTAXES.find_syntax_by_token(&lang))
                    .flatten();
                self.code = Some(match (syntax, THEMES.themes.get(CODE_THEME)) {
                    (Some(syntax), Some(theme)) => {
                        CodeBlock::Highlighted(HighlightLines::new(syntax, theme))
                    }
                    _ => CodeBlock::Plain,
                });
            }
            Tag::List(start) => {
                if self.lists.is_empty() {
                    self.start_block();
                }
                self.lists.push(start);
            }
            Tag::Item => {
                self.new_line();
                let indent = "  ".repeat(self.lists.len().saturating_sub(1));
                let marker = match self.lists.last_mut() {
                    Some(Some(n)) => {
                        let marker = format!("{indent}{n}. ");
                        *n += 1;
                        marker
                    }
                    _ => format!("{indent}• "),
                };
                self.span(Span::styled(marker, Style::default().fg(MUTED)));
            }
            Tag::Emphasis => self.push_inline(Style::default().add_modifier(Modifier::ITALIC)),
            Tag::Strong => self.push_inline(Style::default().add_modifier(Modifier::BOLD)),
            Tag::Strikethrough => {
                self.push_inline(Style::default().add_modifier(Modifier::CROSSED_OUT))
            }
            Tag::Link { dest_url, .. } => {
                self.link = Some(dest_url.into_string());
                self.push_inline(
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::UNDERLINED),
                );
            }
            _ => {}
        }
    }

    fn end(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph | TagEnd::List(_) => {
                if matches!(tag, TagEnd::List(_)) {
                    self.lists.pop();
                }
                self.pending_gap = true;
            }
            TagEnd::Heading(_) => {
                self.inline.pop();
                self.pending_gap = true;
            }
            TagEnd::BlockQuote(_) => {
                self.quote_depth = self.quote_depth.saturating_sub(1);
                self.inline.pop();
                self.pending_gap = true;
            }
            TagEnd::CodeBlock => {
                self.code = None;
                self.new_line();
                self.span(Span::styled("╰──", Style::default().fg(MUTED)));
                self.pending_gap = true;
            }
            TagEnd::Emphasis | TagEnd::Strong | TagEnd::Strikethrough => {
                self.inline.pop();
            }
            TagEnd::Link => {
                self.inline.pop();
                if let Some(url) = self.link.take() {
                    self.span(Span::styled(format!(" <{url}>"), Style::default().fg(MUTED)));
                }
            }
            _ => {}
        }
    }

    fn text(&mut self, text: &str) {
        let text = text.replace('\t', "    ");
        match self.code.take() {
            Some(CodeBlock::Highlighted(mut highlighter)) => {
                for source_line in LinesWithEndings::from(&text) {
                    self.new_line();
                    self.span(Span::styled("│ ", Style::default().fg(MUTED)));
                    match highlighter.highlight_line(source_line, &SYNTAXES) {
                        Ok(ranges) => {
                            for (style, fragment) in ranges {
                                let fragment = fragment.trim_end_matches('\n');
                                if fragment.is_empty() {
                                    continue;
                                }
                                let fg = style.foreground;
                                self.span(Span::styled(
                                    fragment.to_string(),
                                    Style::default().fg(Color::Rgb(fg.r, fg.g, fg.b)),
                                ));
                            }
                        }
                        Err(_) => self.span(Span::raw(source_line.trim_end().to_string())),
                    }
                }
                self.code = Some(CodeBlock::Highlighted(highlighter));
            }
            Some(CodeBlock::Plain) => {
                for source_line in text.lines() {
                    self.new_line();
                    self.span(Span::styled("│ ", Style::default().fg(MUTED)));
                    self.span(Span::styled(
                        source_line.to_string(),
                        Style::default().fg(Color::White),
                    ));
                }
                self.code = Some(CodeBlock::Plain);
            }
            None => {
                let style = self.current();
                self.span(Span::styled(text, style));
            }
        }
    }
}

fn heading_style(level: HeadingLevel) -> Style {
    match level {
        HeadingLevel::H1 => Style::default().add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        HeadingLevel::H2 => Style::default().add_modifier(Modifier::BOLD),
        _ => Style::default().add_modifier(Modifier::BOLD | Modifier::ITALIC),
    }
}
