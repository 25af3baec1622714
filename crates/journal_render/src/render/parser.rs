//! Markdown parsing seam.
//!
//! The renderer only needs "markdown in, HTML out". [`CommonMarkParser`] is
//! the `pulldown-cmark` implementation used everywhere outside of tests.

use pulldown_cmark::{Event, Options, Parser};

/// Converts markdown text to an HTML string.
///
/// Inline raw HTML is expected to pass through untouched, sanitization
/// happens after parsing.
pub trait MarkdownParser: Send + Sync {
    fn parse(&self, markdown: &str) -> String;
}

/// Options for the markdown parse step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkdownOptions {
    /// Enable GitHub Flavored Markdown tables
    pub enable_tables: bool,
    /// Enable strikethrough syntax (~~text~~)
    pub enable_strikethrough: bool,
    /// Enable task list items ([x] and [ ])
    pub enable_tasklists: bool,
    /// Render every newline inside a paragraph as `<br>`
    pub hard_line_breaks: bool,
}

impl Default for MarkdownOptions {
    fn default() -> Self {
        Self::gfm()
    }
}

impl MarkdownOptions {
    /// GitHub Flavored Markdown with line breaks preserved.
    pub fn gfm() -> Self {
        Self {
            enable_tables: true,
            enable_strikethrough: true,
            enable_tasklists: true,
            hard_line_breaks: true,
        }
    }

    /// Plain CommonMark.
    pub fn commonmark() -> Self {
        Self {
            enable_tables: false,
            enable_strikethrough: false,
            enable_tasklists: false,
            hard_line_breaks: false,
        }
    }

    fn to_pulldown_options(self) -> Options {
        let mut options = Options::empty();
        if self.enable_tables {
            options.insert(Options::ENABLE_TABLES);
        }
        if self.enable_strikethrough {
            options.insert(Options::ENABLE_STRIKETHROUGH);
        }
        if self.enable_tasklists {
            options.insert(Options::ENABLE_TASKLISTS);
        }
        options
    }
}

/// [`MarkdownParser`] backed by `pulldown-cmark`.
#[derive(Debug, Clone, Default)]
pub struct CommonMarkParser {
    options: MarkdownOptions,
}

impl CommonMarkParser {
    pub fn new(options: MarkdownOptions) -> Self {
        Self { options }
    }
}

impl MarkdownParser for CommonMarkParser {
    fn parse(&self, markdown: &str) -> String {
        let hard_line_breaks = self.options.hard_line_breaks;
        let events = Parser::new_ext(markdown, self.options.to_pulldown_options()).map(|event| {
            match event {
                Event::SoftBreak if hard_line_breaks => Event::HardBreak,
                event => event,
            }
        });

        let mut html_output = String::with_capacity(markdown.len() * 3 / 2);
        pulldown_cmark::html::push_html(&mut html_output, events);
        html_output
    }
}
