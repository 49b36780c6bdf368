//! Terminal markdown rendering with syntax-highlighted code blocks.
//!
//! `MarkdownRenderer` combines `termimad` for prose and `syntect` for fenced
//! code. Building the skin and loading the syntax and theme sets is the slow
//! part, so it happens on the first `render` and is reused afterwards.
//! Rendering never fails: any error falls back to the raw markdown.

use std::fmt::Write as _;
use std::sync::OnceLock;
use std::time::Duration;

use syntect::easy::HighlightLines;
use syntect::highlighting::{Theme, ThemeSet};
use syntect::parsing::SyntaxSet;
use syntect::util::{LinesWithEndings, as_24_bit_terminal_escaped};
use termimad::MadSkin;
use tracing::debug;

use crate::cli::palette::Palette;

#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Column at which prose wraps.
    pub wrap_width: usize,
    /// syntect theme name for code blocks.
    pub code_theme: String,
    /// Off for `--no-color`/`NO_COLOR`: prose and code come out unstyled.
    pub color: bool,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum RenderError {
    #[error("unknown code theme: {0}")]
    UnknownTheme(String),

    #[error("highlighting failed: {0}")]
    Highlight(String),
}

struct Formatter {
    skin: MadSkin,
    syntax_set: SyntaxSet,
    /// `None` when color is off.
    theme: Option<Theme>,
}

impl Formatter {
    fn build(options: &RenderOptions) -> Result<Self, RenderError> {
        if !options.color {
            return Ok(Self {
                skin: MadSkin::no_style(),
                syntax_set: SyntaxSet::load_defaults_newlines(),
                theme: None,
            });
        }

        let mut themes = ThemeSet::load_defaults().themes;
        let theme = themes
            .remove(&options.code_theme)
            .ok_or_else(|| RenderError::UnknownTheme(options.code_theme.clone()))?;

        let mut skin = MadSkin::default_dark();
        skin.inline_code
            .set_fg(termimad::crossterm::style::Color::Yellow);

        Ok(Self {
            skin,
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme: Some(theme),
        })
    }

    fn prose(&self, text: &str, width: usize, out: &mut String) {
        if text.trim().is_empty() {
            out.push_str(text);
            return;
        }
        let _ = write!(out, "{}", self.skin.text(text, Some(width)));
    }

    fn code(&self, code: &str, lang: &str, out: &mut String) -> Result<(), RenderError> {
        let Some(theme) = &self.theme else {
            for line in LinesWithEndings::from(code) {
                out.push_str("  ");
                out.push_str(line);
            }
            if !code.is_empty() && !code.ends_with('\n') {
                out.push('\n');
            }
            return Ok(());
        };

        let syntax = self
            .syntax_set
            .find_syntax_by_token(lang)
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text());
        let mut highlighter = HighlightLines::new(syntax, theme);

        for line in LinesWithEndings::from(code) {
            let ranges = highlighter
                .highlight_line(line, &self.syntax_set)
                .map_err(|e| RenderError::Highlight(e.to_string()))?;
            out.push_str("  ");
            out.push_str(&as_24_bit_terminal_escaped(&ranges[..], false));
        }
        out.push_str("\x1b[0m");
        if !code.ends_with('\n') {
            out.push('\n');
        }
        Ok(())
    }
}

/// Markdown to ANSI renderer. Construct once per command and pass it down.
pub struct MarkdownRenderer {
    options: RenderOptions,
    formatter: OnceLock<Result<Formatter, RenderError>>,
}

impl MarkdownRenderer {
    pub fn new(options: RenderOptions) -> Self {
        Self {
            options,
            formatter: OnceLock::new(),
        }
    }

    /// Render `markdown` for the terminal, or return it unchanged if the
    /// formatter or the highlighter fails.
    pub fn render(&self, markdown: &str) -> String {
        match self.try_render(markdown) {
            Ok(rendered) => rendered,
            Err(e) => {
                debug!(error = %e, "Markdown rendering failed, printing raw text");
                markdown.to_string()
            }
        }
    }

    fn try_render(&self, markdown: &str) -> Result<String, RenderError> {
        let formatter = self
            .formatter
            .get_or_init(|| Formatter::build(&self.options))
            .as_ref()
            .map_err(Clone::clone)?;
        let width = self.options.wrap_width.max(20);

        let mut out = String::new();
        let mut prose = String::new();
        let mut fence: Option<(String, String)> = None;

        for line in LinesWithEndings::from(markdown) {
            let is_fence = line.trim_start().starts_with("```");
            match fence.take() {
                None if is_fence => {
                    formatter.prose(&prose, width, &mut out);
                    prose.clear();
                    let lang = line.trim().trim_start_matches('`').trim().to_string();
                    fence = Some((lang, String::new()));
                }
                None => prose.push_str(line),
                Some((lang, code)) if is_fence => {
                    formatter.code(&code, &lang, &mut out)?;
                }
                Some((lang, mut code)) => {
                    code.push_str(line);
                    fence = Some((lang, code));
                }
            }
        }

        match fence {
            // Unclosed fence: highlight what arrived.
            Some((lang, code)) => formatter.code(&code, &lang, &mut out)?,
            None => formatter.prose(&prose, width, &mut out),
        }

        Ok(out)
    }
}

/// Dim footer printed under a reply: `| 42 tokens · 1.3s · model`.
pub fn format_stats_footer(palette: &Palette, tokens: u32, elapsed: Duration, model: &str) -> String {
    format!(
        "  {} {} tokens {} {:.1}s {} {}",
        palette.dim("|"),
        palette.dim(tokens),
        palette.dim("\u{00b7}"),
        palette.dim(elapsed.as_secs_f64()),
        palette.dim("\u{00b7}"),
        palette.dim(model),
    )
}
