//! Terminal color palette.
//!
//! Built once per command and passed to whatever prints. With colors
//! disabled every style renders plain text.

use console::{Style, StyledObject};

#[derive(Debug, Clone)]
pub struct Palette {
    pub user: Style,
    pub assistant: Style,
    pub error: Style,
    pub success: Style,
    pub warning: Style,
    pub dim: Style,
    pub bold: Style,
    color: bool,
}

impl Palette {
    /// `color = false` forces plain output even on a color terminal.
    pub fn new(color: bool) -> Self {
        let finish = |style: Style| if color { style } else { style.force_styling(false) };

        Self {
            user: finish(Style::new().green().bold()),
            assistant: finish(Style::new().cyan().bold()),
            error: finish(Style::new().red().bold()),
            success: finish(Style::new().green().bold()),
            warning: finish(Style::new().yellow().bold()),
            dim: finish(Style::new().dim()),
            bold: finish(Style::new().bold()),
            color,
        }
    }

    /// Whether styling was requested (`--no-color` not given).
    pub fn color_enabled(&self) -> bool {
        self.color
    }

    pub fn user<D>(&self, text: D) -> StyledObject<D> {
        self.user.apply_to(text)
    }

    pub fn assistant<D>(&self, text: D) -> StyledObject<D> {
        self.assistant.apply_to(text)
    }

    pub fn error<D>(&self, text: D) -> StyledObject<D> {
        self.error.apply_to(text)
    }

    pub fn success<D>(&self, text: D) -> StyledObject<D> {
        self.success.apply_to(text)
    }

    pub fn warning<D>(&self, text: D) -> StyledObject<D> {
        self.warning.apply_to(text)
    }

    pub fn dim<D>(&self, text: D) -> StyledObject<D> {
        self.dim.apply_to(text)
    }

    pub fn bold<D>(&self, text: D) -> StyledObject<D> {
        self.bold.apply_to(text)
    }
}
