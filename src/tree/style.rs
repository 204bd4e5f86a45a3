//! Color palette for rendered annotations
//!
//! Styles are carried in a value passed to the renderer rather than looked up from
//! global state, so colored and plain output can be produced side by side.

use anstyle::{AnsiColor, Color, Style};

/// What a piece of annotation text means
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    /// `main` / `master`
    DefaultBranch,
    OtherBranch,
    Ahead,
    Behind,
    /// Brackets, separators and the no-remote marker
    Muted,
    /// Stashes and uncommitted changes
    Attention,
}

/// Style per category
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub default_branch: Style,
    pub other_branch: Style,
    pub ahead: Style,
    pub behind: Style,
    pub muted: Style,
    pub attention: Style,
}

const fn bold(color: AnsiColor) -> Style {
    Style::new().fg_color(Some(Color::Ansi(color))).bold()
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            default_branch: bold(AnsiColor::BrightBlack),
            other_branch: bold(AnsiColor::Yellow),
            ahead: bold(AnsiColor::Green),
            behind: bold(AnsiColor::Red),
            muted: bold(AnsiColor::BrightBlack),
            attention: bold(AnsiColor::Red),
        }
    }
}

impl Palette {
    pub fn style(&self, category: Category) -> Style {
        match category {
            Category::DefaultBranch => self.default_branch,
            Category::OtherBranch => self.other_branch,
            Category::Ahead => self.ahead,
            Category::Behind => self.behind,
            Category::Muted => self.muted,
            Category::Attention => self.attention,
        }
    }
}

/// Rendering switches threaded through the renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderStyle {
    pub enabled: bool,
    pub palette: Palette,
}

impl RenderStyle {
    /// No escape sequences at all
    pub fn plain() -> Self {
        Self {
            enabled: false,
            palette: Palette::default(),
        }
    }

    pub fn colored() -> Self {
        Self {
            enabled: true,
            palette: Palette::default(),
        }
    }

    pub fn new(enabled: bool) -> Self {
        if enabled {
            Self::colored()
        } else {
            Self::plain()
        }
    }

    /// Wraps `text` in the escape sequences for `category` when color is enabled
    pub fn paint(&self, category: Category, text: &str) -> String {
        if !self.enabled {
            return text.to_string();
        }
        let style = self.palette.style(category);
        format!("{style}{text}{style:#}")
    }
}

impl Default for RenderStyle {
    fn default() -> Self {
        Self::plain()
    }
}
