//! Terminal detection for colored output

use anstream::AutoStream;

/// When to emit color escape sequences
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ColorChoice {
    /// Color when stdout is a terminal, unless NO_COLOR or CLICOLOR=0 says otherwise
    #[default]
    Auto,
    Always,
    Never,
}

impl From<ColorChoice> for anstream::ColorChoice {
    fn from(choice: ColorChoice) -> Self {
        match choice {
            ColorChoice::Auto => anstream::ColorChoice::Auto,
            ColorChoice::Always => anstream::ColorChoice::Always,
            ColorChoice::Never => anstream::ColorChoice::Never,
        }
    }
}

impl ColorChoice {
    /// Resolves the choice against stdout and the color environment variables
    pub fn should_colorize(self) -> bool {
        let resolved = match self {
            ColorChoice::Auto => AutoStream::choice(&std::io::stdout()),
            explicit => explicit.into(),
        };
        emits_color(resolved)
    }
}

fn emits_color(choice: anstream::ColorChoice) -> bool {
    matches!(
        choice,
        anstream::ColorChoice::Always | anstream::ColorChoice::AlwaysAnsi
    )
}
