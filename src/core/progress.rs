//! Progress spinner shown while scanning and extracting

use anyhow::Result;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::io::IsTerminal;

use super::config::{SCANNING_MESSAGE, SPINNER_TEMPLATE, SPINNER_TICK};

/// Creates a progress style for the spinner
pub(crate) fn create_spinner_style() -> Result<ProgressStyle> {
    Ok(ProgressStyle::default_spinner().template(SPINNER_TEMPLATE)?)
}

/// Creates a ticking spinner on stderr
///
/// The spinner is hidden when `enabled` is false or stderr is not a terminal, so it
/// never ends up in redirected output.
pub fn create_spinner(enabled: bool) -> Result<ProgressBar> {
    if !enabled || !std::io::stderr().is_terminal() {
        return Ok(ProgressBar::hidden());
    }

    let spinner = ProgressBar::with_draw_target(None, ProgressDrawTarget::stderr());
    spinner.set_style(create_spinner_style()?);
    spinner.set_message(SCANNING_MESSAGE);
    spinner.enable_steady_tick(SPINNER_TICK);
    Ok(spinner)
}
