//! What the one-shot commands print, in the shape `--output` asks for.

use std::fmt::Display;
use std::io::{self, IsTerminal, Write};

use serde::Serialize;
use tabled::{Table, Tabled, settings::Style};

use crate::cli::{ColorMode, GlobalOpts, OutputFormat};
use crate::error::CliError;

/// `auto` colors only an interactive stdout, and never when `NO_COLOR` is set.
pub fn should_color(mode: &ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none(),
    }
}

/// Prints `data` to stdout.
///
/// `human` draws the default view and `plain` the scripting one. JSON and
/// YAML come straight from the value's `Serialize` impl.
pub fn emit<T: Serialize + ?Sized>(
    global: &GlobalOpts,
    data: &T,
    human: impl FnOnce(&T) -> String,
    plain: impl FnOnce(&T) -> String,
) -> Result<(), CliError> {
    let text = render(&global.output, data, human, plain)?;
    line(&text, global.quiet);
    Ok(())
}

/// Prints one line to stdout unless `--quiet`.
pub fn line(text: &str, quiet: bool) {
    let text = text.trim_end();
    if quiet || text.is_empty() {
        return;
    }
    let _ = writeln!(io::stdout().lock(), "{text}");
}

pub fn table<R: Tabled>(rows: impl IntoIterator<Item = R>) -> String {
    Table::new(rows).with(Style::rounded()).to_string()
}

fn render<T: Serialize + ?Sized>(
    format: &OutputFormat,
    data: &T,
    human: impl FnOnce(&T) -> String,
    plain: impl FnOnce(&T) -> String,
) -> Result<String, CliError> {
    Ok(match format {
        OutputFormat::Table => human(data),
        OutputFormat::Plain => plain(data),
        OutputFormat::Json => serde_json::to_string_pretty(data).map_err(unencodable)?,
        OutputFormat::JsonCompact => serde_json::to_string(data).map_err(unencodable)?,
        OutputFormat::Yaml => serde_yaml::to_string(data).map_err(unencodable)?,
    })
}

fn unencodable(e: impl Display) -> CliError {
    CliError::Internal(format!("could not encode output: {e}"))
}
