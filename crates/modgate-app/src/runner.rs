//! Step outputs and workflow commands.

use std::collections::BTreeMap;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::PathBuf;

/// Raw classifier JSON.
pub const MODERATION_RESULTS_JSON: &str = "moderation-results-json";
/// `"true"` or `"false"`.
pub const IS_INAPPROPRIATE: &str = "is-inappropriate";
/// Comma-joined category names.
pub const FLAGGED_CATEGORIES: &str = "flagged-categories";

/// Destination for step outputs.
pub trait OutputSink {
    /// Records one named output.
    fn set_output(&mut self, name: &str, value: &str) -> io::Result<()>;
}

impl OutputSink for BTreeMap<String, String> {
    fn set_output(&mut self, name: &str, value: &str) -> io::Result<()> {
        self.insert(name.to_string(), value.to_string());
        Ok(())
    }
}

/// Appends outputs to the file named by `GITHUB_OUTPUT`.
///
/// Uses the heredoc form so values may span lines.
#[derive(Debug, Clone)]
pub struct OutputFile {
    path: PathBuf,
}

impl OutputFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn delimiter_for(value: &str) -> String {
        loop {
            let delimiter = format!("ghadelimiter_{:016x}", rand::random::<u64>());
            if !value.contains(&delimiter) {
                return delimiter;
            }
        }
    }
}

impl OutputSink for OutputFile {
    fn set_output(&mut self, name: &str, value: &str) -> io::Result<()> {
        let delimiter = Self::delimiter_for(value);
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        write!(file, "{}<<{}\n{}\n{}\n", name, delimiter, value, delimiter)
    }
}

/// Prints legacy `::set-output` commands when no output file is available.
#[derive(Debug)]
pub struct CommandOutput<W: Write> {
    writer: W,
}

impl<W: Write> CommandOutput<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> OutputSink for CommandOutput<W> {
    fn set_output(&mut self, name: &str, value: &str) -> io::Result<()> {
        writeln!(
            self.writer,
            "::set-output name={}::{}",
            escape_property(name),
            escape_data(value)
        )
    }
}

/// Picks the output file when the runner provides one, stdout otherwise.
pub fn output_sink(path: Option<PathBuf>) -> Box<dyn OutputSink> {
    match path {
        Some(path) => Box::new(OutputFile::new(path)),
        None => {
            tracing::debug!("GITHUB_OUTPUT not set, writing outputs as commands");
            Box::new(CommandOutput::new(io::stdout()))
        }
    }
}

/// Escapes a workflow command message.
pub fn escape_data(value: &str) -> String {
    value
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

/// Escapes a workflow command property.
pub fn escape_property(value: &str) -> String {
    escape_data(value).replace(':', "%3A").replace(',', "%2C")
}

/// Builds the `::error::` annotation that marks the step failed.
pub fn error_command(message: &str) -> String {
    format!("::error::{}", escape_data(message))
}
