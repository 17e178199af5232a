// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Operator confirmation.
//!
//! Every step is offered to the operator as a yes/no question before anything
//! is performed. Only a bare `y` counts as a yes. Case and surrounding
//! whitespace are ignored, but nothing else is. In particular `yes` is a no.

use inquire::{InquireError, Text};
use std::io::{BufRead, Write};
use tracing::{debug, instrument};

/// Check if operator's answer enables a step.
pub fn is_accepted(answer: impl AsRef<str>) -> bool {
    answer.as_ref().trim().to_lowercase() == "y"
}

/// Ask operator a question, and obtain their raw answer.
pub trait Confirm {
    /// Present message, and read one line of input.
    ///
    /// # Errors
    ///
    /// - Return [`PromptError::Interrupted`] if operator cancelled the run.
    /// - Return [`PromptError::Closed`] if no more input can be read.
    fn ask(&mut self, message: &str) -> Result<String>;
}

/// Terminal prompter through inquire.
#[derive(Debug, Default)]
pub struct InquirePrompter;

impl InquirePrompter {
    /// Construct new terminal prompter.
    pub fn new() -> Self {
        Self
    }
}

impl Confirm for InquirePrompter {
    #[instrument(skip(self), level = "debug")]
    fn ask(&mut self, message: &str) -> Result<String> {
        match Text::new(message).prompt() {
            Ok(answer) => Ok(answer),
            Err(InquireError::OperationInterrupted) => Err(PromptError::Interrupted),
            // INVARIANT: Escape skips the step, it does not cancel the run.
            Err(InquireError::OperationCanceled) => {
                debug!("prompt canceled, treat as rejection");
                Ok(String::new())
            }
            Err(err) => Err(PromptError::Inquire(err)),
        }
    }
}

/// Line-based prompter over arbitrary reader and writer.
///
/// Used whenever standard input is not a terminal, e.g., answers piped in
/// from a file.
#[derive(Debug)]
pub struct LinePrompter<R, W>
where
    R: BufRead,
    W: Write,
{
    reader: R,
    writer: W,
}

impl<R, W> LinePrompter<R, W>
where
    R: BufRead,
    W: Write,
{
    /// Construct new line prompter.
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    /// Give back the writer prompts were written to.
    pub fn into_writer(self) -> W {
        self.writer
    }
}

impl<R, W> Confirm for LinePrompter<R, W>
where
    R: BufRead,
    W: Write,
{
    fn ask(&mut self, message: &str) -> Result<String> {
        write!(self.writer, "{message} ")?;
        self.writer.flush()?;

        let mut answer = String::new();
        if self.reader.read_line(&mut answer)? == 0 {
            return Err(PromptError::Closed);
        }

        Ok(answer)
    }
}

/// Prompting error types.
#[derive(Debug, thiserror::Error)]
pub enum PromptError {
    /// Operator interrupted the prompt.
    #[error("prompt interrupted by user")]
    Interrupted,

    /// Input ended before an answer was given.
    #[error("input closed before an answer was given")]
    Closed,

    /// Terminal prompt failed.
    #[error(transparent)]
    Inquire(InquireError),

    /// Reading or writing the prompt failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Friendly result alias :3
type Result<T, E = PromptError> = std::result::Result<T, E>;
