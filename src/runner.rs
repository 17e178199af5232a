// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Step runner.
//!
//! Runs a ranked sequence of steps in two phases. First every step is offered
//! to the operator, in declared order, exactly once. Then the accepted steps
//! are performed in that same order, each behind a banner naming it.
//!
//! # Failure
//!
//! A failing step halts the run on the spot. Nothing after it is performed,
//! and nothing before it is undone. Operator cancellation is reported as
//! [`RunError::Interrupted`] no matter which phase it was observed in, so the
//! caller can acknowledge it in one place.

use crate::{
    config::RunConfiguration,
    prompt::{is_accepted, Confirm, PromptError},
    step::{Describe, Execute, Step, StepError},
};

use std::io::Write;
use tracing::{debug, info, instrument};

/// Interactive step runner.
#[derive(Debug, Default, Clone, Copy)]
pub struct Runner {
    config: RunConfiguration,
}

impl Runner {
    /// Construct new runner.
    pub fn new(config: RunConfiguration) -> Self {
        Self { config }
    }

    /// Select, then perform steps.
    ///
    /// # Errors
    ///
    /// - Return [`RunError::Interrupted`] if operator cancelled the run.
    /// - Return [`RunError::Prompt`] if operator cannot be asked.
    /// - Return [`RunError::Step`] if an accepted step fails.
    /// - Return [`RunError::Output`] if banners cannot be written.
    pub fn run<K, P, E, W>(
        &self,
        steps: Vec<Step<K>>,
        prompter: &mut P,
        executor: &mut E,
        out: &mut W,
    ) -> Result<RunSummary>
    where
        K: Describe,
        P: Confirm,
        E: Execute<K>,
        W: Write,
    {
        let accepted = self.select(steps, prompter)?;
        self.perform(&accepted, executor, out)
    }

    /// Offer each step to operator, and keep the accepted ones.
    ///
    /// Relative order of accepted steps is the declared order.
    ///
    /// # Errors
    ///
    /// - Return [`RunError::Interrupted`] if operator cancelled the run.
    /// - Return [`RunError::Prompt`] if operator cannot be asked.
    pub fn select<K, P>(&self, steps: Vec<Step<K>>, prompter: &mut P) -> Result<Vec<Step<K>>>
    where
        K: Describe,
        P: Confirm,
    {
        let mut accepted = Vec::new();
        for step in steps {
            let answer = prompter.ask(&step.prompt())?;
            if is_accepted(&answer) {
                debug!("accept {step}");
                accepted.push(step);
            } else {
                debug!("skip {step}");
            }
        }

        Ok(accepted)
    }

    /// Perform accepted steps in order.
    ///
    /// Under dry run, only banners are written.
    ///
    /// # Errors
    ///
    /// - Return [`RunError::Step`] if a step fails. No later step runs.
    /// - Return [`RunError::Output`] if banners cannot be written.
    #[instrument(skip(self, accepted, executor, out), level = "debug")]
    pub fn perform<K, E, W>(
        &self,
        accepted: &[Step<K>],
        executor: &mut E,
        out: &mut W,
    ) -> Result<RunSummary>
    where
        K: Describe,
        E: Execute<K>,
        W: Write,
    {
        let mut summary = RunSummary {
            dry_run: self.config.dry_run,
            announced: Vec::new(),
            performed: Vec::new(),
        };

        for step in accepted {
            writeln!(out, "{}", step.banner()).map_err(RunError::Output)?;
            out.flush().map_err(RunError::Output)?;
            summary.announced.push(step.rank());

            if self.config.dry_run {
                debug!("dry run, do not perform {step}");
                continue;
            }

            executor.execute(step.kind())?;
            info!("done {step}");
            summary.performed.push(step.rank());
        }

        Ok(summary)
    }
}

/// What a finished run went through.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Whether effects were suppressed.
    pub dry_run: bool,

    /// Ranks of steps that got their banner, in order.
    pub announced: Vec<usize>,

    /// Ranks of steps whose effects completed, in order. Always empty under
    /// dry run.
    pub performed: Vec<usize>,
}

/// Step runner error types.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    /// Operator cancelled the run.
    #[error("interrupted by user")]
    Interrupted,

    /// Operator cannot be asked.
    #[error(transparent)]
    Prompt(PromptError),

    /// Accepted step failed.
    #[error(transparent)]
    Step(StepError),

    /// Banner cannot be written.
    #[error("failed to write step banner")]
    Output(#[source] std::io::Error),
}

impl RunError {
    /// Check if error is operator cancellation rather than a failure.
    pub fn is_interrupted(&self) -> bool {
        matches!(self, Self::Interrupted)
    }
}

impl From<PromptError> for RunError {
    fn from(error: PromptError) -> Self {
        match error {
            PromptError::Interrupted => Self::Interrupted,
            error => Self::Prompt(error),
        }
    }
}

impl From<StepError> for RunError {
    fn from(error: StepError) -> Self {
        match error {
            StepError::Interrupted => Self::Interrupted,
            error => Self::Step(error),
        }
    }
}

/// Friendly result alias :3
type Result<T, E = RunError> = std::result::Result<T, E>;
