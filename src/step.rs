// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Step abstraction.
//!
//! A __step__ is one unit of provisioning work: something the operator can
//! read a description of, approve or skip, and then have performed against
//! their machine.
//!
//! Steps are split into two halves. The step _kind_ is plain data that knows
//! how to describe itself through [`Describe`]. The _effect_ of a kind lives
//! in an executor that implements [`Execute`] for it. The runner only ever
//! needs both halves as generic parameters, so a step list is just a table of
//! kinds whose effects get looked up by the executor at run time.
//!
//! # Ranking
//!
//! Every step knows its rank (1-based position) and the total number of steps
//! in its sequence. Neither is supplied by the caller. They are derived once
//! through [`Step::sequence`], which keeps ranks contiguous and totals
//! identical for every step in a single run.

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    path::PathBuf,
    process::ExitStatus,
};

/// Describe a step kind to the operator.
pub trait Describe {
    /// Fixed, non-empty, human-readable summary of what the step does.
    fn describe(&self) -> &str;
}

/// Perform the effect of a step kind.
pub trait Execute<K> {
    /// Perform side effects of target step kind against the environment.
    ///
    /// # Errors
    ///
    /// - Return [`StepError`] if the effect fails in any way. Callers are not
    ///   expected to recover from it.
    fn execute(&mut self, kind: &K) -> Result<()>;
}

/// A ranked step in a sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step<K> {
    rank: usize,
    total: usize,
    kind: K,
}

impl<K> Step<K> {
    /// Construct ranked sequence of steps from ordered listing of kinds.
    pub fn sequence(kinds: impl IntoIterator<Item = K>) -> Vec<Step<K>> {
        let kinds = kinds.into_iter().collect::<Vec<_>>();
        let total = kinds.len();

        kinds
            .into_iter()
            .enumerate()
            .map(|(index, kind)| Step {
                rank: index + 1,
                total,
                kind,
            })
            .collect()
    }

    /// Position of step in its sequence, starting at 1.
    pub fn rank(&self) -> usize {
        self.rank
    }

    /// Number of steps in the sequence this step belongs to.
    pub fn total(&self) -> usize {
        self.total
    }

    pub fn kind(&self) -> &K {
        &self.kind
    }
}

impl<K> Step<K>
where
    K: Describe,
{
    pub fn description(&self) -> &str {
        self.kind.describe()
    }

    /// Question to ask the operator before enabling this step.
    pub fn prompt(&self) -> String {
        format!("[{}/{}] {} (y/n)", self.rank, self.total, self.description())
    }

    /// Banner printed right before the step is performed.
    pub fn banner(&self) -> String {
        format!("\n### {} ###\n", self.description())
    }
}

impl<K> Display for Step<K>
where
    K: Describe,
{
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        write!(fmt, "[{}/{}] {}", self.rank, self.total, self.description())
    }
}

/// All possible ways a step can fail.
#[derive(Debug, thiserror::Error)]
pub enum StepError {
    /// External command exited unsuccessfully.
    #[error("command {command:?} failed with {status}")]
    Command {
        command: String,
        status: ExitStatus,
    },

    /// External command could not be started at all.
    #[error("failed to spawn {command:?}")]
    Spawn {
        #[source]
        source: std::io::Error,
        command: String,
    },

    /// External command was killed by the operator's interrupt.
    #[error("interrupted by user")]
    Interrupted,

    /// Declared file cannot be read, written, or copied.
    #[error("failed to access {:?}", path.display())]
    Io {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// Line in a listing file does not have the expected fields.
    #[error("{}:{line_number}: expected two whitespace-separated fields, got {line:?}", path.display())]
    MalformedLine {
        path: PathBuf,
        line_number: usize,
        line: String,
    },

    /// Invoking user cannot be determined.
    #[error("cannot determine login name of invoking user")]
    NoLoginName,
}

/// Friendly result alias :3
pub type Result<T, E = StepError> = std::result::Result<T, E>;
