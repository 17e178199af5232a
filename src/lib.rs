// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Personal machine provisioning.
//!
//! Bootstrap walks the operator through a fixed, ordered list of provisioning
//! steps for Arch Linux and its derivatives. Each step is offered once as a
//! yes/no question. The accepted ones are then performed in their declared
//! order, or merely announced under dry run.
//!
//! The crate also ships a small, unrelated utility that copies terminal
//! colors and font from Alacritty into VSCodium, see [`theme`].

pub mod config;
pub mod interrupt;
pub mod path;
pub mod prompt;
pub mod provision;
pub mod runner;
pub mod step;
pub mod system;
pub mod theme;

pub use config::{RunConfiguration, Settings};
pub use provision::{Provisioner, StepKind};
pub use runner::{RunError, RunSummary, Runner};
pub use step::{Describe, Execute, Step, StepError};
