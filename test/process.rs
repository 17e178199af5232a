// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

use anyhow::{bail, Result};
use pretty_assertions::assert_eq;
use sealed_test::prelude::*;
use std::{
    io::{Read, Write},
    process::{Child, Command, Output, Stdio},
};

fn bootstrap(args: &[&str]) -> Result<Child> {
    std::fs::write("config.toml", "data_dir = \".\"\n")?;
    let child = Command::new(env!("CARGO_BIN_EXE_bootstrap"))
        .args(["--config", "config.toml"])
        .args(args)
        .env("RUST_LOG", "info")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::inherit())
        .spawn()?;

    Ok(child)
}

fn answer(args: &[&str], input: &str) -> Result<Output> {
    let mut child = bootstrap(args)?;
    if let Some(mut stdin) = child.stdin.take() {
        stdin.write_all(input.as_bytes())?;
    }

    Ok(child.wait_with_output()?)
}

#[sealed_test(env = [("HOME", "/tmp")])]
fn dry_run_announces_every_step_and_exits_cleanly() -> Result<()> {
    let output = answer(&["-d"], &"y\n".repeat(12))?;
    let stdout = String::from_utf8(output.stdout)?;

    assert_eq!(output.status.code(), Some(0));
    assert_eq!(stdout.matches("\n### ").count(), 12);
    assert!(stdout.contains("[12/12] Setup zsh goodies (y/n)"));

    Ok(())
}

#[sealed_test(env = [("HOME", "/tmp")])]
fn input_closed_early_exits_with_failure() -> Result<()> {
    let output = answer(&["-d"], "y\nn\n")?;
    let stdout = String::from_utf8(output.stdout)?;

    assert_eq!(output.status.code(), Some(1));
    assert!(stdout.contains("[3/12]"));
    assert!(!stdout.contains("###"));

    Ok(())
}

#[sealed_test(env = [("HOME", "/tmp")])]
fn failing_step_exits_with_failure() -> Result<()> {
    // Distro packages are fed from arch.txt, which does not exist here.
    let mut input = "n\nn\ny\n".to_string();
    input.push_str(&"n\n".repeat(9));

    let output = answer(&[], &input)?;
    let stdout = String::from_utf8(output.stdout)?;

    assert_eq!(output.status.code(), Some(1));
    assert_eq!(stdout.matches("\n### ").count(), 1);
    assert!(stdout.contains("### Install packages from the distro repositories ###"));

    Ok(())
}

#[cfg(unix)]
#[sealed_test(env = [("HOME", "/tmp")])]
fn interrupt_at_prompt_is_acknowledged_once() -> Result<()> {
    let mut child = bootstrap(&[])?;
    let mut stdout = child.stdout.take().expect("piped stdout");

    // INVARIANT: Keep stdin open so the first prompt waits for an answer.
    let stdin = child.stdin.take();

    let mut seen = Vec::new();
    let mut buffer = [0u8; 256];
    while !String::from_utf8_lossy(&seen).contains("(y/n)") {
        let read = stdout.read(&mut buffer)?;
        if read == 0 {
            bail!("bootstrap exited before prompting");
        }
        seen.extend_from_slice(&buffer[..read]);
    }

    for _ in 0..2 {
        // Child may already be gone by the second signal.
        let _ = Command::new("kill")
            .args(["-INT", &child.id().to_string()])
            .status()?;
    }

    stdout.read_to_end(&mut seen)?;
    let status = child.wait()?;
    drop(stdin);

    let stdout = String::from_utf8(seen)?;
    assert_eq!(status.code(), Some(0));
    assert_eq!(stdout.matches("Interrupted by user").count(), 1);
    assert!(!stdout.contains("[2/12]"));

    Ok(())
}
