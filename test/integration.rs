// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

use crate::{paths_fixture, SystemFixture};

use bootstrap::{
    prompt::{LinePrompter, PromptError},
    Describe, Provisioner, RunConfiguration, RunError, Runner, Step, StepError, StepKind,
};

use anyhow::Result;
use pretty_assertions::assert_eq;
use std::io::Cursor;

fn answers(accepted: &[usize]) -> String {
    (1..=StepKind::ALL.len())
        .map(|rank| if accepted.contains(&rank) { "y\n" } else { "n\n" })
        .collect()
}

#[test]
fn every_step_offered_once_in_declared_order() -> Result<()> {
    let mut prompter = LinePrompter::new(Cursor::new(answers(&[])), Vec::new());
    let mut provisioner = Provisioner::new(paths_fixture(), SystemFixture::new());
    let mut out = Vec::new();

    let summary = Runner::default().run(
        Step::sequence(StepKind::ALL),
        &mut prompter,
        &mut provisioner,
        &mut out,
    )?;

    assert!(summary.announced.is_empty());
    assert!(summary.performed.is_empty());
    assert!(out.is_empty());
    assert!(provisioner.into_system().invoked.is_empty());

    let prompts = String::from_utf8(prompter.into_writer())?;
    let expect = StepKind::ALL
        .iter()
        .enumerate()
        .map(|(index, kind)| format!("[{}/12] {} (y/n) ", index + 1, kind.describe()))
        .collect::<String>();
    assert_eq!(prompts, expect);

    Ok(())
}

#[test]
fn accepted_steps_performed_in_order() -> Result<()> {
    let system = SystemFixture::new().with_file(
        "/data/flatpak-repos.txt",
        "flathub https://dl.flathub.org/repo/flathub.flatpakrepo\n",
    );
    let mut prompter = LinePrompter::new(Cursor::new(answers(&[2, 5, 11])), Vec::new());
    let mut provisioner = Provisioner::new(paths_fixture(), system);
    let mut out = Vec::new();

    let summary = Runner::default().run(
        Step::sequence(StepKind::ALL),
        &mut prompter,
        &mut provisioner,
        &mut out,
    )?;

    assert_eq!(summary.performed, vec![2, 5, 11]);
    assert_eq!(
        provisioner.into_system().invoked,
        vec![
            "sudo pacman-mirrors --fasttrack".to_string(),
            "sudo pacman -Syy".to_string(),
            "flatpak remote-add --if-not-exists flathub https://dl.flathub.org/repo/flathub.flatpakrepo"
                .to_string(),
            "sudo pacman -S --needed --noconfirm zsh".to_string(),
            "chsh -s /bin/zsh".to_string(),
        ]
    );

    let banners = String::from_utf8(out)?;
    let expect = [
        StepKind::UpdatePacmanMirrors,
        StepKind::AddFlatpakRemotes,
        StepKind::SetDefaultShell,
    ]
    .iter()
    .map(|kind| format!("\n### {} ###\n\n", kind.describe()))
    .collect::<String>();
    assert_eq!(banners, expect);

    Ok(())
}

#[test]
fn dry_run_announces_everything_and_touches_nothing() -> Result<()> {
    let all = (1..=StepKind::ALL.len()).collect::<Vec<_>>();
    let mut prompter = LinePrompter::new(Cursor::new(answers(&all)), Vec::new());
    let mut provisioner = Provisioner::new(paths_fixture(), SystemFixture::new());
    let mut out = Vec::new();

    let runner = Runner::new(RunConfiguration { dry_run: true });
    let summary = runner.run(
        Step::sequence(StepKind::ALL),
        &mut prompter,
        &mut provisioner,
        &mut out,
    )?;

    assert_eq!(summary.announced, all);
    assert!(summary.performed.is_empty());
    assert_eq!(String::from_utf8(out)?.matches("\n### ").count(), 12);

    let system = provisioner.into_system();
    assert!(system.invoked.is_empty());
    assert!(system.appended.is_empty());

    Ok(())
}

#[test]
fn failing_step_stops_the_run() {
    let system = SystemFixture::new().failing_on("sudo groupadd");
    let mut prompter = LinePrompter::new(Cursor::new(answers(&[1, 9, 10])), Vec::new());
    let mut provisioner = Provisioner::new(paths_fixture(), system);
    let mut out = Vec::new();

    let result = Runner::default().run(
        Step::sequence(StepKind::ALL),
        &mut prompter,
        &mut provisioner,
        &mut out,
    );

    assert!(matches!(
        result,
        Err(RunError::Step(StepError::Command { .. }))
    ));

    let invoked = provisioner.into_system().invoked;
    assert_eq!(invoked.last().map(String::as_str), Some("sudo groupadd -f --system i2c"));
    assert!(!invoked.iter().any(|command| command.contains("zip")));
}

#[test]
fn missing_package_list_stops_the_run() {
    let mut prompter = LinePrompter::new(Cursor::new(answers(&[6, 7])), Vec::new());
    let mut provisioner = Provisioner::new(paths_fixture(), SystemFixture::new());
    let mut out = Vec::new();

    let result = Runner::default().run(
        Step::sequence(StepKind::ALL),
        &mut prompter,
        &mut provisioner,
        &mut out,
    );

    assert!(matches!(result, Err(RunError::Step(StepError::Io { .. }))));
    assert_eq!(String::from_utf8_lossy(&out).matches("###").count(), 2);
}

#[test]
fn closed_input_fails_before_anything_runs() {
    let mut prompter = LinePrompter::new(Cursor::new("y\ny\n"), Vec::new());
    let mut provisioner = Provisioner::new(paths_fixture(), SystemFixture::new());
    let mut out = Vec::new();

    let result = Runner::default().run(
        Step::sequence(StepKind::ALL),
        &mut prompter,
        &mut provisioner,
        &mut out,
    );

    assert!(matches!(result, Err(RunError::Prompt(PromptError::Closed))));
    assert!(provisioner.into_system().invoked.is_empty());
}
