// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Provisioning steps for Arch Linux and its derivatives.
//!
//! [`StepKind`] is the fixed, ordered table of everything bootstrap knows how
//! to do. [`Provisioner`] maps each kind to its effect on a [`System`].
//!
//! # Privileges
//!
//! Bootstrap runs as the invoking user. Work that needs root goes through
//! `sudo`, including appends to root-owned files, which are piped through
//! `sudo tee -a`. User-owned files like `~/.zshrc` are edited directly.
//!
//! # Listing Files
//!
//! Package lists hold one package per line, and are fed to the package
//! manager's standard input as is. Flatpak listings hold two whitespace
//! separated fields per line: `name url` for remotes, `remote ref` for
//! applications. Blank lines are skipped. Anything else is a malformed line,
//! and fails the step before any command for it runs.

use crate::{
    config::ProvisionPaths,
    step::{Describe, Execute, Result, StepError},
    system::{Invocation, System},
};

use std::path::Path;
use tracing::{info, instrument};

/// Flags that keep yay from asking anything.
const YAY_BATCH_FLAGS: [&str; 9] = [
    "--needed",
    "--noconfirm",
    "--norebuild",
    "--cleanmenu=false",
    "--diffmenu=false",
    "--editmenu=false",
    "--removemake",
    "--batchinstall",
    "-",
];

const OH_MY_ZSH_INSTALLER: &str =
    "https://raw.githubusercontent.com/ohmyzsh/ohmyzsh/master/tools/install.sh";

const ZSH_PLUGINS: [(&str, &str); 2] = [
    (
        "zsh-autosuggestions",
        "https://github.com/zsh-users/zsh-autosuggestions",
    ),
    (
        "zsh-syntax-highlighting",
        "https://github.com/zsh-users/zsh-syntax-highlighting.git",
    ),
];

/// Login shell that the shell goodies are built around.
const ZSH: &str = "/bin/zsh";

const DDCUTIL_UDEV_RULE: &str = "/usr/share/ddcutil/data/60-ddcutil-i2c.rules";

/// Every provisioning step bootstrap knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepKind {
    InstallPrerequisites,
    UpdatePacmanMirrors,
    InstallDistroPackages,
    InstallAurPackages,
    AddFlatpakRemotes,
    InstallMinimalFlatpakPackages,
    InstallAllFlatpakPackages,
    InstallOpenTabletDriver,
    InstallDdcutil,
    InstallSdkman,
    SetDefaultShell,
    SetupShell,
}

impl StepKind {
    /// All step kinds in the order they are offered to the operator.
    pub const ALL: [StepKind; 12] = [
        StepKind::InstallPrerequisites,
        StepKind::UpdatePacmanMirrors,
        StepKind::InstallDistroPackages,
        StepKind::InstallAurPackages,
        StepKind::AddFlatpakRemotes,
        StepKind::InstallMinimalFlatpakPackages,
        StepKind::InstallAllFlatpakPackages,
        StepKind::InstallOpenTabletDriver,
        StepKind::InstallDdcutil,
        StepKind::InstallSdkman,
        StepKind::SetDefaultShell,
        StepKind::SetupShell,
    ];
}

impl Describe for StepKind {
    fn describe(&self) -> &str {
        match self {
            Self::InstallPrerequisites => "Install prerequisites for the bootstrap script",
            Self::UpdatePacmanMirrors => "Update pacman mirrors to the fastest ones",
            Self::InstallDistroPackages => "Install packages from the distro repositories",
            Self::InstallAurPackages => "Install packages from the AUR",
            Self::AddFlatpakRemotes => "Add flatpak repositories",
            Self::InstallMinimalFlatpakPackages => "Install only minimal packages from flatpak",
            Self::InstallAllFlatpakPackages => "Install all packages from flatpak",
            Self::InstallOpenTabletDriver => "Setup OpenTabletDriver for graphics tablet support",
            Self::InstallDdcutil => "Setup ddcutil for monitor brightness control",
            Self::InstallSdkman => "Setup sdkman to manage JDK versions",
            Self::SetDefaultShell => "Set zsh as the default shell",
            Self::SetupShell => "Setup zsh goodies",
        }
    }
}

/// Performs provisioning steps on a system.
#[derive(Debug)]
pub struct Provisioner<S>
where
    S: System,
{
    paths: ProvisionPaths,
    system: S,
}

impl<S> Provisioner<S>
where
    S: System,
{
    /// Construct new provisioner.
    pub fn new(paths: ProvisionPaths, system: S) -> Self {
        Self { paths, system }
    }

    /// Give back the system steps were performed on.
    pub fn into_system(self) -> S {
        self.system
    }

    fn pacman_install(&mut self, packages: &[&str]) -> Result<()> {
        self.system.invoke(
            &Invocation::sudo("pacman")
                .args(["-S", "--needed", "--noconfirm"])
                .args(packages),
        )
    }

    fn install_prerequisites(&mut self) -> Result<()> {
        self.pacman_install(&["yay", "flatpak"])
    }

    fn update_pacman_mirrors(&mut self) -> Result<()> {
        self.system
            .invoke(&Invocation::sudo("pacman-mirrors").arg("--fasttrack"))?;
        self.system.invoke(&Invocation::sudo("pacman").arg("-Syy"))
    }

    fn install_distro_packages(&mut self) -> Result<()> {
        self.system.invoke(
            &Invocation::sudo("pacman")
                .args(["-Syu", "--needed", "--noconfirm", "-"])
                .stdin_file(&self.paths.distro_list),
        )
    }

    fn install_aur_packages(&mut self) -> Result<()> {
        self.system.invoke(
            &Invocation::new("yay")
                .arg("-S")
                .args(YAY_BATCH_FLAGS)
                .stdin_file(&self.paths.aur_list),
        )
    }

    fn add_flatpak_remotes(&mut self) -> Result<()> {
        let path = self.paths.flatpak_remotes.clone();
        let content = self.system.read_to_string(&path)?;
        let remotes = parse_pairs(&path, &content)?;
        for (name, url) in remotes {
            self.system.invoke(
                &Invocation::new("flatpak")
                    .args(["remote-add", "--if-not-exists"])
                    .args([name, url]),
            )?;
        }

        Ok(())
    }

    fn install_flatpak_packages(&mut self, path: &Path) -> Result<()> {
        let content = self.system.read_to_string(path)?;
        let pairs = parse_pairs(path, &content)?;
        for (remote, refs) in group_by_remote(pairs) {
            self.system.invoke(
                &Invocation::new("flatpak")
                    .args(["install", "--noninteractive"])
                    .arg(remote)
                    .args(refs),
            )?;
        }

        Ok(())
    }

    fn install_open_tablet_driver(&mut self) -> Result<()> {
        self.system.invoke(
            &Invocation::new("yay").args(["-S", "--needed", "--noconfirm", "opentabletdriver"]),
        )?;
        self.system.invoke(
            &Invocation::new("systemctl").args(["--user", "enable", "--now", "opentabletdriver"]),
        )
    }

    fn install_ddcutil(&mut self) -> Result<()> {
        self.pacman_install(&["ddcutil"])?;
        self.system.invoke(
            &Invocation::sudo("cp").args([DDCUTIL_UDEV_RULE, "/etc/udev/rules.d"]),
        )?;

        // INVARIANT: Group creation succeeds if group already exists.
        self.system
            .invoke(&Invocation::sudo("groupadd").args(["-f", "--system", "i2c"]))?;
        let user = self.system.login_name()?;
        self.system
            .invoke(&Invocation::sudo("usermod").arg(user).args(["-aG", "i2c"]))?;

        self.system.invoke(
            &Invocation::sudo("tee")
                .args(["-a", "/etc/modules-load.d/i2c.conf"])
                .stdin_text("i2c-dev\n"),
        )?;
        info!("please reboot for changes to take effect");

        Ok(())
    }

    fn install_sdkman(&mut self) -> Result<()> {
        self.pacman_install(&["zip"])?;
        self.system
            .invoke(&Invocation::shell("curl -s \"https://get.sdkman.io\" | bash"))
    }

    fn set_default_shell(&mut self) -> Result<()> {
        self.pacman_install(&["zsh"])?;
        self.system
            .invoke(&Invocation::new("chsh").args(["-s", ZSH]))?;
        info!("please logout and login again to apply the changes");

        Ok(())
    }

    fn setup_shell(&mut self) -> Result<()> {
        self.system.invoke(&Invocation::shell(format!(
            "sh -c \"$(curl -fsSL {OH_MY_ZSH_INSTALLER})\" \"\" --unattended"
        )))?;

        for (name, url) in ZSH_PLUGINS {
            // INVARIANT: Do not fail on plugins cloned by an earlier run.
            let target = format!("${{ZSH_CUSTOM:-$HOME/.oh-my-zsh/custom}}/plugins/{name}");
            self.system.invoke(&Invocation::shell(format!(
                "[ -d \"{target}\" ] || git clone {url} \"{target}\""
            )))?;
        }

        let font = self.paths.nerd_font.clone();
        self.system.invoke(
            &Invocation::new("oh-my-posh")
                .args(["font", "install"])
                .arg(font)
                .tolerate_failure(),
        )?;

        let home = self.paths.home.clone();
        let config = self.system.copy_into(&self.paths.shell_config, &home)?;
        let name = config
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.system
            .append(&home.join(".zshrc"), &format!("\nsource \"$HOME/{name}\"\n"))?;

        Ok(())
    }
}

impl<S> Execute<StepKind> for Provisioner<S>
where
    S: System,
{
    #[instrument(skip(self), level = "debug")]
    fn execute(&mut self, kind: &StepKind) -> Result<()> {
        match kind {
            StepKind::InstallPrerequisites => self.install_prerequisites(),
            StepKind::UpdatePacmanMirrors => self.update_pacman_mirrors(),
            StepKind::InstallDistroPackages => self.install_distro_packages(),
            StepKind::InstallAurPackages => self.install_aur_packages(),
            StepKind::AddFlatpakRemotes => self.add_flatpak_remotes(),
            StepKind::InstallMinimalFlatpakPackages => {
                let path = self.paths.flatpak_minimal.clone();
                self.install_flatpak_packages(&path)
            }
            StepKind::InstallAllFlatpakPackages => {
                let path = self.paths.flatpak_full.clone();
                self.install_flatpak_packages(&path)
            }
            StepKind::InstallOpenTabletDriver => self.install_open_tablet_driver(),
            StepKind::InstallDdcutil => self.install_ddcutil(),
            StepKind::InstallSdkman => self.install_sdkman(),
            StepKind::SetDefaultShell => self.set_default_shell(),
            StepKind::SetupShell => self.setup_shell(),
        }
    }
}

/// Parse listing of two whitespace-separated fields per line.
///
/// # Errors
///
/// - Return [`StepError::MalformedLine`] for the first non-blank line that
///   does not hold exactly two fields.
pub fn parse_pairs<'a>(path: &Path, content: &'a str) -> Result<Vec<(&'a str, &'a str)>> {
    let mut pairs = Vec::new();
    for (index, line) in content.lines().enumerate() {
        let fields = line.split_whitespace().collect::<Vec<_>>();
        match fields.as_slice() {
            [] => continue,
            [first, second] => pairs.push((*first, *second)),
            _ => {
                return Err(StepError::MalformedLine {
                    path: path.to_path_buf(),
                    line_number: index + 1,
                    line: line.to_string(),
                })
            }
        }
    }

    Ok(pairs)
}

/// Group refs by remote, keeping remotes in first-seen order.
pub fn group_by_remote<'a>(
    pairs: impl IntoIterator<Item = (&'a str, &'a str)>,
) -> Vec<(&'a str, Vec<&'a str>)> {
    let mut groups: Vec<(&str, Vec<&str>)> = Vec::new();
    for (remote, reference) in pairs {
        match groups.iter_mut().find(|(name, _)| *name == remote) {
            Some((_, refs)) => refs.push(reference),
            None => groups.push((remote, vec![reference])),
        }
    }

    groups
}
