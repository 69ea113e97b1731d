use anyhow::Context;
use clap::Parser;

use crate::config;
use crate::console;
use crate::executor::{self, Policy};
use crate::invoke::SystemRunner;
use crate::paths::{self, BundleLayout};
use crate::planner::{self, InstallMode};

#[derive(Debug, Parser)]
#[command(
    name = "uvboot",
    version,
    about = "Provision a bundled uv-managed Python application and launch it"
)]
struct InstallCli {}

#[derive(Debug, Parser)]
#[command(
    name = "uvboot-uninstall",
    version,
    about = "Remove everything the bootstrapper installed"
)]
struct UninstallCli {}

/// Installer entry point: probe once, then run the chosen branch under a
/// fail-fast policy. Any error propagates to the binary, which exits with
/// status 1.
pub fn run_install() -> anyhow::Result<()> {
    let _cli = InstallCli::parse();
    let mut runner = SystemRunner;
    console::set_utf8_code_page(&mut runner);

    let root = std::env::current_dir().context("resolving the bundle root")?;
    let config = config::load_config(&root)?;
    let layout = BundleLayout::at(root, &config);

    let username = paths::resolve_username();
    let probe = username.as_deref().map(paths::uv_probe_path);
    let uv_installed = probe.as_ref().map(|path| path.exists()).unwrap_or(false);
    let uv = paths::uv_program(username.as_deref());

    let plan = planner::plan_install(&layout, &config, &uv, uv_installed);
    match plan.mode {
        InstallMode::Launch => {
            // uv_installed implies the probe path resolved.
            if let Some(probe) = &probe {
                println!(
                    "uv already installed at {}; launching {} directly",
                    probe.display(),
                    config.entry
                );
            }
        }
        InstallMode::Bootstrap => {
            println!(
                "uv not found; running the full bootstrap ({} steps)",
                plan.steps.len()
            );
        }
    }

    executor::execute_plan(&plan.steps, Policy::FailFast, &mut runner, &mut console::confirm)?;

    console::pause("Press Enter to exit.");
    Ok(())
}

/// Uninstaller entry point: best-effort cleanup. Failures are logged per
/// step and summarized; the exit status stays 0.
pub fn run_uninstall() -> anyhow::Result<()> {
    let _cli = UninstallCli::parse();
    let mut runner = SystemRunner;

    let home = match paths::home_dir() {
        Ok(home) => Some(home),
        Err(err) => {
            eprintln!("warning: {err:#}; skipping the user-local binary cleanup");
            None
        }
    };

    let username = paths::resolve_username();
    let uv = paths::uv_program(username.as_deref());

    let steps = planner::plan_uninstall(&uv, home.as_deref());
    let report = executor::execute_plan(&steps, Policy::BestEffort, &mut runner, &mut console::confirm)?;

    if report.failures.is_empty() {
        println!("Cleanup finished.");
    } else {
        println!(
            "Cleanup finished with {} failed step(s).",
            report.failures.len()
        );
    }

    console::pause("Press Enter to exit.");
    Ok(())
}
