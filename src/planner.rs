use std::path::Path;

use crate::config::BootstrapConfig;
use crate::executor::Step;
use crate::invoke::Invocation;
use crate::paths::{self, BundleLayout};

/// Which branch the installer takes for this run, decided once up front.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallMode {
    /// uv already installed: launch the application directly.
    Launch,
    /// uv missing: provision everything, then launch.
    Bootstrap,
}

#[derive(Debug)]
pub struct InstallPlan {
    pub mode: InstallMode,
    pub steps: Vec<Step>,
}

/// Build the installer plan. The fast path holds the launch step alone; the
/// bootstrap path provisions in a fixed order and ends on the same launch
/// step.
pub fn plan_install(
    layout: &BundleLayout,
    config: &BootstrapConfig,
    uv: &Path,
    uv_installed: bool,
) -> InstallPlan {
    if uv_installed {
        return InstallPlan {
            mode: InstallMode::Launch,
            steps: vec![launch_step(layout, config, uv)],
        };
    }

    let mut steps = Vec::new();

    steps.push(Step::invoke(
        "Install uv from the local bundle",
        Invocation::new("powershell")
            .args(["-ExecutionPolicy", "ByPass", "-File"])
            .arg(format!(r".\{}", config.installer_script))
            .cwd(&layout.assets_dir)
            .env(
                "INSTALLER_DOWNLOAD_URL",
                layout.assets_dir.to_string_lossy(),
            ),
    ));

    steps.push(Step::invoke(
        format!("Install Python {}", config.python_version),
        Invocation::new(uv)
            .args(["python", "install"])
            .arg(&config.python_version)
            .arg("--mirror")
            .arg(paths::file_uri(&layout.project_dir))
            .cwd(&layout.project_dir),
    ));

    steps.push(Step::invoke(
        "Sync project dependencies",
        Invocation::new(uv)
            .arg("sync")
            .arg("--default-index")
            .arg(&config.default_index)
            .cwd(&layout.project_dir),
    ));

    steps.push(Step::gated(
        "Install optional GPU packages",
        &config.extras.prompt,
        Some("Skipping the GPU packages; install a CPU build manually if needed."),
        Invocation::new(uv)
            .args(["pip", "install"])
            .args(config.extras.packages.iter().cloned())
            .arg("--index-url")
            .arg(&config.extras.index_url)
            .cwd(&layout.project_dir),
    ));

    steps.push(Step::invoke(
        "Re-sync project dependencies",
        Invocation::new(uv).arg("sync").cwd(&layout.project_dir),
    ));

    steps.push(launch_step(layout, config, uv));

    InstallPlan {
        mode: InstallMode::Bootstrap,
        steps,
    }
}

fn launch_step(layout: &BundleLayout, config: &BootstrapConfig, uv: &Path) -> Step {
    Step::invoke(
        format!("Launch {}", config.entry),
        Invocation::new(uv)
            .arg("run")
            .arg(&config.entry)
            .cwd(&layout.project_dir),
    )
}

/// Build the uninstaller plan. Steps are independent; the executor runs them
/// best-effort. The fixed executable deletions are dropped when no home
/// directory resolved.
pub fn plan_uninstall(uv: &Path, home: Option<&Path>) -> Vec<Step> {
    let mut steps = vec![
        Step::invoke("Clean the uv cache", Invocation::new(uv).args(["cache", "clean"])),
        Step::remove_reported_dir(
            "Remove the managed Python directory",
            Invocation::new(uv).args(["python", "dir"]),
        ),
        Step::remove_reported_dir(
            "Remove the uv tool directory",
            Invocation::new(uv).args(["tool", "dir"]),
        ),
    ];

    if let Some(home) = home {
        let (uv_exe, uvx_exe) = paths::user_local_bin_exes(home);
        steps.push(Step::remove_file("Remove uv.exe", uv_exe));
        steps.push(Step::remove_file("Remove uvx.exe", uvx_exe));
    }

    steps
}
