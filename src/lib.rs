pub mod cli;
pub mod config;
pub mod console;
pub mod executor;
pub mod invoke;
pub mod paths;
pub mod planner;

/// Run the installer command line interface.
pub fn run_installer() -> anyhow::Result<()> {
    cli::run_install()
}

/// Run the uninstaller command line interface.
pub fn run_uninstaller() -> anyhow::Result<()> {
    cli::run_uninstall()
}
