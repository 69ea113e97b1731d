fn main() {
    // Cleanup failures are logged, not reflected in the exit status.
    if let Err(err) = uvboot::run_uninstaller() {
        eprintln!("error: {err:#}");
    }
}
