fn main() {
    if let Err(err) = uvboot::run_installer() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
