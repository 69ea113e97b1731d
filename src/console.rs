use std::io::{self, BufRead, Write};

use anyhow::Context;

use crate::invoke::{CommandRunner, Invocation};

/// Switch the console to the UTF-8 code page. Output is discarded and
/// failure is ignored; the console then keeps whatever code page it had.
pub fn set_utf8_code_page(runner: &mut dyn CommandRunner) {
    let _ = runner.capture(&Invocation::new("chcp").arg("65001"));
}

/// Print a question and read a single-line answer from stdin.
pub fn confirm(question: &str) -> anyhow::Result<bool> {
    println!("{question}");
    io::stdout().flush().ok();

    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("reading from stdin")?;
    Ok(is_yes(&line))
}

/// A yes answer is exactly `y`, ignoring case and surrounding whitespace.
pub fn is_yes(answer: &str) -> bool {
    answer.trim().eq_ignore_ascii_case("y")
}

/// Block until the user presses Enter.
pub fn pause(message: &str) {
    println!("{message}");
    let mut line = String::new();
    let _ = io::stdin().lock().read_line(&mut line);
}
