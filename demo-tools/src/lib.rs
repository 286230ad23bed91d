//! Example bundled library.
//!
//! Built as a shared object and placed under `WEB-INF/lib/` in an archive
//! whose manifest sets `Executable-War-Package: tools`, it makes
//! `ewar build ...`, `ewar echo ...` and `ewar exit <code>` available.

use std::io::Write;

fn build(args: Vec<String>) -> i32 {
    let mut stdout = std::io::stdout().lock();
    if writeln!(stdout, "ok").is_err() {
        return 1;
    }
    for arg in &args {
        if writeln!(stdout, "  {arg}").is_err() {
            return 1;
        }
    }
    0
}

fn echo(args: Vec<String>) -> i32 {
    println!("{}", args.join(" "));
    0
}

/// Ends the process directly with the given status, 0 by default.
fn exit(args: Vec<String>) -> i32 {
    let code = args.first().and_then(|a| a.parse().ok()).unwrap_or(0);
    std::process::exit(code)
}

ewar::export_commands! {
    "tools.Build" => build,
    "tools.Echo" => echo,
    "tools.Exit" => exit,
}
