use ewar::{Invocation, Launcher, Settings, current_archive};
use std::io;
use tracing_subscriber::EnvFilter;

fn main() {
    let settings = Settings::new();
    init_logging(&settings);
    let code = launch(settings);
    std::process::exit(code);
}

fn init_logging(settings: &Settings) {
    let filter =
        EnvFilter::try_new(settings.log_filter()).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

/// Everything the launch owns is dropped before this returns, so unpacked
/// libraries are gone by the time the process exits.
fn launch(settings: Settings) -> i32 {
    let mut stderr = io::stderr();
    let location = match current_archive() {
        Ok(location) => location.clone(),
        Err(err) => return err.report(&mut stderr),
    };

    let args: Vec<String> = std::env::args_os()
        .skip(1)
        .map(|arg| arg.to_string_lossy().into_owned())
        .collect();
    let launcher = Launcher::native(location, settings);
    launcher.execute(&Invocation::parse(&args), &mut io::stdout(), &mut stderr)
}
