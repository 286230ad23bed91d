use crate::command::{Component, EntryPoint, ExitCode};
use crate::context::ExecutionContext;
use crate::error::LaunchError;
use tracing::debug;

/// A parsed command-mode invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    token: String,
    args: Vec<String>,
}

impl CommandSpec {
    pub fn new(token: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            token: token.into(),
            args,
        }
    }

    /// The command name as the user typed it.
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Arguments handed to the entry point, in order.
    pub fn args(&self) -> &[String] {
        &self.args
    }
}

/// Fully-qualified names tried for `token`, in the order they are tried.
///
/// The plain name always comes first. An all-lower-case token is retried
/// with its first character upper-cased, so `build` also finds `Build`.
pub fn candidate_names(prefix: &str, token: &str) -> Vec<String> {
    let mut names = vec![format!("{prefix}{token}")];
    if token == token.to_lowercase() {
        let capitalized = format!("{prefix}{}", capitalize(token));
        if capitalized != names[0] {
            names.push(capitalized);
        }
    }
    names
}

fn capitalize(token: &str) -> String {
    let mut chars = token.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Find the entry point `token` names inside `context`.
///
/// A component that exists but has no entry point fails exactly like a
/// missing one, so callers cannot tell the two apart.
pub fn resolve<'a>(
    context: &'a ExecutionContext,
    prefix: &str,
    token: &str,
) -> Result<&'a dyn EntryPoint, LaunchError> {
    let candidates = candidate_names(prefix, token);
    for name in &candidates {
        match context.component(name) {
            Some(Component::Runnable(entry)) => {
                debug!(command = token, component = %name, "resolved command");
                return Ok(entry);
            }
            Some(Component::NotRunnable) => {
                debug!(command = token, component = %name, "component has no entry point");
                return Err(LaunchError::UnknownCommand {
                    name: token.to_string(),
                    attempted: None,
                });
            }
            None => debug!(command = token, component = %name, "no such component"),
        }
    }
    Err(LaunchError::UnknownCommand {
        name: token.to_string(),
        attempted: candidates.into_iter().next(),
    })
}

/// Resolve the command and run it with the forwarded arguments.
///
/// The entry point's own exit code is returned as is; its errors come back
/// as [`LaunchError::Command`] without further wrapping.
pub fn dispatch(
    context: &ExecutionContext,
    prefix: &str,
    spec: &CommandSpec,
) -> Result<ExitCode, LaunchError> {
    let entry = resolve(context, prefix, spec.token())?;
    entry.invoke(spec.args())
}
