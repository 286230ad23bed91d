use crate::archive::{Archive, ArchiveLocation};
use crate::cli::Invocation;
use crate::command::{ExitCode, LibraryLoader};
use crate::context::ExecutionContext;
use crate::diagnostics::{cat_file, list_files};
use crate::env::{Layout, Settings};
use crate::error::LaunchError;
use crate::manifest::read_manifest;
use crate::materialize::materialize;
use crate::native::NativeLoader;
use crate::resolver::{CommandSpec, dispatch};
use std::io::Write;

/// Runs one invocation against one archive.
///
/// Example
/// ```no_run
/// use ewar::{Invocation, Launcher, Settings, current_archive};
///
/// let location = current_archive().unwrap().clone();
/// let launcher = Launcher::native(location, Settings::new());
/// let args = vec!["build".to_string(), "x".to_string()];
/// let code = launcher.execute(
///     &Invocation::parse(&args),
///     &mut std::io::stdout(),
///     &mut std::io::stderr(),
/// );
/// std::process::exit(code);
/// ```
pub struct Launcher {
    location: ArchiveLocation,
    layout: Layout,
    settings: Settings,
    loader: Box<dyn LibraryLoader>,
}

impl Launcher {
    /// Launcher over the archive at `location`, loading libraries with
    /// `loader`.
    pub fn new(
        location: ArchiveLocation,
        layout: Layout,
        settings: Settings,
        loader: Box<dyn LibraryLoader>,
    ) -> Self {
        Self {
            location,
            layout,
            settings,
            loader,
        }
    }

    /// Launcher for the default layout loading native shared libraries.
    pub fn native(location: ArchiveLocation, settings: Settings) -> Self {
        Self::new(location, Layout::default(), settings, Box::new(NativeLoader))
    }

    /// Carry out `invocation` and return the process exit code.
    ///
    /// Failures are reported on `stderr`. A command's own output does not go
    /// through `stdout`; only the diagnostic commands write there.
    pub fn execute(
        &self,
        invocation: &Invocation,
        stdout: &mut dyn Write,
        stderr: &mut dyn Write,
    ) -> ExitCode {
        let result = match invocation {
            Invocation::Usage(lines) => {
                for line in lines.iter() {
                    let _ = writeln!(stderr, "{line}");
                }
                return 1;
            }
            Invocation::Cat(path) => self.cat(path, stdout).map(|_| 0),
            Invocation::List => self.list(stdout).map(|_| 0),
            Invocation::Run(spec) => self.run(spec),
        };
        result.unwrap_or_else(|err| err.report(stderr))
    }

    /// Copy one metadata-area file to `stdout`.
    pub fn cat(&self, path: &str, stdout: &mut dyn Write) -> Result<(), LaunchError> {
        let mut archive = Archive::open(&self.location)?;
        cat_file(&mut archive, &self.layout, path, stdout)
    }

    /// List the metadata-area files on `stdout`.
    pub fn list(&self, stdout: &mut dyn Write) -> Result<(), LaunchError> {
        let mut archive = Archive::open(&self.location)?;
        list_files(&mut archive, &self.layout, stdout)
    }

    /// Unpack the bundled libraries, build a context over them and run the
    /// command there.
    pub fn run(&self, spec: &CommandSpec) -> Result<ExitCode, LaunchError> {
        let mut archive = Archive::open(&self.location)?;
        let prefix = read_manifest(&mut archive, &self.layout)?.command_prefix(&self.layout);
        let temp_dir = self.settings.temp_dir();
        let libraries = materialize(&mut archive, &self.layout, temp_dir.as_deref())?;
        drop(archive);

        let context = ExecutionContext::build(libraries, self.loader.as_ref())?;
        dispatch(&context, &prefix, spec)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{ArchiveBuilder, Call, TableLoader, TestArchive};

    struct Outcome {
        code: ExitCode,
        stdout: String,
        stderr: String,
    }

    fn launch(archive: &TestArchive, loader: &TableLoader, args: &[&str]) -> Outcome {
        let launcher = Launcher::new(
            archive.location().clone(),
            Layout::default(),
            Settings::from_vars(Vec::<(String, String)>::new()),
            Box::new(loader.clone()),
        );
        let args: Vec<String> = args.iter().map(|a| a.to_string()).collect();
        let mut stdout = Vec::new();
        let mut stderr = Vec::new();
        let code = launcher.execute(&Invocation::parse(&args), &mut stdout, &mut stderr);
        Outcome {
            code,
            stdout: String::from_utf8(stdout).unwrap(),
            stderr: String::from_utf8(stderr).unwrap(),
        }
    }

    fn tools_archive() -> TestArchive {
        ArchiveBuilder::new()
            .file("Main", b"launcher")
            .manifest("Manifest-Version: 1.0\nExecutable-War-Package: tools\n")
            .dir("WEB-INF/")
            .file("WEB-INF/web.xml", b"<web-app/>")
            .file("WEB-INF/README", b"read me\n")
            .dir("WEB-INF/lib/")
            .library("WEB-INF/lib/libA.jar", &["tools.Build", "tools.Broken!", "tools.Fail?", "tools.Exit=4"])
            .build()
    }

    #[test]
    fn test_build_resolves_to_capitalized_component() {
        let archive = tools_archive();
        let loader = TableLoader::default();

        let outcome = launch(&archive, &loader, &["build", "x"]);

        assert_eq!(outcome.code, 0);
        assert_eq!(outcome.stderr, "");
        assert_eq!(loader.record.stdout(), "ok\n");
        assert_eq!(
            loader.record.calls(),
            vec![Call {
                origin: "WEB-INF/lib/libA.jar".to_string(),
                component: "tools.Build".to_string(),
                args: vec!["x".to_string()],
            }]
        );
    }

    #[test]
    fn test_capitalized_unknown_command_fails_without_fallback() {
        let archive = tools_archive();
        let loader = TableLoader::default();

        let outcome = launch(&archive, &loader, &["Deploy"]);

        assert_eq!(outcome.code, 1);
        assert!(outcome.stderr.contains("fatal: unknown command Deploy"));
        assert!(outcome.stderr.contains("(component tools.Deploy not found)"));
        assert!(loader.record.calls().is_empty());
    }

    #[test]
    fn test_component_without_entry_point_reads_as_unknown() {
        let archive = tools_archive();
        let loader = TableLoader::default();

        let outcome = launch(&archive, &loader, &["broken"]);

        assert_eq!(outcome.code, 1);
        assert_eq!(outcome.stderr, "fatal: unknown command broken\n");
    }

    #[test]
    fn test_command_exit_code_becomes_process_exit_code() {
        let archive = tools_archive();
        let loader = TableLoader::default();

        assert_eq!(launch(&archive, &loader, &["exit"]).code, 4);
    }

    #[test]
    fn test_command_failure_is_reported_as_is() {
        let archive = tools_archive();
        let loader = TableLoader::default();

        let outcome = launch(&archive, &loader, &["fail", "a", "b"]);

        assert_eq!(outcome.code, 1);
        assert_eq!(outcome.stderr, "fatal: tools.Fail blew up\n");
        assert_eq!(loader.record.calls()[0].args, vec!["a", "b"]);
    }

    #[test]
    fn test_archive_without_libraries_cannot_run_commands() {
        let archive = ArchiveBuilder::new()
            .manifest("Executable-War-Package: tools\n")
            .file("WEB-INF/README", b"x")
            .build();
        let loader = TableLoader::default();

        let outcome = launch(&archive, &loader, &["build"]);

        assert_eq!(outcome.code, 1);
        assert_eq!(outcome.stderr, "fatal: no files under WEB-INF/lib/\n");
        assert!(loader.loaded.borrow().is_empty());
    }

    #[test]
    fn test_manifest_without_namespace_uses_bare_names() {
        let archive = ArchiveBuilder::new()
            .manifest("Manifest-Version: 1.0\n")
            .library("WEB-INF/lib/libA.jar", &["Build"])
            .build();
        let loader = TableLoader::default();

        let outcome = launch(&archive, &loader, &["build"]);

        assert_eq!(outcome.code, 0);
        assert_eq!(loader.record.calls()[0].component, "Build");
    }

    #[test]
    fn test_missing_manifest_is_fatal() {
        let archive = ArchiveBuilder::new()
            .library("WEB-INF/lib/libA.jar", &["Build"])
            .build();
        let loader = TableLoader::default();

        let outcome = launch(&archive, &loader, &["build"]);

        assert_eq!(outcome.code, 1);
        assert!(outcome.stderr.starts_with("fatal: cannot read META-INF/MANIFEST.MF"));
    }

    #[test]
    fn test_ls_lists_metadata_files() {
        let archive = tools_archive();
        let outcome = launch(&archive, &TableLoader::default(), &["--ls"]);

        assert_eq!(outcome.code, 0);
        assert_eq!(outcome.stdout, "README\n");
    }

    #[test]
    fn test_cat_prints_file() {
        let archive = tools_archive();
        let outcome = launch(&archive, &TableLoader::default(), &["-p", "/README"]);

        assert_eq!(outcome.code, 0);
        assert_eq!(outcome.stdout, "read me\n");
    }

    #[test]
    fn test_cat_missing_file() {
        let archive = tools_archive();
        let outcome = launch(&archive, &TableLoader::default(), &["--cat", "nope"]);

        assert_eq!(outcome.code, 1);
        assert_eq!(outcome.stdout, "");
        assert_eq!(outcome.stderr, "error: no such file nope\n");
    }

    #[test]
    fn test_usage_goes_to_stderr() {
        let archive = tools_archive();
        let outcome = launch(&archive, &TableLoader::default(), &[]);

        assert_eq!(outcome.code, 1);
        assert_eq!(outcome.stdout, "");
        assert_eq!(
            outcome.stderr,
            "usage: CommandName [args...]\nusage: [-p|--cat] <filename>\nusage: [-l|--ls]\n"
        );
    }

    #[test]
    fn test_ls_with_operand_prints_ls_usage() {
        let archive = tools_archive();
        let outcome = launch(&archive, &TableLoader::default(), &["-l", "x"]);

        assert_eq!(outcome.code, 1);
        assert_eq!(outcome.stderr, "usage: [-l|--ls]\n");
    }

    #[test]
    fn test_unpacked_libraries_are_removed_after_run() {
        let archive = tools_archive();
        let dir = tempfile::tempdir().unwrap();
        let launcher = Launcher::new(
            archive.location().clone(),
            Layout::default(),
            Settings::from_vars([(crate::env::TMPDIR_VAR, dir.path().to_string_lossy().to_string())]),
            Box::new(TableLoader::default()),
        );

        let code = launcher
            .run(&CommandSpec::new("build", Vec::new()))
            .unwrap();

        assert_eq!(code, 0);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
