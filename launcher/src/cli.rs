use crate::resolver::CommandSpec;
use argh::FromArgs;

pub const RUN_USAGE: &str = "usage: CommandName [args...]";
pub const CAT_USAGE: &str = "usage: [-p|--cat] <filename>";
pub const LS_USAGE: &str = "usage: [-l|--ls]";

const ALL_USAGE: &[&str] = &[RUN_USAGE, CAT_USAGE, LS_USAGE];

#[derive(FromArgs)]
/// Print a file from the archive's metadata area to standard output.
struct CatArgs {
    #[argh(positional)]
    /// path of the file, relative to the metadata root.
    path: String,
}

#[derive(FromArgs)]
/// List the files in the archive's metadata area.
struct LsArgs {}

/// What the launcher was asked to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    /// `-p|--cat <path>`
    Cat(String),
    /// `-l|--ls`
    List,
    /// `<command> [args...]`
    Run(CommandSpec),
    /// Nothing usable; print these lines to the error stream.
    Usage(&'static [&'static str]),
}

impl Invocation {
    /// Interpret the process arguments, program name excluded.
    pub fn parse(args: &[String]) -> Self {
        let Some((action, rest)) = args.split_first() else {
            return Self::Usage(ALL_USAGE);
        };
        let rest: Vec<&str> = rest.iter().map(String::as_str).collect();

        match action.as_str() {
            "-p" | "--cat" => {
                // Everything after the flag is an operand, even `--help`.
                let operands: Vec<&str> = std::iter::once("--").chain(rest).collect();
                match CatArgs::from_args(&[action.as_str()], &operands) {
                    Ok(cat) => Self::Cat(cat.path),
                    Err(_) => Self::Usage(&[CAT_USAGE]),
                }
            }
            "-l" | "--ls" => match LsArgs::from_args(&[action.as_str()], &rest) {
                Ok(LsArgs {}) => Self::List,
                Err(_) => Self::Usage(&[LS_USAGE]),
            },
            command if !command.starts_with('-') => Self::Run(CommandSpec::new(
                command,
                rest.into_iter().map(str::to_string).collect(),
            )),
            _ => Self::Usage(ALL_USAGE),
        }
    }
}
