mod error;
mod logger;

use clap::{AppSettings, ArgEnum, Args, Parser, Subcommand};
use const_format::{formatcp, str_index};
use error::{CliError, CliResult};
use git_version::git_version;
use qelim::{
    ast::{Formula, Problem},
    parser,
    theories::{fme, Equality, LinearArithmetic, Modular, Preference, Theory},
};
use std::{
    fs::File,
    io::{self, BufRead, IsTerminal},
};

// `git describe --all` will try to find any ref (including tags) that describes the current commit.
// Release tags look like `qelim-0.1.0`, so we exclude them to get the branch name instead.
const GIT_BRANCH_NAME: &str = git_version!(
    args = ["--all", "--exclude", "qelim-*"],
    fallback = "heads/none",
);
const GIT_COMMIT_HASH: &str = git_version!(fallback = "unknown");
const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

const VERSION_STRING: &str = formatcp!(
    "{} [git {} {}]",
    APP_VERSION,
    // By default, `git describe` returns something like "heads/main". We ignore the "heads/" part
    // to get only the branch name
    str_index!(GIT_BRANCH_NAME, 6..),
    GIT_COMMIT_HASH,
);

#[derive(Parser)]
#[clap(
    name = "qelim",
    version = VERSION_STRING,
    setting = AppSettings::DeriveDisplayOrder
)]
struct Cli {
    #[clap(subcommand)]
    command: Command,

    /// Sets the maximum logging level.
    #[clap(arg_enum, global = true, long = "log", default_value_t = LogLevel::Warn)]
    log_level: LogLevel,

    /// Disables output coloring.
    #[clap(global = true, long)]
    no_color: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Parses a problem file and prints it back.
    Parse(ParseCommandOptions),

    /// Eliminates the quantifiers of the conjunction of the assertions in a problem file.
    Eliminate(EliminateCommandOptions),

    /// Simplifies the conjunction of the assertions in a problem file.
    Simplify(EliminateCommandOptions),

    /// Eliminates every quantifier in modular arithmetic by expanding it over all residues.
    Ground(GroundCommandOptions),

    /// Applies one step of Fourier-Motzkin elimination to an existential conjunction.
    Fme(FmeCommandOptions),
}

#[derive(Args)]
struct Input {
    /// The problem file, or `-` to read from stdin.
    problem_file: String,
}

#[derive(Args, Clone, Copy)]
struct ParsingOptions {
    /// Enables `Int`/`Real` subtyping in the parser. This allows terms of sort `Int` to be passed
    /// to arithmetic operators that are expecting a term of sort `Real`.
    #[clap(long)]
    allow_int_real_subtyping: bool,
}

impl From<ParsingOptions> for parser::Config {
    fn from(options: ParsingOptions) -> Self {
        parser::Config::new().allow_int_real_subtyping(options.allow_int_real_subtyping)
    }
}

#[derive(Args, Clone, Copy)]
struct TheoryOptions {
    /// The theory in which quantifiers are eliminated.
    #[clap(arg_enum, short, long, default_value_t = TheoryName::Lra)]
    theory: TheoryName,

    /// The modulus for the `zmod` theory.
    #[clap(short, long)]
    modulus: Option<u64>,

    /// The preferred direction of order relations in the output of the `lra` theory.
    #[clap(arg_enum, long)]
    prefer: Option<PreferenceArg>,

    /// Fail on variables that are bounded from only one side, instead of dropping their bounds.
    #[clap(long)]
    strict_unbounded: bool,
}

#[derive(ArgEnum, Clone, Copy)]
enum TheoryName {
    Lra,
    Eq,
    Zmod,
}

#[derive(ArgEnum, Clone, Copy)]
enum PreferenceArg {
    Lt,
    Gt,
}

impl From<PreferenceArg> for Preference {
    fn from(p: PreferenceArg) -> Self {
        match p {
            PreferenceArg::Lt => Self::Lt,
            PreferenceArg::Gt => Self::Gt,
        }
    }
}

fn build_theory(
    TheoryOptions {
        theory,
        modulus,
        prefer,
        strict_unbounded,
    }: TheoryOptions,
) -> CliResult<Box<dyn Theory>> {
    if modulus.is_some() && !matches!(theory, TheoryName::Zmod) {
        log::warn!("the `--modulus` option is only used by the `zmod` theory");
    }
    if (prefer.is_some() || strict_unbounded) && !matches!(theory, TheoryName::Lra) {
        log::warn!("the `--prefer` and `--strict-unbounded` options are only used by `lra`");
    }
    let theory: Box<dyn Theory> = match theory {
        TheoryName::Lra => {
            let lra = LinearArithmetic::new().remove_unbounded(!strict_unbounded);
            Box::new(match prefer {
                Some(p) => lra.prefer(p.into()),
                None => lra,
            })
        }
        TheoryName::Eq => Box::new(Equality::new()),
        TheoryName::Zmod => {
            let modulus = modulus.ok_or_else(|| {
                CliError::InvalidArgument("the `zmod` theory needs a `--modulus`".to_owned())
            })?;
            Box::new(Modular::new(modulus).map_err(qelim::Error::from)?)
        }
    };
    Ok(theory)
}

#[derive(Args)]
struct ParseCommandOptions {
    #[clap(flatten)]
    input: Input,

    #[clap(flatten)]
    parsing: ParsingOptions,
}

#[derive(Args)]
struct EliminateCommandOptions {
    #[clap(flatten)]
    input: Input,

    #[clap(flatten)]
    parsing: ParsingOptions,

    #[clap(flatten)]
    theory: TheoryOptions,
}

#[derive(Args)]
struct GroundCommandOptions {
    #[clap(flatten)]
    input: Input,

    #[clap(flatten)]
    parsing: ParsingOptions,

    /// The modulus of the arithmetic.
    #[clap(short, long)]
    modulus: u64,
}

#[derive(Args)]
struct FmeCommandOptions {
    #[clap(flatten)]
    input: Input,

    #[clap(flatten)]
    parsing: ParsingOptions,

    /// The existentially quantified variable to eliminate.
    #[clap(long)]
    var: String,

    /// Keep rows mentioning variables that are bounded from only one side. If this flag is
    /// present, an unbounded variable is an error.
    #[clap(long)]
    keep_unbounded: bool,
}

#[derive(ArgEnum, Clone)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Off => Self::Off,
            LogLevel::Error => Self::Error,
            LogLevel::Warn => Self::Warn,
            LogLevel::Info => Self::Info,
            LogLevel::Debug => Self::Debug,
            LogLevel::Trace => Self::Trace,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    let colors_enabled = !cli.no_color && std::io::stderr().is_terminal();
    logger::init(cli.log_level.into(), colors_enabled);

    let result = match cli.command {
        Command::Parse(options) => parse_command(options),
        Command::Eliminate(options) => eliminate_command(options).map(|f| f.to_string()),
        Command::Simplify(options) => simplify_command(options).map(|f| f.to_string()),
        Command::Ground(options) => ground_command(options).map(|f| f.to_string()),
        Command::Fme(options) => fme_command(options).map(|f| f.to_string()),
    };
    match result {
        Ok(output) => println!("{}", output),
        Err(e) => {
            log::error!("{}", e);
            std::process::exit(1);
        }
    }
}

fn get_input(input: &Input) -> CliResult<Box<dyn BufRead>> {
    Ok(match input.problem_file.as_str() {
        "-" => Box::new(io::stdin().lock()),
        path => Box::new(io::BufReader::new(File::open(path)?)),
    })
}

fn get_problem(input: &Input, parsing: ParsingOptions) -> CliResult<Problem> {
    let problem = parser::parse_problem(get_input(input)?, parsing.into())?;
    log::info!(
        "parsed {} assertion(s) from '{}'",
        problem.assertions.len(),
        input.problem_file
    );
    Ok(problem)
}

fn parse_command(options: ParseCommandOptions) -> CliResult<String> {
    let problem = get_problem(&options.input, options.parsing)?;
    Ok(problem.to_string().trim_end().to_owned())
}

fn eliminate_command(options: EliminateCommandOptions) -> CliResult<Formula> {
    let theory = build_theory(options.theory)?;
    let input = get_input(&options.input)?;
    Ok(qelim::eliminate_problem(input, options.parsing.into(), theory.as_ref())?)
}

fn simplify_command(options: EliminateCommandOptions) -> CliResult<Formula> {
    let theory = build_theory(options.theory)?;
    let problem = get_problem(&options.input, options.parsing)?;
    Ok(qelim::simplify(theory.as_ref(), &problem.formula()).map_err(qelim::Error::from)?)
}

fn ground_command(options: GroundCommandOptions) -> CliResult<Formula> {
    let theory = Modular::new(options.modulus).map_err(qelim::Error::from)?;
    let problem = get_problem(&options.input, options.parsing)?;
    Ok(theory.ground(&problem.formula()).map_err(qelim::Error::from)?)
}

fn fme_command(options: FmeCommandOptions) -> CliResult<Formula> {
    let problem = get_problem(&options.input, options.parsing)?;
    let result = fme(&problem.formula(), &options.var, !options.keep_unbounded);
    Ok(result.map_err(qelim::Error::from)?)
}
