//! `coinbayes`: interactive Bayesian coin-bias calculator.
//!
//! Reads one command per line from stdin. Every error is reported and the
//! shell keeps going; only `quit` or end of input stops it.

mod command;
mod render;
mod shell;

use std::env;
use std::io::{self, BufRead, IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use coinbayes_core::{
    DEFAULT_HALT_EPSILON, HaltCondition, IterationMode, LikelihoodForm, PValueBounds, UpdatePolicy,
};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::command::{COMMAND_HELP, Command};
use crate::shell::{Flow, Shell};

#[derive(Debug)]
struct CliConfig {
    count: Option<usize>,
    policy: UpdatePolicy,
    verbose: bool,
}

/// Flag values collected before the optional policy file is applied.
#[derive(Debug, Default)]
struct PolicyOverrides {
    halt_epsilon: Option<bool>,
    epsilon: Option<f64>,
    bounds: Option<PValueBounds>,
    iteration: Option<IterationMode>,
    likelihood: Option<LikelihoodForm>,
}

fn print_help() {
    let help = "\
coinbayes: sequential Bayesian updating over discrete coin-bias hypotheses

USAGE:
    coinbayes [OPTIONS] < commands.txt

OPTIONS:
    --count <N>                  Configure N hypotheses at startup (2-10)
    --halt <exact|epsilon>       Impossible-data rule (default exact)
    --epsilon <f64>              Threshold for --halt epsilon (default 1e-10)
    --bounds <strict|loose>      p-value range [0.01,0.99] or [0,1] (default strict)
    --iteration <auto|manual>    Posterior becomes next prior automatically (default auto)
    --likelihood <kernel|binomial>  Omit or include C(N,k) (default kernel)
    --policy <PATH>              Load policy defaults from a TOML file
    -v, --verbose                Log at debug level unless RUST_LOG is set
    -h, --help                   Show this help
";
    println!("{help}\n{COMMAND_HELP}");
}

fn next_value<'a>(args: &'a [String], index: &mut usize, flag: &str) -> Result<&'a str, String> {
    *index += 1;
    args.get(*index)
        .map(String::as_str)
        .ok_or_else(|| format!("{flag} requires a value"))
}

fn parse_args(args: &[String]) -> Result<CliConfig, String> {
    let mut count = None;
    let mut policy_path: Option<PathBuf> = None;
    let mut overrides = PolicyOverrides::default();
    let mut verbose = false;

    let mut index = 0;
    while index < args.len() {
        match args[index].as_str() {
            "--count" => {
                let value = next_value(args, &mut index, "--count")?;
                count = Some(
                    value
                        .parse::<usize>()
                        .map_err(|_| format!("invalid --count value: {value}"))?,
                );
            }
            "--halt" => {
                overrides.halt_epsilon = Some(match next_value(args, &mut index, "--halt")? {
                    "exact" => false,
                    "epsilon" => true,
                    other => {
                        return Err(format!("invalid --halt value: {other} (expected exact|epsilon)"));
                    }
                });
            }
            "--epsilon" => {
                let value = next_value(args, &mut index, "--epsilon")?;
                overrides.epsilon = Some(
                    value
                        .parse::<f64>()
                        .map_err(|_| format!("invalid --epsilon value: {value}"))?,
                );
            }
            "--bounds" => {
                overrides.bounds = Some(match next_value(args, &mut index, "--bounds")? {
                    "strict" => PValueBounds::Strict,
                    "loose" => PValueBounds::Loose,
                    other => {
                        return Err(format!("invalid --bounds value: {other} (expected strict|loose)"));
                    }
                });
            }
            "--iteration" => {
                overrides.iteration = Some(match next_value(args, &mut index, "--iteration")? {
                    "auto" | "automatic" => IterationMode::Automatic,
                    "manual" => IterationMode::Manual,
                    other => {
                        return Err(format!(
                            "invalid --iteration value: {other} (expected auto|manual)"
                        ));
                    }
                });
            }
            "--likelihood" => {
                overrides.likelihood = Some(match next_value(args, &mut index, "--likelihood")? {
                    "kernel" => LikelihoodForm::Kernel,
                    "binomial" => LikelihoodForm::Binomial,
                    other => {
                        return Err(format!(
                            "invalid --likelihood value: {other} (expected kernel|binomial)"
                        ));
                    }
                });
            }
            "--policy" => {
                policy_path = Some(PathBuf::from(next_value(args, &mut index, "--policy")?));
            }
            "-v" | "--verbose" => verbose = true,
            "-h" | "--help" => {
                print_help();
                return Err(String::new());
            }
            unknown => return Err(format!("unknown option: {unknown}")),
        }
        index += 1;
    }

    let base = match &policy_path {
        Some(path) => load_policy(path)?,
        None => UpdatePolicy::default(),
    };
    let policy = apply_overrides(base, &overrides);
    policy.validate().map_err(|error| error.to_string())?;

    Ok(CliConfig {
        count,
        policy,
        verbose,
    })
}

fn load_policy(path: &Path) -> Result<UpdatePolicy, String> {
    let raw = std::fs::read_to_string(path)
        .map_err(|error| format!("policy_read_failed path={} error={error}", path.display()))?;
    toml::from_str::<UpdatePolicy>(&raw)
        .map_err(|error| format!("policy_parse_failed path={} error={error}", path.display()))
}

fn apply_overrides(mut policy: UpdatePolicy, overrides: &PolicyOverrides) -> UpdatePolicy {
    let current_epsilon = match policy.halt {
        HaltCondition::Epsilon(threshold) => Some(threshold),
        HaltCondition::ExactZero => None,
    };
    match (overrides.halt_epsilon, overrides.epsilon) {
        (Some(false), _) => policy.halt = HaltCondition::ExactZero,
        (Some(true), epsilon) => {
            policy.halt = HaltCondition::Epsilon(
                epsilon.or(current_epsilon).unwrap_or(DEFAULT_HALT_EPSILON),
            );
        }
        // A bare --epsilon implies the epsilon rule.
        (None, Some(epsilon)) => policy.halt = HaltCondition::Epsilon(epsilon),
        (None, None) => {}
    }
    if let Some(bounds) = overrides.bounds {
        policy.bounds = bounds;
    }
    if let Some(iteration) = overrides.iteration {
        policy.iteration = iteration;
    }
    if let Some(likelihood) = overrides.likelihood {
        policy.likelihood = likelihood;
    }
    policy
}

fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "warn" }));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn run(config: CliConfig) -> io::Result<()> {
    let mut shell = match config.count {
        Some(count) => match Shell::with_session(config.policy, count) {
            Ok(shell) => shell,
            Err(error) => {
                eprintln!("error: {error}");
                Shell::new(config.policy)
            }
        },
        None => Shell::new(config.policy),
    };
    info!(policy = ?config.policy, "shell ready");

    let stdin = io::stdin();
    let interactive = stdin.is_terminal();
    let mut stdout = io::stdout().lock();
    if interactive {
        writeln!(stdout, "coinbayes: type `help` for commands")?;
    }

    let mut lines = stdin.lock().lines();
    loop {
        if interactive {
            write!(stdout, "coinbayes> ")?;
            stdout.flush()?;
        }
        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;
        let command = match Command::parse(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(message) => {
                writeln!(stdout, "error: {message}")?;
                continue;
            }
        };
        debug!(?command, "executing");
        let flow = shell.execute(command);
        write!(stdout, "{}", shell.take_output())?;
        match flow {
            Ok(Flow::Continue) => {}
            Ok(Flow::Quit) => break,
            Err(error) => writeln!(stdout, "error: {error}")?,
        }
    }
    stdout.flush()
}

fn main() -> ExitCode {
    let args: Vec<String> = env::args().skip(1).collect();
    let config = match parse_args(&args) {
        Ok(config) => config,
        Err(error) if error.is_empty() => return ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {error}");
            return ExitCode::from(2);
        }
    };
    init_logging(config.verbose);

    match run(config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: io failure: {error}");
            ExitCode::from(1)
        }
    }
}
