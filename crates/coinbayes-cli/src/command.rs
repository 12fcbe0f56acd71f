//! Shell command grammar.
//!
//! Hypotheses are numbered from 1 on the command line and converted to
//! 0-based indices here.

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    Init(usize),
    PValue { index: usize, value: f64 },
    Prior { index: usize, value: f64 },
    Uniform,
    Sum,
    Normalize,
    Start,
    Update { flips: u32, heads: u32 },
    Advance,
    Show,
    History { json: bool },
    Series(usize),
    Chart,
    Help,
    Quit,
}

pub const COMMAND_HELP: &str = "\
COMMANDS:
    init <COUNT>          Configure COUNT evenly spaced hypotheses (2-10)
    p <I> <VALUE>         Set the p-value of hypothesis I
    prior <I> <VALUE>     Set the prior of hypothesis I (0-1)
    uniform               Reset every prior to 1/COUNT
    sum                   Show the current prior sum
    normalize             Rescale priors to sum to 1
    start                 Start a new session (priors must sum to 1)
    update <N> <K>        Observe K heads in N flips (1 <= N <= 100)
    advance               Copy posteriors into priors
    show                  Show hypotheses and charts
    history [json]        Show the trial history
    series <I>            Show the posterior trajectory of hypothesis I
    chart                 Show posterior trajectories of every hypothesis
    help                  Show this help
    quit                  Leave the shell";

impl Command {
    /// Parse one input line. Blank lines and `#` comments yield `Ok(None)`.
    pub fn parse(line: &str) -> Result<Option<Self>, String> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(None);
        }
        let mut words = line.split_whitespace();
        let Some(name) = words.next() else {
            return Ok(None);
        };
        let args: Vec<&str> = words.collect();

        let command = match name.to_ascii_lowercase().as_str() {
            "init" => {
                let [count] = expect_args::<1>(name, &args)?;
                Self::Init(parse_number(name, "COUNT", count)?)
            }
            "p" | "pvalue" => {
                let [index, value] = expect_args::<2>(name, &args)?;
                Self::PValue {
                    index: parse_index(name, index)?,
                    value: parse_number(name, "VALUE", value)?,
                }
            }
            "prior" => {
                let [index, value] = expect_args::<2>(name, &args)?;
                Self::Prior {
                    index: parse_index(name, index)?,
                    value: parse_number(name, "VALUE", value)?,
                }
            }
            "uniform" => no_args(name, &args, Self::Uniform)?,
            "sum" => no_args(name, &args, Self::Sum)?,
            "normalize" => no_args(name, &args, Self::Normalize)?,
            "start" => no_args(name, &args, Self::Start)?,
            "update" => {
                let [flips, heads] = expect_args::<2>(name, &args)?;
                Self::Update {
                    flips: parse_number(name, "N", flips)?,
                    heads: parse_number(name, "K", heads)?,
                }
            }
            "advance" => no_args(name, &args, Self::Advance)?,
            "show" => no_args(name, &args, Self::Show)?,
            "history" => match args.as_slice() {
                [] => Self::History { json: false },
                ["json"] => Self::History { json: true },
                _ => return Err("usage: history [json]".to_owned()),
            },
            "series" => {
                let [index] = expect_args::<1>(name, &args)?;
                Self::Series(parse_index(name, index)?)
            }
            "chart" => no_args(name, &args, Self::Chart)?,
            "help" | "?" => Self::Help,
            "quit" | "exit" => Self::Quit,
            other => return Err(format!("unknown command `{other}` (try `help`)")),
        };
        Ok(Some(command))
    }
}

fn expect_args<'a, const N: usize>(name: &str, args: &[&'a str]) -> Result<[&'a str; N], String> {
    <[&str; N]>::try_from(args)
        .map_err(|_| format!("`{name}` expects {N} argument(s), got {}", args.len()))
}

fn no_args(name: &str, args: &[&str], command: Command) -> Result<Command, String> {
    if args.is_empty() {
        Ok(command)
    } else {
        Err(format!("`{name}` takes no arguments"))
    }
}

fn parse_number<T: std::str::FromStr>(name: &str, what: &str, raw: &str) -> Result<T, String> {
    raw.parse::<T>()
        .map_err(|_| format!("`{name}`: invalid {what} `{raw}`"))
}

fn parse_index(name: &str, raw: &str) -> Result<usize, String> {
    let number: usize = parse_number(name, "hypothesis number", raw)?;
    number
        .checked_sub(1)
        .ok_or_else(|| format!("`{name}`: hypothesis numbers start at 1"))
}
