use automata_convert::prelude::*;

use owo_colors::OwoColorize;
use tracing::{debug, trace};
use tracing_subscriber::{filter, prelude::*};

use clap::{Arg, ArgAction, ArgMatches, Command};

fn cli() -> clap::Command {
    Command::new("convert")
    .about("Converts between automata, regular expressions and grammars, explaining every step")
    .subcommand_required(true)
    .arg(
        Arg::new("verbosity")
        .short('v')
        .long("verbosity")
        .num_args(0..=1)
        .require_equals(true)
        .value_parser(["info", "debug", "trace"])
        .default_missing_value("info")
        .global(true)
    )
    .arg(
        Arg::new("quiet-trace")
        .short('q')
        .long("quiet-trace")
        .action(ArgAction::SetTrue)
        .help("only print the final result")
        .global(true)
    )
    .subcommand(
        Command::new("list")
        .about("lists the built-in examples")
        .arg(Arg::new("kind").help("restrict the listing to one conversion kind"))
    )
    .subcommand(
        Command::new("example")
        .about("runs a built-in example")
        .arg(Arg::new("kind").required(true).help("one of nfa-dfa, dfa-nfa, re-nfa, re-dfa, nfa-re, dfa-re, cfg-pda"))
        .arg(Arg::new("name").required(true).help("name of the example as shown by `list`"))
    )
    .subcommand(
        Command::new("regex")
        .about("converts a regular expression into an NFA or a DFA")
        .arg(
            Arg::new("kind")
            .required(true)
            .value_parser(["re-nfa", "re-dfa"])
        )
        .arg(Arg::new("pattern").required(true))
    )
    .subcommand(
        Command::new("grammar")
        .about("converts a context-free grammar such as `S -> aSb | ε` into a pushdown automaton")
        .arg(Arg::new("rules").required(true).help("rules separated by newlines or `;`"))
    )
}

fn setup_logging(matches: &ArgMatches) {
    let level = match matches
        .try_get_one::<String>("verbosity")
        .ok()
        .flatten()
        .map(|m| m.as_str())
    {
        Some("trace") => filter::LevelFilter::TRACE,
        Some("debug") => filter::LevelFilter::DEBUG,
        Some("info") => filter::LevelFilter::INFO,
        _ => filter::LevelFilter::WARN,
    };

    let stderr_log = tracing_subscriber::fmt::layer()
        .pretty()
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(stderr_log.with_filter(level))
        .init();

    trace!("setup {level} logging");
}

fn kind_argument(matches: &ArgMatches) -> Result<Option<ConversionKind>, String> {
    matches
        .get_one::<String>("kind")
        .map(|kind| kind.parse())
        .transpose()
}

fn print_converted(converted: &Converted, quiet: bool) {
    if !quiet {
        for (i, entry) in converted.trace.iter().enumerate() {
            println!("{} {}", format!("Step {i}:").bold(), entry.label().cyan());
            println!("    {}", entry.explanation());
        }
        println!();
    }
    println!("{}", "Result".green().bold());
    println!("{}", converted.result);
}

fn list(kind: Option<ConversionKind>) -> Result<(), Box<dyn std::error::Error>> {
    let kinds = match kind {
        Some(kind) => vec![kind],
        None => ConversionKind::all().to_vec(),
    };
    for kind in kinds {
        println!("{}", kind.bold());
        for example in catalog::examples(kind)? {
            println!("  {}: {}", example.name.cyan(), example.description);
        }
    }
    Ok(())
}

pub fn main() -> Result<(), Box<dyn std::error::Error>> {
    let matches = cli().get_matches();

    setup_logging(&matches);
    let quiet = matches.get_flag("quiet-trace");

    let conversion = match matches.subcommand() {
        Some(("list", sub_matches)) => return list(kind_argument(sub_matches)?),
        Some(("example", sub_matches)) => {
            let kind = kind_argument(sub_matches)?.ok_or("missing conversion kind")?;
            let name = sub_matches
                .get_one::<String>("name")
                .ok_or("missing example name")?;
            debug!("looking up example {name} for {kind}");
            catalog::find(kind, name)?
                .ok_or_else(|| format!("there is no {kind} example called `{name}`"))?
                .input
        }
        Some(("regex", sub_matches)) => {
            let pattern = sub_matches
                .get_one::<String>("pattern")
                .ok_or("missing pattern")?
                .clone();
            match kind_argument(sub_matches)? {
                Some(ConversionKind::RegexToDfa) => Conversion::RegexToDfa(pattern),
                _ => Conversion::RegexToNfa(pattern),
            }
        }
        Some(("grammar", sub_matches)) => {
            let rules = sub_matches
                .get_one::<String>("rules")
                .ok_or("missing grammar rules")?;
            Conversion::CfgToPda(rules.parse::<Grammar>().map_err(ConversionError::from)?)
        }
        _ => return Err("unknown subcommand".into()),
    };

    let converted = conversion.run()?;
    print_converted(&converted, quiet);
    Ok(())
}
