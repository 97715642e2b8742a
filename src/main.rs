use clap::{Arg, ArgAction, Command};
use lamb::runner;
use lamb::Evaluator;
use std::fs;
use std::path::Path;
use std::process::ExitCode;

fn main() -> ExitCode {
    let matches = Command::new("lamb")
        .about("A tree-rewriting interpreter for a small lambda-calculus language")
        .arg(
            Arg::new("file")
                .help("The program file to run")
                .value_name("FILE")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Log more detail to stderr (-v info, -vv debug, -vvv every pass)")
                .action(ArgAction::Count),
        )
        .arg(
            Arg::new("max-passes")
                .long("max-passes")
                .value_name("N")
                .help("Fail once an expression needs more than N rewriting passes")
                .value_parser(clap::value_parser!(usize)),
        )
        .get_matches();

    let level = match matches.get_count("verbose") {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let mut evaluator = match matches.get_one::<usize>("max-passes") {
        Some(&limit) => Evaluator::with_pass_limit(limit),
        None => Evaluator::new(),
    };

    // `file` is required, so clap has already exited with a usage error if it is missing.
    let file_path = matches
        .get_one::<String>("file")
        .map(String::as_str)
        .unwrap_or_default();
    run_file(file_path, &mut evaluator)
}

fn run_file(path: &str, evaluator: &mut Evaluator) -> ExitCode {
    let path = Path::new(path);

    match fs::read_to_string(path) {
        Ok(source) => {
            let filename = path.display().to_string();
            if runner::run_source(&source, Some(filename.as_str()), evaluator) {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Err(e) => {
            eprintln!("Error reading file '{}': {}", path.display(), e);
            ExitCode::FAILURE
        }
    }
}
