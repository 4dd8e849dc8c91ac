mod duration;

use std::path::PathBuf;

use clap::{builder::ValueParser, value_parser, Arg, ArgAction, Command};

pub use duration::parse_duration;

pub const DEFAULT_TEST_RATIO: &str = "0.1";
pub const DEFAULT_TRAIN_RATIO: &str = "0.8";
pub const DEFAULT_CHUNK_LENGTH: &str = "30s";
pub const DEFAULT_MIN_TAIL: &str = "1s";
pub const DEFAULT_OUTPUT_NAME: &str = "chunked";

/// Parse a split ratio in `[0, 1]`.
pub fn parse_ratio(value: &str) -> Result<f64, String> {
    let ratio: f64 = value
        .trim()
        .parse()
        .map_err(|_| format!("invalid ratio '{value}'"))?;
    if !(0.0..=1.0).contains(&ratio) {
        return Err(format!("ratio must be between 0 and 1, got {value}"));
    }
    Ok(ratio)
}

pub fn build_cli() -> Command {
    Command::new(env!("CARGO_PKG_NAME"))
        .author(env!("CARGO_PKG_AUTHORS"))
        .about("Prepare audio classification datasets")
        .version(env!("CARGO_PKG_VERSION"))
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("split-test")
                .about("Move a random share of every class into a test directory")
                .arg(raw_arg())
                .arg(dir_arg("test", "TEST_DIR", "Directory receiving the test files"))
                .arg(ratio_arg(
                    "Fraction of each class moved to the test directory",
                    DEFAULT_TEST_RATIO,
                ))
                .arg(seed_arg()),
        )
        .subcommand(
            Command::new("split-train-test")
                .about("Partition every class into train and test directories")
                .arg(raw_arg())
                .arg(dir_arg("train", "TRAIN_DIR", "Directory receiving the train files"))
                .arg(dir_arg("test", "TEST_DIR", "Directory receiving the test files"))
                .arg(ratio_arg(
                    "Fraction of each class moved to the train directory",
                    DEFAULT_TRAIN_RATIO,
                ))
                .arg(seed_arg()),
        )
        .subcommand(
            Command::new("standardize")
                .about("Rename files in every class directory to <class>_<NNN>.<ext>")
                .arg(
                    Arg::new("root")
                        .value_name("ROOT")
                        .help("Directory containing the class directories")
                        .required(true)
                        .value_parser(value_parser!(PathBuf)),
                )
                .arg(dry_run_arg("Print the renames without performing them")),
        )
        .subcommand(
            Command::new("chunk")
                .about("Cut long WAV recordings into fixed-length chunks")
                .arg(
                    Arg::new("source")
                        .value_name("SOURCE_DIR")
                        .help("Directory containing the .wav files to chunk")
                        .required(true)
                        .value_parser(value_parser!(PathBuf)),
                )
                .arg(
                    Arg::new("length")
                        .short('l')
                        .long("length")
                        .value_name("DURATION")
                        .help("Length of each chunk (e.g. 30s, 1m30s)")
                        .default_value(DEFAULT_CHUNK_LENGTH)
                        .value_parser(ValueParser::new(parse_duration)),
                )
                .arg(
                    Arg::new("min-tail")
                        .long("min-tail")
                        .value_name("DURATION")
                        .help("Drop a final chunk shorter than this")
                        .default_value(DEFAULT_MIN_TAIL)
                        .value_parser(ValueParser::new(parse_duration)),
                )
                .arg(
                    Arg::new("output-name")
                        .short('o')
                        .long("output-name")
                        .value_name("NAME")
                        .help("Name of the output directory created inside SOURCE_DIR")
                        .default_value(DEFAULT_OUTPUT_NAME),
                )
                .arg(dry_run_arg(
                    "Preview the generated chunks without writing files",
                )),
        )
}

fn raw_arg() -> Arg {
    dir_arg(
        "raw",
        "RAW_DIR",
        "Directory containing one sub-directory per class",
    )
}

fn dir_arg(id: &'static str, value_name: &'static str, help: &'static str) -> Arg {
    Arg::new(id)
        .long(id)
        .value_name(value_name)
        .help(help)
        .required(true)
        .value_parser(value_parser!(PathBuf))
}

fn ratio_arg(help: &'static str, default: &'static str) -> Arg {
    Arg::new("ratio")
        .short('r')
        .long("ratio")
        .value_name("RATIO")
        .help(help)
        .default_value(default)
        .value_parser(ValueParser::new(parse_ratio))
}

fn seed_arg() -> Arg {
    Arg::new("seed")
        .long("seed")
        .value_name("SEED")
        .help("Seed the random selection for a reproducible split")
        .value_parser(value_parser!(u64))
}

fn dry_run_arg(help: &'static str) -> Arg {
    Arg::new("dry-run")
        .long("dry-run")
        .help(help)
        .action(ArgAction::SetTrue)
}
