mod cli;

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use audioprep_core::{
    chunk_directory_with_progress, plan_directory, split_test_set_with_progress,
    split_train_test_with_progress, standardize_filenames_with_progress, ChunkConfig,
    ProgressReporter, SplitReport, StandardizeConfig, TestSplitConfig, TrainTestSplitConfig,
};
use clap::ArgMatches;
use indicatif::{HumanDuration, ProgressBar, ProgressDrawTarget, ProgressStyle};

use crate::cli::build_cli;

/// Renders library progress notifications as an indicatif bar on stderr.
struct BarReporter {
    bar: ProgressBar,
    unit: &'static str,
}

impl BarReporter {
    fn new(unit: &'static str) -> Self {
        let bar = ProgressBar::new(0);
        bar.set_draw_target(ProgressDrawTarget::stderr());
        Self { bar, unit }
    }
}

impl ProgressReporter for BarReporter {
    fn start(&mut self, total: usize) {
        let style = ProgressStyle::with_template(&format!(
            "{{spinner:.green}} [{{elapsed_precise}}] {{bar:40.cyan/blue}} {{pos}}/{{len}} {} {{msg}}",
            self.unit
        ))
        .unwrap_or_else(|_| ProgressStyle::default_bar());
        self.bar.set_style(style);
        self.bar.set_length(total as u64);
        self.bar.enable_steady_tick(Duration::from_millis(100));
    }

    fn advance(&mut self, item: &Path) {
        let name = item
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.bar.set_message(name);
        self.bar.inc(1);
    }

    fn finish(&mut self) {
        self.bar.finish_and_clear();
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let matches = build_cli().get_matches();
    match matches.subcommand() {
        Some(("split-test", sub)) => split_test(sub),
        Some(("split-train-test", sub)) => split_train_test(sub),
        Some(("standardize", sub)) => standardize(sub),
        Some(("chunk", sub)) => chunk(sub),
        _ => unreachable!("clap requires a subcommand"),
    }
}

fn split_test(matches: &ArgMatches) -> anyhow::Result<()> {
    let raw = path_arg(matches, "raw");
    let test = path_arg(matches, "test");
    let ratio = *matches
        .get_one::<f64>("ratio")
        .expect("defaulted argument");

    let mut config = TestSplitConfig::new(raw, test, ratio)?;
    if let Some(&seed) = matches.get_one::<u64>("seed") {
        config = config.with_seed(seed);
    }

    let report = split_test_set_with_progress(&config, &mut BarReporter::new("classes"))
        .with_context(|| format!("failed to split '{}'", raw.display()))?;
    print_split(&report);
    Ok(())
}

fn split_train_test(matches: &ArgMatches) -> anyhow::Result<()> {
    let raw = path_arg(matches, "raw");
    let train = path_arg(matches, "train");
    let test = path_arg(matches, "test");
    let ratio = *matches
        .get_one::<f64>("ratio")
        .expect("defaulted argument");

    let mut config = TrainTestSplitConfig::new(raw, train, test, ratio)?;
    if let Some(&seed) = matches.get_one::<u64>("seed") {
        config = config.with_seed(seed);
    }

    let report = split_train_test_with_progress(&config, &mut BarReporter::new("classes"))
        .with_context(|| format!("failed to split '{}'", raw.display()))?;
    print_split(&report);
    Ok(())
}

fn standardize(matches: &ArgMatches) -> anyhow::Result<()> {
    let root = path_arg(matches, "root");
    let dry_run = matches.get_flag("dry-run");

    let config = StandardizeConfig::new(root).dry_run(dry_run);
    let report = standardize_filenames_with_progress(&config, &mut BarReporter::new("dirs"))
        .with_context(|| format!("failed to standardize '{}'", root.display()))?;

    let verb = if dry_run { "Would rename" } else { "Renamed" };
    println!(
        "{verb} {} file(s) in {} director(ies).",
        report.renames.len(),
        report.directories
    );
    if dry_run {
        for rename in &report.renames {
            println!("  {} -> {}", rename.from.display(), rename.to.display());
        }
    }
    Ok(())
}

fn chunk(matches: &ArgMatches) -> anyhow::Result<()> {
    let source = path_arg(matches, "source");
    let length = *matches
        .get_one::<Duration>("length")
        .expect("defaulted argument");
    let min_tail = *matches
        .get_one::<Duration>("min-tail")
        .expect("defaulted argument");
    let output_name = matches
        .get_one::<String>("output-name")
        .expect("defaulted argument");

    let config = ChunkConfig::builder(source, length)
        .min_tail(min_tail)
        .output_dir_name(output_name.as_str())
        .build()
        .with_context(|| {
            format!(
                "failed to create configuration for '{}'",
                source.display()
            )
        })?;

    if matches.get_flag("dry-run") {
        let plan = plan_directory(&config)
            .with_context(|| format!("failed to plan chunks for '{}'", source.display()))?;
        let outputs: Vec<_> = plan.files.iter().flat_map(|file| &file.outputs).collect();

        if outputs.is_empty() {
            println!("Dry run: no files would be written.");
        } else {
            println!("Dry run: would write {} file(s):", outputs.len());
            for path in outputs {
                println!("  {}", path.display());
            }
        }
        for failure in &plan.failures {
            eprintln!("  skipped {}: {}", failure.path.display(), failure.message);
        }
        return Ok(());
    }

    let report = chunk_directory_with_progress(&config, &mut BarReporter::new("files"))
        .with_context(|| format!("failed to chunk '{}'", source.display()))?;

    println!(
        "Chunked {} file(s) and copied {} file(s) into {} ({} chunk length).",
        report.chunked,
        report.copied,
        config.output_dir().display(),
        HumanDuration(length)
    );
    if !report.failures.is_empty() {
        eprintln!("{} file(s) could not be processed:", report.failures.len());
        for failure in &report.failures {
            eprintln!("  {}: {}", failure.path.display(), failure.message);
        }
    }
    Ok(())
}

fn path_arg<'a>(matches: &'a ArgMatches, id: &str) -> &'a PathBuf {
    matches.get_one::<PathBuf>(id).expect("required argument")
}

fn print_split(report: &SplitReport) {
    for class in &report.classes {
        println!(
            "{}: {} file(s), {} to train, {} to test, {} left in place",
            class.class, class.original, class.moved_to_train, class.moved_to_test, class.remaining
        );
    }
    println!(
        "Moved {} file(s) across {} class(es).",
        report.total_moved(),
        report.classes.len()
    );
}
