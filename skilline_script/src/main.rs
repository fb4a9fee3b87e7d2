//! CLI entry point for skilline.
//! Usage: cargo run -p skilline_script -- check project.toml

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use log::info;

use skilline_data::{ValidationResult, Validator};
use skilline_script::complete::{detect_context, suggestions};
use skilline_script::config::{Config, load_config};
use skilline_script::{ParseOutcome, format_project, generate_skill_line, load_project, parse_skill_line_with};

#[derive(Parser)]
#[command(author, version, about = "Parse, format, check and complete skill lines.")]
struct Cli {
    /// Settings file (defaults to ./skilline.toml when present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse one skill line and print its AST.
    Parse(ParseArgs),
    /// Print skill lines in canonical form.
    Fmt {
        #[arg(required = true)]
        lines: Vec<String>,
    },
    /// Validate every mob and metaskill in a project file.
    Check(CheckArgs),
    /// Rewrite a project's skill lines in canonical form.
    FmtProject(FmtProjectArgs),
    /// Suggest completions for a partially typed line.
    Complete(CompleteArgs),
    /// Search the schema catalog.
    Search { query: String },
}

#[derive(Args)]
struct ParseArgs {
    line: String,
    /// Print the full parse outcome as JSON instead of the AST as RON.
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct CheckArgs {
    project: PathBuf,
    /// Fail on warnings as well as errors.
    #[arg(long)]
    deny_warnings: bool,
}

#[derive(Args)]
struct FmtProjectArgs {
    project: PathBuf,
    /// Write the result back instead of printing it.
    #[arg(long)]
    write: bool,
}

#[derive(Args)]
struct CompleteArgs {
    text: String,
    /// Cursor byte offset; defaults to the end of the text.
    #[arg(long)]
    cursor: Option<usize>,
    /// Project file whose metaskills are offered for `skill{s=...}`.
    #[arg(long)]
    project: Option<PathBuf>,
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref());
    match run(cli.command, &config) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::from(2)
        },
    }
}

fn run(command: Commands, config: &Config) -> Result<ExitCode> {
    match command {
        Commands::Parse(args) => run_parse(&args, config),
        Commands::Fmt { lines } => Ok(run_fmt(&lines, config)),
        Commands::Check(args) => run_check(&args, config),
        Commands::FmtProject(args) => run_fmt_project(&args, config),
        Commands::Complete(args) => run_complete(&args, config),
        Commands::Search { query } => run_search(&query, config),
    }
}

fn failure(failed: bool) -> ExitCode {
    if failed { ExitCode::FAILURE } else { ExitCode::SUCCESS }
}

fn report_outcome(outcome: &ParseOutcome) {
    for e in &outcome.errors {
        eprintln!("error: {e}");
    }
    for w in &outcome.warnings {
        eprintln!("warning: {w}");
    }
}

fn run_parse(args: &ParseArgs, config: &Config) -> Result<ExitCode> {
    let outcome = match parse_skill_line_with(&args.line, config.parser_options()) {
        Ok(outcome) => outcome,
        Err(e) => {
            eprintln!("error: {e}");
            return Ok(ExitCode::FAILURE);
        },
    };
    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcome).context("serializing parse outcome")?);
    } else {
        let pretty = ron::ser::PrettyConfig::default();
        println!("{}", ron::ser::to_string_pretty(&outcome.ast, pretty).context("serializing AST")?);
        report_outcome(&outcome);
    }
    Ok(failure(!outcome.is_ok()))
}

fn run_fmt(lines: &[String], config: &Config) -> ExitCode {
    let mut failed = false;
    for line in lines {
        match parse_skill_line_with(line, config.parser_options()) {
            Ok(outcome) if outcome.is_ok() && outcome.warnings.is_empty() => {
                println!("{}", generate_skill_line(&outcome.ast));
            },
            // Canonical text would drop whatever the warnings are about.
            Ok(outcome) if outcome.is_ok() => {
                println!("{line}");
                report_outcome(&outcome);
            },
            Ok(outcome) => {
                eprintln!("{line}");
                report_outcome(&outcome);
                failed = true;
            },
            Err(e) => {
                eprintln!("{line}");
                eprintln!("error: {e}");
                failed = true;
            },
        }
    }
    failure(failed)
}

fn print_result(owner: &str, result: &ValidationResult) {
    for issue in &result.issues {
        println!("{owner}: {issue}");
    }
}

fn run_check(args: &CheckArgs, config: &Config) -> Result<ExitCode> {
    let registry = config.registry()?;
    let loaded = load_project(&args.project, config.parser_options())
        .with_context(|| format!("loading project '{}'", args.project.display()))?;

    for diag in &loaded.diagnostics {
        println!("{diag}");
    }

    let report = Validator::new(&registry).validate_project(&loaded.project);
    for (owner, result) in report.all() {
        print_result(&owner, result);
    }

    let errors = report.error_count();
    let warnings = report.warning_count();
    println!(
        "{}: {errors} error(s), {warnings} warning(s){}",
        args.project.display(),
        if report.can_export() && !loaded.has_parse_errors() { ", ready to export" } else { "" }
    );

    let deny_warnings = args.deny_warnings || config.deny_warnings;
    let failed = loaded.has_parse_errors()
        || !report.can_export()
        || (deny_warnings && (warnings > 0 || loaded.has_parse_warnings()));
    Ok(failure(failed))
}

fn run_fmt_project(args: &FmtProjectArgs, config: &Config) -> Result<ExitCode> {
    let text = fs::read_to_string(&args.project).with_context(|| format!("reading '{}'", args.project.display()))?;
    let (formatted, changed) = format_project(&text, config.parser_options())
        .with_context(|| format!("formatting '{}'", args.project.display()))?;
    if args.write {
        if changed > 0 {
            fs::write(&args.project, &formatted).with_context(|| format!("writing '{}'", args.project.display()))?;
        }
        info!("{changed} skill line(s) rewritten in '{}'", args.project.display());
        eprintln!("{changed} skill line(s) rewritten");
    } else {
        print!("{formatted}");
    }
    Ok(ExitCode::SUCCESS)
}

fn project_metaskills(path: Option<&Path>, config: &Config) -> Result<Vec<skilline_data::MetaskillDef>> {
    let Some(path) = path else { return Ok(Vec::new()) };
    let loaded = load_project(path, config.parser_options())
        .with_context(|| format!("loading project '{}'", path.display()))?;
    Ok(loaded.project.metaskills)
}

fn run_complete(args: &CompleteArgs, config: &Config) -> Result<ExitCode> {
    let registry = config.registry()?;
    let metaskills = project_metaskills(args.project.as_deref(), config)?;
    let ctx = detect_context(&args.text, args.cursor.unwrap_or(args.text.len()));
    for s in suggestions(&registry, &ctx, &metaskills, config.suggestion_limit) {
        let category = s.category.unwrap_or_default();
        let description = s.description.unwrap_or_default();
        println!("{}\t{category}\t{description}", s.text);
    }
    Ok(ExitCode::SUCCESS)
}

fn run_search(query: &str, config: &Config) -> Result<ExitCode> {
    let registry = config.registry()?;
    let hits = registry.search(query);
    for hit in &hits {
        println!(
            "{:<9} {}{} ({}) {}",
            hit.item.kind().to_string(),
            hit.item.kind().prefix(),
            hit.item.name(),
            hit.score,
            hit.item.description()
        );
    }
    Ok(failure(hits.is_empty()))
}
