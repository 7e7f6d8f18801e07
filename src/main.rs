// File: src/main.rs
//
// Command-line front end for the VB6 parser.
// Parses argument flags and dispatches to the subcommands: `parse` dumps
// one module (summary, JSON, or statistics), `check` validates many files
// and reports the first hard failure in each.

use clap::{Parser as ClapParser, Subcommand};
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::EnvFilter;

use vb6_parser::ast::{Module, ModuleItem};
use vb6_parser::errors::{ParseError, SourceLocation};
use vb6_parser::module::GroupedModule;
use vb6_parser::visit::ModuleStats;
use vb6_parser::{Parser, ParserOptions};

#[derive(ClapParser)]
#[command(
    name = "vb6-parser",
    about = "Parser front end for Visual Basic 6 modules",
    version = env!("CARGO_PKG_VERSION"),
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log parser activity (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored diagnostics
    #[arg(long, global = true)]
    no_color: bool,
}

#[derive(Subcommand)]
#[command(arg_required_else_help = true)]
enum Commands {
    /// Parse one module and print it
    Parse {
        /// Path to the .bas / .cls / .frm source
        file: PathBuf,

        /// Regroup into attributes, options, declarations and procedures
        #[arg(long)]
        grouped: bool,

        /// Print the AST as JSON
        #[arg(long)]
        json: bool,

        /// Print node counts instead of the module
        #[arg(long)]
        stats: bool,
    },

    /// Parse every file and report the ones that fail
    Check {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_writer(std::io::stderr)
        .init();

    if cli.no_color {
        colored::control::set_override(false);
    }

    match cli.command {
        Commands::Parse { file, grouped, json, stats } => match run_parse(&file, grouped, json, stats) {
            Ok(()) => ExitCode::SUCCESS,
            Err(err) => {
                eprint!("{}", err.render());
                ExitCode::FAILURE
            }
        },
        Commands::Check { files } => run_check(&files),
    }
}

fn read_source(path: &Path) -> Result<String, ParseError> {
    fs::read_to_string(path).map_err(|e| ParseError::io(&path.display().to_string(), &e))
}

fn parse_file(path: &Path, source: &str) -> Result<Module, ParseError> {
    Parser::new(source).with_file(path.display().to_string()).parse_module()
}

fn run_parse(path: &Path, grouped: bool, json: bool, stats: bool) -> Result<(), ParseError> {
    let source = read_source(path)?;
    let module = parse_file(path, &source)?;

    if stats {
        let stats = ModuleStats::collect(&module);
        if json {
            println!("{}", to_json(&stats));
        } else {
            print_stats(&stats);
        }
        return Ok(());
    }

    if grouped {
        let grouped = GroupedModule::from_module(module, &source, &ParserOptions::default())
            .map_err(|e| e.with_file(path.display().to_string()))?;
        if json {
            println!("{}", to_json(&grouped));
        } else {
            print_grouped(&grouped, &source);
        }
    } else if json {
        println!("{}", to_json(&module));
    } else {
        print_flat(&module, &source);
    }
    Ok(())
}

fn run_check(files: &[PathBuf]) -> ExitCode {
    let mut failed = 0;
    for path in files {
        let result = read_source(path).and_then(|source| parse_file(path, &source));
        match result {
            Ok(module) => {
                info!(file = %path.display(), items = module.len(), "parsed");
                println!("{} {} ({} items)", "ok".green().bold(), path.display(), module.len());
            }
            Err(err) => {
                failed += 1;
                println!("{} {}", "FAILED".red().bold(), path.display());
                eprint!("{}", err.render());
            }
        }
    }

    println!();
    println!("{} checked, {} failed", files.len(), failed);
    if failed > 0 {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| format!("{{\"error\": \"{}\"}}", e))
}

fn print_flat(module: &Module, source: &str) {
    for item in &module.items {
        let line = SourceLocation::from_offset(source, item.span().start).line;
        let label = match item {
            ModuleItem::Comment(c) => format!("'{}", c.content),
            ModuleItem::EmptyLine(_) => String::new(),
            ModuleItem::Attribute(a) => format!("{} = {}", a.name, a.value),
            ModuleItem::Option(o) => format!("{:?}", o.option),
            ModuleItem::Declaration(d) => first_line(d.span().slice(source)),
            ModuleItem::Sub(s) => format!("{} ({} statements)", s.head.name, s.body.len()),
            ModuleItem::Function(f) => format!("{} ({} statements)", f.head.name, f.body.len()),
            ModuleItem::Property(p) => format!("{} ({} statements)", p.head.name(), p.body.len()),
        };
        println!("{:>5}  {:<12} {}", line.to_string().bright_blue(), item.kind_name(), label);
    }
}

fn print_grouped(module: &GroupedModule, source: &str) {
    println!("{}", "attributes".bold());
    for attr in &module.attributes {
        println!("  {} = {}", attr.name, attr.value);
    }
    println!("{}", "options".bold());
    for opt in module.option_values() {
        println!("  {:?}", opt);
    }
    println!("{} ({})", "declarations".bold(), module.declaration_items().count());
    println!("{}", "procedures".bold());
    for proc in module.procedure_items() {
        let line = SourceLocation::from_offset(source, proc.span().start).line;
        println!("  {:>5}  {}", line.to_string().bright_blue(), proc.name());
    }
}

fn print_stats(stats: &ModuleStats) {
    println!("attributes:     {}", stats.attributes);
    println!("options:        {}", stats.options);
    println!("declarations:   {}", stats.declarations);
    println!("procedures:     {}", stats.procedures);
    println!("statements:     {}", stats.statements);
    println!("function calls: {}", stats.function_calls);
    println!("comments:       {}", stats.comments);
    println!("max depth:      {}", stats.max_depth);
}

fn first_line(text: &str) -> String {
    text.lines().next().unwrap_or("").trim().to_string()
}
