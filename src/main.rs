use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};

use lv6::config::{Config, ParseOptions};
use lv6::diagnostics::render_diagnostics;
use lv6::driver::{self, FileResult, SearchPathResolver};
use lv6::span::{LineIndex, Span};

#[derive(Parser)]
#[command(name = "lv6", version, about = "Lustre V6 front-end parser")]
struct Cli {
    /// Config file (defaults to the nearest lv6.toml above the current directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Stop after this many diagnostics per file
    #[arg(long, global = true)]
    max_errors: Option<usize>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    /// Canonical Lustre source
    Pretty,
    /// AST and diagnostics as JSON
    Json,
    /// Rust debug dump of the AST
    Debug,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse files and print their syntax trees
    Parse {
        /// Source files
        #[arg(required = true)]
        files: Vec<PathBuf>,
        #[arg(long, value_enum, default_value = "pretty")]
        format: Format,
        /// Worker threads (defaults to one per core)
        #[arg(short, long)]
        jobs: Option<usize>,
    },
    /// Parse files and report diagnostics only
    Check {
        #[arg(required = true)]
        files: Vec<PathBuf>,
        #[arg(short, long)]
        jobs: Option<usize>,
    },
    /// Print the token stream of a file
    Tokens {
        file: PathBuf,
        /// Also print comments and whitespace
        #[arg(long)]
        trivia: bool,
    },
    /// Locate the files named by a file's include directives
    Includes {
        file: PathBuf,
        /// Extra search directory (repeatable)
        #[arg(short = 'I', long = "include-dir")]
        dirs: Vec<PathBuf>,
    },
}

fn init_tracing() {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_env("LV6_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(true).with_level(true))
        .with(filter)
        .init();
}

fn load_config(cli: &Cli) -> Config {
    let loaded = match &cli.config {
        Some(path) => Config::load(path),
        None => match std::env::current_dir() {
            Ok(dir) => Config::discover(&dir),
            Err(_) => Ok(Config::default()),
        },
    };
    let mut config = loaded.unwrap_or_else(|err| {
        eprintln!("error: {err}");
        std::process::exit(2);
    });
    if let Some(max) = cli.max_errors {
        config.parse.max_errors = max.max(1);
    }
    config
}

fn main() {
    init_tracing();
    let cli = Cli::parse();
    let config = load_config(&cli);

    let code = match &cli.command {
        Commands::Parse { files, format, jobs } => cmd_parse(files, *format, jobs.or(config.jobs), &config.parse),
        Commands::Check { files, jobs } => cmd_check(files, jobs.or(config.jobs), &config.parse),
        Commands::Tokens { file, trivia } => cmd_tokens(file, *trivia),
        Commands::Includes { file, dirs } => {
            let mut search = dirs.clone();
            search.extend(config.include_dirs.iter().cloned());
            cmd_includes(file, search, &config.parse)
        }
    };
    std::process::exit(code);
}

/// Parse all files, report I/O and syntax errors, and hand each successful parse to `on_file`.
/// Returns the process exit code.
fn run_files(
    files: &[PathBuf],
    jobs: Option<usize>,
    options: &ParseOptions,
    mut on_file: impl FnMut(&FileResult),
) -> i32 {
    let jobs = jobs.unwrap_or_else(driver::default_jobs);
    let mut code = 0;
    for result in driver::parse_files(files, options, jobs) {
        match result {
            Ok(file) => {
                if file.result.has_errors() {
                    let name = file.path.display().to_string();
                    render_diagnostics(&file.source, &name, &file.result.diagnostics);
                    code = code.max(1);
                }
                on_file(&file);
            }
            Err(err) => {
                eprintln!("error: {err}");
                code = 2;
            }
        }
    }
    code
}

fn cmd_parse(files: &[PathBuf], format: Format, jobs: Option<usize>, options: &ParseOptions) -> i32 {
    let mut json_out = Vec::new();
    let code = run_files(files, jobs, options, |file| match format {
        Format::Pretty => print!("{}", lv6::pretty::pretty_print(&file.result.ast)),
        Format::Debug => println!("{:#?}", file.result.ast),
        Format::Json => json_out.push(serde_json::json!({
            "path": file.path.display().to_string(),
            "ast": &file.result.ast,
            "diagnostics": &file.result.diagnostics,
        })),
    });
    if matches!(format, Format::Json) {
        match serde_json::to_string_pretty(&json_out) {
            Ok(text) => println!("{text}"),
            Err(err) => {
                eprintln!("error: cannot serialize syntax tree: {err}");
                return 2;
            }
        }
    }
    code
}

fn cmd_check(files: &[PathBuf], jobs: Option<usize>, options: &ParseOptions) -> i32 {
    let mut checked = 0usize;
    let mut failed = 0usize;
    let code = run_files(files, jobs, options, |file| {
        checked += 1;
        if file.result.has_errors() {
            failed += 1;
        }
    });
    eprintln!("checked {checked} file(s), {failed} with errors");
    code
}

fn read_source(file: &Path) -> Result<String, i32> {
    std::fs::read_to_string(file).map_err(|err| {
        eprintln!("error: cannot read {}: {err}", file.display());
        2
    })
}

fn cmd_tokens(file: &Path, trivia: bool) -> i32 {
    let source = match read_source(file) {
        Ok(source) => source,
        Err(code) => return code,
    };
    let lexed = lv6::lexer::lex(&source);
    let index = LineIndex::new(&source);
    let print = |kind: &dyn std::fmt::Debug, span: Span| {
        let pos = index.line_col(span.start);
        println!("{}:{}\t{:?}\t{:?}", pos.line, pos.column, kind, span.slice(&source));
    };
    for (tok, leading) in lexed.tokens.iter().zip(&lexed.leading) {
        if trivia {
            leading.iter().for_each(|t| print(&t.node, t.span));
        }
        print(&tok.node, tok.span);
    }
    if trivia {
        lexed.trailing.iter().for_each(|t| print(&t.node, t.span));
    }
    if lexed.diagnostics.is_empty() {
        0
    } else {
        render_diagnostics(&source, &file.display().to_string(), &lexed.diagnostics);
        1
    }
}

fn cmd_includes(file: &Path, dirs: Vec<PathBuf>, options: &ParseOptions) -> i32 {
    let parsed = match driver::parse_file(file, options) {
        Ok(parsed) => parsed,
        Err(err) => {
            eprintln!("error: {err}");
            return 2;
        }
    };
    let resolver = SearchPathResolver::new(dirs);
    let mut code = 0;
    for (include, resolved) in driver::resolve_includes(&parsed, &resolver) {
        match resolved {
            Ok(path) => println!("{include}\t{}", path.display()),
            Err(err) => {
                eprintln!("error: {err}");
                code = 1;
            }
        }
    }
    code
}
