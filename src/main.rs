use std::fs::File;
use std::io::{self, BufRead, BufReader, Read, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser as ClapParser;
use clap::Subcommand;
use env_logger::Builder;
use log::{debug, info};

use treelox as lox;

use lox::ast_printer::AstPrinter;
use lox::error::LoxError;
use lox::interpreter::Interpreter;
use lox::parser::Parser;
use lox::resolver::Resolver;
use lox::scanner::{self, Scanner};
use lox::token::Token;

#[derive(ClapParser, Debug)]
#[command(version, about = "Lox language interpreter", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    commands: Commands,

    /// Enable logging to app.log
    #[arg(long, global = true)]
    log: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Tokenizes input from a file, printing each token
    Tokenize { filename: PathBuf },

    /// Parses input from a file and prints the AST of each statement
    Parse { filename: PathBuf },

    /// Runs a program from a file, or starts a REPL when no file is given
    Run { filename: Option<PathBuf> },
}

/// Reads the contents of a file into a Vec<u8>
fn read_file(filename: &PathBuf) -> Result<Vec<u8>> {
    info!("Reading file: {:?}", filename);
    let file = File::open(filename).context(format!("Failed to open file {:?}", filename))?;
    let mut reader = BufReader::new(file);
    let mut buf = Vec::new();

    let bytes = reader
        .read_to_end(&mut buf)
        .context(format!("Failed to read file {:?}", filename))?;

    info!("Read {} bytes from {:?}", bytes, filename);

    Ok(buf)
}

fn init_logger() -> Result<()> {
    let log_file = File::create("app.log").context("Failed to create app.log")?;

    // Write to file with module path and source line, stripping the crate
    // prefix from module paths
    Builder::new()
        .format(|buf, record| {
            let module = record
                .module_path()
                .unwrap_or("<unnamed>")
                .strip_prefix("treelox::")
                .unwrap_or(record.module_path().unwrap_or("<unnamed>"));
            writeln!(
                buf,
                "[{}:{}] - {}",
                module,
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .filter(None, log::LevelFilter::Debug) // Default to Debug, override with RUST_LOG
        .init();

    info!("Logger initialized, writing to app.log");
    Ok(())
}

/// Print every diagnostic to stderr; true if any were reported.
fn report_all(errors: &[LoxError]) -> bool {
    for error in errors {
        eprintln!("{}", error);
    }

    !errors.is_empty()
}

/// Run a complete program: scan, parse, resolve, interpret.  Exits 65 on any
/// static error, 70 on a runtime error.
fn run_program(buf: &[u8]) -> Result<()> {
    let (tokens, lex_errors) = scanner::scan(buf);
    let had_lex_errors = report_all(&lex_errors);

    let mut parser = Parser::new(&tokens);
    let (statements, parse_errors) = parser.parse();
    let had_parse_errors = report_all(&parse_errors);

    if had_lex_errors || had_parse_errors {
        debug!("Static analysis failed, exiting with code 65");
        std::process::exit(65);
    }

    info!("Parsed {} statements", statements.len());

    let mut interpreter = Interpreter::new();

    let resolve_errors = Resolver::new(&mut interpreter).resolve(&statements);
    if report_all(&resolve_errors) {
        debug!("Resolution failed, exiting with code 65");
        std::process::exit(65);
    }

    match interpreter.interpret(&statements) {
        Ok(()) => {
            info!("Program executed successfully");
        }

        Err(e) => {
            debug!("Runtime debug: {}", e);
            eprintln!("{}", e);
            std::process::exit(70);
        }
    }

    Ok(())
}

/// Interactive session.  Bindings, functions, and classes persist across
/// lines; errors are reported and the prompt returns.
///
/// Each line's source and token buffers are leaked so values created from
/// them (closures holding token references) stay valid for the rest of the
/// session.  A REPL lives as long as the process, so the leak is bounded by
/// what the user types.
fn run_repl() -> Result<()> {
    info!("Starting REPL session");

    let mut interpreter: Interpreter<'static> = Interpreter::new();
    let mut next_id: u32 = 0;

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        write!(stdout, "> ")?;
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }

        if line.trim().is_empty() {
            continue;
        }

        let source: &'static [u8] = Box::leak(line.into_bytes().into_boxed_slice());

        let (tokens, lex_errors) = scanner::scan(source);
        if report_all(&lex_errors) {
            continue;
        }

        let tokens: &'static [Token<'static>] = Box::leak(tokens.into_boxed_slice());

        // Occurrence ids continue from the previous line so distances
        // recorded earlier stay keyed correctly.
        let mut parser = Parser::with_base_id(tokens, next_id);
        let (statements, parse_errors) = parser.parse();
        next_id = parser.next_id();

        if report_all(&parse_errors) {
            continue;
        }

        let resolve_errors = Resolver::new(&mut interpreter).resolve(&statements);
        if report_all(&resolve_errors) {
            continue;
        }

        if let Err(e) = interpreter.interpret(&statements) {
            eprintln!("{}", e);
        }
    }

    info!("REPL session ended");

    Ok(())
}

fn main() -> Result<()> {
    // Usage errors exit 64; --help/--version still exit 0.
    let args: Cli = match Cli::try_parse() {
        Ok(args) => args,
        Err(e) if e.use_stderr() => {
            e.print().context("Failed to write usage error")?;
            std::process::exit(64);
        }
        Err(e) => e.exit(),
    };

    // Initialize logger only if --log flag is provided
    if args.log {
        init_logger()?;
    } else {
        // Initialize a minimal logger to avoid "no logger" errors
        env_logger::Builder::new()
            .filter_level(log::LevelFilter::Off)
            .init();
    }

    info!("CLI arguments: {:?}", args);

    match args.commands {
        Commands::Tokenize { filename } => {
            info!("Running Tokenize subcommand");
            let buf = read_file(&filename)?;
            let mut tokenized = true;

            for token in Scanner::new(&buf) {
                match token {
                    Ok(token) => {
                        debug!("Scanned token: {}", token);

                        println!("{}", token);
                    }

                    Err(e) => {
                        tokenized = false;

                        debug!("Tokenization debug: {}", e);

                        eprintln!("{}", e);
                    }
                }
            }

            if !tokenized {
                debug!("Tokenization failed, exiting with code 65");

                std::process::exit(65);
            }

            info!("Tokenization completed successfully");
        }

        Commands::Parse { filename } => {
            info!("Running Parse subcommand");
            let buf = read_file(&filename)?;

            let (tokens, lex_errors) = scanner::scan(&buf);
            let had_lex_errors = report_all(&lex_errors);

            let mut parser = Parser::new(&tokens);
            let (statements, parse_errors) = parser.parse();

            if report_all(&parse_errors) || had_lex_errors {
                std::process::exit(65);
            }

            for statement in &statements {
                println!("{}", AstPrinter::print_stmt(statement));
            }

            info!("Parse subcommand completed");
        }

        Commands::Run { filename } => match filename {
            Some(filename) => {
                info!("Running Run subcommand");
                let buf = read_file(&filename)?;

                run_program(&buf)?;
            }

            None => run_repl()?,
        },
    }

    Ok(())
}
