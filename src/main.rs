// calcparse: recognizer and trace viewer for the calculator language

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use clap::Parser as ClapParser;
use crossterm::{
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};

use calcparse::parser::{recognize_from, Lexer, RecoveryMode};
use calcparse::trace::{TraceLog, TracePrinter};
use calcparse::ui::App;

#[derive(ClapParser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Program to recognize; standard input when absent or `-`
    input: Option<PathBuf>,

    /// Stop at the first lexical or syntax error
    #[arg(long)]
    strict: bool,

    /// Do not print the predict/match trace
    #[arg(short, long)]
    quiet: bool,

    /// Print the token stream and exit
    #[arg(long, conflicts_with = "tui")]
    tokens: bool,

    /// Step through the parse trace in a terminal viewer
    #[arg(long)]
    tui: bool,
}

/// Raw program bytes; the lexer, not the reader, decides what is a bad character.
fn read_source(input: Option<&PathBuf>) -> io::Result<Vec<u8>> {
    match input {
        Some(path) if path.as_os_str() != "-" => fs::read(path),
        _ => {
            let mut source = Vec::new();
            io::stdin().read_to_end(&mut source)?;
            Ok(source)
        }
    }
}

fn byte_lexer(source: &[u8]) -> Lexer<impl Iterator<Item = u8> + '_> {
    Lexer::with_input(source.iter().copied())
}

fn print_tokens(source: &[u8]) -> bool {
    let mut lexer = byte_lexer(source);
    for token in lexer.by_ref() {
        println!("{:>4}:{:<3} {}", token.location.line, token.location.column, token);
    }
    let errors = lexer.take_errors();
    for err in &errors {
        eprintln!("{}", err);
    }
    errors.is_empty()
}

fn run_tui(source: String, trace: TraceLog) -> Result<(), Box<dyn std::error::Error>> {
    // Set up terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(source, trace);
    let res = app.run(&mut terminal);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("Error: {:?}", err);
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    let source = match read_source(args.input.as_ref()) {
        Ok(source) => source,
        Err(err) => {
            let name = args
                .input
                .as_ref()
                .map_or_else(|| "<stdin>".to_string(), |p| p.display().to_string());
            eprintln!("Error: cannot read '{}': {}", name, err);
            std::process::exit(1);
        }
    };

    if args.tokens {
        if !print_tokens(&source) {
            std::process::exit(1);
        }
        return Ok(());
    }

    let mode = if args.strict {
        RecoveryMode::Strict
    } else {
        RecoveryMode::Resilient
    };

    let outcome = if args.tui {
        let (outcome, trace) = recognize_from(byte_lexer(&source), TraceLog::new(), mode);
        eprintln!("Recorded {} trace events.", trace.len());
        run_tui(String::from_utf8_lossy(&source).into_owned(), trace)?;
        outcome
    } else {
        let printer = TracePrinter::stdio(!args.quiet);
        let (outcome, printer) = recognize_from(byte_lexer(&source), printer, mode);
        printer.finish()?;
        outcome
    };

    if outcome.is_accepted() {
        eprintln!("Program accepted.");
        Ok(())
    } else {
        eprintln!(
            "Program rejected: {} lexical error(s), {} syntax error(s).",
            outcome.lexical_errors(),
            outcome.syntax_errors()
        );
        std::process::exit(1);
    }
}
