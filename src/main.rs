use clap::{Parser as ClapParser, Subcommand};
use simple_lang::cli::{self, CheckOptions, CheckResult, CliError, Mode};
use std::io;

#[derive(ClapParser)]
#[command(name = "simple")]
#[command(about = "Simple - an expression and predicate language for message routing")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate an expression and print the value as JSON
    Eval {
        /// The expression, e.g. 'Hello ${body}'
        expression: String,

        /// JSON message (reads from stdin if not provided)
        #[arg(short, long)]
        input: Option<String>,

        /// Pretty-print the output
        #[arg(short, long)]
        pretty: bool,
    },

    /// Evaluate a predicate and print true or false
    Test {
        /// The predicate, e.g. "${header.foo} == 'abc'"
        predicate: String,

        /// JSON message (reads from stdin if not provided)
        #[arg(short, long)]
        input: Option<String>,
    },

    /// Only validate syntax, don't evaluate
    Check {
        /// The expression or predicate text
        text: String,

        /// Parse the text as a predicate instead of an expression
        #[arg(long)]
        predicate: bool,
    },

    /// Show the language reference, or one category of it
    Docs {
        /// Category name (run 'simple docs' to list categories)
        category: Option<String>,
    },
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Eval {
            expression,
            input,
            pretty,
        } => stdin_input(input).and_then(|input| {
            run(
                CheckOptions {
                    text: expression,
                    mode: Mode::Expression,
                    input,
                    syntax_only: false,
                },
                pretty,
            )
        }),
        Commands::Test { predicate, input } => stdin_input(input).and_then(|input| {
            run(
                CheckOptions {
                    text: predicate,
                    mode: Mode::Predicate,
                    input,
                    syntax_only: false,
                },
                false,
            )
        }),
        Commands::Check { text, predicate } => run(
            CheckOptions {
                text,
                mode: if predicate { Mode::Predicate } else { Mode::Expression },
                input: None,
                syntax_only: true,
            },
            false,
        ),
        Commands::Docs { category: None } => {
            print!("{}", cli::get_docs_overview());
            Ok(())
        }
        Commands::Docs {
            category: Some(category),
        } => cli::get_doc_category(&category).map(|content| print!("{}", content)),
    };

    if let Err(e) = result {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

/// The `--input` value, or stdin when it is piped.
fn stdin_input(input: Option<String>) -> Result<Option<String>, CliError> {
    let piped = !atty::is(atty::Stream::Stdin);
    cli::read_input(input, piped.then(io::stdin))
}

fn run(options: CheckOptions, pretty: bool) -> Result<(), CliError> {
    match cli::execute_check(&options)? {
        CheckResult::SyntaxValid => println!("Syntax is valid"),
        CheckResult::Matches(matches) => println!("{}", matches),
        CheckResult::Value(output) => {
            let json = if pretty {
                serde_json::to_string_pretty(&output)
            } else {
                serde_json::to_string(&output)
            }?;
            println!("{}", json);
        }
    }
    Ok(())
}
