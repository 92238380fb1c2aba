use std::fs;
use std::path::PathBuf;

use clap::error::{ContextKind, ErrorKind};
use clap::{CommandFactory, Parser};

mod suite;

const SPEC_VERSION: &str = "0.28";
const AUTHORS: &str = "the marq developers";

#[derive(Parser)]
#[command(
    name = "marq",
    about = "A markdown parser for CommonMark",
    disable_version_flag = true
)]
struct Cli {
    /// Show the author
    #[arg(long)]
    author: bool,

    /// Show the version
    #[arg(short = 'v', long)]
    version: bool,

    /// Show specification info
    #[arg(short = 's', long)]
    spec: bool,

    /// Parse each expression and print the results
    #[arg(short = 'p', long = "parse", value_name = "EXPR", num_args = 1..)]
    parse: Vec<String>,

    /// Load and parse a file, printing the result
    #[arg(short = 'l', long = "load", value_name = "FILE")]
    load: Option<PathBuf>,

    /// Run the test suite from test.xml
    #[arg(short = 't', long)]
    test: bool,

    /// Expressions to parse
    #[arg(value_name = "EXPR", trailing_var_arg = true)]
    exprs: Vec<String>,
}

fn main() {
    // Bad switches and parse errors report on stderr but the process
    // still exits successfully, as does `--help`.
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            if err.kind() == ErrorKind::UnknownArgument {
                let switch = err
                    .get(ContextKind::InvalidArg)
                    .map(|v| v.to_string())
                    .unwrap_or_default();
                eprintln!("marq: bad switch: {}", switch);
                eprintln!("Use the --help or -h flag for help.");
            } else {
                let _ = err.print();
            }
            return;
        }
    };

    if cli.author {
        show_author();
    } else if cli.version {
        show_version();
    } else if cli.spec {
        show_spec();
    } else if cli.test {
        suite::run("test.xml");
    } else if let Some(path) = cli.load {
        load(&path);
    } else if !cli.parse.is_empty() {
        parse_list(&cli.parse);
    } else if !cli.exprs.is_empty() {
        parse_list(&cli.exprs);
    } else {
        show_help();
    }
}

fn parse_list(exprs: &[String]) {
    let mut parser = marq::Parser::new();

    for expr in exprs {
        let expr = expr.replace("\\n", "\n").replace("\\t", "\t");
        println!("{}", parser.html_of(&expr));
    }
}

fn show_author() {
    println!("marq was written by:");
    println!("  {}", AUTHORS);
}

fn show_version() {
    println!("marq v{}", env!("CARGO_PKG_VERSION"));
}

fn show_spec() {
    println!("CommonMark Spec Version {}", SPEC_VERSION);
    println!("see <http://spec.commonmark.org/>");
}

fn show_help() {
    show_version();
    let _ = Cli::command().print_help();
}

fn load(path: &PathBuf) {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(_) => {
            eprintln!("File Load Problem\nCouldn't open {}.", path.display());
            return;
        }
    };

    let mut parser = marq::Parser::new();
    println!("{}", parser.html_of(&text));
}
