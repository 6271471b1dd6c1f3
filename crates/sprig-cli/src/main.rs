//! `sprig` - check config files and XML fragments from the command line.
//!
//! Usage:
//!   sprig config `<FILES|GLOBS>`... [--policy `<PATH>`] [--max-errors `<N>`]
//!   sprig xml `<CONSTRUCT>` `<TEXT>`
//!
//! Both commands print the diagnostics, the delivered content and the
//! result of each parse. The exit status is non-zero unless every parse was
//! AllValid or SomeValid.

mod console;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use sprig_config::{ConfigParser, Policy, expand_file_patterns};
use sprig_syntax::ParseResult;
use sprig_xml::XmlParser;

use console::{ConsoleSink, EventLog};

#[derive(Parser)]
#[command(name = "sprig", version, about = "Check config files and XML fragments")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse config files
    Config {
        /// Files or glob patterns
        #[arg(required = true)]
        files: Vec<String>,
        /// Policy file (default: ~/.config/sprig/policy.toml when present)
        #[arg(long)]
        policy: Option<PathBuf>,
        /// Override the policy's error budget
        #[arg(long)]
        max_errors: Option<usize>,
    },
    /// Parse one XML construct
    Xml {
        #[arg(value_enum)]
        construct: Construct,
        text: String,
    },
}

/// XML constructs with a grammar of their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Construct {
    Name,
    Reference,
    Comment,
    AttributeValue,
    Attribute,
    EntityValue,
    PeReference,
    EnumeratedType,
    PublicId,
    ExternalId,
    Encoding,
    XmlDeclaration,
    AttListDecl,
}

fn main() -> Result<ExitCode> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let cli = Cli::parse();
    let all_good = match cli.command {
        Commands::Config {
            files,
            policy,
            max_errors,
        } => run_config(&files, policy, max_errors)?,
        Commands::Xml { construct, text } => run_xml(construct, &text),
    };

    Ok(if all_good {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Load the policy named on the command line, else the user's policy file,
/// else the defaults.
fn load_policy(path: Option<PathBuf>, max_errors: Option<usize>) -> Result<Policy> {
    let mut policy = match path {
        Some(path) => Policy::load_from_path(&path)?
            .with_context(|| format!("No policy file at {}", path.display()))?,
        None => {
            let path = Policy::policy_path();
            log::debug!("Looking for a policy at {}", path.display());
            Policy::load_from_path(&path)?.unwrap_or_default()
        }
    };
    if let Some(max_errors) = max_errors {
        policy.max_errors = max_errors;
    }
    Ok(policy)
}

fn run_config(patterns: &[String], policy: Option<PathBuf>, max_errors: Option<usize>) -> Result<bool> {
    let parser = ConfigParser::new(load_policy(policy, max_errors)?)?;
    let mut all_good = true;

    for path in expand_file_patterns(patterns) {
        let label = path.display().to_string();
        let mut sink = ConsoleSink::new(label.as_str());
        let mut log = EventLog::default();
        let result = parser.parse_file(&path, &mut log, &mut sink);

        report(&label, &sink, &log, result);
        all_good &= result.is_good();
    }
    Ok(all_good)
}

fn run_xml(construct: Construct, text: &str) -> bool {
    let parser = XmlParser::new();
    let mut sink = ConsoleSink::new("<input>");
    let mut log = EventLog::default();
    let result = parse_construct(&parser, construct, text.as_bytes(), &mut log, &mut sink);

    report("<input>", &sink, &log, result);
    result.is_good()
}

fn parse_construct(
    parser: &XmlParser,
    construct: Construct,
    input: &[u8],
    log: &mut EventLog,
    sink: &mut ConsoleSink,
) -> ParseResult {
    match construct {
        Construct::Name => parser.parse_name(input, log, sink),
        Construct::Reference => parser.parse_reference(input, log, sink),
        Construct::Comment => parser.parse_comment(input, log, sink),
        Construct::AttributeValue => parser.parse_attribute_value(input, log, sink),
        Construct::Attribute => parser.parse_attribute(input, log, sink),
        Construct::EntityValue => parser.parse_entity_value(input, log, sink),
        Construct::PeReference => parser.parse_pe_reference(input, log, sink),
        Construct::EnumeratedType => parser.parse_enumerated_type(input, log, sink),
        Construct::PublicId => parser.parse_public_id(input, log, sink),
        Construct::ExternalId => parser.parse_external_id(input, log, sink),
        Construct::Encoding => parser.parse_encoding_decl(input, log, sink),
        Construct::XmlDeclaration => parser.parse_xml_declaration(input, log, sink),
        Construct::AttListDecl => parser.parse_att_list_decl(input, log, sink),
    }
}

fn report(label: &str, sink: &ConsoleSink, log: &EventLog, result: ParseResult) {
    for message in &sink.messages {
        eprintln!("{message}");
    }
    for event in &log.events {
        println!("{event}");
    }
    println!("{label}: {result}");
}
