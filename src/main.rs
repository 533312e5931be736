use chrono::Utc;
use clap::{Args, Parser, Subcommand, ValueEnum};
use ddlsim::diagram::{render_mermaid, DetailLevel};
use ddlsim::display::{render_schema, render_tables};
use ddlsim::record::TransformationRecord;
use ddlsim::schema::{Introspection, Schema};
use ddlsim::{simulate_with, Error, Outcome};
use serde::Serialize;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ddlsim", about = "Simulate schema-altering SQL against an in-memory schema")]
struct Cli {
    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Simulate one SQL statement and print the outcome
    Apply(ApplyArgs),
    /// Print the schema as a Mermaid ER diagram
    Diagram(DiagramArgs),
    /// Print the tables, columns and relationships of the schema
    Inspect(SchemaArgs),
}

#[derive(Args)]
struct SchemaArgs {
    /// Schema JSON file
    #[arg(short, long)]
    schema: PathBuf,
    /// The schema file holds raw introspection rows instead of a schema document
    #[arg(long)]
    introspection: bool,
}

#[derive(Args)]
struct ApplyArgs {
    #[command(flatten)]
    schema: SchemaArgs,
    /// SQL statement to simulate (read from stdin when neither --sql nor --file is given)
    #[arg(long, conflicts_with = "file")]
    sql: Option<String>,
    /// File containing the SQL statement
    #[arg(short, long)]
    file: Option<PathBuf>,
    /// Plain-English request the statement was generated from
    #[arg(short, long)]
    prompt: Option<String>,
    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,
    /// Detail level: tables, pk, pk_fk, all
    #[arg(short, long, default_value = "all", value_parser = parse_detail)]
    detail: DetailLevel,
    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Args)]
struct DiagramArgs {
    #[command(flatten)]
    schema: SchemaArgs,
    /// Detail level: tables, pk, pk_fk, all
    #[arg(short, long, default_value = "all", value_parser = parse_detail)]
    detail: DetailLevel,
    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    /// Transformation record and outcome as JSON
    Json,
    /// Regenerated Mermaid diagram
    Mermaid,
    /// Human-readable summary
    Text,
}

#[derive(Serialize)]
struct Report<'a> {
    record: &'a TransformationRecord,
    outcome: &'a Outcome,
}

fn parse_detail(s: &str) -> Result<DetailLevel, String> {
    DetailLevel::from_str(s).ok_or_else(|| format!("invalid detail level: {}", s))
}

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_level(true)
                .compact(),
        )
        .with(filter)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Cmd::Apply(args) => handle_apply(args),
        Cmd::Diagram(args) => handle_diagram(args).map(|_| ExitCode::SUCCESS),
        Cmd::Inspect(args) => handle_inspect(args).map(|_| ExitCode::SUCCESS),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn handle_apply(args: ApplyArgs) -> Result<ExitCode, Error> {
    let schema = load_schema(&args.schema)?;
    let sql = match (args.sql, args.file) {
        (Some(sql), _) => sql,
        (None, Some(path)) => read_file(&path)?,
        (None, None) => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .map_err(|source| Error::Read {
                    path: PathBuf::from("<stdin>"),
                    source,
                })?;
            buf
        }
    };
    if sql.trim().is_empty() {
        return Err(Error::MissingSql);
    }

    let outcome = simulate_with(&schema, &sql, args.detail);
    debug!(applied = outcome.is_applied(), "simulation finished");

    let rendered = match args.format {
        Format::Json => {
            let record = TransformationRecord::new(args.prompt, sql.trim(), &outcome, Utc::now());
            let report = Report {
                record: &record,
                outcome: &outcome,
            };
            let mut json = serde_json::to_string_pretty(&report)?;
            json.push('\n');
            json
        }
        Format::Mermaid => match &outcome {
            Outcome::Applied { diagram, .. } => diagram.clone(),
            Outcome::Rejected { .. } => render_mermaid(&schema, args.detail),
        },
        Format::Text => render_text(&outcome),
    };
    write_output(args.output.as_deref(), &rendered)?;

    if outcome.is_applied() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::from(2))
    }
}

fn handle_diagram(args: DiagramArgs) -> Result<(), Error> {
    let schema = load_schema(&args.schema)?;
    write_output(args.output.as_deref(), &render_mermaid(&schema, args.detail))
}

fn handle_inspect(args: SchemaArgs) -> Result<(), Error> {
    let schema = load_schema(&args)?;
    write_output(None, &render_schema(&schema))
}

fn render_text(outcome: &Outcome) -> String {
    match outcome {
        Outcome::Applied {
            schema,
            description,
            affected_tables,
            ..
        } => {
            let tables = render_tables(schema, affected_tables);
            if tables.is_empty() {
                format!("{}\n", description)
            } else {
                format!("{}\n\n{}", description, tables)
            }
        }
        Outcome::Rejected {
            reason, messages, ..
        } => {
            let mut out = format!("Rejected ({}):\n", reason.as_str());
            for message in messages {
                out.push_str(&format!("  - {}\n", message));
            }
            out
        }
    }
}

fn load_schema(args: &SchemaArgs) -> Result<Schema, Error> {
    let content = read_file(&args.schema)?;
    if args.introspection {
        let payload: Introspection = serde_json::from_str(&content)?;
        Ok(Schema::from_introspection(payload))
    } else {
        Ok(serde_json::from_str(&content)?)
    }
}

fn read_file(path: &Path) -> Result<String, Error> {
    fs::read_to_string(path).map_err(|source| Error::Read {
        path: path.to_path_buf(),
        source,
    })
}

fn write_output(path: Option<&Path>, content: &str) -> Result<(), Error> {
    match path {
        Some(path) => fs::write(path, content).map_err(|source| Error::Write {
            path: path.to_path_buf(),
            source,
        }),
        None => {
            print!("{}", content);
            Ok(())
        }
    }
}
