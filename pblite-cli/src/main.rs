//! pblite CLI - Command-line tool for pblite positional JSON arrays
//!
//! This binary provides command-line interfaces for:
//! - decode: pblite array → JSON object keyed by field name
//! - encode: JSON object keyed by field name → pblite array
//! - schema: list the messages and fields of a schema file

use clap::{Parser, Subcommand, ValueEnum};
use pblite_codec::{
    decode_with, encode_with, DecodeOptions, Diagnostic, DynamicMessage, EncodeOptions, Observer,
    SchemaRegistry, Severity, TracingObserver,
};
use pblite_format::{FieldDescriptor, MessageSchema};
use serde_json::Value;
use std::error::Error;
use std::fs;
use std::io::{self, IsTerminal, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "pblite")]
#[command(about = "Decode and encode pblite positional JSON arrays")]
#[command(version)]
struct Cli {
    /// Show debug-level diagnostics (unknown fields carrying data)
    #[arg(long, short = 'v', global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode a pblite array into a JSON object keyed by field name
    ///
    /// Examples:
    ///   pblite decode --schema chat.toml --message chat.User user.json
    ///   curl -s $URL | pblite decode --schema chat.toml --message chat.Event --ignore-first-item
    Decode {
        /// Schema file (.toml or .json)
        #[arg(long)]
        schema: PathBuf,
        /// Fully qualified message type name
        #[arg(long)]
        message: String,
        /// Skip the leading type-tag element of the outer array
        #[arg(long)]
        ignore_first_item: bool,
        /// Exit with an error if any field was ignored
        #[arg(long)]
        strict: bool,
        /// Pretty-print the output
        #[arg(long)]
        pretty: bool,
        /// Input file (stdin when omitted or "-")
        input: Option<PathBuf>,
    },
    /// Encode a JSON object keyed by field name as a pblite array
    Encode {
        /// Schema file (.toml or .json)
        #[arg(long)]
        schema: PathBuf,
        /// Fully qualified message type name
        #[arg(long)]
        message: String,
        /// Move fields numbered above N into a trailing overflow map
        #[arg(long, value_name = "N")]
        overflow_threshold: Option<u32>,
        /// Pretty-print the output
        #[arg(long)]
        pretty: bool,
        /// Input file (stdin when omitted or "-")
        input: Option<PathBuf>,
    },
    /// List message types and their fields
    ///
    /// Examples:
    ///   pblite schema --schema chat.toml
    ///   pblite schema --schema chat.toml --message chat.User --format json
    Schema {
        /// Schema file (.toml or .json)
        #[arg(long)]
        schema: PathBuf,
        /// Only show this message type
        #[arg(long)]
        message: Option<String>,
        /// Output format (table, json)
        #[arg(long, value_enum, default_value_t = SchemaFormat::Table)]
        format: SchemaFormat,
    },
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum SchemaFormat {
    Table,
    Json,
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Decode {
            schema,
            message,
            ignore_first_item,
            strict,
            pretty,
            input,
        } => {
            handle_decode(&schema, &message, ignore_first_item, strict, pretty, input)?;
        }
        Commands::Encode {
            schema,
            message,
            overflow_threshold,
            pretty,
            input,
        } => {
            handle_encode(&schema, &message, overflow_threshold, pretty, input)?;
        }
        Commands::Schema {
            schema,
            message,
            format,
        } => {
            handle_schema(&schema, message.as_deref(), format)?;
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(io::stderr().is_terminal())
        .with_writer(io::stderr)
        .init();
}

fn handle_decode(
    schema: &Path,
    message: &str,
    ignore_first_item: bool,
    strict: bool,
    pretty: bool,
    input: Option<PathBuf>,
) -> Result<(), Box<dyn Error>> {
    let registry = load_registry(schema)?;
    let pblite = read_json(input.as_deref())?;

    let mut target = DynamicMessage::new(registry, message)?;
    let mut observer = CountingObserver::default();
    decode_with(
        &mut target,
        &pblite,
        DecodeOptions { ignore_first_item },
        &mut observer,
    );

    write_json(&target.to_named_json(), pretty)?;

    if strict && observer.warnings > 0 {
        return Err(format!(
            "{} value(s) of {} could not be decoded",
            observer.warnings, message
        )
        .into());
    }
    Ok(())
}

fn handle_encode(
    schema: &Path,
    message: &str,
    overflow_threshold: Option<u32>,
    pretty: bool,
    input: Option<PathBuf>,
) -> Result<(), Box<dyn Error>> {
    let registry = load_registry(schema)?;
    let named = read_json(input.as_deref())?;

    let mut source = DynamicMessage::new(registry, message)?;
    source
        .merge_named_json(&named)
        .map_err(|err| format!("invalid {} input: {}", message, err))?;

    let opts = EncodeOptions { overflow_threshold };
    write_json(&encode_with(&source, &opts), pretty)
}

fn handle_schema(
    schema: &Path,
    message: Option<&str>,
    format: SchemaFormat,
) -> Result<(), Box<dyn Error>> {
    let registry = load_registry(schema)?;
    let schemas: Vec<&Arc<MessageSchema>> = match message {
        Some(name) => vec![registry
            .message(name)
            .ok_or_else(|| format!("unknown message type {:?}", name))?],
        None => registry
            .message_names()
            .into_iter()
            .filter_map(|name| registry.message(name))
            .collect(),
    };

    let stdout = io::stdout();
    let mut writer = stdout.lock();
    match format {
        SchemaFormat::Table => print_schema_table(&mut writer, &schemas)?,
        SchemaFormat::Json => print_schema_json(&mut writer, &schemas)?,
    }
    Ok(())
}

/// Forwards to `tracing` and keeps a warning count for `--strict`.
#[derive(Default)]
struct CountingObserver {
    warnings: usize,
}

impl Observer for CountingObserver {
    fn observe(&mut self, diagnostic: Diagnostic) {
        if diagnostic.severity == Severity::Warning {
            self.warnings += 1;
        }
        TracingObserver.observe(diagnostic);
    }
}

fn load_registry(path: &Path) -> Result<Arc<SchemaRegistry>, Box<dyn Error>> {
    let source = fs::read_to_string(path)
        .map_err(|err| format!("cannot read schema {}: {}", path.display(), err))?;
    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    let registry = if is_json {
        SchemaRegistry::from_json_str(&source)
    } else {
        SchemaRegistry::from_toml_str(&source)
    }
    .map_err(|err| format!("invalid schema {}: {}", path.display(), err))?;
    Ok(Arc::new(registry))
}

fn read_json(input: Option<&Path>) -> Result<Value, Box<dyn Error>> {
    let mut buffer = String::new();
    match input {
        Some(path) if path != Path::new("-") => {
            buffer = fs::read_to_string(path)
                .map_err(|err| format!("cannot read {}: {}", path.display(), err))?;
        }
        _ => {
            io::stdin().read_to_string(&mut buffer)?;
        }
    }
    Ok(serde_json::from_str(&buffer)?)
}

fn write_json(value: &Value, pretty: bool) -> Result<(), Box<dyn Error>> {
    let stdout = io::stdout();
    let mut writer = stdout.lock();
    if pretty {
        serde_json::to_writer_pretty(&mut writer, value)?;
    } else {
        serde_json::to_writer(&mut writer, value)?;
    }
    writeln!(writer)?;
    Ok(())
}

#[derive(Debug, serde::Serialize)]
struct MessageSummary<'a> {
    name: &'a str,
    max_field_number: u32,
    fields: &'a [FieldDescriptor],
}

fn print_schema_table(
    writer: &mut dyn Write,
    schemas: &[&Arc<MessageSchema>],
) -> Result<(), Box<dyn Error>> {
    for (idx, schema) in schemas.iter().enumerate() {
        if idx > 0 {
            writeln!(writer)?;
        }
        writeln!(writer, "{}", schema.name())?;
        writeln!(writer, "Number\tName\tKind\tLabel\tType\tDefault")?;
        for field in schema.fields() {
            writeln!(
                writer,
                "{}\t{}\t{}\t{}\t{}\t{}",
                field.number,
                field.name,
                field.kind.name(),
                if field.is_repeated() { "repeated" } else { "singular" },
                field.type_name.as_deref().unwrap_or("-"),
                field
                    .default
                    .as_ref()
                    .map_or_else(|| "-".to_string(), Value::to_string)
            )?;
        }
    }
    Ok(())
}

fn print_schema_json(
    writer: &mut dyn Write,
    schemas: &[&Arc<MessageSchema>],
) -> Result<(), Box<dyn Error>> {
    let summaries: Vec<MessageSummary<'_>> = schemas
        .iter()
        .map(|schema| MessageSummary {
            name: schema.name(),
            max_field_number: schema.max_field_number(),
            fields: schema.fields(),
        })
        .collect();

    serde_json::to_writer_pretty(&mut *writer, &summaries)?;
    writeln!(writer)?;
    Ok(())
}
