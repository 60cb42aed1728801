//! Medtable CLI - query medication CSV exports
//!
//! # Main Commands
//!
//! ```bash
//! medtable query data/medications.csv --query aspirin --sort name
//! medtable query https://example.org/ema.csv --preset ema --filter status=*
//! medtable group data/kmt.csv --preset kmt      # Grouped by category
//! medtable filters data/medications.csv         # Distinct selector values
//! ```
//!
//! # Debug Commands
//!
//! ```bash
//! medtable parse data/medications.csv           # Full dataset as JSON
//! medtable split "Pain; fever. Inflammation"    # Sentence splitter
//! medtable schema ema                           # Preset schema as JSON
//! ```
//!
//! The source argument defaults to `MEDTABLE_SOURCE`; a `.env` file is read if present.

use clap::{Parser, Subcommand, ValueEnum};
use medtable::logs::{log_info, log_warning, LOG_BROADCASTER};
use medtable::{
    split, AppConfig, Group, LoadStatus, Page, Record, Schema, Selection, Session, SortDirection,
    Source,
};
use std::fs;
use std::path::{Path, PathBuf};

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

/// Widest a table cell gets before it is cut.
const MAX_CELL_WIDTH: usize = 48;

#[derive(Parser)]
#[command(name = "medtable")]
#[command(about = "Search, filter and page through medication CSV exports", long_about = None)]
struct Cli {
    /// Built-in schema preset (medications, ema, kmt)
    #[arg(long, global = true)]
    preset: Option<String>,

    /// Custom schema JSON file (overrides --preset)
    #[arg(long, global = true)]
    schema: Option<PathBuf>,

    /// Do not echo progress logs to stderr
    #[arg(long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a CSV and print one page of the filtered, sorted view
    Query {
        /// CSV file path or http(s) URL
        source: Option<String>,

        /// Free-text search over the searchable fields
        #[arg(short, long, default_value = "")]
        query: String,

        /// Categorical filter as field=value (`field=` or `field=*` for any)
        #[arg(short, long)]
        filter: Vec<String>,

        /// Field to sort by
        #[arg(short, long)]
        sort: Option<String>,

        /// Sort descending
        #[arg(long)]
        desc: bool,

        /// 1-based page number
        #[arg(short, long, default_value = "1")]
        page: usize,

        /// Records per page (default: MEDTABLE_PAGE_SIZE or 50)
        #[arg(long)]
        page_size: Option<String>,

        #[arg(long, value_enum, default_value = "table")]
        format: OutputFormat,
    },

    /// Print the view grouped by a field
    Group {
        /// CSV file path or http(s) URL
        source: Option<String>,

        /// Field to group by (default: the schema's group field)
        #[arg(short, long)]
        by: Option<String>,

        #[arg(long, value_enum, default_value = "table")]
        format: OutputFormat,
    },

    /// Show the values each filter selector offers
    Filters {
        /// CSV file path or http(s) URL
        source: Option<String>,
    },

    /// Load a CSV and output the normalized dataset as JSON
    Parse {
        /// CSV file path or http(s) URL
        source: Option<String>,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Split free text into display clauses
    Split {
        text: String,
    },

    /// Print a schema as JSON
    Schema {
        /// Preset name (default: the active preset)
        name: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if cli.quiet {
        LOG_BROADCASTER.set_echo(false);
    }

    if let Err(e) = run(cli).await {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> CliResult<()> {
    let config = AppConfig::from_env()?;

    match cli.command {
        Commands::Query {
            source,
            query,
            filter,
            sort,
            desc,
            page,
            page_size,
            format,
        } => {
            let schema = resolve_schema(&config, cli.preset.as_deref(), cli.schema.as_deref())?;
            let page_size = match page_size {
                Some(raw) => medtable::ViewState::parse_page_size(&raw),
                None => config.page_size,
            };
            let options = QueryOptions { query, filter, sort, desc, page };
            cmd_query(&config, schema, source, options, page_size, format).await
        }

        Commands::Group { source, by, format } => {
            let schema = resolve_schema(&config, cli.preset.as_deref(), cli.schema.as_deref())?;
            cmd_group(&config, schema, source, by, format).await
        }

        Commands::Filters { source } => {
            let schema = resolve_schema(&config, cli.preset.as_deref(), cli.schema.as_deref())?;
            cmd_filters(&config, schema, source).await
        }

        Commands::Parse { source, output } => {
            let schema = resolve_schema(&config, cli.preset.as_deref(), cli.schema.as_deref())?;
            cmd_parse(&config, schema, source, output.as_deref()).await
        }

        Commands::Split { text } => cmd_split(&text),

        Commands::Schema { name } => {
            let schema = match (name, cli.schema.as_deref()) {
                (Some(name), _) => Schema::preset(&name)?,
                (None, path) => resolve_schema(&config, cli.preset.as_deref(), path)?,
            };
            println!("{}", schema.to_json()?);
            Ok(())
        }
    }
}

/// `--schema` file, then `--preset`, then `MEDTABLE_PRESET`.
fn resolve_schema(config: &AppConfig, preset: Option<&str>, path: Option<&Path>) -> CliResult<Schema> {
    let schema = match path {
        Some(path) => Schema::from_file(path)?,
        None => Schema::preset(preset.unwrap_or(&config.preset))?,
    };
    Ok(schema)
}

/// Load into a fresh session, turning a failed load into the message the
/// table would show.
async fn open_session(
    config: &AppConfig,
    schema: Schema,
    source: Option<String>,
    page_size: usize,
) -> CliResult<Session> {
    let source = Source::parse(source.as_deref().unwrap_or(&config.source));
    let mut session = Session::new(schema).with_page_size(page_size);

    match session.load(&source).await {
        LoadStatus::Ready => Ok(session),
        LoadStatus::Failed(_) | LoadStatus::Stale => Err(session
            .error_message()
            .unwrap_or_else(|| "Laden abgebrochen".to_string())
            .into()),
    }
}

struct QueryOptions {
    query: String,
    filter: Vec<String>,
    sort: Option<String>,
    desc: bool,
    page: usize,
}

async fn cmd_query(
    config: &AppConfig,
    schema: Schema,
    source: Option<String>,
    options: QueryOptions,
    page_size: usize,
    format: OutputFormat,
) -> CliResult<()> {
    let mut session = open_session(config, schema, source, page_size).await?;

    for raw in &options.filter {
        let (field, value) = raw
            .split_once('=')
            .ok_or_else(|| format!("Invalid filter '{}', expected field=value", raw))?;
        let field = field.trim();
        if session.schema().field(field).is_none() {
            return Err(format!("Unknown filter field '{}'", field).into());
        }
        session.state_mut().set_filter(field, Selection::parse(value));
    }

    if !options.query.trim().is_empty() {
        session.state_mut().set_query(options.query.as_str());
    }

    if let Some(key) = options.sort {
        if session.schema().field(&key).is_none() {
            return Err(format!("Unknown sort field '{}'", key).into());
        }
        let direction = if options.desc {
            SortDirection::Descending
        } else {
            SortDirection::Ascending
        };
        session.state_mut().set_sort(key, direction);
    } else if options.desc {
        let state = session.state_mut();
        match state.sort_key.clone() {
            Some(key) => state.set_sort(key, SortDirection::Descending),
            None => log_warning("--desc ignored: no sort field"),
        }
    }

    session.state_mut().go_to_page(options.page);

    let columns = columns(session.schema());
    let page = session.page();
    if page.page_index != options.page {
        log_info(format!("Page {} out of range, showing {}", options.page, page.page_index));
    }

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&page)?),
        OutputFormat::Table => print_page(&columns, &page),
    }

    Ok(())
}

async fn cmd_group(
    config: &AppConfig,
    schema: Schema,
    source: Option<String>,
    by: Option<String>,
    format: OutputFormat,
) -> CliResult<()> {
    let session = open_session(config, schema, source, config.page_size).await?;
    let columns = columns(session.schema());

    let groups = match by {
        Some(field) => {
            if session.schema().field(&field).is_none() {
                return Err(format!("Unknown group field '{}'", field).into());
            }
            session.groups_by(&field, medtable::config::FALLBACK_GROUP_LABEL)
        }
        None => session.groups(),
    }
    .ok_or("Schema has no group field; pass --by <field>")?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&groups)?),
        OutputFormat::Table => print_groups(&columns, &groups),
    }

    Ok(())
}

async fn cmd_filters(config: &AppConfig, schema: Schema, source: Option<String>) -> CliResult<()> {
    let session = open_session(config, schema, source, config.page_size).await?;

    let Some(options) = session.filter_options() else {
        return Ok(());
    };

    for option in options.iter() {
        let selected = session.state().selection(&option.field);
        println!(
            "{} [{}]",
            option.field,
            selected.value().unwrap_or("*")
        );
        for value in &option.values {
            println!("  - {}", value);
        }
    }

    Ok(())
}

async fn cmd_parse(
    config: &AppConfig,
    schema: Schema,
    source: Option<String>,
    output: Option<&Path>,
) -> CliResult<()> {
    let session = open_session(config, schema, source, config.page_size).await?;
    let Some(dataset) = session.dataset() else {
        return Ok(());
    };

    let info = dataset.info();
    eprintln!("   Encoding: {}", info.encoding);
    eprintln!("   Delimiter: '{}'", info.delimiter);
    eprintln!("   Columns: {}", info.headers.join(", "));
    if let Some(modified) = info.last_modified {
        eprintln!("   Data updated: {}", modified.format("%d.%m.%Y"));
    }
    eprintln!("✅ Parsed {} records", dataset.len());

    let json = serde_json::to_string_pretty(dataset.records())?;
    write_output(&json, output)
}

fn cmd_split(text: &str) -> CliResult<()> {
    for clause in split(text) {
        println!("- {}", clause);
    }
    Ok(())
}

// =============================================================================
// Table rendering
// =============================================================================

/// (canonical field, heading) for every schema field.
fn columns(schema: &Schema) -> Vec<(String, String)> {
    schema
        .fields
        .iter()
        .map(|f| (f.name.clone(), f.display_label().to_string()))
        .collect()
}

/// Display text of a cell: links get a scheme, multi-clause text is
/// joined with bullets.
fn cell(record: &Record, field: &str) -> String {
    if field == "url" {
        return record.link(field).unwrap_or_default();
    }
    let clauses = record.clauses(field);
    if clauses.len() > 1 {
        clauses.join(" • ")
    } else {
        record.get(field).to_string()
    }
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(width.saturating_sub(1)).collect();
    cut.push('…');
    cut
}

fn print_rows(columns: &[(String, String)], records: &[&Record]) {
    let rows: Vec<Vec<String>> = records
        .iter()
        .map(|record| {
            columns
                .iter()
                .map(|(field, _)| truncate(&cell(record, field), MAX_CELL_WIDTH))
                .collect()
        })
        .collect();

    let widths: Vec<usize> = columns
        .iter()
        .enumerate()
        .map(|(i, (_, label))| {
            rows.iter()
                .map(|row| row[i].chars().count())
                .chain(std::iter::once(label.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let line = |cells: Vec<&str>| {
        cells
            .iter()
            .zip(&widths)
            .map(|(text, width)| format!("{:<width$}", text, width = *width))
            .collect::<Vec<_>>()
            .join(" │ ")
            .trim_end()
            .to_string()
    };

    println!("{}", line(columns.iter().map(|(_, label)| label.as_str()).collect()));
    println!(
        "{}",
        widths
            .iter()
            .map(|w| "─".repeat(*w))
            .collect::<Vec<_>>()
            .join("─┼─")
    );
    for row in &rows {
        println!("{}", line(row.iter().map(String::as_str).collect()));
    }
}

fn print_page(columns: &[(String, String)], page: &Page) {
    if page.items.is_empty() {
        println!("Keine Einträge gefunden.");
    } else {
        print_rows(columns, &page.items);
    }
    println!();
    println!(
        "{}{}{}",
        if page.has_previous() { "« " } else { "" },
        page.summary(),
        if page.has_next() { " »" } else { "" }
    );
}

fn print_groups(columns: &[(String, String)], groups: &[Group]) {
    if groups.is_empty() {
        println!("Keine Einträge gefunden.");
        return;
    }
    for group in groups {
        println!("▸ {} ({})", group.label, group.records.len());
        print_rows(columns, &group.records);
        println!();
    }
}

fn write_output(content: &str, path: Option<&Path>) -> CliResult<()> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
            eprintln!("💾 Saved to: {}", p.display());
        }
        None => println!("{}", content),
    }
    Ok(())
}
