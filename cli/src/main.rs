use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};
use clap::{Args, Parser, Subcommand};
use entity_store_core::{EntitySchema, SemanticType, Value, validate_schema};
use entity_store_db::{StoreConfig, TableCatalog, TableSpec};
use entity_store_sqlite::{EntityDescriptor, Store, generate_index_sql, generate_table_sql};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "entity-store")]
#[command(about = "Inspect and maintain entity store databases")]
struct Cli {
    /// Log debug output (generated SQL, table creation) to stderr.
    #[arg(long, short, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the DDL and statement templates for table description files.
    Inspect(InspectArgs),
    /// Register every described table and print its row count.
    Status(StatusArgs),
    /// Print every row of a table as JSON.
    Dump(DumpArgs),
    /// Delete one row of a table by its key values.
    Delete(DeleteArgs),
}

#[derive(Debug, Args)]
struct InspectArgs {
    /// Table description YAML files.
    #[arg(required = true)]
    files: Vec<PathBuf>,
}

#[derive(Debug, Args)]
struct StatusArgs {
    /// Store configuration file.
    #[arg(long)]
    config: PathBuf,
}

#[derive(Debug, Args)]
struct DumpArgs {
    /// Store configuration file.
    #[arg(long)]
    config: PathBuf,
    /// Table name.
    table: String,
}

#[derive(Debug, Args)]
struct DeleteArgs {
    /// Store configuration file.
    #[arg(long)]
    config: PathBuf,
    /// Table name.
    table: String,
    /// One value per key field, in declaration order.
    #[arg(required = true)]
    keys: Vec<String>,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Command::Inspect(args) => run_inspect(args),
        Command::Status(args) => run_status(args),
        Command::Dump(args) => run_dump(args),
        Command::Delete(args) => run_delete(args),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("warn")
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

// ---------------------------------------------------------------------------
// inspect
// ---------------------------------------------------------------------------

fn run_inspect(args: InspectArgs) -> Result<(), String> {
    for (i, path) in args.files.iter().enumerate() {
        let schema = load_table_file(path)?;
        let problems = validate_schema(&schema);
        if !problems.is_empty() {
            let listed: Vec<String> = problems.iter().map(ToString::to_string).collect();
            return Err(format!("'{}': {}", path.display(), listed.join("; ")));
        }
        let descriptor = EntityDescriptor::build(&schema)
            .map_err(|e| format!("'{}': {e}", path.display()))?;

        if i > 0 {
            println!();
        }
        print_descriptor(&descriptor);
    }
    Ok(())
}

fn print_descriptor(descriptor: &EntityDescriptor) {
    println!("-- {}", descriptor.name());
    println!("{};", generate_table_sql(descriptor));
    if let Some(index) = generate_index_sql(descriptor) {
        println!("{index};");
    }

    let t = descriptor.templates();
    for (label, sql) in [
        ("exists", &t.exists),
        ("select_all", &t.select_all),
        ("select_one", &t.select_one),
        ("insert", &t.insert),
        ("update", &t.update),
        ("delete", &t.delete),
        ("count", &t.count),
    ] {
        println!("-- {label}: {sql}");
    }
}

fn load_table_file(path: &Path) -> Result<EntitySchema, String> {
    TableSpec::load(path)
        .and_then(TableSpec::into_schema)
        .map_err(|e| format!("Failed to load '{}': {e}", path.display()))
}

// ---------------------------------------------------------------------------
// status / dump / delete
// ---------------------------------------------------------------------------

fn run_status(args: StatusArgs) -> Result<(), String> {
    let (mut store, catalog) = open_store(&args.config)?;

    for schema in catalog.schemas() {
        store
            .register_schema(schema)
            .map_err(|e| format!("Failed to register '{}': {e}", schema.name))?;
    }

    println!("Tables:");
    for name in catalog.tables() {
        let rows = store
            .try_count_rows(name)
            .map_err(|e| format!("Failed to count '{name}': {e}"))?;
        println!("  {name}: {rows} row(s)");
    }
    Ok(())
}

fn run_dump(args: DumpArgs) -> Result<(), String> {
    let (mut store, catalog) = open_store(&args.config)?;
    register_table(&mut store, &catalog, &args.table)?;

    let descriptor = store.descriptor(&args.table).map_err(|e| e.to_string())?;
    let rows = store
        .try_select_all(&args.table)
        .map_err(|e| format!("Failed to read '{}': {e}", args.table))?;

    let records: Vec<serde_json::Value> = rows
        .into_iter()
        .map(|row| {
            let object = descriptor
                .columns()
                .iter()
                .zip(row)
                .map(|(column, value)| (column.name.clone(), value_to_json(value)))
                .collect();
            serde_json::Value::Object(object)
        })
        .collect();

    let raw = serde_json::to_string_pretty(&records)
        .map_err(|e| format!("Failed to serialize rows: {e}"))?;
    println!("{raw}");
    Ok(())
}

fn run_delete(args: DeleteArgs) -> Result<(), String> {
    let (mut store, catalog) = open_store(&args.config)?;
    register_table(&mut store, &catalog, &args.table)?;

    let descriptor = store.descriptor(&args.table).map_err(|e| e.to_string())?;
    if args.keys.len() != descriptor.key_arity() {
        return Err(format!(
            "'{}' has {} key field(s), got {} value(s)",
            args.table,
            descriptor.key_arity(),
            args.keys.len()
        ));
    }

    let keys = descriptor
        .key_columns()
        .zip(&args.keys)
        .map(|(column, raw)| {
            parse_key(column.ty, raw).map_err(|e| format!("Invalid value for '{}': {e}", column.name))
        })
        .collect::<Result<Vec<_>, _>>()?;
    debug!(table = %args.table, ?keys, "deleting by key");

    let removed = store
        .try_delete_keys(&args.table, &keys)
        .map_err(|e| format!("Failed to delete from '{}': {e}", args.table))?;
    println!("Deleted {removed} row(s) from '{}'.", args.table);
    Ok(())
}

fn open_store(config_path: &Path) -> Result<(Store, TableCatalog), String> {
    let config = StoreConfig::load(config_path)
        .map_err(|e| format!("Failed to load config '{}': {e}", config_path.display()))?;
    let tables = config
        .tables
        .as_ref()
        .ok_or_else(|| format!("'{}' does not name a tables directory", config_path.display()))?;
    let catalog = TableCatalog::from_dir(tables)
        .map_err(|e| format!("Failed to load tables from '{}': {e}", tables.display()))?;
    let store = Store::open(&config)
        .map_err(|e| format!("Failed to open database '{}': {e}", config.path.display()))?;
    Ok((store, catalog))
}

fn register_table(store: &mut Store, catalog: &TableCatalog, table: &str) -> Result<(), String> {
    let schema = catalog
        .get(table)
        .ok_or_else(|| format!("No description for table '{table}'"))?;
    store
        .register_schema(schema)
        .map(|_| ())
        .map_err(|e| format!("Failed to register '{table}': {e}"))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Parses a command-line key value according to the field's type.
fn parse_key(ty: SemanticType, raw: &str) -> Result<Value, String> {
    fn parse<T: std::str::FromStr>(raw: &str) -> Result<T, String>
    where
        T::Err: std::fmt::Display,
    {
        raw.parse::<T>().map_err(|e| e.to_string())
    }

    let value = match ty {
        SemanticType::Bool => Value::Bool(parse(raw)?),
        SemanticType::Byte => Value::Byte(parse(raw)?),
        SemanticType::Int => Value::Int(parse(raw)?),
        SemanticType::Long => Value::Long(parse(raw)?),
        SemanticType::ULong => Value::ULong(parse(raw)?),
        SemanticType::Text | SemanticType::Comment => Value::Text(raw.to_string()),
        SemanticType::Timestamp => Value::Timestamp(
            DateTime::parse_from_rfc3339(raw)
                .map_err(|e| e.to_string())?
                .with_timezone(&Utc),
        ),
        SemanticType::Float => Value::Float(parse(raw)?),
        SemanticType::Double => Value::Double(parse(raw)?),
        SemanticType::Bytes | SemanticType::Ignored => {
            return Err(format!("{ty} keys cannot be given on the command line"));
        }
    };
    Ok(value)
}

fn value_to_json(value: Value) -> serde_json::Value {
    match value {
        Value::Null => serde_json::Value::Null,
        Value::Bool(v) => v.into(),
        Value::Byte(v) => v.into(),
        Value::Int(v) => v.into(),
        Value::Long(v) => v.into(),
        Value::ULong(v) => v.into(),
        Value::Text(v) => v.into(),
        Value::Timestamp(v) => v.to_rfc3339_opts(SecondsFormat::AutoSi, true).into(),
        Value::Float(v) => f64::from(v).into(),
        Value::Double(v) => v.into(),
        Value::Bytes(v) => v.into(),
    }
}
