use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use docmongo_core::bson::{Bson, Document};
use docmongo_core::config::DEFAULT_TIMEOUT_SECS;
use docmongo_core::options::{FindOptions, ReplaceOptions, UpdateOptions};
use docmongo_core::{
    filter_fields, init_logging, ordered_from_map, ConnectionConfig, DocMap, DocStore,
    DriverOption, SortSpec, UpdateKind, UpdateMode,
};
use serde_json::Value;
use std::path::PathBuf;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "docmongo")]
#[command(about = "docmongo CLI - run CRUD operations against a MongoDB database")]
#[command(version)]
struct Cli {
    /// TOML config file (uri, timeout_secs, log_level)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Connection URI; the path names the database. Overrides config and environment
    #[arg(long, global = true)]
    uri: Option<String>,
    /// Per-operation timeout in seconds
    #[arg(long, global = true)]
    timeout: Option<u64>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that the server answers
    Ping,
    /// Print the first document matching a filter
    FindOne {
        collection: String,
        /// Filter as (extended) JSON
        #[arg(long, default_value = "{}")]
        filter: String,
    },
    /// Print every document matching a filter
    Find {
        collection: String,
        #[arg(long, default_value = "{}")]
        filter: String,
        /// Sort string, e.g. "age=-1,name=1"
        #[arg(long)]
        sort: Option<String>,
        #[arg(long)]
        limit: Option<i64>,
        #[arg(long)]
        skip: Option<u64>,
        /// Keep only these fields in the output (comma separated)
        #[arg(long, value_delimiter = ',')]
        fields: Vec<String>,
    },
    /// Count documents matching a filter
    Count {
        collection: String,
        #[arg(long, default_value = "{}")]
        filter: String,
    },
    /// Insert one JSON document
    Insert {
        collection: String,
        document: String,
        /// Add a create_time field
        #[arg(long)]
        stamp: bool,
    },
    /// Update with a mode: UpdateOne, UpdateMany, ReplaceOne or softDelete
    Update {
        collection: String,
        mode: String,
        /// Fields to $set (or the full replacement for ReplaceOne)
        document: String,
        #[arg(long, default_value = "{}")]
        filter: String,
        #[arg(long)]
        upsert: bool,
        /// Add an update_time field
        #[arg(long)]
        stamp: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = resolve_config(&cli)?;
    init_logging(config.log_level());

    let store = DocStore::from_config(&config)
        .await
        .with_context(|| "Failed to connect")?;
    info!(database = ?store.database_name(), "docmongo ready");

    let outcome = run(&store, cli.command).await;
    let disconnected = store.disconnect().await;
    finish(outcome, disconnected)
}

/// The command's own error wins; a failed disconnect is only surfaced when
/// the command succeeded.
fn finish(outcome: Result<()>, disconnected: docmongo_core::Result<()>) -> Result<()> {
    match (outcome, disconnected) {
        (Ok(()), Err(e)) => Err(e).with_context(|| "Failed to disconnect"),
        (Err(e), Err(disconnect_err)) => {
            error!(error = %disconnect_err, "disconnect failed after command error");
            Err(e)
        }
        (outcome, Ok(())) => outcome,
    }
}

/// --config file, else --uri, else docmongo.toml / environment; flags override
fn resolve_config(cli: &Cli) -> Result<ConnectionConfig> {
    let mut config = match (&cli.config, &cli.uri) {
        (Some(path), _) => ConnectionConfig::from_file(path)
            .with_context(|| format!("Failed to load config: {}", path.display()))?,
        (None, Some(uri)) => ConnectionConfig::new(uri.clone(), DEFAULT_TIMEOUT_SECS),
        (None, None) => ConnectionConfig::load()
            .with_context(|| "No connection configured (use --uri, --config or MongoURI)")?,
    };

    if let Some(uri) = &cli.uri {
        config.uri = uri.clone();
    }
    if let Some(timeout) = cli.timeout {
        if timeout == 0 {
            bail!("--timeout must be greater than zero");
        }
        config.timeout_secs = timeout;
    }
    Ok(config)
}

async fn run(store: &DocStore, command: Commands) -> Result<()> {
    match command {
        Commands::Ping => {
            store.ping().await.with_context(|| "Ping failed")?;
            println!("ok");
        }
        Commands::FindOne { collection, filter } => {
            let filter = parse_document(&filter, "filter")?;
            match store.find_one(&collection, filter, None).await {
                Ok(doc) => print_json(&to_json(doc))?,
                Err(e) if e.is_not_found() => println!("No document found in '{}'", collection),
                Err(e) => return Err(e).with_context(|| format!("find-one on {}", collection)),
            }
        }
        Commands::Find {
            collection,
            filter,
            sort,
            limit,
            skip,
            fields,
        } => {
            let filter = parse_document(&filter, "filter")?;
            let sort = sort
                .as_deref()
                .map(SortSpec::parse)
                .transpose()?
                .map(|spec| spec.to_document());
            let options = FindOptions::builder()
                .sort(sort)
                .limit(limit)
                .skip(skip)
                .build();

            let docs = store
                .find_many(&collection, filter, options)
                .await
                .with_context(|| format!("find on {}", collection))?;

            let output: Vec<Value> = docs
                .into_iter()
                .map(|doc| {
                    if fields.is_empty() {
                        to_json(doc)
                    } else {
                        let map: DocMap = doc.into_iter().collect();
                        to_json(ordered_from_map(&filter_fields(&map, &fields)))
                    }
                })
                .collect();
            println!("{} documents", output.len());
            print_json(&Value::Array(output))?;
        }
        Commands::Count { collection, filter } => {
            let filter = parse_document(&filter, "filter")?;
            let count = store
                .count(&collection, filter, None)
                .await
                .with_context(|| format!("count on {}", collection))?;
            println!("{}", count);
        }
        Commands::Insert {
            collection,
            document,
            stamp,
        } => {
            let document = parse_document(&document, "document")?;
            let result = if stamp {
                store
                    .insert_document_with_create_time(&collection, document, None)
                    .await
            } else {
                store.insert_one(&collection, &document, None).await
            }
            .with_context(|| format!("Failed to insert document into {}", collection))?;
            println!("Inserted {}", result.inserted_id);
        }
        Commands::Update {
            collection,
            mode,
            document,
            filter,
            upsert,
            stamp,
        } => {
            let kind: UpdateKind = mode.parse()?;
            let filter = parse_document(&filter, "filter")?;
            let document = parse_document(&document, "document")?;

            let options: Vec<DriverOption> = if upsert {
                vec![match kind {
                    UpdateKind::ReplaceOne => {
                        DriverOption::from(ReplaceOptions::builder().upsert(true).build())
                    }
                    _ => DriverOption::from(UpdateOptions::builder().upsert(true).build()),
                }]
            } else {
                Vec::new()
            };

            let result = if stamp {
                let mode = UpdateMode::resolve(kind.as_str(), options)?;
                store
                    .update_document_with_update_time(&collection, mode, filter, document)
                    .await
            } else {
                store
                    .update_by_name(&collection, kind.as_str(), filter, document, options)
                    .await
            }
            .with_context(|| format!("{} on {}", kind, collection))?;

            println!(
                "matched: {}, modified: {}, upserted: {}",
                result.matched_count,
                result.modified_count,
                result
                    .upserted_id
                    .map(|id| id.to_string())
                    .unwrap_or_else(|| "-".to_string())
            );
        }
    }
    Ok(())
}

/// Extended JSON object -> ordered document
fn parse_document(raw: &str, what: &str) -> Result<Document> {
    let value: Value =
        serde_json::from_str(raw).with_context(|| format!("Invalid JSON in {}", what))?;
    match Bson::try_from(value).map_err(|e| anyhow!("Invalid extended JSON in {}: {}", what, e))? {
        Bson::Document(doc) => Ok(doc),
        other => bail!("{} must be a JSON object, got {:?}", what, other.element_type()),
    }
}

fn to_json(doc: Document) -> Value {
    Bson::Document(doc).into_relaxed_extjson()
}

fn print_json(value: &Value) -> Result<()> {
    let json = serde_json::to_string_pretty(value).with_context(|| "Failed to serialize to JSON")?;
    println!("{}", json);
    Ok(())
}
