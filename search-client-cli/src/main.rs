use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use tracing::{error, info, warn};

use search_client::{CancellationToken, SearchClient};
use search_client_cli::{commands, CliError, Settings};
use search_client_shared::{
    DeleteQuery, DeleteTarget, ExportOptions, ImportAction, ImportOptions, SearchQuery,
};

#[derive(Parser)]
#[command(name = "search-cli")]
#[command(about = "Import, export and search the documents of a collection", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import documents from a JSONL file
    Import {
        collection: String,
        file: String,
        /// create, upsert, update or emplace
        #[arg(long, value_parser = parse_action)]
        action: Option<ImportAction>,
        #[arg(long)]
        batch_size: Option<usize>,
        /// Send the file untouched and print the raw response
        #[arg(long)]
        raw: bool,
    },
    /// Export documents as JSONL
    Export {
        collection: String,
        #[arg(long)]
        filter_by: Option<String>,
        #[arg(long, value_delimiter = ',')]
        include_fields: Option<Vec<String>>,
        #[arg(long, value_delimiter = ',')]
        exclude_fields: Option<Vec<String>>,
    },
    /// Search a collection
    Search {
        collection: String,
        #[arg(long)]
        q: String,
        #[arg(long, value_delimiter = ',', required = true)]
        query_by: Vec<String>,
        #[arg(long)]
        filter_by: Option<String>,
        #[arg(long)]
        page: Option<u32>,
        #[arg(long)]
        per_page: Option<u32>,
    },
    /// Delete one document by id or every document matching a filter
    Delete {
        collection: String,
        #[command(flatten)]
        target: DeleteArgs,
        /// Documents deleted per server-side batch, with --filter-by
        #[arg(long, requires = "filter_by")]
        batch_size: Option<usize>,
    },
    /// Create or replace one document given as JSON
    Upsert { collection: String, json: String },
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct DeleteArgs {
    #[arg(long)]
    id: Option<String>,
    #[arg(long)]
    filter_by: Option<String>,
}

fn parse_action(value: &str) -> Result<ImportAction, String> {
    match value {
        "create" => Ok(ImportAction::Create),
        "upsert" => Ok(ImportAction::Upsert),
        "update" => Ok(ImportAction::Update),
        "emplace" => Ok(ImportAction::Emplace),
        other => Err(format!("unknown import action: {}", other)),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error!(error = %e, "Command failed");
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Run the command, returning whether it fully succeeded.
async fn run(cli: Cli) -> Result<bool, CliError> {
    let settings = Settings::from_env()?;
    let client = SearchClient::new(settings.client_config()?)?;

    match cli.command {
        Commands::Import {
            collection,
            file,
            action,
            batch_size,
            raw,
        } => {
            let documents = client.collection(collection).documents();
            let contents = tokio::fs::read_to_string(&file).await?;
            let mut options = ImportOptions::new();
            options.action = action;
            options.batch_size = batch_size;

            if raw {
                println!("{}", commands::import_raw(&documents, contents, &options).await?);
                return Ok(true);
            }

            let report = commands::import(&documents, &contents, &options).await?;
            println!("{}", report);
            Ok(report.is_success())
        }
        Commands::Export {
            collection,
            filter_by,
            include_fields,
            exclude_fields,
        } => {
            let documents = client.collection(collection).documents();
            let options = ExportOptions {
                filter_by,
                include_fields,
                exclude_fields,
                ..Default::default()
            };
            println!("{}", commands::export(&documents, &options).await?);
            Ok(true)
        }
        Commands::Search {
            collection,
            q,
            query_by,
            filter_by,
            page,
            per_page,
        } => {
            let documents = client.collection(collection).documents();
            let mut query = SearchQuery::new(q).with_query_by(query_by);
            query.filter_by = filter_by;
            query.page = page;
            query.per_page = per_page;

            let token = CancellationToken::new();
            let on_interrupt = token.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    warn!("Interrupted, cancelling search");
                    on_interrupt.cancel();
                }
            });

            println!("{}", commands::search(&documents, &query, token).await?);
            Ok(true)
        }
        Commands::Delete {
            collection,
            target,
            batch_size,
        } => {
            let documents = client.collection(collection).documents();
            let target = match (target.id, target.filter_by) {
                (Some(id), _) => DeleteTarget::Id(id),
                (None, Some(filter_by)) => {
                    let mut query = DeleteQuery::new(filter_by);
                    query.batch_size = batch_size;
                    DeleteTarget::Filter(query)
                }
                (None, None) => {
                    return Err(CliError::input("either --id or --filter-by is required"))
                }
            };
            println!("{}", commands::delete(&documents, target).await?);
            Ok(true)
        }
        Commands::Upsert { collection, json } => {
            let documents = client.collection(collection).documents();
            println!("{}", commands::upsert(&documents, &json).await?);
            info!("Upserted document");
            Ok(true)
        }
    }
}
