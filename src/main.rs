//! Pagewatch main entry point
//!
//! This is the command-line interface for the Pagewatch analysis client.

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use pagewatch::config::{load_config_or_default, validate, Config, MAX_PAGE_SIZE};
use pagewatch::detail::DetailWatcher;
use pagewatch::output::{format_record_detail, format_table, write_report};
use pagewatch::poller::{watch_detail, watch_table, PollScheduler, StopReason};
use pagewatch::table::{ActionOutcome, RejectReason};
use pagewatch::{
    HttpRecordApi, QueryState, RecordId, RecordStatus, SortField, SortOrder, TableController,
};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Pagewatch: a live client for a web page analysis service
///
/// Submits addresses for analysis and follows each analysis until it is done,
/// with a filterable, sortable table of every record on the server.
#[derive(Parser, Debug)]
#[command(name = "pagewatch")]
#[command(version = "1.0.0")]
#[command(about = "Live client for a web page analysis service", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (defaults apply when omitted)
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,

    /// Override the service base URL
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,

    /// Override the bearer token
    #[arg(long, env = "PAGEWATCH_TOKEN", hide_env_values = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Submit an address for analysis
    Submit {
        /// Absolute http(s) address
        url: String,
    },

    /// Print one page of the record table
    List {
        #[command(flatten)]
        filters: TableArgs,

        /// Also write the table to this file
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Show the record table and keep it fresh until every analysis finishes
    Watch {
        #[command(flatten)]
        filters: TableArgs,
    },

    /// Show one record
    Show {
        id: u64,

        /// Keep refreshing until the analysis finishes
        #[arg(short, long)]
        watch: bool,
    },

    /// Re-run analysis of several records in one request
    Rerun {
        #[arg(required = true)]
        ids: Vec<u64>,
    },

    /// Delete records
    Delete {
        #[arg(required = true)]
        ids: Vec<u64>,
    },

    /// Re-run analysis of one record
    Analyze { id: u64 },
}

/// View parameters shared by `list` and `watch`
#[derive(Args, Debug)]
struct TableArgs {
    /// Case-insensitive match on address or title
    #[arg(short, long)]
    search: Option<String>,

    /// Only show records with this status (queued, running, done, error)
    #[arg(long, value_parser = parse_status)]
    status: Option<RecordStatus>,

    /// Sort column (address, status, title, createdAt, internalLinks, externalLinks, brokenLinks)
    #[arg(long)]
    sort: Option<SortField>,

    /// Sort direction (asc, desc)
    #[arg(long)]
    order: Option<SortOrder>,

    /// Page to show, starting at 1
    #[arg(long)]
    page: Option<usize>,

    /// Rows per page (1-100)
    #[arg(long, value_parser = parse_page_size)]
    page_size: Option<usize>,
}

fn parse_status(s: &str) -> Result<RecordStatus, String> {
    RecordStatus::parse(s).ok_or_else(|| format!("unknown status '{}'", s))
}

fn parse_page_size(s: &str) -> Result<usize, String> {
    let size: usize = s
        .parse()
        .map_err(|_| format!("'{}' is not a page size", s))?;
    if !(1..=MAX_PAGE_SIZE).contains(&size) {
        return Err(format!("page size must be between 1 and {}", MAX_PAGE_SIZE));
    }
    Ok(size)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = load(&cli)?;
    let api = HttpRecordApi::new(&config.server)?;
    tracing::info!("Using analysis service at {}", api.base_url());

    match cli.command {
        Command::Submit { url } => handle_submit(api, &config, &url).await,
        Command::List { filters, output } => handle_list(api, &config, &filters, output).await,
        Command::Watch { filters } => handle_watch(api, &config, &filters).await,
        Command::Show { id, watch } => handle_show(api, &config, RecordId(id), watch).await,
        Command::Rerun { ids } => handle_rerun(api, &config, ids).await,
        Command::Delete { ids } => handle_delete(api, &config, ids).await,
        Command::Analyze { id } => handle_analyze(api, RecordId(id)).await,
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("pagewatch=warn"),
            1 => EnvFilter::new("pagewatch=info,warn"),
            2 => EnvFilter::new("pagewatch=debug,info"),
            _ => EnvFilter::new("pagewatch=trace,debug"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Loads the configuration and applies command-line overrides
fn load(cli: &Cli) -> anyhow::Result<Config> {
    if let Some(path) = &cli.config {
        tracing::info!("Loading configuration from: {}", path.display());
    }

    let mut config = load_config_or_default(cli.config.as_deref())
        .context("Failed to load configuration")?;

    if let Some(base_url) = &cli.base_url {
        config.server.base_url = base_url.clone();
    }
    if let Some(token) = &cli.token {
        config.server.token = token.clone();
    }

    validate(&config).context("Invalid configuration")?;
    Ok(config)
}

fn new_controller(api: HttpRecordApi, config: &Config) -> TableController<HttpRecordApi> {
    TableController::new(api, QueryState::from_config(&config.table))
}

/// Builds the initial query from configuration and command-line filters
///
/// The page is clamped by the controller once the page count is known.
fn query_from_args(config: &Config, args: &TableArgs) -> QueryState {
    let mut query = QueryState::from_config(&config.table);

    if let Some(term) = &args.search {
        query.set_search_term(term.as_str());
    }
    query.set_status_filter(args.status);

    let field = args.sort.unwrap_or(query.sort_field());
    let order = match (args.sort, args.order) {
        (_, Some(order)) => order,
        (Some(_), None) => SortOrder::Asc,
        (None, None) => query.sort_order(),
    };
    query.set_sort(field, order);

    if let Some(page_size) = args.page_size {
        query.set_page_size(page_size);
    }
    if let Some(page) = args.page {
        query.set_page(page);
    }
    query
}

async fn handle_submit(api: HttpRecordApi, config: &Config, url: &str) -> anyhow::Result<()> {
    let mut controller = new_controller(api, config);
    let id = controller.submit(url).await?;

    println!("Submitted {} as analysis #{}", url.trim(), id);
    Ok(())
}

async fn handle_list(
    api: HttpRecordApi,
    config: &Config,
    args: &TableArgs,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    let mut controller = TableController::new(api, query_from_args(config, args));
    controller.refresh(false).await;

    let view = controller.view();
    let text = format_table(&view);
    print!("{}", text);

    if let Some(path) = output {
        write_report(&text, &path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        tracing::info!("Table written to {}", path.display());
    }

    match view.error {
        Some(error) if error.blocks_view() => Err(error.error.into()),
        _ => Ok(()),
    }
}

async fn handle_watch(api: HttpRecordApi, config: &Config, args: &TableArgs) -> anyhow::Result<()> {
    let mut controller = TableController::new(api, query_from_args(config, args));

    let mut scheduler =
        PollScheduler::new(Duration::from_millis(config.polling.list_interval_ms));
    let shutdown = async {
        // A failed signal handler means Ctrl-C cannot be observed; keep polling
        if tokio::signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
    };

    let summary = watch_table(&mut controller, &mut scheduler, shutdown, true, |view| {
        println!("{}", format_table(view));
    })
    .await;

    tracing::info!(
        "Watch finished after {} polls ({:?})",
        summary.requests,
        summary.stopped
    );
    if let Some(error) = controller.error().filter(|e| e.blocks_view()) {
        return Err(error.error.clone().into());
    }
    if summary.stopped == StopReason::Idle {
        println!("All analyses finished");
    }
    Ok(())
}

async fn handle_show(
    api: HttpRecordApi,
    config: &Config,
    id: RecordId,
    watch: bool,
) -> anyhow::Result<()> {
    let mut watcher = DetailWatcher::new(api, id);

    if watch {
        let mut scheduler =
            PollScheduler::new(Duration::from_millis(config.polling.detail_interval_ms));
        let shutdown = async {
            if tokio::signal::ctrl_c().await.is_err() {
                std::future::pending::<()>().await;
            }
        };
        watch_detail(&mut watcher, &mut scheduler, shutdown, |record| {
            if let Some(record) = record {
                println!("{}", format_record_detail(record));
            }
        })
        .await;
    } else {
        // Failures are reported through the watcher's error slot below
        let _ = watcher.refresh().await;
        if let Some(record) = watcher.record() {
            print!("{}", format_record_detail(record));
        }
    }

    match watcher.error() {
        Some(error) => Err(error.clone().into()),
        None => Ok(()),
    }
}

async fn handle_rerun(api: HttpRecordApi, config: &Config, ids: Vec<u64>) -> anyhow::Result<()> {
    let ids: Vec<RecordId> = ids.into_iter().map(RecordId).collect();
    let mut controller = new_controller(api, config);

    let outcome = controller.bulk_rerun(&ids).await;
    report(outcome, &format!("Re-run requested for {} analyses", ids.len()))
}

async fn handle_delete(api: HttpRecordApi, config: &Config, ids: Vec<u64>) -> anyhow::Result<()> {
    let ids: Vec<RecordId> = ids.into_iter().map(RecordId).collect();
    let mut controller = new_controller(api, config);

    let outcome = match ids.as_slice() {
        [id] => controller.delete(*id).await,
        _ => controller.bulk_delete(&ids).await,
    };
    report(outcome, &format!("Deleted {} analyses", ids.len()))
}

async fn handle_analyze(api: HttpRecordApi, id: RecordId) -> anyhow::Result<()> {
    let mut watcher = DetailWatcher::new(api, id);

    // Load first so a running analysis is not restarted
    if let Err(error) = watcher.refresh().await {
        tracing::debug!("Could not load {} before re-analyzing: {}", id, error);
    }

    let outcome = watcher.reanalyze().await;
    report(outcome, &format!("Re-analysis of #{} requested", id))
}

fn report(outcome: ActionOutcome, done: &str) -> anyhow::Result<()> {
    match outcome {
        ActionOutcome::Completed(_) => {
            println!("{}", done);
            Ok(())
        }
        ActionOutcome::Rejected(RejectReason::AlreadyRunning) => {
            println!("Analysis is already running");
            Ok(())
        }
        ActionOutcome::Rejected(RejectReason::NothingSelected) => bail!("No ids given"),
        ActionOutcome::Failed(error) => Err(error.into()),
    }
}
