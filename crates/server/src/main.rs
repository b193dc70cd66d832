use clap::{Parser, Subcommand, ValueEnum};
use metrics_exporter_prometheus::PrometheusHandle;
use ragindex_core::{build_context, config, load, rebuild, save, IndexHandle};
use ragindex_server::api::create_router;
use ragindex_server::api::handlers::AppState;
use ragindex_server::api::metrics;
use ragindex_server::embedder::{read_vector_file, SidecarEmbedder};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ragindex", about = "Retrieval index for image captioning")]
struct Args {
    /// Binary vector file
    #[arg(
        long,
        global = true,
        env = "RAGINDEX_INDEX_PATH",
        default_value = config::DEFAULT_INDEX_PATH
    )]
    index_path: PathBuf,

    /// JSON metadata file
    #[arg(
        long,
        global = true,
        env = "RAGINDEX_META_PATH",
        default_value = config::DEFAULT_META_PATH
    )]
    meta_path: PathBuf,

    /// Log output format
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    /// Print Prometheus metrics after the command finishes
    #[arg(long, global = true, default_value_t = false)]
    print_metrics: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// Rebuild the index from a directory of images with `<image>.json` embeddings, then save it
    Rebuild {
        /// Directory scanned for jpg/jpeg/png/webp images
        #[arg(long, default_value = config::DEFAULT_SAMPLE_DIR)]
        sample_dir: PathBuf,
    },
    /// Search the saved index with a query embedding
    Query {
        /// Comma-separated query vector, e.g. "0.6,0.8"
        #[arg(
            long,
            value_delimiter = ',',
            allow_hyphen_values = true,
            required_unless_present = "vector_file",
            conflicts_with = "vector_file"
        )]
        vector: Option<Vec<f32>>,

        /// JSON file holding the query vector as an array of floats
        #[arg(long)]
        vector_file: Option<PathBuf>,

        /// Number of neighbors
        #[arg(short, long, default_value_t = config::DEFAULT_K)]
        k: usize,

        /// Also print the caption context string
        #[arg(long, default_value_t = false)]
        context: bool,
    },
    /// Print dimension, row count, and memory estimate of the saved index
    Stats,
    /// Serve the index over HTTP
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value_t = config::DEFAULT_PORT)]
        port: u16,

        /// Directory used by `POST /admin/rebuild`
        #[arg(long, default_value = config::DEFAULT_SAMPLE_DIR)]
        sample_dir: PathBuf,
    },
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::from_default_env()
        .add_directive(
            "ragindex_server=info"
                .parse()
                .expect("valid directive literal"),
        )
        .add_directive(
            "ragindex_core=info"
                .parse()
                .expect("valid directive literal"),
        );
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Text => builder.init(),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    init_tracing(args.log_format);

    let prometheus_handle =
        metrics_exporter_prometheus::PrometheusBuilder::new().install_recorder()?;

    match args.command {
        Command::Rebuild { ref sample_dir } => {
            let (index, report) = rebuild(sample_dir, &SidecarEmbedder)?;
            save(&index, &args.index_path, &args.meta_path)?;
            metrics::record_rebuild(&report);
            metrics::update_index_metrics(&index);
            for skipped in &report.skipped {
                eprintln!("skipped {}: {}", skipped.path.display(), skipped.reason);
            }
            println!(
                "Indexed {} images ({} skipped) into {} + {}",
                report.indexed,
                report.skipped.len(),
                args.index_path.display(),
                args.meta_path.display()
            );
        }
        Command::Query {
            ref vector,
            ref vector_file,
            k,
            context,
        } => {
            let query = match (vector, vector_file) {
                (Some(v), _) => v.clone(),
                (None, Some(path)) => read_vector_file(path)
                    .map_err(|e| format!("cannot read {}: {}", path.display(), e))?,
                (None, None) => return Err("one of --vector or --vector-file is required".into()),
            };
            if k > config::MAX_K {
                return Err(format!("k must be 0-{}", config::MAX_K).into());
            }
            let index = load(&args.index_path, &args.meta_path)?;
            let start = Instant::now();
            let hits = index.search_scored(&query, k)?;
            metrics::record_search("cli", hits.len(), start.elapsed());
            println!("{}", serde_json::to_string_pretty(&hits)?);
            if context {
                println!("{}", build_context(hits.iter().map(|h| h.record)));
            }
        }
        Command::Stats => {
            let index = load(&args.index_path, &args.meta_path)?;
            metrics::update_index_metrics(&index);
            println!(
                "{}",
                serde_json::to_string_pretty(&serde_json::json!({
                    "index_path": args.index_path,
                    "meta_path": args.meta_path,
                    "dimension": index.dimension(),
                    "count": index.len(),
                    "memory_bytes": index.estimate_memory_bytes(),
                }))?
            );
        }
        Command::Serve {
            port,
            ref sample_dir,
        } => {
            if port == 0 {
                return Err("port must be > 0".into());
            }
            serve(&args, port, sample_dir.clone(), prometheus_handle.clone()).await?;
        }
    }

    if args.print_metrics {
        print!("{}", prometheus_handle.render());
    }
    Ok(())
}

async fn serve(
    args: &Args,
    port: u16,
    sample_dir: PathBuf,
    prometheus_handle: PrometheusHandle,
) -> Result<(), Box<dyn std::error::Error>> {
    // A corrupt index on disk should not keep the server from starting:
    // captioning works without retrieval context.
    let index = match load(&args.index_path, &args.meta_path) {
        Ok(index) => index,
        Err(e) => {
            tracing::error!("Could not load index, serving empty: {}", e);
            Default::default()
        }
    };
    metrics::update_index_metrics(&index);
    tracing::info!(
        "Serving index with {} rows (dim {:?})",
        index.len(),
        index.dimension()
    );

    let state = AppState {
        index: IndexHandle::new(index),
        index_path: args.index_path.clone(),
        meta_path: args.meta_path.clone(),
        sample_dir,
        embedder: Arc::new(SidecarEmbedder),
        prometheus_handle,
        rebuild_lock: Arc::new(tokio::sync::Mutex::new(())),
        start_time: Instant::now(),
    };

    let app = create_router(state);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on {}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutdown signal received");
        })
        .await?;
    Ok(())
}
