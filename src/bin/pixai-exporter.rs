use anyhow::Result;
use clap::{Parser, Subcommand};
use pixai_exporter::config::settings::LogFormat;
use pixai_exporter::observability::metrics::ExporterMetrics;
use pixai_exporter::poller::Poller;
use pixai_exporter::server;
use pixai_exporter::sources::PixaiClient;
use pixai_exporter::utils::config_loader::{self, ConfigOverrides};
use pixai_exporter::utils::logging::{self, LogLevel};
use pixai_exporter::utils::shutdown;
use tracing::info;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start polling the API and serving metrics
    Start(StartArgs),
}

#[derive(clap::Args)]
struct StartArgs {
    #[arg(long, env = "PIXAI_API_TOKEN", hide_env_values = true)]
    api_token: Option<String>,
    /// scrape server port [default: 9865]
    #[arg(long)]
    port: Option<u16>,
    /// seconds between poll cycles [default: 600]
    #[arg(long)]
    interval: Option<u64>,
    /// per-request timeout in seconds [default: 25]
    #[arg(long)]
    timeout: Option<u64>,
    /// optional YAML config file
    #[arg(short, long, env = "PIXAI_EXPORTER_CONFIG")]
    config: Option<String>,
    #[arg(long, env = "PIXAI_API_URL")]
    api_url: Option<String>,
    #[arg(long, env = "LOG_LEVEL", value_enum)]
    log_level: Option<LogLevel>,
    #[arg(long, env = "LOG_FORMAT", value_enum)]
    log_format: Option<LogFormat>,
    /// only export the quota gauge
    #[arg(long)]
    no_token_expiration: bool,
    /// drop series of tokens that disappeared upstream
    #[arg(long)]
    prune_stale_tokens: bool,
}

impl StartArgs {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            api_token: self.api_token.clone(),
            api_url: self.api_url.clone(),
            port: self.port,
            interval_seconds: self.interval,
            timeout_seconds: self.timeout,
            log_level: self.log_level.map(|l| l.as_str().to_string()),
            log_format: self.log_format,
            disable_token_expiration: self.no_token_expiration,
            prune_stale_tokens: self.prune_stale_tokens,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let Command::Start(args) = Cli::parse().command;

    // -------------------------------
    // 1. Load config, init logging
    // -------------------------------

    let service_config = config_loader::run(args.config.as_deref(), args.overrides())?;
    logging::run(&service_config);
    let settings = &service_config.settings;
    info!("config loaded: {:?}", settings);

    // -------------------------------
    // 2. Metric registry and API client
    // -------------------------------

    let metrics = ExporterMetrics::new(settings.poll.token_expiration_enabled)?;
    let client = PixaiClient::new(&settings.api)?;

    // -------------------------------
    // 3. Bind scrape server, start poll loop
    // -------------------------------

    let shutdown = shutdown::run();
    let listener = server::server::bind(settings).await?;
    let poller = Poller::new(client, metrics.clone(), &settings.poll);
    let poll_loop = tokio::spawn(poller.run(shutdown.clone()));

    info!("Service starting...");
    let served = server::server::serve(listener, settings, metrics, shutdown.clone()).await;

    // server exit (error or signal) stops the loop as well
    shutdown.cancel();
    poll_loop.await?;
    served
}
