use clap::{Args, Parser, Subcommand, ValueEnum};
use color_eyre::eyre::Result;

use dcrlens::cache::StalePolicy;
use dcrlens::query::encode_query;
use dcrlens::state::{App, AppConfig, Screen, StartupOptions};
use dcrlens::tui;

// dcrlens version from Cargo.toml
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// dcrlens - live blocks and treasury reports from a dcrdata explorer
#[derive(Parser, Debug)]
#[command(version = VERSION, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Explorer to query, overriding the config file
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Report cache lifetime in seconds, overriding the config file
    #[arg(long, global = true)]
    cache_ttl: Option<u64>,

    /// What to do with report responses that arrive out of order
    #[arg(long, global = true, value_enum)]
    stale: Option<StaleArg>,

    /// Write the effective configuration back to the config file
    #[arg(long, global = true)]
    save_config: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Watch the live block list (default)
    Blocks {
        /// Show visual blocks instead of the count columns
        #[arg(long)]
        visual: bool,
    },
    /// Open a finance report
    Report(ReportArgs),
}

#[derive(Args, Debug, Default)]
struct ReportArgs {
    /// Report type: month, year, domain, owner or proposal
    #[arg(long = "type")]
    report_type: Option<String>,
    /// Month (`2021_3`) or year (`2021`) of a time report
    #[arg(long)]
    time: Option<String>,
    /// Domain or owner name
    #[arg(long)]
    name: Option<String>,
    /// Proposal token
    #[arg(long)]
    token: Option<String>,
    /// Raw query string, e.g. `type=domain&name=marketing`; other flags are
    /// ignored when set
    #[arg(long, conflicts_with_all = ["report_type", "time", "name", "token"])]
    query: Option<String>,
}

impl ReportArgs {
    fn to_query(&self) -> String {
        if let Some(query) = &self.query {
            return query.trim_start_matches('?').to_string();
        }
        let pairs: Vec<(String, String)> = [
            ("type", &self.report_type),
            ("time", &self.time),
            ("token", &self.token),
            ("name", &self.name),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.as_ref().map(|v| (key.to_string(), v.clone())))
        .collect();
        encode_query(&pairs)
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum StaleArg {
    Keep,
    Discard,
}

impl From<StaleArg> for StalePolicy {
    fn from(arg: StaleArg) -> Self {
        match arg {
            StaleArg::Keep => Self::Keep,
            StaleArg::Discard => Self::Discard,
        }
    }
}

impl Cli {
    fn config(&self) -> AppConfig {
        let mut config = AppConfig::load();
        if let Some(base_url) = &self.base_url {
            config.base_url = base_url.clone();
        }
        if let Some(ttl) = self.cache_ttl {
            config.cache_ttl_secs = ttl;
        }
        if let Some(stale) = self.stale {
            config.stale_policy = stale.into();
        }
        config
    }

    fn startup(&self) -> StartupOptions {
        match &self.command {
            None => StartupOptions::default(),
            Some(Commands::Blocks { visual }) => StartupOptions {
                screen: Screen::Blocks,
                blocks_query: if *visual { "vsdisp=true".to_string() } else { String::new() },
                ..StartupOptions::default()
            },
            Some(Commands::Report(args)) => StartupOptions {
                screen: Screen::Report,
                report_query: args.to_query(),
                ..StartupOptions::default()
            },
        }
    }
}

/// Application entry point
#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    color_eyre::install()?;

    let cli = Cli::parse();
    let config = cli.config();
    if cli.save_config {
        config.save()?;
    }
    tracing::info!("Using explorer {}", config.base_url);

    let mut app = App::new(config, cli.startup())?;

    let mut terminal = tui::init()?;
    let result = app.run(&mut terminal).await;
    tui::restore()?;
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_flags_build_query() {
        let cli = Cli::parse_from([
            "dcrlens", "report", "--type", "owner", "--name", "jane doe",
        ]);
        let startup = cli.startup();
        assert_eq!(startup.screen, Screen::Report);
        assert_eq!(startup.report_query, "type=owner&name=jane+doe");
    }

    #[test]
    fn test_raw_query_passes_through() {
        let cli = Cli::parse_from(["dcrlens", "report", "--query", "?type=year&time=2021"]);
        assert_eq!(cli.startup().report_query, "type=year&time=2021");
    }

    #[test]
    fn test_query_conflicts_with_flags() {
        let parsed = Cli::try_parse_from([
            "dcrlens", "report", "--query", "type=year", "--type", "month",
        ]);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_blocks_visual_and_global_overrides() {
        let cli = Cli::parse_from([
            "dcrlens",
            "blocks",
            "--visual",
            "--base-url",
            "http://localhost:7777",
            "--stale",
            "keep",
        ]);
        assert_eq!(cli.startup().blocks_query, "vsdisp=true");
        assert_eq!(cli.base_url.as_deref(), Some("http://localhost:7777"));
        assert_eq!(cli.stale.map(StalePolicy::from), Some(StalePolicy::Keep));
    }

    #[test]
    fn test_cli_is_well_formed() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
