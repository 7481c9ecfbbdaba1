use anyhow::Context;
use clap::Parser;
use pokedex_browser::config::toml_config::TomlConfig;
use pokedex_browser::core::ConfigProvider;
use pokedex_browser::utils::{logger, validation::Validate};
use pokedex_browser::{Browser, PageRequest};

#[derive(Parser)]
#[command(name = "toml-browse")]
#[command(about = "Browse Pokémon with settings from a TOML configuration file")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "pokedex.toml")]
    config: String,

    /// Browse path such as `pokemon/fire/flying`
    #[arg(default_value = "pokemon")]
    path: String,

    /// Page number
    #[arg(short, long, allow_hyphen_values = true)]
    page: Option<String>,

    /// List the available types instead of a page
    #[arg(long)]
    list_types: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Show the effective configuration without contacting the upstream
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = TomlConfig::from_file(&args.config)
        .with_context(|| format!("failed to load config file '{}'", args.config))?;

    let verbose = args.verbose || config.logging.verbose;
    if config.json_logs() {
        logger::init_json_logger(verbose);
    } else {
        logger::init_cli_logger(verbose);
    }

    tracing::info!("📁 Loaded configuration from: {}", args.config);

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(e.severity().exit_code());
    }

    let request = PageRequest::from_path(&args.path, args.page.as_deref())
        .context("invalid browse request")?;

    if args.dry_run {
        display_config_summary(&config, &request);
        return Ok(());
    }

    let browser = Browser::from_config(&config, config.output_format()?)?;

    let output = if args.list_types {
        browser.render_types().await?
    } else {
        browser.render_page(&request).await?
    };
    println!("{}", output);

    Ok(())
}

fn display_config_summary(config: &TomlConfig, request: &PageRequest) {
    println!("📋 Configuration Summary:");
    println!("  Upstream: {}", config.api_base_url());
    println!("  Timeout: {:?}", config.request_timeout());
    println!("  User-Agent: {}", config.user_agent());
    println!("  Page Size: {}", config.page_size());
    println!("  Concurrent Requests: {}", config.concurrent_requests());
    println!("  Output Format: {}", config.output.format);
    println!(
        "  Filters: {}",
        if request.filters.is_empty() {
            "(none)".to_string()
        } else {
            request
                .filters
                .types()
                .iter()
                .map(|t| t.as_str())
                .collect::<Vec<_>>()
                .join(" + ")
        }
    );
    println!("  Page: {}", request.page);
}
