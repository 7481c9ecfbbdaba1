use clap::Parser;
use pokedex_browser::utils::error::PokedexError;
use pokedex_browser::utils::{logger, validation::Validate};
use pokedex_browser::{Browser, CliConfig, OutputFormat, PageRequest};

fn fail(e: &PokedexError) -> ! {
    tracing::error!(
        "❌ Request failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());
    std::process::exit(e.severity().exit_code());
}

#[tokio::main]
async fn main() {
    let config = CliConfig::parse();

    if config.json_logs {
        logger::init_json_logger(config.verbose);
    } else {
        logger::init_cli_logger(config.verbose);
    }

    tracing::debug!("CLI config: {:?}", config);

    if let Err(e) = config.validate() {
        fail(&e);
    }

    let format: OutputFormat = match config.format.parse() {
        Ok(format) => format,
        Err(e) => fail(&e),
    };

    let browser = match Browser::from_config(&config, format) {
        Ok(browser) => browser,
        Err(e) => fail(&e),
    };

    let rendered = if config.list_types {
        browser.render_types().await
    } else {
        // 超過兩個類型在進入引擎前就拒絕
        match PageRequest::from_parts(&config.types, config.page.as_deref()) {
            Ok(request) => browser.render_page(&request).await,
            Err(e) => Err(e),
        }
    };

    match rendered {
        Ok(output) => println!("{}", output),
        Err(e) => fail(&e),
    }
}
