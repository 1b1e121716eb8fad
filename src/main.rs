use modlinker::bot::{Bot, ConsolePoster, JsonLinesStream};
use modlinker::catalog::{CatalogSearch, SteamWorkshop, WorkshopLinks};
use modlinker::cli::{Cli, Commands, ConfigAction};
use modlinker::config::{expand_tilde, Config, ConfigValidator};
use modlinker::error::{ModlinkerError, Result};
use modlinker::patterns::PatternRegistry;
use modlinker::reply::{ReplyAssembler, ResultFormatter};
use modlinker::request::{ItemKind, RequestFactory, RequestSummary, SearchRequest, TagResolver};
use modlinker::storage::Database;
use std::collections::VecDeque;
use std::path::PathBuf;
use tokio::io::BufReader;

fn main() -> Result<()> {
    let cli = Cli::parse_args();

    init_logging(cli.verbose);

    match cli.command {
        Commands::Parse { text, json } => {
            cmd_parse(cli.config, &text, json)?;
        }
        Commands::Search {
            query,
            count,
            scenario,
            version,
            json,
        } => {
            cmd_search(cli.config, &query, count, scenario, version, json)?;
        }
        Commands::Reply { text } => {
            cmd_reply(cli.config, &text)?;
        }
        Commands::Run { input } => {
            cmd_run(cli.config, input)?;
        }
        Commands::Stats { top } => {
            cmd_stats(cli.config, top)?;
        }
        Commands::Config { action } => {
            cmd_config(cli.config, action)?;
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default = if verbose {
        "modlinker=debug"
    } else {
        "modlinker=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Runtime::new().map_err(|e| ModlinkerError::Io {
        source: e,
        context: "Failed to create tokio runtime".to_string(),
    })
}

fn factory(config: &Config) -> Result<RequestFactory> {
    Ok(RequestFactory::new(
        PatternRegistry::builtin()?,
        TagResolver::new(config.linker.current_version.clone()),
        config.linker.max_results,
    ))
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).map_err(|e| ModlinkerError::Json {
        source: e,
        context: "Failed to serialize output".to_string(),
    })
}

fn cmd_parse(config_path: Option<PathBuf>, text: &str, json: bool) -> Result<()> {
    let config = load_config(config_path)?;
    let requests = factory(&config)?.parse(text);

    if json {
        let summaries: Vec<RequestSummary> = requests.iter().map(RequestSummary::from).collect();
        println!("{}", to_json(&summaries)?);
        return Ok(());
    }

    if requests.is_empty() {
        println!("No requests found");
        return Ok(());
    }

    for request in &requests {
        println!("{}", request);
    }

    Ok(())
}

fn cmd_search(
    config_path: Option<PathBuf>,
    query: &str,
    count: usize,
    scenario: bool,
    version: Option<String>,
    json: bool,
) -> Result<()> {
    let config = load_config(config_path)?;
    let resolver = TagResolver::new(config.linker.current_version.clone());

    let tag = match version.as_deref() {
        Some(v) if v.contains('.') => resolver.resolve(None, Some(v)),
        Some(v) => resolver.resolve(Some(v), None),
        None => resolver.current(),
    };
    let kind = if scenario {
        ItemKind::Scenario
    } else {
        ItemKind::Mod
    };

    let request = SearchRequest::new(kind, query, tag, count, config.linker.max_results)
        .ok_or_else(|| ModlinkerError::Config("Search query is empty".to_string()))?;

    let catalog = SteamWorkshop::from_config(&config.catalog)?;
    let results = runtime()?.block_on(catalog.search(&request))?;

    if json {
        println!("{}", to_json(&results)?);
        return Ok(());
    }

    println!("{}", request);
    if results.is_empty() {
        println!("No results");
    }
    for (idx, result) in results.iter().enumerate() {
        let alpha = result.display_alpha.as_deref().unwrap_or("-");
        println!("  {}. [{}] {} by {}", idx + 1, alpha, result.title, result.author_name);
        println!("     {}", result.url);
    }

    Ok(())
}

fn cmd_reply(config_path: Option<PathBuf>, text: &str) -> Result<()> {
    let config = load_config(config_path)?;
    let requests = factory(&config)?.parse(text);

    if requests.is_empty() {
        println!("No requests found");
        return Ok(());
    }

    let catalog = SteamWorkshop::from_config(&config.catalog)?;
    let formatter = ResultFormatter::new(WorkshopLinks::from_config(&config.catalog));
    let assembler = ReplyAssembler::new(config.linker.max_length, config.linker.footer.clone());

    let mut blocks = VecDeque::with_capacity(requests.len());
    runtime()?.block_on(async {
        for request in &requests {
            tracing::info!("{}", request);
            match catalog.search(request).await {
                Ok(results) => blocks.push_back(formatter.format(request, &results)?),
                Err(e) => tracing::error!("Search failed for '{}': {}", request.query(), e),
            }
        }
        Ok::<_, ModlinkerError>(())
    })?;

    let messages = assembler.assemble(&mut blocks);
    for (idx, message) in messages.iter().enumerate() {
        println!("--- message {}/{} ---", idx + 1, messages.len());
        println!("{}", message);
    }

    Ok(())
}

fn cmd_run(config_path: Option<PathBuf>, input: Option<PathBuf>) -> Result<()> {
    let config = load_config(config_path)?;
    let database = Database::new(&expand_tilde(&config.storage.database))?;
    let catalog = SteamWorkshop::from_config(&config.catalog)?;
    let poster = ConsolePoster::new(tokio::io::stdout());
    let bot = Bot::new(&config, catalog, poster, database)?;

    runtime()?.block_on(async {
        let stats = match input {
            Some(path) => {
                let file = tokio::fs::File::open(&path)
                    .await
                    .map_err(|e| ModlinkerError::Io {
                        source: e,
                        context: format!("Failed to open comment file: {:?}", path),
                    })?;
                bot.run(JsonLinesStream::new(BufReader::new(file))).await?
            }
            None => {
                bot.run(JsonLinesStream::new(BufReader::new(tokio::io::stdin())))
                    .await?
            }
        };

        eprintln!(
            "✓ Handled {} comments ({} replied, {} errors)",
            stats.comments, stats.replied, stats.errors
        );
        Ok(())
    })
}

fn cmd_stats(config_path: Option<PathBuf>, top: usize) -> Result<()> {
    let config = load_config(config_path)?;
    let path = expand_tilde(&config.storage.database);
    let database = Database::new(&path)?;
    let stats = database.stats()?;

    println!("Modlinker Analytics");
    println!("===================");
    println!("Database: {}", path.display());
    println!("\nResults linked:  {}", stats.request_count);
    println!("Patterns used:   {}", stats.pattern_count);
    println!("Replies posted:  {}", stats.post_count);
    println!("Redditors:       {}", stats.redditor_count);

    let top_results = database.top_results(top)?;
    if !top_results.is_empty() {
        println!("\nMost requested:");
        for (title, hits) in top_results {
            println!("  {:>4}  {}", hits, title);
        }
    }

    Ok(())
}

fn cmd_config(config_path: Option<PathBuf>, action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let config = load_config(config_path)?;
            println!("{}", to_json(&config)?);
        }
        ConfigAction::Validate { file } => {
            let path = match file.or(config_path) {
                Some(path) => path,
                None => Config::default_path()?,
            };
            let config = Config::load(&path)?;
            println!("✓ Configuration is valid");
            println!("  Schema version: {}", config.meta.schema_version);
        }
        ConfigAction::Init { force } => {
            let path = match config_path {
                Some(path) => path,
                None => Config::default_path()?,
            };

            if path.exists() && !force {
                println!("Configuration file already exists at: {}", path.display());
                println!("Use --force to overwrite");
                return Ok(());
            }

            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).map_err(|e| ModlinkerError::Io {
                    source: e,
                    context: format!("Failed to create config directory: {:?}", parent),
                })?;
            }

            Config::default().save(&path)?;

            println!("✓ Configuration initialized at: {}", path.display());
        }
    }

    Ok(())
}

fn load_config(config_path: Option<PathBuf>) -> Result<Config> {
    let path = match config_path {
        Some(path) => path,
        None => Config::default_path()?,
    };

    if !path.exists() {
        tracing::warn!(
            "Config file not found, using defaults. Run 'modlinker config init' to create one."
        );
        let mut config = Config::default();
        config.apply_env_overrides();
        ConfigValidator::validate(&config)?;
        return Ok(config);
    }

    Config::load(&path)
}
