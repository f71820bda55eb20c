use anyhow::Context;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use mpf_cli::{output, CliConfig, Page};
use mpf_schema::SchemaResolver;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn snapshot_arg() -> Arg {
    Arg::new("snapshot")
        .long("snapshot")
        .value_parser(value_parser!(PathBuf))
        .help("Page document ({groups, change_history}) to load")
}

fn cli() -> Command {
    Command::new("mpf")
        .version(mpf_cli::VERSION)
        .about("Migration project form engine")
        .subcommand_required(true)
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("TOML configuration file"),
        )
        .arg(
            Arg::new("registry-url")
                .long("registry-url")
                .global(true)
                .help("Schema registry origin"),
        )
        .arg(
            Arg::new("registry-file")
                .long("registry-file")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("JSON table fixture used instead of the HTTP registry"),
        )
        .arg(
            Arg::new("log-json")
                .long("log-json")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Emit logs as JSON lines"),
        )
        .subcommand(
            Command::new("render")
                .about("Print the rendered form and hints")
                .arg(snapshot_arg())
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Output as JSON"),
                ),
        )
        .subcommand(
            Command::new("fields")
                .about("Print submission fields, one name=value per line")
                .arg(snapshot_arg()),
        )
        .subcommand(
            Command::new("serialize")
                .about("Print the re-serialized page document")
                .arg(snapshot_arg()),
        )
        .subcommand(
            Command::new("ledger")
                .about("Print the change history and current version")
                .arg(snapshot_arg()),
        )
        .subcommand(Command::new("options").about("List object-type selector options"))
        .subcommand(
            Command::new("resolve")
                .about("Classify a type token and print its fields")
                .arg(Arg::new("type").required(true).help("Object type token")),
        )
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn load_config(matches: &ArgMatches) -> anyhow::Result<CliConfig> {
    let mut config = CliConfig::load_or_default(matches.get_one::<PathBuf>("config").map(PathBuf::as_path))?;
    if let Some(url) = matches.get_one::<String>("registry-url") {
        config = config.with_registry_url(url.clone());
    }
    if let Some(path) = matches.get_one::<PathBuf>("registry-file") {
        config = config.with_registry_fixture(path.clone());
    }
    Ok(config)
}

async fn load_page(resolver: Arc<SchemaResolver>, args: &ArgMatches) -> anyhow::Result<Page> {
    let raw = match args.get_one::<PathBuf>("snapshot") {
        Some(path) => Some(
            std::fs::read_to_string(path).with_context(|| format!("reading snapshot {}", path.display()))?,
        ),
        None => None,
    };
    let (page, _) = Page::bootstrap(resolver, raw.as_deref()).await;
    Ok(page)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let matches = cli().get_matches();
    init_tracing(matches.get_flag("log-json"));

    let config = load_config(&matches)?;
    let registry = config.build_registry()?;
    let resolver = Arc::new(SchemaResolver::with_config(registry, config.resolver.clone()));

    let out = match matches.subcommand() {
        Some(("render", args)) => {
            let page = load_page(resolver, args).await?;
            if args.get_flag("json") {
                output::render_json(&page)?
            } else {
                output::render_text(&page)
            }
        }
        Some(("fields", args)) => output::fields_text(&load_page(resolver, args).await?),
        Some(("serialize", args)) => output::serialize_json(&load_page(resolver, args).await?)?,
        Some(("ledger", args)) => output::ledger_text(&load_page(resolver, args).await?),
        Some(("options", _)) => output::options_text(&resolver).await,
        Some(("resolve", args)) => {
            let token = args.get_one::<String>("type").map(String::as_str).unwrap_or_default();
            output::resolve_text(&resolver, token).await
        }
        _ => String::new(),
    };

    print!("{out}");
    Ok(())
}
