use clap::Parser;

#[derive(Parser)]
#[command(name = "howld")]
#[command(version)]
#[command(about = "XMPP to webhook relay daemon", long_about = None)]
struct Cli {
    /// Config file path (default: HOWLD_CONFIG_PATH or ~/.howld.yaml)
    #[arg(long, short, value_name = "PATH")]
    config: Option<std::path::PathBuf>,

    /// Set logging to ERROR
    #[arg(long, short)]
    quiet: bool,

    /// Set logging to DEBUG
    #[arg(long, short)]
    debug: bool,

    /// Set logging to TRACE
    #[arg(long, short)]
    verbose: bool,
}

fn log_filter(cli: &Cli) -> &'static str {
    if cli.verbose {
        "trace"
    } else if cli.debug {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "info"
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_filter(&cli)))
        .init();

    // Config problems are reported and end the process before any
    // connection attempt is made.
    let config = match load_and_validate(cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{:#}", e);
            std::process::exit(1);
        }
    };

    match run_relay(config).await {
        Ok(()) => println!("Done"),
        Err(e) => {
            log::error!("{:#}", e);
            std::process::exit(2);
        }
    }
}

fn load_and_validate(
    config_path: Option<std::path::PathBuf>,
) -> anyhow::Result<lib::config::RelayConfig> {
    let (raw, path) = lib::config::load_config(config_path)?;
    Ok(raw.validate(&path)?)
}

#[cfg(feature = "xmpp")]
async fn run_relay(config: lib::config::RelayConfig) -> anyhow::Result<()> {
    log::info!(
        "starting relay as {} with {} webhook target(s)",
        config.jid,
        config.webhooks.len()
    );
    let mut relay = lib::relay::Relay::new(&config);
    xmpp_session::run_session(&config, &mut relay).await?;
    Ok(())
}

#[cfg(not(feature = "xmpp"))]
async fn run_relay(_config: lib::config::RelayConfig) -> anyhow::Result<()> {
    anyhow::bail!("this build has no XMPP support; rebuild with `--features xmpp`")
}
