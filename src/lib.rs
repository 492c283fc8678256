pub mod cli;
pub mod clients;
pub mod config;
pub mod constants;
pub mod db;
pub mod entities;
pub mod identifiers;
pub mod models;
pub mod services;
pub mod state;
pub mod store;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
pub use config::Config;
pub use state::AppState;

pub async fn run() -> anyhow::Result<()> {
    let config = Config::load()?;
    config.validate()?;

    init_tracing(&config);

    let cli = Cli::parse();
    let Some(command) = cli.command else {
        use clap::CommandFactory;
        Cli::command().print_help()?;
        return Ok(());
    };

    // Commands that do not touch the store.
    match &command {
        Commands::Init => return cli::cmd_init(),
        Commands::HashPassword { password } => {
            return cli::cmd_hash_password(&config, password.clone());
        }
        _ => {}
    }

    let state = AppState::new(config).await?;
    dispatch(&state, command).await
}

fn init_tracing(config: &Config) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.general.log_level));

    let registry = tracing_subscriber::registry().with(env_filter);

    if config.general.log_format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

async fn dispatch(state: &AppState, command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Init => cli::cmd_init(),
        Commands::HashPassword { password } => cli::cmd_hash_password(&state.config, password),
        Commands::Login { username, password } => cli::cmd_login(state, &username, password).await,
        Commands::Logout => cli::cmd_logout(state).await,
        Commands::Whoami => cli::cmd_whoami(state).await,
        Commands::Setup {
            business_name,
            contact_info,
        } => cli::cmd_setup(state, business_name, contact_info).await,
        Commands::Profile(args) => cli::cmd_profile(state, args).await,
        Commands::List(args) => cli::cmd_list(state, args, false).await,
        Commands::Sold(args) => cli::cmd_list(state, args, true).await,
        Commands::Show { serial } => cli::cmd_show(state, &serial).await,
        Commands::Add(args) => cli::cmd_add(state, args).await,
        Commands::BulkAdd { hive, quantity } => cli::cmd_bulk_add(state, hive, quantity).await,
        Commands::Edit(args) => cli::cmd_edit(state, args).await,
        Commands::Sell { serial } => cli::cmd_sell(state, &serial).await,
        Commands::Unsell { serial } => cli::cmd_unsell(state, &serial).await,
        Commands::Delete { serial, yes } => cli::cmd_delete(state, &serial, yes).await,
        Commands::Search { query } => cli::cmd_search(state, &query.join(" ")).await,
        Commands::Stats => cli::cmd_stats(state).await,
        Commands::Scan { token } => cli::cmd_scan(state, &token).await,
        Commands::Qr { serial } => cli::cmd_qr(state, &serial).await,
        Commands::ExportPdf { serials, output } => {
            cli::cmd_export_pdf(state, &serials, &output).await
        }
        Commands::SeedDemo => cli::cmd_seed_demo(state).await,
    }
}
