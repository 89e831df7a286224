use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use todo_board::cli::{self, Cli};
use todo_board::config::Config;
use todo_board::infrastructure::{db, seed};
use todo_board::services::BoardSession;
use todo_board::store::{SqliteTodoStore, UserScope};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    let filter = if args.debug {
        tracing_subscriber::EnvFilter::new("debug")
    } else {
        tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,todo_board=debug".into()),
        )
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = Config::from_env()?;

    let pool = db::init_db(&config.database_url).await?;
    let user_id = seed::seed_user(&pool, &config.user_name).await?;

    let store = SqliteTodoStore::new(pool);
    let mut session = BoardSession::new(store, UserScope::new(user_id), config.session_options());
    session.load().await?;

    let output = cli::run(&mut session, args.command).await?;
    print!("{}", output);

    Ok(())
}
