// Entrypoint for the CLI application.
// - Keeps `main` small: read settings, build the API client and the store,
//   and hand them to the session loop.
// - Returns `anyhow::Result` so startup failures print with context.

use anyhow::Context;
use smsact_cli::store::{ConfigStore, EnvFile};
use smsact_cli::ui::Terminal;
use smsact_cli::{ApiClient, Session, Settings};

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let settings = Settings::from_env();
    let api = ApiClient::from_settings(&settings).context("Failed to build HTTP client")?;
    let store = ConfigStore::new(EnvFile::new(&settings.env_file));

    // Runs until the user picks "Exit" or the terminal goes away.
    let mut session = Session::new(api, store, Terminal::new(), settings.names_dir.clone())
        .overlay(|key| std::env::var(key).ok());
    session.run().context("Terminal session ended unexpectedly")?;
    Ok(())
}
