//! Creates reminder notifications for quotations and invoices that fall due
//! soon. Meant to be scheduled, e.g. hourly from cron; each document is
//! reminded at most once per day however often it runs.

use std::env;

use chrono::Utc;
use dotenvy::dotenv;

use opsdesk::db::establish_connection_pool;
use opsdesk::models::config::ServerConfig;
use opsdesk::repository::DieselRepository;
use opsdesk::services::reminders::create_due_reminders;

fn main() {
    dotenv().ok(); // Load .env file
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    // Select config profile (defaults to `local`).
    let app_env = env::var("APP_ENV").unwrap_or_else(|_| "local".into());

    let server_config = match ServerConfig::load(&app_env) {
        Ok(server_config) => server_config,
        Err(err) => {
            log::error!("Error loading server config: {err}");
            std::process::exit(1);
        }
    };

    let pool = match establish_connection_pool(&server_config.database_url) {
        Ok(pool) => pool,
        Err(e) => {
            log::error!("Failed to establish database connection: {e}");
            std::process::exit(1);
        }
    };

    let repo = DieselRepository::new(pool);
    let now = Utc::now().naive_utc();

    match create_due_reminders(&repo, now, server_config.reminder_days) {
        Ok(created) => log::info!("Created {created} due date reminders"),
        Err(err) => {
            log::error!("Failed to create due date reminders: {err}");
            std::process::exit(1);
        }
    }
}
