use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use remedi_app::cli::{Cli, Command, instant_or_now, parse_instant};
use remedi_app::outbox::OutboxDispatcher;
use remedi_app::scheduler::run_until;
use remedi_app::store::{load_store, save_store};
use remedi_core::config::load_config;
use remedi_recurrence::recurrence::{RecurrenceEngine, parse_timezone};
use remedi_service::calendar::CalendarService;
use remedi_service::dashboard::DashboardService;
use remedi_service::medication_log::MedicationLogService;
use remedi_service::reminder::{ReminderDispatcher, ReminderOptions};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, reload, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let (filter_layer, filter_handle) = reload::Layer::new(EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true),
        )
        .init();

    let cli = Cli::parse();
    let config = load_config()?;

    tracing::debug!(config = ?config, "Configuration loaded");

    if let Ok(filter) = EnvFilter::try_new(config.logging.level.as_str()) {
        if let Err(e) = filter_handle.modify(|current| *current = filter) {
            tracing::warn!(error = %e, "Failed to update log filter from config");
        }
    } else {
        tracing::warn!(level = %config.logging.level, "Invalid log level in config, keeping info");
    }

    // Fail at startup rather than on every user without a zone
    parse_timezone(&config.reminders.default_timezone)?;

    let data_path = cli
        .data
        .unwrap_or_else(|| PathBuf::from(&config.storage.data_path));
    let outbox_path = cli
        .outbox
        .unwrap_or_else(|| PathBuf::from(&config.storage.outbox_path));
    let store = Arc::new(load_store(&data_path).await?);
    let options = ReminderOptions::from(&config.reminders);
    let engine = RecurrenceEngine::new(options.engine);

    match cli.command {
        Command::Serve => {
            let outbox = Arc::new(OutboxDispatcher::open(&outbox_path).await?);
            let dispatcher = ReminderDispatcher::new(store, outbox, options);

            tracing::info!(outbox = %outbox_path.display(), "Starting ReMedi reminder scheduler");
            run_until(&dispatcher, async {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    tracing::error!(error = %e, "Failed to listen for shutdown signal");
                }
            })
            .await;
        }
        Command::SendReminders { user, date } => {
            let now = instant_or_now(date.as_deref())?;
            let outbox = Arc::new(OutboxDispatcher::open(&outbox_path).await?);
            let dispatcher = ReminderDispatcher::new(store, outbox, options);

            tracing::info!(at = %now, user = ?user, "Checking for due medication reminders");
            let summary = dispatcher.run_tick(now, user).await?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Command::Calendar { user, from, to } => {
            let from = parse_instant(&from)?;
            let to = parse_instant(&to)?;
            let service = CalendarService::new(store, engine, options.default_timezone);

            let events = service.events_for_range(user, from, to).await?;
            println!("{}", serde_json::to_string_pretty(&events)?);
        }
        Command::Dashboard { user, date } => {
            let now = instant_or_now(date.as_deref())?;
            let service = DashboardService::new(store, engine, options.default_timezone);

            let summary = service.summary(user, now).await?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Command::Log {
            user,
            reminder,
            status,
            date,
        } => {
            let now = instant_or_now(date.as_deref())?;
            let outbox = Arc::new(OutboxDispatcher::open(&outbox_path).await?);
            let service = MedicationLogService::new(Arc::clone(&store), outbox);

            let log = service
                .record_action(user, &reminder, status.into(), now)
                .await?;
            save_store(&data_path, &store).await?;
            println!("{}", serde_json::to_string_pretty(&log)?);
        }
    }

    Ok(())
}
