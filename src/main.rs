// src/main.rs - signs in, resolves navigation and exports the reports the user may see
use anyhow::Context;
use std::env;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use labdesk::config::{load_config, Config};
use labdesk::models::Credentials;
use labdesk::reports::{export_document, Dashboard, DocumentFormat, FileSink, PersonalLabReport, TabularDocument};
use labdesk::{ApiClient, Navigation, Platform, Poller, Screen, Session};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration (this calls load_env_file internally)
    let config = load_config()?;
    setup_logging(&config)?;
    config.print_startup_info();

    let api = Arc::new(ApiClient::new(&config.api).context("Failed to build the HTTP client")?);
    let platform: Platform = env::var("LABDESK_PLATFORM")
        .unwrap_or_else(|_| "mobile".to_string())
        .parse()
        .context("LABDESK_PLATFORM must be 'web' or 'mobile'")?;

    let credentials = Credentials::new(
        env::var("LABDESK_EMAIL").context("LABDESK_EMAIL is not set")?,
        env::var("LABDESK_PASSWORD").context("LABDESK_PASSWORD is not set")?,
    );

    let mut session = Session::new();
    if let Err(err) = session.login(api.as_ref(), &credentials).await {
        let alert = err.to_alert("sign in");
        log::error!("❌ {}", alert.message);
        anyhow::bail!(alert.message);
    }

    let navigation = session.navigation(platform);
    if let Navigation::Denied { .. } = navigation {
        let message = navigation.denial_message().unwrap_or_default();
        log::error!("⛔ {}", message);
        session.logout();
        anyhow::bail!(message);
    }
    log::info!("🧭 Navigation: {}", serde_json::to_string(&navigation)?);

    let format: DocumentFormat = config
        .export
        .format
        .parse()
        .with_context(|| format!("Unknown export format: {}", config.export.format))?;
    let sink = FileSink::new(&config.export.output_dir);

    let keep_watching = env::var("LABDESK_WATCH").is_ok();
    if session.authorize(Screen::AdminDashboard, platform).is_ok() {
        let poller = Poller::dashboard(Arc::clone(&api), config.polling.dashboard_interval(), config.api.request_timeout());
        let dashboard = watch(poller, config.polling.dashboard_interval() * 3, keep_watching, |dashboard: &Dashboard| {
            let report = &dashboard.report;
            log::info!(
                "📊 {} users, {} labs, {} equipment, {} loans, {} reservations",
                report.total_users,
                report.total_laboratories,
                report.total_equipment,
                report.total_loans,
                report.total_reservations
            );
        })
        .await?;
        export(&sink, &dashboard.document(), format, "admin_report").await;
    } else if session.authorize(Screen::PersonalReport, platform).is_ok() {
        let poller = Poller::personal_lab_report(
            &session,
            Arc::clone(&api),
            config.polling.report_interval(),
            config.api.request_timeout(),
        )
        .map_err(|err| anyhow::anyhow!(err.to_alert("load your lab report").message))?;
        let report = watch(poller, config.polling.report_interval() * 3, keep_watching, |report: &PersonalLabReport| {
            log::info!("📋 {} reservations on record", report.total_reservations());
        })
        .await?;
        export(&sink, &report.document(), format, "lab_report").await;
    }

    session.logout();
    Ok(())
}

/// Waits for the first value within `deadline`. With `keep_watching` it keeps
/// polling until Ctrl-C. Returns the last displayed value.
async fn watch<T>(
    mut poller: Poller<T>,
    deadline: Duration,
    keep_watching: bool,
    describe: impl Fn(&T),
) -> anyhow::Result<Arc<T>>
where
    T: PartialEq + Send + Sync + 'static,
{
    poller.focus();
    let first = match poller.first_value(deadline).await {
        Ok(value) => value,
        Err(err) => {
            poller.unfocus();
            anyhow::bail!("No data after {:?}: {}", deadline, err);
        }
    };
    describe(&first);

    if keep_watching {
        let mut updates = poller.subscribe();
        let mut alerts = poller.subscribe_alerts();
        loop {
            tokio::select! {
                changed = updates.changed() => {
                    changed.context("Poller stopped")?;
                    if let Some(value) = updates.borrow_and_update().clone() {
                        describe(&value);
                    }
                }
                changed = alerts.changed() => {
                    changed.context("Poller stopped")?;
                    if let Some(alert) = alerts.borrow_and_update().clone() {
                        log::warn!("⚠️  {}", alert.message);
                    }
                }
                _ = tokio::signal::ctrl_c() => {
                    log::info!("🛑 Stopping polling");
                    break;
                }
            }
        }
    }

    poller.unfocus();
    Ok(poller.current().unwrap_or(first))
}

async fn export(sink: &FileSink, document: &TabularDocument, format: DocumentFormat, stem: &str) {
    match export_document(sink, document, format, stem).await {
        Ok(file) => log::info!("📄 Exported {} ({} bytes)", file.path.display(), file.bytes),
        Err(err) => log::error!("❌ {}", err.to_alert("export the report").message),
    }
}

fn setup_logging(config: &Config) -> anyhow::Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| {
            let level = config.logging.level.as_str();
            tracing_subscriber::EnvFilter::new(level)
        });

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    Ok(())
}
