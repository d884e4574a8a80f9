use anyhow::Result;
use clap::Parser;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info};

mod browser;
mod config;
mod discord;
mod errors;
mod extractor;
mod models;
mod odds_scout;
mod orchestrator;
mod output;
mod progress;
mod session;
mod stealth;
mod targets;
mod traits;

#[cfg(test)]
mod test_support;

use config::Settings;
use odds_scout::OddsScout;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let settings = Settings::parse();
    info!("Starting odds scraper");

    let schedule = settings.schedule.clone();
    let scout = OddsScout::new(settings);

    let Some(schedule) = schedule else {
        if let Err(e) = scout.run_once().await {
            error!("Critical error in scraping process: {:#}", e);
            return Err(e);
        }
        return Ok(());
    };

    // Run once immediately, then on the schedule
    if let Err(e) = scout.run_once().await {
        error!("Error during initial run: {:#}", e);
    }

    let sched = JobScheduler::new().await?;

    let job_scout = scout.clone();
    sched
        .add(Job::new_async(schedule.as_str(), move |_uuid, _l| {
            let scout = job_scout.clone();
            Box::pin(async move {
                if let Err(e) = scout.run_once().await {
                    error!("Error during scheduled run: {:#}", e);
                }
            })
        })?)
        .await?;

    info!("Scheduler started - scraping on \"{}\"", schedule);
    sched.start().await?;

    // Keep the program running
    loop {
        tokio::time::sleep(tokio::time::Duration::from_secs(30)).await;
    }
}
