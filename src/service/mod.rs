//! Periodic background services.
//!
//! Each service runs on a fixed interval through a `tokio-cron-scheduler` job. Eager
//! services also run once as soon as they are booted. Stopping the runner shuts the
//! scheduler down, cancelling every pending run.

use std::sync::Arc;
use std::time::Duration;

use serenity::async_trait;
use tokio::task::JoinHandle;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info};

use crate::{bot::Bot, error::Result};

#[async_trait]
pub trait Service: Send + Sync {
    fn name(&self) -> &str;

    fn interval(&self) -> Duration;

    /// Run once immediately at boot in addition to the interval.
    fn eager(&self) -> bool {
        false
    }

    async fn handle(&self, bot: Arc<Bot>) -> Result<()>;
}

#[derive(Default)]
pub struct ServiceRunner {
    services: Vec<Arc<dyn Service>>,
    scheduler: Option<JobScheduler>,
    eager_runs: Vec<JoinHandle<()>>,
}

impl ServiceRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, service: Arc<dyn Service>) {
        self.services.push(service);
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }

    pub fn is_running(&self) -> bool {
        self.scheduler.is_some()
    }

    /// Schedules every service and starts the scheduler.
    ///
    /// A no-op when already running or when no services were added.
    ///
    /// # Arguments
    /// - `bot` - Handed to every service run
    ///
    /// # Returns
    /// - `Ok(())` - Scheduler started
    /// - `Err(BotError::SchedulerErr)` - Job creation or scheduler start failed
    pub async fn start(&mut self, bot: Arc<Bot>) -> Result<()> {
        if self.is_running() || self.services.is_empty() {
            return Ok(());
        }

        let scheduler = JobScheduler::new().await?;

        for service in &self.services {
            let job_service = service.clone();
            let job_bot = bot.clone();

            let job = Job::new_repeated_async(service.interval(), move |_uuid, _lock| {
                let service = job_service.clone();
                let bot = job_bot.clone();

                Box::pin(async move {
                    run_service(service, bot).await;
                })
            })?;
            scheduler.add(job).await?;

            if service.eager() {
                self.eager_runs
                    .push(tokio::spawn(run_service(service.clone(), bot.clone())));
            }
        }

        scheduler.start().await?;
        self.scheduler = Some(scheduler);

        info!("Started {} service(s)", self.services.len());

        Ok(())
    }

    /// Shuts the scheduler down and cancels eager runs still in flight.
    pub async fn stop(&mut self) -> Result<()> {
        for run in self.eager_runs.drain(..) {
            run.abort();
        }

        if let Some(mut scheduler) = self.scheduler.take() {
            scheduler.shutdown().await?;
            info!("Stopped {} service(s)", self.services.len());
        }

        Ok(())
    }
}

async fn run_service(service: Arc<dyn Service>, bot: Arc<Bot>) {
    if let Err(e) = service.handle(bot).await {
        error!("Service '{}' failed: {}", service.name(), e);
    }
}
