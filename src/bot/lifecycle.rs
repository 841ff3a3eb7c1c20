//! Boot sequence, stop and the run loop.
//!
//! Boot stages run in a fixed order and fire their hook once complete: logger, chat
//! commands, application command reconciliation, events, services, HTTP server and
//! interaction routing. Shutdown and restart both stop services and the HTTP server
//! before the gateway connection is closed; a restart then connects and boots again.

use std::sync::atomic::Ordering;
use std::sync::Arc;

use serenity::all::{Client, GatewayIntents};
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::{
    bot::{handler::Handler, hook::Hook, lock, read, write, Bot, Control},
    error::{BotError, Result},
    gateway::{discord::GuildSet, CommandGateway},
    http::HttpServer,
    logger,
    reconcile::Reconciler,
    service::ServiceRunner,
};

impl Bot {
    /// Runs the boot sequence once per connection.
    ///
    /// Calling it again while booted is a no-op. A failed boot stops whatever it had
    /// started and can be retried.
    ///
    /// # Arguments
    /// - `gateway` - Remote command registry used for reconciliation
    ///
    /// # Returns
    /// - `Ok(())` - Booted, or already booted
    /// - `Err(BotError)` - Fetching remote commands failed, or services or the HTTP
    ///   server could not be started
    pub async fn boot(self: &Arc<Self>, gateway: Arc<dyn CommandGateway>) -> Result<()> {
        if self.flags.booted.swap(true, Ordering::SeqCst) {
            debug!("Boot requested while already booted");
            return Ok(());
        }

        let result = self.boot_stages(gateway).await;
        if result.is_err() {
            self.stop().await;
        }
        result
    }

    async fn boot_stages(self: &Arc<Self>, gateway: Arc<dyn CommandGateway>) -> Result<()> {
        self.hooks.fire(Hook::BeforeBoot, self).await;

        if logger::init(&self.config.log_level) {
            debug!("Installed tracing subscriber");
        }

        self.flags.commands_registered.store(true, Ordering::SeqCst);
        let chat_commands = self.registry().chat_commands().len();
        info!("Registered {} chat command(s)", chat_commands);
        self.hooks.fire(Hook::AfterCommandsRegistered, self).await;

        let local = Reconciler::local_commands(&self.registry())?;
        let report = Reconciler::new(gateway).reconcile(&local).await?;
        info!(
            created = report.created.len(),
            updated = report.updated.len(),
            deleted = report.deleted.len(),
            failed = report.failed.len(),
            "Reconciled {} application command(s)",
            local.len()
        );
        self.wire_application_routes()?;
        self.hooks
            .fire(Hook::AfterApplicationCommandsRegistered, self)
            .await;

        self.flags.events_registered.store(true, Ordering::SeqCst);
        info!("Registered {} event listener(s)", self.listeners().len());
        self.hooks.fire(Hook::AfterEventsRegistered, self).await;

        self.start_services().await?;
        self.hooks.fire(Hook::AfterServicesRegistered, self).await;

        if self.start_http().await? {
            self.hooks.fire(Hook::AfterHttpServerStart, self).await;
        }

        self.flags.interactions_registered.store(true, Ordering::SeqCst);
        self.hooks.fire(Hook::AfterInteractionsRegistered, self).await;

        info!("{} booted", self.config.name);
        self.hooks.fire(Hook::AfterBoot, self).await;

        if self.flags.restarting.swap(false, Ordering::SeqCst) {
            self.hooks.fire(Hook::AfterRestart, self).await;
        }

        Ok(())
    }

    /// Stops services and the HTTP server and stops accepting inbound triggers.
    pub async fn stop(self: &Arc<Self>) {
        self.flags.interactions_registered.store(false, Ordering::SeqCst);
        self.flags.events_registered.store(false, Ordering::SeqCst);
        self.flags.commands_registered.store(false, Ordering::SeqCst);

        if let Err(e) = self.runner.lock().await.stop().await {
            error!("Failed to stop services: {}", e);
        }

        let server = self.http_server.lock().await.take();
        if let Some(server) = server {
            self.hooks.fire(Hook::BeforeHttpServerStop, self).await;
            server.stop().await;
        }

        self.flags.booted.store(false, Ordering::SeqCst);
    }

    /// Connects to Discord and serves until shutdown.
    ///
    /// SIGINT, SIGTERM and `BotHandle::shutdown` end the loop. `BotHandle::restart`
    /// stops everything and reconnects with a fresh client.
    ///
    /// # Returns
    /// - `Ok(())` - Shut down on request
    /// - `Err(BotError::AlreadyRunning)` - Another `run` is in progress
    /// - `Err(BotError::BootAborted)` - The boot sequence failed
    /// - `Err(BotError)` - The client could not be built or the gateway failed
    pub async fn run(self: Arc<Self>) -> Result<()> {
        let mut control = lock(&self.control_rx)
            .take()
            .ok_or(BotError::AlreadyRunning)?;

        let result = self.run_loop(&mut control).await;
        *lock(&self.control_rx) = Some(control);

        result
    }

    async fn run_loop(self: &Arc<Self>, control: &mut mpsc::UnboundedReceiver<Control>) -> Result<()> {
        loop {
            let guilds = GuildSet::default();
            let mut client = Client::builder(&self.config.discord_token, intents())
                .event_handler(Handler::new(self.clone(), guilds))
                .await?;
            let shard_manager = client.shard_manager.clone();

            info!("Connecting {} to Discord", self.config.name);
            let mut gateway = tokio::spawn(async move { client.start().await });

            let request = tokio::select! {
                request = control.recv() => request.unwrap_or(Control::Shutdown),
                _ = shutdown_signal() => {
                    info!("Shutdown signal received");
                    Control::Shutdown
                }
                result = &mut gateway => {
                    self.stop().await;
                    return match result {
                        Ok(Ok(())) => Ok(()),
                        Ok(Err(e)) => Err(e.into()),
                        Err(e) => Err(e.into()),
                    };
                }
            };

            match &request {
                Control::Shutdown => self.hooks.fire(Hook::BeforeShutdown, self).await,
                Control::Restart => self.hooks.fire(Hook::BeforeRestart, self).await,
                Control::Abort(reason) => error!("Aborting: {}", reason),
            }

            self.stop().await;
            shard_manager.shutdown_all().await;
            match gateway.await {
                Ok(Err(e)) => error!("Gateway closed with error: {}", e),
                Err(e) => error!("Gateway task failed: {}", e),
                Ok(Ok(())) => debug!("Gateway closed"),
            }

            match request {
                Control::Shutdown => {
                    info!("{} shut down", self.config.name);
                    return Ok(());
                }
                Control::Restart => {
                    info!("Restarting {}", self.config.name);
                    self.flags.restarting.store(true, Ordering::SeqCst);
                }
                Control::Abort(reason) => return Err(BotError::BootAborted(reason)),
            }
        }
    }

    fn wire_application_routes(&self) -> Result<()> {
        if self.flags.routes_wired.load(Ordering::SeqCst) {
            return Ok(());
        }

        let routes = self.registry().application_routes();
        let mut router = write(&self.router);
        for route in routes {
            router.add(route)?;
        }
        self.flags.routes_wired.store(true, Ordering::SeqCst);

        Ok(())
    }

    async fn start_services(self: &Arc<Self>) -> Result<()> {
        let services = lock(&self.services).clone();
        let mut runner = self.runner.lock().await;

        *runner = ServiceRunner::new();
        for service in services {
            runner.add(service);
        }

        runner.start(self.clone()).await
    }

    /// # Returns
    /// - `Ok(true)` - The server is listening
    /// - `Ok(false)` - No address or no routes, nothing to serve
    async fn start_http(&self) -> Result<bool> {
        let Some(address) = self.config.http_address else {
            return Ok(false);
        };
        let router = read(&self.http_router).clone();
        let Some(router) = router else {
            debug!("HTTP address configured without routes, not serving");
            return Ok(false);
        };

        let server = HttpServer::start(address, router).await?;
        *self.http_server.lock().await = Some(server);

        Ok(true)
    }
}

fn intents() -> GatewayIntents {
    GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::DIRECT_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for ctrl-c: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
