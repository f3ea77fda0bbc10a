//! Bot runtime: startup, command registration, and the dispatch pipeline.
//!
//! Startup waits for the signal service, checks its version, loads the
//! group directory, resolves registry filters, then starts the pipeline.
//! The whole sequence runs under the supervisor and stops on Ctrl-C.

mod command;
mod context;
mod directory;
mod handle;
mod pipeline;
mod registry;
pub mod resolver;
mod supervisor;
pub mod triggers;

#[cfg(test)]
pub(crate) mod mock;
#[cfg(test)]
mod tests;

pub use command::Command;
pub use context::Context;
pub use directory::{GroupDirectory, GroupIndex};
pub use handle::BotHandle;
pub use pipeline::{Dispatcher, PipelineState, WorkItem, WorkQueue};
pub use registry::{ContactFilter, Entry, GroupFilter, Registry};
pub use resolver::Resolver;
pub use supervisor::{run_supervised, Backoff};
pub use triggers::Predicate;

use pipeline::Shared;
use signalbot_core::{
    config::Config,
    error::SignalError,
    traits::{AttachmentFetcher, Transport},
};
use signalbot_storage::Storage;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Oldest signal-cli-rest-api release with the endpoints used here.
pub const MIN_SERVICE_VERSION: (u64, u64, u64) = (0, 95, 0);

/// A Signal bot bound to one transport.
pub struct Bot {
    config: Config,
    transport: Arc<dyn Transport>,
    directory: Arc<GroupDirectory>,
    registry: Arc<RwLock<Registry>>,
    handle: BotHandle,
    dispatcher: Dispatcher,
}

impl Bot {
    pub fn new<T>(config: Config, transport: Arc<T>, storage: Arc<dyn Storage>) -> Self
    where
        T: Transport + 'static,
    {
        let fetcher: Arc<dyn AttachmentFetcher> = transport.clone();
        let transport: Arc<dyn Transport> = transport;
        let directory = Arc::new(GroupDirectory::new(Arc::clone(&transport)));
        let registry = Arc::new(RwLock::new(Registry::new()));
        let handle = BotHandle::new(
            Arc::clone(&transport),
            Resolver::new(Arc::clone(&directory)),
            storage,
            Arc::clone(&registry),
        );
        let dispatcher = Dispatcher::new(
            Shared {
                transport: Arc::clone(&transport),
                fetcher,
                download_attachments: config.signal.download_attachments,
                directory: Arc::clone(&directory),
                registry: Arc::clone(&registry),
                handle: handle.clone(),
                queue: WorkQueue::new(),
            },
            config.dispatch.clone(),
            config.supervisor.clone(),
        );
        Self {
            config,
            transport,
            directory,
            registry,
            handle,
            dispatcher,
        }
    }

    /// Register a command. Entries are matched in registration order.
    pub async fn register<C>(
        &self,
        mut command: C,
        contacts: ContactFilter,
        groups: GroupFilter,
        predicate: Option<Predicate>,
    ) where
        C: Command + 'static,
    {
        command.setup();
        info!("registered command {}", command.name());
        self.registry
            .write()
            .await
            .register(Arc::new(command), contacts, groups, predicate);
    }

    pub fn handle(&self) -> &BotHandle {
        &self.handle
    }

    pub fn directory(&self) -> &Arc<GroupDirectory> {
        &self.directory
    }

    pub fn registry(&self) -> &Arc<RwLock<Registry>> {
        &self.registry
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Run until Ctrl-C.
    pub async fn run(&self) -> anyhow::Result<()> {
        let shutdown = CancellationToken::new();
        let signal = shutdown.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Received shutdown signal");
                signal.cancel();
            }
        });
        self.run_until(shutdown).await
    }

    /// Start under the supervisor and run until `shutdown` is cancelled.
    pub async fn run_until(&self, shutdown: CancellationToken) -> anyhow::Result<()> {
        info!(
            "{} starting | transport: {}",
            self.config.bot.name,
            self.transport.name()
        );

        let started = run_supervised(
            "startup",
            &shutdown,
            Backoff::from_config(&self.config.supervisor),
            || self.start(&shutdown),
        )
        .await;

        if started.is_some() {
            shutdown.cancelled().await;
        }

        self.dispatcher.stop().await;
        info!("{} stopped", self.config.bot.name);
        Ok(())
    }

    /// One startup attempt: service check, version check, directory load,
    /// filter resolution, pipeline start.
    pub async fn start(&self, shutdown: &CancellationToken) -> Result<(), SignalError> {
        self.wait_for_service(shutdown).await;
        self.check_version().await?;
        self.directory.refresh().await?;
        self.registry.write().await.resolve(&self.directory);
        self.dispatcher.start(shutdown).await;
        Ok(())
    }

    async fn wait_for_service(&self, shutdown: &CancellationToken) {
        let retry = Duration::from_secs(self.config.signal.retry_interval_secs);
        while !self.transport.is_available().await {
            error!("Cannot connect to the signal-cli-rest-api service, retrying");
            tokio::select! {
                _ = shutdown.cancelled() => return,
                _ = tokio::time::sleep(retry) => {}
            }
        }
    }

    async fn check_version(&self) -> Result<(), SignalError> {
        let Some(version) = self.transport.version().await? else {
            warn!("signal service did not report a version");
            return Ok(());
        };
        match parse_version(&version) {
            Some(found) if found >= MIN_SERVICE_VERSION => {
                info!("signal-cli-rest-api version {version}");
                Ok(())
            }
            Some(_) => Err(SignalError::Transport(format!(
                "Incompatible signal-cli-rest-api version, found {version}, minimum required is {}.{}.{}",
                MIN_SERVICE_VERSION.0, MIN_SERVICE_VERSION.1, MIN_SERVICE_VERSION.2
            ))),
            None => {
                warn!("unrecognized signal-cli-rest-api version '{version}'");
                Ok(())
            }
        }
    }
}

/// Parse `major.minor.patch`, ignoring a leading `v` and any suffix after
/// the patch digits (`0.95.0-dev`).
pub fn parse_version(version: &str) -> Option<(u64, u64, u64)> {
    let mut parts = version.trim().trim_start_matches('v').splitn(3, '.');
    let major = parts.next()?.parse().ok()?;
    let minor = parts.next()?.parse().ok()?;
    let patch = match parts.next() {
        Some(rest) => {
            let digits: String = rest.chars().take_while(char::is_ascii_digit).collect();
            digits.parse().ok()?
        }
        None => 0,
    };
    Some((major, minor, patch))
}
