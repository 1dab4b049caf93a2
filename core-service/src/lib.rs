//! Core service façade and bootstrap helpers.
//!
//! This crate wires a host-provided command bridge into the media core.
//! Desktop hosts and tests typically enable the `desktop-shims` feature
//! (which depends on `bridge-desktop`) and hand over an async
//! [`NativeExecutor`](bridge_traits::NativeExecutor); mobile shells inject
//! their own [`CommandBridge`](bridge_traits::CommandBridge) through
//! [`CoreConfig`].

pub mod error;

pub use error::{CoreError, Result};

pub use core_media::{
    MediaConfig, MediaFailure, MediaHandle, MediaPlugin, PlayOptions, PlaybackState, PlayerKind,
};
pub use core_runtime::config::{CoreConfig, HostPlatform};
pub use core_runtime::logging::{LogFormat, LoggingConfig};

use core_runtime::events::{EventBus, EventStream};
use core_runtime::logging::init_logging;
use std::sync::Arc;
use tracing::info;

/// Primary façade exposed to host applications.
#[derive(Clone)]
pub struct MediaService {
    core: CoreConfig,
    plugin: Arc<MediaPlugin>,
}

impl MediaService {
    /// Create a new service from an already validated host configuration.
    pub fn new(core: CoreConfig, media: MediaConfig) -> Result<Self> {
        let plugin = MediaPlugin::new(&core, media)?;
        info!(platform = %core.platform, "Media service ready");
        Ok(Self {
            core,
            plugin: Arc::new(plugin),
        })
    }

    /// Like [`MediaService::new`], installing the global tracing subscriber
    /// first. Only one subscriber can exist per process.
    pub fn with_logging(
        core: CoreConfig,
        media: MediaConfig,
        logging: LoggingConfig,
    ) -> Result<Self> {
        init_logging(logging).map_err(|err| CoreError::InitializationFailed(err.to_string()))?;
        Self::new(core, media)
    }

    pub fn plugin(&self) -> &Arc<MediaPlugin> {
        &self.plugin
    }

    pub fn config(&self) -> &CoreConfig {
        &self.core
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.core.event_bus
    }

    /// Stream of media and channel events published from now on.
    pub fn events(&self) -> EventStream {
        EventStream::new(self.core.event_bus.subscribe())
    }

    /// Forward the host's platform-ready signal to the plugin.
    pub fn platform_ready(&self) {
        self.plugin.on_platform_ready();
    }

    /// Resolves once the status channel is usable.
    pub async fn ready(&self) {
        self.plugin.wait_until_ready().await;
    }
}

impl std::fmt::Debug for MediaService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaService")
            .field("core", &self.core)
            .field("plugin", &self.plugin)
            .finish()
    }
}

/// Convenience bootstrapper for desktop hosts and tests.
///
/// Wraps `executor` in an [`AsyncCommandBridge`](bridge_desktop::AsyncCommandBridge)
/// on the current Tokio runtime.
///
/// ```ignore
/// use core_service::{bootstrap_desktop, HostPlatform, MediaConfig};
///
/// let service = bootstrap_desktop(executor, HostPlatform::Desktop, MediaConfig::default())?;
/// service.platform_ready();
/// let media = service.plugin().handle("beep.wav", || {}).create();
/// media.play(None);
/// ```
#[cfg(all(feature = "desktop-shims", not(target_arch = "wasm32")))]
pub fn bootstrap_desktop(
    executor: Arc<dyn bridge_traits::NativeExecutor>,
    platform: HostPlatform,
    media: MediaConfig,
) -> Result<MediaService> {
    let bridge = bridge_desktop::AsyncCommandBridge::new(executor)?;
    let core = CoreConfig::builder()
        .command_bridge(Arc::new(bridge))
        .platform(platform)
        .build()?;
    MediaService::new(core, media)
}
