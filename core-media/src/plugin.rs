//! # Media Plugin
//!
//! Context object owning everything the media core shares between handles:
//! the registry, the status dispatcher, the inbound router and, on platforms
//! that need it, the readiness gate.
//!
//! ## Usage
//!
//! ```ignore
//! use core_media::{MediaConfig, MediaPlugin, PlayerKind};
//!
//! let plugin = MediaPlugin::new(&core_config, MediaConfig::default())?;
//! plugin.on_platform_ready();
//!
//! let media = plugin
//!     .handle("/android_asset/www/beep.wav", || println!("done"))
//!     .on_error(|failure| eprintln!("media error {:?}", failure.code()))
//!     .on_status_change(|state| println!("state {}", state))
//!     .create();
//!
//! media.play(None);
//! ```

use crate::callbacks::MediaCallbacks;
use crate::config::MediaConfig;
use crate::dispatcher::StatusDispatcher;
use crate::error::Result;
use crate::handle::MediaHandle;
use crate::readiness::ReadinessGate;
use crate::registry::MediaRegistry;
use crate::router::MessageRouter;
use crate::state::PlayerKind;
use crate::status::MediaFailure;
use bridge_traits::{CommandBridge, NativeCommand};
use core_runtime::config::{CoreConfig, HostPlatform};
use core_runtime::events::{ChannelEvent, CoreEvent, EventBus};
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

/// Action opening the perpetual status subscription.
pub const MESSAGE_CHANNEL_ACTION: &str = "messageChannel";

pub struct MediaPlugin {
    config: MediaConfig,
    platform: HostPlatform,
    bridge: Arc<dyn CommandBridge>,
    event_bus: EventBus,
    registry: Arc<MediaRegistry>,
    dispatcher: Arc<StatusDispatcher>,
    router: Arc<MessageRouter>,
    gate: Option<ReadinessGate>,
}

impl MediaPlugin {
    /// Wires the plugin from the host configuration.
    ///
    /// The readiness gate only exists when the platform requires the status
    /// channel to be opened explicitly.
    pub fn new(core: &CoreConfig, config: MediaConfig) -> Result<Self> {
        config.validate()?;

        let registry = Arc::new(MediaRegistry::new());
        let dispatcher = Arc::new(
            StatusDispatcher::new(Arc::clone(&registry)).with_event_bus(core.event_bus.clone()),
        );
        let router = Arc::new(
            MessageRouter::new(Arc::clone(&dispatcher)).with_event_bus(core.event_bus.clone()),
        );
        let gate = core
            .platform
            .requires_message_channel()
            .then(|| ReadinessGate::new(config.readiness_gate_name.as_str()));

        debug!(
            platform = %core.platform,
            service = %config.service_name,
            gated = gate.is_some(),
            "Media plugin initialized"
        );

        Ok(Self {
            config,
            platform: core.platform,
            bridge: Arc::clone(&core.command_bridge),
            event_bus: core.event_bus.clone(),
            registry,
            dispatcher,
            router,
            gate,
        })
    }

    /// Starts building a handle for `source`; `on_complete` runs whenever the
    /// native side reports the Stopped state.
    pub fn handle<F>(&self, source: impl Into<String>, on_complete: F) -> HandleBuilder<'_>
    where
        F: Fn() + Send + Sync + 'static,
    {
        HandleBuilder {
            plugin: self,
            source: source.into(),
            player_kind: self.config.default_player_kind,
            callbacks: MediaCallbacks {
                on_complete: Some(Arc::new(on_complete)),
                ..Default::default()
            },
        }
    }

    /// Registered handle for `id`.
    pub fn get(&self, id: &str) -> Option<Arc<MediaHandle>> {
        self.registry.get(id)
    }

    pub fn registry(&self) -> &Arc<MediaRegistry> {
        &self.registry
    }

    pub fn dispatcher(&self) -> &Arc<StatusDispatcher> {
        &self.dispatcher
    }

    pub fn router(&self) -> &Arc<MessageRouter> {
        &self.router
    }

    pub fn config(&self) -> &MediaConfig {
        &self.config
    }

    pub fn platform(&self) -> HostPlatform {
        self.platform
    }

    /// `None` on platforms that push status without an explicit channel.
    pub fn readiness_gate(&self) -> Option<&ReadinessGate> {
        self.gate.as_ref()
    }

    /// Hook for the host's platform-ready signal.
    ///
    /// On gated platforms this opens the status channel, with the router as
    /// its perpetual continuation, then satisfies the readiness gate. Only
    /// the first call opens the channel; concurrent or re-entrant calls made
    /// while it is being opened return without waiting. Elsewhere it is a
    /// no-op.
    pub fn on_platform_ready(&self) {
        let Some(gate) = &self.gate else {
            debug!(platform = %self.platform, "Status channel is push-based; no gate to open");
            return;
        };
        if !gate.claim() {
            return;
        }

        self.bridge.exec(
            NativeCommand::new(
                self.config.service_name.as_str(),
                MESSAGE_CHANNEL_ACTION,
                Vec::new(),
            ),
            Some(self.router.channel_callback()),
            None,
        );

        if gate.mark_ready() {
            info!(gate = gate.name(), "Media status channel opened");
            let _ = self
                .event_bus
                .emit(CoreEvent::Channel(ChannelEvent::Opened {
                    gate: gate.name().to_string(),
                }));
        }
    }

    /// Resolves once the plugin may be used.
    pub async fn wait_until_ready(&self) {
        if let Some(gate) = &self.gate {
            gate.wait().await;
        }
    }

    fn register(
        &self,
        source: String,
        player_kind: PlayerKind,
        callbacks: MediaCallbacks,
    ) -> Arc<MediaHandle> {
        let handle = Arc::new(MediaHandle::new(
            Uuid::new_v4().to_string(),
            source,
            player_kind,
            callbacks,
            Arc::clone(&self.bridge),
            &self.config,
        ));

        // Registered before `create` goes out so early status messages resolve.
        self.registry.insert(Arc::clone(&handle));
        handle.issue_create();
        handle
    }
}

impl std::fmt::Debug for MediaPlugin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaPlugin")
            .field("config", &self.config)
            .field("platform", &self.platform)
            .field("handles", &self.registry.len())
            .field("gate", &self.gate)
            .finish()
    }
}

/// Collects the optional parts of a handle. See [`MediaPlugin::handle`].
pub struct HandleBuilder<'a> {
    plugin: &'a MediaPlugin,
    source: String,
    player_kind: PlayerKind,
    callbacks: MediaCallbacks,
}

impl<'a> HandleBuilder<'a> {
    /// Receives native failures, including a failed `create`.
    pub fn on_error<F>(mut self, callback: F) -> Self
    where
        F: Fn(MediaFailure) + Send + Sync + 'static,
    {
        self.callbacks.on_error = Some(Arc::new(callback));
        self
    }

    /// Receives every raw state code.
    pub fn on_status_change<F>(mut self, callback: F) -> Self
    where
        F: Fn(i64) + Send + Sync + 'static,
    {
        self.callbacks.on_status_change = Some(Arc::new(callback));
        self
    }

    pub fn player_kind(mut self, kind: PlayerKind) -> Self {
        self.player_kind = kind;
        self
    }

    /// Registers the handle and issues `create` to the native side.
    pub fn create(self) -> Arc<MediaHandle> {
        self.plugin
            .register(self.source, self.player_kind, self.callbacks)
    }
}
