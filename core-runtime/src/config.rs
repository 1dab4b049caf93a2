//! # Core Configuration Module
//!
//! Provides configuration management for the media core.
//!
//! ## Overview
//!
//! The configuration system uses a builder pattern to construct a `CoreConfig`
//! holding the host bridge, the host platform and the shared event bus. It
//! fails fast when a required bridge is missing so hosts learn about wiring
//! mistakes at startup rather than on the first playback command.
//!
//! ## Required Dependencies
//!
//! - `CommandBridge` - Transport carrying commands to the native media layer
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::{CoreConfig, HostPlatform};
//! use std::sync::Arc;
//!
//! let config = CoreConfig::builder()
//!     .command_bridge(Arc::new(MyBridge))
//!     .platform(HostPlatform::Android)
//!     .event_buffer_size(256)
//!     .build()
//!     .expect("Failed to build config");
//! ```
//!
//! ## Error Handling
//!
//! ```should_panic
//! use core_runtime::config::CoreConfig;
//!
//! // Panics with an actionable CapabilityMissing error
//! let config = CoreConfig::builder()
//!     .build()
//!     .expect("Should fail - missing command bridge");
//! ```

use crate::error::{Error, Result};
use crate::events::{EventBus, DEFAULT_EVENT_BUFFER_SIZE};
use bridge_traits::CommandBridge;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Upper bound for the event bus buffer.
pub const MAX_EVENT_BUFFER_SIZE: usize = 65_536;

/// Host platform the core is embedded in.
///
/// The platform decides whether the native status channel has to be opened
/// explicitly before media plugins may be used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HostPlatform {
    #[serde(rename = "android")]
    Android,
    #[serde(rename = "amazon-fireos")]
    AmazonFireOs,
    #[serde(rename = "windowsphone")]
    WindowsPhone,
    #[serde(rename = "ios")]
    Ios,
    #[serde(rename = "browser")]
    Browser,
    #[serde(rename = "windows")]
    Windows,
    #[serde(rename = "desktop")]
    Desktop,
}

impl HostPlatform {
    /// Platform identifier as reported by host shells.
    pub fn id(&self) -> &'static str {
        match self {
            HostPlatform::Android => "android",
            HostPlatform::AmazonFireOs => "amazon-fireos",
            HostPlatform::WindowsPhone => "windowsphone",
            HostPlatform::Ios => "ios",
            HostPlatform::Browser => "browser",
            HostPlatform::Windows => "windows",
            HostPlatform::Desktop => "desktop",
        }
    }

    /// Whether native status notifications only flow after a `messageChannel`
    /// subscription has been opened.
    pub fn requires_message_channel(&self) -> bool {
        matches!(
            self,
            HostPlatform::Android | HostPlatform::AmazonFireOs | HostPlatform::WindowsPhone
        )
    }

    /// Best guess for the platform the binary was compiled for.
    pub fn current() -> Self {
        if cfg!(target_os = "android") {
            HostPlatform::Android
        } else if cfg!(target_os = "ios") {
            HostPlatform::Ios
        } else if cfg!(target_os = "windows") {
            HostPlatform::Windows
        } else if cfg!(target_arch = "wasm32") {
            HostPlatform::Browser
        } else {
            HostPlatform::Desktop
        }
    }
}

impl Default for HostPlatform {
    fn default() -> Self {
        Self::current()
    }
}

impl fmt::Display for HostPlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for HostPlatform {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "android" => Ok(HostPlatform::Android),
            "amazon-fireos" => Ok(HostPlatform::AmazonFireOs),
            "windowsphone" => Ok(HostPlatform::WindowsPhone),
            "ios" => Ok(HostPlatform::Ios),
            "browser" => Ok(HostPlatform::Browser),
            "windows" => Ok(HostPlatform::Windows),
            "desktop" => Ok(HostPlatform::Desktop),
            other => Err(Error::UnknownPlatform(other.to_string())),
        }
    }
}

/// Core configuration for the media core.
///
/// Use [`CoreConfigBuilder`] to construct instances.
#[derive(Clone)]
pub struct CoreConfig {
    /// Transport to the native media layer (required)
    pub command_bridge: Arc<dyn CommandBridge>,

    /// Platform the core runs on
    pub platform: HostPlatform,

    /// Bus on which media and channel events are mirrored
    pub event_bus: EventBus,
}

impl fmt::Debug for CoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CoreConfig")
            .field("command_bridge", &"CommandBridge { ... }")
            .field("platform", &self.platform)
            .field("event_bus", &self.event_bus)
            .finish()
    }
}

impl CoreConfig {
    pub fn builder() -> CoreConfigBuilder {
        CoreConfigBuilder::default()
    }
}

fn command_bridge_missing_error() -> Error {
    Error::CapabilityMissing {
        capability: "CommandBridge".to_string(),
        message: "A CommandBridge implementation is required to reach the native media layer. \
                 Desktop/tests: wrap a NativeExecutor in bridge_desktop::AsyncCommandBridge. \
                 Mobile: inject the host shell's plugin bridge."
            .to_string(),
    }
}

/// Builder for [`CoreConfig`].
#[derive(Default)]
pub struct CoreConfigBuilder {
    command_bridge: Option<Arc<dyn CommandBridge>>,
    platform: Option<HostPlatform>,
    event_buffer_size: Option<usize>,
    event_bus: Option<EventBus>,
}

impl CoreConfigBuilder {
    /// Sets the command bridge (required).
    pub fn command_bridge(mut self, bridge: Arc<dyn CommandBridge>) -> Self {
        self.command_bridge = Some(bridge);
        self
    }

    /// Overrides the detected host platform.
    pub fn platform(mut self, platform: HostPlatform) -> Self {
        self.platform = Some(platform);
        self
    }

    /// Buffer size for a freshly created event bus.
    ///
    /// Ignored when an existing bus is supplied through [`Self::event_bus`].
    pub fn event_buffer_size(mut self, size: usize) -> Self {
        self.event_buffer_size = Some(size);
        self
    }

    /// Shares an existing event bus instead of creating one.
    pub fn event_bus(mut self, bus: EventBus) -> Self {
        self.event_bus = Some(bus);
        self
    }

    /// Validates the collected settings and builds the configuration.
    pub fn build(self) -> Result<CoreConfig> {
        let command_bridge = self
            .command_bridge
            .ok_or_else(command_bridge_missing_error)?;

        let event_bus = match self.event_bus {
            Some(bus) => bus,
            None => {
                let size = self.event_buffer_size.unwrap_or(DEFAULT_EVENT_BUFFER_SIZE);
                if size == 0 {
                    return Err(Error::Config(
                        "Event buffer size must be greater than 0".to_string(),
                    ));
                }
                if size > MAX_EVENT_BUFFER_SIZE {
                    return Err(Error::Config(format!(
                        "Event buffer size exceeds maximum of {}",
                        MAX_EVENT_BUFFER_SIZE
                    )));
                }
                EventBus::new(size)
            }
        };

        Ok(CoreConfig {
            command_bridge,
            platform: self.platform.unwrap_or_default(),
            event_bus,
        })
    }
}
