//! # Media Handle
//!
//! Proxy for one native media resource. Every operation is translated into a
//! [`NativeCommand`] addressed to the media service and returns immediately;
//! outcomes arrive later through continuations handed to the bridge.
//!
//! ## Commands
//!
//! | operation            | action                    | args                            |
//! |----------------------|---------------------------|---------------------------------|
//! | (creation)           | `create`                  | id, player kind, source         |
//! | [`MediaHandle::play`]  | `startPlayingAudio`     | id, player kind, source, options|
//! | [`MediaHandle::stop`]  | `stopPlayingAudio`      | id, player kind                 |
//! | [`MediaHandle::pause`] | `pausePlayingAudio`     | id                              |
//! | [`MediaHandle::seek_to`] | `seekToAudio`         | id, milliseconds                |
//! | [`MediaHandle::current_position`] | `getCurrentPositionAudio` | id              |
//! | [`MediaHandle::start_record`] | `startRecordingAudio` | id, source                 |
//! | [`MediaHandle::stop_record`]  | `stopRecordingAudio`  | id                         |
//! | [`MediaHandle::set_volume`]   | `setVolume`           | id, player kind, volume    |
//! | [`MediaHandle::release`]      | `release`             | id, player kind            |
//!
//! ## Cached values
//!
//! Duration and position start at -1 (unknown). The dispatcher writes both
//! from status notifications; seek and position-query replies write the
//! position too. A `stop` acknowledgement resets the position to 0, unless a
//! native position arrived after the `stop` was issued.

use crate::callbacks::MediaCallbacks;
use crate::config::MediaConfig;
use crate::state::PlayerKind;
use crate::status::{self, MediaFailure};
use bridge_traits::{CommandBridge, FailureCallback, NativeCommand, SuccessCallback};
use core_runtime::logging::strip_path;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Value of duration and position before the native side reported one.
pub const UNKNOWN: f64 = -1.0;

/// Options for [`MediaHandle::play`]. Platforms ignore fields they do not
/// support.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayOptions {
    /// Repeat count.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number_of_loops: Option<u32>,
    /// Keep playing while the screen is locked (iOS).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub play_audio_when_screen_is_locked: Option<bool>,
}

impl PlayOptions {
    pub fn with_loops(mut self, loops: u32) -> Self {
        self.number_of_loops = Some(loops);
        self
    }

    pub fn with_play_when_locked(mut self, enabled: bool) -> Self {
        self.play_audio_when_screen_is_locked = Some(enabled);
        self
    }
}

#[derive(Debug)]
struct PlaybackCache {
    duration: f64,
    position: f64,
    // Bumped on every position reported by the native side.
    position_revision: u64,
}

impl PlaybackCache {
    fn record_position(&mut self, position: f64) {
        self.position = position;
        self.position_revision = self.position_revision.wrapping_add(1);
    }
}

/// Proxy for a native media resource.
///
/// Handles are created through [`MediaPlugin::handle`](crate::plugin::MediaPlugin::handle)
/// and shared as `Arc<MediaHandle>`.
pub struct MediaHandle {
    id: String,
    source: String,
    player_kind: PlayerKind,
    callbacks: MediaCallbacks,
    cache: Arc<Mutex<PlaybackCache>>,
    bridge: Arc<dyn CommandBridge>,
    service: String,
    report_unhandled_errors: bool,
}

impl MediaHandle {
    pub(crate) fn new(
        id: String,
        source: String,
        player_kind: PlayerKind,
        callbacks: MediaCallbacks,
        bridge: Arc<dyn CommandBridge>,
        config: &MediaConfig,
    ) -> Self {
        Self {
            id,
            source,
            player_kind,
            callbacks,
            cache: Arc::new(Mutex::new(PlaybackCache {
                duration: UNKNOWN,
                position: UNKNOWN,
                position_revision: 0,
            })),
            bridge,
            service: config.service_name.clone(),
            report_unhandled_errors: config.report_unhandled_errors,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn player_kind(&self) -> PlayerKind {
        self.player_kind
    }

    /// Last reported duration, or -1 when unknown. Never calls native code.
    pub fn duration(&self) -> f64 {
        self.cache.lock().duration
    }

    /// Last known position, or -1 when unknown. Never calls native code.
    pub fn position(&self) -> f64 {
        self.cache.lock().position
    }

    pub(crate) fn issue_create(&self) {
        debug!(
            media_id = %self.id,
            source = strip_path(&self.source),
            player = %self.player_kind,
            "Creating native media resource"
        );
        self.send(
            "create",
            vec![self.id_arg(), self.kind_arg(), json!(self.source)],
            None,
            self.error_continuation("create"),
        );
    }

    /// Starts or resumes playback.
    pub fn play(&self, options: Option<PlayOptions>) {
        let options = options
            .and_then(|options| serde_json::to_value(options).ok())
            .unwrap_or(Value::Null);
        self.send(
            "startPlayingAudio",
            vec![self.id_arg(), self.kind_arg(), json!(self.source), options],
            None,
            None,
        );
    }

    pub fn pause(&self) {
        self.send(
            "pausePlayingAudio",
            vec![self.id_arg()],
            None,
            self.error_continuation("pausePlayingAudio"),
        );
    }

    /// Stops playback. The acknowledgement resets the cached position to 0
    /// unless a native position was recorded after this call.
    pub fn stop(&self) {
        let issued_at = self.cache.lock().position_revision;
        let cache = Arc::clone(&self.cache);
        let on_ack: SuccessCallback = Arc::new(move |_: Value| {
            let mut cache = cache.lock();
            if cache.position_revision == issued_at {
                cache.position = 0.0;
            }
        });
        self.send(
            "stopPlayingAudio",
            vec![self.id_arg(), self.kind_arg()],
            Some(on_ack),
            self.error_continuation("stopPlayingAudio"),
        );
    }

    /// Seeks to `milliseconds`. The reply carries the position the native
    /// side actually resolved, which becomes the cached position.
    pub fn seek_to(&self, milliseconds: i64) {
        let cache = Arc::clone(&self.cache);
        let id = self.id.clone();
        let on_ack: SuccessCallback = Arc::new(move |reply: Value| match status::number(&reply) {
            Some(position) => cache.lock().record_position(position),
            None => warn!(media_id = %id, reply = %reply, "Seek reply without a position"),
        });
        self.send(
            "seekToAudio",
            vec![self.id_arg(), json!(milliseconds)],
            Some(on_ack),
            self.error_continuation("seekToAudio"),
        );
    }

    /// Queries the native position.
    ///
    /// On success the cached position is updated before `on_success` runs.
    /// Failures go to `on_failure`, not to the handle's error callback.
    pub fn current_position<S, F>(&self, on_success: S, on_failure: F)
    where
        S: Fn(f64) + Send + Sync + 'static,
        F: Fn(MediaFailure) + Send + Sync + 'static,
    {
        let on_failure = Arc::new(on_failure);
        let cache = Arc::clone(&self.cache);

        let reply_failure = Arc::clone(&on_failure);
        let on_ack: SuccessCallback = Arc::new(move |reply: Value| match status::number(&reply) {
            Some(position) => {
                cache.lock().record_position(position);
                on_success(position);
            }
            None => reply_failure(MediaFailure::new(reply)),
        });
        let on_error: FailureCallback =
            Arc::new(move |payload: Value| on_failure(MediaFailure::new(payload)));

        self.send(
            "getCurrentPositionAudio",
            vec![self.id_arg()],
            Some(on_ack),
            Some(on_error),
        );
    }

    /// Starts recording into the handle's source locator.
    pub fn start_record(&self) {
        self.send(
            "startRecordingAudio",
            vec![self.id_arg(), json!(self.source)],
            None,
            self.error_continuation("startRecordingAudio"),
        );
    }

    pub fn stop_record(&self) {
        self.send(
            "stopRecordingAudio",
            vec![self.id_arg()],
            None,
            self.error_continuation("stopRecordingAudio"),
        );
    }

    /// Fire-and-forget; failures are not reported.
    pub fn set_volume(&self, volume: f64) {
        self.send(
            "setVolume",
            vec![self.id_arg(), self.kind_arg(), json!(volume)],
            None,
            None,
        );
    }

    /// Frees the native resources behind this handle.
    ///
    /// Native players come from a small pool, so every handle that is no
    /// longer needed must be released. The handle stays registered so late
    /// status messages still resolve; use
    /// [`MediaRegistry::remove`](crate::registry::MediaRegistry::remove) to
    /// drop it.
    pub fn release(&self) {
        let id = self.id.clone();
        let on_ack: SuccessCallback = Arc::new(move |reply: Value| {
            debug!(media_id = %id, released = reply.as_bool().unwrap_or(false), "Release acknowledged");
        });
        self.send(
            "release",
            vec![self.id_arg(), self.kind_arg()],
            Some(on_ack),
            self.error_continuation("release"),
        );
    }

    pub(crate) fn callbacks(&self) -> &MediaCallbacks {
        &self.callbacks
    }

    pub(crate) fn set_duration(&self, duration: f64) {
        self.cache.lock().duration = duration;
    }

    pub(crate) fn set_position(&self, position: f64) {
        self.cache.lock().record_position(position);
    }

    fn id_arg(&self) -> Value {
        json!(self.id)
    }

    fn kind_arg(&self) -> Value {
        json!(self.player_kind.as_str())
    }

    fn send(
        &self,
        action: &str,
        args: Vec<Value>,
        on_success: Option<SuccessCallback>,
        on_failure: Option<FailureCallback>,
    ) {
        debug!(media_id = %self.id, action, "Issuing media command");
        self.bridge.exec(
            NativeCommand::new(self.service.as_str(), action, args),
            on_success,
            on_failure,
        );
    }

    /// Routes a command failure to the error callback. Without one the failure
    /// is dropped, optionally leaving a warning behind.
    fn error_continuation(&self, action: &'static str) -> Option<FailureCallback> {
        match &self.callbacks.on_error {
            Some(on_error) => {
                let on_error = Arc::clone(on_error);
                Some(Arc::new(move |payload: Value| {
                    on_error(MediaFailure::new(payload))
                }))
            }
            None if self.report_unhandled_errors => {
                let id = self.id.clone();
                Some(Arc::new(move |payload: Value| {
                    warn!(media_id = %id, action, payload = %payload, "Media command failed without an error callback");
                }))
            }
            None => None,
        }
    }
}

impl fmt::Debug for MediaHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cache = self.cache.lock();
        f.debug_struct("MediaHandle")
            .field("id", &self.id)
            .field("source", &strip_path(&self.source))
            .field("player_kind", &self.player_kind)
            .field("duration", &cache.duration)
            .field("position", &cache.position)
            .field("callbacks", &self.callbacks)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::mock;
    use std::sync::atomic::{AtomicUsize, Ordering};

    mock! {
        Bridge {}

        impl CommandBridge for Bridge {
            fn exec(
                &self,
                command: NativeCommand,
                on_success: Option<SuccessCallback>,
                on_failure: Option<FailureCallback>,
            );
        }
    }

    fn handle_with(bridge: MockBridge, callbacks: MediaCallbacks) -> MediaHandle {
        MediaHandle::new(
            "m1".to_string(),
            "a.mp3".to_string(),
            PlayerKind::AndroidPlayer,
            callbacks,
            Arc::new(bridge),
            &MediaConfig::default(),
        )
    }

    fn collecting_errors() -> (MediaCallbacks, Arc<Mutex<Vec<MediaFailure>>>) {
        let errors = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&errors);
        let callbacks = MediaCallbacks {
            on_error: Some(Arc::new(move |failure| sink.lock().push(failure))),
            ..Default::default()
        };
        (callbacks, errors)
    }

    #[test]
    fn test_new_handle_has_unknown_values() {
        let handle = handle_with(MockBridge::new(), MediaCallbacks::default());
        assert_eq!(handle.duration(), UNKNOWN);
        assert_eq!(handle.position(), UNKNOWN);
        assert_eq!(handle.id(), "m1");
        assert_eq!(handle.source(), "a.mp3");
    }

    #[test]
    fn test_create_failure_routes_to_on_error() {
        let mut bridge = MockBridge::new();
        bridge
            .expect_exec()
            .withf(|cmd, ok, fail| {
                cmd.service == "Mediaac"
                    && cmd.action == "create"
                    && cmd.args == vec![json!("m1"), json!("androidPlayer"), json!("a.mp3")]
                    && ok.is_none()
                    && fail.is_some()
            })
            .times(1)
            .returning(|_, _, fail| {
                if let Some(fail) = fail {
                    fail(json!({"code": 1}));
                }
            });

        let (callbacks, errors) = collecting_errors();
        let handle = handle_with(bridge, callbacks);
        handle.issue_create();

        let errors = errors.lock();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code(), Some(1));
    }

    #[test]
    fn test_play_sends_options_without_continuations() {
        let mut bridge = MockBridge::new();
        bridge
            .expect_exec()
            .withf(|cmd, ok, fail| {
                cmd.action == "startPlayingAudio"
                    && cmd.args
                        == vec![
                            json!("m1"),
                            json!("androidPlayer"),
                            json!("a.mp3"),
                            json!({"numberOfLoops": 2, "playAudioWhenScreenIsLocked": false}),
                        ]
                    && ok.is_none()
                    && fail.is_none()
            })
            .times(1)
            .return_const(());

        let handle = handle_with(bridge, MediaCallbacks::default());
        handle.play(Some(
            PlayOptions::default()
                .with_loops(2)
                .with_play_when_locked(false),
        ));
        assert_eq!(handle.position(), UNKNOWN);
    }

    #[test]
    fn test_play_without_options_sends_null() {
        let mut bridge = MockBridge::new();
        bridge
            .expect_exec()
            .withf(|cmd, _, _| cmd.args.get(3) == Some(&Value::Null))
            .times(1)
            .return_const(());

        handle_with(bridge, MediaCallbacks::default()).play(None);
    }

    #[test]
    fn test_pause_and_record_arguments() {
        let mut bridge = MockBridge::new();
        bridge
            .expect_exec()
            .withf(|cmd, _, _| cmd.action == "pausePlayingAudio" && cmd.args == vec![json!("m1")])
            .times(1)
            .return_const(());
        bridge
            .expect_exec()
            .withf(|cmd, _, _| {
                cmd.action == "startRecordingAudio"
                    && cmd.args == vec![json!("m1"), json!("a.mp3")]
            })
            .times(1)
            .return_const(());
        bridge
            .expect_exec()
            .withf(|cmd, _, _| cmd.action == "stopRecordingAudio" && cmd.args == vec![json!("m1")])
            .times(1)
            .return_const(());

        let handle = handle_with(bridge, MediaCallbacks::default());
        handle.pause();
        handle.start_record();
        handle.stop_record();
    }

    #[test]
    fn test_stop_ack_resets_position() {
        let mut bridge = MockBridge::new();
        bridge
            .expect_exec()
            .withf(|cmd, _, _| {
                cmd.action == "stopPlayingAudio"
                    && cmd.args == vec![json!("m1"), json!("androidPlayer")]
            })
            .times(1)
            .returning(|_, ok, _| {
                if let Some(ok) = ok {
                    ok(Value::Null);
                }
            });

        let handle = handle_with(bridge, MediaCallbacks::default());
        handle.set_position(1200.0);
        handle.stop();
        assert_eq!(handle.position(), 0.0);
    }

    #[test]
    fn test_stop_ack_does_not_override_later_native_position() {
        let pending: Arc<Mutex<Option<SuccessCallback>>> = Arc::new(Mutex::new(None));
        let slot = Arc::clone(&pending);

        let mut bridge = MockBridge::new();
        bridge
            .expect_exec()
            .times(1)
            .returning(move |_, ok, _| *slot.lock() = ok);

        let handle = handle_with(bridge, MediaCallbacks::default());
        handle.stop();
        handle.set_position(5000.0);

        let ack = pending.lock().take().expect("stop continuation");
        ack(Value::Null);
        assert_eq!(handle.position(), 5000.0);
    }

    #[test]
    fn test_seek_reply_updates_position() {
        let mut bridge = MockBridge::new();
        bridge
            .expect_exec()
            .withf(|cmd, _, _| cmd.action == "seekToAudio" && cmd.args == vec![json!("m1"), json!(3000)])
            .times(1)
            .returning(|_, ok, _| {
                if let Some(ok) = ok {
                    ok(json!(2990.0));
                }
            });

        let handle = handle_with(bridge, MediaCallbacks::default());
        handle.seek_to(3000);
        assert_eq!(handle.position(), 2990.0);
    }

    #[test]
    fn test_seek_failure_routes_to_on_error() {
        let mut bridge = MockBridge::new();
        bridge.expect_exec().times(1).returning(|_, _, fail| {
            if let Some(fail) = fail {
                fail(json!({"code": 0}));
            }
        });

        let (callbacks, errors) = collecting_errors();
        let handle = handle_with(bridge, callbacks);
        handle.seek_to(10);
        assert_eq!(errors.lock().len(), 1);
        assert_eq!(handle.position(), UNKNOWN);
    }

    #[test]
    fn test_current_position_success() {
        let mut bridge = MockBridge::new();
        bridge
            .expect_exec()
            .withf(|cmd, _, _| cmd.action == "getCurrentPositionAudio" && cmd.args == vec![json!("m1")])
            .times(1)
            .returning(|_, ok, _| {
                if let Some(ok) = ok {
                    ok(json!(42.5));
                }
            });

        let handle = handle_with(bridge, MediaCallbacks::default());
        let seen = Arc::new(Mutex::new(None));
        let seen_in_callback = Arc::clone(&seen);
        handle.current_position(
            move |p| *seen_in_callback.lock() = Some(p),
            |_| panic!("unexpected failure"),
        );

        assert_eq!(*seen.lock(), Some(42.5));
        assert_eq!(handle.position(), 42.5);
    }

    #[test]
    fn test_current_position_failure_uses_query_callback() {
        let mut bridge = MockBridge::new();
        bridge.expect_exec().times(1).returning(|_, _, fail| {
            if let Some(fail) = fail {
                fail(json!({"code": 0}));
            }
        });

        let (callbacks, handle_errors) = collecting_errors();
        let handle = handle_with(bridge, callbacks);
        let failures = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&failures);
        handle.current_position(
            |_| panic!("unexpected success"),
            move |failure| {
                assert_eq!(failure.code(), Some(0));
                counter.fetch_add(1, Ordering::SeqCst);
            },
        );

        assert_eq!(failures.load(Ordering::SeqCst), 1);
        assert!(handle_errors.lock().is_empty());
        assert_eq!(handle.position(), UNKNOWN);
    }

    #[test]
    fn test_set_volume_is_fire_and_forget() {
        let mut bridge = MockBridge::new();
        bridge
            .expect_exec()
            .withf(|cmd, ok, fail| {
                cmd.action == "setVolume"
                    && cmd.args == vec![json!("m1"), json!("androidPlayer"), json!(0.5)]
                    && ok.is_none()
                    && fail.is_none()
            })
            .times(1)
            .return_const(());

        handle_with(bridge, MediaCallbacks::default()).set_volume(0.5);
    }

    #[test]
    fn test_release_arguments_and_ack() {
        let mut bridge = MockBridge::new();
        bridge
            .expect_exec()
            .withf(|cmd, ok, _| {
                cmd.action == "release"
                    && cmd.args == vec![json!("m1"), json!("androidPlayer")]
                    && ok.is_some()
            })
            .times(1)
            .returning(|_, ok, _| {
                if let Some(ok) = ok {
                    ok(json!(true));
                }
            });

        handle_with(bridge, MediaCallbacks::default()).release();
    }

    #[test]
    fn test_missing_error_callback_is_reported_when_enabled() {
        let mut bridge = MockBridge::new();
        bridge
            .expect_exec()
            .withf(|_, _, fail| fail.is_some())
            .times(1)
            .returning(|_, _, fail| {
                if let Some(fail) = fail {
                    fail(json!({"code": 2}));
                }
            });

        handle_with(bridge, MediaCallbacks::default()).pause();
    }

    #[test]
    fn test_missing_error_callback_is_silent_when_disabled() {
        let mut bridge = MockBridge::new();
        bridge
            .expect_exec()
            .withf(|_, _, fail| fail.is_none())
            .times(1)
            .return_const(());

        let handle = MediaHandle::new(
            "m1".to_string(),
            "a.mp3".to_string(),
            PlayerKind::StreamPlayer,
            MediaCallbacks::default(),
            Arc::new(bridge),
            &MediaConfig::default().with_report_unhandled_errors(false),
        );
        handle.pause();
    }

    #[test]
    fn test_stream_player_kind_is_sent() {
        let mut bridge = MockBridge::new();
        bridge
            .expect_exec()
            .withf(|cmd, _, _| cmd.args.get(1) == Some(&json!("streamPlayer")))
            .times(1)
            .return_const(());

        let handle = MediaHandle::new(
            "m1".to_string(),
            "https://radio.example/live.aac".to_string(),
            PlayerKind::StreamPlayer,
            MediaCallbacks::default(),
            Arc::new(bridge),
            &MediaConfig::default(),
        );
        handle.release();
    }

    #[test]
    fn test_play_options_serialization_skips_unset() {
        let value = serde_json::to_value(PlayOptions::default().with_loops(3)).unwrap();
        assert_eq!(value, json!({"numberOfLoops": 3}));
    }
}
