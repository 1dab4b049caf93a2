//! End-to-end flow through `AsyncCommandBridge` with a scripted native
//! executor that pushes status envelopes over the message channel.

use async_trait::async_trait;
use bridge_desktop::AsyncCommandBridge;
use bridge_traits::error::{BridgeError, Result};
use bridge_traits::{CommandReply, NativeCommand, NativeExecutor};
use core_media::{MediaConfig, MediaPlugin};
use core_runtime::config::{CoreConfig, HostPlatform};
use core_runtime::events::{ChannelEvent, CoreEvent, EventStream, MediaEvent};
use futures::channel::mpsc;
use futures::StreamExt;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;

struct FakeNative {
    commands: Mutex<Vec<NativeCommand>>,
    status_tx: mpsc::UnboundedSender<Value>,
    status_rx: Mutex<Option<mpsc::UnboundedReceiver<Value>>>,
}

impl FakeNative {
    fn new() -> Self {
        let (status_tx, status_rx) = mpsc::unbounded();
        Self {
            commands: Mutex::new(Vec::new()),
            status_tx,
            status_rx: Mutex::new(Some(status_rx)),
        }
    }

    fn push_status(&self, id: &str, msg_type: i64, value: Value) {
        self.status_tx
            .unbounded_send(json!({
                "action": "status",
                "status": {"id": id, "msgType": msg_type, "value": value}
            }))
            .unwrap();
    }

    fn actions(&self) -> Vec<String> {
        self.commands
            .lock()
            .unwrap()
            .iter()
            .map(|c| c.action.clone())
            .collect()
    }
}

#[async_trait]
impl NativeExecutor for FakeNative {
    async fn execute(&self, command: NativeCommand) -> Result<CommandReply> {
        self.commands.lock().unwrap().push(command.clone());
        match command.action.as_str() {
            "messageChannel" => {
                let rx = self
                    .status_rx
                    .lock()
                    .unwrap()
                    .take()
                    .ok_or_else(|| BridgeError::OperationFailed("channel already open".into()))?;
                Ok(CommandReply::Stream(rx.boxed()))
            }
            "create" if command.args.get(2) == Some(&json!("missing.mp3")) => {
                Err(BridgeError::with_code(1))
            }
            "seekToAudio" => Ok(CommandReply::Value(command.args[1].clone())),
            "release" => Ok(CommandReply::Value(json!(true))),
            _ => Ok(CommandReply::empty()),
        }
    }
}

async fn within<F: std::future::Future>(future: F) -> F::Output {
    tokio::time::timeout(Duration::from_secs(2), future)
        .await
        .expect("timed out")
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_full_playback_cycle() {
    let native = Arc::new(FakeNative::new());
    let bridge = Arc::new(AsyncCommandBridge::new(native.clone()).unwrap());
    let core = CoreConfig::builder()
        .command_bridge(bridge)
        .platform(HostPlatform::Android)
        .build()
        .unwrap();
    let mut channel_events = EventStream::new(core.event_bus.subscribe())
        .filter(|e| matches!(e, CoreEvent::Channel(_)));
    let mut completions = EventStream::new(core.event_bus.subscribe())
        .filter(|e| matches!(e, CoreEvent::Media(MediaEvent::Completed { .. })));

    let plugin = MediaPlugin::new(&core, MediaConfig::default()).unwrap();
    plugin.on_platform_ready();
    within(plugin.wait_until_ready()).await;
    assert!(matches!(
        within(channel_events.recv()).await.unwrap(),
        CoreEvent::Channel(ChannelEvent::Opened { .. })
    ));

    let done = Arc::new(Notify::new());
    let states = Arc::new(Mutex::new(Vec::new()));
    let media = {
        let done = done.clone();
        let states = states.clone();
        plugin
            .handle("a.mp3", move || done.notify_one())
            .on_status_change(move |s| states.lock().unwrap().push(s))
            .create()
    };
    media.play(None);
    media.seek_to(250);

    native.push_status(media.id(), 2, json!(3.5));
    native.push_status(media.id(), 1, json!(2.0));
    native.push_status(media.id(), 1, json!(4.0));

    within(done.notified()).await;
    within(completions.recv()).await.unwrap();

    assert_eq!(*states.lock().unwrap(), vec![2, 4]);
    assert_eq!(media.duration(), 3.5);

    // The seek reply travels on the command worker, not the status stream.
    within(async {
        while media.position() != 250.0 {
            tokio::task::yield_now().await;
        }
    })
    .await;

    media.release();
    within(async {
        while !native.actions().contains(&"release".to_string()) {
            tokio::task::yield_now().await;
        }
    })
    .await;

    assert_eq!(
        &native.actions()[..4],
        &["messageChannel", "create", "startPlayingAudio", "seekToAudio"]
    );
    assert!(plugin.get(media.id()).is_some());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_create_failure_is_delivered_asynchronously() {
    let native = Arc::new(FakeNative::new());
    let bridge = Arc::new(AsyncCommandBridge::new(native.clone()).unwrap());
    let core = CoreConfig::builder()
        .command_bridge(bridge)
        .platform(HostPlatform::Ios)
        .build()
        .unwrap();
    let plugin = MediaPlugin::new(&core, MediaConfig::default()).unwrap();

    let (tx, mut rx) = mpsc::unbounded();
    let _media = plugin
        .handle("missing.mp3", || {})
        .on_error(move |failure| {
            let _ = tx.unbounded_send(failure.code());
        })
        .create();

    assert_eq!(within(rx.next()).await, Some(Some(1)));
}
