//! Tokio-backed command bridge.

use bridge_traits::{
    error::{BridgeError, Result},
    exec::{
        CommandBridge, CommandReply, FailureCallback, NativeCommand, NativeExecutor,
        SuccessCallback,
    },
};
use futures_util::{stream::BoxStream, StreamExt};
use serde_json::Value;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tracing::{debug, warn};

struct Job {
    command: NativeCommand,
    on_success: Option<SuccessCallback>,
    on_failure: Option<FailureCallback>,
}

/// Adapts an async [`NativeExecutor`] to the callback-style [`CommandBridge`].
///
/// Commands are executed one at a time, in the order `exec` was called, by a
/// worker task on the provided runtime. Streamed replies are forwarded on
/// their own task so a long-lived subscription never stalls the queue.
pub struct AsyncCommandBridge {
    queue: mpsc::UnboundedSender<Job>,
}

impl AsyncCommandBridge {
    /// Create a bridge on the current Tokio runtime.
    pub fn new(executor: Arc<dyn NativeExecutor>) -> Result<Self> {
        let handle = Handle::try_current().map_err(|_| {
            BridgeError::NotAvailable(
                "AsyncCommandBridge must be created inside a Tokio runtime".to_string(),
            )
        })?;
        Ok(Self::with_runtime(executor, &handle))
    }

    /// Create a bridge whose worker runs on `handle`.
    pub fn with_runtime(executor: Arc<dyn NativeExecutor>, handle: &Handle) -> Self {
        let (queue, jobs) = mpsc::unbounded_channel();
        handle.spawn(run_worker(executor, jobs));
        Self { queue }
    }
}

impl CommandBridge for AsyncCommandBridge {
    fn exec(
        &self,
        command: NativeCommand,
        on_success: Option<SuccessCallback>,
        on_failure: Option<FailureCallback>,
    ) {
        debug!(command = %command, "Queueing native command");
        let job = Job {
            command,
            on_success,
            on_failure,
        };

        if let Err(mpsc::error::SendError(job)) = self.queue.send(job) {
            warn!(command = %job.command, "Command worker stopped; rejecting command");
            if let Some(on_failure) = job.on_failure {
                let err = BridgeError::NotAvailable("command worker stopped".to_string());
                on_failure(err.into_payload());
            }
        }
    }
}

async fn run_worker(executor: Arc<dyn NativeExecutor>, mut jobs: mpsc::UnboundedReceiver<Job>) {
    while let Some(job) = jobs.recv().await {
        let label = job.command.to_string();
        match executor.execute(job.command).await {
            Ok(CommandReply::Value(value)) => {
                if let Some(on_success) = job.on_success {
                    on_success(value);
                }
            }
            Ok(CommandReply::Stream(stream)) => {
                tokio::spawn(forward_stream(label, stream, job.on_success));
            }
            Err(err) => {
                debug!(command = %label, error = %err, "Native command failed");
                if let Some(on_failure) = job.on_failure {
                    on_failure(err.into_payload());
                }
            }
        }
    }
    debug!("Command queue closed; worker exiting");
}

async fn forward_stream(
    label: String,
    mut stream: BoxStream<'static, Value>,
    on_success: Option<SuccessCallback>,
) {
    debug!(command = %label, "Forwarding streamed replies");
    while let Some(item) = stream.next().await {
        if let Some(on_success) = &on_success {
            on_success(item);
        }
    }
    debug!(command = %label, "Streamed reply ended");
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;
    use std::time::Duration;

    #[derive(Default)]
    struct ScriptedExecutor {
        seen: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl NativeExecutor for ScriptedExecutor {
        async fn execute(&self, command: NativeCommand) -> Result<CommandReply> {
            self.seen.lock().unwrap().push(command.action.clone());
            match command.action.as_str() {
                "seekToAudio" => Ok(CommandReply::Value(command.args[1].clone())),
                "pausePlayingAudio" => Err(BridgeError::with_code(1)),
                "messageChannel" => {
                    let items = futures_util::stream::iter(vec![json!(1), json!(2), json!(3)]);
                    Ok(CommandReply::Stream(items.boxed()))
                }
                _ => Ok(CommandReply::empty()),
            }
        }
    }

    fn capture() -> (SuccessCallback, mpsc::UnboundedReceiver<Value>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let callback: SuccessCallback = Arc::new(move |value| {
            let _ = tx.send(value);
        });
        (callback, rx)
    }

    async fn next(rx: &mut mpsc::UnboundedReceiver<Value>) -> Value {
        tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .expect("timed out waiting for continuation")
            .expect("continuation channel closed")
    }

    #[tokio::test]
    async fn success_payload_reaches_continuation() {
        let bridge = AsyncCommandBridge::new(Arc::new(ScriptedExecutor::default())).unwrap();
        let (on_success, mut rx) = capture();

        bridge.exec(
            NativeCommand::new("Mediaac", "seekToAudio", vec![json!("id"), json!(1500)]),
            Some(on_success),
            None,
        );

        assert_eq!(next(&mut rx).await, json!(1500));
    }

    #[tokio::test]
    async fn failure_payload_reaches_failure_continuation() {
        let bridge = AsyncCommandBridge::new(Arc::new(ScriptedExecutor::default())).unwrap();
        let (on_failure, mut rx) = capture();

        bridge.exec(
            NativeCommand::new("Mediaac", "pausePlayingAudio", vec![json!("id")]),
            None,
            Some(on_failure),
        );

        assert_eq!(next(&mut rx).await, json!({ "code": 1 }));
    }

    #[tokio::test]
    async fn streamed_replies_arrive_in_order() {
        let bridge = AsyncCommandBridge::new(Arc::new(ScriptedExecutor::default())).unwrap();
        let (on_success, mut rx) = capture();

        bridge.exec(
            NativeCommand::new("Mediaac", "messageChannel", vec![]),
            Some(on_success),
            None,
        );

        assert_eq!(next(&mut rx).await, json!(1));
        assert_eq!(next(&mut rx).await, json!(2));
        assert_eq!(next(&mut rx).await, json!(3));
    }

    #[tokio::test]
    async fn commands_execute_in_issue_order() {
        let executor = Arc::new(ScriptedExecutor::default());
        let bridge = AsyncCommandBridge::new(executor.clone()).unwrap();
        let (on_success, mut rx) = capture();

        for action in ["create", "startPlayingAudio", "stopPlayingAudio"] {
            bridge.exec(NativeCommand::new("Mediaac", action, vec![json!("id")]), None, None);
        }
        bridge.exec(
            NativeCommand::new("Mediaac", "release", vec![json!("id")]),
            Some(on_success),
            None,
        );
        next(&mut rx).await;

        let seen = executor.seen.lock().unwrap().clone();
        assert_eq!(
            seen,
            vec!["create", "startPlayingAudio", "stopPlayingAudio", "release"]
        );
    }

    #[test]
    fn new_outside_runtime_is_not_available() {
        let result = AsyncCommandBridge::new(Arc::new(ScriptedExecutor::default()));
        assert!(matches!(result, Err(BridgeError::NotAvailable(_))));
    }
}
