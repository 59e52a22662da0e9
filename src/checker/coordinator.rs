// src/checker/coordinator.rs
// =============================================================================
// The probe coordinator fans out one tokio task per link and streams the
// results back in the order they finish.
//
// How completion is tracked:
// - Every spawned task owns a clone of the result channel's sender
// - The coordinator itself holds one more sender until `finish` is called
// - Once the last sender is dropped the channel closes, which ends the
//   result stream. No task count or barrier is needed.
//
// By default there is no cap on in-flight probes. A cap can be set with
// `with_concurrency_limit`; tasks are still spawned immediately but wait
// on a semaphore permit before probing.
// =============================================================================

use futures::stream::{self, BoxStream, StreamExt};
use std::sync::Arc;
use tokio::sync::{mpsc, Semaphore};
use tracing::trace;

use super::http::{LinkCheckResult, LinkClassifier, LinkTask};
use super::signal::ExitSignal;

/// Results in completion order. Ends after the last scheduled probe.
pub type ProbeResults = BoxStream<'static, LinkCheckResult>;

pub struct ProbeCoordinator {
    classifier: Arc<LinkClassifier>,
    signal: ExitSignal,
    limit: Option<Arc<Semaphore>>,
    sender: mpsc::UnboundedSender<LinkCheckResult>,
    scheduled: usize,
}

impl ProbeCoordinator {
    /// Unbounded fan-out: every submitted link is probed right away.
    pub fn new(classifier: LinkClassifier) -> (Self, ProbeResults) {
        let (sender, receiver) = mpsc::unbounded_channel();

        let results = stream::unfold(receiver, |mut receiver| async move {
            receiver.recv().await.map(|result| (result, receiver))
        })
        .boxed();

        let coordinator = Self {
            classifier: Arc::new(classifier),
            signal: ExitSignal::new(),
            limit: None,
            sender,
            scheduled: 0,
        };
        (coordinator, results)
    }

    /// At most `max_in_flight` probes run at once. Zero means unbounded.
    pub fn with_concurrency_limit(mut self, max_in_flight: usize) -> Self {
        self.limit = (max_in_flight > 0).then(|| Arc::new(Semaphore::new(max_in_flight)));
        self
    }

    pub fn scheduled(&self) -> usize {
        self.scheduled
    }

    /// Schedules one probe. Returns immediately.
    pub fn submit(&mut self, task: LinkTask) {
        let classifier = Arc::clone(&self.classifier);
        let signal = self.signal.clone();
        let limit = self.limit.clone();
        let sender = self.sender.clone();
        self.scheduled += 1;

        tokio::spawn(async move {
            // Held for the whole probe; released when the task ends.
            // The semaphore is never closed, so acquire only fails in theory.
            let _permit = match limit {
                Some(semaphore) => semaphore.acquire_owned().await.ok(),
                None => None,
            };

            let result = classifier.classify(task, &signal).await;
            trace!(url = %result.url, "probe finished");

            // Receiver gone means nobody is listening any more; the
            // verdict is already on the signal, so dropping it is fine.
            let _ = sender.send(result);
        });
    }

    /// Stops accepting links. The result stream closes once every
    /// submitted probe has reported; read the returned signal after that.
    pub fn finish(self) -> ExitSignal {
        self.signal
    }
}
