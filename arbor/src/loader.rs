//! Dynamic child loading.
//!
//! The tree hands a [`LoadRequest`] to the configured [`DataLoader`]. The
//! loader answers through the request's [`LoadResponder`], immediately or
//! later from anywhere that can hold the responder. Answers travel over a
//! channel and are applied by [`Tree::process_loads`](crate::Tree::process_loads),
//! which the tree also runs right after invoking the loader so synchronous
//! loaders resolve within the triggering call.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::channel::{mpsc, oneshot};

use crate::error::LoadError;
use crate::model::{NodeData, NodeKey};

/// Source of children for nodes whose children are unloaded.
pub trait DataLoader {
    fn load(&self, request: LoadRequest);
}

impl<F> DataLoader for F
where
    F: Fn(LoadRequest),
{
    fn load(&self, request: LoadRequest) {
        self(request)
    }
}

/// One fetch of children.
#[derive(Debug)]
pub struct LoadRequest {
    id: Option<String>,
    responder: LoadResponder,
}

impl LoadRequest {
    /// Node whose children are requested; `None` for the root collection.
    pub fn node(&self) -> Option<NodeKey> {
        self.responder.target
    }

    /// Id of the node whose children are requested.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn resolve(self, nodes: Vec<NodeData>) {
        self.responder.resolve(nodes)
    }

    pub fn reject(self, error: LoadError) {
        self.responder.reject(error)
    }

    /// Detach the responder to answer later.
    pub fn into_responder(self) -> LoadResponder {
        self.responder
    }
}

/// Answers one [`LoadRequest`].
///
/// Dropping it unanswered fails the load with [`LoadError::Abandoned`].
pub struct LoadResponder {
    target: Option<NodeKey>,
    sender: Option<mpsc::UnboundedSender<LoadOutcome>>,
}

impl LoadResponder {
    pub fn resolve(mut self, nodes: Vec<NodeData>) {
        self.send(Ok(nodes));
    }

    pub fn reject(mut self, error: LoadError) {
        self.send(Err(error));
    }

    fn send(&mut self, result: Result<Vec<NodeData>, LoadError>) {
        if let Some(sender) = self.sender.take() {
            let outcome = LoadOutcome {
                target: self.target,
                result,
            };
            if sender.unbounded_send(outcome).is_err() {
                log::debug!("load answered after its tree was dropped");
            }
        }
    }
}

impl fmt::Debug for LoadResponder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadResponder")
            .field("target", &self.target)
            .field("answered", &self.sender.is_none())
            .finish()
    }
}

impl Drop for LoadResponder {
    fn drop(&mut self) {
        self.send(Err(LoadError::Abandoned));
    }
}

#[derive(Debug)]
pub(crate) struct LoadOutcome {
    pub target: Option<NodeKey>,
    pub result: Result<Vec<NodeData>, LoadError>,
}

/// Resolves when a load finishes, with the loader's error on failure.
///
/// A failed load has already been recovered by the tree when the handle
/// resolves; the error is informational.
#[must_use = "a LoadHandle reports whether the load succeeded"]
pub struct LoadHandle {
    inner: HandleInner,
}

enum HandleInner {
    Ready(Option<Result<(), LoadError>>),
    Pending(oneshot::Receiver<Result<(), LoadError>>),
}

impl LoadHandle {
    pub(crate) fn ready(result: Result<(), LoadError>) -> Self {
        Self {
            inner: HandleInner::Ready(Some(result)),
        }
    }

    pub(crate) fn done() -> Self {
        Self::ready(Ok(()))
    }

    fn pending(receiver: oneshot::Receiver<Result<(), LoadError>>) -> Self {
        Self {
            inner: HandleInner::Pending(receiver),
        }
    }
}

impl fmt::Debug for LoadHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.inner {
            HandleInner::Ready(result) => f.debug_tuple("Ready").field(result).finish(),
            HandleInner::Pending(_) => f.write_str("Pending"),
        }
    }
}

impl Future for LoadHandle {
    type Output = Result<(), LoadError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match &mut self.get_mut().inner {
            HandleInner::Ready(result) => Poll::Ready(result.take().unwrap_or(Ok(()))),
            HandleInner::Pending(receiver) => Pin::new(receiver)
                .poll(cx)
                .map(|answer| answer.unwrap_or(Err(LoadError::Dropped))),
        }
    }
}

/// In-flight loads of one tree.
pub(crate) struct LoadQueue {
    sender: mpsc::UnboundedSender<LoadOutcome>,
    receiver: mpsc::UnboundedReceiver<LoadOutcome>,
    waiters: HashMap<Option<NodeKey>, Vec<oneshot::Sender<Result<(), LoadError>>>>,
    root_loading: bool,
}

impl Default for LoadQueue {
    fn default() -> Self {
        let (sender, receiver) = mpsc::unbounded();
        Self {
            sender,
            receiver,
            waiters: HashMap::new(),
            root_loading: false,
        }
    }
}

impl LoadQueue {
    /// Register a load for `target` and build the request for the loader.
    pub fn start(
        &mut self,
        target: Option<NodeKey>,
        id: Option<String>,
    ) -> (LoadRequest, LoadHandle) {
        let handle = self.wait(target);
        if target.is_none() {
            self.root_loading = true;
        }
        let request = LoadRequest {
            id,
            responder: LoadResponder {
                target,
                sender: Some(self.sender.clone()),
            },
        };
        (request, handle)
    }

    /// Another handle on the load in flight for `target`.
    pub fn wait(&mut self, target: Option<NodeKey>) -> LoadHandle {
        let (tx, rx) = oneshot::channel();
        self.waiters.entry(target).or_default().push(tx);
        LoadHandle::pending(rx)
    }

    pub fn root_loading(&self) -> bool {
        self.root_loading
    }

    /// Next answered load, if any.
    pub fn next_outcome(&mut self) -> Option<LoadOutcome> {
        let outcome = self.receiver.try_next().ok().flatten()?;
        if outcome.target.is_none() {
            self.root_loading = false;
        }
        Some(outcome)
    }

    /// Resolve the handles waiting on `target`.
    pub fn finish(&mut self, target: Option<NodeKey>, result: Result<(), LoadError>) {
        for waiter in self.waiters.remove(&target).unwrap_or_default() {
            // The caller may have dropped its handle.
            let _ = waiter.send(result.clone());
        }
    }

    /// Forget the waiters on `target`; their handles resolve to `Dropped`.
    pub fn abandon(&mut self, target: Option<NodeKey>) {
        self.waiters.remove(&target);
    }
}
