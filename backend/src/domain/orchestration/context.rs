//! Per-operation context: acting user plus an external cancellation signal.

use tokio::sync::watch;

use crate::domain::UserId;

/// Context threaded through one orchestrated operation.
#[derive(Debug, Clone)]
pub struct OperationContext {
    user_id: UserId,
    cancellation: CancellationSignal,
}

impl OperationContext {
    pub fn new(user_id: UserId, cancellation: CancellationSignal) -> Self {
        Self {
            user_id,
            cancellation,
        }
    }

    /// Context for callers that never cancel.
    pub fn uncancellable(user_id: UserId) -> Self {
        Self::new(user_id, CancellationSignal::never())
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn cancellation(&self) -> &CancellationSignal {
        &self.cancellation
    }
}

/// Receiving side of a cancellation request.
///
/// # Examples
/// ```
/// use fitness_saga::domain::orchestration::cancellation_pair;
///
/// let (handle, signal) = cancellation_pair();
/// assert!(!signal.is_cancelled());
/// handle.cancel();
/// assert!(signal.is_cancelled());
/// ```
#[derive(Debug, Clone)]
pub struct CancellationSignal {
    receiver: Option<watch::Receiver<bool>>,
}

impl CancellationSignal {
    /// Signal that never fires.
    pub fn never() -> Self {
        Self { receiver: None }
    }

    pub fn is_cancelled(&self) -> bool {
        self.receiver
            .as_ref()
            .is_some_and(|receiver| *receiver.borrow())
    }

    /// Resolve once cancellation has been requested.
    ///
    /// A dropped [`CancellationHandle`] that never cancelled leaves this
    /// future pending forever.
    pub async fn cancelled(&self) {
        let Some(receiver) = self.receiver.as_ref() else {
            return std::future::pending().await;
        };
        let mut receiver = receiver.clone();
        if receiver.wait_for(|cancelled| *cancelled).await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

/// Sending side of a cancellation request, held by the transport layer.
#[derive(Debug)]
pub struct CancellationHandle {
    sender: watch::Sender<bool>,
}

impl CancellationHandle {
    /// Request cancellation of every operation observing the paired signal.
    pub fn cancel(&self) {
        self.sender.send_replace(true);
    }
}

/// Build a connected cancellation handle and signal.
pub fn cancellation_pair() -> (CancellationHandle, CancellationSignal) {
    let (sender, receiver) = watch::channel(false);
    (
        CancellationHandle { sender },
        CancellationSignal {
            receiver: Some(receiver),
        },
    )
}
