//! Loopback Transport Adapter
//!
//! Implements the `Transport` port as an in-process link between two
//! endpoints (satellite and authority). Reachability and live-send failure
//! are programmable. Durable queues flush when the link comes back, and the
//! application context is latest-wins like a real pairing session.
//!
//! When an endpoint has a bus attached, every callback the platform would
//! deliver is published there as a `SyncEvent`.

use crate::domain::{DeliveryOutcome, TransportError};
use crate::ports::outbound::Transport;
use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use shared_bus::{EventPublisher, SyncEvent};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Default)]
struct Endpoint {
    /// Messages delivered to this side.
    inbox: Mutex<Vec<Vec<u8>>>,
    /// Payloads this side queued durably, waiting for the link.
    outbox: Mutex<VecDeque<Vec<u8>>>,
    /// Last application context received by this side.
    context: Mutex<Option<Vec<u8>>>,
    /// Context this side pushed while the link was down.
    context_outbox: Mutex<Option<Vec<u8>>>,
    bus: RwLock<Option<Arc<dyn EventPublisher>>>,
}

impl Endpoint {
    fn publish(&self, event: SyncEvent) {
        if let Some(bus) = self.bus.read().as_ref() {
            bus.publish(event);
        }
    }

    fn receive_message(&self, payload: Vec<u8>) {
        self.inbox.lock().push(payload.clone());
        self.publish(SyncEvent::MessageReceived { payload });
    }

    fn receive_context(&self, payload: Vec<u8>) {
        *self.context.lock() = Some(payload.clone());
        self.publish(SyncEvent::ApplicationContextReceived { payload });
    }
}

struct Link {
    reachable: AtomicBool,
    fail_live_sends: AtomicBool,
    ends: [Endpoint; 2],
}

impl Link {
    /// Deliver everything side `from` queued while the link was down.
    fn flush(&self, from: usize) {
        let to = 1 - from;
        let queued: Vec<_> = self.ends[from].outbox.lock().drain(..).collect();
        if !queued.is_empty() {
            info!(count = queued.len(), "[ms-03] Loopback flushing durable queue");
        }
        for payload in queued {
            self.ends[to].receive_message(payload);
        }
        if let Some(context) = self.ends[from].context_outbox.lock().take() {
            self.ends[to].receive_context(context);
        }
    }
}

/// One endpoint of an in-process link.
#[derive(Clone)]
pub struct LoopbackTransport {
    link: Arc<Link>,
    side: usize,
}

impl LoopbackTransport {
    const SATELLITE: usize = 0;
    const AUTHORITY: usize = 1;

    /// Create a connected pair: `(satellite, authority)`.
    pub fn pair(reachable: bool) -> (Self, Self) {
        let link = Arc::new(Link {
            reachable: AtomicBool::new(reachable),
            fail_live_sends: AtomicBool::new(false),
            ends: [Endpoint::default(), Endpoint::default()],
        });
        (
            Self {
                link: link.clone(),
                side: Self::SATELLITE,
            },
            Self {
                link,
                side: Self::AUTHORITY,
            },
        )
    }

    /// Publish this endpoint's callbacks on `bus`.
    pub fn attach_bus(&self, bus: Arc<dyn EventPublisher>) {
        *self.own().bus.write() = Some(bus);
    }

    /// Bring the link up or down. Coming up flushes both durable queues.
    pub fn set_reachable(&self, reachable: bool) {
        let was = self.link.reachable.swap(reachable, Ordering::SeqCst);
        if was == reachable {
            return;
        }
        info!(reachable, "[ms-03] Loopback reachability changed");
        for end in &self.link.ends {
            end.publish(SyncEvent::ReachabilityChanged { reachable });
        }
        if reachable {
            self.link.flush(Self::SATELLITE);
            self.link.flush(Self::AUTHORITY);
        }
    }

    /// Make live sends fail while the link stays up.
    pub fn set_fail_live_sends(&self, fail: bool) {
        self.link.fail_live_sends.store(fail, Ordering::SeqCst);
    }

    /// Messages delivered to this endpoint so far.
    pub fn inbox(&self) -> Vec<Vec<u8>> {
        self.own().inbox.lock().clone()
    }

    /// Take and clear the messages delivered to this endpoint.
    pub fn take_inbox(&self) -> Vec<Vec<u8>> {
        std::mem::take(&mut *self.own().inbox.lock())
    }

    /// Payloads this endpoint queued that have not been delivered yet.
    pub fn durable_backlog(&self) -> usize {
        self.own().outbox.lock().len()
    }

    fn own(&self) -> &Endpoint {
        &self.link.ends[self.side]
    }

    fn peer(&self) -> &Endpoint {
        &self.link.ends[1 - self.side]
    }
}

#[async_trait]
impl Transport for LoopbackTransport {
    fn is_reachable(&self) -> bool {
        self.link.reachable.load(Ordering::SeqCst)
    }

    async fn try_send_now(&self, payload: Vec<u8>) -> DeliveryOutcome {
        if !self.is_reachable() {
            return DeliveryOutcome::Failed(TransportError::Unreachable);
        }
        if self.link.fail_live_sends.load(Ordering::SeqCst) {
            return DeliveryOutcome::Failed(TransportError::DeliveryFailed(
                "reply timed out".to_string(),
            ));
        }
        debug!(bytes = payload.len(), "[ms-03] Loopback live send");
        self.peer().receive_message(payload);
        DeliveryOutcome::Acked
    }

    fn enqueue_durable(&self, payload: Vec<u8>) -> Result<(), TransportError> {
        if payload.is_empty() {
            return Err(TransportError::QueueRejected("empty payload".to_string()));
        }
        self.own().outbox.lock().push_back(payload);
        if self.is_reachable() {
            self.link.flush(self.side);
        }
        Ok(())
    }

    async fn update_application_context(&self, payload: Vec<u8>) -> Result<(), TransportError> {
        if self.is_reachable() {
            self.peer().receive_context(payload);
        } else {
            // Latest wins while the peer is away
            *self.own().context_outbox.lock() = Some(payload);
        }
        Ok(())
    }

    fn pending_application_context(&self) -> Option<Vec<u8>> {
        self.own().context.lock().clone()
    }
}
