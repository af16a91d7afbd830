// CLASSIFICATION: COMMUNITY
// Filename: port.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-19

//! Point-to-point message ports between execution contexts.
//!
//! Delivery is one-way and best-effort. Messages from one sender to one
//! inbox keep their send order; nothing is promised across senders.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{DevError, DevResult};

/// Opaque numeric destination of a message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PortId(pub u64);

impl fmt::Display for PortId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Port on which the originator of a request expects its single reply.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReplyChannel(pub PortId);

impl ReplyChannel {
    pub fn port(self) -> PortId {
        self.0
    }
}

/// Payload delivered into an inbox.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Message {
    Null,
    Json(serde_json::Value),
}

impl Message {
    pub fn is_null(&self) -> bool {
        matches!(self, Message::Null)
    }

    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            Message::Json(v) => Some(v),
            Message::Null => None,
        }
    }
}

/// Send primitive used by the dispatcher and forwarders.
pub trait PortTransport: Send + Sync {
    /// Post `msg` to `dest`. Returns whether a live inbox accepted it.
    fn post(&self, dest: PortId, msg: Message) -> bool;
}

/// In-process port table backed by `mpsc` channels.
pub struct PortMap {
    next_id: AtomicU64,
    ports: Mutex<HashMap<PortId, Sender<Message>>>,
}

impl Default for PortMap {
    fn default() -> Self {
        Self::new()
    }
}

impl PortMap {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            ports: Mutex::new(HashMap::new()),
        }
    }

    /// Open a new inbox. The port closes when the returned receiver drops.
    pub fn open_port(self: &Arc<Self>) -> DevResult<(PortId, PortReceiver)> {
        let mut ports = self.ports.lock().map_err(|_| DevError::LockPoisoned)?;
        let id = PortId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let (tx, rx) = mpsc::channel();
        ports.insert(id, tx);
        debug!("port {} opened", id);
        Ok((
            id,
            PortReceiver {
                id,
                rx,
                ports: Arc::downgrade(self),
            },
        ))
    }

    pub fn close_port(&self, id: PortId) -> bool {
        let removed = self
            .ports
            .lock()
            .map(|mut ports| ports.remove(&id).is_some())
            .unwrap_or(false);
        if removed {
            debug!("port {} closed", id);
        }
        removed
    }

    pub fn is_open(&self, id: PortId) -> bool {
        self.ports
            .lock()
            .map(|ports| ports.contains_key(&id))
            .unwrap_or(false)
    }

    pub fn open_count(&self) -> usize {
        self.ports.lock().map(|ports| ports.len()).unwrap_or(0)
    }
}

impl PortTransport for PortMap {
    fn post(&self, dest: PortId, msg: Message) -> bool {
        let tx = match self.ports.lock() {
            Ok(ports) => ports.get(&dest).cloned(),
            Err(_) => None,
        };
        match tx {
            Some(tx) => tx.send(msg).is_ok(),
            None => {
                debug!("dropping message for unknown port {}", dest);
                false
            }
        }
    }
}

/// Receiving end of a port. Dropping it closes the port.
#[derive(Debug)]
pub struct PortReceiver {
    id: PortId,
    rx: Receiver<Message>,
    ports: Weak<PortMap>,
}

impl PortReceiver {
    pub fn id(&self) -> PortId {
        self.id
    }

    /// Block until a message arrives or every sender is gone.
    pub fn recv(&self) -> Option<Message> {
        self.rx.recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Result<Message, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }

    pub fn try_recv(&self) -> Result<Message, TryRecvError> {
        self.rx.try_recv()
    }

    pub fn try_iter(&self) -> mpsc::TryIter<'_, Message> {
        self.rx.try_iter()
    }

    /// Messages until the port is closed.
    pub fn iter(&self) -> mpsc::Iter<'_, Message> {
        self.rx.iter()
    }
}

impl Drop for PortReceiver {
    fn drop(&mut self) {
        if let Some(ports) = self.ports.upgrade() {
            ports.close_port(self.id);
        }
    }
}
