// This is free and unencumbered software released into the public domain.

use crate::shared::{BridgeError, BridgeResult};
use bytes::Bytes;
use std::sync::mpsc::{Receiver, SyncSender, TrySendError, sync_channel};

/// One encoded message on a named channel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Envelope {
    pub channel: String,
    pub payload: Bytes,
}

/// Outbound half of the message boundary. Sends never wait for a reply.
pub trait BinaryMessenger: Send + Sync {
    fn send(&self, channel: &str, payload: Bytes) -> BridgeResult;
}

/// Bounded in-process messenger; the receiving end is handed to whoever
/// forwards messages to the remote side.
#[derive(Clone, Debug)]
pub struct QueueMessenger {
    tx: SyncSender<Envelope>,
}

impl QueueMessenger {
    pub fn new(capacity: usize) -> (Self, Receiver<Envelope>) {
        let (tx, rx) = sync_channel(capacity.max(1));
        (Self { tx }, rx)
    }
}

impl BinaryMessenger for QueueMessenger {
    fn send(&self, channel: &str, payload: Bytes) -> BridgeResult {
        let envelope = Envelope {
            channel: channel.to_owned(),
            payload,
        };
        match self.tx.try_send(envelope) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => Err(BridgeError::ChannelFull),
            Err(TrySendError::Disconnected(_)) => Err(BridgeError::Closed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_queue_does_not_block() {
        let (messenger, rx) = QueueMessenger::new(1);
        messenger.send("a", Bytes::from_static(b"1")).unwrap();
        assert!(matches!(
            messenger.send("a", Bytes::from_static(b"2")),
            Err(BridgeError::ChannelFull)
        ));
        assert_eq!(rx.try_recv().unwrap().payload, Bytes::from_static(b"1"));
    }

    #[test]
    fn dropped_receiver_reports_closed() {
        let (messenger, rx) = QueueMessenger::new(4);
        drop(rx);
        assert!(matches!(
            messenger.send("a", Bytes::new()),
            Err(BridgeError::Closed)
        ));
    }
}
