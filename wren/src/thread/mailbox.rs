use flume::{Receiver, Selector, Sender};
use wren_api::types::BoxedMessage;

use crate::thread::error::MailboxError;

/// Creates the two halves of an actor mailbox.
///
/// `capacity` follows [`ThreadActorConfig::mailbox_capacity`](crate::thread::config::ThreadActorConfig::mailbox_capacity).
pub fn channel(capacity: Option<usize>) -> (MailboxSender, Mailbox) {
    let (sender, receiver) = match capacity {
        Some(capacity) => flume::bounded(capacity),
        None => flume::unbounded(),
    };
    // One pending stop signal is enough; repeated closes collapse into it.
    let (stop_tx, stop_rx) = flume::bounded(1);

    let mailbox_sender = MailboxSender {
        sender,
        stop: stop_tx,
        capacity,
    };
    let mailbox = Mailbox {
        receiver,
        stop: stop_rx,
        capacity,
    };
    (mailbox_sender, mailbox)
}

/// The sending half of a mailbox. Cloned into every handle of the actor.
#[derive(Debug, Clone)]
pub struct MailboxSender {
    sender: Sender<BoxedMessage>,
    stop: Sender<()>,
    capacity: Option<usize>,
}

impl MailboxSender {
    /// Enqueues a message, blocking while a bounded mailbox is full.
    pub fn push(&self, msg: BoxedMessage) -> Result<(), MailboxError> {
        self.sender.send(msg).map_err(|_| MailboxError::Disconnected)
    }

    /// Wakes the worker so it notices it has been closed.
    pub fn signal_stop(&self) {
        let _ = self.stop.try_send(());
    }

    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    /// Messages waiting in the mailbox (snapshot in time).
    pub fn len(&self) -> usize {
        self.sender.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sender.is_empty()
    }
}

/// The receiving half of a mailbox, owned by the actor's worker thread.
#[derive(Debug)]
pub struct Mailbox {
    receiver: Receiver<BoxedMessage>,
    stop: Receiver<()>,
    capacity: Option<usize>,
}

enum Next {
    Message(BoxedMessage),
    Stop,
    Drain,
}

impl Mailbox {
    /// Waits for the next message in FIFO order.
    ///
    /// Returns `None` when a stop signal arrives, or once every sender is
    /// gone and the queue has been drained.
    pub fn pop(&self) -> Option<BoxedMessage> {
        let next = Selector::new()
            .recv(&self.stop, |signal| match signal {
                Ok(()) => Next::Stop,
                // Every handle is gone; hand out whatever is still queued.
                Err(_) => Next::Drain,
            })
            .recv(&self.receiver, |msg| match msg {
                Ok(msg) => Next::Message(msg),
                Err(_) => Next::Stop,
            })
            .wait();

        match next {
            Next::Message(msg) => Some(msg),
            Next::Stop => None,
            Next::Drain => self.receiver.try_recv().ok(),
        }
    }

    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.receiver.len()
    }

    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_push_and_pop_in_order() {
        let (sender, mailbox) = channel(None);
        for i in 0..5 {
            sender.push(Box::new(i)).unwrap();
        }
        assert_eq!(mailbox.len(), 5);

        for i in 0..5 {
            let msg = mailbox.pop().unwrap();
            assert_eq!(*msg.downcast::<i32>().unwrap(), i);
        }
        assert!(mailbox.is_empty());
    }

    #[test]
    fn test_stop_signal_wakes_pop() {
        let (sender, mailbox) = channel(Some(4));
        let waker = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            sender.signal_stop();
            sender
        });

        assert!(mailbox.pop().is_none());
        let sender = waker.join().unwrap();
        // Repeated signals do not block or pile up.
        sender.signal_stop();
        sender.signal_stop();
    }

    #[test]
    fn test_drains_after_senders_dropped() {
        let (sender, mailbox) = channel(None);
        sender.push(Box::new("a")).unwrap();
        sender.push(Box::new("b")).unwrap();
        drop(sender);

        assert_eq!(*mailbox.pop().unwrap().downcast::<&str>().unwrap(), "a");
        assert_eq!(*mailbox.pop().unwrap().downcast::<&str>().unwrap(), "b");
        assert!(mailbox.pop().is_none());
    }

    #[test]
    fn test_push_after_receiver_dropped() {
        let (sender, mailbox) = channel(Some(1));
        drop(mailbox);
        assert_eq!(sender.push(Box::new(1)), Err(MailboxError::Disconnected));
    }

    #[test]
    fn test_rendezvous_mailbox_hands_off() {
        let (sender, mailbox) = channel(Some(0));
        assert_eq!(sender.capacity(), Some(0));
        let producer = thread::spawn(move || {
            for i in 0..3 {
                sender.push(Box::new(i)).unwrap();
            }
        });

        for i in 0..3 {
            assert_eq!(*mailbox.pop().unwrap().downcast::<i32>().unwrap(), i);
        }
        producer.join().unwrap();
    }
}
