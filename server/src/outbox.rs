use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::Notify;

use crate::connection::ConnectionEvent;

pub type ConnectionTx = Arc<Outbox>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutboxLimits {
    /// Video frames kept per recipient; older frames are replaced.
    pub frame_capacity: usize,
    /// Undelivered strokes and notices before a recipient counts as lagging.
    pub backlog_limit: usize,
}

impl Default for OutboxLimits {
    fn default() -> Self {
        Self {
            frame_capacity: 4,
            backlog_limit: 1024,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Queued,
    /// Queued after discarding the oldest pending video frame.
    ReplacedOldestFrame,
    /// Queued, but the recipient is above its backlog limit.
    Lagging,
    Closed,
}

#[derive(Debug)]
struct Queue {
    events: VecDeque<ConnectionEvent>,
    frames: usize,
    closed: bool,
}

/// Outbound queue of one connection.
///
/// The server loop pushes without waiting; the connection drains at the pace
/// of its socket. Video frames are bounded and drop oldest first, everything
/// else is kept until delivered.
#[derive(Debug)]
pub struct Outbox {
    queue: Mutex<Queue>,
    notify: Notify,
    limits: OutboxLimits,
}

impl Outbox {
    pub fn new(limits: OutboxLimits) -> Self {
        Self {
            queue: Mutex::new(Queue {
                events: VecDeque::new(),
                frames: 0,
                closed: false,
            }),
            notify: Notify::new(),
            limits: OutboxLimits {
                frame_capacity: limits.frame_capacity.max(1),
                backlog_limit: limits.backlog_limit.max(1),
            },
        }
    }

    pub fn push(&self, event: ConnectionEvent) -> Delivery {
        let mut queue = self.lock();
        if queue.closed {
            return Delivery::Closed;
        }

        let mut delivery = Delivery::Queued;
        let is_frame = event.is_video_frame();
        if is_frame {
            if queue.frames >= self.limits.frame_capacity {
                if let Some(oldest) = queue.events.iter().position(ConnectionEvent::is_video_frame)
                {
                    queue.events.remove(oldest);
                    queue.frames -= 1;
                    delivery = Delivery::ReplacedOldestFrame;
                }
            }
            queue.frames += 1;
        }
        queue.events.push_back(event);

        if !is_frame && queue.events.len() - queue.frames > self.limits.backlog_limit {
            delivery = Delivery::Lagging;
        }
        drop(queue);

        self.notify.notify_one();
        delivery
    }

    /// Queues a last event and refuses everything after it.
    pub fn finish(&self, event: ConnectionEvent) {
        let mut queue = self.lock();
        if queue.closed {
            return;
        }
        queue.events.push_back(event);
        queue.closed = true;
        drop(queue);
        self.notify.notify_one();
    }

    /// Discards the backlog, then behaves like [`Outbox::finish`].
    pub fn evict(&self, event: ConnectionEvent) {
        let mut queue = self.lock();
        queue.events.clear();
        queue.frames = 0;
        queue.events.push_back(event);
        queue.closed = true;
        drop(queue);
        self.notify.notify_one();
    }

    pub fn close(&self) {
        self.lock().closed = true;
        self.notify.notify_one();
    }

    /// Waits for the next event. Returns `None` once closed and drained.
    pub async fn recv(&self) -> Option<ConnectionEvent> {
        loop {
            {
                let mut queue = self.lock();
                if let Some(event) = Self::pop(&mut queue) {
                    return Some(event);
                }
                if queue.closed {
                    return None;
                }
            }
            self.notify.notified().await;
        }
    }

    pub fn try_recv(&self) -> Option<ConnectionEvent> {
        Self::pop(&mut self.lock())
    }

    pub fn len(&self) -> usize {
        self.lock().events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn pop(queue: &mut Queue) -> Option<ConnectionEvent> {
        let event = queue.events.pop_front()?;
        if event.is_video_frame() {
            queue.frames -= 1;
        }
        Some(event)
    }

    fn lock(&self) -> MutexGuard<'_, Queue> {
        self.queue.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
