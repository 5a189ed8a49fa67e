//! # Bounded hand-off between the scheduler and the display consumer.
//!
//! [`BoundedChannel`] is the classic counting-semaphore buffer:
//!
//! ```text
//! send(item):  slots.acquire() ─► lock buf ─► push_back ─► items.add_permits(1)
//! recv():      items.acquire() ─► lock buf ─► pop_front ─► slots.add_permits(1)
//! ```
//!
//! ## Rules
//! - `0 ≤ len ≤ capacity` at all times; items leave in the order they entered.
//! - Producers block while full, consumers block while empty; nobody spins.
//! - A permit is released back only after the buffer changed, so a send or
//!   recv dropped mid-wait neither leaks capacity nor loses an item.
//! - After [`close`](BoundedChannel::close) sends fail; receivers drain what is
//!   left, then observe [`ChannelClosed`].

use std::collections::VecDeque;

use tokio::sync::{Mutex, Semaphore};

use crate::error::ChannelClosed;

/// Fixed-capacity FIFO with blocking send and receive.
#[derive(Debug)]
pub struct BoundedChannel<T> {
    slots: Semaphore,
    items: Semaphore,
    buf: Mutex<VecDeque<T>>,
    capacity: usize,
}

impl<T> BoundedChannel<T> {
    /// Creates a channel holding at most `capacity` items (min 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            slots: Semaphore::new(capacity),
            items: Semaphore::new(0),
            buf: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
        }
    }

    /// Appends `item`, waiting while the channel is full.
    pub async fn send(&self, item: T) -> Result<(), ChannelClosed> {
        let permit = self.slots.acquire().await.map_err(|_| ChannelClosed)?;
        self.buf.lock().await.push_back(item);
        permit.forget();
        self.items.add_permits(1);
        Ok(())
    }

    /// Removes the oldest item, waiting while the channel is empty.
    ///
    /// Once closed, leftovers are still returned in order before the error.
    pub async fn recv(&self) -> Result<T, ChannelClosed> {
        match self.items.acquire().await {
            Ok(permit) => {
                let mut buf = self.buf.lock().await;
                let item = buf.pop_front().ok_or(ChannelClosed)?;
                drop(buf);
                permit.forget();
                self.slots.add_permits(1);
                Ok(item)
            }
            Err(_) => self.buf.lock().await.pop_front().ok_or(ChannelClosed),
        }
    }

    /// Fails pending and future sends and wakes every waiter.
    pub fn close(&self) {
        self.slots.close();
        self.items.close();
    }

    #[inline]
    pub fn is_closed(&self) -> bool {
        self.items.is_closed()
    }

    /// Items currently buffered.
    pub async fn len(&self) -> usize {
        self.buf.lock().await.len()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
