// Copyright 2026 the Cascada Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Queue between library callbacks and the controller.
//!
//! Player libraries may fire callbacks while the controller is already
//! borrowed (for example an error raised synchronously from `setup`). Callbacks
//! therefore never touch the controller: they [`post`](SignalMailbox::post)
//! a [`Signal`] and wake the owner, which drains the queue once it can borrow
//! the controller. Anything left behind by a failed borrow is picked up by
//! the next drain.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use cascada_core::engine::Signal;

/// FIFO of pending signals plus an optional wake-up hook.
#[derive(Default)]
pub struct SignalMailbox {
    queue: RefCell<VecDeque<Signal>>,
    waker: RefCell<Option<Rc<dyn Fn()>>>,
}

impl core::fmt::Debug for SignalMailbox {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SignalMailbox")
            .field("pending", &self.queue.borrow().len())
            .field("waker", &self.waker.borrow().is_some())
            .finish()
    }
}

impl SignalMailbox {
    /// Creates an empty mailbox with no waker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs the hook called after every [`post`](Self::post).
    pub fn set_waker(&self, waker: impl Fn() + 'static) {
        *self.waker.borrow_mut() = Some(Rc::new(waker));
    }

    /// Queues a signal and wakes the owner.
    pub fn post(&self, signal: Signal) {
        self.queue.borrow_mut().push_back(signal);
        let waker = self.waker.borrow().clone();
        if let Some(waker) = waker {
            waker();
        }
    }

    /// Removes the oldest pending signal.
    pub fn pop(&self) -> Option<Signal> {
        self.queue.borrow_mut().pop_front()
    }

    /// Pops signals into `deliver` until the queue is empty, including
    /// signals posted while `deliver` runs.
    pub fn drain_into(&self, mut deliver: impl FnMut(Signal)) {
        while let Some(signal) = self.pop() {
            deliver(signal);
        }
    }

    /// Number of pending signals.
    #[must_use]
    pub fn len(&self) -> usize {
        self.queue.borrow().len()
    }

    /// Returns `true` if nothing is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue.borrow().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    use cascada_core::engine::PlaybackEvent;
    use cascada_core::resource::Generation;

    fn can_play(raw: u64) -> Signal {
        Signal::new(Generation::from_raw(raw), PlaybackEvent::CanPlay)
    }

    #[test]
    fn post_wakes_owner() {
        let mailbox = SignalMailbox::new();
        let woken = Rc::new(Cell::new(0));
        let counter = Rc::clone(&woken);
        mailbox.set_waker(move || counter.set(counter.get() + 1));

        mailbox.post(can_play(1));
        mailbox.post(can_play(2));

        assert_eq!(woken.get(), 2);
        assert_eq!(mailbox.len(), 2);
    }

    #[test]
    fn drain_is_fifo_and_sees_reentrant_posts() {
        let mailbox = Rc::new(SignalMailbox::new());
        mailbox.post(can_play(1));

        let mut seen = Vec::new();
        let inner = Rc::clone(&mailbox);
        mailbox.drain_into(|signal| {
            if signal.generation == Generation::from_raw(1) {
                inner.post(can_play(2));
            }
            seen.push(signal.generation.get());
        });

        assert_eq!(seen, [1, 2]);
        assert!(mailbox.is_empty());
    }

    #[test]
    fn waker_may_drain_during_post() {
        let mailbox = Rc::new(SignalMailbox::new());
        let delivered = Rc::new(RefCell::new(Vec::new()));
        {
            let weak = Rc::downgrade(&mailbox);
            let delivered = Rc::clone(&delivered);
            mailbox.set_waker(move || {
                if let Some(mailbox) = weak.upgrade() {
                    mailbox.drain_into(|signal| delivered.borrow_mut().push(signal));
                }
            });
        }

        mailbox.post(can_play(7));

        assert_eq!(delivered.borrow().len(), 1);
        assert!(mailbox.is_empty());
    }
}
