// Copyright 2025 the Kinetic Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Touch and hover target chains with per-thread node recycling.
//!
//! A group records which children receive the pointers of the current gesture as a singly
//! linked chain. New targets are pushed at the head, so the tail is the least recently added
//! target. Chain nodes come from a small per-thread recycle bin; when the bin is empty a node
//! is allocated, and when it is full a released node is dropped.

use std::cell::RefCell;

use kinetic_motion::PointerIdBits;
use smallvec::SmallVec;

use crate::types::ViewId;

/// Largest number of nodes kept per recycle bin.
pub(crate) const MAX_RECYCLED: usize = 32;

#[derive(Debug)]
pub(crate) struct TargetNode<P> {
    child: ViewId,
    payload: P,
    next: Option<Box<TargetNode<P>>>,
}

/// Payloads that have a per-thread recycle bin.
pub(crate) trait Pooled: Copy + Sized + 'static {
    /// Runs `f` on this payload's bin; `None` if the thread is tearing down.
    fn with_bin<R>(f: impl FnOnce(&mut Vec<Box<TargetNode<Self>>>) -> R) -> Option<R>;
}

thread_local! {
    static TOUCH_TARGET_BIN: RefCell<Vec<Box<TargetNode<PointerIdBits>>>> =
        const { RefCell::new(Vec::new()) };
    static HOVER_TARGET_BIN: RefCell<Vec<Box<TargetNode<()>>>> =
        const { RefCell::new(Vec::new()) };
}

impl Pooled for PointerIdBits {
    fn with_bin<R>(f: impl FnOnce(&mut Vec<Box<TargetNode<Self>>>) -> R) -> Option<R> {
        TOUCH_TARGET_BIN
            .try_with(|bin| f(&mut bin.borrow_mut()))
            .ok()
    }
}

impl Pooled for () {
    fn with_bin<R>(f: impl FnOnce(&mut Vec<Box<TargetNode<Self>>>) -> R) -> Option<R> {
        HOVER_TARGET_BIN
            .try_with(|bin| f(&mut bin.borrow_mut()))
            .ok()
    }
}

fn obtain<P: Pooled>(child: ViewId, payload: P) -> Box<TargetNode<P>> {
    match P::with_bin(Vec::pop).flatten() {
        Some(mut node) => {
            node.child = child;
            node.payload = payload;
            node.next = None;
            node
        }
        None => Box::new(TargetNode {
            child,
            payload,
            next: None,
        }),
    }
}

fn recycle<P: Pooled>(mut node: Box<TargetNode<P>>) {
    debug_assert!(node.next.is_none(), "recycled target nodes must be unlinked");
    node.next = None;
    P::with_bin(|bin| {
        if bin.len() < MAX_RECYCLED {
            bin.push(node);
        }
    });
}

/// Number of nodes currently in the recycle bin for `P` on this thread.
#[cfg(test)]
pub(crate) fn recycled_count<P: Pooled>() -> usize {
    P::with_bin(|bin| bin.len()).unwrap_or(0)
}

/// A chain of targets, most recently added first.
#[derive(Debug)]
pub(crate) struct TargetList<P: Pooled> {
    head: Option<Box<TargetNode<P>>>,
}

/// Children receiving pointers of the current gesture, with the pointer ids each one owns.
pub(crate) type TouchTargets = TargetList<PointerIdBits>;

/// Children currently under a hovering pointer.
pub(crate) type HoverTargets = TargetList<()>;

impl<P: Pooled> Default for TargetList<P> {
    fn default() -> Self {
        Self { head: None }
    }
}

impl<P: Pooled> TargetList<P> {
    pub(crate) fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    pub(crate) fn len(&self) -> usize {
        self.iter().count()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (ViewId, P)> + '_ {
        let mut cur = self.head.as_deref();
        core::iter::from_fn(move || {
            let node = cur?;
            cur = node.next.as_deref();
            Some((node.child, node.payload))
        })
    }

    /// Copies the chain so the caller can dispatch while the chain changes.
    pub(crate) fn snapshot(&self) -> SmallVec<[(ViewId, P); 4]> {
        self.iter().collect()
    }

    pub(crate) fn contains(&self, child: ViewId) -> bool {
        self.iter().any(|(c, _)| c == child)
    }

    pub(crate) fn get(&self, child: ViewId) -> Option<P> {
        self.iter().find(|(c, _)| *c == child).map(|(_, p)| p)
    }

    pub(crate) fn get_mut(&mut self, child: ViewId) -> Option<&mut P> {
        let mut cur = self.head.as_deref_mut();
        while let Some(node) = cur {
            if node.child == child {
                return Some(&mut node.payload);
            }
            cur = node.next.as_deref_mut();
        }
        None
    }

    fn last_node_mut(&mut self) -> Option<&mut TargetNode<P>> {
        let mut cur = self.head.as_deref_mut()?;
        while cur.next.is_some() {
            cur = cur.next.as_deref_mut()?;
        }
        Some(cur)
    }

    /// The least recently added target.
    pub(crate) fn last_mut(&mut self) -> Option<&mut P> {
        self.last_node_mut().map(|node| &mut node.payload)
    }

    /// Adds a target at the head of the chain.
    pub(crate) fn push_front(&mut self, child: ViewId, payload: P) {
        let mut node = obtain(child, payload);
        node.next = self.head.take();
        self.head = Some(node);
    }

    /// Adds a target at the tail of the chain.
    pub(crate) fn push_back(&mut self, child: ViewId, payload: P) {
        let node = obtain(child, payload);
        match self.last_node_mut() {
            Some(last) => last.next = Some(node),
            None => self.head = Some(node),
        }
    }

    /// Keeps the targets for which `keep` returns `true`, recycling the rest. Order is kept.
    pub(crate) fn retain_mut(&mut self, mut keep: impl FnMut(ViewId, &mut P) -> bool) {
        let mut rest = self.head.take();
        let mut tail = &mut self.head;
        while let Some(mut node) = rest {
            rest = node.next.take();
            if keep(node.child, &mut node.payload) {
                tail = &mut tail.insert(node).next;
            } else {
                recycle(node);
            }
        }
    }

    /// Unlinks the target for `child` and returns its payload.
    pub(crate) fn remove(&mut self, child: ViewId) -> Option<P> {
        let mut removed = None;
        self.retain_mut(|c, p| {
            if removed.is_none() && c == child {
                removed = Some(*p);
                false
            } else {
                true
            }
        });
        removed
    }

    /// Recycles every target.
    pub(crate) fn clear(&mut self) {
        let mut rest = self.head.take();
        while let Some(mut node) = rest {
            rest = node.next.take();
            recycle(node);
        }
    }
}

impl<P: Pooled> Drop for TargetList<P> {
    fn drop(&mut self) {
        self.clear();
    }
}

impl TouchTargets {
    /// Strips `bits` from every target, recycling targets left with no pointers.
    pub(crate) fn remove_pointers(&mut self, bits: PointerIdBits) {
        self.retain_mut(|_, target_bits| {
            if target_bits.intersects(bits) {
                *target_bits = target_bits.without(bits);
            }
            !target_bits.is_empty()
        });
    }
}
