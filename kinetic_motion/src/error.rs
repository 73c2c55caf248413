// Copyright 2025 the Kinetic Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Errors raised while building or splitting motion events.

use thiserror::Error;

use crate::pointer::{MAX_POINTER_ID, PointerId};

/// Malformed motion event input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MotionError {
    /// Pointer ids must lie in `0..=MAX_POINTER_ID`.
    #[error("pointer id {0} is out of range (max {MAX_POINTER_ID})")]
    InvalidPointerId(PointerId),

    /// Each pointer may appear once per event.
    #[error("pointer id {0} appears more than once")]
    DuplicatePointerId(PointerId),

    /// An event needs at least one pointer.
    #[error("motion event has no pointers")]
    NoPointers,

    /// `PointerDown`/`PointerUp` must index an existing pointer.
    #[error("action pointer index {index} is out of range for {count} pointers")]
    ActionIndexOutOfRange {
        /// Requested index.
        index: usize,
        /// Number of pointers in the event.
        count: usize,
    },

    /// History samples carry one position per pointer.
    #[error("history sample has {got} positions, expected {expected}")]
    HistoryLengthMismatch {
        /// Positions supplied.
        got: usize,
        /// Pointers in the event.
        expected: usize,
    },

    /// Splitting by a set with no pointer of the event.
    #[error("split by pointer ids {0:#x} leaves no pointers")]
    EmptySplit(u32),
}

/// Result type for motion event construction.
pub type Result<T> = core::result::Result<T, MotionError>;
