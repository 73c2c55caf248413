// Copyright 2025 the Kinetic Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Structural errors of the view tree.

use thiserror::Error;

use crate::types::ViewId;

/// Misuse of the view tree structure.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewError {
    /// The id refers to a view that was removed.
    #[error("view {0:?} is no longer in the tree")]
    StaleView(ViewId),

    /// Children can only be added to views created as groups.
    #[error("view {0:?} is not a group")]
    NotAGroup(ViewId),
}

/// Result type for view tree operations.
pub type Result<T> = core::result::Result<T, ViewError>;
