/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::error::{self, Error};

/// Cancellation signal and optional deadline passed to every cache operation.
///
/// A cache operation stops waiting on the object store as soon as the context is cancelled or
/// its deadline passes, and returns [`ErrorKind::OperationCancelled`] or
/// [`ErrorKind::DeadlineExceeded`] respectively. The storage request is dropped at that point,
/// but it may already have been applied by S3: callers must treat cancellation of a `put` or
/// `delete` as an unknown outcome.
///
/// Cloning a context shares its cancellation token.
///
/// [`ErrorKind::OperationCancelled`]: crate::error::ErrorKind::OperationCancelled
/// [`ErrorKind::DeadlineExceeded`]: crate::error::ErrorKind::DeadlineExceeded
#[derive(Debug, Clone, Default)]
pub struct OperationContext {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl OperationContext {
    /// A context that is never cancelled and has no deadline.
    pub fn background() -> Self {
        Self::default()
    }

    /// A context cancelled by the given token.
    pub fn new(token: CancellationToken) -> Self {
        Self {
            token,
            deadline: None,
        }
    }

    /// Bound the context by a timeout measured from now.
    ///
    /// An existing earlier deadline is kept.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Bound the context by an absolute deadline.
    ///
    /// An existing earlier deadline is kept.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(match self.deadline {
            Some(current) => current.min(deadline),
            None => deadline,
        });
        self
    }

    /// Cancel the context and every clone of it.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Returns true if the context has been cancelled or its deadline has passed.
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled() || self.deadline.is_some_and(|at| at <= Instant::now())
    }

    /// The cancellation token backing this context
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// The deadline of this context, if any
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Resolves once the context is done, to the error the interrupted operation reports.
    pub(crate) async fn done(&self) -> Error {
        match self.deadline {
            Some(deadline) => {
                tokio::select! {
                    biased;
                    _ = self.token.cancelled() => error::operation_cancelled(),
                    _ = tokio::time::sleep_until(deadline) => error::deadline_exceeded(),
                }
            }
            None => {
                self.token.cancelled().await;
                error::operation_cancelled()
            }
        }
    }
}
