/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::fmt;

/// Receives diagnostic lines from a [`Cache`](crate::Cache).
///
/// Logging is purely observational. Implementations must not panic and cannot fail an
/// operation.
pub trait Logger: Send + Sync + fmt::Debug {
    /// Record a single formatted diagnostic line.
    fn log(&self, args: fmt::Arguments<'_>);
}

/// Discards everything. This is the default logger.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopLogger;

impl Logger for NoopLogger {
    fn log(&self, _args: fmt::Arguments<'_>) {}
}

/// Forwards diagnostic lines to [`tracing`] at debug level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn log(&self, args: fmt::Arguments<'_>) {
        tracing::debug!(target: "aws_s3_autocert_cache", "{}", args);
    }
}
