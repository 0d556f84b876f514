/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use tracing::Instrument;

use crate::context::OperationContext;
use crate::error::{self, Error};
use crate::Config;

/// Storage for certificate data used by an automatic certificate manager.
///
/// Keys are opaque strings chosen by the certificate manager (domain names, account key
/// names, ...) and values are opaque bytes.
#[async_trait]
pub trait CertCache: Send + Sync {
    /// Returns the data stored under `key`.
    ///
    /// Fails with [`ErrorKind::CacheMiss`](crate::error::ErrorKind::CacheMiss) if nothing is
    /// stored under `key`.
    async fn get(&self, ctx: &OperationContext, key: &str) -> Result<Bytes, Error>;

    /// Stores `data` under `key`, replacing any previous value.
    async fn put(&self, ctx: &OperationContext, key: &str, data: Bytes) -> Result<(), Error>;

    /// Removes the data stored under `key`. Removing an absent key succeeds.
    async fn delete(&self, ctx: &OperationContext, key: &str) -> Result<(), Error>;
}

/// Certificate cache persisted to an S3 bucket.
///
/// Every key is stored as the object `key_prefix + key` in the configured bucket. Objects are
/// written with server-side encryption.
///
/// Each operation waits on the object store only as long as its [`OperationContext`] allows.
/// A cancelled `put` or `delete` may still have been applied.
///
/// `Cache` is cheap to clone, clones share the same configuration and client.
#[derive(Debug, Clone)]
pub struct Cache {
    handle: Arc<Handle>,
}

/// Whatever is needed to carry out operations
#[derive(Debug)]
struct Handle {
    config: Config,
}

impl Cache {
    /// Creates a new cache from a config.
    pub fn new(config: Config) -> Cache {
        tracing::debug!(
            bucket = config.bucket(),
            key_prefix = config.key_prefix(),
            region = config.region(),
            "created S3 certificate cache"
        );
        Cache {
            handle: Arc::new(Handle { config }),
        }
    }

    /// Returns the cache's configuration
    pub fn config(&self) -> &Config {
        &self.handle.config
    }

    /// The bucket certificate data is stored in
    pub fn bucket(&self) -> &str {
        self.config().bucket()
    }

    /// The prefix prepended to every key
    pub fn key_prefix(&self) -> &str {
        self.config().key_prefix()
    }

    /// The region the bucket lives in
    pub fn region(&self) -> &str {
        self.config().region()
    }

    /// The object key `key` is stored under
    pub fn object_key(&self, key: &str) -> String {
        format!("{}{}", self.key_prefix(), key)
    }

    fn log(&self, args: fmt::Arguments<'_>) {
        self.config().logger().log(args);
    }
}

#[async_trait]
impl CertCache for Cache {
    async fn get(&self, ctx: &OperationContext, key: &str) -> Result<Bytes, Error> {
        let key = self.object_key(key);
        self.log(format_args!("S3 Cache Get {key}"));

        let config = self.config();
        let data = until_done(ctx, config.object_store().get_object(config.bucket(), &key))
            .instrument(tracing::debug_span!("cache-get", key = %key))
            .await?;

        data.ok_or_else(|| {
            tracing::debug!(key = %key, "cache miss");
            error::cache_miss()
        })
    }

    async fn put(&self, ctx: &OperationContext, key: &str, data: Bytes) -> Result<(), Error> {
        let key = self.object_key(key);
        self.log(format_args!("S3 Cache Put {key}"));

        let config = self.config();
        let size = data.len();
        until_done(
            ctx,
            config.object_store().put_object(config.bucket(), &key, data),
        )
        .instrument(tracing::debug_span!("cache-put", key = %key, size))
        .await
    }

    async fn delete(&self, ctx: &OperationContext, key: &str) -> Result<(), Error> {
        let key = self.object_key(key);
        self.log(format_args!("S3 Cache Delete {key}"));

        let config = self.config();
        until_done(ctx, config.object_store().delete_object(config.bucket(), &key))
            .instrument(tracing::debug_span!("cache-delete", key = %key))
            .await
    }
}

/// Drive `op` until it completes or `ctx` is done, whichever happens first.
///
/// A context that is already done wins, `op` is then never polled. When `ctx` finishes first
/// `op` is dropped mid-flight.
async fn until_done<T, F>(ctx: &OperationContext, op: F) -> Result<T, Error>
where
    F: Future<Output = Result<T, Error>>,
{
    tokio::select! {
        biased;
        err = ctx.done() => {
            tracing::debug!("operation context done before the storage request completed: {err}");
            Err(err)
        }
        result = op => result,
    }
}
