/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Object storage backends for the certificate cache.
//!
//! The cache only needs three object operations addressed by `(bucket, key)`. Retries,
//! connection pooling, authentication and consistency are the business of the backend.

use async_trait::async_trait;
use bytes::Bytes;
use std::fmt::Debug;

use crate::error::Error;

mod s3;

pub use self::s3::S3ObjectStore;

/// An object store the cache is persisted to.
///
/// The default implementation is [`S3ObjectStore`]. Other implementations can be plugged in
/// through [`Builder::object_store`](crate::config::Builder::object_store), e.g. in-memory
/// stores for tests.
#[async_trait]
pub trait ObjectStore: Send + Sync + Debug {
    /// Read the object stored under `key`.
    ///
    /// Returns `Ok(None)` when no such object exists. Any other failure is an error.
    async fn get_object(&self, bucket: &str, key: &str) -> Result<Option<Bytes>, Error>;

    /// Store `data` under `key`, encrypted at rest.
    async fn put_object(&self, bucket: &str, key: &str, data: Bytes) -> Result<(), Error>;

    /// Remove the object stored under `key`.
    ///
    /// Removing an absent object must succeed.
    async fn delete_object(&self, bucket: &str, key: &str) -> Result<(), Error>;
}
