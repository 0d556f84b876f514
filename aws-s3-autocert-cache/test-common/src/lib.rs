/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use async_trait::async_trait;
use aws_s3_autocert_cache::error::{Error, ErrorKind};
use aws_s3_autocert_cache::logger::Logger;
use aws_s3_autocert_cache::storage::ObjectStore;
use bytes::Bytes;
use std::collections::HashMap;
use std::fmt;
use std::sync::Mutex;
use tokio::sync::RwLock;

/// An in-memory object store.
///
/// Objects are keyed by `(bucket, key)` so tests can assert on the exact object keys a cache
/// produces.
#[derive(Debug, Default)]
pub struct InMemoryObjectStore {
    objects: RwLock<HashMap<(String, String), Bytes>>,
}

impl InMemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if an object is stored under `key` in `bucket`
    pub async fn contains(&self, bucket: &str, key: &str) -> bool {
        self.objects
            .read()
            .await
            .contains_key(&(bucket.to_owned(), key.to_owned()))
    }

    /// All object keys stored in `bucket`, sorted
    pub async fn keys(&self, bucket: &str) -> Vec<String> {
        let mut keys: Vec<String> = self
            .objects
            .read()
            .await
            .keys()
            .filter(|(b, _)| b == bucket)
            .map(|(_, key)| key.clone())
            .collect();
        keys.sort();
        keys
    }
}

#[async_trait]
impl ObjectStore for InMemoryObjectStore {
    async fn get_object(&self, bucket: &str, key: &str) -> Result<Option<Bytes>, Error> {
        let objects = self.objects.read().await;
        Ok(objects.get(&(bucket.to_owned(), key.to_owned())).cloned())
    }

    async fn put_object(&self, bucket: &str, key: &str, data: Bytes) -> Result<(), Error> {
        let mut objects = self.objects.write().await;
        objects.insert((bucket.to_owned(), key.to_owned()), data);
        Ok(())
    }

    async fn delete_object(&self, bucket: &str, key: &str) -> Result<(), Error> {
        let mut objects = self.objects.write().await;
        objects.remove(&(bucket.to_owned(), key.to_owned()));
        Ok(())
    }
}

/// An object store failing every request with a storage error carrying `message`
#[derive(Debug)]
pub struct FailingObjectStore {
    message: &'static str,
}

impl FailingObjectStore {
    pub fn new(message: &'static str) -> Self {
        Self { message }
    }

    fn fail(&self) -> Error {
        Error::new(ErrorKind::StorageError, self.message)
    }
}

#[async_trait]
impl ObjectStore for FailingObjectStore {
    async fn get_object(&self, _bucket: &str, _key: &str) -> Result<Option<Bytes>, Error> {
        Err(self.fail())
    }

    async fn put_object(&self, _bucket: &str, _key: &str, _data: Bytes) -> Result<(), Error> {
        Err(self.fail())
    }

    async fn delete_object(&self, _bucket: &str, _key: &str) -> Result<(), Error> {
        Err(self.fail())
    }
}

/// An object store whose requests never complete
#[derive(Debug, Default)]
pub struct PendingObjectStore;

#[async_trait]
impl ObjectStore for PendingObjectStore {
    async fn get_object(&self, _bucket: &str, _key: &str) -> Result<Option<Bytes>, Error> {
        std::future::pending().await
    }

    async fn put_object(&self, _bucket: &str, _key: &str, _data: Bytes) -> Result<(), Error> {
        std::future::pending().await
    }

    async fn delete_object(&self, _bucket: &str, _key: &str) -> Result<(), Error> {
        std::future::pending().await
    }
}

/// Logger keeping every line it receives
#[derive(Debug, Default)]
pub struct RecordingLogger {
    lines: Mutex<Vec<String>>,
}

impl RecordingLogger {
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }
}

impl Logger for RecordingLogger {
    fn log(&self, args: fmt::Arguments<'_>) {
        self.lines.lock().unwrap().push(args.to_string());
    }
}
