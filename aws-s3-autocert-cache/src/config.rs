/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::sync::Arc;

use aws_sdk_s3::config::Credentials;

use crate::dsn::Dsn;
use crate::error::{self, Error};
use crate::logger::{Logger, NoopLogger};
use crate::storage::{ObjectStore, S3ObjectStore};
use crate::DEFAULT_REGION;

/// Loading configuration from the environment
pub mod loader;

/// Separator between key prefix segments and the logical key
const KEY_SEPARATOR: char = '/';

/// Configuration for a [`Cache`](crate::cache::Cache)
#[derive(Debug, Clone)]
pub struct Config {
    region: String,
    bucket: String,
    key_prefix: String,
    credentials: Option<Credentials>,
    store: Arc<dyn ObjectStore>,
    logger: Arc<dyn Logger>,
}

impl Config {
    /// Create a new `Config` builder
    pub fn builder() -> Builder {
        Builder::default()
    }

    /// The region the bucket lives in
    pub fn region(&self) -> &str {
        &self.region
    }

    /// The bucket certificate data is stored in
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// The normalized prefix prepended to every key.
    ///
    /// Either empty or ending with exactly one `/`.
    pub fn key_prefix(&self) -> &str {
        &self.key_prefix
    }

    /// Static credentials overriding the default credential chain
    pub fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }

    /// The object store requests are sent to.
    pub fn object_store(&self) -> &Arc<dyn ObjectStore> {
        &self.store
    }

    /// The logger diagnostic lines are written to
    pub fn logger(&self) -> &Arc<dyn Logger> {
        &self.logger
    }
}

/// Fluent style builder for [Config]
///
/// Settings are applied in call order, a later call overrides an earlier one. This includes
/// [`dsn`](Builder::dsn), so settings meant to override a connection string must
/// come after it.
#[derive(Debug, Clone, Default)]
pub struct Builder {
    pub(crate) region: Option<String>,
    pub(crate) bucket: Option<String>,
    pub(crate) key_prefix: String,
    pub(crate) credentials: Option<Credentials>,
    pub(crate) store: Option<Arc<dyn ObjectStore>>,
    pub(crate) logger: Option<Arc<dyn Logger>>,
}

impl Builder {
    /// Apply the region, bucket and key prefix of a connection string, and its credentials if
    /// it embeds any.
    ///
    /// The region is always set, to `us-east-1` when the connection string names none. See
    /// [`Dsn`] for the accepted format.
    pub fn dsn(self, dsn: &str) -> Result<Self, Error> {
        let dsn = Dsn::parse(dsn)?;
        let mut builder = self
            .region(dsn.region())
            .bucket(dsn.bucket())
            .key_prefix(dsn.prefix());
        if let Some(credentials) = dsn.credentials() {
            builder = builder.credentials(credentials.clone());
        }
        Ok(builder)
    }

    /// The region the bucket lives in.
    ///
    /// Default is `us-east-1`.
    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// The bucket to store certificate data in. Required.
    pub fn bucket(mut self, bucket: impl Into<String>) -> Self {
        self.bucket = Some(bucket.into());
        self
    }

    /// Prefix prepended to every key, e.g. `/prod/certs` stores key `example.com` as
    /// `/prod/certs/example.com`.
    ///
    /// Trailing `/` are trimmed and exactly one is appended. Default is no prefix.
    pub fn key_prefix(mut self, prefix: impl AsRef<str>) -> Self {
        self.key_prefix = normalize_key_prefix(prefix.as_ref());
        self
    }

    /// Static credentials used instead of the default credential provider chain.
    ///
    /// Only used when the S3 client is created by [`ConfigLoader`](loader::ConfigLoader).
    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Set an explicit S3 client to use.
    pub fn client(self, client: aws_sdk_s3::Client) -> Self {
        self.object_store(Arc::new(S3ObjectStore::new(client)))
    }

    /// Set an explicit object store to use instead of S3.
    pub fn object_store(mut self, store: Arc<dyn ObjectStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Logger receiving a diagnostic line per cache operation.
    ///
    /// Default is [`NoopLogger`].
    pub fn logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Consumes the builder and constructs a [`Config`](crate::config::Config)
    ///
    /// Fails if no bucket or no client/object store has been set.
    pub fn build(self) -> Result<Config, Error> {
        let bucket = match self.bucket {
            Some(bucket) if !bucket.is_empty() => bucket,
            _ => return Err(error::invalid_input("bucket is required")),
        };
        let store = self
            .store
            .ok_or_else(|| error::invalid_input("an S3 client or object store is required"))?;

        Ok(Config {
            region: self.region.unwrap_or_else(|| DEFAULT_REGION.to_owned()),
            bucket,
            key_prefix: self.key_prefix,
            credentials: self.credentials,
            store,
            logger: self.logger.unwrap_or_else(|| Arc::new(NoopLogger)),
        })
    }
}

fn normalize_key_prefix(prefix: &str) -> String {
    let prefix = prefix.trim_end_matches(KEY_SEPARATOR);
    if prefix.is_empty() {
        String::new()
    } else {
        format!("{prefix}{KEY_SEPARATOR}")
    }
}

#[cfg(test)]
mod tests {
    use super::{normalize_key_prefix, Config};
    use crate::error::ErrorKind;
    use aws_smithy_mocks_experimental::{mock_client, Rule, RuleMode};

    fn client() -> aws_sdk_s3::Client {
        let no_requests: [&Rule; 0] = [];
        mock_client!(aws_sdk_s3, RuleMode::Sequential, &no_requests)
    }

    #[test]
    fn test_normalize_key_prefix() {
        assert_eq!("", normalize_key_prefix(""));
        assert_eq!("", normalize_key_prefix("/"));
        assert_eq!("", normalize_key_prefix("///"));
        assert_eq!("certs/", normalize_key_prefix("certs"));
        assert_eq!("/path/to/certs/here/", normalize_key_prefix("/path/to/certs/here"));
        assert_eq!("/path/to/certs/here/", normalize_key_prefix("/path/to/certs/here//"));
    }

    #[test]
    fn test_defaults() {
        let config = Config::builder()
            .bucket("my-bucket")
            .client(client())
            .build()
            .unwrap();
        assert_eq!("us-east-1", config.region());
        assert_eq!("my-bucket", config.bucket());
        assert_eq!("", config.key_prefix());
        assert!(config.credentials().is_none());
    }

    #[test]
    fn test_bucket_and_store_required() {
        let err = Config::builder().client(client()).build().unwrap_err();
        assert_eq!(&ErrorKind::InputInvalid, err.kind());

        let err = Config::builder()
            .bucket("")
            .client(client())
            .build()
            .unwrap_err();
        assert_eq!(&ErrorKind::InputInvalid, err.kind());

        let err = Config::builder().bucket("my-bucket").build().unwrap_err();
        assert_eq!(&ErrorKind::InputInvalid, err.kind());
    }

    #[test]
    fn test_dsn_then_overrides() {
        let config = Config::builder()
            .dsn("s3://example.com.s3-us-west-1.amazonaws.com/dev/test/path")
            .unwrap()
            .key_prefix("/override")
            .client(client())
            .build()
            .unwrap();
        assert_eq!("us-west-1", config.region());
        assert_eq!("example.com", config.bucket());
        assert_eq!("/override/", config.key_prefix());
    }

    #[test]
    fn test_overrides_then_dsn() {
        let config = Config::builder()
            .region("eu-west-1")
            .bucket("other-bucket")
            .dsn("s3://my-bucket/path/to/certs/here")
            .unwrap()
            .client(client())
            .build()
            .unwrap();
        assert_eq!("us-east-1", config.region());
        assert_eq!("my-bucket", config.bucket());
        assert_eq!("/path/to/certs/here/", config.key_prefix());
    }

    #[test]
    fn test_dsn_root_prefix_is_empty() {
        let config = Config::builder()
            .dsn("s3://example.com.s3.amazonaws.com/")
            .unwrap()
            .client(client())
            .build()
            .unwrap();
        assert_eq!("", config.key_prefix());
    }

    #[test]
    fn test_invalid_dsn() {
        let err = Config::builder()
            .dsn("https://my-bucket/certs")
            .unwrap_err();
        assert_eq!(&ErrorKind::InvalidDsn, err.kind());
    }
}
