/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::sync::Arc;

use aws_config::Region;
use aws_sdk_s3::config::Credentials;

use crate::config::Builder;
use crate::error::Error;
use crate::logger::Logger;
use crate::storage::ObjectStore;
use crate::{Config, DEFAULT_REGION};

/// Load cache [`Config`] from the environment.
///
/// Unless a client or object store is set explicitly, an S3 client is created from the shared
/// AWS configuration (environment, profile, IMDS, ...) with the configured region and, if set,
/// static credentials.
#[derive(Default, Debug)]
pub struct ConfigLoader {
    builder: Builder,
}

impl ConfigLoader {
    /// Create a loader seeded from a connection string.
    ///
    /// See [`Dsn`](crate::dsn::Dsn) for the accepted format.
    pub fn from_dsn(dsn: &str) -> Result<Self, Error> {
        Ok(Self {
            builder: Builder::default().dsn(dsn)?,
        })
    }

    /// The region the bucket lives in.
    ///
    /// Default is `us-east-1`.
    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.builder = self.builder.region(region);
        self
    }

    /// The bucket to store certificate data in. Required.
    pub fn bucket(mut self, bucket: impl Into<String>) -> Self {
        self.builder = self.builder.bucket(bucket);
        self
    }

    /// Prefix prepended to every key.
    ///
    /// Trailing `/` are trimmed and exactly one is appended. Default is no prefix.
    pub fn key_prefix(mut self, prefix: impl AsRef<str>) -> Self {
        self.builder = self.builder.key_prefix(prefix);
        self
    }

    /// Static credentials used instead of the default credential provider chain.
    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.builder = self.builder.credentials(credentials);
        self
    }

    /// Set an explicit S3 client to use.
    pub fn client(mut self, client: aws_sdk_s3::Client) -> Self {
        self.builder = self.builder.client(client);
        self
    }

    /// Set an explicit object store to use instead of S3.
    pub fn object_store(mut self, store: Arc<dyn ObjectStore>) -> Self {
        self.builder = self.builder.object_store(store);
        self
    }

    /// Logger receiving a diagnostic line per cache operation.
    pub fn logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.builder = self.builder.logger(logger);
        self
    }

    /// Load the default configuration
    ///
    /// If fields have been overridden during builder construction, the override values will be
    /// used. Otherwise, the default values for each field will be provided.
    pub async fn load(self) -> Result<Config, Error> {
        let mut builder = self.builder;
        if builder.store.is_none() {
            let region = builder
                .region
                .clone()
                .unwrap_or_else(|| DEFAULT_REGION.to_owned());
            tracing::debug!(region = %region, "creating S3 client from shared config");

            let mut loader = aws_config::from_env().region(Region::new(region));
            if let Some(credentials) = builder.credentials.clone() {
                loader = loader.credentials_provider(credentials);
            }
            let shared_config = loader.load().await;
            builder = builder.client(aws_sdk_s3::Client::new(&shared_config));
        }
        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::ConfigLoader;
    use crate::error::ErrorKind;
    use aws_sdk_s3::config::Credentials;

    fn test_credentials() -> Credentials {
        Credentials::new("ANOTREAL", "notrealrnrELgWzOk3IfjzDKtFBhDby", None, None, "test")
    }

    #[tokio::test]
    async fn test_load_creates_client() {
        let config = ConfigLoader::from_dsn("s3://example.com.s3-eu-west-1.amazonaws.com/certs")
            .unwrap()
            .credentials(test_credentials())
            .load()
            .await
            .unwrap();
        assert_eq!("eu-west-1", config.region());
        assert_eq!("example.com", config.bucket());
        assert_eq!("/certs/", config.key_prefix());
    }

    #[tokio::test]
    async fn test_load_requires_bucket() {
        let err = ConfigLoader::default()
            .credentials(test_credentials())
            .load()
            .await
            .unwrap_err();
        assert_eq!(&ErrorKind::InputInvalid, err.kind());
    }
}
