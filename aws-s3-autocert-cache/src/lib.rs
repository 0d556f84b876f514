/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

/* Automatically managed default lints */
#![cfg_attr(docsrs, feature(doc_auto_cfg))]
/* End of automatically managed default lints */
#![warn(
    missing_debug_implementations,
    missing_docs,
    rustdoc::missing_crate_level_docs,
    unreachable_pub,
    rust_2018_idioms
)]

//! An Amazon S3 backed certificate cache.
//!
//! Stores the certificate material produced by an automatic certificate manager
//! (ACME account keys, issued certificates, private keys) as objects in an S3 bucket.
//! Every object is written with server-side encryption and stored under an optional
//! key prefix, so several caches can share one bucket.
//!
//! # Examples
//!
//! Build a cache from a connection string:
//!
//! ```no_run
//! # async fn example() -> Result<(), aws_s3_autocert_cache::error::Error> {
//! use aws_s3_autocert_cache::{Cache, CertCache, OperationContext};
//!
//! let config = aws_s3_autocert_cache::from_dsn("s3://my-bucket/certs")?
//!     .load()
//!     .await?;
//! let cache = Cache::new(config);
//!
//! let ctx = OperationContext::background();
//! match cache.get(&ctx, "example.com").await {
//!     Ok(pem) => println!("cached {} bytes", pem.len()),
//!     Err(err) if err.is_cache_miss() => println!("nothing cached yet"),
//!     Err(err) => return Err(err),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! Or explicitly, from a region and bucket:
//!
//! ```no_run
//! # async fn example() -> Result<(), aws_s3_autocert_cache::error::Error> {
//! let config = aws_s3_autocert_cache::from_env()
//!     .region("eu-west-1")
//!     .bucket("my-bucket")
//!     .key_prefix("/prod/certs")
//!     .load()
//!     .await?;
//! let cache = aws_s3_autocert_cache::Cache::new(config);
//! # let _ = cache;
//! # Ok(())
//! # }
//! ```

/// Default region used when neither configuration nor connection string names one
pub(crate) const DEFAULT_REGION: &str = "us-east-1";

/// Error types emitted by `aws-s3-autocert-cache`
pub mod error;

/// Cancellation and deadlines for cache operations
pub mod context;

/// Diagnostic logging capability
pub mod logger;

/// Connection string parsing
pub mod dsn;

/// Cache configuration
pub mod config;

/// Object storage the cache is persisted to
pub mod storage;

/// The certificate cache
pub mod cache;

pub use self::cache::{Cache, CertCache};
use self::config::loader::ConfigLoader;
pub use self::config::Config;
pub use self::context::OperationContext;

/// Create a config loader
pub fn from_env() -> ConfigLoader {
    ConfigLoader::default()
}

/// Create a config loader seeded from a connection string.
///
/// Settings applied to the returned loader override the values taken from `dsn`.
pub fn from_dsn(dsn: &str) -> Result<ConfigLoader, error::Error> {
    ConfigLoader::from_dsn(dsn)
}
