/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use async_trait::async_trait;
use aws_sdk_s3::config::http::HttpResponse;
use aws_sdk_s3::error::{ProvideErrorMetadata, SdkError};
use aws_sdk_s3::operation::get_object::GetObjectError;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::ServerSideEncryption;
use bytes::Bytes;

use crate::error::{self, Error};
use crate::storage::ObjectStore;

/// Server-side encryption requested for every object written by the cache
const SERVER_SIDE_ENCRYPTION: ServerSideEncryption = ServerSideEncryption::Aes256;

/// [`ObjectStore`] backed by Amazon S3.
#[derive(Debug, Clone)]
pub struct S3ObjectStore {
    client: aws_sdk_s3::Client,
}

impl S3ObjectStore {
    /// Create a store sending requests through `client`
    pub fn new(client: aws_sdk_s3::Client) -> Self {
        Self { client }
    }

    /// The Amazon S3 client instance used to send requests to S3.
    pub fn client(&self) -> &aws_sdk_s3::Client {
        &self.client
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn get_object(&self, bucket: &str, key: &str) -> Result<Option<Bytes>, Error> {
        let resp = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await;

        let resp = match resp {
            Ok(resp) => resp,
            Err(err) if is_not_found(&err) => return Ok(None),
            Err(err) => return Err(error::storage_failed(err)),
        };

        let body = resp.body.collect().await.map_err(error::encoding_failed)?;
        Ok(Some(body.into_bytes()))
    }

    async fn put_object(&self, bucket: &str, key: &str, data: Bytes) -> Result<(), Error> {
        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(ByteStream::from(data))
            .server_side_encryption(SERVER_SIDE_ENCRYPTION)
            .send()
            .await
            .map_err(error::storage_failed)?;
        Ok(())
    }

    async fn delete_object(&self, bucket: &str, key: &str) -> Result<(), Error> {
        self.client
            .delete_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(error::storage_failed)?;
        Ok(())
    }
}

fn is_not_found(err: &SdkError<GetObjectError, HttpResponse>) -> bool {
    let not_found_code = err.as_service_error().is_some_and(|service_err| {
        service_err.is_no_such_key() || matches!(service_err.code(), Some("NoSuchKey" | "NotFound"))
    });
    not_found_code
        || err
            .raw_response()
            .is_some_and(|resp| resp.status().as_u16() == 404)
}
