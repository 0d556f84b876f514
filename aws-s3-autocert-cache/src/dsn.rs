/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use aws_sdk_s3::config::Credentials;
use url::Url;

use crate::error::{self, Error};
use crate::DEFAULT_REGION;

/// The only scheme accepted in a connection string
const SCHEME: &str = "s3";

/// Host label naming the S3 service in the default region, e.g. `s3.amazonaws.com`
const SERVICE_LABEL: &str = "s3";

/// Prefix of a host label naming the S3 service in a specific region, e.g. `s3-us-west-1`
const REGIONAL_SERVICE_TAG: &str = "s3-";

/// The two trailing host labels of an S3 endpoint
const ROOT_DOMAIN: [&str; 2] = ["amazonaws", "com"];

/// Provider name reported by credentials embedded in a connection string
const CREDENTIALS_PROVIDER: &str = "S3CacheDsn";

/// A parsed S3 connection string.
///
/// The accepted format is `s3://[id[:secret]@]host[:port]/path`, where the host is one of
///
/// * `bucket` - the bucket itself, a host containing dots is treated as a bucket name
///   unless it ends in `amazonaws.com`
/// * `bucket.s3[-region].amazonaws.com` - virtual-hosted-style, `path` is the key prefix
/// * `s3[-region].amazonaws.com` - path-style, the first segment of `path` is the bucket and
///   the rest is the key prefix
///
/// The region defaults to `us-east-1` when the host does not name one. Any port is ignored.
///
/// # Examples
///
/// ```
/// use aws_s3_autocert_cache::dsn::Dsn;
///
/// let dsn = Dsn::parse("s3://s3-us-west-1.amazonaws.com/example.com/dev/certs").unwrap();
/// assert_eq!("us-west-1", dsn.region());
/// assert_eq!("example.com", dsn.bucket());
/// assert_eq!("/dev/certs", dsn.prefix());
/// ```
#[derive(Debug, Clone)]
pub struct Dsn {
    region: String,
    bucket: String,
    prefix: String,
    credentials: Option<Credentials>,
}

impl Dsn {
    /// Parse a connection string.
    ///
    /// Fails with [`ErrorKind::InvalidDsn`](crate::error::ErrorKind::InvalidDsn) for any
    /// scheme other than `s3`, a malformed service label, or when no bucket can be derived.
    pub fn parse(dsn: &str) -> Result<Self, Error> {
        let url = Url::parse(dsn)?;
        if url.scheme() != SCHEME {
            return Err(error::invalid_dsn(format!(
                "unsupported scheme `{}`, expected `{SCHEME}`",
                url.scheme()
            )));
        }

        let credentials = credentials_from_userinfo(&url)?;

        let host = url.host_str().unwrap_or_default();
        let endpoint = parse_host(host)?;

        let path = urlencoding::decode(url.path()).map_err(error::invalid_dsn)?;
        let (bucket, prefix) = match endpoint.bucket {
            Some(bucket) => (bucket, path.into_owned()),
            None => bucket_from_path(&path)?,
        };
        let prefix = if prefix.is_empty() {
            "/".to_owned()
        } else {
            prefix
        };

        Ok(Dsn {
            region: endpoint.region.unwrap_or_else(|| DEFAULT_REGION.to_owned()),
            bucket,
            prefix,
            credentials,
        })
    }

    /// The region, either named by the host or the default
    pub fn region(&self) -> &str {
        &self.region
    }

    /// The bucket name
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// The key prefix. Always starts with `/`.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Static credentials given as `id:secret` userinfo
    pub fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }
}

/// What the host of a connection string says about the endpoint
#[derive(Debug, Default, PartialEq, Eq)]
struct Endpoint {
    bucket: Option<String>,
    region: Option<String>,
}

fn parse_host(host: &str) -> Result<Endpoint, Error> {
    if host.is_empty() {
        return Ok(Endpoint::default());
    }

    let labels: Vec<&str> = host.split('.').collect();
    if labels.len() == 1 {
        return Ok(Endpoint {
            bucket: Some(host.to_owned()),
            region: None,
        });
    }

    let (rest, root) = labels.split_at(labels.len() - ROOT_DOMAIN.len());
    let is_s3_endpoint = root
        .iter()
        .zip(ROOT_DOMAIN)
        .all(|(label, expected)| label.eq_ignore_ascii_case(expected));
    if !is_s3_endpoint {
        // a custom domain, e.g. a bucket named `example.com`
        return Ok(Endpoint {
            bucket: Some(host.to_owned()),
            region: None,
        });
    }

    let Some((service, bucket_labels)) = rest.split_last() else {
        return Err(error::invalid_dsn(format!(
            "host `{host}` does not name the S3 service"
        )));
    };
    let region = parse_service_label(service)
        .ok_or_else(|| error::invalid_dsn(format!("malformed S3 service label `{service}`")))?;

    let bucket = if bucket_labels.is_empty() {
        None
    } else {
        Some(bucket_labels.join("."))
    };

    Ok(Endpoint { bucket, region })
}

/// Returns the region named by a service label, `None` inside when the label names no region.
fn parse_service_label(label: &str) -> Option<Option<String>> {
    if label.eq_ignore_ascii_case(SERVICE_LABEL) {
        return Some(None);
    }
    let (tag, region) = label.split_at_checked(REGIONAL_SERVICE_TAG.len())?;
    if tag.eq_ignore_ascii_case(REGIONAL_SERVICE_TAG) && !region.is_empty() {
        Some(Some(region.to_owned()))
    } else {
        None
    }
}

/// Split a path-style path into `(bucket, prefix)`.
fn bucket_from_path(path: &str) -> Result<(String, String), Error> {
    let path = path.strip_prefix('/').unwrap_or(path);
    let (bucket, prefix) = match path.split_once('/') {
        Some((bucket, rest)) => (bucket, format!("/{rest}")),
        None => (path, String::new()),
    };

    if bucket.is_empty() {
        return Err(error::invalid_dsn(
            "no bucket in host or path of the connection string",
        ));
    }

    Ok((bucket.to_owned(), prefix))
}

fn credentials_from_userinfo(url: &Url) -> Result<Option<Credentials>, Error> {
    if url.username().is_empty() {
        return Ok(None);
    }

    let access_key_id = urlencoding::decode(url.username()).map_err(error::invalid_dsn)?;
    let secret_access_key = match url.password() {
        Some(secret) => urlencoding::decode(secret).map_err(error::invalid_dsn)?,
        None => Default::default(),
    };

    Ok(Some(Credentials::new(
        access_key_id,
        secret_access_key,
        None,
        None,
        CREDENTIALS_PROVIDER,
    )))
}

#[cfg(test)]
mod tests {
    use super::{parse_host, Dsn, Endpoint};
    use crate::error::ErrorKind;

    struct Expected {
        region: &'static str,
        bucket: &'static str,
        prefix: &'static str,
    }

    fn assert_parses(name: &str, dsn: &str, want: Expected) {
        let have = Dsn::parse(dsn).unwrap_or_else(|e| panic!("{name}: {e}"));
        assert_eq!(want.region, have.region(), "{name}: region");
        assert_eq!(want.bucket, have.bucket(), "{name}: bucket");
        assert_eq!(want.prefix, have.prefix(), "{name}: prefix");
    }

    #[test]
    fn test_parse_dsn() {
        let tests = [
            (
                "bucket in path, no host",
                "s3://example/dev/test/path",
                Expected {
                    region: "us-east-1",
                    bucket: "example",
                    prefix: "/dev/test/path",
                },
            ),
            (
                "bucket in path (looks like a domain), no host",
                "s3://example.com/dev/test/path",
                Expected {
                    region: "us-east-1",
                    bucket: "example.com",
                    prefix: "/dev/test/path",
                },
            ),
            (
                "bucket in domain, no region",
                "s3://example.com.s3.amazonaws.com/dev/test/path",
                Expected {
                    region: "us-east-1",
                    bucket: "example.com",
                    prefix: "/dev/test/path",
                },
            ),
            (
                "bucket in path, no region",
                "s3://s3.amazonaws.com/example.com/dev/test/path",
                Expected {
                    region: "us-east-1",
                    bucket: "example.com",
                    prefix: "/dev/test/path",
                },
            ),
            (
                "bucket in path, with region",
                "s3://s3-us-west-1.amazonaws.com/example.com/dev/test/path",
                Expected {
                    region: "us-west-1",
                    bucket: "example.com",
                    prefix: "/dev/test/path",
                },
            ),
            (
                "bucket in domain, with region",
                "s3://example.com.s3-us-west-1.amazonaws.com/dev/test/path",
                Expected {
                    region: "us-west-1",
                    bucket: "example.com",
                    prefix: "/dev/test/path",
                },
            ),
            (
                "bucket in domain, with no region, no path",
                "s3://example.com.s3.amazonaws.com/",
                Expected {
                    region: "us-east-1",
                    bucket: "example.com",
                    prefix: "/",
                },
            ),
            (
                "bucket only",
                "s3://example",
                Expected {
                    region: "us-east-1",
                    bucket: "example",
                    prefix: "/",
                },
            ),
            (
                "bucket in path, nothing after it",
                "s3://s3.amazonaws.com/example.com",
                Expected {
                    region: "us-east-1",
                    bucket: "example.com",
                    prefix: "/",
                },
            ),
            (
                "escaped prefix",
                "s3://my-bucket/my%20certs/prod",
                Expected {
                    region: "us-east-1",
                    bucket: "my-bucket",
                    prefix: "/my certs/prod",
                },
            ),
            (
                "escaped bucket in path",
                "s3://s3.amazonaws.com/my%2Ebucket/x",
                Expected {
                    region: "us-east-1",
                    bucket: "my.bucket",
                    prefix: "/x",
                },
            ),
            (
                "service label in upper case",
                "s3://S3.amazonaws.com/bucket/x",
                Expected {
                    region: "us-east-1",
                    bucket: "bucket",
                    prefix: "/x",
                },
            ),
            (
                "regional service label in upper case",
                "s3://example.com.S3-us-west-2.AMAZONAWS.com/certs",
                Expected {
                    region: "us-west-2",
                    bucket: "example.com",
                    prefix: "/certs",
                },
            ),
            (
                "port is ignored",
                "s3://example:9000/certs",
                Expected {
                    region: "us-east-1",
                    bucket: "example",
                    prefix: "/certs",
                },
            ),
        ];

        for (name, dsn, want) in tests {
            assert_parses(name, dsn, want);
        }
    }

    #[test]
    fn test_parse_dsn_rejects_other_schemes() {
        for dsn in [
            "http://example/dev/test/path",
            "https://example.com.s3.amazonaws.com/dev/test/path",
            "gs://s3.amazonaws.com/example.com/dev/test/path",
            "file:///tmp/certs",
        ] {
            let err = Dsn::parse(dsn).unwrap_err();
            assert_eq!(&ErrorKind::InvalidDsn, err.kind(), "{dsn}");
        }
    }

    #[test]
    fn test_parse_dsn_rejects_malformed() {
        for dsn in [
            "not a url",
            // service label is neither `s3` nor `s3-<region>`
            "s3://example.com.storage.amazonaws.com/dev",
            "s3://s3-.amazonaws.com/example.com/dev",
            // root domain only
            "s3://amazonaws.com/example.com/dev",
            // no bucket anywhere
            "s3://s3.amazonaws.com/",
            "s3://s3-us-west-1.amazonaws.com",
            "s3://s3.amazonaws.com//dev",
            // invalid UTF-8 once unescaped
            "s3://example/%FF%FE",
        ] {
            let err = Dsn::parse(dsn).unwrap_err();
            assert_eq!(&ErrorKind::InvalidDsn, err.kind(), "{dsn}");
        }
    }

    #[test]
    fn test_parse_dsn_credentials() {
        let dsn = Dsn::parse("s3://AKIDEXAMPLE:wJalr%2FXUtnFEMI@example/certs").unwrap();
        let credentials = dsn.credentials().expect("credentials set");
        assert_eq!("AKIDEXAMPLE", credentials.access_key_id());
        assert_eq!("wJalr/XUtnFEMI", credentials.secret_access_key());
        assert_eq!("example", dsn.bucket());

        let dsn = Dsn::parse("s3://AKIDEXAMPLE@example/certs").unwrap();
        let credentials = dsn.credentials().expect("credentials set");
        assert_eq!("AKIDEXAMPLE", credentials.access_key_id());
        assert_eq!("", credentials.secret_access_key());

        assert!(Dsn::parse("s3://example/certs")
            .unwrap()
            .credentials()
            .is_none());
    }

    #[test]
    fn test_parse_host() {
        assert_eq!(Endpoint::default(), parse_host("").unwrap());
        assert_eq!(
            Endpoint {
                bucket: Some("a.b.c".to_owned()),
                region: Some("eu-central-1".to_owned()),
            },
            parse_host("a.b.c.s3-eu-central-1.amazonaws.com").unwrap()
        );
        assert_eq!(
            Endpoint {
                bucket: None,
                region: None,
            },
            parse_host("s3.AmazonAWS.com").unwrap()
        );
    }
}
