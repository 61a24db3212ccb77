//! AWS transports.
//!
//! Client implementations over the AWS SDK. Enable with `--features aws`.
//!
//! Credentials and region come from the default provider chain
//! (`AWS_PROFILE`, `AWS_REGION`, instance roles, ...). Each client builds a
//! current-thread runtime on first use and blocks on every call.

use aws_config::{BehaviorVersion, SdkConfig};
use chrono::{DateTime, Utc};
use tracing::trace;

use super::client::{
    BlobClient, Object, Parameter, ParameterVersion, Secret, SecretClient, SecretLookup,
    TreeClient,
};
use crate::core::types::Synced;
use crate::error::{Error, Result, ServiceError};

struct Connection<C> {
    runtime: tokio::runtime::Runtime,
    client: C,
}

fn connect<'a, C>(
    slot: &'a mut Option<Connection<C>>,
    service: &str,
    make: impl FnOnce(&SdkConfig) -> C,
) -> Result<&'a Connection<C>> {
    if slot.is_none() {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| ServiceError::Init {
                service: service.to_string(),
                reason: format!("failed to create runtime: {}", e),
            })?;
        let config = runtime.block_on(aws_config::load_defaults(BehaviorVersion::latest()));
        trace!(service, region = ?config.region(), "loaded aws config");
        *slot = Some(Connection {
            client: make(&config),
            runtime,
        });
    }

    slot.as_ref().ok_or_else(|| {
        ServiceError::Init {
            service: service.to_string(),
            reason: "connection unavailable".into(),
        }
        .into()
    })
}

fn timestamp(value: Option<&aws_sdk_s3::primitives::DateTime>) -> Option<Synced> {
    value.and_then(|t| DateTime::<Utc>::from_timestamp(t.secs(), t.subsec_nanos()))
}

fn failed(service: &str, action: &str, err: impl std::fmt::Display) -> Error {
    Error::remote(service, format!("{} failed: {}", action, err))
}

// ---------------------------------------------------------------------------
// S3
// ---------------------------------------------------------------------------

const S3: &str = "s3";

/// Object storage over S3, encrypted with SSE-KMS.
#[derive(Default)]
pub struct AwsBlobs {
    connection: Option<Connection<aws_sdk_s3::Client>>,
}

impl AwsBlobs {
    pub fn new() -> Self {
        Self::default()
    }

    fn connection(&mut self) -> Result<&Connection<aws_sdk_s3::Client>> {
        connect(&mut self.connection, S3, aws_sdk_s3::Client::new)
    }
}

impl BlobClient for AwsBlobs {
    fn get_object(&mut self, bucket: &str, key: &str) -> Result<Option<Object>> {
        use aws_sdk_s3::error::ProvideErrorMetadata;

        let conn = self.connection()?;
        conn.runtime.block_on(async {
            let out = match conn.client.get_object().bucket(bucket).key(key).send().await {
                Ok(out) => out,
                Err(err) => {
                    let service_err = err.as_service_error();
                    if service_err.map(|e| e.is_no_such_key()).unwrap_or(false) {
                        return Ok(None);
                    }
                    if service_err.and_then(|e| e.code()) == Some("NoSuchBucket") {
                        return Err(ServiceError::NoSuchBucket(bucket.to_string()).into());
                    }
                    return Err(failed(S3, "GetObject", err));
                }
            };

            let last_modified = timestamp(out.last_modified());
            let body = out
                .body
                .collect()
                .await
                .map_err(|e| failed(S3, "GetObject", e))?
                .into_bytes()
                .to_vec();
            Ok(Some(Object {
                body,
                last_modified,
            }))
        })
    }

    fn put_object(&mut self, bucket: &str, key: &str, body: &[u8], kms_key_id: Option<&str>) -> Result<()> {
        use aws_sdk_s3::error::ProvideErrorMetadata;
        use aws_sdk_s3::primitives::ByteStream;
        use aws_sdk_s3::types::ServerSideEncryption;

        let conn = self.connection()?;
        conn.runtime.block_on(async {
            conn.client
                .put_object()
                .bucket(bucket)
                .key(key)
                .body(ByteStream::from(body.to_vec()))
                .server_side_encryption(ServerSideEncryption::AwsKms)
                .set_ssekms_key_id(kms_key_id.map(str::to_string))
                .send()
                .await
                .map_err(|err| {
                    if err.as_service_error().and_then(|e| e.code()) == Some("NoSuchBucket") {
                        ServiceError::NoSuchBucket(bucket.to_string()).into()
                    } else {
                        failed(S3, "PutObject", err)
                    }
                })?;
            Ok(())
        })
    }

    fn delete_object(&mut self, bucket: &str, key: &str) -> Result<()> {
        let conn = self.connection()?;
        conn.runtime.block_on(async {
            conn.client
                .delete_object()
                .bucket(bucket)
                .key(key)
                .send()
                .await
                .map_err(|e| failed(S3, "DeleteObject", e))?;
            Ok(())
        })
    }
}

// ---------------------------------------------------------------------------
// SSM Parameter Store
// ---------------------------------------------------------------------------

const SSM: &str = "parameter-store";

/// Parameters over SSM Parameter Store.
#[derive(Default)]
pub struct AwsTree {
    connection: Option<Connection<aws_sdk_ssm::Client>>,
}

impl AwsTree {
    pub fn new() -> Self {
        Self::default()
    }

    fn connection(&mut self) -> Result<&Connection<aws_sdk_ssm::Client>> {
        connect(&mut self.connection, SSM, aws_sdk_ssm::Client::new)
    }
}

impl TreeClient for AwsTree {
    fn get_by_path(&mut self, path: &str) -> Result<Vec<Parameter>> {
        let conn = self.connection()?;
        conn.runtime.block_on(async {
            let mut found = Vec::new();
            let mut token = None;
            loop {
                let out = conn
                    .client
                    .get_parameters_by_path()
                    .path(path)
                    .recursive(true)
                    .with_decryption(true)
                    .set_next_token(token.take())
                    .send()
                    .await
                    .map_err(|e| failed(SSM, "GetParametersByPath", e))?;

                for p in out.parameters() {
                    found.push(Parameter {
                        name: p.name().unwrap_or_default().to_string(),
                        value: p.value().unwrap_or_default().to_string(),
                        kind: p.r#type().map(|t| t.as_str().to_string()).unwrap_or_default(),
                        last_modified: timestamp(p.last_modified_date()),
                        arn: p.arn().unwrap_or_default().to_string(),
                    });
                }

                match out.next_token() {
                    Some(next) => token = Some(next.to_string()),
                    None => break,
                }
            }
            trace!(path, found = found.len(), "listed parameters");
            Ok(found)
        })
    }

    fn history(&mut self, name: &str) -> Result<Vec<ParameterVersion>> {
        let conn = self.connection()?;
        conn.runtime.block_on(async {
            let mut versions = Vec::new();
            let mut token = None;
            loop {
                let out = conn
                    .client
                    .get_parameter_history()
                    .name(name)
                    .set_next_token(token.take())
                    .send()
                    .await
                    .map_err(|e| failed(SSM, "GetParameterHistory", e))?;

                // History is returned oldest first.
                for h in out.parameters() {
                    versions.push(ParameterVersion {
                        version: versions.len() as i64 + 1,
                        key_id: h.key_id().map(str::to_string),
                    });
                }

                match out.next_token() {
                    Some(next) => token = Some(next.to_string()),
                    None => break,
                }
            }
            Ok(versions)
        })
    }

    fn put_parameter(&mut self, name: &str, value: &str, key_id: Option<&str>) -> Result<()> {
        use aws_sdk_ssm::types::ParameterType;

        let conn = self.connection()?;
        conn.runtime.block_on(async {
            conn.client
                .put_parameter()
                .name(name)
                .value(value)
                .r#type(ParameterType::SecureString)
                .overwrite(true)
                .set_key_id(key_id.map(str::to_string))
                .send()
                .await
                .map_err(|e| failed(SSM, "PutParameter", e))?;
            Ok(())
        })
    }

    fn delete_parameter(&mut self, name: &str) -> Result<()> {
        let conn = self.connection()?;
        conn.runtime.block_on(async {
            conn.client
                .delete_parameter()
                .name(name)
                .send()
                .await
                .map_err(|e| failed(SSM, "DeleteParameter", e))?;
            Ok(())
        })
    }
}

// ---------------------------------------------------------------------------
// Secrets Manager
// ---------------------------------------------------------------------------

const SECRETS: &str = "secrets-manager";

/// Secrets over AWS Secrets Manager.
#[derive(Default)]
pub struct AwsSecrets {
    connection: Option<Connection<aws_sdk_secretsmanager::Client>>,
}

impl AwsSecrets {
    pub fn new() -> Self {
        Self::default()
    }

    fn connection(&mut self) -> Result<&Connection<aws_sdk_secretsmanager::Client>> {
        connect(&mut self.connection, SECRETS, aws_sdk_secretsmanager::Client::new)
    }
}

impl SecretClient for AwsSecrets {
    fn lookup(&mut self, name: &str) -> Result<SecretLookup> {
        let conn = self.connection()?;
        conn.runtime.block_on(async {
            let described = match conn.client.describe_secret().secret_id(name).send().await {
                Ok(out) => out,
                Err(err) => {
                    let missing = err
                        .as_service_error()
                        .map(|e| e.is_resource_not_found_exception())
                        .unwrap_or(false);
                    if missing {
                        return Ok(SecretLookup::Missing);
                    }
                    return Err(failed(SECRETS, "DescribeSecret", err));
                }
            };

            if described.deleted_date().is_some() {
                return Ok(SecretLookup::Deleted);
            }

            let value = conn
                .client
                .get_secret_value()
                .secret_id(name)
                .send()
                .await
                .map_err(|e| failed(SECRETS, "GetSecretValue", e))?;

            Ok(SecretLookup::Found(Secret {
                name: name.to_string(),
                value: value.secret_string().unwrap_or_default().to_string(),
                key_id: described.kms_key_id().map(str::to_string),
                last_changed: timestamp(described.last_changed_date()),
                arn: described.arn().unwrap_or_default().to_string(),
            }))
        })
    }

    fn create(&mut self, name: &str, value: &str, key_id: Option<&str>, description: &str) -> Result<()> {
        let conn = self.connection()?;
        conn.runtime.block_on(async {
            conn.client
                .create_secret()
                .name(name)
                .secret_string(value)
                .description(description)
                .set_kms_key_id(key_id.map(str::to_string))
                .send()
                .await
                .map_err(|e| failed(SECRETS, "CreateSecret", e))?;
            Ok(())
        })
    }

    fn update(&mut self, name: &str, value: &str, key_id: Option<&str>) -> Result<()> {
        let conn = self.connection()?;
        conn.runtime.block_on(async {
            conn.client
                .update_secret()
                .secret_id(name)
                .secret_string(value)
                .set_kms_key_id(key_id.map(str::to_string))
                .send()
                .await
                .map_err(|e| failed(SECRETS, "UpdateSecret", e))?;
            Ok(())
        })
    }

    fn restore(&mut self, name: &str) -> Result<()> {
        let conn = self.connection()?;
        conn.runtime.block_on(async {
            conn.client
                .restore_secret()
                .secret_id(name)
                .send()
                .await
                .map_err(|e| failed(SECRETS, "RestoreSecret", e))?;
            Ok(())
        })
    }

    fn delete(&mut self, name: &str) -> Result<()> {
        let conn = self.connection()?;
        conn.runtime.block_on(async {
            conn.client
                .delete_secret()
                .secret_id(name)
                .send()
                .await
                .map_err(|e| failed(SECRETS, "DeleteSecret", e))?;
            Ok(())
        })
    }
}
