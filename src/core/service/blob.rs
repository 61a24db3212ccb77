//! Whole-file object storage.

use serde_json::json;
use tracing::{debug, info};

use super::{confirm_overwrite, non_default, BlobClient, Io, OptionSpec, Service, Unit};
use crate::core::constants::option;
use crate::core::output::{to_pretty_json, OutputKind};
use crate::core::types::SecurityRating;
use crate::error::{Result, ServiceError};

const KEY: &str = "s3";
const DEFAULT_KMS_KEY: &str = "aws/s3";

/// Stores each file as a single object under its remote key.
pub struct Blob<C: BlobClient> {
    client: C,
    io: Io,
}

impl<C: BlobClient> Blob<C> {
    pub fn new(client: C) -> Self {
        Self {
            client,
            io: Io::unattended(),
        }
    }

    fn bucket(&self, unit: &mut Unit) -> Result<String> {
        unit.ensure_option(OptionSpec::text(option::S3_BUCKET), &self.io)
    }

    fn object_arn(bucket: &str, key: &str) -> String {
        format!("arn:aws:s3:::{}/{}", bucket, key)
    }

    /// The object a unit points at: its tracked key, else its default key.
    fn tracked(unit: &Unit) -> String {
        unit.keys
            .first()
            .cloned()
            .unwrap_or_else(|| unit.remote_key.clone())
    }
}

impl<C: BlobClient> Service for Blob<C> {
    fn key(&self) -> &'static str {
        KEY
    }

    fn object_key(&self, key: &str) -> String {
        key.to_string()
    }

    fn compatible(&self, _file_types: &[&str]) -> bool {
        true
    }

    fn security_rating(&self) -> SecurityRating {
        SecurityRating::Low
    }

    fn initialize(&mut self, io: Io) -> Result<()> {
        self.io = io;
        Ok(())
    }

    fn sync(&mut self, mut unit: Unit) -> Result<Unit> {
        if unit.data.is_empty() {
            return self.purge(unit);
        }

        let bucket = self.bucket(&mut unit)?;
        let kms_key_id = unit.ensure_option(
            OptionSpec::text(option::KMS_KEY_ID)
                .with_default(DEFAULT_KMS_KEY)
                .with_help(option::KMS_KEY_HELP),
            &self.io,
        )?;
        let key = unit.remote_key.clone();

        if let Some(existing) = self.client.get_object(&bucket, &key)? {
            let modified_after = match (existing.last_modified, unit.synced) {
                (Some(modified), Some(synced)) => modified > synced,
                (_, None) => true,
                (None, Some(_)) => false,
            };
            if modified_after {
                confirm_overwrite(&[(key.clone(), existing.last_modified)], &self.io)?;
            }

            if existing.body.as_slice() == unit.data.as_slice() {
                debug!(bucket = %bucket, key = %key, "object unchanged");
                unit.keys = vec![key];
                return Ok(unit);
            }
        }

        self.client.put_object(
            &bucket,
            &key,
            &unit.data,
            non_default(&kms_key_id, DEFAULT_KMS_KEY),
        )?;
        info!(bucket = %bucket, key = %key, bytes = unit.data.len(), "uploaded object");

        unit.keys = vec![key];
        Ok(unit)
    }

    fn download(&mut self, mut unit: Unit, output: OutputKind) -> Result<Unit> {
        let bucket = self.bucket(&mut unit)?;
        let key = Self::tracked(&unit);

        let data = match output {
            OutputKind::EcsTaskInjectJson => to_pretty_json(&json!([{
                "type": KEY,
                "value": Self::object_arn(&bucket, &key),
            }]))?,
            OutputKind::EcsTaskInjectEnv => {
                format!("{}={}\n", KEY, Self::object_arn(&bucket, &key)).into_bytes()
            }
            _ => match self.client.get_object(&bucket, &key)? {
                Some(object) => object.body,
                None => return Err(ServiceError::NotFound(format!("{}/{}", bucket, key)).into()),
            },
        };

        debug!(bucket = %bucket, key = %key, bytes = data.len(), "downloaded object");
        unit.set_data(data);
        Ok(unit)
    }

    fn purge(&mut self, mut unit: Unit) -> Result<Unit> {
        if unit.keys.is_empty() {
            return Ok(unit);
        }

        let bucket = self.bucket(&mut unit)?;
        for key in std::mem::take(&mut unit.keys) {
            self.client.delete_object(&bucket, &key)?;
            info!(bucket = %bucket, key = %key, "deleted object");
        }
        Ok(unit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::service::{Answer, MemoryBlobs, Scripted};
    use crate::error::Error;
    use chrono::{Duration, Utc};
    use std::rc::Rc;

    fn unit(data: &str) -> Unit {
        let mut unit = Unit {
            context: "app".into(),
            remote_key: "app/config/app.yml".into(),
            local_path: "config/app.yml".into(),
            file_type: "yml".into(),
            ..Unit::default()
        };
        unit.options.insert(option::S3_BUCKET.into(), "bucket".into());
        unit.options.insert(option::KMS_KEY_ID.into(), "aws/s3".into());
        unit.set_data(data.as_bytes().to_vec());
        unit
    }

    fn service(store: &MemoryBlobs, answers: Vec<Answer>) -> (Blob<MemoryBlobs>, Rc<Scripted>) {
        let scripted = Rc::new(Scripted::new(answers));
        let mut blob = Blob::new(store.clone());
        blob.initialize(Io::new(scripted.clone())).unwrap();
        (blob, scripted)
    }

    #[test]
    fn test_sync_then_download() {
        let store = MemoryBlobs::new();
        let (mut blob, _) = service(&store, vec![]);

        let synced = blob.sync(unit("a: 1\n")).unwrap();
        assert_eq!(synced.keys, vec!["app/config/app.yml"]);
        assert_eq!(synced.options[option::KMS_KEY_ID], "aws/s3");
        assert_eq!(store.body("bucket", "app/config/app.yml").unwrap(), b"a: 1\n");

        let mut fetch = unit("");
        fetch.keys = synced.keys.clone();
        let downloaded = blob.download(fetch, OutputKind::Original).unwrap();
        assert_eq!(downloaded.data.as_slice(), b"a: 1\n");
    }

    #[test]
    fn test_resync_is_idempotent() {
        let store = MemoryBlobs::new();
        let (mut blob, scripted) = service(&store, vec![]);

        let first = blob.sync(unit("a: 1\n")).unwrap();
        let mut again = unit("a: 1\n");
        again.synced = Some(Utc::now() + Duration::seconds(10));
        let second = blob.sync(again).unwrap();

        assert_eq!(first.keys, second.keys);
        assert!(scripted.asked().iter().all(|q| q != crate::core::constants::OVERWRITE_PROMPT));
    }

    #[test]
    fn test_conflict_declined_leaves_remote() {
        let store = MemoryBlobs::new();
        store.write_external("bucket", "app/config/app.yml", b"theirs", Utc::now());
        let (mut blob, _) = service(&store, vec![Answer::Confirm(false)]);

        let err = blob.sync(unit("mine")).unwrap_err();
        assert!(matches!(err, Error::Service(ServiceError::ConflictAborted)));
        assert_eq!(store.body("bucket", "app/config/app.yml").unwrap(), b"theirs");
    }

    #[test]
    fn test_empty_data_purges() {
        let store = MemoryBlobs::new();
        let (mut blob, _) = service(&store, vec![]);

        let synced = blob.sync(unit("a: 1\n")).unwrap();
        let mut empty = unit("");
        empty.keys = synced.keys;
        empty.synced = Some(Utc::now() + Duration::seconds(10));

        let purged = blob.sync(empty).unwrap();
        assert!(purged.keys.is_empty());
        assert!(store.body("bucket", "app/config/app.yml").is_none());
    }

    #[test]
    fn test_task_inject_outputs() {
        let store = MemoryBlobs::new();
        let (mut blob, _) = service(&store, vec![]);

        let out = blob.download(unit(""), OutputKind::EcsTaskInjectEnv).unwrap();
        assert_eq!(
            out.data.as_slice(),
            b"s3=arn:aws:s3:::bucket/app/config/app.yml\n"
        );

        let out = blob.download(unit(""), OutputKind::EcsTaskInjectJson).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out.data).unwrap();
        assert_eq!(value[0]["type"], "s3");
        assert_eq!(value[0]["value"], "arn:aws:s3:::bucket/app/config/app.yml");
    }

    #[test]
    fn test_missing_object_is_not_found() {
        let store = MemoryBlobs::new();
        let (mut blob, _) = service(&store, vec![]);
        let err = blob.download(unit(""), OutputKind::Original).unwrap_err();
        assert!(matches!(err, Error::Service(ServiceError::NotFound(_))));
    }
}
