//! Service registry.

use std::collections::BTreeMap;

use tracing::debug;

use super::{Blob, MemoryBlobs, MemorySecrets, MemoryTree, Secrets, Service, Tree};
use crate::error::{Result, ServiceError};

/// Services by key.
#[derive(Default)]
pub struct Registry {
    services: BTreeMap<&'static str, Box<dyn Service>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The services a normal run uses.
    ///
    /// With the `aws` feature the stores are the AWS services; otherwise
    /// they are emulated in YAML files under `~/.stash/remote/`.
    ///
    /// # Errors
    ///
    /// Returns error if the local emulation files cannot be read.
    pub fn standard() -> Result<Self> {
        #[cfg(feature = "aws")]
        {
            use super::aws::{AwsBlobs, AwsSecrets, AwsTree};
            debug!("using aws transports");
            Ok(Self::new()
                .register(Box::new(Blob::new(AwsBlobs::new())))
                .register(Box::new(Tree::new(AwsTree::new())))
                .register(Box::new(Secrets::new(AwsSecrets::new()))))
        }

        #[cfg(not(feature = "aws"))]
        {
            use crate::core::constants::REMOTE_DIR;
            use crate::core::home;

            let dir = home::path(REMOTE_DIR)?;
            debug!(dir = %dir.display(), "using local store emulation");
            Ok(Self::memory(
                MemoryBlobs::persistent(dir.join("s3.yml"))?,
                MemoryTree::persistent(dir.join("parameter-store.yml"))?,
                MemorySecrets::persistent(dir.join("secrets-manager.yml"))?,
            ))
        }
    }

    /// All three services over in-memory clients.
    pub fn memory(blobs: MemoryBlobs, tree: MemoryTree, secrets: MemorySecrets) -> Self {
        Self::new()
            .register(Box::new(Blob::new(blobs)))
            .register(Box::new(Tree::new(tree)))
            .register(Box::new(Secrets::new(secrets)))
    }

    /// Add a service under its own key, replacing any previous one.
    pub fn register(mut self, service: Box<dyn Service>) -> Self {
        self.services.insert(service.key(), service);
        self
    }

    /// # Errors
    ///
    /// Returns [`ServiceError::Unavailable`] for an unknown key.
    pub fn get_mut(&mut self, key: &str) -> Result<&mut Box<dyn Service>> {
        self.services
            .get_mut(key)
            .ok_or_else(|| ServiceError::Unavailable(key.to_string()).into())
    }

    pub fn get(&self, key: &str) -> Option<&dyn Service> {
        self.services.get(key).map(|s| &**s)
    }

    pub fn keys(&self) -> Vec<&'static str> {
        self.services.keys().copied().collect()
    }

    /// Services able to store every given file type, most secure first.
    pub fn compatible(&self, file_types: &[&str]) -> Vec<&dyn Service> {
        let mut found: Vec<&dyn Service> = self
            .services
            .values()
            .map(|s| &**s)
            .filter(|s| s.compatible(file_types))
            .collect();
        found.sort_by_key(|s| (s.security_rating(), s.key()));
        found
    }
}
