//! Client registry: one ready-to-use provider client per enabled model.
//!
//! Construction is all-or-nothing. A missing credential for any enabled,
//! referenced identifier aborts the entire build before any network call is
//! made, so credential problems never surface mid-pipeline as confusing
//! downstream failures.

use crate::config::{ModelId, RunConfig};
use crate::credentials::{ApiKeys, env_var_name};
use crate::error::ConfigError;
use crate::providers::{ProviderClient, create_client};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Immutable mapping from model identifier to provider client, built once per run.
pub struct ClientRegistry {
    clients: BTreeMap<ModelId, Arc<dyn ProviderClient>>,
}

impl std::fmt::Debug for ClientRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientRegistry")
            .field("clients", &self.ids())
            .finish()
    }
}

impl ClientRegistry {
    /// Build clients for every identifier referenced by the configuration:
    /// the primary models plus the chairman and both reviewers.
    ///
    /// Disabled identifiers are omitted without error. An enabled identifier
    /// without a credential fails the whole build with
    /// [`ConfigError::MissingCredential`]; no partial registry is ever returned.
    pub fn build(config: &RunConfig, keys: &ApiKeys) -> Result<Self, ConfigError> {
        let mut clients: BTreeMap<ModelId, Arc<dyn ProviderClient>> = BTreeMap::new();

        for id in config.referenced_models() {
            let settings = config.model_settings(id);
            if !settings.enabled {
                debug!(model = %id, "Skipping disabled model");
                continue;
            }

            let key = keys.get(id).ok_or(ConfigError::MissingCredential {
                id,
                env_var: env_var_name(id),
            })?;

            let client = create_client(id, settings, key).map_err(|e| ConfigError::Invalid {
                message: format!("Failed to build client for '{id}': {e}"),
            })?;
            clients.insert(id, client);
        }

        info!(clients = clients.len(), "Client registry built");
        Ok(Self { clients })
    }

    /// Build a registry directly from clients, keyed by each client's identifier.
    ///
    /// Intended for tests and embedding; skips credential resolution entirely.
    pub fn with_clients(clients: impl IntoIterator<Item = Arc<dyn ProviderClient>>) -> Self {
        Self {
            clients: clients.into_iter().map(|c| (c.id(), c)).collect(),
        }
    }

    /// The client for the given identifier, if one was built.
    pub fn get(&self, id: ModelId) -> Option<Arc<dyn ProviderClient>> {
        self.clients.get(&id).cloned()
    }

    /// Whether a client exists for the given identifier.
    pub fn contains(&self, id: ModelId) -> bool {
        self.clients.contains_key(&id)
    }

    /// Identifiers with a built client, in canonical order.
    pub fn ids(&self) -> Vec<ModelId> {
        self.clients.keys().copied().collect()
    }

    /// Number of built clients.
    pub fn len(&self) -> usize {
        self.clients.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::MockClient;

    fn keys_for(ids: &[ModelId]) -> ApiKeys {
        let mut keys = ApiKeys::new();
        for &id in ids {
            keys.insert(id, format!("key-{id}"));
        }
        keys
    }

    #[test]
    fn test_build_with_all_credentials() {
        let config = RunConfig::default(); // gpt + claude enabled
        let keys = keys_for(&[ModelId::Gpt, ModelId::Claude]);
        let registry = ClientRegistry::build(&config, &keys).unwrap();
        assert_eq!(registry.ids(), vec![ModelId::Gpt, ModelId::Claude]);
        assert!(registry.get(ModelId::Gpt).is_some());
        assert!(registry.get(ModelId::Gemini).is_none());
    }

    #[test]
    fn test_build_is_all_or_nothing() {
        // claude is enabled and referenced, but has no credential: the whole
        // build fails, naming the identifier and its env var.
        let config = RunConfig::default();
        let keys = keys_for(&[ModelId::Gpt]);
        let err = ClientRegistry::build(&config, &keys).unwrap_err();
        match err {
            ConfigError::MissingCredential { id, env_var } => {
                assert_eq!(id, ModelId::Claude);
                assert_eq!(env_var, "ANTHROPIC_API_KEY");
            }
            other => panic!("Expected MissingCredential, got {other:?}"),
        }
    }

    #[test]
    fn test_build_omits_disabled_without_credential() {
        // gemini is disabled by default; its missing credential is not an error
        // and it is simply absent from the result.
        let mut config = RunConfig::default();
        config.primary_models = vec![ModelId::Gpt, ModelId::Claude, ModelId::Gemini];
        let keys = keys_for(&[ModelId::Gpt, ModelId::Claude]);
        let registry = ClientRegistry::build(&config, &keys).unwrap();
        assert!(!registry.contains(ModelId::Gemini));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_build_enabled_stub_still_requires_credential() {
        let mut config = RunConfig::default();
        config.perplexity.enabled = true;
        config.primary_models = vec![ModelId::Gpt, ModelId::Claude, ModelId::Perplexity];
        let keys = keys_for(&[ModelId::Gpt, ModelId::Claude]);
        let err = ClientRegistry::build(&config, &keys).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::MissingCredential {
                id: ModelId::Perplexity,
                ..
            }
        ));

        // With the credential present, the stub client is built.
        let keys = keys_for(&[ModelId::Gpt, ModelId::Claude, ModelId::Perplexity]);
        let registry = ClientRegistry::build(&config, &keys).unwrap();
        assert!(registry.contains(ModelId::Perplexity));
    }

    #[test]
    fn test_build_covers_chairman_outside_primaries() {
        // chairman gpt is referenced even when not a primary model.
        let mut config = RunConfig::default();
        config.primary_models = vec![ModelId::Claude];
        config.interpretive_reviewer = ModelId::Claude;
        let keys = keys_for(&[ModelId::Claude]);
        let err = ClientRegistry::build(&config, &keys).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::MissingCredential {
                id: ModelId::Gpt,
                ..
            }
        ));
    }

    #[test]
    fn test_with_clients() {
        let registry = ClientRegistry::with_clients([
            Arc::new(MockClient::new(ModelId::Gpt)) as Arc<dyn ProviderClient>,
            Arc::new(MockClient::new(ModelId::Claude)) as Arc<dyn ProviderClient>,
        ]);
        assert_eq!(registry.len(), 2);
        assert!(registry.contains(ModelId::Claude));
    }
}
