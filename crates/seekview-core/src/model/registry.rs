use crate::{
    config::RegistryConfig,
    model::{BuildError, EntityModel, TypeKey, TypeRef, build::ModelBuilder},
    obs::sink::{MetricsEvent, record},
    traits::Mapped,
};
use std::{
    collections::HashMap,
    sync::{Arc, Mutex, PoisonError},
};
use tracing::{debug, warn};

///
/// MetadataRegistry
///
/// Process-wide cache of entity models keyed by runtime type identity.
///
/// Build-or-fetch is a single critical section: concurrent first requests
/// for the same type observe one model instance. Models built as part of a
/// failed graph are discarded, and a later request retries from scratch.
///

#[derive(Debug, Default)]
pub struct MetadataRegistry {
    config: RegistryConfig,
    models: Mutex<HashMap<TypeKey, Arc<EntityModel>>>,
}

impl MetadataRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_config(config: RegistryConfig) -> Self {
        Self {
            config,
            models: Mutex::new(HashMap::new()),
        }
    }

    #[must_use]
    pub const fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Model for a mapped type, building its whole reachable graph on first use.
    pub fn model_for<T: Mapped>(&self) -> Result<Arc<EntityModel>, BuildError> {
        self.build_metadata(TypeRef::mapped::<T>())
    }

    pub fn build_metadata(&self, ty: TypeRef) -> Result<Arc<EntityModel>, BuildError> {
        let mut models = self.models.lock().unwrap_or_else(PoisonError::into_inner);
        let type_name = ty.key().short_name();

        if let Some(model) = models.get(&ty.key()) {
            debug!(model = type_name, "model cache hit");
            record(MetricsEvent::ModelCacheHit { type_name });
            return Ok(Arc::clone(model));
        }

        debug!(model = type_name, cached = models.len(), "building model");
        let mut builder = ModelBuilder::new(&models, &self.config);
        let result = builder.build(ty);
        let staged = builder.into_staged();

        match result {
            Ok(model) => {
                for key in staged.keys() {
                    debug!(model = key.short_name(), requested = type_name, "model built");
                    record(MetricsEvent::ModelBuilt {
                        type_name: key.short_name(),
                    });
                }
                models.extend(staged);

                Ok(model)
            }
            Err(err) => {
                warn!(
                    model = type_name,
                    discarded = staged.len(),
                    error = %err,
                    "model build failed"
                );
                record(MetricsEvent::ModelBuildFailed { type_name });

                Err(err)
            }
        }
    }

    /// Already-built model, without triggering a build.
    #[must_use]
    pub fn get(&self, key: TypeKey) -> Option<Arc<EntityModel>> {
        self.models
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
            .map(Arc::clone)
    }

    #[must_use]
    pub fn contains(&self, key: TypeKey) -> bool {
        self.get(key).is_some()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.models
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
