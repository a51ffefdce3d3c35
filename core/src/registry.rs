// docket/src/registry.rs

//! Defines `ModuleFactory`, the registration table that turns implementation
//! identifiers from a declaration into runnable stage and filter instances.

use crate::error::{DocketError, DocketResult};
use crate::stage::{PipelineModule, TransformEngine, XmlFilter};
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{event, Level};

/// Builds a fresh generic stage instance for every use.
pub type ModuleConstructor = Arc<dyn Fn() -> Box<dyn PipelineModule> + Send + Sync>;

/// Builds a fresh filter instance for every use.
pub type FilterConstructor = Arc<dyn Fn() -> Box<dyn XmlFilter> + Send + Sync>;

/// The module factory.
///
/// Generic stages and chain filters are looked up by identifier. Transform
/// stages are built by the invoker itself and only need the engine.
#[derive(Default)]
pub struct ModuleFactory {
  modules: Mutex<HashMap<String, ModuleConstructor>>,
  filters: Mutex<HashMap<String, FilterConstructor>>,
  transform_engine: RwLock<Option<Arc<dyn TransformEngine>>>,
}

impl ModuleFactory {
  /// Creates a new, empty factory.
  pub fn new() -> Self {
    Self::default()
  }

  /// Registers a generic stage constructor, replacing any previous one for `id`.
  pub fn register_module<M, F>(&self, id: impl Into<String>, constructor: F)
  where
    M: PipelineModule + 'static,
    F: Fn() -> M + Send + Sync + 'static,
  {
    let id = id.into();
    event!(Level::DEBUG, %id, module_type = %std::any::type_name::<M>(), "Registering module.");
    let constructor: ModuleConstructor = Arc::new(move || Box::new(constructor()) as Box<dyn PipelineModule>);
    self.modules.lock().insert(id, constructor);
  }

  /// Registers a chain filter constructor, replacing any previous one for `id`.
  pub fn register_filter<X, F>(&self, id: impl Into<String>, constructor: F)
  where
    X: XmlFilter + 'static,
    F: Fn() -> X + Send + Sync + 'static,
  {
    let id = id.into();
    event!(Level::DEBUG, %id, filter_type = %std::any::type_name::<X>(), "Registering filter.");
    let constructor: FilterConstructor = Arc::new(move || Box::new(constructor()) as Box<dyn XmlFilter>);
    self.filters.lock().insert(id, constructor);
  }

  pub fn set_transform_engine(&self, engine: Arc<dyn TransformEngine>) {
    *self.transform_engine.write() = Some(engine);
  }

  pub fn has_module(&self, id: &str) -> bool {
    self.modules.lock().contains_key(id)
  }

  pub fn has_filter(&self, id: &str) -> bool {
    self.filters.lock().contains_key(id)
  }

  pub fn create_module(&self, id: &str) -> DocketResult<Box<dyn PipelineModule>> {
    // Clone the constructor out so the table is not locked while it runs.
    let constructor = self.modules.lock().get(id).cloned().ok_or_else(|| {
      event!(Level::ERROR, %id, "No module registered.");
      DocketError::UnresolvedImplementation {
        kind: "module",
        id: id.to_string(),
        stage_index: None,
      }
    })?;
    Ok(constructor())
  }

  pub fn create_filter(&self, id: &str) -> DocketResult<Box<dyn XmlFilter>> {
    let constructor = self.filters.lock().get(id).cloned().ok_or_else(|| {
      event!(Level::ERROR, %id, "No filter registered.");
      DocketError::UnresolvedImplementation {
        kind: "filter",
        id: id.to_string(),
        stage_index: None,
      }
    })?;
    Ok(constructor())
  }

  pub fn transform_engine(&self) -> DocketResult<Arc<dyn TransformEngine>> {
    self
      .transform_engine
      .read()
      .clone()
      .ok_or_else(|| DocketError::UnresolvedImplementation {
        kind: "transform engine",
        id: "default".to_string(),
        stage_index: None,
      })
  }
}
