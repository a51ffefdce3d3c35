// docket/src/pipeline/execution.rs

//! Contains `Invoker::execute`, which validates the declaration, seeds the run
//! context and drives each stage to completion in declaration order.

use crate::config::RunSettings;
use crate::core::context::{RunContext, ATTR_BASE_DIR, ATTR_INPUT_MAP, ATTR_MESSAGE, ATTR_TEMP_DIR};
use crate::core::param::apply_params;
use crate::error::{DocketError, DocketResult};
use crate::job::cache::RunIdentity;
use crate::module::ModuleConfig;
use crate::pipeline::definition::Invoker;
use crate::pipeline::dispatch::{prepare, DispatchContext, PreparedStage};
use crate::pipeline::report::{RunReport, StageTiming};
use crate::stage::{StageInput, StageLogger};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{event, instrument, span, Instrument, Level};

/// Result of initialization: where the job lives and the seeded run context.
pub(crate) struct Initialized {
  pub base_dir: PathBuf,
  pub temp_dir: PathBuf,
  pub attributes: RunContext,
}

impl Invoker {
  /// Checks the whole declaration and builds the run-wide context.
  ///
  /// Every configuration error that can be found without constructing a stage
  /// is reported here, before the job is loaded or any stage runs.
  pub(crate) fn initialize(&self, settings: &RunSettings) -> DocketResult<Initialized> {
    if self.declaration.modules.is_empty() {
      return Err(DocketError::NoModules);
    }
    let base_dir = settings.resolved_base_dir()?;
    let temp_dir = settings.resolved_temp_dir()?;

    let mut attributes = RunContext::new();
    if let Some(message) = &settings.message {
      attributes.set(ATTR_MESSAGE, message.as_str());
    }
    if let Some(input_map) = &settings.input_map {
      attributes.set(ATTR_INPUT_MAP, input_map.as_str());
    }
    attributes.set(ATTR_TEMP_DIR, temp_dir.to_string_lossy());
    attributes.set_if_absent(ATTR_BASE_DIR, || base_dir.to_string_lossy().into_owned());
    apply_params(&self.declaration.params, &settings.properties, "pipeline", |name, value| {
      attributes.set(name, value)
    })?;

    for (stage_index, module) in self.declaration.modules.iter().enumerate() {
      module.validate(stage_index).map_err(|e| e.at_stage(stage_index))?;
      self
        .check_implementations(module, stage_index, settings)
        .map_err(|e| e.at_stage(stage_index))?;
    }
    Ok(Initialized {
      base_dir,
      temp_dir,
      attributes,
    })
  }

  /// Fails if a stage names an implementation the factory cannot build.
  /// Filter entries gated out for this run are not checked.
  fn check_implementations(
    &self,
    module: &ModuleConfig,
    stage_index: usize,
    settings: &RunSettings,
  ) -> DocketResult<()> {
    let unresolved = |kind: &'static str, id: &str| DocketError::UnresolvedImplementation {
      kind,
      id: id.to_string(),
      stage_index: Some(stage_index),
    };
    match module {
      ModuleConfig::Module(generic) => match generic.id.as_deref() {
        Some(id) if !self.factory.has_module(id) => Err(unresolved("module", id)),
        _ => Ok(()),
      },
      ModuleConfig::Transform(_) => self.factory.transform_engine().map(|_| ()),
      ModuleConfig::FilterChain(chain) => {
        for (entry_index, entry) in chain.entries.iter().enumerate() {
          if !entry.condition.is_active(&settings.properties) {
            continue;
          }
          match entry.id.as_deref() {
            None => {
              return Err(DocketError::configuration(
                stage_index,
                chain.label(),
                format!("filter {} has no implementation defined", entry_index),
              ));
            }
            Some(id) if !self.factory.has_filter(id) => return Err(unresolved("filter", id)),
            Some(_) => {}
          }
        }
        Ok(())
      }
    }
  }

  /// Executes every stage in order against the job bound to `identity`.
  ///
  /// The first failure ends the run. Stages already completed are not undone.
  #[instrument(
        name = "Invoker::execute",
        skip_all,
        fields(run = %identity, num_stages = self.declaration.modules.len()),
        err(Display)
    )]
  pub async fn execute(&self, settings: &RunSettings, identity: &RunIdentity) -> DocketResult<RunReport> {
    let Initialized {
      base_dir,
      temp_dir,
      mut attributes,
    } = self.initialize(settings)?;
    let job = self.jobs.get_or_create(&temp_dir, identity)?;
    event!(Level::DEBUG, temp_dir = %temp_dir.display(), "Pipeline execution starting.");

    let cx = DispatchContext {
      factory: &self.factory,
      properties: &settings.properties,
      base_dir: &base_dir,
      temp_dir: &temp_dir,
    };
    let mut stages = Vec::with_capacity(self.declaration.modules.len());

    for (stage_index, config) in self.declaration.modules.iter().enumerate() {
      let stage_name = config.label();
      let stage_span = span!(
        Level::INFO,
        "pipeline_stage_execution",
        stage_index,
        stage_name = %stage_name,
        stage_kind = config.kind()
      );

      let PreparedStage {
        mut module,
        attributes: stage_attributes,
      } = stage_span
        .in_scope(|| prepare(config, stage_index, attributes.clone(), &cx))
        .map_err(|e| e.at_stage(stage_index))?;
      let input = StageInput {
        attributes: stage_attributes,
        job: job.clone(),
        logger: StageLogger::new(stage_index, stage_name.as_str()),
      };

      let start = Instant::now();
      let outcome = module.execute(input).instrument(stage_span.clone()).await;
      let elapsed = start.elapsed();
      let output = outcome.map_err(|source| {
        event!(parent: &stage_span, Level::ERROR, error = %source, "Stage failed.");
        DocketError::StageFailed {
          stage_index,
          stage: stage_name.clone(),
          source,
        }
      })?;
      event!(parent: &stage_span, Level::DEBUG, "Module processing took {} ms", elapsed.as_millis());

      attributes.extend(output.exports);
      stages.push(StageTiming {
        index: stage_index,
        name: stage_name,
        kind: config.kind(),
        elapsed,
      });
    }

    event!(Level::DEBUG, "Pipeline execution completed successfully.");
    Ok(RunReport {
      identity: identity.clone(),
      stages,
      attributes,
    })
  }
}
