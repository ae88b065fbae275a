//! The batch orchestrator.
//!
//! For every model, each planned capture goes through the same steps on a
//! freshly reset scene: import, camera, light, render, optional crop, then
//! an atomic write of the sprite followed by its metadata sidecar. Failures
//! are caught at the job boundary and never abort sibling jobs.

use std::path::PathBuf;
use std::time::Instant;

use rayon::prelude::*;
use spritebake_backend_blender::{CameraSetup, LightSetup, RenderEngine};
use spritebake_raster::{bounding_box, crop_sprite, encode_rgba, write_atomic, PngConfig, SPRITE_PADDING};
use spritebake_spec::{
    jobs_for_model, plan, BackendError, CaptureJob, CapturePlan, InvalidConfig, RenderConfig,
    SpriteMetadata,
};
use tracing::{debug, error, info, warn};

use super::discover::ModelEntry;
use super::error::{BatchError, JobError};
use super::result::{BatchReport, JobResult, JobStatus, ModelResult};
use crate::cancel::CancelFlag;
use crate::config::BatchConfig;

/// Reason recorded for jobs not started after cancellation.
pub const CANCELLED: &str = "cancelled";

/// Reason recorded for jobs whose sprite already exists.
pub const OUTPUT_EXISTS: &str = "output exists";

/// Sprite and crop details of a successful capture.
struct Captured {
    crop: Option<spritebake_spec::CropInfo>,
    warnings: Vec<String>,
}

/// Drives captures through a [`RenderEngine`].
#[derive(Debug, Clone)]
pub struct BatchRunner {
    render: RenderConfig,
    plan: CapturePlan,
    output_dir: PathBuf,
    skip_existing: bool,
    auto_crop: bool,
    png: PngConfig,
    cancel: CancelFlag,
}

impl BatchRunner {
    /// Plans the batch. Fails before any job exists if the render settings
    /// cannot be planned.
    pub fn new(config: &BatchConfig) -> Result<Self, InvalidConfig> {
        let plan = plan(&config.render)?;
        Ok(Self {
            render: config.render.clone(),
            plan,
            output_dir: config.output_dir.clone(),
            skip_existing: config.skip_existing,
            auto_crop: config.auto_crop,
            png: PngConfig::default(),
            cancel: CancelFlag::new(),
        })
    }

    /// Uses `cancel` to stop between jobs.
    pub fn with_cancel(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    /// PNG encoder settings for written sprites.
    pub fn with_png_config(mut self, png: PngConfig) -> Self {
        self.png = png;
        self
    }

    pub fn plan(&self) -> &CapturePlan {
        &self.plan
    }

    /// Capture jobs for one model, in plan order.
    pub fn jobs_for(&self, model: &ModelEntry) -> Vec<CaptureJob> {
        jobs_for_model(&model.path, &model.relative, &self.output_dir, &self.plan)
    }

    /// Processes models one after another on a single engine.
    pub fn run<E: RenderEngine>(&self, engine: &mut E, models: &[ModelEntry]) -> BatchReport {
        let total = models.len();
        let models = models
            .iter()
            .enumerate()
            .map(|(idx, model)| {
                info!("[{}/{}] Processing: {}", idx + 1, total, model.relative.display());
                self.run_model(engine, model)
            })
            .collect();

        BatchReport {
            models,
            cancelled: self.cancel.is_cancelled(),
        }
    }

    /// Processes models on `workers` threads. Each thread owns engines made
    /// by `factory`; a model's captures always stay on one thread.
    pub fn run_parallel<E, F>(
        &self,
        factory: F,
        models: &[ModelEntry],
        workers: usize,
    ) -> Result<BatchReport, BatchError>
    where
        E: RenderEngine,
        F: Fn() -> E + Sync + Send,
    {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers.max(1))
            .thread_name(|i| format!("spritebake-worker-{}", i))
            .build()?;

        let models = pool.install(|| {
            models
                .par_iter()
                .map_init(&factory, |engine, model| {
                    info!("Processing: {}", model.relative.display());
                    self.run_model(engine, model)
                })
                .collect()
        });

        Ok(BatchReport {
            models,
            cancelled: self.cancel.is_cancelled(),
        })
    }

    /// Runs every capture of one model as a contiguous group.
    ///
    /// An import failure fails the remaining captures of this model without
    /// touching the engine again.
    pub fn run_model<E: RenderEngine>(&self, engine: &mut E, model: &ModelEntry) -> ModelResult {
        let mut import_failure: Option<(String, String)> = None;
        let mut results = Vec::with_capacity(self.plan.captures.len());

        for job in self.jobs_for(model) {
            let start = Instant::now();
            let status = if self.cancel.is_cancelled() {
                JobStatus::Skipped {
                    reason: CANCELLED.to_string(),
                }
            } else if let Some((code, error)) = &import_failure {
                JobStatus::Failed {
                    code: code.clone(),
                    error: error.clone(),
                }
            } else if self.skip_existing && job.is_complete() {
                debug!(job = %job.label(), output = %job.output_path.display(), "skipping existing sprite");
                JobStatus::Skipped {
                    reason: OUTPUT_EXISTS.to_string(),
                }
            } else {
                match self.capture(engine, &job) {
                    Ok(captured) => {
                        info!(output = %job.output_path.display(), "  Saved: {}", job.label());
                        JobStatus::Rendered {
                            image_path: job.output_path.clone(),
                            metadata_path: job.metadata_path.clone(),
                            crop: captured.crop,
                            warnings: captured.warnings,
                        }
                    }
                    Err(err) => {
                        error!(
                            model = %job.model_path.display(),
                            yaw = job.capture.yaw,
                            code = err.code(),
                            "  Failed: {}: {}",
                            job.label(),
                            err
                        );
                        let failure = (err.code().to_string(), err.to_string());
                        if err.is_import_failure() {
                            import_failure = Some(failure.clone());
                        }
                        JobStatus::Failed {
                            code: failure.0,
                            error: failure.1,
                        }
                    }
                }
            };

            results.push(JobResult {
                yaw: job.capture.yaw,
                direction: job.capture.direction,
                output_path: job.output_path.clone(),
                status,
                duration_ms: start.elapsed().as_millis() as u64,
            });
        }

        ModelResult::from_jobs(model.path.clone(), model.relative.clone(), results)
    }

    /// One capture on a clean scene. Nothing is written unless the render
    /// and the metadata succeed; each file is replaced atomically, sidecar
    /// before sprite.
    fn capture<E: RenderEngine>(&self, engine: &mut E, job: &CaptureJob) -> Result<Captured, JobError> {
        let mut scene = engine.reset_scene();
        engine.import_model(&mut scene, &job.model_path, self.render.scale_factor)?;
        engine.configure_camera(
            &mut scene,
            CameraSetup::from_placement(&self.plan.camera, job.capture.yaw, self.render.ortho_scale),
        );
        engine.configure_light(&mut scene, LightSetup::from_config(&self.render));

        let rendered = engine.render_to_image(
            &scene,
            self.plan.canvas_width_px,
            self.plan.canvas_height_px,
            self.render.samples,
        )?;

        let mut warnings = Vec::new();
        let (image, crop) = if !self.auto_crop {
            (rendered.image, None)
        } else if bounding_box(&rendered.image).is_none() {
            warn!(job = %job.label(), "No visible pixels; sprite left uncropped");
            warnings.push("empty sprite: no visible pixels, left uncropped".to_string());
            (rendered.image, None)
        } else {
            let expanded = crop_sprite(rendered.image, SPRITE_PADDING)?;
            (expanded.image, Some(expanded.info))
        };

        let metadata = SpriteMetadata::for_capture(
            job.model_path.display().to_string(),
            &self.render,
            &self.plan,
            &job.capture,
        )
        .with_bounds(rendered.bounds)
        .with_crop(crop);
        let json = metadata.to_json_pretty()?;
        let png = encode_rgba(&image, &self.png).map_err(|e| JobError::Write {
            path: job.output_path.clone(),
            source: e,
        })?;

        // Sidecar first: a sprite on disk always has its metadata next to it.
        write_atomic(&job.metadata_path, json.as_bytes()).map_err(|e| JobError::Write {
            path: job.metadata_path.clone(),
            source: e,
        })?;
        if let Err(e) = write_atomic(&job.output_path, &png) {
            let _ = std::fs::remove_file(&job.metadata_path);
            return Err(JobError::Write {
                path: job.output_path.clone(),
                source: e,
            });
        }

        Ok(Captured { crop, warnings })
    }
}
