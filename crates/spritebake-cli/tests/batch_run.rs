//! Batch orchestrator tests against a scripted, recording render engine.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use pretty_assertions::assert_eq;
use spritebake_backend_blender::{
    CameraSetup, ImportError, ImportedModel, LightSetup, RenderEngine, RenderError, RenderedImage,
    SceneHandle,
};
use spritebake_cli::batch::{
    discover_models, BatchRunner, JobStatus, ModelEntry, ModelOutcome, CANCELLED, OUTPUT_EXISTS,
};
use spritebake_cli::cancel::CancelFlag;
use spritebake_cli::config::BatchConfig;
use spritebake_raster::{read_png, RgbaImage};
use spritebake_spec::{Direction, ObjectBounds, RenderConfig};
use tempfile::TempDir;

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Reset,
    Import(String),
    Camera(f64),
    Light,
    Render { width: u32, height: u32, samples: u32 },
}

/// Records every call; fails imports and renders by script.
#[derive(Default)]
struct RecordingEngine {
    calls: Arc<Mutex<Vec<Call>>>,
    failing_imports: HashSet<String>,
    failing_renders: HashSet<(String, u32)>,
    /// Models that render fully transparent.
    empty_models: HashSet<String>,
    generation: u64,
    /// Set by `cancel_after_renders`.
    cancel: Option<(CancelFlag, usize)>,
}

impl RecordingEngine {
    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn render_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::Render { .. }))
            .count()
    }
}

fn file_name(path: &Path) -> String {
    path.file_name().unwrap().to_string_lossy().into_owned()
}

impl RenderEngine for RecordingEngine {
    fn reset_scene(&mut self) -> SceneHandle {
        self.record(Call::Reset);
        self.generation += 1;
        SceneHandle::new(self.generation)
    }

    fn import_model(
        &mut self,
        scene: &mut SceneHandle,
        path: &Path,
        scale_factor: f64,
    ) -> Result<(), ImportError> {
        let name = file_name(path);
        self.record(Call::Import(name.clone()));
        assert!(scene.model.is_none(), "scene was not reset before import");
        if self.failing_imports.contains(&name) {
            return Err(ImportError::MissingCompanion {
                model: path.to_path_buf(),
                companion: path.with_extension("bin"),
            });
        }
        scene.model = Some(ImportedModel {
            path: path.to_path_buf(),
            scale_factor,
        });
        Ok(())
    }

    fn configure_camera(&mut self, scene: &mut SceneHandle, camera: CameraSetup) {
        self.record(Call::Camera(camera.yaw));
        scene.camera = Some(camera);
    }

    fn configure_light(&mut self, scene: &mut SceneHandle, light: LightSetup) {
        self.record(Call::Light);
        scene.light = Some(light);
    }

    fn render_to_image(
        &mut self,
        scene: &SceneHandle,
        width: u32,
        height: u32,
        samples: u32,
    ) -> Result<RenderedImage, RenderError> {
        self.record(Call::Render {
            width,
            height,
            samples,
        });
        let model = scene.model.as_ref().ok_or(RenderError::NoModel)?;
        let camera = scene.camera.ok_or(RenderError::NoCamera)?;
        let name = file_name(&model.path);

        if let Some((flag, after)) = &self.cancel {
            if self.render_count() >= *after {
                flag.cancel();
            }
        }
        if self.failing_renders.contains(&(name.clone(), camera.yaw as u32)) {
            return Err(RenderError::Other("engine crashed".into()));
        }

        let mut image = RgbaImage::transparent(width, height);
        if !self.empty_models.contains(&name) {
            for y in 20..50 {
                for x in 10..30 {
                    image.set(x, y, [180, 120, 60, 255]);
                }
            }
        }
        Ok(RenderedImage {
            image,
            bounds: Some(ObjectBounds::new([-0.5, -0.5, 0.0], [0.5, 0.5, 1.0])),
        })
    }
}

struct Fixture {
    input: TempDir,
    output: TempDir,
}

impl Fixture {
    fn new(models: &[&str]) -> Self {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        for model in models {
            let path = input.path().join(model);
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(path, b"model").unwrap();
        }
        Self { input, output }
    }

    fn config(&self, render: RenderConfig) -> BatchConfig {
        BatchConfig {
            input_dir: self.input.path().to_path_buf(),
            output_dir: self.output.path().to_path_buf(),
            render: RenderConfig {
                // Small canvas keeps the tests fast.
                pixels_per_unit: 16.0,
                ..render
            },
            ..Default::default()
        }
    }

    fn models(&self, config: &BatchConfig) -> Vec<ModelEntry> {
        discover_models(&config.input_dir, &config.formats).unwrap()
    }

    fn out(&self, relative: &str) -> PathBuf {
        self.output.path().join(relative)
    }
}

#[test]
fn import_failure_fails_only_that_model() {
    let fx = Fixture::new(&["a.glb", "b.glb", "c.glb"]);
    let config = fx.config(RenderConfig::default());
    let mut engine = RecordingEngine {
        failing_imports: HashSet::from(["b.glb".to_string()]),
        ..Default::default()
    };

    let report = BatchRunner::new(&config)
        .unwrap()
        .run(&mut engine, &fx.models(&config));

    let outcomes = report.outcomes();
    assert!(matches!(outcomes[0], ModelOutcome::Rendered(_)));
    assert!(matches!(outcomes[1], ModelOutcome::Failed(msg) if msg.contains("IMPORT_003")));
    assert!(matches!(outcomes[2], ModelOutcome::Rendered(_)));
    assert!(report.has_failures());

    assert!(fx.out("a.png").exists());
    assert!(!fx.out("b.png").exists());
    assert!(!fx.out("b.json").exists());
    assert!(fx.out("c.png").exists());
    assert_eq!(engine.render_count(), 2);
}

#[test]
fn skip_existing_never_touches_the_engine() {
    let fx = Fixture::new(&["crate.glb", "barrel.obj"]);
    std::fs::write(fx.out("crate.png"), b"previous").unwrap();
    std::fs::write(fx.out("crate.json"), b"{}").unwrap();

    let mut config = fx.config(RenderConfig::default());
    config.skip_existing = true;
    let mut engine = RecordingEngine::default();

    let report = BatchRunner::new(&config)
        .unwrap()
        .run(&mut engine, &fx.models(&config));

    // Sorted discovery: barrel.obj first, then crate.glb.
    assert!(matches!(report.models[0].outcome, ModelOutcome::Rendered(_)));
    assert_eq!(
        report.models[1].outcome,
        ModelOutcome::Skipped(OUTPUT_EXISTS.to_string())
    );
    assert!(!engine.calls().contains(&Call::Import("crate.glb".into())));
    assert_eq!(engine.render_count(), 1);
    assert_eq!(std::fs::read(fx.out("crate.png")).unwrap(), b"previous");

    let counts = report.counts();
    assert_eq!((counts.rendered, counts.skipped, counts.failed), (1, 1, 0));
}

#[test]
fn failed_sidecar_write_leaves_no_sprite_and_resume_redoes_it() {
    let fx = Fixture::new(&["crate.glb"]);
    // A directory where the sidecar belongs makes the metadata write fail.
    std::fs::create_dir_all(fx.out("crate.json")).unwrap();

    let mut config = fx.config(RenderConfig::default());
    config.skip_existing = true;
    let mut engine = RecordingEngine::default();
    let runner = BatchRunner::new(&config).unwrap();

    let first = runner.run(&mut engine, &fx.models(&config));
    assert!(matches!(&first.models[0].outcome, ModelOutcome::Failed(msg) if msg.contains("BATCH_004")));
    assert!(!fx.out("crate.png").exists());

    std::fs::remove_dir(fx.out("crate.json")).unwrap();
    let second = runner.run(&mut engine, &fx.models(&config));
    assert!(matches!(second.models[0].outcome, ModelOutcome::Rendered(_)));
    assert!(fx.out("crate.png").is_file());
    assert!(fx.out("crate.json").is_file());
    assert_eq!(engine.render_count(), 2);
}

#[test]
fn skip_existing_redoes_sprite_without_sidecar() {
    let fx = Fixture::new(&["crate.glb"]);
    std::fs::write(fx.out("crate.png"), b"orphan").unwrap();

    let mut config = fx.config(RenderConfig::default());
    config.skip_existing = true;
    let mut engine = RecordingEngine::default();

    let report = BatchRunner::new(&config)
        .unwrap()
        .run(&mut engine, &fx.models(&config));

    assert!(matches!(report.models[0].outcome, ModelOutcome::Rendered(_)));
    assert_eq!(engine.render_count(), 1);
    assert!(fx.out("crate.json").is_file());
    assert_ne!(std::fs::read(fx.out("crate.png")).unwrap(), b"orphan");
}

#[test]
fn four_rotations_write_suffixed_sprites_and_sidecars() {
    let fx = Fixture::new(&["props/tree.fbx"]);
    let config = fx.config(RenderConfig {
        rotations: 4,
        ..Default::default()
    });
    let mut engine = RecordingEngine::default();

    let report = BatchRunner::new(&config)
        .unwrap()
        .run(&mut engine, &fx.models(&config));

    let expected: Vec<PathBuf> = ["_s", "_e", "_n", "_w"]
        .iter()
        .map(|s| fx.out(&format!("props/tree{}.png", s)))
        .collect();
    assert_eq!(report.models[0].outcome, ModelOutcome::Rendered(expected.clone()));

    let directions: Vec<_> = report.models[0].jobs.iter().map(|j| j.direction).collect();
    assert_eq!(
        directions,
        vec![
            Some(Direction::South),
            Some(Direction::East),
            Some(Direction::North),
            Some(Direction::West)
        ]
    );

    let sidecar: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(fx.out("props/tree_n.json")).unwrap())
            .unwrap();
    assert_eq!(sidecar["capture_angle"], 180.0);
    assert_eq!(sidecar["direction"], "north");
    assert_eq!(sidecar["canvas_width"], 64);
    assert_eq!(sidecar["world_to_pixel"], 16.0);
    assert_eq!(sidecar["crop"]["cropped_size"], serde_json::json!([20, 30]));
    assert!(sidecar["source"].as_str().unwrap().ends_with("tree.fbx"));
}

#[test]
fn every_job_starts_from_a_reset_scene() {
    let fx = Fixture::new(&["a.glb"]);
    let config = fx.config(RenderConfig {
        rotations: 4,
        camera_yaw: 45.0,
        samples: 8,
        ..Default::default()
    });
    let mut engine = RecordingEngine::default();
    BatchRunner::new(&config)
        .unwrap()
        .run(&mut engine, &fx.models(&config));

    let calls = engine.calls();
    assert_eq!(calls.len(), 4 * 5);
    for (chunk, yaw) in calls.chunks(5).zip([45.0, 135.0, 225.0, 315.0]) {
        assert_eq!(
            chunk,
            &[
                Call::Reset,
                Call::Import("a.glb".into()),
                Call::Camera(yaw),
                Call::Light,
                Call::Render {
                    width: 64,
                    height: 64,
                    samples: 8
                },
            ]
        );
    }
}

#[test]
fn render_failure_is_per_job() {
    let fx = Fixture::new(&["a.glb"]);
    let config = fx.config(RenderConfig {
        rotations: 4,
        ..Default::default()
    });
    let mut engine = RecordingEngine {
        failing_renders: HashSet::from([("a.glb".to_string(), 90)]),
        ..Default::default()
    };

    let report = BatchRunner::new(&config)
        .unwrap()
        .run(&mut engine, &fx.models(&config));

    let jobs = &report.models[0].jobs;
    assert!(jobs[0].is_rendered());
    assert!(matches!(&jobs[1].status, JobStatus::Failed { code, .. } if code == "RENDER_005"));
    assert!(jobs[2].is_rendered());
    assert!(jobs[3].is_rendered());
    assert!(!fx.out("a_e.png").exists());
    assert!(matches!(report.models[0].outcome, ModelOutcome::Failed(_)));
}

#[test]
fn auto_crop_produces_power_of_two_sprite() {
    let fx = Fixture::new(&["a.glb"]);
    let config = fx.config(RenderConfig::default());
    let mut engine = RecordingEngine::default();
    BatchRunner::new(&config)
        .unwrap()
        .run(&mut engine, &fx.models(&config));

    // 20x30 content + 4px border = 28x38 -> 32x64.
    let sprite = read_png(&fx.out("a.png")).unwrap();
    assert_eq!((sprite.width, sprite.height), (32, 64));
}

#[test]
fn auto_crop_disabled_keeps_full_canvas() {
    let fx = Fixture::new(&["a.glb"]);
    let mut config = fx.config(RenderConfig::default());
    config.auto_crop = false;
    let mut engine = RecordingEngine::default();
    let report = BatchRunner::new(&config)
        .unwrap()
        .run(&mut engine, &fx.models(&config));

    let sprite = read_png(&fx.out("a.png")).unwrap();
    assert_eq!((sprite.width, sprite.height), (64, 64));
    assert!(matches!(
        &report.models[0].jobs[0].status,
        JobStatus::Rendered { crop: None, .. }
    ));
}

#[test]
fn empty_render_is_kept_uncropped_with_warning() {
    let fx = Fixture::new(&["ghost.glb"]);
    let config = fx.config(RenderConfig::default());
    let mut engine = RecordingEngine {
        empty_models: HashSet::from(["ghost.glb".to_string()]),
        ..Default::default()
    };

    let report = BatchRunner::new(&config)
        .unwrap()
        .run(&mut engine, &fx.models(&config));

    assert!(matches!(report.models[0].outcome, ModelOutcome::Rendered(_)));
    assert!(report.models[0].jobs[0].has_warnings());
    assert_eq!(report.counts().warnings, 1);
    let sprite = read_png(&fx.out("ghost.png")).unwrap();
    assert_eq!((sprite.width, sprite.height), (64, 64));
}

#[test]
fn cancellation_stops_between_jobs() {
    let fx = Fixture::new(&["a.glb", "b.glb"]);
    let config = fx.config(RenderConfig {
        rotations: 4,
        ..Default::default()
    });
    let cancel = CancelFlag::new();
    let mut engine = RecordingEngine {
        cancel: Some((cancel.clone(), 2)),
        ..Default::default()
    };

    let report = BatchRunner::new(&config)
        .unwrap()
        .with_cancel(cancel)
        .run(&mut engine, &fx.models(&config));

    assert!(report.cancelled);
    let counts = report.counts();
    // The in-flight capture finishes; nothing after it starts.
    assert_eq!((counts.rendered, counts.skipped), (2, 6));
    assert_eq!(
        report.models[1].outcome,
        ModelOutcome::Skipped(CANCELLED.to_string())
    );
    assert_eq!(engine.render_count(), 2);
}

#[test]
fn empty_input_directory_yields_empty_report() {
    let fx = Fixture::new(&[]);
    let config = fx.config(RenderConfig::default());
    let models = fx.models(&config);
    assert!(models.is_empty());

    let report = BatchRunner::new(&config)
        .unwrap()
        .run(&mut RecordingEngine::default(), &models);
    assert!(report.models.is_empty());
    assert!(!report.has_failures());
}

#[test]
fn invalid_config_is_rejected_before_any_job() {
    let fx = Fixture::new(&["a.glb"]);
    let config = fx.config(RenderConfig {
        rotations: 3,
        ..Default::default()
    });
    let err = BatchRunner::new(&config).unwrap_err();
    assert_eq!(err.field, "rotations");
}

#[test]
fn parallel_run_keeps_model_order_and_groups() {
    let fx = Fixture::new(&["a.glb", "b.glb", "c.glb", "d.glb"]);
    let config = fx.config(RenderConfig {
        rotations: 4,
        ..Default::default()
    });
    let calls = Arc::new(Mutex::new(Vec::new()));

    let report = BatchRunner::new(&config)
        .unwrap()
        .run_parallel(
            || RecordingEngine {
                calls: Arc::clone(&calls),
                failing_imports: HashSet::from(["c.glb".to_string()]),
                ..Default::default()
            },
            &fx.models(&config),
            3,
        )
        .unwrap();

    let relative: Vec<_> = report.models.iter().map(|m| m.relative_path.clone()).collect();
    assert_eq!(
        relative,
        ["a.glb", "b.glb", "c.glb", "d.glb"]
            .iter()
            .map(PathBuf::from)
            .collect::<Vec<_>>()
    );
    assert!(matches!(report.models[2].outcome, ModelOutcome::Failed(_)));
    assert_eq!(report.counts().rendered, 12);
    for model in ["a", "b", "d"] {
        for suffix in ["_s", "_e", "_n", "_w"] {
            assert!(fx.out(&format!("{}{}.png", model, suffix)).exists());
        }
    }
}
