//! Drives [`BlenderEngine`] against a stand-in Blender executable.
//!
//! The stand-in is a shell script that answers the capture protocol the way
//! the real entrypoint does: it drops a PNG next to the request and writes a
//! report to the path after `--report`.

#![cfg(unix)]

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use spritebake_backend_blender::{
    BlenderEngine, CameraSetup, ImportError, OrchestratorConfig, RenderEngine, RenderError,
};
use spritebake_raster::{write_png, PngConfig, RgbaImage};
use spritebake_spec::BackendError;

fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

fn engine_for(blender: PathBuf) -> BlenderEngine {
    BlenderEngine::with_config(OrchestratorConfig::default().blender_path(blender))
}

fn camera() -> CameraSetup {
    CameraSetup {
        distance: 5.0,
        height: 5.0,
        pitch: 45.0,
        yaw: 90.0,
        ortho_scale: 4.0,
    }
}

// Scripts are written up front and run one after another so no spawned
// process can inherit a script's still-open write handle.
#[test]
fn test_capture_protocol_outcomes() {
    let dir = tempfile::tempdir().unwrap();
    let model = dir.path().join("crate.obj");
    std::fs::write(&model, "v 0 0 0\nv 1 1 1\nf 1 2 1\n").unwrap();

    let mut sprite = RgbaImage::transparent(8, 8);
    sprite.set(3, 4, [200, 10, 10, 255]);
    let sprite_path = dir.path().join("fixture_8.png");
    write_png(&sprite, &sprite_path, &PngConfig::default()).unwrap();
    let small_path = dir.path().join("fixture_4.png");
    write_png(&RgbaImage::transparent(4, 4), &small_path, &PngConfig::default()).unwrap();

    let success = write_script(
        dir.path(),
        "blender_ok",
        &format!(
            "cp '{}' \"$(dirname \"$9\")/render.png\"\n\
             printf '%s' '{{\"ok\":true,\"blender_version\":\"4.1.0\",\
             \"bounds\":{{\"min\":[0,0,0],\"max\":[1,1,1]}}}}' > \"$9\"",
            sprite_path.display()
        ),
    );
    let wrong_size = write_script(
        dir.path(),
        "blender_small",
        &format!(
            "cp '{}' \"$(dirname \"$9\")/render.png\"\nprintf '%s' '{{\"ok\":true}}' > \"$9\"",
            small_path.display()
        ),
    );
    let rejects = write_script(
        dir.path(),
        "blender_rejects",
        "printf '%s' '{\"ok\":false,\"stage\":\"import\",\"error\":\"no mesh data\"}' > \"$9\"\nexit 1",
    );
    let crashes = write_script(dir.path(), "blender_crash", "echo 'segfault' >&2\nexit 139");

    // A full capture returns the image and the reported bounds.
    let mut engine = engine_for(success);
    let mut scene = engine.reset_scene();
    engine.import_model(&mut scene, &model, 1.0).unwrap();
    engine.configure_camera(&mut scene, camera());
    let rendered = engine.render_to_image(&scene, 8, 8, 4).unwrap();
    assert_eq!(rendered.image, sprite);
    assert_eq!(rendered.bounds.unwrap().size(), [1.0, 1.0, 1.0]);

    // An image of the wrong size is not accepted.
    let mut engine = engine_for(wrong_size);
    let mut scene = engine.reset_scene();
    engine.import_model(&mut scene, &model, 1.0).unwrap();
    engine.configure_camera(&mut scene, camera());
    let err = engine.render_to_image(&scene, 8, 8, 4).unwrap_err();
    assert!(matches!(
        err,
        RenderError::SizeMismatch {
            expected: [8, 8],
            actual: [4, 4]
        }
    ));

    // An import stage failure belongs to the model.
    let mut engine = engine_for(rejects);
    let mut scene = engine.reset_scene();
    engine.import_model(&mut scene, &model, 1.0).unwrap();
    engine.configure_camera(&mut scene, camera());
    let err = engine.render_to_image(&scene, 8, 8, 4).unwrap_err();
    assert!(err.is_import_failure());
    assert_eq!(err.code(), "IMPORT_005");
    match err {
        RenderError::Import(ImportError::Rejected { path, message }) => {
            assert_eq!(path, model);
            assert_eq!(message, "no mesh data");
        }
        other => panic!("unexpected error: {other}"),
    }

    // A crash without a report surfaces the exit status and stderr.
    let mut engine = engine_for(crashes);
    let mut scene = engine.reset_scene();
    engine.import_model(&mut scene, &model, 1.0).unwrap();
    engine.configure_camera(&mut scene, camera());
    let err = engine.render_to_image(&scene, 8, 8, 4).unwrap_err();
    assert!(!err.is_import_failure());
    assert_eq!(err.code(), "BLENDER_004");
    assert!(err.to_string().contains("segfault"), "{err}");
}
