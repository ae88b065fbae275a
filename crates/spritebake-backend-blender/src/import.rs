//! Pre-import model checks.
//!
//! Blender happily "imports" a glTF whose buffers are missing and renders an
//! empty frame. These checks run before any process is spawned so that a
//! broken model fails as an [`ImportError`] instead of producing a blank
//! sprite.

use std::path::{Path, PathBuf};

use serde::Serialize;
use spritebake_spec::ObjectBounds;

use crate::engine::{model_extension, SUPPORTED_EXTENSIONS};
use crate::error::ImportError;

/// Static facts about a model file, gathered without Blender.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelSummary {
    pub path: PathBuf,
    pub format: String,
    pub file_size: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mesh_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vertex_count: Option<usize>,
    /// Union of mesh-local bounds; node transforms are not applied.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bounds: Option<ObjectBounds>,
    /// External files the model references.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub companions: Vec<PathBuf>,
}

/// Checks that `path` exists, has a supported extension and, for glTF,
/// that every external buffer and image it references is present.
pub fn validate_model(path: &Path) -> Result<(), ImportError> {
    if !path.is_file() {
        return Err(ImportError::NotFound {
            path: path.to_path_buf(),
        });
    }

    let extension = supported_extension(path)?;
    if extension == ".gltf" || extension == ".glb" {
        let gltf = parse_gltf(path)?;
        for companion in gltf_companions(path, &gltf) {
            if !companion.is_file() {
                return Err(ImportError::MissingCompanion {
                    model: path.to_path_buf(),
                    companion,
                });
            }
        }
    }
    Ok(())
}

/// Summarizes a model for the `inspect` command.
pub fn describe_model(path: &Path) -> Result<ModelSummary, ImportError> {
    let metadata = std::fs::metadata(path).map_err(|_| ImportError::NotFound {
        path: path.to_path_buf(),
    })?;
    let format = supported_extension(path)?;

    let mut summary = ModelSummary {
        path: path.to_path_buf(),
        format: format.trim_start_matches('.').to_string(),
        file_size: metadata.len(),
        mesh_count: None,
        vertex_count: None,
        bounds: None,
        companions: Vec::new(),
    };

    match format.as_str() {
        ".gltf" | ".glb" => {
            let gltf = parse_gltf(path)?;
            let mut vertices = 0;
            let mut bounds: Option<ObjectBounds> = None;
            for mesh in gltf.meshes() {
                for primitive in mesh.primitives() {
                    if let Some(positions) = primitive.get(&gltf::Semantic::Positions) {
                        vertices += positions.count();
                    }
                    let bb = primitive.bounding_box();
                    let (min, max) = (widen(bb.min), widen(bb.max));
                    match bounds.as_mut() {
                        Some(b) => {
                            b.include(min);
                            b.include(max);
                        }
                        None => bounds = Some(ObjectBounds::new(min, max)),
                    }
                }
            }
            summary.mesh_count = Some(gltf.meshes().len());
            summary.vertex_count = Some(vertices);
            summary.bounds = bounds;
            summary.companions = gltf_companions(path, &gltf);
        }
        ".obj" => {
            let text = std::fs::read_to_string(path).map_err(|e| malformed(path, e))?;
            let obj = scan_obj(&text);
            summary.mesh_count = Some(obj.objects.max(1));
            summary.vertex_count = Some(obj.vertices);
            summary.bounds = obj.bounds;
            let dir = path.parent().unwrap_or_else(|| Path::new(""));
            summary.companions = obj.material_libs.iter().map(|m| dir.join(m)).collect();
        }
        _ => {}
    }

    Ok(summary)
}

fn supported_extension(path: &Path) -> Result<String, ImportError> {
    let extension = model_extension(path).unwrap_or_default();
    if SUPPORTED_EXTENSIONS.contains(&extension.as_str()) {
        Ok(extension)
    } else {
        Err(ImportError::UnsupportedFormat {
            path: path.to_path_buf(),
            extension,
        })
    }
}

fn malformed(path: &Path, err: impl std::fmt::Display) -> ImportError {
    ImportError::Malformed {
        path: path.to_path_buf(),
        message: err.to_string(),
    }
}

fn parse_gltf(path: &Path) -> Result<gltf::Gltf, ImportError> {
    let data = std::fs::read(path).map_err(|e| malformed(path, e))?;
    gltf::Gltf::from_slice(&data).map_err(|e| malformed(path, e))
}

/// External files referenced by buffer and image URIs. Embedded `data:`
/// URIs and GLB binary chunks are not files and are skipped.
fn gltf_companions(path: &Path, gltf: &gltf::Gltf) -> Vec<PathBuf> {
    let dir = path.parent().unwrap_or_else(|| Path::new(""));
    let buffer_uris = gltf.buffers().filter_map(|buffer| match buffer.source() {
        gltf::buffer::Source::Uri(uri) => Some(uri),
        gltf::buffer::Source::Bin => None,
    });
    let image_uris = gltf.images().filter_map(|image| match image.source() {
        gltf::image::Source::Uri { uri, .. } => Some(uri),
        gltf::image::Source::View { .. } => None,
    });

    buffer_uris
        .chain(image_uris)
        .filter(|uri| !uri.starts_with("data:"))
        .map(|uri| dir.join(decode_uri_path(uri)))
        .collect()
}

/// Decodes `%XX` escapes in a relative URI.
fn decode_uri_path(uri: &str) -> String {
    let bytes = uri.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            let hex = std::str::from_utf8(&bytes[i + 1..i + 3]).unwrap_or("");
            if let Ok(byte) = u8::from_str_radix(hex, 16) {
                out.push(byte);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn widen(v: [f32; 3]) -> [f64; 3] {
    [v[0] as f64, v[1] as f64, v[2] as f64]
}

#[derive(Debug, Default)]
struct ObjScan {
    vertices: usize,
    objects: usize,
    bounds: Option<ObjectBounds>,
    material_libs: Vec<String>,
}

fn scan_obj(text: &str) -> ObjScan {
    let mut scan = ObjScan::default();
    for line in text.lines() {
        let mut parts = line.split_whitespace();
        match parts.next() {
            Some("v") => {
                let coords: Vec<f64> = parts.take(3).filter_map(|p| p.parse().ok()).collect();
                if let [x, y, z] = coords[..] {
                    scan.vertices += 1;
                    match scan.bounds.as_mut() {
                        Some(b) => b.include([x, y, z]),
                        None => scan.bounds = Some(ObjectBounds::new([x, y, z], [x, y, z])),
                    }
                }
            }
            Some("o") => scan.objects += 1,
            Some("mtllib") => scan.material_libs.extend(parts.map(str::to_string)),
            _ => {}
        }
    }
    scan
}
