//! Model loading and saving
//!
//! Uses RON (Rusty Object Notation) for human-readable model files.

use std::fs;
use std::path::Path;

use super::Model;
use crate::error::ModelError;

/// Load a model from a RON file
pub fn load_model<P: AsRef<Path>>(path: P) -> Result<Model, ModelError> {
    let contents = fs::read_to_string(path)?;
    load_model_from_str(&contents)
}

/// Save a model to a RON file
pub fn save_model<P: AsRef<Path>>(model: &Model, path: P) -> Result<(), ModelError> {
    let config = ron::ser::PrettyConfig::new()
        .depth_limit(3)
        .indentor("  ".to_string());

    let contents = ron::ser::to_string_pretty(model, config)?;
    fs::write(path, contents)?;
    Ok(())
}

/// Load a model from a RON string (for embedded models or testing).
///
/// Bad indices are logged, not rejected; the renderer skips them.
pub fn load_model_from_str(s: &str) -> Result<Model, ModelError> {
    let model: Model = ron::from_str(s)?;
    if let Err(e) = model.validate() {
        log::warn!("Loaded model has bad indices: {}", e);
    }
    Ok(model)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Edge, Face};
    use crate::rasterizer::Vec3;

    #[test]
    fn test_load_from_str() {
        let src = r#"(
            vertices: [(x: 0.0, y: 0.0, z: 0.0), (x: 1.0, y: 0.0, z: 0.0), (x: 0.0, y: 1.0, z: 0.0)],
            faces: [(a: 0, b: 1, c: 2)],
        )"#;
        let model = load_model_from_str(src).unwrap();
        assert_eq!(model.num_vertices(), 3);
        assert_eq!(model.faces, vec![Face::new(0, 1, 2)]);
        assert!(model.edges.is_empty());
    }

    #[test]
    fn test_load_rejects_garbage() {
        assert!(matches!(load_model_from_str("(vertices: oops)"), Err(ModelError::Parse(_))));
    }

    #[test]
    fn test_save_then_load_file() {
        let model = Model::wireframe(
            vec![Vec3::new(-0.5, 0.25, 2.0), Vec3::new(0.5, -0.25, 1.0)],
            vec![Edge::new(0, 1)],
        );
        let path = std::env::temp_dir().join(format!("grayline-{}-model.ron", std::process::id()));
        save_model(&model, &path).unwrap();
        let loaded = load_model(&path).unwrap();
        assert_eq!(loaded, model);
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_load_missing_file() {
        let path = std::env::temp_dir().join("grayline-definitely-missing.ron");
        assert!(matches!(load_model(path), Err(ModelError::Io(_))));
    }
}
