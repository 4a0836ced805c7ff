//! Model file path resolution.
//!
//! The app bundles no model; the user drops a GGML `.bin` file into the
//! models directory and names it in `SttConfig::model`.  [`ModelPaths`]
//! resolves that name to an on-disk path.

use std::path::PathBuf;

use crate::config::AppPaths;

/// Resolves GGML model files under the models directory.
///
/// ```rust,no_run
/// use voicenote::config::AppPaths;
/// use voicenote::stt::ModelPaths;
///
/// let paths = ModelPaths::from_app_paths(&AppPaths::new());
/// let model_file = paths.model_path("ggml-tiny-q8_0");
/// ```
#[derive(Debug, Clone)]
pub struct ModelPaths {
    /// Directory that contains (or will contain) GGML `.bin` files.
    pub models_dir: PathBuf,
}

impl ModelPaths {
    /// Build a [`ModelPaths`] from the application's [`AppPaths`].
    pub fn from_app_paths(app_paths: &AppPaths) -> Self {
        Self {
            models_dir: app_paths.models_dir.clone(),
        }
    }

    /// Construct directly from a models directory path (useful in tests).
    pub fn new(models_dir: impl Into<PathBuf>) -> Self {
        Self {
            models_dir: models_dir.into(),
        }
    }

    /// Full path to the GGML file for the given model name / file stem.
    ///
    /// A `.bin` extension is appended unless the name already carries one.
    pub fn model_path(&self, model: &str) -> PathBuf {
        if model.ends_with(".bin") {
            self.models_dir.join(model)
        } else {
            self.models_dir.join(format!("{model}.bin"))
        }
    }

    /// Returns `true` if the model file exists on disk.
    pub fn is_available(&self, model: &str) -> bool {
        self.model_path(model).exists()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_path_appends_bin_extension() {
        let mp = ModelPaths::new("/models");
        let p = mp.model_path("ggml-tiny-q8_0");
        assert!(p.to_str().unwrap().ends_with("ggml-tiny-q8_0.bin"));
    }

    #[test]
    fn model_path_keeps_existing_extension() {
        let mp = ModelPaths::new("/models");
        let p = mp.model_path("ggml-tiny-q8_0.bin");
        assert!(p.to_str().unwrap().ends_with("/ggml-tiny-q8_0.bin"));
        assert!(!p.to_str().unwrap().ends_with(".bin.bin"));
    }

    #[test]
    fn missing_model_is_not_available() {
        let mp = ModelPaths::new("/nonexistent/path");
        assert!(!mp.is_available("ggml-tiny-q8_0"));
    }
}
