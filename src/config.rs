//! Filesystem layout and environment configuration.
//!
//! All on-disk locations the pipeline touches hang off a single root so tests
//! can point the whole service at a scratch directory.

use std::env;
use std::path::{Path, PathBuf};

/// Resolved locations of every data source the pipeline reads or writes.
#[derive(Debug, Clone)]
pub struct AppPaths {
    pub root: PathBuf,
    pub data_dir: PathBuf,
    pub resumes_dir: PathBuf,
    pub styles_dir: PathBuf,
    pub assets_dir: PathBuf,
    pub components_dir: PathBuf,
    pub output_dir: PathBuf,
}

impl AppPaths {
    /// Layout rooted at `root` (the directory holding `data/`, `resumes/`,
    /// `styles/`, `assets/` and `components/`).
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        AppPaths {
            data_dir: root.join("data"),
            resumes_dir: root.join("resumes"),
            styles_dir: root.join("styles"),
            assets_dir: root.join("assets"),
            components_dir: root.join("components"),
            output_dir: root.join("generated-pdfs"),
            root,
        }
    }

    /// Root taken from `RESUME_DATA_ROOT`, falling back to the working
    /// directory.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        let root = env::var("RESUME_DATA_ROOT")
            .map(PathBuf::from)
            .unwrap_or_else(|_| env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));
        Self::new(root)
    }

    pub fn resume_dir(&self, resume_id: &str) -> PathBuf {
        self.data_dir.join(resume_id)
    }

    pub fn shared_data_dir(&self) -> PathBuf {
        self.data_dir.join("shared")
    }

    pub fn header_file(&self) -> PathBuf {
        self.shared_data_dir().join("header.json")
    }

    pub fn styling_file(&self) -> PathBuf {
        self.shared_data_dir().join("styling.json")
    }

    pub fn descriptor_file(&self, resume_id: &str) -> PathBuf {
        self.resume_dir(resume_id).join("resume.json")
    }

    pub fn base_css_file(&self) -> PathBuf {
        self.styles_dir.join("shared.css")
    }

    pub fn font_css_file(&self) -> PathBuf {
        self.styles_dir.join("fonts.css")
    }

    pub fn icon_css_file(&self) -> PathBuf {
        self.styles_dir.join("icons.css")
    }

    pub fn template_css_file(&self, template: &str) -> PathBuf {
        self.resumes_dir.join("styles").join(format!("{template}.css"))
    }

    pub fn template_layout_file(&self, template: &str) -> PathBuf {
        self.resumes_dir.join(template).join("layout.html")
    }

    pub fn template_legacy_file(&self, template: &str) -> PathBuf {
        self.resumes_dir.join(format!("{template}.html"))
    }

    pub fn template_manifest_file(&self, template: &str) -> PathBuf {
        self.resumes_dir.join(template).join("manifest.json")
    }

    pub fn fonts_dir(&self) -> PathBuf {
        self.assets_dir.join("fonts")
    }

    pub fn icons_dir(&self) -> PathBuf {
        self.assets_dir.join("emoji")
    }

    pub fn navigation_file(&self) -> PathBuf {
        self.components_dir.join("navigation").join("nav.html")
    }

    /// Resolve a photo reference from a resume descriptor. `data:` URIs and
    /// http(s) URLs are not paths and must be handled by the caller.
    pub fn resolve_relative(&self, reference: &str) -> PathBuf {
        let path = Path::new(reference);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }
}

/// Read an env var and parse it, falling back on absence or parse failure.
pub fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Boolean env flag that defaults to `true` unless set to the literal
/// string `false`.
pub fn env_enabled(key: &str) -> bool {
    env::var(key).map(|v| v != "false").unwrap_or(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_hang_off_root() {
        let paths = AppPaths::new("/srv/resumes");
        assert_eq!(
            paths.descriptor_file("eng_mgr"),
            PathBuf::from("/srv/resumes/data/eng_mgr/resume.json")
        );
        assert_eq!(
            paths.template_css_file("default"),
            PathBuf::from("/srv/resumes/resumes/styles/default.css")
        );
        assert_eq!(
            paths.header_file(),
            PathBuf::from("/srv/resumes/data/shared/header.json")
        );
    }

    #[test]
    fn resolve_relative_keeps_absolute_paths() {
        let paths = AppPaths::new("/srv/resumes");
        assert_eq!(
            paths.resolve_relative("/tmp/photo.jpg"),
            PathBuf::from("/tmp/photo.jpg")
        );
        assert_eq!(
            paths.resolve_relative("data/shared/assets/photo.jpg"),
            PathBuf::from("/srv/resumes/data/shared/assets/photo.jpg")
        );
    }
}
