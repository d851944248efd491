//! Loads one resume's data set: shared header and styling, the resume
//! descriptor, and every referenced Markdown fragment, rendered to HTML and
//! inlined. The loader itself does not cache - identity data is re-read per
//! render so edits show up without a restart.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use futures::future::join_all;
use log::warn;
use serde::de::DeserializeOwned;

use crate::asset::AssetStore;
use crate::config::AppPaths;
use crate::data::models::{
    HeaderData, RenderContext, ResumeData, ResumeDescriptor, SidebarSection, StylingData,
};
use crate::error::RenderError;
use crate::markdown::render_markdown;

pub struct DataLoader {
    paths: AppPaths,
    assets: Arc<AssetStore>,
}

impl DataLoader {
    pub fn new(paths: AppPaths, assets: Arc<AssetStore>) -> Self {
        DataLoader { paths, assets }
    }

    /// Load and merge everything a template needs for `resume_id`. The four
    /// data sources load concurrently; assembly waits for all of them.
    pub async fn load_resume_data(
        &self,
        resume_id: &str,
        context: &RenderContext,
    ) -> Result<ResumeData, RenderError> {
        let resume_dir = self.paths.resume_dir(resume_id);
        if !resume_dir.is_dir() {
            return Err(RenderError::NotFound(format!(
                "resume data directory not found: {}",
                resume_dir.display()
            )));
        }

        let (header, styling, descriptor, fragments) = tokio::try_join!(
            self.load_json::<HeaderData>(self.paths.header_file(), "header file"),
            self.load_json::<StylingData>(self.paths.styling_file(), "styling file"),
            self.load_json::<ResumeDescriptor>(self.paths.descriptor_file(resume_id), "resume data file"),
            self.load_all_markdown(resume_id),
        )?;

        let mut data = ResumeData {
            header,
            styling,
            sidebar: descriptor.sidebar,
            main: descriptor.main,
        };
        attach_fragments(&mut data, &fragments);

        if context.for_pdf {
            self.embed_photo(&mut data.sidebar);
        }

        Ok(data)
    }

    async fn load_json<T: DeserializeOwned>(
        &self,
        path: std::path::PathBuf,
        what: &str,
    ) -> Result<T, RenderError> {
        let raw = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(RenderError::NotFound(format!(
                    "{what} not found: {}",
                    path.display()
                )));
            }
            Err(e) => return Err(RenderError::io(format!("reading {}", path.display()), e)),
        };
        serde_json::from_str(&raw).map_err(|e| RenderError::json(path.display().to_string(), e))
    }

    /// All Markdown fragments for a resume identity, rendered to HTML and
    /// keyed `summary` / `skill_<basename>` / `experience_<basename>`.
    /// Missing files and missing directories simply contribute nothing.
    async fn load_all_markdown(
        &self,
        resume_id: &str,
    ) -> Result<HashMap<String, String>, RenderError> {
        let resume_dir = self.paths.resume_dir(resume_id);

        let mut jobs: Vec<(String, std::path::PathBuf)> = Vec::new();
        jobs.push(("summary".to_string(), resume_dir.join("summary").join("summary.md")));
        collect_markdown_files(&resume_dir.join("skills"), "skill", &mut jobs).await;
        collect_markdown_files(&resume_dir.join("experience"), "experience", &mut jobs).await;

        let reads = jobs.into_iter().map(|(key, path)| async move {
            match tokio::fs::read_to_string(&path).await {
                Ok(markdown) => Some((key, render_markdown(&markdown))),
                Err(_) => None,
            }
        });

        Ok(join_all(reads).await.into_iter().flatten().collect())
    }

    /// Replace a filesystem photo reference with a base64 data URI for the
    /// self-contained PDF document. URLs and data URIs pass through; a
    /// failed embed is logged and the reference kept.
    fn embed_photo(&self, sidebar: &mut SidebarSection) {
        let Some(photo) = sidebar.photo.as_deref() else {
            return;
        };
        if photo.starts_with("data:")
            || photo.starts_with("http://")
            || photo.starts_with("https://")
        {
            return;
        }

        let photo_path = self.paths.resolve_relative(photo);
        match self.assets.embed_image_as_base64(&photo_path) {
            Some(data_uri) => sidebar.photo = Some(data_uri),
            None => warn!("failed to convert photo to base64: {}", photo_path.display()),
        }
    }

    /// Resume identities available on disk: directories under `data/`,
    /// excluding the shared-data directory.
    pub async fn available_resume_types(&self) -> Result<Vec<String>, RenderError> {
        let dir = &self.paths.data_dir;
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut entries = tokio::fs::read_dir(dir)
            .await
            .map_err(|e| RenderError::io(format!("reading {}", dir.display()), e))?;

        let mut types = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| RenderError::io(format!("reading {}", dir.display()), e))?
        {
            let path = entry.path();
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if path.is_dir() && name != "shared" {
                types.push(name.to_string());
            }
        }
        types.sort();
        Ok(types)
    }
}

async fn collect_markdown_files(
    dir: &Path,
    prefix: &str,
    jobs: &mut Vec<(String, std::path::PathBuf)>,
) {
    let Ok(mut entries) = tokio::fs::read_dir(dir).await else {
        return;
    };
    while let Ok(Some(entry)) = entries.next_entry().await {
        let path = entry.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if let Some(stem) = name.strip_suffix(".md") {
            jobs.push((format!("{prefix}_{stem}"), path.clone()));
        }
    }
}

/// Attach rendered fragments to the descriptor sections whose
/// `markdownPath` basename matches. Sections without a matching fragment
/// keep `content: None` and are suppressed by `ifHas` at render time.
fn attach_fragments(data: &mut ResumeData, fragments: &HashMap<String, String>) {
    if let Some(summary) = data.sidebar.summary.as_mut() {
        if let Some(html) = fragments.get("summary") {
            summary.content = Some(html.clone());
        }
    }

    if let Some(skills) = data.sidebar.skills.as_mut() {
        for category in skills.categories.iter_mut() {
            let key = format!("skill_{}", basename_stem(&category.markdown_path));
            if let Some(html) = fragments.get(&key) {
                category.content = Some(html.clone());
            }
        }
    }

    for job in data.main.experience.jobs.iter_mut() {
        let key = format!("experience_{}", basename_stem(&job.markdown_path));
        if let Some(html) = fragments.get(&key) {
            job.content = Some(html.clone());
        }
    }
}

fn basename_stem(markdown_path: &str) -> String {
    Path::new(markdown_path)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(markdown_path)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::basename_stem;

    #[test]
    fn basename_stem_strips_directories_and_extension() {
        assert_eq!(basename_stem("skills/languages.md"), "languages");
        assert_eq!(basename_stem("experience/acme_corp.md"), "acme_corp");
        assert_eq!(basename_stem("summary.md"), "summary");
    }
}
