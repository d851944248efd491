//! Typed data model for one resume render.
//!
//! The on-disk JSON uses camelCase keys; the model validates shape once at
//! load time and then flows through templating as plain data.

use serde::{Deserialize, Serialize};

/// Rendering mode for one render call. Stable for the call's lifetime.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderContext {
    pub for_pdf: bool,
    pub template: String,
    pub include_fonts: bool,
    pub include_icons: bool,
}

impl RenderContext {
    pub fn browser(template: impl Into<String>) -> Self {
        RenderContext {
            for_pdf: false,
            template: template.into(),
            include_fonts: true,
            include_icons: true,
        }
    }

    pub fn pdf(template: impl Into<String>) -> Self {
        RenderContext {
            for_pdf: true,
            ..Self::browser(template)
        }
    }
}

/// `data/shared/header.json` - identity shared across all resume variants.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeaderData {
    pub name: String,
    pub title: String,
    pub email: String,
    pub phone: String,
    pub location: String,
    #[serde(default)]
    pub linkedin: Option<String>,
    #[serde(default)]
    pub github: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColorTokens {
    pub primary: String,
    pub accent: String,
    pub text: String,
    pub background: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FontTokens {
    pub primary: String,
    pub secondary: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpacingTokens {
    pub section: String,
    pub item: String,
}

/// `data/shared/styling.json` - design tokens consumed by templates, passed
/// through untouched by the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StylingData {
    pub colors: ColorTokens,
    pub fonts: FontTokens,
    pub spacing: SpacingTokens,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummarySection {
    pub title: String,
    pub markdown_path: String,
    /// Rendered HTML, attached by the loader. Absent when the referenced
    /// Markdown file is missing.
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillCategory {
    pub name: String,
    pub markdown_path: String,
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillsSection {
    pub title: String,
    pub categories: Vec<SkillCategory>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SidebarSection {
    /// Photo reference: relative path, absolute URL or data URI.
    #[serde(default)]
    pub photo: Option<String>,
    #[serde(default)]
    pub summary: Option<SummarySection>,
    #[serde(default)]
    pub skills: Option<SkillsSection>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExperienceJob {
    pub company: String,
    pub title: String,
    pub location: String,
    pub start_date: String,
    #[serde(default)]
    pub end_date: Option<String>,
    pub markdown_path: String,
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperienceSection {
    pub title: String,
    pub jobs: Vec<ExperienceJob>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MainSection {
    pub experience: ExperienceSection,
}

/// `data/<resumeId>/resume.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResumeDescriptor {
    pub sidebar: SidebarSection,
    pub main: MainSection,
}

/// Fully merged data object handed to the template renderer: shared header
/// and styling plus the descriptor with all Markdown references inlined.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResumeData {
    pub header: HeaderData,
    pub styling: StylingData,
    pub sidebar: SidebarSection,
    pub main: MainSection,
}
