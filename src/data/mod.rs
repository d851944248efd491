//! Resume data sources - typed descriptors, shared header/styling and
//! Markdown fragment loading.

pub mod loader;
pub mod models;

pub use loader::DataLoader;
pub use models::{
    ExperienceJob, ExperienceSection, HeaderData, MainSection, RenderContext, ResumeData,
    ResumeDescriptor, SidebarSection, SkillCategory, SkillsSection, StylingData, SummarySection,
};
