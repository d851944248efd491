//! Shared fixture builder: a complete resume workspace under a tempdir.

use std::fs;
use std::path::Path;

use tempfile::TempDir;

pub const HEADER_JSON: &str = r#"{
  "name": "Rivka Stein",
  "title": "Staff Platform Engineer",
  "email": "rivka@example.com",
  "phone": "+1 555 0199",
  "location": "Berlin, DE",
  "github": "https://github.com/rstein",
  "website": "https://rivka.dev"
}"#;

pub const STYLING_JSON: &str = r##"{
  "colors": {"primary": "#16324f", "accent": "#2e86ab", "text": "#1b1b1b", "background": "#ffffff"},
  "fonts": {"primary": "Montserrat", "secondary": "Lato"},
  "spacing": {"section": "2.5rem", "item": "1.25rem"}
}"##;

pub const RESUME_JSON: &str = r#"{
  "sidebar": {
    "summary": {"title": "Summary", "markdownPath": "summary/summary.md"},
    "skills": {"title": "Skills", "categories": [
      {"name": "Languages", "markdownPath": "skills/languages.md"},
      {"name": "Cloud", "markdownPath": "skills/cloud.md"}
    ]}
  },
  "main": {
    "experience": {"title": "Experience", "jobs": [
      {"company": "Hyperscale GmbH", "title": "Staff Engineer", "location": "Berlin",
       "startDate": "2022-04-01", "endDate": "2025-12-01",
       "markdownPath": "experience/hyperscale.md"},
      {"company": "Smallco", "title": "Engineer", "location": "Remote",
       "startDate": "2019-01-01", "markdownPath": "experience/smallco.md"}
    ]}
  }
}"#;

pub const LAYOUT_HTML: &str = r#"<div class="resume-content">
  {{component "header"}}
  {{component "sidebar"}}
  {{component "experience"}}
</div>"#;

/// Build a full workspace: shared data, one resume identity, one
/// component-based template with manifest, stylesheets and an icon SVG.
pub fn workspace() -> TempDir {
    let dir = tempfile::tempdir().expect("create fixture tempdir");
    let root = dir.path();

    let shared = root.join("data/shared");
    fs::create_dir_all(&shared).unwrap();
    fs::write(shared.join("header.json"), HEADER_JSON).unwrap();
    fs::write(shared.join("styling.json"), STYLING_JSON).unwrap();

    let resume = root.join("data/staff_platform_engineer");
    fs::create_dir_all(resume.join("summary")).unwrap();
    fs::create_dir_all(resume.join("skills")).unwrap();
    fs::create_dir_all(resume.join("experience")).unwrap();
    fs::write(resume.join("resume.json"), RESUME_JSON).unwrap();
    fs::write(
        resume.join("summary/summary.md"),
        "Platform engineer focused on **reliability**.\nRuns infra at scale.",
    )
    .unwrap();
    fs::write(resume.join("skills/languages.md"), "- Rust\n- TypeScript").unwrap();
    // skills/cloud.md intentionally missing: tolerated as "no content"
    fs::write(
        resume.join("experience/hyperscale.md"),
        "Led the platform group.\n\n- Cut deploy times",
    )
    .unwrap();
    fs::write(resume.join("experience/smallco.md"), "Did everything.").unwrap();

    let template = root.join("resumes/default");
    fs::create_dir_all(&template).unwrap();
    fs::write(template.join("layout.html"), LAYOUT_HTML).unwrap();
    fs::write(
        template.join("header.html"),
        "<header><h1>{{header.name}}</h1><span>{{icon \"email\"}} {{header.email}}</span></header>",
    )
    .unwrap();
    fs::write(
        template.join("sidebar.html"),
        r#"<aside>{{#ifHas sidebar.summary.content}}<section>{{safe sidebar.summary.content}}</section>{{/ifHas}}
{{#each sidebar.skills.categories}}{{#ifHas content}}<div class="skill">{{name}}{{safe content}}</div>{{/ifHas}}{{/each}}</aside>"#,
    )
    .unwrap();
    fs::write(
        template.join("experience.html"),
        r#"<section>{{#each main.experience.jobs}}<article><h3>{{company}}</h3>
<time>{{formatDate startDate}} - {{#ifHas endDate}}{{formatDate endDate}}{{else}}Present{{/ifHas}}</time>
{{safe content}}</article>{{/each}}</section>"#,
    )
    .unwrap();
    write_manifest(root, "[]");

    fs::create_dir_all(root.join("styles")).unwrap();
    fs::create_dir_all(root.join("resumes/styles")).unwrap();
    fs::write(root.join("styles/shared.css"), "/* base */ body{margin:0}").unwrap();
    fs::write(root.join("styles/fonts.css"), "/* browser fonts */").unwrap();
    fs::write(root.join("styles/icons.css"), "/* icons */ img{height:1em}").unwrap();
    fs::write(root.join("resumes/styles/default.css"), "/* default */").unwrap();

    let icons = root.join("assets/emoji");
    fs::create_dir_all(&icons).unwrap();
    fs::write(icons.join("1f4e7.svg"), "<svg><title>email</title></svg>").unwrap();

    dir
}

/// Overwrite the default template's manifest with the given fonts array.
pub fn write_manifest(root: &Path, fonts_json: &str) {
    fs::write(
        root.join("resumes/default/manifest.json"),
        format!(
            r#"{{"template":"default","version":"1.0","css":{{"shared":"styles/shared.css","template":"resumes/styles/default.css"}},"fonts":{fonts_json}}}"#
        ),
    )
    .unwrap();
}
