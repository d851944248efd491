//! Markdown rendering shared by the data loader and the template helpers.
//!
//! GitHub-flavored, soft line breaks become `<br>`, raw HTML passes through
//! (resume fragments are trusted, authored content).

use comrak::Options;

fn options() -> Options<'static> {
    let mut options = Options::default();
    options.extension.strikethrough = true;
    options.extension.table = true;
    options.extension.autolink = true;
    options.extension.tasklist = true;
    options.render.hardbreaks = true;
    options.render.unsafe_ = true;
    options
}

/// Render a Markdown fragment to HTML. Empty input yields empty output.
pub fn render_markdown(text: &str) -> String {
    if text.trim().is_empty() {
        return String::new();
    }
    comrak::markdown_to_html(text, &options())
}
