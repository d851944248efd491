//! Builder for the outer HTML document shell.
//!
//! Sections render in insertion order; the `<style>` block only appears
//! when inline CSS was added.

#[derive(Debug, Default)]
pub struct HtmlDocumentBuilder {
    title: Option<String>,
    head: Vec<String>,
    style: Vec<String>,
    body: Vec<String>,
}

impl HtmlDocumentBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Add a raw element to `<head>` (link, meta, script).
    pub fn head(mut self, element: impl Into<String>) -> Self {
        self.head.push(element.into());
        self
    }

    pub fn stylesheet_link(self, href: impl AsRef<str>) -> Self {
        let href = href.as_ref();
        self.head(format!("<link rel=\"stylesheet\" href=\"{href}\">"))
    }

    /// Add CSS to the inline `<style>` block.
    pub fn style(mut self, css: impl Into<String>) -> Self {
        self.style.push(css.into());
        self
    }

    /// Add a body section. Empty sections are skipped.
    pub fn body(mut self, section: impl Into<String>) -> Self {
        let section = section.into();
        if !section.is_empty() {
            self.body.push(section);
        }
        self
    }

    pub fn build(self) -> String {
        let title = self.title.unwrap_or_else(|| "Resume".to_string());
        let head_content = self.head.join("\n  ");
        let style_content = self.style.join("\n  ");
        let body_content = self.body.join("\n  ");

        let style_block = if style_content.is_empty() {
            String::new()
        } else {
            format!("\n  <style>\n    {style_content}\n  </style>")
        };
        let head_block = if head_content.is_empty() {
            String::new()
        } else {
            format!("\n  {head_content}")
        };

        format!(
            "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n  <meta charset=\"UTF-8\">\n  <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n  <title>{title}</title>{head_block}{style_block}\n</head>\n<body>\n  {body_content}\n</body>\n</html>"
        )
    }
}
