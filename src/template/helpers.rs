//! Handlebars helpers the resume templates depend on.
//!
//! Helpers that need a service (the icon helper's asset store) receive it
//! explicitly at registration time instead of reaching for ambient state.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate};
use handlebars::{
    handlebars_helper, Context, Handlebars, Helper, HelperDef, HelperResult, Output,
    RenderContext, RenderErrorReason, Renderable,
};
use serde_json::Value;

use crate::asset::AssetStore;
use crate::markdown::render_markdown;

/// Truthiness used by `ifHas`: non-empty array, non-blank string, or any
/// other non-null value.
fn has_content(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Array(items) => !items.is_empty(),
        Value::String(s) => !s.trim().is_empty(),
        _ => true,
    }
}

/// `"Jan 2023"`-style month/year for RFC 3339, `YYYY-MM-DD` or `YYYY-MM`
/// input. Empty input yields empty output; unparseable input passes through.
fn format_month_year(raw: &str) -> String {
    let raw = raw.trim();
    if raw.is_empty() {
        return String::new();
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.format("%b %Y").to_string();
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.format("%b %Y").to_string();
    }
    if let Ok(date) = NaiveDate::parse_from_str(&format!("{raw}-01"), "%Y-%m-%d") {
        return date.format("%b %Y").to_string();
    }
    raw.to_string()
}

/// `{{markdown content}}` - renders Markdown to HTML, inserted unescaped.
pub struct MarkdownHelper;

impl HelperDef for MarkdownHelper {
    fn call<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'rc>,
        _: &'reg Handlebars<'reg>,
        _: &'rc Context,
        _: &mut RenderContext<'reg, 'rc>,
        out: &mut dyn Output,
    ) -> HelperResult {
        let text = h.param(0).and_then(|p| p.value().as_str()).unwrap_or("");
        out.write(&render_markdown(text))?;
        Ok(())
    }
}

/// `{{safe html}}` - passes already-rendered HTML through unescaped.
pub struct SafeHelper;

impl HelperDef for SafeHelper {
    fn call<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'rc>,
        _: &'reg Handlebars<'reg>,
        _: &'rc Context,
        _: &mut RenderContext<'reg, 'rc>,
        out: &mut dyn Output,
    ) -> HelperResult {
        let html = h.param(0).and_then(|p| p.value().as_str()).unwrap_or("");
        out.write(html)?;
        Ok(())
    }
}

/// `{{icon "email"}}` - inline HTML for a semantic icon, resolved through
/// the asset store's synchronous cache.
pub struct IconHelper {
    pub assets: Arc<AssetStore>,
}

impl HelperDef for IconHelper {
    fn call<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'rc>,
        _: &'reg Handlebars<'reg>,
        _: &'rc Context,
        _: &mut RenderContext<'reg, 'rc>,
        out: &mut dyn Output,
    ) -> HelperResult {
        let icon_type = h.param(0).and_then(|p| p.value().as_str()).unwrap_or("");
        let size = h.param(1).and_then(|p| p.value().as_str()).unwrap_or("1em");
        out.write(&self.assets.icon_html(icon_type, size))?;
        Ok(())
    }
}

/// `{{#ifHas field}}...{{else}}...{{/ifHas}}` - optional-section suppression.
pub struct IfHasHelper;

impl HelperDef for IfHasHelper {
    fn call<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'rc>,
        r: &'reg Handlebars<'reg>,
        ctx: &'rc Context,
        rc: &mut RenderContext<'reg, 'rc>,
        out: &mut dyn Output,
    ) -> HelperResult {
        let value = h.param(0).map(|p| p.value()).unwrap_or(&Value::Null);
        let branch = if has_content(value) {
            h.template()
        } else {
            h.inverse()
        };
        if let Some(t) = branch {
            t.render(r, ctx, rc, out)?;
        }
        Ok(())
    }
}

/// `{{#ifFirst @index}}...{{/ifFirst}}` - true for the first loop item.
pub struct IfFirstHelper;

impl HelperDef for IfFirstHelper {
    fn call<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'rc>,
        r: &'reg Handlebars<'reg>,
        ctx: &'rc Context,
        rc: &mut RenderContext<'reg, 'rc>,
        out: &mut dyn Output,
    ) -> HelperResult {
        let index = h.param(0).and_then(|p| p.value().as_u64());
        let branch = if index == Some(0) {
            h.template()
        } else {
            h.inverse()
        };
        if let Some(t) = branch {
            t.render(r, ctx, rc, out)?;
        }
        Ok(())
    }
}

/// `{{component "header"}}` - injects a preloaded sub-template of the
/// active template, rendered against the same data. Fails loudly when the
/// component was not registered for this template.
pub struct ComponentHelper;

impl HelperDef for ComponentHelper {
    fn call<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'rc>,
        r: &'reg Handlebars<'reg>,
        ctx: &'rc Context,
        _: &mut RenderContext<'reg, 'rc>,
        out: &mut dyn Output,
    ) -> HelperResult {
        let name = h
            .param(0)
            .and_then(|p| p.value().as_str())
            .ok_or(RenderErrorReason::ParamNotFoundForIndex("component", 0))?;
        let template_name = ctx
            .data()
            .get("template")
            .and_then(Value::as_str)
            .unwrap_or("default");
        let key = format!("{template_name}:{name}");

        if r.get_template(&key).is_none() {
            return Err(RenderErrorReason::Other(format!(
                "component template not found: {key}"
            ))
            .into());
        }

        let rendered = r.render(&key, ctx.data())?;
        out.write(&rendered)?;
        Ok(())
    }
}

handlebars_helper!(FormatDateHelper: |date: str| format_month_year(date));

handlebars_helper!(LengthHelper: |value: Json| match value {
    Value::Array(items) => items.len() as u64,
    _ => 0,
});

handlebars_helper!(StartsWithHelper: |s: str, prefix: str| s.starts_with(prefix));

/// Register every helper on a fresh registry.
pub fn register(hb: &mut Handlebars<'static>, assets: Arc<AssetStore>) {
    hb.register_helper("markdown", Box::new(MarkdownHelper));
    hb.register_helper("safe", Box::new(SafeHelper));
    hb.register_helper("icon", Box::new(IconHelper { assets }));
    hb.register_helper("ifHas", Box::new(IfHasHelper));
    hb.register_helper("ifFirst", Box::new(IfFirstHelper));
    hb.register_helper("component", Box::new(ComponentHelper));
    hb.register_helper("formatDate", Box::new(FormatDateHelper));
    hb.register_helper("length", Box::new(LengthHelper));
    hb.register_helper("startsWith", Box::new(StartsWithHelper));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_month_year_handles_supported_shapes() {
        assert_eq!(format_month_year("2023-01-15"), "Jan 2023");
        assert_eq!(format_month_year("2023-06"), "Jun 2023");
        assert_eq!(format_month_year("2021-11-05T00:00:00Z"), "Nov 2021");
        assert_eq!(format_month_year(""), "");
        assert_eq!(format_month_year("Present"), "Present");
    }

    #[test]
    fn has_content_truthiness() {
        use serde_json::json;
        assert!(!has_content(&Value::Null));
        assert!(!has_content(&json!([])));
        assert!(!has_content(&json!("   ")));
        assert!(has_content(&json!(["x"])));
        assert!(has_content(&json!("text")));
        assert!(has_content(&json!(0)));
        assert!(has_content(&json!(false)));
    }
}
