#[cfg(test)]
mod tests {
    use std::fs;
    use std::sync::Arc;

    use tempfile::{tempdir, TempDir};

    use crate::config::AppPaths;
    use crate::css::{CssAssembler, CssContext};
    use crate::error::CssError;
    use crate::template::ManifestStore;

    fn assembler(root: &TempDir) -> CssAssembler {
        let paths = AppPaths::new(root.path());
        fs::create_dir_all(&paths.styles_dir).unwrap();
        fs::create_dir_all(paths.resumes_dir.join("styles")).unwrap();
        CssAssembler::new(paths.clone(), Arc::new(ManifestStore::new(paths)))
    }

    fn write_manifest(root: &TempDir, template: &str, fonts_json: &str) {
        let dir = root.path().join("resumes").join(template);
        fs::create_dir_all(&dir).unwrap();
        fs::write(
            dir.join("manifest.json"),
            format!(
                r#"{{"template":"{template}","version":"1.0","css":{{"shared":"styles/shared.css","template":"resumes/styles/{template}.css"}},"fonts":{fonts_json}}}"#
            ),
        )
        .unwrap();
    }

    #[tokio::test]
    async fn test_layers_concatenate_in_fixed_order() {
        let root = tempdir().unwrap();
        let css = assembler(&root);
        fs::write(root.path().join("styles/shared.css"), "/* base */").unwrap();
        fs::write(root.path().join("styles/fonts.css"), "/* fonts */").unwrap();
        fs::write(root.path().join("styles/icons.css"), "/* icons */").unwrap();
        fs::write(
            root.path().join("resumes/styles/default.css"),
            "/* template */",
        )
        .unwrap();

        let complete = css.get_complete_css(&CssContext::default()).await.unwrap();
        assert_eq!(
            complete,
            "/* base */\n\n/* template */\n\n/* fonts */\n\n/* icons */"
        );
    }

    #[tokio::test]
    async fn test_missing_template_css_is_an_empty_layer() {
        let root = tempdir().unwrap();
        let css = assembler(&root);
        fs::write(root.path().join("styles/shared.css"), "base").unwrap();

        let assembly = css
            .get_css_assembly(&CssContext {
                template: Some("bare".to_string()),
                include_fonts: false,
                include_icons: false,
                ..CssContext::default()
            })
            .await
            .unwrap();

        assert_eq!(assembly.template_css, "");
        assert_eq!(assembly.complete_css, "base");
    }

    #[tokio::test]
    async fn test_second_call_is_served_from_cache() {
        let root = tempdir().unwrap();
        let css = assembler(&root);
        let base = root.path().join("styles/shared.css");
        fs::write(&base, "original").unwrap();

        let ctx = CssContext {
            include_fonts: false,
            include_icons: false,
            ..CssContext::default()
        };
        let first = css.get_complete_css(&ctx).await.unwrap();

        // Mutate the file; a cache hit must not see the change.
        fs::write(&base, "mutated").unwrap();
        let second = css.get_complete_css(&ctx).await.unwrap();
        assert_eq!(first, second);

        css.clear_cache();
        let third = css.get_complete_css(&ctx).await.unwrap();
        assert_eq!(third, "mutated");
    }

    #[tokio::test]
    async fn test_pdf_and_browser_contexts_populate_distinct_entries() {
        let root = tempdir().unwrap();
        let css = assembler(&root);
        fs::write(root.path().join("styles/shared.css"), "base").unwrap();
        fs::write(root.path().join("styles/fonts.css"), "browser-fonts").unwrap();
        write_manifest(&root, "default", "[]");

        let browser = css
            .get_complete_css(&CssContext {
                include_icons: false,
                ..CssContext::default()
            })
            .await
            .unwrap();
        let pdf = css
            .get_complete_css(&CssContext {
                for_pdf: true,
                include_icons: false,
                ..CssContext::default()
            })
            .await
            .unwrap();

        assert!(browser.contains("browser-fonts"));
        assert!(!pdf.contains("browser-fonts"));
        assert_eq!(css.cache_stats().await, 2);
    }

    #[tokio::test]
    async fn test_pdf_context_fails_without_font_manifest() {
        let root = tempdir().unwrap();
        let css = assembler(&root);
        fs::write(root.path().join("styles/shared.css"), "base").unwrap();

        let err = css
            .get_complete_css(&CssContext {
                for_pdf: true,
                ..CssContext::default()
            })
            .await
            .unwrap_err();

        match err {
            CssError::FontConfig(message) => {
                assert!(message.contains("Font configuration not found"));
                assert!(message.contains("default"));
            }
            other => panic!("expected FontConfig, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_pdf_context_fails_on_missing_font_file() {
        let root = tempdir().unwrap();
        let css = assembler(&root);
        write_manifest(
            &root,
            "default",
            r#"[{"name":"Lato","files":[{"weight":400,"style":"normal","file":"lato-400.woff2","format":"woff2"}]}]"#,
        );

        let err = css
            .get_complete_css(&CssContext {
                for_pdf: true,
                ..CssContext::default()
            })
            .await
            .unwrap_err();

        assert!(err.to_string().contains("Font file not found"));
    }

    #[tokio::test]
    async fn test_pdf_font_css_embeds_manifest_fonts() {
        let root = tempdir().unwrap();
        let css = assembler(&root);
        write_manifest(
            &root,
            "default",
            r#"[{"name":"Lato","files":[{"weight":700,"style":"italic","file":"lato-700.woff2","format":"woff2"}]}]"#,
        );
        let fonts_dir = root.path().join("assets/fonts");
        fs::create_dir_all(&fonts_dir).unwrap();
        fs::write(fonts_dir.join("lato-700.woff2"), [0u8, 1, 2, 3]).unwrap();

        let assembly = css
            .get_css_assembly(&CssContext {
                for_pdf: true,
                ..CssContext::default()
            })
            .await
            .unwrap();

        assert!(assembly.font_css.contains("font-family: 'Lato'"));
        assert!(assembly.font_css.contains("data:font/woff2;base64,"));
        assert!(assembly.font_css.contains("font-weight: 700"));
        assert!(assembly.font_css.contains("font-style: italic"));
    }

    #[tokio::test]
    async fn test_concurrent_identical_requests_share_one_load() {
        let root = tempdir().unwrap();
        let css = Arc::new(assembler(&root));
        fs::write(root.path().join("styles/shared.css"), "base").unwrap();

        let ctx = CssContext {
            include_fonts: false,
            include_icons: false,
            ..CssContext::default()
        };
        let (a, b) = tokio::join!(css.get_complete_css(&ctx), css.get_complete_css(&ctx));

        assert_eq!(a.unwrap(), b.unwrap());
        assert_eq!(css.cache_stats().await, 1);
    }
}
