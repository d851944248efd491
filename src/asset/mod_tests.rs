#[cfg(test)]
mod tests {
    use crate::asset::AssetStore;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_embed_image_returns_data_uri_with_mime() {
        let dir = tempdir().unwrap();
        let image_path = dir.path().join("photo.png");
        fs::write(&image_path, [0x89, 0x50, 0x4e, 0x47]).unwrap();

        let store = AssetStore::new(dir.path().join("emoji"));
        let data_uri = store.embed_image_as_base64(&image_path).unwrap();

        assert!(data_uri.starts_with("data:image/png;base64,"));

        let info = store.cached_asset("image", &image_path).unwrap();
        assert_eq!(info.mime_type, "image/png");
        assert_eq!(info.size, 4);
    }

    #[test]
    fn test_unknown_extension_defaults_to_jpeg() {
        let dir = tempdir().unwrap();
        let image_path = dir.path().join("photo.raw");
        fs::write(&image_path, [1, 2, 3]).unwrap();

        let store = AssetStore::new(dir.path().join("emoji"));
        let data_uri = store.embed_image_as_base64(&image_path).unwrap();

        assert!(data_uri.starts_with("data:image/jpeg;base64,"));
    }

    #[test]
    fn test_missing_image_returns_none() {
        let dir = tempdir().unwrap();
        let store = AssetStore::new(dir.path().join("emoji"));

        assert!(store
            .embed_image_as_base64(&dir.path().join("nope.jpg"))
            .is_none());
    }

    #[test]
    fn test_embed_is_served_from_cache_after_file_removal() {
        let dir = tempdir().unwrap();
        let image_path = dir.path().join("photo.jpg");
        fs::write(&image_path, [1, 2, 3]).unwrap();

        let store = AssetStore::new(dir.path().join("emoji"));
        let first = store.embed_image_as_base64(&image_path).unwrap();

        // A cache hit must not touch the disk again.
        fs::remove_file(&image_path).unwrap();
        let second = store.embed_image_as_base64(&image_path).unwrap();
        assert_eq!(first, second);

        store.clear_cache();
        assert!(store.embed_image_as_base64(&image_path).is_none());
    }

    #[test]
    fn test_icon_html_embeds_svg_when_present() {
        let dir = tempdir().unwrap();
        let icons_dir = dir.path().join("emoji");
        fs::create_dir_all(&icons_dir).unwrap();
        fs::write(icons_dir.join("1f4e7.svg"), "<svg></svg>").unwrap();

        let store = AssetStore::new(icons_dir);
        let html = store.icon_html("email", "1em");

        assert!(html.starts_with("<img src=\"data:image/svg+xml;base64,"));
        assert!(html.contains("alt=\"email\""));
        assert!(html.contains("width: 1em"));
    }

    #[test]
    fn test_icon_html_falls_back_to_glyph() {
        let dir = tempdir().unwrap();
        let store = AssetStore::new(dir.path().join("emoji"));

        // SVG missing on disk: known type falls back to its glyph.
        assert_eq!(store.icon_html("email", "1em"), "\u{2709}");
        // Unknown type falls back to the generic bullet.
        assert_eq!(store.icon_html("carrier-pigeon", "1em"), "\u{2022}");
    }

    #[test]
    fn test_cache_stats_track_entries_and_bytes() {
        let dir = tempdir().unwrap();
        let a = dir.path().join("a.png");
        let b = dir.path().join("b.svg");
        fs::write(&a, [0; 10]).unwrap();
        fs::write(&b, "<svg/>").unwrap();

        let store = AssetStore::new(dir.path().join("emoji"));
        store.embed_image_as_base64(&a).unwrap();
        store.embed_svg_as_base64(&b).unwrap();

        let (entries, bytes) = store.cache_stats();
        assert_eq!(entries, 2);
        assert_eq!(bytes, 16);
    }
}
