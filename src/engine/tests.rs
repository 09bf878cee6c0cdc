use super::*;
use crate::common::ErrorKind;
use crate::hwp5::fixtures::sample_document;
use proptest::prelude::*;
use std::io::Write;

fn engine() -> Engine {
    Engine::new()
}

fn frontmatter() -> RenderOptions {
    RenderOptions::new().with_frontmatter(true)
}

fn write_temp(bytes: &[u8], suffix: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(bytes).unwrap();
    file.flush().unwrap();
    file
}

fn both_shapes(bytes: &[u8]) -> Vec<Box<dyn ContentAccess>> {
    let cleanup = CleanupOptions::disabled();
    vec![
        Box::new(engine().parse_bytes(bytes, &frontmatter(), &cleanup).unwrap()),
        Box::new(engine().open_bytes(bytes, frontmatter(), cleanup).unwrap()),
    ]
}

#[test]
fn test_released_handle_fails_with_invalid_state() {
    for handle in both_shapes(&sample_document()) {
        assert!(handle.release());
        for err in [
            handle.markdown(None).unwrap_err(),
            handle.text().unwrap_err(),
            handle.json(true).unwrap_err(),
            handle.section_count().unwrap_err(),
            handle.resource_ids().unwrap_err(),
            handle.resource_data("BIN0001.png").unwrap_err(),
        ] {
            assert_eq!(err.kind(), ErrorKind::InvalidState);
        }
    }
}

#[test]
fn test_release_twice_is_harmless() {
    for handle in both_shapes(&sample_document()) {
        assert!(handle.release());
        assert!(!handle.release());
        assert!(!handle.is_open());
        // Dropping the box runs release a third time.
        drop(handle);
    }
}

#[test]
fn test_resource_count_matches_listing() {
    for handle in both_shapes(&sample_document()) {
        let ids = handle.resource_ids().unwrap();
        assert_eq!(handle.resource_count().unwrap(), ids.len());
    }

    #[cfg(feature = "hwpx")]
    for handle in both_shapes(&crate::hwpx::fixtures::sample_package()) {
        let ids = handle.resource_ids().unwrap();
        assert_eq!(handle.resource_count().unwrap(), ids.len());
        assert_eq!(ids.len(), 1);
    }
}

#[test]
fn test_listed_resources_are_retrievable() {
    for handle in both_shapes(&sample_document()) {
        for id in handle.resource_ids().unwrap() {
            let data = handle.resource_data(&id).unwrap();
            assert!(!data.is_empty(), "{} is empty", id);
        }
    }
}

#[test]
fn test_detection() {
    let engine = engine();
    assert_eq!(engine.detect_bytes(&[]), FormatKind::Unknown);
    assert_eq!(engine.detect_bytes(b"Hello, plain text"), FormatKind::Unknown);

    let dir = tempfile::tempdir().unwrap();
    assert_eq!(engine.detect(dir.path().join("nothing.hwp")), FormatKind::Unknown);

    let hwp5 = sample_document();
    assert_eq!(engine.detect_bytes(&hwp5), FormatKind::Hwp5);
    let file = write_temp(&hwp5, ".bin");
    assert_eq!(engine.detect(file.path()), FormatKind::Hwp5);

    #[cfg(feature = "hwpx")]
    {
        let hwpx = crate::hwpx::fixtures::sample_package();
        assert_eq!(engine.detect_bytes(&hwpx), FormatKind::Hwpx);
        let file = write_temp(&hwpx, ".hwpx");
        assert_eq!(engine.detect(file.path()), FormatKind::Hwpx);
    }
}

#[test]
fn test_disabled_cleanup_stays_disabled() {
    assert!(!CleanupOptions::disabled().enabled);
    let native = NativeCleanup::from_options(&CleanupOptions::disabled());
    assert!(!native.to_options().unwrap().enabled);
}

proptest! {
    #[test]
    fn prop_disabled_cleanup_ignores_overrides(mojibake in any::<bool>(), frontmatter in any::<bool>()) {
        let options = CleanupOptions::disabled()
            .with_mojibake_detection(mojibake)
            .with_frontmatter_preserved(frontmatter);
        prop_assert!(!options.enabled);
    }
}

#[test]
fn test_three_section_document_from_file() {
    let file = write_temp(&sample_document(), ".hwp");
    let handle = engine()
        .parse_file(file.path(), &frontmatter(), &CleanupOptions::disabled())
        .unwrap();

    assert!(handle.markdown(None).unwrap().starts_with("---"));
    assert_eq!(handle.section_count().unwrap(), 3);
    assert_eq!(handle.resource_count().unwrap(), 2);
    let ids = handle.resource_ids().unwrap();
    assert_eq!(ids, vec!["BIN0001.png", "BIN0002.jpg"]);
    for id in &ids {
        assert!(!handle.resource_data(id).unwrap().is_empty());
    }
}

#[test]
fn test_frontmatter_survives_cleanup() {
    let handle = engine()
        .open_bytes(&sample_document(), frontmatter(), CleanupOptions::default())
        .unwrap();
    let markdown = handle.markdown(None).unwrap();
    assert!(markdown.starts_with("---\n"));
    assert!(markdown.contains("사업 계획서"));
}

#[test]
fn test_truncated_container_is_parse_error() {
    let full = sample_document();
    let truncated = &full[..1024];
    assert_eq!(engine().detect_bytes(truncated), FormatKind::Hwp5);

    let err = engine()
        .parse_bytes(truncated, &RenderOptions::default(), &CleanupOptions::default())
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ParseError);
    let err = engine()
        .open_bytes(truncated, RenderOptions::default(), CleanupOptions::default())
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ParseError);

    #[cfg(feature = "hwpx")]
    {
        let package = crate::hwpx::fixtures::sample_package();
        let truncated = &package[..package.len() / 2];
        let err = engine()
            .parse_bytes(truncated, &RenderOptions::default(), &CleanupOptions::default())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ParseError);
    }
}

#[test]
fn test_missing_file_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let err = engine()
        .open_file(
            dir.path().join("gone.hwp"),
            RenderOptions::default(),
            CleanupOptions::default(),
        )
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::FileNotFound);
}

#[test]
fn test_parse_options_are_honoured() {
    let engine = Engine::new().with_parse_options(ParseOptions::new().without_resources());
    assert!(!engine.parse_options().extract_resources);
    let handle = engine
        .open_bytes(&sample_document(), RenderOptions::default(), CleanupOptions::disabled())
        .unwrap();
    assert_eq!(handle.resource_count().unwrap(), 0);
    assert_eq!(handle.section_count().unwrap(), 3);
}
