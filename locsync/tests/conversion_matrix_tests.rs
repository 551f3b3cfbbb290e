use locsync::formats::{BilingualCSVFormat, FormatType};
use locsync::traits::Parser;
use locsync::types::{FlatResource, FlatValue};
use locsync::{WriteOptions, convert, read_flat_file, write_flat_file};
use std::path::Path;

const MATRIX: [(FormatType, &str); 6] = [
    (FormatType::Json, "json"),
    (FormatType::FlatJson, "flat.json"),
    (FormatType::Yaml, "yaml"),
    (FormatType::YamlRails(None), "yml"),
    (FormatType::CSV, "csv"),
    (FormatType::AndroidStrings, "xml"),
];

fn seed() -> FlatResource {
    let mut flat = FlatResource::new();
    flat.insert("welcome_message".to_string(), FlatValue::from("Welcome, friend!"));
    flat.insert("item_one".to_string(), FlatValue::from("{{count}} item"));
    flat.insert("item_other".to_string(), FlatValue::from("{{count}} items"));
    flat.insert(
        "title".to_string(),
        FlatValue::with_context("It's here", Some("page header".to_string())),
    );
    flat
}

fn nested_seed() -> FlatResource {
    let mut flat = seed();
    flat.insert("menu.file.open".to_string(), FlatValue::from("Open"));
    flat.insert("steps.0".to_string(), FlatValue::from("First"));
    flat.insert("steps.1".to_string(), FlatValue::from("Second"));
    flat
}

fn write_seed(dir: &Path, format: &FormatType, extension: &str, flat: &FlatResource) -> std::path::PathBuf {
    let path = dir.join(format!("en.{}", extension));
    write_flat_file(flat, &path, format, &WriteOptions::default()).unwrap();
    path
}

#[test]
fn every_format_pair_preserves_flat_keys() {
    let tmp = tempfile::tempdir().unwrap();
    let expected = seed();

    for (source, source_ext) in MATRIX.iter() {
        let input = write_seed(tmp.path(), source, source_ext, &expected);
        for (target, target_ext) in MATRIX.iter() {
            let output = tmp
                .path()
                .join(format!("{}_to_{}", source, target))
                .join(format!("en.{}", target_ext));
            std::fs::create_dir_all(output.parent().unwrap()).unwrap();

            convert(
                input.as_path(),
                source.clone(),
                output.as_path(),
                target.clone(),
                &WriteOptions::default(),
            )
            .unwrap_or_else(|e| panic!("{} -> {} failed: {}", source, target, e));

            let actual = read_flat_file(&output, target).unwrap();
            assert_eq!(actual, expected, "{} -> {}", source, target);
        }
    }
}

#[test]
fn nested_keys_survive_nested_and_flat_formats() {
    let tmp = tempfile::tempdir().unwrap();
    let expected = nested_seed();

    for (format, ext) in [
        (FormatType::Json, "json"),
        (FormatType::FlatJson, "flat.json"),
        (FormatType::Yaml, "yaml"),
        (FormatType::CSV, "csv"),
    ] {
        let path = write_seed(tmp.path(), &format, ext, &expected);
        assert_eq!(read_flat_file(&path, &format).unwrap(), expected, "{}", format);
    }
}

#[test]
fn nested_json_output_shape() {
    let tmp = tempfile::tempdir().unwrap();
    let path = write_seed(tmp.path(), &FormatType::Json, "json", &nested_seed());
    let value: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
    assert_eq!(value["menu"]["file"]["open"], "Open");
    assert_eq!(value["steps"], serde_json::json!(["First", "Second"]));
    assert_eq!(value["title"]["context"]["text"], "page header");
}

#[test]
fn bilingual_sheet_roundtrip_through_file() {
    let tmp = tempfile::tempdir().unwrap();
    let reference = seed();
    let mut target = FlatResource::new();
    target.insert("welcome_message".to_string(), FlatValue::from("Witaj!"));
    target.insert("item_one".to_string(), FlatValue::from("{{count}} element"));
    target.insert("item_few".to_string(), FlatValue::from("{{count}} elementy"));
    target.insert("item_many".to_string(), FlatValue::from("{{count}} elementów"));
    target.insert("item_other".to_string(), FlatValue::from("{{count}} elementu"));

    let sheet = tmp.path().join("en-pl.csv");
    BilingualCSVFormat::export(&reference, &target, "en", "pl")
        .unwrap()
        .write_to(&sheet)
        .unwrap();

    let content = std::fs::read_to_string(&sheet).unwrap();
    assert!(content.starts_with("key,en,pl,context\n"));
    assert!(content.contains("item__#locize.com/combinedSubkey"));
    assert!(!content.contains("item_few,"));

    let back = BilingualCSVFormat::read_from(&sheet).unwrap().import().unwrap();
    assert_eq!(back.reference, reference);
    assert_eq!(back.target, target);
}
