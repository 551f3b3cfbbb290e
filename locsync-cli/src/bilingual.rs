//! `export` and `import`: bilingual CSV sheets for translators.

use std::path::Path;

use locsync::formats::BilingualCSVFormat;
use locsync::traits::Parser;
use locsync::{WriteOptions, read_flat_file, write_flat_file};
use tracing::info;

use crate::keys::resolve_format;
use crate::validation::{
    ValidationContext, validate_context, validate_file_path, validate_language_code,
    validate_output_path,
};

/// Language from the flag, else `fallback`, else the file stem (`de.json` → `de`).
fn resolve_language(flag: Option<&str>, fallback: Option<&str>, path: &str) -> Result<String, String> {
    let lang = match flag.or(fallback) {
        Some(lang) => lang.to_string(),
        None => Path::new(path)
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(|n| n.split('.').next())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| format!("Cannot tell the language of {}; pass it explicitly", path))?
            .to_string(),
    };
    validate_language_code(&lang)?;
    Ok(lang)
}

pub struct ExportArgs<'a> {
    pub reference: &'a str,
    pub target: &'a str,
    pub output: &'a str,
    pub reference_language: Option<&'a str>,
    pub target_language: Option<&'a str>,
}

/// Reads both resources and writes one sheet with combined plural rows.
pub fn run_export_command(args: ExportArgs<'_>, config: &crate::CliConfig) -> Result<(), String> {
    validate_context(
        &ValidationContext::new()
            .with_input_file(args.reference)
            .with_input_file(args.target)
            .with_output_file(args.output),
    )?;

    let reference_language = resolve_language(
        args.reference_language,
        config.reference_language.as_deref(),
        args.reference,
    )?;
    let target_language = resolve_language(
        args.target_language,
        config.target_language.as_deref(),
        args.target,
    )?;

    let reference = read_flat_file(args.reference, &resolve_format(None, args.reference)?)
        .map_err(|e| format!("{}: {}", args.reference, e))?;
    let target = read_flat_file(args.target, &resolve_format(None, args.target)?)
        .map_err(|e| format!("{}: {}", args.target, e))?;

    let sheet = BilingualCSVFormat::export(&reference, &target, reference_language, target_language)
        .map_err(|e| format!("Export failed: {}", e))?;
    sheet
        .write_to(args.output)
        .map_err(|e| format!("{}: {}", args.output, e))?;
    info!(rows = sheet.records.len(), output = args.output, "exported sheet");
    println!(
        "✅ Exported {} rows ({} → {}) to {}",
        sheet.records.len(),
        sheet.reference_language,
        sheet.target_language,
        args.output
    );
    Ok(())
}

/// Splits a sheet back into nested or flat files, expanding combined rows.
pub fn run_import_command(
    input: &str,
    reference_out: Option<&str>,
    target_out: &str,
    options: &WriteOptions,
) -> Result<(), String> {
    validate_file_path(input)?;
    let sheet = BilingualCSVFormat::read_from(input).map_err(|e| format!("{}: {}", input, e))?;
    let pair = sheet.import().map_err(|e| format!("Import failed: {}", e))?;

    let mut outputs = vec![(target_out, &pair.target)];
    if let Some(path) = reference_out {
        outputs.push((path, &pair.reference));
    }
    for (path, flat) in outputs {
        validate_output_path(path)?;
        let format = resolve_format(None, path)?;
        write_flat_file(flat, path, &format, options).map_err(|e| format!("{}: {}", path, e))?;
        println!("✅ Wrote {} keys to {}", flat.len(), path);
    }
    Ok(())
}
