use std::path::{Path, PathBuf};

use locsync::{FormatType, WriteOptions, infer_format_from_extension, read_flat_file, write_flat_file};
use rayon::prelude::*;
use tracing::{debug, info};

use crate::path_glob::expand_input_globs;
use crate::validation::{ValidationContext, validate_context, validate_format};

#[derive(Debug, Clone, Default)]
pub struct ConvertOptions {
    pub input_format: Option<String>,
    pub output_format: Option<FormatType>,
    pub write: WriteOptions,
}

/// Converts one file, or many files into an output directory.
///
/// Several inputs (or any glob) require `output` to be a directory and an
/// output format; each file keeps its base name with the new extension.
pub fn run_convert_command(inputs: Vec<String>, output: String, options: ConvertOptions) -> Result<(), String> {
    let files = expand_input_globs(&inputs)?;
    let batch = files.len() > 1 || inputs.iter().any(|i| i.contains(['*', '?', '[', '{']));

    let context = ValidationContext::new().with_input_format(options.input_format.clone());
    let context = files
        .iter()
        .fold(context, |ctx, f| ctx.with_input_file(f.to_string_lossy()));
    validate_context(&context)?;

    if !batch {
        let output_format = match &options.output_format {
            Some(format) => format.clone(),
            None => infer_format_from_extension(&output)
                .ok_or_else(|| format!("Cannot infer output format from: {}", output))?,
        };
        crate::validation::validate_output_path(&output)?;
        convert_one(&files[0], Path::new(&output), &output_format, &options)?;
        println!("✅ Successfully converted {} -> {}", files[0].display(), output);
        return Ok(());
    }

    let output_format = options
        .output_format
        .clone()
        .ok_or_else(|| "Converting several files needs --output-format".to_string())?;
    let out_dir = PathBuf::from(&output);
    if out_dir.is_file() {
        return Err(format!("Output must be a directory when converting several files: {}", output));
    }
    std::fs::create_dir_all(&out_dir).map_err(|e| format!("Cannot create output directory: {}", e))?;

    let failures: Vec<String> = files
        .par_iter()
        .filter_map(|input| {
            let target = out_dir.join(format!("{}.{}", base_name(input), output_format.extension()));
            convert_one(input, &target, &output_format, &options)
                .map(|()| info!(input = %input.display(), output = %target.display(), "converted"))
                .err()
        })
        .collect();

    if !failures.is_empty() {
        for failure in &failures {
            eprintln!("❌ {}", failure);
        }
        return Err(format!("{} of {} files failed to convert", failures.len(), files.len()));
    }
    println!("✅ Successfully converted {} files into {}", files.len(), output);
    Ok(())
}

fn convert_one(input: &Path, output: &Path, output_format: &FormatType, options: &ConvertOptions) -> Result<(), String> {
    let input_format = match &options.input_format {
        Some(format) => validate_format(format)?,
        None => infer_format_from_extension(input)
            .ok_or_else(|| format!("Cannot infer input format from: {}", input.display()))?,
    };
    // Carry a Rails language through unless one was asked for
    let output_format = match (&input_format, output_format) {
        (FormatType::YamlRails(lang), FormatType::YamlRails(None)) if lang.is_some() => {
            FormatType::YamlRails(lang.clone())
        }
        (_, format) => format.clone(),
    };
    debug!(input = %input.display(), %input_format, %output_format, "converting");

    let flat = read_flat_file(input, &input_format).map_err(|e| format!("{}: {}", input.display(), e))?;
    write_flat_file(&flat, output, &output_format, &options.write)
        .map_err(|e| format!("{}: {}", output.display(), e))
}

/// File name without its format extension (`en.flat.json` → `en`).
fn base_name(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let lower = name.to_lowercase();
    let cut = [".flat.json", ".json", ".yaml", ".yml", ".csv", ".xml"]
        .iter()
        .find(|ext| lower.ends_with(*ext))
        .map_or(name.len(), |ext| name.len() - ext.len());
    name[..cut].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_name() {
        assert_eq!(base_name(Path::new("locales/en.flat.json")), "en");
        assert_eq!(base_name(Path::new("de.JSON")), "de");
        assert_eq!(base_name(Path::new("values/strings.xml")), "strings");
        assert_eq!(base_name(Path::new("README")), "README");
    }
}
