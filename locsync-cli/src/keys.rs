//! `flatten`, `unflatten` and `sort`: reshaping a single resource.

use std::io::Write;

use locsync::{
    FlatResource, FormatType, WriteOptions, infer_format_from_extension, read_flat_file,
    write_flat_file, write_flat_to_writer,
};

use crate::validation::{ValidationContext, validate_context, validate_format};

/// Format named by `flag`, else inferred from `path`.
pub fn resolve_format(flag: Option<&str>, path: &str) -> Result<FormatType, String> {
    match flag {
        Some(format) => validate_format(format),
        None => infer_format_from_extension(path)
            .ok_or_else(|| format!("Cannot infer format from: {}", path)),
    }
}

fn read_input(input: &str, input_format: Option<&str>) -> Result<FlatResource, String> {
    validate_context(
        &ValidationContext::new()
            .with_input_file(input)
            .with_input_format(input_format.map(str::to_string)),
    )?;
    let format = resolve_format(input_format, input)?;
    read_flat_file(input, &format).map_err(|e| format!("{}: {}", input, e))
}

/// Writes to `output`, or to stdout in `stdout_format` when no output is given.
fn write_output(
    flat: &FlatResource,
    output: Option<&str>,
    output_format: Option<&FormatType>,
    stdout_format: FormatType,
    options: &WriteOptions,
) -> Result<(), String> {
    match output {
        Some(path) => {
            crate::validation::validate_output_path(path)?;
            let format = match output_format {
                Some(format) => format.clone(),
                None => resolve_format(None, path)?,
            };
            write_flat_file(flat, path, &format, options).map_err(|e| format!("{}: {}", path, e))
        }
        None => {
            let format = output_format.cloned().unwrap_or(stdout_format);
            let stdout = std::io::stdout();
            let mut lock = stdout.lock();
            write_flat_to_writer(flat, &mut lock, &format, options).map_err(|e| e.to_string())?;
            lock.flush().map_err(|e| e.to_string())
        }
    }
}

/// Nested file to flat keys; flat JSON unless the output says otherwise.
pub fn run_flatten_command(
    input: &str,
    input_format: Option<&str>,
    output: Option<&str>,
    options: &WriteOptions,
) -> Result<(), String> {
    let flat = read_input(input, input_format)?;
    let output_format = match output {
        Some(path) if infer_format_from_extension(path) == Some(FormatType::Json) => {
            Some(FormatType::FlatJson)
        }
        _ => None,
    };
    write_output(&flat, output, output_format.as_ref(), FormatType::FlatJson, options)
}

/// Flat keys to a nested file; nested JSON unless the output says otherwise.
pub fn run_unflatten_command(
    input: &str,
    input_format: Option<&str>,
    output: Option<&str>,
    output_format: Option<&FormatType>,
    options: &WriteOptions,
) -> Result<(), String> {
    let format = resolve_format(input_format, input)?;
    // `en.json` holding dotted keys is read as flat
    let input_format = match format {
        FormatType::Json => Some("flat-json"),
        _ => input_format,
    };
    let flat = read_input(input, input_format)?;
    write_output(&flat, output, output_format, FormatType::Json, options)
}

/// Rewrites a resource with its keys in ascending order, in its own format.
pub fn run_sort_command(input: &str, input_format: Option<&str>, output: Option<&str>) -> Result<(), String> {
    let format = resolve_format(input_format, input)?;
    let flat = read_input(input, input_format)?;
    let options = WriteOptions::new().with_sort_keys(true);
    write_output(&flat, output, Some(&format), format.clone(), &options)
}
