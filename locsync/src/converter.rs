//! File-level reading, writing and conversion.
//!
//! Every format is read into a [`FlatResource`] and written from one, so any
//! pair of formats converts through the same path.

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use tracing::debug;

use crate::{
    error::Error,
    formats::{
        AndroidStringsFormat, CSVRecord, FlatJsonFormat, FormatType, JsonFormat, YamlFormat,
        flat_to_records, records_to_flat,
    },
    options::WriteOptions,
    sort::sort_flat_resources,
    traits::Parser,
    types::FlatResource,
};

/// Reads a file in `format` into flat keys.
///
/// For [`FormatType::YamlRails`] the single top-level language key is
/// stripped; when the format names a language, the file must use it.
///
/// # Example
///
/// ```rust,no_run
/// use locsync::{converter::read_flat_file, formats::FormatType};
/// let flat = read_flat_file("locales/en.json", &FormatType::Json)?;
/// println!("{} keys", flat.len());
/// # Ok::<(), locsync::Error>(())
/// ```
pub fn read_flat_file<P: AsRef<Path>>(path: P, format: &FormatType) -> Result<FlatResource, Error> {
    let path = path.as_ref();
    let flat = match format {
        FormatType::Json => JsonFormat::read_from(path)?.to_flat()?,
        FormatType::FlatJson => FlatResource::from(FlatJsonFormat::read_from(path)?),
        FormatType::Yaml => YamlFormat::read_from(path)?.to_flat()?,
        FormatType::YamlRails(expected) => {
            let (language, root) = YamlFormat::read_from(path)?.split_language()?;
            if let Some(expected) = expected {
                if *expected != language {
                    return Err(Error::InvalidResource(format!(
                        "{} holds language `{}`, expected `{}`",
                        path.display(),
                        language,
                        expected
                    )));
                }
            }
            YamlFormat { root }.to_flat()?
        }
        FormatType::CSV => records_to_flat(Vec::<CSVRecord>::read_from(path)?),
        FormatType::AndroidStrings => FlatResource::from(&AndroidStringsFormat::read_from(path)?),
    };
    debug!(path = %path.display(), %format, keys = flat.len(), "read flat resource");
    Ok(flat)
}

/// Writes flat keys to `path` in `format`.
///
/// Nested formats are rebuilt with [`unflatten`](crate::keypath::unflatten).
/// A Rails-style file without an explicit language takes the file stem
/// (`de.yml` → `de`).
pub fn write_flat_file<P: AsRef<Path>>(
    flat: &FlatResource,
    path: P,
    format: &FormatType,
    options: &WriteOptions,
) -> Result<(), Error> {
    let path = path.as_ref();
    let format = match format {
        FormatType::YamlRails(None) => {
            let language = path
                .file_stem()
                .and_then(|s| s.to_str())
                .map(str::to_string)
                .ok_or_else(|| {
                    Error::InvalidResource(format!("cannot tell the language for {}", path.display()))
                })?;
            FormatType::YamlRails(Some(language))
        }
        other => other.clone(),
    };

    let file = File::create(path)?;
    write_flat_to_writer(flat, BufWriter::new(file), &format, options)?;
    debug!(path = %path.display(), %format, keys = flat.len(), "wrote flat resource");
    Ok(())
}

/// Writes flat keys to any writer in `format`.
///
/// [`FormatType::YamlRails`] needs an explicit language here.
pub fn write_flat_to_writer<W: Write>(
    flat: &FlatResource,
    writer: W,
    format: &FormatType,
    options: &WriteOptions,
) -> Result<(), Error> {
    let sorted;
    let flat = if options.sort_keys {
        sorted = sort_flat_resources(flat);
        &sorted
    } else {
        flat
    };

    match format {
        FormatType::Json => JsonFormat::from_flat(flat, options.preserve_literal_dots).to_writer(writer),
        FormatType::FlatJson => FlatJsonFormat::from(flat.clone()).to_writer(writer),
        FormatType::Yaml => YamlFormat::from_flat(flat, options.preserve_literal_dots).to_writer(writer),
        FormatType::YamlRails(Some(language)) => YamlFormat::from_flat(flat, options.preserve_literal_dots)
            .with_language(language)
            .to_writer(writer),
        FormatType::YamlRails(None) => Err(Error::InvalidResource(
            "Rails-style YAML output needs a language".to_string(),
        )),
        FormatType::CSV => flat_to_records(flat).to_writer(writer),
        FormatType::AndroidStrings => AndroidStringsFormat::from(flat).to_writer(writer),
    }
}

/// Convert a localization file from one format to another.
///
/// # Errors
///
/// Returns an `Error` if reading, parsing, converting, or writing fails.
///
/// # Example
///
/// ```rust,no_run
/// use locsync::{converter::convert, formats::FormatType, options::WriteOptions};
/// convert(
///     "en.flat.json",
///     FormatType::FlatJson,
///     "en.json",
///     FormatType::Json,
///     &WriteOptions::new().with_sort_keys(true),
/// )?;
/// # Ok::<(), locsync::Error>(())
/// ```
pub fn convert<P: AsRef<Path>>(
    input: P,
    input_format: FormatType,
    output: P,
    output_format: FormatType,
    options: &WriteOptions,
) -> Result<(), Error> {
    // Propagate language code from input to output format if not specified
    let output_format = match (input_format.language(), output_format.language()) {
        (Some(lang), None) => output_format.with_language(Some(lang.clone())),
        _ => output_format,
    };

    let flat = read_flat_file(&input, &input_format)?;
    write_flat_file(&flat, &output, &output_format, options)
}

/// Convert a localization file, inferring both formats from the file names.
///
/// ```rust,no_run
/// use locsync::{converter::convert_auto, options::WriteOptions};
/// convert_auto("strings.xml", "en.json", &WriteOptions::default())?;
/// # Ok::<(), locsync::Error>(())
/// ```
pub fn convert_auto<P: AsRef<Path>>(input: P, output: P, options: &WriteOptions) -> Result<(), Error> {
    let input_format = infer_format_from_extension(&input).ok_or_else(|| {
        Error::UnknownFormat(format!(
            "Cannot infer input format from extension: {:?}",
            input.as_ref().extension()
        ))
    })?;
    let output_format = infer_format_from_extension(&output).ok_or_else(|| {
        Error::UnknownFormat(format!(
            "Cannot infer output format from extension: {:?}",
            output.as_ref().extension()
        ))
    })?;
    convert(input, input_format, output, output_format, options)
}

/// Infers a [`FormatType`] from a file path's extension.
///
/// `*.flat.json` is flat JSON; any other `*.json` is nested.
///
/// # Example
/// ```rust
/// use locsync::formats::FormatType;
/// use locsync::converter::infer_format_from_extension;
///
/// assert_eq!(infer_format_from_extension("en.json"), Some(FormatType::Json));
/// assert_eq!(infer_format_from_extension("en.flat.json"), Some(FormatType::FlatJson));
/// assert_eq!(infer_format_from_extension("de.yml"), Some(FormatType::Yaml));
/// assert_eq!(infer_format_from_extension("values/strings.xml"), Some(FormatType::AndroidStrings));
/// assert_eq!(infer_format_from_extension("unknown.xyz"), None);
/// ```
pub fn infer_format_from_extension<P: AsRef<Path>>(path: P) -> Option<FormatType> {
    let path = path.as_ref();
    let extension = path.extension()?.to_str()?.to_lowercase();

    match extension.as_str() {
        "json" => {
            let is_flat = path
                .file_stem()
                .and_then(|s| s.to_str())
                .is_some_and(|stem| stem.to_lowercase().ends_with(".flat"));
            Some(if is_flat { FormatType::FlatJson } else { FormatType::Json })
        }
        "yaml" | "yml" => Some(FormatType::Yaml),
        "csv" => Some(FormatType::CSV),
        "xml" => Some(FormatType::AndroidStrings),
        _ => None,
    }
}
