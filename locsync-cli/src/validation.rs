use std::path::Path;
use std::str::FromStr;

use locsync::FormatType;
use unic_langid::LanguageIdentifier;

/// Validation context for different command types
#[derive(Debug, Default)]
pub struct ValidationContext {
    pub input_files: Vec<String>,
    pub output_file: Option<String>,
    pub language_codes: Vec<String>,
    pub input_format: Option<String>,
    pub output_format: Option<String>,
}

impl ValidationContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_input_file(mut self, file: impl Into<String>) -> Self {
        self.input_files.push(file.into());
        self
    }

    pub fn with_output_file(mut self, file: impl Into<String>) -> Self {
        self.output_file = Some(file.into());
        self
    }

    pub fn with_language_code(mut self, lang: impl Into<String>) -> Self {
        self.language_codes.push(lang.into());
        self
    }

    pub fn with_input_format(mut self, format: Option<String>) -> Self {
        self.input_format = format;
        self
    }

    pub fn with_output_format(mut self, format: Option<String>) -> Self {
        self.output_format = format;
        self
    }
}

/// Validate file path exists and is readable
pub fn validate_file_path(path: &str) -> Result<(), String> {
    let path_obj = Path::new(path);

    if !path_obj.exists() {
        return Err(format!("File does not exist: {}", path));
    }

    if !path_obj.is_file() {
        return Err(format!("Path is not a file: {}", path));
    }

    Ok(())
}

/// Validate output directory exists or can be created
pub fn validate_output_path(path: &str) -> Result<(), String> {
    let path_obj = Path::new(path);

    if let Some(parent) = path_obj.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)
                .map_err(|e| format!("Cannot create output directory: {}", e))?;
        }
    }

    Ok(())
}

/// Validate language code format using unic-langid
pub fn validate_language_code(lang: &str) -> Result<(), String> {
    if lang.is_empty() {
        return Err("Language code cannot be empty".to_string());
    }

    lang.parse::<LanguageIdentifier>().map(|_| ()).map_err(|_| {
        format!(
            "Invalid language code format: {}. Expected valid BCP 47 language identifier",
            lang
        )
    })
}

/// Parse a format name, with the list of supported names on failure.
pub fn validate_format(format: &str) -> Result<FormatType, String> {
    if format.trim().is_empty() {
        return Err("Format cannot be empty".to_string());
    }
    FormatType::from_str(format).map_err(|_| {
        format!(
            "Unsupported format: {}. Supported formats: json, flat-json, yaml, yaml-rails, csv, android",
            format
        )
    })
}

/// Validate a complete validation context
pub fn validate_context(context: &ValidationContext) -> Result<(), String> {
    for (i, input) in context.input_files.iter().enumerate() {
        validate_file_path(input)
            .map_err(|e| format!("Input file {} validation failed: {}", i + 1, e))?;
    }

    if let Some(ref output) = context.output_file {
        validate_output_path(output).map_err(|e| format!("Output validation failed: {}", e))?;
    }

    for lang in &context.language_codes {
        validate_language_code(lang)
            .map_err(|e| format!("Language code validation failed: {}", e))?;
    }

    if let Some(ref format) = context.input_format {
        validate_format(format).map_err(|e| format!("Input format validation failed: {}", e))?;
    }

    if let Some(ref format) = context.output_format {
        validate_format(format).map_err(|e| format!("Output format validation failed: {}", e))?;
    }

    Ok(())
}
