//! Options shared by the file-level conversion APIs.

/// Controls how flat resources are turned back into files.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WriteOptions {
    /// Keep keys containing a space, comma or `?` whole instead of splitting
    /// them on dots when rebuilding nested formats.
    pub preserve_literal_dots: bool,
    /// Write keys in ascending order.
    pub sort_keys: bool,
}

impl WriteOptions {
    /// Creates default write options.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_preserve_literal_dots(mut self, preserve_literal_dots: bool) -> Self {
        self.preserve_literal_dots = preserve_literal_dots;
        self
    }

    pub fn with_sort_keys(mut self, sort_keys: bool) -> Self {
        self.sort_keys = sort_keys;
        self
    }
}
