//! Options controlling how documents are read.

/// How a reader reacts to a section it cannot decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorMode {
    /// Fail the whole parse
    #[default]
    Strict,
    /// Skip the section with a warning and keep going
    Lenient,
}

/// Reader configuration.
///
/// # Examples
///
/// ```rust
/// use unhwp::{ErrorMode, ParseOptions};
///
/// let options = ParseOptions::new().lenient().without_resources();
/// assert_eq!(options.error_mode, ErrorMode::Lenient);
/// assert!(!options.extract_resources);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOptions {
    pub error_mode: ErrorMode,
    /// Load binary attachments (images, OLE objects) into the document
    pub extract_resources: bool,
    /// Decode HWP 5.0 sections on the rayon thread pool
    pub parallel: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            error_mode: ErrorMode::Strict,
            extract_resources: true,
            parallel: true,
        }
    }
}

impl ParseOptions {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn with_error_mode(mut self, mode: ErrorMode) -> Self {
        self.error_mode = mode;
        self
    }

    #[inline]
    pub fn lenient(self) -> Self {
        self.with_error_mode(ErrorMode::Lenient)
    }

    #[inline]
    pub fn with_resources(mut self, extract: bool) -> Self {
        self.extract_resources = extract;
        self
    }

    #[inline]
    pub fn without_resources(self) -> Self {
        self.with_resources(false)
    }

    #[inline]
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    #[inline]
    pub fn sequential(self) -> Self {
        self.with_parallel(false)
    }

    #[inline]
    pub fn is_lenient(&self) -> bool {
        self.error_mode == ErrorMode::Lenient
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = ParseOptions::default();
        assert_eq!(options.error_mode, ErrorMode::Strict);
        assert!(options.extract_resources);
        assert!(options.parallel);
        assert!(!options.is_lenient());
    }

    #[test]
    fn test_builder() {
        let options = ParseOptions::new().lenient().sequential();
        assert!(options.is_lenient());
        assert!(!options.parallel);
        assert!(options.extract_resources);
    }
}
