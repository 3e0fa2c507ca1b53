//! Normalized diagnostic records
//!
//! A [`DiagnosticRecord`] is one finding about analyzed source, whether the
//! analysis engine reported it or it was synthesized from an internal
//! failure (see [`crate::crash`]). Records are immutable once built.

use serde::Deserialize;
use serde::Serialize;
use std::path::Path;
use std::path::PathBuf;

/// Diagnostic severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    Error,
    Warning,
    Note,
    Other,
}

impl Severity {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "ERROR",
            Self::Warning => "WARNING",
            Self::Note => "NOTE",
            Self::Other => "OTHER",
        }
    }

    pub const fn is_error(&self) -> bool {
        matches!(self, Self::Error)
    }

    /// Parse the stored kind name; unknown names map to `Other`
    pub fn from_name(name: &str) -> Self {
        match name {
            "ERROR" => Self::Error,
            "WARNING" | "MANDATORY_WARNING" => Self::Warning,
            "NOTE" => Self::Note,
            _ => Self::Other,
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a diagnostic points
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiagnosticSource {
    /// A real file on disk
    File(PathBuf),
    /// A non-file-backed identity, e.g. the file name of a crash frame
    Synthetic(String),
}

impl DiagnosticSource {
    /// Filesystem path, only for file-backed sources
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::File(path) => Some(path),
            Self::Synthetic(_) => None,
        }
    }
}

impl std::fmt::Display for DiagnosticSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Synthetic(name) => f.write_str(name),
        }
    }
}

/// Diagnostic as reported by the analysis engine
pub trait NativeDiagnostic {
    fn severity(&self) -> Severity;

    /// Backing file, `None` for sources that are not files
    fn source_path(&self) -> Option<&Path>;

    /// 1-based line; zero or negative when unknown
    fn line(&self) -> i64;

    /// 1-based column; zero or negative when unknown
    fn column(&self) -> i64;

    fn code(&self) -> Option<&str>;

    fn message(&self) -> Option<&str>;
}

/// One analysis finding
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DiagnosticRecord {
    severity: Severity,
    source: Option<DiagnosticSource>,
    line: u32,
    column: u32,
    code: Option<String>,
    message: String,
}

impl DiagnosticRecord {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            source: None,
            line: 0,
            column: 0,
            code: None,
            message: message.into(),
        }
    }

    /// Adapt an engine diagnostic field-for-field
    pub fn from_native<D: NativeDiagnostic + ?Sized>(native: &D) -> Self {
        Self {
            severity: native.severity(),
            source: native
                .source_path()
                .map(|path| DiagnosticSource::File(path.to_path_buf())),
            line: clamp_position(native.line()),
            column: clamp_position(native.column()),
            code: native.code().map(str::to_string),
            message: native.message().unwrap_or_default().to_string(),
        }
    }

    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.source = Some(DiagnosticSource::File(path.into()));
        self
    }

    pub fn with_synthetic_source(mut self, name: impl Into<String>) -> Self {
        self.source = Some(DiagnosticSource::Synthetic(name.into()));
        self
    }

    pub const fn at(mut self, line: u32, column: u32) -> Self {
        self.line = line;
        self.column = column;
        self
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub const fn severity(&self) -> Severity {
        self.severity
    }

    pub const fn source(&self) -> Option<&DiagnosticSource> {
        self.source.as_ref()
    }

    pub fn path(&self) -> Option<&Path> {
        self.source.as_ref().and_then(DiagnosticSource::path)
    }

    /// Line number, 0 when unknown
    pub const fn line(&self) -> u32 {
        self.line
    }

    /// Column number, 0 when unknown
    pub const fn column(&self) -> u32 {
        self.column
    }

    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn is_error(&self) -> bool {
        self.severity.is_error()
    }
}

/// Renders as one line: `path:line:column: SEVERITY: message`.
/// Unknown location parts are left out and line breaks in the message are
/// escaped.
impl std::fmt::Display for DiagnosticRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(source) = &self.source {
            write!(f, "{source}")?;
            if self.line > 0 {
                write!(f, ":{}", self.line)?;
                if self.column > 0 {
                    write!(f, ":{}", self.column)?;
                }
            }
            f.write_str(": ")?;
        }
        write!(f, "{}: ", self.severity)?;
        for (i, part) in self.message.split('\n').enumerate() {
            if i > 0 {
                f.write_str("\\n")?;
            }
            f.write_str(part.strip_suffix('\r').unwrap_or(part))?;
        }
        Ok(())
    }
}

fn clamp_position(value: i64) -> u32 {
    u32::try_from(value.max(0)).unwrap_or(u32::MAX)
}
