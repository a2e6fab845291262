use thiserror::Error;

macro_rules! malformed_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::Malformed {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::Malformed {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

macro_rules! out_of_bounds_error {
    () => {
        crate::Error::OutOfBounds {
            file: file!(),
            line: line!(),
        }
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// Builder misuse (unbalanced `start_table`/`end_table`, a slot written twice, a required field
/// left out) is a programming defect and panics instead of surfacing here. Everything in this
/// enum is recoverable: a buffer that fails verification is simply discarded by the caller.
///
/// # Error Categories
///
/// ## Verification Errors
/// - [`Error::OutOfBounds`] / [`Error::RangeOutOfBounds`] - A read would leave the buffer
/// - [`Error::Unaligned`] - A scalar or offset sits at a misaligned position
/// - [`Error::SignedOffsetOutOfBounds`] - A table points at a vtable outside the buffer
/// - [`Error::NullOffset`] - An offset of zero, which can never be produced by the builder
/// - [`Error::VTableMalformed`] - A vtable declares an impossible size
/// - [`Error::MissingRequiredField`] - A required field is absent
/// - [`Error::InconsistentUnion`] / [`Error::InvalidUnionTag`] - Broken union encoding
/// - [`Error::MissingNulTerminator`] / [`Error::Utf8`] - Broken strings
/// - [`Error::RecursionLimit`], [`Error::TooManyTables`], [`Error::ApparentSizeTooLarge`] -
///   Verification budget exhausted
/// - [`Error::IdentifierMismatch`] - The file identifier does not match
/// - [`Error::InField`] - Wraps any of the above with the name of the field it occurred in
///
/// ## Builder Errors
/// - [`Error::BufferTooLarge`] - The configured maximum buffer size would be exceeded
/// - [`Error::TableTooLarge`] - A table's inline part does not fit a 16-bit vtable entry
///
/// ## Layout and I/O Errors
/// - [`Error::Malformed`] - Inconsistent layout metadata
/// - [`Error::FileError`] / [`Error::Json`] / [`Error::Empty`]
///
/// # Examples
///
/// ```rust
/// use tabwire::{Error, Table, verify_root};
///
/// let data = [0xFF, 0xFF, 0xFF, 0x7F];
/// match verify_root::<Table>(&data) {
///     Ok(()) => println!("valid buffer"),
///     Err(err) => match err.root_cause() {
///         Error::RangeOutOfBounds { position, size } => {
///             println!("bad range {position}+{size}");
///         }
///         other => println!("rejected: {other}"),
///     },
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    // Verification Errors
    /// An out of bound access was attempted.
    ///
    /// Raised by the low-level reading helpers when fewer bytes are available than the
    /// requested type needs.
    #[error("Out of Bound read would have occurred - {file}:{line}")]
    OutOfBounds {
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// A byte range referenced by the buffer does not fit inside it.
    #[error("Range [{position}, {position} + {size}) is outside of the buffer")]
    RangeOutOfBounds {
        /// Start of the offending range
        position: usize,
        /// Length of the offending range
        size: usize,
    },

    /// A value is not stored at a multiple of its alignment.
    #[error("{type_name} at position {position} is not aligned to {alignment}")]
    Unaligned {
        /// Position of the value
        position: usize,
        /// Required alignment
        alignment: usize,
        /// Name of the value type
        type_name: &'static str,
    },

    /// A table's vtable pointer leads outside of the buffer.
    #[error("Signed offset {soffset} at position {position} leaves the buffer")]
    SignedOffsetOutOfBounds {
        /// The signed offset read from the table
        soffset: i32,
        /// Position of the table
        position: usize,
    },

    /// An unsigned offset of zero was found.
    ///
    /// Offsets always point strictly forward, so zero is never a valid encoding.
    #[error("Offset at position {position} is zero")]
    NullOffset {
        /// Position of the offset
        position: usize,
    },

    /// A vtable declares a size that is odd or too small to hold its header.
    #[error("VTable at position {position} declares invalid size {size}")]
    VTableMalformed {
        /// Position of the vtable
        position: usize,
        /// The declared size
        size: usize,
    },

    /// A field marked as required is not present.
    #[error("Missing required field `{field}`")]
    MissingRequiredField {
        /// Name of the field
        field: String,
    },

    /// Only one half of a union (discriminant or value) is present.
    #[error("Union `{field}` has a discriminant without a value or a value without a discriminant")]
    InconsistentUnion {
        /// Name of the union field
        field: String,
    },

    /// A union discriminant is not one of the declared variants.
    #[error("Union `{field}` has undeclared discriminant {tag}")]
    InvalidUnionTag {
        /// Name of the union field
        field: String,
        /// The discriminant found in the buffer
        tag: u8,
    },

    /// A string is not followed by its zero terminator.
    #[error("String at position {position} is missing its zero terminator")]
    MissingNulTerminator {
        /// Position of the string's length prefix
        position: usize,
    },

    /// A string does not contain valid UTF-8.
    #[error("String at position {position} is not valid UTF-8: {source}")]
    Utf8 {
        /// Position of the string's length prefix
        position: usize,
        /// The decoding failure
        source: std::str::Utf8Error,
    },

    /// Recursion limit reached.
    ///
    /// Tables nested deeper than the configured maximum are rejected instead of being
    /// walked, which bounds the verifier's stack usage on hostile input.
    #[error("Reach the maximum recursion level allowed - {0}")]
    RecursionLimit(usize),

    /// More tables were visited than the configured maximum.
    #[error("Visited more than the allowed {0} tables")]
    TooManyTables(usize),

    /// The sum of all verified ranges exceeded the configured maximum.
    #[error("Apparent buffer size exceeds the allowed {0} bytes")]
    ApparentSizeTooLarge(usize),

    /// The buffer does not carry the expected file identifier.
    #[error("Expected file identifier `{expected}`, found `{found}`")]
    IdentifierMismatch {
        /// The identifier the caller asked for
        expected: String,
        /// The bytes found in the buffer, lossily decoded
        found: String,
    },

    /// An error that occurred while verifying a named field.
    #[error("In field `{field}`: {source}")]
    InField {
        /// Name of the field
        field: String,
        /// The underlying failure
        source: Box<Error>,
    },

    // Builder Errors
    /// The buffer would grow beyond the configured maximum size.
    #[error("Buffer of {requested} bytes exceeds the maximum of {max} bytes")]
    BufferTooLarge {
        /// Number of bytes the builder would need
        requested: usize,
        /// The configured limit
        max: usize,
    },

    /// The inline part of a table exceeds what a 16-bit vtable entry can address.
    #[error("Table inline size {0} exceeds the 16-bit vtable limit")]
    TableTooLarge(usize),

    // Layout and I/O Errors
    /// The layout metadata is inconsistent.
    #[error("Malformed - {file}:{line}: {message}")]
    Malformed {
        /// The message to be printed for the Malformed error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// Provided input was empty.
    #[error("Provided input was empty")]
    Empty,

    /// File I/O error.
    #[error("{0}")]
    FileError(#[from] std::io::Error),

    /// Layout metadata could not be decoded from JSON.
    #[error("{0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Wraps `self` with the name of the field it occurred in.
    #[must_use]
    pub fn in_field(self, field: impl Into<String>) -> Self {
        Error::InField {
            field: field.into(),
            source: Box::new(self),
        }
    }

    /// Returns the innermost error, skipping all [`Error::InField`] context layers.
    #[must_use]
    pub fn root_cause(&self) -> &Error {
        let mut current = self;
        while let Error::InField { source, .. } = current {
            current = source;
        }
        current
    }

    /// Returns the field path leading to the failure, outermost first.
    #[must_use]
    pub fn field_path(&self) -> Vec<&str> {
        let mut path = Vec::new();
        let mut current = self;
        while let Error::InField { field, source } = current {
            path.push(field.as_str());
            current = source;
        }
        path
    }
}
