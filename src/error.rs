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
        crate::Error::OutOfBounds
    };
}

/// The generic Error type, which covers every error this library can return.
///
/// Errors only exist at the loading boundary: decoding raw CIL bytes into a
/// [`crate::disassembler::MethodBody`], parsing an embedded `.resources` blob, or
/// reading input from disk. The string-provenance analysis itself never fails with
/// an error; a question it cannot answer yields
/// [`crate::analysis::Resolution::Unresolved`] instead.
///
/// # Error Categories
///
/// ## Parsing Errors
/// - [`Error::Malformed`] - Corrupted or invalid byte structure
/// - [`Error::OutOfBounds`] - Attempted to read beyond the end of the input
/// - [`Error::Empty`] - Empty input provided
///
/// ## Resource Errors
/// - [`Error::TypeError`] - A resource value of an unsupported type was encountered
///
/// ## I/O Errors
/// - [`Error::FileError`] - A resource file could not be read
///
/// # Examples
///
/// ```rust
/// use dotlint::{Error, metadata::resources::parse_dotnet_resource};
///
/// match parse_dotnet_resource(&[0x00, 0x01]) {
///     Ok(_) => println!("parsed"),
///     Err(Error::Malformed { message, .. }) => println!("Malformed blob: {}", message),
///     Err(e) => println!("Other error: {}", e),
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// A method body or resource blob is damaged.
    ///
    /// Carries the location in this crate where the damage was noticed, which is
    /// usually enough to tell which structure was broken.
    #[error("Malformed - {file}:{line}: {message}")]
    Malformed {
        /// What was wrong
        message: String,
        /// Source file that raised the error
        file: &'static str,
        /// Source line that raised the error
        line: u32,
    },

    /// A read ran past the end of the input.
    #[error("Out of Bound read would have occurred!")]
    OutOfBounds,

    /// Provided input was empty.
    #[error("Provided input was empty")]
    Empty,

    /// Reading a resource file failed.
    #[error("{0}")]
    FileError(#[from] std::io::Error),

    /// A value of an unsupported type was encountered.
    ///
    /// Raised by the `.resources` reader for user-defined serialized types, which
    /// this crate does not deserialize.
    #[error("{0}")]
    TypeError(String),
}
