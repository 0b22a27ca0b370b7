//! Types for error handling go here.
use std::io::Error as IOError;
use std::path::PathBuf;

quick_error! {
    /// Error type for all error kinds in this crate.
    #[derive(Debug)]
    pub enum NiftiError {
        /// The path does not name a `.nii`, `.hdr` or `.img` file.
        UnrecognizedExtension(path: PathBuf) {
            display("Not a NIfTI or ANALYZE file name: {}", path.display())
        }
        /// A file required to load the volume does not exist.
        MissingFile(path: PathBuf) {
            display("Required file not found: {}", path.display())
        }
        /// The `sizeof_hdr` field is 348 in neither byte order.
        InvalidHeaderSize(sizeof_hdr: i32) {
            display("Invalid header size {} (expected 348)", sizeof_hdr)
        }
        /// The header has neither a NIfTI magic code nor an ANALYZE header size.
        UnrecognizedHeader {
            display("Unrecognized header: neither NIfTI-1 nor ANALYZE 7.5")
        }
        /// `dim[0]` is not within 1 and 7, even after byte swapping.
        InvalidDimensionality(rank: i16) {
            display("Invalid number of dimensions {} (must be within 1 and 7)", rank)
        }
        /// The first dimension is not strictly positive.
        InvalidFirstDimension(extent: i16) {
            display("Invalid first dimension {} (must be positive)", extent)
        }
        /// Attempted to retrieve a code with an unexpected value for the given field.
        InvalidCode(typename: &'static str, code: i16) {
            display("invalid code `{}` for header field {}", code, typename)
        }
        /// The datatype names no voxel encoding that can be decoded.
        UnsupportedDataType(code: i16) {
            display("Unsupported data type {}", code)
        }
        /// The image data ended before a full slice could be read.
        Truncated(slice: usize, needed: usize) {
            display("Image data truncated at slice {} ({} bytes needed)", slice, needed)
        }
        /// The header record is shorter than 348 bytes.
        TruncatedHeader {
            display("Header record is shorter than 348 bytes")
        }
        /// The destination extent cannot hold the source volume at the given origin.
        DestinationTooSmall(destination: [usize; 3], required: [usize; 3]) {
            display("Destination extent {:?} is smaller than required {:?}", destination, required)
        }
        /// The volume was collected before all slices were decoded.
        IncompleteDecode(decoded: usize, total: usize) {
            display("Decoding stopped after {} of {} slices", decoded, total)
        }
        /// I/O Error
        Io(err: IOError) {
            from()
            source(err)
            display("I/O error: {}", err)
        }
    }
}

/// Coarse classification of a [`NiftiError`], for callers that only need to
/// know which stage of the load failed.
///
/// [`NiftiError`]: ./enum.NiftiError.html
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A required file was missing or the path could not be interpreted.
    PathResolution,
    /// Reading or seeking failed.
    Io,
    /// The header is malformed beyond repair.
    StructuralInvalid,
    /// The datatype has no known voxel layout.
    UnsupportedFormat,
    /// Fewer bytes were available than a record or slice requires.
    Truncated,
    /// The caller asked for something the loaded volume cannot satisfy.
    Usage,
}

impl NiftiError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        use self::NiftiError::*;
        match *self {
            UnrecognizedExtension(_) | MissingFile(_) => ErrorKind::PathResolution,
            InvalidHeaderSize(_)
            | UnrecognizedHeader
            | InvalidDimensionality(_)
            | InvalidFirstDimension(_)
            | InvalidCode(..) => ErrorKind::StructuralInvalid,
            UnsupportedDataType(_) => ErrorKind::UnsupportedFormat,
            Truncated(..) | TruncatedHeader => ErrorKind::Truncated,
            DestinationTooSmall(..) | IncompleteDecode(..) => ErrorKind::Usage,
            Io(_) => ErrorKind::Io,
        }
    }
}

/// Alias type for results originating from this crate.
pub type Result<T> = ::std::result::Result<T, NiftiError>;

#[cfg(test)]
mod tests {
    use super::{ErrorKind, NiftiError};
    use std::io;

    #[test]
    fn kinds() {
        let e: NiftiError = io::Error::new(io::ErrorKind::PermissionDenied, "nope").into();
        assert_eq!(e.kind(), ErrorKind::Io);
        assert_eq!(NiftiError::UnsupportedDataType(9999).kind(), ErrorKind::UnsupportedFormat);
        assert_eq!(NiftiError::Truncated(3, 16).kind(), ErrorKind::Truncated);
        assert_eq!(NiftiError::InvalidFirstDimension(0).kind(), ErrorKind::StructuralInvalid);
        assert_eq!(
            NiftiError::MissingFile("a.img".into()).kind(),
            ErrorKind::PathResolution
        );
    }

    #[test]
    fn messages_are_readable() {
        let e = NiftiError::Truncated(1, 16);
        assert_eq!(e.to_string(), "Image data truncated at slice 1 (16 bytes needed)");
    }
}
