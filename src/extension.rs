//! This module contains definitions for the extension and related types.
//! Extensions are optional data frames sitting between the NIfTI-1 header
//! and the voxel data of a single-file volume. The 4-byte extender frame
//! right after the header tells whether any are present.

use crate::error::{NiftiError, Result};
use byteordered::{ByteOrdered, Endian};
use log::{debug, warn};
use std::io::{ErrorKind as IoErrorKind, Read};

/// Byte offset of the first extension in a single-file volume.
pub const FIRST_EXTENSION_OFFSET: usize = 352;

/// Data type for the extender code.
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy)]
pub struct Extender([u8; 4]);

impl Extender {
    /// Fetch the extender code from the given source, while
    /// being possible to not be available.
    /// Returns `None` if the source reaches EoF prematurely.
    /// Any other I/O error is delegated to a `NiftiError`.
    pub fn from_reader_optional<S: Read>(mut source: S) -> Result<Option<Self>> {
        let mut extension = [0u8; 4];
        match source.read_exact(&mut extension) {
            Ok(()) => Ok(Some(extension.into())),
            Err(ref e) if e.kind() == IoErrorKind::UnexpectedEof => Ok(None),
            Err(e) => Err(NiftiError::from(e)),
        }
    }

    /// Whether extensions follow. Only a first byte of exactly 1 counts.
    pub fn has_extensions(&self) -> bool {
        self.0[0] == 1
    }
}

impl From<[u8; 4]> for Extender {
    fn from(extender: [u8; 4]) -> Self {
        Extender(extender)
    }
}

/// Data type for the raw contents of an extension.
/// Users of this type have to reinterpret the data
/// to suit their needs.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Extension {
    esize: i32,
    ecode: i32,
    edata: Vec<u8>,
}

impl Extension {
    /// Create an extension out of its main components.
    ///
    /// # Panics
    /// If `esize` does not correspond to the full size
    /// of the extension in bytes: `8 + edata.len()`
    pub fn new(esize: i32, ecode: i32, edata: Vec<u8>) -> Self {
        if esize as usize != 8 + edata.len() {
            panic!(
                "Illegal extension size: esize is {}, but full size is {}",
                esize,
                8 + edata.len()
            );
        }

        Extension {
            esize,
            ecode,
            edata,
        }
    }

    /// Obtain the claimed extension raw size (`esize` field).
    pub fn size(&self) -> i32 {
        self.esize
    }

    /// Obtain the extension's code (`ecode` field).
    pub fn code(&self) -> i32 {
        self.ecode
    }

    /// Obtain the extension's data (`edata` field).
    pub fn data(&self) -> &[u8] {
        &self.edata
    }

    /// Take the extension's raw data, discarding the rest.
    pub fn into_data(self) -> Vec<u8> {
        self.edata
    }
}

/// Data type for aggregating the extender code and
/// all extensions.
#[derive(Debug, Default, PartialEq, Eq, Clone)]
pub struct ExtensionSequence {
    extender: Extender,
    extensions: Vec<Extension>,
}

impl IntoIterator for ExtensionSequence {
    type Item = Extension;
    type IntoIter = ::std::vec::IntoIter<Self::Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.extensions.into_iter()
    }
}

impl<'a> IntoIterator for &'a ExtensionSequence {
    type Item = &'a Extension;
    type IntoIter = ::std::slice::Iter<'a, Extension>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl ExtensionSequence {
    /// Read a sequence of extensions from a source positioned right after
    /// the extender, up until `len` bytes have been consumed.
    ///
    /// Nothing is read when the extender announces no extensions. Sizes
    /// that are not a multiple of 16 violate the format but are still
    /// honored. A size too small to cover its own 8-byte prefix ends the
    /// scan, since no later offset could be trusted.
    pub fn from_reader<S, E>(
        extender: Extender,
        mut source: ByteOrdered<S, E>,
        len: usize,
    ) -> Result<Self>
    where
        S: Read,
        E: Endian,
    {
        let mut extensions = Vec::new();
        if extender.has_extensions() {
            let mut offset = 0;
            while offset < len {
                let esize = source.read_i32()?;
                let ecode = source.read_i32()?;
                if esize < 8 {
                    warn!(
                        "Extension at offset {} has invalid size {}, ignoring the rest",
                        FIRST_EXTENSION_OFFSET + offset,
                        esize
                    );
                    break;
                }
                if esize % 16 != 0 {
                    warn!(
                        "Extension size {} (code {}) is not a multiple of 16",
                        esize, ecode
                    );
                }
                let data_size = esize as usize - 8;
                let mut edata = Vec::with_capacity(data_size.min(len));
                let got = (&mut source)
                    .take(data_size as u64)
                    .read_to_end(&mut edata)?;
                if got < data_size {
                    return Err(NiftiError::Io(IoErrorKind::UnexpectedEof.into()));
                }
                debug!("Read extension with code {} ({} bytes)", ecode, esize);
                extensions.push(Extension::new(esize, ecode, edata));
                offset += esize as usize;
            }
        }

        Ok(ExtensionSequence {
            extender,
            extensions,
        })
    }

    /// Obtain an iterator to the extensions.
    pub fn iter(&self) -> ::std::slice::Iter<Extension> {
        self.extensions.iter()
    }

    /// Whether the sequence of extensions is empty.
    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty()
    }

    /// Obtain the number of extensions available.
    pub fn len(&self) -> usize {
        self.extensions.len()
    }

    /// Get the extender code from this extension sequence.
    pub fn extender(&self) -> Extender {
        self.extender
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use byteordered::{ByteOrdered, Endianness};
    use std::io::Read;

    fn extension_bytes(e: Endianness, esize: i32, ecode: i32, fill: u8) -> Vec<u8> {
        let mut out = Vec::new();
        {
            let mut w = ByteOrdered::runtime(&mut out, e);
            w.write_i32(esize).unwrap();
            w.write_i32(ecode).unwrap();
        }
        out.extend(std::iter::repeat(fill).take(esize as usize - 8));
        out
    }

    #[test]
    fn no_extensions_reads_nothing() {
        let data = [0xFFu8; 64];
        let mut source = &data[..];
        let seq = ExtensionSequence::from_reader(
            Extender::from([0, 0, 0, 0]),
            ByteOrdered::native(&mut source),
            64,
        )
        .unwrap();
        assert!(seq.is_empty());
        assert_eq!(source.len(), 64);
    }

    #[test]
    fn reads_in_file_order() {
        for &e in &[Endianness::Little, Endianness::Big] {
            let mut data = extension_bytes(e, 32, 6, 0xAB);
            data.extend(extension_bytes(e, 16, 4, 0xCD));
            let seq = ExtensionSequence::from_reader(
                Extender::from([1, 0, 0, 0]),
                ByteOrdered::runtime(&data[..], e),
                48,
            )
            .unwrap();
            assert_eq!(seq.len(), 2);
            let codes: Vec<_> = seq.iter().map(|x| x.code()).collect();
            assert_eq!(codes, vec![6, 4]);
            assert_eq!(seq.iter().next().unwrap().data(), &[0xAB; 24][..]);
            assert_eq!(seq.iter().nth(1).unwrap().data(), &[0xCD; 8][..]);
        }
    }

    #[test]
    fn odd_size_is_consumed_as_declared() {
        let e = Endianness::native();
        let mut data = extension_bytes(e, 20, 2, 1);
        data.extend(extension_bytes(e, 12, 3, 2));
        let seq = ExtensionSequence::from_reader(
            Extender::from([1, 0, 0, 0]),
            ByteOrdered::native(&data[..]),
            32,
        )
        .unwrap();
        assert_eq!(seq.len(), 2);
        assert_eq!(seq.iter().nth(1).unwrap().size(), 12);
    }

    #[test]
    fn truncated_extension_fails() {
        let e = Endianness::native();
        let data = extension_bytes(e, 64, 2, 1);
        let res = ExtensionSequence::from_reader(
            Extender::from([1, 0, 0, 0]),
            ByteOrdered::native(&data[..40]),
            64,
        );
        assert!(res.is_err());
    }

    #[test]
    fn optional_extender() {
        let mut empty: &[u8] = &[];
        assert_eq!(Extender::from_reader_optional(&mut empty).unwrap(), None);
        let mut some: &[u8] = &[1, 0, 0, 0, 9];
        let ext = Extender::from_reader_optional(&mut some).unwrap().unwrap();
        assert!(ext.has_extensions());
        let mut rest = Vec::new();
        some.read_to_end(&mut rest).unwrap();
        assert_eq!(rest, vec![9]);
    }

    #[test]
    fn only_a_flag_of_one_announces_extensions() {
        assert!(Extender::from([1, 0, 0, 0]).has_extensions());
        assert!(!Extender::from([0x20, 0, 0, 0]).has_extensions());
        assert!(!Extender::from([0xFF, 0, 0, 0]).has_extensions());

        let e = Endianness::native();
        let data = extension_bytes(e, 16, 4, 0xCD);
        let mut source = &data[..];
        let seq = ExtensionSequence::from_reader(
            Extender::from([0x20, 0, 0, 0]),
            ByteOrdered::native(&mut source),
            16,
        )
        .unwrap();
        assert!(seq.is_empty());
        assert_eq!(source.len(), 16);
    }
}
