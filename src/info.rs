//! Metadata of a loaded volume: the repaired header plus everything derived
//! from it that the decoder needs.

use crate::extension::ExtensionSequence;
use crate::header::{Header, HeaderType, NiftiHeader};
use crate::typedef::{NiftiType, VoxelLayout};
use crate::volume::Extent;
use byteordered::Endianness;
use std::path::{Path, PathBuf};

/// Where the header and the image bytes of a volume live.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NiiPaths {
    /// Header and image data in one `.nii` file.
    Single(PathBuf),
    /// A `.hdr` header file with its `.img` companion.
    Pair {
        /// The header file.
        header: PathBuf,
        /// The image data file.
        image: PathBuf,
    },
}

impl NiiPaths {
    /// The file holding the header record.
    pub fn header(&self) -> &Path {
        match self {
            NiiPaths::Single(path) => path,
            NiiPaths::Pair { header, .. } => header,
        }
    }

    /// The file holding the image data.
    pub fn image(&self) -> &Path {
        match self {
            NiiPaths::Single(path) => path,
            NiiPaths::Pair { image, .. } => image,
        }
    }

    /// Whether header and image data share one file.
    pub fn is_single_file(&self) -> bool {
        match self {
            NiiPaths::Single(_) => true,
            NiiPaths::Pair { .. } => false,
        }
    }
}

/// Metadata describing a volume on disk, validated and ready for decoding.
///
/// Values are built by [`read_info`] and are immutable afterwards.
///
/// [`read_info`]: ../reader/fn.read_info.html
#[derive(Debug, Clone, PartialEq)]
pub struct NiiInfo {
    pub(crate) header: Header,
    pub(crate) byte_order: Endianness,
    pub(crate) needs_swap: bool,
    pub(crate) datatype: NiftiType,
    pub(crate) extent: Extent,
    pub(crate) paths: NiiPaths,
    pub(crate) img_offset: u64,
    pub(crate) extensions: ExtensionSequence,
}

impl NiiInfo {
    /// The repaired header record, in host byte order.
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// The header as a NIfTI-1 record. ANALYZE headers are reinterpreted,
    /// losing their orientation fields.
    pub fn nifti_header(&self) -> NiftiHeader {
        self.header.to_nifti()
    }

    /// The layout of the header record.
    pub fn header_type(&self) -> HeaderType {
        self.header.header_type()
    }

    /// Detected format version: 0 for ANALYZE 7.5, 1 for NIfTI-1.
    pub fn version(&self) -> u8 {
        match &self.header {
            Header::Analyze75(_) => 0,
            Header::Nifti1(h) => h.version().unwrap_or(1),
        }
    }

    /// The byte order the file was written in.
    pub fn byte_order(&self) -> Endianness {
        self.byte_order
    }

    /// Whether the file's multi-byte values are in the opposite byte order
    /// of this machine.
    pub fn needs_swap(&self) -> bool {
        self.needs_swap
    }

    /// The datatype the image bytes are decoded as. This is the header's
    /// datatype unless a different one was forced.
    pub fn data_type(&self) -> NiftiType {
        self.datatype
    }

    /// The on-disk layout of one voxel.
    pub fn layout(&self) -> VoxelLayout {
        self.datatype.layout()
    }

    /// Number of voxels along x, y and z of the first volume.
    pub fn extent(&self) -> Extent {
        self.extent
    }

    /// The header and image file paths.
    pub fn paths(&self) -> &NiiPaths {
        &self.paths
    }

    /// Byte offset of the first voxel in the image file.
    pub fn img_offset(&self) -> u64 {
        self.img_offset
    }

    /// The extensions found between the header and the voxel data, in
    /// file order.
    pub fn extensions(&self) -> &ExtensionSequence {
        &self.extensions
    }

    /// Number of bytes of image data making up the first volume.
    pub fn volume_bytes(&self) -> u64 {
        let e = self.extent;
        e.nx as u64 * e.ny as u64 * e.nz as u64 * self.layout().bytes_per_voxel as u64
    }
}

#[cfg(test)]
mod tests {
    use super::NiiPaths;
    use std::path::{Path, PathBuf};

    #[test]
    fn paths() {
        let single = NiiPaths::Single(PathBuf::from("a.nii"));
        assert!(single.is_single_file());
        assert_eq!(single.header(), single.image());

        let pair = NiiPaths::Pair {
            header: PathBuf::from("a.hdr"),
            image: PathBuf::from("a.img"),
        };
        assert!(!pair.is_single_file());
        assert_eq!(pair.header(), Path::new("a.hdr"));
        assert_eq!(pair.image(), Path::new("a.img"));
    }
}
