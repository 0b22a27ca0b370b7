//! This module contains multiple types defined by the standard.
//! `NiftiType` and its voxel layout drive the volume decoder, while
//! the remaining enums give validated views over header codes.
//! Primitive integer values can be converted to these types and
//! vice-versa.

use num_traits::FromPrimitive;

/// Data type for representing a NIfTI value type in a volume.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy, FromPrimitive)]
#[repr(i16)]
pub enum NiftiType {
    /// unsigned char.
    // NIFTI_TYPE_UINT8           2
    Uint8 = 2,
    /// signed short.
    // NIFTI_TYPE_INT16           4
    Int16 = 4,
    /// signed int.
    // NIFTI_TYPE_INT32           8
    Int32 = 8,
    /// 32 bit float.
    // NIFTI_TYPE_FLOAT32        16
    Float32 = 16,
    /// 64 bit complex = 2 32 bit floats.
    // NIFTI_TYPE_COMPLEX64      32
    Complex64 = 32,
    /// 64 bit float = double.
    // NIFTI_TYPE_FLOAT64        64
    Float64 = 64,
    /// 3 8 bit bytes.
    // NIFTI_TYPE_RGB24         128
    Rgb24 = 128,
    /// signed char.
    // NIFTI_TYPE_INT8          256
    Int8 = 256,
    /// unsigned short.
    // NIFTI_TYPE_UINT16        512
    Uint16 = 512,
    /// unsigned int.
    // NIFTI_TYPE_UINT32        768
    Uint32 = 768,
    /// signed long long.
    // NIFTI_TYPE_INT64        1024
    Int64 = 1024,
    /// unsigned long long.
    // NIFTI_TYPE_UINT64       1280
    Uint64 = 1280,
    /// 128 bit float = long double.
    // NIFTI_TYPE_FLOAT128     1536
    Float128 = 1536,
    /// 128 bit complex = 2 64 bit floats.
    // NIFTI_TYPE_COMPLEX128   1792
    Complex128 = 1792,
    /// 256 bit complex = 2 128 bit floats
    // NIFTI_TYPE_COMPLEX256   2048
    Complex256 = 2048,
    /// 4 8 bit bytes.
    // NIFTI_TYPE_RGBA32       2304
    Rgba32 = 2304,
}

/// Datatype code for an unknown voxel type (`DT_UNKNOWN`).
pub const DT_UNKNOWN: i16 = 0;
/// Datatype code for 1-bit voxels (`DT_BINARY`), which is not decodable.
pub const DT_BINARY: i16 = 1;

impl NiftiType {
    /// Resolve a raw `datatype` header code.
    pub fn from_code(code: i16) -> Option<NiftiType> {
        FromPrimitive::from_i16(code)
    }

    /// Retrieve the size of an element of this data type, in bytes.
    pub fn size_of(self) -> usize {
        self.layout().bytes_per_voxel
    }

    /// Retrieve the on-disk layout of a voxel of this type.
    pub fn layout(self) -> VoxelLayout {
        use self::NiftiType::*;
        let (bytes_per_voxel, bytes_per_channel, num_channels) = match self {
            Int8 | Uint8 => (1, 1, 1),
            Int16 | Uint16 => (2, 2, 1),
            Rgb24 => (3, 1, 3),
            Rgba32 => (4, 1, 4),
            Int32 | Uint32 | Float32 => (4, 4, 1),
            Complex64 => (8, 4, 2),
            Int64 | Uint64 | Float64 => (8, 8, 1),
            Float128 => (16, 16, 1),
            Complex128 => (16, 8, 2),
            Complex256 => (32, 16, 2),
        };
        VoxelLayout {
            bytes_per_voxel,
            bytes_per_channel,
            num_channels,
        }
    }
}

/// How a single voxel is laid out in the image data.
#[derive(Debug, Default, PartialEq, Eq, Hash, Clone, Copy)]
pub struct VoxelLayout {
    /// Total bytes taken by one voxel. Zero means the datatype is not supported.
    pub bytes_per_voxel: usize,
    /// Bytes per channel, which is also the byte swapping granularity.
    pub bytes_per_channel: usize,
    /// Number of channels per voxel.
    pub num_channels: usize,
}

impl VoxelLayout {
    /// Look up the layout for a raw `datatype` code. Unknown codes,
    /// including `DT_UNKNOWN` and `DT_BINARY`, yield an all-zero layout.
    pub fn from_code(code: i16) -> VoxelLayout {
        NiftiType::from_code(code)
            .map(NiftiType::layout)
            .unwrap_or_default()
    }

    /// Whether this layout describes a decodable voxel type.
    pub fn is_supported(&self) -> bool {
        self.bytes_per_voxel > 0
    }
}

/// An enum type which represents a unit type.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy, FromPrimitive)]
pub enum Unit {
    /// NIFTI code for unspecified units.
    Unknown = 0,
    /* Space codes are multiples of 1. */
    /// NIFTI code for meters.
    Meter = 1,
    /// NIFTI code for millimeters.
    Mm = 2,
    /// NIFTI code for micrometers.
    Micron = 3,
    /* Time codes are multiples of 8. */
    /// NIFTI code for seconds.
    Sec = 8,
    /// NIFTI code for milliseconds.
    Msec = 16,
    /// NIFTI code for microseconds.
    Usec = 24,
    /* These units are for spectral data: */
    /// NIFTI code for Hertz.
    Hz = 32,
    /// NIFTI code for ppm.
    Ppm = 40,
    /// NIFTI code for radians per second.
    Rads = 48,
}

/// An enum type for representing a NIFTI XForm.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy, FromPrimitive)]
pub enum XForm {
    /// Arbitrary coordinates (Method 1).
    Unknown = 0,
    /// Scanner-based anatomical coordinates
    ScannerAnat = 1,
    /// Coordinates aligned to another file's,
    /// or to anatomical "truth".
    AlignedAnat = 2,
    /// Coordinates aligned to Talairach-Tournoux
    /// Atlas; (0,0,0)=AC, etc.
    Talairach = 3,
    /// MNI 152 normalized coordinates.
    Mni152 = 4,
}

/// An enum type for representing the slice order.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy, FromPrimitive)]
pub enum SliceOrder {
    /// NIFTI_SLICE_UNKNOWN
    Unknown = 0,
    /// NIFTI_SLICE_SEQ_INC
    SeqInc = 1,
    /// NIFTI_SLICE_SEQ_DEC
    SeqDec = 2,
    /// NIFTI_SLICE_ALT_INC
    AltInc = 3,
    /// NIFTI_SLICE_ALT_DEC
    AltDec = 4,
    /// NIFTI_SLICE_ALT_INC2
    AltInc2 = 5,
    /// NIFTI_SLICE_ALT_DEC2
    AltDec2 = 6,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_table() {
        let int16 = VoxelLayout::from_code(4);
        assert_eq!(
            (int16.bytes_per_voxel, int16.bytes_per_channel, int16.num_channels),
            (2, 2, 1)
        );
        let rgb = VoxelLayout::from_code(128);
        assert_eq!(
            (rgb.bytes_per_voxel, rgb.bytes_per_channel, rgb.num_channels),
            (3, 1, 3)
        );
        assert_eq!(NiftiType::Complex64.layout().num_channels, 2);
        assert_eq!(NiftiType::Complex256.layout().bytes_per_channel, 16);
        assert_eq!(NiftiType::Rgba32.layout().bytes_per_voxel, 4);
    }

    #[test]
    fn unknown_codes_have_no_layout() {
        assert_eq!(VoxelLayout::from_code(9999).bytes_per_voxel, 0);
        assert!(!VoxelLayout::from_code(DT_UNKNOWN).is_supported());
        assert!(!VoxelLayout::from_code(DT_BINARY).is_supported());
        assert!(VoxelLayout::from_code(NiftiType::Float128 as i16).is_supported());
    }

    #[test]
    fn every_type_is_consistent() {
        for &code in &[2, 4, 8, 16, 32, 64, 128, 256, 512, 768, 1024, 1280, 1536, 1792, 2048, 2304] {
            let t = NiftiType::from_code(code).unwrap();
            assert_eq!(t as i16, code);
            let l = t.layout();
            assert_eq!(l.bytes_per_channel * l.num_channels, l.bytes_per_voxel);
        }
    }
}
