//! This module defines the decoded voxel volume, as well as the
//! slice-by-slice decoder producing it.
//! An integration with `ndarray` exposes single-channel volumes as
//! 3D arrays. In order to use it, the `ndarray_volumes` feature of
//! this crate must be enabled (it is by default).

pub mod decode;
#[cfg(feature = "ndarray_volumes")]
pub mod ndarray;
pub mod shape;

pub use self::decode::{SliceProgress, VolumeDecoder};
pub use self::shape::{centered_origin, Extent};

use crate::typedef::{NiftiType, VoxelLayout};
use num_complex::Complex;
use rgb::{RGB8, RGBA8};

/// How the channels of multi-channel (RGB, RGBA) voxels are arranged
/// within a slice. Headers do not record this reliably, so it is chosen
/// by the caller.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum PlanarConfig {
    /// Channels are stored together per voxel: `RGBRGB...`.
    Interleaved,
    /// Each channel is stored as a plane covering the whole slice:
    /// `RR...GG...BB...`.
    Separated,
}

impl Default for PlanarConfig {
    fn default() -> Self {
        PlanarConfig::Interleaved
    }
}

/// Selects the datatype used to interpret the image bytes.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum FormatOverride {
    /// Use the datatype declared in the header.
    Auto,
    /// Interpret the image bytes as the given datatype instead.
    Force(NiftiType),
}

impl Default for FormatOverride {
    fn default() -> Self {
        FormatOverride::Auto
    }
}

/// Running minimum and maximum over the values of a volume.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ValueRange {
    /// Smallest value seen.
    pub min: f64,
    /// Largest value seen.
    pub max: f64,
}

impl ValueRange {
    /// A range holding a single value.
    pub fn new(value: f64) -> Self {
        ValueRange {
            min: value,
            max: value,
        }
    }

    /// Extend the range to include `value`. NaN is ignored.
    pub fn include(&mut self, value: f64) {
        self.min = self.min.min(value);
        self.max = self.max.max(value);
    }

    /// Extend an optional range to include `value`. NaN never starts a range.
    pub fn extend(range: &mut Option<ValueRange>, value: f64) {
        if let Some(r) = range {
            r.include(value);
        } else if !value.is_nan() {
            *range = Some(ValueRange::new(value));
        }
    }
}

/// Opacity marker of a voxel written from the source volume.
pub const OPAQUE: u8 = 255;

/// The decoded samples of a volume, one per destination voxel.
#[derive(Debug, Clone, PartialEq)]
pub enum VoxelData {
    /// One byte per voxel: UINT8 as is, INT8 shifted by 128.
    Gray8(Vec<u8>),
    /// One numeric channel per voxel, unscaled, with an alpha channel set
    /// to [`OPAQUE`] for every voxel covered by the source volume.
    ///
    /// [`OPAQUE`]: ./constant.OPAQUE.html
    Scalar {
        /// The voxel values.
        values: Vec<f64>,
        /// Opacity markers, 0 for padding voxels.
        alpha: Vec<u8>,
    },
    /// Real and imaginary parts per voxel.
    Complex(Vec<Complex<f64>>),
    /// Red, green and blue per voxel.
    Rgb(Vec<RGB8>),
    /// Red, green, blue and alpha per voxel.
    Rgba(Vec<RGBA8>),
}

impl VoxelData {
    /// Allocate a zero-initialized buffer for `len` voxels of the given type.
    pub fn zeroed(datatype: NiftiType, len: usize) -> Self {
        use crate::typedef::NiftiType::*;
        match datatype {
            Uint8 | Int8 => VoxelData::Gray8(vec![0; len]),
            Rgb24 => VoxelData::Rgb(vec![RGB8::default(); len]),
            Rgba32 => VoxelData::Rgba(vec![RGBA8::default(); len]),
            Complex64 | Complex128 | Complex256 => {
                VoxelData::Complex(vec![Complex::default(); len])
            }
            Int16 | Uint16 | Int32 | Uint32 | Float32 | Int64 | Uint64 | Float64 | Float128 => {
                VoxelData::Scalar {
                    values: vec![0.; len],
                    alpha: vec![0; len],
                }
            }
        }
    }

    /// Number of voxels held.
    pub fn len(&self) -> usize {
        match self {
            VoxelData::Gray8(v) => v.len(),
            VoxelData::Scalar { values, .. } => values.len(),
            VoxelData::Complex(v) => v.len(),
            VoxelData::Rgb(v) => v.len(),
            VoxelData::Rgba(v) => v.len(),
        }
    }

    /// Whether the buffer holds no voxels.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of channels per voxel in this buffer, not counting the
    /// opacity marker of scalar volumes.
    pub fn num_channels(&self) -> usize {
        match self {
            VoxelData::Gray8(_) | VoxelData::Scalar { .. } => 1,
            VoxelData::Complex(_) => 2,
            VoxelData::Rgb(_) => 3,
            VoxelData::Rgba(_) => 4,
        }
    }
}

/// A decoded volume: a dense voxel buffer over a destination extent,
/// holding the source volume at some origin.
#[derive(Debug, Clone, PartialEq)]
pub struct Volume {
    extent: Extent,
    source_extent: Extent,
    origin: [usize; 3],
    datatype: NiftiType,
    layout: VoxelLayout,
    data: VoxelData,
    range: Option<ValueRange>,
}

impl Volume {
    pub(crate) fn from_parts(
        extent: Extent,
        source_extent: Extent,
        origin: [usize; 3],
        datatype: NiftiType,
        data: VoxelData,
        range: Option<ValueRange>,
    ) -> Self {
        Volume {
            extent,
            source_extent,
            origin,
            datatype,
            layout: datatype.layout(),
            data,
            range,
        }
    }

    /// The extent of the voxel buffer.
    pub fn extent(&self) -> Extent {
        self.extent
    }

    /// The extent of the volume stored in the file.
    pub fn source_extent(&self) -> Extent {
        self.source_extent
    }

    /// Where the source volume starts inside the buffer.
    pub fn origin(&self) -> [usize; 3] {
        self.origin
    }

    /// The datatype the image bytes were decoded as.
    pub fn data_type(&self) -> NiftiType {
        self.datatype
    }

    /// The on-disk layout of each source voxel.
    pub fn layout(&self) -> VoxelLayout {
        self.layout
    }

    /// Minimum and maximum of the decoded values, for single-channel
    /// volumes. Padding voxels are not included.
    pub fn range(&self) -> Option<ValueRange> {
        self.range
    }

    /// The voxel buffer.
    pub fn data(&self) -> &VoxelData {
        &self.data
    }

    /// Move the voxel buffer out of the volume.
    pub fn into_data(self) -> VoxelData {
        self.data
    }

    /// Linear index of the voxel at `(x, y, z)` of the buffer.
    pub fn index(&self, x: usize, y: usize, z: usize) -> usize {
        self.extent.index(x, y, z)
    }

    /// Fetch a single-channel value at buffer coordinates `(x, y, z)` as
    /// `f64`. Returns `None` out of bounds or for multi-channel volumes.
    pub fn get_f64(&self, x: usize, y: usize, z: usize) -> Option<f64> {
        if x >= self.extent.nx || y >= self.extent.ny || z >= self.extent.nz {
            return None;
        }
        let i = self.index(x, y, z);
        match &self.data {
            VoxelData::Gray8(v) => Some(f64::from(v[i])),
            VoxelData::Scalar { values, .. } => Some(values[i]),
            _ => None,
        }
    }
}
