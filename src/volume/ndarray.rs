//! Interfaces specific to integration with `ndarray`.
//!
//! Decoded buffers are laid out with x varying fastest, so the arrays
//! produced here are in standard (row major) order with shape
//! `(nz, ny, nx)`, and are indexed as `array[[z, y, x]]`.

use super::{Volume, VoxelData};
use ndarray::{Array3, ArrayView3};

impl Volume {
    fn shape(&self) -> (usize, usize, usize) {
        let e = self.extent();
        (e.nz, e.ny, e.nx)
    }

    /// View the values of a single-channel numeric volume as a 3D array.
    /// Returns `None` for other voxel types.
    pub fn scalar_array(&self) -> Option<ArrayView3<f64>> {
        match self.data() {
            VoxelData::Scalar { values, .. } => ArrayView3::from_shape(self.shape(), values).ok(),
            _ => None,
        }
    }

    /// View an 8-bit volume as a 3D array. Returns `None` for other voxel
    /// types.
    pub fn gray_array(&self) -> Option<ArrayView3<u8>> {
        match self.data() {
            VoxelData::Gray8(values) => ArrayView3::from_shape(self.shape(), values).ok(),
            _ => None,
        }
    }

    /// Copy any single-channel volume into an owned `f64` array. Returns
    /// `None` for multi-channel voxel types.
    pub fn to_f64_array(&self) -> Option<Array3<f64>> {
        match self.data() {
            VoxelData::Scalar { .. } => self.scalar_array().map(|a| a.to_owned()),
            VoxelData::Gray8(_) => self.gray_array().map(|a| a.mapv(f64::from)),
            _ => None,
        }
    }
}
