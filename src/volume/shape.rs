//! Volume extents and destination placement.
//!
//! Decoded volumes are dense 3D arrays indexed by `z * ny * nx + y * nx + x`.
//! The destination of a decode may be larger than the source volume (for
//! instance, padded to power-of-two sides), in which case the source is
//! written at an origin offset inside the destination.

/// The extent of a 3D voxel grid.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Extent {
    /// Number of voxels along x.
    pub nx: usize,
    /// Number of voxels along y.
    pub ny: usize,
    /// Number of voxels along z.
    pub nz: usize,
}

impl Extent {
    /// Create a new extent.
    pub fn new(nx: usize, ny: usize, nz: usize) -> Self {
        Extent { nx, ny, nz }
    }

    /// Obtain the spatial extent described by a header `dim` field.
    /// Axes beyond the rank, or non-positive, count as 1.
    ///
    /// # Example
    ///
    /// ```
    /// # use niivolume::Extent;
    /// let e = Extent::from_dim(&[2, 64, 32, 0, 0, 0, 0, 0]);
    /// assert_eq!(e, Extent::new(64, 32, 1));
    /// ```
    pub fn from_dim(dim: &[i16; 8]) -> Self {
        let rank = dim[0].max(0) as usize;
        let axis = |i: usize| {
            if i <= rank && dim[i] > 0 {
                dim[i] as usize
            } else {
                1
            }
        };
        Extent::new(axis(1), axis(2), axis(3))
    }

    /// Number of voxels in one z-slice.
    pub fn voxels_per_slice(&self) -> usize {
        self.nx * self.ny
    }

    /// Total number of voxels.
    pub fn len(&self) -> usize {
        self.nx * self.ny * self.nz
    }

    /// Whether the grid holds no voxels.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Linear index of the voxel at `(x, y, z)`.
    pub fn index(&self, x: usize, y: usize, z: usize) -> usize {
        z * self.ny * self.nx + y * self.nx + x
    }

    /// The smallest extent with power-of-two sides holding this one.
    pub fn next_power_of_two(&self) -> Self {
        Extent::new(
            self.nx.next_power_of_two(),
            self.ny.next_power_of_two(),
            self.nz.next_power_of_two(),
        )
    }

    /// The extent needed to hold `source` placed at `origin`, or `None` if
    /// any side overflows.
    pub fn required_for(source: Extent, origin: [usize; 3]) -> Option<Self> {
        Some(Extent::new(
            source.nx.checked_add(origin[0])?,
            source.ny.checked_add(origin[1])?,
            source.nz.checked_add(origin[2])?,
        ))
    }

    /// Whether `source` placed at `origin` fits entirely in this extent.
    pub fn holds(&self, source: Extent, origin: [usize; 3]) -> bool {
        match Extent::required_for(source, origin) {
            Some(required) => {
                required.nx <= self.nx && required.ny <= self.ny && required.nz <= self.nz
            }
            None => false,
        }
    }

    /// The extent as an `[nx, ny, nz]` array.
    pub fn to_array(&self) -> [usize; 3] {
        [self.nx, self.ny, self.nz]
    }
}

/// The origin that centers `source` inside `destination`. Axes where the
/// destination is not larger get an origin of 0.
///
/// # Example
///
/// ```
/// # use niivolume::{Extent, centered_origin};
/// let src = Extent::new(91, 109, 91);
/// assert_eq!(centered_origin(src, src.next_power_of_two()), [18, 9, 18]);
/// ```
pub fn centered_origin(source: Extent, destination: Extent) -> [usize; 3] {
    [
        destination.nx.saturating_sub(source.nx) / 2,
        destination.ny.saturating_sub(source.ny) / 2,
        destination.nz.saturating_sub(source.nz) / 2,
    ]
}

#[cfg(test)]
mod tests {
    use super::{centered_origin, Extent};

    #[test]
    fn extent_from_dim() {
        assert_eq!(
            Extent::from_dim(&[3, 64, 64, 10, 0, 0, 0, 0]),
            Extent::new(64, 64, 10)
        );
        assert_eq!(
            Extent::from_dim(&[4, 4, 4, 2, 5, 0, 0, 0]),
            Extent::new(4, 4, 2)
        );
        assert_eq!(
            Extent::from_dim(&[1, 12, 7, 7, 0, 0, 0, 0]),
            Extent::new(12, 1, 1)
        );
    }

    #[test]
    fn linear_index() {
        let e = Extent::new(16, 16, 3);
        assert_eq!(e.index(0, 0, 0), 0);
        assert_eq!(e.index(1, 0, 0), 1);
        assert_eq!(e.index(0, 1, 0), 16);
        assert_eq!(e.index(0, 0, 1), 256);
        assert_eq!(e.index(1, 1, 1), 273);
        assert_eq!(e.index(15, 15, 2), e.len() - 1);
    }

    #[test]
    fn padding_and_centering() {
        let src = Extent::new(5, 8, 3);
        let dst = src.next_power_of_two();
        assert_eq!(dst, Extent::new(8, 8, 4));
        let origin = centered_origin(src, dst);
        assert_eq!(origin, [1, 0, 0]);
        assert!(dst.holds(src, origin));
        assert!(!dst.holds(src, [4, 0, 0]));
        assert_eq!(centered_origin(dst, src), [0, 0, 0]);
    }

    #[test]
    fn overflowing_origin_does_not_fit() {
        let src = Extent::new(4, 4, 4);
        let huge = Extent::new(usize::MAX, usize::MAX, usize::MAX);
        assert_eq!(Extent::required_for(src, [usize::MAX, 0, 0]), None);
        assert!(!huge.holds(src, [usize::MAX, 0, 0]));
        assert!(!huge.holds(src, [0, 0, usize::MAX - 2]));
        assert!(huge.holds(src, [0, 0, usize::MAX - 4]));
    }
}
