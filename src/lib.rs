//! Reader of NIfTI-1 and ANALYZE 7.5 volumes.
//!
//! The crate resolves single (`.nii`) and paired (`.hdr`/`.img`) files,
//! reads and repairs the 348-byte header in either byte order, collects
//! NIfTI-1 extensions and decodes the first 3D volume slice by slice into
//! a dense buffer.
//!
//! # Example
//!
//! ```no_run
//! use niivolume::{ReaderOptions, VoxelData};
//!
//! let loaded = ReaderOptions::new().read_file("brain.nii", |f| println!("{:.0}%", f * 100.))?;
//! println!("{:?}", loaded.info().data_type());
//! if let VoxelData::Scalar { values, .. } = loaded.volume().data() {
//!     println!("{} voxels", values.len());
//! }
//! # Ok::<(), niivolume::NiftiError>(())
//! ```
//!
//! Loads can also be driven one slice at a time, with
//! [`ReaderOptions::open_file`](struct.ReaderOptions.html#method.open_file).
#![deny(missing_debug_implementations)]
#![warn(missing_docs, unused_extern_crates, trivial_casts, unused_results)]

#[macro_use]
extern crate quick_error;
#[macro_use]
extern crate num_derive;

#[cfg(feature = "nalgebra_affine")]
pub mod affine;
pub mod error;
pub mod extension;
pub mod header;
pub mod info;
pub mod object;
pub mod reader;
pub mod session;
pub mod typedef;
mod util;
pub mod volume;

pub use byteordered::Endianness;
pub use error::{ErrorKind, NiftiError, Result};
pub use extension::{Extender, Extension, ExtensionSequence};
pub use header::{analyze_from_nifti, nifti_from_analyze, AnalyzeHeader, Header, HeaderType, NiftiHeader};
pub use info::{NiiInfo, NiiPaths};
pub use object::{is_nifti_file, probe_file, LoadedVolume, PendingLoad, ReaderOptions};
pub use reader::read_info;
pub use session::Session;
pub use typedef::{NiftiType, SliceOrder, Unit, VoxelLayout, XForm};
pub use util::{f128_bytes_to_f64, host_byte_order, needs_swap, swap_bytes};
pub use volume::{
    centered_origin, Extent, FormatOverride, PlanarConfig, SliceProgress, ValueRange,
    Volume, VolumeDecoder, VoxelData,
};
