//! Slice-by-slice decoding of voxel data.
//!
//! A [`VolumeDecoder`] reads one z-slice (`nx * ny` voxels) at a time from a
//! byte source positioned at the start of the image data, corrects its byte
//! order and scatters the samples into a dense destination buffer. Each call
//! to [`decode_next_slice`] performs exactly one slice, so a host loop can
//! drive the decoder one step per tick; [`run`] drives it to completion.
//! No state is ever left halfway through a slice.
//!
//! # Example
//!
//! ```
//! use niivolume::{Extent, NiftiType, VolumeDecoder};
//! let bytes: Vec<u8> = (0..32).collect();
//! let decoder = VolumeDecoder::from_reader(&bytes[..], NiftiType::Uint8, Extent::new(4, 4, 2), false);
//! let volume = decoder.run(|_| ())?;
//! assert_eq!(volume.get_f64(3, 1, 1), Some(23.));
//! # Ok::<(), niivolume::NiftiError>(())
//! ```
//!
//! [`VolumeDecoder`]: ./struct.VolumeDecoder.html
//! [`decode_next_slice`]: ./struct.VolumeDecoder.html#method.decode_next_slice
//! [`run`]: ./struct.VolumeDecoder.html#method.run

use super::{Extent, PlanarConfig, ValueRange, Volume, VoxelData, OPAQUE};
use crate::error::{NiftiError, Result};
use crate::info::NiiInfo;
use crate::typedef::{NiftiType, VoxelLayout};
use crate::util::{f128_bytes_to_f64, swap_bytes};
use bytemuck::pod_read_unaligned;
use log::debug;
use num_complex::Complex;
use rgb::{RGB8, RGBA8};
use std::io::{ErrorKind as IoErrorKind, Read};

/// Outcome of decoding one slice.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct SliceProgress {
    /// Index of the slice just decoded.
    pub slice: usize,
    /// Total number of slices in the volume.
    pub total: usize,
}

impl SliceProgress {
    /// Fraction of the volume decoded so far.
    pub fn fraction(&self) -> f32 {
        (self.slice + 1) as f32 / self.total as f32
    }

    /// Whether this was the last slice.
    pub fn is_last(&self) -> bool {
        self.slice + 1 == self.total
    }
}

/// Decoder of the first 3D volume of the image data, one z-slice at a time.
///
/// See the [module-level documentation] for more details.
///
/// [module-level documentation]: ./index.html
#[derive(Debug)]
pub struct VolumeDecoder<R> {
    source: R,
    datatype: NiftiType,
    layout: VoxelLayout,
    extent: Extent,
    destination: Extent,
    origin: [usize; 3],
    planar: PlanarConfig,
    swap: bool,
    buffer: Vec<u8>,
    data: Option<VoxelData>,
    range: Option<ValueRange>,
    slices_read: usize,
    failed: bool,
}

impl<R> VolumeDecoder<R>
where
    R: Read,
{
    /// Create a decoder over raw voxel data of the given type and extent.
    /// `swap` tells whether multi-byte channels are stored in the opposite
    /// byte order. The source must be positioned at the first voxel.
    ///
    /// By default the destination is the source extent, and multi-channel
    /// voxels are expected to be interleaved.
    pub fn from_reader(source: R, datatype: NiftiType, extent: Extent, swap: bool) -> Self {
        VolumeDecoder {
            source,
            datatype,
            layout: datatype.layout(),
            extent,
            destination: extent,
            origin: [0, 0, 0],
            planar: PlanarConfig::default(),
            swap,
            buffer: Vec::new(),
            data: None,
            range: None,
            slices_read: 0,
            failed: false,
        }
    }

    /// Create a decoder for a loaded header, with the source positioned at
    /// the image data offset.
    pub fn for_info(source: R, info: &NiiInfo) -> Self {
        Self::from_reader(source, info.data_type(), info.extent(), info.needs_swap())
    }

    /// Set how the channels of RGB and RGBA voxels are arranged.
    pub fn planar(mut self, planar: PlanarConfig) -> Self {
        self.planar = planar;
        self
    }

    /// Write the volume into a zero-initialized buffer of extent
    /// `destination`, with the first source voxel at `origin`.
    ///
    /// # Errors
    ///
    /// - `NiftiError::DestinationTooSmall` if the source volume placed at
    /// `origin` does not fit in `destination`. A required extent too large
    /// to represent is reported as `usize::MAX` on every axis.
    pub fn destination(mut self, destination: Extent, origin: [usize; 3]) -> Result<Self> {
        if !destination.holds(self.extent, origin) {
            return Err(NiftiError::DestinationTooSmall(
                destination.to_array(),
                Extent::required_for(self.extent, origin)
                    .map_or([usize::MAX; 3], |e| e.to_array()),
            ));
        }
        self.destination = destination;
        self.origin = origin;
        Ok(self)
    }

    /// The extent of the source volume.
    pub fn extent(&self) -> Extent {
        self.extent
    }

    /// The number of slices decoded so far.
    pub fn slices_read(&self) -> usize {
        self.slices_read
    }

    /// The number of slices left to decode.
    pub fn slices_left(&self) -> usize {
        self.extent.nz - self.slices_read
    }

    /// Read and decode the next z-slice.
    ///
    /// Returns `None` once every slice has been decoded, or after a
    /// previous slice failed.
    pub fn decode_next_slice(&mut self) -> Option<Result<SliceProgress>> {
        if self.failed || self.slices_read >= self.extent.nz {
            return None;
        }
        let z = self.slices_read;
        match self.read_slice(z) {
            Ok(()) => {
                self.slices_read += 1;
                let progress = SliceProgress {
                    slice: z,
                    total: self.extent.nz,
                };
                debug!("Decoded slice {} of {}", z + 1, self.extent.nz);
                Some(Ok(progress))
            }
            Err(e) => {
                self.failed = true;
                self.data = None;
                Some(Err(e))
            }
        }
    }

    /// Decode all remaining slices and collect the volume. After each
    /// slice, `progress` receives the fraction of slices decoded so far.
    pub fn run<F>(mut self, mut progress: F) -> Result<Volume>
    where
        F: FnMut(f32),
    {
        while let Some(step) = self.decode_next_slice() {
            let step = step?;
            progress(step.fraction());
        }
        self.finish()
    }

    /// Collect the decoded volume once every slice has been decoded.
    ///
    /// Single-channel numeric volumes get their opacity markers set here,
    /// after all values are in place.
    ///
    /// # Errors
    ///
    /// - `NiftiError::IncompleteDecode` if slices are missing, either
    /// because decoding stopped early or because a slice failed.
    pub fn finish(mut self) -> Result<Volume> {
        if self.failed || self.slices_read < self.extent.nz {
            return Err(NiftiError::IncompleteDecode(
                self.slices_read,
                self.extent.nz,
            ));
        }
        let mut data = self.take_data();
        if let VoxelData::Scalar { alpha, .. } = &mut data {
            let (dst, [ox, oy, oz]) = (self.destination, self.origin);
            for z in 0..self.extent.nz {
                for y in 0..self.extent.ny {
                    let start = dst.index(ox, y + oy, z + oz);
                    for a in &mut alpha[start..start + self.extent.nx] {
                        *a = OPAQUE;
                    }
                }
            }
        }
        Ok(Volume::from_parts(
            self.destination,
            self.extent,
            self.origin,
            self.datatype,
            data,
            self.range,
        ))
    }

    fn take_data(&mut self) -> VoxelData {
        match self.data.take() {
            Some(data) => data,
            None => VoxelData::zeroed(self.datatype, self.destination.len()),
        }
    }

    fn read_slice(&mut self, z: usize) -> Result<()> {
        let voxels = self.extent.voxels_per_slice();
        let needed = voxels * self.layout.bytes_per_voxel;
        self.buffer.resize(needed, 0);
        self.source.read_exact(&mut self.buffer).map_err(|e| {
            if e.kind() == IoErrorKind::UnexpectedEof {
                NiftiError::Truncated(z, needed)
            } else {
                NiftiError::Io(e)
            }
        })?;

        if self.swap && self.layout.bytes_per_channel > 1 {
            swap_bytes(
                voxels * self.layout.num_channels,
                self.layout.bytes_per_channel,
                &mut self.buffer,
            );
        }

        let mut data = self.take_data();
        let placement = Placement {
            extent: self.extent,
            destination: self.destination,
            origin: self.origin,
            z,
        };
        decode_slice(
            &self.buffer,
            self.datatype,
            self.planar,
            &placement,
            &mut data,
            &mut self.range,
        );
        self.data = Some(data);
        Ok(())
    }
}

/// The iterator pattern in a volume decoder calls
/// [`decode_next_slice`](./struct.VolumeDecoder.html#method.decode_next_slice)
/// on `next`, yielding one item per slice.
impl<R> Iterator for VolumeDecoder<R>
where
    R: Read,
{
    type Item = Result<SliceProgress>;

    fn next(&mut self) -> Option<Self::Item> {
        self.decode_next_slice()
    }
}

/// Where the voxels of one slice go in the destination buffer.
struct Placement {
    extent: Extent,
    destination: Extent,
    origin: [usize; 3],
    z: usize,
}

impl Placement {
    /// Call `f(source_index, destination_index)` for every voxel of the slice.
    fn scatter<F: FnMut(usize, usize)>(&self, mut f: F) {
        let [ox, oy, oz] = self.origin;
        for y in 0..self.extent.ny {
            let src_row = y * self.extent.nx;
            let dst_row = self.destination.index(ox, y + oy, self.z + oz);
            for x in 0..self.extent.nx {
                f(src_row + x, dst_row + x);
            }
        }
    }
}

/// Decode one byte-order corrected slice into `data`.
fn decode_slice(
    raw: &[u8],
    datatype: NiftiType,
    planar: PlanarConfig,
    placement: &Placement,
    data: &mut VoxelData,
    range: &mut Option<ValueRange>,
) {
    let plane = placement.extent.voxels_per_slice();
    match data {
        VoxelData::Gray8(out) => {
            // INT8 is shifted into the unsigned range, keeping the ordering
            let flip = if datatype == NiftiType::Int8 { 0x80 } else { 0 };
            placement.scatter(|s, d| {
                let v = raw[s] ^ flip;
                out[d] = v;
                ValueRange::extend(range, f64::from(v));
            });
        }
        VoxelData::Scalar { values, .. } => {
            let size = datatype.layout().bytes_per_voxel;
            placement.scatter(|s, d| {
                let v = read_scalar(&raw[s * size..(s + 1) * size], datatype);
                values[d] = v;
                ValueRange::extend(range, v);
            });
        }
        VoxelData::Complex(out) => {
            let part = datatype.layout().bytes_per_channel;
            placement.scatter(|s, d| {
                let re = &raw[2 * s * part..(2 * s + 1) * part];
                let im = &raw[(2 * s + 1) * part..(2 * s + 2) * part];
                out[d] = Complex::new(read_part(re), read_part(im));
            });
        }
        VoxelData::Rgb(out) => match planar {
            PlanarConfig::Interleaved => placement.scatter(|s, d| {
                out[d] = RGB8::new(raw[3 * s], raw[3 * s + 1], raw[3 * s + 2]);
            }),
            PlanarConfig::Separated => placement.scatter(|s, d| {
                out[d] = RGB8::new(raw[s], raw[plane + s], raw[2 * plane + s]);
            }),
        },
        VoxelData::Rgba(out) => match planar {
            PlanarConfig::Interleaved => placement.scatter(|s, d| {
                out[d] = RGBA8::new(raw[4 * s], raw[4 * s + 1], raw[4 * s + 2], raw[4 * s + 3]);
            }),
            PlanarConfig::Separated => placement.scatter(|s, d| {
                out[d] = RGBA8::new(
                    raw[s],
                    raw[plane + s],
                    raw[2 * plane + s],
                    raw[3 * plane + s],
                );
            }),
        },
    }
}

/// Read one single-channel value in host byte order.
fn read_scalar(bytes: &[u8], datatype: NiftiType) -> f64 {
    use crate::typedef::NiftiType::*;
    match datatype {
        Int16 => f64::from(pod_read_unaligned::<i16>(bytes)),
        Uint16 => f64::from(pod_read_unaligned::<u16>(bytes)),
        Int32 => f64::from(pod_read_unaligned::<i32>(bytes)),
        Uint32 => f64::from(pod_read_unaligned::<u32>(bytes)),
        Float32 => f64::from(pod_read_unaligned::<f32>(bytes)),
        // 64-bit integers beyond 2^53 lose precision
        Int64 => pod_read_unaligned::<i64>(bytes) as f64,
        Uint64 => pod_read_unaligned::<u64>(bytes) as f64,
        Float64 => pod_read_unaligned::<f64>(bytes),
        Float128 => f128_bytes_to_f64(pod_read_unaligned::<[u8; 16]>(bytes)),
        Uint8 => f64::from(bytes[0]),
        Int8 => f64::from(bytes[0] as i8),
        Rgb24 | Rgba32 | Complex64 | Complex128 | Complex256 => 0.,
    }
}

/// Read one floating point part of a complex value in host byte order.
fn read_part(bytes: &[u8]) -> f64 {
    match bytes.len() {
        4 => f64::from(pod_read_unaligned::<f32>(bytes)),
        8 => pod_read_unaligned::<f64>(bytes),
        _ => f128_bytes_to_f64(pod_read_unaligned::<[u8; 16]>(bytes)),
    }
}
