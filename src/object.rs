//! Module for loading complete volumes from the file system.
//!
//! A load chains path resolution, header reading and repair, the extension
//! scan and the slice-by-slice decode. It either produces a [`LoadedVolume`]
//! or fails as a whole: no partially decoded volume is ever handed out.
//!
//! [`LoadedVolume`]: ./struct.LoadedVolume.html

use crate::error::{NiftiError, Result};
use crate::header::{HeaderType, HEADER_SIZE};
use crate::info::NiiInfo;
use crate::reader::{probe_bytes, read_info, resolve_paths};
use crate::volume::{
    centered_origin, Extent, FormatOverride, PlanarConfig, SliceProgress, Volume, VolumeDecoder,
};
use log::{debug, warn};
use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;

/// Options and flags which can be used to configure how a volume is read.
///
/// # Example
///
/// ```no_run
/// use niivolume::{PlanarConfig, ReaderOptions};
///
/// let loaded = ReaderOptions::new()
///     .planar(PlanarConfig::Separated)
///     .pad_to_power_of_two(true)
///     .read_file("colors.nii", |_| ())?;
/// println!("{:?}", loaded.volume().extent());
/// # Ok::<(), niivolume::NiftiError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReaderOptions {
    format: FormatOverride,
    planar: PlanarConfig,
    destination: Option<(Extent, [usize; 3])>,
    pad_to_power_of_two: bool,
}

impl ReaderOptions {
    /// Creates a blank new set of options ready for configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Choose the datatype used to interpret the image bytes.
    pub fn format(mut self, format: FormatOverride) -> Self {
        self.format = format;
        self
    }

    /// Choose how the channels of RGB and RGBA voxels are arranged.
    pub fn planar(mut self, planar: PlanarConfig) -> Self {
        self.planar = planar;
        self
    }

    /// Decode into a buffer of the given extent, with the source volume
    /// placed at `origin`. Takes precedence over
    /// [`pad_to_power_of_two`](#method.pad_to_power_of_two).
    pub fn destination(mut self, extent: Extent, origin: [usize; 3]) -> Self {
        self.destination = Some((extent, origin));
        self
    }

    /// Decode into a buffer with power-of-two sides, centering the source
    /// volume in it.
    pub fn pad_to_power_of_two(mut self, pad: bool) -> Self {
        self.pad_to_power_of_two = pad;
        self
    }

    /// Read and validate only the metadata of the volume at `path`.
    pub fn read_info<P: AsRef<Path>>(&self, path: P) -> Result<NiiInfo> {
        read_info(path, self.format)
    }

    /// Read the metadata of the volume at `path` and prepare its decode.
    /// The returned load performs one slice per step.
    ///
    /// Fails with `NiftiError::Truncated` when the image file is too short
    /// for the declared volume.
    pub fn open_file<P: AsRef<Path>>(&self, path: P) -> Result<PendingLoad> {
        let path = path.as_ref();
        self.open_file_2(path).map_err(|e| {
            warn!("Failed to load {}: {}", path.display(), e);
            e
        })
    }

    fn open_file_2(&self, path: &Path) -> Result<PendingLoad> {
        let info = self.read_info(path)?;
        let (destination, origin) = self.placement(info.extent());

        let mut file = File::open(info.paths().image())?;
        let available = file.metadata()?.len().saturating_sub(info.img_offset());
        check_image_size(&info, available)?;
        file.seek(SeekFrom::Start(info.img_offset()))?;
        let decoder = VolumeDecoder::for_info(BufReader::new(file), &info)
            .planar(self.planar)
            .destination(destination, origin)?;
        debug!("Decoding into {:?} at origin {:?}", destination, origin);
        Ok(PendingLoad { info, decoder })
    }

    fn placement(&self, source: Extent) -> (Extent, [usize; 3]) {
        match self.destination {
            Some(placement) => placement,
            None if self.pad_to_power_of_two => {
                let destination = source.next_power_of_two();
                (destination, centered_origin(source, destination))
            }
            None => (source, [0, 0, 0]),
        }
    }

    /// Load the volume at `path` to completion, reporting the fraction of
    /// slices decoded to `progress` after each slice.
    pub fn read_file<P, F>(&self, path: P, progress: F) -> Result<LoadedVolume>
    where
        P: AsRef<Path>,
        F: FnMut(f32),
    {
        let path = path.as_ref();
        self.open_file(path)?.run(progress).map_err(|e| {
            warn!("Failed to load {}: {}", path.display(), e);
            e
        })
    }
}

/// Fail with `Truncated` at the first slice the image data cannot cover,
/// before anything is allocated for the decode.
fn check_image_size(info: &NiiInfo, available: u64) -> Result<()> {
    let needed = info.volume_bytes();
    if available >= needed {
        return Ok(());
    }
    let slice_bytes = info.extent().voxels_per_slice() * info.layout().bytes_per_voxel;
    let slice = available / slice_bytes.max(1) as u64;
    debug!("Image data holds {} of {} bytes", available, needed);
    Err(NiftiError::Truncated(slice as usize, slice_bytes))
}

/// A load in progress, decoding one slice per step.
///
/// Stepping through the iterator drives the decode; dropping the value
/// cancels it. Once every slice is decoded, [`finish`](#method.finish)
/// collects the result.
#[derive(Debug)]
pub struct PendingLoad {
    info: NiiInfo,
    decoder: VolumeDecoder<BufReader<File>>,
}

impl PendingLoad {
    /// The metadata of the volume being loaded.
    pub fn info(&self) -> &NiiInfo {
        &self.info
    }

    /// Number of slices left to decode.
    pub fn slices_left(&self) -> usize {
        self.decoder.slices_left()
    }

    /// Decode all remaining slices and collect the volume.
    pub fn run<F: FnMut(f32)>(self, progress: F) -> Result<LoadedVolume> {
        let volume = self.decoder.run(progress)?;
        Ok(LoadedVolume {
            info: self.info,
            volume,
        })
    }

    /// Collect the volume after all slices have been decoded.
    ///
    /// # Errors
    ///
    /// - `NiftiError::IncompleteDecode` if any slice is missing.
    pub fn finish(self) -> Result<LoadedVolume> {
        let volume = self.decoder.finish()?;
        Ok(LoadedVolume {
            info: self.info,
            volume,
        })
    }
}

impl Iterator for PendingLoad {
    type Item = Result<SliceProgress>;

    fn next(&mut self) -> Option<Self::Item> {
        self.decoder.next()
    }
}

/// A fully decoded volume along with its metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedVolume {
    info: NiiInfo,
    volume: Volume,
}

impl LoadedVolume {
    /// The metadata of the volume.
    pub fn info(&self) -> &NiiInfo {
        &self.info
    }

    /// The decoded voxels.
    pub fn volume(&self) -> &Volume {
        &self.volume
    }

    /// Move the voxels out, discarding the metadata.
    pub fn into_volume(self) -> Volume {
        self.volume
    }

    /// Split into metadata and voxels.
    pub fn into_parts(self) -> (NiiInfo, Volume) {
        (self.info, self.volume)
    }
}

/// Tell whether the file at `path` holds a NIfTI-1 or ANALYZE 7.5 header,
/// looking only at its size and magic fields. For `.hdr`/`.img` pairs
/// the header file is inspected.
///
/// # Errors
///
/// - Path resolution errors, as in [`resolve_paths`].
/// - `NiftiError::TruncatedHeader` if the header file is shorter than
/// 348 bytes.
/// - `NiftiError::UnrecognizedHeader` if the header is of neither type.
///
/// [`resolve_paths`]: ../reader/fn.resolve_paths.html
pub fn probe_file<P: AsRef<Path>>(path: P) -> Result<HeaderType> {
    let paths = resolve_paths(path)?;
    let mut raw = Vec::with_capacity(HEADER_SIZE);
    let _ = File::open(paths.header())?
        .take(HEADER_SIZE as u64)
        .read_to_end(&mut raw)?;
    probe_bytes(&raw)
}

/// Whether the file at `path` can be recognized as a NIfTI-1 or ANALYZE 7.5
/// volume.
pub fn is_nifti_file<P: AsRef<Path>>(path: P) -> bool {
    match probe_file(path) {
        Ok(_) => true,
        Err(NiftiError::Io(e)) => {
            debug!("Probe failed: {}", e);
            false
        }
        Err(_) => false,
    }
}
