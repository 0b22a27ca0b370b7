//! Locating, reading and repairing header records.
//!
//! The header reader resolves the file(s) of a volume, reads the fixed
//! 348-byte record, brings it to host byte order, repairs what can be
//! repaired and rejects what cannot. For single-file NIfTI volumes it then
//! collects the extensions sitting before the voxel data.

use crate::error::{NiftiError, Result};
use crate::extension::{Extender, ExtensionSequence, FIRST_EXTENSION_OFFSET};
use crate::header::{swap_header_bytes, Header, HeaderType, HEADER_SIZE};
use crate::info::{NiiInfo, NiiPaths};
use crate::typedef::{NiftiType, DT_BINARY, DT_UNKNOWN};
use crate::util::{file_byte_order, lowercase_extension, needs_swap};
use crate::volume::{Extent, FormatOverride};
use byteordered::ByteOrdered;
use log::{debug, warn};
use std::fs::File;
use std::io::{BufReader, ErrorKind as IoErrorKind, Read};
use std::path::{Path, PathBuf};

/// Byte offset of `dim` in both header layouts.
const DIM_OFFSET: usize = 40;

/// Resolve the header and image files of a volume from a `.nii`, `.hdr` or
/// `.img` path. Extensions are matched case-insensitively, and companion
/// files are looked up in the same case as the given path first.
///
/// # Errors
///
/// - `NiftiError::UnrecognizedExtension` for any other file name.
/// - `NiftiError::MissingFile` if the file or its companion does not exist.
pub fn resolve_paths<P: AsRef<Path>>(path: P) -> Result<NiiPaths> {
    let path = path.as_ref();
    let ext = lowercase_extension(path)
        .ok_or_else(|| NiftiError::UnrecognizedExtension(path.to_path_buf()))?;
    let paths = match ext.as_str() {
        "nii" => NiiPaths::Single(existing(path.to_path_buf())?),
        "hdr" => NiiPaths::Pair {
            header: existing(path.to_path_buf())?,
            image: companion(path, "img")?,
        },
        "img" => NiiPaths::Pair {
            header: companion(path, "hdr")?,
            image: existing(path.to_path_buf())?,
        },
        _ => return Err(NiftiError::UnrecognizedExtension(path.to_path_buf())),
    };
    debug!("Resolved {} to {:?}", path.display(), paths);
    Ok(paths)
}

fn existing(path: PathBuf) -> Result<PathBuf> {
    if path.is_file() {
        Ok(path)
    } else {
        Err(NiftiError::MissingFile(path))
    }
}

/// Find the sibling of `path` with extension `ext`, trying the case of the
/// original extension first.
fn companion(path: &Path, ext: &str) -> Result<PathBuf> {
    let upper = path
        .extension()
        .map(|e| e.to_string_lossy().chars().all(|c| c.is_ascii_uppercase()))
        .unwrap_or(false);
    let (first, second) = if upper {
        (ext.to_ascii_uppercase(), ext.to_string())
    } else {
        (ext.to_string(), ext.to_ascii_uppercase())
    };
    let preferred = path.with_extension(first);
    if preferred.is_file() {
        return Ok(preferred);
    }
    let other = path.with_extension(second);
    if other.is_file() {
        return Ok(other);
    }
    Err(NiftiError::MissingFile(preferred))
}

/// Read the fixed header record from the start of a source.
///
/// # Errors
///
/// - `NiftiError::TruncatedHeader` if fewer than 348 bytes are available.
pub fn read_raw_header<R: Read>(mut source: R) -> Result<[u8; HEADER_SIZE]> {
    let mut raw = [0u8; HEADER_SIZE];
    source.read_exact(&mut raw).map_err(|e| {
        if e.kind() == IoErrorKind::UnexpectedEof {
            NiftiError::TruncatedHeader
        } else {
            NiftiError::Io(e)
        }
    })?;
    Ok(raw)
}

/// Classify a raw header record without parsing it.
///
/// # Errors
///
/// - `NiftiError::TruncatedHeader` if `raw` is shorter than 348 bytes.
/// - `NiftiError::UnrecognizedHeader` if it has neither a NIfTI magic code
/// nor an ANALYZE header size.
pub fn probe_bytes(raw: &[u8]) -> Result<HeaderType> {
    if raw.len() < HEADER_SIZE {
        return Err(NiftiError::TruncatedHeader);
    }
    HeaderType::detect(raw).ok_or(NiftiError::UnrecognizedHeader)
}

/// Parse a raw header record in either byte order.
///
/// The record is brought to host byte order when its `dim[0]` is out of the
/// 1 to 7 range as stored. Returns the header and whether it was swapped.
///
/// # Errors
///
/// - `NiftiError::TruncatedHeader` if `raw` is shorter than 348 bytes.
/// - `NiftiError::UnrecognizedHeader` if the record type cannot be told.
/// - `NiftiError::InvalidHeaderSize` if `sizeof_hdr` is not 348 in either
/// byte order.
/// - `NiftiError::InvalidDimensionality` if `dim[0]` is still out of range
/// after swapping.
pub fn parse_header(raw: &[u8]) -> Result<(Header, bool)> {
    let header_type = probe_bytes(raw)?;
    let mut record = [0u8; HEADER_SIZE];
    record.copy_from_slice(&raw[..HEADER_SIZE]);

    let sizeof_hdr = i32::from_ne_bytes([record[0], record[1], record[2], record[3]]);
    if sizeof_hdr != HEADER_SIZE as i32 && sizeof_hdr.swap_bytes() != HEADER_SIZE as i32 {
        return Err(NiftiError::InvalidHeaderSize(sizeof_hdr));
    }

    let raw_rank = i16::from_ne_bytes([record[DIM_OFFSET], record[DIM_OFFSET + 1]]);
    let swap = needs_swap(raw_rank);
    if swap {
        swap_header_bytes(&mut record, header_type.fields());
    }
    debug!(
        "Header type {:?}, {} byte order",
        header_type,
        if swap { "opposite" } else { "native" }
    );

    let header = Header::from_bytes(&record, header_type)?;
    let rank = header.dim()[0];
    if rank < 1 || rank > 7 {
        return Err(NiftiError::InvalidDimensionality(rank));
    }
    Ok((header, swap))
}

/// Repair the dimensions, spacings and floating point fields of a parsed
/// header in place.
///
/// Axes within the rank that are not positive become 1, and those beyond
/// it become 0. Spacings within the rank that are zero or not finite become
/// 1. Other non-finite metadata is set to 0.
///
/// # Errors
///
/// - `NiftiError::InvalidDimensionality` if `dim[0]` is not within 1 and 7.
/// - `NiftiError::InvalidFirstDimension` if `dim[1]` is not positive.
pub fn repair_header(header: &mut Header) -> Result<()> {
    let rank = header.dim()[0];
    if rank < 1 || rank > 7 {
        return Err(NiftiError::InvalidDimensionality(rank));
    }
    if header.dim()[1] <= 0 {
        return Err(NiftiError::InvalidFirstDimension(header.dim()[1]));
    }
    let rank = rank as usize;

    let dim = header.dim_mut();
    for (i, d) in dim.iter_mut().enumerate().skip(2) {
        if i <= rank && *d <= 0 {
            debug!("dim[{}] = {} repaired to 1", i, d);
            *d = 1;
        } else if i > rank {
            *d = 0;
        }
    }

    let pixdim = header.pixdim_mut();
    for (i, p) in pixdim.iter_mut().enumerate().take(rank + 1).skip(1) {
        if *p == 0. || !p.is_finite() {
            debug!("pixdim[{}] = {} repaired to 1", i, p);
            *p = 1.;
        }
    }

    let sanitized = header.sanitize_floats();
    if sanitized > 0 {
        warn!("{} non-finite header field(s) set to 0", sanitized);
    }
    Ok(())
}

/// Resolve the byte offset of the voxel data, updating the header to match.
///
/// Single files keep their data at or after byte 352, file pairs at the
/// start of the image file.
pub fn repair_offset(header: &mut Header, single_file: bool) -> u64 {
    if !single_file {
        header.set_vox_offset(0.);
        return 0;
    }
    let offset = header.vox_offset();
    let floor = FIRST_EXTENSION_OFFSET as f32;
    if !offset.is_finite() || offset < floor {
        debug!("vox_offset {} raised to {}", offset, floor);
        header.set_vox_offset(floor);
        FIRST_EXTENSION_OFFSET as u64
    } else {
        offset as u64
    }
}

/// Determine the datatype to decode the image bytes as.
///
/// # Errors
///
/// - `NiftiError::InvalidCode` if the header's datatype is unknown (0) or
/// binary (1).
/// - `NiftiError::UnsupportedDataType` if it is any other code without a
/// voxel layout.
pub fn resolve_data_type(header: &Header, format: FormatOverride) -> Result<NiftiType> {
    if let FormatOverride::Force(datatype) = format {
        debug!("Datatype forced to {:?}", datatype);
        return Ok(datatype);
    }
    let code = header.datatype();
    if code == DT_UNKNOWN || code == DT_BINARY {
        return Err(NiftiError::InvalidCode("datatype", code));
    }
    let datatype = NiftiType::from_code(code).ok_or(NiftiError::UnsupportedDataType(code))?;
    let expected = datatype.size_of() * 8;
    if header.bitpix() as usize != expected {
        warn!(
            "bitpix {} does not match datatype {:?} ({} bits)",
            header.bitpix(),
            datatype,
            expected
        );
    }
    Ok(datatype)
}

/// Read and validate the metadata of the volume at `path`.
///
/// # Example
///
/// ```no_run
/// use niivolume::{read_info, FormatOverride};
/// let info = read_info("brain.nii", FormatOverride::Auto)?;
/// println!("{:?} {:?}", info.data_type(), info.extent());
/// # Ok::<(), niivolume::NiftiError>(())
/// ```
pub fn read_info<P: AsRef<Path>>(path: P, format: FormatOverride) -> Result<NiiInfo> {
    let paths = resolve_paths(path)?;
    let file = BufReader::new(File::open(paths.header())?);
    read_info_from(file, paths, format)
}

/// Read and validate metadata from a source positioned at the start of the
/// header record. For single files, the source is left after the extensions.
pub fn read_info_from<R: Read>(mut source: R, paths: NiiPaths, format: FormatOverride) -> Result<NiiInfo> {
    let raw = read_raw_header(&mut source)?;
    let (mut header, swap) = parse_header(&raw)?;
    repair_header(&mut header)?;
    let single_file = paths.is_single_file();
    let img_offset = repair_offset(&mut header, single_file);
    let datatype = resolve_data_type(&header, format)?;
    let byte_order = file_byte_order(swap);

    let extensions = if single_file && header.header_type() == HeaderType::Nifti1 {
        match Extender::from_reader_optional(&mut source)? {
            Some(extender) => {
                let len = (img_offset as usize).saturating_sub(FIRST_EXTENSION_OFFSET);
                ExtensionSequence::from_reader(
                    extender,
                    ByteOrdered::runtime(&mut source, byte_order),
                    len,
                )?
            }
            None => ExtensionSequence::default(),
        }
    } else {
        ExtensionSequence::default()
    };

    let extent = Extent::from_dim(header.dim());
    debug!(
        "{:?} volume of {:?}, data at offset {} with {} extension(s)",
        datatype,
        extent,
        img_offset,
        extensions.len()
    );

    Ok(NiiInfo {
        header,
        byte_order,
        needs_swap: swap,
        datatype,
        extent,
        paths,
        img_offset,
        extensions,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::header::{AnalyzeHeader, NiftiHeader};
    use byteordered::Endianness;
    use pretty_assertions::assert_eq;

    fn nifti(dim: [i16; 8]) -> Header {
        Header::Nifti1(NiftiHeader {
            dim,
            datatype: NiftiType::Uint8 as i16,
            bitpix: 8,
            ..Default::default()
        })
    }

    #[test]
    fn short_record_fails_probe() {
        let raw = [0u8; 200];
        assert!(matches!(probe_bytes(&raw), Err(NiftiError::TruncatedHeader)));
        assert!(matches!(
            read_raw_header(&raw[..]),
            Err(NiftiError::TruncatedHeader)
        ));
    }

    #[test]
    fn garbage_is_unrecognized() {
        let raw = [0x11u8; HEADER_SIZE];
        assert_eq!(
            probe_bytes(&raw).map_err(|e| e.kind()),
            Err(ErrorKind::StructuralInvalid)
        );
    }

    #[test]
    fn parse_in_both_byte_orders() {
        let h = NiftiHeader {
            dim: [3, 4, 5, 6, 0, 0, 0, 0],
            ..Default::default()
        };
        let native = Endianness::native();
        let (parsed, swapped) = parse_header(&h.to_bytes(native)).unwrap();
        assert!(!swapped);
        assert_eq!(parsed, Header::Nifti1(h.clone()));
        let (parsed, swapped) = parse_header(&h.to_bytes(native.to_opposite())).unwrap();
        assert!(swapped);
        assert_eq!(parsed, Header::Nifti1(h));
    }

    #[test]
    fn analyze_header_parses() {
        let h = AnalyzeHeader {
            dim: [3, 2, 2, 2, 0, 0, 0, 0],
            ..Default::default()
        };
        let (parsed, _) = parse_header(&h.to_bytes(Endianness::Big)).unwrap();
        assert_eq!(parsed.header_type(), HeaderType::Analyze75);
        assert_eq!(parsed.dim(), &h.dim);
    }

    #[test]
    fn bad_header_size() {
        let h = NiftiHeader {
            sizeof_hdr: 540,
            ..Default::default()
        };
        assert!(matches!(
            parse_header(&h.to_bytes(Endianness::native())),
            Err(NiftiError::InvalidHeaderSize(540))
        ));
    }

    #[test]
    fn dimension_repair() {
        let mut h = nifti([3, 64, 0, 5, 9, 9, 0, 0]);
        repair_header(&mut h).unwrap();
        assert_eq!(h.dim(), &[3, 64, 1, 5, 0, 0, 0, 0]);
    }

    #[test]
    fn first_dimension_must_be_positive() {
        let mut h = nifti([3, 0, 4, 4, 0, 0, 0, 0]);
        assert!(matches!(
            repair_header(&mut h),
            Err(NiftiError::InvalidFirstDimension(0))
        ));
        let mut h = nifti([0, 4, 4, 4, 0, 0, 0, 0]);
        assert!(matches!(
            repair_header(&mut h),
            Err(NiftiError::InvalidDimensionality(0))
        ));
    }

    #[test]
    fn spacing_repair() {
        let mut h = nifti([3, 4, 4, 4, 0, 0, 0, 0]);
        *h.pixdim_mut() = [-1., 0., f32::NAN, 2.5, 0., 0., 0., 0.];
        repair_header(&mut h).unwrap();
        assert_eq!(h.pixdim(), &[-1., 1., 1., 2.5, 0., 0., 0., 0.]);
    }

    #[test]
    fn offset_floor() {
        let mut h = nifti([1, 4, 0, 0, 0, 0, 0, 0]);
        h.set_vox_offset(0.);
        assert_eq!(repair_offset(&mut h, true), 352);
        assert_eq!(h.vox_offset(), 352.);
        h.set_vox_offset(f32::INFINITY);
        assert_eq!(repair_offset(&mut h, true), 352);
        h.set_vox_offset(400.);
        assert_eq!(repair_offset(&mut h, true), 400);
        assert_eq!(repair_offset(&mut h, false), 0);
        assert_eq!(h.vox_offset(), 0.);
    }

    #[test]
    fn data_type_resolution() {
        let mut h = NiftiHeader {
            datatype: 4,
            bitpix: 16,
            ..Default::default()
        };
        let auto = FormatOverride::Auto;
        assert_eq!(
            resolve_data_type(&Header::Nifti1(h.clone()), auto).unwrap(),
            NiftiType::Int16
        );
        h.datatype = 9999;
        let err = resolve_data_type(&Header::Nifti1(h.clone()), auto).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedFormat);
        h.datatype = DT_BINARY;
        let err = resolve_data_type(&Header::Nifti1(h.clone()), auto).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::StructuralInvalid);
        let forced = FormatOverride::Force(NiftiType::Float32);
        assert_eq!(
            resolve_data_type(&Header::Nifti1(h), forced).unwrap(),
            NiftiType::Float32
        );
    }
}
