//! Builders of synthetic volumes on disk.
#![allow(dead_code)]

use niivolume::{AnalyzeHeader, Endianness, NiftiHeader, NiftiType};
use std::fs;
use std::path::{Path, PathBuf};

/// A single-file NIfTI-1 header for a 3D volume of the given type.
pub fn nifti_header(dim: [i16; 3], datatype: NiftiType) -> NiftiHeader {
    NiftiHeader {
        dim: [3, dim[0], dim[1], dim[2], 0, 0, 0, 0],
        datatype: datatype as i16,
        bitpix: (datatype.size_of() * 8) as i16,
        pixdim: [1., 2., 2., 3., 0., 0., 0., 0.],
        vox_offset: 352.,
        magic: *b"n+1\0",
        ..Default::default()
    }
}

/// An ANALYZE 7.5 header for a 3D volume of the given type.
pub fn analyze_header(dim: [i16; 3], datatype: NiftiType) -> AnalyzeHeader {
    AnalyzeHeader {
        dim: [3, dim[0], dim[1], dim[2], 0, 0, 0, 0],
        datatype: datatype as i16,
        bitpix: (datatype.size_of() * 8) as i16,
        pixdim: [0., 1., 1., 1., 0., 0., 0., 0.],
        ..Default::default()
    }
}

/// Raw bytes of one extension record.
pub fn extension_bytes(e: Endianness, esize: i32, ecode: i32, fill: u8) -> Vec<u8> {
    let (size, code) = match e {
        Endianness::Little => (esize.to_le_bytes(), ecode.to_le_bytes()),
        Endianness::Big => (esize.to_be_bytes(), ecode.to_be_bytes()),
    };
    let mut out = size.to_vec();
    out.extend_from_slice(&code);
    out.extend(std::iter::repeat(fill).take(esize as usize - 8));
    out
}

/// Write a single `.nii` file: the header record, the extender flag, the
/// given extension bytes, zero padding up to `vox_offset` and the data.
pub fn write_nii(
    dir: &Path,
    name: &str,
    header: &NiftiHeader,
    e: Endianness,
    extensions: &[u8],
    data: &[u8],
) -> PathBuf {
    let mut bytes = header.to_bytes(e).to_vec();
    let flag = if extensions.is_empty() { 0 } else { 1 };
    bytes.extend_from_slice(&[flag, 0, 0, 0]);
    bytes.extend_from_slice(extensions);
    let offset = header.vox_offset as usize;
    if bytes.len() < offset {
        bytes.resize(offset, 0);
    }
    bytes.extend_from_slice(data);
    let path = dir.join(name);
    fs::write(&path, bytes).unwrap();
    path
}

/// Write a `.hdr`/`.img` pair from a raw header record. Returns the header
/// path.
pub fn write_pair(dir: &Path, stem: &str, header: &[u8], data: &[u8]) -> PathBuf {
    let hdr = dir.join(format!("{}.hdr", stem));
    fs::write(&hdr, header).unwrap();
    fs::write(dir.join(format!("{}.img", stem)), data).unwrap();
    hdr
}

/// Serialize values with the given byte order.
pub fn i16_bytes(values: &[i16], e: Endianness) -> Vec<u8> {
    values
        .iter()
        .flat_map(|v| match e {
            Endianness::Little => v.to_le_bytes(),
            Endianness::Big => v.to_be_bytes(),
        })
        .collect()
}

/// Serialize values with the given byte order.
pub fn f32_bytes(values: &[f32], e: Endianness) -> Vec<u8> {
    values
        .iter()
        .flat_map(|v| match e {
            Endianness::Little => v.to_le_bytes(),
            Endianness::Big => v.to_be_bytes(),
        })
        .collect()
}
