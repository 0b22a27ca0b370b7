#[macro_use]
extern crate pretty_assertions;

mod util;

use niivolume::{
    analyze_from_nifti, is_nifti_file, probe_file, read_info, Endianness, ErrorKind,
    FormatOverride, Header, HeaderType, NiftiError, NiftiType,
};
use std::fs;
use util::{analyze_header, nifti_header, write_nii, write_pair};

#[test]
fn probe_single_file() {
    let dir = tempfile::tempdir().unwrap();
    let h = nifti_header([2, 2, 2], NiftiType::Uint8);
    let path = write_nii(dir.path(), "a.nii", &h, Endianness::Little, &[], &[0; 8]);
    assert_eq!(probe_file(&path).unwrap(), HeaderType::Nifti1);
    assert!(is_nifti_file(&path));
}

#[test]
fn probe_analyze_pair() {
    let dir = tempfile::tempdir().unwrap();
    let h = analyze_header([2, 2, 2], NiftiType::Uint8);
    let hdr = write_pair(dir.path(), "a", &h.to_bytes(Endianness::Big), &[0; 8]);
    assert_eq!(probe_file(&hdr).unwrap(), HeaderType::Analyze75);
    assert_eq!(
        probe_file(dir.path().join("a.img")).unwrap(),
        HeaderType::Analyze75
    );
}

#[test]
fn short_header_fails_probe() {
    let dir = tempfile::tempdir().unwrap();
    let h = nifti_header([2, 2, 2], NiftiType::Uint8);
    let path = dir.path().join("short.nii");
    fs::write(&path, &h.to_bytes(Endianness::Little)[..300]).unwrap();
    let err = probe_file(&path).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Truncated);
    assert!(!is_nifti_file(&path));
    let err = read_info(&path, FormatOverride::Auto).unwrap_err();
    assert!(matches!(err, NiftiError::TruncatedHeader));
}

#[test]
fn unknown_extension() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("volume.nii.gz");
    fs::write(&path, [0u8; 400]).unwrap();
    let err = probe_file(&path).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::PathResolution);
}

#[test]
fn missing_companion() {
    let dir = tempfile::tempdir().unwrap();
    let h = analyze_header([2, 2, 2], NiftiType::Uint8);
    let hdr = dir.path().join("lonely.hdr");
    fs::write(&hdr, &h.to_bytes(Endianness::Little)[..]).unwrap();
    match read_info(&hdr, FormatOverride::Auto) {
        Err(NiftiError::MissingFile(p)) => assert_eq!(p, dir.path().join("lonely.img")),
        other => panic!("expected a missing file, got {:?}", other),
    }
}

#[test]
fn uppercase_pair() {
    let dir = tempfile::tempdir().unwrap();
    let h = analyze_header([2, 1, 1], NiftiType::Uint8);
    fs::write(dir.path().join("SCAN.HDR"), &h.to_bytes(Endianness::Little)[..]).unwrap();
    fs::write(dir.path().join("SCAN.IMG"), [1u8, 2]).unwrap();
    let info = read_info(dir.path().join("SCAN.HDR"), FormatOverride::Auto).unwrap();
    assert_eq!(info.paths().image(), dir.path().join("SCAN.IMG").as_path());
    assert_eq!(info.version(), 0);
}

#[test]
fn big_endian_header_is_repaired() {
    let dir = tempfile::tempdir().unwrap();
    let mut h = nifti_header([64, 0, 5], NiftiType::Uint8);
    h.dim[4] = 7;
    h.pixdim = [1., 0., f32::NAN, 1.5, 0., 0., 0., 0.];
    h.scl_slope = f32::INFINITY;
    h.vox_offset = 100.;
    let path = write_nii(dir.path(), "be.nii", &h, Endianness::Big, &[], &[0; 64 * 5]);

    let info = read_info(&path, FormatOverride::Auto).unwrap();
    assert_eq!(info.needs_swap(), Endianness::native() == Endianness::Little);
    assert_eq!(info.byte_order(), Endianness::Big);
    assert_eq!(info.version(), 1);
    assert_eq!(info.img_offset(), 352);
    assert_eq!(info.header().dim(), &[3, 64, 1, 5, 0, 0, 0, 0]);
    assert_eq!(info.header().pixdim(), &[1., 1., 1., 1.5, 0., 0., 0., 0.]);
    match info.header() {
        Header::Nifti1(n) => {
            assert_eq!(n.scl_slope, 0.);
            assert_eq!(n.vox_offset, 352.);
        }
        other => panic!("expected a NIfTI header, got {:?}", other),
    }
    assert_eq!(info.extent().to_array(), [64, 1, 5]);
}

#[test]
fn pair_offset_is_zero() {
    let dir = tempfile::tempdir().unwrap();
    let mut h = nifti_header([2, 2, 1], NiftiType::Uint8);
    h.magic = *b"ni1\0";
    h.vox_offset = 500.;
    let hdr = write_pair(dir.path(), "p", &h.to_bytes(Endianness::Little), &[0; 4]);
    let info = read_info(&hdr, FormatOverride::Auto).unwrap();
    assert_eq!(info.img_offset(), 0);
    assert!(info.extensions().is_empty());
    assert!(!info.paths().is_single_file());
}

#[test]
fn invalid_datatypes() {
    let dir = tempfile::tempdir().unwrap();
    let mut h = nifti_header([2, 2, 2], NiftiType::Uint8);
    h.datatype = 9999;
    let path = write_nii(dir.path(), "x.nii", &h, Endianness::Little, &[], &[0; 8]);
    let err = read_info(&path, FormatOverride::Auto).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnsupportedFormat);

    h.datatype = 0;
    let path = write_nii(dir.path(), "y.nii", &h, Endianness::Little, &[], &[0; 8]);
    let err = read_info(&path, FormatOverride::Auto).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::StructuralInvalid);

    let info = read_info(&path, FormatOverride::Force(NiftiType::Int8)).unwrap();
    assert_eq!(info.data_type(), NiftiType::Int8);
}

#[test]
fn non_positive_first_dimension() {
    let dir = tempfile::tempdir().unwrap();
    let h = nifti_header([0, 2, 2], NiftiType::Uint8);
    let path = write_nii(dir.path(), "x.nii", &h, Endianness::Little, &[], &[]);
    let err = read_info(&path, FormatOverride::Auto).unwrap_err();
    assert!(matches!(err, NiftiError::InvalidFirstDimension(0)));
    assert_eq!(err.kind(), ErrorKind::StructuralInvalid);
}

#[test]
fn analyze_info_as_nifti() {
    let dir = tempfile::tempdir().unwrap();
    let mut h = analyze_header([3, 2, 1], NiftiType::Int16);
    h.orient = 1;
    h.descrip[..4].copy_from_slice(b"scan");
    let hdr = write_pair(dir.path(), "a", &h.to_bytes(Endianness::Little), &[0; 12]);
    let info = read_info(&hdr, FormatOverride::Auto).unwrap();
    let n = info.nifti_header();
    assert_eq!(n.description(), "scan");
    assert_eq!(n.dim, [3, 3, 2, 1, 0, 0, 0, 0]);
    assert_eq!(n.magic, [0; 4]);
    assert_eq!(analyze_from_nifti(&n).orient, 0);
}
