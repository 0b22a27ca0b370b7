#[macro_use]
extern crate pretty_assertions;

mod util;

use approx::assert_relative_eq;
use niivolume::{Endianness, NiftiType, PlanarConfig, ReaderOptions, VoxelData};
use num_complex::Complex;
use rgb::{RGB8, RGBA8};
use util::{f32_bytes, nifti_header, write_nii};

#[test]
fn rgb24_planar_configurations() {
    let dir = tempfile::tempdir().unwrap();
    let h = nifti_header([2, 2, 1], NiftiType::Rgb24);
    // separated: R plane 10..13, G plane 20..23, B plane 30..33
    let data = [10u8, 11, 12, 13, 20, 21, 22, 23, 30, 31, 32, 33];
    let path = write_nii(dir.path(), "rgb.nii", &h, Endianness::Little, &[], &data);

    let separated = ReaderOptions::new()
        .planar(PlanarConfig::Separated)
        .read_file(&path, |_| ())
        .unwrap();
    assert_eq!(
        separated.volume().data(),
        &VoxelData::Rgb(vec![
            RGB8::new(10, 20, 30),
            RGB8::new(11, 21, 31),
            RGB8::new(12, 22, 32),
            RGB8::new(13, 23, 33),
        ])
    );

    let interleaved = ReaderOptions::new().read_file(&path, |_| ()).unwrap();
    assert_eq!(
        interleaved.volume().data(),
        &VoxelData::Rgb(vec![
            RGB8::new(10, 11, 12),
            RGB8::new(13, 20, 21),
            RGB8::new(22, 23, 30),
            RGB8::new(31, 32, 33),
        ])
    );
    assert_eq!(interleaved.volume().range(), None);
}

#[test]
fn rgba32_interleaved_over_slices() {
    let dir = tempfile::tempdir().unwrap();
    let h = nifti_header([1, 1, 2], NiftiType::Rgba32);
    let data = [1u8, 2, 3, 4, 5, 6, 7, 8];
    let path = write_nii(dir.path(), "rgba.nii", &h, Endianness::Big, &[], &data);
    let loaded = ReaderOptions::new().read_file(&path, |_| ()).unwrap();
    assert_eq!(
        loaded.volume().data(),
        &VoxelData::Rgba(vec![RGBA8::new(1, 2, 3, 4), RGBA8::new(5, 6, 7, 8)])
    );
    assert_eq!(loaded.volume().data().num_channels(), 4);
}

#[test]
fn float32_big_endian() {
    let dir = tempfile::tempdir().unwrap();
    let h = nifti_header([3, 1, 1], NiftiType::Float32);
    let values = [0.25f32, -1.5, 1e6];
    let path = write_nii(
        dir.path(),
        "f.nii",
        &h,
        Endianness::Big,
        &[],
        &f32_bytes(&values, Endianness::Big),
    );
    let loaded = ReaderOptions::new().read_file(&path, |_| ()).unwrap();
    let volume = loaded.volume();
    assert_relative_eq!(volume.get_f64(0, 0, 0).unwrap(), 0.25);
    assert_relative_eq!(volume.get_f64(1, 0, 0).unwrap(), -1.5);
    assert_relative_eq!(volume.get_f64(2, 0, 0).unwrap(), 1e6);
    let range = volume.range().unwrap();
    assert_relative_eq!(range.min, -1.5);
    assert_relative_eq!(range.max, 1e6);
}

#[test]
fn complex64_parts() {
    let dir = tempfile::tempdir().unwrap();
    let h = nifti_header([2, 1, 1], NiftiType::Complex64);
    let parts = [1.0f32, 2.0, -3.0, 0.5];
    for &e in &[Endianness::Little, Endianness::Big] {
        let path = write_nii(dir.path(), "c.nii", &h, e, &[], &f32_bytes(&parts, e));
        let loaded = ReaderOptions::new().read_file(&path, |_| ()).unwrap();
        assert_eq!(
            loaded.volume().data(),
            &VoxelData::Complex(vec![Complex::new(1.0, 2.0), Complex::new(-3.0, 0.5)])
        );
    }
}

#[test]
fn float128_narrowed() {
    let dir = tempfile::tempdir().unwrap();
    let h = nifti_header([2, 1, 1], NiftiType::Float128);
    // 1.5 and -0.25 as IEEE binary128
    let one_and_half: u128 = (16383u128 << 112) | (1u128 << 111);
    let minus_quarter: u128 = (1u128 << 127) | (16381u128 << 112);
    for &e in &[Endianness::Little, Endianness::Big] {
        let mut data = Vec::new();
        for v in &[one_and_half, minus_quarter] {
            match e {
                Endianness::Little => data.extend_from_slice(&v.to_le_bytes()),
                Endianness::Big => data.extend_from_slice(&v.to_be_bytes()),
            }
        }
        let path = write_nii(dir.path(), "q.nii", &h, e, &[], &data);
        let loaded = ReaderOptions::new().read_file(&path, |_| ()).unwrap();
        assert_eq!(loaded.volume().get_f64(0, 0, 0), Some(1.5));
        assert_eq!(loaded.volume().get_f64(1, 0, 0), Some(-0.25));
    }
}

#[cfg(feature = "ndarray_volumes")]
#[test]
fn scalar_volume_as_array() {
    let dir = tempfile::tempdir().unwrap();
    let h = nifti_header([2, 3, 1], NiftiType::Float32);
    let values = [0., 1., 2., 3., 4., 5.];
    let data = f32_bytes(&values, Endianness::Little);
    let path = write_nii(dir.path(), "a.nii", &h, Endianness::Little, &[], &data);
    let loaded = ReaderOptions::new().read_file(&path, |_| ()).unwrap();
    let array = loaded.volume().scalar_array().unwrap();
    assert_eq!(array.dim(), (1, 3, 2));
    assert_eq!(array[[0, 2, 1]], 5.);
}
