#![no_main]
use libfuzzer_sys::fuzz_target;
use niivolume::reader::read_info_from;
use niivolume::{FormatOverride, NiiPaths, VolumeDecoder};
use std::io::Cursor;
use std::path::PathBuf;

fuzz_target!(|data: &[u8]| {
    let paths = NiiPaths::Single(PathBuf::from("fuzz.nii"));
    let mut source = Cursor::new(data);
    if let Ok(info) = read_info_from(&mut source, paths, FormatOverride::Auto) {
        // keep allocations bounded by the input
        if info.img_offset().saturating_add(info.volume_bytes()) > data.len() as u64 {
            return;
        }
        source.set_position(info.img_offset());
        let _ = VolumeDecoder::for_info(source, &info).run(|_| ());
    }
});
