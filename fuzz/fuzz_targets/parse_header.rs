#![no_main]
use libfuzzer_sys::fuzz_target;
use niivolume::reader::{parse_header, repair_header};

fuzz_target!(|data: &[u8]| {
    if let Ok((mut header, _)) = parse_header(data) {
        if repair_header(&mut header).is_ok() {
            let nifti = header.to_nifti();
            let _ = nifti.data_type();
            let _ = nifti.qform();
            let _ = nifti.sform();
            let _ = nifti.slice_order();
            let _ = nifti.xyzt_to_space();
            let _ = nifti.description();
        }
    }
});
