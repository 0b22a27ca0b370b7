//! An application for reading NIfTI-1 and ANALYZE 7.5 meta-data.
//!
//! Pass `--decode` to also decode the first volume and print its value range.

use niivolume::{probe_file, ReaderOptions};
use std::env;
use std::process;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_timestamp_secs()
        .init();

    let mut decode = false;
    let mut filename = None;
    for arg in env::args().skip(1) {
        if arg == "--decode" {
            decode = true;
        } else {
            filename = Some(arg);
        }
    }
    let filename = match filename {
        Some(f) => f,
        None => {
            eprintln!("Usage: niftidump [--decode] <file.nii|file.hdr>");
            process::exit(2);
        }
    };

    if let Err(e) = probe_file(&filename) {
        eprintln!("{}: {}", filename, e);
        process::exit(1);
    }

    let options = ReaderOptions::new();
    let info = match options.read_info(&filename) {
        Ok(info) => info,
        Err(e) => {
            eprintln!("Failed to read {}: {}", filename, e);
            process::exit(1);
        }
    };
    println!("{:#?}", info.header());
    println!("version: {}", info.version());
    println!("byte order: {:?}", info.byte_order());
    println!("data type: {:?} {:?}", info.data_type(), info.layout());
    println!("extent: {:?}", info.extent());
    println!("image offset: {}", info.img_offset());
    for ext in info.extensions() {
        println!("extension: code {} ({} bytes)", ext.code(), ext.size());
    }

    if decode {
        match options.read_file(&filename, |_| ()) {
            Ok(loaded) => println!("value range: {:?}", loaded.volume().range()),
            Err(e) => {
                eprintln!("Failed to decode {}: {}", filename, e);
                process::exit(1);
            }
        }
    }
}
