//! This module defines the two 348-byte header records understood by the
//! crate: [`NiftiHeader`] for NIfTI-1 and [`AnalyzeHeader`] for ANALYZE 7.5.
//!
//! Both records occupy the same 348 bytes. They agree on the first
//! [`SHARED_PREFIX_LEN`] bytes (the header key and `dim`), and on a few
//! later fields such as `datatype`, `bitpix`, `pixdim` and `vox_offset`,
//! but interpret the remaining bytes differently. The layouts are spelled
//! out as field descriptor tables ([`NIFTI1_FIELDS`], [`ANALYZE75_FIELDS`]),
//! which drive parsing, serialization, byte swapping and the conversion
//! between the two records.
//!
//! [`NiftiHeader`]: ./struct.NiftiHeader.html
//! [`AnalyzeHeader`]: ./struct.AnalyzeHeader.html
//! [`SHARED_PREFIX_LEN`]: ./constant.SHARED_PREFIX_LEN.html
//! [`NIFTI1_FIELDS`]: ./constant.NIFTI1_FIELDS.html
//! [`ANALYZE75_FIELDS`]: ./constant.ANALYZE75_FIELDS.html

use crate::error::{NiftiError, Result};
use crate::typedef::{NiftiType, SliceOrder, Unit, XForm};
use crate::util::swap_bytes;
use byteordered::{ByteOrdered, Endianness};
use num_traits::FromPrimitive;
use std::io::{Cursor, Read, Write};

/// Size of both header records, in bytes.
pub const HEADER_SIZE: usize = 348;
/// Number of leading bytes with identical meaning in both layouts.
pub const SHARED_PREFIX_LEN: usize = 56;
/// Magic code for NIFTI-1 header files (extention ".hdr").
pub const MAGIC_CODE_NI1: &[u8; 4] = b"ni1\0";
/// Magic code for full NIFTI-1 files (extention ".nii").
pub const MAGIC_CODE_NIP1: &[u8; 4] = b"n+1\0";

/// Position, element width and arity of one header field.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct FieldLayout {
    /// Field name, as in the C headers.
    pub name: &'static str,
    /// Byte offset from the start of the record.
    pub offset: usize,
    /// Size of one element, in bytes.
    pub size: usize,
    /// Number of elements (1 for scalars).
    pub count: usize,
}

impl FieldLayout {
    const fn new(name: &'static str, offset: usize, size: usize, count: usize) -> Self {
        FieldLayout {
            name,
            offset,
            size,
            count,
        }
    }

    /// Total number of bytes taken by the field.
    pub fn len(&self) -> usize {
        self.size * self.count
    }

    /// Whether the field takes no bytes at all.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Fields of the NIfTI-1 header, in file order.
pub const NIFTI1_FIELDS: &[FieldLayout] = &[
    FieldLayout::new("sizeof_hdr", 0, 4, 1),
    FieldLayout::new("data_type", 4, 1, 10),
    FieldLayout::new("db_name", 14, 1, 18),
    FieldLayout::new("extents", 32, 4, 1),
    FieldLayout::new("session_error", 36, 2, 1),
    FieldLayout::new("regular", 38, 1, 1),
    FieldLayout::new("dim_info", 39, 1, 1),
    FieldLayout::new("dim", 40, 2, 8),
    FieldLayout::new("intent_p1", 56, 4, 1),
    FieldLayout::new("intent_p2", 60, 4, 1),
    FieldLayout::new("intent_p3", 64, 4, 1),
    FieldLayout::new("intent_code", 68, 2, 1),
    FieldLayout::new("datatype", 70, 2, 1),
    FieldLayout::new("bitpix", 72, 2, 1),
    FieldLayout::new("slice_start", 74, 2, 1),
    FieldLayout::new("pixdim", 76, 4, 8),
    FieldLayout::new("vox_offset", 108, 4, 1),
    FieldLayout::new("scl_slope", 112, 4, 1),
    FieldLayout::new("scl_inter", 116, 4, 1),
    FieldLayout::new("slice_end", 120, 2, 1),
    FieldLayout::new("slice_code", 122, 1, 1),
    FieldLayout::new("xyzt_units", 123, 1, 1),
    FieldLayout::new("cal_max", 124, 4, 1),
    FieldLayout::new("cal_min", 128, 4, 1),
    FieldLayout::new("slice_duration", 132, 4, 1),
    FieldLayout::new("toffset", 136, 4, 1),
    FieldLayout::new("glmax", 140, 4, 1),
    FieldLayout::new("glmin", 144, 4, 1),
    FieldLayout::new("descrip", 148, 1, 80),
    FieldLayout::new("aux_file", 228, 1, 24),
    FieldLayout::new("qform_code", 252, 2, 1),
    FieldLayout::new("sform_code", 254, 2, 1),
    FieldLayout::new("quatern_b", 256, 4, 1),
    FieldLayout::new("quatern_c", 260, 4, 1),
    FieldLayout::new("quatern_d", 264, 4, 1),
    FieldLayout::new("qoffset_x", 268, 4, 1),
    FieldLayout::new("qoffset_y", 272, 4, 1),
    FieldLayout::new("qoffset_z", 276, 4, 1),
    FieldLayout::new("srow_x", 280, 4, 4),
    FieldLayout::new("srow_y", 296, 4, 4),
    FieldLayout::new("srow_z", 312, 4, 4),
    FieldLayout::new("intent_name", 328, 1, 16),
    FieldLayout::new("magic", 344, 1, 4),
];

/// Fields of the ANALYZE 7.5 header, in file order.
pub const ANALYZE75_FIELDS: &[FieldLayout] = &[
    FieldLayout::new("sizeof_hdr", 0, 4, 1),
    FieldLayout::new("data_type", 4, 1, 10),
    FieldLayout::new("db_name", 14, 1, 18),
    FieldLayout::new("extents", 32, 4, 1),
    FieldLayout::new("session_error", 36, 2, 1),
    FieldLayout::new("regular", 38, 1, 1),
    FieldLayout::new("hkey_un0", 39, 1, 1),
    FieldLayout::new("dim", 40, 2, 8),
    FieldLayout::new("vox_units", 56, 1, 4),
    FieldLayout::new("cal_units", 60, 1, 8),
    FieldLayout::new("unused1", 68, 2, 1),
    FieldLayout::new("datatype", 70, 2, 1),
    FieldLayout::new("bitpix", 72, 2, 1),
    FieldLayout::new("dim_un0", 74, 2, 1),
    FieldLayout::new("pixdim", 76, 4, 8),
    FieldLayout::new("vox_offset", 108, 4, 1),
    FieldLayout::new("funused1", 112, 4, 1),
    FieldLayout::new("funused2", 116, 4, 1),
    FieldLayout::new("funused3", 120, 4, 1),
    FieldLayout::new("cal_max", 124, 4, 1),
    FieldLayout::new("cal_min", 128, 4, 1),
    FieldLayout::new("compressed", 132, 4, 1),
    FieldLayout::new("verified", 136, 4, 1),
    FieldLayout::new("glmax", 140, 4, 1),
    FieldLayout::new("glmin", 144, 4, 1),
    FieldLayout::new("descrip", 148, 1, 80),
    FieldLayout::new("aux_file", 228, 1, 24),
    FieldLayout::new("orient", 252, 1, 1),
    FieldLayout::new("originator", 253, 1, 10),
    FieldLayout::new("generated", 263, 1, 10),
    FieldLayout::new("scannum", 273, 1, 10),
    FieldLayout::new("patient_id", 283, 1, 10),
    FieldLayout::new("exp_date", 293, 1, 10),
    FieldLayout::new("exp_time", 303, 1, 10),
    FieldLayout::new("hist_un0", 313, 1, 3),
    FieldLayout::new("views", 316, 4, 1),
    FieldLayout::new("vols_added", 320, 4, 1),
    FieldLayout::new("start_field", 324, 4, 1),
    FieldLayout::new("field_skip", 328, 4, 1),
    FieldLayout::new("omax", 332, 4, 1),
    FieldLayout::new("omin", 336, 4, 1),
    FieldLayout::new("smax", 340, 4, 1),
    FieldLayout::new("smin", 344, 4, 1),
];

/// Swap every multi-byte field of a raw header record in place, following
/// the given layout. Arrays are swapped element by element.
pub fn swap_header_bytes(raw: &mut [u8; HEADER_SIZE], fields: &[FieldLayout]) {
    for f in fields {
        swap_bytes(f.count, f.size, &mut raw[f.offset..f.offset + f.len()]);
    }
}

/// Copy a raw record from one layout to another. Bytes of fields that
/// exist under the same name and position in both layouts are kept; all
/// other bytes of the target layout are zeroed.
fn reinterpret(
    raw: &[u8; HEADER_SIZE],
    from: &[FieldLayout],
    to: &[FieldLayout],
) -> [u8; HEADER_SIZE] {
    let mut out = *raw;
    for f in to {
        if !from.contains(f) {
            for b in &mut out[f.offset..f.offset + f.len()] {
                *b = 0;
            }
        }
    }
    out
}

/// The kind of header record found in a file.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum HeaderType {
    /// ANALYZE 7.5, recognized by its header size only.
    Analyze75,
    /// NIfTI-1, recognized by its magic code.
    Nifti1,
}

impl HeaderType {
    /// Classify a raw header record, before or after byte swapping.
    ///
    /// A record is NIfTI if its magic code is `n`, `i` or `+`, a digit from 1
    /// to 9 and a NUL byte. Otherwise it is ANALYZE if `sizeof_hdr` is 348 in
    /// either byte order. Anything else, including records shorter than 348
    /// bytes, is unrecognized.
    pub fn detect(raw: &[u8]) -> Option<HeaderType> {
        if raw.len() < HEADER_SIZE {
            return None;
        }
        let mut magic = [0u8; 4];
        magic.copy_from_slice(&raw[344..348]);
        if nifti_version(&magic).is_some() {
            return Some(HeaderType::Nifti1);
        }
        let mut size = [0u8; 4];
        size.copy_from_slice(&raw[0..4]);
        let sizeof_hdr = i32::from_ne_bytes(size);
        if sizeof_hdr == HEADER_SIZE as i32 || sizeof_hdr.swap_bytes() == HEADER_SIZE as i32 {
            Some(HeaderType::Analyze75)
        } else {
            None
        }
    }

    /// The field layout of this header type.
    pub fn fields(self) -> &'static [FieldLayout] {
        match self {
            HeaderType::Analyze75 => ANALYZE75_FIELDS,
            HeaderType::Nifti1 => NIFTI1_FIELDS,
        }
    }
}

/// Extract the NIfTI version from a magic code, if it is one.
pub fn nifti_version(magic: &[u8; 4]) -> Option<u8> {
    match *magic {
        [b'n', b'i', v @ b'1'..=b'9', 0] | [b'n', b'+', v @ b'1'..=b'9', 0] => Some(v - b'0'),
        _ => None,
    }
}

/// The NIFTI-1 header data type.
/// All fields are public and named after the specification's header file.
/// Multi-byte fields hold values in host byte order.
#[derive(Debug, Clone, PartialEq)]
pub struct NiftiHeader {
    /// Header size, must be 348
    pub sizeof_hdr: i32,
    /// Unused in NIFTI-1
    pub data_type: [u8; 10],
    /// Unused in NIFTI-1
    pub db_name: [u8; 18],
    /// Unused in NIFTI-1
    pub extents: i32,
    /// Unused in NIFTI-1
    pub session_error: i16,
    /// Unused in NIFTI-1
    pub regular: u8,
    /// MRI slice ordering
    pub dim_info: u8,
    /// Data array dimensions
    pub dim: [i16; 8],
    /// 1st intent parameter
    pub intent_p1: f32,
    /// 2nd intent parameter
    pub intent_p2: f32,
    /// 3rd intent parameter
    pub intent_p3: f32,
    /// NIFTI_INTENT_* code
    pub intent_code: i16,
    /// Defines the data type!
    pub datatype: i16,
    /// Number of bits per voxel
    pub bitpix: i16,
    /// First slice index
    pub slice_start: i16,
    /// Grid spacings
    pub pixdim: [f32; 8],
    /// Offset into .nii file to reach the volume
    pub vox_offset: f32,
    /// Data scaling: slope
    pub scl_slope: f32,
    /// Data scaling: offset
    pub scl_inter: f32,
    /// Last slice index
    pub slice_end: i16,
    /// Slice timing order
    pub slice_code: u8,
    /// Units of pixdim[1..4]
    pub xyzt_units: u8,
    /// Max display intensity
    pub cal_max: f32,
    /// Min display intensity
    pub cal_min: f32,
    /// Time for 1 slice
    pub slice_duration: f32,
    /// Time axis shift
    pub toffset: f32,
    /// Unused in NIFTI-1
    pub glmax: i32,
    /// Unused in NIFTI-1
    pub glmin: i32,

    /// Any text you like
    pub descrip: [u8; 80],
    /// Auxiliary filename
    pub aux_file: [u8; 24],
    /// NIFTI_XFORM_* code
    pub qform_code: i16,
    /// NIFTI_XFORM_* code
    pub sform_code: i16,
    /// Quaternion b param
    pub quatern_b: f32,
    /// Quaternion c param
    pub quatern_c: f32,
    /// Quaternion d param
    pub quatern_d: f32,
    /// Quaternion x shift
    pub quatern_x: f32,
    /// Quaternion y shift
    pub quatern_y: f32,
    /// Quaternion z shift
    pub quatern_z: f32,

    /// 1st row affine transform
    pub srow_x: [f32; 4],
    /// 2nd row affine transform
    pub srow_y: [f32; 4],
    /// 3rd row affine transform
    pub srow_z: [f32; 4],

    /// 'name' or meaning of data
    pub intent_name: [u8; 16],

    /// Magic code. Must be `b"ni1\0"` or `b"n+1\0"`
    pub magic: [u8; 4],
}

impl Default for NiftiHeader {
    fn default() -> NiftiHeader {
        NiftiHeader {
            sizeof_hdr: 348,
            data_type: [0; 10],
            db_name: [0; 18],
            extents: 0,
            session_error: 0,
            regular: 0,
            dim_info: 0,
            dim: [1, 0, 0, 0, 0, 0, 0, 0],
            intent_p1: 0.,
            intent_p2: 0.,
            intent_p3: 0.,
            intent_code: 0,
            datatype: 0,
            bitpix: 0,
            slice_start: 0,
            pixdim: [1.; 8],
            vox_offset: 352.,
            scl_slope: 0.,
            scl_inter: 0.,
            slice_end: 0,
            slice_code: 0,
            xyzt_units: 0,
            cal_max: 0.,
            cal_min: 0.,
            slice_duration: 0.,
            toffset: 0.,
            glmax: 0,
            glmin: 0,

            descrip: [0; 80],
            aux_file: [0; 24],
            qform_code: 0,
            sform_code: 0,
            quatern_b: 0.,
            quatern_c: 0.,
            quatern_d: 0.,
            quatern_x: 0.,
            quatern_y: 0.,
            quatern_z: 0.,

            srow_x: [0.; 4],
            srow_y: [0.; 4],
            srow_z: [0.; 4],

            intent_name: [0; 16],

            magic: *MAGIC_CODE_NIP1,
        }
    }
}

impl NiftiHeader {
    /// Parse a raw record whose multi-byte fields are already in host
    /// byte order.
    pub fn from_bytes(raw: &[u8; HEADER_SIZE]) -> Result<NiftiHeader> {
        Self::from_bytes_with(raw, Endianness::native())
    }

    /// Parse a raw record written in the given byte order.
    pub fn from_bytes_with(raw: &[u8; HEADER_SIZE], endianness: Endianness) -> Result<NiftiHeader> {
        let mut input = ByteOrdered::runtime(&raw[..], endianness);
        let mut h = NiftiHeader::default();

        h.sizeof_hdr = input.read_i32()?;
        input.read_exact(&mut h.data_type)?;
        input.read_exact(&mut h.db_name)?;
        h.extents = input.read_i32()?;
        h.session_error = input.read_i16()?;
        h.regular = input.read_u8()?;
        h.dim_info = input.read_u8()?;
        for v in &mut h.dim {
            *v = input.read_i16()?;
        }
        h.intent_p1 = input.read_f32()?;
        h.intent_p2 = input.read_f32()?;
        h.intent_p3 = input.read_f32()?;
        h.intent_code = input.read_i16()?;
        h.datatype = input.read_i16()?;
        h.bitpix = input.read_i16()?;
        h.slice_start = input.read_i16()?;
        for v in &mut h.pixdim {
            *v = input.read_f32()?;
        }
        h.vox_offset = input.read_f32()?;
        h.scl_slope = input.read_f32()?;
        h.scl_inter = input.read_f32()?;
        h.slice_end = input.read_i16()?;
        h.slice_code = input.read_u8()?;
        h.xyzt_units = input.read_u8()?;
        h.cal_max = input.read_f32()?;
        h.cal_min = input.read_f32()?;
        h.slice_duration = input.read_f32()?;
        h.toffset = input.read_f32()?;
        h.glmax = input.read_i32()?;
        h.glmin = input.read_i32()?;

        input.read_exact(&mut h.descrip)?;
        input.read_exact(&mut h.aux_file)?;
        h.qform_code = input.read_i16()?;
        h.sform_code = input.read_i16()?;
        h.quatern_b = input.read_f32()?;
        h.quatern_c = input.read_f32()?;
        h.quatern_d = input.read_f32()?;
        h.quatern_x = input.read_f32()?;
        h.quatern_y = input.read_f32()?;
        h.quatern_z = input.read_f32()?;
        for v in &mut h.srow_x {
            *v = input.read_f32()?;
        }
        for v in &mut h.srow_y {
            *v = input.read_f32()?;
        }
        for v in &mut h.srow_z {
            *v = input.read_f32()?;
        }
        input.read_exact(&mut h.intent_name)?;
        input.read_exact(&mut h.magic)?;

        Ok(h)
    }

    /// Serialize this header into a raw 348-byte record with the given
    /// byte order.
    pub fn to_bytes(&self, endianness: Endianness) -> [u8; HEADER_SIZE] {
        let mut raw = [0u8; HEADER_SIZE];
        let res = self.write_fields(ByteOrdered::runtime(Cursor::new(&mut raw[..]), endianness));
        debug_assert!(res.is_ok());
        raw
    }

    fn write_fields<W: Write>(&self, mut out: ByteOrdered<W, Endianness>) -> std::io::Result<()> {
        out.write_i32(self.sizeof_hdr)?;
        out.write_all(&self.data_type)?;
        out.write_all(&self.db_name)?;
        out.write_i32(self.extents)?;
        out.write_i16(self.session_error)?;
        out.write_u8(self.regular)?;
        out.write_u8(self.dim_info)?;
        for v in &self.dim {
            out.write_i16(*v)?;
        }
        out.write_f32(self.intent_p1)?;
        out.write_f32(self.intent_p2)?;
        out.write_f32(self.intent_p3)?;
        out.write_i16(self.intent_code)?;
        out.write_i16(self.datatype)?;
        out.write_i16(self.bitpix)?;
        out.write_i16(self.slice_start)?;
        for v in &self.pixdim {
            out.write_f32(*v)?;
        }
        out.write_f32(self.vox_offset)?;
        out.write_f32(self.scl_slope)?;
        out.write_f32(self.scl_inter)?;
        out.write_i16(self.slice_end)?;
        out.write_u8(self.slice_code)?;
        out.write_u8(self.xyzt_units)?;
        out.write_f32(self.cal_max)?;
        out.write_f32(self.cal_min)?;
        out.write_f32(self.slice_duration)?;
        out.write_f32(self.toffset)?;
        out.write_i32(self.glmax)?;
        out.write_i32(self.glmin)?;
        out.write_all(&self.descrip)?;
        out.write_all(&self.aux_file)?;
        out.write_i16(self.qform_code)?;
        out.write_i16(self.sform_code)?;
        out.write_f32(self.quatern_b)?;
        out.write_f32(self.quatern_c)?;
        out.write_f32(self.quatern_d)?;
        out.write_f32(self.quatern_x)?;
        out.write_f32(self.quatern_y)?;
        out.write_f32(self.quatern_z)?;
        for row in &[self.srow_x, self.srow_y, self.srow_z] {
            for v in row {
                out.write_f32(*v)?;
            }
        }
        out.write_all(&self.intent_name)?;
        out.write_all(&self.magic)
    }

    /// The NIfTI version named by the magic code, if valid.
    pub fn version(&self) -> Option<u8> {
        nifti_version(&self.magic)
    }

    /// Get the data type as a validated enum.
    pub fn data_type(&self) -> Result<NiftiType> {
        NiftiType::from_code(self.datatype)
            .ok_or_else(|| NiftiError::InvalidCode("datatype", self.datatype))
    }

    /// Get the spatial units type as a validated unit enum.
    pub fn xyzt_to_space(&self) -> Result<Unit> {
        let space_code = self.xyzt_units & 0o0007;
        FromPrimitive::from_u8(space_code)
            .ok_or_else(|| NiftiError::InvalidCode("xyzt units (space)", i16::from(space_code)))
    }

    /// Get the time units type as a validated unit enum.
    pub fn xyzt_to_time(&self) -> Result<Unit> {
        let time_code = self.xyzt_units & 0o0070;
        FromPrimitive::from_u8(time_code)
            .ok_or_else(|| NiftiError::InvalidCode("xyzt units (time)", i16::from(time_code)))
    }

    /// Get the slice order as a validated enum.
    pub fn slice_order(&self) -> Result<SliceOrder> {
        FromPrimitive::from_u8(self.slice_code)
            .ok_or_else(|| NiftiError::InvalidCode("slice order", i16::from(self.slice_code)))
    }

    /// Get the qform coordinate mapping method as a validated enum.
    pub fn qform(&self) -> Result<XForm> {
        FromPrimitive::from_i16(self.qform_code)
            .ok_or_else(|| NiftiError::InvalidCode("qform", self.qform_code))
    }

    /// Get the sform coordinate mapping method as a validated enum.
    pub fn sform(&self) -> Result<XForm> {
        FromPrimitive::from_i16(self.sform_code)
            .ok_or_else(|| NiftiError::InvalidCode("sform", self.sform_code))
    }

    /// The `descrip` field up to its first NUL byte.
    pub fn description(&self) -> String {
        c_string(&self.descrip)
    }

    /// Replace every non-finite floating point metadata field with 0.
    /// `pixdim` and `vox_offset` are left to the dimension repair.
    /// Returns how many fields were replaced.
    pub fn sanitize_floats(&mut self) -> usize {
        let mut fixed = 0;
        for v in [
            &mut self.intent_p1,
            &mut self.intent_p2,
            &mut self.intent_p3,
            &mut self.scl_slope,
            &mut self.scl_inter,
            &mut self.cal_max,
            &mut self.cal_min,
            &mut self.slice_duration,
            &mut self.toffset,
            &mut self.quatern_b,
            &mut self.quatern_c,
            &mut self.quatern_d,
            &mut self.quatern_x,
            &mut self.quatern_y,
            &mut self.quatern_z,
        ]
        .iter_mut()
        {
            fixed += zero_if_not_finite(v);
        }
        for row in &mut [&mut self.srow_x, &mut self.srow_y, &mut self.srow_z] {
            for v in row.iter_mut() {
                fixed += zero_if_not_finite(v);
            }
        }
        fixed
    }
}

/// The ANALYZE 7.5 header data type, as documented by the Mayo Clinic
/// `dbh.h` header. Multi-byte fields hold values in host byte order.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyzeHeader {
    /// Header size, must be 348
    pub sizeof_hdr: i32,
    /// Unused
    pub data_type: [u8; 10],
    /// Unused
    pub db_name: [u8; 18],
    /// Should be 16384
    pub extents: i32,
    /// Unused
    pub session_error: i16,
    /// `b'r'` to indicate equal-sized volumes
    pub regular: u8,
    /// Unused
    pub hkey_un0: u8,
    /// Data array dimensions
    pub dim: [i16; 8],
    /// Spatial units of measure
    pub vox_units: [u8; 4],
    /// Calibration units
    pub cal_units: [u8; 8],
    /// Unused
    pub unused1: i16,
    /// Data type code
    pub datatype: i16,
    /// Number of bits per voxel
    pub bitpix: i16,
    /// Unused
    pub dim_un0: i16,
    /// Grid spacings
    pub pixdim: [f32; 8],
    /// Byte offset of the voxel data in the image file
    pub vox_offset: f32,
    /// Unused (SPM uses it as a scale factor)
    pub funused1: f32,
    /// Unused
    pub funused2: f32,
    /// Unused
    pub funused3: f32,
    /// Calibration maximum
    pub cal_max: f32,
    /// Calibration minimum
    pub cal_min: f32,
    /// Unused
    pub compressed: i32,
    /// Unused
    pub verified: i32,
    /// Maximum voxel value
    pub glmax: i32,
    /// Minimum voxel value
    pub glmin: i32,
    /// Free text
    pub descrip: [u8; 80],
    /// Auxiliary filename
    pub aux_file: [u8; 24],
    /// Slice orientation
    pub orient: u8,
    /// Origin (SPM stores five 16-bit coordinates here)
    pub originator: [u8; 10],
    /// Generating software
    pub generated: [u8; 10],
    /// Scan number
    pub scannum: [u8; 10],
    /// Patient identifier
    pub patient_id: [u8; 10],
    /// Experiment date
    pub exp_date: [u8; 10],
    /// Experiment time
    pub exp_time: [u8; 10],
    /// Unused
    pub hist_un0: [u8; 3],
    /// Number of views
    pub views: i32,
    /// Number of added volumes
    pub vols_added: i32,
    /// Start field
    pub start_field: i32,
    /// Field skip
    pub field_skip: i32,
    /// Original maximum
    pub omax: i32,
    /// Original minimum
    pub omin: i32,
    /// Scaled maximum
    pub smax: i32,
    /// Scaled minimum
    pub smin: i32,
}

impl Default for AnalyzeHeader {
    fn default() -> AnalyzeHeader {
        AnalyzeHeader {
            sizeof_hdr: 348,
            data_type: [0; 10],
            db_name: [0; 18],
            extents: 16384,
            session_error: 0,
            regular: b'r',
            hkey_un0: 0,
            dim: [1, 0, 0, 0, 0, 0, 0, 0],
            vox_units: [0; 4],
            cal_units: [0; 8],
            unused1: 0,
            datatype: 0,
            bitpix: 0,
            dim_un0: 0,
            pixdim: [1.; 8],
            vox_offset: 0.,
            funused1: 0.,
            funused2: 0.,
            funused3: 0.,
            cal_max: 0.,
            cal_min: 0.,
            compressed: 0,
            verified: 0,
            glmax: 0,
            glmin: 0,
            descrip: [0; 80],
            aux_file: [0; 24],
            orient: 0,
            originator: [0; 10],
            generated: [0; 10],
            scannum: [0; 10],
            patient_id: [0; 10],
            exp_date: [0; 10],
            exp_time: [0; 10],
            hist_un0: [0; 3],
            views: 0,
            vols_added: 0,
            start_field: 0,
            field_skip: 0,
            omax: 0,
            omin: 0,
            smax: 0,
            smin: 0,
        }
    }
}

impl AnalyzeHeader {
    /// Parse a raw record whose multi-byte fields are already in host
    /// byte order.
    pub fn from_bytes(raw: &[u8; HEADER_SIZE]) -> Result<AnalyzeHeader> {
        Self::from_bytes_with(raw, Endianness::native())
    }

    /// Parse a raw record written in the given byte order.
    pub fn from_bytes_with(
        raw: &[u8; HEADER_SIZE],
        endianness: Endianness,
    ) -> Result<AnalyzeHeader> {
        let mut input = ByteOrdered::runtime(&raw[..], endianness);
        let mut h = AnalyzeHeader::default();

        h.sizeof_hdr = input.read_i32()?;
        input.read_exact(&mut h.data_type)?;
        input.read_exact(&mut h.db_name)?;
        h.extents = input.read_i32()?;
        h.session_error = input.read_i16()?;
        h.regular = input.read_u8()?;
        h.hkey_un0 = input.read_u8()?;
        for v in &mut h.dim {
            *v = input.read_i16()?;
        }
        input.read_exact(&mut h.vox_units)?;
        input.read_exact(&mut h.cal_units)?;
        h.unused1 = input.read_i16()?;
        h.datatype = input.read_i16()?;
        h.bitpix = input.read_i16()?;
        h.dim_un0 = input.read_i16()?;
        for v in &mut h.pixdim {
            *v = input.read_f32()?;
        }
        h.vox_offset = input.read_f32()?;
        h.funused1 = input.read_f32()?;
        h.funused2 = input.read_f32()?;
        h.funused3 = input.read_f32()?;
        h.cal_max = input.read_f32()?;
        h.cal_min = input.read_f32()?;
        h.compressed = input.read_i32()?;
        h.verified = input.read_i32()?;
        h.glmax = input.read_i32()?;
        h.glmin = input.read_i32()?;

        input.read_exact(&mut h.descrip)?;
        input.read_exact(&mut h.aux_file)?;
        h.orient = input.read_u8()?;
        input.read_exact(&mut h.originator)?;
        input.read_exact(&mut h.generated)?;
        input.read_exact(&mut h.scannum)?;
        input.read_exact(&mut h.patient_id)?;
        input.read_exact(&mut h.exp_date)?;
        input.read_exact(&mut h.exp_time)?;
        input.read_exact(&mut h.hist_un0)?;
        h.views = input.read_i32()?;
        h.vols_added = input.read_i32()?;
        h.start_field = input.read_i32()?;
        h.field_skip = input.read_i32()?;
        h.omax = input.read_i32()?;
        h.omin = input.read_i32()?;
        h.smax = input.read_i32()?;
        h.smin = input.read_i32()?;

        Ok(h)
    }

    /// Serialize this header into a raw 348-byte record with the given
    /// byte order.
    pub fn to_bytes(&self, endianness: Endianness) -> [u8; HEADER_SIZE] {
        let mut raw = [0u8; HEADER_SIZE];
        let res = self.write_fields(ByteOrdered::runtime(Cursor::new(&mut raw[..]), endianness));
        debug_assert!(res.is_ok());
        raw
    }

    fn write_fields<W: Write>(&self, mut out: ByteOrdered<W, Endianness>) -> std::io::Result<()> {
        out.write_i32(self.sizeof_hdr)?;
        out.write_all(&self.data_type)?;
        out.write_all(&self.db_name)?;
        out.write_i32(self.extents)?;
        out.write_i16(self.session_error)?;
        out.write_u8(self.regular)?;
        out.write_u8(self.hkey_un0)?;
        for v in &self.dim {
            out.write_i16(*v)?;
        }
        out.write_all(&self.vox_units)?;
        out.write_all(&self.cal_units)?;
        out.write_i16(self.unused1)?;
        out.write_i16(self.datatype)?;
        out.write_i16(self.bitpix)?;
        out.write_i16(self.dim_un0)?;
        for v in &self.pixdim {
            out.write_f32(*v)?;
        }
        out.write_f32(self.vox_offset)?;
        out.write_f32(self.funused1)?;
        out.write_f32(self.funused2)?;
        out.write_f32(self.funused3)?;
        out.write_f32(self.cal_max)?;
        out.write_f32(self.cal_min)?;
        out.write_i32(self.compressed)?;
        out.write_i32(self.verified)?;
        out.write_i32(self.glmax)?;
        out.write_i32(self.glmin)?;
        out.write_all(&self.descrip)?;
        out.write_all(&self.aux_file)?;
        out.write_u8(self.orient)?;
        out.write_all(&self.originator)?;
        out.write_all(&self.generated)?;
        out.write_all(&self.scannum)?;
        out.write_all(&self.patient_id)?;
        out.write_all(&self.exp_date)?;
        out.write_all(&self.exp_time)?;
        out.write_all(&self.hist_un0)?;
        for v in &[
            self.views,
            self.vols_added,
            self.start_field,
            self.field_skip,
            self.omax,
            self.omin,
            self.smax,
            self.smin,
        ] {
            out.write_i32(*v)?;
        }
        Ok(())
    }

    /// The `descrip` field up to its first NUL byte.
    pub fn description(&self) -> String {
        c_string(&self.descrip)
    }

    /// Replace non-finite calibration and scale fields with 0.
    /// Returns how many fields were replaced.
    pub fn sanitize_floats(&mut self) -> usize {
        let mut fixed = 0;
        for v in [
            &mut self.funused1,
            &mut self.funused2,
            &mut self.funused3,
            &mut self.cal_max,
            &mut self.cal_min,
        ]
        .iter_mut()
        {
            fixed += zero_if_not_finite(v);
        }
        fixed
    }
}

/// Reinterpret a NIfTI-1 header as an ANALYZE 7.5 header through its raw
/// bytes.
///
/// Fields stored under the same name and offset in both layouts (the header
/// key, `dim`, `datatype`, `bitpix`, `pixdim`, `vox_offset`, calibration
/// range, `glmax`/`glmin`, `descrip` and `aux_file`) carry over. Everything
/// else is zeroed, so the intent, scaling, slice timing, qform/sform and
/// magic fields are lost.
pub fn analyze_from_nifti(header: &NiftiHeader) -> AnalyzeHeader {
    let raw = reinterpret(
        &header.to_bytes(Endianness::native()),
        NIFTI1_FIELDS,
        ANALYZE75_FIELDS,
    );
    AnalyzeHeader::from_bytes(&raw).unwrap_or_default()
}

/// Reinterpret an ANALYZE 7.5 header as a NIfTI-1 header through its raw
/// bytes.
///
/// Shared fields carry over as in [`analyze_from_nifti`]. The orientation,
/// originator and patient/study identification fields have no NIfTI-1
/// counterpart and are discarded; the NIfTI-only fields, magic included,
/// come out zeroed.
///
/// [`analyze_from_nifti`]: ./fn.analyze_from_nifti.html
pub fn nifti_from_analyze(header: &AnalyzeHeader) -> NiftiHeader {
    let raw = reinterpret(
        &header.to_bytes(Endianness::native()),
        ANALYZE75_FIELDS,
        NIFTI1_FIELDS,
    );
    NiftiHeader::from_bytes(&raw).unwrap_or_default()
}

/// A header record of either supported layout.
#[derive(Debug, Clone, PartialEq)]
pub enum Header {
    /// An ANALYZE 7.5 record.
    Analyze75(AnalyzeHeader),
    /// A NIfTI-1 record.
    Nifti1(NiftiHeader),
}

impl Header {
    /// Parse a raw record, already in host byte order, as the given type.
    pub fn from_bytes(raw: &[u8; HEADER_SIZE], header_type: HeaderType) -> Result<Header> {
        Ok(match header_type {
            HeaderType::Analyze75 => Header::Analyze75(AnalyzeHeader::from_bytes(raw)?),
            HeaderType::Nifti1 => Header::Nifti1(NiftiHeader::from_bytes(raw)?),
        })
    }

    /// The layout of this record.
    pub fn header_type(&self) -> HeaderType {
        match self {
            Header::Analyze75(_) => HeaderType::Analyze75,
            Header::Nifti1(_) => HeaderType::Nifti1,
        }
    }

    /// Data array dimensions. `dim[0]` is the rank.
    pub fn dim(&self) -> &[i16; 8] {
        match self {
            Header::Analyze75(h) => &h.dim,
            Header::Nifti1(h) => &h.dim,
        }
    }

    /// Mutable access to the data array dimensions.
    pub fn dim_mut(&mut self) -> &mut [i16; 8] {
        match self {
            Header::Analyze75(h) => &mut h.dim,
            Header::Nifti1(h) => &mut h.dim,
        }
    }

    /// Grid spacings. `pixdim[0]` is the qfac sign in NIfTI-1.
    pub fn pixdim(&self) -> &[f32; 8] {
        match self {
            Header::Analyze75(h) => &h.pixdim,
            Header::Nifti1(h) => &h.pixdim,
        }
    }

    /// Mutable access to the grid spacings.
    pub fn pixdim_mut(&mut self) -> &mut [f32; 8] {
        match self {
            Header::Analyze75(h) => &mut h.pixdim,
            Header::Nifti1(h) => &mut h.pixdim,
        }
    }

    /// The raw `datatype` code.
    pub fn datatype(&self) -> i16 {
        match self {
            Header::Analyze75(h) => h.datatype,
            Header::Nifti1(h) => h.datatype,
        }
    }

    /// The declared number of bits per voxel.
    pub fn bitpix(&self) -> i16 {
        match self {
            Header::Analyze75(h) => h.bitpix,
            Header::Nifti1(h) => h.bitpix,
        }
    }

    /// The declared byte offset of the voxel data.
    pub fn vox_offset(&self) -> f32 {
        match self {
            Header::Analyze75(h) => h.vox_offset,
            Header::Nifti1(h) => h.vox_offset,
        }
    }

    /// Overwrite the byte offset of the voxel data.
    pub fn set_vox_offset(&mut self, offset: f32) {
        match self {
            Header::Analyze75(h) => h.vox_offset = offset,
            Header::Nifti1(h) => h.vox_offset = offset,
        }
    }

    /// Replace non-finite metadata fields with 0, returning how many
    /// were replaced.
    pub fn sanitize_floats(&mut self) -> usize {
        match self {
            Header::Analyze75(h) => h.sanitize_floats(),
            Header::Nifti1(h) => h.sanitize_floats(),
        }
    }

    /// Obtain a NIfTI-1 view of this header. ANALYZE records go through
    /// [`nifti_from_analyze`] and lose their orientation fields.
    ///
    /// [`nifti_from_analyze`]: ./fn.nifti_from_analyze.html
    pub fn to_nifti(&self) -> NiftiHeader {
        match self {
            Header::Analyze75(h) => nifti_from_analyze(h),
            Header::Nifti1(h) => h.clone(),
        }
    }
}

fn zero_if_not_finite(v: &mut f32) -> usize {
    if v.is_finite() {
        0
    } else {
        *v = 0.;
        1
    }
}

fn c_string(bytes: &[u8]) -> String {
    let end = bytes.iter().position(|b| *b == 0).unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[..end]).into_owned()
}
