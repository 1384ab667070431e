use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;

use thiserror::Error;

// ---------------------------------------------------------------------------
// Minimal NumPy .npy codec
// ---------------------------------------------------------------------------
//
// The upstream pipeline saves its products with `np.save`, so the viewer only
// needs the common subset of the format: versions 1.0/2.0, C-ordered arrays,
// little-endian float/integer dtypes. Everything is widened to f64 on read.

const MAGIC: &[u8; 6] = b"\x93NUMPY";

#[derive(Debug, Error)]
pub enum NpyError {
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
    #[error("not an npy file (bad magic)")]
    BadMagic,
    #[error("unsupported npy format version {0}.{1}")]
    UnsupportedVersion(u8, u8),
    #[error("malformed npy header: {0}")]
    MalformedHeader(String),
    #[error("unsupported dtype descriptor {0:?}")]
    UnsupportedDtype(String),
    #[error("fortran-order arrays are not supported")]
    FortranOrder,
    #[error("data length {len} does not match shape {shape:?}")]
    LengthMismatch { len: usize, shape: Vec<usize> },
}

/// Element types the reader understands. All of them widen losslessly enough
/// to `f64` for display purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Dtype {
    F64,
    F32,
    I64,
    I32,
}

impl Dtype {
    fn from_descr(descr: &str) -> Result<Self, NpyError> {
        match descr {
            "<f8" => Ok(Dtype::F64),
            "<f4" => Ok(Dtype::F32),
            "<i8" => Ok(Dtype::I64),
            "<i4" => Ok(Dtype::I32),
            other => Err(NpyError::UnsupportedDtype(other.to_string())),
        }
    }

    fn item_size(self) -> usize {
        match self {
            Dtype::F64 | Dtype::I64 => 8,
            Dtype::F32 | Dtype::I32 => 4,
        }
    }
}

/// Read an array of any rank, returning its shape and the flat C-ordered
/// data widened to `f64`.
pub fn read_array(reader: &mut impl Read) -> Result<(Vec<usize>, Vec<f64>), NpyError> {
    let mut magic = [0u8; 6];
    reader.read_exact(&mut magic)?;
    if &magic != MAGIC {
        return Err(NpyError::BadMagic);
    }

    let mut version = [0u8; 2];
    reader.read_exact(&mut version)?;
    let header_len = match version {
        [1, 0] => {
            let mut len = [0u8; 2];
            reader.read_exact(&mut len)?;
            u16::from_le_bytes(len) as usize
        }
        [2, 0] => {
            let mut len = [0u8; 4];
            reader.read_exact(&mut len)?;
            u32::from_le_bytes(len) as usize
        }
        [major, minor] => return Err(NpyError::UnsupportedVersion(major, minor)),
    };

    let mut header = vec![0u8; header_len];
    reader.read_exact(&mut header)?;
    let header = String::from_utf8(header)
        .map_err(|_| NpyError::MalformedHeader("header is not valid UTF-8".into()))?;

    let descr = dict_str_value(&header, "descr")?;
    let dtype = Dtype::from_descr(&descr)?;
    if dict_bool_value(&header, "fortran_order")? {
        return Err(NpyError::FortranOrder);
    }
    let shape = parse_shape(&header)?;

    let count: usize = shape.iter().product();
    let mut raw = vec![0u8; count * dtype.item_size()];
    reader.read_exact(&mut raw)?;

    let data = match dtype {
        Dtype::F64 => raw
            .chunks_exact(8)
            .map(|c| f64::from_le_bytes(c.try_into().unwrap()))
            .collect(),
        Dtype::F32 => raw
            .chunks_exact(4)
            .map(|c| f32::from_le_bytes(c.try_into().unwrap()) as f64)
            .collect(),
        Dtype::I64 => raw
            .chunks_exact(8)
            .map(|c| i64::from_le_bytes(c.try_into().unwrap()) as f64)
            .collect(),
        Dtype::I32 => raw
            .chunks_exact(4)
            .map(|c| i32::from_le_bytes(c.try_into().unwrap()) as f64)
            .collect(),
    };

    Ok((shape, data))
}

/// Write a C-ordered f64 array with the given shape.
pub fn write_array(
    writer: &mut impl Write,
    shape: &[usize],
    data: &[f64],
) -> Result<(), NpyError> {
    let expected: usize = shape.iter().product();
    if data.len() != expected {
        return Err(NpyError::LengthMismatch {
            len: data.len(),
            shape: shape.to_vec(),
        });
    }

    writer.write_all(MAGIC)?;
    writer.write_all(&[1, 0])?;

    let dims: Vec<String> = shape.iter().map(|d| d.to_string()).collect();
    let shape_str = if dims.len() == 1 {
        format!("({},)", dims[0])
    } else {
        format!("({})", dims.join(", "))
    };
    let dict = format!(
        "{{'descr': '<f8', 'fortran_order': False, 'shape': {shape_str}, }}"
    );

    // Header (including the trailing newline) padded to a 16-byte boundary.
    let unpadded = dict.len() + 1;
    let pad = (16 - unpadded % 16) % 16;
    let header = format!("{}{}\n", dict, " ".repeat(pad));
    writer.write_all(&(header.len() as u16).to_le_bytes())?;
    writer.write_all(header.as_bytes())?;

    for &v in data {
        writer.write_all(&v.to_le_bytes())?;
    }
    Ok(())
}

pub fn read_path(path: &Path) -> Result<(Vec<usize>, Vec<f64>), NpyError> {
    let mut reader = BufReader::new(File::open(path)?);
    read_array(&mut reader)
}

pub fn write_path(path: &Path, shape: &[usize], data: &[f64]) -> Result<(), NpyError> {
    let mut writer = BufWriter::new(File::create(path)?);
    write_array(&mut writer, shape, data)?;
    writer.flush()?;
    Ok(())
}

// -- Header-dict helpers --
//
// The header is a Python dict literal with a known, fixed set of keys; a few
// string scans beat pulling in a parser for it.

fn dict_str_value(header: &str, key: &str) -> Result<String, NpyError> {
    let needle = format!("'{key}':");
    let start = header
        .find(&needle)
        .ok_or_else(|| NpyError::MalformedHeader(format!("missing key '{key}'")))?
        + needle.len();
    let rest = &header[start..];
    let open = rest
        .find('\'')
        .ok_or_else(|| NpyError::MalformedHeader(format!("unquoted value for '{key}'")))?;
    let rest = &rest[open + 1..];
    let close = rest
        .find('\'')
        .ok_or_else(|| NpyError::MalformedHeader(format!("unterminated value for '{key}'")))?;
    Ok(rest[..close].to_string())
}

fn dict_bool_value(header: &str, key: &str) -> Result<bool, NpyError> {
    let needle = format!("'{key}':");
    let start = header
        .find(&needle)
        .ok_or_else(|| NpyError::MalformedHeader(format!("missing key '{key}'")))?
        + needle.len();
    let rest = header[start..].trim_start();
    if rest.starts_with("True") {
        Ok(true)
    } else if rest.starts_with("False") {
        Ok(false)
    } else {
        Err(NpyError::MalformedHeader(format!(
            "non-boolean value for '{key}'"
        )))
    }
}

fn parse_shape(header: &str) -> Result<Vec<usize>, NpyError> {
    let needle = "'shape':";
    let start = header
        .find(needle)
        .ok_or_else(|| NpyError::MalformedHeader("missing key 'shape'".into()))?
        + needle.len();
    let rest = &header[start..];
    let open = rest
        .find('(')
        .ok_or_else(|| NpyError::MalformedHeader("shape is not a tuple".into()))?;
    let close = rest
        .find(')')
        .ok_or_else(|| NpyError::MalformedHeader("unterminated shape tuple".into()))?;
    rest[open + 1..close]
        .split(',')
        .map(str::trim)
        .filter(|tok| !tok.is_empty())
        .map(|tok| {
            tok.parse::<usize>()
                .map_err(|_| NpyError::MalformedHeader(format!("bad shape entry '{tok}'")))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn roundtrip(shape: &[usize], data: &[f64]) -> (Vec<usize>, Vec<f64>) {
        let mut buf = Vec::new();
        write_array(&mut buf, shape, data).unwrap();
        read_array(&mut Cursor::new(buf)).unwrap()
    }

    #[test]
    fn roundtrips_a_3d_array() {
        let data: Vec<f64> = (0..24).map(|i| i as f64 * 0.5).collect();
        let (shape, out) = roundtrip(&[2, 3, 4], &data);
        assert_eq!(shape, vec![2, 3, 4]);
        assert_eq!(out, data);
    }

    #[test]
    fn roundtrips_a_1d_array_with_trailing_comma_shape() {
        let data = vec![1.0, -2.5, f64::NAN];
        let (shape, out) = roundtrip(&[3], &data);
        assert_eq!(shape, vec![3]);
        assert_eq!(out[0], 1.0);
        assert_eq!(out[1], -2.5);
        assert!(out[2].is_nan());
    }

    #[test]
    fn header_is_16_byte_aligned() {
        let mut buf = Vec::new();
        write_array(&mut buf, &[4], &[0.0; 4]).unwrap();
        // magic(6) + version(2) + len(2) + header must land on a multiple of 16
        let header_len = u16::from_le_bytes([buf[8], buf[9]]) as usize;
        assert_eq!((10 + header_len) % 16, 0);
    }

    #[test]
    fn reads_f32_widened_to_f64() {
        let mut buf = Vec::new();
        buf.extend_from_slice(b"\x93NUMPY\x01\x00");
        let header = "{'descr': '<f4', 'fortran_order': False, 'shape': (2,), }      \n";
        buf.extend_from_slice(&(header.len() as u16).to_le_bytes());
        buf.extend_from_slice(header.as_bytes());
        buf.extend_from_slice(&1.5f32.to_le_bytes());
        buf.extend_from_slice(&(-0.25f32).to_le_bytes());

        let (shape, data) = read_array(&mut Cursor::new(buf)).unwrap();
        assert_eq!(shape, vec![2]);
        assert_eq!(data, vec![1.5, -0.25]);
    }

    #[test]
    fn rejects_bad_magic() {
        let buf = b"NOTNPY\x01\x00".to_vec();
        assert!(matches!(
            read_array(&mut Cursor::new(buf)),
            Err(NpyError::BadMagic)
        ));
    }

    #[test]
    fn rejects_fortran_order() {
        let mut buf = Vec::new();
        buf.extend_from_slice(b"\x93NUMPY\x01\x00");
        let header = "{'descr': '<f8', 'fortran_order': True, 'shape': (1,), }       \n";
        buf.extend_from_slice(&(header.len() as u16).to_le_bytes());
        buf.extend_from_slice(header.as_bytes());
        buf.extend_from_slice(&0.0f64.to_le_bytes());

        assert!(matches!(
            read_array(&mut Cursor::new(buf)),
            Err(NpyError::FortranOrder)
        ));
    }

    #[test]
    fn write_rejects_length_mismatch() {
        let mut buf = Vec::new();
        assert!(matches!(
            write_array(&mut buf, &[2, 2], &[0.0; 3]),
            Err(NpyError::LengthMismatch { .. })
        ));
    }
}
