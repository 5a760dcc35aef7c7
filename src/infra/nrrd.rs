// ============================================================
// Layer 6 — NRRD Volume Reader
// ============================================================
// Reads voxel grids stored as NRRD files.
//
// File layout:
//
//   NRRD0004                  ← magic line
//   # comment                 ← ignored
//   type: uint8
//   dimension: 4
//   sizes: 4 32 32 32
//   encoding: gzip
//   endian: little
//                             ← blank line ends the header
//   <binary payload>
//
// `sizes` lists the fastest axis first, so the grid's
// row-major dims are `sizes` reversed.
//
// Supported: attached data, raw or gzip encoding, integer and
// floating point sample types of either endianness. Values are
// widened to f32.
//
// Reference: teem NRRD file format documentation
//            flate2 crate documentation (GzDecoder)

use anyhow::{bail, Context, Result};
use flate2::read::GzDecoder;
use std::collections::HashMap;
use std::fs;
use std::io::Read;
use std::path::Path;

use crate::domain::records::VoxelGrid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SampleType {
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    F32,
    F64,
}

impl SampleType {
    fn parse(name: &str) -> Result<Self> {
        Ok(match name {
            "int8" | "signed char" | "int8_t"                  => SampleType::I8,
            "uint8" | "uchar" | "unsigned char" | "uint8_t"    => SampleType::U8,
            "int16" | "short" | "short int" | "int16_t"        => SampleType::I16,
            "uint16" | "ushort" | "unsigned short" | "uint16_t" => SampleType::U16,
            "int32" | "int" | "signed int" | "int32_t"         => SampleType::I32,
            "uint32" | "uint" | "unsigned int" | "uint32_t"    => SampleType::U32,
            "float"                                            => SampleType::F32,
            "double"                                           => SampleType::F64,
            other => bail!("unsupported NRRD type '{other}'"),
        })
    }

    fn width(self) -> usize {
        match self {
            SampleType::I8 | SampleType::U8   => 1,
            SampleType::I16 | SampleType::U16 => 2,
            SampleType::I32 | SampleType::U32 | SampleType::F32 => 4,
            SampleType::F64 => 8,
        }
    }

    fn decode(self, bytes: &[u8], big_endian: bool) -> f32 {
        macro_rules! read {
            ($t:ty, $n:expr) => {{
                let mut buf = [0u8; $n];
                buf.copy_from_slice(bytes);
                if big_endian { <$t>::from_be_bytes(buf) } else { <$t>::from_le_bytes(buf) }
            }};
        }
        match self {
            SampleType::I8  => bytes[0] as i8 as f32,
            SampleType::U8  => bytes[0] as f32,
            SampleType::I16 => read!(i16, 2) as f32,
            SampleType::U16 => read!(u16, 2) as f32,
            SampleType::I32 => read!(i32, 4) as f32,
            SampleType::U32 => read!(u32, 4) as f32,
            SampleType::F32 => read!(f32, 4),
            SampleType::F64 => read!(f64, 8) as f32,
        }
    }
}

/// Read one NRRD file from disk.
pub fn read_nrrd(path: impl AsRef<Path>) -> Result<VoxelGrid> {
    let path  = path.as_ref();
    let bytes = fs::read(path).with_context(|| format!("Cannot read '{}'", path.display()))?;
    parse_nrrd(&bytes).with_context(|| format!("Invalid NRRD file '{}'", path.display()))
}

/// Parse an in-memory NRRD file.
pub fn parse_nrrd(bytes: &[u8]) -> Result<VoxelGrid> {
    let (fields, payload) = split_header(bytes)?;

    if fields.contains_key("data file") || fields.contains_key("datafile") {
        bail!("detached NRRD data files are not supported");
    }

    let sample = SampleType::parse(field(&fields, "type")?)?;
    let dimension: usize = field(&fields, "dimension")?
        .parse()
        .context("'dimension' is not a number")?;
    let sizes = field(&fields, "sizes")?
        .split_whitespace()
        .map(str::parse::<usize>)
        .collect::<std::result::Result<Vec<_>, _>>()
        .context("'sizes' must be whole numbers")?;
    if sizes.len() != dimension {
        bail!("'sizes' lists {} axes but dimension is {}", sizes.len(), dimension);
    }

    let big_endian = match fields.get("endian").map(String::as_str) {
        Some("big")                => true,
        Some("little") | None      => false,
        Some(other)                => bail!("unknown endian '{other}'"),
    };

    let data = match field(&fields, "encoding")? {
        "raw" => payload.to_vec(),
        "gzip" | "gz" => {
            let mut out = Vec::new();
            GzDecoder::new(payload)
                .read_to_end(&mut out)
                .context("cannot inflate gzip payload")?;
            out
        }
        other => bail!("unsupported NRRD encoding '{other}'"),
    };

    let needed = sizes
        .iter()
        .try_fold(sample.width(), |acc, &n| acc.checked_mul(n))
        .with_context(|| format!("'sizes' {:?} overflow the addressable payload", sizes))?;
    if data.len() < needed {
        bail!("payload holds {} bytes, {} expected", data.len(), needed);
    }

    let values: Vec<f32> = data[..needed]
        .chunks_exact(sample.width())
        .map(|chunk| sample.decode(chunk, big_endian))
        .collect();

    // NRRD lists the fastest axis first
    let dims: Vec<usize> = sizes.into_iter().rev().collect();
    VoxelGrid::new(dims, values).context("sizes do not match payload")
}

fn field<'a>(fields: &'a HashMap<String, String>, key: &str) -> Result<&'a str> {
    fields
        .get(key)
        .map(String::as_str)
        .with_context(|| format!("missing '{key}' field"))
}

/// Split header fields from the binary payload.
fn split_header(bytes: &[u8]) -> Result<(HashMap<String, String>, &[u8])> {
    if !bytes.starts_with(b"NRRD") {
        bail!("missing NRRD magic");
    }

    let mut fields = HashMap::new();
    let mut offset = 0;
    let mut first  = true;

    loop {
        let rest = &bytes[offset..];
        let Some(end) = rest.iter().position(|&b| b == b'\n') else {
            bail!("header is not terminated by a blank line");
        };
        let line = std::str::from_utf8(&rest[..end])
            .context("header is not valid UTF-8")?
            .trim_end_matches('\r');
        offset += end + 1;

        if first {
            first = false;
            continue;
        }
        if line.is_empty() {
            break;
        }
        if line.starts_with('#') {
            continue;
        }
        // "key: value" fields; "key:=value" key/value pairs are skipped
        if let Some((key, value)) = line.split_once(": ") {
            fields.insert(key.trim().to_lowercase(), value.trim().to_string());
        }
    }

    Ok((fields, &bytes[offset..]))
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;

    fn header(kind: &str, sizes: &str, encoding: &str, extra: &str) -> Vec<u8> {
        let dims = sizes.split_whitespace().count();
        format!(
            "NRRD0004\n# written by a test\ntype: {kind}\ndimension: {dims}\nsizes: {sizes}\n{extra}encoding: {encoding}\n\n"
        )
        .into_bytes()
    }

    #[test]
    fn test_raw_uint8_reverses_sizes() {
        let mut bytes = header("uint8", "2 3 1", "raw", "");
        bytes.extend_from_slice(&[0, 1, 2, 3, 4, 5]);

        let grid = parse_nrrd(&bytes).unwrap();
        assert_eq!(grid.dims, vec![1, 3, 2]);
        assert_eq!(grid.values, vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0]);
    }

    #[test]
    fn test_gzip_payload() {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&[9, 8, 7, 6, 5, 4, 3, 2]).unwrap();
        let compressed = encoder.finish().unwrap();

        let mut bytes = header("uchar", "2 2 2", "gzip", "");
        bytes.extend_from_slice(&compressed);

        let grid = parse_nrrd(&bytes).unwrap();
        assert_eq!(grid.dims, vec![2, 2, 2]);
        assert_eq!(grid.values[0], 9.0);
        assert_eq!(grid.values[7], 2.0);
    }

    #[test]
    fn test_big_endian_int16() {
        let mut bytes = header("short", "2 1 1", "raw", "endian: big\n");
        bytes.extend_from_slice(&(-2i16).to_be_bytes());
        bytes.extend_from_slice(&300i16.to_be_bytes());

        let grid = parse_nrrd(&bytes).unwrap();
        assert_eq!(grid.values, vec![-2.0, 300.0]);
    }

    #[test]
    fn test_float_little_endian() {
        let mut bytes = header("float", "1 1 2", "raw", "endian: little\n");
        bytes.extend_from_slice(&0.25f32.to_le_bytes());
        bytes.extend_from_slice(&1.5f32.to_le_bytes());

        let grid = parse_nrrd(&bytes).unwrap();
        assert_eq!(grid.values, vec![0.25, 1.5]);
    }

    #[test]
    fn test_short_payload_is_error() {
        let mut bytes = header("uint8", "2 2 2", "raw", "");
        bytes.extend_from_slice(&[1, 2, 3]);
        let err = parse_nrrd(&bytes).unwrap_err();
        assert!(err.to_string().contains("expected"));
    }

    #[test]
    fn test_huge_sizes_are_error() {
        let mut bytes = header("uint8", "4294967296 4294967296 4294967296", "raw", "");
        bytes.extend_from_slice(&[0, 0]);
        let err = parse_nrrd(&bytes).unwrap_err();
        assert!(err.to_string().contains("overflow the addressable payload"));

        // cell count fits, byte count does not
        let half = (usize::MAX / 2 + 1).to_string();
        let mut bytes = header("short", &half, "raw", "");
        bytes.push(0);
        assert!(parse_nrrd(&bytes).is_err());
    }

    #[test]
    fn test_bad_magic_and_encoding() {
        assert!(parse_nrrd(b"PNG\n\n").is_err());

        let mut bytes = header("uint8", "1 1 1", "hex", "");
        bytes.push(b'0');
        assert!(parse_nrrd(&bytes).is_err());
    }

    #[test]
    fn test_read_nrrd_names_file_on_error() {
        let dir  = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.nrrd");
        std::fs::write(&path, b"NRRD0004\ntype: uint8\n").unwrap();

        let err = read_nrrd(&path).unwrap_err();
        assert!(format!("{err:#}").contains("broken.nrrd"));
    }
}
