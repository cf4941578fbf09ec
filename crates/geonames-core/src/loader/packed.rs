// crates/geonames-core/src/loader/packed.rs

//! # Packed Columns
//!
//! Decoding of the fixed-stride and NUL-delimited column layouts. Records are
//! stored without padding in native byte order, exactly as the dataset tools
//! wrote them on the target device.

use super::ColumnKind;
use crate::error::{GeoError, Result};
use crate::model::{CityData, RegionDesc};

/// A fixed-size record that can live in a packed column.
pub trait Packed: Sized + Copy {
    const STRIDE: usize;

    /// Decodes one record. `bytes` is exactly `STRIDE` long.
    fn decode(bytes: &[u8]) -> Self;

    fn encode(&self, out: &mut Vec<u8>);
}

fn ne_u32(b: &[u8]) -> u32 {
    u32::from_ne_bytes([b[0], b[1], b[2], b[3]])
}

fn ne_i16(b: &[u8]) -> i16 {
    i16::from_ne_bytes([b[0], b[1]])
}

impl Packed for u32 {
    const STRIDE: usize = 4;

    fn decode(bytes: &[u8]) -> Self {
        ne_u32(bytes)
    }

    fn encode(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.to_ne_bytes());
    }
}

impl Packed for i32 {
    const STRIDE: usize = 4;

    fn decode(bytes: &[u8]) -> Self {
        i32::from_ne_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
    }

    fn encode(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.to_ne_bytes());
    }
}

impl Packed for i16 {
    const STRIDE: usize = 2;

    fn decode(bytes: &[u8]) -> Self {
        ne_i16(bytes)
    }

    fn encode(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.to_ne_bytes());
    }
}

impl Packed for CityData {
    const STRIDE: usize = 12;

    fn decode(bytes: &[u8]) -> Self {
        CityData {
            population: ne_u32(&bytes[0..4]),
            latitude: f32::from_bits(ne_u32(&bytes[4..8])),
            longitude: f32::from_bits(ne_u32(&bytes[8..12])),
        }
    }

    fn encode(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.population.to_ne_bytes());
        out.extend_from_slice(&self.latitude.to_ne_bytes());
        out.extend_from_slice(&self.longitude.to_ne_bytes());
    }
}

impl Packed for RegionDesc {
    const STRIDE: usize = 6;

    fn decode(bytes: &[u8]) -> Self {
        RegionDesc {
            country: ne_i16(&bytes[0..2]),
            admin1: ne_i16(&bytes[2..4]),
            admin2: ne_i16(&bytes[4..6]),
        }
    }

    fn encode(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.country.to_ne_bytes());
        out.extend_from_slice(&self.admin1.to_ne_bytes());
        out.extend_from_slice(&self.admin2.to_ne_bytes());
    }
}

/// A decoded fixed-stride column plus the byte count it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct PackedArray<T> {
    pub items: Vec<T>,
    pub byte_count: usize,
}

impl<T: Packed> PackedArray<T> {
    pub fn decode(kind: ColumnKind, bytes: &[u8]) -> Result<Self> {
        Ok(Self {
            items: decode_packed(kind, bytes)?,
            byte_count: bytes.len(),
        })
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }
}

pub fn decode_packed<T: Packed>(kind: ColumnKind, bytes: &[u8]) -> Result<Vec<T>> {
    if bytes.len() % T::STRIDE != 0 {
        return Err(GeoError::Stride {
            column: kind,
            bytes: bytes.len(),
            stride: T::STRIDE,
        });
    }
    Ok(bytes.chunks_exact(T::STRIDE).map(T::decode).collect())
}

pub fn encode_packed<T: Packed>(items: &[T]) -> Vec<u8> {
    let mut out = Vec::with_capacity(items.len() * T::STRIDE);
    for item in items {
        item.encode(&mut out);
    }
    out
}

/// Two-letter country code stored in the bytes of an `i16`.
pub fn code_from_packed(value: i16) -> String {
    value
        .to_ne_bytes()
        .iter()
        .filter(|b| **b != 0)
        .map(|b| *b as char)
        .collect()
}

pub fn code_to_packed(code: &str) -> i16 {
    let b = code.as_bytes();
    let first = b.first().copied().unwrap_or(0);
    let second = b.get(1).copied().unwrap_or(0);
    i16::from_ne_bytes([first, second])
}

/// Version fingerprint: a lone native-order `u32`.
pub fn read_checksum(bytes: &[u8]) -> Result<u32> {
    if bytes.len() != u32::STRIDE {
        return Err(GeoError::InvalidData(format!(
            "checksum column holds {} bytes, expected {}",
            bytes.len(),
            u32::STRIDE
        )));
    }
    Ok(ne_u32(bytes))
}

// -----------------------------------------------------------------------------
// STRING COLUMNS
// -----------------------------------------------------------------------------

/// NUL-delimited strings addressed by position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StringTable {
    entries: Vec<String>,
}

impl StringTable {
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let body = bytes.strip_suffix(&[0]).unwrap_or(bytes);
        if body.is_empty() {
            return Self::default();
        }
        let entries = body
            .split(|b| *b == 0)
            .map(|s| String::from_utf8_lossy(s).into_owned())
            .collect();
        Self { entries }
    }

    pub fn encode<S: AsRef<str>>(strings: &[S]) -> Vec<u8> {
        let mut out = Vec::new();
        for s in strings {
            out.extend_from_slice(s.as_ref().as_bytes());
            out.push(0);
        }
        out
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.entries.get(index).map(String::as_str)
    }

    pub fn position(&self, value: &str) -> Option<usize> {
        self.entries.iter().position(|e| e == value)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }
}

/// The shared compound-name blob, addressed by byte offsets from the
/// name-index column.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameBlob {
    bytes: Vec<u8>,
}

impl NameBlob {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    pub fn byte_count(&self) -> usize {
        self.bytes.len()
    }

    /// Raw bytes of the name starting at `offset`, up to (not including) the
    /// next NUL or the end of the blob.
    pub fn bytes_at(&self, offset: i32) -> Option<&[u8]> {
        let start = usize::try_from(offset).ok()?;
        let tail = self.bytes.get(start..)?;
        let end = tail.iter().position(|b| *b == 0).unwrap_or(tail.len());
        Some(&tail[..end])
    }

    pub fn name_at(&self, offset: i32) -> Result<&str> {
        let bytes = self.bytes_at(offset).ok_or(GeoError::TableIndexOutOfRange {
            table: "name blob",
            index: i64::from(offset),
            count: self.bytes.len(),
        })?;
        std::str::from_utf8(bytes)
            .map_err(|e| GeoError::InvalidData(format!("name at offset {offset}: {e}")))
    }
}
