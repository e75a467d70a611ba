use log::warn;
use serde::{Serialize, Deserialize};
use serde::de::DeserializeOwned;
use crate::core::error::{Error, ErrorKind, Result};

/// Header: crc32 (4 bytes LE) + compression tag (1 byte).
const HEADER_LEN: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompressionType {
    None,
    Lz4,      // Fast compression, ratio 2-3x on postings
}

impl CompressionType {
    fn tag(self) -> u8 {
        match self {
            CompressionType::None => 0,
            CompressionType::Lz4 => 1,
        }
    }

    fn from_tag(tag: u8) -> Result<Self> {
        match tag {
            0 => Ok(CompressionType::None),
            1 => Ok(CompressionType::Lz4),
            other => Err(Error::new(ErrorKind::Serialization, format!("Unknown compression tag {}", other))),
        }
    }
}

/// Compressed block storage for general purpose data
pub struct CompressedBlock {
    pub data: Vec<u8>,
    pub compression: CompressionType,
}

impl CompressedBlock {
    pub fn compress(data: &[u8], compression: CompressionType) -> Self {
        let data = match compression {
            CompressionType::None => data.to_vec(),
            CompressionType::Lz4 => lz4_flex::compress_prepend_size(data),
        };

        CompressedBlock { data, compression }
    }

    pub fn decompress(&self) -> Result<Vec<u8>> {
        match self.compression {
            CompressionType::None => Ok(self.data.clone()),
            CompressionType::Lz4 => lz4_flex::decompress_size_prepended(&self.data)
                .map_err(|e| Error::new(ErrorKind::Serialization, e.to_string())),
        }
    }
}

/// Serializes `value` with bincode into a checksummed frame.
pub fn encode<T: Serialize>(value: &T, compression: CompressionType) -> Result<Vec<u8>> {
    let payload = bincode::serialize(value)?;
    let block = CompressedBlock::compress(&payload, compression);
    let checksum = crc32fast::hash(&block.data);

    let mut frame = Vec::with_capacity(HEADER_LEN + block.data.len());
    frame.extend_from_slice(&checksum.to_le_bytes());
    frame.push(block.compression.tag());
    frame.extend_from_slice(&block.data);
    Ok(frame)
}

pub fn decode<T: DeserializeOwned>(frame: &[u8]) -> Result<T> {
    if frame.len() < HEADER_LEN {
        return Err(Error::new(ErrorKind::Serialization, "Truncated frame"));
    }

    let expected = u32::from_le_bytes([frame[0], frame[1], frame[2], frame[3]]);
    let compression = CompressionType::from_tag(frame[4])?;
    let data = &frame[HEADER_LEN..];

    let actual = crc32fast::hash(data);
    if actual != expected {
        warn!("Checksum mismatch: expected {:08x}, found {:08x}", expected, actual);
        return Err(Error::new(ErrorKind::Serialization, "Checksum mismatch"));
    }

    let block = CompressedBlock { data: data.to_vec(), compression };
    let payload = block.decompress()?;
    Ok(bincode::deserialize(&payload)?)
}
