//! Exif block construction and read-back.
//!
//! The block is a big-endian TIFF structure with two IFDs: the primary image attributes (0th)
//! and the capture details (Exif). Layout rules that existing consumers depend on:
//!
//! - 0th entries are sorted by tag, then the Exif-IFD pointer is appended last.
//! - The 0th IFD carries a zero next-IFD offset; the Exif IFD carries none.
//! - Out-of-line values follow each IFD back to back with no word padding.
//! - The full metadata record is JSON, UTF-16LE encoded, in `XPComment`.

use crate::capture::metadata::CaptureMetadata;
use crate::config::SoftwareInfo;
use crate::encode::splice::{EXIF_IDENT, find_exif_segment, insert_exif_segment};
use crate::foundation::error::{FramecapError, FramecapResult};

const TIFF_HEADER_BE: [u8; 8] = [0x4D, 0x4D, 0x00, 0x2A, 0x00, 0x00, 0x00, 0x08];
const TIFF_HEADER_LEN: u32 = 8;
const ENTRY_LEN: u32 = 12;

pub(crate) const TAG_ORIENTATION: u16 = 0x0112;
pub(crate) const TAG_X_RESOLUTION: u16 = 0x011A;
pub(crate) const TAG_Y_RESOLUTION: u16 = 0x011B;
pub(crate) const TAG_RESOLUTION_UNIT: u16 = 0x0128;
pub(crate) const TAG_SOFTWARE: u16 = 0x0131;
pub(crate) const TAG_DATE_TIME: u16 = 0x0132;
pub(crate) const TAG_YCBCR_POSITIONING: u16 = 0x0213;
pub(crate) const TAG_EXIF_IFD_POINTER: u16 = 0x8769;
pub(crate) const TAG_XP_COMMENT: u16 = 0x9C9C;

pub(crate) const TAG_EXIF_VERSION: u16 = 0x9000;
pub(crate) const TAG_DATE_TIME_ORIGINAL: u16 = 0x9003;
pub(crate) const TAG_DATE_TIME_DIGITIZED: u16 = 0x9004;
pub(crate) const TAG_COMPONENTS_CONFIGURATION: u16 = 0x9101;
pub(crate) const TAG_FLASHPIX_VERSION: u16 = 0xA000;

/// TIFF field types used by the block.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u16)]
pub(crate) enum FieldType {
    Byte = 1,
    Ascii = 2,
    Short = 3,
    Long = 4,
    Rational = 5,
    Undefined = 7,
}

impl FieldType {
    fn from_u16(v: u16) -> Option<Self> {
        Some(match v {
            1 => Self::Byte,
            2 => Self::Ascii,
            3 => Self::Short,
            4 => Self::Long,
            5 => Self::Rational,
            7 => Self::Undefined,
            _ => return None,
        })
    }

    fn unit_len(self) -> u32 {
        match self {
            Self::Byte | Self::Ascii | Self::Undefined => 1,
            Self::Short => 2,
            Self::Long => 4,
            Self::Rational => 8,
        }
    }
}

/// One IFD entry with its value already serialized big-endian.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct IfdEntry {
    pub(crate) tag: u16,
    pub(crate) ty: FieldType,
    pub(crate) count: u32,
    pub(crate) value: Vec<u8>,
}

impl IfdEntry {
    fn ascii(tag: u16, s: &str) -> FramecapResult<Self> {
        if !s.is_ascii() || s.contains('\0') {
            return Err(FramecapError::metadata(format!(
                "tag 0x{tag:04X} value must be ascii without NUL"
            )));
        }
        let mut value = s.as_bytes().to_vec();
        value.push(0);
        Self::raw(tag, FieldType::Ascii, value)
    }

    fn short(tag: u16, v: u16) -> Self {
        Self {
            tag,
            ty: FieldType::Short,
            count: 1,
            value: v.to_be_bytes().to_vec(),
        }
    }

    fn long(tag: u16, v: u32) -> Self {
        Self {
            tag,
            ty: FieldType::Long,
            count: 1,
            value: v.to_be_bytes().to_vec(),
        }
    }

    fn rational(tag: u16, num: u32, den: u32) -> Self {
        let mut value = num.to_be_bytes().to_vec();
        value.extend_from_slice(&den.to_be_bytes());
        Self {
            tag,
            ty: FieldType::Rational,
            count: 1,
            value,
        }
    }

    fn raw(tag: u16, ty: FieldType, value: Vec<u8>) -> FramecapResult<Self> {
        let count = u32::try_from(value.len())
            .map_err(|_| FramecapError::metadata(format!("tag 0x{tag:04X} value too long")))?
            / ty.unit_len();
        Ok(Self {
            tag,
            ty,
            count,
            value,
        })
    }

    fn is_inline(&self) -> bool {
        self.value.len() <= 4
    }
}

/// Serialized length of an IFD: count, entries, optional next-IFD offset, out-of-line values.
fn ifd_len(entries: &[IfdEntry], with_next: bool) -> usize {
    let values: usize = entries
        .iter()
        .filter(|e| !e.is_inline())
        .map(|e| e.value.len())
        .sum();
    let next = if with_next { 4 } else { 0 };
    2 + entries.len() * ENTRY_LEN as usize + next + values
}

/// Serialize `entries` in the given order for an IFD starting at TIFF offset `start`.
fn write_ifd(
    out: &mut Vec<u8>,
    entries: &[IfdEntry],
    start: u32,
    with_next: bool,
) -> FramecapResult<()> {
    let count = u16::try_from(entries.len())
        .map_err(|_| FramecapError::metadata("too many IFD entries"))?;
    let next = if with_next { 4 } else { 0 };
    let table_len = 2 + u32::from(count) * ENTRY_LEN + next;
    let mut values = Vec::new();

    out.extend_from_slice(&count.to_be_bytes());
    for e in entries {
        out.extend_from_slice(&e.tag.to_be_bytes());
        out.extend_from_slice(&(e.ty as u16).to_be_bytes());
        out.extend_from_slice(&e.count.to_be_bytes());
        if e.is_inline() {
            let mut field = [0u8; 4];
            field[..e.value.len()].copy_from_slice(&e.value);
            out.extend_from_slice(&field);
        } else {
            let offset = u32::try_from(values.len())
                .ok()
                .and_then(|v| start.checked_add(table_len)?.checked_add(v))
                .ok_or_else(|| FramecapError::metadata("IFD value offset overflow"))?;
            out.extend_from_slice(&offset.to_be_bytes());
            values.extend_from_slice(&e.value);
        }
    }
    if with_next {
        out.extend_from_slice(&0u32.to_be_bytes());
    }
    out.extend_from_slice(&values);
    Ok(())
}

/// Encode a string as UTF-16LE without BOM or terminator.
pub(crate) fn utf16le(s: &str) -> Vec<u8> {
    s.encode_utf16().flat_map(|u| u.to_le_bytes()).collect()
}

fn primary_entries(
    metadata: &CaptureMetadata,
    software: &SoftwareInfo,
) -> FramecapResult<Vec<IfdEntry>> {
    let timestamp = metadata.exif_timestamp();
    let comment = utf16le(&metadata.to_json()?);
    let mut entries = vec![
        IfdEntry::short(TAG_ORIENTATION, 1),
        IfdEntry::rational(TAG_X_RESOLUTION, 72, 1),
        IfdEntry::rational(TAG_Y_RESOLUTION, 72, 1),
        IfdEntry::short(TAG_RESOLUTION_UNIT, 2),
        IfdEntry::ascii(TAG_SOFTWARE, &software.to_string())?,
        IfdEntry::ascii(TAG_DATE_TIME, &timestamp)?,
        IfdEntry::short(TAG_YCBCR_POSITIONING, 1),
        IfdEntry::raw(TAG_XP_COMMENT, FieldType::Byte, comment)?,
    ];
    entries.sort_by_key(|e| e.tag);
    Ok(entries)
}

fn detail_entries(metadata: &CaptureMetadata) -> FramecapResult<Vec<IfdEntry>> {
    let timestamp = metadata.exif_timestamp();
    let mut entries = vec![
        IfdEntry::raw(TAG_EXIF_VERSION, FieldType::Undefined, b"0230".to_vec())?,
        IfdEntry::ascii(TAG_DATE_TIME_ORIGINAL, &timestamp)?,
        IfdEntry::ascii(TAG_DATE_TIME_DIGITIZED, &timestamp)?,
        IfdEntry::raw(
            TAG_COMPONENTS_CONFIGURATION,
            FieldType::Undefined,
            vec![1, 2, 3, 0],
        )?,
        IfdEntry::raw(TAG_FLASHPIX_VERSION, FieldType::Undefined, b"0100".to_vec())?,
    ];
    entries.sort_by_key(|e| e.tag);
    Ok(entries)
}

/// Build the complete APP1 payload (`"Exif\0\0"` + TIFF block) for one output.
pub fn build_exif_payload(
    metadata: &CaptureMetadata,
    software: &SoftwareInfo,
) -> FramecapResult<Vec<u8>> {
    let mut zeroth = primary_entries(metadata, software)?;
    let detail = detail_entries(metadata)?;

    // The pointer is inline, so the 0th length does not depend on its value.
    zeroth.push(IfdEntry::long(TAG_EXIF_IFD_POINTER, 0));
    let zeroth_len = u32::try_from(ifd_len(&zeroth, true))
        .map_err(|_| FramecapError::metadata("0th IFD too large"))?;
    let exif_start = TIFF_HEADER_LEN + zeroth_len;
    if let Some(ptr) = zeroth.last_mut() {
        *ptr = IfdEntry::long(TAG_EXIF_IFD_POINTER, exif_start);
    }

    let mut out = Vec::with_capacity(
        EXIF_IDENT.len() + TIFF_HEADER_BE.len() + zeroth_len as usize + ifd_len(&detail, false),
    );
    out.extend_from_slice(EXIF_IDENT);
    out.extend_from_slice(&TIFF_HEADER_BE);
    write_ifd(&mut out, &zeroth, TIFF_HEADER_LEN, true)?;
    write_ifd(&mut out, &detail, exif_start, false)?;
    Ok(out)
}

/// Splice a metadata block describing `metadata` into an encoded JPEG.
#[tracing::instrument(skip(jpeg, metadata, software), fields(jpeg_len = jpeg.len()))]
pub fn embed_metadata(
    jpeg: &[u8],
    metadata: &CaptureMetadata,
    software: &SoftwareInfo,
) -> FramecapResult<Vec<u8>> {
    let payload = build_exif_payload(metadata, software)?;
    tracing::debug!(payload_len = payload.len(), "built exif payload");
    insert_exif_segment(jpeg, &payload)
}

/// Primitive fields recovered from an embedded metadata block.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExifFields {
    /// `DateTime` (0th IFD).
    pub date_time: Option<String>,
    /// `Software` (0th IFD).
    pub software: Option<String>,
    /// `DateTimeOriginal` (Exif IFD).
    pub date_time_original: Option<String>,
    /// `DateTimeDigitized` (Exif IFD).
    pub date_time_digitized: Option<String>,
    /// Raw `XPComment` bytes (UTF-16LE).
    pub xp_comment: Option<Vec<u8>>,
}

impl ExifFields {
    /// Decode `XPComment` as UTF-16LE text.
    pub fn comment_text(&self) -> FramecapResult<String> {
        let bytes = self
            .xp_comment
            .as_deref()
            .ok_or_else(|| FramecapError::metadata("XPComment is missing"))?;
        if !bytes.len().is_multiple_of(2) {
            return Err(FramecapError::metadata("XPComment has odd byte length"));
        }
        let units: Vec<u16> = bytes
            .chunks_exact(2)
            .map(|c| u16::from_le_bytes([c[0], c[1]]))
            .collect();
        String::from_utf16(&units)
            .map(|s| s.trim_end_matches('\0').to_owned())
            .map_err(|_| FramecapError::metadata("XPComment is not valid UTF-16"))
    }
}

/// TIFF reader over a borrowed block, honoring either byte order.
struct TiffReader<'a> {
    tiff: &'a [u8],
    big_endian: bool,
}

impl<'a> TiffReader<'a> {
    fn new(payload: &'a [u8]) -> FramecapResult<Self> {
        let tiff = payload
            .strip_prefix(&EXIF_IDENT[..])
            .ok_or_else(|| FramecapError::metadata("missing Exif identifier"))?;
        let big_endian = match tiff.get(0..2) {
            Some(b"MM") => true,
            Some(b"II") => false,
            _ => return Err(FramecapError::metadata("invalid TIFF byte order")),
        };
        let r = Self { tiff, big_endian };
        if r.u16_at(2)? != 42 {
            return Err(FramecapError::metadata("invalid TIFF magic"));
        }
        Ok(r)
    }

    fn bytes(&self, at: usize, len: usize) -> FramecapResult<&'a [u8]> {
        at.checked_add(len)
            .and_then(|end| self.tiff.get(at..end))
            .ok_or_else(|| FramecapError::metadata(format!("TIFF read out of bounds at {at}")))
    }

    fn u16_at(&self, at: usize) -> FramecapResult<u16> {
        let b = self.bytes(at, 2)?;
        Ok(if self.big_endian {
            u16::from_be_bytes([b[0], b[1]])
        } else {
            u16::from_le_bytes([b[0], b[1]])
        })
    }

    fn u32_at(&self, at: usize) -> FramecapResult<u32> {
        let b = self.bytes(at, 4)?;
        let arr = [b[0], b[1], b[2], b[3]];
        Ok(if self.big_endian {
            u32::from_be_bytes(arr)
        } else {
            u32::from_le_bytes(arr)
        })
    }

    fn first_ifd(&self) -> FramecapResult<usize> {
        Ok(self.u32_at(4)? as usize)
    }

    /// Visit `(tag, type, raw value bytes)` for every entry of the IFD at `start`.
    fn entries(&self, start: usize) -> FramecapResult<Vec<(u16, FieldType, &'a [u8])>> {
        let count = usize::from(self.u16_at(start)?);
        let mut out = Vec::with_capacity(count);
        for i in 0..count {
            let at = start + 2 + i * ENTRY_LEN as usize;
            let tag = self.u16_at(at)?;
            let Some(ty) = FieldType::from_u16(self.u16_at(at + 2)?) else {
                continue;
            };
            let count = self.u32_at(at + 4)? as usize;
            let len = count
                .checked_mul(ty.unit_len() as usize)
                .ok_or_else(|| FramecapError::metadata("IFD value length overflow"))?;
            let value = if len <= 4 {
                self.bytes(at + 8, len)?
            } else {
                self.bytes(self.u32_at(at + 8)? as usize, len)?
            };
            out.push((tag, ty, value));
        }
        Ok(out)
    }

    fn value_u32(&self, bytes: &[u8], ty: FieldType) -> Option<u32> {
        match ty {
            FieldType::Long if bytes.len() == 4 => Some(if self.big_endian {
                u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
            } else {
                u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
            }),
            _ => None,
        }
    }
}

fn ascii_value(bytes: &[u8]) -> String {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[..end]).into_owned()
}

/// Parse the primitive fields of an Exif APP1 payload.
pub(crate) fn parse_exif_payload(payload: &[u8]) -> FramecapResult<ExifFields> {
    let r = TiffReader::new(payload)?;
    let mut fields = ExifFields::default();
    let mut exif_ifd = None;

    for (tag, ty, value) in r.entries(r.first_ifd()?)? {
        match tag {
            TAG_DATE_TIME => fields.date_time = Some(ascii_value(value)),
            TAG_SOFTWARE => fields.software = Some(ascii_value(value)),
            TAG_XP_COMMENT => fields.xp_comment = Some(value.to_vec()),
            TAG_EXIF_IFD_POINTER => exif_ifd = r.value_u32(value, ty),
            _ => {}
        }
    }
    if let Some(start) = exif_ifd {
        for (tag, _, value) in r.entries(start as usize)? {
            match tag {
                TAG_DATE_TIME_ORIGINAL => fields.date_time_original = Some(ascii_value(value)),
                TAG_DATE_TIME_DIGITIZED => fields.date_time_digitized = Some(ascii_value(value)),
                _ => {}
            }
        }
    }
    Ok(fields)
}

/// Read the primitive metadata fields embedded in a JPEG.
pub fn read_exif_fields(jpeg: &[u8]) -> FramecapResult<ExifFields> {
    parse_exif_payload(find_exif_segment(jpeg)?)
}

/// Recover the structured capture record embedded in a JPEG.
pub fn read_metadata(jpeg: &[u8]) -> FramecapResult<CaptureMetadata> {
    CaptureMetadata::from_json(&read_exif_fields(jpeg)?.comment_text()?)
}

#[cfg(test)]
#[path = "../../tests/unit/encode/exif.rs"]
mod tests;
