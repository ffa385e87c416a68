use crate::foundation::error::{FramecapError, FramecapResult};

pub(crate) const MARKER_PREFIX: u8 = 0xFF;
pub(crate) const SOI: u8 = 0xD8;
pub(crate) const EOI: u8 = 0xD9;
pub(crate) const SOS: u8 = 0xDA;
pub(crate) const APP0: u8 = 0xE0;
pub(crate) const APP1: u8 = 0xE1;

/// Identifier that opens an Exif APP1 payload.
pub(crate) const EXIF_IDENT: &[u8; 6] = b"Exif\0\0";

/// Largest payload a single marker segment can carry (the length field counts itself).
pub(crate) const MAX_SEGMENT_PAYLOAD: usize = 0xFFFF - 2;

/// A marker segment located in the header section of a JPEG stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Segment {
    pub(crate) marker: u8,
    /// Offset of the `0xFF` that starts the marker.
    pub(crate) start: usize,
    /// Offset one past the last payload byte.
    pub(crate) end: usize,
    /// Offset of the first payload byte (after the length field, when present).
    pub(crate) payload_start: usize,
}

impl Segment {
    pub(crate) fn payload<'a>(&self, jpeg: &'a [u8]) -> &'a [u8] {
        &jpeg[self.payload_start..self.end]
    }

    fn is_exif(&self, jpeg: &[u8]) -> bool {
        self.marker == APP1 && self.payload(jpeg).starts_with(EXIF_IDENT)
    }
}

/// Header segments between SOI and SOS, plus the offset of the SOS marker.
#[derive(Clone, Debug)]
pub(crate) struct HeaderLayout {
    pub(crate) segments: Vec<Segment>,
    pub(crate) scan_start: usize,
}

/// Walk the marker segments of `jpeg` up to the first start-of-scan.
///
/// The entropy-coded data after SOS is never inspected.
pub(crate) fn scan_header(jpeg: &[u8]) -> FramecapResult<HeaderLayout> {
    if jpeg.len() < 4 || jpeg[0] != MARKER_PREFIX || jpeg[1] != SOI {
        return Err(FramecapError::metadata(
            "compressed stream does not start with SOI",
        ));
    }

    let mut segments = Vec::new();
    let mut pos = 2usize;
    loop {
        if pos >= jpeg.len() || jpeg[pos] != MARKER_PREFIX {
            return Err(FramecapError::metadata(format!(
                "expected marker at offset {pos}"
            )));
        }
        let start = pos;
        // Fill bytes: any number of 0xFF may precede a marker code.
        while pos < jpeg.len() && jpeg[pos] == MARKER_PREFIX {
            pos += 1;
        }
        let Some(&marker) = jpeg.get(pos) else {
            return Err(FramecapError::metadata("truncated marker"));
        };
        pos += 1;

        match marker {
            SOS => {
                return Ok(HeaderLayout {
                    segments,
                    scan_start: start,
                });
            }
            EOI => {
                return Err(FramecapError::metadata(
                    "end of image reached before start of scan",
                ));
            }
            0x01 | 0xD0..=0xD7 => {
                segments.push(Segment {
                    marker,
                    start,
                    end: pos,
                    payload_start: pos,
                });
            }
            _ => {
                let len_bytes = jpeg
                    .get(pos..pos + 2)
                    .ok_or_else(|| FramecapError::metadata("truncated segment length"))?;
                let len = usize::from(u16::from_be_bytes([len_bytes[0], len_bytes[1]]));
                if len < 2 {
                    return Err(FramecapError::metadata(format!(
                        "segment 0xFF{marker:02X} has invalid length {len}"
                    )));
                }
                let end = pos + len;
                if end > jpeg.len() {
                    return Err(FramecapError::metadata(format!(
                        "segment 0xFF{marker:02X} overruns the stream"
                    )));
                }
                segments.push(Segment {
                    marker,
                    start,
                    end,
                    payload_start: pos + 2,
                });
                pos = end;
            }
        }
    }
}

/// Replace any Exif APP1 segments of `jpeg` with one carrying `payload`.
///
/// The new segment goes right after a leading APP0 (JFIF) segment, otherwise right after SOI.
/// Every other byte, the scan data included, is copied unchanged.
pub(crate) fn insert_exif_segment(jpeg: &[u8], payload: &[u8]) -> FramecapResult<Vec<u8>> {
    if !payload.starts_with(EXIF_IDENT) {
        return Err(FramecapError::metadata(
            "APP1 payload must start with the Exif identifier",
        ));
    }
    if payload.len() > MAX_SEGMENT_PAYLOAD {
        return Err(FramecapError::metadata(format!(
            "Exif payload is {} bytes, segment limit is {MAX_SEGMENT_PAYLOAD}",
            payload.len()
        )));
    }

    let header = scan_header(jpeg)?;
    let mut app1 = Vec::with_capacity(payload.len() + 4);
    app1.extend_from_slice(&[MARKER_PREFIX, APP1]);
    app1.extend_from_slice(&((payload.len() + 2) as u16).to_be_bytes());
    app1.extend_from_slice(payload);

    let insert_after_app0 = header
        .segments
        .first()
        .is_some_and(|s| s.marker == APP0);

    let mut out = Vec::with_capacity(jpeg.len() + app1.len());
    out.extend_from_slice(&[MARKER_PREFIX, SOI]);
    if !insert_after_app0 {
        out.extend_from_slice(&app1);
    }
    for (i, seg) in header.segments.iter().enumerate() {
        if seg.is_exif(jpeg) {
            continue;
        }
        out.extend_from_slice(&jpeg[seg.start..seg.end]);
        if i == 0 && insert_after_app0 {
            out.extend_from_slice(&app1);
        }
    }
    out.extend_from_slice(&jpeg[header.scan_start..]);
    Ok(out)
}

/// Borrow the payload of the first Exif APP1 segment.
pub(crate) fn find_exif_segment(jpeg: &[u8]) -> FramecapResult<&[u8]> {
    let header = scan_header(jpeg)?;
    header
        .segments
        .iter()
        .find(|s| s.is_exif(jpeg))
        .map(|s| s.payload(jpeg))
        .ok_or_else(|| FramecapError::metadata("no Exif APP1 segment found"))
}

#[cfg(test)]
#[path = "../../tests/unit/encode/splice.rs"]
mod tests;
