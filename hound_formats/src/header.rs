//! Fixed 64-byte header at the start of a build record (`fromsoftware.txt`).
//!
//! Layout, all 16-bit fields big-endian:
//!
//! | bytes    | field                                  |
//! |----------|----------------------------------------|
//! | 0..8     | unknown                                |
//! | 8..10    | year                                   |
//! | 10..12   | month                                  |
//! | 12..14   | unused (possibly day of week)          |
//! | 14..16   | day                                    |
//! | 16..22   | hour, minute, second                   |
//! | 22..24   | unknown                                |
//! | 24..54   | build name, 15 UTF-16BE code units     |
//! | 54..62   | unknown                                |
//! | 62..64   | image header offset                    |
//!
//! The skipped pair at 12..14 is kept as-is; nothing observed so far maps it
//! to a calendar field.

use byteorder::{BigEndian, ByteOrder};
use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::error::ThumbnailError;

pub const HEADER_LEN: usize = 64;
pub const BUILD_NAME_UNITS: usize = 15;

const YEAR: usize = 8;
const MONTH: usize = 10;
const DAY: usize = 14;
const HOUR: usize = 16;
const MINUTE: usize = 18;
const SECOND: usize = 20;
const NAME: usize = 24;
const IMAGE_HEADER_OFFSET: usize = 62;

/// Raw timestamp fields exactly as stored in the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BuildTimestamp {
    pub year: u16,
    pub month: u16,
    pub day: u16,
    pub hour: u16,
    pub minute: u16,
    pub second: u16,
}

/// Build timestamps outside these years are invalid.
const VALID_YEARS: std::ops::RangeInclusive<u16> = 1..=9999;

impl BuildTimestamp {
    pub fn to_datetime(self) -> Result<NaiveDateTime, ThumbnailError> {
        Some(self.year)
            .filter(|year| VALID_YEARS.contains(year))
            .and_then(|year| {
                NaiveDate::from_ymd_opt(year.into(), self.month.into(), self.day.into())
            })
            .and_then(|date| {
                date.and_hms_opt(self.hour.into(), self.minute.into(), self.second.into())
            })
            .ok_or(ThumbnailError::InvalidTimestamp {
                year: self.year,
                month: self.month,
                day: self.day,
                hour: self.hour,
                minute: self.minute,
                second: self.second,
            })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildHeader {
    pub name: String,
    pub timestamp: BuildTimestamp,
    pub built_at: NaiveDateTime,
    pub image_header_offset: u16,
}

impl BuildHeader {
    /// Byte position of the first DXT1 block within the record file.
    pub fn payload_start(&self) -> u64 {
        payload_start(self.image_header_offset)
    }
}

/// Image header offset plus the 16-byte preamble that precedes the blocks.
pub fn payload_start(image_header_offset: u16) -> u64 {
    u64::from(image_header_offset) + crate::PAYLOAD_PREAMBLE_LEN as u64
}

/// Parse the header window at the start of `bytes`; trailing bytes are ignored.
pub fn parse_header(bytes: &[u8]) -> Result<BuildHeader, ThumbnailError> {
    let window = header_window(bytes)?;
    let timestamp = read_timestamp(window);
    let built_at = timestamp.to_datetime()?;

    Ok(BuildHeader {
        name: read_name(window),
        timestamp,
        built_at,
        image_header_offset: BigEndian::read_u16(&window[IMAGE_HEADER_OFFSET..]),
    })
}

/// Read only the image header offset, without validating the timestamp.
pub fn peek_image_header_offset(bytes: &[u8]) -> Result<u16, ThumbnailError> {
    let window = header_window(bytes)?;
    Ok(BigEndian::read_u16(&window[IMAGE_HEADER_OFFSET..]))
}

fn header_window(bytes: &[u8]) -> Result<&[u8], ThumbnailError> {
    bytes
        .get(..HEADER_LEN)
        .ok_or(ThumbnailError::TruncatedHeader {
            actual: bytes.len(),
        })
}

fn read_timestamp(window: &[u8]) -> BuildTimestamp {
    let field = |at: usize| BigEndian::read_u16(&window[at..at + 2]);
    BuildTimestamp {
        year: field(YEAR),
        month: field(MONTH),
        day: field(DAY),
        hour: field(HOUR),
        minute: field(MINUTE),
        second: field(SECOND),
    }
}

fn read_name(window: &[u8]) -> String {
    let mut units = [0u16; BUILD_NAME_UNITS];
    BigEndian::read_u16_into(&window[NAME..NAME + BUILD_NAME_UNITS * 2], &mut units);
    String::from_utf16_lossy(&units)
        .trim_end_matches('\0')
        .to_string()
}

#[cfg(test)]
pub(crate) fn synthetic_header(
    name: &str,
    timestamp: BuildTimestamp,
    image_header_offset: u16,
) -> [u8; HEADER_LEN] {
    let mut header = [0u8; HEADER_LEN];
    // Noise in the unknown regions must not leak into parsed fields.
    header[0..8].copy_from_slice(b"HOUNDHDR");
    header[12..14].copy_from_slice(&[0xAB, 0xCD]);
    header[54..62].fill(0xEE);

    BigEndian::write_u16(&mut header[YEAR..], timestamp.year);
    BigEndian::write_u16(&mut header[MONTH..], timestamp.month);
    BigEndian::write_u16(&mut header[DAY..], timestamp.day);
    BigEndian::write_u16(&mut header[HOUR..], timestamp.hour);
    BigEndian::write_u16(&mut header[MINUTE..], timestamp.minute);
    BigEndian::write_u16(&mut header[SECOND..], timestamp.second);

    for (index, unit) in name.encode_utf16().take(BUILD_NAME_UNITS).enumerate() {
        BigEndian::write_u16(&mut header[NAME + index * 2..], unit);
    }
    BigEndian::write_u16(&mut header[IMAGE_HEADER_OFFSET..], image_header_offset);
    header
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    fn stamp([year, month, day, hour, minute, second]: [u16; 6]) -> BuildTimestamp {
        BuildTimestamp {
            year,
            month,
            day,
            hour,
            minute,
            second,
        }
    }

    #[test]
    fn recovers_synthetic_header_fields() {
        let bytes = synthetic_header("TESTBUILD", stamp([2024, 1, 2, 3, 4, 5]), 0x1234);
        let header = parse_header(&bytes).expect("header parses");

        assert_eq!(header.name, "TESTBUILD");
        assert_eq!(header.timestamp, stamp([2024, 1, 2, 3, 4, 5]));
        assert_eq!(header.image_header_offset, 0x1234);
        assert_eq!(header.payload_start(), 0x1234 + 16);

        let built = header.built_at;
        assert_eq!((built.year(), built.month(), built.day()), (2024, 1, 2));
        assert_eq!((built.hour(), built.minute(), built.second()), (3, 4, 5));
    }

    #[test]
    fn full_length_name_keeps_all_units() {
        let bytes = synthetic_header("FIFTEEN_CHARS__", stamp([2008, 6, 30, 23, 59, 59]), 0);
        let header = parse_header(&bytes).unwrap();
        assert_eq!(header.name, "FIFTEEN_CHARS__");
    }

    #[test]
    fn non_ascii_name_decodes_as_utf16() {
        let bytes = synthetic_header("ハウンド", stamp([2006, 3, 9, 12, 0, 0]), 0);
        let header = parse_header(&bytes).unwrap();
        assert_eq!(header.name, "ハウンド");
    }

    #[test]
    fn skipped_pair_between_month_and_day_is_ignored() {
        let mut bytes = synthetic_header("X", stamp([2024, 2, 29, 0, 0, 0]), 0);
        bytes[12] = 0xFF;
        bytes[13] = 0xFF;
        let header = parse_header(&bytes).unwrap();
        assert_eq!(header.timestamp.day, 29);
    }

    #[test]
    fn rejects_short_input() {
        let bytes = [0u8; HEADER_LEN - 1];
        match parse_header(&bytes) {
            Err(ThumbnailError::TruncatedHeader { actual }) => assert_eq!(actual, HEADER_LEN - 1),
            other => panic!("expected truncated header, got {other:?}"),
        }
    }

    #[test]
    fn rejects_month_zero() {
        let bytes = synthetic_header("BAD", stamp([2024, 0, 1, 0, 0, 0]), 0);
        assert!(matches!(
            parse_header(&bytes),
            Err(ThumbnailError::InvalidTimestamp { month: 0, .. })
        ));
    }

    #[test]
    fn rejects_out_of_range_clock() {
        let bytes = synthetic_header("BAD", stamp([2024, 1, 1, 24, 0, 0]), 0);
        assert!(matches!(
            parse_header(&bytes),
            Err(ThumbnailError::InvalidTimestamp { hour: 24, .. })
        ));
    }

    #[test]
    fn rejects_years_outside_calendar_range() {
        for year in [0, 10000, u16::MAX] {
            let bytes = synthetic_header("BAD", stamp([year, 1, 1, 0, 0, 0]), 0);
            match parse_header(&bytes) {
                Err(ThumbnailError::InvalidTimestamp { year: got, .. }) => assert_eq!(got, year),
                other => panic!("year {year}: expected invalid timestamp, got {other:?}"),
            }
        }

        let edges = [stamp([1, 1, 1, 0, 0, 0]), stamp([9999, 12, 31, 23, 59, 59])];
        for timestamp in edges {
            assert!(timestamp.to_datetime().is_ok(), "{timestamp:?}");
        }
    }

    #[test]
    fn offset_is_readable_despite_bad_timestamp() {
        let bytes = synthetic_header("BAD", stamp([0, 0, 0, 0, 0, 0]), 0x0200);
        assert_eq!(peek_image_header_offset(&bytes).unwrap(), 0x0200);
    }
}
