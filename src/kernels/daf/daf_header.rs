//! DAF (Double Precision Array File) file record parsing.
//!
//! The first 1024-byte record of every DAF container (SPK, binary PCK, CK)
//! describes its structural layout. This module decodes it into [`DAFHeader`]
//! and works out the numeric byte order used by the rest of the file.
//!
//! # What the header contains
//!
//! * **`idword`**: Format identifier (e.g. `"DAF/SPK"`), eight ASCII bytes.
//! * **`nd`** / **`ni`**: Number of double-precision / integer components
//!   in each array summary. SPK files use `nd = 2`, `ni = 6`.
//! * **`fward`** / **`bward`**: Record numbers (1-based) of the first and last
//!   summary record. They define the doubly-linked list of summary records.
//! * **`free`**: First free address (1-based, in double-precision words).
//! * **`internal_filename`**: Human-readable kernel name (60 bytes, padded).
//! * **`locfmt`**: Binary format tag (`"LTL-IEEE"` or `"BIG-IEEE"`).
//!
//! # Byte order
//!
//! `locfmt` decides how every integer and double of the file is decoded.
//! Files written before the tag existed leave it blank; for those the order
//! is inferred from `nd`, which must lie in `1..=124` when read correctly.

use nom::{
    bytes::complete::take,
    number::complete::{be_f64, be_i32, le_f64, le_i32},
    IResult, Parser,
};

/// Numeric representation of a binary DAF file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    Little,
    Big,
}

impl ByteOrder {
    /// Work out the byte order of a DAF file from its first record.
    ///
    /// Arguments
    /// -----------------
    /// * `record`: The first bytes of the file, ideally the whole first record.
    ///
    /// Return
    /// ----------
    /// * The byte order announced by `locfmt`, or the one under which `nd`
    ///   decodes to a plausible summary size when `locfmt` is blank.
    pub fn detect(record: &[u8]) -> Self {
        match record.get(88..96) {
            Some(b"BIG-IEEE") => return ByteOrder::Big,
            Some(b"LTL-IEEE") => return ByteOrder::Little,
            _ => {}
        }

        let nd_le = record
            .get(8..12)
            .and_then(|bytes| bytes.try_into().ok())
            .map(i32::from_le_bytes);

        match nd_le {
            Some(nd) if (1..=124).contains(&nd) => ByteOrder::Little,
            Some(_) => ByteOrder::Big,
            None => ByteOrder::Little,
        }
    }

    pub(crate) fn i32<'a>(self, input: &'a [u8]) -> IResult<&'a [u8], i32> {
        match self {
            ByteOrder::Little => le_i32(input),
            ByteOrder::Big => be_i32(input),
        }
    }

    pub(crate) fn f64<'a>(self, input: &'a [u8]) -> IResult<&'a [u8], f64> {
        match self {
            ByteOrder::Little => le_f64(input),
            ByteOrder::Big => be_f64(input),
        }
    }

    /// Decode one double from exactly eight bytes.
    pub(crate) fn word(self, bytes: [u8; 8]) -> f64 {
        match self {
            ByteOrder::Little => f64::from_le_bytes(bytes),
            ByteOrder::Big => f64::from_be_bytes(bytes),
        }
    }
}

/// In-memory representation of the DAF file record (first 1024-byte record).
///
/// The string fields are trimmed of trailing padding.
#[derive(Debug, PartialEq, Clone)]
pub struct DAFHeader {
    /// 8-byte identifier, typically `"DAF/SPK"`.
    pub idword: String,
    /// 60-byte, padded internal kernel name.
    pub internal_filename: String,
    /// Number of double-precision components in each summary (ND).
    pub nd: i32,
    /// Number of integer components in each summary (NI).
    pub ni: i32,
    /// Record index of the first summary record (forward pointer).
    pub fward: i32,
    /// Record index of the last summary record (backward pointer).
    pub bward: i32,
    /// First free address (in double-precision words, 1-based).
    pub free: i32,
    /// Platform tag describing numeric representation (e.g. `"LTL-IEEE"`).
    pub locfmt: String,
    /// Byte order used to decode this header and the rest of the file.
    pub byte_order: ByteOrder,
}

impl DAFHeader {
    /// Parse the first 1024-byte DAF record into a [`DAFHeader`].
    ///
    /// Arguments
    /// -----------------
    /// * `input`: A byte slice starting at the beginning of the file, at least 1024 bytes long.
    ///
    /// Return
    /// ----------
    /// * An [`IResult`] whose value is a tuple `(remaining, header)`; `remaining`
    ///   starts at the second record of the file.
    pub fn parse(input: &[u8]) -> IResult<&[u8], Self> {
        let order = ByteOrder::detect(input);

        let (input, id_word) = take(8usize).parse(input)?; // "DAF/SPK "
        let (input, nd) = order.i32(input)?; // ND
        let (input, ni) = order.i32(input)?; // NI
        let (input, ifname) = take(60usize).parse(input)?; // internal file name
        let (input, fward) = order.i32(input)?; // forward ptr
        let (input, bward) = order.i32(input)?; // backward ptr
        let (input, free) = order.i32(input)?; // first free address
        let (input, locfmt) = take(8usize).parse(input)?; // location format
        let (input, _) = take(603usize).parse(input)?; // reserved
        let (input, _) = take(28usize).parse(input)?; // ftp validation string
        let (input, _) = take(297usize).parse(input)?; // reserved
        Ok((
            input,
            DAFHeader {
                idword: String::from_utf8_lossy(id_word).trim().to_string(),
                internal_filename: String::from_utf8_lossy(ifname).trim().to_string(),
                nd,
                ni,
                fward,
                bward,
                free,
                locfmt: String::from_utf8_lossy(locfmt).trim().to_string(),
                byte_order: order,
            },
        ))
    }

    /// Size of one array summary in double-precision words: `ND + ceil(NI / 2)`.
    pub fn summary_words(&self) -> usize {
        self.nd as usize + (self.ni as usize).div_ceil(2)
    }
}

#[cfg(test)]
mod test_daf_header {
    use super::*;

    fn file_record(locfmt: &[u8; 8], big_endian: bool) -> Vec<u8> {
        let int = |v: i32| {
            if big_endian {
                v.to_be_bytes()
            } else {
                v.to_le_bytes()
            }
        };
        let mut record = Vec::with_capacity(1024);
        record.extend_from_slice(b"DAF/SPK ");
        record.extend_from_slice(&int(2));
        record.extend_from_slice(&int(6));
        let mut name = [b' '; 60];
        name[..7].copy_from_slice(b"NIO2SPK");
        record.extend_from_slice(&name);
        record.extend_from_slice(&int(4));
        record.extend_from_slice(&int(4));
        record.extend_from_slice(&int(14974889));
        record.extend_from_slice(locfmt);
        record.resize(1024, 0);
        record
    }

    #[test]
    fn test_parse_little_endian_header() {
        let record = file_record(b"LTL-IEEE", false);
        let (rest, header) = DAFHeader::parse(&record).unwrap();

        assert!(rest.is_empty());
        assert_eq!(
            header,
            DAFHeader {
                idword: "DAF/SPK".to_string(),
                internal_filename: "NIO2SPK".to_string(),
                nd: 2,
                ni: 6,
                fward: 4,
                bward: 4,
                free: 14974889,
                locfmt: "LTL-IEEE".to_string(),
                byte_order: ByteOrder::Little,
            }
        );
        assert_eq!(header.summary_words(), 5);
    }

    #[test]
    fn test_parse_big_endian_header() {
        let record = file_record(b"BIG-IEEE", true);
        let (_, header) = DAFHeader::parse(&record).unwrap();

        assert_eq!(header.byte_order, ByteOrder::Big);
        assert_eq!(header.nd, 2);
        assert_eq!(header.ni, 6);
        assert_eq!(header.free, 14974889);
    }

    #[test]
    fn test_blank_locfmt_is_inferred() {
        let record = file_record(b"        ", true);
        assert_eq!(ByteOrder::detect(&record), ByteOrder::Big);

        let record = file_record(b"        ", false);
        assert_eq!(ByteOrder::detect(&record), ByteOrder::Little);
    }

    #[test]
    fn test_truncated_header_fails() {
        let record = file_record(b"LTL-IEEE", false);
        assert!(DAFHeader::parse(&record[..512]).is_err());
    }
}
