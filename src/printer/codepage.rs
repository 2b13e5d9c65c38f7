//! Text to printer bytes.
//!
//! The printer interprets bytes 0x80-0xFF according to the selected code
//! page. Encoders are looked up by the code page's name first; names the
//! encoder library does not know go through a conversion table. Characters
//! the target encoding cannot represent become `?`.

use crate::printer::{oem, CodePage};
use encoding_rs::Encoding;
use tracing::warn;

/// Anything `out` knows how to print.
#[derive(Debug, Clone, PartialEq)]
pub enum Printable {
    Text(String),
    /// Sent as is, whatever the code page
    Bytes(Vec<u8>),
    Integer(i64),
    Float(f64),
    Boolean(bool),
}

impl From<&str> for Printable {
    fn from(s: &str) -> Self {
        Printable::Text(s.to_string())
    }
}

impl From<String> for Printable {
    fn from(s: String) -> Self {
        Printable::Text(s)
    }
}

impl From<&String> for Printable {
    fn from(s: &String) -> Self {
        Printable::Text(s.clone())
    }
}

impl From<Vec<u8>> for Printable {
    fn from(b: Vec<u8>) -> Self {
        Printable::Bytes(b)
    }
}

impl From<&[u8]> for Printable {
    fn from(b: &[u8]) -> Self {
        Printable::Bytes(b.to_vec())
    }
}

impl<const N: usize> From<&[u8; N]> for Printable {
    fn from(b: &[u8; N]) -> Self {
        Printable::Bytes(b.to_vec())
    }
}

impl From<i64> for Printable {
    fn from(n: i64) -> Self {
        Printable::Integer(n)
    }
}

impl From<i32> for Printable {
    fn from(n: i32) -> Self {
        Printable::Integer(i64::from(n))
    }
}

impl From<u32> for Printable {
    fn from(n: u32) -> Self {
        Printable::Integer(i64::from(n))
    }
}

impl From<f64> for Printable {
    fn from(n: f64) -> Self {
        Printable::Float(n)
    }
}

impl From<bool> for Printable {
    fn from(b: bool) -> Self {
        Printable::Boolean(b)
    }
}

impl Printable {
    /// Text form of non-byte values
    pub(crate) fn to_text(&self) -> Option<String> {
        match self {
            Printable::Text(s) => Some(s.clone()),
            Printable::Bytes(_) => None,
            Printable::Integer(n) => Some(n.to_string()),
            // keeps the `.0` of integral values
            Printable::Float(n) => Some(format!("{:?}", n)),
            Printable::Boolean(b) => Some(if *b { "True" } else { "False" }.to_string()),
        }
    }
}

/// Converts a value to the bytes the printer expects.
///
/// Chinese mode always prints UTF-8.
pub fn encode(value: &Printable, codepage: CodePage, chinese: bool) -> Vec<u8> {
    if let Printable::Bytes(bytes) = value {
        return bytes.clone();
    }
    let text = value.to_text().unwrap_or_default();
    if chinese {
        return text.into_bytes();
    }
    encode_text(&text, codepage)
}

fn encode_text(text: &str, codepage: CodePage) -> Vec<u8> {
    match encoder_for(codepage) {
        Some(encoder) => encoder.encode(text),
        None => {
            warn!("no encoder for code page {}, printing ASCII only", codepage);
            Encoder::Ascii.encode(text)
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Encoder {
    Ascii,
    Latin1,
    /// DOS code page, upper half table
    Oem(&'static [char; 128]),
    Utf8,
    Table(&'static Encoding),
}

impl Encoder {
    fn for_label(label: &str) -> Option<Self> {
        match label.to_ascii_lowercase().as_str() {
            "iso-8859-1" => Some(Encoder::Latin1),
            "utf-8" => Some(Encoder::Utf8),
            other => oem::table(other)
                .map(Encoder::Oem)
                .or_else(|| Encoding::for_label(other.as_bytes()).map(Encoder::Table)),
        }
    }

    fn encode(self, text: &str) -> Vec<u8> {
        let mut out = Vec::with_capacity(text.len());
        let mut unmapped = 0usize;
        for ch in text.chars() {
            if ch.is_ascii() {
                out.push(ch as u8);
                continue;
            }
            let mapped = match self {
                Encoder::Ascii => None,
                Encoder::Latin1 => u8::try_from(u32::from(ch)).ok().map(|b| vec![b]),
                Encoder::Oem(table) => oem::lookup(table, ch).map(|b| vec![b]),
                Encoder::Utf8 => Some(ch.to_string().into_bytes()),
                Encoder::Table(encoding) => {
                    let mut buf = [0u8; 4];
                    let (bytes, _, had_errors) = encoding.encode(ch.encode_utf8(&mut buf));
                    (!had_errors).then(|| bytes.into_owned())
                }
            };
            match mapped {
                Some(bytes) => out.extend_from_slice(&bytes),
                None => {
                    unmapped += 1;
                    out.push(b'?');
                }
            }
        }
        if unmapped > 0 {
            warn!("{} character(s) replaced with '?'", unmapped);
        }
        out
    }
}

/// Encoding name of a code page
fn label(codepage: CodePage) -> &'static str {
    match codepage {
        CodePage::Cp437 => "CP437",
        CodePage::Cp932 => "ms932",
        CodePage::Cp850 => "CP850",
        CodePage::Cp860 => "CP860",
        CodePage::Cp863 => "CP863",
        CodePage::Cp865 => "CP865",
        CodePage::Cp1251 => "CP1251",
        CodePage::Cp866 => "CP866",
        CodePage::Mik => "MIK",
        CodePage::Cp755 => "CP755",
        CodePage::Iran => "IRAN",
        CodePage::Cp862 => "CP862",
        CodePage::Cp1252 => "CP1252",
        CodePage::Cp1253 => "CP1253",
        CodePage::Cp852 => "CP852",
        CodePage::Cp858 => "CP858",
        CodePage::Iran2 => "IRAN2",
        CodePage::Latvia => "LATVIA",
        CodePage::Cp864 => "CP864",
        CodePage::Iso8859_1 => "ISO-8859-1",
        CodePage::Cp737 => "CP737",
        CodePage::Cp1257 => "CP1257",
        CodePage::Thai => "THAI",
        CodePage::Cp720 => "CP720",
        CodePage::Cp855 => "CP855",
        CodePage::Cp857 => "CP857",
        CodePage::Cp1250 => "CP1250",
        CodePage::Cp775 => "CP775",
        CodePage::Cp1254 => "CP1254",
        CodePage::Cp1255 => "CP1255",
        CodePage::Cp1256 => "CP1256",
        CodePage::Cp1258 => "CP1258",
        CodePage::Iso8859_2 => "ISO-8859-2",
        CodePage::Iso8859_3 => "ISO-8859-3",
        CodePage::Iso8859_4 => "ISO-8859-4",
        CodePage::Iso8859_5 => "ISO-8859-5",
        CodePage::Iso8859_6 => "ISO-8859-6",
        CodePage::Iso8859_7 => "ISO-8859-7",
        CodePage::Iso8859_8 => "ISO-8859-8",
        CodePage::Iso8859_9 => "ISO-8859-9",
        CodePage::Iso8859_15 => "ISO-8859-15",
        CodePage::Thai2 => "THAI2",
        CodePage::Cp856 => "CP856",
        CodePage::Cp874 => "windows-874",
    }
}

/// Replacement encodings for code pages that have no encoder of their own
fn converted(codepage: CodePage) -> Option<&'static str> {
    match codepage {
        CodePage::Mik => Some("ISO-8859-5"),
        CodePage::Cp755 => Some("UTF-8"),
        CodePage::Iran => Some("CP1256"),
        CodePage::Iran2 => Some("UTF-8"),
        CodePage::Latvia => Some("ISO-8859-4"),
        CodePage::Thai => Some("ISO-8859-11"),
        CodePage::Thai2 => Some("UTF-8"),
        _ => None,
    }
}

fn encoder_for(codepage: CodePage) -> Option<Encoder> {
    Encoder::for_label(label(codepage)).or_else(|| converted(codepage).and_then(Encoder::for_label))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bytes_pass_through() {
        let raw = Printable::from(&[0xFFu8, 0x00, 0x80]);
        assert_eq!(encode(&raw, CodePage::Cp437, false), vec![0xFF, 0x00, 0x80]);
        assert_eq!(encode(&raw, CodePage::Cp437, true), vec![0xFF, 0x00, 0x80]);
    }

    #[test]
    fn test_numbers_are_stringified() {
        assert_eq!(encode(&42.into(), CodePage::Cp437, false), b"42".to_vec());
        assert_eq!(encode(&(-7i64).into(), CodePage::Cp437, false), b"-7".to_vec());
        assert_eq!(encode(&1.5.into(), CodePage::Cp437, false), b"1.5".to_vec());
        assert_eq!(encode(&1.0.into(), CodePage::Cp437, false), b"1.0".to_vec());
        assert_eq!(encode(&(-3.0).into(), CodePage::Cp437, false), b"-3.0".to_vec());
        assert_eq!(encode(&true.into(), CodePage::Cp437, false), b"True".to_vec());
    }

    #[test]
    fn test_cp437() {
        assert_eq!(encode(&"Ça°".into(), CodePage::Cp437, false), vec![0x80, b'a', 0xF8]);
        assert_eq!(encode(&"€".into(), CodePage::Cp437, false), b"?".to_vec());
    }

    #[test]
    fn test_chinese_mode_is_utf8() {
        assert_eq!(
            encode(&"你好".into(), CodePage::Cp437, true),
            "你好".as_bytes().to_vec()
        );
    }

    #[test]
    fn test_named_encodings() {
        assert_eq!(encode(&"é".into(), CodePage::Iso8859_1, false), vec![0xE9]);
        assert_eq!(encode(&"€".into(), CodePage::Cp1252, false), vec![0x80]);
        assert_eq!(encode(&"Ж".into(), CodePage::Cp866, false), vec![0x86]);
    }

    #[test]
    fn test_conversion_table() {
        // MIK has no encoder, ISO-8859-5 stands in
        assert_eq!(encode(&"Ж".into(), CodePage::Mik, false), vec![0xB6]);
        assert_eq!(encode(&"ā".into(), CodePage::Latvia, false), vec![0xE0]);
        assert_eq!(
            encode(&"ก".into(), CodePage::Thai2, false),
            "ก".as_bytes().to_vec()
        );
        assert_eq!(encode(&"ก".into(), CodePage::Thai, false), vec![0xA1]);
    }

    #[test]
    fn test_dos_code_pages() {
        let cases: &[(CodePage, &str, &[u8])] = &[
            (CodePage::Cp720, "ب", &[0xA0]),
            (CodePage::Cp737, "α", &[0x98]),
            (CodePage::Cp775, "ą", &[0xD0]),
            (CodePage::Cp850, "éñ", &[0x82, 0xA4]),
            (CodePage::Cp852, "ł", &[0x88]),
            (CodePage::Cp855, "Ж", &[0xEA]),
            (CodePage::Cp856, "א", &[0x80]),
            (CodePage::Cp857, "ğ", &[0xA7]),
            (CodePage::Cp858, "€", &[0xD5]),
            (CodePage::Cp860, "ã", &[0x84]),
            (CodePage::Cp862, "א", &[0x80]),
            (CodePage::Cp863, "é", &[0x82]),
            (CodePage::Cp864, "\u{FE8F}", &[0xA9]),
            (CodePage::Cp865, "ø", &[0x9B]),
        ];
        for (codepage, text, expected) in cases {
            assert_eq!(
                encode(&(*text).into(), *codepage, false),
                expected.to_vec(),
                "{} in {}",
                text,
                codepage
            );
        }
    }

    #[test]
    fn test_every_code_page_has_an_encoder() {
        for codepage in CodePage::ALL {
            assert!(encoder_for(*codepage).is_some(), "{}", codepage);
        }
    }

    #[test]
    fn test_dos_code_page_without_glyph() {
        assert_eq!(encode(&"a€".into(), CodePage::Cp850, false), b"a?".to_vec());
        assert_eq!(encode(&"é".into(), CodePage::Cp737, false), b"?".to_vec());
    }
}
