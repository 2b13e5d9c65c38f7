//! Persian text for the `IRAN` code page.
//!
//! The printer does no shaping and prints left to right, so the driver joins
//! the letters into their contextual forms, puts the line in visual order and
//! maps the result onto the Iran System code page.

use ar_reshaper::{ArabicReshaper, ReshaperConfig};
use unicode_bidi::BidiInfo;

/// Shapes `text` and returns it in visual (left to right) order.
pub fn reshape(text: &str) -> String {
    let reshaper = ArabicReshaper::new(ReshaperConfig::default());
    let shaped = reshaper.reshape(text);

    let info = BidiInfo::new(&shaped, None);
    let mut out = String::with_capacity(shaped.len());
    for para in &info.paragraphs {
        let line = para.range.clone();
        out.push_str(&info.reorder_line(para, line));
    }
    out
}

/// Encodes visually ordered text with the Iran System code page.
///
/// ASCII is kept, anything without a glyph becomes `?`.
pub fn encode_iran_system(text: &str) -> Vec<u8> {
    text.chars()
        .map(|ch| {
            if ch.is_ascii() {
                ch as u8
            } else {
                iran_system_byte(ch).unwrap_or(b'?')
            }
        })
        .collect()
}

fn iran_system_byte(ch: char) -> Option<u8> {
    IRAN_SYSTEM
        .iter()
        .find(|(c, _)| *c == ch)
        .map(|(_, byte)| *byte)
}

/// Iran System has one byte per letter for the isolated/final shapes and one
/// for the initial/medial shapes, so several presentation forms share a byte.
const IRAN_SYSTEM: &[(char, u8)] = &[
    // digits and punctuation
    ('۰', 0x80),
    ('۱', 0x81),
    ('۲', 0x82),
    ('۳', 0x83),
    ('۴', 0x84),
    ('۵', 0x85),
    ('۶', 0x86),
    ('۷', 0x87),
    ('۸', 0x88),
    ('۹', 0x89),
    ('٠', 0x80),
    ('١', 0x81),
    ('٢', 0x82),
    ('٣', 0x83),
    ('٤', 0x84),
    ('٥', 0x85),
    ('٦', 0x86),
    ('٧', 0x87),
    ('٨', 0x88),
    ('٩', 0x89),
    ('،', 0x8A),
    ('ـ', 0x8B),
    ('؟', 0x8C),
    // alef madda
    ('\u{0622}', 0x8D),
    ('\u{FE81}', 0x8D),
    ('\u{FE82}', 0x8D),
    // yeh with hamza
    ('\u{0626}', 0x8E),
    ('\u{FE89}', 0x8E),
    ('\u{FE8A}', 0x8E),
    ('\u{FE8B}', 0x8E),
    ('\u{FE8C}', 0x8E),
    // hamza
    ('\u{0621}', 0x8F),
    ('\u{FE80}', 0x8F),
    // alef
    ('\u{0627}', 0x90),
    ('\u{FE8D}', 0x90),
    ('\u{FE8E}', 0x91),
    // beh
    ('\u{0628}', 0x92),
    ('\u{FE8F}', 0x92),
    ('\u{FE90}', 0x92),
    ('\u{FE91}', 0x93),
    ('\u{FE92}', 0x93),
    // peh
    ('\u{067E}', 0x94),
    ('\u{FB56}', 0x94),
    ('\u{FB57}', 0x94),
    ('\u{FB58}', 0x95),
    ('\u{FB59}', 0x95),
    // teh
    ('\u{062A}', 0x96),
    ('\u{FE95}', 0x96),
    ('\u{FE96}', 0x96),
    ('\u{FE97}', 0x97),
    ('\u{FE98}', 0x97),
    // theh
    ('\u{062B}', 0x98),
    ('\u{FE99}', 0x98),
    ('\u{FE9A}', 0x98),
    ('\u{FE9B}', 0x99),
    ('\u{FE9C}', 0x99),
    // jeem
    ('\u{062C}', 0x9A),
    ('\u{FE9D}', 0x9A),
    ('\u{FE9E}', 0x9A),
    ('\u{FE9F}', 0x9B),
    ('\u{FEA0}', 0x9B),
    // tcheh
    ('\u{0686}', 0x9C),
    ('\u{FB7A}', 0x9C),
    ('\u{FB7B}', 0x9C),
    ('\u{FB7C}', 0x9D),
    ('\u{FB7D}', 0x9D),
    // hah
    ('\u{062D}', 0x9E),
    ('\u{FEA1}', 0x9E),
    ('\u{FEA2}', 0x9E),
    ('\u{FEA3}', 0x9F),
    ('\u{FEA4}', 0x9F),
    // khah
    ('\u{062E}', 0xA0),
    ('\u{FEA5}', 0xA0),
    ('\u{FEA6}', 0xA0),
    ('\u{FEA7}', 0xA1),
    ('\u{FEA8}', 0xA1),
    // dal, thal, reh, zain, jeh
    ('\u{062F}', 0xA2),
    ('\u{FEA9}', 0xA2),
    ('\u{FEAA}', 0xA2),
    ('\u{0630}', 0xA3),
    ('\u{FEAB}', 0xA3),
    ('\u{FEAC}', 0xA3),
    ('\u{0631}', 0xA4),
    ('\u{FEAD}', 0xA4),
    ('\u{FEAE}', 0xA4),
    ('\u{0632}', 0xA5),
    ('\u{FEAF}', 0xA5),
    ('\u{FEB0}', 0xA5),
    ('\u{0698}', 0xA6),
    ('\u{FB8A}', 0xA6),
    ('\u{FB8B}', 0xA6),
    // seen
    ('\u{0633}', 0xA7),
    ('\u{FEB1}', 0xA7),
    ('\u{FEB2}', 0xA7),
    ('\u{FEB3}', 0xA8),
    ('\u{FEB4}', 0xA8),
    // sheen
    ('\u{0634}', 0xA9),
    ('\u{FEB5}', 0xA9),
    ('\u{FEB6}', 0xA9),
    ('\u{FEB7}', 0xAA),
    ('\u{FEB8}', 0xAA),
    // sad
    ('\u{0635}', 0xAB),
    ('\u{FEB9}', 0xAB),
    ('\u{FEBA}', 0xAB),
    ('\u{FEBB}', 0xAC),
    ('\u{FEBC}', 0xAC),
    // dad
    ('\u{0636}', 0xAD),
    ('\u{FEBD}', 0xAD),
    ('\u{FEBE}', 0xAD),
    ('\u{FEBF}', 0xAE),
    ('\u{FEC0}', 0xAE),
    // tah
    ('\u{0637}', 0xAF),
    ('\u{FEC1}', 0xAF),
    ('\u{FEC2}', 0xAF),
    ('\u{FEC3}', 0xAF),
    ('\u{FEC4}', 0xAF),
    // zah
    ('\u{0638}', 0xE0),
    ('\u{FEC5}', 0xE0),
    ('\u{FEC6}', 0xE0),
    ('\u{FEC7}', 0xE0),
    ('\u{FEC8}', 0xE0),
    // ain
    ('\u{0639}', 0xE1),
    ('\u{FEC9}', 0xE1),
    ('\u{FECA}', 0xE2),
    ('\u{FECC}', 0xE3),
    ('\u{FECB}', 0xE4),
    // ghain
    ('\u{063A}', 0xE5),
    ('\u{FECD}', 0xE5),
    ('\u{FECE}', 0xE6),
    ('\u{FED0}', 0xE7),
    ('\u{FECF}', 0xE8),
    // feh
    ('\u{0641}', 0xE9),
    ('\u{FED1}', 0xE9),
    ('\u{FED2}', 0xE9),
    ('\u{FED3}', 0xEA),
    ('\u{FED4}', 0xEA),
    // qaf
    ('\u{0642}', 0xEB),
    ('\u{FED5}', 0xEB),
    ('\u{FED6}', 0xEB),
    ('\u{FED7}', 0xEC),
    ('\u{FED8}', 0xEC),
    // keheh and arabic kaf
    ('\u{06A9}', 0xED),
    ('\u{0643}', 0xED),
    ('\u{FB8E}', 0xED),
    ('\u{FB8F}', 0xED),
    ('\u{FED9}', 0xED),
    ('\u{FEDA}', 0xED),
    ('\u{FB90}', 0xEE),
    ('\u{FB91}', 0xEE),
    ('\u{FEDB}', 0xEE),
    ('\u{FEDC}', 0xEE),
    // gaf
    ('\u{06AF}', 0xEF),
    ('\u{FB92}', 0xEF),
    ('\u{FB93}', 0xEF),
    ('\u{FB94}', 0xF0),
    ('\u{FB95}', 0xF0),
    // lam, lam-alef
    ('\u{0644}', 0xF1),
    ('\u{FEDD}', 0xF1),
    ('\u{FEDE}', 0xF1),
    ('\u{FEFB}', 0xF2),
    ('\u{FEFC}', 0xF2),
    ('\u{FEDF}', 0xF3),
    ('\u{FEE0}', 0xF3),
    // meem
    ('\u{0645}', 0xF4),
    ('\u{FEE1}', 0xF4),
    ('\u{FEE2}', 0xF4),
    ('\u{FEE3}', 0xF5),
    ('\u{FEE4}', 0xF5),
    // noon
    ('\u{0646}', 0xF6),
    ('\u{FEE5}', 0xF6),
    ('\u{FEE6}', 0xF6),
    ('\u{FEE7}', 0xF7),
    ('\u{FEE8}', 0xF7),
    // waw
    ('\u{0648}', 0xF8),
    ('\u{FEED}', 0xF8),
    ('\u{FEEE}', 0xF8),
    // heh
    ('\u{0647}', 0xF9),
    ('\u{FEE9}', 0xF9),
    ('\u{FEEA}', 0xF9),
    ('\u{FEEC}', 0xFA),
    ('\u{FEEB}', 0xFB),
    // farsi yeh and arabic yeh
    ('\u{FBFD}', 0xFC),
    ('\u{FEF2}', 0xFC),
    ('\u{06CC}', 0xFD),
    ('\u{064A}', 0xFD),
    ('\u{FBFC}', 0xFD),
    ('\u{FEF1}', 0xFD),
    ('\u{FBFE}', 0xFE),
    ('\u{FBFF}', 0xFE),
    ('\u{FEF3}', 0xFE),
    ('\u{FEF4}', 0xFE),
    ('\u{00A0}', 0xFF),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_and_unknown() {
        assert_eq!(encode_iran_system("ab 1"), b"ab 1".to_vec());
        assert_eq!(encode_iran_system("é"), b"?".to_vec());
    }

    #[test]
    fn test_isolated_letters_and_digits() {
        assert_eq!(encode_iran_system("\u{FE8D}"), vec![0x90]);
        assert_eq!(encode_iran_system("۱۲۳"), vec![0x81, 0x82, 0x83]);
        assert_eq!(encode_iran_system("\u{FB92}"), vec![0xEF]);
    }

    #[test]
    fn test_reshape_is_visual_order() {
        // Reshaped Persian only holds presentation forms, which all have a byte.
        let visual = reshape("سلام");
        let bytes = encode_iran_system(&visual);
        assert_eq!(bytes.len(), visual.chars().count());
        assert!(!bytes.contains(&b'?'));
        // visual order puts the first logical letter (seen) last
        assert_eq!(bytes.last(), Some(&0xA8));
    }

    #[test]
    fn test_reshape_empty() {
        assert_eq!(reshape(""), "");
    }
}
