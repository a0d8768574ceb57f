use chardetng::EncodingDetector;
use encoding_rs::Encoding;

/// How far into the document to look for a `<meta charset>` declaration.
const META_SNIFF_LIMIT: usize = 1024;

/// The primary entry as text, with the encoding it was read in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedHtml {
    pub html: String,
    pub encoding_label: String,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("content is not valid {encoding}")]
    Malformed { encoding: String },
}

/// Decodes a stored note page. The encoding comes from the byte order mark,
/// then a `charset` declaration near the top, then statistical detection.
pub fn decode_html(bytes: &[u8]) -> Result<DecodedHtml, DecodeError> {
    if let Some((encoding, bom_len)) = Encoding::for_bom(bytes) {
        return decode_with(&bytes[bom_len..], encoding);
    }

    if let Some(label) = sniff_meta_charset(bytes) {
        if let Some(enc) = Encoding::for_label(label.as_bytes()) {
            // A UTF-16 declaration in an ASCII-compatible head means UTF-8.
            return decode_with(bytes, enc.output_encoding());
        }
    }

    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    let enc = detector.guess(None, true);
    decode_with(bytes, enc)
}

fn sniff_meta_charset(bytes: &[u8]) -> Option<String> {
    let head = &bytes[..bytes.len().min(META_SNIFF_LIMIT)];
    let head = String::from_utf8_lossy(head).to_ascii_lowercase();
    let start = head.find("charset=")? + "charset=".len();
    let label: String = head[start..]
        .trim_start_matches(&['"', '\''][..])
        .chars()
        .take_while(|c| !matches!(c, '"' | '\'' | ';' | '>' | '/' | ' '))
        .collect();
    if label.is_empty() {
        None
    } else {
        Some(label)
    }
}

fn decode_with(bytes: &[u8], enc: &'static Encoding) -> Result<DecodedHtml, DecodeError> {
    let (text, had_errors) = enc.decode_without_bom_handling(bytes);
    if had_errors {
        return Err(DecodeError::Malformed {
            encoding: enc.name().to_string(),
        });
    }
    Ok(DecodedHtml {
        html: text.into_owned(),
        encoding_label: enc.name().to_string(),
    })
}
