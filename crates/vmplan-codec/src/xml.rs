use crate::{CodecError, Result};

/// Encode a byte sequence as one XML element per byte.
///
/// `[1, 2]` with element name `b` becomes `<b>1</b><b>2</b>`: the inner text
/// is the decimal byte value and the element name is the one inherited from
/// the enclosing element.
pub fn encode_byte_array(element: &str, bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * (element.len() * 2 + 8));
    for byte in bytes {
        out.push('<');
        out.push_str(element);
        out.push('>');
        out.push_str(byte.to_string().as_str());
        out.push_str("</");
        out.push_str(element);
        out.push('>');
    }
    out
}

/// Decode the inverse of [`encode_byte_array`].
///
/// Whitespace between elements is tolerated. Non-digit element content is
/// malformed; a decimal value above 255 is an overflow naming the element.
pub fn decode_byte_array(element: &str, xml: &str) -> Result<Vec<u8>> {
    let open = format!("<{element}>");
    let close = format!("</{element}>");

    let mut bytes = Vec::new();
    let mut rest = xml;
    loop {
        rest = rest.trim_start();
        if rest.is_empty() {
            return Ok(bytes);
        }
        let body = rest
            .strip_prefix(open.as_str())
            .ok_or_else(|| CodecError::MalformedXml(format!("expected {open}")))?;
        let end = body
            .find(close.as_str())
            .ok_or_else(|| CodecError::MalformedXml(format!("missing {close}")))?;
        let text = &body[..end];
        if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
            return Err(CodecError::MalformedXml(format!(
                "non-decimal content {text:?} in <{element}>"
            )));
        }
        // Digits-only text that does not fit a u64 is still just an
        // overflowing value.
        let value: u64 = text.parse().unwrap_or(u64::MAX);
        if value > u8::MAX as u64 {
            return Err(CodecError::ByteOverflow {
                element: element.to_owned(),
                value,
            });
        }
        bytes.push(value as u8);
        rest = &body[end + close.len()..];
    }
}
