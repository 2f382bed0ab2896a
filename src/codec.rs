//! Decoding of submitted field values.

/// `+` becomes a space and `%XX` the byte it names. A `%` not followed by two
/// hex digits is kept as is. Invalid UTF-8 is replaced.
pub fn url_decode(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut decoded = Vec::with_capacity(bytes.len());

    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'+' => decoded.push(b' '),
            b'%' if i + 2 < bytes.len() => match (hex_digit(bytes[i + 1]), hex_digit(bytes[i + 2])) {
                (Some(hi), Some(lo)) => {
                    decoded.push((hi << 4) | lo);
                    i += 2;
                }
                _ => decoded.push(b'%'),
            },
            b => decoded.push(b),
        }
        i += 1;
    }

    String::from_utf8_lossy(&decoded).into_owned()
}

/// Turns a raw query value into what the data callback receives.
///
/// - url-decoded and trimmed
/// - `%20` and `(None)` become empty
/// - `#rrggbb` becomes the decimal string of its hex value
pub fn normalize_value(raw: &str) -> String {
    let decoded = url_decode(raw);
    let value = decoded.trim();

    if value == "%20" || value == "(None)" {
        return String::new();
    }

    if let Some(hex) = value.strip_prefix('#') {
        return parse_hex_prefix(hex).to_string();
    }

    value.to_string()
}

/// Value of the leading hex digits of `text`, 0 when there are none.
/// Saturates instead of overflowing.
pub fn parse_hex_prefix(text: &str) -> u64 {
    text.bytes()
        .map_while(hex_digit)
        .fold(0u64, |acc, d| acc.saturating_mul(16).saturating_add(d.into()))
}

fn hex_digit(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}
