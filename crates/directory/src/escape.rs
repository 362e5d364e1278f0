//! Escaping of user-supplied identities

use std::borrow::Cow;

const DN_RESERVED: &[char] = &[',', '=', '\n', '+', '<', '>', '#', ';', '\\', '"'];
const HEX: &[u8; 16] = b"0123456789abcdef";

/// Escape a value for interpolation into a distinguished name.
///
/// Control characters become `\xx` per UTF-8 byte (lowercase hex); the
/// reserved characters `, = \n + < > # ; \ "` get a single backslash.
pub fn escape_dn(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut buf = [0u8; 4];

    for c in value.chars() {
        if c.is_control() {
            for byte in c.encode_utf8(&mut buf).bytes() {
                out.push('\\');
                out.push(HEX[(byte >> 4) as usize] as char);
                out.push(HEX[(byte & 0x0f) as usize] as char);
            }
        } else if DN_RESERVED.contains(&c) {
            out.push('\\');
            out.push(c);
        } else {
            out.push(c);
        }
    }

    out
}

/// Escape a value for interpolation into a search filter (RFC 4515)
pub fn escape_filter(value: &str) -> Cow<'_, str> {
    ldap3::ldap_escape(value)
}
