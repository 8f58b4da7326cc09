//! `-c`: show how the logger tool reads a character argument.

/// Renders `code 0x<first byte> <arg> <byte>` where the last byte is the
/// argument read as a decimal number and truncated to a byte.
pub fn describe(arg: &str) -> Vec<u8> {
    let first = arg.bytes().next().unwrap_or(0);
    let mut out = format!("code 0x{first:02X} {arg} ").into_bytes();
    out.push(leading_int(arg) as u8);
    out.push(b'\n');
    out
}

// Leading decimal integer the way C's atoi reads it, 0 when there is none.
fn leading_int(s: &str) -> i32 {
    let s = s.trim_start_matches(|c: char| c.is_ascii_whitespace());
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let value = digits
        .bytes()
        .take_while(u8::is_ascii_digit)
        .fold(0i32, |acc, d| acc.wrapping_mul(10).wrapping_add(i32::from(d - b'0')));
    if negative { value.wrapping_neg() } else { value }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_argument() {
        assert_eq!(describe("65"), b"code 0x36 65 A\n");
    }

    #[test]
    fn test_character_argument() {
        assert_eq!(describe("$"), b"code 0x24 $ \0\n");
    }

    #[test]
    fn test_empty_argument() {
        assert_eq!(describe(""), b"code 0x00  \0\n");
    }

    #[test]
    fn test_leading_int() {
        assert_eq!(leading_int("  42abc"), 42);
        assert_eq!(leading_int("-1"), -1);
        assert_eq!(leading_int("+7"), 7);
        assert_eq!(leading_int("x1"), 0);
        assert_eq!(describe("-1").last_chunk::<2>(), Some(&[0xff, b'\n']));
    }
}
