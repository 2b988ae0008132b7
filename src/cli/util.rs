struct Hex<'a> {
    inner: core::slice::Iter<'a, u8>,
    next: Option<u8>,
}

impl Hex<'_> {
    const TABLE: &'static [u8; 16] = b"0123456789abcdef";
}

impl Iterator for Hex<'_> {
    type Item = u8;

    fn next(&mut self) -> Option<Self::Item> {
        match self.next.take() {
            Some(c) => Some(c),
            None => self.inner.next().map(|b| {
                let current = Self::TABLE[(b >> 4) as usize];
                self.next = Some(Self::TABLE[(b & 0xf) as usize]);
                current
            }),
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let length = self.len();
        (length, Some(length))
    }
}

impl core::iter::ExactSizeIterator for Hex<'_> {
    fn len(&self) -> usize {
        let mut length = self.inner.len() * 2;
        if self.next.is_some() {
            length += 1;
        }
        length
    }
}

/// Lowercase hex encoding of `inp`.
pub fn hex(inp: &[u8]) -> String {
    Hex {
        inner: inp.iter(),
        next: None,
    }
    .map(char::from)
    .collect()
}

/// Decode a hex string of any even length, either case.
pub fn from_hex(s: &str) -> Result<Vec<u8>, ()> {
    const fn decode_char(b: u8) -> Result<u8, ()> {
        match b {
            b'a'..=b'f' => Ok(b - b'a' + 10),
            b'A'..=b'F' => Ok(b - b'A' + 10),
            b'0'..=b'9' => Ok(b - b'0'),
            _ => Err(()),
        }
    }
    let bytes = s.as_bytes();
    if bytes.len() % 2 != 0 {
        return Err(());
    }
    bytes
        .chunks_exact(2)
        .map(|pair| -> Result<u8, ()> { Ok(decode_char(pair[0])? << 4 | decode_char(pair[1])?) })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_lowercase() {
        assert_eq!(hex(&[]), "");
        assert_eq!(hex(&[0x00, 0x7f, 0xab, 0xff]), "007fabff");
    }

    #[test]
    fn decodes_either_case() {
        assert_eq!(from_hex("007FabfF"), Ok(vec![0x00, 0x7f, 0xab, 0xff]));
        assert_eq!(from_hex(""), Ok(vec![]));
    }

    #[test]
    fn rejects_malformed_input() {
        assert_eq!(from_hex("abc"), Err(()));
        assert_eq!(from_hex("zz"), Err(()));
        assert_eq!(from_hex("0g"), Err(()));
    }

    #[test]
    fn round_trips_a_key() {
        let key = keystretch::scrypt(b"password", b"salt", 16, 1, 1, 32).unwrap();
        assert_eq!(
            hex(&key),
            "45133c3dfba48c82235df51a5349924110eee893752f0d4168d2e2aee5722d82"
        );
        assert_eq!(from_hex(&hex(&key)), Ok(key));
    }
}
