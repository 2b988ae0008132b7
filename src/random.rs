use crate::Error;
use rand_core::{OsRng, RngCore};

/// Fill `buf[offset..offset + len]` from the operating system's CSPRNG.
///
/// The range is checked before the buffer is touched; bytes outside it are
/// never written.
pub fn random_fill(buf: &mut [u8], offset: usize, len: usize) -> Result<(), Error> {
    let capacity = buf.len();
    let end = offset
        .checked_add(len)
        .filter(|&end| end <= capacity)
        .ok_or(Error::InvalidRange {
            offset,
            len,
            capacity,
        })?;
    OsRng.try_fill_bytes(&mut buf[offset..end])?;
    Ok(())
}

/// `len` fresh random bytes.
pub fn random_bytes(len: usize) -> Result<Vec<u8>, Error> {
    let mut buf = crate::alloc_zeroed(len)?;
    random_fill(&mut buf, 0, len)?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fills_only_the_requested_range() {
        let mut buf = [0_u8; 256];
        random_fill(&mut buf, 64, 128).unwrap();
        assert!(buf[..64].iter().all(|&b| b == 0));
        assert!(buf[192..].iter().all(|&b| b == 0));
        // 128 random bytes being all zero has probability 2^-1024
        assert!(buf[64..192].iter().any(|&b| b != 0));
    }

    #[test]
    fn empty_range_is_a_no_op() {
        let mut buf = [7_u8; 8];
        random_fill(&mut buf, 8, 0).unwrap();
        random_fill(&mut [], 0, 0).unwrap();
        assert_eq!(buf, [7; 8]);
    }

    #[test]
    fn rejects_out_of_bounds_ranges() {
        let mut buf = [7_u8; 16];
        for (offset, len) in [(0, 17), (16, 1), (17, 0), (1, usize::MAX), (usize::MAX, 1)] {
            assert!(
                matches!(
                    random_fill(&mut buf, offset, len),
                    Err(Error::InvalidRange { capacity: 16, .. })
                ),
                "offset = {offset}, len = {len}"
            );
        }
        assert_eq!(buf, [7; 16]);
    }

    #[test]
    fn random_bytes_has_requested_length() {
        assert!(random_bytes(0).unwrap().is_empty());
        let a = random_bytes(32).unwrap();
        let b = random_bytes(32).unwrap();
        assert_eq!(a.len(), 32);
        assert_ne!(a, b);
    }
}
