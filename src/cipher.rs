use crate::Error;
use cbc::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};

type Encryptor = cbc::Encryptor<aes::Aes256>;
type Decryptor = cbc::Decryptor<aes::Aes256>;

pub const KEY_LEN: usize = 32;
pub const IV_LEN: usize = 16;

fn check_lengths(key: &[u8], iv: &[u8]) -> Result<(), Error> {
    if key.len() != KEY_LEN {
        return Err(Error::InvalidKeyLength { len: key.len() });
    }
    if iv.len() != IV_LEN {
        return Err(Error::InvalidIvLength { len: iv.len() });
    }
    Ok(())
}

/// Encrypt `data` with AES-256-CBC and PKCS#7 padding.
///
/// Padding always adds between 1 and 16 bytes, so an empty input still yields
/// one block of ciphertext.
pub fn encipher(data: &[u8], key: &[u8], iv: &[u8]) -> Result<Vec<u8>, Error> {
    check_lengths(key, iv)?;
    let cipher =
        Encryptor::new_from_slices(key, iv).map_err(|_| Error::InvalidKeyLength { len: key.len() })?;
    Ok(cipher.encrypt_padded_vec_mut::<Pkcs7>(data))
}

/// Decrypt AES-256-CBC ciphertext produced by [`encipher`].
///
/// Fails with [`Error::BadPadding`] when `data` is not a whole number of
/// blocks or the padding does not check out, which is also what a wrong key
/// usually looks like.
pub fn decipher(data: &[u8], key: &[u8], iv: &[u8]) -> Result<Vec<u8>, Error> {
    check_lengths(key, iv)?;
    let cipher =
        Decryptor::new_from_slices(key, iv).map_err(|_| Error::InvalidKeyLength { len: key.len() })?;
    cipher
        .decrypt_padded_vec_mut::<Pkcs7>(data)
        .map_err(|_| Error::BadPadding)
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &str = "603deb1015ca71be2b73aef0857d77811f352c073b6108d72d9810a30914dff4";
    const IV: &str = "000102030405060708090a0b0c0d0e0f";

    fn key() -> Vec<u8> {
        hex::decode(KEY).unwrap()
    }

    fn iv() -> Vec<u8> {
        hex::decode(IV).unwrap()
    }

    // NIST SP 800-38A F.2.5, followed by one block of PKCS#7 padding
    #[test]
    fn sp800_38a_cbc_aes256() {
        let plaintext = hex::decode(
            "6bc1bee22e409f96e93d7e117393172aae2d8a571e03ac9c9eb76fac45af8e51\
             30c81c46a35ce411e5fbc1191a0a52eff69f2445df4f9b17ad2b417be66c3710",
        )
        .unwrap();
        let ciphertext = encipher(&plaintext, &key(), &iv()).unwrap();
        assert_eq!(ciphertext.len(), 80);
        assert_eq!(
            hex::encode(&ciphertext[..64]),
            "f58c4c04d6e5f1ba779eabfb5f7bfbd69cfc4e967edb808d679f777bc6702c7d\
             39f23369a9d9bacfa530e26304231461b2eb05e2c39be9fcda6c19078c6a9d1b"
        );
        assert_eq!(hex::encode(&ciphertext[64..]), "3f461796d6b0d6b2e0c2a72b4d80e644");
        assert_eq!(decipher(&ciphertext, &key(), &iv()).unwrap(), plaintext);
    }

    #[test]
    fn empty_input_is_one_padding_block() {
        let ciphertext = encipher(b"", &key(), &iv()).unwrap();
        assert_eq!(hex::encode(&ciphertext), "7e9248e5d829ca7593f0c549db2f5b8c");
        assert!(decipher(&ciphertext, &key(), &iv()).unwrap().is_empty());
    }

    #[test]
    fn round_trips_unaligned_lengths() {
        for len in [1, 15, 16, 17, 100] {
            let data: Vec<u8> = (0_u8..).take(len).map(|i| i.wrapping_mul(7)).collect();
            let ciphertext = encipher(&data, &key(), &iv()).unwrap();
            assert_eq!(ciphertext.len(), (len / 16 + 1) * 16);
            assert_eq!(decipher(&ciphertext, &key(), &iv()).unwrap(), data);
        }
    }

    #[test]
    fn bad_lengths_are_rejected() {
        assert!(matches!(
            encipher(b"data", &[0; 16], &iv()),
            Err(Error::InvalidKeyLength { len: 16 })
        ));
        assert!(matches!(
            decipher(&[0; 16], &key(), &[0; 12]),
            Err(Error::InvalidIvLength { len: 12 })
        ));
    }

    #[test]
    fn malformed_ciphertext_is_a_padding_error() {
        let mut ciphertext = encipher(b"attack at dawn, again", &key(), &iv()).unwrap();
        assert!(matches!(
            decipher(&ciphertext[..15], &key(), &iv()),
            Err(Error::BadPadding)
        ));
        // the last byte of the final block decides the padding length
        let last = ciphertext.len() - 17;
        ciphertext[last] ^= 0x80;
        assert!(matches!(
            decipher(&ciphertext, &key(), &iv()),
            Err(Error::BadPadding)
        ));
    }
}
