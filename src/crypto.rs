use anyhow::Result;
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

pub fn get_digest(secret: &[u8], val: &[u8]) -> Result<Vec<u8>> {
    let mut mac = HmacSha256::new_from_slice(secret)?;
    mac.update(val);

    Ok(mac.finalize().into_bytes().to_vec())
}

pub fn is_valid(secret: &[u8], val: &[u8], digest: &[u8]) -> bool {
    match HmacSha256::new_from_slice(secret) {
        Ok(mut mac) => {
            mac.update(val);
            mac.verify_slice(digest).is_ok()
        }
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digest_depends_on_secret() {
        let digest = get_digest(b"foo", b"payload").expect("digest");
        assert!(is_valid(b"foo", b"payload", &digest));
        assert!(!is_valid(b"bar", b"payload", &digest));
        assert!(!is_valid(b"foo", b"payl0ad", &digest));
    }
}
