//! Password digests, stored as `pbkdf2:sha256:<iterations>$<salt>$<digest>`.

use super::{config::PW_ITERATIONS, crypto};
use anyhow::{bail, Context, Result};
use base64::{engine::general_purpose, Engine as _};
use sha2::Sha256;

const DIGEST_LEN: usize = 32;

fn derive(password: &str, salt: &str, iterations: u32) -> [u8; DIGEST_LEN] {
    let mut out = [0u8; DIGEST_LEN];
    pbkdf2::pbkdf2_hmac::<Sha256>(
        password.as_bytes(),
        salt.as_bytes(),
        iterations,
        &mut out,
    );
    out
}

pub fn hash(password: &str) -> String {
    let salt = uuid::Uuid::new_v4().simple().to_string();
    let digest =
        general_purpose::STANDARD_NO_PAD.encode(derive(password, &salt, PW_ITERATIONS));
    format!("pbkdf2:sha256:{PW_ITERATIONS}${salt}${digest}")
}

pub fn check(password: &str, stored: &str) -> Result<()> {
    let mut parts = stored.splitn(3, '$');
    let (Some(method), Some(salt), Some(digest)) =
        (parts.next(), parts.next(), parts.next())
    else {
        bail!("malformed password hash");
    };
    let iterations: u32 = method
        .strip_prefix("pbkdf2:sha256:")
        .context("unsupported hash method")?
        .parse()
        .context("malformed iteration count")?;

    let expected = general_purpose::STANDARD_NO_PAD
        .decode(digest)
        .context("malformed digest")?;
    let actual = derive(password, salt, iterations);

    // Both sides go through an HMAC so the final comparison is constant-time.
    let expected_tag = crypto::get_digest(salt.as_bytes(), &expected)?;
    if crypto::is_valid(salt.as_bytes(), &actual, &expected_tag) {
        Ok(())
    } else {
        bail!("wrong password")
    }
}
