use base64::{engine::general_purpose, Engine as _};
use constant_time_eq::constant_time_eq;
use pbkdf2::hmac::Hmac;
use pbkdf2::pbkdf2;
use sha2::Sha256;

use crate::auth::AuthError;

const SCHEME: &str = "pbkdf2_sha256";

fn derive(password: &str, salt: &str, iterations: u32) -> Result<String, AuthError> {
    let mut output = [0u8; 32];
    pbkdf2::<Hmac<Sha256>>(password.as_bytes(), salt.as_bytes(), iterations, &mut output)
        .map_err(|e| AuthError::Hashing(e.to_string()))?;
    Ok(general_purpose::STANDARD.encode(output))
}

/// Hash a password as `pbkdf2_sha256$<iterations>$<salt>$<base64 hash>`
pub fn hash_password(password: &str, iterations: u32) -> Result<String, AuthError> {
    let salt = uuid::Uuid::new_v4().simple().to_string();
    let hash = derive(password, &salt, iterations)?;
    Ok(format!("{}${}${}${}", SCHEME, iterations, salt, hash))
}

/// Check a password against a stored hash
///
/// Malformed hashes never verify.
pub fn verify_password(password: &str, stored: &str) -> bool {
    let parts: Vec<&str> = stored.split('$').collect();
    if parts.len() != 4 || parts[0] != SCHEME {
        return false;
    }

    let iterations: u32 = match parts[1].parse() {
        Ok(i) if i > 0 => i,
        _ => return false,
    };

    match derive(password, parts[2], iterations) {
        Ok(computed) => constant_time_eq(computed.as_bytes(), parts[3].as_bytes()),
        Err(_) => false,
    }
}
