use argon2::{Config, Variant, Version};

const SALT_LEN: usize = 32;

fn hash_config<'a>() -> Config<'a> {
    Config {
        variant: Variant::Argon2id,
        version: Version::Version13,
        ..Config::default()
    }
}

/// Hashes a new account's password into the encoded form kept in the
/// `password` column.
pub fn encode_password(password: &str) -> Result<String, argon2::Error> {
    let salt: [u8; SALT_LEN] = rand::random();
    argon2::hash_encoded(password.as_bytes(), &salt, &hash_config())
}

/// `Ok(false)` for a wrong password, `Err` when `stored` is not an encoded
/// argon2 hash at all.
pub fn verify_password(password: &str, stored: &str) -> Result<bool, argon2::Error> {
    argon2::verify_encoded(stored, password.as_bytes())
}
