use argon2::Config;

pub fn encode_password(password: &str) -> Result<String, argon2::Error> {
    let config = Config::default();
    let salt: [u8; 32] = rand::random();
    argon2::hash_encoded(password.as_bytes(), &salt, &config)
}

pub fn verify_password(password: &str, password_hash: &str) -> Result<bool, argon2::Error> {
    argon2::verify_encoded(password_hash, password.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::{encode_password, verify_password};

    #[test]
    fn matching_password() {
        let hash = encode_password("testpass123").unwrap();
        assert_ne!(hash, "testpass123");
        assert_eq!(verify_password("testpass123", &hash), Ok(true));
    }

    #[test]
    fn wrong_password() {
        let hash = encode_password("testpass123").unwrap();
        assert_eq!(verify_password("wrong", &hash), Ok(false));
    }
}
