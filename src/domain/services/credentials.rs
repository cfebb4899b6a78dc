// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! 密码哈希与会话令牌

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use sha2::{Digest, Sha256};

/// 会话令牌的随机字节数
const SESSION_TOKEN_BYTES: usize = 32;

/// 使用 Argon2id 与随机盐生成 PHC 格式的密码哈希
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// 校验密码，不匹配时返回 `Ok(false)`
pub fn verify_password(password: &str, hash: &str) -> Result<bool, argon2::password_hash::Error> {
    let parsed_hash = PasswordHash::new(hash)?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(e),
    }
}

/// 密码长度校验（按字符计）
pub fn validate_password_strength(password: &str, min_length: usize) -> Result<(), String> {
    if password.chars().count() < min_length {
        return Err(format!(
            "Password must be at least {min_length} characters long"
        ));
    }
    Ok(())
}

/// 生成新的会话令牌，返回 `(明文令牌, 存储用哈希)`
pub fn generate_session_token() -> (String, String) {
    let bytes: [u8; SESSION_TOKEN_BYTES] = rand::random();
    let token = URL_SAFE_NO_PAD.encode(bytes);
    let hash = hash_token(&token);
    (token, hash)
}

/// 令牌的 SHA-256 十六进制摘要
pub fn hash_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("correct-horse-battery").expect("hashing should succeed");
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("correct-horse-battery", &hash).unwrap());
        assert!(!verify_password("wrong-password", &hash).unwrap());
    }

    #[test]
    fn test_password_strength() {
        assert!(validate_password_strength("short", 8).is_err());
        assert!(validate_password_strength("eight888", 8).is_ok());
    }

    #[test]
    fn test_session_token_shape() {
        let (token, hash) = generate_session_token();
        // 32 bytes -> 43 base64url characters without padding
        assert_eq!(token.len(), 43);
        assert_eq!(hash.len(), 64);
        assert_eq!(hash, hash_token(&token));

        let (other, _) = generate_session_token();
        assert_ne!(token, other);
    }
}
