// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::models::user::{User, UserProfile};

/// 注册请求
///
/// 字段缺省为空字符串，必填校验在用例中完成，以便返回统一的提示
#[derive(Debug, Default, Deserialize, Serialize, Validate)]
pub struct RegisterRequestDto {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    #[validate(email(message = "Enter a valid email address."))]
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub university: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub confirm_password: String,
}

impl RegisterRequestDto {
    /// 去除各字段首尾空白（密码除外）
    pub fn trimmed(self) -> Self {
        Self {
            username: self.username.trim().to_string(),
            email: self.email.trim().to_string(),
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            university: self.university.trim().to_string(),
            password: self.password,
            confirm_password: self.confirm_password,
        }
    }

    pub fn has_empty_field(&self) -> bool {
        [
            &self.username,
            &self.email,
            &self.first_name,
            &self.last_name,
            &self.university,
            &self.password,
            &self.confirm_password,
        ]
        .iter()
        .any(|value| value.trim().is_empty())
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct LoginRequestDto {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Default, Deserialize, Serialize, Validate)]
pub struct UpdateProfileDto {
    #[validate(length(max = 150))]
    pub first_name: Option<String>,
    #[validate(length(max = 150))]
    pub last_name: Option<String>,
    #[validate(length(max = 255))]
    pub university: Option<String>,
}

/// 登录或注册成功后的会话
#[derive(Debug, Serialize)]
pub struct AuthSessionDto {
    /// 明文令牌，只在此处返回一次
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub user: User,
    pub profile: UserProfile,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trimmed_keeps_password_whitespace() {
        let dto = RegisterRequestDto {
            username: "  ana ".into(),
            password: " secret password ".into(),
            ..Default::default()
        }
        .trimmed();
        assert_eq!(dto.username, "ana");
        assert_eq!(dto.password, " secret password ");
    }

    #[test]
    fn test_has_empty_field() {
        let mut dto = RegisterRequestDto {
            username: "ana".into(),
            email: "ana@example.org".into(),
            first_name: "Ana".into(),
            last_name: "Silva".into(),
            university: "Lisbon".into(),
            password: "password1".into(),
            confirm_password: "password1".into(),
        };
        assert!(!dto.has_empty_field());
        dto.university = "   ".into();
        assert!(dto.has_empty_field());
    }

    #[test]
    fn test_email_validation() {
        let dto = RegisterRequestDto {
            email: "not-an-email".into(),
            ..Default::default()
        };
        assert!(dto.validate().is_err());
    }
}
