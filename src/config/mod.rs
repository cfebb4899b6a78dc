// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 配置模块
///
/// 处理服务器、数据库、认证、大模型与外部检索源等配置
pub mod settings;

#[cfg(test)]
mod settings_test;
