// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 中间件模块
///
/// 会话认证与会话 Cookie 的读写
pub mod auth_middleware;
