// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 请求提取器模块
///
/// 从认证中间件写入的请求扩展中取出当前用户
pub mod current_user;
