// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// HTTP请求处理器模块
///
/// 每个处理器从请求扩展取出仓库与共享服务，构造对应用例并返回 JSON、SSE 或文件响应
pub mod analytics_handler;
pub mod auth_handler;
pub mod catalog_handler;
pub mod collaboration_handler;
pub mod discovery_handler;
pub mod export_handler;
pub mod generation_handler;
pub mod proposal_handler;
pub mod section_handler;
