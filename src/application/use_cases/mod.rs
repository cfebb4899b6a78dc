// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 用例模块
///
/// 每个用例对应一组业务操作，仓库以泛型参数注入
pub mod access;
pub mod analytics_use_case;
pub mod auth_use_case;
pub mod catalog_use_case;
pub mod collaboration_use_case;
pub mod discovery_use_case;
pub mod export_use_case;
pub mod generation_use_case;
pub mod proposal_use_case;
pub mod section_use_case;
