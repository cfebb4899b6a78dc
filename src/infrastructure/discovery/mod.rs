// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 资助机会发现
///
/// 通过网页搜索查找公开的资助申请与模板，并从页面中提取申请要求
pub mod funding_discovery;

pub use funding_discovery::{DiscoveryError, FundingDiscovery, FUNDING_SOURCES};
