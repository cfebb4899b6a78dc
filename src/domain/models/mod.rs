// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域模型模块
///
/// 账号与会话、资助机构目录、保存的提案与章节、协作与评论、
/// 行为统计、检索论文与研究上下文、图表数据以及资助机会
pub mod analytics;
pub mod collaboration;
pub mod funding_call;
pub mod paper;
pub mod proposal;
pub mod proposal_type;
pub mod research;
pub mod user;
pub mod visuals;
