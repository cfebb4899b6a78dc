// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 仓库接口模块
///
/// 定义领域层的数据访问契约，具体实现位于基础设施层：
/// - 用户仓库（user_repository）：账号、资料与会话
/// - 提案类型仓库（proposal_type_repository）：资助机构目录与章节模板
/// - 提案仓库（proposal_repository）：保存的提案、章节与版本
/// - 协作仓库（collaboration_repository）：协作者与评论
/// - 统计仓库（analytics_repository）：用户行为事件
pub mod analytics_repository;
pub mod collaboration_repository;
pub mod proposal_repository;
pub mod proposal_type_repository;
pub mod user_repository;

pub use crate::utils::errors::RepositoryError;
