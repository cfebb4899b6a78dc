// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 基础设施层模块
///
/// 该模块包含系统的技术实现细节，负责与外部系统的交互：
/// 数据库、学术检索 API、网页抓取、LLM 之外的文档导出与指标收集。
///
/// 包含的子模块：
/// - 目录（catalog）：内置资助机构目录的加载与初始化
/// - 数据库（database）：数据库连接和实体映射
/// - 发现（discovery）：在线查找资助机会与模板
/// - 导出（export）：多种文档格式的渲染
/// - 指标（metrics）：Prometheus 指标
/// - 仓库实现（repositories）：领域仓库接口的具体实现
/// - 检索（search）：学术 API 检索源与聚合器
/// - 网页（web）：网页抓取检索源
pub mod catalog;
pub mod database;
pub mod discovery;
pub mod export;
pub mod metrics;
pub mod repositories;
pub mod search;
pub mod web;
