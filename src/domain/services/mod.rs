// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域服务模块
///
/// 该模块包含系统的核心业务逻辑服务，这些服务封装了复杂的
/// 业务规则和领域逻辑，不依赖具体的存储或网络实现。
///
/// 包含的服务：
/// - 引用服务（citation_service）：引用键、APA、BibTeX 与数字引用校验
/// - 凭证（credentials）：密码哈希与会话令牌
/// - LLM服务（llm_service）：对话补全客户端抽象与 OpenAI 实现
/// - 提示词（prompt_builder）：章节提示词与研究上下文摘要
/// - 润色（proposal_enhancer）：保留引用的逐章节改写
/// - 生成（proposal_generator）：章节生成与提案汇编
/// - 相关性评分（relevance_scorer）：论文排序
/// - 研究分析（research_analyzer）：主题、方法、空白、时间线等
/// - 图表（visuals_service）：由研究上下文得出的图表数据
pub mod citation_service;
pub mod credentials;
pub mod llm_service;
pub mod prompt_builder;
pub mod proposal_enhancer;
pub mod proposal_generator;
pub mod relevance_scorer;
pub mod research_analyzer;
pub mod visuals_service;
