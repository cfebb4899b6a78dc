// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 学术检索模块
///
/// arXiv、OpenAlex、Semantic Scholar、Crossref 的 API 客户端，
/// 以及负责并发检索、去重与排序的聚合器
pub mod aggregator;
pub mod arxiv;
pub mod crossref;
pub mod deduplicator;
pub mod factory;
pub mod openalex;
pub mod semantic_scholar;

pub use aggregator::ResearchAggregator;
pub use factory::build_aggregator;
