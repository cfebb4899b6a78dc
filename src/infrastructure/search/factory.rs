// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::config::settings::Settings;
use crate::domain::search::source::PageExtractor;
use crate::infrastructure::search::aggregator::ResearchAggregator;
use crate::infrastructure::search::arxiv::ArxivSource;
use crate::infrastructure::search::crossref::CrossrefSource;
use crate::infrastructure::search::openalex::OpenAlexSource;
use crate::infrastructure::search::semantic_scholar::SemanticScholarSource;
use crate::infrastructure::web::news::NewsSource;
use crate::infrastructure::web::page_extractor::HtmlPageExtractor;
use crate::infrastructure::web::scholar::ScholarSource;
use crate::infrastructure::web::science_daily::ScienceDailySource;

/// Google Scholar 两次请求之间的最小间隔
const SCHOLAR_MIN_INTERVAL: Duration = Duration::from_secs(2);

/// 按配置组装研究检索聚合器
///
/// 只注册已启用的来源；`web.enabled` 为 false 时不注册任何网页来源，
/// 但自定义网址的正文抽取始终可用
pub fn build_aggregator(settings: &Settings) -> ResearchAggregator {
    let sources = &settings.sources;
    let timeout = Duration::from_secs(sources.timeout_secs);
    let interval = |ms: u64| Duration::from_millis(ms);

    let extractor: Arc<dyn PageExtractor> = Arc::new(HtmlPageExtractor::new(&settings.web));

    let mut aggregator = ResearchAggregator::new(
        timeout,
        sources.max_results_per_source,
        settings.generation.max_papers,
    )
    .with_cache_ttl(Duration::from_secs(sources.cache_ttl_secs))
    .with_cache_capacity(sources.cache_capacity)
    .with_max_web_results(settings.web.max_results)
    .with_page_extractor(extractor.clone());

    if sources.arxiv.enabled {
        aggregator = aggregator.with_source(
            Arc::new(ArxivSource::new(&sources.arxiv, timeout)),
            interval(sources.arxiv.min_interval_ms),
        );
    }
    if sources.openalex.enabled {
        aggregator = aggregator.with_source(
            Arc::new(OpenAlexSource::new(
                &sources.openalex,
                timeout,
                &sources.contact_email,
            )),
            interval(sources.openalex.min_interval_ms),
        );
    }
    if sources.semantic_scholar.enabled {
        aggregator = aggregator.with_source(
            Arc::new(SemanticScholarSource::new(&sources.semantic_scholar, timeout)),
            interval(sources.semantic_scholar.min_interval_ms),
        );
    }
    if sources.crossref.enabled {
        aggregator = aggregator.with_source(
            Arc::new(CrossrefSource::new(
                &sources.crossref,
                timeout,
                &sources.contact_email,
            )),
            interval(sources.crossref.min_interval_ms),
        );
    }

    if settings.web.enabled {
        aggregator = aggregator
            .with_web_source(
                Arc::new(ScholarSource::new(&settings.web)),
                SCHOLAR_MIN_INTERVAL,
            )
            .with_academic_news(Arc::new(ScienceDailySource::new(&settings.web)))
            .with_news(Arc::new(NewsSource::bbc(&settings.web, extractor.clone())))
            .with_news(Arc::new(NewsSource::guardian(&settings.web, extractor)));
    }

    info!(
        "Research aggregator configured with sources: {:?}",
        aggregator.source_names()
    );
    aggregator
}
