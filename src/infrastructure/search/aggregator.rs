// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use futures::future::join_all;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use lru::LruCache;
use std::collections::BTreeMap;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing::{info, warn};

use crate::domain::models::paper::Paper;
use crate::domain::models::research::{ResearchContext, ResearchOptions, WebItem};
use crate::domain::search::source::{PageExtractor, PaperSource, WebSource};
use crate::domain::services::relevance_scorer::RelevanceScorer;
use crate::domain::services::research_analyzer::{AnalysisInputs, ResearchAnalyzer};
use crate::infrastructure::metrics;
use crate::infrastructure::search::deduplicator::{dedupe_web_items, PaperDeduplicator};

/// 带最小请求间隔的检索源
struct ThrottledSource {
    source: Arc<dyn PaperSource>,
    limiter: Option<Arc<DefaultDirectRateLimiter>>,
}

impl ThrottledSource {
    fn new(source: Arc<dyn PaperSource>, min_interval: Duration) -> Self {
        Self {
            source,
            limiter: Quota::with_period(min_interval).map(|q| Arc::new(RateLimiter::direct(q))),
        }
    }
}

/// 研究检索聚合器
///
/// 并发查询所有检索源，单个来源失败或超时只记录警告并贡献零结果；
/// 合并后去重、排序，并分析为 [`ResearchContext`]
pub struct ResearchAggregator {
    sources: Vec<ThrottledSource>,
    web_sources: Vec<ThrottledSource>,
    academic_news: Vec<Arc<dyn WebSource>>,
    news: Vec<Arc<dyn WebSource>>,
    page_extractor: Option<Arc<dyn PageExtractor>>,
    timeout: Duration,
    max_results_per_source: u32,
    max_web_results: usize,
    max_papers: usize,
    cache: Mutex<LruCache<String, (ResearchContext, Instant)>>,
    cache_ttl: Duration,
}

const DEFAULT_CACHE_CAPACITY: usize = 128;

impl ResearchAggregator {
    pub fn new(timeout: Duration, max_results_per_source: u32, max_papers: usize) -> Self {
        Self {
            sources: Vec::new(),
            web_sources: Vec::new(),
            academic_news: Vec::new(),
            news: Vec::new(),
            page_extractor: None,
            timeout,
            max_results_per_source,
            max_web_results: 10,
            max_papers,
            cache: Mutex::new(LruCache::new(cache_capacity(DEFAULT_CACHE_CAPACITY))),
            cache_ttl: Duration::from_secs(300),
        }
    }

    /// 学术 API 检索源，始终参与检索
    pub fn with_source(mut self, source: Arc<dyn PaperSource>, min_interval: Duration) -> Self {
        self.sources.push(ThrottledSource::new(source, min_interval));
        self
    }

    /// 网页学术检索源（如 Google Scholar），`include_web` 时参与
    pub fn with_web_source(mut self, source: Arc<dyn PaperSource>, min_interval: Duration) -> Self {
        self.web_sources.push(ThrottledSource::new(source, min_interval));
        self
    }

    /// 学术新闻来源，`include_web` 时参与
    pub fn with_academic_news(mut self, source: Arc<dyn WebSource>) -> Self {
        self.academic_news.push(source);
        self
    }

    /// 新闻来源，`include_news` 时参与
    pub fn with_news(mut self, source: Arc<dyn WebSource>) -> Self {
        self.news.push(source);
        self
    }

    pub fn with_page_extractor(mut self, extractor: Arc<dyn PageExtractor>) -> Self {
        self.page_extractor = Some(extractor);
        self
    }

    pub fn with_max_web_results(mut self, max: usize) -> Self {
        self.max_web_results = max;
        self
    }

    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    /// 缓存最多保留的查询数，超出时淘汰最久未使用的条目
    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache = Mutex::new(LruCache::new(cache_capacity(capacity)));
        self
    }

    pub fn source_names(&self) -> Vec<&'static str> {
        self.sources
            .iter()
            .chain(self.web_sources.iter())
            .map(|s| s.source.name())
            .collect()
    }

    fn cache_key(query: &str, options: &ResearchOptions) -> String {
        format!(
            "{}:{}:{}:{}",
            query.trim().to_lowercase(),
            options.include_news,
            options.include_web,
            options.custom_urls.join("|")
        )
    }

    /// 检索、去重、排序并分析
    pub async fn collect(&self, query: &str, options: &ResearchOptions) -> ResearchContext {
        let cache_key = Self::cache_key(query, options);
        if let Some(context) = self.cached(&cache_key) {
            info!("Cache hit for research query: {}", query);
            return context;
        }

        let mut slots: Vec<&ThrottledSource> = self.sources.iter().collect();
        if options.include_web {
            slots.extend(self.web_sources.iter());
        }

        let paper_futures = slots.into_iter().map(|slot| self.search_source(slot, query));
        let news_futures = async {
            let mut items = Vec::new();
            if options.include_news {
                items.extend(self.fetch_web(&self.news, query).await);
            }
            items
        };
        let academic_futures = async {
            if options.include_web {
                self.fetch_web(&self.academic_news, query).await
            } else {
                Vec::new()
            }
        };
        let custom_futures = self.extract_pages(&options.custom_urls);

        let (paper_results, mut news, academic, custom_content) = tokio::join!(
            join_all(paper_futures),
            news_futures,
            academic_futures,
            custom_futures
        );

        let mut source_counts = BTreeMap::new();
        let mut all_papers: Vec<Paper> = Vec::new();
        for (name, papers) in paper_results {
            source_counts.insert(name.to_string(), papers.len());
            all_papers.extend(papers);
        }

        let total_retrieved = all_papers.len();
        let unique = PaperDeduplicator::new().deduplicate(all_papers);
        info!(
            "Retrieved {} papers, {} unique after deduplication",
            total_retrieved,
            unique.len()
        );

        let ranked = RelevanceScorer::new(query).rank(unique, self.max_papers);

        news.extend(academic);
        let context = ResearchAnalyzer::analyze(
            query,
            ranked,
            AnalysisInputs {
                source_counts,
                news: dedupe_web_items(news),
                custom_content,
            },
        );

        // Empty results are never cached
        if context.total_papers > 0 {
            if let Ok(mut cache) = self.cache.lock() {
                cache.put(cache_key, (context.clone(), Instant::now()));
            }
        }
        context
    }

    fn cached(&self, key: &str) -> Option<ResearchContext> {
        let mut cache = self.cache.lock().ok()?;
        match cache.get(key) {
            Some((context, stored)) if stored.elapsed() < self.cache_ttl => Some(context.clone()),
            Some(_) => {
                cache.pop(key);
                None
            }
            None => None,
        }
    }

    async fn search_source(&self, slot: &ThrottledSource, query: &str) -> (&'static str, Vec<Paper>) {
        let name = slot.source.name();

        // The throttle wait counts against the per-source timeout
        let result = tokio::time::timeout(self.timeout, async {
            if let Some(limiter) = &slot.limiter {
                limiter.until_ready().await;
            }
            slot.source.search(query, self.max_results_per_source).await
        })
        .await;

        match result {
            Ok(Ok(papers)) => {
                info!("Source {} returned {} papers", name, papers.len());
                metrics::record_source_papers(name, papers.len());
                (name, papers)
            }
            Ok(Err(e)) => {
                warn!("Source {} failed: {}", name, e);
                (name, Vec::new())
            }
            Err(_) => {
                warn!("Source {} timed out", name);
                (name, Vec::new())
            }
        }
    }

    async fn fetch_web(&self, sources: &[Arc<dyn WebSource>], query: &str) -> Vec<WebItem> {
        let futures = sources.iter().map(|source| async move {
            match tokio::time::timeout(self.timeout, source.fetch(query, self.max_web_results)).await {
                Ok(Ok(items)) => items,
                Ok(Err(e)) => {
                    warn!("Web source {} failed: {}", source.name(), e);
                    Vec::new()
                }
                Err(_) => {
                    warn!("Web source {} timed out", source.name());
                    Vec::new()
                }
            }
        });

        join_all(futures).await.into_iter().flatten().collect()
    }

    async fn extract_pages(&self, urls: &[String]) -> Vec<WebItem> {
        let Some(extractor) = &self.page_extractor else {
            return Vec::new();
        };

        let futures = urls.iter().map(|url| async move {
            match tokio::time::timeout(self.timeout, extractor.extract(url)).await {
                Ok(Ok(item)) => Some(item),
                Ok(Err(e)) => {
                    warn!("Failed to extract {}: {}", url, e);
                    None
                }
                Err(_) => {
                    warn!("Extraction of {} timed out", url);
                    None
                }
            }
        });

        join_all(futures).await.into_iter().flatten().collect()
    }
}

fn cache_capacity(capacity: usize) -> NonZeroUsize {
    NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::research::WebItemKind;
    use crate::domain::search::source::SourceError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StaticSource {
        name: &'static str,
        papers: Vec<Paper>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl PaperSource for StaticSource {
        async fn search(&self, _query: &str, _limit: u32) -> Result<Vec<Paper>, SourceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.papers.clone())
        }

        fn name(&self) -> &'static str {
            self.name
        }
    }

    struct FailingSource;

    #[async_trait]
    impl PaperSource for FailingSource {
        async fn search(&self, _query: &str, _limit: u32) -> Result<Vec<Paper>, SourceError> {
            Err(SourceError::Network("connection refused".into()))
        }

        fn name(&self) -> &'static str {
            "failing"
        }
    }

    struct SlowSource;

    #[async_trait]
    impl PaperSource for SlowSource {
        async fn search(&self, _query: &str, _limit: u32) -> Result<Vec<Paper>, SourceError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(vec![])
        }

        fn name(&self) -> &'static str {
            "slow"
        }
    }

    struct NewsSource;

    #[async_trait]
    impl WebSource for NewsSource {
        async fn fetch(&self, query: &str, _limit: usize) -> Result<Vec<WebItem>, SourceError> {
            Ok(vec![WebItem {
                title: format!("News about {query}"),
                url: "https://news.example/1".into(),
                source: "News".into(),
                kind: WebItemKind::News,
                ..Default::default()
            }])
        }

        fn name(&self) -> &'static str {
            "news"
        }
    }

    fn paper(title: &str, doi: Option<&str>) -> Paper {
        Paper {
            title: title.into(),
            doi: doi.map(str::to_string),
            authors: vec!["Ann Author".into()],
            year: Some(2020),
            ..Default::default()
        }
    }

    fn static_source(name: &'static str, papers: Vec<Paper>) -> Arc<StaticSource> {
        Arc::new(StaticSource {
            name,
            papers,
            calls: AtomicUsize::new(0),
        })
    }

    #[tokio::test]
    async fn test_collect_merges_dedups_and_survives_failures() {
        let a = static_source("a", vec![paper("Soil carbon", Some("10.1/x")), paper("Ocean heat", None)]);
        let b = static_source("b", vec![paper("Different title", Some("10.1/x"))]);

        let aggregator = ResearchAggregator::new(Duration::from_secs(5), 10, 100)
            .with_source(a, Duration::ZERO)
            .with_source(b, Duration::ZERO)
            .with_source(Arc::new(FailingSource), Duration::ZERO)
            .with_news(Arc::new(NewsSource));

        let ctx = aggregator
            .collect("soil carbon", &ResearchOptions::default())
            .await;

        assert_eq!(ctx.total_papers, 2);
        assert_eq!(ctx.papers[0].title, "Soil carbon");
        assert_eq!(ctx.source_counts["a"], 2);
        assert_eq!(ctx.source_counts["b"], 1);
        assert_eq!(ctx.source_counts["failing"], 0);
        assert_eq!(ctx.news.len(), 1);
        assert_eq!(ctx.bibliography.apa.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_source_times_out() {
        let aggregator = ResearchAggregator::new(Duration::from_secs(1), 10, 100)
            .with_source(Arc::new(SlowSource), Duration::ZERO)
            .with_source(static_source("fast", vec![paper("Fast", None)]), Duration::ZERO);

        let ctx = aggregator.collect("q", &ResearchOptions::default()).await;
        assert_eq!(ctx.total_papers, 1);
        assert_eq!(ctx.source_counts["slow"], 0);
    }

    #[tokio::test]
    async fn test_news_skipped_when_disabled_and_cache_hit() {
        let source = static_source("a", vec![paper("Cached", None)]);
        let aggregator = ResearchAggregator::new(Duration::from_secs(5), 10, 100)
            .with_source(source.clone(), Duration::ZERO)
            .with_news(Arc::new(NewsSource));

        let options = ResearchOptions {
            include_news: false,
            ..Default::default()
        };
        let first = aggregator.collect("q", &options).await;
        let second = aggregator.collect("q", &options).await;

        assert!(first.news.is_empty());
        assert_eq!(second.total_papers, 1);
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_empty_results_are_not_cached() {
        let source = static_source("empty", Vec::new());
        let aggregator = ResearchAggregator::new(Duration::from_secs(5), 10, 100)
            .with_source(source.clone(), Duration::ZERO);

        aggregator.collect("q", &ResearchOptions::default()).await;
        aggregator.collect("q", &ResearchOptions::default()).await;

        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_cache_evicts_least_recently_used_query() {
        let source = static_source("a", vec![paper("Cached", None)]);
        let aggregator = ResearchAggregator::new(Duration::from_secs(5), 10, 100)
            .with_source(source.clone(), Duration::ZERO)
            .with_cache_capacity(1);
        let options = ResearchOptions::default();

        aggregator.collect("first", &options).await;
        aggregator.collect("second", &options).await;
        aggregator.collect("first", &options).await;

        assert_eq!(source.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_throttle_wait_counts_against_timeout() {
        let throttled = static_source("throttled", vec![paper("Throttled", None)]);
        let aggregator = ResearchAggregator::new(Duration::from_millis(200), 10, 100)
            .with_source(throttled.clone(), Duration::from_secs(60));
        let options = ResearchOptions::default();

        let first = aggregator.collect("first query", &options).await;
        let started = Instant::now();
        let second = aggregator.collect("second query", &options).await;

        assert_eq!(first.source_counts["throttled"], 1);
        assert_eq!(second.source_counts["throttled"], 0);
        assert!(started.elapsed() < Duration::from_secs(5));
        assert_eq!(throttled.calls.load(Ordering::SeqCst), 1);
    }
}
