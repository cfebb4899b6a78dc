// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use chrono::Utc;
use serde_json::json;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::application::dto::generation_request::{
    ComprehensiveGenerateDto, CompletionMetadata, EnhanceRequestDto, GenerationEvent,
    QuickGenerateDto, ResearchSearchDto, VisualCounts,
};
use crate::config::settings::GenerationSettings;
use crate::domain::models::analytics::{AnalyticsAction, AnalyticsEvent};
use crate::domain::models::proposal::{ProposalSection, ProposalStatus, SavedProposal};
use crate::domain::models::proposal_type::{ProposalTemplate, ProposalType};
use crate::domain::models::research::{ResearchContext, ResearchOptions};
use crate::domain::models::user::ProfileCounters;
use crate::domain::repositories::analytics_repository::AnalyticsRepository;
use crate::domain::repositories::proposal_repository::ProposalRepository;
use crate::domain::repositories::proposal_type_repository::ProposalTypeRepository;
use crate::domain::repositories::user_repository::UserRepository;
use crate::domain::repositories::RepositoryError;
use crate::domain::services::llm_service::LlmClient;
use crate::domain::services::prompt_builder::{self, ProposalBrief};
use crate::domain::services::proposal_enhancer::{ProposalEnhancer, StreamEvent};
use crate::domain::services::proposal_generator::{
    compile_proposal, GeneratedSection, ProposalGenerator,
};
use crate::domain::services::visuals_service;
use crate::infrastructure::metrics;
use crate::infrastructure::search::ResearchAggregator;
use crate::utils::text_processing::estimate_pages;

/// 快速生成所需的最少论文数
pub const MIN_QUICK_PAPERS: usize = 5;
const EVENT_BUFFER: usize = 32;
const RULE_WIDTH: usize = 80;
const DEFAULT_TYPE_NAME: &str = "Research Proposal";

#[derive(Error, Debug)]
pub enum GenerationUseCaseError {
    #[error("{0}")]
    ValidationError(String),
    #[error("Invalid proposal type")]
    InvalidProposalType,
    #[error("LLM API key not configured")]
    LlmUnavailable,
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

async fn send<E>(events: &mpsc::Sender<E>, event: E) -> bool {
    events.send(event).await.is_ok()
}

/// 检索与生成
///
/// 校验在调用方的请求内同步完成；生成过程在后台任务中运行，通过通道推送事件，
/// 接收端关闭后任务在下一次推送时结束
pub struct GenerationUseCase<P: ?Sized, T: ?Sized, U: ?Sized, A: ?Sized> {
    proposal_repo: Arc<P>,
    type_repo: Arc<T>,
    user_repo: Arc<U>,
    analytics_repo: Arc<A>,
    aggregator: Arc<ResearchAggregator>,
    llm: Arc<dyn LlmClient>,
    settings: GenerationSettings,
}

impl<P: ?Sized, T: ?Sized, U: ?Sized, A: ?Sized> Clone for GenerationUseCase<P, T, U, A> {
    fn clone(&self) -> Self {
        Self {
            proposal_repo: self.proposal_repo.clone(),
            type_repo: self.type_repo.clone(),
            user_repo: self.user_repo.clone(),
            analytics_repo: self.analytics_repo.clone(),
            aggregator: self.aggregator.clone(),
            llm: self.llm.clone(),
            settings: self.settings.clone(),
        }
    }
}

/// 完整生成的已校验输入
struct ComprehensiveJob {
    user_id: Uuid,
    proposal_type: Option<ProposalType>,
    templates: Vec<ProposalTemplate>,
    title: String,
    keywords: String,
    description: String,
    options: ResearchOptions,
}

impl<P, T, U, A> GenerationUseCase<P, T, U, A>
where
    P: ProposalRepository + ?Sized + 'static,
    T: ProposalTypeRepository + ?Sized + 'static,
    U: UserRepository + ?Sized + 'static,
    A: AnalyticsRepository + ?Sized + 'static,
{
    pub fn new(
        proposal_repo: Arc<P>,
        type_repo: Arc<T>,
        user_repo: Arc<U>,
        analytics_repo: Arc<A>,
        aggregator: Arc<ResearchAggregator>,
        llm: Arc<dyn LlmClient>,
        settings: GenerationSettings,
    ) -> Self {
        Self {
            proposal_repo,
            type_repo,
            user_repo,
            analytics_repo,
            aggregator,
            llm,
            settings,
        }
    }

    /// 仅执行检索与分析
    pub async fn search_research(
        &self,
        dto: ResearchSearchDto,
    ) -> Result<ResearchContext, GenerationUseCaseError> {
        dto.validate()
            .map_err(|e| GenerationUseCaseError::ValidationError(e.to_string()))?;
        if dto.query.trim().is_empty() {
            return Err(GenerationUseCaseError::ValidationError(
                "Query cannot be empty".to_string(),
            ));
        }

        let options = ResearchOptions::from(&dto);
        Ok(self.aggregator.collect(dto.query.trim(), &options).await)
    }

    /// 快速生成：默认章节计划，流式输出纯文本，不保存
    pub fn start_quick(
        &self,
        dto: QuickGenerateDto,
    ) -> Result<mpsc::Receiver<StreamEvent>, GenerationUseCaseError> {
        let title = dto.title.trim().to_string();
        let description = dto.description.trim().to_string();
        if title.is_empty() || description.is_empty() {
            return Err(GenerationUseCaseError::ValidationError(
                "Title and description required".to_string(),
            ));
        }
        if description.split_whitespace().count() < self.settings.min_description_words {
            return Err(GenerationUseCaseError::ValidationError(format!(
                "Please provide a more detailed description (minimum {} words recommended).",
                self.settings.min_description_words
            )));
        }
        self.ensure_llm()?;

        let keywords = match dto.keywords.trim() {
            "" => title.clone(),
            k => k.to_string(),
        };

        let (tx, rx) = mpsc::channel(EVENT_BUFFER);
        let this = self.clone();
        tokio::spawn(async move {
            this.run_quick(title, keywords, description, tx).await;
        });
        Ok(rx)
    }

    /// 完整生成：检索、图表、逐章节生成并保存
    pub async fn start_comprehensive(
        &self,
        user_id: Uuid,
        dto: ComprehensiveGenerateDto,
    ) -> Result<mpsc::Receiver<GenerationEvent>, GenerationUseCaseError> {
        let title = dto.title.trim().to_string();
        let description = dto.description.trim().to_string();
        if title.is_empty() || description.is_empty() {
            return Err(GenerationUseCaseError::ValidationError(
                "Title and description required".to_string(),
            ));
        }

        let (proposal_type, templates) = match dto.proposal_type_id {
            Some(type_id) => {
                let proposal_type = self
                    .type_repo
                    .find_by_id(type_id)
                    .await?
                    .filter(|t| t.is_active)
                    .ok_or(GenerationUseCaseError::InvalidProposalType)?;
                let templates = self.type_repo.templates_for(proposal_type.id).await?;
                (Some(proposal_type), templates)
            }
            None => (None, prompt_builder::default_section_plan()),
        };
        self.ensure_llm()?;

        let job = ComprehensiveJob {
            user_id,
            proposal_type,
            templates,
            keywords: match dto.keywords.trim() {
                "" => title.clone(),
                k => k.to_string(),
            },
            title,
            description,
            options: ResearchOptions {
                include_news: dto.include_news.unwrap_or(true),
                include_web: true,
                custom_urls: dto.custom_url_list(),
            },
        };

        let (tx, rx) = mpsc::channel(EVENT_BUFFER);
        let this = self.clone();
        tokio::spawn(async move {
            if let Err(e) = this.run_comprehensive(job, &tx).await {
                error!("Comprehensive generation failed: {}", e);
                send(&tx, GenerationEvent::error(format!("Error: {e}"))).await;
            }
        });
        Ok(rx)
    }

    /// 润色已有提案全文
    pub fn start_enhance(
        &self,
        dto: EnhanceRequestDto,
    ) -> Result<mpsc::Receiver<StreamEvent>, GenerationUseCaseError> {
        let original = dto.proposal_content.trim().to_string();
        if original.is_empty() {
            return Err(GenerationUseCaseError::ValidationError(
                "No proposal content provided".to_string(),
            ));
        }
        if original.chars().count() < self.settings.min_enhance_chars {
            return Err(GenerationUseCaseError::ValidationError(
                "Proposal too short. Generate a full RAG proposal first.".to_string(),
            ));
        }
        self.ensure_llm()?;

        let (tx, rx) = mpsc::channel(EVENT_BUFFER);
        let enhancer = ProposalEnhancer::new(self.llm.clone());
        tokio::spawn(async move {
            enhancer.enhance(&original, tx).await;
        });
        Ok(rx)
    }

    fn ensure_llm(&self) -> Result<(), GenerationUseCaseError> {
        if self.llm.is_configured() {
            Ok(())
        } else {
            Err(GenerationUseCaseError::LlmUnavailable)
        }
    }

    fn generator(&self) -> ProposalGenerator {
        ProposalGenerator::new(self.llm.clone(), self.settings.papers_per_section)
    }

    async fn run_quick(
        &self,
        title: String,
        keywords: String,
        description: String,
        tx: mpsc::Sender<StreamEvent>,
    ) {
        let rule = "=".repeat(RULE_WIDTH);
        if !send(
            &tx,
            StreamEvent::Status("Searching academic databases for relevant literature...".into()),
        )
        .await
        {
            return;
        }

        let query = format!("{title} {keywords} {description}");
        let options = ResearchOptions {
            include_news: false,
            include_web: false,
            custom_urls: Vec::new(),
        };
        let research = self.aggregator.collect(&query, &options).await;

        if research.total_papers < MIN_QUICK_PAPERS {
            send(
                &tx,
                StreamEvent::Error(format!(
                    "Insufficient relevant literature found ({} papers). Please refine your query with more specific keywords or try a different topic.",
                    research.total_papers
                )),
            )
            .await;
            return;
        }

        send(
            &tx,
            StreamEvent::Status(format!(
                "Successfully retrieved {} relevant papers. Analyzing and categorizing literature by themes...",
                research.total_papers
            )),
        )
        .await;
        send(&tx, StreamEvent::Content(format!("GRANT PROPOSAL\n{rule}\n\n"))).await;
        send(&tx, StreamEvent::Content(format!("Title: {title}\n"))).await;
        send(&tx, StreamEvent::Content(format!("Keywords: {keywords}\n"))).await;
        send(&tx, StreamEvent::Content("Duration: 36 months\n\n".into())).await;

        let brief = ProposalBrief {
            title: &title,
            keywords: &keywords,
            description: &description,
        };
        let context_md = prompt_builder::research_context_markdown(&research);
        let generator = self.generator();
        let plan = prompt_builder::default_section_plan();
        let total = plan.len();

        for (idx, template) in plan.iter().enumerate() {
            if !send(
                &tx,
                StreamEvent::Status(format!(
                    "Generating section {}/{}: {} (target: {} words)",
                    idx + 1,
                    total,
                    template.section_name,
                    template.max_words
                )),
            )
            .await
            {
                return;
            }

            match generator
                .generate_section(DEFAULT_TYPE_NAME, &brief, template, &research, &context_md)
                .await
            {
                Ok(section) => {
                    send(
                        &tx,
                        StreamEvent::Content(format!(
                            "\n{}. {}\n{rule}\n\n",
                            idx + 1,
                            section.name
                        )),
                    )
                    .await;
                    send(&tx, StreamEvent::Content(section.content)).await;
                    send(&tx, StreamEvent::Content("\n".into())).await;
                }
                Err(e) => {
                    warn!("Quick generation of '{}' failed: {}", template.section_name, e);
                    send(&tx, StreamEvent::Error(format!("Generation error: {e}"))).await;
                    return;
                }
            }
        }

        send(
            &tx,
            StreamEvent::Status("Generating comprehensive bibliography with APA citations...".into()),
        )
        .await;
        let references: Vec<String> = research
            .bibliography
            .apa
            .iter()
            .enumerate()
            .map(|(i, entry)| format!("[{}] {}", i + 1, entry))
            .collect();
        send(
            &tx,
            StreamEvent::Content(format!("\nREFERENCES\n{rule}\n\n{}\n", references.join("\n"))),
        )
        .await;
        send(
            &tx,
            StreamEvent::Complete(format!(
                "Proposal generation complete! Generated {} sections with {} peer-reviewed references.",
                total,
                references.len()
            )),
        )
        .await;
    }

    async fn run_comprehensive(
        &self,
        job: ComprehensiveJob,
        tx: &mpsc::Sender<GenerationEvent>,
    ) -> Result<(), GenerationUseCaseError> {
        let started = Instant::now();
        let type_name = job
            .proposal_type
            .as_ref()
            .map(|t| t.name.clone())
            .unwrap_or_else(|| DEFAULT_TYPE_NAME.to_string());

        if job.templates.is_empty() {
            send(
                tx,
                GenerationEvent::error(format!(
                    "No section templates are defined for {type_name}"
                )),
            )
            .await;
            return Ok(());
        }

        // 1. Research
        if !send(
            tx,
            GenerationEvent::phase("rag", "Searching academic databases + web sources..."),
        )
        .await
        {
            return Ok(());
        }
        let query = format!("{} {} {}", job.title, job.keywords, job.description);
        let research = self.aggregator.collect(&query, &job.options).await;
        let total_news = research.news.len();
        send(
            tx,
            GenerationEvent::RagComplete {
                total_papers: research.total_papers,
                total_news,
                sources: research.source_counts.clone(),
                message: format!(
                    "Found {} papers + {} news articles",
                    research.total_papers, total_news
                ),
            },
        )
        .await;

        // 2. Visuals
        send(
            tx,
            GenerationEvent::phase("visuals", "Generating professional tables and graphs..."),
        )
        .await;
        let visuals = visuals_service::generate_all(&research);
        send(
            tx,
            GenerationEvent::VisualsComplete {
                total_visuals: visuals.total_count(),
                message: format!(
                    "Generated {} professional figures and tables",
                    visuals.total_count()
                ),
            },
        )
        .await;

        // 3. Sections
        send(tx, GenerationEvent::phase("generation", "Generating proposal with AI...")).await;
        let total_sections = job.templates.len();
        send(
            tx,
            GenerationEvent::Info {
                message: format!("Generating {total_sections} sections for {type_name}"),
                total_sections,
            },
        )
        .await;

        let brief = ProposalBrief {
            title: &job.title,
            keywords: &job.keywords,
            description: &job.description,
        };
        let context_md = prompt_builder::research_context_markdown(&research);
        let generator = self.generator();
        let mut sections: Vec<GeneratedSection> = Vec::new();

        for (idx, template) in job.templates.iter().enumerate() {
            if !send(
                tx,
                GenerationEvent::SectionStart {
                    section_name: template.section_name.clone(),
                    section_number: idx + 1,
                    total_sections,
                },
            )
            .await
            {
                info!("Client disconnected, stopping generation of '{}'", job.title);
                return Ok(());
            }

            match generator
                .generate_section(&type_name, &brief, template, &research, &context_md)
                .await
            {
                Ok(section) => {
                    send(
                        tx,
                        GenerationEvent::SectionComplete {
                            section_name: section.name.clone(),
                            content: section.content.clone(),
                            word_count: section.word_count,
                        },
                    )
                    .await;
                    sections.push(section);
                }
                Err(e) => {
                    warn!("Section '{}' failed: {}", template.section_name, e);
                    send(
                        tx,
                        GenerationEvent::SectionError {
                            section_name: template.section_name.clone(),
                            error: e.to_string(),
                        },
                    )
                    .await;
                }
            }
        }

        if sections.is_empty() {
            send(tx, GenerationEvent::error("No sections could be generated")).await;
            return Ok(());
        }

        // 4. Save
        send(tx, GenerationEvent::phase("saving", "Saving proposal...")).await;
        let full_proposal = compile_proposal(&brief, &type_name, &sections);
        let word_count: i32 = sections.iter().map(|s| s.word_count as i32).sum();
        let citation_count = research.bibliography.apa.len() as i32;
        let now = Utc::now();
        let id = Uuid::new_v4();

        let proposal = SavedProposal {
            id,
            user_id: job.user_id,
            proposal_type_id: job.proposal_type.as_ref().map(|t| t.id),
            title: job.title.clone(),
            keywords: job.keywords.clone(),
            description: job.description.clone(),
            content: full_proposal.clone(),
            content_json: json!({
                "sections": sections,
                "visuals": visuals,
                "keywords": job.keywords,
                "research": {
                    "total_papers": research.total_papers,
                    "total_news": total_news,
                    "sources": research.source_counts,
                },
            }),
            retrieved_papers: serde_json::to_value(&research.papers).unwrap_or_else(|_| json!([])),
            citations_data: serde_json::to_value(&research.bibliography)
                .unwrap_or_else(|_| json!({})),
            word_count,
            citation_count,
            page_count: estimate_pages(word_count as usize) as i32,
            status: ProposalStatus::Draft,
            version: 1,
            is_latest: true,
            root_id: id,
            created_at: now,
            updated_at: now,
        };
        let section_rows: Vec<ProposalSection> = sections
            .iter()
            .enumerate()
            .map(|(idx, s)| ProposalSection {
                id: Uuid::new_v4(),
                proposal_id: id,
                section_name: s.name.clone(),
                section_order: idx as i32 + 1,
                content: s.content.clone(),
                word_count: s.word_count as i32,
                updated_at: now,
            })
            .collect();

        let saved = self.proposal_repo.create(&proposal, &section_rows).await?;
        self.user_repo
            .increment_counters(
                job.user_id,
                ProfileCounters {
                    proposals_generated: 1,
                    proposals_saved: 1,
                    words_generated: word_count as i64,
                },
            )
            .await?;

        let execution_time = started.elapsed().as_secs_f64();
        let event = AnalyticsEvent::new(
            job.user_id,
            AnalyticsAction::Generate,
            Some(saved.id),
            json!({
                "proposal_type": job.proposal_type.as_ref().map(|t| t.name.as_str()).unwrap_or("Dynamic"),
                "papers_retrieved": research.total_papers,
                "news_articles": total_news,
                "visuals_generated": visuals.total_count(),
                "title": job.title,
            }),
        )
        .with_execution_time(execution_time);
        if let Err(e) = self.analytics_repo.record(&event).await {
            warn!("Failed to record generate event: {}", e);
        }
        metrics::record_generation(execution_time);
        info!(
            "Generated proposal {} ({} sections, {} words) in {:.1}s",
            saved.id,
            sections.len(),
            word_count,
            execution_time
        );

        // 5. Done
        send(
            tx,
            GenerationEvent::Complete {
                proposal_id: saved.id,
                full_proposal,
                metadata: CompletionMetadata {
                    title: job.title,
                    sections,
                    word_count: saved.word_count,
                    citation_count: saved.citation_count,
                },
                bibliography: research.bibliography,
                visuals: VisualCounts {
                    count: visuals.total_count(),
                    figures: visuals.figures.len(),
                    tables: visuals.tables.len(),
                },
                message: "Proposal generation complete!".to_string(),
                execution_time,
            },
        )
        .await;

        Ok(())
    }
}
