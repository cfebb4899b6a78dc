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

use axum::{
    extract::Extension,
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
    Json,
};
use futures::stream::{self, Stream};
use serde::Serialize;
use serde_json::json;
use std::convert::Infallible;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::error;

use crate::{
    application::{
        dto::generation_request::{
            ComprehensiveGenerateDto, EnhanceRequestDto, QuickGenerateDto, ResearchSearchDto,
        },
        use_cases::generation_use_case::{GenerationUseCase, GenerationUseCaseError},
    },
    config::settings::Settings,
    domain::{
        repositories::{
            analytics_repository::AnalyticsRepository, proposal_repository::ProposalRepository,
            proposal_type_repository::ProposalTypeRepository, user_repository::UserRepository,
        },
        services::llm_service::LlmClient,
    },
    infrastructure::search::ResearchAggregator,
    presentation::{errors::error_response, extractors::current_user::CurrentUser},
};

/// 将事件通道转为 SSE 响应，每个事件一行 `data: <json>`
pub fn event_stream<E>(rx: mpsc::Receiver<E>) -> Sse<impl Stream<Item = Result<Event, Infallible>>>
where
    E: Serialize + Send + 'static,
{
    let events = stream::unfold(rx, |mut rx| async move {
        let event = rx.recv().await?;
        let data = serde_json::to_string(&event).unwrap_or_else(|e| {
            error!("Failed to serialize stream event: {}", e);
            json!({ "type": "error", "message": "Internal server error" }).to_string()
        });
        Some((Ok(Event::default().data(data)), rx))
    });
    Sse::new(events).keep_alive(KeepAlive::default())
}

fn sse_response<E>(started: Result<mpsc::Receiver<E>, GenerationUseCaseError>) -> Response
where
    E: Serialize + Send + 'static,
{
    match started {
        Ok(rx) => event_stream(rx).into_response(),
        Err(e) => error_response(e),
    }
}

/// 仅检索与分析，不调用大模型
pub async fn search_research<P, T, U, A>(
    Extension(proposal_repo): Extension<Arc<P>>,
    Extension(type_repo): Extension<Arc<T>>,
    Extension(user_repo): Extension<Arc<U>>,
    Extension(analytics_repo): Extension<Arc<A>>,
    Extension(aggregator): Extension<Arc<ResearchAggregator>>,
    Extension(llm): Extension<Arc<dyn LlmClient>>,
    Extension(settings): Extension<Arc<Settings>>,
    _user: CurrentUser,
    Json(payload): Json<ResearchSearchDto>,
) -> impl IntoResponse
where
    P: ProposalRepository + 'static,
    T: ProposalTypeRepository + 'static,
    U: UserRepository + 'static,
    A: AnalyticsRepository + 'static,
{
    let use_case = GenerationUseCase::new(
        proposal_repo,
        type_repo,
        user_repo,
        analytics_repo,
        aggregator,
        llm,
        settings.generation.clone(),
    );
    match use_case.search_research(payload).await {
        Ok(context) => (StatusCode::OK, Json(context)).into_response(),
        Err(e) => error_response(e),
    }
}

/// 快速生成，流式返回纯文本提案
pub async fn quick_generate<P, T, U, A>(
    Extension(proposal_repo): Extension<Arc<P>>,
    Extension(type_repo): Extension<Arc<T>>,
    Extension(user_repo): Extension<Arc<U>>,
    Extension(analytics_repo): Extension<Arc<A>>,
    Extension(aggregator): Extension<Arc<ResearchAggregator>>,
    Extension(llm): Extension<Arc<dyn LlmClient>>,
    Extension(settings): Extension<Arc<Settings>>,
    _user: CurrentUser,
    Json(payload): Json<QuickGenerateDto>,
) -> Response
where
    P: ProposalRepository + 'static,
    T: ProposalTypeRepository + 'static,
    U: UserRepository + 'static,
    A: AnalyticsRepository + 'static,
{
    let use_case = GenerationUseCase::new(
        proposal_repo,
        type_repo,
        user_repo,
        analytics_repo,
        aggregator,
        llm,
        settings.generation.clone(),
    );
    sse_response(use_case.start_quick(payload))
}

/// 完整生成：逐章节推送进度，完成后保存
pub async fn comprehensive_generate<P, T, U, A>(
    Extension(proposal_repo): Extension<Arc<P>>,
    Extension(type_repo): Extension<Arc<T>>,
    Extension(user_repo): Extension<Arc<U>>,
    Extension(analytics_repo): Extension<Arc<A>>,
    Extension(aggregator): Extension<Arc<ResearchAggregator>>,
    Extension(llm): Extension<Arc<dyn LlmClient>>,
    Extension(settings): Extension<Arc<Settings>>,
    user: CurrentUser,
    Json(payload): Json<ComprehensiveGenerateDto>,
) -> Response
where
    P: ProposalRepository + 'static,
    T: ProposalTypeRepository + 'static,
    U: UserRepository + 'static,
    A: AnalyticsRepository + 'static,
{
    let use_case = GenerationUseCase::new(
        proposal_repo,
        type_repo,
        user_repo,
        analytics_repo,
        aggregator,
        llm,
        settings.generation.clone(),
    );
    sse_response(use_case.start_comprehensive(user.id, payload).await)
}

/// 逐章节润色已有提案
pub async fn enhance_proposal<P, T, U, A>(
    Extension(proposal_repo): Extension<Arc<P>>,
    Extension(type_repo): Extension<Arc<T>>,
    Extension(user_repo): Extension<Arc<U>>,
    Extension(analytics_repo): Extension<Arc<A>>,
    Extension(aggregator): Extension<Arc<ResearchAggregator>>,
    Extension(llm): Extension<Arc<dyn LlmClient>>,
    Extension(settings): Extension<Arc<Settings>>,
    _user: CurrentUser,
    Json(payload): Json<EnhanceRequestDto>,
) -> Response
where
    P: ProposalRepository + 'static,
    T: ProposalTypeRepository + 'static,
    U: UserRepository + 'static,
    A: AnalyticsRepository + 'static,
{
    let use_case = GenerationUseCase::new(
        proposal_repo,
        type_repo,
        user_repo,
        analytics_repo,
        aggregator,
        llm,
        settings.generation.clone(),
    );
    sse_response(use_case.start_enhance(payload))
}

impl From<GenerationUseCaseError> for (StatusCode, String) {
    fn from(err: GenerationUseCaseError) -> Self {
        match err {
            GenerationUseCaseError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg),
            GenerationUseCaseError::InvalidProposalType => {
                (StatusCode::BAD_REQUEST, "Invalid proposal type".to_string())
            }
            GenerationUseCaseError::LlmUnavailable => (
                StatusCode::SERVICE_UNAVAILABLE,
                "LLM API key not configured".to_string(),
            ),
            GenerationUseCaseError::Repository(e) => e.into(),
        }
    }
}
