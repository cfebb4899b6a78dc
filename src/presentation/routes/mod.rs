// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::Settings;
use crate::domain::repositories::user_repository::UserRepository;
use crate::domain::services::llm_service::LlmClient;
use crate::infrastructure::discovery::FundingDiscovery;
use crate::infrastructure::repositories::analytics_repo_impl::AnalyticsRepositoryImpl;
use crate::infrastructure::repositories::collaboration_repo_impl::CollaborationRepositoryImpl;
use crate::infrastructure::repositories::proposal_repo_impl::ProposalRepositoryImpl;
use crate::infrastructure::repositories::proposal_type_repo_impl::ProposalTypeRepositoryImpl;
use crate::infrastructure::repositories::user_repo_impl::UserRepositoryImpl;
use crate::infrastructure::search::ResearchAggregator;
use crate::presentation::handlers::{
    analytics_handler, auth_handler, catalog_handler, collaboration_handler, discovery_handler,
    export_handler, generation_handler, proposal_handler, section_handler,
};
use crate::presentation::middleware::auth_middleware::{auth_middleware, AuthState};
use axum::{
    routing::{delete, get, post, put},
    Extension, Router,
};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

type P = ProposalRepositoryImpl;
type C = CollaborationRepositoryImpl;
type T = ProposalTypeRepositoryImpl;
type U = UserRepositoryImpl;
type A = AnalyticsRepositoryImpl;

/// 路由依赖的共享组件
#[derive(Clone)]
pub struct AppComponents {
    pub settings: Arc<Settings>,
    pub db: Arc<DatabaseConnection>,
    pub aggregator: Arc<ResearchAggregator>,
    pub llm: Arc<dyn LlmClient>,
    pub discovery: Arc<FundingDiscovery>,
}

/// 创建应用路由
///
/// # 参数
///
/// * `components` - 配置、数据库连接与外部服务
///
/// # 返回值
///
/// 返回配置好的路由；除健康检查、版本、注册与登录外，所有端点都需要登录
pub fn routes(components: AppComponents) -> Router {
    let proposal_repo = Arc::new(P::new(components.db.clone()));
    let collab_repo = Arc::new(C::new(components.db.clone()));
    let type_repo = Arc::new(T::new(components.db.clone()));
    let user_repo = Arc::new(U::new(components.db.clone()));
    let analytics_repo = Arc::new(A::new(components.db.clone()));

    let auth_state = AuthState {
        user_repo: user_repo.clone() as Arc<dyn UserRepository>,
        settings: components.settings.auth.clone(),
    };

    let public_routes = Router::new()
        .route("/health", get(health_check))
        .route("/v1/version", get(version))
        .route("/v1/auth/register", post(auth_handler::register::<U>))
        .route("/v1/auth/login", post(auth_handler::login::<U>));

    let protected_routes = Router::new()
        .route("/v1/auth/logout", post(auth_handler::logout::<U>))
        .route(
            "/v1/profile",
            get(auth_handler::get_profile::<U>).put(auth_handler::update_profile::<U>),
        )
        .route("/v1/dashboard", get(analytics_handler::dashboard::<P, T, U, A>))
        .route("/v1/analytics", get(analytics_handler::analytics::<P, T, U, A>))
        .route(
            "/v1/proposal-types",
            get(catalog_handler::list_proposal_types::<T>),
        )
        .route(
            "/v1/proposal-types/{id}",
            get(catalog_handler::get_proposal_type::<T>),
        )
        .route(
            "/v1/research/search",
            post(generation_handler::search_research::<P, T, U, A>),
        )
        .route(
            "/v1/generate",
            post(generation_handler::quick_generate::<P, T, U, A>),
        )
        .route(
            "/v1/generate/comprehensive",
            post(generation_handler::comprehensive_generate::<P, T, U, A>),
        )
        .route(
            "/v1/enhance",
            post(generation_handler::enhance_proposal::<P, T, U, A>),
        )
        .route(
            "/v1/proposals",
            get(proposal_handler::list_proposals::<P, C, T, U, A>)
                .post(proposal_handler::save_proposal::<P, C, T, U, A>),
        )
        .route(
            "/v1/proposals/shared",
            get(proposal_handler::list_shared_proposals::<P, C, T, U, A>),
        )
        .route(
            "/v1/proposals/{id}",
            get(proposal_handler::get_proposal::<P, C, T, U, A>)
                .put(proposal_handler::update_proposal::<P, C, T, U, A>)
                .delete(proposal_handler::delete_proposal::<P, C, T, U, A>),
        )
        .route(
            "/v1/proposals/{id}/versions",
            get(proposal_handler::list_versions::<P, C, T, U, A>)
                .post(proposal_handler::create_version::<P, C, T, U, A>),
        )
        .route(
            "/v1/proposals/{id}/export/{format}",
            get(export_handler::export_proposal::<P, C, T, A>),
        )
        .route(
            "/v1/sections/{id}",
            put(section_handler::update_section::<P, C, A>),
        )
        .route(
            "/v1/sections/{id}/ai-edit",
            post(section_handler::ai_edit_section::<P, C, A>),
        )
        .route(
            "/v1/proposals/{id}/collaborators",
            get(collaboration_handler::list_collaborators::<P, C, U>)
                .post(collaboration_handler::add_collaborator::<P, C, U>),
        )
        .route(
            "/v1/proposals/{id}/collaborators/{user_id}",
            delete(collaboration_handler::remove_collaborator::<P, C, U>),
        )
        .route(
            "/v1/proposals/{id}/comments",
            get(collaboration_handler::list_comments::<P, C, U>)
                .post(collaboration_handler::add_comment::<P, C, U>),
        )
        .route(
            "/v1/comments/{id}/resolve",
            put(collaboration_handler::resolve_comment::<P, C, U>),
        )
        .route(
            "/v1/comments/{id}",
            delete(collaboration_handler::delete_comment::<P, C, U>),
        )
        .route("/v1/discover/calls", get(discovery_handler::discover_calls))
        .route(
            "/v1/discover/requirements",
            post(discovery_handler::call_requirements),
        )
        .route(
            "/v1/discover/structure",
            get(discovery_handler::dynamic_structure),
        )
        .layer(axum::middleware::from_fn_with_state(
            auth_state,
            auth_middleware,
        ));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(Extension(proposal_repo))
        .layer(Extension(collab_repo))
        .layer(Extension(type_repo))
        .layer(Extension(user_repo))
        .layer(Extension(analytics_repo))
        .layer(Extension(components.aggregator))
        .layer(Extension(components.llm))
        .layer(Extension(components.discovery))
        .layer(Extension(components.settings))
        .layer(TraceLayer::new_for_http())
}

/// 健康检查端点
///
/// # 返回值
///
/// 返回"OK"字符串
pub async fn health_check() -> &'static str {
    "OK"
}

/// 版本信息端点
///
/// # 返回值
///
/// 返回应用版本号
pub async fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
