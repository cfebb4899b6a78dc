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

use grantsmith::application::use_cases::auth_use_case::AuthUseCase;
use grantsmith::config::settings::Settings;
use grantsmith::domain::services::llm_service::{LlmClient, OpenAiClient};
use grantsmith::infrastructure::catalog::seed_catalog;
use grantsmith::infrastructure::database::connection;
use grantsmith::infrastructure::discovery::FundingDiscovery;
use grantsmith::infrastructure::metrics;
use grantsmith::infrastructure::repositories::proposal_type_repo_impl::ProposalTypeRepositoryImpl;
use grantsmith::infrastructure::repositories::user_repo_impl::UserRepositoryImpl;
use grantsmith::infrastructure::search::build_aggregator;
use grantsmith::presentation::routes::{self, AppComponents};
use grantsmith::utils::telemetry;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{info, warn};

const SESSION_PURGE_INTERVAL: Duration = Duration::from_secs(3600);

/// 主函数
///
/// 应用程序入口点，负责初始化所有组件并启动服务
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Load configuration
    let settings = Arc::new(Settings::new()?);

    // 2. Initialize logging and metrics
    telemetry::init_telemetry(&settings.logging);
    info!("Starting grantsmith...");
    metrics::init_metrics(&settings.metrics);

    // 3. Connect to database (migrations run here when enabled)
    let db = Arc::new(connection::connect_and_migrate(&settings.database).await?);
    info!("Database connection established");

    // 4. Seed the proposal type catalog
    if settings.database.seed_catalog {
        let type_repo = ProposalTypeRepositoryImpl::new(db.clone());
        let created = seed_catalog(&type_repo).await?;
        info!("Proposal catalog ready ({} new types)", created);
    }

    // 5. Initialize external services
    let llm: Arc<dyn LlmClient> = Arc::new(OpenAiClient::new(&settings.llm)?);
    if !llm.is_configured() {
        warn!("LLM API key not configured, generation endpoints will return 503");
    }
    let aggregator = Arc::new(build_aggregator(&settings));
    info!("Research sources: {:?}", aggregator.source_names());
    let discovery = Arc::new(FundingDiscovery::new(&settings.web));

    // 6. Purge expired sessions in the background
    let auth = AuthUseCase::new(
        Arc::new(UserRepositoryImpl::new(db.clone())),
        settings.auth.clone(),
    );
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(SESSION_PURGE_INTERVAL);
        loop {
            ticker.tick().await;
            match auth.purge_expired_sessions().await {
                Ok(0) => {}
                Ok(n) => info!("Purged {} expired sessions", n),
                Err(e) => warn!("Session purge failed: {}", e),
            }
        }
    });

    // 7. Start HTTP server
    let app = routes::routes(AppComponents {
        settings: settings.clone(),
        db,
        aggregator,
        llm,
        discovery,
    });

    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
