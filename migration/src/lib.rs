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

pub use sea_orm_migration::prelude::*;

mod m20260105_000001_create_accounts;
mod m20260105_000002_create_proposal_catalog;
mod m20260105_000003_create_saved_proposals;
mod m20260105_000004_create_collaboration;
mod m20260105_000005_create_analytics_events;
mod m20260112_000001_create_indexes;

/// 数据库迁移器
pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    /// 按执行顺序返回全部迁移
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260105_000001_create_accounts::Migration),
            Box::new(m20260105_000002_create_proposal_catalog::Migration),
            Box::new(m20260105_000003_create_saved_proposals::Migration),
            Box::new(m20260105_000004_create_collaboration::Migration),
            Box::new(m20260105_000005_create_analytics_events::Migration),
            Box::new(m20260112_000001_create_indexes::Migration),
        ]
    }
}
