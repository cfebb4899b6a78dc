// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use sea_orm_migration::prelude::*;

/// grantsmith 迁移命令行
///
/// 支持 `up`、`down`、`status`、`fresh` 等子命令，数据库地址取自 `DATABASE_URL`
#[async_std::main]
async fn main() {
    cli::run_cli(migration::Migrator).await;
}
