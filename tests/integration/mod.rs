// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

pub mod analytics_test;
pub mod auth_test;
pub mod collaboration_test;
pub mod discovery_test;
pub mod export_test;
pub mod generation_test;
pub mod health_check;
pub mod helpers;
pub mod proposals_test;
