// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 检索领域模块
///
/// 定义学术检索源接口，具体实现位于基础设施层
pub mod source;
