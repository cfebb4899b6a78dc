// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};

/// 图表类别
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum VisualKind {
    Figure,
    Table,
}

/// 图表数据
///
/// 以表格形式保存，导出器按需渲染为原生表格
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Visual {
    /// 标识：timeline、methodology、impact、gantt、budget、comparison
    pub id: String,
    pub kind: VisualKind,
    pub title: String,
    pub caption: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// 一份提案的全部图表
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct VisualSet {
    pub figures: Vec<Visual>,
    pub tables: Vec<Visual>,
}

impl VisualSet {
    pub fn total_count(&self) -> usize {
        self.figures.len() + self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total_count() == 0
    }

    /// 图在前、表在后
    pub fn iter(&self) -> impl Iterator<Item = &Visual> {
        self.figures.iter().chain(self.tables.iter())
    }
}
