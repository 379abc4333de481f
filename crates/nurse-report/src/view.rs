//! 报告视图树
//!
//! 渲染器生成一棵与输出介质无关的节点树。屏幕显示和 PDF 导出遍历的是同一棵树，
//! 区别只在于按 [`Visibility`] 过滤节点，因此导出结果与屏幕内容保持一致。

use nurse_core::CaseId;
use serde::{Deserialize, Serialize};

/// 输出介质
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Medium {
    Screen, // 终端屏幕
    Print,  // 导出文档
}

/// 节点可见性
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Visibility {
    #[default]
    Always,
    ScreenOnly, // 导航、操作按钮
    PrintOnly,  // 打印页脚
}

impl Visibility {
    pub fn is_shown_on(self, medium: Medium) -> bool {
        match (self, medium) {
            (Self::Always, _) => true,
            (Self::ScreenOnly, Medium::Screen) => true,
            (Self::PrintOnly, Medium::Print) => true,
            _ => false,
        }
    }
}

/// 视觉强调程度，随紧急程度升级
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Emphasis {
    Strong,
    Moderate,
    #[default]
    Neutral,
}

/// 节点在报告中的角色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SectionRole {
    Chrome,
    Header,
    PatientSummary,
    Analysis,
    AnalysisPlaceholder,
    Referral,
    Justification,
    Diagnoses,
    Conduct,
    Footer,
}

/// 节点中的内容块
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Block {
    Heading(String),
    Field { label: String, value: String },
    Text(String),
    Badge { label: String, emphasis: Emphasis },
    /// 列表项，`tag` 用于标注类别或可能性
    Item { text: String, tag: Option<String> },
    /// 小字说明
    Note(String),
    Action(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportNode {
    pub role: SectionRole,
    pub visibility: Visibility,
    pub blocks: Vec<Block>,
    pub children: Vec<ReportNode>,
}

impl ReportNode {
    pub fn new(role: SectionRole) -> Self {
        Self {
            role,
            visibility: Visibility::Always,
            blocks: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn block(mut self, block: Block) -> Self {
        self.blocks.push(block);
        self
    }

    pub fn child(mut self, child: ReportNode) -> Self {
        self.children.push(child);
        self
    }

    fn find(&self, role: SectionRole) -> Option<&ReportNode> {
        if self.role == role {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(role))
    }

    fn collect_blocks<'a>(&'a self, medium: Medium, out: &mut Vec<&'a Block>) {
        if !self.visibility.is_shown_on(medium) {
            return;
        }
        out.extend(self.blocks.iter());
        for child in &self.children {
            child.collect_blocks(medium, out);
        }
    }
}

/// 渲染完成的报告
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportView {
    pub case_id: CaseId,
    pub patient_name: String,
    pub title: String,
    pub nodes: Vec<ReportNode>,
}

impl ReportView {
    /// 按角色查找节点（深度优先）
    pub fn find(&self, role: SectionRole) -> Option<&ReportNode> {
        self.nodes.iter().find_map(|node| node.find(role))
    }

    pub fn contains(&self, role: SectionRole) -> bool {
        self.find(role).is_some()
    }

    /// 指定介质上可见的内容块，保持文档顺序
    pub fn visible_blocks(&self, medium: Medium) -> Vec<&Block> {
        let mut blocks = Vec::new();
        for node in &self.nodes {
            node.collect_blocks(medium, &mut blocks);
        }
        blocks
    }
}
