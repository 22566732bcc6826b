// ==========================================
// 编码规则引擎 - 领域层
// ==========================================
// 职责: 实体与类型定义
// ==========================================

pub mod code_rule;
pub mod page_binding;
pub mod types;

// 重导出核心类型
pub use code_rule::CodeRule;
pub use page_binding::{AvailableField, PageBindingOverride, PageRuleBinding};
pub use types::SeqResetRule;
