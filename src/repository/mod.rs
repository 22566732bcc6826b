// ==========================================
// 编码规则引擎 - 数据仓储层
// ==========================================
// 职责: 数据访问（SQLite）
// ==========================================

pub mod code_rule_repo;
pub mod error;
pub mod page_binding_repo;
pub mod sequence_repo;

// 重导出核心类型
pub use code_rule_repo::CodeRuleRepository;
pub use error::{RepositoryError, RepositoryResult};
pub use page_binding_repo::PageBindingRepository;
pub use sequence_repo::SequenceRepository;
