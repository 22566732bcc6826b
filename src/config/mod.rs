// ==========================================
// 编码规则引擎 - 配置层
// ==========================================
// 职责: 引擎运行参数与内置目录（页面目录、系统规则模板）
// ==========================================

pub mod page_defaults;
pub mod system_rules;

pub use page_defaults::{builtin_pages, find_builtin_page, PageDefault};
pub use system_rules::{system_rule_templates, SystemRuleTemplate};

/// 取号引擎运行参数
///
/// 日历口径: 日期占位符与计数桶标签统一按 UTC 日历日推导
/// （API 层取 Utc::now().date_naive()），避免实例时区差异破坏确定性。
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// 预览取号的重复重试上限（重试耗尽报 CodeExhausted，
    /// 提示操作员加大序号宽度或调整重置周期）
    pub max_duplicate_retries: u32,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            max_duplicate_retries: 5,
        }
    }
}
