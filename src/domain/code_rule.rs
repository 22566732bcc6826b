// ==========================================
// 编码规则引擎 - 编码规则实体
// ==========================================
// 职责: 定义 CodeRule 实体（租户内唯一的命名编码规则）
// 说明: expression 为模板表达式，如 "WS-{YYYY}{MM}{DD}-{SEQ:4}"
// ==========================================

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::types::SeqResetRule;

/// 编码规则实体
///
/// 对应 code_rule 表。约束：
/// - (tenant_id, code) 在未删除记录中唯一
/// - expression 必须可编译，且最多包含一个序号占位符
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodeRule {
    pub uuid: String,                   // 规则UUID
    pub tenant_id: i64,                 // 租户ID
    pub name: String,                   // 规则名称
    pub code: String,                   // 规则代码（租户内唯一）
    pub expression: String,             // 模板表达式
    pub description: Option<String>,    // 规则说明
    pub seq_start: i64,                 // 序号起始值（>=0）
    pub seq_step: i64,                  // 序号步长（>=1）
    pub seq_reset_rule: SeqResetRule,   // 序号重置规则
    pub is_system: bool,                // 系统规则（不可删除）
    pub is_active: bool,                // 是否启用
    pub created_at: String,             // 创建时间
    pub updated_at: String,             // 更新时间
}

impl CodeRule {
    /// 创建新的规则实体（自动生成 UUID 和时间戳）
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        tenant_id: i64,
        name: String,
        code: String,
        expression: String,
        description: Option<String>,
        seq_start: i64,
        seq_step: i64,
        seq_reset_rule: SeqResetRule,
        is_system: bool,
    ) -> Self {
        let now = chrono::Local::now()
            .format("%Y-%m-%d %H:%M:%S")
            .to_string();

        Self {
            uuid: Uuid::new_v4().to_string(),
            tenant_id,
            name,
            code,
            expression,
            description,
            seq_start,
            seq_step,
            seq_reset_rule,
            is_system,
            is_active: true,
            created_at: now.clone(),
            updated_at: now,
        }
    }
}
