// ==========================================
// 编码规则引擎 - 规则管理 API (Rule Registry)
// ==========================================
// 职责: 编码规则的租户级 CRUD 与系统规则播种
// 校验流程: 先编译表达式再落库——不可编译的规则永远不会被持久化
// ==========================================

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::api::error::{ApiError, ApiResult};
use crate::config::system_rules::system_rule_templates;
use crate::domain::code_rule::CodeRule;
use crate::domain::types::SeqResetRule;
use crate::engine::expression::compile;
use crate::repository::code_rule_repo::CodeRuleRepository;

// ==========================================
// CodeRuleApi - 规则管理 API
// ==========================================

/// 规则管理API
///
/// 职责：
/// 1. 规则 CRUD（创建/查询/更新/删除/列表）
/// 2. 保存前表达式编译校验
/// 3. 系统规则模板播种
pub struct CodeRuleApi {
    code_rule_repo: Arc<CodeRuleRepository>,
}

impl CodeRuleApi {
    /// 创建新的CodeRuleApi实例
    pub fn new(code_rule_repo: Arc<CodeRuleRepository>) -> Self {
        Self { code_rule_repo }
    }

    /// 创建规则
    ///
    /// # 错误
    /// - InvalidExpression: 表达式编译失败（规则不落库）
    /// - DuplicateRuleCode: 租户内规则代码已存在
    /// - InvalidInput: 名称/代码为空，或序号参数非法
    pub fn create(&self, tenant_id: i64, data: CreateCodeRuleData) -> ApiResult<CodeRule> {
        Self::validate_seq_params(data.seq_start, data.seq_step)?;
        if data.name.trim().is_empty() {
            return Err(ApiError::InvalidInput("规则名称不能为空".to_string()));
        }
        if data.code.trim().is_empty() {
            return Err(ApiError::InvalidInput("规则代码不能为空".to_string()));
        }

        // 保存前编译校验
        compile(&data.expression)?;

        // 预检代码冲突（并发窗口由唯一索引兜底）
        if self
            .code_rule_repo
            .find_by_code(tenant_id, &data.code)?
            .is_some()
        {
            return Err(ApiError::DuplicateRuleCode(data.code));
        }

        let rule = CodeRule::new(
            tenant_id,
            data.name,
            data.code,
            data.expression,
            data.description,
            data.seq_start,
            data.seq_step,
            data.seq_reset_rule,
            false,
        );
        self.code_rule_repo.insert(&rule)?;

        info!(tenant_id, code = %rule.code, "创建编码规则: {}", rule.name);
        Ok(rule)
    }

    /// 按 UUID 查询规则
    pub fn get(&self, uuid: &str) -> ApiResult<CodeRule> {
        self.code_rule_repo
            .find_by_uuid(uuid)?
            .ok_or_else(|| ApiError::NotFound(format!("编码规则(uuid={})不存在", uuid)))
    }

    /// 更新规则（仅覆盖提供的字段）
    ///
    /// 提供了新表达式时同样先编译校验再落库。
    pub fn update(&self, uuid: &str, data: UpdateCodeRuleData) -> ApiResult<CodeRule> {
        let mut rule = self.get(uuid)?;

        if let Some(expression) = data.expression {
            compile(&expression)?;
            rule.expression = expression;
        }
        if let Some(name) = data.name {
            if name.trim().is_empty() {
                return Err(ApiError::InvalidInput("规则名称不能为空".to_string()));
            }
            rule.name = name;
        }
        if let Some(description) = data.description {
            rule.description = Some(description);
        }
        if let Some(seq_start) = data.seq_start {
            rule.seq_start = seq_start;
        }
        if let Some(seq_step) = data.seq_step {
            rule.seq_step = seq_step;
        }
        Self::validate_seq_params(rule.seq_start, rule.seq_step)?;
        if let Some(seq_reset_rule) = data.seq_reset_rule {
            rule.seq_reset_rule = seq_reset_rule;
        }
        if let Some(is_active) = data.is_active {
            rule.is_active = is_active;
        }

        self.code_rule_repo.update(&rule)?;
        info!(code = %rule.code, "更新编码规则: {}", rule.uuid);

        // 回读以获得仓储侧刷新的 updated_at
        self.get(uuid)
    }

    /// 删除规则（软删除）
    ///
    /// # 错误
    /// - ProtectedRule: 系统规则不可删除
    pub fn delete(&self, uuid: &str) -> ApiResult<()> {
        let rule = self.get(uuid)?;
        if rule.is_system {
            return Err(ApiError::ProtectedRule(rule.code));
        }

        self.code_rule_repo.soft_delete(uuid)?;
        info!(code = %rule.code, "删除编码规则: {}", uuid);
        Ok(())
    }

    /// 列出租户规则（可选关键字过滤）
    pub fn list(&self, tenant_id: i64, keyword: Option<&str>) -> ApiResult<Vec<CodeRule>> {
        Ok(self.code_rule_repo.list(tenant_id, keyword)?)
    }

    /// 为租户播种系统规则模板（幂等，已存在的代码跳过）
    ///
    /// # 返回
    /// - Ok(usize): 本次新建的规则数
    pub fn seed_system_rules(&self, tenant_id: i64) -> ApiResult<usize> {
        let mut created = 0;
        for template in system_rule_templates() {
            if self
                .code_rule_repo
                .find_by_code(tenant_id, template.code)?
                .is_some()
            {
                continue;
            }

            let rule = CodeRule::new(
                tenant_id,
                template.name.to_string(),
                template.code.to_string(),
                template.expression.to_string(),
                Some(template.description.to_string()),
                template.seq_start,
                template.seq_step,
                template.seq_reset_rule,
                true,
            );
            self.code_rule_repo.insert(&rule)?;
            created += 1;
        }

        info!(tenant_id, created, "播种系统编码规则");
        Ok(created)
    }

    fn validate_seq_params(seq_start: i64, seq_step: i64) -> ApiResult<()> {
        if seq_start < 0 {
            return Err(ApiError::InvalidInput(format!(
                "序号起始值不能为负: {}",
                seq_start
            )));
        }
        if seq_step < 1 {
            return Err(ApiError::InvalidInput(format!(
                "序号步长必须>=1: {}",
                seq_step
            )));
        }
        Ok(())
    }
}

// ==========================================
// DTO 类型定义
// ==========================================

/// 创建规则请求
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCodeRuleData {
    pub name: String,
    pub code: String,
    pub expression: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_seq_start")]
    pub seq_start: i64,
    #[serde(default = "default_seq_step")]
    pub seq_step: i64,
    #[serde(default)]
    pub seq_reset_rule: SeqResetRule,
}

/// 更新规则请求（None 表示不变更该字段）
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateCodeRuleData {
    pub name: Option<String>,
    pub expression: Option<String>,
    pub description: Option<String>,
    pub seq_start: Option<i64>,
    pub seq_step: Option<i64>,
    pub seq_reset_rule: Option<SeqResetRule>,
    pub is_active: Option<bool>,
}

fn default_seq_start() -> i64 {
    1
}

fn default_seq_step() -> i64 {
    1
}
