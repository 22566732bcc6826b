// ==========================================
// 编码规则引擎 - 取号 API
// ==========================================
// 职责: generate / test_generate 两个取号入口
// 语义:
// - generate:      正式取号，消费一个序号值（表达式含序号位时），无重复重试
// - test_generate: 预览取号，只 peek 不推进计数器；可选重复规避
//                  （有界重试，耗尽报 CodeExhausted）
// 日历口径: UTC 日历日（generate/test_generate 内部取 Utc::now()；
//           *_on 变体接收显式日期，供测试与回放）
// ==========================================

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::api::error::{ApiError, ApiResult};
use crate::config::GeneratorConfig;
use crate::domain::code_rule::CodeRule;
use crate::engine::expression::{compile, CompiledExpression};
use crate::engine::renderer::{render, RenderContext};
use crate::repository::code_rule_repo::CodeRuleRepository;
use crate::repository::error::RepositoryResult;
use crate::repository::sequence_repo::SequenceRepository;

// ==========================================
// 重复检查能力（注入的协作方接口）
// ==========================================

/// 既有编码存在性探测
///
/// 由各实体 CRUD 服务注入：引擎本身不拥有业务实体存储，只询问
/// "entity_type 下是否已有某编码"。手工录入/导入的历史编码可能抢在
/// 计数器前面，单靠计数推进无法保证唯一，预览路径靠它规避。
pub trait ExistingCodeStore: Send + Sync {
    fn code_exists(&self, tenant_id: i64, entity_type: &str, code: &str)
        -> RepositoryResult<bool>;
}

// ==========================================
// DTO 类型定义
// ==========================================

/// 取号请求
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateRequest {
    /// 规则代码
    pub rule_code: String,
    /// 记录字段值，供 {FIELD:name} 引用
    #[serde(default)]
    pub fields: HashMap<String, String>,
    /// 实体类型（重复检查用）
    #[serde(default)]
    pub entity_type: Option<String>,
    /// 是否做重复规避（仅 test_generate 生效）
    #[serde(default)]
    pub check_duplicate: bool,
}

impl GenerateRequest {
    pub fn new(rule_code: &str) -> Self {
        Self {
            rule_code: rule_code.to_string(),
            fields: HashMap::new(),
            entity_type: None,
            check_duplicate: false,
        }
    }
}

/// 取号响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub code: String,
    pub rule_name: String,
}

// ==========================================
// GenerateApi - 取号 API
// ==========================================

/// 编译缓存项（表达式文本变更时失效重编）
struct CachedCompiled {
    expression: String,
    compiled: CompiledExpression,
}

pub struct GenerateApi {
    code_rule_repo: Arc<CodeRuleRepository>,
    sequence_repo: Arc<SequenceRepository>,
    code_probe: Option<Arc<dyn ExistingCodeStore>>,
    config: GeneratorConfig,
    compile_cache: Mutex<HashMap<(i64, String), CachedCompiled>>,
}

impl GenerateApi {
    /// 创建新的GenerateApi实例
    pub fn new(
        code_rule_repo: Arc<CodeRuleRepository>,
        sequence_repo: Arc<SequenceRepository>,
        code_probe: Option<Arc<dyn ExistingCodeStore>>,
        config: GeneratorConfig,
    ) -> Self {
        Self {
            code_rule_repo,
            sequence_repo,
            code_probe,
            config,
            compile_cache: Mutex::new(HashMap::new()),
        }
    }

    // ==========================================
    // 正式取号
    // ==========================================

    /// 正式取号（按 UTC 当前日期）
    ///
    /// 消费一个序号值；即使调用方最终未保存记录，该值也不回收。
    pub fn generate(&self, tenant_id: i64, request: &GenerateRequest) -> ApiResult<GenerateResponse> {
        self.generate_on(tenant_id, request, Utc::now().date_naive())
    }

    /// 正式取号（显式日期，供测试与回放）
    pub fn generate_on(
        &self,
        tenant_id: i64,
        request: &GenerateRequest,
        date: NaiveDate,
    ) -> ApiResult<GenerateResponse> {
        let rule = self.load_active_rule(tenant_id, &request.rule_code)?;
        let compiled = self.compiled_for(tenant_id, &rule)?;

        // 表达式不含序号位时不消费计数器
        let sequence_value = if compiled.has_sequence() {
            self.sequence_repo.next(
                tenant_id,
                &rule.code,
                date,
                rule.seq_reset_rule,
                rule.seq_start,
                rule.seq_step,
            )?
        } else {
            0
        };

        let ctx = RenderContext::new(date, request.fields.clone(), sequence_value);
        let code = render(&compiled, &ctx)?;

        debug!(tenant_id, rule_code = %rule.code, %code, "正式取号");
        Ok(GenerateResponse {
            code,
            rule_name: rule.name,
        })
    }

    // ==========================================
    // 预览取号
    // ==========================================

    /// 预览取号（按 UTC 当前日期）
    ///
    /// 只 peek 不推进计数器：任意次预览不改变后续正式取号的结果。
    /// check_duplicate=true 且提供 entity_type 时做重复规避，
    /// 有界重试（初次 + max_duplicate_retries 次），耗尽报 CodeExhausted。
    pub fn test_generate(
        &self,
        tenant_id: i64,
        request: &GenerateRequest,
    ) -> ApiResult<GenerateResponse> {
        self.test_generate_on(tenant_id, request, Utc::now().date_naive())
    }

    /// 预览取号（显式日期，供测试与回放）
    pub fn test_generate_on(
        &self,
        tenant_id: i64,
        request: &GenerateRequest,
        date: NaiveDate,
    ) -> ApiResult<GenerateResponse> {
        let rule = self.load_active_rule(tenant_id, &request.rule_code)?;
        let compiled = self.compiled_for(tenant_id, &rule)?;

        let base_value = if compiled.has_sequence() {
            self.sequence_repo.peek(
                tenant_id,
                &rule.code,
                date,
                rule.seq_reset_rule,
                rule.seq_start,
                rule.seq_step,
            )?
        } else {
            0
        };

        let probe = match (&self.code_probe, request.check_duplicate, &request.entity_type) {
            (Some(probe), true, Some(entity_type)) => Some((probe, entity_type.as_str())),
            (None, true, Some(_)) => {
                warn!(
                    tenant_id,
                    rule_code = %rule.code,
                    "请求了重复检查但未注入编码探测能力，跳过检查"
                );
                None
            }
            _ => None,
        };

        let (probe, entity_type) = match probe {
            Some(pair) => pair,
            None => {
                let ctx = RenderContext::new(date, request.fields.clone(), base_value);
                let code = render(&compiled, &ctx)?;
                return Ok(GenerateResponse {
                    code,
                    rule_name: rule.name,
                });
            }
        };

        // 重复规避: 候选序号逐步推进，计数器本身不动
        let total_attempts = self.config.max_duplicate_retries + 1;
        for attempt in 0..total_attempts {
            let candidate = base_value + i64::from(attempt) * rule.seq_step;
            let ctx = RenderContext::new(date, request.fields.clone(), candidate);
            let code = render(&compiled, &ctx)?;

            if probe.code_exists(tenant_id, entity_type, &code)? {
                debug!(
                    tenant_id,
                    rule_code = %rule.code,
                    %code,
                    attempt,
                    "预览编码已被占用，推进候选序号"
                );
                continue;
            }

            return Ok(GenerateResponse {
                code,
                rule_name: rule.name,
            });
        }

        Err(ApiError::CodeExhausted {
            attempts: total_attempts,
        })
    }

    // ==========================================
    // 内部辅助
    // ==========================================

    /// 加载启用状态的规则
    fn load_active_rule(&self, tenant_id: i64, rule_code: &str) -> ApiResult<CodeRule> {
        let rule = self
            .code_rule_repo
            .find_by_code(tenant_id, rule_code)?
            .ok_or_else(|| ApiError::NotFound(format!("编码规则(code={})不存在", rule_code)))?;

        if !rule.is_active {
            return Err(ApiError::InvalidInput(format!(
                "编码规则{}未启用",
                rule_code
            )));
        }
        Ok(rule)
    }

    /// 取编译结果（按租户+规则代码缓存，表达式文本变更时失效）
    fn compiled_for(&self, tenant_id: i64, rule: &CodeRule) -> ApiResult<CompiledExpression> {
        let key = (tenant_id, rule.code.clone());
        let mut cache = self
            .compile_cache
            .lock()
            .map_err(|e| ApiError::InternalError(format!("编译缓存锁获取失败: {}", e)))?;

        if let Some(entry) = cache.get(&key) {
            if entry.expression == rule.expression {
                return Ok(entry.compiled.clone());
            }
        }

        let compiled = compile(&rule.expression)?;
        cache.insert(
            key,
            CachedCompiled {
                expression: rule.expression.clone(),
                compiled: compiled.clone(),
            },
        );
        Ok(compiled)
    }
}

#[cfg(test)]
mod tests {
    // 集成测试（场景A/B/C、确定性、重复规避）在 tests/generate_api_test.rs
}
