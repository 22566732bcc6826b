// ==========================================
// 编码规则引擎 - 页面绑定 API
// ==========================================
// 职责: 功能页面与编码规则绑定的查询与配置
// 说明: 页面目录内置于代码（config::page_defaults），本层把租户级
//       覆盖项（page_binding 表）与目录合并成完整视图返回
// ==========================================

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::api::error::{ApiError, ApiResult};
use crate::config::page_defaults::{builtin_pages, find_builtin_page, PageDefault};
use crate::domain::page_binding::{PageBindingOverride, PageRuleBinding};
use crate::repository::code_rule_repo::CodeRuleRepository;
use crate::repository::page_binding_repo::PageBindingRepository;

// ==========================================
// PageApi - 页面绑定 API
// ==========================================

pub struct PageApi {
    page_binding_repo: Arc<PageBindingRepository>,
    code_rule_repo: Arc<CodeRuleRepository>,
}

impl PageApi {
    /// 创建新的PageApi实例
    pub fn new(
        page_binding_repo: Arc<PageBindingRepository>,
        code_rule_repo: Arc<CodeRuleRepository>,
    ) -> Self {
        Self {
            page_binding_repo,
            code_rule_repo,
        }
    }

    /// 列出租户的全部页面绑定（内置目录 + 租户覆盖合并）
    pub fn list_pages(&self, tenant_id: i64) -> ApiResult<Vec<PageRuleBinding>> {
        let overrides = self.page_binding_repo.list_by_tenant(tenant_id)?;

        let bindings = builtin_pages()
            .iter()
            .map(|page| {
                let ovr = overrides.iter().find(|o| o.page_code == page.page_code);
                Self::merge(page, ovr)
            })
            .collect();
        Ok(bindings)
    }

    /// 查询单个页面绑定
    pub fn get_binding(&self, tenant_id: i64, page_code: &str) -> ApiResult<PageRuleBinding> {
        let page = find_builtin_page(page_code)
            .ok_or_else(|| ApiError::NotFound(format!("功能页面(code={})不存在", page_code)))?;

        let ovr = self.page_binding_repo.find(tenant_id, page_code)?;
        Ok(Self::merge(page, ovr.as_ref()))
    }

    /// 更新页面绑定（写入租户覆盖项）
    ///
    /// # 错误
    /// - NotFound: 页面代码不在内置目录中
    /// - InvalidInput: 绑定的规则代码在该租户下不存在
    pub fn update_binding(
        &self,
        tenant_id: i64,
        page_code: &str,
        data: UpdatePageBindingData,
    ) -> ApiResult<PageRuleBinding> {
        if find_builtin_page(page_code).is_none() {
            return Err(ApiError::NotFound(format!(
                "功能页面(code={})不存在",
                page_code
            )));
        }

        // 绑定的规则必须真实存在，防止页面指向已删除的规则
        if let Some(rule_code) = &data.rule_code {
            if self
                .code_rule_repo
                .find_by_code(tenant_id, rule_code)?
                .is_none()
            {
                return Err(ApiError::InvalidInput(format!(
                    "编码规则{}不存在，无法绑定",
                    rule_code
                )));
            }
        }

        let binding = PageBindingOverride {
            tenant_id,
            page_code: page_code.to_string(),
            rule_code: data.rule_code,
            auto_generate: data.auto_generate,
            allow_manual_edit: data.allow_manual_edit,
            updated_at: String::new(), // 由仓储写入时间戳
        };
        self.page_binding_repo.upsert(&binding)?;

        info!(tenant_id, page_code, "更新页面编码规则绑定");
        self.get_binding(tenant_id, page_code)
    }

    /// 内置页面与租户覆盖项合并
    fn merge(page: &PageDefault, ovr: Option<&PageBindingOverride>) -> PageRuleBinding {
        let (rule_code, auto_generate, allow_manual_edit) = match ovr {
            Some(o) => (o.rule_code.clone(), o.auto_generate, o.allow_manual_edit),
            None => (
                page.rule_code.map(str::to_string),
                page.auto_generate,
                page.allow_manual_edit,
            ),
        };

        PageRuleBinding {
            page_code: page.page_code.to_string(),
            page_name: page.page_name.to_string(),
            page_path: page.page_path.to_string(),
            module: page.module.to_string(),
            code_field: page.code_field.to_string(),
            code_field_label: page.code_field_label.to_string(),
            rule_code,
            auto_generate,
            allow_manual_edit,
            available_fields: page.available_fields_vec(),
        }
    }
}

// ==========================================
// DTO 类型定义
// ==========================================

/// 更新页面绑定请求
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdatePageBindingData {
    /// 绑定的规则代码（None 表示该页面回到手工输入）
    #[serde(default)]
    pub rule_code: Option<String>,
    pub auto_generate: bool,
    pub allow_manual_edit: bool,
}

#[cfg(test)]
mod tests {
    // 集成测试在 tests/page_api_test.rs
}
