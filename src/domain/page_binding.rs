// ==========================================
// 编码规则引擎 - 页面绑定实体
// ==========================================
// 职责: 定义"功能页面 -> 编码规则"的绑定视图
// 说明: 页面目录由系统内置（config::page_defaults），
//       租户级覆盖项（绑定哪条规则、是否自动生成）存库，读取时合并
// ==========================================

use serde::{Deserialize, Serialize};

/// 表达式可引用的记录字段
///
/// 供可视化构建器展示候选字段，`{FIELD:name}` 的 name 取自 field_name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailableField {
    pub field_name: String,            // 字段名（表达式中引用）
    pub field_label: String,           // 字段显示名
    pub description: Option<String>,   // 字段说明
}

/// 页面绑定（内置目录 + 租户覆盖合并后的完整视图）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageRuleBinding {
    pub page_code: String,                  // 页面代码
    pub page_name: String,                  // 页面名称
    pub page_path: String,                  // 页面路由
    pub module: String,                     // 所属模块
    pub code_field: String,                 // 编码字段名
    pub code_field_label: String,           // 编码字段显示名
    pub rule_code: Option<String>,          // 绑定的规则代码
    pub auto_generate: bool,                // 是否自动生成编码
    pub allow_manual_edit: bool,            // 自动生成后是否允许手工修改
    pub available_fields: Vec<AvailableField>, // 可引用字段列表
}

/// 租户级绑定覆盖项（存库部分）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageBindingOverride {
    pub tenant_id: i64,
    pub page_code: String,
    pub rule_code: Option<String>,
    pub auto_generate: bool,
    pub allow_manual_edit: bool,
    pub updated_at: String,
}
