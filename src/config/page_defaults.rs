// ==========================================
// 编码规则引擎 - 功能页面内置目录
// ==========================================
// 职责: 定义系统中所有带编码字段的功能页面，用于编码规则页面展示与配置
// 说明: 目录为系统内置（代码即配置）；租户可改的只有绑定项
//       （rule_code / auto_generate / allow_manual_edit），存 page_binding 表
// ==========================================

use crate::domain::page_binding::AvailableField;

/// 内置页面定义
#[derive(Debug, Clone)]
pub struct PageDefault {
    pub page_code: &'static str,
    pub page_name: &'static str,
    pub page_path: &'static str,
    pub module: &'static str,
    pub code_field: &'static str,
    pub code_field_label: &'static str,
    /// 默认绑定的规则代码（None 表示默认手工输入）
    pub rule_code: Option<&'static str>,
    pub auto_generate: bool,
    pub allow_manual_edit: bool,
    /// 表达式可引用的记录字段 (field_name, field_label, description)
    pub available_fields: &'static [(&'static str, &'static str, &'static str)],
}

impl PageDefault {
    pub fn available_fields_vec(&self) -> Vec<AvailableField> {
        self.available_fields
            .iter()
            .map(|(name, label, desc)| AvailableField {
                field_name: (*name).to_string(),
                field_label: (*label).to_string(),
                description: if desc.is_empty() {
                    None
                } else {
                    Some((*desc).to_string())
                },
            })
            .collect()
    }
}

/// 功能页面目录
pub fn builtin_pages() -> &'static [PageDefault] {
    PAGES
}

/// 按页面代码查找内置页面
pub fn find_builtin_page(page_code: &str) -> Option<&'static PageDefault> {
    PAGES.iter().find(|p| p.page_code == page_code)
}

static PAGES: &[PageDefault] = &[
    // ==========================================
    // 主数据管理
    // ==========================================
    PageDefault {
        page_code: "master-data-factory-workstation",
        page_name: "工位管理",
        page_path: "/apps/master-data/factory/workstations",
        module: "主数据管理",
        code_field: "code",
        code_field_label: "工位编码",
        rule_code: Some("WORKSTATION_CODE"),
        auto_generate: true,
        allow_manual_edit: true,
        available_fields: &[],
    },
    PageDefault {
        page_code: "master-data-material",
        page_name: "物料管理",
        page_path: "/apps/master-data/materials",
        module: "主数据管理",
        code_field: "main_code",
        code_field_label: "物料主编码",
        rule_code: Some("MATERIAL_CODE"),
        auto_generate: true,
        allow_manual_edit: false,
        available_fields: &[
            ("group_code", "物料分组编码", "物料所属分组的编码"),
            ("group_name", "物料分组名称", "物料所属分组的名称"),
            ("material_type", "物料类型", "物料类型（FIN/SEMI/RAW/PACK/AUX）"),
            ("name", "物料名称", "物料名称"),
        ],
    },
    PageDefault {
        page_code: "master-data-process-operation",
        page_name: "工序管理",
        page_path: "/apps/master-data/process/operations",
        module: "主数据管理",
        code_field: "code",
        code_field_label: "工序编码",
        rule_code: Some("OPERATION_CODE"),
        auto_generate: true,
        allow_manual_edit: true,
        available_fields: &[],
    },
    PageDefault {
        page_code: "master-data-process-route",
        page_name: "工艺路线",
        page_path: "/apps/master-data/process/routes",
        module: "主数据管理",
        code_field: "code",
        code_field_label: "路线编码",
        rule_code: Some("PROCESS_ROUTE_CODE"),
        auto_generate: true,
        allow_manual_edit: true,
        available_fields: &[("name", "工艺路线名称", "工艺路线名称")],
    },
    PageDefault {
        page_code: "master-data-engineering-bom",
        page_name: "物料清单BOM",
        page_path: "/apps/master-data/process/engineering-bom",
        module: "主数据管理",
        code_field: "bom_code",
        code_field_label: "BOM编码",
        rule_code: Some("ENGINEERING_BOM_CODE"),
        auto_generate: true,
        allow_manual_edit: true,
        available_fields: &[
            ("material_code", "主物料编码", "BOM主物料的编码"),
            ("material_name", "主物料名称", "BOM主物料的名称"),
            ("version", "版本号", "BOM版本号"),
        ],
    },
    PageDefault {
        page_code: "master-data-supply-chain-customer",
        page_name: "客户管理",
        page_path: "/apps/master-data/supply-chain/customers",
        module: "主数据管理",
        code_field: "code",
        code_field_label: "客户编码",
        rule_code: Some("CUSTOMER_CODE"),
        auto_generate: true,
        allow_manual_edit: true,
        available_fields: &[],
    },
    PageDefault {
        page_code: "master-data-supply-chain-supplier",
        page_name: "供应商管理",
        page_path: "/apps/master-data/supply-chain/suppliers",
        module: "主数据管理",
        code_field: "code",
        code_field_label: "供应商编码",
        rule_code: Some("SUPPLIER_CODE"),
        auto_generate: true,
        allow_manual_edit: true,
        available_fields: &[],
    },
    // ==========================================
    // 快格轻制造
    // ==========================================
    PageDefault {
        page_code: "kuaizhizao-production-work-order",
        page_name: "工单管理",
        page_path: "/apps/kuaizhizao/production-execution/work-orders",
        module: "快格轻制造",
        code_field: "code",
        code_field_label: "工单编码",
        rule_code: Some("WORK_ORDER_CODE"),
        auto_generate: true,
        allow_manual_edit: true,
        available_fields: &[],
    },
    PageDefault {
        page_code: "kuaizhizao-plan-production-plan",
        page_name: "生产计划",
        page_path: "/apps/kuaizhizao/plan-management/production-plans",
        module: "快格轻制造",
        code_field: "plan_code",
        code_field_label: "生产计划编码",
        rule_code: Some("PRODUCTION_PLAN_CODE"),
        auto_generate: true,
        allow_manual_edit: true,
        available_fields: &[],
    },
    PageDefault {
        page_code: "kuaizhizao-purchase-order",
        page_name: "采购订单",
        page_path: "/apps/kuaizhizao/purchase-management/purchase-orders",
        module: "快格轻制造",
        code_field: "order_code",
        code_field_label: "采购订单编码",
        rule_code: Some("PURCHASE_ORDER_CODE"),
        auto_generate: true,
        allow_manual_edit: true,
        available_fields: &[],
    },
    PageDefault {
        page_code: "kuaizhizao-sales-order",
        page_name: "销售订单",
        page_path: "/apps/kuaizhizao/sales-management/sales-orders",
        module: "快格轻制造",
        code_field: "order_code",
        code_field_label: "销售订单编码",
        rule_code: Some("SALES_ORDER_CODE"),
        auto_generate: true,
        allow_manual_edit: true,
        available_fields: &[],
    },
    PageDefault {
        page_code: "kuaizhizao-sales-forecast",
        page_name: "销售预测",
        page_path: "/apps/kuaizhizao/sales-management/sales-forecasts",
        module: "快格轻制造",
        code_field: "code",
        code_field_label: "销售预测编码",
        rule_code: None,
        auto_generate: false,
        allow_manual_edit: true,
        available_fields: &[],
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_code_唯一() {
        let mut codes: Vec<&str> = builtin_pages().iter().map(|p| p.page_code).collect();
        let total = codes.len();
        codes.sort();
        codes.dedup();
        assert_eq!(codes.len(), total, "页面代码不应重复");
    }

    #[test]
    fn test_find_builtin_page() {
        let page = find_builtin_page("master-data-material").expect("物料页面应存在");
        assert_eq!(page.code_field, "main_code");
        assert_eq!(page.available_fields_vec().len(), 4);

        assert!(find_builtin_page("no-such-page").is_none());
    }
}
