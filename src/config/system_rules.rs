// ==========================================
// 编码规则引擎 - 系统规则模板
// ==========================================
// 职责: 定义可按租户播种的系统内置规则（is_system=true，不可删除）
// 说明: 表达式均为本引擎语法；播种幂等，已存在的规则代码跳过
// ==========================================

use crate::domain::types::SeqResetRule;

/// 系统规则模板
#[derive(Debug, Clone)]
pub struct SystemRuleTemplate {
    pub code: &'static str,
    pub name: &'static str,
    pub expression: &'static str,
    pub description: &'static str,
    pub seq_start: i64,
    pub seq_step: i64,
    pub seq_reset_rule: SeqResetRule,
}

/// 系统内置规则模板集
pub fn system_rule_templates() -> &'static [SystemRuleTemplate] {
    TEMPLATES
}

static TEMPLATES: &[SystemRuleTemplate] = &[
    SystemRuleTemplate {
        code: "WORKSTATION_CODE",
        name: "工位编码",
        expression: "WS-{YYYY}{MM}{DD}-{SEQ:4}",
        description: "工位编码规则，按日重置",
        seq_start: 1,
        seq_step: 1,
        seq_reset_rule: SeqResetRule::Daily,
    },
    SystemRuleTemplate {
        code: "WORK_ORDER_CODE",
        name: "工单编码",
        expression: "WO{YYYY}{MM}{DD}{SEQ:4}",
        description: "工单编码规则，按日重置",
        seq_start: 1,
        seq_step: 1,
        seq_reset_rule: SeqResetRule::Daily,
    },
    SystemRuleTemplate {
        code: "MATERIAL_CODE",
        name: "物料编码",
        expression: "MAT{SEQ:6}",
        description: "物料主编码规则，连续计数",
        seq_start: 1,
        seq_step: 1,
        seq_reset_rule: SeqResetRule::Never,
    },
    SystemRuleTemplate {
        code: "CUSTOMER_CODE",
        name: "客户编码",
        expression: "CUST{SEQ:5}",
        description: "客户编码规则，连续计数",
        seq_start: 1,
        seq_step: 1,
        seq_reset_rule: SeqResetRule::Never,
    },
    SystemRuleTemplate {
        code: "SUPPLIER_CODE",
        name: "供应商编码",
        expression: "SUP{SEQ:5}",
        description: "供应商编码规则，连续计数",
        seq_start: 1,
        seq_step: 1,
        seq_reset_rule: SeqResetRule::Never,
    },
    SystemRuleTemplate {
        code: "OPERATION_CODE",
        name: "工序编码",
        expression: "GX{SEQ:4}",
        description: "工序编码规则，连续计数",
        seq_start: 1,
        seq_step: 1,
        seq_reset_rule: SeqResetRule::Never,
    },
    SystemRuleTemplate {
        code: "PROCESS_ROUTE_CODE",
        name: "工艺路线编码",
        expression: "GY{SEQ:4}",
        description: "工艺路线编码规则，连续计数",
        seq_start: 1,
        seq_step: 1,
        seq_reset_rule: SeqResetRule::Never,
    },
    SystemRuleTemplate {
        code: "ENGINEERING_BOM_CODE",
        name: "BOM编码",
        expression: "BOM-{FIELD:material_code}-{SEQ:3}",
        description: "BOM编码规则，引用主物料编码",
        seq_start: 1,
        seq_step: 1,
        seq_reset_rule: SeqResetRule::Never,
    },
    SystemRuleTemplate {
        code: "PURCHASE_ORDER_CODE",
        name: "采购订单编码",
        expression: "PO{YYYY}{MM}{DD}{SEQ:4}",
        description: "采购订单编码规则，按日重置",
        seq_start: 1,
        seq_step: 1,
        seq_reset_rule: SeqResetRule::Daily,
    },
    SystemRuleTemplate {
        code: "SALES_ORDER_CODE",
        name: "销售订单编码",
        expression: "SO{YYYY}{MM}{DD}{SEQ:4}",
        description: "销售订单编码规则，按日重置",
        seq_start: 1,
        seq_step: 1,
        seq_reset_rule: SeqResetRule::Daily,
    },
    SystemRuleTemplate {
        code: "PRODUCTION_PLAN_CODE",
        name: "生产计划编码",
        expression: "SCJH{YYYY}{MM}{SEQ:4}",
        description: "生产计划编码规则，按月重置",
        seq_start: 1,
        seq_step: 1,
        seq_reset_rule: SeqResetRule::Monthly,
    },
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::expression::compile;

    #[test]
    fn test_模板表达式均可编译() {
        for template in system_rule_templates() {
            let compiled = compile(template.expression)
                .unwrap_or_else(|e| panic!("模板{}编译失败: {}", template.code, e));
            assert!(
                compiled.has_sequence(),
                "系统模板{}应包含序号占位符",
                template.code
            );
        }
    }

    #[test]
    fn test_模板代码唯一() {
        let mut codes: Vec<&str> = system_rule_templates().iter().map(|t| t.code).collect();
        let total = codes.len();
        codes.sort();
        codes.dedup();
        assert_eq!(codes.len(), total);
    }
}
