// ==========================================
// 编码规则引擎 - 命令行入口
// ==========================================
// 用途: 初始化数据库、播种系统规则，并演示一次取号流程
// ==========================================

use std::env;
use std::process;

use code_rule_engine::api::GenerateRequest;
use code_rule_engine::app::AppState;

fn main() {
    // 初始化日志系统
    code_rule_engine::logging::init();

    tracing::info!("==================================================");
    tracing::info!("{} v{}", code_rule_engine::APP_NAME, code_rule_engine::VERSION);
    tracing::info!("==================================================");

    // 数据库路径：第一个命令行参数，缺省 code_rules.db
    let db_path = env::args().nth(1).unwrap_or_else(|| "code_rules.db".to_string());
    tracing::info!("使用数据库: {}", db_path);

    if let Err(e) = run(db_path) {
        tracing::error!("运行失败: {}", e);
        process::exit(1);
    }
}

fn run(db_path: String) -> Result<(), String> {
    let state = AppState::new(db_path, None)?;

    // 为默认租户播种系统规则（幂等）
    let tenant_id = 1;
    let created = state.seed_tenant(tenant_id)?;
    tracing::info!(tenant_id, created, "系统规则播种完成");

    // 演示：列出规则并为工单规则取一个号
    let rules = state
        .code_rule_api
        .list(tenant_id, None)
        .map_err(|e| format!("列出规则失败: {}", e))?;
    for rule in &rules {
        tracing::info!(
            code = %rule.code,
            expression = %rule.expression,
            reset = %rule.seq_reset_rule,
            "已配置规则"
        );
    }

    let request = GenerateRequest::new("WORK_ORDER_CODE");
    let preview = state
        .generate_api
        .test_generate(tenant_id, &request)
        .map_err(|e| format!("预览取号失败: {}", e))?;
    tracing::info!(code = %preview.code, "预览编码（不消费序号）");

    let issued = state
        .generate_api
        .generate(tenant_id, &request)
        .map_err(|e| format!("正式取号失败: {}", e))?;
    tracing::info!(code = %issued.code, rule = %issued.rule_name, "正式取号完成");

    Ok(())
}
