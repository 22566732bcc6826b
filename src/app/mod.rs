// ==========================================
// 编码规则引擎 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享状态和API实例
// ==========================================

use std::sync::{Arc, Mutex};

use crate::api::{CodeRuleApi, ExistingCodeStore, GenerateApi, PageApi};
use crate::config::GeneratorConfig;
use crate::db::open_sqlite_connection;
use crate::repository::code_rule_repo::CodeRuleRepository;
use crate::repository::page_binding_repo::PageBindingRepository;
use crate::repository::sequence_repo::SequenceRepository;

/// 应用状态
///
/// 包含所有API实例和共享资源
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// 规则管理API
    pub code_rule_api: Arc<CodeRuleApi>,

    /// 取号API
    pub generate_api: Arc<GenerateApi>,

    /// 页面绑定API
    pub page_api: Arc<PageApi>,
}

impl AppState {
    /// 创建新的AppState实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    /// - code_probe: 既有编码探测能力（由宿主系统注入，None 时预览跳过重复检查）
    ///
    /// # 说明
    /// 该方法会：
    /// 1. 打开共享数据库连接（含 busy_timeout / WAL 配置）
    /// 2. 初始化所有Repository（建表幂等）
    /// 3. 创建所有API实例
    pub fn new(
        db_path: String,
        code_probe: Option<Arc<dyn ExistingCodeStore>>,
    ) -> Result<Self, String> {
        tracing::info!("初始化AppState，数据库路径: {}", db_path);

        // 创建数据库连接（共享连接）
        let conn = open_sqlite_connection(&db_path)
            .map_err(|e| format!("无法打开数据库: {}", e))?;
        let conn = Arc::new(Mutex::new(conn));

        // ==========================================
        // 初始化Repository层
        // ==========================================
        let code_rule_repo = Arc::new(
            CodeRuleRepository::from_connection(conn.clone())
                .map_err(|e| format!("无法创建CodeRuleRepository: {}", e))?,
        );
        let sequence_repo = Arc::new(
            SequenceRepository::from_connection(conn.clone())
                .map_err(|e| format!("无法创建SequenceRepository: {}", e))?,
        );
        let page_binding_repo = Arc::new(
            PageBindingRepository::from_connection(conn)
                .map_err(|e| format!("无法创建PageBindingRepository: {}", e))?,
        );

        // ==========================================
        // 创建API实例
        // ==========================================
        let code_rule_api = Arc::new(CodeRuleApi::new(code_rule_repo.clone()));
        let generate_api = Arc::new(GenerateApi::new(
            code_rule_repo.clone(),
            sequence_repo,
            code_probe,
            GeneratorConfig::default(),
        ));
        let page_api = Arc::new(PageApi::new(page_binding_repo, code_rule_repo));

        tracing::info!("AppState初始化完成");
        Ok(Self {
            db_path,
            code_rule_api,
            generate_api,
            page_api,
        })
    }

    /// 为租户做初始化播种（系统规则模板，幂等）
    pub fn seed_tenant(&self, tenant_id: i64) -> Result<usize, String> {
        self.code_rule_api
            .seed_system_rules(tenant_id)
            .map_err(|e| format!("播种系统规则失败: {}", e))
    }
}
