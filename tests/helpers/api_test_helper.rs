// ==========================================
// API集成测试辅助工具
// ==========================================
// 职责: 提供API层集成测试的通用辅助函数
// ==========================================

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use tempfile::NamedTempFile;

use code_rule_engine::api::{
    CodeRuleApi, CreateCodeRuleData, ExistingCodeStore, GenerateApi, PageApi,
};
use code_rule_engine::config::GeneratorConfig;
use code_rule_engine::db::open_sqlite_connection;
use code_rule_engine::domain::types::SeqResetRule;
use code_rule_engine::repository::code_rule_repo::CodeRuleRepository;
use code_rule_engine::repository::error::RepositoryResult;
use code_rule_engine::repository::page_binding_repo::PageBindingRepository;
use code_rule_engine::repository::sequence_repo::SequenceRepository;

// ==========================================
// 既有编码探测 Mock
// ==========================================

/// 内存版既有编码存储
///
/// key 为 (tenant_id, entity_type, code)，测试里预置"已被占用"的编码
#[derive(Default)]
pub struct MockCodeStore {
    existing: Mutex<HashSet<(i64, String, String)>>,
}

impl MockCodeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, tenant_id: i64, entity_type: &str, code: &str) {
        self.existing
            .lock()
            .unwrap()
            .insert((tenant_id, entity_type.to_string(), code.to_string()));
    }
}

impl ExistingCodeStore for MockCodeStore {
    fn code_exists(
        &self,
        tenant_id: i64,
        entity_type: &str,
        code: &str,
    ) -> RepositoryResult<bool> {
        Ok(self.existing.lock().unwrap().contains(&(
            tenant_id,
            entity_type.to_string(),
            code.to_string(),
        )))
    }
}

// ==========================================
// API测试环境
// ==========================================

/// API测试环境
///
/// 包含所有API实例和必要的依赖
pub struct ApiTestEnv {
    pub db_path: String,
    pub code_rule_api: Arc<CodeRuleApi>,
    pub generate_api: Arc<GenerateApi>,
    pub page_api: Arc<PageApi>,

    // Repository层（用于测试数据准备）
    pub code_rule_repo: Arc<CodeRuleRepository>,
    pub sequence_repo: Arc<SequenceRepository>,
    pub page_binding_repo: Arc<PageBindingRepository>,

    // 既有编码探测 Mock
    pub code_store: Arc<MockCodeStore>,

    // 临时文件（确保生命周期）
    _temp_file: NamedTempFile,
}

impl ApiTestEnv {
    /// 创建新的API测试环境（临时数据库文件，建表幂等）
    pub fn new() -> Result<Self, String> {
        let temp_file = NamedTempFile::new().map_err(|e| format!("创建临时文件失败: {}", e))?;
        let db_path = temp_file
            .path()
            .to_str()
            .ok_or("临时文件路径非UTF-8")?
            .to_string();

        let conn = open_sqlite_connection(&db_path)
            .map_err(|e| format!("无法打开数据库: {}", e))?;
        let conn = Arc::new(Mutex::new(conn));

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

        let code_store = Arc::new(MockCodeStore::new());

        let code_rule_api = Arc::new(CodeRuleApi::new(code_rule_repo.clone()));
        let generate_api = Arc::new(GenerateApi::new(
            code_rule_repo.clone(),
            sequence_repo.clone(),
            Some(code_store.clone() as Arc<dyn ExistingCodeStore>),
            GeneratorConfig::default(),
        ));
        let page_api = Arc::new(PageApi::new(
            page_binding_repo.clone(),
            code_rule_repo.clone(),
        ));

        Ok(Self {
            db_path,
            code_rule_api,
            generate_api,
            page_api,
            code_rule_repo,
            sequence_repo,
            page_binding_repo,
            code_store,
            _temp_file: temp_file,
        })
    }

    /// 创建一条测试规则（默认按日重置、序号从1步长1）
    pub fn create_rule(
        &self,
        tenant_id: i64,
        code: &str,
        expression: &str,
        reset: SeqResetRule,
    ) -> code_rule_engine::domain::CodeRule {
        self.code_rule_api
            .create(
                tenant_id,
                CreateCodeRuleData {
                    name: format!("测试规则-{}", code),
                    code: code.to_string(),
                    expression: expression.to_string(),
                    description: None,
                    seq_start: 1,
                    seq_step: 1,
                    seq_reset_rule: reset,
                },
            )
            .expect("创建测试规则失败")
    }
}
