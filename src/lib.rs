// ==========================================
// 编码规则引擎 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 制造主数据的编码规则与自动取号服务
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 表达式编译/渲染/构建器桥接
pub mod engine;

// 配置层 - 取号配置/系统规则模板/页面目录
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 业务接口
pub mod api;

// 应用层 - 状态装配
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::SeqResetRule;

// 领域实体
pub use domain::{AvailableField, CodeRule, PageBindingOverride, PageRuleBinding};

// 引擎
pub use engine::{
    builder_bridge::{BuilderConfig, DateFormat},
    expression::{compile, CompiledExpression, Token},
    renderer::{render, RenderContext},
};

// API
pub use api::{
    ApiError, ApiResult, CodeRuleApi, CreateCodeRuleData, ExistingCodeStore, GenerateApi,
    GenerateRequest, GenerateResponse, PageApi, UpdateCodeRuleData, UpdatePageBindingData,
};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "编码规则引擎";

// ==========================================
// 预编译检查
// ==========================================
