// ==========================================
// 编码规则引擎 - API层错误类型
// ==========================================
// 职责: 定义API层错误类型，转换下层错误为调用方可分流的业务错误
// 说明: 所有错误带类型（非裸字符串），调用方可以区分
//       "未配置规则"（回落手工输入，属预期）与"规则配置损坏"（需运维介入）
// ==========================================

use crate::engine::error::{ParseError, RenderError};
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 规则管理错误（保存时抛出）
    // ==========================================
    /// 表达式编译失败，规则不落库
    #[error("表达式无效: {0}")]
    InvalidExpression(#[from] ParseError),

    /// 租户内规则代码冲突
    #[error("规则代码已存在: {0}")]
    DuplicateRuleCode(String),

    /// 系统规则不可删除
    #[error("系统规则受保护，不可删除: {0}")]
    ProtectedRule(String),

    // ==========================================
    // 取号错误（生成时抛出）
    // ==========================================
    /// 上下文缺少表达式引用的字段；调用方应回落手工输入，非致命
    #[error("取号上下文缺字段: {0}")]
    MissingField(String),

    /// 序号存储不可用；取号即失败（fail closed），不回退内存计数
    #[error("序号存储不可用: {0}")]
    StoreUnavailable(String),

    /// 重复规避重试耗尽；提示加大序号宽度或调整重置周期
    #[error("编码重复规避重试耗尽（已尝试{attempts}次），请加大序号宽度或调整重置周期")]
    CodeExhausted { attempts: u32 },

    // ==========================================
    // 通用业务错误
    // ==========================================
    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error("资源未找到: {0}")]
    NotFound(String),

    // ==========================================
    // 数据访问错误
    // ==========================================
    #[error("数据库错误: {0}")]
    DatabaseError(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ==========================================
// 从 RepositoryError 转换
// 目的: 连接/锁/事务类故障统一归为 StoreUnavailable（fail closed），
//       其余映射为对应业务错误
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::DatabaseConnectionError(msg)
            | RepositoryError::LockError(msg)
            | RepositoryError::DatabaseTransactionError(msg) => ApiError::StoreUnavailable(msg),

            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{}(id={})不存在", entity, id))
            }
            // 本 crate 中唯一约束只出现在规则代码上
            RepositoryError::UniqueConstraintViolation(msg) => ApiError::DuplicateRuleCode(msg),
            RepositoryError::DatabaseQueryError(msg) => ApiError::DatabaseError(msg),
            RepositoryError::ValidationError(msg) => ApiError::InvalidInput(msg),
            RepositoryError::InternalError(msg) => ApiError::InternalError(msg),
            RepositoryError::Other(err) => ApiError::Other(err),
        }
    }
}

impl From<RenderError> for ApiError {
    fn from(err: RenderError) -> Self {
        match err {
            RenderError::MissingField { name } => ApiError::MissingField(name),
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;
