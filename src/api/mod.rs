// ==========================================
// 编码规则引擎 - API层模块
// ==========================================
// 职责: 面向调用方的服务门面，聚合引擎/仓储能力
// ==========================================

pub mod code_rule_api;
pub mod error;
pub mod generate_api;
pub mod page_api;

pub use code_rule_api::{CodeRuleApi, CreateCodeRuleData, UpdateCodeRuleData};
pub use error::{ApiError, ApiResult};
pub use generate_api::{ExistingCodeStore, GenerateApi, GenerateRequest, GenerateResponse};
pub use page_api::{PageApi, UpdatePageBindingData};
