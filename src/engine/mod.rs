// ==========================================
// 编码规则引擎 - 引擎层
// ==========================================
// 职责: 表达式编译、渲染、构建器桥（纯函数，无共享状态）
// ==========================================

pub mod builder_bridge;
pub mod error;
pub mod expression;
pub mod renderer;

// 重导出核心类型
pub use builder_bridge::{build, parse, BuilderConfig, DateFormat};
pub use error::{ParseError, ParseResult, RenderError, RenderResult};
pub use expression::{compile, CompiledExpression, DatePartKind, Token};
pub use renderer::{render, RenderContext};
