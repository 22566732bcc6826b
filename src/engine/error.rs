// ==========================================
// 编码规则引擎 - 引擎层错误类型
// ==========================================
// 工具: thiserror 派生宏
// 说明: 编译错误在规则保存时抛出，渲染错误在取号时抛出，
//       两者均为带类型的错误（调用方可按变体分流处理）
// ==========================================

use thiserror::Error;

/// 表达式编译错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("占位符未闭合: 位置{pos}处的'{{'缺少对应的'}}'")]
    UnterminatedToken { pos: usize },

    #[error("未知的占位符: {{{name}}}")]
    UnknownToken { name: String },

    #[error("表达式包含多个序号占位符（每条规则只允许一个计数位）")]
    DuplicateSequenceToken,

    #[error("序号宽度无效: {raw}")]
    InvalidSequenceWidth { raw: String },

    #[error("字段占位符缺少字段名: {{FIELD:}}")]
    EmptyFieldName,
}

/// 渲染错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    #[error("上下文缺少字段: {name}")]
    MissingField { name: String },
}

/// Result 类型别名
pub type ParseResult<T> = Result<T, ParseError>;
pub type RenderResult<T> = Result<T, RenderError>;
