// ==========================================
// 编码规则引擎 - 表达式编译器
// ==========================================
// 语法: 普通字符原样保留；'{' 开启占位符，至下一个 '}' 闭合
// 占位符: {YYYY} {YY} {MM} {DD} | {SEQ} {SEQ:n} | {FIELD:name}
// 约束: 每个表达式最多一个序号占位符（计数位唯一）
// ==========================================

use serde::{Deserialize, Serialize};

use crate::engine::error::{ParseError, ParseResult};

/// 序号补零宽度上限
///
/// i64 十进制至多19位，更宽的补零只会凭空放大渲染产物，
/// 在编译期拒绝，避免已保存规则在取号时构造超长字符串。
pub const MAX_SEQ_WIDTH: u32 = 19;

// ==========================================
// 编译产物（标记联合 AST）
// ==========================================

/// 日期占位符种类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DatePartKind {
    Year4, // {YYYY} 4位年份
    Year2, // {YY}   2位年份
    Month, // {MM}   2位月份
    Day,   // {DD}   2位日
}

/// 表达式的一个解析单元
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Token {
    /// 字面文本，原样输出
    Literal(String),
    /// 日期分量
    DatePart(DatePartKind),
    /// 序号；Some(n) 表示左补零至 n 位，None 表示十进制原样
    Sequence(Option<u32>),
    /// 记录字段引用
    FieldRef(String),
}

/// 编译后的表达式
///
/// 有序 Token 列表是"高级表达式编辑"与"可视化构建器"共用的唯一权威形态，
/// 渲染器与构建器桥均只操作该结构，不做散落的字符串拼接。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompiledExpression {
    tokens: Vec<Token>,
}

impl CompiledExpression {
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// 表达式是否包含序号占位符
    pub fn has_sequence(&self) -> bool {
        self.tokens
            .iter()
            .any(|t| matches!(t, Token::Sequence(_)))
    }

    /// 表达式引用的全部字段名（按出现顺序）
    pub fn field_refs(&self) -> Vec<&str> {
        self.tokens
            .iter()
            .filter_map(|t| match t {
                Token::FieldRef(name) => Some(name.as_str()),
                _ => None,
            })
            .collect()
    }
}

// ==========================================
// 编译入口
// ==========================================

/// 编译模板表达式为有序 Token 列表
///
/// 纯函数，无副作用；调用方可按规则代码缓存编译结果。
///
/// # 错误
/// - `UnterminatedToken`: '{' 之后没有 '}'
/// - `UnknownToken`: 占位符名称不在支持集合内
/// - `DuplicateSequenceToken`: 出现第二个 {SEQ...}
/// - `InvalidSequenceWidth`: {SEQ:n} 的 n 不是正整数，或超过 MAX_SEQ_WIDTH
/// - `EmptyFieldName`: {FIELD:} 缺少字段名
pub fn compile(expression: &str) -> ParseResult<CompiledExpression> {
    let mut tokens: Vec<Token> = Vec::new();
    let mut literal = String::new();
    let mut seen_sequence = false;

    let chars: Vec<char> = expression.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        let ch = chars[i];
        if ch != '{' {
            literal.push(ch);
            i += 1;
            continue;
        }

        // 进入占位符：先冲刷累积的字面文本
        let close = chars[i + 1..]
            .iter()
            .position(|&c| c == '}')
            .ok_or(ParseError::UnterminatedToken { pos: i })?;

        if !literal.is_empty() {
            tokens.push(Token::Literal(std::mem::take(&mut literal)));
        }

        let body: String = chars[i + 1..i + 1 + close].iter().collect();
        tokens.push(parse_token_body(&body, &mut seen_sequence)?);

        i += close + 2; // 跳过 '{'+body+'}'
    }

    if !literal.is_empty() {
        tokens.push(Token::Literal(literal));
    }

    Ok(CompiledExpression { tokens })
}

/// 解析单个占位符体（'{' 与 '}' 之间的内容）
fn parse_token_body(body: &str, seen_sequence: &mut bool) -> ParseResult<Token> {
    match body {
        "YYYY" => return Ok(Token::DatePart(DatePartKind::Year4)),
        "YY" => return Ok(Token::DatePart(DatePartKind::Year2)),
        "MM" => return Ok(Token::DatePart(DatePartKind::Month)),
        "DD" => return Ok(Token::DatePart(DatePartKind::Day)),
        _ => {}
    }

    if body == "SEQ" || body.starts_with("SEQ:") {
        if *seen_sequence {
            return Err(ParseError::DuplicateSequenceToken);
        }
        *seen_sequence = true;

        if body == "SEQ" {
            return Ok(Token::Sequence(None));
        }

        let raw = &body["SEQ:".len()..];
        let width: u32 = raw
            .parse()
            .ok()
            .filter(|w| *w > 0 && *w <= MAX_SEQ_WIDTH)
            .ok_or_else(|| ParseError::InvalidSequenceWidth {
                raw: raw.to_string(),
            })?;
        return Ok(Token::Sequence(Some(width)));
    }

    if let Some(name) = body.strip_prefix("FIELD:") {
        if name.is_empty() {
            return Err(ParseError::EmptyFieldName);
        }
        return Ok(Token::FieldRef(name.to_string()));
    }

    Err(ParseError::UnknownToken {
        name: body.to_string(),
    })
}
