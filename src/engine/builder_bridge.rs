// ==========================================
// 编码规则引擎 - 构建器/表达式桥
// ==========================================
// 职责: 可视化构建器配置 <-> 模板表达式的互转
// 约定:
// - build 是全函数: 任意配置都产出可编译的规范表达式
// - parse 是启发式逆变换: 识别规范日期分组/单个序号/全部字段引用，
//   无法归类的首尾字面文本按前缀/后缀兜底
// - 当前缀/后缀文本与分隔符本身歧义时 parse(build(cfg)) 不保证还原 cfg，
//   属于已记录的有损往返，不做"修复"
// ==========================================

use serde::{Deserialize, Serialize};

use crate::engine::error::ParseResult;
use crate::engine::expression::{compile, DatePartKind, Token};

// ==========================================
// 构建器配置
// ==========================================

/// 规范日期分组
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DateFormat {
    #[serde(rename = "YYYYMMDD")]
    Yyyymmdd,
    #[serde(rename = "YYYYMM")]
    Yyyymm,
    #[serde(rename = "YYYY")]
    Yyyy,
    #[serde(rename = "YYMMDD")]
    Yymmdd,
    #[serde(rename = "YYMM")]
    Yymm,
    #[serde(rename = "YY")]
    Yy,
}

impl DateFormat {
    /// 对应的日期分量序列
    fn parts(&self) -> &'static [DatePartKind] {
        use DatePartKind::*;
        match self {
            DateFormat::Yyyymmdd => &[Year4, Month, Day],
            DateFormat::Yyyymm => &[Year4, Month],
            DateFormat::Yyyy => &[Year4],
            DateFormat::Yymmdd => &[Year2, Month, Day],
            DateFormat::Yymm => &[Year2, Month],
            DateFormat::Yy => &[Year2],
        }
    }

    /// 对应的表达式片段，如 "{YYYY}{MM}{DD}"
    fn expression_fragment(&self) -> String {
        self.parts()
            .iter()
            .map(|p| match p {
                DatePartKind::Year4 => "{YYYY}",
                DatePartKind::Year2 => "{YY}",
                DatePartKind::Month => "{MM}",
                DatePartKind::Day => "{DD}",
            })
            .collect()
    }

    /// 从日期分量序列反推规范分组（仅精确匹配）
    fn from_parts(parts: &[DatePartKind]) -> Option<DateFormat> {
        [
            DateFormat::Yyyymmdd,
            DateFormat::Yyyymm,
            DateFormat::Yyyy,
            DateFormat::Yymmdd,
            DateFormat::Yymm,
            DateFormat::Yy,
        ]
        .into_iter()
        .find(|f| f.parts() == parts)
    }
}

/// 可视化构建器配置
///
/// 组件模型: 固定前缀 / 字段引用 / 日期分组 / 序号（必有且唯一）/ 固定后缀，
/// 非空片段之间以 separator 连接。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuilderConfig {
    pub prefix: String,
    pub field_names: Vec<String>,
    pub date_format: Option<DateFormat>,
    pub separator: String,
    /// 序号补零宽度；None 表示 {SEQ} 不补零
    pub seq_width: Option<u32>,
    pub suffix: String,
}

// ==========================================
// 正变换: 配置 -> 表达式（全函数）
// ==========================================

/// 由构建器配置产出规范表达式
///
/// 产出一定可被 `expression::compile` 接受。
pub fn build(config: &BuilderConfig) -> String {
    let mut segments: Vec<String> = Vec::new();

    if !config.prefix.is_empty() {
        segments.push(config.prefix.clone());
    }
    for name in &config.field_names {
        segments.push(format!("{{FIELD:{}}}", name));
    }
    if let Some(fmt) = config.date_format {
        segments.push(fmt.expression_fragment());
    }
    segments.push(match config.seq_width {
        Some(w) => format!("{{SEQ:{}}}", w),
        None => "{SEQ}".to_string(),
    });
    if !config.suffix.is_empty() {
        segments.push(config.suffix.clone());
    }

    segments.join(&config.separator)
}

// ==========================================
// 逆变换: 表达式 -> 配置（启发式）
// ==========================================

/// 从表达式反推构建器配置
///
/// 编译失败的表达式直接返回编译错误；编译通过后按启发式归类：
/// - 连续日期分量精确匹配规范分组才计入 date_format，否则丢弃（有损）
/// - 内部字面文本若全部一致则识别为分隔符
/// - 首/尾字面文本剥掉一个分隔符后作为前缀/后缀
pub fn parse(expression: &str) -> ParseResult<BuilderConfig> {
    let compiled = compile(expression)?;
    let tokens = compiled.tokens();

    let mut field_names: Vec<String> = Vec::new();
    let mut seq_width: Option<u32> = None;
    let mut date_parts: Vec<DatePartKind> = Vec::new();

    // 首/尾字面文本与内部字面文本分开归类
    let mut leading = String::new();
    let mut trailing = String::new();
    let mut interior: Vec<String> = Vec::new();

    let last = tokens.len().saturating_sub(1);
    for (i, token) in tokens.iter().enumerate() {
        match token {
            Token::Literal(text) => {
                if i == 0 {
                    leading = text.clone();
                } else if i == last {
                    trailing = text.clone();
                } else {
                    interior.push(text.clone());
                }
            }
            Token::DatePart(kind) => date_parts.push(*kind),
            Token::Sequence(width) => seq_width = *width,
            Token::FieldRef(name) => field_names.push(name.clone()),
        }
    }

    let date_format = DateFormat::from_parts(&date_parts);

    // 分隔符: 内部字面文本全部一致时采信
    let separator = match interior.first() {
        Some(first) if interior.iter().all(|s| s == first) => first.clone(),
        _ => String::new(),
    };

    // 前缀/后缀: 兜底吸收未归类的首尾文本，各剥掉一个分隔符
    let prefix = strip_suffix_once(&leading, &separator);
    let suffix = strip_prefix_once(&trailing, &separator);

    Ok(BuilderConfig {
        prefix,
        field_names,
        date_format,
        separator,
        seq_width,
        suffix,
    })
}

fn strip_suffix_once(text: &str, separator: &str) -> String {
    if !separator.is_empty() {
        if let Some(stripped) = text.strip_suffix(separator) {
            return stripped.to_string();
        }
    }
    text.to_string()
}

fn strip_prefix_once(text: &str, separator: &str) -> String {
    if !separator.is_empty() {
        if let Some(stripped) = text.strip_prefix(separator) {
            return stripped.to_string();
        }
    }
    text.to_string()
}
