// ==========================================
// 编码规则引擎 - Token 渲染器
// ==========================================
// 职责: 将编译后的表达式 + 渲染上下文拼装为最终编码
// 日历口径: 统一使用 UTC 日历日（由 API 层换算后传入 NaiveDate）
// 纯函数: 相同 (tokens, ctx) 必得相同输出（预览与审计依赖该性质）
// ==========================================

use chrono::{Datelike, NaiveDate};
use std::collections::HashMap;

use crate::engine::error::{RenderError, RenderResult};
use crate::engine::expression::{CompiledExpression, DatePartKind, Token};

/// 渲染上下文
#[derive(Debug, Clone)]
pub struct RenderContext {
    /// 渲染日期（UTC 日历日）
    pub date: NaiveDate,
    /// 记录字段值，供 {FIELD:name} 引用
    pub fields: HashMap<String, String>,
    /// 本次渲染使用的序号值
    pub sequence_value: i64,
}

impl RenderContext {
    pub fn new(date: NaiveDate, fields: HashMap<String, String>, sequence_value: i64) -> Self {
        Self {
            date,
            fields,
            sequence_value,
        }
    }
}

/// 渲染编译后的表达式
///
/// 各 Token 独立解析，按序拼接：
/// - Literal      -> 原样
/// - DatePart     -> YYYY 4位年 / YY 末2位年 / MM、DD 2位补零
/// - Sequence(n)  -> 序号左补零至 n 位；无宽度则十进制原样
/// - FieldRef     -> ctx.fields[name]，缺失报 MissingField
pub fn render(compiled: &CompiledExpression, ctx: &RenderContext) -> RenderResult<String> {
    let mut out = String::new();

    for token in compiled.tokens() {
        match token {
            Token::Literal(text) => out.push_str(text),
            Token::DatePart(kind) => out.push_str(&render_date_part(*kind, ctx.date)),
            Token::Sequence(width) => match width {
                Some(w) => out.push_str(&format!(
                    "{:0width$}",
                    ctx.sequence_value,
                    width = *w as usize
                )),
                None => out.push_str(&ctx.sequence_value.to_string()),
            },
            Token::FieldRef(name) => {
                let value = ctx
                    .fields
                    .get(name)
                    .ok_or_else(|| RenderError::MissingField { name: name.clone() })?;
                out.push_str(value);
            }
        }
    }

    Ok(out)
}

fn render_date_part(kind: DatePartKind, date: NaiveDate) -> String {
    match kind {
        DatePartKind::Year4 => format!("{:04}", date.year()),
        DatePartKind::Year2 => format!("{:02}", date.year() % 100),
        DatePartKind::Month => format!("{:02}", date.month()),
        DatePartKind::Day => format!("{:02}", date.day()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::expression::compile;

    fn ctx_on(date: NaiveDate, seq: i64) -> RenderContext {
        RenderContext::new(date, HashMap::new(), seq)
    }

    #[test]
    fn test_render_日期与序号() {
        let compiled = compile("{YYYY}{MM}{DD}-{SEQ:4}").unwrap();
        let date = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();

        let code = render(&compiled, &ctx_on(date, 1)).unwrap();
        assert_eq!(code, "20250115-0001");
    }

    #[test]
    fn test_render_两位年份() {
        let compiled = compile("{YY}{MM}").unwrap();
        let date = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        assert_eq!(render(&compiled, &ctx_on(date, 0)).unwrap(), "2503");
    }

    #[test]
    fn test_render_无宽度序号不补零() {
        let compiled = compile("N{SEQ}").unwrap();
        let date = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
        assert_eq!(render(&compiled, &ctx_on(date, 42)).unwrap(), "N42");
    }

    #[test]
    fn test_render_序号超出宽度不截断() {
        let compiled = compile("{SEQ:2}").unwrap();
        let date = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
        assert_eq!(render(&compiled, &ctx_on(date, 123)).unwrap(), "123");
    }

    #[test]
    fn test_render_字段引用() {
        let compiled = compile("{FIELD:group_code}-{SEQ:3}").unwrap();
        let date = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
        let mut fields = HashMap::new();
        fields.insert("group_code".to_string(), "RAW".to_string());

        let code = render(&compiled, &RenderContext::new(date, fields, 7)).unwrap();
        assert_eq!(code, "RAW-007");
    }

    #[test]
    fn test_render_缺失字段报错() {
        let compiled = compile("{FIELD:material_type}{SEQ}").unwrap();
        let date = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();

        let err = render(&compiled, &ctx_on(date, 1)).unwrap_err();
        assert_eq!(
            err,
            RenderError::MissingField {
                name: "material_type".to_string()
            }
        );
    }

    #[test]
    fn test_render_确定性() {
        // 相同 (tokens, ctx) 两次渲染输出一致
        let compiled = compile("WS-{YYYY}{MM}{DD}-{SEQ:4}").unwrap();
        let date = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
        let ctx = ctx_on(date, 9);

        let first = render(&compiled, &ctx).unwrap();
        let second = render(&compiled, &ctx).unwrap();
        assert_eq!(first, second);
        assert_eq!(first, "WS-20250115-0009");
    }
}
