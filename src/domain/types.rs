// ==========================================
// 编码规则引擎 - 领域类型定义
// ==========================================
// 序列化格式: 小写字符串 (与数据库列 seq_reset_rule 一致)
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ==========================================
// 序号重置规则 (Sequence Reset Rule)
// ==========================================
// 决定序号计数器按什么周期归位到起始值
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeqResetRule {
    Never,   // 不重置
    Daily,   // 每日重置
    Monthly, // 每月重置
    Yearly,  // 每年重置
}

impl SeqResetRule {
    /// 根据取号当天的日期推导计数桶标签
    ///
    /// 规则：
    /// - never   -> "*"（所有日期共用一个桶）
    /// - daily   -> "YYYYMMDD"
    /// - monthly -> "YYYYMM"
    /// - yearly  -> "YYYY"
    ///
    /// 桶标签在每次取号时重新计算，跨越重置边界（如每日规则跨零点）
    /// 自然落入新桶、从起始值重新计数，不需要任何特判。
    pub fn bucket_label(&self, date: chrono::NaiveDate) -> String {
        match self {
            SeqResetRule::Never => "*".to_string(),
            SeqResetRule::Daily => date.format("%Y%m%d").to_string(),
            SeqResetRule::Monthly => date.format("%Y%m").to_string(),
            SeqResetRule::Yearly => date.format("%Y").to_string(),
        }
    }
}

impl Default for SeqResetRule {
    fn default() -> Self {
        SeqResetRule::Never
    }
}

impl fmt::Display for SeqResetRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeqResetRule::Never => write!(f, "never"),
            SeqResetRule::Daily => write!(f, "daily"),
            SeqResetRule::Monthly => write!(f, "monthly"),
            SeqResetRule::Yearly => write!(f, "yearly"),
        }
    }
}

impl FromStr for SeqResetRule {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "never" | "" => Ok(SeqResetRule::Never),
            "daily" => Ok(SeqResetRule::Daily),
            "monthly" => Ok(SeqResetRule::Monthly),
            "yearly" => Ok(SeqResetRule::Yearly),
            other => Err(format!("未知的重置规则: {}", other)),
        }
    }
}
