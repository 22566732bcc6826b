// ==========================================
// 编码规则引擎 - 序号计数仓储 (Sequence Store)
// ==========================================
// 职责: 管理 code_sequence 表，(tenant_id, rule_code, bucket) 粒度的原子计数
// 并发保证: next() 在 IMMEDIATE 事务内用单条 UPSERT..RETURNING 完成
//           读改写，同桶并发取号不会返回相同值（依赖 SQLite 写锁 +
//           busy_timeout，多实例共库同样成立）
// 生命周期: 桶首次取号时惰性创建、种子为 seq_start；只被 next() 推进；
//           永不删除（历史桶保留，供审计与幂等核对）
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::types::SeqResetRule;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::NaiveDate;
use rusqlite::{params, Connection, TransactionBehavior};
use std::sync::{Arc, Mutex};

pub struct SequenceRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SequenceRepository {
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;
        let repo = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        repo.ensure_table()?;
        Ok(repo)
    }

    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> RepositoryResult<Self> {
        let repo = Self { conn };
        repo.ensure_table()?;
        Ok(repo)
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 确保表存在（如果不存在则创建）
    fn ensure_table(&self) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS code_sequence (
              tenant_id INTEGER NOT NULL,
              rule_code TEXT NOT NULL,
              bucket TEXT NOT NULL,
              current_value INTEGER NOT NULL,
              created_at TEXT NOT NULL DEFAULT (datetime('now')),
              updated_at TEXT NOT NULL DEFAULT (datetime('now')),
              PRIMARY KEY (tenant_id, rule_code, bucket)
            );

            CREATE INDEX IF NOT EXISTS idx_code_sequence_rule
              ON code_sequence(tenant_id, rule_code);
            "#,
        )?;
        Ok(())
    }

    /// 预览下一个序号值（只读，不推进计数器）
    ///
    /// 任意次 peek 之后的首次 next() 返回值，与从未 peek 过完全一致。
    pub fn peek(
        &self,
        tenant_id: i64,
        rule_code: &str,
        date: NaiveDate,
        reset_rule: SeqResetRule,
        seq_start: i64,
        seq_step: i64,
    ) -> RepositoryResult<i64> {
        let bucket = reset_rule.bucket_label(date);
        let conn = self.get_conn()?;

        let result = conn.query_row(
            "SELECT current_value FROM code_sequence
             WHERE tenant_id = ?1 AND rule_code = ?2 AND bucket = ?3",
            params![tenant_id, rule_code, bucket],
            |row| row.get::<_, i64>(0),
        );

        match result {
            Ok(current) => Ok(current + seq_step),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(seq_start),
            Err(e) => Err(e.into()),
        }
    }

    /// 取下一个序号值（原子推进计数器，返回本次消费的值）
    ///
    /// 桶标签每次调用都从 date 重新推导，跨越重置边界（如 daily 跨日）
    /// 自然落入新桶、从 seq_start 重新计数。
    pub fn next(
        &self,
        tenant_id: i64,
        rule_code: &str,
        date: NaiveDate,
        reset_rule: SeqResetRule,
        seq_start: i64,
        seq_step: i64,
    ) -> RepositoryResult<i64> {
        let bucket = reset_rule.bucket_label(date);
        let mut conn = self.get_conn()?;

        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        // 单条 UPSERT: 桶不存在则以 seq_start 落座，存在则推进 seq_step，
        // RETURNING 给出本次消费的值
        let value: i64 = tx.query_row(
            r#"
            INSERT INTO code_sequence (tenant_id, rule_code, bucket, current_value)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(tenant_id, rule_code, bucket) DO UPDATE SET
                current_value = current_value + ?5,
                updated_at = datetime('now')
            RETURNING current_value
            "#,
            params![tenant_id, rule_code, bucket, seq_start, seq_step],
            |row| row.get(0),
        )?;

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_next_单调递增() {
        let repo = SequenceRepository::new(":memory:").expect("创建仓储失败");
        let date = d(2025, 1, 15);

        // seq_start=1, seq_step=1: 1, 2, 3, ...
        for expected in 1..=5 {
            let v = repo
                .next(1, "WO_CODE", date, SeqResetRule::Never, 1, 1)
                .expect("取号失败");
            assert_eq!(v, expected);
        }
    }

    #[test]
    fn test_next_自定义起始与步长() {
        let repo = SequenceRepository::new(":memory:").expect("创建仓储失败");
        let date = d(2025, 1, 15);

        // seq_start=100, seq_step=10: 100, 110, 120
        assert_eq!(
            repo.next(1, "R", date, SeqResetRule::Never, 100, 10).unwrap(),
            100
        );
        assert_eq!(
            repo.next(1, "R", date, SeqResetRule::Never, 100, 10).unwrap(),
            110
        );
        assert_eq!(
            repo.next(1, "R", date, SeqResetRule::Never, 100, 10).unwrap(),
            120
        );
    }

    #[test]
    fn test_next_每日重置() {
        let repo = SequenceRepository::new(":memory:").expect("创建仓储失败");

        // 1月15日取两个号
        repo.next(1, "WO", d(2025, 1, 15), SeqResetRule::Daily, 1, 1)
            .unwrap();
        let v = repo
            .next(1, "WO", d(2025, 1, 15), SeqResetRule::Daily, 1, 1)
            .unwrap();
        assert_eq!(v, 2);

        // 跨日: 新桶从起始值重新计数
        let v = repo
            .next(1, "WO", d(2025, 1, 16), SeqResetRule::Daily, 1, 1)
            .unwrap();
        assert_eq!(v, 1);

        // 旧桶保留不受影响
        let v = repo
            .next(1, "WO", d(2025, 1, 15), SeqResetRule::Daily, 1, 1)
            .unwrap();
        assert_eq!(v, 3);
    }

    #[test]
    fn test_peek_不影响next() {
        let repo = SequenceRepository::new(":memory:").expect("创建仓储失败");
        let date = d(2025, 1, 15);

        // 未取号前 peek 返回起始值
        for _ in 0..10 {
            let v = repo
                .peek(1, "MAT", date, SeqResetRule::Never, 1, 1)
                .expect("peek失败");
            assert_eq!(v, 1);
        }

        // 任意次 peek 后 next 仍返回起始值
        assert_eq!(
            repo.next(1, "MAT", date, SeqResetRule::Never, 1, 1).unwrap(),
            1
        );

        // 取号后 peek 返回下一个候选
        assert_eq!(
            repo.peek(1, "MAT", date, SeqResetRule::Never, 1, 1).unwrap(),
            2
        );
        assert_eq!(
            repo.next(1, "MAT", date, SeqResetRule::Never, 1, 1).unwrap(),
            2
        );
    }

    #[test]
    fn test_计数器按租户与规则隔离() {
        let repo = SequenceRepository::new(":memory:").expect("创建仓储失败");
        let date = d(2025, 1, 15);

        assert_eq!(
            repo.next(1, "A", date, SeqResetRule::Never, 1, 1).unwrap(),
            1
        );
        assert_eq!(
            repo.next(2, "A", date, SeqResetRule::Never, 1, 1).unwrap(),
            1
        );
        assert_eq!(
            repo.next(1, "B", date, SeqResetRule::Never, 1, 1).unwrap(),
            1
        );
        assert_eq!(
            repo.next(1, "A", date, SeqResetRule::Never, 1, 1).unwrap(),
            2
        );
    }

    #[test]
    fn test_月度与年度桶() {
        let repo = SequenceRepository::new(":memory:").expect("创建仓储失败");

        // monthly: 同月共桶，跨月重置
        repo.next(1, "M", d(2025, 1, 15), SeqResetRule::Monthly, 1, 1)
            .unwrap();
        let v = repo
            .next(1, "M", d(2025, 1, 31), SeqResetRule::Monthly, 1, 1)
            .unwrap();
        assert_eq!(v, 2);
        let v = repo
            .next(1, "M", d(2025, 2, 1), SeqResetRule::Monthly, 1, 1)
            .unwrap();
        assert_eq!(v, 1);

        // yearly: 同年共桶，跨年重置
        repo.next(1, "Y", d(2025, 6, 1), SeqResetRule::Yearly, 1, 1)
            .unwrap();
        let v = repo
            .next(1, "Y", d(2025, 12, 31), SeqResetRule::Yearly, 1, 1)
            .unwrap();
        assert_eq!(v, 2);
        let v = repo
            .next(1, "Y", d(2026, 1, 1), SeqResetRule::Yearly, 1, 1)
            .unwrap();
        assert_eq!(v, 1);
    }
}
