// ==========================================
// 编码规则引擎 - 编码规则仓储
// ==========================================
// 职责: 管理 code_rule 表（租户内唯一的命名规则）
// 说明: 采用软删除（deleted_at），(tenant_id, code) 以部分唯一索引
//       约束"未删除记录内唯一"
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::code_rule::CodeRule;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

pub struct CodeRuleRepository {
    conn: Arc<Mutex<Connection>>,
}

impl CodeRuleRepository {
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
            CREATE TABLE IF NOT EXISTS code_rule (
              uuid TEXT PRIMARY KEY,
              tenant_id INTEGER NOT NULL,
              name TEXT NOT NULL,
              code TEXT NOT NULL,
              expression TEXT NOT NULL,
              description TEXT,
              seq_start INTEGER NOT NULL DEFAULT 1,
              seq_step INTEGER NOT NULL DEFAULT 1,
              seq_reset_rule TEXT NOT NULL DEFAULT 'never',
              is_system INTEGER NOT NULL DEFAULT 0,
              is_active INTEGER NOT NULL DEFAULT 1,
              created_at TEXT NOT NULL DEFAULT (datetime('now')),
              updated_at TEXT NOT NULL DEFAULT (datetime('now')),
              deleted_at TEXT
            );

            CREATE UNIQUE INDEX IF NOT EXISTS uidx_code_rule_tenant_code
              ON code_rule(tenant_id, code) WHERE deleted_at IS NULL;
            CREATE INDEX IF NOT EXISTS idx_code_rule_tenant
              ON code_rule(tenant_id);
            CREATE INDEX IF NOT EXISTS idx_code_rule_created_at
              ON code_rule(created_at DESC);
            "#,
        )?;
        Ok(())
    }

    fn map_row(row: &Row<'_>) -> SqliteResult<CodeRule> {
        let reset_raw: String = row.get(8)?;
        let seq_reset_rule = reset_raw.parse().map_err(|e: String| {
            rusqlite::Error::FromSqlConversionFailure(8, rusqlite::types::Type::Text, e.into())
        })?;

        Ok(CodeRule {
            uuid: row.get(0)?,
            tenant_id: row.get(1)?,
            name: row.get(2)?,
            code: row.get(3)?,
            expression: row.get(4)?,
            description: row.get(5)?,
            seq_start: row.get(6)?,
            seq_step: row.get(7)?,
            seq_reset_rule,
            is_system: row.get(9)?,
            is_active: row.get(10)?,
            created_at: row.get(11)?,
            updated_at: row.get(12)?,
        })
    }

    const SELECT_COLUMNS: &'static str = r#"
        uuid, tenant_id, name, code, expression, description,
        seq_start, seq_step, seq_reset_rule, is_system, is_active,
        created_at, updated_at
    "#;

    /// 插入规则
    pub fn insert(&self, rule: &CodeRule) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO code_rule (
                uuid, tenant_id, name, code, expression, description,
                seq_start, seq_step, seq_reset_rule, is_system, is_active,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
            "#,
            params![
                rule.uuid,
                rule.tenant_id,
                rule.name,
                rule.code,
                rule.expression,
                rule.description,
                rule.seq_start,
                rule.seq_step,
                rule.seq_reset_rule.to_string(),
                rule.is_system,
                rule.is_active,
                rule.created_at,
                rule.updated_at,
            ],
        )?;
        Ok(())
    }

    /// 按 UUID 查找（不含已删除）
    pub fn find_by_uuid(&self, uuid: &str) -> RepositoryResult<Option<CodeRule>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM code_rule WHERE uuid = ?1 AND deleted_at IS NULL",
            Self::SELECT_COLUMNS
        );

        let result = conn.query_row(&sql, params![uuid], Self::map_row);
        match result {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// 按租户+规则代码查找（不含已删除）
    pub fn find_by_code(&self, tenant_id: i64, code: &str) -> RepositoryResult<Option<CodeRule>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM code_rule
             WHERE tenant_id = ?1 AND code = ?2 AND deleted_at IS NULL",
            Self::SELECT_COLUMNS
        );

        let result = conn.query_row(&sql, params![tenant_id, code], Self::map_row);
        match result {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// 更新规则（按 UUID）
    ///
    /// code 与 tenant_id 创建后不可变更，更新仅覆盖可编辑字段。
    pub fn update(&self, rule: &CodeRule) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            r#"
            UPDATE code_rule SET
                name = ?2,
                expression = ?3,
                description = ?4,
                seq_start = ?5,
                seq_step = ?6,
                seq_reset_rule = ?7,
                is_active = ?8,
                updated_at = datetime('now')
            WHERE uuid = ?1 AND deleted_at IS NULL
            "#,
            params![
                rule.uuid,
                rule.name,
                rule.expression,
                rule.description,
                rule.seq_start,
                rule.seq_step,
                rule.seq_reset_rule.to_string(),
                rule.is_active,
            ],
        )?;
        Ok(affected)
    }

    /// 软删除规则（历史计数桶保留，供审计）
    pub fn soft_delete(&self, uuid: &str) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            "UPDATE code_rule SET deleted_at = datetime('now')
             WHERE uuid = ?1 AND deleted_at IS NULL",
            params![uuid],
        )?;
        Ok(affected)
    }

    /// 列出租户下的规则（可选关键字匹配名称/代码，按创建时间倒序）
    pub fn list(&self, tenant_id: i64, keyword: Option<&str>) -> RepositoryResult<Vec<CodeRule>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM code_rule
             WHERE tenant_id = ?1 AND deleted_at IS NULL
               AND (?2 IS NULL OR name LIKE '%' || ?2 || '%' OR code LIKE '%' || ?2 || '%')
             ORDER BY created_at DESC, code ASC",
            Self::SELECT_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;

        let rows = stmt
            .query_map(params![tenant_id, keyword], Self::map_row)?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::SeqResetRule;

    fn sample_rule(tenant_id: i64, code: &str) -> CodeRule {
        CodeRule::new(
            tenant_id,
            format!("规则{}", code),
            code.to_string(),
            "WS-{YYYY}{MM}{DD}-{SEQ:4}".to_string(),
            Some("测试规则".to_string()),
            1,
            1,
            SeqResetRule::Daily,
            false,
        )
    }

    #[test]
    fn test_insert_and_find() {
        let repo = CodeRuleRepository::new(":memory:").expect("创建仓储失败");
        let rule = sample_rule(1, "WORKSTATION_CODE");
        repo.insert(&rule).expect("插入失败");

        let found = repo
            .find_by_uuid(&rule.uuid)
            .expect("查询失败")
            .expect("规则应存在");
        assert_eq!(found.code, "WORKSTATION_CODE");
        assert_eq!(found.seq_reset_rule, SeqResetRule::Daily);

        let by_code = repo
            .find_by_code(1, "WORKSTATION_CODE")
            .expect("查询失败")
            .expect("规则应存在");
        assert_eq!(by_code.uuid, rule.uuid);
    }

    #[test]
    fn test_tenant_code_unique() {
        let repo = CodeRuleRepository::new(":memory:").expect("创建仓储失败");
        repo.insert(&sample_rule(1, "WO_CODE")).expect("插入失败");

        // 同租户同代码：唯一约束违反
        let err = repo.insert(&sample_rule(1, "WO_CODE")).unwrap_err();
        assert!(matches!(
            err,
            RepositoryError::UniqueConstraintViolation(_)
        ));

        // 不同租户同代码：允许
        repo.insert(&sample_rule(2, "WO_CODE"))
            .expect("跨租户同代码应允许");
    }

    #[test]
    fn test_soft_delete_hides_rule() {
        let repo = CodeRuleRepository::new(":memory:").expect("创建仓储失败");
        let rule = sample_rule(1, "MAT_CODE");
        repo.insert(&rule).expect("插入失败");

        let affected = repo.soft_delete(&rule.uuid).expect("删除失败");
        assert_eq!(affected, 1);

        assert!(repo.find_by_uuid(&rule.uuid).unwrap().is_none());
        assert!(repo.find_by_code(1, "MAT_CODE").unwrap().is_none());

        // 删除后代码可复用（部分唯一索引只约束未删除记录）
        repo.insert(&sample_rule(1, "MAT_CODE"))
            .expect("删除后同代码应可重建");
    }

    #[test]
    fn test_list_keyword_filter() {
        let repo = CodeRuleRepository::new(":memory:").expect("创建仓储失败");
        repo.insert(&sample_rule(1, "WORK_ORDER_CODE")).unwrap();
        repo.insert(&sample_rule(1, "MATERIAL_CODE")).unwrap();
        repo.insert(&sample_rule(2, "WORK_ORDER_CODE")).unwrap();

        let all = repo.list(1, None).expect("查询失败");
        assert_eq!(all.len(), 2);

        let filtered = repo.list(1, Some("MATERIAL")).expect("查询失败");
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].code, "MATERIAL_CODE");
    }

    #[test]
    fn test_update_editable_fields() {
        let repo = CodeRuleRepository::new(":memory:").expect("创建仓储失败");
        let mut rule = sample_rule(1, "OP_CODE");
        repo.insert(&rule).expect("插入失败");

        rule.name = "工序编码（新）".to_string();
        rule.expression = "GX{SEQ:6}".to_string();
        rule.seq_reset_rule = SeqResetRule::Never;
        rule.is_active = false;

        let affected = repo.update(&rule).expect("更新失败");
        assert_eq!(affected, 1);

        let found = repo.find_by_uuid(&rule.uuid).unwrap().unwrap();
        assert_eq!(found.name, "工序编码（新）");
        assert_eq!(found.expression, "GX{SEQ:6}");
        assert_eq!(found.seq_reset_rule, SeqResetRule::Never);
        assert!(!found.is_active);
    }
}
