// ==========================================
// 编码规则引擎 - 页面绑定仓储
// ==========================================
// 职责: 管理 page_binding 表（租户级"页面 -> 规则"覆盖项）
// 说明: 页面目录本身由 config::page_defaults 内置；本表只存租户改过的
//       绑定配置，读取时与目录合并。本表是唯一权威来源，不信任任何
//       客户端缓存
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::page_binding::PageBindingOverride;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

pub struct PageBindingRepository {
    conn: Arc<Mutex<Connection>>,
}

impl PageBindingRepository {
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
            CREATE TABLE IF NOT EXISTS page_binding (
              tenant_id INTEGER NOT NULL,
              page_code TEXT NOT NULL,
              rule_code TEXT,
              auto_generate INTEGER NOT NULL DEFAULT 0,
              allow_manual_edit INTEGER NOT NULL DEFAULT 1,
              updated_at TEXT NOT NULL DEFAULT (datetime('now')),
              PRIMARY KEY (tenant_id, page_code)
            );
            "#,
        )?;
        Ok(())
    }

    fn map_row(row: &Row<'_>) -> SqliteResult<PageBindingOverride> {
        Ok(PageBindingOverride {
            tenant_id: row.get(0)?,
            page_code: row.get(1)?,
            rule_code: row.get(2)?,
            auto_generate: row.get(3)?,
            allow_manual_edit: row.get(4)?,
            updated_at: row.get(5)?,
        })
    }

    /// 写入或覆盖绑定项（Upsert 操作）
    pub fn upsert(&self, binding: &PageBindingOverride) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO page_binding (
                tenant_id, page_code, rule_code, auto_generate, allow_manual_edit, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, datetime('now'))
            ON CONFLICT(tenant_id, page_code) DO UPDATE SET
                rule_code = excluded.rule_code,
                auto_generate = excluded.auto_generate,
                allow_manual_edit = excluded.allow_manual_edit,
                updated_at = datetime('now')
            "#,
            params![
                binding.tenant_id,
                binding.page_code,
                binding.rule_code,
                binding.auto_generate,
                binding.allow_manual_edit,
            ],
        )?;
        Ok(())
    }

    /// 查找单个绑定覆盖项
    pub fn find(
        &self,
        tenant_id: i64,
        page_code: &str,
    ) -> RepositoryResult<Option<PageBindingOverride>> {
        let conn = self.get_conn()?;
        let result = conn.query_row(
            "SELECT tenant_id, page_code, rule_code, auto_generate, allow_manual_edit, updated_at
             FROM page_binding WHERE tenant_id = ?1 AND page_code = ?2",
            params![tenant_id, page_code],
            Self::map_row,
        );

        match result {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// 列出租户的全部绑定覆盖项
    pub fn list_by_tenant(&self, tenant_id: i64) -> RepositoryResult<Vec<PageBindingOverride>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT tenant_id, page_code, rule_code, auto_generate, allow_manual_edit, updated_at
             FROM page_binding WHERE tenant_id = ?1 ORDER BY page_code ASC",
        )?;

        let rows = stmt
            .query_map(params![tenant_id], Self::map_row)?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_override(tenant_id: i64, page_code: &str) -> PageBindingOverride {
        PageBindingOverride {
            tenant_id,
            page_code: page_code.to_string(),
            rule_code: Some("WORK_ORDER_CODE".to_string()),
            auto_generate: true,
            allow_manual_edit: true,
            updated_at: String::new(),
        }
    }

    #[test]
    fn test_upsert_and_find() {
        let repo = PageBindingRepository::new(":memory:").expect("创建仓储失败");
        let binding = sample_override(1, "kuaizhizao-production-work-order");
        repo.upsert(&binding).expect("写入失败");

        let found = repo
            .find(1, "kuaizhizao-production-work-order")
            .expect("查询失败")
            .expect("绑定应存在");
        assert_eq!(found.rule_code.as_deref(), Some("WORK_ORDER_CODE"));
        assert!(found.auto_generate);
    }

    #[test]
    fn test_upsert_覆盖() {
        let repo = PageBindingRepository::new(":memory:").expect("创建仓储失败");
        let mut binding = sample_override(1, "master-data-material");
        repo.upsert(&binding).expect("写入失败");

        binding.rule_code = None;
        binding.auto_generate = false;
        repo.upsert(&binding).expect("覆盖失败");

        let found = repo
            .find(1, "master-data-material")
            .unwrap()
            .expect("绑定应存在");
        assert_eq!(found.rule_code, None);
        assert!(!found.auto_generate);
    }

    #[test]
    fn test_list_按租户隔离() {
        let repo = PageBindingRepository::new(":memory:").expect("创建仓储失败");
        repo.upsert(&sample_override(1, "page-a")).unwrap();
        repo.upsert(&sample_override(1, "page-b")).unwrap();
        repo.upsert(&sample_override(2, "page-a")).unwrap();

        let tenant1 = repo.list_by_tenant(1).expect("查询失败");
        assert_eq!(tenant1.len(), 2);

        let tenant2 = repo.list_by_tenant(2).expect("查询失败");
        assert_eq!(tenant2.len(), 1);
    }
}
