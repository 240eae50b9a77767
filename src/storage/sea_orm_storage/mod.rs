//! SeaORM 存储实现
//!
//! 统一的数据库存储层，支持 SQLite、PostgreSQL 和 MySQL。
//! 查询函数对 `ConnectionTrait` 泛型，同一份实现既可直接作用于连接池，
//! 也可作用于请求级事务。

mod assignments;
mod directory;

use crate::config::AppConfig;
use crate::errors::{HWSystemError, Result};
use migration::{Migrator, MigratorTrait};
use sea_orm::{
    ConnectOptions, Database, DatabaseConnection, DatabaseTransaction, DbErr, TransactionTrait,
};
use std::time::Duration;
use tracing::{debug, info};

/// 并发写冲突：SQLite WAL 快照过期或锁忙，PostgreSQL 序列化失败
fn is_write_conflict(err: &DbErr) -> bool {
    let msg = err.to_string();
    msg.contains("database is locked")
        || msg.contains("SQLITE_BUSY")
        || msg.contains("could not serialize access")
}

/// 写冲突归为状态错误（并发请求已抢先迁移），其余为数据库错误
fn map_write_error(
    err: DbErr,
    conflict: impl FnOnce() -> String,
    context: &str,
) -> HWSystemError {
    if is_write_conflict(&err) {
        HWSystemError::invalid_state(conflict())
    } else {
        HWSystemError::database_operation(format!("{context}: {err}"))
    }
}

/// SeaORM 存储实现
#[derive(Clone)]
pub struct SeaOrmStorage {
    pub(crate) db: DatabaseConnection,
}

/// 请求级事务，未提交即被丢弃时由 SeaORM 自动回滚
pub struct SeaOrmUnitOfWork {
    txn: DatabaseTransaction,
}

impl SeaOrmStorage {
    /// 创建新的 SeaORM 存储实例
    pub async fn new_async() -> Result<Self> {
        let config = AppConfig::get();
        let db_url = Self::build_database_url(&config.database.url)?;

        // 根据数据库类型选择连接方式
        let db = if db_url.starts_with("sqlite:") {
            Self::connect_sqlite(&db_url, config).await?
        } else {
            Self::connect_generic(&db_url, config).await?
        };

        Self::from_connection(db).await
    }

    /// 基于已有连接创建存储并运行迁移
    pub async fn from_connection(db: DatabaseConnection) -> Result<Self> {
        Migrator::up(&db, None)
            .await
            .map_err(|e| HWSystemError::database_operation(format!("数据库迁移失败: {e}")))?;

        info!("SeaORM 存储初始化完成");

        Ok(Self { db })
    }

    /// SQLite 专用连接（WAL + pragma 优化）
    async fn connect_sqlite(url: &str, config: &AppConfig) -> Result<DatabaseConnection> {
        use sea_orm::SqlxSqliteConnector;
        use sea_orm::sqlx::sqlite::{
            SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous,
        };
        use std::str::FromStr;

        let opt = SqliteConnectOptions::from_str(url)
            .map_err(|e| HWSystemError::database_config(format!("SQLite URL 解析失败: {e}")))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(5))
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.database.pool_size)
            .min_connections(1)
            .test_before_acquire(true)
            .acquire_timeout(Duration::from_secs(config.database.timeout))
            .idle_timeout(Duration::from_secs(300))
            .connect_with(opt)
            .await
            .map_err(|e| HWSystemError::database_connection(format!("SQLite 连接失败: {e}")))?;

        debug!("SQLite pool ready: {}", url);

        Ok(SqlxSqliteConnector::from_sqlx_sqlite_pool(pool))
    }

    /// 通用连接（PostgreSQL、MySQL 等）
    async fn connect_generic(url: &str, config: &AppConfig) -> Result<DatabaseConnection> {
        let mut opt = ConnectOptions::new(url);
        opt.max_connections(config.database.pool_size)
            .min_connections(1)
            .connect_timeout(Duration::from_secs(config.database.timeout))
            .acquire_timeout(Duration::from_secs(config.database.timeout))
            .idle_timeout(Duration::from_secs(600))
            .max_lifetime(Duration::from_secs(1800))
            .sqlx_logging(false);

        Database::connect(opt)
            .await
            .map_err(|e| HWSystemError::database_connection(format!("无法连接到数据库: {e}")))
    }

    /// 从 URL 自动推断数据库类型并构建连接 URL
    fn build_database_url(url: &str) -> Result<String> {
        if url.starts_with("sqlite:") {
            Ok(url.to_string())
        } else if url.ends_with(".db") || url.ends_with(".sqlite") {
            Ok(format!("sqlite://{}?mode=rwc", url))
        } else if url.starts_with("postgres://")
            || url.starts_with("postgresql://")
            || url.starts_with("mysql://")
            || url.starts_with("mariadb://")
        {
            Ok(url.to_string())
        } else {
            Err(HWSystemError::database_config(format!(
                "无法从 URL 推断数据库类型: {url}. 支持: sqlite://, postgres://, mysql://, 或 .db/.sqlite 文件路径"
            )))
        }
    }
}

// Storage trait 实现
use crate::models::{
    assignments::entities::{Assignment, AssignmentState, NewAssignment},
    directory::entities::{Student, Teacher},
};
use crate::storage::{AssignmentRepository, Storage, StudentDirectory, TeacherDirectory, UnitOfWork};
use async_trait::async_trait;

#[async_trait]
impl StudentDirectory for SeaOrmStorage {
    async fn get_student_by_user_id(&self, user_id: i64) -> Result<Option<Student>> {
        directory::get_student_by_user_id_impl(&self.db, user_id).await
    }
}

#[async_trait]
impl TeacherDirectory for SeaOrmStorage {
    async fn get_teacher_by_user_id(&self, user_id: i64) -> Result<Option<Teacher>> {
        directory::get_teacher_by_user_id_impl(&self.db, user_id).await
    }
}

#[async_trait]
impl Storage for SeaOrmStorage {
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| HWSystemError::database_operation(format!("开启事务失败: {e}")))?;
        Ok(Box::new(SeaOrmUnitOfWork { txn }))
    }
}

#[async_trait]
impl StudentDirectory for SeaOrmUnitOfWork {
    async fn get_student_by_user_id(&self, user_id: i64) -> Result<Option<Student>> {
        directory::get_student_by_user_id_impl(&self.txn, user_id).await
    }
}

#[async_trait]
impl TeacherDirectory for SeaOrmUnitOfWork {
    async fn get_teacher_by_user_id(&self, user_id: i64) -> Result<Option<Teacher>> {
        directory::get_teacher_by_user_id_impl(&self.txn, user_id).await
    }
}

#[async_trait]
impl AssignmentRepository for SeaOrmUnitOfWork {
    async fn get_assignment_by_id(&self, id: i64) -> Result<Option<Assignment>> {
        assignments::get_assignment_by_id_impl(&self.txn, id).await
    }

    async fn add_assignment(&self, assignment: NewAssignment) -> Result<Assignment> {
        assignments::add_assignment_impl(&self.txn, assignment).await
    }

    async fn save_assignment(
        &self,
        assignment: &Assignment,
        observed_state: AssignmentState,
    ) -> Result<Assignment> {
        assignments::save_assignment_impl(&self.txn, assignment, observed_state).await
    }

    async fn list_assignments_by_student(&self, student_id: i64) -> Result<Vec<Assignment>> {
        assignments::list_assignments_by_student_impl(&self.txn, student_id).await
    }

    async fn list_assignments_by_teacher(&self, teacher_id: i64) -> Result<Vec<Assignment>> {
        assignments::list_assignments_by_teacher_impl(&self.txn, teacher_id).await
    }
}

#[async_trait]
impl UnitOfWork for SeaOrmUnitOfWork {
    async fn commit(self: Box<Self>) -> Result<()> {
        self.txn.commit().await.map_err(|e| {
            map_write_error(
                e,
                || "transaction was overtaken by a concurrent request".to_string(),
                "提交事务失败",
            )
        })
    }
}
