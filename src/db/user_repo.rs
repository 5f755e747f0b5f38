// src/db/user_repo.rs

use rust_decimal::Decimal;
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::{map_unique_violation, AppError},
    models::user::{CloserCounters, User, UserRole},
};

// O repositório de usuários (closers e admins), responsável pela tabela 'users'
#[derive(Clone, Default)]
pub struct UserRepository;

impl UserRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        name: &str,
        email: &str,
        role: UserRole,
    ) -> Result<User, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, User>(
            "INSERT INTO users (id, name, email, role) VALUES ($1, $2, $3, $4) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(email)
        .bind(role)
        .fetch_one(executor)
        .await
        .map_err(|e| map_unique_violation(e, format!("email '{}'", email)))
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<User>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(user)
    }

    pub async fn find_closer<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<User>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let user = sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE id = $1 AND role = 'CLOSER'",
        )
        .bind(id)
        .fetch_optional(executor)
        .await?;
        Ok(user)
    }

    /// Ordenado por receita (ranking), depois por nome.
    pub async fn list<'e, E>(&self, executor: E, role: Option<UserRole>) -> Result<Vec<User>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT * FROM users
            WHERE ($1::user_role IS NULL OR role = $1)
            ORDER BY total_revenue DESC, name ASC
            "#,
        )
        .bind(role)
        .fetch_all(executor)
        .await?;
        Ok(users)
    }

    pub async fn find_many<'e, E>(&self, executor: E, ids: &[Uuid]) -> Result<Vec<User>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let users = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(executor)
            .await?;
        Ok(users)
    }

    pub async fn increment_calls<'e, E>(&self, executor: E, closer_id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            "UPDATE users SET total_calls = total_calls + 1, updated_at = NOW() WHERE id = $1",
        )
        .bind(closer_id)
        .execute(executor)
        .await?;
        Ok(())
    }

    pub async fn record_win<'e, E>(
        &self,
        executor: E,
        closer_id: Uuid,
        value: Decimal,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            r#"
            UPDATE users
            SET total_wins = total_wins + 1,
                total_revenue = total_revenue + $2,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(closer_id)
        .bind(value)
        .execute(executor)
        .await?;
        Ok(())
    }

    /// Recalcula os contadores de todos os closers a partir das consultas e deals.
    pub async fn compute_counters<'e, E>(&self, executor: E) -> Result<Vec<CloserCounters>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let counters = sqlx::query_as::<_, CloserCounters>(
            r#"
            SELECT
                u.id AS closer_id,
                (SELECT COUNT(*) FROM appointments a
                  WHERE a.closer_id = u.id AND a.status = 'COMPLETED' AND a.showed_up IS TRUE
                ) AS total_calls,
                (SELECT COUNT(*) FROM deals d
                  WHERE d.closer_id = u.id AND d.status = 'WON'
                ) AS total_wins,
                (SELECT COALESCE(SUM(d.total_value), 0) FROM deals d
                  WHERE d.closer_id = u.id AND d.status = 'WON'
                ) AS total_revenue
            FROM users u
            WHERE u.role = 'CLOSER'
            "#,
        )
        .fetch_all(executor)
        .await?;
        Ok(counters)
    }

    pub async fn set_counters<'e, E>(&self, executor: E, counters: &CloserCounters) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            r#"
            UPDATE users
            SET total_calls = $2, total_wins = $3, total_revenue = $4, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(counters.closer_id)
        .bind(i32::try_from(counters.total_calls).unwrap_or(i32::MAX))
        .bind(i32::try_from(counters.total_wins).unwrap_or(i32::MAX))
        .bind(counters.total_revenue)
        .execute(executor)
        .await?;
        Ok(())
    }
}
