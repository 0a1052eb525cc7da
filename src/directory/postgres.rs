use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures_util::stream::BoxStream;
use futures_util::StreamExt;
use sqlx::PgPool;
use std::collections::BTreeSet;

use super::Directory;
use crate::error::{AppError, AppResult};
use crate::models::{Appointment, DeviceAddress, Role, User};

/// Directory backed by the `users` and `appointments` tables
#[derive(Clone)]
pub struct PgDirectory {
    pool: PgPool,
}

impl PgDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Directory for PgDirectory {
    async fn addresses_for_role(&self, role: Role) -> AppResult<Vec<DeviceAddress>> {
        let books: Vec<Vec<String>> = sqlx::query_scalar(
            r#"
            SELECT fcm_tokens FROM users
            WHERE role = $1
            ORDER BY created_at, id
            "#,
        )
        .bind(role.as_str())
        .fetch_all(&self.pool)
        .await?;

        Ok(books
            .into_iter()
            .flatten()
            .map(DeviceAddress::from)
            .collect())
    }

    async fn addresses_for_user(&self, user_id: &str) -> AppResult<Vec<DeviceAddress>> {
        let book: Option<Vec<String>> =
            sqlx::query_scalar("SELECT fcm_tokens FROM users WHERE id = $1")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?;

        book.map(|tokens| tokens.into_iter().map(DeviceAddress::from).collect())
            .ok_or_else(|| AppError::UserNotFound(user_id.to_string()))
    }

    async fn user_by_id(&self, user_id: &str) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, role, first_name, last_name, fcm_tokens, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::UserNotFound(user_id.to_string()))
    }

    async fn prune_addresses(&self, invalid: &BTreeSet<DeviceAddress>) -> AppResult<usize> {
        if invalid.is_empty() {
            return Ok(0);
        }

        let tokens: Vec<String> = invalid.iter().map(|a| a.as_str().to_string()).collect();

        let owners: Vec<String> =
            sqlx::query_scalar("SELECT id FROM users WHERE fcm_tokens && $1::text[]")
                .bind(tokens.as_slice())
                .fetch_all(&self.pool)
                .await?;

        let mut updated = 0;

        for user_id in owners {
            // Single-row UPDATE, so each rewrite is atomic on its own
            let result = sqlx::query(
                r#"
                UPDATE users
                SET fcm_tokens = ARRAY(
                        SELECT t FROM unnest(fcm_tokens) WITH ORDINALITY AS u(t, ord)
                        WHERE t <> ALL($2::text[])
                        ORDER BY ord
                    ),
                    updated_at = NOW()
                WHERE id = $1
                "#,
            )
            .bind(&user_id)
            .bind(tokens.as_slice())
            .execute(&self.pool)
            .await;

            match result {
                Ok(r) if r.rows_affected() > 0 => {
                    log::info!("Pruned invalid device addresses for user {}", user_id);
                    updated += 1;
                }
                Ok(_) => {
                    log::debug!("User {} disappeared before pruning", user_id);
                }
                Err(e) => {
                    log::warn!(
                        "Failed to prune device addresses for user {}: {}",
                        user_id,
                        e
                    );
                }
            }
        }

        Ok(updated)
    }

    async fn appointment_by_id(&self, appointment_id: &str) -> AppResult<Appointment> {
        sqlx::query_as::<_, Appointment>(
            r#"
            SELECT id, patient_id, doctor_id, appointment_date, appointment_time
            FROM appointments
            WHERE id = $1
            "#,
        )
        .bind(appointment_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::AppointmentNotFound(appointment_id.to_string()))
    }

    fn appointments_in_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> BoxStream<'_, AppResult<Appointment>> {
        sqlx::query_as::<_, Appointment>(
            r#"
            SELECT id, patient_id, doctor_id, appointment_date, appointment_time
            FROM appointments
            WHERE appointment_date >= $1 AND appointment_date < $2
            ORDER BY appointment_date, id
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch(&self.pool)
        .map(|row| row.map_err(AppError::from))
        .boxed()
    }
}
