use crate::error::CoreError;
use crate::ledger::CompletionLedger;
use crate::models::now_timestamp;
use crate::occurrence::OccurrenceKey;
use crate::repository::SqliteRepository;
use async_trait::async_trait;
use chrono::NaiveDate;
use tracing::info;

#[async_trait]
impl super::LedgerRepository for SqliteRepository {
    async fn load_ledger(&self) -> Result<CompletionLedger, CoreError> {
        let keys: Vec<String> = sqlx::query_scalar(
            "SELECT occurrence_key FROM completed_occurrences WHERE owner = $1",
        )
        .bind(self.owner())
        .fetch_all(self.pool())
        .await?;
        Ok(keys.into_iter().collect())
    }

    async fn mark_occurrence_completed(
        &self,
        template_id: &str,
        date: NaiveDate,
    ) -> Result<bool, CoreError> {
        let key = OccurrenceKey::new(template_id, date);
        let result = sqlx::query(
            r#"INSERT OR IGNORE INTO completed_occurrences
                (owner, occurrence_key, template_id, completed_at)
            VALUES ($1, $2, $3, $4)"#,
        )
        .bind(self.owner())
        .bind(key.ledger_key())
        .bind(template_id)
        .bind(now_timestamp())
        .execute(self.pool())
        .await?;

        let inserted = result.rows_affected() > 0;
        info!(template_id, %date, inserted, "occurrence marked completed");
        Ok(inserted)
    }

    async fn unmark_occurrence_completed(
        &self,
        template_id: &str,
        date: NaiveDate,
    ) -> Result<bool, CoreError> {
        let key = OccurrenceKey::new(template_id, date);
        let result = sqlx::query(
            "DELETE FROM completed_occurrences WHERE owner = $1 AND occurrence_key = $2",
        )
        .bind(self.owner())
        .bind(key.ledger_key())
        .execute(self.pool())
        .await?;

        let removed = result.rows_affected() > 0;
        info!(template_id, %date, removed, "occurrence unmarked");
        Ok(removed)
    }
}
