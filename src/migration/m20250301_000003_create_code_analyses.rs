//! Migration: Create code_analyses table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared(
                r#"
                CREATE TABLE code_analyses (
                    id UUID PRIMARY KEY,
                    user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                    code TEXT NOT NULL,
                    language VARCHAR(50) NOT NULL,
                    score INTEGER NOT NULL CHECK (score >= 0 AND score <= 100),
                    feedback JSONB NOT NULL DEFAULT '[]'::jsonb,
                    suggestions JSONB NOT NULL DEFAULT '[]'::jsonb,
                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
                );

                CREATE INDEX idx_code_analyses_user_created
                    ON code_analyses(user_id, created_at);

                -- stats/summary aggregates DISTINCT language per user
                CREATE INDEX idx_code_analyses_user_language
                    ON code_analyses(user_id, language);
                "#,
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared("DROP TABLE IF EXISTS code_analyses CASCADE;")
            .await?;

        Ok(())
    }
}
