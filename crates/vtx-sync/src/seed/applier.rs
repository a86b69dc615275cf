//! Seed applier
//!
//! The applier owns the transaction: a seed must not contain its own
//! transaction control, and either every statement lands or none does.

use serde::Serialize;
use sqlparser::ast::Statement;
use sqlparser::dialect::PostgreSqlDialect;
use sqlparser::parser::Parser;
use sqlparser::tokenizer::{Token, Tokenizer, Whitespace};
use std::path::Path;
use tracing::{debug, error, info, warn};

use crate::db::TaxonomyStore;
use crate::error::{Result, SyncError};

/// Whether an applied seed is kept
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplyMode {
    Commit,
    /// Execute, then roll back
    DryRun,
}

/// Static facts about a seed, checked before execution
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SeedCheck {
    pub statements: usize,
    pub inserts: usize,
}

/// What happened when a seed ran
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ApplyOutcome {
    pub check: SeedCheck,
    pub rows_affected: u64,
    pub committed: bool,
}

/// Read a seed file
pub fn read_seed(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();
    std::fs::read_to_string(path).map_err(|e| {
        SyncError::Io(std::io::Error::new(
            e.kind(),
            format!("cannot read seed '{}': {e}", path.display()),
        ))
    })
}

/// Parse a seed and reject statements the applier must not run.
///
/// Only INSERT and UPDATE are accepted. Line comments must not contain a
/// carriage return, which Postgres treats as the end of the comment.
pub fn validate(sql: &str) -> Result<SeedCheck> {
    reject_split_comments(sql)?;

    let statements = Parser::parse_sql(&PostgreSqlDialect {}, sql)
        .map_err(|e| SyncError::seed(format!("SQL syntax error: {e}")))?;

    if statements.is_empty() {
        return Err(SyncError::seed("seed contains no statements"));
    }

    let mut check = SeedCheck {
        statements: statements.len(),
        inserts: 0,
    };

    for (index, statement) in statements.iter().enumerate() {
        let position = index + 1;
        let refused = match statement {
            Statement::Insert { .. } => {
                check.inserts += 1;
                continue;
            },
            Statement::Update { .. } => continue,
            Statement::Drop { .. } => "DROP is not allowed",
            Statement::Truncate { .. } => "TRUNCATE is not allowed",
            Statement::Delete { .. } => "DELETE is not allowed",
            Statement::AlterTable { .. } => "ALTER TABLE is not allowed",
            Statement::StartTransaction { .. } | Statement::Commit { .. } | Statement::Rollback { .. } => {
                "transaction control is handled by the applier"
            },
            other => {
                warn!(position, statement = %other, "Seed statement refused");
                "only INSERT and UPDATE are allowed"
            },
        };
        return Err(SyncError::seed(format!("statement {position}: {refused}")));
    }

    Ok(check)
}

fn reject_split_comments(sql: &str) -> Result<()> {
    let tokens = Tokenizer::new(&PostgreSqlDialect {}, sql)
        .tokenize()
        .map_err(|e| SyncError::seed(format!("SQL syntax error: {e}")))?;

    let split = tokens.iter().any(|token| {
        matches!(
            token,
            Token::Whitespace(Whitespace::SingleLineComment { comment, .. }) if comment.contains('\r')
        )
    });
    if split {
        return Err(SyncError::seed("line comment contains a carriage return"));
    }
    Ok(())
}

/// A seed that passed [`validate`], ready to run
#[derive(Debug, Clone)]
pub struct CheckedSeed {
    sql: String,
    check: SeedCheck,
}

impl CheckedSeed {
    /// Validate a seed once and keep the result with its text
    pub fn new(sql: impl Into<String>) -> Result<Self> {
        let sql = sql.into();
        let check = validate(&sql)?;
        Ok(Self { sql, check })
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn check(&self) -> SeedCheck {
        self.check
    }
}

/// Run a checked seed as one batch inside one transaction.
///
/// Any SQL error rolls the whole batch back and is returned with the driver's
/// message. In [`ApplyMode::DryRun`] the batch runs and is then rolled back.
pub async fn apply(store: &TaxonomyStore, seed: &CheckedSeed, mode: ApplyMode) -> Result<ApplyOutcome> {
    let check = seed.check;
    debug!(statements = check.statements, ?mode, "Applying seed");

    let mut tx = store.pool().begin().await?;

    let result = match sqlx::raw_sql(&seed.sql).execute(&mut *tx).await {
        Ok(result) => result,
        Err(e) => {
            error!(error = %e, "Seed failed, rolling back");
            if let Err(rollback) = tx.rollback().await {
                warn!(error = %rollback, "Rollback failed");
            }
            return Err(e.into());
        },
    };

    let committed = match mode {
        ApplyMode::Commit => {
            tx.commit().await?;
            true
        },
        ApplyMode::DryRun => {
            tx.rollback().await?;
            false
        },
    };

    info!(
        statements = check.statements,
        rows_affected = result.rows_affected(),
        committed,
        "Seed applied"
    );

    Ok(ApplyOutcome {
        check,
        rows_affected: result.rows_affected(),
        committed,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::compare;
    use crate::seed::{generate, Provenance};
    use sqlx::PgPool;
    use vtx_common::types::{Dataset, Generation, Make, Model};

    #[test]
    fn test_validate_counts_statements() {
        let check = validate(
            "-- header\nINSERT INTO vehicle_makes (slug, name) VALUES ('bmw', 'BMW');\n\
             UPDATE vehicle_makes SET name = 'BMW' WHERE slug = 'bmw';",
        )
        .unwrap();
        assert_eq!(check.statements, 2);
        assert_eq!(check.inserts, 1);
    }

    #[test]
    fn test_validate_rejects_destructive_statements() {
        for sql in [
            "DROP TABLE vehicle_makes;",
            "TRUNCATE vehicle_models;",
            "DELETE FROM vehicle_models WHERE slug = 'x5';",
            "ALTER TABLE vehicle_models ADD COLUMN x INTEGER;",
        ] {
            assert!(matches!(validate(sql), Err(SyncError::Seed(_))), "{sql} accepted");
        }
    }

    #[test]
    fn test_validate_allows_only_inserts_and_updates() {
        for sql in [
            "CREATE TABLE shadow (id INTEGER);",
            "GRANT SELECT ON vehicle_makes TO intruder;",
            "SELECT pg_terminate_backend(1);",
            "INSERT INTO vehicle_makes (slug, name) VALUES ('bmw', 'BMW');\nCREATE ROLE intruder;",
        ] {
            let err = validate(sql).unwrap_err();
            assert!(
                err.to_string().contains("only INSERT and UPDATE are allowed"),
                "{sql}: {err}"
            );
        }
    }

    #[test]
    fn test_validate_rejects_carriage_return_in_comment() {
        let sql = "-- BMW\rDROP TABLE vehicle_makes;\n\
                   INSERT INTO vehicle_makes (slug, name) VALUES ('bmw', 'BMW');";
        let err = validate(sql).unwrap_err();
        assert!(err.to_string().contains("carriage return"));

        // Inside a literal it is plain data
        let check = validate("INSERT INTO vehicle_makes (slug, name) VALUES ('bmw', 'B\rMW');").unwrap();
        assert_eq!(check.inserts, 1);
    }

    #[test]
    fn test_checked_seed_keeps_its_check() {
        let sql = "INSERT INTO vehicle_makes (slug, name) VALUES ('bmw', 'BMW');";
        let seed = CheckedSeed::new(sql).unwrap();
        assert_eq!(seed.sql(), sql);
        assert_eq!(seed.check(), SeedCheck { statements: 1, inserts: 1 });
        assert!(CheckedSeed::new("DROP TABLE vehicle_makes;").is_err());
    }

    #[test]
    fn test_validate_rejects_transaction_control() {
        let sql = "BEGIN;\nINSERT INTO vehicle_makes (slug, name) VALUES ('bmw', 'BMW');\nCOMMIT;";
        let err = validate(sql).unwrap_err();
        assert!(err.to_string().contains("statement 1"));
    }

    #[test]
    fn test_validate_rejects_empty_and_garbage() {
        assert!(validate("-- nothing here\n").is_err());
        assert!(validate("INSERT INTO").is_err());
    }

    #[test]
    fn test_read_seed_missing_file() {
        let err = read_seed("/nonexistent/seed.sql").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/seed.sql"));
    }

    fn bmw_dataset() -> Dataset {
        Dataset::new(vec![Make::new("bmw", "BMW").with_model(
            Model::new("5-series", "5 Series")
                .with_years(Some(1980), Some(2020))
                .with_generation(Generation::new("E39", 1995, Some(2003))),
        )])
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL"]
    async fn test_generate_apply_compare_round(pool: PgPool) -> sqlx::Result<()> {
        let store = TaxonomyStore::from_pool(pool);
        let dataset = bmw_dataset();

        let before = compare::find_missing(&dataset, &store.snapshot().await.unwrap());
        assert_eq!(before.models.len(), 1);
        assert_eq!(before.models[0].model_slug, "5-series");

        let script = generate(&dataset, &Provenance::new("test", "0"));
        let seed = CheckedSeed::new(script.sql).unwrap();
        let outcome = apply(&store, &seed, ApplyMode::Commit).await.unwrap();
        assert!(outcome.committed);

        let after = compare::find_missing(&dataset, &store.snapshot().await.unwrap());
        assert!(after.is_empty());

        // Second application changes nothing
        apply(&store, &seed, ApplyMode::Commit).await.unwrap();
        let snapshot = store.snapshot().await.unwrap();
        assert_eq!(snapshot.makes.len(), 1);
        assert_eq!(snapshot.models.len(), 1);
        assert_eq!(snapshot.generations.len(), 1);

        Ok(())
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL"]
    async fn test_dry_run_rolls_back(pool: PgPool) -> sqlx::Result<()> {
        let store = TaxonomyStore::from_pool(pool);
        let script = generate(&bmw_dataset(), &Provenance::new("test", "0"));
        let seed = CheckedSeed::new(script.sql).unwrap();

        let outcome = apply(&store, &seed, ApplyMode::DryRun).await.unwrap();
        assert!(!outcome.committed);
        assert!(store.fetch_makes().await.unwrap().is_empty());

        Ok(())
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL"]
    async fn test_failing_statement_rolls_back_batch(pool: PgPool) -> sqlx::Result<()> {
        let store = TaxonomyStore::from_pool(pool);
        let sql = "INSERT INTO vehicle_makes (slug, name) VALUES ('bmw', 'BMW');\n\
                   INSERT INTO vehicle_makes (slug, name) VALUES ('audi', NULL);";

        let seed = CheckedSeed::new(sql).unwrap();

        let err = apply(&store, &seed, ApplyMode::Commit).await.unwrap_err();
        assert!(matches!(err, SyncError::Sqlx(_)));
        assert!(store.fetch_makes().await.unwrap().is_empty());

        Ok(())
    }
}
