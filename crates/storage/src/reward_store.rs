use boa_supply_domain::model::RewardFormula;
use boa_supply_domain::storage::{RewardStore, StorageError, StorageResult};
use num_bigint::BigInt;
use sea_orm::sea_query::{Alias, Expr, Func, Query, SelectStatement, SimpleExpr};
use sea_orm::ConnectionTrait;
use tracing::debug;

use crate::entity::validators;
use crate::SeaOrmStorage;

const REWARD_COLUMN: &str = "reward";

#[async_trait::async_trait]
impl RewardStore for SeaOrmStorage {
    async fn reward_aggregate(&self, formula: RewardFormula) -> StorageResult<Option<BigInt>> {
        let backend = self.connection().get_database_backend();
        let statement = backend.build(&aggregate_query(formula));

        // The pooled connection lives only for this call and is handed back
        // by sqlx on every exit path, including errors.
        let row = self
            .connection()
            .query_one(statement)
            .await
            .map_err(StorageError::from_source)?;

        let raw = match row {
            Some(row) => row
                .try_get::<Option<String>>("", REWARD_COLUMN)
                .map_err(StorageError::from_source)?,
            None => None,
        };
        debug!(formula = formula.as_ref(), raw = ?raw, "reward aggregate fetched");

        raw.as_deref().map(parse_aggregate).transpose()
    }
}

/// Builds `CAST(<gross> - SUM(balanceactivation) AS TEXT)`; casting keeps
/// the sum out of any fixed-width integer on the way back.
fn aggregate_query(formula: RewardFormula) -> SelectStatement {
    let balance: SimpleExpr = Func::sum(Expr::col(validators::Column::Balance)).into();
    let gross = match formula {
        RewardFormula::BalanceOnly => balance,
        RewardFormula::WithWithdrawals => {
            balance.add(Func::sum(Expr::col(validators::Column::Withdrawal)))
        }
    };
    let reward = gross.sub(Func::sum(Expr::col(validators::Column::BalanceActivation)));

    Query::select()
        .expr_as(Func::cast_as(reward, Alias::new("TEXT")), Alias::new(REWARD_COLUMN))
        .from(validators::Entity)
        .to_owned()
}

/// Accepts integral decimal text; PostgreSQL may render `numeric` sums with a
/// zero fractional part.
fn parse_aggregate(raw: &str) -> StorageResult<BigInt> {
    let trimmed = raw.trim();
    let (integral, fraction) = trimmed.split_once('.').unwrap_or((trimmed, ""));
    if !fraction.chars().all(|c| c == '0') {
        return Err(StorageError::MalformedAggregate(raw.to_string()));
    }
    integral
        .parse::<BigInt>()
        .map_err(|_| StorageError::MalformedAggregate(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::sea_query::{PostgresQueryBuilder, SqliteQueryBuilder};
    use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Schema, Set};
    use std::time::Duration;

    async fn single_connection_storage() -> SeaOrmStorage {
        SeaOrmStorage::builder()
            .database_url("sqlite::memory:")
            .max_connections(1)
            .acquire_timeout(Duration::from_secs(2))
            .build()
            .await
            .expect("storage inits")
    }

    async fn create_validators_table(db: &DatabaseConnection) {
        let backend = db.get_database_backend();
        let statement = Schema::new(backend).create_table_from_entity(validators::Entity);
        db.execute(backend.build(&statement))
            .await
            .expect("validators table created");
    }

    async fn insert_validator(
        db: &DatabaseConnection,
        address: &str,
        balance: i64,
        withdrawal: i64,
        activation: i64,
    ) {
        validators::ActiveModel {
            address: Set(address.to_string()),
            balance: Set(balance),
            withdrawal: Set(withdrawal),
            balance_activation: Set(activation),
        }
        .insert(db)
        .await
        .expect("validator inserted");
    }

    #[test]
    fn query_text_matches_formula() {
        let (with_withdrawals, _) =
            aggregate_query(RewardFormula::WithWithdrawals).build(PostgresQueryBuilder);
        assert!(with_withdrawals.starts_with("SELECT CAST("));
        assert!(with_withdrawals.contains(r#"SUM("balance") + SUM("withdrawal")"#));
        assert!(with_withdrawals.contains(r#"- SUM("balanceactivation")"#));
        assert!(with_withdrawals.contains(r#"AS TEXT) AS "reward" FROM "validators""#));

        let (balance_only, _) = aggregate_query(RewardFormula::BalanceOnly).build(SqliteQueryBuilder);
        assert!(!balance_only.contains("withdrawal"));
        assert!(balance_only.contains(r#"SUM("balanceactivation")"#));
    }

    #[test]
    fn parses_integral_text() {
        assert_eq!(parse_aggregate("12345").unwrap(), BigInt::from(12345));
        assert_eq!(parse_aggregate("-42").unwrap(), BigInt::from(-42));
        assert_eq!(parse_aggregate("700.000").unwrap(), BigInt::from(700));
        assert_eq!(
            parse_aggregate("123456789012345678901234567890").unwrap(),
            "123456789012345678901234567890".parse::<BigInt>().unwrap()
        );
        assert!(matches!(
            parse_aggregate("1.5"),
            Err(StorageError::MalformedAggregate(_))
        ));
        assert!(matches!(
            parse_aggregate("abc"),
            Err(StorageError::MalformedAggregate(_))
        ));
    }

    #[tokio::test]
    async fn aggregates_rewards_per_formula() {
        let storage = single_connection_storage().await;
        create_validators_table(storage.connection()).await;
        insert_validator(storage.connection(), "v1", 32_500, 300, 32_000).await;
        insert_validator(storage.connection(), "v2", 40_000, 0, 32_000).await;

        let with_withdrawals = storage
            .reward_aggregate(RewardFormula::WithWithdrawals)
            .await
            .expect("aggregate succeeds");
        assert_eq!(with_withdrawals, Some(BigInt::from(8_800)));

        let balance_only = storage
            .reward_aggregate(RewardFormula::BalanceOnly)
            .await
            .expect("aggregate succeeds");
        assert_eq!(balance_only, Some(BigInt::from(8_500)));
    }

    #[tokio::test]
    async fn empty_table_yields_none() {
        let storage = single_connection_storage().await;
        create_validators_table(storage.connection()).await;

        let reward = storage
            .reward_aggregate(RewardFormula::WithWithdrawals)
            .await
            .expect("aggregate succeeds");
        assert_eq!(reward, None);
    }

    #[tokio::test]
    async fn connection_returns_to_pool_after_failed_query() {
        let storage = single_connection_storage().await;

        // No table yet: the query fails. With a single-connection pool any
        // leaked connection would make every later call time out.
        for _ in 0..3 {
            let err = storage
                .reward_aggregate(RewardFormula::BalanceOnly)
                .await
                .expect_err("missing table fails");
            assert!(matches!(err, StorageError::Database(_)));
        }

        create_validators_table(storage.connection()).await;
        insert_validator(storage.connection(), "v1", 10, 0, 4).await;
        let reward = storage
            .reward_aggregate(RewardFormula::BalanceOnly)
            .await
            .expect("pool still has its connection");
        assert_eq!(reward, Some(BigInt::from(6)));
        assert_eq!(
            validators::Entity::find()
                .all(storage.connection())
                .await
                .expect("select works")
                .len(),
            1
        );
    }
}
