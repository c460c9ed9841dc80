//! Promotions Repository

use jiff::tz::TimeZone;
use jiff_sqlx::DateTime as SqlxDateTime;
use sqlx::{FromRow, PgConnection, Postgres, Row, Transaction, postgres::PgRow, query, query_as};

use crate::domain::promotions::{records::Promotion, store::PromotionTable};

const CREATE_PROMOTIONS_TABLE_SQL: &str = include_str!("sql/create_promotions_table.sql");
const CREATE_PROMOTIONS_STAGING_TABLE_SQL: &str =
    include_str!("sql/create_promotions_staging_table.sql");
const TRUNCATE_PROMOTIONS_SQL: &str = include_str!("sql/truncate_promotions.sql");
const TRUNCATE_PROMOTIONS_STAGING_SQL: &str = include_str!("sql/truncate_promotions_staging.sql");
const INSERT_PROMOTION_SQL: &str = include_str!("sql/insert_promotion.sql");
const INSERT_PROMOTION_STAGING_SQL: &str = include_str!("sql/insert_promotion_staging.sql");
const DELETE_PROMOTIONS_SQL: &str = include_str!("sql/delete_promotions.sql");
const COPY_STAGED_PROMOTIONS_SQL: &str = include_str!("sql/copy_staged_promotions.sql");
const GET_PROMOTION_SQL: &str = include_str!("sql/get_promotion.sql");

const COLUMN_EXPIRATION_DATE: &str = "expiration_date";

#[derive(Debug, Clone, Default)]
pub(crate) struct PgPromotionsRepository;

impl PgPromotionsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn create_tables(&self, conn: &mut PgConnection) -> Result<(), sqlx::Error> {
        query(CREATE_PROMOTIONS_TABLE_SQL).execute(&mut *conn).await?;
        query(CREATE_PROMOTIONS_STAGING_TABLE_SQL)
            .execute(&mut *conn)
            .await?;

        Ok(())
    }

    pub(crate) async fn truncate(
        &self,
        conn: &mut PgConnection,
        table: PromotionTable,
    ) -> Result<(), sqlx::Error> {
        let sql = match table {
            PromotionTable::Live => TRUNCATE_PROMOTIONS_SQL,
            PromotionTable::Staging => TRUNCATE_PROMOTIONS_STAGING_SQL,
        };

        query(sql).execute(conn).await?;

        Ok(())
    }

    /// Insert one row. The statement is prepared once per connection and
    /// reused for the rest of the batch.
    pub(crate) async fn insert_promotion(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        table: PromotionTable,
        promotion: &Promotion,
    ) -> Result<(), sqlx::Error> {
        let sql = match table {
            PromotionTable::Live => INSERT_PROMOTION_SQL,
            PromotionTable::Staging => INSERT_PROMOTION_STAGING_SQL,
        };

        query(sql)
            .bind(promotion.id.as_str())
            .bind(promotion.price)
            .bind(SqlxDateTime::from(
                TimeZone::UTC.to_datetime(promotion.expiration_date),
            ))
            .execute(&mut **tx)
            .await?;

        Ok(())
    }

    /// Replace the live rows with the staged rows. Returns the number of rows copied.
    pub(crate) async fn replace_from_staging(
        &self,
        tx: &mut Transaction<'_, Postgres>,
    ) -> Result<u64, sqlx::Error> {
        query(DELETE_PROMOTIONS_SQL).execute(&mut **tx).await?;

        let copied = query(COPY_STAGED_PROMOTIONS_SQL)
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(copied)
    }

    pub(crate) async fn get_promotion(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        id: &str,
    ) -> Result<Promotion, sqlx::Error> {
        query_as::<Postgres, Promotion>(GET_PROMOTION_SQL)
            .bind(id)
            .fetch_one(&mut **tx)
            .await
    }
}

impl<'r> FromRow<'r, PgRow> for Promotion {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let expiration_date = row
            .try_get::<SqlxDateTime, _>(COLUMN_EXPIRATION_DATE)?
            .to_jiff();

        let expiration_date = TimeZone::UTC
            .to_timestamp(expiration_date)
            .map_err(|e| sqlx::Error::ColumnDecode {
                index: COLUMN_EXPIRATION_DATE.to_string(),
                source: Box::new(e),
            })?;

        Ok(Self {
            id: row.try_get("id")?,
            price: row.try_get("price")?,
            expiration_date,
        })
    }
}
