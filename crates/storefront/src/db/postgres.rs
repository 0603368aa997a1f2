//! `PostgreSQL` cart repository.
//!
//! Lines live in `storefront.cart_line`, one row per (cart, name). Every
//! mutation runs in a transaction together with the read that returns the
//! resulting cart, so callers always see a consistent snapshot.

use std::time::Duration;

use async_trait::async_trait;
use cafe_aroma_core::{CartError, CartKey, CartLineId, StoredCartLine, UnitPrice};
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};
use tracing::instrument;

use super::{CartRepository, MAX_LINE_QUANTITY, RepositoryError, check_add};

const SELECT_LINES: &str = r"
    SELECT id, name, unit_price, quantity
    FROM storefront.cart_line
    WHERE cart_key = $1
    ORDER BY id
";

const UPSERT_LINE: &str = r"
    INSERT INTO storefront.cart_line AS line (cart_key, name, unit_price, quantity)
    VALUES ($1, $2, $3, $4)
    ON CONFLICT (cart_key, name)
    DO UPDATE SET quantity = line.quantity + EXCLUDED.quantity, updated_at = now()
    WHERE line.quantity::bigint + EXCLUDED.quantity <= $5
";

const UPDATE_QUANTITY: &str = r"
    UPDATE storefront.cart_line
    SET quantity = $3, updated_at = now()
    WHERE cart_key = $1 AND id = $2
";

const DELETE_LINE: &str = "DELETE FROM storefront.cart_line WHERE cart_key = $1 AND id = $2";

const DELETE_CART: &str = "DELETE FROM storefront.cart_line WHERE cart_key = $1";

const DELETE_IDLE_CARTS: &str = r"
    DELETE FROM storefront.cart_line
    WHERE cart_key IN (
        SELECT cart_key
        FROM storefront.cart_line
        GROUP BY cart_key
        HAVING max(updated_at) < now() - make_interval(secs => $1)
    )
";

/// Raw `cart_line` row.
#[derive(Debug, sqlx::FromRow)]
struct CartLineRow {
    id: CartLineId,
    name: String,
    unit_price: Decimal,
    quantity: i32,
}

impl TryFrom<CartLineRow> for StoredCartLine {
    type Error = RepositoryError;

    fn try_from(row: CartLineRow) -> Result<Self, Self::Error> {
        let unit_price = UnitPrice::new(row.unit_price).map_err(|e| {
            RepositoryError::DataCorruption(format!("cart line {}: {e}", row.id))
        })?;
        let quantity = u32::try_from(row.quantity)
            .ok()
            .filter(|quantity| *quantity > 0)
            .ok_or_else(|| {
                RepositoryError::DataCorruption(format!(
                    "cart line {}: invalid quantity {}",
                    row.id, row.quantity
                ))
            })?;

        Ok(Self {
            id: row.id,
            name: row.name,
            unit_price,
            quantity,
        })
    }
}

/// Cart repository backed by `PostgreSQL`.
#[derive(Clone)]
pub struct PgCartRepository {
    pool: PgPool,
}

impl PgCartRepository {
    /// Create a new repository with the given pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

async fn fetch_lines(
    conn: &mut PgConnection,
    cart: CartKey,
) -> Result<Vec<StoredCartLine>, RepositoryError> {
    let rows: Vec<CartLineRow> = sqlx::query_as(SELECT_LINES)
        .bind(cart.as_uuid())
        .fetch_all(conn)
        .await?;

    rows.into_iter().map(StoredCartLine::try_from).collect()
}

fn to_db_quantity(name: &str, quantity: u32) -> Result<i32, RepositoryError> {
    i32::try_from(quantity).map_err(|_| CartError::QuantityOverflow(name.to_owned()).into())
}

#[async_trait]
impl CartRepository for PgCartRepository {
    #[instrument(skip(self))]
    async fn lines(&self, cart: CartKey) -> Result<Vec<StoredCartLine>, RepositoryError> {
        let mut conn = self.pool.acquire().await?;
        fetch_lines(&mut conn, cart).await
    }

    #[instrument(skip(self, unit_price))]
    async fn add(
        &self,
        cart: CartKey,
        name: &str,
        unit_price: UnitPrice,
        quantity: u32,
    ) -> Result<Vec<StoredCartLine>, RepositoryError> {
        check_add(name, quantity)?;
        let quantity = to_db_quantity(name, quantity)?;

        let mut tx = self.pool.begin().await?;
        let result = sqlx::query(UPSERT_LINE)
            .bind(cart.as_uuid())
            .bind(name)
            .bind(unit_price.amount())
            .bind(quantity)
            .bind(i64::from(MAX_LINE_QUANTITY))
            .execute(&mut *tx)
            .await?;
        // The conflict branch skips the update when the merge would overflow.
        if result.rows_affected() == 0 {
            return Err(CartError::QuantityOverflow(name.to_owned()).into());
        }
        let lines = fetch_lines(&mut tx, cart).await?;
        tx.commit().await?;

        Ok(lines)
    }

    #[instrument(skip(self))]
    async fn set_quantity(
        &self,
        cart: CartKey,
        id: CartLineId,
        quantity: u32,
    ) -> Result<Vec<StoredCartLine>, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let result = if quantity == 0 {
            sqlx::query(DELETE_LINE)
                .bind(cart.as_uuid())
                .bind(id)
                .execute(&mut *tx)
                .await?
        } else {
            sqlx::query(UPDATE_QUANTITY)
                .bind(cart.as_uuid())
                .bind(id)
                .bind(to_db_quantity(&id.to_string(), quantity)?)
                .execute(&mut *tx)
                .await?
        };

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("cart line {id}")));
        }

        let lines = fetch_lines(&mut tx, cart).await?;
        tx.commit().await?;
        Ok(lines)
    }

    #[instrument(skip(self))]
    async fn remove(
        &self,
        cart: CartKey,
        id: CartLineId,
    ) -> Result<Vec<StoredCartLine>, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query(DELETE_LINE)
            .bind(cart.as_uuid())
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let lines = fetch_lines(&mut tx, cart).await?;
        tx.commit().await?;
        Ok(lines)
    }

    #[instrument(skip(self))]
    async fn clear(&self, cart: CartKey) -> Result<(), RepositoryError> {
        sqlx::query(DELETE_CART)
            .bind(cart.as_uuid())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn purge_idle(&self, idle: Duration) -> Result<u64, RepositoryError> {
        let result = sqlx::query(DELETE_IDLE_CARTS)
            .bind(idle.as_secs_f64())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
