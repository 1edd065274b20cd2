//! # Cart Repository
//!
//! Per-user shopping carts, one line per product + variant selection.
//!
//! ## Line Identity
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                  (user, product, size, printing)                        │
//! │                                                                         │
//! │  add(P, A4, Gloss, 2)   ──► INSERT            line #1  qty 2           │
//! │  add(P, A4, Gloss, 3)   ──► ON CONFLICT       line #1  qty 5           │
//! │  add(P, A3, Gloss, 1)   ──► INSERT            line #2  qty 1           │
//! │  add(P, ∅,  ∅,     4)   ──► INSERT            line #3  qty 4           │
//! │                                                                         │
//! │  The unique index folds NULL size/printing to '' so "no size" is a     │
//! │  key value of its own, and the upsert is a single statement: two       │
//! │  concurrent adds can never produce two lines.                          │
//! │                                                                         │
//! │  add(P, A4, Gloss, n)   ──► ON CONFLICT .. WHERE 5 + n <= MAX           │
//! │                             no row returned → OutOfRange, qty stays 5  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Merge on Update
//! ```text
//! line #1 (Flyers, A4, Gloss, 2)      update(#1, product = Cards)
//! line #2 (Cards,  A4, Gloss, 3)  ──►  line #1 (Cards, A4, Gloss, 5)
//!                                      line #2 deleted
//! (one transaction)
//! ```
//!
//! Every lookup is scoped by `user_id`, so another user's line id behaves
//! exactly like an id that doesn't exist.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::catalog::{fetch_printing, fetch_size};
use crate::repository::new_id;
use crate::repository::product::fetch_product;
use printshop_core::pricing::quote_cart_line;
use printshop_core::validation::validate_quantity;
use printshop_core::{
    CartAddOutcome, CartLine, CartSummary, PricedCartLine, PricingPolicy, Principal,
    ValidationError, MAX_ITEM_QUANTITY,
};

const LINE_COLUMNS: &str =
    "id, user_id, product_id, size_id, printing_id, quantity, added_at, updated_at";

#[derive(Debug, sqlx::FromRow)]
struct CartLineRow {
    id: String,
    user_id: String,
    product_id: String,
    size_id: Option<String>,
    printing_id: Option<String>,
    quantity: i64,
    added_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<CartLineRow> for CartLine {
    fn from(row: CartLineRow) -> Self {
        CartLine {
            id: row.id,
            user_id: row.user_id,
            product_id: row.product_id,
            size_id: row.size_id,
            printing_id: row.printing_id,
            quantity: row.quantity,
            added_at: row.added_at,
            updated_at: row.updated_at,
        }
    }
}

/// Repository for cart lines.
#[derive(Debug, Clone)]
pub struct CartRepository {
    pool: SqlitePool,
}

impl CartRepository {
    /// Creates a new CartRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CartRepository { pool }
    }

    /// Adds `quantity` of a product selection to the principal's cart.
    ///
    /// Grows the existing line for the same selection, or inserts a new one.
    ///
    /// ## Returns
    /// * `Ok(CartAddOutcome { created: true, .. })` - new line
    /// * `Ok(CartAddOutcome { created: false, .. })` - existing line grew
    /// * `Err(DbError::Validation)` - quantity is not positive, or the line
    ///   would grow past `MAX_ITEM_QUANTITY` (the line is left unchanged)
    /// * `Err(DbError::NotFound)` - product, size or printing doesn't exist
    pub async fn add(
        &self,
        principal: &Principal,
        product_id: &str,
        size_id: Option<&str>,
        printing_id: Option<&str>,
        quantity: i64,
    ) -> DbResult<CartAddOutcome> {
        validate_quantity(quantity)?;

        if fetch_product(&self.pool, product_id).await?.is_none() {
            return Err(DbError::not_found("Product", product_id));
        }
        if let Some(id) = size_id {
            if fetch_size(&self.pool, id).await?.is_none() {
                return Err(DbError::not_found("Size", id));
            }
        }
        if let Some(id) = printing_id {
            if fetch_printing(&self.pool, id).await?.is_none() {
                return Err(DbError::not_found("Printing", id));
            }
        }

        let id = new_id();
        let now = Utc::now();

        debug!(
            user_id = %principal.user_id,
            product_id = %product_id,
            size_id = ?size_id,
            printing_id = ?printing_id,
            quantity = quantity,
            "Adding to cart"
        );

        // The conflict target must match idx_cart_lines_identity exactly.
        // When the guard fails nothing is written and no row comes back.
        let sql = format!(
            r#"
            INSERT INTO cart_lines (
                id, user_id, product_id, size_id, printing_id, quantity, added_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)
            ON CONFLICT (user_id, product_id, IFNULL(size_id, ''), IFNULL(printing_id, ''))
            DO UPDATE SET
                quantity = cart_lines.quantity + excluded.quantity,
                updated_at = excluded.updated_at
            WHERE cart_lines.quantity + excluded.quantity <= ?8
            RETURNING {}
            "#,
            LINE_COLUMNS
        );

        let row: CartLineRow = sqlx::query_as(&sql)
            .bind(&id)
            .bind(&principal.user_id)
            .bind(product_id)
            .bind(size_id)
            .bind(printing_id)
            .bind(quantity)
            .bind(now)
            .bind(MAX_ITEM_QUANTITY)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(quantity_out_of_range)?;

        let created = row.id == id;
        debug!(line_id = %row.id, created = created, quantity = row.quantity, "Cart line stored");

        Ok(CartAddOutcome {
            line: row.into(),
            created,
        })
    }

    /// Changes the product and/or quantity of one of the principal's lines.
    ///
    /// Only supplied fields change. When the new product makes the line
    /// identical to another of the principal's lines, the two are merged:
    /// this line keeps its id and takes the summed quantity, the other is
    /// deleted.
    ///
    /// ## Returns
    /// * `Err(DbError::Validation)` - `new_quantity` is not positive, or a merge
    ///   would exceed `MAX_ITEM_QUANTITY` (nothing changes)
    /// * `Err(DbError::NotFound)` - no such line for this principal, or no such product
    pub async fn update(
        &self,
        principal: &Principal,
        line_id: &str,
        new_product_id: Option<&str>,
        new_quantity: Option<i64>,
    ) -> DbResult<CartLine> {
        if let Some(quantity) = new_quantity {
            validate_quantity(quantity)?;
        }

        debug!(
            user_id = %principal.user_id,
            line_id = %line_id,
            new_product_id = ?new_product_id,
            new_quantity = ?new_quantity,
            "Updating cart line"
        );

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        let line = fetch_line(&mut tx, principal, line_id).await?;

        let product_id = match new_product_id {
            Some(id) if id != line.product_id => {
                if fetch_product(&mut *tx, id).await?.is_none() {
                    return Err(DbError::not_found("Product", id));
                }
                id.to_string()
            }
            _ => line.product_id.clone(),
        };
        let mut quantity = new_quantity.unwrap_or(line.quantity);

        if product_id != line.product_id {
            let collision: Option<(String, i64)> = sqlx::query_as(
                r#"
                SELECT id, quantity FROM cart_lines
                WHERE user_id = ?1
                  AND product_id = ?2
                  AND IFNULL(size_id, '') = IFNULL(?3, '')
                  AND IFNULL(printing_id, '') = IFNULL(?4, '')
                  AND id != ?5
                "#,
            )
            .bind(&principal.user_id)
            .bind(&product_id)
            .bind(line.size_id.as_deref())
            .bind(line.printing_id.as_deref())
            .bind(&line.id)
            .fetch_optional(&mut *tx)
            .await?;

            if let Some((other_id, other_quantity)) = collision {
                quantity = quantity
                    .checked_add(other_quantity)
                    .filter(|merged| *merged <= MAX_ITEM_QUANTITY)
                    .ok_or_else(quantity_out_of_range)?;

                debug!(line_id = %line.id, merged_from = %other_id, "Merging cart lines");

                sqlx::query("DELETE FROM cart_lines WHERE id = ?1")
                    .bind(&other_id)
                    .execute(&mut *tx)
                    .await?;
            }
        }

        sqlx::query(
            "UPDATE cart_lines SET product_id = ?2, quantity = ?3, updated_at = ?4 WHERE id = ?1",
        )
        .bind(&line.id)
        .bind(&product_id)
        .bind(quantity)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

        let updated = fetch_line(&mut tx, principal, line_id).await?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        Ok(updated)
    }

    /// Deletes one of the principal's lines.
    ///
    /// `NotFound` when the line doesn't exist or belongs to someone else.
    pub async fn remove(&self, principal: &Principal, line_id: &str) -> DbResult<()> {
        debug!(user_id = %principal.user_id, line_id = %line_id, "Removing cart line");

        let result = sqlx::query("DELETE FROM cart_lines WHERE id = ?1 AND user_id = ?2")
            .bind(line_id)
            .bind(&principal.user_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("CartLine", line_id));
        }

        Ok(())
    }

    /// Gets one of the principal's lines.
    pub async fn get(&self, principal: &Principal, line_id: &str) -> DbResult<CartLine> {
        let mut conn = self.pool.acquire().await?;
        fetch_line(&mut conn, principal, line_id).await
    }

    /// Lists the principal's lines, oldest first, each with a current quote.
    pub async fn list(&self, principal: &Principal, policy: &PricingPolicy) -> DbResult<CartSummary> {
        let sql = format!(
            "SELECT {} FROM cart_lines WHERE user_id = ?1 ORDER BY added_at, rowid",
            LINE_COLUMNS
        );
        let rows: Vec<CartLineRow> = sqlx::query_as(&sql)
            .bind(&principal.user_id)
            .fetch_all(&self.pool)
            .await?;

        debug!(user_id = %principal.user_id, lines = rows.len(), "Listing cart");

        let mut lines = Vec::with_capacity(rows.len());
        for row in rows {
            let line = CartLine::from(row);

            // Foreign keys cascade, so the product is there unless it was
            // deleted between the two queries.
            let product = fetch_product(&self.pool, &line.product_id)
                .await?
                .ok_or_else(|| DbError::not_found("Product", &line.product_id))?;
            let size = match line.size_id.as_deref() {
                Some(id) => fetch_size(&self.pool, id).await?,
                None => None,
            };
            let printing = match line.printing_id.as_deref() {
                Some(id) => fetch_printing(&self.pool, id).await?,
                None => None,
            };

            let line_total =
                quote_cart_line(&product, &line, size.as_ref(), printing.as_ref(), policy)?;
            lines.push(PricedCartLine { line, line_total });
        }

        Ok(CartSummary::from_lines(lines))
    }

    /// Empties the principal's cart. Returns the number of lines removed.
    pub async fn clear(&self, principal: &Principal) -> DbResult<u64> {
        let result = sqlx::query("DELETE FROM cart_lines WHERE user_id = ?1")
            .bind(&principal.user_id)
            .execute(&self.pool)
            .await?;

        debug!(user_id = %principal.user_id, removed = result.rows_affected(), "Cleared cart");
        Ok(result.rows_affected())
    }
}

fn quantity_out_of_range() -> DbError {
    DbError::Validation(ValidationError::OutOfRange {
        field: "quantity".to_string(),
        min: 1,
        max: MAX_ITEM_QUANTITY,
    })
}

async fn fetch_line(
    conn: &mut sqlx::SqliteConnection,
    principal: &Principal,
    line_id: &str,
) -> DbResult<CartLine> {
    let sql = format!(
        "SELECT {} FROM cart_lines WHERE id = ?1 AND user_id = ?2",
        LINE_COLUMNS
    );
    let row: Option<CartLineRow> = sqlx::query_as(&sql)
        .bind(line_id)
        .bind(&principal.user_id)
        .fetch_optional(conn)
        .await?;

    row.map(CartLine::from)
        .ok_or_else(|| DbError::not_found("CartLine", line_id))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use crate::repository::test_support::*;
    use printshop_core::Money;
    use rust_decimal::Decimal;

    fn alice() -> Principal {
        Principal::customer("alice")
    }

    fn bob() -> Principal {
        Principal::customer("bob")
    }

    #[tokio::test]
    async fn test_duplicate_add_merges_quantities() {
        let db = test_db().await;
        let product = variant_product(&db).await;
        let a4 = size(&db, "A4", Decimal::ONE).await;
        let gloss = printing(&db, "Gloss", Decimal::ONE).await;

        let first = db
            .carts()
            .add(&alice(), &product.id, Some(&a4.id), Some(&gloss.id), 2)
            .await
            .unwrap();
        assert!(first.created);

        let second = db
            .carts()
            .add(&alice(), &product.id, Some(&a4.id), Some(&gloss.id), 3)
            .await
            .unwrap();
        assert!(!second.created);
        assert_eq!(second.line.id, first.line.id);
        assert_eq!(second.line.quantity, 5);

        let cart = db.carts().list(&alice(), &PricingPolicy::default()).await.unwrap();
        assert_eq!(cart.lines.len(), 1);
        assert_eq!(cart.total_quantity, 5);
    }

    #[tokio::test]
    async fn test_different_sizes_are_distinct_lines() {
        let db = test_db().await;
        let product = variant_product(&db).await;
        let a4 = size(&db, "A4", Decimal::ONE).await;
        let a3 = size(&db, "A3", Decimal::TWO).await;
        let gloss = printing(&db, "Gloss", Decimal::ONE).await;

        db.carts()
            .add(&alice(), &product.id, Some(&a4.id), Some(&gloss.id), 1)
            .await
            .unwrap();
        let other = db
            .carts()
            .add(&alice(), &product.id, Some(&a3.id), Some(&gloss.id), 1)
            .await
            .unwrap();
        assert!(other.created);

        let cart = db.carts().list(&alice(), &PricingPolicy::default()).await.unwrap();
        assert_eq!(cart.lines.len(), 2);
    }

    #[tokio::test]
    async fn test_missing_size_is_its_own_key() {
        let db = test_db().await;
        let product = attribute_product(&db).await;
        let a4 = size(&db, "A4", Decimal::ONE).await;

        let bare = db
            .carts()
            .add(&alice(), &product.id, None, None, 1)
            .await
            .unwrap();
        let again = db
            .carts()
            .add(&alice(), &product.id, None, None, 1)
            .await
            .unwrap();
        assert_eq!(bare.line.id, again.line.id);
        assert_eq!(again.line.quantity, 2);

        let sized = db
            .carts()
            .add(&alice(), &product.id, Some(&a4.id), None, 1)
            .await
            .unwrap();
        assert!(sized.created);
        assert_ne!(sized.line.id, bare.line.id);
    }

    #[tokio::test]
    async fn test_users_do_not_share_lines() {
        let db = test_db().await;
        let product = attribute_product(&db).await;

        let a = db.carts().add(&alice(), &product.id, None, None, 1).await.unwrap();
        let b = db.carts().add(&bob(), &product.id, None, None, 1).await.unwrap();
        assert!(a.created && b.created);
        assert_ne!(a.line.id, b.line.id);
    }

    #[tokio::test]
    async fn test_add_rejects_bad_input() {
        let db = test_db().await;
        let product = attribute_product(&db).await;

        let err = db
            .carts()
            .add(&alice(), &product.id, None, None, 0)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Validation(ValidationError::MustBePositive { .. })
        ));

        let err = db
            .carts()
            .add(&alice(), "no-such-product", None, None, 1)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { ref entity, .. } if entity == "Product"));

        let err = db
            .carts()
            .add(&alice(), &product.id, Some("no-such-size"), None, 1)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { ref entity, .. } if entity == "Size"));
    }

    #[tokio::test]
    async fn test_concurrent_adds_produce_one_line() {
        // File-backed so the pool can hand out several connections. The
        // directory takes the -wal and -shm files with it on drop.
        let dir = tempfile::tempdir().unwrap();
        let db = Database::new(DbConfig::new(dir.path().join("cart.db")).max_connections(4))
            .await
            .unwrap();
        let product = attribute_product(&db).await;

        let alice = alice();
        let carts = db.carts();
        let (a, b, c, d) = tokio::join!(
            carts.add(&alice, &product.id, None, None, 1),
            carts.add(&alice, &product.id, None, None, 2),
            carts.add(&alice, &product.id, None, None, 3),
            carts.add(&alice, &product.id, None, None, 4),
        );
        let created = [a, b, c, d]
            .into_iter()
            .map(|r| r.unwrap().created)
            .filter(|created| *created)
            .count();
        assert_eq!(created, 1);

        let cart = carts.list(&alice, &PricingPolicy::default()).await.unwrap();
        assert_eq!(cart.lines.len(), 1);
        assert_eq!(cart.total_quantity, 10);

        db.close().await;
        dir.close().unwrap();
    }

    #[tokio::test]
    async fn test_add_past_max_quantity_leaves_line_unchanged() {
        let db = test_db().await;
        let product = attribute_product(&db).await;

        let full = db
            .carts()
            .add(&alice(), &product.id, None, None, MAX_ITEM_QUANTITY)
            .await
            .unwrap()
            .line;

        let err = db
            .carts()
            .add(&alice(), &product.id, None, None, 1)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Validation(ValidationError::OutOfRange { ref field, .. }) if field == "quantity"
        ));

        let err = db
            .carts()
            .add(&alice(), &product.id, None, None, i64::MAX)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Validation(ValidationError::OutOfRange { .. })));

        let stored = db.carts().get(&alice(), &full.id).await.unwrap();
        assert_eq!(stored.quantity, MAX_ITEM_QUANTITY);
        assert_eq!(stored.updated_at, full.updated_at);

        let (kind,): (String,) =
            sqlx::query_as("SELECT typeof(quantity) FROM cart_lines WHERE id = ?1")
                .bind(&full.id)
                .fetch_one(db.pool())
                .await
                .unwrap();
        assert_eq!(kind, "integer");

        let cart = db.carts().list(&alice(), &PricingPolicy::default()).await.unwrap();
        assert_eq!(cart.total_quantity, MAX_ITEM_QUANTITY);
    }

    #[tokio::test]
    async fn test_update_merge_past_max_quantity_changes_nothing() {
        let db = test_db().await;
        let flyers = attribute_product(&db).await;
        let cards = variant_product(&db).await;

        let moving = db
            .carts()
            .add(&alice(), &flyers.id, None, None, MAX_ITEM_QUANTITY)
            .await
            .unwrap()
            .line;
        let target = db
            .carts()
            .add(&alice(), &cards.id, None, None, 1)
            .await
            .unwrap()
            .line;

        let err = db
            .carts()
            .update(&alice(), &moving.id, Some(&cards.id), None)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Validation(ValidationError::OutOfRange { .. })));

        assert_eq!(db.carts().get(&alice(), &moving.id).await.unwrap().product_id, flyers.id);
        assert_eq!(db.carts().get(&alice(), &target.id).await.unwrap().quantity, 1);

        let err = db
            .carts()
            .update(&alice(), &moving.id, None, Some(MAX_ITEM_QUANTITY + 1))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Validation(ValidationError::OutOfRange { .. })));
    }

    #[tokio::test]
    async fn test_update_to_zero_changes_nothing() {
        let db = test_db().await;
        let product = attribute_product(&db).await;
        let line = db
            .carts()
            .add(&alice(), &product.id, None, None, 4)
            .await
            .unwrap()
            .line;

        let err = db
            .carts()
            .update(&alice(), &line.id, None, Some(0))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Validation(_)));

        let unchanged = db.carts().get(&alice(), &line.id).await.unwrap();
        assert_eq!(unchanged.quantity, 4);
    }

    #[tokio::test]
    async fn test_update_quantity() {
        let db = test_db().await;
        let product = attribute_product(&db).await;
        let line = db
            .carts()
            .add(&alice(), &product.id, None, None, 4)
            .await
            .unwrap()
            .line;

        let updated = db
            .carts()
            .update(&alice(), &line.id, None, Some(9))
            .await
            .unwrap();
        assert_eq!(updated.quantity, 9);
        assert_eq!(updated.product_id, line.product_id);

        let err = db
            .carts()
            .update(&bob(), &line.id, None, Some(1))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_update_product_merges_colliding_lines() {
        let db = test_db().await;
        let flyers = attribute_product(&db).await;
        let cards = variant_product(&db).await;

        let moving = db
            .carts()
            .add(&alice(), &flyers.id, None, None, 2)
            .await
            .unwrap()
            .line;
        let target = db
            .carts()
            .add(&alice(), &cards.id, None, None, 3)
            .await
            .unwrap()
            .line;

        let merged = db
            .carts()
            .update(&alice(), &moving.id, Some(&cards.id), None)
            .await
            .unwrap();
        assert_eq!(merged.id, moving.id);
        assert_eq!(merged.product_id, cards.id);
        assert_eq!(merged.quantity, 5);

        let err = db.carts().get(&alice(), &target.id).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));

        let cart = db.carts().list(&alice(), &PricingPolicy::default()).await.unwrap();
        assert_eq!(cart.lines.len(), 1);
    }

    #[tokio::test]
    async fn test_update_to_missing_product_leaves_line() {
        let db = test_db().await;
        let product = attribute_product(&db).await;
        let line = db
            .carts()
            .add(&alice(), &product.id, None, None, 2)
            .await
            .unwrap()
            .line;

        let err = db
            .carts()
            .update(&alice(), &line.id, Some("gone"), Some(7))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));

        let unchanged = db.carts().get(&alice(), &line.id).await.unwrap();
        assert_eq!(unchanged.quantity, 2);
        assert_eq!(unchanged.product_id, product.id);
    }

    #[tokio::test]
    async fn test_cross_user_remove_is_not_found() {
        let db = test_db().await;
        let product = attribute_product(&db).await;
        let line = db
            .carts()
            .add(&alice(), &product.id, None, None, 1)
            .await
            .unwrap()
            .line;

        let err = db.carts().remove(&bob(), &line.id).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
        assert!(db.carts().get(&alice(), &line.id).await.is_ok());

        db.carts().remove(&alice(), &line.id).await.unwrap();
        let err = db.carts().remove(&alice(), &line.id).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_list_quotes_lines() {
        let db = test_db().await;
        let cards = variant_product(&db).await;
        let banner = attribute_product(&db).await;
        let a4 = size(&db, "A4", Decimal::new(125, 2)).await;
        let gloss = printing(&db, "Gloss", Decimal::ONE).await;

        // 12.40 * 1.25 * 1 * 2 = 31.00
        db.carts()
            .add(&alice(), &cards.id, Some(&a4.id), Some(&gloss.id), 2)
            .await
            .unwrap();
        // Variant product without a printing: no quote yet.
        db.carts()
            .add(&alice(), &cards.id, Some(&a4.id), None, 1)
            .await
            .unwrap();
        // 100*1 + 5*1 + 10 + 18 = 133.00
        db.carts()
            .add(&alice(), &banner.id, None, None, 1)
            .await
            .unwrap();

        let cart = db.carts().list(&alice(), &PricingPolicy::default()).await.unwrap();
        let quotes: Vec<_> = cart.lines.iter().map(|l| l.line_total).collect();
        assert_eq!(
            quotes,
            [
                Some(Money::from_cents(3100)),
                None,
                Some(Money::from_cents(13300)),
            ]
        );
        assert_eq!(cart.total, Money::from_cents(16400));
        assert_eq!(cart.total_quantity, 4);
    }

    #[tokio::test]
    async fn test_clear() {
        let db = test_db().await;
        let product = attribute_product(&db).await;
        db.carts().add(&alice(), &product.id, None, None, 1).await.unwrap();
        db.carts().add(&bob(), &product.id, None, None, 1).await.unwrap();

        assert_eq!(db.carts().clear(&alice()).await.unwrap(), 1);
        let bobs = db.carts().list(&bob(), &PricingPolicy::default()).await.unwrap();
        assert_eq!(bobs.lines.len(), 1);
    }
}
