//! # Order Repository
//!
//! Checkout and order history.
//!
//! ## Placing an Order
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  NewOrder (no total)                                                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  resolve product / size / printing ──► NotFound                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  printshop_core::compute_total ──► Validation (quantity, options,      │
//! │       │                             missing variant selection)         │
//! │       ▼                                                                 │
//! │  INSERT INTO orders (total_amount = derived total)                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Orders are written once and never updated. Every order starts out as
//! `ORDER_STATUS_PENDING`.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::repository::catalog::{fetch_printing, fetch_size};
use crate::repository::product::fetch_product;
use crate::repository::{new_id, parse_json, parse_money};
use printshop_core::{
    compute_total, FileOption, NewOrder, Order, Page, PageRequest, PricingPolicy, Principal,
    ORDER_STATUS_PENDING,
};

const ORDER_COLUMNS: &str = r#"
    id, user_id, product_id, size_id, printing_id, quantity, options,
    shipping_address, billing_address, files, special_remark, file_option,
    total_amount, status, created_at
"#;

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: String,
    user_id: String,
    product_id: String,
    size_id: Option<String>,
    printing_id: Option<String>,
    quantity: i64,
    options: String,
    shipping_address: Option<String>,
    billing_address: Option<String>,
    files: String,
    special_remark: Option<String>,
    file_option: Option<String>,
    total_amount: String,
    status: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<OrderRow> for Order {
    type Error = DbError;

    fn try_from(row: OrderRow) -> DbResult<Self> {
        Ok(Order {
            options: parse_json("options", &row.options)?,
            shipping_address: row
                .shipping_address
                .as_deref()
                .map(|raw| parse_json("shipping_address", raw))
                .transpose()?,
            billing_address: row
                .billing_address
                .as_deref()
                .map(|raw| parse_json("billing_address", raw))
                .transpose()?,
            files: parse_json("files", &row.files)?,
            file_option: row
                .file_option
                .as_deref()
                .map(|raw| {
                    raw.parse::<FileOption>()
                        .map_err(|e| DbError::corrupt("file_option", e))
                })
                .transpose()?,
            total_amount: parse_money("total_amount", &row.total_amount)?,
            id: row.id,
            user_id: row.user_id,
            product_id: row.product_id,
            size_id: row.size_id,
            printing_id: row.printing_id,
            quantity: row.quantity,
            special_remark: row.special_remark,
            status: row.status,
            created_at: row.created_at,
        })
    }
}

/// Repository for orders.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    /// Creates a new OrderRepository.
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Places an order for the principal. The total is always derived.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - product, size or printing doesn't exist
    /// * `Err(DbError::Validation)` - quantity, options or variant selection
    ///   rejected; no order is written
    pub async fn place(
        &self,
        principal: &Principal,
        input: &NewOrder,
        policy: &PricingPolicy,
    ) -> DbResult<Order> {
        let product = fetch_product(&self.pool, &input.product_id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", &input.product_id))?;

        let size = match input.size_id.as_deref() {
            Some(id) => Some(
                fetch_size(&self.pool, id)
                    .await?
                    .ok_or_else(|| DbError::not_found("Size", id))?,
            ),
            None => None,
        };
        let printing = match input.printing_id.as_deref() {
            Some(id) => Some(
                fetch_printing(&self.pool, id)
                    .await?
                    .ok_or_else(|| DbError::not_found("Printing", id))?,
            ),
            None => None,
        };

        let total_amount = compute_total(
            &product,
            input.quantity,
            &input.options,
            size.as_ref(),
            printing.as_ref(),
            policy,
        )?;

        let order = Order {
            id: new_id(),
            user_id: principal.user_id.clone(),
            product_id: product.id,
            size_id: input.size_id.clone(),
            printing_id: input.printing_id.clone(),
            quantity: input.quantity,
            options: input.options.clone(),
            shipping_address: input.shipping_address.clone(),
            billing_address: input.billing_address.clone(),
            files: input.files.clone(),
            special_remark: input.special_remark.clone(),
            file_option: input.file_option,
            total_amount,
            status: ORDER_STATUS_PENDING.to_string(),
            created_at: Utc::now(),
        };

        let shipping = order
            .shipping_address
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;
        let billing = order
            .billing_address
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        sqlx::query(
            r#"
            INSERT INTO orders (
                id, user_id, product_id, size_id, printing_id, quantity, options,
                shipping_address, billing_address, files, special_remark,
                file_option, total_amount, status, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)
            "#,
        )
        .bind(&order.id)
        .bind(&order.user_id)
        .bind(&order.product_id)
        .bind(order.size_id.as_deref())
        .bind(order.printing_id.as_deref())
        .bind(order.quantity)
        .bind(serde_json::to_string(&order.options)?)
        .bind(shipping)
        .bind(billing)
        .bind(serde_json::to_string(&order.files)?)
        .bind(order.special_remark.as_deref())
        .bind(order.file_option.map(|o| o.as_str()))
        .bind(order.total_amount.to_string())
        .bind(&order.status)
        .bind(order.created_at)
        .execute(&self.pool)
        .await?;

        info!(
            order_id = %order.id,
            user_id = %order.user_id,
            product_id = %order.product_id,
            total = %order.total_amount,
            "Order placed"
        );

        Ok(order)
    }

    /// Gets an order.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - no such order
    /// * `Err(DbError::Forbidden)` - principal is neither the owner nor staff
    pub async fn get(&self, principal: &Principal, order_id: &str) -> DbResult<Order> {
        let sql = format!("SELECT {} FROM orders WHERE id = ?1", ORDER_COLUMNS);
        let row: Option<OrderRow> = sqlx::query_as(&sql)
            .bind(order_id)
            .fetch_optional(&self.pool)
            .await?;

        let order = row
            .map(Order::try_from)
            .transpose()?
            .ok_or_else(|| DbError::not_found("Order", order_id))?;

        if order.user_id != principal.user_id {
            principal.require_authorized("view other users' orders")?;
        }

        Ok(order)
    }

    /// Lists every order, newest first. Staff-only.
    pub async fn list_all(&self, principal: &Principal, page: PageRequest) -> DbResult<Page<Order>> {
        principal.require_authorized("list all orders")?;

        debug!(page = page.page(), page_size = page.page_size(), "Listing all orders");

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
            .fetch_one(&self.pool)
            .await?;

        let sql = format!(
            "SELECT {} FROM orders ORDER BY created_at DESC, rowid DESC LIMIT ?1 OFFSET ?2",
            ORDER_COLUMNS
        );
        let rows: Vec<OrderRow> = sqlx::query_as(&sql)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;

        let results = rows
            .into_iter()
            .map(Order::try_from)
            .collect::<DbResult<Vec<_>>>()?;

        Ok(Page::new(page, count, results))
    }

    /// Lists the principal's own orders, newest first.
    pub async fn list_for_user(
        &self,
        principal: &Principal,
        page: PageRequest,
    ) -> DbResult<Page<Order>> {
        debug!(user_id = %principal.user_id, page = page.page(), "Listing user orders");

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE user_id = ?1")
            .bind(&principal.user_id)
            .fetch_one(&self.pool)
            .await?;

        let sql = format!(
            r#"
            SELECT {} FROM orders
            WHERE user_id = ?1
            ORDER BY created_at DESC, rowid DESC
            LIMIT ?2 OFFSET ?3
            "#,
            ORDER_COLUMNS
        );
        let rows: Vec<OrderRow> = sqlx::query_as(&sql)
            .bind(&principal.user_id)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;

        let results = rows
            .into_iter()
            .map(Order::try_from)
            .collect::<DbResult<Vec<_>>>()?;

        Ok(Page::new(page, count, results))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
