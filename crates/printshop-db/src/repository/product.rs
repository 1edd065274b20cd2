//! # Product Repository
//!
//! Database operations for products and their images.
//!
//! ## Key Operations
//! - Staff-only create / update, validated before anything is written
//! - Paginated listing, optionally within one subcategory
//! - Product images
//!
//! ## Pricing Columns
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │              PricingScheme  ⇄  products row                             │
//! │                                                                         │
//! │  PricingScheme::Variant                                                │
//! │     pricing_kind = 'variant'                                           │
//! │     vat_percent / additional_design_charge / delivery_charge = NULL    │
//! │                                                                         │
//! │  PricingScheme::Attribute { vat_percent, design, delivery }            │
//! │     pricing_kind = 'attribute'                                         │
//! │     each column TEXT decimal or NULL (absent = zero)                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::{Executor, Sqlite, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::{new_id, parse_decimal, parse_json, parse_money};
use printshop_core::validation::validate_product;
use printshop_core::{
    AttributePricing, NewProduct, Page, PageRequest, PricingScheme, Principal, Product,
    ProductImage,
};

const PRODUCT_COLUMNS: &str = r#"
    id, subcategory_id, name, base_price, minimum_qty, qty_step, option_schema,
    pricing_kind, vat_percent, additional_design_charge, delivery_charge,
    created_at, updated_at
"#;

#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: String,
    subcategory_id: Option<String>,
    name: String,
    base_price: String,
    minimum_qty: i64,
    qty_step: i64,
    option_schema: Option<String>,
    pricing_kind: String,
    vat_percent: Option<String>,
    additional_design_charge: Option<String>,
    delivery_charge: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ProductRow> for Product {
    type Error = DbError;

    fn try_from(row: ProductRow) -> DbResult<Self> {
        let pricing = match row.pricing_kind.as_str() {
            "variant" => PricingScheme::Variant,
            "attribute" => PricingScheme::Attribute(AttributePricing {
                vat_percent: row
                    .vat_percent
                    .as_deref()
                    .map(|raw| parse_decimal("vat_percent", raw))
                    .transpose()?,
                additional_design_charge: row
                    .additional_design_charge
                    .as_deref()
                    .map(|raw| parse_money("additional_design_charge", raw))
                    .transpose()?,
                delivery_charge: row
                    .delivery_charge
                    .as_deref()
                    .map(|raw| parse_money("delivery_charge", raw))
                    .transpose()?,
            }),
            other => return Err(DbError::corrupt("pricing_kind", other)),
        };

        Ok(Product {
            base_price: parse_money("base_price", &row.base_price)?,
            option_schema: row
                .option_schema
                .as_deref()
                .map(|raw| parse_json("option_schema", raw))
                .transpose()?,
            id: row.id,
            subcategory_id: row.subcategory_id,
            name: row.name,
            minimum_qty: row.minimum_qty,
            qty_step: row.qty_step,
            pricing,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Column values for a pricing scheme: `(kind, vat, design, delivery)`.
fn pricing_columns(
    pricing: &PricingScheme,
) -> (&'static str, Option<String>, Option<String>, Option<String>) {
    match pricing {
        PricingScheme::Variant => ("variant", None, None, None),
        PricingScheme::Attribute(a) => (
            "attribute",
            a.vat_percent.map(|v| v.to_string()),
            a.additional_design_charge.map(|m| m.amount().to_string()),
            a.delivery_charge.map(|m| m.amount().to_string()),
        ),
    }
}

/// Loads a product through any executor (pool or open transaction).
pub(crate) async fn fetch_product<'e, E>(executor: E, id: &str) -> DbResult<Option<Product>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let sql = format!("SELECT {} FROM products WHERE id = ?1", PRODUCT_COLUMNS);
    let row: Option<ProductRow> = sqlx::query_as(&sql)
        .bind(id)
        .fetch_optional(executor)
        .await?;

    row.map(Product::try_from).transpose()
}

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = ProductRepository::new(pool);
///
/// let product = repo.create(&staff, &NewProduct::new("Flyers A5", price)).await?;
/// let page = repo.list(PageRequest::default()).await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Creates a product.
    ///
    /// ## Returns
    /// * `Err(DbError::Forbidden)` - principal is not staff
    /// * `Err(DbError::Validation)` - bad name, price, quantities or VAT
    /// * `Err(DbError::NotFound)` - subcategory doesn't exist
    pub async fn create(&self, principal: &Principal, input: &NewProduct) -> DbResult<Product> {
        principal.require_authorized("create products")?;
        validate_product(input)?;
        self.ensure_subcategory(input.subcategory_id.as_deref()).await?;

        let id = new_id();
        let now = Utc::now();
        let (kind, vat, design, delivery) = pricing_columns(&input.pricing);
        let option_schema = input
            .option_schema
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        debug!(id = %id, name = %input.name, pricing = kind, "Inserting product");

        sqlx::query(
            r#"
            INSERT INTO products (
                id, subcategory_id, name, base_price, minimum_qty, qty_step,
                option_schema, pricing_kind, vat_percent,
                additional_design_charge, delivery_charge, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?12)
            "#,
        )
        .bind(&id)
        .bind(input.subcategory_id.as_deref())
        .bind(input.name.trim())
        .bind(input.base_price.amount().to_string())
        .bind(input.minimum_qty)
        .bind(input.qty_step)
        .bind(option_schema)
        .bind(kind)
        .bind(vat)
        .bind(design)
        .bind(delivery)
        .bind(now)
        .execute(&self.pool)
        .await?;

        self.get(&id).await
    }

    /// Replaces every editable field of a product.
    ///
    /// Staff-only. Existing cart lines and orders keep referencing the
    /// product; cart quotes pick up the new price, placed orders don't.
    pub async fn update(
        &self,
        principal: &Principal,
        id: &str,
        input: &NewProduct,
    ) -> DbResult<Product> {
        principal.require_authorized("update products")?;
        validate_product(input)?;
        self.ensure_subcategory(input.subcategory_id.as_deref()).await?;

        debug!(id = %id, "Updating product");

        let (kind, vat, design, delivery) = pricing_columns(&input.pricing);
        let option_schema = input
            .option_schema
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        let result = sqlx::query(
            r#"
            UPDATE products SET
                subcategory_id = ?2,
                name = ?3,
                base_price = ?4,
                minimum_qty = ?5,
                qty_step = ?6,
                option_schema = ?7,
                pricing_kind = ?8,
                vat_percent = ?9,
                additional_design_charge = ?10,
                delivery_charge = ?11,
                updated_at = ?12
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(input.subcategory_id.as_deref())
        .bind(input.name.trim())
        .bind(input.base_price.amount().to_string())
        .bind(input.minimum_qty)
        .bind(input.qty_step)
        .bind(option_schema)
        .bind(kind)
        .bind(vat)
        .bind(design)
        .bind(delivery)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        self.get(id).await
    }

    /// Gets a product by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Product found
    /// * `Ok(None)` - Product not found
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        fetch_product(&self.pool, id).await
    }

    /// Gets a product by its ID, `NotFound` if missing.
    pub async fn get(&self, id: &str) -> DbResult<Product> {
        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id))
    }

    /// Lists all products, newest first.
    pub async fn list(&self, page: PageRequest) -> DbResult<Page<Product>> {
        debug!(page = page.page(), page_size = page.page_size(), "Listing products");

        let count = self.count().await?;

        let sql = format!(
            "SELECT {} FROM products ORDER BY created_at DESC, id LIMIT ?1 OFFSET ?2",
            PRODUCT_COLUMNS
        );
        let rows: Vec<ProductRow> = sqlx::query_as(&sql)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;

        let results = rows
            .into_iter()
            .map(Product::try_from)
            .collect::<DbResult<Vec<_>>>()?;

        Ok(Page::new(page, count, results))
    }

    /// Lists the products of one subcategory, newest first.
    ///
    /// `NotFound` if the subcategory doesn't exist.
    pub async fn list_by_subcategory(
        &self,
        subcategory_id: &str,
        page: PageRequest,
    ) -> DbResult<Page<Product>> {
        debug!(subcategory_id = %subcategory_id, page = page.page(), "Listing products by subcategory");

        self.ensure_subcategory(Some(subcategory_id)).await?;

        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE subcategory_id = ?1")
                .bind(subcategory_id)
                .fetch_one(&self.pool)
                .await?;

        let sql = format!(
            r#"
            SELECT {} FROM products
            WHERE subcategory_id = ?1
            ORDER BY created_at DESC, id
            LIMIT ?2 OFFSET ?3
            "#,
            PRODUCT_COLUMNS
        );
        let rows: Vec<ProductRow> = sqlx::query_as(&sql)
            .bind(subcategory_id)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;

        let results = rows
            .into_iter()
            .map(Product::try_from)
            .collect::<DbResult<Vec<_>>>()?;

        Ok(Page::new(page, count, results))
    }

    /// Counts total products.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Attaches an image to a product. Staff-only.
    pub async fn add_image(
        &self,
        principal: &Principal,
        product_id: &str,
        image: &str,
        thumbnail: &str,
    ) -> DbResult<ProductImage> {
        principal.require_authorized("add product images")?;

        if self.get_by_id(product_id).await?.is_none() {
            return Err(DbError::not_found("Product", product_id));
        }

        let image = ProductImage {
            id: new_id(),
            product_id: product_id.to_string(),
            image: image.to_string(),
            thumbnail: thumbnail.to_string(),
        };

        debug!(id = %image.id, product_id = %product_id, "Inserting product image");

        sqlx::query(
            "INSERT INTO product_images (id, product_id, image, thumbnail) VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(&image.id)
        .bind(&image.product_id)
        .bind(&image.image)
        .bind(&image.thumbnail)
        .execute(&self.pool)
        .await?;

        Ok(image)
    }

    /// Lists the images of a product.
    pub async fn list_images(&self, product_id: &str) -> DbResult<Vec<ProductImage>> {
        let rows: Vec<(String, String, String, String)> = sqlx::query_as(
            r#"
            SELECT id, product_id, image, thumbnail
            FROM product_images
            WHERE product_id = ?1
            ORDER BY rowid
            "#,
        )
        .bind(product_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(id, product_id, image, thumbnail)| ProductImage {
                id,
                product_id,
                image,
                thumbnail,
            })
            .collect())
    }

    async fn ensure_subcategory(&self, subcategory_id: Option<&str>) -> DbResult<()> {
        let Some(id) = subcategory_id else {
            return Ok(());
        };

        let exists: Option<i64> = sqlx::query_scalar("SELECT 1 FROM subcategories WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match exists {
            Some(_) => Ok(()),
            None => Err(DbError::not_found("Subcategory", id)),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
