//! # Catalogue Repository
//!
//! Categories, subcategories and the two variant axes (sizes, printings).
//!
//! ```text
//! categories ◄── subcategories ◄── products
//!
//! sizes      ─┐
//!             ├── price multipliers for variant-priced products
//! printings  ─┘
//! ```
//!
//! Reads are public; every write requires a staff principal.

use rust_decimal::Decimal;
use sqlx::{Executor, Sqlite, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::{duplicate_or, new_id, parse_decimal};
use printshop_core::validation::{validate_multiplier, validate_name};
use printshop_core::{Category, Principal, Printing, Size, Subcategory};

#[derive(Debug, sqlx::FromRow)]
struct CategoryRow {
    id: String,
    name: String,
    image: String,
    thumbnail: String,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Category {
            id: row.id,
            name: row.name,
            image: row.image,
            thumbnail: row.thumbnail,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct SubcategoryRow {
    id: String,
    name: String,
    parent_category_id: String,
    image: String,
    thumbnail: String,
}

impl From<SubcategoryRow> for Subcategory {
    fn from(row: SubcategoryRow) -> Self {
        Subcategory {
            id: row.id,
            name: row.name,
            parent_category_id: row.parent_category_id,
            image: row.image,
            thumbnail: row.thumbnail,
        }
    }
}

/// Shared shape of `sizes` and `printings`: a label and a multiplier.
#[derive(Debug, sqlx::FromRow)]
struct MultiplierRow {
    id: String,
    label: String,
    price_multiplier: String,
}

impl TryFrom<MultiplierRow> for Size {
    type Error = DbError;

    fn try_from(row: MultiplierRow) -> DbResult<Self> {
        Ok(Size {
            price_multiplier: parse_decimal("sizes.price_multiplier", &row.price_multiplier)?,
            id: row.id,
            name: row.label,
        })
    }
}

impl TryFrom<MultiplierRow> for Printing {
    type Error = DbError;

    fn try_from(row: MultiplierRow) -> DbResult<Self> {
        Ok(Printing {
            price_multiplier: parse_decimal("printings.price_multiplier", &row.price_multiplier)?,
            id: row.id,
            quality: row.label,
        })
    }
}

pub(crate) async fn fetch_size<'e, E>(executor: E, id: &str) -> DbResult<Option<Size>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let row: Option<MultiplierRow> = sqlx::query_as(
        "SELECT id, name AS label, price_multiplier FROM sizes WHERE id = ?1",
    )
    .bind(id)
    .fetch_optional(executor)
    .await?;

    row.map(Size::try_from).transpose()
}

pub(crate) async fn fetch_printing<'e, E>(executor: E, id: &str) -> DbResult<Option<Printing>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let row: Option<MultiplierRow> = sqlx::query_as(
        "SELECT id, quality AS label, price_multiplier FROM printings WHERE id = ?1",
    )
    .bind(id)
    .fetch_optional(executor)
    .await?;

    row.map(Printing::try_from).transpose()
}

/// Repository for the catalogue tree and variant axes.
#[derive(Debug, Clone)]
pub struct CatalogRepository {
    pool: SqlitePool,
}

impl CatalogRepository {
    /// Creates a new CatalogRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CatalogRepository { pool }
    }

    // =========================================================================
    // Categories
    // =========================================================================

    /// Creates a category. Names are unique.
    pub async fn create_category(
        &self,
        principal: &Principal,
        name: &str,
        image: &str,
        thumbnail: &str,
    ) -> DbResult<Category> {
        principal.require_authorized("create categories")?;
        validate_name("name", name)?;

        let category = Category {
            id: new_id(),
            name: name.trim().to_string(),
            image: image.to_string(),
            thumbnail: thumbnail.to_string(),
        };

        debug!(id = %category.id, name = %category.name, "Inserting category");

        sqlx::query("INSERT INTO categories (id, name, image, thumbnail) VALUES (?1, ?2, ?3, ?4)")
            .bind(&category.id)
            .bind(&category.name)
            .bind(&category.image)
            .bind(&category.thumbnail)
            .execute(&self.pool)
            .await
            .map_err(|e| duplicate_or(e, "category name", &category.name))?;

        Ok(category)
    }

    /// Lists all categories by name.
    pub async fn list_categories(&self) -> DbResult<Vec<Category>> {
        let rows: Vec<CategoryRow> =
            sqlx::query_as("SELECT id, name, image, thumbnail FROM categories ORDER BY name")
                .fetch_all(&self.pool)
                .await?;

        Ok(rows.into_iter().map(Category::from).collect())
    }

    /// Gets a category by ID.
    pub async fn get_category(&self, id: &str) -> DbResult<Option<Category>> {
        let row: Option<CategoryRow> =
            sqlx::query_as("SELECT id, name, image, thumbnail FROM categories WHERE id = ?1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.map(Category::from))
    }

    // =========================================================================
    // Subcategories
    // =========================================================================

    /// Creates a subcategory under an existing category.
    pub async fn create_subcategory(
        &self,
        principal: &Principal,
        parent_category_id: &str,
        name: &str,
        image: &str,
        thumbnail: &str,
    ) -> DbResult<Subcategory> {
        principal.require_authorized("create subcategories")?;
        validate_name("name", name)?;

        if self.get_category(parent_category_id).await?.is_none() {
            return Err(DbError::not_found("Category", parent_category_id));
        }

        let subcategory = Subcategory {
            id: new_id(),
            name: name.trim().to_string(),
            parent_category_id: parent_category_id.to_string(),
            image: image.to_string(),
            thumbnail: thumbnail.to_string(),
        };

        debug!(
            id = %subcategory.id,
            parent_category_id = %parent_category_id,
            "Inserting subcategory"
        );

        sqlx::query(
            r#"
            INSERT INTO subcategories (id, name, parent_category_id, image, thumbnail)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&subcategory.id)
        .bind(&subcategory.name)
        .bind(&subcategory.parent_category_id)
        .bind(&subcategory.image)
        .bind(&subcategory.thumbnail)
        .execute(&self.pool)
        .await
        .map_err(|e| duplicate_or(e, "subcategory name", &subcategory.name))?;

        Ok(subcategory)
    }

    /// Lists the subcategories of a category.
    ///
    /// `NotFound` if the category doesn't exist.
    pub async fn list_subcategories(&self, category_id: &str) -> DbResult<Vec<Subcategory>> {
        if self.get_category(category_id).await?.is_none() {
            return Err(DbError::not_found("Category", category_id));
        }

        let rows: Vec<SubcategoryRow> = sqlx::query_as(
            r#"
            SELECT id, name, parent_category_id, image, thumbnail
            FROM subcategories
            WHERE parent_category_id = ?1
            ORDER BY name
            "#,
        )
        .bind(category_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Subcategory::from).collect())
    }

    /// Gets a subcategory by ID.
    pub async fn get_subcategory(&self, id: &str) -> DbResult<Option<Subcategory>> {
        let row: Option<SubcategoryRow> = sqlx::query_as(
            "SELECT id, name, parent_category_id, image, thumbnail FROM subcategories WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Subcategory::from))
    }

    // =========================================================================
    // Sizes
    // =========================================================================

    /// Creates a size with its price multiplier.
    pub async fn create_size(
        &self,
        principal: &Principal,
        name: &str,
        price_multiplier: Decimal,
    ) -> DbResult<Size> {
        principal.require_authorized("create sizes")?;
        validate_name("name", name)?;
        validate_multiplier(price_multiplier)?;

        let size = Size {
            id: new_id(),
            name: name.trim().to_string(),
            price_multiplier,
        };

        debug!(id = %size.id, name = %size.name, multiplier = %price_multiplier, "Inserting size");

        sqlx::query("INSERT INTO sizes (id, name, price_multiplier) VALUES (?1, ?2, ?3)")
            .bind(&size.id)
            .bind(&size.name)
            .bind(price_multiplier.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| duplicate_or(e, "size name", &size.name))?;

        Ok(size)
    }

    /// Lists all sizes by name.
    pub async fn list_sizes(&self) -> DbResult<Vec<Size>> {
        let rows: Vec<MultiplierRow> = sqlx::query_as(
            "SELECT id, name AS label, price_multiplier FROM sizes ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Size::try_from).collect()
    }

    /// Gets a size by ID.
    pub async fn get_size(&self, id: &str) -> DbResult<Option<Size>> {
        fetch_size(&self.pool, id).await
    }

    // =========================================================================
    // Printings
    // =========================================================================

    /// Creates a printing quality with its price multiplier.
    pub async fn create_printing(
        &self,
        principal: &Principal,
        quality: &str,
        price_multiplier: Decimal,
    ) -> DbResult<Printing> {
        principal.require_authorized("create printings")?;
        validate_name("quality", quality)?;
        validate_multiplier(price_multiplier)?;

        let printing = Printing {
            id: new_id(),
            quality: quality.trim().to_string(),
            price_multiplier,
        };

        debug!(id = %printing.id, quality = %printing.quality, multiplier = %price_multiplier, "Inserting printing");

        sqlx::query("INSERT INTO printings (id, quality, price_multiplier) VALUES (?1, ?2, ?3)")
            .bind(&printing.id)
            .bind(&printing.quality)
            .bind(price_multiplier.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| duplicate_or(e, "printing quality", &printing.quality))?;

        Ok(printing)
    }

    /// Lists all printing qualities by label.
    pub async fn list_printings(&self) -> DbResult<Vec<Printing>> {
        let rows: Vec<MultiplierRow> = sqlx::query_as(
            "SELECT id, quality AS label, price_multiplier FROM printings ORDER BY quality",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Printing::try_from).collect()
    }

    /// Gets a printing by ID.
    pub async fn get_printing(&self, id: &str) -> DbResult<Option<Printing>> {
        fetch_printing(&self.pool, id).await
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
