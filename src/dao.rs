//! CRUD access to the `product` table.
//!
//! Every operation acquires its own connection from the provider and drops
//! it, along with the prepared statement, before returning. Nothing spans two
//! calls: no shared connection, no transaction, no cache.

use rusqlite::{params, OptionalExtension, Row};

use crate::error::{DaoError, Result};
use crate::product::Product;
use crate::sqlite::ConnectionProvider;

const FIND_ALL_SQL: &str = "SELECT id, name, price FROM product";
const FIND_BY_ID_SQL: &str = "SELECT id, name, price FROM product WHERE id = ?";
const UPDATE_SQL: &str = "UPDATE product SET name = ?, price = ? WHERE id = ?";
const DELETE_SQL: &str = "DELETE FROM product WHERE id = ?";
const SAVE_SQL: &str = "INSERT INTO product (name, price) VALUES (?, ?)";

/// Data-access object for [`Product`] rows.
#[derive(Debug, Clone)]
pub struct ProductDao<P> {
    provider: P,
}

impl<P: ConnectionProvider> ProductDao<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Look up a product by primary key.
    pub fn find_by_id(&self, id: i64) -> Result<Option<Product>> {
        let conn = self.provider.connection()?;
        let mut stmt = conn.prepare(FIND_BY_ID_SQL)?;
        let product = stmt.query_row([id], map_product).optional()?;
        tracing::debug!(id, found = product.is_some(), "find_by_id");
        Ok(product)
    }

    /// All products, in whatever order the store yields them.
    pub fn find_all(&self) -> Result<Vec<Product>> {
        let conn = self.provider.connection()?;
        let mut stmt = conn.prepare(FIND_ALL_SQL)?;
        let products = stmt
            .query_map([], map_product)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        tracing::debug!(count = products.len(), "find_all");
        Ok(products)
    }

    /// Insert `product` and return it with the generated id.
    ///
    /// Any id already on `product` is ignored and replaced. Fails with
    /// [`DaoError::MissingGeneratedKey`] if the store inserted no row.
    pub fn save(&self, mut product: Product) -> Result<Product> {
        let conn = self.provider.connection()?;
        let mut stmt = conn.prepare(SAVE_SQL)?;
        let id = match stmt.insert(params![product.name(), product.price()]) {
            Ok(id) => id,
            Err(rusqlite::Error::StatementChangedRows(0)) => {
                return Err(DaoError::MissingGeneratedKey)
            }
            Err(e) => return Err(e.into()),
        };
        product.assign_id(id);
        tracing::debug!(id, "save");
        Ok(product)
    }

    /// Overwrite name and price of the row matching `product.id`.
    ///
    /// A missing row is not an error; nothing changes.
    pub fn update(&self, product: &Product) -> Result<()> {
        let id = product.id().ok_or(DaoError::NotPersisted)?;
        let conn = self.provider.connection()?;
        let mut stmt = conn.prepare(UPDATE_SQL)?;
        let changed = stmt.execute(params![product.name(), product.price(), id])?;
        tracing::debug!(id, changed, "update");
        Ok(())
    }

    /// Remove the row matching `id`; `true` if one was removed.
    pub fn delete(&self, id: i64) -> Result<bool> {
        let conn = self.provider.connection()?;
        let mut stmt = conn.prepare(DELETE_SQL)?;
        let removed = stmt.execute([id])?;
        tracing::debug!(id, removed, "delete");
        Ok(removed > 0)
    }
}

fn map_product(row: &Row<'_>) -> rusqlite::Result<Product> {
    Ok(Product::persisted(
        row.get("id")?,
        row.get("name")?,
        row.get("price")?,
    ))
}
