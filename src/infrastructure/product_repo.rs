use chrono::Utc;
use diesel::prelude::*;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::ports::ProductRepository;
use crate::domain::product::{ProductDraft, ProductView};
use crate::schema::products;

use super::models::{NewProductRow, ProductRow};

pub struct DieselProductRepository {
    pool: DbPool,
}

impl DieselProductRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl ProductRepository for DieselProductRepository {
    fn list(&self) -> Result<Vec<ProductView>, DomainError> {
        let mut conn = self.pool.get()?;

        let rows = products::table
            .order(products::created_at.asc())
            .select(ProductRow::as_select())
            .load(&mut conn)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    fn find(&self, id: Uuid) -> Result<Option<ProductView>, DomainError> {
        let mut conn = self.pool.get()?;

        let row = products::table
            .filter(products::id.eq(id))
            .select(ProductRow::as_select())
            .first(&mut conn)
            .optional()?;

        Ok(row.map(Into::into))
    }

    fn create(&self, draft: ProductDraft) -> Result<ProductView, DomainError> {
        let mut conn = self.pool.get()?;

        let row: ProductRow = diesel::insert_into(products::table)
            .values(&NewProductRow {
                id: Uuid::new_v4(),
                name: draft.name,
                image_url: draft.image_url,
                price: draft.price,
                stock: draft.stock,
            })
            .get_result(&mut conn)?;

        Ok(row.into())
    }

    fn update(&self, id: Uuid, draft: ProductDraft) -> Result<Option<ProductView>, DomainError> {
        let mut conn = self.pool.get()?;

        let row: Option<ProductRow> =
            diesel::update(products::table.filter(products::id.eq(id)))
                .set((
                    products::name.eq(draft.name),
                    products::image_url.eq(draft.image_url),
                    products::price.eq(draft.price),
                    products::stock.eq(draft.stock),
                    products::updated_at.eq(Utc::now()),
                ))
                .get_result(&mut conn)
                .optional()?;

        Ok(row.map(Into::into))
    }

    fn delete(&self, id: Uuid) -> Result<usize, DomainError> {
        let mut conn = self.pool.get()?;

        let deleted =
            diesel::delete(products::table.filter(products::id.eq(id))).execute(&mut conn)?;

        Ok(deleted)
    }
}
