use chrono::Utc;
use diesel::prelude::*;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::cart::{CartLine, CartLineWithProduct, HistoryEntryWithProduct, PurchasedLine};
use crate::domain::errors::DomainError;
use crate::domain::ports::CartRepository;
use crate::schema::{cart_items, products, purchase_histories};

use super::models::{CartItemRow, HistoryRow, NewCartItemRow, NewHistoryRow, ProductRow};

pub struct DieselCartRepository {
    pool: DbPool,
}

impl DieselCartRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl CartRepository for DieselCartRepository {
    fn list_for_user(&self, user_id: Uuid) -> Result<Vec<CartLineWithProduct>, DomainError> {
        let mut conn = self.pool.get()?;

        let rows: Vec<(CartItemRow, ProductRow)> = cart_items::table
            .inner_join(products::table)
            .filter(cart_items::user_id.eq(user_id))
            .order(cart_items::created_at.asc())
            .select((CartItemRow::as_select(), ProductRow::as_select()))
            .load(&mut conn)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    fn find_line(
        &self,
        user_id: Uuid,
        product_id: Uuid,
    ) -> Result<Option<CartLine>, DomainError> {
        let mut conn = self.pool.get()?;

        let row = cart_items::table
            .filter(cart_items::user_id.eq(user_id))
            .filter(cart_items::product_id.eq(product_id))
            .select(CartItemRow::as_select())
            .first(&mut conn)
            .optional()?;

        Ok(row.map(Into::into))
    }

    fn create_line(&self, user_id: Uuid, product_id: Uuid) -> Result<CartLine, DomainError> {
        let mut conn = self.pool.get()?;

        let row: CartItemRow = diesel::insert_into(cart_items::table)
            .values(&NewCartItemRow {
                id: Uuid::new_v4(),
                user_id,
                product_id,
                quantity: 1,
            })
            .get_result(&mut conn)?;

        Ok(row.into())
    }

    fn increment_line(
        &self,
        user_id: Uuid,
        product_id: Uuid,
        by: i32,
    ) -> Result<Option<CartLine>, DomainError> {
        let mut conn = self.pool.get()?;

        let row: Option<CartItemRow> = diesel::update(
            cart_items::table
                .filter(cart_items::user_id.eq(user_id))
                .filter(cart_items::product_id.eq(product_id)),
        )
        .set((
            cart_items::quantity.eq(cart_items::quantity + by),
            cart_items::updated_at.eq(Utc::now()),
        ))
        .get_result(&mut conn)
        .optional()?;

        Ok(row.map(Into::into))
    }

    fn delete_line(&self, user_id: Uuid, line_id: Uuid) -> Result<usize, DomainError> {
        let mut conn = self.pool.get()?;

        let deleted = diesel::delete(
            cart_items::table
                .filter(cart_items::id.eq(line_id))
                .filter(cart_items::user_id.eq(user_id)),
        )
        .execute(&mut conn)?;

        Ok(deleted)
    }

    fn checkout(&self, user_id: Uuid) -> Result<Vec<PurchasedLine>, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            // 1. Snapshot the cart with live product data.
            let rows: Vec<(CartItemRow, ProductRow)> = cart_items::table
                .inner_join(products::table)
                .filter(cart_items::user_id.eq(user_id))
                .order(cart_items::created_at.asc())
                .select((CartItemRow::as_select(), ProductRow::as_select()))
                .load(conn)?;

            if rows.is_empty() {
                return Ok(vec![]);
            }

            // 2. Decrement stock per line. The `stock >= 0` check constraint
            //    aborts the whole transaction on an oversell.
            for (line, _) in &rows {
                diesel::update(products::table.filter(products::id.eq(line.product_id)))
                    .set((
                        products::stock.eq(products::stock - line.quantity),
                        products::updated_at.eq(Utc::now()),
                    ))
                    .execute(conn)?;
            }

            // 3. Archive the lines by value.
            let history: Vec<NewHistoryRow> = rows
                .iter()
                .map(|(line, _)| NewHistoryRow {
                    id: Uuid::new_v4(),
                    user_id: line.user_id,
                    product_id: line.product_id,
                    quantity: line.quantity,
                })
                .collect();
            diesel::insert_into(purchase_histories::table)
                .values(&history)
                .execute(conn)?;

            // 4. Clear the cart.
            diesel::delete(cart_items::table.filter(cart_items::user_id.eq(user_id)))
                .execute(conn)?;

            Ok(rows
                .into_iter()
                .map(|(line, product)| PurchasedLine {
                    product_id: line.product_id,
                    product_name: product.name,
                    quantity: line.quantity,
                    unit_price: product.price,
                })
                .collect())
        })
    }

    fn history_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<HistoryEntryWithProduct>, DomainError> {
        let mut conn = self.pool.get()?;

        let rows: Vec<(HistoryRow, ProductRow)> = purchase_histories::table
            .inner_join(products::table)
            .filter(purchase_histories::user_id.eq(user_id))
            .order(purchase_histories::created_at.desc())
            .select((HistoryRow::as_select(), ProductRow::as_select()))
            .load(&mut conn)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::DieselCartRepository;
    use crate::domain::ports::{CartRepository, ProductRepository};
    use crate::domain::product::ProductDraft;
    use crate::infrastructure::product_repo::DieselProductRepository;
    use crate::infrastructure::test_support::setup_db;

    fn seed_product(repo: &DieselProductRepository, name: &str, price: i32, stock: i32) -> Uuid {
        repo.create(
            ProductDraft::new(
                name.to_string(),
                format!("https://img.example.com/{name}.png"),
                price,
                stock,
            )
            .expect("valid draft"),
        )
        .expect("create product")
        .id
    }

    #[tokio::test]
    async fn create_line_starts_at_quantity_one() {
        let (_container, pool) = setup_db().await;
        let cart = DieselCartRepository::new(pool.clone());
        let products = DieselProductRepository::new(pool);
        let product_id = seed_product(&products, "apple", 100, 10);
        let user_id = Uuid::new_v4();

        let line = cart.create_line(user_id, product_id).expect("create line");

        assert_eq!(line.quantity, 1);
        let found = cart
            .find_line(user_id, product_id)
            .expect("find")
            .expect("line should exist");
        assert_eq!(found.id, line.id);
    }

    #[tokio::test]
    async fn increment_adds_to_stored_quantity() {
        let (_container, pool) = setup_db().await;
        let cart = DieselCartRepository::new(pool.clone());
        let products = DieselProductRepository::new(pool);
        let product_id = seed_product(&products, "banana", 50, 10);
        let user_id = Uuid::new_v4();
        cart.create_line(user_id, product_id).expect("create line");

        let updated = cart
            .increment_line(user_id, product_id, 3)
            .expect("increment")
            .expect("row should match");

        assert_eq!(updated.quantity, 4);
    }

    #[tokio::test]
    async fn increment_of_missing_line_matches_no_row() {
        let (_container, pool) = setup_db().await;
        let cart = DieselCartRepository::new(pool);

        let updated = cart
            .increment_line(Uuid::new_v4(), Uuid::new_v4(), 1)
            .expect("increment should not error");

        assert!(updated.is_none());
    }

    #[tokio::test]
    async fn delete_line_is_scoped_to_owner() {
        let (_container, pool) = setup_db().await;
        let cart = DieselCartRepository::new(pool.clone());
        let products = DieselProductRepository::new(pool);
        let product_id = seed_product(&products, "cherry", 10, 10);
        let owner = Uuid::new_v4();
        let line = cart.create_line(owner, product_id).expect("create line");

        let by_stranger = cart
            .delete_line(Uuid::new_v4(), line.id)
            .expect("delete should not error");
        assert_eq!(by_stranger, 0);

        let by_owner = cart.delete_line(owner, line.id).expect("delete");
        assert_eq!(by_owner, 1);
    }

    #[tokio::test]
    async fn checkout_moves_lines_to_history_and_decrements_stock() {
        let (_container, pool) = setup_db().await;
        let cart = DieselCartRepository::new(pool.clone());
        let products = DieselProductRepository::new(pool);
        let product_a = seed_product(&products, "mango", 300, 10);
        let product_b = seed_product(&products, "papaya", 150, 5);
        let user_id = Uuid::new_v4();
        cart.create_line(user_id, product_a).expect("line a");
        cart.increment_line(user_id, product_a, 1).expect("bump a");
        cart.create_line(user_id, product_b).expect("line b");

        let purchased = cart.checkout(user_id).expect("checkout");

        assert_eq!(purchased.len(), 2);
        assert_eq!(products.find(product_a).unwrap().unwrap().stock, 8);
        assert_eq!(products.find(product_b).unwrap().unwrap().stock, 4);
        assert!(cart.list_for_user(user_id).expect("list").is_empty());

        let history = cart.history_for_user(user_id).expect("history");
        assert_eq!(history.len(), 2);
        let archived: Vec<(Uuid, i32)> = history
            .iter()
            .map(|h| (h.entry.product_id, h.entry.quantity))
            .collect();
        assert!(archived.contains(&(product_a, 2)));
        assert!(archived.contains(&(product_b, 1)));
    }

    #[tokio::test]
    async fn checkout_of_empty_cart_mutates_nothing() {
        let (_container, pool) = setup_db().await;
        let cart = DieselCartRepository::new(pool.clone());
        let products = DieselProductRepository::new(pool);
        let product_id = seed_product(&products, "kiwi", 100, 10);
        let user_id = Uuid::new_v4();

        let purchased = cart.checkout(user_id).expect("checkout");

        assert!(purchased.is_empty());
        assert_eq!(products.find(product_id).unwrap().unwrap().stock, 10);
        assert!(cart.history_for_user(user_id).expect("history").is_empty());
    }

    #[tokio::test]
    async fn checkout_rolls_back_entirely_when_stock_would_go_negative() {
        let (_container, pool) = setup_db().await;
        let cart = DieselCartRepository::new(pool.clone());
        let products = DieselProductRepository::new(pool);
        // Quantity 3 in the cart, then stock drops to 2 behind our back.
        let product_id = seed_product(&products, "lychee", 100, 10);
        let user_id = Uuid::new_v4();
        cart.create_line(user_id, product_id).expect("line");
        cart.increment_line(user_id, product_id, 2).expect("bump");
        products
            .update(
                product_id,
                ProductDraft::new(
                    "lychee".to_string(),
                    "https://img.example.com/lychee.png".to_string(),
                    100,
                    2,
                )
                .expect("valid draft"),
            )
            .expect("stock update");

        let result = cart.checkout(user_id);

        assert!(result.is_err(), "oversell should abort the transaction");
        assert_eq!(products.find(product_id).unwrap().unwrap().stock, 2);
        assert_eq!(cart.list_for_user(user_id).expect("list").len(), 1);
        assert!(cart.history_for_user(user_id).expect("history").is_empty());
    }

    #[tokio::test]
    async fn second_line_for_same_product_violates_unique_pair() {
        let (_container, pool) = setup_db().await;
        let cart = DieselCartRepository::new(pool.clone());
        let products = DieselProductRepository::new(pool);
        let product_id = seed_product(&products, "durian", 100, 10);
        let user_id = Uuid::new_v4();
        cart.create_line(user_id, product_id).expect("first line");

        assert!(cart.create_line(user_id, product_id).is_err());
    }
}
