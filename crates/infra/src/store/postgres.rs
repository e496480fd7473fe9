//! Postgres-backed store implementation.
//!
//! Persistent [`Store`] over sqlx/Postgres. Each [`StoreTx`] wraps one
//! database transaction; rows read for mutation (`product`, `order`,
//! `purchase` on the transaction) are locked with `SELECT ... FOR UPDATE`, so
//! a concurrent transaction cannot change a quantity between the stock check
//! and the decrement. Dropping an uncommitted transaction rolls it back.
//!
//! ## Error Mapping
//!
//! sqlx errors are mapped to [`StoreError`]: unique-constraint violations
//! (code `23505`) become [`StoreError::Conflict`], everything else becomes
//! [`StoreError::Backend`] tagged with the failing operation.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, Row, Transaction};
use uuid::Uuid;

use shopdesk_core::{
    CategoryId, CustomerId, MerchantId, OrderId, ProductId, PurchaseId, UserId,
};
use shopdesk_orders::{Order, OrderLine};
use shopdesk_parties::{Customer, Merchant, User};
use shopdesk_products::{Product, ProductStatus};
use shopdesk_purchasing::{Purchase, PurchaseItem};

use super::{Store, StoreError, StoreTx};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS products (
    id              UUID PRIMARY KEY,
    name            TEXT NOT NULL,
    unique_number   TEXT NOT NULL UNIQUE,
    purchase_price  NUMERIC(19, 4) NOT NULL,
    selling_price   NUMERIC(19, 4) NOT NULL,
    quantity        BIGINT NOT NULL CHECK (quantity >= 0),
    in_stock        BOOLEAN NOT NULL,
    status          TEXT NOT NULL,
    category_id     UUID
);

CREATE TABLE IF NOT EXISTS customers (
    id    UUID PRIMARY KEY,
    name  TEXT NOT NULL,
    phone TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS merchants (
    id      UUID PRIMARY KEY,
    name    TEXT NOT NULL,
    phone   TEXT NOT NULL,
    address TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS app_users (
    id         UUID PRIMARY KEY,
    first_name TEXT NOT NULL,
    last_name  TEXT NOT NULL,
    email      TEXT NOT NULL,
    phone      TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS orders (
    id             UUID PRIMARY KEY,
    customer_id    UUID NOT NULL,
    user_id        UUID NOT NULL,
    order_date     TIMESTAMPTZ NOT NULL,
    notes          TEXT,
    total_amount   NUMERIC(19, 4) NOT NULL,
    total_discount NUMERIC(19, 4) NOT NULL
);

CREATE TABLE IF NOT EXISTS order_lines (
    order_id         UUID NOT NULL REFERENCES orders (id) ON DELETE CASCADE,
    line_no          INT NOT NULL,
    product_id       UUID NOT NULL REFERENCES products (id),
    quantity         BIGINT NOT NULL CHECK (quantity >= 1),
    discount_percent NUMERIC(7, 4) NOT NULL,
    PRIMARY KEY (order_id, line_no)
);

CREATE TABLE IF NOT EXISTS purchases (
    id           UUID PRIMARY KEY,
    merchant_id  UUID NOT NULL,
    order_date   TIMESTAMPTZ NOT NULL,
    notes        TEXT,
    total_amount NUMERIC(19, 4) NOT NULL
);

CREATE TABLE IF NOT EXISTS purchase_lines (
    purchase_id    UUID NOT NULL REFERENCES purchases (id) ON DELETE CASCADE,
    line_no        INT NOT NULL,
    product_name   TEXT NOT NULL,
    quantity       BIGINT NOT NULL CHECK (quantity >= 1),
    price_per_unit NUMERIC(19, 4) NOT NULL,
    total_price    NUMERIC(19, 4) NOT NULL,
    PRIMARY KEY (purchase_id, line_no)
);
"#;

/// Postgres-backed [`Store`].
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: Arc<PgPool>,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Create the backing tables when they do not exist yet.
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::raw_sql(SCHEMA)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("ensure_schema", e))?;
        Ok(())
    }
}

#[async_trait]
impl Store for PgStore {
    async fn begin(&self) -> Result<Box<dyn StoreTx>, StoreError> {
        let tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin", e))?;
        Ok(Box::new(PgTx { tx }))
    }

    async fn product(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        let row = sqlx::query(
            "SELECT id, name, unique_number, purchase_price, selling_price, quantity, in_stock, \
             status, category_id FROM products WHERE id = $1",
        )
        .bind(*id.as_uuid())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("product", e))?;
        row.map(|r| product_from_row(&r)).transpose()
    }

    async fn customer(&self, id: CustomerId) -> Result<Option<Customer>, StoreError> {
        let row = sqlx::query("SELECT id, name, phone FROM customers WHERE id = $1")
            .bind(*id.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("customer", e))?;
        row.map(|r| customer_from_row(&r)).transpose()
    }

    async fn merchant(&self, id: MerchantId) -> Result<Option<Merchant>, StoreError> {
        let row = sqlx::query("SELECT id, name, phone, address FROM merchants WHERE id = $1")
            .bind(*id.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("merchant", e))?;
        row.map(|r| merchant_from_row(&r)).transpose()
    }

    async fn user(&self, id: UserId) -> Result<Option<User>, StoreError> {
        let row = sqlx::query(
            "SELECT id, first_name, last_name, email, phone FROM app_users WHERE id = $1",
        )
        .bind(*id.as_uuid())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("user", e))?;
        row.map(|r| user_from_row(&r)).transpose()
    }

    async fn order(&self, id: OrderId) -> Result<Option<Order>, StoreError> {
        let row = sqlx::query(
            "SELECT id, customer_id, user_id, order_date, notes, total_amount, total_discount \
             FROM orders WHERE id = $1",
        )
        .bind(*id.as_uuid())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("order", e))?;

        let Some(row) = row else { return Ok(None) };
        let line_rows = sqlx::query(
            "SELECT product_id, quantity, discount_percent FROM order_lines \
             WHERE order_id = $1 ORDER BY line_no",
        )
        .bind(*id.as_uuid())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("order_lines", e))?;

        Ok(Some(order_from_rows(&row, &line_rows)?))
    }

    async fn orders(&self) -> Result<Vec<Order>, StoreError> {
        let rows = sqlx::query(
            "SELECT id, customer_id, user_id, order_date, notes, total_amount, total_discount \
             FROM orders ORDER BY order_date, id",
        )
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("orders", e))?;

        let line_rows = sqlx::query(
            "SELECT order_id, product_id, quantity, discount_percent FROM order_lines \
             ORDER BY order_id, line_no",
        )
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("order_lines", e))?;

        let mut lines_by_order: HashMap<Uuid, Vec<PgRow>> = HashMap::new();
        for row in line_rows {
            let order_id: Uuid = get(&row, "order_id")?;
            lines_by_order.entry(order_id).or_default().push(row);
        }

        let mut orders = Vec::with_capacity(rows.len());
        for row in rows {
            let id: Uuid = get(&row, "id")?;
            let lines = lines_by_order.remove(&id).unwrap_or_default();
            orders.push(order_from_rows(&row, &lines)?);
        }
        Ok(orders)
    }

    async fn purchase(&self, id: PurchaseId) -> Result<Option<Purchase>, StoreError> {
        let row = sqlx::query(
            "SELECT id, merchant_id, order_date, notes, total_amount FROM purchases WHERE id = $1",
        )
        .bind(*id.as_uuid())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("purchase", e))?;

        let Some(row) = row else { return Ok(None) };
        let item_rows = sqlx::query(
            "SELECT product_name, quantity, price_per_unit, total_price FROM purchase_lines \
             WHERE purchase_id = $1 ORDER BY line_no",
        )
        .bind(*id.as_uuid())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("purchase_lines", e))?;

        Ok(Some(purchase_from_rows(&row, &item_rows)?))
    }

    async fn purchases(&self) -> Result<Vec<Purchase>, StoreError> {
        let rows = sqlx::query(
            "SELECT id, merchant_id, order_date, notes, total_amount FROM purchases \
             ORDER BY order_date, id",
        )
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("purchases", e))?;

        let item_rows = sqlx::query(
            "SELECT purchase_id, product_name, quantity, price_per_unit, total_price \
             FROM purchase_lines ORDER BY purchase_id, line_no",
        )
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("purchase_lines", e))?;

        let mut items_by_purchase: HashMap<Uuid, Vec<PgRow>> = HashMap::new();
        for row in item_rows {
            let purchase_id: Uuid = get(&row, "purchase_id")?;
            items_by_purchase.entry(purchase_id).or_default().push(row);
        }

        let mut purchases = Vec::with_capacity(rows.len());
        for row in rows {
            let id: Uuid = get(&row, "id")?;
            let items = items_by_purchase.remove(&id).unwrap_or_default();
            purchases.push(purchase_from_rows(&row, &items)?);
        }
        Ok(purchases)
    }
}

struct PgTx {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl StoreTx for PgTx {
    async fn product(&mut self, id: ProductId) -> Result<Option<Product>, StoreError> {
        let row = sqlx::query(
            "SELECT id, name, unique_number, purchase_price, selling_price, quantity, in_stock, \
             status, category_id FROM products WHERE id = $1 FOR UPDATE",
        )
        .bind(*id.as_uuid())
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx_error("product", e))?;
        row.map(|r| product_from_row(&r)).transpose()
    }

    async fn upsert_product(&mut self, product: &Product) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO products \
             (id, name, unique_number, purchase_price, selling_price, quantity, in_stock, status, category_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             ON CONFLICT (id) DO UPDATE SET \
                 name = EXCLUDED.name, \
                 unique_number = EXCLUDED.unique_number, \
                 purchase_price = EXCLUDED.purchase_price, \
                 selling_price = EXCLUDED.selling_price, \
                 quantity = EXCLUDED.quantity, \
                 in_stock = EXCLUDED.in_stock, \
                 status = EXCLUDED.status, \
                 category_id = EXCLUDED.category_id",
        )
        .bind(*product.id.as_uuid())
        .bind(&product.name)
        .bind(&product.unique_number)
        .bind(product.purchase_price)
        .bind(product.selling_price)
        .bind(product.quantity)
        .bind(product.in_stock)
        .bind(product.status.as_str())
        .bind(product.category_id.map(|c| *c.as_uuid()))
        .execute(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx_error("upsert_product", e))?;
        Ok(())
    }

    async fn customer(&mut self, id: CustomerId) -> Result<Option<Customer>, StoreError> {
        let row = sqlx::query("SELECT id, name, phone FROM customers WHERE id = $1")
            .bind(*id.as_uuid())
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(|e| map_sqlx_error("customer", e))?;
        row.map(|r| customer_from_row(&r)).transpose()
    }

    async fn upsert_customer(&mut self, customer: &Customer) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO customers (id, name, phone) VALUES ($1, $2, $3) \
             ON CONFLICT (id) DO UPDATE SET name = EXCLUDED.name, phone = EXCLUDED.phone",
        )
        .bind(*customer.id.as_uuid())
        .bind(&customer.name)
        .bind(&customer.phone)
        .execute(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx_error("upsert_customer", e))?;
        Ok(())
    }

    async fn merchant(&mut self, id: MerchantId) -> Result<Option<Merchant>, StoreError> {
        let row = sqlx::query("SELECT id, name, phone, address FROM merchants WHERE id = $1")
            .bind(*id.as_uuid())
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(|e| map_sqlx_error("merchant", e))?;
        row.map(|r| merchant_from_row(&r)).transpose()
    }

    async fn upsert_merchant(&mut self, merchant: &Merchant) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO merchants (id, name, phone, address) VALUES ($1, $2, $3, $4) \
             ON CONFLICT (id) DO UPDATE SET \
                 name = EXCLUDED.name, phone = EXCLUDED.phone, address = EXCLUDED.address",
        )
        .bind(*merchant.id.as_uuid())
        .bind(&merchant.name)
        .bind(&merchant.phone)
        .bind(&merchant.address)
        .execute(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx_error("upsert_merchant", e))?;
        Ok(())
    }

    async fn user(&mut self, id: UserId) -> Result<Option<User>, StoreError> {
        let row = sqlx::query(
            "SELECT id, first_name, last_name, email, phone FROM app_users WHERE id = $1",
        )
        .bind(*id.as_uuid())
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx_error("user", e))?;
        row.map(|r| user_from_row(&r)).transpose()
    }

    async fn upsert_user(&mut self, user: &User) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO app_users (id, first_name, last_name, email, phone) \
             VALUES ($1, $2, $3, $4, $5) \
             ON CONFLICT (id) DO UPDATE SET \
                 first_name = EXCLUDED.first_name, last_name = EXCLUDED.last_name, \
                 email = EXCLUDED.email, phone = EXCLUDED.phone",
        )
        .bind(*user.id.as_uuid())
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.email)
        .bind(&user.phone)
        .execute(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx_error("upsert_user", e))?;
        Ok(())
    }

    async fn order(&mut self, id: OrderId) -> Result<Option<Order>, StoreError> {
        // The order row lock is the aggregate lock for concurrent updates of
        // the same order.
        let row = sqlx::query(
            "SELECT id, customer_id, user_id, order_date, notes, total_amount, total_discount \
             FROM orders WHERE id = $1 FOR UPDATE",
        )
        .bind(*id.as_uuid())
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx_error("order", e))?;

        let Some(row) = row else { return Ok(None) };
        let line_rows = sqlx::query(
            "SELECT product_id, quantity, discount_percent FROM order_lines \
             WHERE order_id = $1 ORDER BY line_no",
        )
        .bind(*id.as_uuid())
        .fetch_all(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx_error("order_lines", e))?;

        Ok(Some(order_from_rows(&row, &line_rows)?))
    }

    async fn insert_order(&mut self, order: &Order) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO orders \
             (id, customer_id, user_id, order_date, notes, total_amount, total_discount) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(*order.id.as_uuid())
        .bind(*order.customer_id.as_uuid())
        .bind(*order.user_id.as_uuid())
        .bind(order.order_date)
        .bind(order.notes.as_deref())
        .bind(order.total_amount)
        .bind(order.total_discount)
        .execute(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx_error("insert_order", e))?;

        self.insert_lines(order).await
    }

    async fn update_order(&mut self, order: &Order) -> Result<(), StoreError> {
        let result = sqlx::query(
            "UPDATE orders SET customer_id = $2, user_id = $3, order_date = $4, notes = $5, \
             total_amount = $6, total_discount = $7 WHERE id = $1",
        )
        .bind(*order.id.as_uuid())
        .bind(*order.customer_id.as_uuid())
        .bind(*order.user_id.as_uuid())
        .bind(order.order_date)
        .bind(order.notes.as_deref())
        .bind(order.total_amount)
        .bind(order.total_discount)
        .execute(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx_error("update_order", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::Conflict(format!(
                "order {} does not exist",
                order.id
            )));
        }

        // Lines are rewritten wholesale; the order row lock covers the gap.
        sqlx::query("DELETE FROM order_lines WHERE order_id = $1")
            .bind(*order.id.as_uuid())
            .execute(&mut *self.tx)
            .await
            .map_err(|e| map_sqlx_error("delete_order_lines", e))?;

        self.insert_lines(order).await
    }

    async fn delete_order(&mut self, id: OrderId) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM orders WHERE id = $1")
            .bind(*id.as_uuid())
            .execute(&mut *self.tx)
            .await
            .map_err(|e| map_sqlx_error("delete_order", e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn purchase(&mut self, id: PurchaseId) -> Result<Option<Purchase>, StoreError> {
        let row = sqlx::query(
            "SELECT id, merchant_id, order_date, notes, total_amount FROM purchases \
             WHERE id = $1 FOR UPDATE",
        )
        .bind(*id.as_uuid())
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx_error("purchase", e))?;

        let Some(row) = row else { return Ok(None) };
        let item_rows = sqlx::query(
            "SELECT product_name, quantity, price_per_unit, total_price FROM purchase_lines \
             WHERE purchase_id = $1 ORDER BY line_no",
        )
        .bind(*id.as_uuid())
        .fetch_all(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx_error("purchase_lines", e))?;

        Ok(Some(purchase_from_rows(&row, &item_rows)?))
    }

    async fn insert_purchase(&mut self, purchase: &Purchase) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO purchases (id, merchant_id, order_date, notes, total_amount) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(*purchase.id.as_uuid())
        .bind(*purchase.merchant_id.as_uuid())
        .bind(purchase.order_date)
        .bind(purchase.notes.as_deref())
        .bind(purchase.total_amount)
        .execute(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx_error("insert_purchase", e))?;

        self.insert_items(purchase).await
    }

    async fn update_purchase(&mut self, purchase: &Purchase) -> Result<(), StoreError> {
        let result = sqlx::query(
            "UPDATE purchases SET merchant_id = $2, order_date = $3, notes = $4, \
             total_amount = $5 WHERE id = $1",
        )
        .bind(*purchase.id.as_uuid())
        .bind(*purchase.merchant_id.as_uuid())
        .bind(purchase.order_date)
        .bind(purchase.notes.as_deref())
        .bind(purchase.total_amount)
        .execute(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx_error("update_purchase", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::Conflict(format!(
                "purchase {} does not exist",
                purchase.id
            )));
        }

        sqlx::query("DELETE FROM purchase_lines WHERE purchase_id = $1")
            .bind(*purchase.id.as_uuid())
            .execute(&mut *self.tx)
            .await
            .map_err(|e| map_sqlx_error("delete_purchase_lines", e))?;

        self.insert_items(purchase).await
    }

    async fn delete_purchase(&mut self, id: PurchaseId) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM purchases WHERE id = $1")
            .bind(*id.as_uuid())
            .execute(&mut *self.tx)
            .await
            .map_err(|e| map_sqlx_error("delete_purchase", e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        self.tx
            .commit()
            .await
            .map_err(|e| map_sqlx_error("commit", e))
    }

    async fn rollback(self: Box<Self>) -> Result<(), StoreError> {
        self.tx
            .rollback()
            .await
            .map_err(|e| map_sqlx_error("rollback", e))
    }
}

impl PgTx {
    async fn insert_lines(&mut self, order: &Order) -> Result<(), StoreError> {
        for (idx, line) in order.lines.iter().enumerate() {
            sqlx::query(
                "INSERT INTO order_lines (order_id, line_no, product_id, quantity, discount_percent) \
                 VALUES ($1, $2, $3, $4, $5)",
            )
            .bind(*order.id.as_uuid())
            .bind(idx as i32)
            .bind(*line.product_id.as_uuid())
            .bind(line.quantity)
            .bind(line.discount_percent)
            .execute(&mut *self.tx)
            .await
            .map_err(|e| map_sqlx_error("insert_order_line", e))?;
        }
        Ok(())
    }

    async fn insert_items(&mut self, purchase: &Purchase) -> Result<(), StoreError> {
        for (idx, item) in purchase.items.iter().enumerate() {
            sqlx::query(
                "INSERT INTO purchase_lines \
                 (purchase_id, line_no, product_name, quantity, price_per_unit, total_price) \
                 VALUES ($1, $2, $3, $4, $5, $6)",
            )
            .bind(*purchase.id.as_uuid())
            .bind(idx as i32)
            .bind(&item.product_name)
            .bind(item.quantity)
            .bind(item.price_per_unit)
            .bind(item.total_price)
            .execute(&mut *self.tx)
            .await
            .map_err(|e| map_sqlx_error("insert_purchase_line", e))?;
        }
        Ok(())
    }
}

fn map_sqlx_error(operation: &str, error: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &error {
        if db_err.code().as_deref() == Some("23505") {
            return StoreError::Conflict(format!("{operation}: {db_err}"));
        }
    }
    StoreError::Backend(format!("{operation}: {error}"))
}

fn get<'r, T>(row: &'r PgRow, column: &str) -> Result<T, StoreError>
where
    T: sqlx::Decode<'r, Postgres> + sqlx::Type<Postgres>,
{
    row.try_get(column)
        .map_err(|e| StoreError::Backend(format!("decode {column}: {e}")))
}

fn product_from_row(row: &PgRow) -> Result<Product, StoreError> {
    let status: String = get(row, "status")?;
    let status = ProductStatus::parse(&status)
        .ok_or_else(|| StoreError::Backend(format!("unknown product status '{status}'")))?;
    Ok(Product {
        id: ProductId::from_uuid(get(row, "id")?),
        name: get(row, "name")?,
        unique_number: get(row, "unique_number")?,
        purchase_price: get::<Decimal>(row, "purchase_price")?,
        selling_price: get::<Decimal>(row, "selling_price")?,
        quantity: get(row, "quantity")?,
        in_stock: get(row, "in_stock")?,
        status,
        category_id: get::<Option<Uuid>>(row, "category_id")?.map(CategoryId::from_uuid),
    })
}

fn customer_from_row(row: &PgRow) -> Result<Customer, StoreError> {
    Ok(Customer {
        id: CustomerId::from_uuid(get(row, "id")?),
        name: get(row, "name")?,
        phone: get(row, "phone")?,
    })
}

fn merchant_from_row(row: &PgRow) -> Result<Merchant, StoreError> {
    Ok(Merchant {
        id: MerchantId::from_uuid(get(row, "id")?),
        name: get(row, "name")?,
        phone: get(row, "phone")?,
        address: get(row, "address")?,
    })
}

fn user_from_row(row: &PgRow) -> Result<User, StoreError> {
    Ok(User {
        id: UserId::from_uuid(get(row, "id")?),
        first_name: get(row, "first_name")?,
        last_name: get(row, "last_name")?,
        email: get(row, "email")?,
        phone: get(row, "phone")?,
    })
}

fn order_from_rows(row: &PgRow, line_rows: &[PgRow]) -> Result<Order, StoreError> {
    let mut lines = Vec::with_capacity(line_rows.len());
    for line_row in line_rows {
        lines.push(OrderLine {
            product_id: ProductId::from_uuid(get(line_row, "product_id")?),
            quantity: get(line_row, "quantity")?,
            discount_percent: get::<Decimal>(line_row, "discount_percent")?,
        });
    }
    Ok(Order {
        id: OrderId::from_uuid(get(row, "id")?),
        customer_id: CustomerId::from_uuid(get(row, "customer_id")?),
        user_id: UserId::from_uuid(get(row, "user_id")?),
        order_date: get(row, "order_date")?,
        notes: get(row, "notes")?,
        total_amount: get::<Decimal>(row, "total_amount")?,
        total_discount: get::<Decimal>(row, "total_discount")?,
        lines,
    })
}

fn purchase_from_rows(row: &PgRow, item_rows: &[PgRow]) -> Result<Purchase, StoreError> {
    let mut items = Vec::with_capacity(item_rows.len());
    for item_row in item_rows {
        items.push(PurchaseItem {
            product_name: get(item_row, "product_name")?,
            quantity: get(item_row, "quantity")?,
            price_per_unit: get::<Decimal>(item_row, "price_per_unit")?,
            total_price: get::<Decimal>(item_row, "total_price")?,
        });
    }
    Ok(Purchase {
        id: PurchaseId::from_uuid(get(row, "id")?),
        merchant_id: MerchantId::from_uuid(get(row, "merchant_id")?),
        order_date: get(row, "order_date")?,
        notes: get(row, "notes")?,
        total_amount: get::<Decimal>(row, "total_amount")?,
        items,
    })
}
