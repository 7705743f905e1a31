//! Entities and an in-memory database shared by the unit tests.

use tokio_util::sync::CancellationToken;

use crate::{connection::SqliteExecutor, define_entity, repository::CommandRepository};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Account {
    pub id: i64,
    pub username: String,
    pub password: String,
}

define_entity!(
    Account => accounts {
        table: "accounts",
        primary_key: ID,
        columns: {
            #[generated]
            ID: i64 => "id" => id,
            USERNAME: String => "username" => username,
            PASSWORD: String => "password" => password,
        }
    }
);

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Product {
    pub product_id: i64,
    pub name: String,
    pub price: f64,
    pub qty: i64,
    pub label: Option<String>,
}

define_entity!(
    Product => products {
        table: "products",
        primary_key: PRODUCT_ID,
        columns: {
            PRODUCT_ID: i64 => "product_id" => product_id,
            NAME: String => "name" => name,
            PRICE: f64 => "price" => price,
            QTY: i64 => "qty" => qty,
            LABEL: Option<String> => "label" => label,
        }
    }
);

pub fn setup_db() -> SqliteExecutor {
    let db = SqliteExecutor::open_in_memory().unwrap();
    db.execute_batch(
        &CancellationToken::new(),
        "CREATE TABLE accounts (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            username TEXT NOT NULL,
            password TEXT NOT NULL
        );
        CREATE TABLE products (
            product_id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            price REAL NOT NULL,
            qty INTEGER NOT NULL,
            label TEXT
        );",
    )
    .unwrap();
    db
}

fn product(id: i64, name: &str, price: f64, qty: i64, label: Option<&str>) -> Product {
    Product {
        product_id: id,
        name: name.into(),
        price,
        qty,
        label: label.map(Into::into),
    }
}

/// Inserts four products with ids 1 to 4:
/// bolt (2.5, 100, m6), nut (0.5, 300), wrench (9.0, 5, tools), drill (49.0, 2).
pub fn seed_products(db: &SqliteExecutor) {
    CommandRepository::<Product, _>::new(db.clone())
        .insert_list(
            &CancellationToken::new(),
            &[
                product(1, "bolt", 2.5, 100, Some("m6")),
                product(2, "nut", 0.5, 300, None),
                product(3, "wrench", 9.0, 5, Some("tools")),
                product(4, "drill", 49.0, 2, None),
            ],
        )
        .unwrap();
}
