//! The tables bundled with the CLI.

use std::str::FromStr;

use quarry_db::define_entity;

use crate::error::{CliError, CliResult};

pub const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS products (
    product_id INTEGER PRIMARY KEY AUTOINCREMENT,
    product_category_fkid INTEGER,
    admin_fkid INTEGER,
    name TEXT NOT NULL,
    price REAL NOT NULL DEFAULT 0,
    description TEXT,
    qty INTEGER NOT NULL DEFAULT 0,
    image TEXT,
    label TEXT
);
CREATE TABLE IF NOT EXISTS users (
    user_id INTEGER PRIMARY KEY AUTOINCREMENT,
    photo TEXT,
    username TEXT NOT NULL UNIQUE,
    email TEXT NOT NULL,
    password TEXT NOT NULL,
    name TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Product {
    pub product_id: i64,
    pub product_category_fkid: Option<i64>,
    pub admin_fkid: Option<i64>,
    pub name: String,
    pub price: f64,
    pub description: Option<String>,
    pub qty: i64,
    pub image: Option<String>,
    pub label: Option<String>,
}

define_entity!(
    Product => products {
        table: "products",
        primary_key: PRODUCT_ID,
        columns: {
            #[generated]
            PRODUCT_ID: i64 => "product_id" => product_id,
            PRODUCT_CATEGORY_FKID: Option<i64> => "product_category_fkid" => product_category_fkid,
            ADMIN_FKID: Option<i64> => "admin_fkid" => admin_fkid,
            NAME: String => "name" => name,
            PRICE: f64 => "price" => price,
            DESCRIPTION: Option<String> => "description" => description,
            QTY: i64 => "qty" => qty,
            IMAGE: Option<String> => "image" => image,
            LABEL: Option<String> => "label" => label,
        }
    }
);

#[derive(Debug, Clone, Default, PartialEq)]
pub struct User {
    pub user_id: i64,
    pub photo: Option<String>,
    pub username: String,
    pub email: String,
    pub password: String,
    pub name: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

define_entity!(
    User => users {
        table: "users",
        primary_key: USER_ID,
        columns: {
            #[generated]
            USER_ID: i64 => "user_id" => user_id,
            PHOTO: Option<String> => "photo" => photo,
            USERNAME: String => "username" => username,
            EMAIL: String => "email" => email,
            PASSWORD: String => "password" => password,
            NAME: Option<String> => "name" => name,
            CREATED_AT: String => "created_at" => created_at,
            UPDATED_AT: String => "updated_at" => updated_at,
        }
    }
);

/// Writes a command-line value into the named column of a record.
pub trait Assign {
    fn assign(&mut self, column: &str, raw: &str) -> CliResult<()>;

    /// Refreshes bookkeeping columns before an update and names the column
    /// that changed, if any.
    fn touch(&mut self) -> Option<&'static str> {
        None
    }
}

fn parse<T: FromStr>(column: &str, raw: &str) -> CliResult<T>
where
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|e: T::Err| CliError::argument("value", raw, format!("{column}: {e}")))
}

/// An empty string or `null` clears an optional column.
fn parse_opt<T: FromStr>(column: &str, raw: &str) -> CliResult<Option<T>>
where
    T::Err: std::fmt::Display,
{
    match raw.trim() {
        "" | "null" | "NULL" => Ok(None),
        _ => parse(column, raw).map(Some),
    }
}

fn read_only(column: &str) -> CliError {
    CliError::argument("assignment", column, "column cannot be assigned")
}

impl Assign for Product {
    fn assign(&mut self, column: &str, raw: &str) -> CliResult<()> {
        match column {
            "product_category_fkid" => self.product_category_fkid = parse_opt(column, raw)?,
            "admin_fkid" => self.admin_fkid = parse_opt(column, raw)?,
            "name" => self.name = raw.to_string(),
            "price" => self.price = parse(column, raw)?,
            "description" => self.description = parse_opt(column, raw)?,
            "qty" => self.qty = parse(column, raw)?,
            "image" => self.image = parse_opt(column, raw)?,
            "label" => self.label = parse_opt(column, raw)?,
            _ => return Err(read_only(column)),
        }
        Ok(())
    }
}

impl Assign for User {
    fn assign(&mut self, column: &str, raw: &str) -> CliResult<()> {
        match column {
            "photo" => self.photo = parse_opt(column, raw)?,
            "username" => self.username = raw.to_string(),
            "email" => self.email = raw.to_string(),
            "password" => self.password = raw.to_string(),
            "name" => self.name = parse_opt(column, raw)?,
            "created_at" => self.created_at = raw.to_string(),
            "updated_at" => self.updated_at = raw.to_string(),
            _ => return Err(read_only(column)),
        }
        Ok(())
    }

    fn touch(&mut self) -> Option<&'static str> {
        self.updated_at = timestamp();
        Some(users::UPDATED_AT.name)
    }
}

/// Current UTC time as stored in `created_at`/`updated_at`.
pub fn timestamp() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
}

#[cfg(test)]
mod tests {
    use quarry_db::Entity;

    use super::*;

    #[test]
    fn test_schemas() {
        let products = Product::schema();
        assert_eq!(products.primary_key, "product_id");
        assert_eq!(products.columns.len(), 9);
        assert_eq!(products.insertable().count(), 8);

        let users = User::schema();
        assert_eq!(users.table, "users");
        assert_eq!(users.insertable().next().map(|c| c.name), Some("photo"));
    }

    #[test]
    fn test_assign_product() {
        let mut p = Product::default();
        p.assign("price", "12.5").unwrap();
        p.assign("label", "sale").unwrap();
        p.assign("label", "null").unwrap();
        p.assign("qty", " 7 ").unwrap();

        assert_eq!(p.price, 12.5);
        assert_eq!(p.label, None);
        assert_eq!(p.qty, 7);

        assert!(p.assign("qty", "many").is_err());
        assert!(p.assign("product_id", "3").is_err());
        assert!(p.assign("missing", "3").is_err());
    }

    #[test]
    fn test_assign_user() {
        let mut u = User::default();
        u.assign("email", "a@b.c").unwrap();
        u.assign("name", "").unwrap();
        assert_eq!(u.email, "a@b.c");
        assert_eq!(u.name, None);
        assert!(u.assign("user_id", "1").is_err());

        assert_eq!(u.touch(), Some("updated_at"));
        assert!(!u.updated_at.is_empty());
        assert_eq!(Product::default().touch(), None);
    }

    #[test]
    fn test_timestamp_format() {
        let ts = timestamp();
        assert!(ts.ends_with('Z'));
        assert_eq!(ts.len(), "2024-01-01T00:00:00Z".len());
    }
}
