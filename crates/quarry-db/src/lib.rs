//! Immutable query builder and repositories for flat entity tables.
//!
//! Entities are declared once with [`define_entity!`], which generates typed
//! column constants and the [`Entity`] schema descriptor. Reads go through
//! [`QueryRepository`], writes through [`CommandRepository`]; both render SQL
//! with the builders in [`query`] and run it on an [`Executor`].

pub mod connection;
pub mod error;
pub mod expr;
pub mod helpers;
pub mod macros;
pub mod query;
pub mod repository;
pub mod schema;
pub mod traits;

#[cfg(test)]
pub(crate) mod test_utils;

pub use connection::{ExecResult, Prepared, SqliteExecutor};
pub use error::{DbError, Result};
pub use expr::*;
pub use helpers::*;
pub use query::*;
pub use repository::*;
pub use rusqlite;
pub use schema::{Column, ColumnType, Schema};
pub use tokio_util::sync::CancellationToken;
pub use traits::{Entity, Executor, FromRow};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{products, seed_products, setup_db, Account, Product};

    #[test]
    fn test_insert_round_trip() {
        let db = setup_db();
        let ctx = CancellationToken::new();
        let item = Product {
            product_id: 42,
            name: "hex key".into(),
            price: 3.75,
            qty: 12,
            label: Some("tools".into()),
        };

        CommandRepository::<Product, _>::new(db.clone())
            .insert(&ctx, item.clone())
            .unwrap();

        let found = QueryRepository::<Product, _>::new(db)
            .filter(Filter::by_primary_key(42i64))
            .list(&ctx)
            .unwrap();
        assert_eq!(found, vec![item]);
    }

    #[test]
    fn test_generated_key_round_trip() {
        let db = setup_db();
        let ctx = CancellationToken::new();
        let account = Account {
            id: 0,
            username: "grace".into(),
            password: "hopper".into(),
        };

        let res = CommandRepository::<Account, _>::new(db.clone())
            .insert(&ctx, account.clone())
            .unwrap();
        let stored = QueryRepository::<Account, _>::new(db)
            .filter(Filter::by_primary_key(res.last_insert_id()))
            .one(&ctx)
            .unwrap();

        assert_eq!(stored.username, account.username);
        assert_eq!(stored.password, account.password);
        assert_eq!(stored.id, res.last_insert_id());
    }

    #[test]
    fn test_nested_or_group() {
        let db = setup_db();
        let ctx = CancellationToken::new();
        seed_products(&db);

        let either = Filter::new(LogicalOperator::Or)
            .eq(products::NAME, "nut")
            .gt(products::PRICE, 40.0);
        let rows = QueryRepository::<Product, _>::new(db)
            .filter(Filter::default().is_null(products::LABEL).group(&either))
            .order_by([products::PRODUCT_ID.asc()])
            .list(&ctx)
            .unwrap();

        let ids: Vec<_> = rows.iter().map(|p| p.product_id).collect();
        assert_eq!(ids, vec![2, 4]);
    }

    #[test]
    fn test_membership_and_like() {
        let db = setup_db();
        let ctx = CancellationToken::new();
        seed_products(&db);
        let repo = QueryRepository::<Product, _>::new(db);

        let in_ids = repo
            .filter(Filter::default().is_in(products::PRODUCT_ID, vec![1i64, 3, 99]))
            .count(&ctx)
            .unwrap();
        assert_eq!(in_ids, 2);

        let none = repo
            .filter(Filter::default().is_in(products::PRODUCT_ID, Vec::<i64>::new()))
            .count(&ctx)
            .unwrap();
        assert_eq!(none, 0);

        let like = repo
            .filter(Filter::default().like(products::NAME, "%r%"))
            .order_by([products::NAME.asc()])
            .list(&ctx)
            .unwrap();
        let names: Vec<_> = like.into_iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["drill", "wrench"]);
    }

    #[test]
    fn test_parsed_fields_and_operators() {
        let db = setup_db();
        let ctx = CancellationToken::new();
        seed_products(&db);

        let op: Operator = "not in".parse().unwrap();
        let filter = Filter::<Product>::default().set_field(
            Field::parse("name").unwrap(),
            op,
            vec!["bolt".to_string(), "nut".to_string()],
        );
        let rows = QueryRepository::<Product, _>::new(db)
            .select(FieldList::parse("product_id, name").unwrap())
            .filter(filter)
            .order_by([Order::new(Field::parse("qty").unwrap())])
            .list(&ctx)
            .unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].name, "drill");
        assert_eq!(rows[0].qty, 0);

        assert!(Field::<Product>::parse("password").is_err());
        assert!(FieldList::<Account>::parse("id,nope").is_err());
    }
}
