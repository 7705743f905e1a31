//! Write-side repository.

use rusqlite::types::Value;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::{
    connection::ExecResult,
    error::{DbError, Result},
    expr::{FieldList, Filter},
    query::{DeleteQuery, InsertQuery, Statement, UpdateQuery},
    traits::{Entity, Executor},
};

/// Outcome of an INSERT.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InsertResult(pub ExecResult);

impl InsertResult {
    pub fn rows_affected(&self) -> usize {
        self.0.rows_affected
    }

    /// Row id assigned to the last inserted row.
    pub fn last_insert_id(&self) -> i64 {
        self.0.last_insert_id
    }
}

/// Insert, update and delete for entity `E`. Every command is one statement.
pub struct CommandRepository<E, D> {
    db: D,
    _entity: std::marker::PhantomData<fn() -> E>,
}

impl<E: Entity, D: Executor> CommandRepository<E, D> {
    pub fn new(db: D) -> Self {
        Self {
            db,
            _entity: std::marker::PhantomData,
        }
    }

    /// Inserts every entity with one multi-row INSERT.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::InvalidArgument`] for an empty slice.
    pub fn insert_list(&self, ctx: &CancellationToken, entities: &[E]) -> Result<InsertResult> {
        if ctx.is_cancelled() {
            return Err(DbError::Cancelled);
        }
        let stmt = InsertQuery::new(entities).build()?;
        self.run(ctx, &stmt).map(InsertResult)
    }

    pub fn insert(&self, ctx: &CancellationToken, entity: E) -> Result<InsertResult> {
        self.insert_list(ctx, std::slice::from_ref(&entity))
    }

    /// Writes `fields` of `entity` to every row matching `filter`, returning
    /// the number of rows changed.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::InvalidArgument`] if `fields` or `filter` is empty.
    pub fn update_by_filter(
        &self,
        ctx: &CancellationToken,
        entity: &E,
        filter: Filter<E>,
        fields: FieldList<E>,
    ) -> Result<usize> {
        if ctx.is_cancelled() {
            return Err(DbError::Cancelled);
        }
        let stmt = UpdateQuery::new(entity, fields, filter).build()?;
        self.run(ctx, &stmt).map(|r| r.rows_affected)
    }

    pub fn update_by_id(
        &self,
        ctx: &CancellationToken,
        entity: &E,
        id: impl Into<Value>,
        fields: FieldList<E>,
    ) -> Result<usize> {
        self.update_by_filter(ctx, entity, Filter::by_primary_key(id), fields)
    }

    /// Deletes every row matching `filter`, returning the number removed.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::InvalidArgument`] for an empty filter.
    pub fn delete_list(&self, ctx: &CancellationToken, filter: Filter<E>) -> Result<usize> {
        if ctx.is_cancelled() {
            return Err(DbError::Cancelled);
        }
        let stmt = DeleteQuery::new(filter).build()?;
        self.run(ctx, &stmt).map(|r| r.rows_affected)
    }

    pub fn delete(&self, ctx: &CancellationToken, id: impl Into<Value>) -> Result<usize> {
        self.delete_list(ctx, Filter::by_primary_key(id))
    }

    fn run(&self, ctx: &CancellationToken, stmt: &Statement) -> Result<ExecResult> {
        let prepared = self.db.prepare(ctx, &stmt.sql)?;
        let result = self.db.execute(ctx, &prepared, &stmt.args)?;
        debug!(
            table = E::schema().table,
            rows = result.rows_affected,
            "executed command"
        );
        Ok(result)
    }
}

impl<E, D: Clone> Clone for CommandRepository<E, D> {
    fn clone(&self) -> Self {
        Self {
            db: self.db.clone(),
            _entity: std::marker::PhantomData,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        repository::QueryRepository,
        test_utils::{accounts, products, seed_products, setup_db, Account, Product},
    };

    fn account(username: &str) -> Account {
        Account {
            id: 0,
            username: username.into(),
            password: "secret".into(),
        }
    }

    #[test]
    fn test_insert_then_list_by_key() {
        let db = setup_db();
        let ctx = CancellationToken::new();
        let commands = CommandRepository::<Account, _>::new(db.clone());

        let res = commands.insert(&ctx, account("ada")).unwrap();
        assert_eq!(res.rows_affected(), 1);
        assert_eq!(res.last_insert_id(), 1);

        let rows = QueryRepository::<Account, _>::new(db)
            .filter(Filter::by_primary_key(res.last_insert_id()))
            .list(&ctx)
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].username, "ada");
        assert_eq!(rows[0].password, "secret");
    }

    #[test]
    fn test_insert_list_single_statement() {
        let db = setup_db();
        let ctx = CancellationToken::new();
        let commands = CommandRepository::<Account, _>::new(db.clone());

        let res = commands
            .insert_list(&ctx, &[account("a"), account("b"), account("c")])
            .unwrap();
        assert_eq!(res.rows_affected(), 3);
        assert_eq!(
            QueryRepository::<Account, _>::new(db).count(&ctx).unwrap(),
            3
        );
    }

    #[test]
    fn test_insert_empty_list() {
        let commands = CommandRepository::<Account, _>::new(setup_db());
        let err = commands
            .insert_list(&CancellationToken::new(), &[])
            .unwrap_err();
        assert!(matches!(err, DbError::InvalidArgument(_)));
    }

    #[test]
    fn test_update_selected_fields_only() {
        let db = setup_db();
        let ctx = CancellationToken::new();
        seed_products(&db);

        let changed = Product {
            product_id: 1,
            name: "renamed".into(),
            price: 999.0,
            qty: 1,
            label: None,
        };
        let n = CommandRepository::<Product, _>::new(db.clone())
            .update_by_id(&ctx, &changed, 1i64, vec![products::QTY.field()].into())
            .unwrap();
        assert_eq!(n, 1);

        let bolt = QueryRepository::<Product, _>::new(db)
            .filter(Filter::by_primary_key(1i64))
            .one(&ctx)
            .unwrap();
        assert_eq!(bolt.qty, 1);
        assert_eq!(bolt.name, "bolt");
        assert_eq!(bolt.price, 2.5);
    }

    #[test]
    fn test_update_by_filter_counts_rows() {
        let db = setup_db();
        let ctx = CancellationToken::new();
        seed_products(&db);

        let template = Product {
            label: Some("clearance".into()),
            ..Default::default()
        };
        let n = CommandRepository::<Product, _>::new(db)
            .update_by_filter(
                &ctx,
                &template,
                Filter::default().lt(products::QTY, 10),
                vec![products::LABEL.field()].into(),
            )
            .unwrap();
        assert_eq!(n, 2);
    }

    #[test]
    fn test_update_rejects_empty_inputs() {
        let db = setup_db();
        let ctx = CancellationToken::new();
        let commands = CommandRepository::<Account, _>::new(db);
        let a = account("x");

        let err = commands
            .update_by_id(&ctx, &a, 1i64, FieldList::new())
            .unwrap_err();
        assert!(matches!(err, DbError::InvalidArgument(_)));

        let err = commands
            .update_by_filter(
                &ctx,
                &a,
                Filter::default(),
                vec![accounts::USERNAME.field()].into(),
            )
            .unwrap_err();
        assert!(matches!(err, DbError::InvalidArgument(_)));
    }

    #[test]
    fn test_delete() {
        let db = setup_db();
        let ctx = CancellationToken::new();
        seed_products(&db);
        let commands = CommandRepository::<Product, _>::new(db.clone());

        assert_eq!(commands.delete(&ctx, 4i64).unwrap(), 1);
        assert_eq!(commands.delete(&ctx, 4i64).unwrap(), 0);
        assert_eq!(
            commands
                .delete_list(&ctx, Filter::default().is_null(products::LABEL))
                .unwrap(),
            1
        );
        assert_eq!(
            QueryRepository::<Product, _>::new(db).count(&ctx).unwrap(),
            2
        );

        let err = commands.delete_list(&ctx, Filter::default()).unwrap_err();
        assert!(matches!(err, DbError::InvalidArgument(_)));
    }

    #[test]
    fn test_cancelled_commands() {
        let ctx = CancellationToken::new();
        ctx.cancel();
        let commands = CommandRepository::<Account, _>::new(setup_db());

        assert!(matches!(
            commands.insert(&ctx, account("a")),
            Err(DbError::Cancelled)
        ));
        assert!(matches!(commands.delete(&ctx, 1i64), Err(DbError::Cancelled)));
    }
}
