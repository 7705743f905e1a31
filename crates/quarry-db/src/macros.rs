//! Macros for defining entity schemas.
//!
//! The [`define_entity!`] macro generates everything the repositories need
//! for one table: typed column constants, the [`Entity`](crate::Entity)
//! schema descriptor and a [`FromRow`](crate::FromRow) implementation.

/// Declares the table mapping of an entity struct.
///
/// Every field of the struct must be listed as a column. Columns marked
/// `#[generated]` are assigned by the store and skipped by INSERT. Column
/// types must convert into `rusqlite::types::Value`, implement `FromSql`,
/// [`ColumnType`](crate::schema::ColumnType) and `Default` (columns left out
/// of a projection hydrate as the default).
///
/// # Syntax
///
/// ```ignore
/// #[derive(Debug, Clone, Default)]
/// pub struct User {
///     pub id: i64,
///     pub name: String,
/// }
///
/// define_entity!(
///     User => users {
///         table: "users",
///         primary_key: ID,
///         columns: {
///             #[generated]
///             ID: i64 => "id" => id,
///             NAME: String => "name" => name
///         }
///     }
/// );
/// ```
///
/// This expands to:
///
/// ```ignore
/// pub mod users {
///     pub const TABLE: &str = "users";
///     pub const ID: quarry_db::Col<super::User, i64> = quarry_db::Col::new("id");
///     pub const NAME: quarry_db::Col<super::User, String> = quarry_db::Col::new("name");
///     pub const PRIMARY_KEY: &str = "id";
/// }
///
/// impl quarry_db::Entity for User { /* static schema */ }
/// impl quarry_db::FromRow for User { /* reads every column by name */ }
/// ```
///
/// # Usage
///
/// ```ignore
/// let admins = QueryRepository::<User, _>::new(db)
///     .filter(Filter::default().eq(users::NAME, "admin"))
///     .list(&ctx)?;
/// ```
#[macro_export]
macro_rules! define_entity {
    (@generated generated) => {
        true
    };
    (@generated) => {
        false
    };
    (
        $entity:ident => $module:ident {
            table: $table:literal,
            primary_key: $pk:ident,
            columns: {
                $(
                    $(#[$flag:ident])?
                    $col_name:ident: $col_type:ty => $db_col:literal => $field:ident
                ),* $(,)?
            }
        }
    ) => {
        pub mod $module {
            use $crate::expr::column::Col;

            pub const TABLE: &str = $table;

            $(
                pub const $col_name: Col<super::$entity, $col_type> = Col::new($db_col);
            )*

            pub const PRIMARY_KEY: &str = $pk.name;
        }

        impl $crate::traits::Entity for $entity {
            fn schema() -> &'static $crate::schema::Schema<Self> {
                static SCHEMA: $crate::schema::Schema<$entity> = $crate::schema::Schema {
                    table: $table,
                    primary_key: $module::$pk.name,
                    columns: &[
                        $(
                            $crate::schema::Column {
                                name: $db_col,
                                generated: $crate::define_entity!(@generated $($flag)?),
                                value: {
                                    fn read(e: &$entity) -> $crate::rusqlite::types::Value {
                                        $crate::rusqlite::types::Value::from(e.$field.clone())
                                    }
                                    read
                                },
                                parse: <$col_type as $crate::schema::ColumnType>::parse_arg,
                            },
                        )*
                    ],
                };
                &SCHEMA
            }
        }

        impl $crate::traits::FromRow for $entity {
            fn from_row(row: &$crate::rusqlite::Row) -> $crate::rusqlite::Result<Self> {
                Ok(Self {
                    $(
                        $field: $crate::helpers::get_or_default(row, $db_col)?,
                    )*
                })
            }
        }
    };
}
