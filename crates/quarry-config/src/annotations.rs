use std::any::type_name;

use documented::DocumentedFields;
use toml_edit::{Decor, RawString, Table};
use tracing::warn;

use crate::error::{ConfigError, Result};

/// Appends documentation lines as TOML comments to the given `Decor`.
///
/// Each line of `docs` becomes a `#` comment appended after any existing
/// comment prefix.
pub fn append_docs_as_toml_comments(decor: &mut Decor, docs: &str) {
    let old_prefix = decor.prefix().and_then(RawString::as_str).unwrap_or("");

    let comments: String = docs
        .lines()
        .map(|l| {
            if l.is_empty() {
                "#\n".into()
            } else {
                format!("# {l}\n")
            }
        })
        .collect();

    let new_prefix = match old_prefix.lines().last() {
        None => format!("{old_prefix}{comments}"),
        Some("") => format!("{old_prefix}{comments}"),
        Some(_) => format!("{old_prefix}#\n{comments}"),
    };
    decor.set_prefix(new_prefix);
}

/// Puts the field docs of `T` above each key of a flat `table`.
///
/// Keys without docs are left bare. Nested tables are rejected since the
/// configuration has none.
pub fn annotate_toml_table<T: DocumentedFields>(table: &mut Table) -> Result<()> {
    for (mut key, item) in table.iter_mut() {
        let name = key.get();
        let Ok(docs) = T::get_field_docs(name) else {
            warn!("no documentation for '{}' in {}", name, type_name::<T>());
            continue;
        };
        if !item.is_value() {
            return Err(ConfigError::UnexpectedTomlItem(name.into()));
        }
        append_docs_as_toml_comments(key.leaf_decor_mut(), docs);
    }
    Ok(())
}
