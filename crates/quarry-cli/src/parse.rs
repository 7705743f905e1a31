//! Parsing of `--where`, `--order` and `--set` arguments.

use quarry_db::{
    Direction, Entity, Field, FieldList, Filter, FilterValue, LogicalOperator, Operator, Order,
};

use crate::{
    cli::FilterArgs,
    error::{CliError, CliResult},
};

/// Parses `column:operator[:value]` and adds it to `filter`.
///
/// The value is split on the first two colons only, so it may itself contain
/// colons, and is converted with the column's own type: text is bound as
/// given, `null` is SQL NULL only for nullable columns. Membership operators
/// split the value on commas.
pub fn parse_condition<E: Entity>(filter: &Filter<E>, input: &str) -> CliResult<Filter<E>> {
    let mut parts = input.splitn(3, ':');
    let column = parts.next().unwrap_or_default();
    let Some(op) = parts.next() else {
        return Err(CliError::argument("condition", input, "missing operator"));
    };
    let raw = parts.next();

    let field = Field::<E>::parse(column)?;
    let op: Operator = op.parse()?;
    let Some(parse) = E::schema().column(field.as_str()).map(|c| c.parse) else {
        return Err(CliError::argument("condition", input, "unknown column"));
    };

    let value = match raw {
        _ if op.is_unary() => FilterValue::Null,
        None => FilterValue::Null,
        Some(raw) if op.is_membership() => {
            let items = raw.split(',').filter(|s| !s.is_empty());
            FilterValue::List(items.map(parse).collect::<Result<_, _>>()?)
        }
        Some(raw) => FilterValue::from(parse(raw)?),
    };

    let next = filter.set_field(field, op, value);
    next.validate()?;
    Ok(next)
}

/// Builds the filter described by repeated `--where` flags.
pub fn parse_filter<E: Entity>(args: &FilterArgs) -> CliResult<Filter<E>> {
    let operator = if args.any {
        LogicalOperator::Or
    } else {
        LogicalOperator::And
    };
    args.conditions
        .iter()
        .try_fold(Filter::new(operator), |filter, cond| {
            parse_condition(&filter, cond)
        })
}

/// Parses `column[:asc|desc]`.
pub fn parse_order<E: Entity>(input: &str) -> CliResult<Order<E>> {
    let (column, direction) = match input.split_once(':') {
        Some((column, dir)) => (column, dir.parse::<Direction>()?),
        None => (input, Direction::Asc),
    };
    Ok(Order::new(Field::<E>::parse(column)?).set_direction(direction))
}

/// Splits `column=value` assignments, checking each column exists.
pub fn parse_assignments<E: Entity>(
    inputs: &[String],
) -> CliResult<(FieldList<E>, Vec<(&'static str, &str)>)> {
    let mut fields = Vec::with_capacity(inputs.len());
    let mut pairs = Vec::with_capacity(inputs.len());
    for input in inputs {
        let Some((column, value)) = input.split_once('=') else {
            return Err(CliError::argument("assignment", input, "expected column=value"));
        };
        let field = Field::<E>::parse(column)?;
        fields.push(field);
        pairs.push((field.as_str(), value));
    }
    let fields = FieldList::from(fields);
    Ok((fields, pairs))
}

#[cfg(test)]
mod tests {
    use quarry_db::{rusqlite::types::Value, DbError};

    use super::*;
    use crate::entities::Product;

    fn cond(input: &str) -> CliResult<Filter<Product>> {
        parse_condition(&Filter::default(), input)
    }

    #[test]
    fn test_values_follow_column_types() {
        let f = cond("name:=:007").unwrap();
        assert_eq!(f.values(), &[Value::Text("007".into())]);

        let f = cond("name:in:007,1e3, bolt ").unwrap();
        assert_eq!(
            f.values(),
            &[
                Value::Text("007".into()),
                Value::Text("1e3".into()),
                Value::Text(" bolt ".into()),
            ]
        );

        assert_eq!(cond("price:<:1e3").unwrap().values(), &[Value::Real(1000.0)]);
        assert_eq!(cond("qty:>=: 5").unwrap().values(), &[Value::Integer(5)]);
        assert!(matches!(
            cond("qty:>:many"),
            Err(CliError::Db(DbError::InvalidArgument(_)))
        ));
    }

    #[test]
    fn test_comparison_condition() {
        let f = cond("price:>=:100").unwrap();
        assert_eq!(f.query(), "price >= ?");
        assert_eq!(f.values(), &[Value::Real(100.0)]);
    }

    #[test]
    fn test_value_may_contain_colons() {
        let f = cond("image:=:http://x/y.png").unwrap();
        assert_eq!(f.values(), &[Value::Text("http://x/y.png".into())]);
    }

    #[test]
    fn test_membership_condition() {
        let f = cond("product_id:not in:1,2,3").unwrap();
        assert_eq!(f.query(), "product_id NOT IN (?, ?, ?)");
        assert_eq!(f.values().len(), 3);
    }

    #[test]
    fn test_null_conditions() {
        assert_eq!(cond("label:is null").unwrap().query(), "label IS NULL");
        assert_eq!(cond("label:=").unwrap().query(), "label IS NULL");
        assert_eq!(cond("label:!=:null").unwrap().query(), "label IS NOT NULL");
        assert!(matches!(
            cond("price:>"),
            Err(CliError::Db(DbError::InvalidArgument(_)))
        ));
    }

    #[test]
    fn test_bad_conditions() {
        assert!(matches!(cond("price"), Err(CliError::Argument { .. })));
        assert!(matches!(
            cond("nope:=:1"),
            Err(CliError::Db(DbError::InvalidArgument(_)))
        ));
        assert!(cond("price:~:1").is_err());
    }

    #[test]
    fn test_any_joins_with_or() {
        let args = FilterArgs {
            conditions: vec!["name:=:bolt".into(), "qty:<:5".into()],
            any: true,
        };
        let f = parse_filter::<Product>(&args).unwrap();
        assert_eq!(f.query(), "name = ? OR qty < ?");
        assert!(parse_filter::<Product>(&FilterArgs::default())
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_parse_order() {
        let o = parse_order::<Product>("price:DESC").unwrap();
        assert_eq!(o.to_string(), "price DESC");
        assert_eq!(parse_order::<Product>("name").unwrap().to_string(), "name ASC");
        assert!(parse_order::<Product>("name:sideways").is_err());
    }

    #[test]
    fn test_parse_assignments() {
        let inputs = vec!["qty=3".to_string(), "label=a=b".to_string()];
        let (fields, pairs) = parse_assignments::<Product>(&inputs).unwrap();
        assert_eq!(fields.names(), vec!["qty", "label"]);
        assert_eq!(pairs, vec![("qty", "3"), ("label", "a=b")]);

        assert!(parse_assignments::<Product>(&["qty".to_string()]).is_err());
        assert!(parse_assignments::<Product>(&["bogus=1".to_string()]).is_err());
    }
}
