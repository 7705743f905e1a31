//! Command handlers, generic over the entity they act on.

use nu_ansi_term::Color::{Cyan, Green, Red};
use quarry_config::Config;
use quarry_db::{
    CancellationToken, CommandRepository, Entity, Field, FieldList, Filter, Pagination,
    QueryRepository, SqliteExecutor,
};
use tracing::{debug, info};

use crate::{
    cli::{FilterArgs, ProductArgs, UpdateArgs, UserArgs},
    entities::{timestamp, Assign, Product, User, SCHEMA},
    error::{CliError, CliResult},
    parse::{parse_assignments, parse_filter, parse_order},
    render::{print_count, print_rows},
    utils::Colored,
};

/// Everything a command needs: the open database, settings and the
/// cancellation token handed to every repository call.
pub struct Session {
    pub db: SqliteExecutor,
    pub config: Config,
    pub ctx: CancellationToken,
    pub json: bool,
}

/// Options of `list` after clap parsing.
pub struct ListOptions<'a> {
    pub filter: &'a FilterArgs,
    pub orders: &'a [String],
    pub page: u32,
    pub size: Option<u32>,
    pub select: Option<&'a str>,
    pub exclude: Option<&'a str>,
}

impl Session {
    fn query<E: Entity>(&self) -> QueryRepository<E, SqliteExecutor> {
        QueryRepository::new(self.db.clone())
    }

    fn command<E: Entity>(&self) -> CommandRepository<E, SqliteExecutor> {
        CommandRepository::new(self.db.clone())
    }

    fn pagination(&self, page: u32, size: Option<u32>) -> CliResult<Pagination> {
        let size = size.unwrap_or(self.config.page_size());
        let max = self.config.max_page_size();
        if size > max {
            return Err(CliError::argument(
                "page size",
                &size.to_string(),
                format!("must not exceed {max}"),
            ));
        }
        Ok(Pagination::new(page, size)?)
    }
}

pub fn init(session: &Session) -> CliResult<()> {
    session.db.execute_batch(&session.ctx, SCHEMA)?;
    info!("Database tables are ready");
    Ok(())
}

pub fn list<E: Entity>(session: &Session, opts: ListOptions<'_>) -> CliResult<()> {
    let orders = opts
        .orders
        .iter()
        .map(|o| parse_order::<E>(o))
        .collect::<CliResult<Vec<_>>>()?;

    let mut repo = session
        .query::<E>()
        .filter(parse_filter(opts.filter)?)
        .order_by(orders)
        .paginate(session.pagination(opts.page, opts.size)?);

    if let Some(select) = opts.select {
        repo = repo.select(FieldList::<E>::parse(select)?.iter());
    }
    if let Some(exclude) = opts.exclude {
        repo = repo.exclude(FieldList::<E>::parse(exclude)?.iter());
    }

    let rows = repo.list(&session.ctx)?;
    debug!(table = E::schema().table, rows = rows.len(), "listed rows");
    print_rows(&rows, &repo.fields(), session.json)
}

pub fn count<E: Entity>(session: &Session, filter: &FilterArgs) -> CliResult<()> {
    let count = session
        .query::<E>()
        .filter(parse_filter(filter)?)
        .count(&session.ctx)?;
    print_count(E::schema().table, count, session.json)
}

pub fn get<E: Entity>(session: &Session, id: i64) -> CliResult<()> {
    let repo = session.query::<E>().filter(Filter::by_primary_key(id));
    let row = repo.one(&session.ctx)?;
    print_rows(&[row], &repo.fields(), session.json)
}

pub fn delete<E: Entity>(
    session: &Session,
    id: Option<i64>,
    filter: &FilterArgs,
) -> CliResult<()> {
    let repo = session.command::<E>();
    let removed = match id {
        Some(id) => repo.delete(&session.ctx, id)?,
        None => repo.delete_list(&session.ctx, parse_filter(filter)?)?,
    };

    let table = E::schema().table;
    if removed == 0 {
        info!("No {} matched", Colored(Cyan, table));
    } else {
        info!("Deleted {} row(s) from {}", Colored(Red, removed), Colored(Cyan, table));
    }
    Ok(())
}

fn insert<E: Entity>(session: &Session, entity: E) -> CliResult<i64> {
    let result = session.command::<E>().insert(&session.ctx, entity)?;
    let id = result.last_insert_id();
    info!(
        "Added {} {}",
        Colored(Cyan, E::schema().table),
        Colored(Green, format!("#{id}"))
    );
    Ok(id)
}

pub fn add_product(session: &Session, args: ProductArgs) -> CliResult<i64> {
    let product = Product {
        product_id: 0,
        product_category_fkid: args.category,
        admin_fkid: args.admin,
        name: args.name,
        price: args.price,
        description: args.description,
        qty: args.qty,
        image: args.image,
        label: args.label,
    };
    insert(session, product)
}

pub fn add_user(session: &Session, args: UserArgs) -> CliResult<i64> {
    let now = timestamp();
    let user = User {
        user_id: 0,
        photo: args.photo,
        username: args.username,
        email: args.email,
        password: args.password,
        name: args.name,
        created_at: now.clone(),
        updated_at: now,
    };
    insert(session, user)
}

/// Applies `--set` assignments to the row named by id, or to every row the
/// filter matches.
pub fn update<E: Entity + Assign + Default>(
    session: &Session,
    args: &UpdateArgs,
) -> CliResult<usize> {
    let (fields, pairs) = parse_assignments::<E>(&args.assignments)?;

    let mut entity = E::default();
    for (column, raw) in &pairs {
        entity.assign(column, raw)?;
    }

    let mut fields: Vec<Field<E>> = fields.iter().collect();
    if let Some(touched) = entity.touch() {
        let touched = Field::<E>::parse(touched)?;
        if fields.contains(&touched) {
            // an explicit value wins over the refreshed one
            if let Some((column, raw)) = pairs.iter().find(|(c, _)| *c == touched.as_str()) {
                entity.assign(column, raw)?;
            }
        } else {
            fields.push(touched);
        }
    }
    let fields = FieldList::from(fields);

    let repo = session.command::<E>();
    let changed = match args.id {
        Some(id) => repo.update_by_id(&session.ctx, &entity, id, fields)?,
        None => {
            let filter = parse_filter(&args.filter)?;
            repo.update_by_filter(&session.ctx, &entity, filter, fields)?
        }
    };

    info!(
        "Updated {} row(s) in {}",
        Colored(Green, changed),
        Colored(Cyan, E::schema().table)
    );
    Ok(changed)
}
