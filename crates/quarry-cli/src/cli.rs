use clap::{ArgAction, Args as ClapArgs, Parser, Subcommand, ValueEnum, ValueHint};

#[derive(Parser)]
#[command(
    author,
    version,
    about,
    help_template = "{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}",
    arg_required_else_help = true
)]
pub struct Args {
    /// Set output verbosity
    #[arg(short = 'v', long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress outputs
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output as json
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Disable colors in output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Provide custom config file
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<String>,

    #[clap(subcommand)]
    pub command: Commands,
}

/// Tables the CLI knows about.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum EntityKind {
    #[value(alias = "product")]
    Products,
    #[value(alias = "user")]
    Users,
}

/// Row selection shared by every read and write command.
#[derive(ClapArgs, Debug, Default)]
pub struct FilterArgs {
    /// Condition as `column:operator[:value]`, e.g. `price:>=:100` or
    /// `label:is null`. `in`/`not in` take comma separated values
    #[arg(short = 'w', long = "where", value_name = "COND")]
    pub conditions: Vec<String>,

    /// Match rows satisfying any condition instead of all of them
    #[arg(long)]
    pub any: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create the bundled tables if they do not exist
    Init,

    /// Print the effective configuration
    Config {
        /// Write a documented default config file instead
        #[arg(long)]
        init: bool,
    },

    /// List rows
    #[command(arg_required_else_help = true)]
    #[clap(name = "list", visible_alias = "ls")]
    List {
        entity: EntityKind,

        #[command(flatten)]
        filter: FilterArgs,

        /// Sort by `column[:asc|desc]`; repeat for secondary keys
        #[arg(short, long = "order", value_name = "ORDER")]
        orders: Vec<String>,

        /// Page number, starting at 1
        #[arg(short, long, default_value_t = 1)]
        page: u32,

        /// Rows per page (default from config)
        #[arg(short, long)]
        size: Option<u32>,

        /// Comma separated columns to show
        #[arg(long, conflicts_with = "exclude")]
        select: Option<String>,

        /// Comma separated columns to hide
        #[arg(long)]
        exclude: Option<String>,
    },

    /// Count rows
    #[command(arg_required_else_help = true)]
    Count {
        entity: EntityKind,

        #[command(flatten)]
        filter: FilterArgs,
    },

    /// Show one row by primary key
    #[command(arg_required_else_help = true)]
    Get { entity: EntityKind, id: i64 },

    /// Delete rows by primary key or filter
    #[command(arg_required_else_help = true)]
    #[clap(name = "delete", visible_alias = "rm")]
    Delete {
        entity: EntityKind,

        /// Primary key of the row to delete
        #[arg(required_unless_present = "conditions", conflicts_with = "conditions")]
        id: Option<i64>,

        #[command(flatten)]
        filter: FilterArgs,
    },

    /// Insert a row
    #[command(subcommand)]
    Add(AddCommand),

    /// Update columns of existing rows
    #[command(subcommand)]
    Update(UpdateCommand),
}

#[derive(Subcommand)]
pub enum AddCommand {
    /// Insert a product
    Product(ProductArgs),
    /// Insert a user
    User(UserArgs),
}

#[derive(ClapArgs, Debug)]
pub struct ProductArgs {
    #[arg(long)]
    pub name: String,

    #[arg(long)]
    pub price: f64,

    #[arg(long, default_value_t = 0)]
    pub qty: i64,

    #[arg(long)]
    pub category: Option<i64>,

    #[arg(long)]
    pub admin: Option<i64>,

    #[arg(long)]
    pub description: Option<String>,

    #[arg(long)]
    pub image: Option<String>,

    #[arg(long)]
    pub label: Option<String>,
}

#[derive(ClapArgs, Debug)]
pub struct UserArgs {
    #[arg(long)]
    pub username: String,

    #[arg(long)]
    pub email: String,

    #[arg(long, default_value = "")]
    pub password: String,

    #[arg(long)]
    pub name: Option<String>,

    #[arg(long)]
    pub photo: Option<String>,
}

#[derive(Subcommand)]
pub enum UpdateCommand {
    /// Update a product
    Product(UpdateArgs),
    /// Update a user
    User(UpdateArgs),
}

#[derive(ClapArgs, Debug)]
pub struct UpdateArgs {
    /// Primary key of the row to update; omit to update by `--where`
    #[arg(required_unless_present = "conditions", conflicts_with = "conditions")]
    pub id: Option<i64>,

    /// Assignment as `column=value`; repeat for several columns
    #[arg(long = "set", value_name = "ASSIGN", required = true)]
    pub assignments: Vec<String>,

    #[command(flatten)]
    pub filter: FilterArgs,
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_is_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_list_flags() {
        let args = Args::parse_from([
            "quarry", "list", "product", "-w", "price:>=:100", "--order", "price:desc",
            "--page", "2", "--size", "5", "--exclude", "description",
        ]);
        let Commands::List {
            entity,
            filter,
            orders,
            page,
            size,
            exclude,
            ..
        } = args.command
        else {
            panic!("expected list");
        };
        assert_eq!(entity, EntityKind::Products);
        assert_eq!(filter.conditions, vec!["price:>=:100"]);
        assert_eq!(orders, vec!["price:desc"]);
        assert_eq!((page, size), (2, Some(5)));
        assert_eq!(exclude.as_deref(), Some("description"));
    }

    #[test]
    fn test_select_conflicts_with_exclude() {
        let res = Args::try_parse_from([
            "quarry", "list", "users", "--select", "name", "--exclude", "email",
        ]);
        assert!(res.is_err());
    }

    #[test]
    fn test_delete_needs_id_or_filter() {
        assert!(Args::try_parse_from(["quarry", "delete", "users"]).is_err());
        assert!(Args::try_parse_from(["quarry", "delete", "users", "3"]).is_ok());
        assert!(Args::try_parse_from(["quarry", "delete", "users", "-w", "name:like:%x%"]).is_ok());
    }
}
