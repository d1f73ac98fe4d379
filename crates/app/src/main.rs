//! Folio Application CLI

use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use folio::prices::Price;
use folio_app::{
    database::{self, Db},
    domain::{
        books::{
            BooksService, PgBooksService,
            models::{BookUuid, NewBook},
        },
        users::models::UserUuid,
        vouchers::{
            PgVouchersService, VouchersService, data::NewUserVoucher, models::VoucherUuid,
        },
    },
    uuids::TypedUuid,
};
use uuid::Uuid;

#[derive(Debug, Parser)]
#[command(name = "folio-app", about = "Folio CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    Book(BookCommand),
    Voucher(VoucherCommand),
}

#[derive(Debug, Args)]
struct BookCommand {
    #[command(subcommand)]
    command: BookSubcommand,
}

#[derive(Debug, Subcommand)]
enum BookSubcommand {
    Create(CreateBookArgs),
}

#[derive(Debug, Args)]
struct CreateBookArgs {
    /// URL-safe catalog slug
    #[arg(long)]
    slug: String,

    /// Display title
    #[arg(long)]
    title: String,

    /// Decimal price, e.g. 24.99
    #[arg(long)]
    price: String,

    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL")]
    database_url: String,
}

#[derive(Debug, Args)]
struct VoucherCommand {
    #[command(subcommand)]
    command: VoucherSubcommand,
}

#[derive(Debug, Subcommand)]
enum VoucherSubcommand {
    Assign(AssignVoucherArgs),
}

#[derive(Debug, Args)]
struct AssignVoucherArgs {
    /// User UUID
    #[arg(long)]
    user_uuid: Uuid,

    /// Voucher UUID
    #[arg(long)]
    voucher_uuid: Uuid,

    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL")]
    database_url: String,
}

#[tokio::main]
pub async fn main() -> ExitCode {
    let _env = dotenvy::dotenv();

    let cli = Cli::parse();

    if let Err(error) = run(cli).await {
        eprintln!("{error}");

        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

async fn run(cli: Cli) -> Result<(), String> {
    match cli.command {
        Commands::Book(BookCommand {
            command: BookSubcommand::Create(args),
        }) => create_book(args).await,
        Commands::Voucher(VoucherCommand {
            command: VoucherSubcommand::Assign(args),
        }) => assign_voucher(args).await,
    }
}

async fn connect(database_url: &str) -> Result<Db, String> {
    let pool = database::connect(database_url)
        .await
        .map_err(|error| format!("failed to connect to database: {error}"))?;

    Ok(Db::new(pool))
}

async fn create_book(args: CreateBookArgs) -> Result<(), String> {
    let price = Price::parse_decimal(&args.price)
        .map_err(|error| format!("invalid price {:?}: {error}", args.price))?;

    let db = connect(&args.database_url).await?;
    let service = PgBooksService::new(db);

    let book = service
        .create_book(NewBook {
            uuid: BookUuid::generate(),
            slug: args.slug,
            title: args.title,
            price,
        })
        .await
        .map_err(|error| format!("failed to create book: {error}"))?;

    println!("book_uuid: {}", book.uuid);
    println!("slug: {}", book.slug);
    println!("price: {}", book.price);

    Ok(())
}

async fn assign_voucher(args: AssignVoucherArgs) -> Result<(), String> {
    let db = connect(&args.database_url).await?;
    let service = PgVouchersService::new(db);

    let assignment = service
        .assign(NewUserVoucher {
            uuid: TypedUuid::generate(),
            user_uuid: UserUuid::from_uuid(args.user_uuid),
            voucher_uuid: VoucherUuid::from_uuid(args.voucher_uuid),
        })
        .await
        .map_err(|error| format!("failed to assign voucher: {error}"))?;

    println!("user_voucher_uuid: {}", assignment.uuid);
    println!("user_uuid: {}", assignment.user_uuid);
    println!("voucher_uuid: {}", assignment.voucher_uuid);

    Ok(())
}
