use clap::{Parser, Subcommand};
use dialoguer::{Confirm, Input, Password};
use dotenvy::dotenv;
use schoolhub_cli::admin::create_admin;
use schoolhub_cli::seeder::{self, SeedConfig};
use schoolhub_config::DatabaseConfig;
use sqlx::PgPool;

#[derive(Parser)]
#[command(name = "schoolhub-cli")]
#[command(about = "SchoolHub CLI - Administrative tools for SchoolHub", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an administrator account
    CreateAdmin {
        #[arg(short = 'f', long)]
        first_name: Option<String>,

        #[arg(short = 'l', long)]
        last_name: Option<String>,

        #[arg(short = 'e', long)]
        email: Option<String>,

        /// Password (prompted securely if not provided)
        #[arg(short = 'p', long)]
        password: Option<String>,
    },
    /// Apply pending migrations
    Migrate,
    /// Drop every table and re-run migrations
    ResetDb {
        /// Skip the confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
    /// Seed the database with fake teachers, students, courses and books
    Seed {
        #[arg(long, default_value = "5")]
        teachers: usize,

        #[arg(long, default_value = "50")]
        students: usize,

        #[arg(long, default_value = "8")]
        courses: usize,

        #[arg(long, default_value = "40")]
        books: usize,
    },
    /// Remove seeded data (admins and real accounts are kept)
    ClearSeed,
}

#[tokio::main]
async fn main() {
    dotenv().ok();

    let cli = Cli::parse();

    let mut db_config = DatabaseConfig::from_env();
    db_config.max_connections = 5;
    db_config.min_connections = 1;

    let pool = schoolhub_db::init_db_pool(&db_config)
        .await
        .expect("Failed to connect to database");

    match cli.command {
        Commands::CreateAdmin {
            first_name,
            last_name,
            email,
            password,
        } => handle_create_admin(&pool, first_name, last_name, email, password).await,
        Commands::Migrate => handle_migrate(&pool).await,
        Commands::ResetDb { yes } => handle_reset_db(&pool, yes).await,
        Commands::Seed {
            teachers,
            students,
            courses,
            books,
        } => {
            let config = SeedConfig {
                teachers,
                students,
                courses,
                books,
            };
            handle_seed(&pool, config).await
        }
        Commands::ClearSeed => handle_clear_seed(&pool).await,
    }
}

fn prompt(value: Option<String>, label: &str) -> String {
    value.unwrap_or_else(|| {
        Input::new()
            .with_prompt(label)
            .interact_text()
            .unwrap_or_else(|e| fail(&format!("Failed to read {}", label.to_lowercase()), e))
    })
}

fn fail(context: &str, err: impl std::fmt::Display) -> ! {
    eprintln!("\n❌ {}: {}", context, err);
    std::process::exit(1);
}

async fn handle_create_admin(
    pool: &PgPool,
    first_name: Option<String>,
    last_name: Option<String>,
    email: Option<String>,
    password: Option<String>,
) {
    let first_name = prompt(first_name, "First name");
    let last_name = prompt(last_name, "Last name");
    let email = prompt(email, "Email address");
    let password = password.unwrap_or_else(|| {
        Password::new()
            .with_prompt("Password")
            .with_confirmation("Confirm password", "Passwords don't match")
            .interact()
            .unwrap_or_else(|e| fail("Failed to read password", e))
    });

    match create_admin(pool, &first_name, &last_name, &email, &password).await {
        Ok(id) => {
            println!("\n✅ Admin created successfully!");
            println!("   ID: {}", id);
            println!("   Email: {}", email.trim().to_lowercase());
            println!("   Name: {} {}", first_name, last_name);
        }
        Err(e) => fail("Error creating admin", e),
    }
}

async fn handle_migrate(pool: &PgPool) {
    match schoolhub_db::run_migrations(pool).await {
        Ok(()) => println!("✅ Migrations applied"),
        Err(e) => fail("Migration failed", e),
    }
}

async fn handle_reset_db(pool: &PgPool, yes: bool) {
    if !yes {
        let confirmed = Confirm::new()
            .with_prompt("This drops ALL tables and data. Continue?")
            .default(false)
            .interact()
            .unwrap_or(false);
        if !confirmed {
            println!("Aborted");
            return;
        }
    }

    match schoolhub_db::reset_database(pool).await {
        Ok(()) => println!("✅ Database reset and migrated"),
        Err(e) => fail("Reset failed", e),
    }
}

async fn handle_seed(pool: &PgPool, config: SeedConfig) {
    if let Err(e) = seeder::seed_all(pool, &config).await {
        fail("Error seeding database", e);
    }
}

async fn handle_clear_seed(pool: &PgPool) {
    if let Err(e) = seeder::clear_all(pool).await {
        fail("Error clearing seeded data", e);
    }
}
