use anyhow::Context;
use aquadesk::modules::principals::{PgPrincipalStore, PrincipalStore};
use aquadesk_auth::{Principal, TokenCodec, VerificationFailure};
use aquadesk_cli::seeder;
use aquadesk_config::{DatabaseConfig, JwtConfig};
use aquadesk_db::{PgPool, init_db_pool};
use aquadesk_observability::init_basic_console_logging;
use clap::{Parser, Subcommand};
use dialoguer::Input;
use dotenvy::dotenv;

#[derive(Parser)]
#[command(name = "aquadesk-cli")]
#[command(about = "AquaDesk CLI - Administrative tools for AquaDesk", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the standard roles and privileges
    SeedRoles,
    /// Seed the database with fake users holding random standard roles
    SeedUsers {
        /// Number of users to create
        #[arg(short = 'c', long, default_value = "20")]
        count: usize,
    },
    /// Sign an access and a refresh token for a user
    IssueToken {
        /// User ID (prompted if not provided)
        #[arg(short = 'u', long)]
        user_id: Option<String>,
    },
    /// Verify a token and print its claims
    InspectToken {
        /// The signed token
        token: String,
    },
    /// Print the live principal of a user
    ResolveUser {
        /// User ID
        user_id: String,
    },
}

#[tokio::main]
async fn main() {
    dotenv().ok();
    init_basic_console_logging();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::SeedRoles => handle_seed_roles().await,
        Commands::SeedUsers { count } => handle_seed_users(count).await,
        Commands::IssueToken { user_id } => handle_issue_token(user_id).await,
        Commands::InspectToken { token } => handle_inspect_token(&token),
        Commands::ResolveUser { user_id } => handle_resolve_user(&user_id).await,
    };

    if let Err(e) = result {
        eprintln!("\n❌ Error: {e:#}");
        std::process::exit(1);
    }
}

async fn connect() -> anyhow::Result<PgPool> {
    let config = DatabaseConfig {
        max_connections: 5,
        run_migrations: false,
        ..DatabaseConfig::from_env()
    };
    init_db_pool(&config).await
}

async fn load_principal(pool: &PgPool, user_id: &str) -> anyhow::Result<Principal> {
    let store = PgPrincipalStore::new(pool.clone());
    let record = store
        .load_principal(user_id)
        .await
        .with_context(|| format!("Could not load user {user_id}"))?;
    Ok(record.into_principal())
}

async fn handle_seed_roles() -> anyhow::Result<()> {
    let pool = connect().await?;
    let seeded = seeder::seed_roles(&pool).await?;

    let mut roles: Vec<_> = seeded.roles.into_iter().collect();
    roles.sort();
    for (name, id) in roles {
        println!("   {name}: {id}");
    }
    Ok(())
}

async fn handle_seed_users(count: usize) -> anyhow::Result<()> {
    let pool = connect().await?;
    seeder::seed_users(&pool, count).await?;
    Ok(())
}

async fn handle_issue_token(user_id: Option<String>) -> anyhow::Result<()> {
    let user_id = match user_id {
        Some(id) => id,
        None => Input::new().with_prompt("User ID").interact_text()?,
    };

    let pool = connect().await?;
    let principal = load_principal(&pool, &user_id).await?;

    let codec = TokenCodec::new(&JwtConfig::from_env());
    let access = codec.sign_access(&principal).map_err(|e| e.error)?;
    let refresh = codec
        .sign_refresh(&principal.user_id, &principal.email)
        .map_err(|e| e.error)?;
    tracing::info!(user_id = %principal.user_id, "Issued access and refresh tokens");

    println!("\n✅ Tokens issued for {} <{}>", principal.full_name, principal.email);
    println!("   Roles: {:?}", principal.roles);
    println!("   Privileges: {:?}", principal.privileges);
    println!("\naccessToken (expires at {}):\n{}", access.expires_at, access.token);
    println!("\nrefreshToken (expires at {}):\n{}", refresh.expires_at, refresh.token);
    Ok(())
}

fn handle_inspect_token(token: &str) -> anyhow::Result<()> {
    let codec = TokenCodec::new(&JwtConfig::from_env());

    let rendered = match codec.verify_access(token) {
        Ok(claims) => ("access", serde_json::to_string_pretty(&claims)?),
        Err(VerificationFailure::WrongKind { .. }) => {
            let claims = codec.verify_refresh(token)?;
            ("refresh", serde_json::to_string_pretty(&claims)?)
        }
        Err(failure) => anyhow::bail!("Token rejected ({}): {failure}", failure.reason()),
    };

    println!("✅ Valid {} token", rendered.0);
    println!("{}", rendered.1);
    Ok(())
}

async fn handle_resolve_user(user_id: &str) -> anyhow::Result<()> {
    let pool = connect().await?;
    let principal = load_principal(&pool, user_id).await?;
    println!("{}", serde_json::to_string_pretty(&principal)?);
    Ok(())
}
