mod gateway;
mod runtime;

use anyhow::Context;
use clap::{Parser, Subcommand};
use parley_config::load as load_config;
use parley_users::RegisterRequest;
use runtime::{telemetry, BackendServices};
use sqlx::Row;
use tokio::net::TcpListener;
use tracing::info;

#[derive(Parser)]
#[command(name = "parley-backend")]
#[command(about = "Parley chat backend")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server (default)
    Serve,
    /// Dump users, rooms and messages from the database
    DumpData,
    /// Seed the database with test data
    SeedData,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => run_server().await,
        Commands::DumpData => dump_data().await,
        Commands::SeedData => seed_data().await,
    }
}

async fn run_server() -> anyhow::Result<()> {
    telemetry::init_tracing().context("failed to initialise tracing")?;

    info!("starting Parley backend");

    let config = load_config().context("failed to load configuration")?;

    let services = BackendServices::initialise(&config)
        .await
        .context("failed to initialise backend services")?;

    let state = gateway::AppState::from_services(&services);
    let app = gateway::create_router(state);

    let address = format!("{}:{}", config.http.address, config.http.port);
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind http listener on {address}"))?;

    info!(%address, "http server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(runtime::shutdown_signal())
        .await
        .context("http server error")?;

    info!("backend shut down");
    Ok(())
}

async fn dump_data() -> anyhow::Result<()> {
    telemetry::init_tracing().context("failed to initialise tracing")?;

    info!("dumping data from database");

    let config = load_config().context("failed to load configuration")?;

    let services = BackendServices::initialise(&config)
        .await
        .context("failed to initialise backend services")?;

    let users = sqlx::query(
        r#"
        SELECT id, username, email, active, last_seen
        FROM users
        ORDER BY id ASC
        "#,
    )
    .fetch_all(&services.db_pool)
    .await
    .context("failed to fetch users")?;

    println!("=== USERS ===");
    if users.is_empty() {
        println!("No users found in database");
    } else {
        println!("Found {} users:", users.len());
        println!(
            "{:<5} {:<20} {:<30} {:<8} {:<25}",
            "ID", "Username", "Email", "Active", "Last Seen"
        );
        println!("{}", "-".repeat(90));

        for user in users {
            let id: i64 = user.get("id");
            let username: String = user.get("username");
            let email: String = user.get("email");
            let active: bool = user.get("active");
            let last_seen: String = user.get("last_seen");

            println!(
                "{:<5} {:<20} {:<30} {:<8} {:<25}",
                id, username, email, active, last_seen
            );
        }
    }

    println!("\n=== ROOMS ===");
    let rooms = sqlx::query(
        r#"
        SELECT r.id, r.name, r.created_at, COUNT(rm.user_id) AS member_count
        FROM rooms r
        LEFT JOIN room_members rm ON rm.room_id = r.id
        GROUP BY r.id
        ORDER BY r.created_at ASC
        "#,
    )
    .fetch_all(&services.db_pool)
    .await
    .context("failed to fetch rooms")?;

    if rooms.is_empty() {
        println!("No rooms found in database");
    } else {
        println!("Found {} rooms:", rooms.len());
        println!(
            "{:<5} {:<30} {:<10} {:<25}",
            "ID", "Name", "Members", "Created At"
        );
        println!("{}", "-".repeat(75));

        for room in rooms {
            let id: i64 = room.get("id");
            let name: String = room.get("name");
            let member_count: i64 = room.get("member_count");
            let created_at: String = room.get("created_at");

            println!(
                "{:<5} {:<30} {:<10} {:<25}",
                id, name, member_count, created_at
            );
        }
    }

    println!("\n=== MESSAGES ===");
    let messages = sqlx::query(
        r#"
        SELECT m.id, r.name AS roomname, m.username, m.text, m.created_at
        FROM messages m
        JOIN rooms r ON r.id = m.room_id
        ORDER BY m.created_at ASC, m.id ASC
        "#,
    )
    .fetch_all(&services.db_pool)
    .await
    .context("failed to fetch messages")?;

    if messages.is_empty() {
        println!("No messages found in database");
    } else {
        println!("Found {} messages:", messages.len());
        println!(
            "{:<5} {:<20} {:<20} {:<50} {:<25}",
            "ID", "Room", "Author", "Text (truncated)", "Created At"
        );
        println!("{}", "-".repeat(125));

        for message in messages {
            let id: i64 = message.get("id");
            let roomname: String = message.get("roomname");
            let username: String = message.get("username");
            let text: String = message.get("text");
            let created_at: String = message.get("created_at");

            let text_display = truncate_for_display(&text, 47);

            println!(
                "{:<5} {:<20} {:<20} {:<50} {:<25}",
                id, roomname, username, text_display, created_at
            );
        }
    }

    Ok(())
}

/// Shorten text to at most `max_chars` characters for table output,
/// cutting on character boundaries so multibyte text never panics.
fn truncate_for_display(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }

    let cut: String = text.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{cut}...")
}

async fn seed_data() -> anyhow::Result<()> {
    telemetry::init_tracing().context("failed to initialise tracing")?;

    info!("seeding database with test data");

    let config = load_config().context("failed to load configuration")?;

    let services = BackendServices::initialise(&config)
        .await
        .context("failed to initialise backend services")?;

    let alice = services
        .user_service
        .register(RegisterRequest {
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            password: "alice-password".to_string(),
            photo_url: None,
        })
        .await
        .context("failed to register alice")?;

    let bob = services
        .user_service
        .register(RegisterRequest {
            username: "bob".to_string(),
            email: "bob@example.com".to_string(),
            password: "bob-password".to_string(),
            photo_url: None,
        })
        .await
        .context("failed to register bob")?;

    services
        .user_service
        .add_friend(alice.id, bob.id)
        .await
        .context("failed to befriend test users")?;

    services
        .room_service
        .create_room("lounge")
        .await
        .context("failed to create test room")?;
    services
        .room_service
        .join("lounge", alice.id)
        .await
        .context("failed to add alice to test room")?;
    services
        .room_service
        .join("lounge", bob.id)
        .await
        .context("failed to add bob to test room")?;

    services
        .message_service
        .post("lounge", "alice", "Welcome to the lounge!")
        .await
        .context("failed to post test message")?;

    println!("Database seeded with test data:");
    println!("- 2 users created (alice, bob), friends with each other");
    println!("- 1 room created (lounge) with both users as members");
    println!("- 1 message posted");
    println!("Run 'dump-data' to see the inserted data");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_keeps_short_text_untouched() {
        assert_eq!(truncate_for_display("hello", 47), "hello");
        assert_eq!(truncate_for_display("", 47), "");
    }

    #[test]
    fn test_truncate_shortens_long_text_with_ellipsis() {
        let long = "x".repeat(60);
        let display = truncate_for_display(&long, 47);
        assert_eq!(display.chars().count(), 47);
        assert!(display.ends_with("..."));
    }

    #[test]
    fn test_truncate_handles_multibyte_text() {
        // 50 three-byte chars: no char boundary sits at byte 44.
        let euros = "€".repeat(50);
        let display = truncate_for_display(&euros, 47);
        assert_eq!(display, format!("{}...", "€".repeat(44)));
    }
}
