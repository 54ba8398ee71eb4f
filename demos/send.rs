use std::env;

use mandrill_client::{Client, Message, SendStatus};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let key = env::var("MANDRILL_KEY")?;
    let to = env::args().nth(1).ok_or("usage: send <recipient>")?;

    let client = Client::new(key)?;
    client.ping().await?;
    println!("API key OK");

    let msg = Message::with_recipient(&to, "")
        .subject("Hello from mandrill-client")
        .from_email("noreply@example.com")
        .from_name("mandrill-client demo")
        .html("<p>It works.</p>")
        .text("It works.")
        .add_tags(["demo"])
        .add_metadata_field("source", "demo");

    for result in client.send(&msg, false).await? {
        match result.status {
            SendStatus::Rejected | SendStatus::Invalid => println!(
                "{}: {:?} ({})",
                result.email,
                result.status,
                result.rejection_reason.as_deref().unwrap_or("no reason")
            ),
            status => println!("{}: {:?} id={}", result.email, status, result.id),
        }
    }

    Ok(())
}
