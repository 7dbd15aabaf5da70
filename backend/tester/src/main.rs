use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use book::{ErrorResponse, WishResponse, WishesResponse};
use clap::Parser;
use reqwest::{
    Client,
    multipart::{Form, Part},
};

/// Posts a wish to a running server and prints the wall back.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    #[arg(long, default_value = "http://localhost:4000")]
    url: String,

    #[arg(long, default_value = "Tester")]
    name: String,

    #[arg(long, default_value = "Happy birthday!")]
    message: String,

    /// jpg, png or webp
    #[arg(long)]
    image: Option<PathBuf>,
}

fn mime_for(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        _ => "application/octet-stream",
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let client = Client::new();
    let endpoint = format!("{}/api/wishes", args.url.trim_end_matches('/'));

    let mut form = Form::new()
        .text("name", args.name.clone())
        .text("message", args.message.clone());

    if let Some(path) = &args.image {
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("reading {}", path.display()))?;
        println!("Image size in bytes: {}", bytes.len());

        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());
        let part = Part::bytes(bytes)
            .file_name(file_name)
            .mime_str(mime_for(path))?;
        form = form.part("image", part);
    }

    let response = client.post(&endpoint).multipart(form).send().await?;
    let status = response.status();
    println!("POST {endpoint}: {status}");

    if !status.is_success() {
        let ErrorResponse { error } = response.json().await?;
        bail!("submission rejected: {error}");
    }

    let WishResponse { wish } = response.json().await?;
    println!("Stored wish {} at {}", wish.id, wish.created_at);

    let WishesResponse { wishes } = client.get(&endpoint).send().await?.json().await?;
    println!("Wall now holds {} wishes\n", wishes.len());

    for wish in &wishes {
        let image = wish.image_url.as_deref().unwrap_or("-");
        println!("[{}] {}: {} ({image})", wish.created_at, wish.name, wish.message);
    }

    match wishes.first() {
        Some(first) if first.id == wish.id => Ok(()),
        _ => bail!("new wish is not at the head of the wall"),
    }
}
