//! Opens Notepad, types a line, clicks the save button if it can see it, and closes.
//!
//! ```text
//! RUST_LOG=debug cargo run --example notepad_smoke -- path/to/save_button.png
//! ```

use anyhow::{bail, Result};
use std::time::Duration;
use visual::Desktop;

#[tokio::main]
async fn main() -> Result<()> {
    visual::init_tracing();

    let button = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "save_button.png".to_string());

    let desktop = Desktop::new();
    let mut notepad = desktop.app("notepad");
    if !notepad.open(None) {
        bail!("failed to open Notepad");
    }
    tokio::time::sleep(Duration::from_secs(1)).await;

    if desktop.keyboard().type_text("Hello, World!", None) {
        println!("Successfully typed text");
    } else {
        println!("Failed to type text");
    }

    let screen = desktop.screen();
    if screen.find(&button, None).await.is_some() {
        if screen.click(button.as_str(), None).await {
            println!("Successfully clicked save button");
        }
    } else {
        println!("Save button not found");
    }

    if !notepad.close() {
        println!("Failed to close Notepad");
    }
    Ok(())
}
