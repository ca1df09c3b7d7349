//! Terminal input and status lines.

use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};

/// Prints `question` and reads one trimmed line from stdin.
pub async fn prompt(question: &str) -> std::io::Result<String> {
    print!("{question}");
    std::io::stdout().flush()?;

    let mut line = String::new();
    BufReader::new(tokio::io::stdin())
        .read_line(&mut line)
        .await?;
    Ok(line.trim().to_string())
}

pub fn ok(message: &str) {
    println!("  [OK] {message}");
}

pub fn warn(message: &str) {
    println!("  [WARN] {message}");
}

pub fn error(message: &str) {
    eprintln!("  [ERROR] {message}");
}

pub fn title(message: &str) {
    println!("{message}");
    println!("{}", "=".repeat(message.chars().count()));
    println!();
}
