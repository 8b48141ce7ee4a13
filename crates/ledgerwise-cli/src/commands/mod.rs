//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `core` - Core commands (init, config, reset) and shared utilities (open_finance)
//! - `dashboard` - Full analysis view
//! - `import` - Statement import, privacy screen, CSV export
//! - `notifications` - Notification listing and acknowledgement
//! - `receipts` - Receipt capture
//! - `settings` - Starting balance, currency, profile
//! - `subscriptions` - Subscription management commands
//! - `transactions` - Transaction commands (add, list, delete, clear)
//! - `warranties` - Warranty management commands

pub mod core;
pub mod dashboard;
pub mod import;
pub mod notifications;
pub mod receipts;
pub mod settings;
pub mod subscriptions;
pub mod transactions;
pub mod warranties;

// Re-export command functions for main.rs
pub use core::*;
pub use dashboard::*;
pub use import::*;
pub use notifications::*;
pub use receipts::*;
pub use settings::*;
pub use subscriptions::*;
pub use transactions::*;
pub use warranties::*;

use std::io::{self, Write};

/// Truncate a string to a maximum number of characters, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Ask a yes/no question on stdin; anything but "y" is a no
pub fn confirm(question: &str) -> anyhow::Result<bool> {
    print!("{} [y/N] ", question);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().eq_ignore_ascii_case("y"))
}
