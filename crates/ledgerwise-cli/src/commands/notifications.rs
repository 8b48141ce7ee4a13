//! Notification command implementations

use anyhow::{Context, Result};
use ledgerwise_core::models::NotificationType;

use super::Finance;

pub async fn cmd_notifications(finance: &mut Finance, ack: Option<&str>) -> Result<()> {
    if let Some(id) = ack {
        let added = finance
            .acknowledge_notification(id)
            .await
            .context("Failed to save acknowledgement")?;
        if added {
            println!("✅ Acknowledged {}", id);
        } else {
            println!("Already acknowledged: {}", id);
        }
        if !finance.config().notifications.dedupe {
            println!("   Note: notifications.dedupe is off, so it will still be shown.");
        }
        return Ok(());
    }

    let notifications = &finance.analysis().notifications;
    if notifications.is_empty() {
        println!("✅ Nothing needs your attention.");
        return Ok(());
    }

    println!();
    println!("🔔 Notifications");
    println!("   ─────────────────────────────────────────────────────────────");
    for note in notifications {
        let icon = match note.kind {
            NotificationType::Warning => "⚠️ ",
            NotificationType::Info => "ℹ️ ",
        };
        println!("   {} {}", icon, note.message);
        println!("      id: {}", note.id);
    }

    Ok(())
}
