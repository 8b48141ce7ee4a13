//! Settings command implementations (balance, currency, profile)

use anyhow::{Context, Result};
use ledgerwise_core::format_currency;
use ledgerwise_core::models::{Currency, UserProfile};

use super::Finance;

pub async fn cmd_balance(finance: &mut Finance, amount: f64) -> Result<()> {
    finance
        .set_starting_balance(amount)
        .await
        .context("Failed to save starting balance")?;

    let currency = finance.currency();
    println!(
        "✅ Starting balance set to {}",
        format_currency(amount, &currency)
    );
    println!(
        "   Current balance: {}",
        format_currency(finance.analysis().summary.balance, &currency)
    );
    Ok(())
}

pub async fn cmd_currency(
    finance: &mut Finance,
    symbol: Option<&str>,
    code: Option<&str>,
    reset: bool,
) -> Result<()> {
    if reset {
        finance.set_currency(None).await.context("Failed to save currency")?;
        let currency = finance.currency();
        println!("✅ Currency reset to {} ({})", currency.symbol, currency.code);
        return Ok(());
    }

    if symbol.is_none() && code.is_none() {
        let currency = finance.currency();
        println!("💱 Currency: {} ({})", currency.symbol, currency.code);
        return Ok(());
    }

    let current = finance.currency();
    let currency = Currency {
        symbol: symbol.map(str::to_string).unwrap_or(current.symbol),
        code: code.map(str::to_uppercase).unwrap_or(current.code),
    };

    finance
        .set_currency(Some(currency.clone()))
        .await
        .context("Failed to save currency")?;
    println!("✅ Currency set to {} ({})", currency.symbol, currency.code);
    println!("   Amounts are displayed in this currency; nothing is converted.");
    Ok(())
}

pub async fn cmd_profile(finance: &mut Finance, name: Option<&str>, email: Option<&str>) -> Result<()> {
    if name.is_none() && email.is_none() {
        match finance.profile() {
            Some(profile) => {
                println!("👤 {}", profile.name);
                if let Some(email) = &profile.email {
                    println!("   {}", email);
                }
            }
            None => println!("No profile set. Use: ledgerwise profile --name <NAME>"),
        }
        return Ok(());
    }

    let current = finance.profile().cloned().unwrap_or_default();
    let profile = UserProfile {
        name: name.map(str::to_string).unwrap_or(current.name),
        email: email.map(str::to_string).or(current.email),
    };

    finance
        .set_profile(profile.clone())
        .await
        .context("Failed to save profile")?;
    println!("✅ Profile saved for {}", profile.name);
    Ok(())
}
