//! Read-only hive commands

use crate::cli::ListArgs;
use crate::identifiers::public_url;
use crate::models::{Beehive, HealthStatus};
use crate::services::views::{self, HiveFilter, SoldState};
use crate::services::{SortKey, SortOrder, View};
use crate::state::AppState;

pub async fn cmd_list(state: &AppState, args: ListArgs, sold: bool) -> anyhow::Result<()> {
    let session = state.require(View::Protected).await?;
    let hives = state.settle(state.hives.list(&session).await).await?;

    let filter = HiveFilter {
        text: args.filter,
        import_date: args.import_date,
        split_date: args.split_date,
        sold_date: args.sold_date,
        sold: if sold {
            SoldState::Sold
        } else {
            SoldState::Active
        },
    };
    let mut selected: Vec<Beehive> = filter.apply(&hives).into_iter().cloned().collect();
    views::sort(&mut selected, args.sort, args.order);
    let page = views::paginate(&selected, args.page, args.per_page);

    let label = if sold { "Sold hives" } else { "Active hives" };
    if page.total == 0 {
        println!("{label}: none.");
        if !sold && hives.is_empty() {
            println!();
            println!("Add one with: hivekeep add --import-date YYYY-MM-DD");
        }
        return Ok(());
    }

    println!("{label} ({} total)", page.total);
    println!("{:-<70}", "");
    for hive in &page.items {
        print_row(hive);
    }
    println!();
    println!("Page {} of {}", page.page, page.total_pages.max(1));
    if page.has_next() {
        println!("Next: --page {}", page.page + 1);
    }

    if !sold {
        let (active, _) = views::partition_sold(&hives);
        let tally = views::health_tally(active);
        println!(
            "Health: {} Good | {} Normal | {} Weak",
            tally.good, tally.normal, tally.weak
        );
    }
    Ok(())
}

pub async fn cmd_show(state: &AppState, serial: &str) -> anyhow::Result<()> {
    let session = state.require(View::Protected).await?;
    let hive = state
        .settle(state.hives.find_by_serial(&session, serial).await)
        .await?
        .ok_or_else(|| anyhow::anyhow!("Beehive '{serial}' not found"))?;

    print_detail(&hive, &state.config.identifiers.public_base_url);
    Ok(())
}

pub async fn cmd_search(state: &AppState, query: &str) -> anyhow::Result<()> {
    let session = state.require(View::Protected).await?;
    let hives = state.settle(state.hives.list(&session).await).await?;

    let mut found: Vec<Beehive> = views::search(&hives, query).into_iter().cloned().collect();
    views::sort(&mut found, SortKey::SerialNumber, SortOrder::Asc);

    if found.is_empty() {
        println!("No hives match '{query}'.");
        return Ok(());
    }

    println!("Found {} hive(s) matching '{query}'", found.len());
    println!("{:-<70}", "");
    for hive in &found {
        print_row(hive);
    }
    Ok(())
}

pub async fn cmd_stats(state: &AppState) -> anyhow::Result<()> {
    let session = state.require(View::Protected).await?;
    let stats = state.settle(state.hives.stats(&session).await).await?;
    let hives = state.settle(state.hives.list(&session).await).await?;
    let (active, _) = views::partition_sold(&hives);
    let tally = views::health_tally(active);

    println!("Inventory");
    println!("{:-<40}", "");
    println!("Total:    {}", stats.total);
    println!("Active:   {}", stats.active);
    println!("Sold:     {}", stats.sold);
    println!("Healthy:  {}", stats.healthy);
    println!();
    println!("Active hives by health");
    for status in HealthStatus::ALL {
        println!("  {:<8} {}", status.as_str(), tally.get(status));
    }
    Ok(())
}

/// Public lookup. Works without a session, like the QR landing page.
pub async fn cmd_scan(state: &AppState, token: &str) -> anyhow::Result<()> {
    let Some(hive) = state.settle(state.hives.find_by_token(token).await).await? else {
        println!("No hive found for QR code '{token}'.");
        return Ok(());
    };

    println!("Beehive {}", hive.serial_number);
    println!("{:-<40}", "");
    println!("Imported:  {}", views::format_display_date(hive.import_date));
    if let Some(split) = hive.split_date {
        println!("Split:     {}", views::format_display_date(split));
    }
    println!("Health:    {}", hive.health_status);
    if let Some(species) = &hive.species {
        println!("Species:   {species}");
    }
    if hive.is_sold {
        println!("Status:    Sold");
    }
    Ok(())
}

pub async fn cmd_qr(state: &AppState, serial: &str) -> anyhow::Result<()> {
    let session = state.require(View::Protected).await?;
    let hive = state
        .settle(state.hives.find_by_serial(&session, serial).await)
        .await?
        .ok_or_else(|| anyhow::anyhow!("Beehive '{serial}' not found"))?;

    println!(
        "{}",
        public_url(&state.config.identifiers.public_base_url, &hive.qr_token)
    );
    Ok(())
}

pub(crate) fn print_row(hive: &Beehive) {
    let split = hive
        .split_date
        .map_or_else(|| "-".to_string(), views::format_display_date);
    let marker = match hive.health_status {
        HealthStatus::Good => "●",
        HealthStatus::Normal => "◐",
        HealthStatus::Weak => "○",
    };

    println!(
        "{marker} {:<8} imported {} | split {:<10} | {}",
        hive.serial_number,
        views::format_display_date(hive.import_date),
        split,
        hive.health_status
    );
    if let Some(sold) = hive.sold_date {
        println!("  sold {}", views::format_display_date(sold));
    }
}

pub(crate) fn print_detail(hive: &Beehive, public_base_url: &str) {
    println!("Beehive {}", hive.serial_number);
    println!("{:-<70}", "");
    println!("QR token:  {}", hive.qr_token);
    println!("QR link:   {}", public_url(public_base_url, &hive.qr_token));
    println!("Imported:  {}", views::format_display_date(hive.import_date));
    println!(
        "Split:     {}",
        hive.split_date
            .map_or_else(|| "-".to_string(), views::format_display_date)
    );
    println!("Health:    {}", hive.health_status);
    if let Some(species) = &hive.species {
        println!("Species:   {species}");
    }
    println!("Notes:     {}", hive.notes.as_deref().unwrap_or("-"));
    match hive.sold_date {
        Some(date) => println!("Status:    Sold on {}", views::format_display_date(date)),
        None => println!("Status:    Active"),
    }
    println!("Created:   {}", hive.created_at);
    println!("Updated:   {}", hive.updated_at);
}
