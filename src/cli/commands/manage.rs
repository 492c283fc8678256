//! Commands that create, change or remove hives

use std::path::Path;

use super::hives::{print_detail, print_row};
use super::session::read_line;
use crate::cli::{EditArgs, HiveArgs};
use crate::models::{BeehivePatch, NewBeehive};
use crate::services::{View, bulk};
use crate::state::AppState;

fn new_hive(args: HiveArgs) -> NewBeehive {
    NewBeehive {
        import_date: args.import_date,
        split_date: args.split_date,
        health_status: args.health,
        notes: args.notes.filter(|n| !n.trim().is_empty()),
    }
}

pub async fn cmd_add(state: &AppState, args: HiveArgs) -> anyhow::Result<()> {
    let session = state.require(View::Protected).await?;
    let hive = state
        .settle(state.hives.create(&session, new_hive(args)).await)
        .await?;

    println!("✓ Added {}", hive.serial_number);
    println!();
    print_detail(&hive, &state.config.identifiers.public_base_url);
    Ok(())
}

pub async fn cmd_bulk_add(state: &AppState, args: HiveArgs, quantity: usize) -> anyhow::Result<()> {
    let session = state.require(View::Protected).await?;
    let template = new_hive(args);

    let report = state
        .settle(bulk::create_batch(state.hives.as_ref(), &session, &template, quantity).await)
        .await?;

    for hive in &report.created {
        print_row(hive);
    }
    for failure in &report.failures {
        println!("✗ #{}: {}", failure.index + 1, failure.error);
    }
    println!();
    println!("{}", report.summary());

    if report.session_rejected {
        state.store.clear_session().await?;
        anyhow::bail!("Session rejected partway. Run `hivekeep login <username>` again");
    }
    if !report.is_complete() {
        anyhow::bail!("{} hive(s) could not be created", report.failed());
    }
    Ok(())
}

pub async fn cmd_edit(state: &AppState, args: EditArgs) -> anyhow::Result<()> {
    let session = state.require(View::Protected).await?;

    let split_date = if args.clear_split {
        Some(None)
    } else {
        args.split_date.map(Some)
    };
    let patch = BeehivePatch {
        import_date: args.import_date,
        split_date,
        health_status: args.health,
        notes: args.notes,
        ..BeehivePatch::default()
    };

    if patch.is_empty() {
        anyhow::bail!("Nothing to change. Pass at least one field flag");
    }

    let hive = state
        .settle(state.hives.update(&session, &args.serial, patch).await)
        .await?;
    println!("✓ Updated {}", hive.serial_number);
    println!();
    print_detail(&hive, &state.config.identifiers.public_base_url);
    Ok(())
}

pub async fn cmd_sell(state: &AppState, serial: &str) -> anyhow::Result<()> {
    let session = state.require(View::Protected).await?;
    let hive = state.settle(state.hives.sell(&session, serial).await).await?;
    println!("✓ {} marked as sold", hive.serial_number);
    Ok(())
}

pub async fn cmd_unsell(state: &AppState, serial: &str) -> anyhow::Result<()> {
    let session = state.require(View::Protected).await?;
    let hive = state.settle(state.hives.unsell(&session, serial).await).await?;
    println!("✓ {} is active again", hive.serial_number);
    Ok(())
}

pub async fn cmd_delete(state: &AppState, serial: &str, yes: bool) -> anyhow::Result<()> {
    let session = state.require(View::Protected).await?;

    if !yes {
        let answer = read_line(&format!("Delete beehive {serial}? This cannot be undone [y/N]: "))?;
        if !answer.trim().eq_ignore_ascii_case("y") {
            println!("Cancelled.");
            return Ok(());
        }
    }

    state.settle(state.hives.delete(&session, serial).await).await?;
    println!("✓ Deleted {serial}");
    Ok(())
}

pub async fn cmd_export_pdf(
    state: &AppState,
    serials: &[String],
    output: &str,
) -> anyhow::Result<()> {
    let session = state.require(View::Protected).await?;
    let bytes = state
        .settle(state.hives.export_qr_pdf(&session, serials).await)
        .await?;

    let path = Path::new(output);
    tokio::fs::write(path, &bytes).await?;
    println!(
        "✓ Wrote {} QR label(s) to {} ({} bytes)",
        serials.len(),
        path.display(),
        bytes.len()
    );
    Ok(())
}

pub async fn cmd_seed_demo(state: &AppState) -> anyhow::Result<()> {
    let session = state.require(View::Protected).await?;
    let local = state.local_only("seed-demo")?;

    let count = state.settle(local.seed_demo(&session).await).await?;
    if count == 0 {
        println!("Store already holds hives, nothing seeded.");
    } else {
        println!("✓ Seeded {count} demo hives");
    }
    Ok(())
}
