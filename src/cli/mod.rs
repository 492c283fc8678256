//! CLI module - Command-line interface for Hivekeep
//!
//! This module provides a structured CLI using clap for argument parsing.

mod commands;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use crate::models::HealthStatus;
use crate::services::{SortKey, SortOrder};

/// Hivekeep - Beehive inventory for beekeepers
/// Track hives, sales and QR labels from the terminal
#[derive(Parser)]
#[command(name = "hivekeep")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create default config file
    #[command(alias = "--init")]
    Init,

    /// Log in and store the session
    Login {
        username: String,
        /// Read from stdin when omitted
        #[arg(long)]
        password: Option<String>,
    },

    /// Forget the stored session
    Logout,

    /// Show the logged in user
    Whoami,

    /// Complete first-time setup with your business details
    Setup {
        #[arg(long)]
        business_name: String,
        #[arg(long)]
        contact_info: String,
    },

    /// Show or update the business profile
    Profile(ProfileArgs),

    /// List active hives
    #[command(alias = "ls", alias = "l")]
    List(ListArgs),

    /// List sold hives
    Sold(ListArgs),

    /// Show one hive
    #[command(alias = "i")]
    Show { serial: String },

    /// Add one hive
    #[command(alias = "a")]
    Add(HiveArgs),

    /// Add up to 100 identical hives
    BulkAdd {
        #[command(flatten)]
        hive: HiveArgs,
        #[arg(long, short = 'n')]
        quantity: usize,
    },

    /// Edit fields of a hive
    #[command(alias = "e")]
    Edit(EditArgs),

    /// Mark a hive sold today
    Sell { serial: String },

    /// Return a sold hive to the active list
    Unsell { serial: String },

    /// Delete a hive permanently
    #[command(alias = "rm")]
    Delete {
        serial: String,
        /// Skip the confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },

    /// Search hives by serial, date or notes
    #[command(alias = "s")]
    Search {
        #[arg(required = true)]
        query: Vec<String>,
    },

    /// Inventory counters and health breakdown
    Stats,

    /// Look up a hive by its public QR token
    Scan { token: String },

    /// Print the public QR link for a hive
    Qr { serial: String },

    /// Download a QR label sheet as PDF (remote mode)
    ExportPdf {
        #[arg(required = true)]
        serials: Vec<String>,
        #[arg(long, short = 'o', default_value = "beehive-qr-codes.pdf")]
        output: String,
    },

    /// Write three demo hives into an empty local store
    SeedDemo,

    /// Print an argon2 hash for account.password_hash
    HashPassword {
        /// Read from stdin when omitted
        password: Option<String>,
    },
}

#[derive(Args, Debug, Clone)]
pub struct ListArgs {
    #[arg(long, value_enum, default_value_t = SortKey::SerialNumber)]
    pub sort: SortKey,
    #[arg(long, value_enum, default_value_t = SortOrder::Asc)]
    pub order: SortOrder,
    #[arg(long, default_value_t = 1)]
    pub page: usize,
    #[arg(long, default_value_t = crate::constants::limits::DEFAULT_PAGE_SIZE)]
    pub per_page: usize,
    /// Substring over serial, dates and notes
    #[arg(long)]
    pub filter: Option<String>,
    #[arg(long)]
    pub import_date: Option<NaiveDate>,
    #[arg(long)]
    pub split_date: Option<NaiveDate>,
    #[arg(long)]
    pub sold_date: Option<NaiveDate>,
}

#[derive(Args, Debug, Clone)]
pub struct HiveArgs {
    /// YYYY-MM-DD
    #[arg(long)]
    pub import_date: NaiveDate,
    #[arg(long)]
    pub split_date: Option<NaiveDate>,
    /// Good, Normal or Weak
    #[arg(long, default_value = "Good")]
    pub health: HealthStatus,
    #[arg(long)]
    pub notes: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct EditArgs {
    pub serial: String,
    #[arg(long)]
    pub import_date: Option<NaiveDate>,
    #[arg(long, conflicts_with = "clear_split")]
    pub split_date: Option<NaiveDate>,
    #[arg(long)]
    pub clear_split: bool,
    #[arg(long)]
    pub health: Option<HealthStatus>,
    /// Pass an empty string to clear
    #[arg(long)]
    pub notes: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct ProfileArgs {
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long)]
    pub business_name: Option<String>,
    #[arg(long)]
    pub contact_info: Option<String>,
    #[arg(long)]
    pub custom_message: Option<String>,
    #[arg(long)]
    pub footer_text: Option<String>,
    #[arg(long)]
    pub show_farm_info: Option<bool>,
    #[arg(long)]
    pub show_owner_contact: Option<bool>,
    #[arg(long)]
    pub show_beehive_history: Option<bool>,
    #[arg(long)]
    pub show_health_status: Option<bool>,
}

pub use commands::*;
