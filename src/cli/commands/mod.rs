mod hives;
mod manage;
mod session;

pub use hives::{cmd_list, cmd_qr, cmd_scan, cmd_search, cmd_show, cmd_stats};
pub use manage::{
    cmd_add, cmd_bulk_add, cmd_delete, cmd_edit, cmd_export_pdf, cmd_seed_demo, cmd_sell,
    cmd_unsell,
};
pub use session::{
    cmd_hash_password, cmd_init, cmd_login, cmd_logout, cmd_profile, cmd_setup, cmd_whoami,
};
