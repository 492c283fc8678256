pub mod storage_keys {

    pub const CURRENT_USER: &str = "kbee_current_user";

    pub const BEEHIVES: &str = "kbee_beehives";

    pub const SETUP_COMPLETE: &str = "kbee_setup_complete";
}

pub mod identifiers {

    pub const SERIAL_PREFIX: &str = "TO";

    pub const SERIAL_WIDTH: usize = 3;

    pub const QR_TOKEN_LENGTH: usize = 12;

    pub const QR_TOKEN_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

    pub const MAX_TOKEN_ATTEMPTS: u32 = 8;
}

pub mod limits {

    pub const MIN_BULK_QUANTITY: usize = 1;

    pub const MAX_BULK_QUANTITY: usize = 100;

    pub const MAX_NOTES_LENGTH: usize = 1000;

    pub const MAX_BUSINESS_NAME_LENGTH: usize = 200;

    pub const DEFAULT_PAGE_SIZE: usize = 20;

    pub const MAX_PAGE_SIZE: usize = 100;
}

pub mod auth {

    /// Password accepted by the local account when no hash is configured.
    pub const BOOTSTRAP_PASSWORD: &str = "admin123";

    pub const DEFAULT_USERNAME: &str = "admin";
}
