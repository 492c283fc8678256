//! `BeehiveService` over the local record store.

use async_trait::async_trait;
use chrono::NaiveDate;
use tracing::{debug, info};

use crate::config::IdentifierConfig;
use crate::identifiers;
use crate::models::{Beehive, BeehivePatch, HealthStatus, NewBeehive, Session};
use crate::services::beehive_service::{BeehiveError, BeehiveService};
use crate::services::validation;
use crate::services::views::{self, HiveStats};
use crate::store::Store;

pub struct LocalBeehiveService {
    store: Store,
    ids: IdentifierConfig,
}

impl LocalBeehiveService {
    #[must_use]
    pub const fn new(store: Store, ids: IdentifierConfig) -> Self {
        Self { store, ids }
    }

    fn today() -> NaiveDate {
        chrono::Local::now().date_naive()
    }

    /// Every record regardless of owner. Seeds an empty list on first use.
    pub async fn list_all(&self) -> Result<Vec<Beehive>, BeehiveError> {
        if let Some(hives) = self.store.load_beehives().await? {
            return Ok(hives);
        }

        debug!("Beehive collection not initialised, seeding empty list");
        self.store.save_beehives(&[]).await?;
        Ok(Vec::new())
    }

    /// Appends a fully formed record. Serial uniqueness is the caller's job.
    pub async fn add(&self, hive: Beehive) -> Result<(), BeehiveError> {
        let mut hives = self.list_all().await?;
        hives.push(hive);
        self.store.save_beehives(&hives).await?;
        Ok(())
    }

    /// Writes the three demo hives for `session` if the store holds none.
    /// Returns how many were written.
    pub async fn seed_demo(&self, session: &Session) -> Result<usize, BeehiveError> {
        let hives = self.list_all().await?;
        if !hives.is_empty() {
            return Ok(0);
        }

        let date = |y, m, d| NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default();
        let demo = [
            (
                "TO001",
                "ABC123DEF456",
                date(2024, 1, 15),
                Some(date(2024, 2, 20)),
                HealthStatus::Good,
                "Colony developing well, high honey output",
            ),
            (
                "TO002",
                "GHI789JKL012",
                date(2024, 1, 20),
                None,
                HealthStatus::Normal,
                "Keep monitoring",
            ),
            (
                "TO003",
                "MNO345PQR678",
                date(2024, 2, 1),
                Some(date(2024, 3, 15)),
                HealthStatus::Good,
                "Split successfully",
            ),
        ];

        let seeded: Vec<Beehive> = demo
            .into_iter()
            .map(|(serial, token, import, split, status, notes)| {
                let stamp = format!("{import}T00:00:00+00:00");
                Beehive {
                    serial_number: serial.to_string(),
                    qr_token: token.to_string(),
                    import_date: import,
                    split_date: split,
                    health_status: status,
                    species: None,
                    notes: Some(notes.to_string()),
                    is_sold: false,
                    sold_date: None,
                    user_id: session.user_id().to_string(),
                    created_at: stamp.clone(),
                    updated_at: stamp,
                }
            })
            .collect();

        let count = seeded.len();
        self.store.save_beehives(&seeded).await?;
        info!(count, user = %session.user.username, "Seeded demo beehives");
        Ok(count)
    }

    fn position(hives: &[Beehive], session: &Session, serial: &str) -> Option<usize> {
        hives
            .iter()
            .position(|h| h.serial_number == serial && session.owns(&h.user_id))
    }
}

#[async_trait]
impl BeehiveService for LocalBeehiveService {
    async fn list(&self, session: &Session) -> Result<Vec<Beehive>, BeehiveError> {
        let hives = self.list_all().await?;
        Ok(hives
            .into_iter()
            .filter(|h| session.owns(&h.user_id))
            .collect())
    }

    async fn create(
        &self,
        session: &Session,
        input: NewBeehive,
    ) -> Result<Beehive, BeehiveError> {
        validation::validate_new_beehive(&input, Self::today())?;

        let mut hives = self.list_all().await?;

        let serial_number = identifiers::generate_serial_number(
            hives.iter().map(|h| h.serial_number.as_str()),
            &self.ids.serial_prefix,
            self.ids.serial_width,
        )?;
        let qr_token = identifiers::allocate_qr_token(
            |token| hives.iter().any(|h| h.qr_token == token),
            self.ids.max_token_attempts,
        )?;

        let now = chrono::Utc::now().to_rfc3339();
        let hive = Beehive {
            serial_number,
            qr_token,
            import_date: input.import_date,
            split_date: input.split_date,
            health_status: input.health_status,
            species: None,
            notes: input.notes.filter(|n| !n.is_empty()),
            is_sold: false,
            sold_date: None,
            user_id: session.user_id().to_string(),
            created_at: now.clone(),
            updated_at: now,
        };

        hives.push(hive.clone());
        self.store.save_beehives(&hives).await?;

        info!(
            serial = %hive.serial_number,
            user = %session.user.username,
            "Beehive created"
        );
        Ok(hive)
    }

    async fn update(
        &self,
        session: &Session,
        serial: &str,
        patch: BeehivePatch,
    ) -> Result<Beehive, BeehiveError> {
        let mut hives = self.list_all().await?;
        let idx = Self::position(&hives, session, serial)
            .ok_or_else(|| BeehiveError::NotFound(serial.to_string()))?;

        let today = Self::today();
        validation::validate_patch(&patch, &hives[idx], today)?;

        let hive = &mut hives[idx];
        patch.apply(hive, today);
        hive.updated_at = chrono::Utc::now().to_rfc3339();
        let updated = hive.clone();

        self.store.save_beehives(&hives).await?;
        info!(serial = %serial, "Beehive updated");
        Ok(updated)
    }

    async fn delete(&self, session: &Session, serial: &str) -> Result<(), BeehiveError> {
        let mut hives = self.list_all().await?;
        let idx = Self::position(&hives, session, serial)
            .ok_or_else(|| BeehiveError::NotFound(serial.to_string()))?;

        hives.remove(idx);
        self.store.save_beehives(&hives).await?;
        info!(serial = %serial, "Beehive deleted");
        Ok(())
    }

    async fn find_by_serial(
        &self,
        session: &Session,
        serial: &str,
    ) -> Result<Option<Beehive>, BeehiveError> {
        let hives = self.list_all().await?;
        Ok(Self::position(&hives, session, serial).map(|idx| hives[idx].clone()))
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<Beehive>, BeehiveError> {
        let hives = self.list_all().await?;
        Ok(hives.into_iter().find(|h| h.qr_token == token))
    }

    async fn sell(&self, session: &Session, serial: &str) -> Result<Beehive, BeehiveError> {
        let patch = BeehivePatch {
            is_sold: Some(true),
            sold_date: Some(Self::today()),
            ..BeehivePatch::default()
        };
        self.update(session, serial, patch).await
    }

    async fn unsell(&self, session: &Session, serial: &str) -> Result<Beehive, BeehiveError> {
        let patch = BeehivePatch {
            is_sold: Some(false),
            ..BeehivePatch::default()
        };
        self.update(session, serial, patch).await
    }

    async fn stats(&self, session: &Session) -> Result<HiveStats, BeehiveError> {
        let hives = self.list(session).await?;
        Ok(views::stats(&hives))
    }

    async fn export_qr_pdf(
        &self,
        _session: &Session,
        _serials: &[String],
    ) -> Result<Vec<u8>, BeehiveError> {
        Err(BeehiveError::Unsupported(
            "PDF export is rendered by the backend; switch store.mode to remote",
        ))
    }
}
