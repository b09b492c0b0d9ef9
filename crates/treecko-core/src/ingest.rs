//! Receipt ingestion pipeline.
//!
//! A request runs: authorize, rate-limit, acquire PDF text, parse, reject
//! duplicates, store, then mirror. Mirroring never fails the request.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::access::{RateLimiter, UserAuthorization, UserId};
use crate::clock::{Clock, SystemClock};
use crate::error::{IngestError, TreeckoError};
use crate::health::HealthStatus;
use crate::mirror::{CsvSheetMirror, SheetMirror};
use crate::models::config::{PdfConfig, TreeckoConfig};
use crate::models::transaction::{ParsedTransaction, StoredTransaction};
use crate::pdf::{PageTextSource, PdfExtractor};
use crate::receipt::{ReceiptLocale, ReceiptParser};
use crate::store::{SqliteStore, TransactionStore};

/// Result type for ingestion.
pub type Result<T> = std::result::Result<T, IngestError>;

/// What happened to the sheet copy of an ingested transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MirrorStatus {
    Written,
    Failed,
    NotConfigured,
}

impl MirrorStatus {
    pub fn describe(&self) -> &'static str {
        match self {
            MirrorStatus::Written => "added to sheet",
            MirrorStatus::Failed => "failed to add to sheet",
            MirrorStatus::NotConfigured => "sheet not configured",
        }
    }
}

/// A successfully ingested receipt.
#[derive(Debug, Clone)]
pub struct IngestOutcome {
    pub transaction: ParsedTransaction,
    pub stored: StoredTransaction,
    pub mirror: MirrorStatus,
}

/// Runs receipts through extraction into storage on behalf of users.
pub struct Ingestor {
    parser: ReceiptParser,
    pdf_config: PdfConfig,
    store: Box<dyn TransactionStore>,
    mirror: Option<Box<dyn SheetMirror>>,
    authorization: UserAuthorization,
    rate_limiter: RateLimiter,
}

impl Ingestor {
    /// Open access, default rate limits, no mirror.
    pub fn new(parser: ReceiptParser, store: Box<dyn TransactionStore>) -> Self {
        Self {
            parser,
            pdf_config: PdfConfig::default(),
            store,
            mirror: None,
            authorization: UserAuthorization::new(Default::default()),
            rate_limiter: RateLimiter::new(Default::default()),
        }
    }

    /// Build the full pipeline described by a configuration.
    pub fn from_config(config: &TreeckoConfig) -> std::result::Result<Self, TreeckoError> {
        Self::from_config_with_clock(config, Arc::new(SystemClock))
    }

    pub fn from_config_with_clock(
        config: &TreeckoConfig,
        clock: Arc<dyn Clock>,
    ) -> std::result::Result<Self, TreeckoError> {
        let parser = ReceiptParser::new()
            .with_locale(ReceiptLocale::for_code(&config.extraction.locale))
            .with_clock(clock.clone());
        let store = SqliteStore::open(&config.store.database_path)?.with_clock(clock.clone());

        let mut ingestor = Self::new(parser, Box::new(store))
            .with_pdf_config(config.pdf.clone())
            .with_authorization(UserAuthorization::new(config.auth.clone()))
            .with_rate_limiter(RateLimiter::with_clock(config.rate_limit.clone(), clock.clone()));

        if let Some(path) = &config.sheet.path {
            let mirror = CsvSheetMirror::new(path, config.sheet.worksheet.clone()).with_clock(clock);
            ingestor = ingestor.with_mirror(Box::new(mirror));
        }

        Ok(ingestor)
    }

    pub fn with_pdf_config(mut self, config: PdfConfig) -> Self {
        self.pdf_config = config;
        self
    }

    pub fn with_mirror(mut self, mirror: Box<dyn SheetMirror>) -> Self {
        self.mirror = Some(mirror);
        self
    }

    pub fn with_authorization(mut self, authorization: UserAuthorization) -> Self {
        self.authorization = authorization;
        self
    }

    pub fn with_rate_limiter(mut self, rate_limiter: RateLimiter) -> Self {
        self.rate_limiter = rate_limiter;
        self
    }

    pub fn parser(&self) -> &ReceiptParser {
        &self.parser
    }

    pub fn store(&self) -> &dyn TransactionStore {
        self.store.as_ref()
    }

    pub fn store_mut(&mut self) -> &mut dyn TransactionStore {
        self.store.as_mut()
    }

    pub fn authorization(&self) -> &UserAuthorization {
        &self.authorization
    }

    pub fn rate_limiter(&self) -> &RateLimiter {
        &self.rate_limiter
    }

    pub fn is_mirror_configured(&self) -> bool {
        self.mirror.as_ref().is_some_and(|m| m.is_configured())
    }

    /// Authorize the user and count the request against their budget.
    pub fn check_access(&self, user_id: UserId) -> Result<()> {
        if !self.authorization.is_authorized(user_id) {
            warn!(user_id, "Unauthorized access attempt");
            return Err(IngestError::Unauthorized(self.authorization.unauthorized_message()));
        }

        if !self.rate_limiter.check_and_record(user_id) {
            return Err(IngestError::RateLimited {
                retry_after: self.rate_limiter.retry_after(user_id),
            });
        }

        Ok(())
    }

    /// Ingest a receipt PDF sent by a user.
    pub fn ingest_pdf(&mut self, user_id: UserId, bytes: &[u8]) -> Result<IngestOutcome> {
        self.check_access(user_id)?;

        let mut extractor = PdfExtractor::with_config(self.pdf_config.clone());
        extractor.load(bytes)?;
        let pages = extractor.page_texts()?;
        let transaction = self.parser.parse_pages(pages)?;

        self.record(user_id, transaction)
    }

    /// Ingest already-extracted receipt text.
    pub fn ingest_text(&mut self, user_id: UserId, text: &str) -> Result<IngestOutcome> {
        self.check_access(user_id)?;
        let transaction = self.parser.parse(text)?;
        self.record(user_id, transaction)
    }

    fn record(&mut self, user_id: UserId, transaction: ParsedTransaction) -> Result<IngestOutcome> {
        if let Some(id) = transaction.transaction_id() {
            if self.store.exists(id)? {
                info!(user_id, transaction_id = id, "Receipt already processed");
                return Err(IngestError::Duplicate(id.to_string()));
            }
        }

        let stored = self.store.insert(&transaction, None)?;
        info!(
            user_id,
            id = stored.id,
            amount = %stored.amount,
            transaction_type = %stored.transaction_type,
            "Stored transaction"
        );

        let mirror = match &self.mirror {
            Some(mirror) if mirror.is_configured() => {
                if mirror.try_append(&transaction, None) {
                    MirrorStatus::Written
                } else {
                    MirrorStatus::Failed
                }
            }
            _ => {
                debug!("Sheet mirror not configured");
                MirrorStatus::NotConfigured
            }
        };

        Ok(IngestOutcome {
            transaction,
            stored,
            mirror,
        })
    }

    pub fn health_status(&self) -> HealthStatus {
        HealthStatus::now(self.store.is_connected(), self.is_mirror_configured())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::{AuthorizationConfig, AuthorizationMode, RateLimitConfig};
    use crate::clock::FixedClock;
    use crate::models::TransactionType;
    use crate::pdf::fixtures;
    use crate::store::MemoryStore;
    use chrono::NaiveDate;
    use std::collections::BTreeSet;

    const RECEIPT: &str = "Pagaste $1.500,50\n15/11/2024\nOperación: 12345678901";

    fn ingestor() -> Ingestor {
        let clock = Arc::new(FixedClock::new(
            NaiveDate::from_ymd_opt(2024, 12, 1).unwrap().and_hms_opt(0, 0, 0).unwrap(),
        ));
        Ingestor::new(
            ReceiptParser::new().with_clock(clock.clone()),
            Box::new(MemoryStore::new().with_clock(clock.clone())),
        )
        .with_rate_limiter(RateLimiter::with_clock(RateLimitConfig::default(), clock))
    }

    #[test]
    fn test_ingest_text_stores_once() {
        let mut ingestor = ingestor();
        let outcome = ingestor.ingest_text(1, RECEIPT).unwrap();
        assert_eq!(outcome.stored.id, 1);
        assert_eq!(outcome.mirror, MirrorStatus::NotConfigured);

        let err = ingestor.ingest_text(1, RECEIPT).unwrap_err();
        assert!(matches!(err, IngestError::Duplicate(id) if id == "12345678901"));
        assert_eq!(ingestor.store().all().unwrap().len(), 1);
    }

    #[test]
    fn test_unauthorized_user_rejected() {
        let config = AuthorizationConfig {
            mode: AuthorizationMode::Whitelist,
            admin_user_ids: BTreeSet::new(),
            whitelisted_user_ids: BTreeSet::from([7]),
            enabled: true,
        };
        let mut ingestor = ingestor().with_authorization(UserAuthorization::new(config));

        assert!(matches!(
            ingestor.ingest_text(8, RECEIPT),
            Err(IngestError::Unauthorized(_))
        ));
        assert!(ingestor.ingest_text(7, RECEIPT).is_ok());
    }

    #[test]
    fn test_rate_limited_user() {
        let config = RateLimitConfig {
            max_requests: 1,
            window_seconds: 60,
            enabled: true,
        };
        let mut ingestor = ingestor().with_rate_limiter(RateLimiter::new(config));

        ingestor.ingest_text(1, "Pagaste $1").unwrap();
        let err = ingestor.ingest_text(1, "Pagaste $2").unwrap_err();
        assert!(matches!(err, IngestError::RateLimited { retry_after } if retry_after > 0.0));
        // Other users keep their own budget.
        assert!(ingestor.ingest_text(2, "Pagaste $3").is_ok());
    }

    #[test]
    fn test_empty_text_is_extraction_error() {
        let mut ingestor = ingestor();
        assert!(matches!(
            ingestor.ingest_text(1, "   "),
            Err(IngestError::Extraction(_))
        ));
    }

    #[test]
    fn test_invalid_pdf_rejected() {
        let mut ingestor = ingestor();
        assert!(matches!(
            ingestor.ingest_pdf(1, b"not a pdf"),
            Err(IngestError::Pdf(crate::error::PdfError::NotPdf))
        ));
    }

    #[test]
    fn test_ingest_pdf_stores_transaction() {
        let mut ingestor = ingestor();
        let pdf = fixtures::text_pdf(&["Pagaste $100,00", "Operacion: 12345678901"]);

        let outcome = ingestor.ingest_pdf(1, &pdf).unwrap();
        assert_eq!(outcome.stored.amount, rust_decimal::Decimal::new(10000, 2));
        assert_eq!(outcome.stored.transaction_type, TransactionType::Expense);
        assert_eq!(outcome.stored.transaction_id.as_deref(), Some("12345678901"));

        assert!(matches!(
            ingestor.ingest_pdf(1, &pdf),
            Err(IngestError::Duplicate(id)) if id == "12345678901"
        ));
    }

    #[test]
    fn test_mirror_failure_does_not_fail_ingest() {
        let mut ingestor = ingestor().with_mirror(Box::new(CsvSheetMirror::new(
            "/nonexistent-dir/sheet.csv",
            "Transactions",
        )));
        let outcome = ingestor.ingest_text(1, RECEIPT).unwrap();
        assert_eq!(outcome.mirror, MirrorStatus::Failed);
        assert!(ingestor.store().exists("12345678901").unwrap());
    }

    #[test]
    fn test_mirror_written() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sheet.csv");
        let mut ingestor = ingestor()
            .with_mirror(Box::new(CsvSheetMirror::new(&path, "Transactions")));

        let outcome = ingestor.ingest_text(1, RECEIPT).unwrap();
        assert_eq!(outcome.mirror, MirrorStatus::Written);
        assert!(std::fs::read_to_string(&path).unwrap().contains("12345678901"));

        let health = ingestor.health_status();
        assert!(health.database_connected);
        assert!(health.sheets_configured);
    }
}
