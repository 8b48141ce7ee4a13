//! The finance store: ledger, settings and derived analysis in one object
//!
//! Every mutating call follows the same order: apply the change in memory,
//! recompute the analysis, then persist. The in-memory state is the source
//! of truth; if persistence fails the error is returned but the change and
//! the fresh analysis remain visible, and the next successful write of the
//! same collection brings the store back in line.

use std::io::Write;

use chrono::{Local, NaiveDate, Utc};
use tracing::{debug, info, warn};

use crate::analysis::{analyze, Analysis, AnalysisInputs};
use crate::amount::display_amount;
use crate::collab::{ReceiptOcr, StatementExtractor};
use crate::config::AnalysisConfig;
use crate::error::{Error, Result};
use crate::ids::{derive_id, IdAllocator};
use crate::import::{
    split_advice, subscription_record, transaction_record, write_csv, RecordNormalizer,
};
use crate::ledger::Ledger;
use crate::models::{
    Currency, ManualEntry, Receipt, Settings, StatementImport, Subscription, SubscriptionRecord,
    Summary, Transaction, TransactionRecord, TransactionType, UserProfile, Warranty, UNCATEGORIZED,
};
use crate::receipt::{ReceiptExtractor, ReceiptFields};
use crate::store::{keys, load, save, swap, RecordStore};
use crate::summary::summarize_records;

/// Category given to transactions booked from a receipt
pub const RECEIPT_CATEGORY: &str = "Receipt";

/// How imported transactions combine with the ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImportMode {
    /// Add to what is already there
    #[default]
    Append,
    /// Monthly view: the import becomes the whole ledger
    Replace,
}

/// Result of a statement import
#[derive(Debug, Clone, PartialEq)]
pub struct ImportOutcome {
    pub imported: usize,
    /// Advice now cached in settings (unchanged when the import had none)
    pub advice: Vec<String>,
    /// Totals carried by the statement alone, before merging into the ledger
    pub statement: Summary,
}

/// Result of booking a receipt
#[derive(Debug, Clone, PartialEq)]
pub struct ReceiptCapture {
    pub fields: ReceiptFields,
    pub receipt: Receipt,
    pub transaction: Transaction,
}

/// Explicit owner of all finance state
pub struct FinanceStore<S: RecordStore> {
    store: S,
    config: AnalysisConfig,
    ledger: Ledger,
    subscriptions: Vec<Subscription>,
    warranties: Vec<Warranty>,
    receipts: Vec<Receipt>,
    settings: Settings,
    profile: Option<UserProfile>,
    /// Pinned analysis date; the local date when unset
    today: Option<NaiveDate>,
    analysis: Analysis,
}

impl<S: RecordStore> FinanceStore<S> {
    /// An empty store that has not read from `store` yet
    pub fn new(store: S, config: AnalysisConfig) -> Self {
        let today = Local::now().date_naive();
        let analysis = Analysis::empty(today, &config);
        Self {
            store,
            config,
            ledger: Ledger::new(),
            subscriptions: Vec::new(),
            warranties: Vec::new(),
            receipts: Vec::new(),
            settings: Settings::default(),
            profile: None,
            today: None,
            analysis,
        }
    }

    /// Create and load in one step
    pub async fn open(store: S, config: AnalysisConfig) -> Result<Self> {
        let mut finance = Self::new(store, config);
        finance.load().await?;
        Ok(finance)
    }

    /// Replace in-memory state with what the record store holds
    pub async fn load(&mut self) -> Result<()> {
        let settings: Settings = load(&self.store, keys::SETTINGS).await?.unwrap_or_default();
        let records: Vec<TransactionRecord> =
            load(&self.store, keys::TRANSACTIONS).await?.unwrap_or_default();
        let sub_records: Vec<SubscriptionRecord> =
            load(&self.store, keys::SUBSCRIPTIONS).await?.unwrap_or_default();
        let warranties: Vec<Warranty> =
            load(&self.store, keys::WARRANTIES).await?.unwrap_or_default();
        let receipts: Vec<Receipt> = load(&self.store, keys::RECEIPTS).await?.unwrap_or_default();
        let profile: Option<UserProfile> = load(&self.store, keys::USER_PROFILE).await?;

        self.settings = settings;
        let normalizer = self.normalizer();
        let today = self.today();

        let transactions = normalizer.transactions(&records, &mut IdAllocator::new(), today)?;
        let subscriptions = normalizer.subscriptions(&sub_records, &mut IdAllocator::new())?;

        self.ledger = Ledger::from_transactions(transactions)?;
        self.subscriptions = subscriptions;
        self.warranties = warranties;
        self.receipts = receipts;
        self.profile = profile;
        self.recompute();

        info!(
            transactions = self.ledger.len(),
            subscriptions = self.subscriptions.len(),
            warranties = self.warranties.len(),
            "Loaded finance data"
        );
        Ok(())
    }

    /// Run the analysis pipeline over current state
    pub fn recompute(&mut self) {
        let transactions = self.ledger.all();
        self.analysis = analyze(
            AnalysisInputs {
                transactions: &transactions,
                subscriptions: &self.subscriptions,
                warranties: &self.warranties,
                settings: &self.settings,
                today: self.today(),
            },
            &self.config,
        );
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn analysis(&self) -> &Analysis {
        &self.analysis
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// All transactions, newest first
    pub fn transactions(&self) -> Vec<Transaction> {
        self.ledger.all()
    }

    pub fn transaction(&self, id: &str) -> Option<&Transaction> {
        self.ledger.get(id)
    }

    pub fn subscriptions(&self) -> &[Subscription] {
        &self.subscriptions
    }

    pub fn warranties(&self) -> &[Warranty] {
        &self.warranties
    }

    pub fn receipts(&self) -> &[Receipt] {
        &self.receipts
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn profile(&self) -> Option<&UserProfile> {
        self.profile.as_ref()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Display currency: the settings override, else the configured one
    pub fn currency(&self) -> Currency {
        self.settings
            .currency
            .clone()
            .unwrap_or_else(|| self.config.currency.clone())
    }

    pub fn today(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| Local::now().date_naive())
    }

    /// Pin the analysis date (None returns to the local date)
    pub fn set_today(&mut self, today: Option<NaiveDate>) {
        self.today = today;
        self.recompute();
    }

    fn normalizer(&self) -> RecordNormalizer {
        RecordNormalizer::new(&self.config.parsing, self.currency())
    }

    fn transaction_ids(&self) -> IdAllocator {
        IdAllocator::with_existing(self.ledger.iter().map(|t| t.id.clone()))
    }

    // ------------------------------------------------------------------
    // Transactions
    // ------------------------------------------------------------------

    pub async fn add_transaction(&mut self, tx: Transaction) -> Result<()> {
        debug!(id = tx.id.as_str(), "Adding transaction");
        self.ledger.add(tx)?;
        self.recompute();
        self.persist_transactions().await
    }

    /// Add several transactions; none are added if any id collides
    pub async fn add_transactions(&mut self, transactions: Vec<Transaction>) -> Result<usize> {
        let count = self.ledger.add_many(transactions)?;
        self.recompute();
        self.persist_transactions().await?;
        Ok(count)
    }

    /// Monthly view: the given set becomes the entire ledger
    pub async fn replace_transactions(&mut self, transactions: Vec<Transaction>) -> Result<()> {
        self.ledger.replace_all(transactions)?;
        self.recompute();
        self.replace_persisted_transactions().await
    }

    pub async fn delete_transaction(&mut self, id: &str) -> Result<Transaction> {
        let removed = self
            .ledger
            .delete(id)
            .ok_or_else(|| Error::NotFound(format!("transaction {}", id)))?;
        self.recompute();
        self.persist_transactions().await?;
        Ok(removed)
    }

    pub async fn clear_transactions(&mut self) -> Result<()> {
        self.ledger.clear();
        self.recompute();
        self.store.delete(keys::TRANSACTIONS).await
    }

    /// Book a hand-entered transaction
    pub async fn add_manual(&mut self, entry: ManualEntry) -> Result<Transaction> {
        let title = entry.title.trim();
        if title.is_empty() {
            return Err(Error::InvalidData("Transaction title is required".to_string()));
        }
        if !entry.amount.is_finite() {
            return Err(Error::InvalidData(format!("Invalid amount: {}", entry.amount)));
        }

        let magnitude = entry.amount.abs();
        let amount = match entry.kind {
            TransactionType::Expense => -magnitude,
            TransactionType::Income => magnitude,
        };
        let date = entry.date.unwrap_or_else(|| self.today());
        let display = display_amount(magnitude, entry.kind, &self.currency());

        let id = self.transaction_ids().fresh(|| {
            derive_id(&date.to_string(), title, &display, self.ledger.len())
        });

        let tx = Transaction {
            id,
            title: title.to_string(),
            amount,
            display_amount: display,
            date,
            time: entry.time,
            kind: entry.kind,
            category: entry
                .category
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty())
                .unwrap_or_else(|| UNCATEGORIZED.to_string()),
            is_manual: true,
            receipt_id: None,
        };

        self.add_transaction(tx.clone()).await?;
        info!(id = tx.id.as_str(), amount = tx.amount, "Added manual transaction");
        Ok(tx)
    }

    /// Extract fields from OCR text and book the receipt as an expense
    pub async fn capture_receipt(
        &mut self,
        text: &str,
        confidence: Option<f64>,
    ) -> Result<ReceiptCapture> {
        let today = self.today();
        let fields = ReceiptExtractor::new(&self.config.parsing).extract(text, today);

        let amount = fields
            .amount_value
            .ok_or_else(|| Error::InvalidData("No amount found on receipt".to_string()))?;
        let date = fields
            .date
            .ok_or_else(|| Error::InvalidData("No date found on receipt".to_string()))?;

        let mut receipt_ids = IdAllocator::with_existing(self.receipts.iter().map(|r| r.id.clone()));
        let receipt_id = receipt_ids.fresh(|| {
            derive_id(&date.to_string(), &fields.vendor, &fields.amount, self.receipts.len())
        });

        let receipt = Receipt {
            id: receipt_id.clone(),
            vendor: fields.vendor.clone(),
            amount,
            date: Some(date),
            raw_text: fields.raw_text.clone(),
            confidence,
            created_at: Utc::now(),
        };

        let display = display_amount(amount, TransactionType::Expense, &self.currency());
        let tx_id = self.transaction_ids().fresh(|| {
            derive_id(&date.to_string(), &fields.vendor, &display, self.ledger.len())
        });
        let transaction = Transaction {
            id: tx_id,
            title: fields.vendor.clone(),
            amount: -amount,
            display_amount: display,
            date,
            time: None,
            kind: TransactionType::Expense,
            category: RECEIPT_CATEGORY.to_string(),
            is_manual: false,
            receipt_id: Some(receipt_id),
        };

        self.ledger.add(transaction.clone())?;
        self.receipts.push(receipt.clone());
        self.recompute();

        info!(
            vendor = receipt.vendor.as_str(),
            amount,
            date_detected = fields.date_detected,
            "Captured receipt"
        );

        save(&self.store, keys::RECEIPTS, &self.receipts).await?;
        self.persist_transactions().await?;

        Ok(ReceiptCapture {
            fields,
            receipt,
            transaction,
        })
    }

    /// Run an OCR collaborator over a receipt image and book the result
    pub async fn scan_receipt(
        &mut self,
        ocr: &dyn ReceiptOcr,
        image: &[u8],
    ) -> Result<ReceiptCapture> {
        let result = ocr.recognize(image).await?;
        debug!(engine = ocr.name(), confidence = result.confidence, "Receipt recognized");
        self.capture_receipt(&result.text, Some(result.confidence)).await
    }

    /// Apply a statement extractor's output
    ///
    /// A missing transaction list imports nothing. Every record gets an id
    /// that is unique in the resulting ledger. Advice, when present,
    /// replaces the cached advice.
    pub async fn import_statement(
        &mut self,
        import: StatementImport,
        mode: ImportMode,
    ) -> Result<ImportOutcome> {
        let records = import.transactions.unwrap_or_default();
        let imported = self.apply_records(&records, mode)?;
        let statement = summarize_records(&records, 0.0);

        let advice_changed = match import.advice.as_deref() {
            Some(text) => {
                self.settings.advice = split_advice(text);
                true
            }
            None => false,
        };

        self.recompute();
        info!(imported, ?mode, advice_changed, "Imported statement");

        self.persist_after_import(mode).await?;
        if advice_changed {
            self.persist_settings().await?;
        }

        Ok(ImportOutcome {
            imported,
            advice: self.settings.advice.clone(),
            statement,
        })
    }

    /// Run a statement extractor over a payload and import the result
    pub async fn import_from(
        &mut self,
        extractor: &dyn StatementExtractor,
        payload: &[u8],
        mode: ImportMode,
    ) -> Result<ImportOutcome> {
        let import = extractor.extract_statement(payload).await?;
        debug!(extractor = extractor.name(), "Statement extracted");
        self.import_statement(import, mode).await
    }

    /// Import wire records (e.g. read from CSV)
    pub async fn import_records(
        &mut self,
        records: &[TransactionRecord],
        mode: ImportMode,
    ) -> Result<usize> {
        let imported = self.apply_records(records, mode)?;
        self.recompute();
        info!(imported, ?mode, "Imported transaction records");
        self.persist_after_import(mode).await?;
        Ok(imported)
    }

    fn apply_records(&mut self, records: &[TransactionRecord], mode: ImportMode) -> Result<usize> {
        let mut ids = match mode {
            ImportMode::Append => self.transaction_ids(),
            ImportMode::Replace => IdAllocator::new(),
        };
        let transactions = self.normalizer().transactions(records, &mut ids, self.today())?;

        let count = transactions.len();
        match mode {
            ImportMode::Append => {
                self.ledger.add_many(transactions)?;
            }
            ImportMode::Replace => self.ledger.replace_all(transactions)?,
        }
        Ok(count)
    }

    async fn persist_after_import(&self, mode: ImportMode) -> Result<()> {
        match mode {
            ImportMode::Append => self.persist_transactions().await,
            ImportMode::Replace => self.replace_persisted_transactions().await,
        }
    }

    /// Write transactions to CSV, newest first
    pub fn export_csv<W: Write>(&self, writer: W) -> Result<()> {
        write_csv(writer, &self.ledger.all())
    }

    // ------------------------------------------------------------------
    // Subscriptions and warranties
    // ------------------------------------------------------------------

    /// Track a subscription; an empty id is derived
    pub async fn add_subscription(&mut self, mut sub: Subscription) -> Result<Subscription> {
        if sub.name.trim().is_empty() {
            return Err(Error::InvalidData("Subscription name is required".to_string()));
        }
        sub.amount = sub.amount.abs();

        let mut ids = IdAllocator::with_existing(self.subscriptions.iter().map(|s| s.id.clone()));
        let position = self.subscriptions.len();
        let id = ids.allocate(Some(sub.id.as_str()), || {
            let next = sub.next_date.map(|d| d.to_string()).unwrap_or_default();
            derive_id(&next, &sub.name, &format!("{:.2}", sub.amount), position)
        });
        sub.id = id;

        self.subscriptions.push(sub.clone());
        self.recompute();
        info!(id = sub.id.as_str(), name = sub.name.as_str(), "Added subscription");
        self.persist_subscriptions().await?;
        Ok(sub)
    }

    pub async fn delete_subscription(&mut self, id: &str) -> Result<Subscription> {
        let pos = self
            .subscriptions
            .iter()
            .position(|s| s.id == id)
            .ok_or_else(|| Error::NotFound(format!("subscription {}", id)))?;
        let removed = self.subscriptions.remove(pos);
        self.recompute();
        self.persist_subscriptions().await?;
        Ok(removed)
    }

    /// Replace the whole subscription list
    pub async fn replace_subscriptions(&mut self, subscriptions: Vec<Subscription>) -> Result<()> {
        let mut seen = std::collections::HashSet::new();
        if let Some(dup) = subscriptions.iter().find(|s| !seen.insert(s.id.as_str())) {
            return Err(Error::DuplicateId(dup.id.clone()));
        }

        self.subscriptions = subscriptions;
        self.recompute();
        let records: Vec<SubscriptionRecord> =
            self.subscriptions.iter().map(subscription_record).collect();
        swap(&self.store, keys::SUBSCRIPTIONS, &records).await
    }

    /// Track a warranty; an empty id is derived
    pub async fn add_warranty(&mut self, mut warranty: Warranty) -> Result<Warranty> {
        if warranty.product_name.trim().is_empty() {
            return Err(Error::InvalidData("Product name is required".to_string()));
        }

        let mut ids = IdAllocator::with_existing(self.warranties.iter().map(|w| w.id.clone()));
        let position = self.warranties.len();
        warranty.id = ids.allocate(Some(warranty.id.as_str()), || {
            derive_id(
                &warranty.expiry_date.to_string(),
                &warranty.product_name,
                warranty.serial_no.as_deref().unwrap_or(""),
                position,
            )
        });

        self.warranties.push(warranty.clone());
        self.recompute();
        info!(id = warranty.id.as_str(), "Added warranty");
        save(&self.store, keys::WARRANTIES, &self.warranties).await?;
        Ok(warranty)
    }

    pub async fn delete_warranty(&mut self, id: &str) -> Result<Warranty> {
        let pos = self
            .warranties
            .iter()
            .position(|w| w.id == id)
            .ok_or_else(|| Error::NotFound(format!("warranty {}", id)))?;
        let removed = self.warranties.remove(pos);
        self.recompute();
        save(&self.store, keys::WARRANTIES, &self.warranties).await?;
        Ok(removed)
    }

    // ------------------------------------------------------------------
    // Settings
    // ------------------------------------------------------------------

    pub async fn set_starting_balance(&mut self, balance: f64) -> Result<()> {
        if !balance.is_finite() {
            return Err(Error::InvalidData(format!("Invalid balance: {}", balance)));
        }
        self.settings.starting_balance = balance;
        self.recompute();
        self.persist_settings().await
    }

    /// Override the display currency (None reverts to the configured one)
    pub async fn set_currency(&mut self, currency: Option<Currency>) -> Result<()> {
        self.settings.currency = currency;
        self.recompute();
        self.persist_settings().await
    }

    pub async fn set_profile(&mut self, profile: UserProfile) -> Result<()> {
        save(&self.store, keys::USER_PROFILE, &profile).await?;
        self.profile = Some(profile);
        Ok(())
    }

    /// Record that the user has seen a notification.
    ///
    /// Returns false if it was already acknowledged. Suppression only takes
    /// effect when notification dedupe is enabled.
    pub async fn acknowledge_notification(&mut self, id: &str) -> Result<bool> {
        if self.settings.acknowledged.iter().any(|a| a == id) {
            return Ok(false);
        }

        self.settings.acknowledged.push(id.to_string());
        if !self.config.notifications.dedupe {
            warn!(id, "Notification acknowledged but dedupe is disabled");
        }
        self.recompute();
        self.persist_settings().await?;
        Ok(true)
    }

    /// Drop every collection, in memory and in the record store
    pub async fn clear_all(&mut self) -> Result<()> {
        self.ledger.clear();
        self.subscriptions.clear();
        self.warranties.clear();
        self.receipts.clear();
        self.settings = Settings::default();
        self.profile = None;
        self.recompute();

        info!("Cleared all finance data");
        self.store.clear_all().await
    }

    // ------------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------------

    fn transaction_records(&self) -> Vec<TransactionRecord> {
        // Insertion order, so same-day ties survive a reload
        self.ledger.iter().map(transaction_record).collect()
    }

    async fn persist_transactions(&self) -> Result<()> {
        save(&self.store, keys::TRANSACTIONS, &self.transaction_records()).await
    }

    async fn replace_persisted_transactions(&self) -> Result<()> {
        swap(&self.store, keys::TRANSACTIONS, &self.transaction_records()).await
    }

    async fn persist_subscriptions(&self) -> Result<()> {
        let records: Vec<SubscriptionRecord> =
            self.subscriptions.iter().map(subscription_record).collect();
        save(&self.store, keys::SUBSCRIPTIONS, &records).await
    }

    async fn persist_settings(&self) -> Result<()> {
        save(&self.store, keys::SETTINGS, &self.settings).await
    }
}
