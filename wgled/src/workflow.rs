//! Scan-driven import/export workflow
//!
//! Import: scan a product code, then a free tag. The tag now holds the
//! product and the product's indicator is switched on once.
//!
//! Export: scan a tag that holds a product. The product's indicator beacons
//! until the operator finds the item and enters the confirmation token; the
//! association is then released and the indicator switched off according to
//! the controller's [`ReleasePolicy`](crate::ReleasePolicy).
//!
//! ```text
//!                product                      free tag
//!   ┌──────┐ ───────────► ┌─────────────────┐ ─────────► (import, activate)
//!   │ Idle │              │ AwaitingTag(p)  │
//!   └──────┘ ◄─────────── └─────────────────┘ ◄── product (last scan wins)
//!     │  ▲      held tag (conflict)
//!     │  │
//!     │  └──── confirm (stop beacon, release, unlink) ────┐
//!     │ held tag (start beacon)                            │
//!     └──────────────────────────► ┌───────────────────────┴──┐
//!                                  │ AwaitingConfirmation(t)  │ ◄── anything else
//!                                  └──────────────────────────┘     (rejected)
//! ```
//!
//! Tokens are handled strictly one at a time (`&mut self`); the beacon is the
//! only concurrent activity.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::{debug, info, warn};

use wgled_core::IndicatorId;
use wgled_types::{Association, ProductId, TagId};

use crate::beacon::{Beacon, StopOutcome};
use crate::catalog::ProductCatalog;
use crate::controller::{Controller, Delivery};
use crate::error::Result;

/// Current multi-step operation
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum WorkflowState {
    /// Nothing pending
    #[default]
    Idle,
    /// Product scanned; the next tag completes the import
    AwaitingTagForImport(ProductId),
    /// Tag's indicator is beaconing; only confirmation is accepted
    AwaitingExportConfirmation(TagId),
}

impl fmt::Display for WorkflowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => f.write_str("Idle"),
            Self::AwaitingTagForImport(p) => write!(f, "AwaitingTagForImport({})", p),
            Self::AwaitingExportConfirmation(t) => write!(f, "AwaitingExportConfirmation({})", t),
        }
    }
}

/// Literal tokens with special meaning (matched case-insensitively)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanTokens {
    pub confirm: String,
    pub exit: String,
}

impl Default for ScanTokens {
    fn default() -> Self {
        Self {
            confirm: "confirm".to_string(),
            exit: "exit".to_string(),
        }
    }
}

/// Classified scan token
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scan {
    /// Blank line
    Empty,
    Confirm,
    Exit,
    /// Catalog product
    Product(ProductId),
    /// Looks like a product code but the catalog does not know it
    Unrecognized(String),
    /// Anything else is a tag
    Tag(TagId),
}

/// What handling a token did, for the operator
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Ignored,
    ProductSelected {
        product: ProductId,
        replaced: Option<ProductId>,
    },
    Imported {
        tag: TagId,
        product: ProductId,
        delivery: Delivery,
    },
    ImportConflict {
        tag: TagId,
        existing: ProductId,
        abandoned: ProductId,
    },
    FreeTag {
        tag: TagId,
    },
    LocateStarted {
        tag: TagId,
        product: ProductId,
        indicator: Option<IndicatorId>,
        confirm: String,
    },
    Exported {
        association: Association,
        release: Delivery,
    },
    ConfirmationRequired {
        pending: TagId,
        confirm: String,
    },
    NothingPending,
    Unrecognized {
        token: String,
    },
    ExitRequested,
}

impl Outcome {
    /// Input clashed with existing state (reported, never fatal)
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            Self::ImportConflict { .. } | Self::ConfirmationRequired { .. }
        )
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ignored => Ok(()),
            Self::ProductSelected { product, replaced } => {
                if let Some(previous) = replaced {
                    write!(f, "OK: Product '{}' replaces '{}'. ", product, previous)?;
                } else {
                    write!(f, "OK: Product '{}' scanned. ", product)?;
                }
                f.write_str("Now scan the RFID tag to associate.")
            }
            Self::Imported {
                tag,
                product,
                delivery,
            } => write!(
                f,
                "IMPORT: Tag '{}' now holds product '{}'. Indicator command {}.",
                tag, product, delivery
            ),
            Self::ImportConflict {
                tag,
                existing,
                abandoned,
            } => write!(
                f,
                "[WARN] Tag '{}' is already associated with product '{}'. \
                 Import of '{}' abandoned; handle the export first.",
                tag, existing, abandoned
            ),
            Self::FreeTag { tag } => write!(
                f,
                "INFO: Scanned free tag '{}'. Not associated with any product.",
                tag
            ),
            Self::LocateStarted {
                tag,
                product,
                indicator,
                confirm,
            } => {
                write!(f, "EXPORT: Found product '{}' on tag '{}'. ", product, tag)?;
                if let Some(indicator) = indicator {
                    write!(f, "Indicator {} is flashing. ", indicator)?;
                }
                write!(
                    f,
                    "Find the item, then type '{}' after you have picked it up.",
                    confirm
                )
            }
            Self::Exported {
                association,
                release,
            } => write!(
                f,
                "CONFIRMED: Export of product '{}' complete, tag '{}' is free \
                 (stored since {}). Release {}.",
                association.product,
                association.tag,
                association.created_at.format("%Y-%m-%d %H:%M:%S"),
                release
            ),
            Self::ConfirmationRequired { pending, confirm } => write!(
                f,
                "[ACTION REQUIRED] An export is pending for tag '{}'. \
                 Find the item and type '{}'.",
                pending, confirm
            ),
            Self::NothingPending => {
                f.write_str("[INFO] No export operation is waiting for confirmation.")
            }
            Self::Unrecognized { token } => {
                write!(f, "[ERROR] Unrecognized code '{}'. No action taken.", token)
            }
            Self::ExitRequested => f.write_str("Exiting."),
        }
    }
}

/// Inventory workflow state machine
pub struct Workflow {
    catalog: ProductCatalog,
    tokens: ScanTokens,
    associations: HashMap<TagId, Association>,
    state: WorkflowState,
    controller: Arc<Controller>,
    beacon: Beacon,
}

impl Workflow {
    pub fn new(
        catalog: ProductCatalog,
        tokens: ScanTokens,
        controller: Arc<Controller>,
        beacon: Beacon,
    ) -> Self {
        Self {
            catalog,
            tokens,
            associations: HashMap::new(),
            state: WorkflowState::Idle,
            controller,
            beacon,
        }
    }

    pub fn state(&self) -> &WorkflowState {
        &self.state
    }

    pub fn catalog(&self) -> &ProductCatalog {
        &self.catalog
    }

    pub fn controller(&self) -> &Arc<Controller> {
        &self.controller
    }

    pub fn beacon(&self) -> &Beacon {
        &self.beacon
    }

    /// Product held by `tag`
    pub fn association(&self, tag: &str) -> Option<&Association> {
        self.associations.get(tag)
    }

    /// All current associations, in no particular order
    pub fn associations(&self) -> impl Iterator<Item = &Association> {
        self.associations.values()
    }

    /// Classify a raw input line
    ///
    /// Special tokens first, then catalog products, so product and tag codes
    /// never collide.
    pub fn classify(&self, input: &str) -> Scan {
        let token = input.trim();

        if token.is_empty() {
            return Scan::Empty;
        }
        if token.eq_ignore_ascii_case(&self.tokens.confirm) {
            return Scan::Confirm;
        }
        if token.eq_ignore_ascii_case(&self.tokens.exit) {
            return Scan::Exit;
        }
        if let Some((product, _)) = self.catalog.lookup(token) {
            return Scan::Product(product.clone());
        }
        if self.catalog.has_product_prefix(token) {
            return Scan::Unrecognized(token.to_string());
        }

        match TagId::new(token) {
            Ok(tag) => Scan::Tag(tag),
            Err(_) => Scan::Empty,
        }
    }

    /// Process one scan token
    pub async fn handle(&mut self, input: &str) -> Outcome {
        let scan = self.classify(input);
        debug!(state = %self.state, scan = ?scan, "Handling scan");

        let (next, outcome) = match (self.state.clone(), scan) {
            (state, Scan::Empty) => (state, Outcome::Ignored),
            (state, Scan::Exit) => (state, Outcome::ExitRequested),

            (WorkflowState::AwaitingExportConfirmation(tag), Scan::Confirm) => {
                self.confirm_export(tag).await
            }
            (WorkflowState::AwaitingExportConfirmation(tag), _) => {
                let outcome = Outcome::ConfirmationRequired {
                    pending: tag.clone(),
                    confirm: self.tokens.confirm.clone(),
                };
                (WorkflowState::AwaitingExportConfirmation(tag), outcome)
            }

            (state, Scan::Confirm) => (state, Outcome::NothingPending),

            (WorkflowState::AwaitingTagForImport(previous), Scan::Product(product)) => {
                let replaced = (previous != product).then_some(previous);
                self.select_product(product, replaced)
            }
            (_, Scan::Product(product)) => self.select_product(product, None),

            (WorkflowState::AwaitingTagForImport(product), Scan::Tag(tag)) => {
                self.import(product, tag).await
            }
            (_, Scan::Tag(tag)) => self.begin_export(tag).await,

            (state, Scan::Unrecognized(token)) => {
                warn!(token = %token, "Unrecognized product code");
                (state, Outcome::Unrecognized { token })
            }
        };

        if next != self.state {
            info!(from = %self.state, to = %next, "Workflow transition");
        }
        self.state = next;

        outcome
    }

    /// Stop any running beacon and end the beacon task
    pub async fn shutdown(self) {
        if self.beacon.active().is_some() {
            if let Err(e) = self.beacon.stop().await {
                warn!("Failed to stop beacon: {}", e);
            }
        }
        self.beacon.shutdown().await;
    }

    fn select_product(
        &self,
        product: ProductId,
        replaced: Option<ProductId>,
    ) -> (WorkflowState, Outcome) {
        info!(product = %product, "Product scanned, waiting for tag");
        let outcome = Outcome::ProductSelected {
            product: product.clone(),
            replaced,
        };
        (WorkflowState::AwaitingTagForImport(product), outcome)
    }

    async fn import(&mut self, product: ProductId, tag: TagId) -> (WorkflowState, Outcome) {
        if let Some(existing) = self.associations.get(&tag) {
            warn!(
                tag = %tag,
                existing = %existing.product,
                abandoned = %product,
                "Tag already holds a product, import abandoned"
            );
            let outcome = Outcome::ImportConflict {
                tag,
                existing: existing.product.clone(),
                abandoned: product,
            };
            return (WorkflowState::Idle, outcome);
        }

        info!(tag = %tag, product = %product, "Associating tag with product");
        self.associations
            .insert(tag.clone(), Association::new(tag.clone(), product.clone()));

        let delivery = match self.catalog.indicator(&product) {
            Some(indicator) => report(indicator, self.controller.activate(indicator).await),
            None => Delivery::Failed(format!("no indicator for product {}", product)),
        };

        let outcome = Outcome::Imported {
            tag,
            product,
            delivery,
        };
        (WorkflowState::Idle, outcome)
    }

    async fn begin_export(&mut self, tag: TagId) -> (WorkflowState, Outcome) {
        let Some(association) = self.associations.get(&tag) else {
            info!(tag = %tag, "Free tag scanned");
            return (WorkflowState::Idle, Outcome::FreeTag { tag });
        };
        let product = association.product.clone();

        let indicator = self.catalog.indicator(&product);
        match indicator {
            Some(indicator) => {
                info!(tag = %tag, product = %product, indicator = indicator.get(), "Locating product");
                if let Err(e) = self.beacon.start(indicator).await {
                    warn!("Failed to start beacon: {}", e);
                }
            }
            None => warn!(product = %product, "Product has no indicator, nothing to flash"),
        }

        let outcome = Outcome::LocateStarted {
            tag: tag.clone(),
            product,
            indicator,
            confirm: self.tokens.confirm.clone(),
        };
        (WorkflowState::AwaitingExportConfirmation(tag), outcome)
    }

    async fn confirm_export(&mut self, tag: TagId) -> (WorkflowState, Outcome) {
        let Some(product) = self.associations.get(&tag).map(|a| a.product.clone()) else {
            warn!(tag = %tag, "Confirmation for a tag with no association");
            return (
                WorkflowState::AwaitingExportConfirmation(tag),
                Outcome::NothingPending,
            );
        };

        match self.beacon.stop().await {
            Ok(StopOutcome::Stopped) => {}
            Ok(StopOutcome::Abandoned) => warn!("Beacon abandoned, one more frame may follow"),
            Err(e) => warn!("Failed to stop beacon: {}", e),
        }

        let release = match self.catalog.indicator(&product) {
            Some(indicator) => match self.controller.release(indicator).await {
                Ok(delivery) => delivery,
                Err(e) => {
                    warn!(indicator = indicator.get(), "Release command failed: {}", e);
                    Delivery::Failed(e.to_string())
                }
            },
            None => Delivery::Simulated,
        };

        let association = match self.associations.remove(&tag) {
            Some(association) => association,
            None => Association::new(tag, product),
        };
        info!(tag = %association.tag, product = %association.product, "Export confirmed, tag released");

        (WorkflowState::Idle, Outcome::Exported { association, release })
    }
}

fn report(indicator: IndicatorId, result: Result<u32>) -> Delivery {
    match result {
        Ok(sequence) => Delivery::Sent {
            indicator,
            sequence,
        },
        Err(e) => {
            warn!(indicator = indicator.get(), "Activate command failed: {}", e);
            Delivery::Failed(e.to_string())
        }
    }
}
