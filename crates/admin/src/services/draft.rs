//! Create/edit workflow around a single [`Draft`].
//!
//! ```text
//! Closed ──open_create──▶ Creating ──submit/cancel──▶ Closed
//! Closed ──open_edit────▶ Editing(id) ─submit/cancel─▶ Closed
//! ```

use catalog_admin_core::{Draft, DraftError, Product, ProductId, ProductPayload};
use secrecy::SecretString;
use tracing::{debug, instrument};

use crate::api::CatalogApi;
use crate::error::AdminError;

/// Which form is open.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Modal {
    #[default]
    Closed,
    Creating,
    Editing(ProductId),
}

/// A request ready to be sent, taken out of the workflow by
/// [`DraftWorkflow::begin_submit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    Create(ProductPayload),
    Update(ProductId, ProductPayload),
}

/// The form state: which modal is open and the draft behind it.
#[derive(Debug, Clone, Default)]
pub struct DraftWorkflow {
    modal: Modal,
    draft: Draft,
}

impl DraftWorkflow {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn modal(&self) -> &Modal {
        &self.modal
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.modal != Modal::Closed
    }

    #[must_use]
    pub const fn draft(&self) -> &Draft {
        &self.draft
    }

    /// Field access for the open form.
    ///
    /// A closed workflow holds the template, which the next `open_*` resets.
    pub const fn draft_mut(&mut self) -> &mut Draft {
        &mut self.draft
    }

    /// Open the empty form.
    pub fn open_create(&mut self) {
        self.draft = Draft::template();
        self.modal = Modal::Creating;
    }

    /// Load product `id` from the service and open it for editing.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::NotFound` for an unknown id and `AdminError::Api`
    /// if the fetch fails. The workflow is unchanged on error.
    #[instrument(skip(self, api, token), fields(product_id = %id))]
    pub async fn open_edit<A: CatalogApi>(
        &mut self,
        api: &A,
        token: &SecretString,
        id: &ProductId,
    ) -> Result<(), AdminError> {
        let products = api.all_products(token).await?;
        let product = products
            .get(id)
            .ok_or_else(|| AdminError::NotFound(id.clone()))?;
        self.open_edit_with(product);
        Ok(())
    }

    /// Open an already-fetched product for editing.
    pub fn open_edit_with(&mut self, product: &Product) {
        self.draft = Draft::from_product(product);
        self.modal = Modal::Editing(product.id.clone());
    }

    /// Append an empty image slot; `false` when already full.
    pub fn add_image_slot(&mut self) -> bool {
        self.draft.add_image_slot()
    }

    /// Remove the last image slot, returning its URL.
    pub fn remove_image_slot(&mut self) -> Option<String> {
        self.draft.remove_image_slot()
    }

    /// Set the URL in an existing image slot.
    ///
    /// # Errors
    ///
    /// Returns `DraftError::NoSuchSlot` if `index` has no slot.
    pub fn set_image(&mut self, index: usize, url: impl Into<String>) -> Result<(), DraftError> {
        self.draft.images_url.set(index, url)
    }

    /// Close without submitting and discard the draft.
    pub fn cancel(&mut self) {
        self.reset();
    }

    /// Turn the open draft into a request and close the form.
    ///
    /// `Ok(None)` when nothing is open or the edited id is empty. On a price
    /// that cannot be coerced the form stays open so it can be corrected.
    ///
    /// # Errors
    ///
    /// Returns `DraftError::InvalidPrice` if a price field is not a number.
    pub fn begin_submit(&mut self) -> Result<Option<Submission>, DraftError> {
        match &self.modal {
            Modal::Closed => return Ok(None),
            Modal::Editing(id) if id.is_empty() => {
                debug!("Ignoring submit for an empty product id");
                return Ok(None);
            }
            Modal::Creating | Modal::Editing(_) => {}
        }

        let payload = self.draft.to_payload()?;
        let submission = match std::mem::take(&mut self.modal) {
            Modal::Editing(id) => Submission::Update(id, payload),
            Modal::Creating | Modal::Closed => Submission::Create(payload),
        };
        self.reset();
        Ok(Some(submission))
    }

    fn reset(&mut self) {
        self.modal = Modal::Closed;
        self.draft = Draft::template();
    }
}
