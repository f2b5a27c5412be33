//! Product drafts: the working copy behind the create/edit form.
//!
//! A [`Draft`] holds exactly what the form shows. Prices stay as typed text
//! until submission, when [`Draft::to_payload`] coerces them into numbers and
//! drops blank image slots.

use super::price::{Price, PriceError};
use super::product::{Product, ProductPayload};

/// Maximum number of secondary image slots on a draft.
pub const MAX_IMAGES: usize = 5;

/// Errors raised while editing or converting a draft.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DraftError {
    /// A price field could not be coerced into a number.
    #[error("invalid {field}: {source}")]
    InvalidPrice {
        /// Form field name (`origin_price` or `price`).
        field: &'static str,
        #[source]
        source: PriceError,
    },

    /// An image slot index past the end of the list.
    #[error("no image slot {index} (draft has {len})")]
    NoSuchSlot {
        /// Requested slot.
        index: usize,
        /// Number of slots present.
        len: usize,
    },
}

/// Secondary image URLs, never more than [`MAX_IMAGES`].
///
/// Slots may hold empty strings while the form is being filled in.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ImageSlots(Vec<String>);

impl ImageSlots {
    /// No slots.
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Build slots from stored URLs, keeping at most [`MAX_IMAGES`].
    #[must_use]
    pub fn from_urls<I, S>(urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(urls.into_iter().take(MAX_IMAGES).map(Into::into).collect())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether another slot can be added.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.0.len() >= MAX_IMAGES
    }

    /// Append one empty slot. Returns `false` (and does nothing) when full.
    pub fn push_slot(&mut self) -> bool {
        if self.is_full() {
            return false;
        }
        self.0.push(String::new());
        true
    }

    /// Remove the last slot. Returns `None` (and does nothing) when empty.
    pub fn pop_slot(&mut self) -> Option<String> {
        self.0.pop()
    }

    /// Fill slot `index` with `url`.
    ///
    /// # Errors
    ///
    /// Returns `DraftError::NoSuchSlot` if the slot has not been added.
    pub fn set(&mut self, index: usize, url: impl Into<String>) -> Result<(), DraftError> {
        let len = self.0.len();
        let slot = self
            .0
            .get_mut(index)
            .ok_or(DraftError::NoSuchSlot { index, len })?;
        *slot = url.into();
        Ok(())
    }

    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

/// The product form's state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Draft {
    pub title: String,
    pub category: String,
    pub unit: String,
    /// Original price as typed.
    pub origin_price: String,
    /// Selling price as typed.
    pub price: String,
    pub description: String,
    pub content: String,
    pub is_enabled: bool,
    /// Primary image URL.
    pub image_url: String,
    /// Secondary image URLs.
    pub images_url: ImageSlots,
}

impl Default for Draft {
    fn default() -> Self {
        Self::template()
    }
}

impl Draft {
    /// The empty form: blank fields, enabled, no secondary images.
    #[must_use]
    pub const fn template() -> Self {
        Self {
            title: String::new(),
            category: String::new(),
            unit: String::new(),
            origin_price: String::new(),
            price: String::new(),
            description: String::new(),
            content: String::new(),
            is_enabled: true,
            image_url: String::new(),
            images_url: ImageSlots::new(),
        }
    }

    /// Load a stored product into the form, dropping `id` and `num`.
    #[must_use]
    pub fn from_product(product: &Product) -> Self {
        Self {
            title: product.title.clone(),
            category: product.category.clone(),
            unit: product.unit.clone(),
            origin_price: product.origin_price.to_string(),
            price: product.price.to_string(),
            description: product.description.clone(),
            content: product.content.clone(),
            is_enabled: product.is_enabled,
            image_url: product.image_url.clone(),
            images_url: ImageSlots::from_urls(product.images_url.iter().cloned()),
        }
    }

    /// Append an empty secondary image slot; no-op at [`MAX_IMAGES`].
    pub fn add_image_slot(&mut self) -> bool {
        self.images_url.push_slot()
    }

    /// Remove the last secondary image slot; no-op when there are none.
    pub fn remove_image_slot(&mut self) -> Option<String> {
        self.images_url.pop_slot()
    }

    /// Convert the form into a request body.
    ///
    /// # Errors
    ///
    /// Returns `DraftError::InvalidPrice` if either price is not a
    /// non-negative number.
    pub fn to_payload(&self) -> Result<ProductPayload, DraftError> {
        let origin_price = Price::parse_input(&self.origin_price).map_err(|source| {
            DraftError::InvalidPrice {
                field: "origin_price",
                source,
            }
        })?;
        let price = Price::parse_input(&self.price)
            .map_err(|source| DraftError::InvalidPrice {
                field: "price",
                source,
            })?;

        Ok(ProductPayload {
            title: self.title.clone(),
            category: self.category.clone(),
            unit: self.unit.clone(),
            origin_price,
            price,
            description: self.description.clone(),
            content: self.content.clone(),
            is_enabled: self.is_enabled,
            image_url: self.image_url.clone(),
            images_url: self
                .images_url
                .iter()
                .filter(|url| !url.is_empty())
                .map(str::to_owned)
                .collect(),
        })
    }
}
