//! Catalog commands: `products`, `show`, `create`, `edit`, `delete`.

use std::io::{self, Write};

use catalog_admin::{AdminConfig, AdminError};
use catalog_admin_core::{Draft, MAX_IMAGES, ProductId};
use clap::Args;

use super::{CommandError, Controller, alerted, mounted};
use crate::render;

/// Product form fields. Only the flags given are changed.
#[derive(Debug, Default, Args)]
pub struct DraftFields {
    /// Product name
    #[arg(long)]
    pub title: Option<String>,

    #[arg(long)]
    pub category: Option<String>,

    /// Unit of sale (e.g. "pc")
    #[arg(long)]
    pub unit: Option<String>,

    /// List price
    #[arg(long)]
    pub origin_price: Option<String>,

    /// Selling price
    #[arg(long)]
    pub price: Option<String>,

    #[arg(long)]
    pub description: Option<String>,

    /// Long-form product content
    #[arg(long)]
    pub content: Option<String>,

    /// Whether the product is on sale (`true`/`false`)
    #[arg(long)]
    pub enabled: Option<bool>,

    /// Main image URL
    #[arg(long)]
    pub image_url: Option<String>,

    /// Secondary image URL (repeatable)
    #[arg(long = "image")]
    pub images: Vec<String>,
}

impl DraftFields {
    /// Copy the given fields onto the draft. Secondary images are handled
    /// separately because they need free slots.
    pub fn apply(&self, draft: &mut Draft) {
        let text_fields = [
            (&self.title, &mut draft.title),
            (&self.category, &mut draft.category),
            (&self.unit, &mut draft.unit),
            (&self.origin_price, &mut draft.origin_price),
            (&self.price, &mut draft.price),
            (&self.description, &mut draft.description),
            (&self.content, &mut draft.content),
            (&self.image_url, &mut draft.image_url),
        ];
        for (value, field) in text_fields {
            if let Some(value) = value {
                field.clone_from(value);
            }
        }
        if let Some(enabled) = self.enabled {
            draft.is_enabled = enabled;
        }
    }
}

/// Show one page of the catalog.
///
/// # Errors
///
/// Returns `CommandError` if the session is unusable, the fetch fails or the
/// page does not exist.
pub async fn list(
    config: &AdminConfig,
    page: Option<u32>,
    category: Option<String>,
) -> Result<(), CommandError> {
    let mut state = mounted(config).await?;

    if category.is_some() {
        state
            .filter_category(category)
            .await
            .map_err(alerted(&mut state))?;
    }
    if let Some(page) = page
        && page != state.catalog().pagination().current_page
    {
        let moved = state.go_to_page(page).await.map_err(alerted(&mut state))?;
        if !moved {
            return Err(CommandError::PageOutOfRange {
                page,
                total_pages: state.catalog().pagination().total_pages,
            });
        }
    }

    render::write_products(
        &mut io::stdout().lock(),
        state.catalog().products(),
        state.catalog().pagination(),
    )?;
    Ok(())
}

/// Show the detail panel of one product, paging through the list to find it.
///
/// # Errors
///
/// Returns `CommandError` wrapping `AdminError::NotFound` for an unknown id.
pub async fn show(config: &AdminConfig, id: &str) -> Result<(), CommandError> {
    let mut state = mounted(config).await?;
    let id = ProductId::new(id);

    loop {
        if let Some(product) = state.select(&id) {
            render::write_product(&mut io::stdout().lock(), product)?;
            return Ok(());
        }
        let Some(next) = state.catalog().pagination().next_page() else {
            break;
        };
        if !state.go_to_page(next).await.map_err(alerted(&mut state))? {
            break;
        }
    }
    Err(AdminError::NotFound(id).into())
}

/// Create a product from the given fields.
///
/// # Errors
///
/// Returns `CommandError` if a price is not a number, there are too many
/// images, or the service rejects the product.
pub async fn create(config: &AdminConfig, fields: &DraftFields) -> Result<(), CommandError> {
    let mut state = mounted(config).await?;

    state.open_create();
    fields.apply(state.draft_mut());
    add_images(&mut state, &fields.images)?;

    let message = state.submit().await.map_err(alerted(&mut state))?;
    report(&state, message.as_deref())
}

/// Change the given fields of an existing product.
///
/// # Errors
///
/// Returns `CommandError` if the product does not exist, a price is not a
/// number, there are too many images, or the service rejects the change.
pub async fn edit(
    config: &AdminConfig,
    id: &str,
    fields: &DraftFields,
    clear_images: bool,
) -> Result<(), CommandError> {
    let mut state = mounted(config).await?;

    state
        .open_edit(&ProductId::new(id))
        .await
        .map_err(alerted(&mut state))?;
    fields.apply(state.draft_mut());
    if clear_images {
        while state.remove_image_slot().is_some() {}
    }
    add_images(&mut state, &fields.images)?;

    let message = state.submit().await.map_err(alerted(&mut state))?;
    report(&state, message.as_deref())
}

/// Delete a product.
///
/// # Errors
///
/// Returns `CommandError` if the service rejects the delete.
pub async fn delete(config: &AdminConfig, id: &str) -> Result<(), CommandError> {
    let mut state = mounted(config).await?;

    let message = state
        .delete(&ProductId::new(id))
        .await
        .map_err(alerted(&mut state))?;
    report(&state, message.as_deref())
}

/// Append each URL in a new image slot of the open form.
fn add_images(state: &mut Controller, images: &[String]) -> Result<(), CommandError> {
    for url in images {
        if !state.add_image_slot() {
            state.cancel();
            return Err(CommandError::TooManyImages { max: MAX_IMAGES });
        }
        let index = state.drafts().draft().images_url.len().saturating_sub(1);
        state
            .set_image(index, url.as_str())
            .map_err(alerted(state))?;
    }
    Ok(())
}

/// Print the service's confirmation and the refreshed page.
fn report(state: &Controller, message: Option<&str>) -> Result<(), CommandError> {
    let mut out = io::stdout().lock();
    writeln!(out, "{}", message.unwrap_or("Done"))?;
    render::write_products(&mut out, state.catalog().products(), state.catalog().pagination())?;
    Ok(())
}
