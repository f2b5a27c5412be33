//! The product list as last fetched.

use catalog_admin_core::{Pagination, Product, ProductId};
use secrecy::SecretString;
use tracing::{debug, instrument};

use crate::api::{ApiError, CatalogApi, ProductPage, ProductQuery};

/// One page of the tenant's catalog.
///
/// Replaced wholesale by every successful fetch and left untouched by a
/// failed one. Mutations are never applied locally.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    products: Vec<Product>,
    pagination: Pagination,
    query: ProductQuery,
    selected: Option<ProductId>,
}

impl Catalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    #[must_use]
    pub const fn pagination(&self) -> &Pagination {
        &self.pagination
    }

    /// Page and category the next refresh will fetch.
    #[must_use]
    pub const fn query(&self) -> &ProductQuery {
        &self.query
    }

    /// Filter by category (or clear the filter) starting from the first page.
    /// Takes effect on the next refresh.
    pub fn set_category(&mut self, category: Option<String>) {
        self.query = ProductQuery {
            page: None,
            category: category.filter(|c| !c.is_empty()),
        };
    }

    /// Re-fetch the current page.
    ///
    /// # Errors
    ///
    /// Returns the `ApiError` of the failed fetch; the previous list stays.
    #[instrument(skip(self, api, token), fields(query = ?self.query))]
    pub async fn refresh<A: CatalogApi>(
        &mut self,
        api: &A,
        token: &SecretString,
    ) -> Result<&[Product], ApiError> {
        let page = api.list_products(token, &self.query).await?;
        self.replace(page);
        Ok(&self.products)
    }

    /// Fetch page `page`, keeping the category filter.
    ///
    /// Returns `false` without a request when the page is outside the last
    /// known page range.
    ///
    /// # Errors
    ///
    /// Returns the `ApiError` of the failed fetch; the previous list stays.
    #[instrument(skip(self, api, token))]
    pub async fn go_to_page<A: CatalogApi>(
        &mut self,
        api: &A,
        token: &SecretString,
        page: u32,
    ) -> Result<bool, ApiError> {
        let known_range = self.pagination.total_pages > 0;
        if page == 0 || (known_range && !self.pagination.contains(page)) {
            debug!(total_pages = self.pagination.total_pages, "Ignoring out-of-range page");
            return Ok(false);
        }

        let query = self.query.with_page(page);
        let result = api.list_products(token, &query).await?;
        self.query = query;
        self.replace(result);
        Ok(true)
    }

    /// Remember `id` for the detail view if it is on the current page.
    pub fn select(&mut self, id: &ProductId) -> Option<&Product> {
        let found = self.products.iter().any(|p| &p.id == id);
        self.selected = found.then(|| id.clone());
        self.selected()
    }

    /// The product chosen for the detail view.
    #[must_use]
    pub fn selected(&self) -> Option<&Product> {
        let id = self.selected.as_ref()?;
        self.products.iter().find(|p| &p.id == id)
    }

    /// Forget everything, e.g. after sign-out.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    fn replace(&mut self, page: ProductPage) {
        self.products = page.products;
        self.pagination = page.pagination;
        if self.selected().is_none() {
            self.selected = None;
        }
    }
}
