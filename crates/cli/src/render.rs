//! Plain-text rendering of the product table and detail panel.

use std::io::{self, Write};

use catalog_admin_core::{Pagination, Product};

const fn status_label(enabled: bool) -> &'static str {
    if enabled { "enabled" } else { "disabled" }
}

/// Write the product table followed by the pagination line.
pub fn write_products(
    out: &mut impl Write,
    products: &[Product],
    pagination: &Pagination,
) -> io::Result<()> {
    if products.is_empty() {
        writeln!(out, "No products.")?;
    } else {
        writeln!(
            out,
            "{:<22} {:<12} {:>10} {:>10} {:<8}  TITLE",
            "ID", "CATEGORY", "ORIGIN", "PRICE", "STATUS"
        )?;
        for product in products {
            writeln!(
                out,
                "{:<22} {:<12} {:>10} {:>10} {:<8}  {}",
                product.id.as_str(),
                product.category,
                product.origin_price.to_string(),
                product.price.to_string(),
                status_label(product.is_enabled),
                product.title
            )?;
        }
    }

    if pagination.total_pages > 0 {
        write!(
            out,
            "Page {} of {}",
            pagination.current_page, pagination.total_pages
        )?;
        if !pagination.category.is_empty() {
            write!(out, " in '{}'", pagination.category)?;
        }
        if let Some(previous) = pagination.previous_page() {
            write!(out, "  (previous: --page {previous})")?;
        }
        if let Some(next) = pagination.next_page() {
            write!(out, "  (next: --page {next})")?;
        }
        writeln!(out)?;
    }
    Ok(())
}

/// Write the detail panel for one product.
pub fn write_product(out: &mut impl Write, product: &Product) -> io::Result<()> {
    writeln!(out, "{} [{}]", product.title, status_label(product.is_enabled))?;
    writeln!(out, "  id:          {}", product.id)?;
    writeln!(out, "  category:    {}", product.category)?;
    if product.origin_price == product.price {
        writeln!(out, "  price:       {} / {}", product.price, product.unit)?;
    } else {
        writeln!(
            out,
            "  price:       {} / {} (was {})",
            product.price, product.unit, product.origin_price
        )?;
    }
    if !product.description.is_empty() {
        writeln!(out, "  description: {}", product.description)?;
    }
    if !product.content.is_empty() {
        writeln!(out, "  content:     {}", product.content)?;
    }
    if !product.image_url.is_empty() {
        writeln!(out, "  image:       {}", product.image_url)?;
    }
    for url in product.images_url.iter().filter(|url| !url.is_empty()) {
        writeln!(out, "  more:        {url}")?;
    }
    Ok(())
}
