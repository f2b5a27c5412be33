//! Product records as exchanged with the catalog service.
//!
//! The service mixes naming styles: price and flag fields are snake case
//! (`origin_price`, `is_enabled`) while image fields are camel case
//! (`imageUrl`, `imagesUrl`). The serde attributes below pin that shape.

use serde::{Deserialize, Serialize};

use super::id::ProductId;
use super::price::Price;

/// A product owned by the remote catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Service-assigned key.
    pub id: ProductId,
    /// Service-assigned ordinal.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num: Option<u64>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub origin_price: Price,
    #[serde(default)]
    pub price: Price,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub content: String,
    #[serde(default, with = "enabled_flag")]
    pub is_enabled: bool,
    /// Primary image.
    #[serde(default, rename = "imageUrl")]
    pub image_url: String,
    /// Secondary images, in display order.
    #[serde(default, rename = "imagesUrl")]
    pub images_url: Vec<String>,
}

/// A product body for create and update requests: everything but `id`/`num`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductPayload {
    pub title: String,
    pub category: String,
    pub unit: String,
    pub origin_price: Price,
    pub price: Price,
    pub description: String,
    pub content: String,
    #[serde(with = "enabled_flag")]
    pub is_enabled: bool,
    #[serde(rename = "imageUrl")]
    pub image_url: String,
    #[serde(rename = "imagesUrl")]
    pub images_url: Vec<String>,
}

impl ProductPayload {
    /// Attach a service key, yielding the product the service will store.
    #[must_use]
    pub fn into_product(self, id: ProductId, num: Option<u64>) -> Product {
        Product {
            id,
            num,
            title: self.title,
            category: self.category,
            unit: self.unit,
            origin_price: self.origin_price,
            price: self.price,
            description: self.description,
            content: self.content,
            is_enabled: self.is_enabled,
            image_url: self.image_url,
            images_url: self.images_url,
        }
    }
}

impl From<Product> for ProductPayload {
    fn from(product: Product) -> Self {
        Self {
            title: product.title,
            category: product.category,
            unit: product.unit,
            origin_price: product.origin_price,
            price: product.price,
            description: product.description,
            content: product.content,
            is_enabled: product.is_enabled,
            image_url: product.image_url,
            images_url: product
                .images_url
                .into_iter()
                .filter(|url| !url.is_empty())
                .collect(),
        }
    }
}

/// The `{ "data": ... }` wrapper every write request uses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataEnvelope<T> {
    pub data: T,
}

impl<T> DataEnvelope<T> {
    /// Wrap a body.
    pub const fn new(data: T) -> Self {
        Self { data }
    }
}

/// `is_enabled` is `1`/`0` on the wire; booleans are accepted on read.
mod enabled_flag {
    use core::fmt;

    use serde::de::{self, Visitor};
    use serde::{Deserializer, Serializer};

    #[allow(clippy::trivially_copy_pass_by_ref)] // signature fixed by serde's `with`
    pub fn serialize<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(u8::from(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        deserializer.deserialize_any(FlagVisitor)
    }

    struct FlagVisitor;

    impl Visitor<'_> for FlagVisitor {
        type Value = bool;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a boolean or 0/1")
        }

        fn visit_bool<E: de::Error>(self, v: bool) -> Result<bool, E> {
            Ok(v)
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<bool, E> {
            Ok(v != 0)
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<bool, E> {
            Ok(v != 0)
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<bool, E> {
            match v {
                "1" | "true" => Ok(true),
                "0" | "false" | "" => Ok(false),
                other => Err(E::invalid_value(de::Unexpected::Str(other), &self)),
            }
        }
    }
}
