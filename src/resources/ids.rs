//! Global ID formatting for Admin API entities.
//!
//! The Admin GraphQL API addresses entities by global IDs of the form
//! `gid://shopify/<Resource>/<numeric-id>`.

use std::fmt;

/// Resource kinds this crate formats global IDs for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GidResource {
    /// A product.
    Product,
    /// A product variant.
    ProductVariant,
    /// An inventory item.
    InventoryItem,
    /// A location.
    Location,
    /// An order.
    Order,
}

impl GidResource {
    const fn path_segment(self) -> &'static str {
        match self {
            Self::Product => "Product",
            Self::ProductVariant => "ProductVariant",
            Self::InventoryItem => "InventoryItem",
            Self::Location => "Location",
            Self::Order => "Order",
        }
    }
}

impl fmt::Display for GidResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path_segment())
    }
}

/// Formats a numeric ID as an Admin API global ID.
///
/// # Example
///
/// ```rust
/// use shopify_bulk::resources::ids::{gid, GidResource};
///
/// assert_eq!(
///     gid(GidResource::ProductVariant, 123),
///     "gid://shopify/ProductVariant/123"
/// );
/// ```
#[must_use]
pub fn gid(resource: GidResource, id: u64) -> String {
    format!("gid://shopify/{resource}/{id}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gid_formats_each_resource() {
        assert_eq!(gid(GidResource::Product, 1), "gid://shopify/Product/1");
        assert_eq!(
            gid(GidResource::ProductVariant, 42),
            "gid://shopify/ProductVariant/42"
        );
        assert_eq!(
            gid(GidResource::InventoryItem, 7),
            "gid://shopify/InventoryItem/7"
        );
        assert_eq!(gid(GidResource::Location, 9), "gid://shopify/Location/9");
        assert_eq!(gid(GidResource::Order, 1001), "gid://shopify/Order/1001");
    }
}
