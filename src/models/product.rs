use serde::{Deserialize, Serialize};
use strum::{Display, EnumCount, EnumIter, EnumString, IntoStaticStr};

/// A sellable item as stored in the search backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Backend-assigned document id; absent until the document has been indexed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Brand name
    pub brand: String,

    /// Product name
    pub name: String,

    /// Price in the catalog currency
    pub price: f64,

    /// Stock keeping units, in catalog order
    #[serde(default)]
    pub skus: Vec<Sku>,
}

impl Product {
    /// Create a new product without an id
    pub fn new(brand: impl Into<String>, name: impl Into<String>, price: f64) -> Self {
        Self {
            id: None,
            brand: brand.into(),
            name: name.into(),
            price,
            skus: Vec::new(),
        }
    }

    /// Add a SKU
    pub fn with_sku(mut self, color: impl Into<String>, size: impl Into<String>) -> Self {
        self.skus.push(Sku {
            color: color.into(),
            size: size.into(),
        });
        self
    }

    /// Copy of this product carrying the given backend id
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}

/// Nested variant of a product. Has no identity outside its parent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sku {
    pub color: String,
    pub size: String,
}

impl Sku {
    /// Size parsed against the closed size vocabulary
    pub fn size(&self) -> Option<Size> {
        self.size.parse().ok()
    }

    /// Color parsed against the closed color vocabulary
    pub fn color(&self) -> Option<Color> {
        self.color.parse().ok()
    }
}

/// Closed, ordered size vocabulary
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Display,
    EnumString,
    EnumIter,
    EnumCount,
    IntoStaticStr,
)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum Size {
    Xxs,
    Xs,
    S,
    M,
    L,
    Xl,
    Xxl,
    Xxxl,
}

/// Closed color vocabulary
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, EnumCount, IntoStaticStr,
)]
#[strum(ascii_case_insensitive)]
pub enum Color {
    Green,
    Black,
    White,
    Blue,
    Yellow,
    Red,
    Brown,
    Orange,
    Grey,
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_size_parsing_is_case_insensitive() {
        assert_eq!("xl".parse::<Size>().unwrap(), Size::Xl);
        assert_eq!("XXXL".parse::<Size>().unwrap(), Size::Xxxl);
        assert_eq!("m".parse::<Size>().unwrap(), Size::M);
        assert!("medium".parse::<Size>().is_err());
    }

    #[test]
    fn test_size_canonical_form() {
        assert_eq!(Size::Xxs.to_string(), "XXS");
        assert_eq!(Size::L.to_string(), "L");
    }

    #[test]
    fn test_size_order() {
        let sizes: Vec<Size> = Size::iter().collect();
        let mut sorted = sizes.clone();
        sorted.sort();
        assert_eq!(sizes, sorted);
        assert_eq!(sizes.first(), Some(&Size::Xxs));
        assert_eq!(sizes.last(), Some(&Size::Xxxl));
    }

    #[test]
    fn test_color_canonical_form() {
        assert_eq!("BLUE".parse::<Color>().unwrap(), Color::Blue);
        assert_eq!(Color::Grey.to_string(), "Grey");
        assert!("purple".parse::<Color>().is_err());
    }

    #[test]
    fn test_sku_accessors() {
        let product = Product::new("Levi's", "501 jeans", 89.0).with_sku("Blue", "M");
        let sku = &product.skus[0];
        assert_eq!(sku.size(), Some(Size::M));
        assert_eq!(sku.color(), Some(Color::Blue));
    }

    #[test]
    fn test_product_serialization_omits_missing_id() {
        let product = Product::new("Levi's", "501 jeans", 89.0);
        let json = serde_json::to_value(&product).unwrap();
        assert!(json.get("id").is_none());

        let json = serde_json::to_value(product.with_id("abc")).unwrap();
        assert_eq!(json["id"], "abc");
    }
}
