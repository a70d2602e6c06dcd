use serde::{Deserialize, Serialize};

/// A row of the `product` table.
///
/// `id` is `None` until the record has been saved; once the store assigns it
/// there is no way to change it through this type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    id: Option<i64>,
    name: String,
    price: f64,
}

impl Product {
    /// Create an unsaved product
    pub fn new(name: impl Into<String>, price: f64) -> Self {
        Self {
            id: None,
            name: name.into(),
            price,
        }
    }

    pub(crate) fn persisted(id: i64, name: String, price: f64) -> Self {
        Self {
            id: Some(id),
            name,
            price,
        }
    }

    pub fn id(&self) -> Option<i64> {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn price(&self) -> f64 {
        self.price
    }

    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_price(mut self, price: f64) -> Self {
        self.price = price;
        self
    }

    // Only the insert path may assign the key.
    pub(crate) fn assign_id(&mut self, id: i64) {
        self.id = Some(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_product_is_not_persisted() {
        let product = Product::new("Widget", 9.99);
        assert_eq!(product.id(), None);
        assert!(!product.is_persisted());
        assert_eq!(product.name(), "Widget");
        assert_eq!(product.price(), 9.99);
    }

    #[test]
    fn builders_keep_the_id() {
        let product = Product::persisted(7, "Widget".to_string(), 9.99)
            .with_name("Gadget")
            .with_price(12.5);
        assert_eq!(product.id(), Some(7));
        assert_eq!(product.name(), "Gadget");
        assert_eq!(product.price(), 12.5);
    }

    #[test]
    fn deserializes_without_id() {
        let product: Product = toml::from_str("name = \"Widget\"\nprice = 9.99\n").unwrap();
        assert_eq!(product, Product::new("Widget", 9.99));
    }
}
