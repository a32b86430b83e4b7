use super::ExtractedProduct;

/// Fixed sample returned when no vision model is configured.
pub fn demo_product() -> ExtractedProduct {
    ExtractedProduct {
        title: "Modern Furniture Piece".to_string(),
        vendor: Some("Design Studio".to_string()),
        price: Some(1500.0),
        currency: "USD".to_string(),
        description: Some(
            "A beautifully crafted modern furniture piece with premium materials and elegant design."
                .to_string(),
        ),
        colour_hex: Some("#8B4513".to_string()),
        category: Some("Furniture".to_string()),
        material: Some("Wood".to_string()),
        dimensions: None,
        features: vec!["Modern Design".to_string(), "Premium Materials".to_string()],
    }
}
