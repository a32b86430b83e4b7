use crate::models::{ExtractionResponse, Item};

/// Descriptive fields an embedding is computed from.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddingFields<'a> {
    pub title: Option<&'a str>,
    pub vendor: Option<&'a str>,
    pub category: Option<&'a str>,
    pub material: Option<&'a str>,
    pub description: Option<&'a str>,
    pub colour_hex: Option<&'a str>,
    pub price: Option<f64>,
    pub currency: Option<&'a str>,
}

impl<'a> From<&'a Item> for EmbeddingFields<'a> {
    fn from(item: &'a Item) -> Self {
        Self {
            title: item.title.as_deref(),
            vendor: item.vendor.as_deref(),
            category: item.category.as_deref(),
            material: item.material.as_deref(),
            description: item.description.as_deref(),
            colour_hex: item.colour_hex.as_deref(),
            price: item.price,
            currency: item.currency.as_deref(),
        }
    }
}

impl<'a> From<&'a ExtractionResponse> for EmbeddingFields<'a> {
    fn from(data: &'a ExtractionResponse) -> Self {
        Self {
            title: Some(data.title.as_str()),
            vendor: data.vendor.as_deref(),
            category: data.category.as_deref(),
            material: data.material.as_deref(),
            description: data.description.as_deref(),
            colour_hex: data.colour_hex.as_deref(),
            price: data.price,
            currency: Some(data.currency.as_str()),
        }
    }
}

/// `Product: … | Brand: … | …`; empty when nothing descriptive is set.
pub fn embedding_text<'a>(fields: impl Into<EmbeddingFields<'a>>) -> String {
    let f = fields.into();
    let labelled = [
        ("Product", f.title),
        ("Brand", f.vendor),
        ("Category", f.category),
        ("Material", f.material),
        ("Description", f.description),
        ("Color", f.colour_hex),
    ];

    let mut parts: Vec<String> = labelled
        .into_iter()
        .filter_map(|(label, value)| {
            value
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(|v| format!("{label}: {v}"))
        })
        .collect();

    if let (Some(price), Some(currency)) = (f.price.filter(|p| *p != 0.0), f.currency)
        && !currency.is_empty()
    {
        parts.push(format!("Price: {price} {currency}"));
    }

    parts.join(" | ")
}
