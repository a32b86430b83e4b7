const RETAILER_HINTS: &[(&str, &str)] = &[
    ("wayfair", "furniture and home decor retailer"),
    ("ikea", "Swedish furniture retailer"),
    ("westelm", "modern furniture retailer"),
    ("cb2", "contemporary furniture retailer"),
    ("crateandbarrel", "furniture and housewares retailer"),
    ("potterybarn", "home furnishings retailer"),
    ("article", "modern furniture retailer"),
    ("overstock", "discount home goods retailer"),
    ("homedepot", "home improvement retailer"),
    ("lowes", "home improvement retailer"),
    ("target", "general merchandise retailer"),
    ("walmart", "general merchandise retailer"),
    ("amazon", "e-commerce marketplace"),
];

/// Source and page hints, joined with ` | `. Empty when neither is known.
pub fn build_context(source_url: Option<&str>, page_title: Option<&str>) -> String {
    let mut parts = Vec::new();

    if let Some(domain) = source_url
        .and_then(|url| reqwest::Url::parse(url).ok())
        .and_then(|url| url.host_str().map(str::to_lowercase))
    {
        match RETAILER_HINTS.iter().find(|(key, _)| domain.contains(key)) {
            Some((_, hint)) => parts.push(format!("Source: {hint} ({domain})")),
            None => parts.push(format!("Source website: {domain}")),
        }
    }

    if let Some(title) = page_title.map(str::trim).filter(|t| !t.is_empty()) {
        parts.push(format!("Page title: {title}"));
    }

    parts.join(" | ")
}

pub fn extraction_prompt(context: &str) -> String {
    let context_section = if context.is_empty() {
        String::new()
    } else {
        format!("\n\nContext: {context}")
    };

    format!(
        r##"Analyze this product image and extract structured information. Focus on furniture, fixtures, and equipment (FF&E) products.

Extract the following information and return ONLY valid JSON:

{{
  "title": "Product name or title",
  "vendor": "Brand or manufacturer name",
  "price": numeric_price_value_or_null,
  "currency": "USD" or other currency code,
  "description": "Brief product description",
  "colour_hex": "#RRGGBB" color code of dominant color,
  "category": "Primary category (e.g., 'Sofa', 'Chair', 'Table', 'Lighting', 'Decor')",
  "material": "Primary material (e.g., 'Wood', 'Metal', 'Fabric', 'Leather')",
  "dimensions": "Product dimensions if visible",
  "features": ["key", "product", "features"]
}}

Guidelines:
- If information is not visible/available, use null
- For price, extract only numeric value (no currency symbols)
- Color should be the dominant/primary color as hex
- Category should be specific (Chair, not Furniture)
- Description should be concise (1-2 sentences max)
- Features should be factual attributes visible in image{context_section}

Return only the JSON object, no additional text or formatting."##
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_retailer_gets_a_hint() {
        let ctx = build_context(Some("https://www.westelm.com/products/sofa"), Some("Harmony Sofa"));
        assert_eq!(
            ctx,
            "Source: modern furniture retailer (www.westelm.com) | Page title: Harmony Sofa"
        );
    }

    #[test]
    fn unknown_domain_is_named() {
        assert_eq!(
            build_context(Some("https://shop.example.org/x"), None),
            "Source website: shop.example.org"
        );
    }

    #[test]
    fn empty_context() {
        assert_eq!(build_context(None, Some("  ")), "");
        assert_eq!(build_context(Some("not a url"), None), "");
    }

    #[test]
    fn prompt_appends_context_only_when_present() {
        assert!(!extraction_prompt("").contains("Context:"));
        assert!(extraction_prompt("Source website: a.com").contains("\n\nContext: Source website: a.com"));
        assert!(extraction_prompt("").contains(r##""colour_hex": "#RRGGBB""##));
    }
}
