use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Registers the `bearer_auth` scheme referenced by the domain handlers.
struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    components(
        schemas(axum_helpers::ErrorResponse)
    ),
    info(
        title = "Rolodex API",
        version = "0.1.0",
        description = "Product catalog, mood-board projects and semantic search for interior designers"
    ),
    servers(
        (url = "/api", description = "API base path")
    ),
    modifiers(&BearerAuth),
    nest(
        (path = "/items", api = domain_items::ApiDoc),
        (path = "/projects", api = domain_projects::ApiDoc),
        (path = "/searches", api = domain_searches::ApiDoc),
        (path = "/auth", api = domain_users::ApiDoc),
        (path = "/extension", api = crate::api::extension::ExtensionApiDoc)
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn documents_every_domain() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();

        for expected in [
            "/items",
            "/items/{id}/similar",
            "/projects/{id}/add_item",
            "/searches/{id}",
            "/auth/login",
            "/extension/deeplink",
        ] {
            assert!(
                paths.iter().any(|p| p.as_str() == expected),
                "missing {expected} in {paths:?}"
            );
        }

        let schemes = &doc.components.unwrap().security_schemes;
        assert!(schemes.contains_key("bearer_auth"));
    }
}
