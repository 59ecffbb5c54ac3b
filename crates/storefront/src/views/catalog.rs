//! Product listing with search and category filter.

use askama::Template;
use tracing::error;

use super::{Loadable, Route};
use crate::api::{ApiClient, CatalogQuery, Product};

/// Category options offered by the filter.
pub const CATEGORIES: &[&str] = &["Electronics", "Accessories"];

/// Shown when the catalog fetch fails.
pub const FETCH_FAILED: &str = "Failed to fetch products";

/// Product display data for templates.
#[derive(Clone)]
struct ProductCard {
    name: String,
    price: String,
    category: String,
    description: String,
    path: String,
}

impl From<&Product> for ProductCard {
    fn from(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            price: product.price.display(),
            category: product.category.clone().unwrap_or_default(),
            description: product.description.clone().unwrap_or_default(),
            path: Route::Product(product.id.clone()).path(),
        }
    }
}

#[derive(Template)]
#[template(path = "catalog.txt")]
struct CatalogTemplate<'a> {
    search: &'a str,
    category: &'a str,
    categories: &'a [&'a str],
    loading: bool,
    failed: bool,
    error: &'a str,
    products: Vec<ProductCard>,
}

/// The catalog page.
#[derive(Debug, Default)]
pub struct CatalogView {
    query: CatalogQuery,
    state: Loadable<Vec<Product>>,
}

impl CatalogView {
    #[must_use]
    pub fn new(query: CatalogQuery) -> Self {
        Self {
            query,
            state: Loadable::Loading,
        }
    }

    /// Fetch the products matching the current filters.
    pub async fn mount(&mut self, api: &ApiClient) {
        self.state = Loadable::Loading;
        self.state = match api.search_products(&self.query).await {
            Ok(products) => Loadable::Loaded(products),
            Err(e) => {
                error!(error = %e, "Failed to fetch products");
                Loadable::Failed(FETCH_FAILED.to_string())
            }
        };
    }

    /// Replace the filters and fetch again.
    pub async fn search(&mut self, api: &ApiClient, query: CatalogQuery) {
        self.query = query;
        self.mount(api).await;
    }

    #[must_use]
    pub const fn state(&self) -> &Loadable<Vec<Product>> {
        &self.state
    }

    /// Render the page.
    ///
    /// # Errors
    ///
    /// Returns an error if the template fails to render.
    pub fn render(&self) -> Result<String, askama::Error> {
        CatalogTemplate {
            search: self.query.search().unwrap_or_default(),
            category: self.query.category().unwrap_or("All Categories"),
            categories: CATEGORIES,
            loading: self.state.is_loading(),
            failed: self.state.failure().is_some(),
            error: self.state.failure().unwrap_or_default(),
            products: self
                .state
                .loaded()
                .map(|products| products.iter().map(ProductCard::from).collect())
                .unwrap_or_default(),
        }
        .render()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use corner_store_core::{Price, ProductId};
    use rust_decimal::Decimal;

    use super::*;

    fn product(id: &str, name: &str) -> Product {
        Product {
            id: ProductId::new(id),
            name: name.to_string(),
            price: Price::new(Decimal::new(2450, 2)).unwrap(),
            sku: None,
            category: Some("Accessories".to_string()),
            description: None,
            updated_at: None,
        }
    }

    fn view(state: Loadable<Vec<Product>>) -> CatalogView {
        CatalogView {
            query: CatalogQuery::default(),
            state,
        }
    }

    #[test]
    fn test_loading_state() {
        let page = view(Loadable::Loading).render().unwrap();
        assert!(page.contains("Loading products..."));
    }

    #[test]
    fn test_empty_result_is_not_an_error() {
        let page = view(Loadable::Loaded(Vec::new())).render().unwrap();
        assert!(page.contains("No products found. Try different search criteria."));
        assert!(!page.contains(FETCH_FAILED));
    }

    #[test]
    fn test_failed_state() {
        let page = view(Loadable::Failed(FETCH_FAILED.to_string()))
            .render()
            .unwrap();
        assert!(page.contains(FETCH_FAILED));
        assert!(!page.contains("No products found"));
    }

    #[test]
    fn test_products_render_in_order() {
        let page = view(Loadable::Loaded(vec![
            product("1", "Mouse"),
            product("2", "Keyboard"),
        ]))
        .render()
        .unwrap();

        let mouse = page.find("Mouse - $24.50").unwrap();
        let keyboard = page.find("Keyboard - $24.50").unwrap();
        assert!(mouse < keyboard);
        assert!(page.contains("[View Details] /products/1"));
        assert!(page.contains("Categories: All Categories, Electronics, Accessories"));
    }

    #[test]
    fn test_filters_shown() {
        let view = CatalogView::new(CatalogQuery::new(
            Some("mouse".to_string()),
            Some("Accessories".to_string()),
        ));
        let page = view.render().unwrap();
        assert!(page.contains("Search: mouse | Category: Accessories"));
    }
}
