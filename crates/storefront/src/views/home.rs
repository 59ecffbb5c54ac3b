//! Landing page.

use askama::Template;

use super::Route;

#[derive(Template)]
#[template(path = "home.txt")]
struct HomeTemplate {
    products_path: String,
    start_path: String,
}

/// Welcome page pointing at the catalog and at sign-in.
#[derive(Debug, Clone, Copy, Default)]
pub struct HomeView;

impl HomeView {
    /// Render the page.
    ///
    /// # Errors
    ///
    /// Returns an error if the template fails to render.
    pub fn render(self) -> Result<String, askama::Error> {
        HomeTemplate {
            products_path: Route::Products.path(),
            start_path: Route::Login.path(),
        }
        .render()
    }
}
