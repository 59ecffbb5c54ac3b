//! Admin reports: revenue, category statistics, top customers.
//!
//! The three reports are fetched concurrently and shown together. If any of
//! them fails the page shows every section empty rather than a partial
//! picture.

use askama::Template;
use corner_store_core::format_money;
use tracing::{error, instrument};

use super::Loadable;
use crate::api::{ApiClient, CategoryStat, DailyRevenue, TopCustomer, format_date};
use crate::session::User;

/// All three reports, fetched together.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reports {
    pub daily_revenue: Vec<DailyRevenue>,
    pub category_stats: Vec<CategoryStat>,
    pub top_customers: Vec<TopCustomer>,
}

impl Reports {
    /// Fetch every report concurrently.
    ///
    /// Returns `None` if any request fails; each failure is logged.
    #[instrument(skip(api))]
    pub async fn fetch(api: &ApiClient) -> Option<Self> {
        let (revenue, categories, customers) = tokio::join!(
            api.daily_revenue(),
            api.category_stats(),
            api.top_customers(),
        );

        let daily_revenue = revenue
            .inspect_err(|e| error!(error = %e, "Failed to fetch daily revenue"))
            .ok();
        let category_stats = categories
            .inspect_err(|e| error!(error = %e, "Failed to fetch category stats"))
            .ok();
        let top_customers = customers
            .inspect_err(|e| error!(error = %e, "Failed to fetch top customers"))
            .ok();

        Some(Self {
            daily_revenue: daily_revenue?,
            category_stats: category_stats?,
            top_customers: top_customers?,
        })
    }
}

struct RevenueRow {
    date: String,
    revenue: String,
    order_count: i64,
}

struct CategoryRow {
    category: String,
    product_count: i64,
    average_price: String,
}

struct CustomerRow {
    name: String,
    email: String,
    order_count: i64,
    total_spent: String,
}

#[derive(Template)]
#[template(path = "reports.txt")]
struct ReportsTemplate {
    is_admin: bool,
    loading: bool,
    revenue: Vec<RevenueRow>,
    categories: Vec<CategoryRow>,
    customers: Vec<CustomerRow>,
}

/// The reports page. Only offered to admins.
#[derive(Debug)]
pub struct ReportsView {
    user: Option<User>,
    state: Loadable<Reports>,
}

impl ReportsView {
    #[must_use]
    pub const fn new(user: Option<User>) -> Self {
        Self {
            user,
            state: Loadable::Loading,
        }
    }

    fn is_admin(&self) -> bool {
        self.user.as_ref().is_some_and(User::is_admin)
    }

    /// Fetch the reports. Non-admins make no requests.
    pub async fn mount(&mut self, api: &ApiClient) {
        if !self.is_admin() {
            return;
        }
        self.state = Loadable::Loading;
        self.state = match Reports::fetch(api).await {
            Some(reports) => Loadable::Loaded(reports),
            None => Loadable::Failed("Error fetching reports".to_string()),
        };
    }

    #[must_use]
    pub const fn state(&self) -> &Loadable<Reports> {
        &self.state
    }

    /// Render the page.
    ///
    /// # Errors
    ///
    /// Returns an error if the template fails to render.
    pub fn render(&self) -> Result<String, askama::Error> {
        let empty = Reports::default();
        let reports = self.state.loaded().unwrap_or(&empty);

        ReportsTemplate {
            is_admin: self.is_admin(),
            loading: self.state.is_loading(),
            revenue: reports
                .daily_revenue
                .iter()
                .map(|day| RevenueRow {
                    date: format_date(&day.date),
                    revenue: format_money(day.revenue),
                    order_count: day.order_count,
                })
                .collect(),
            categories: reports
                .category_stats
                .iter()
                .map(|stat| CategoryRow {
                    category: stat.category.clone(),
                    product_count: stat.product_count,
                    average_price: format_money(stat.average_price),
                })
                .collect(),
            customers: reports
                .top_customers
                .iter()
                .map(|customer| CustomerRow {
                    name: customer.name.clone(),
                    email: customer.email.clone(),
                    order_count: customer.order_count,
                    total_spent: format_money(customer.total_spent),
                })
                .collect(),
        }
        .render()
    }
}
