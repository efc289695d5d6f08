//! Bills page container: listing, preview and navigation to a new bill

use crate::containers::{Bindings, bind_each};
use crate::core::bill::BillRecord;
use crate::core::error::StoreError;
use crate::core::format::format_date;
use crate::core::routes::{Navigator, RoutesPath};
use crate::core::store::Store;
use chrono::NaiveDate;
use indexmap::IndexMap;
use regex::Regex;
use std::sync::{Arc, LazyLock};
use tracing::{debug, warn};

/// Attribute holding the attachment URL on a preview icon
pub const BILL_URL_ATTRIBUTE: &str = "data-bill-url";

static ISO_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(19|20)\d\d[- /.](0[1-9]|1[012])[- /.](0[1-9]|[12][0-9]|3[01])$")
        .expect("valid ISO date pattern")
});

/// Opaque UI element carrying attributes, such as an "eye" icon
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreviewElement {
    attributes: IndexMap<String, String>,
}

impl PreviewElement {
    /// Element pointing at the attachment `bill_url`
    pub fn new(bill_url: impl Into<String>) -> Self {
        Self::default().with_attribute(BILL_URL_ATTRIBUTE, bill_url)
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn bill_url(&self) -> Option<&str> {
        self.attribute(BILL_URL_ATTRIBUTE)
    }
}

/// Surface showing an attachment preview (the modal in the web client)
pub trait PreviewPresenter: Send + Sync {
    fn show(&self, element: &PreviewElement);
}

impl<F> PreviewPresenter for F
where
    F: Fn(&PreviewElement) + Send + Sync,
{
    fn show(&self, element: &PreviewElement) {
        self(element)
    }
}

/// Container behind the employee Bills page
pub struct BillsList<S> {
    store: S,
    navigator: Arc<dyn Navigator>,
    presenter: Arc<dyn PreviewPresenter>,
}

impl<S: Store> BillsList<S> {
    pub fn new(
        store: S,
        navigator: Arc<dyn Navigator>,
        presenter: Arc<dyn PreviewPresenter>,
    ) -> Self {
        Self {
            store,
            navigator,
            presenter,
        }
    }

    /// Fetch every bill and format its date for display
    ///
    /// Issues exactly one `list` request per call. Records keep the store's
    /// order; a date that cannot be formatted is kept raw. Store failures
    /// are returned unchanged.
    pub async fn fetch_all(&self) -> Result<Vec<BillRecord>, StoreError> {
        let records = self
            .store
            .bills()
            .list()
            .await
            .inspect_err(|e| warn!(error = %e, "failed to fetch bills"))?;

        debug!(count = records.len(), "fetched bills");

        Ok(records
            .into_iter()
            .map(|mut record| {
                record.date = format_date(&record.date);
                record
            })
            .collect())
    }

    /// Show the attachment preview for `element`
    pub fn trigger_preview(&self, element: &PreviewElement) {
        debug!(bill_url = element.bill_url(), "preview requested");
        self.presenter.show(element);
    }

    /// Bind the preview trigger to every icon in `elements`
    pub fn bind_preview_triggers(&self, elements: Vec<PreviewElement>) -> Bindings<PreviewElement> {
        let presenter = self.presenter.clone();
        bind_each(elements, move |element| {
            debug!(bill_url = element.bill_url(), "preview requested");
            presenter.show(element);
        })
    }

    /// Go to the new bill form
    pub fn handle_click_new_bill(&self) {
        self.navigator.navigate(RoutesPath::NEW_BILL);
    }
}

/// Order raw records by date, earliest first
///
/// Only meaningful before [`BillsList::fetch_all`] formatting. Dates are
/// compared as calendar days whatever their separator; records whose date
/// is not `YYYY-MM-DD` shaped, or names no real day, go last, keeping their
/// relative order.
pub fn sort_by_date(records: &mut [BillRecord]) {
    records.sort_by_key(|record| {
        let day = sort_key(&record.date);
        (day.is_none(), day)
    });
}

fn sort_key(raw: &str) -> Option<NaiveDate> {
    if !ISO_DATE.is_match(raw) {
        return None;
    }
    let normalized: String = raw
        .chars()
        .map(|c| if matches!(c, '/' | '.' | ' ') { '-' } else { c })
        .collect();
    NaiveDate::parse_from_str(&normalized, "%Y-%m-%d").ok()
}
