//! Containers driving the Bills and NewBill pages
//!
//! Containers hold no view code. They talk to a [`Store`](crate::core::Store),
//! receive the session explicitly and report navigation and preview requests
//! through small traits.

pub mod bills;
pub mod new_bill;

pub use bills::{BILL_URL_ATTRIBUTE, BillsList, PreviewElement, PreviewPresenter, sort_by_date};
pub use new_bill::{FormFields, FormState, NewBillForm, SelectedFile};

use std::sync::Arc;

/// A collection of elements sharing one click callback
///
/// Firing an element invokes the callback once with that element.
pub struct Bindings<E> {
    elements: Vec<E>,
    callback: Arc<dyn Fn(&E) + Send + Sync>,
}

impl<E> Bindings<E> {
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn elements(&self) -> &[E] {
        &self.elements
    }

    /// Simulate a click on the element at `index`
    ///
    /// Returns `false` when there is no such element.
    pub fn fire(&self, index: usize) -> bool {
        match self.elements.get(index) {
            Some(element) => {
                (self.callback)(element);
                true
            }
            None => false,
        }
    }

    /// Simulate a click on every element in order
    pub fn fire_all(&self) {
        for element in &self.elements {
            (self.callback)(element);
        }
    }
}

/// Bind `callback` to every element of `elements`
pub fn bind_each<E, F>(elements: Vec<E>, callback: F) -> Bindings<E>
where
    F: Fn(&E) + Send + Sync + 'static,
{
    Bindings {
        elements,
        callback: Arc::new(callback),
    }
}
