use crate::store::StoreSelectors;

/// What the detail view can show for its identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailPhase {
    /// No fetch has completed yet, or a loader-visible fetch is in flight.
    NotYetFetched,
    /// The server does not know the identifier or refuses to show it.
    FetchedNotFound,
    FetchedFound,
}

impl DetailPhase {
    pub fn resolve(store: &impl StoreSelectors, workflow_id: &str) -> Self {
        if !store.is_fetched(workflow_id) || store.is_loading(workflow_id) {
            return Self::NotYetFetched;
        }
        if store.workflow(workflow_id).is_some() {
            Self::FetchedFound
        } else {
            Self::FetchedNotFound
        }
    }
}
