use tracing::{debug, instrument, trace};

use clusterd_metadata::cluster::Cluster;
use clusterd_metadata::store::{By, Store};

use crate::error::ControlApiError;
use crate::schema::{ListClustersFilters, ListClustersRequest, ListClustersResponse};
use crate::services::filter::{
    filter_clusters, filter_contains, filter_contains_prefix, filter_match_labels,
};

use super::ControlApi;

impl<S> ControlApi<S>
where
    S: Store<Object = Cluster>,
{
    #[instrument(skip(self, request))]
    pub async fn list_clusters(
        &self,
        request: ListClustersRequest,
    ) -> Result<ListClustersResponse, ControlApiError> {
        let by = select_index(request.filters.as_ref());
        trace!(?by, "cluster index");

        let candidates = self.store.view(|tx| tx.find(&by)).await?;

        let clusters = match &request.filters {
            Some(filters) => filter_clusters(
                candidates,
                &[
                    &|cluster: &Cluster| {
                        filter_contains(&cluster.spec.annotations.name, &filters.names)
                    },
                    &|cluster: &Cluster| filter_contains_prefix(&cluster.id, &filters.id_prefixes),
                    &|cluster: &Cluster| {
                        filter_match_labels(&cluster.spec.annotations.labels, &filters.labels)
                    },
                ],
            ),
            None => candidates,
        };

        debug!(count = clusters.len(), "listed clusters");
        Ok(ListClustersResponse::redacted(&clusters))
    }
}

/// names are the most selective index, then id prefixes
fn select_index(filters: Option<&ListClustersFilters>) -> By {
    match filters {
        Some(filters) if !filters.names.is_empty() => By::Names(filters.names.clone()),
        Some(filters) if !filters.id_prefixes.is_empty() => {
            By::IdPrefixes(filters.id_prefixes.clone())
        }
        _ => By::All,
    }
}
