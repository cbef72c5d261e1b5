use tracing::{debug, instrument};

use clusterd_metadata::cluster::Cluster;
use clusterd_metadata::store::Store;

use crate::error::ControlApiError;
use crate::schema::{GetClusterRequest, GetClusterResponse};

use super::ControlApi;

impl<S> ControlApi<S>
where
    S: Store<Object = Cluster>,
{
    #[instrument(skip(self, request), fields(cluster_id = %request.cluster_id))]
    pub async fn get_cluster(
        &self,
        request: GetClusterRequest,
    ) -> Result<GetClusterResponse, ControlApiError> {
        if request.cluster_id.is_empty() {
            return Err(ControlApiError::invalid_argument());
        }

        let cluster = self
            .store
            .view(|tx| tx.get(&request.cluster_id))
            .await
            .ok_or_else(|| ControlApiError::cluster_not_found(&request.cluster_id))?;

        debug!(version = %cluster.meta.version, "found cluster");
        Ok(GetClusterResponse::redacted(&cluster))
    }
}
