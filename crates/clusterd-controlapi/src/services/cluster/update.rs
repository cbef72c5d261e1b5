use tracing::{debug, info, instrument};

use clusterd_metadata::cluster::Cluster;
use clusterd_metadata::store::Store;

use crate::error::ControlApiError;
use crate::schema::{UpdateClusterRequest, UpdateClusterResponse};

use super::ControlApi;

impl<S> ControlApi<S>
where
    S: Store<Object = Cluster>,
{
    /// Replace the spec of a cluster when the caller holds its current version.
    /// Nothing is written unless the whole request is accepted.
    #[instrument(skip(self, request), fields(cluster_id = %request.cluster_id))]
    pub async fn update_cluster(
        &self,
        request: UpdateClusterRequest,
    ) -> Result<UpdateClusterResponse, ControlApiError> {
        let UpdateClusterRequest {
            cluster_id,
            cluster_version,
            spec,
        } = request;

        if cluster_id.is_empty() {
            return Err(ControlApiError::invalid_argument());
        }
        let version = cluster_version.ok_or_else(ControlApiError::invalid_argument)?;
        self.validator.validate(spec.as_ref())?;
        let spec = spec.ok_or_else(ControlApiError::invalid_argument)?;

        let updated = self
            .store
            .update(|tx| -> Result<Option<Cluster>, ControlApiError> {
                let Some(mut cluster) = tx.get(&cluster_id) else {
                    return Ok(None);
                };
                cluster.meta.version = version;
                cluster.spec = spec;
                tx.update(cluster)?;
                Ok(tx.get(&cluster_id))
            })
            .await
            .inspect_err(|err| debug!(%err, %version, "cluster update rejected"))?;

        let cluster = updated.ok_or_else(|| ControlApiError::cluster_not_found(&cluster_id))?;

        info!(version = %cluster.meta.version, "cluster updated");
        Ok(UpdateClusterResponse::redacted(&cluster))
    }
}
