//!
//! # CLI for the cluster control api
//!
//! Parameters are overwritten in the following sequence:
//!     1) default values
//!     2) configuration file, if provided
//!     3) cli parameters
//!
use std::collections::BTreeMap;
use std::fs::read_to_string;
use std::io::{Write, stdout};
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing::{debug, info};

use clusterd_metadata::cluster::{Cluster, ClusterSpec};
use clusterd_metadata::core::Version;
use clusterd_metadata::store::MemoryStore;
use clusterd_types::config_file::SaveLoadConfig;
use clusterd_types::print_cli_err;

use crate::config::ControlApiConfig;
use crate::schema::{
    GetClusterRequest, ListClustersFilters, ListClustersRequest, UpdateClusterRequest,
};
use crate::services::ControlApi;

#[derive(ValueEnum, Debug, Clone, Copy, Default, Eq, PartialEq)]
#[allow(non_camel_case_types)]
pub enum OutputType {
    #[default]
    yaml,
    json,
}

/// cli options
#[derive(Debug, Parser)]
#[command(name = "clusterctl", about = "Cluster control api")]
pub struct ClusterCtlOpt {
    /// configuration file
    #[arg(long, value_name = "config path", env = "CLUSTERCTL_CONFIG")]
    config: Option<PathBuf>,

    /// directory of cluster metadata
    #[arg(long, value_name = "metadata path")]
    local: Option<PathBuf>,

    /// minimum accepted node certificate expiry, for example "1h"
    #[arg(long, value_parser = humantime::parse_duration)]
    min_node_cert_expiry: Option<Duration>,

    /// output format
    #[arg(short = 'O', long, value_enum, default_value_t)]
    output: OutputType,

    #[command(subcommand)]
    command: ClusterCmd,
}

#[derive(Debug, Subcommand)]
pub enum ClusterCmd {
    /// show one cluster
    Get {
        cluster_id: String,
    },

    /// list clusters
    List(ListOpt),

    /// replace the spec of a cluster
    Update {
        cluster_id: String,

        /// version the spec was read at
        #[arg(long)]
        version: u64,

        /// yaml file holding the new spec
        #[arg(long, value_name = "spec path")]
        spec: PathBuf,
    },
}

#[derive(Debug, Args)]
pub struct ListOpt {
    /// cluster name, may repeat
    #[arg(long = "name")]
    names: Vec<String>,

    /// cluster id prefix, may repeat
    #[arg(long = "id-prefix")]
    id_prefixes: Vec<String>,

    /// label as key or key=value, may repeat
    #[arg(long = "label", value_parser = parse_label)]
    labels: Vec<(String, String)>,

    /// only print ids
    #[arg(short, long)]
    quiet: bool,
}

impl ListOpt {
    fn filters(&self) -> Option<ListClustersFilters> {
        if self.names.is_empty() && self.id_prefixes.is_empty() && self.labels.is_empty() {
            return None;
        }
        Some(ListClustersFilters {
            names: self.names.clone(),
            id_prefixes: self.id_prefixes.clone(),
            labels: self.labels.iter().cloned().collect::<BTreeMap<_, _>>(),
        })
    }
}

fn parse_label(label: &str) -> Result<(String, String)> {
    let (key, value) = match label.split_once('=') {
        Some((key, value)) => (key.trim(), value.trim()),
        None => (label.trim(), ""),
    };
    if key.is_empty() {
        return Err(anyhow!("label key is empty: {label}"));
    }
    Ok((key.to_owned(), value.to_owned()))
}

impl ClusterCtlOpt {
    /// defaults, then config file, then flags
    pub fn config(&self) -> Result<ControlApiConfig> {
        let mut config = match &self.config {
            Some(path) => ControlApiConfig::load_from(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => ControlApiConfig::default(),
        };

        if let Some(local) = &self.local {
            config.metadata_dir = Some(local.clone());
        }
        if let Some(expiry) = self.min_node_cert_expiry {
            config.min_node_cert_expiry = expiry;
        }

        debug!(?config, "effective config");
        Ok(config)
    }

    pub async fn process(self) -> Result<()> {
        let config = self.config()?;

        let store = match &config.metadata_dir {
            Some(dir) => {
                info!(dir = %dir.display(), "loading cluster metadata");
                Arc::new(MemoryStore::<Cluster>::load_from(dir)?)
            }
            None => MemoryStore::new_shared(),
        };
        let api = ControlApi::new(store, config.validator());

        let mut out = stdout();
        match self.command {
            ClusterCmd::Get { cluster_id } => {
                let response = api.get_cluster(GetClusterRequest::new(cluster_id)).await?;
                render(&mut out, self.output, response.cluster())?;
            }
            ClusterCmd::List(list) => {
                let request = ListClustersRequest {
                    filters: list.filters(),
                };
                let response = api.list_clusters(request).await?;
                if list.quiet {
                    for cluster in response.clusters() {
                        writeln!(out, "{}", cluster.id)?;
                    }
                } else {
                    render(&mut out, self.output, response.clusters())?;
                }
            }
            ClusterCmd::Update {
                cluster_id,
                version,
                spec,
            } => {
                let content = read_to_string(&spec)
                    .with_context(|| format!("reading spec {}", spec.display()))?;
                let spec: ClusterSpec = serde_yaml::from_str(&content)?;
                let request = UpdateClusterRequest::new(cluster_id, Version::new(version), spec);
                let response = api.update_cluster(request).await?;
                render(&mut out, self.output, response.cluster())?;
            }
        }
        Ok(())
    }

    pub async fn process_or_exit(self) {
        if let Err(err) = self.process().await {
            print_cli_err!(err);
            process::exit(1);
        }
    }
}

fn render<W: Write, T: Serialize + ?Sized>(out: &mut W, output: OutputType, value: &T) -> Result<()> {
    match output {
        OutputType::yaml => serde_yaml::to_writer(&mut *out, value)?,
        OutputType::json => {
            serde_json::to_writer_pretty(&mut *out, value)?;
            writeln!(out)?;
        }
    }
    Ok(())
}
