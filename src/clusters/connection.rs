/// Cluster client construction from [`ClientConfig`]
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Client, Config};
use tracing::{debug, info};

use super::kube_client::KubeClusterClient;
use crate::config::ClientConfig;
use crate::error::Result;

/// Build a cluster client.
///
/// With neither a kubeconfig path nor a context configured, the standard
/// inference order applies (KUBECONFIG, ~/.kube/config, in-cluster).
pub async fn connect(config: &ClientConfig) -> Result<KubeClusterClient> {
    let mut kube_config = client_config(config).await?;
    kube_config.read_timeout = Some(config.read_timeout());

    info!("Connecting to cluster at {}", kube_config.cluster_url);
    let client = Client::try_from(kube_config)?;

    Ok(KubeClusterClient::new(client))
}

async fn client_config(config: &ClientConfig) -> Result<Config> {
    if config.kubeconfig.is_none() && config.context.is_none() {
        debug!("Inferring cluster configuration from environment");
        return Ok(Config::infer().await?);
    }

    let kubeconfig = match &config.kubeconfig {
        Some(path) => {
            debug!("Reading kubeconfig {}", path.display());
            Kubeconfig::read_from(path)?
        }
        None => Kubeconfig::read()?,
    };

    let options = KubeConfigOptions {
        context: config.context.clone(),
        ..Default::default()
    };

    Ok(Config::from_custom_kubeconfig(kubeconfig, &options).await?)
}
