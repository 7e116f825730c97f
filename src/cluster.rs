use std::fmt;

use crate::acl::AclOperation;

/// A broker of the cluster.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Node {
    /// Broker identifier (`broker.id`).
    pub id: i32,
    pub host: String,
    pub port: u16,

    /// Rack identifier (`broker.rack`), if configured.
    pub rack: Option<String>,
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}/{}", self.host, self.port, self.id)
    }
}

/// Description of the whole cluster, as seen by the native client.
#[derive(Debug, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DescribeClusterResult {
    pub cluster_id: Option<String>,

    /// Current controller of the cluster, if known.
    pub controller: Option<Node>,

    pub nodes: Vec<Node>,

    /// Operations the client is allowed to perform on the cluster.
    ///
    /// Only set when requested with [`AdminOptions::include_authorized_operations`].
    ///
    /// [`AdminOptions::include_authorized_operations`]: crate::AdminOptions::include_authorized_operations
    pub authorized_operations: Option<Vec<AclOperation>>,
}
