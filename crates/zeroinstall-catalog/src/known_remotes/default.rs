use std::collections::{BTreeMap, HashMap};

use super::types::KnownRemote;
use crate::model::MethodType;

pub fn default_known_remotes() -> HashMap<String, KnownRemote> {
    let mut m = HashMap::new();

    let github = KnownRemote {
        server: "github/github-mcp-server".into(),
        url: "https://api.githubcopilot.com/mcp/".into(),
        method_type: MethodType::Http,
        env_vars: BTreeMap::from([(
            "GITHUB_PERSONAL_ACCESS_TOKEN".to_string(),
            "GitHub Personal Access Token for API authentication".to_string(),
        )]),
        headers: BTreeMap::from([(
            "Authorization".to_string(),
            "Bearer ${GITHUB_PERSONAL_ACCESS_TOKEN}".to_string(),
        )]),
    };
    m.insert(github.server.clone(), github);

    m
}
