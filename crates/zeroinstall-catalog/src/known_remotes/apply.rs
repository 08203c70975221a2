use super::KnownRemote;
use crate::infer::normalize;
use crate::model::{Method, MethodDraft, MethodOrigin, MethodType, Registry, ValidationTrail};
use crate::normalize::FlagKnowledge;

/// Synthetic method for a known remote.
pub fn remote_method(remote: &KnownRemote, kb: &FlagKnowledge) -> Method {
    let mut draft = MethodDraft::with_command(MethodOrigin::KnownRemote, remote.url.clone());
    draft.name = Some(format!("{}-remote", remote.server));
    draft.method_type = Some(remote.method_type);
    draft.registry = Some(Registry::Remote);
    draft.package = Some(remote.url.clone());
    draft.env_vars = remote.env_vars.clone();
    draft.headers = remote.headers.clone();
    draft.deployment_score = Some(10);
    draft.description = Some(format!("Remote API endpoint for {}", remote.server));
    normalize(&draft, kb)
}

/// Append the known remote unless an http method is already present.
pub fn apply_known_remote(
    methods: &mut Vec<Method>,
    remote: &KnownRemote,
    kb: &FlagKnowledge,
    trail: &mut ValidationTrail,
) {
    if methods.iter().any(|m| m.method_type == MethodType::Http) {
        trail.info(format!(
            "Known remote for {} skipped: an http method is already present",
            remote.server
        ));
        return;
    }
    let method = remote_method(remote, kb);
    trail.accepted(format!(
        "Known remote {}: {} (score 10)",
        method.label(),
        method.command
    ));
    tracing::debug!("added known remote method for {}: {}", remote.server, remote.url);
    methods.push(method);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::known_remotes::load_default;
    use crate::model::Runtime;

    fn github() -> KnownRemote {
        load_default()
            .lookup("github/github-mcp-server", "")
            .cloned()
            .expect("default entry")
    }

    #[test]
    fn appends_when_no_http_method() {
        let kb = FlagKnowledge::builtin();
        let mut methods = Vec::new();
        let mut trail = ValidationTrail::new();
        apply_known_remote(&mut methods, &github(), &kb, &mut trail);
        assert_eq!(methods.len(), 1);
        let m = &methods[0];
        assert_eq!(m.name, "github/github-mcp-server-remote");
        assert_eq!(m.method_type, MethodType::Http);
        assert_eq!(m.registry, Registry::Remote);
        assert_eq!(m.runtime, Runtime::Http);
        assert_eq!(m.deployment_score, 10);
        assert_eq!(
            m.env_vars["GITHUB_PERSONAL_ACCESS_TOKEN"],
            "GitHub Personal Access Token for API authentication"
        );
        assert!(m.headers.as_ref().is_some_and(|h| h.contains_key("Authorization")));
        assert_eq!(trail.count(crate::model::TrailKind::Accepted), 1);
    }

    #[test]
    fn skips_when_http_method_present() {
        let kb = FlagKnowledge::builtin();
        let existing = remote_method(&github(), &kb);
        let mut methods = vec![existing];
        let mut trail = ValidationTrail::new();
        apply_known_remote(&mut methods, &github(), &kb, &mut trail);
        assert_eq!(methods.len(), 1);
    }
}
