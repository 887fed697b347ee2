use crate::errors::RenderError;
use url::{Host, Url};

/// Derives a Traefik `Host` matcher from the hostname of `url`.
pub fn derive_rule(url: &str) -> Result<String, RenderError> {
    let hostname = Url::parse(url)
        .ok()
        .and_then(|parsed| parsed.host().map(|host| hostname(&host)))
        .filter(|hostname| !hostname.is_empty());

    match hostname {
        Some(hostname) => Ok(format!("Host(`{hostname}`)")),
        None => {
            tracing::info!(url, "url has no hostname to derive a rule from");
            Err(RenderError::RuleDerivation {
                url: url.to_string(),
            })
        }
    }
}

// IPv6 literals are matched without their brackets.
fn hostname(host: &Host<&str>) -> String {
    match host {
        Host::Domain(domain) => domain.to_string(),
        Host::Ipv4(addr) => addr.to_string(),
        Host::Ipv6(addr) => addr.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_rule() {
        assert_eq!(derive_rule("http://foo.bar/x").unwrap(), "Host(`foo.bar`)");
        assert_eq!(
            derive_rule("https://Example.COM:8443/a?b=c").unwrap(),
            "Host(`example.com`)"
        );
        assert_eq!(derive_rule("http://10.1.2.3:80").unwrap(), "Host(`10.1.2.3`)");
        assert_eq!(derive_rule("http://[::1]:8080/").unwrap(), "Host(`::1`)");
    }

    #[test]
    fn test_derive_rule_is_deterministic() {
        let url = "http://foo.bar/testing-remote-0";
        assert_eq!(derive_rule(url), derive_rule(url));
    }

    #[test]
    fn test_derive_rule_without_hostname() {
        for url in ["not a url", "", "foo.bar/x", "mailto:someone@foo.bar", "file:///etc/hosts"] {
            assert_eq!(
                derive_rule(url),
                Err(RenderError::RuleDerivation { url: url.into() }),
                "{url} should not yield a rule"
            );
        }
    }
}
