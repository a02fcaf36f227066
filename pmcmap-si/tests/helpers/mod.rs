//! Shared helpers for integration tests: a loopback mock registry and a
//! configuration pointed at it.

#![allow(dead_code)]

use std::net::SocketAddr;

use axum::Router;
use pmcmap_common::Config;

/// A well-formed GetRecord response carrying two subject paths:
/// `Biology › Space Biology` and `Biology › Genetics`.
pub const RECORD_WITH_SUBJECTS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<OAI-PMH xmlns="http://www.openarchives.org/OAI/2.0/">
  <GetRecord>
    <record>
      <metadata>
        <article xmlns:jats="https://jats.nlm.nih.gov/ns/archiving/1.4/">
          <front>
            <article-meta>
              <article-categories>
                <subj-group subj-group-type="heading">
                  <subject>Biology</subject>
                  <subj-group><subject>Space Biology</subject></subj-group>
                  <subj-group><subject>Genetics</subject></subj-group>
                </subj-group>
              </article-categories>
            </article-meta>
          </front>
        </article>
      </metadata>
    </record>
  </GetRecord>
</OAI-PMH>"#;

/// A well-formed record with no classification container.
pub const RECORD_WITHOUT_SUBJECTS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<OAI-PMH xmlns="http://www.openarchives.org/OAI/2.0/">
  <GetRecord>
    <record>
      <metadata>
        <article>
          <front><article-meta><title-group><article-title>Untitled</article-title></title-group></article-meta></front>
        </article>
      </metadata>
    </record>
  </GetRecord>
</OAI-PMH>"#;

/// Serve `app` on an ephemeral loopback port.
pub async fn spawn_registry(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

/// Configuration pointed at the mock registry, with fast retries and no
/// politeness delay so tests stay quick.
pub fn test_config(addr: SocketAddr) -> Config {
    Config {
        registry_url: format!("http://{addr}/api/oai/v1/mh/"),
        politeness_ms: 0,
        max_attempts: 3,
        base_delay_ms: 1,
        backoff_factor: 1.0,
        timeout_secs: 5,
        ..Config::default()
    }
}
