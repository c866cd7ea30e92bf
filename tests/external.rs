use async_trait::async_trait;
use ingress_dns::{
    dns::{
        Rcode,
        ResourceRecord,
        Upstream,
        UpstreamError,
    },
    handler::{
        IngressConfig,
        IngressHandler,
        Response,
    },
    index::StaticIndex,
    query::Query,
    resources::{
        IngressRecord,
        RecordType,
    },
    self_address::StaticAddresses,
};
use std::{
    net::Ipv4Addr,
    sync::Arc,
};

/// Knows `dummy.hostname` only when `resolvable` is set.
struct DummyUpstream {
    resolvable: bool,
}

#[async_trait]
impl Upstream for DummyUpstream {
    async fn resolve(&self, _query: &Query, target: &str, ty: RecordType) -> Result<Vec<ResourceRecord>, UpstreamError> {
        match (self.resolvable, target, ty) {
            (true, "dummy.hostname.", RecordType::A) => {
                Ok(vec![ResourceRecord::a("dummy.hostname.", 30, Ipv4Addr::new(192, 0, 2, 10))])
            }
            _ => Err(UpstreamError::NoRecords(target.to_string(), ty)),
        }
    }
}

fn index() -> StaticIndex {
    let ing1 = IngressRecord::new("ing1", "testns", ["foo.example.com", "bar.example.com"], ["1.2.3.4"]);
    let ing2 = IngressRecord::new("ing2", "testns", ["foo.example.org", "bar.failed.org"], ["dummy.hostname"]);
    let ing3 = IngressRecord::new("ing3", "testns", ["pending.example.org"], Vec::<String>::new());
    let ing6 = IngressRecord::new("ing6", "testns", ["foo6.example.org"], ["1:2::5", "1.2.3.5"]);

    let mut index = StaticIndex::default();
    index.insert_at("foo.example.com.", ing1.clone());
    index.insert_at("bar.example.com.", ing1);
    index.insert_at("foo.example.org.", ing2);
    index.insert_at("pending.example.org.", ing3);
    index.insert_at("foo6.example.org.", ing6);
    index
}

fn handler(resolvable: bool) -> IngressHandler {
    IngressHandler::new(
        IngressConfig::new(["example.com.", "example.org."], 5),
        Arc::new(index()),
        Arc::new(DummyUpstream { resolvable }),
        Arc::new(StaticAddresses(vec!["127.0.0.1".parse().unwrap()])),
    )
}

fn rendered(response: &Response) -> Vec<String> {
    response.answer.iter().map(ToString::to_string).collect()
}

#[tokio::test]
async fn ip_address_becomes_a_record() {
    let response = handler(false)
        .serve(&Query::new("foo.example.com.", RecordType::A))
        .await
        .unwrap();

    assert_eq!(response.rcode, Rcode::NoError);
    assert_eq!(rendered(&response), vec!["foo.example.com.\t5\tIN\tA\t1.2.3.4"]);
}

#[tokio::test]
async fn hostname_becomes_cname() {
    let response = handler(false)
        .serve(&Query::new("foo.example.org.", RecordType::A))
        .await
        .unwrap();

    assert_eq!(response.rcode, Rcode::NoError);
    assert_eq!(rendered(&response), vec!["foo.example.org.\t5\tIN\tCNAME\tdummy.hostname."]);
}

#[tokio::test]
async fn cname_is_followed_by_upstream_answer() {
    let response = handler(true)
        .serve(&Query::new("foo.example.org.", RecordType::A))
        .await
        .unwrap();

    assert_eq!(
        rendered(&response),
        vec![
            "foo.example.org.\t5\tIN\tCNAME\tdummy.hostname.",
            "dummy.hostname.\t30\tIN\tA\t192.0.2.10",
        ]
    );
}

#[tokio::test]
async fn unknown_name_is_nxdomain() {
    let response = handler(false)
        .serve(&Query::new("nope.example.com.", RecordType::A))
        .await
        .unwrap();

    assert_eq!(
        response,
        Response {
            rcode: Rcode::NxDomain,
            answer: vec![],
        }
    );
}

#[tokio::test]
async fn ingress_without_addresses_is_nxdomain() {
    let response = handler(false)
        .serve(&Query::new("pending.example.org.", RecordType::A))
        .await
        .unwrap();

    assert_eq!(response.rcode, Rcode::NxDomain);
    assert!(response.answer.is_empty());
}

#[tokio::test]
async fn aaaa_only_answers_ipv6() {
    let h = handler(false);

    let v6 = h.serve(&Query::new("foo6.example.org.", RecordType::AAAA)).await.unwrap();
    assert_eq!(v6.rcode, Rcode::NoError);
    assert_eq!(rendered(&v6), vec!["foo6.example.org.\t5\tIN\tAAAA\t1:2::5"]);

    let v4 = h.serve(&Query::new("foo6.example.org.", RecordType::A)).await.unwrap();
    assert_eq!(rendered(&v4), vec!["foo6.example.org.\t5\tIN\tA\t1.2.3.5"]);
}

#[tokio::test]
async fn queries_outside_zones_are_passed_on() {
    assert!(handler(false)
        .serve(&Query::new("foo.example.net.", RecordType::A))
        .await
        .is_none());
}

#[tokio::test]
async fn self_address_is_answered_per_zone() {
    let h = handler(false);

    let a = h.serve(&Query::new("ns1.dns.example.org.", RecordType::A)).await.unwrap();
    assert_eq!(a.rcode, Rcode::NoError);
    assert_eq!(rendered(&a), vec!["ns1.dns.example.org.\t5\tIN\tA\t127.0.0.1"]);

    let aaaa = h.serve(&Query::new("ns1.dns.example.com.", RecordType::AAAA)).await.unwrap();
    assert_eq!(aaaa.rcode, Rcode::NoError);
    assert!(aaaa.answer.is_empty());
}
