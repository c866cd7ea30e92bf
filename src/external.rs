use crate::{
    dns::Rcode,
    expand::{
        expand,
        ServiceRecord,
    },
    index::ReverseIndex,
};

/// Service records for every Ingress declaring `qname`, and the response code to answer with.
///
/// The code starts out as NXDOMAIN and only becomes NOERROR once some Ingress contributes at
/// least one (hostname, address) pair. An Ingress that matches but has no hosts or no
/// addresses leaves it untouched.
pub fn external_ingress(index: &dyn ReverseIndex, qname: &str, ttl: u32) -> (Vec<ServiceRecord>, Rcode) {
    let ingresses = index.reverse_lookup(qname);
    let mut services = Vec::new();
    let mut rcode = Rcode::NxDomain;

    for ing in &ingresses {
        let before = services.len();
        services.extend(expand(ing, ttl));

        if services.len() > before {
            rcode = Rcode::NoError;
        } else {
            debug!(ingress = %ing.key(), %qname, "ingress matched but has no hosts or external addresses");
        }
    }

    trace!(%qname, matched = ingresses.len(), services = services.len(), %rcode, "ingress lookup");
    (services, rcode)
}
