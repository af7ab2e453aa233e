//! Derived values over fetched snapshots.
//!
//! Everything here is a pure function of the latest fetch: counts are
//! recomputed from whole snapshots rather than maintained incrementally, so
//! they are always consistent with the last response and never with an
//! in-flight mutation.

use serde::Serialize;

use crate::domain::{Application, ApplicationStatus, Property};

/// Requests still awaiting an owner decision, across all properties.
pub fn pending_request_count(properties: &[Property]) -> usize {
    properties
        .iter()
        .map(|p| {
            p.requests
                .iter()
                .filter(|r| r.status == ApplicationStatus::Pending)
                .count()
        })
        .sum()
}

/// Properties with at least one accepted request.
pub fn active_tenant_count(properties: &[Property]) -> usize {
    properties
        .iter()
        .filter(|p| {
            p.requests
                .iter()
                .any(|r| r.status == ApplicationStatus::Accepted)
        })
        .count()
}

/// True iff some fetched application targets `property_id`.
pub fn is_applied(applications: &[Application], property_id: &str) -> bool {
    applications
        .iter()
        .any(|a| a.property.as_ref().is_some_and(|p| p.id == property_id))
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct TenantStats {
    pub total_properties: usize,
    pub pending: usize,
    pub approved: usize,
}

pub fn tenant_stats(properties: &[Property], applications: &[Application]) -> TenantStats {
    TenantStats {
        total_properties: properties.len(),
        pending: applications
            .iter()
            .filter(|a| a.status == ApplicationStatus::Pending)
            .count(),
        approved: applications
            .iter()
            .filter(|a| a.status == ApplicationStatus::Accepted)
            .count(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PropertyRef;
    use pretty_assertions::assert_eq;

    fn property(id: &str, statuses: &[ApplicationStatus]) -> Property {
        Property {
            id: id.to_string(),
            title: format!("property {id}"),
            description: String::new(),
            address: String::new(),
            price: 0.0,
            images: Vec::new(),
            requests: statuses
                .iter()
                .enumerate()
                .map(|(i, status)| Application {
                    id: format!("{id}-r{i}"),
                    property: None,
                    tenant: None,
                    status: *status,
                })
                .collect(),
        }
    }

    fn application(property_id: Option<&str>, status: ApplicationStatus) -> Application {
        Application {
            id: "a1".to_string(),
            property: property_id.map(|id| PropertyRef {
                id: id.to_string(),
                title: String::new(),
                address: String::new(),
            }),
            tenant: None,
            status,
        }
    }

    #[test]
    fn only_pending_requests_count_as_pending() {
        let properties = vec![
            property("p1", &[ApplicationStatus::Pending]),
            property("p2", &[ApplicationStatus::Accepted]),
        ];
        assert_eq!(pending_request_count(&properties), 1);
        assert_eq!(active_tenant_count(&properties), 1);
    }

    #[test]
    fn accepted_or_rejected_only_is_never_pending() {
        let properties = vec![property(
            "p1",
            &[ApplicationStatus::Accepted, ApplicationStatus::Rejected],
        )];
        assert_eq!(pending_request_count(&properties), 0);
    }

    #[test]
    fn property_without_accepted_request_has_no_active_tenant() {
        let properties = vec![property(
            "p1",
            &[ApplicationStatus::Pending, ApplicationStatus::Rejected],
        )];
        assert_eq!(active_tenant_count(&properties), 0);
    }

    #[test]
    fn is_applied_matches_by_property_id() {
        let applications = vec![application(Some("p1"), ApplicationStatus::Pending)];
        assert!(is_applied(&applications, "p1"));
        assert!(!is_applied(&applications, "p2"));
        assert!(!is_applied(&[], "p1"));
    }

    #[test]
    fn is_applied_ignores_applications_without_property() {
        let applications = vec![application(None, ApplicationStatus::Pending)];
        assert!(!is_applied(&applications, "p1"));
    }

    #[test]
    fn tenant_stats_derive_from_both_snapshots() {
        let properties = vec![property("p1", &[]), property("p2", &[])];
        let applications = vec![
            application(Some("p1"), ApplicationStatus::Pending),
            application(Some("p2"), ApplicationStatus::Accepted),
            application(Some("p2"), ApplicationStatus::Rejected),
        ];
        assert_eq!(
            tenant_stats(&properties, &applications),
            TenantStats {
                total_properties: 2,
                pending: 1,
                approved: 1,
            }
        );
    }
}
