//! Search and filter controls for the list views.
//!
//! A missing filter, an empty string or the literal `all` all mean "no filter".
//! Search terms match case-insensitively, except phone numbers which match verbatim.

use chrono::NaiveDate;
use serde::de::{DeserializeOwned, IntoDeserializer};
use serde::{Deserialize, Deserializer};

use crate::domain::{
    BillStatus, Complaint, ComplaintCategory, ComplaintPriority, ComplaintStatus, Event,
    EventCategory, EventStatus, MaintenanceBill, Unit, Visitor, VisitorStatus,
};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BillQuery {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default, deserialize_with = "deserialize_filter")]
    pub status: Option<BillStatus>,
}

impl BillQuery {
    /// Bills are searched by the unit number and owner of the unit they were raised on.
    pub fn matches(&self, bill: &MaintenanceBill, unit: Option<&Unit>, today: NaiveDate) -> bool {
        let matches_search = match normalized(&self.search) {
            None => true,
            Some(term) => unit.is_some_and(|unit| {
                contains(&unit.number, &term) || contains(&unit.owner_name, &term)
            }),
        };

        matches_search
            && self
                .status
                .map_or(true, |status| bill.effective_status(today) == status)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ComplaintQuery {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default, deserialize_with = "deserialize_filter")]
    pub status: Option<ComplaintStatus>,
    #[serde(default, deserialize_with = "deserialize_filter")]
    pub category: Option<ComplaintCategory>,
    #[serde(default, deserialize_with = "deserialize_filter")]
    pub priority: Option<ComplaintPriority>,
}

impl ComplaintQuery {
    pub fn matches(&self, complaint: &Complaint, unit: Option<&Unit>) -> bool {
        let matches_search = match normalized(&self.search) {
            None => true,
            Some(term) => {
                contains(&complaint.title, &term)
                    || contains(&complaint.description, &term)
                    || unit.is_some_and(|unit| contains(&unit.number, &term))
            }
        };

        matches_search
            && self.status.map_or(true, |status| complaint.status == status)
            && self
                .category
                .map_or(true, |category| complaint.category == category)
            && self
                .priority
                .map_or(true, |priority| complaint.priority == priority)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VisitorQuery {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default, deserialize_with = "deserialize_filter")]
    pub status: Option<VisitorStatus>,
}

impl VisitorQuery {
    pub fn matches(&self, visitor: &Visitor, unit: Option<&Unit>) -> bool {
        let matches_search = match normalized(&self.search) {
            None => true,
            Some(term) => {
                let raw = self.search.as_deref().map(str::trim).unwrap_or_default();
                contains(&visitor.name, &term)
                    || visitor.phone.contains(raw)
                    || contains(&visitor.purpose, &term)
                    || unit.is_some_and(|unit| contains(&unit.number, &term))
            }
        };

        matches_search && self.status.map_or(true, |status| visitor.status() == status)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventQuery {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default, deserialize_with = "deserialize_filter")]
    pub status: Option<EventStatus>,
    #[serde(default, deserialize_with = "deserialize_filter")]
    pub category: Option<EventCategory>,
}

impl EventQuery {
    pub fn matches(&self, event: &Event) -> bool {
        let matches_search = match normalized(&self.search) {
            None => true,
            Some(term) => {
                contains(&event.title, &term)
                    || contains(&event.description, &term)
                    || contains(&event.organizer, &term)
            }
        };

        matches_search
            && self.status.map_or(true, |status| event.status == status)
            && self
                .category
                .map_or(true, |category| event.category == category)
    }
}

fn normalized(search: &Option<String>) -> Option<String> {
    search
        .as_deref()
        .map(str::trim)
        .filter(|term| !term.is_empty())
        .map(str::to_lowercase)
}

fn contains(haystack: &str, lowered_term: &str) -> bool {
    haystack.to_lowercase().contains(lowered_term)
}

fn deserialize_filter<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") | Some("all") => Ok(None),
        Some(value) => {
            T::deserialize(IntoDeserializer::<D::Error>::into_deserializer(value)).map(Some)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        BillId, ComplaintId, NewComplaint, SocietyId, UnitId, UnitKind, UserId, VisitorId,
    };
    use chrono::{TimeZone, Utc};

    fn unit() -> Unit {
        Unit {
            id: UnitId::new("unit-a101"),
            society_id: SocietyId::new("1"),
            number: "A-101".to_string(),
            kind: UnitKind::Apartment,
            owner_name: "John Smith".to_string(),
            owner_contact: "+1 555 0101".to_string(),
            residents: Vec::new(),
            maintenance_balance: 0,
        }
    }

    #[test]
    fn bill_query_searches_unit_and_owner() {
        let bill = MaintenanceBill {
            id: BillId::new("bill-1"),
            society_id: SocietyId::new("1"),
            unit_id: UnitId::new("unit-a101"),
            amount: 4500,
            due_date: NaiveDate::from_ymd_opt(2024, 11, 15).unwrap(),
            status: BillStatus::Pending,
            description: "Monthly Maintenance".to_string(),
            created_at: Utc.with_ymd_and_hms(2024, 11, 1, 0, 0, 0).unwrap(),
            paid_on: None,
        };
        let unit = unit();
        let today = NaiveDate::from_ymd_opt(2024, 11, 20).unwrap();

        let by_owner = BillQuery {
            search: Some("  SMITH ".to_string()),
            status: None,
        };
        assert!(by_owner.matches(&bill, Some(&unit), today));
        assert!(!by_owner.matches(&bill, None, today));

        let overdue = BillQuery {
            search: None,
            status: Some(BillStatus::Overdue),
        };
        assert!(overdue.matches(&bill, Some(&unit), today));
        let pending = BillQuery {
            search: None,
            status: Some(BillStatus::Pending),
        };
        assert!(!pending.matches(&bill, Some(&unit), today));
    }

    #[test]
    fn complaint_query_combines_filters() {
        let complaint = NewComplaint {
            unit_id: UnitId::new("unit-a101"),
            resident_id: UserId::new("john"),
            category: ComplaintCategory::Noise,
            title: "Noise complaint from upstairs neighbor".to_string(),
            description: "Excessive noise during night hours".to_string(),
            priority: ComplaintPriority::Medium,
        }
        .into_complaint(
            ComplaintId::new("complaint-2"),
            SocietyId::new("1"),
            Utc.with_ymd_and_hms(2024, 11, 9, 22, 15, 0).unwrap(),
        );

        let query = ComplaintQuery {
            search: Some("a-101".to_string()),
            status: Some(ComplaintStatus::Open),
            category: Some(ComplaintCategory::Noise),
            priority: None,
        };
        assert!(query.matches(&complaint, Some(&unit())));

        let wrong_priority = ComplaintQuery {
            priority: Some(ComplaintPriority::Urgent),
            ..query
        };
        assert!(!wrong_priority.matches(&complaint, Some(&unit())));
    }

    #[test]
    fn visitor_phone_matches_verbatim() {
        let visitor = Visitor {
            id: VisitorId::new("visitor-1"),
            society_id: SocietyId::new("1"),
            unit_id: UnitId::new("unit-a101"),
            name: "Maria Garcia".to_string(),
            phone: "+1 (555) 876-5432".to_string(),
            purpose: "Personal Visit".to_string(),
            vehicle_number: None,
            check_in_time: Utc.with_ymd_and_hms(2024, 11, 12, 14, 15, 0).unwrap(),
            check_out_time: None,
            approved_by: "Sarah Johnson".to_string(),
            security_notes: None,
        };

        let query = VisitorQuery {
            search: Some("876-5432".to_string()),
            status: Some(VisitorStatus::CheckedIn),
        };
        assert!(query.matches(&visitor, None));
    }

    #[test]
    fn all_means_no_filter() {
        let query: EventQuery = serde_json::from_value(serde_json::json!({
            "search": "",
            "status": "all",
            "category": "festival",
        }))
        .expect("query parses");

        assert!(query.status.is_none());
        assert_eq!(query.category, Some(EventCategory::Festival));
        assert!(normalized(&query.search).is_none());
    }
}
