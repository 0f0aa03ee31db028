use crate::infra::{InMemoryDirectory, InMemoryRepository};
use chrono::{DateTime, Datelike, Duration, Local, NaiveDate, NaiveTime, TimeZone, Utc};
use clap::Args;
use society_hub::config::AppConfig;
use society_hub::domain::{
    BillId, BillStatus, Complaint, ComplaintCategory, ComplaintId, ComplaintPriority,
    ComplaintStatus, Event, EventCategory, EventId, EventStatus, MaintenanceBill, Society,
    SocietyId, SocietyPlan, Unit, UnitId, UnitKind, User, UserId, UserRole, Visitor, VisitorId,
};
use society_hub::error::AppError;
use society_hub::filters::BillQuery;
use society_hub::repository::{Repository, RepositoryError};
use society_hub::tenancy::Membership;
use society_hub::{Repositories, ServiceError, SocietyService, TenantContext};
use std::sync::Arc;

const GREEN_VALLEY: &str = "1";
const SUNSET: &str = "2";

#[derive(Args, Debug, Default)]
pub(crate) struct DashboardArgs {
    /// Society to report on (defaults to the principal's home society)
    #[arg(long)]
    pub(crate) society: Option<String>,
    /// Reporting date (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Number of recent activity entries to print
    #[arg(long, default_value_t = 5)]
    pub(crate) activity: usize,
}

/// Seeded repositories and directory backing both the server and the CLI report.
pub(crate) struct DemoStack {
    pub(crate) units: Arc<InMemoryRepository<Unit>>,
    pub(crate) bills: Arc<InMemoryRepository<MaintenanceBill>>,
    pub(crate) complaints: Arc<InMemoryRepository<Complaint>>,
    pub(crate) visitors: Arc<InMemoryRepository<Visitor>>,
    pub(crate) events: Arc<InMemoryRepository<Event>>,
    pub(crate) directory: InMemoryDirectory,
}

impl DemoStack {
    pub(crate) fn seeded() -> Result<Self, RepositoryError> {
        let stack = Self {
            units: Arc::new(InMemoryRepository::default()),
            bills: Arc::new(InMemoryRepository::default()),
            complaints: Arc::new(InMemoryRepository::default()),
            visitors: Arc::new(InMemoryRepository::default()),
            events: Arc::new(InMemoryRepository::default()),
            directory: directory(),
        };

        seed(stack.units.as_ref(), demo_units())?;
        seed(stack.bills.as_ref(), demo_bills())?;
        seed(stack.complaints.as_ref(), demo_complaints())?;
        seed(stack.visitors.as_ref(), demo_visitors())?;
        seed(stack.events.as_ref(), demo_events())?;
        Ok(stack)
    }

    pub(crate) fn repositories(&self) -> Repositories {
        Repositories {
            units: self.units.clone(),
            bills: self.bills.clone(),
            complaints: self.complaints.clone(),
            visitors: self.visitors.clone(),
            events: self.events.clone(),
        }
    }
}

fn seed<T, R>(repository: &R, records: Vec<T>) -> Result<(), RepositoryError>
where
    T: society_hub::repository::Record,
    R: Repository<T>,
{
    for record in records {
        repository.insert(record)?;
    }
    Ok(())
}

pub(crate) fn run_dashboard(args: DashboardArgs) -> Result<(), AppError> {
    let DashboardArgs {
        society,
        today,
        activity,
    } = args;

    let config = AppConfig::load()?;
    let stack = DemoStack::seeded().map_err(ServiceError::from)?;
    let service = SocietyService::new(stack.repositories()).with_activity_limit(activity);

    let mut context = TenantContext::new();
    context.sign_in(config.session.principal(), &stack.directory)?;
    if let Some(society) = society {
        context.switch_society(&SocietyId::new(society))?;
    }

    let (today, now) = match today {
        Some(day) => (day, end_of_day(day)),
        None => (Local::now().date_naive(), Utc::now()),
    };

    let dashboard = service.dashboard(&context, now)?;
    let billing = service.billing(&context, &BillQuery::default(), today)?;

    println!("Society dashboard: {} ({})", dashboard.society_name, today);
    if let Some(user) = context.current_user() {
        println!("Signed in as {} ({})", user.name, user.role.label());
    }
    println!(
        "- {} of {} units registered | {} active residents",
        dashboard.registered_units, dashboard.total_units, dashboard.active_residents
    );
    println!(
        "- Collected this month: {} | collection rate {}",
        dashboard.monthly_collection,
        percent(dashboard.collection_rate)
    );
    println!(
        "- {} pending complaints | {} visitors on premises | {} upcoming events",
        dashboard.pending_complaints, dashboard.visitors_on_premises, dashboard.upcoming_events
    );

    let summary = &billing.summary;
    println!("\nBilling");
    println!(
        "- Paid {} ({}) | Pending {} ({}) | Overdue {} ({})",
        summary.paid_amount,
        summary.paid_count,
        summary.pending_amount,
        summary.pending_count,
        summary.overdue_amount,
        summary.overdue_count
    );
    for view in billing
        .bills
        .iter()
        .filter(|view| view.bill.status == BillStatus::Overdue)
    {
        println!(
            "  - {} {} due {} ({})",
            view.unit_number.as_deref().unwrap_or("?"),
            view.owner_name.as_deref().unwrap_or("unknown owner"),
            view.bill.due_date,
            view.bill.amount
        );
    }

    if dashboard.recent_activity.is_empty() {
        println!("\nRecent activity: none");
    } else {
        println!("\nRecent activity");
        for entry in &dashboard.recent_activity {
            println!("- [{}] {}", entry.at.format("%Y-%m-%d %H:%M"), entry.message);
        }
    }

    Ok(())
}

fn percent(rate: Option<f64>) -> String {
    match rate {
        Some(rate) => format!("{:.0}%", rate * 100.0),
        None => "n/a".to_string(),
    }
}

fn end_of_day(day: NaiveDate) -> DateTime<Utc> {
    day.and_time(NaiveTime::MIN).and_utc() + Duration::days(1) - Duration::seconds(1)
}

// Seed literals are fixed; a malformed one is a programming error.
fn at(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw)
        .map(|value| value.with_timezone(&Utc))
        .unwrap_or_else(|err| panic!("seed timestamp '{raw}' is not RFC 3339: {err}"))
}

fn day(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day)
        .unwrap_or_else(|| panic!("seed date {year}-{month:02}-{day:02} does not exist"))
}

fn unit_id(number: &str) -> UnitId {
    UnitId::new(format!("unit-{}", number.to_ascii_lowercase().replace('-', "")))
}

fn directory() -> InMemoryDirectory {
    InMemoryDirectory::new(demo_societies())
        .with_membership(
            UserId::new("user-admin"),
            Membership {
                role: UserRole::Admin,
                society_id: Some(SocietyId::new(GREEN_VALLEY)),
                unit_number: Some("A-101".to_string()),
                phone: Some("+1234567890".to_string()),
                avatar: None,
            },
        )
        .with_membership(
            UserId::new("user-sunset-manager"),
            Membership {
                role: UserRole::Manager,
                society_id: Some(SocietyId::new(SUNSET)),
                unit_number: None,
                phone: None,
                avatar: None,
            },
        )
}

pub(crate) fn demo_societies() -> Vec<Society> {
    let created_at = Utc
        .with_ymd_and_hms(2024, 1, 15, 0, 0, 0)
        .single()
        .unwrap_or_default();
    vec![
        Society {
            id: SocietyId::new(GREEN_VALLEY),
            name: "Green Valley Apartments".to_string(),
            address: "123 Main St, City, State 12345".to_string(),
            logo: None,
            primary_color: "#3B82F6".to_string(),
            secondary_color: "#10B981".to_string(),
            total_units: 120,
            created_at,
            plan: SocietyPlan::Premium,
        },
        Society {
            id: SocietyId::new(SUNSET),
            name: "Sunset Residency".to_string(),
            address: "456 Oak Ave, City, State 67890".to_string(),
            logo: None,
            primary_color: "#F59E0B".to_string(),
            secondary_color: "#EF4444".to_string(),
            total_units: 85,
            created_at,
            plan: SocietyPlan::Basic,
        },
    ]
}

fn unit(society: &str, number: &str, owner: &str, contact: &str, kind: UnitKind) -> Unit {
    let id = unit_id(number);
    Unit {
        residents: vec![User {
            id: UserId::new(format!("resident-{}", id.as_str().trim_start_matches("unit-"))),
            email: format!(
                "{}@residents.example",
                owner.to_ascii_lowercase().replace(' ', ".")
            ),
            name: owner.to_string(),
            role: UserRole::Resident,
            society_id: Some(SocietyId::new(society)),
            unit_number: Some(number.to_string()),
            phone: Some(contact.to_string()),
            avatar: None,
        }],
        id,
        society_id: SocietyId::new(society),
        number: number.to_string(),
        kind,
        owner_name: owner.to_string(),
        owner_contact: contact.to_string(),
        maintenance_balance: 0,
    }
}

fn demo_units() -> Vec<Unit> {
    vec![
        unit(GREEN_VALLEY, "A-101", "John Smith", "+1 (555) 111-0101", UnitKind::Apartment),
        unit(GREEN_VALLEY, "B-203", "Alice Brown", "+1 (555) 111-0203", UnitKind::Apartment),
        unit(GREEN_VALLEY, "B-205", "Sarah Johnson", "+1 (555) 111-0205", UnitKind::Apartment),
        unit(GREEN_VALLEY, "C-302", "Mike Wilson", "+1 (555) 111-0302", UnitKind::Apartment),
        unit(GREEN_VALLEY, "C-405", "Robert Wilson", "+1 (555) 111-0405", UnitKind::Penthouse),
        unit(GREEN_VALLEY, "D-301", "Sarah Davis", "+1 (555) 111-0301", UnitKind::Apartment),
        unit(GREEN_VALLEY, "D-401", "Emily Davis", "+1 (555) 111-0401", UnitKind::Apartment),
        unit(SUNSET, "V-07", "Anita Rao", "+1 (555) 222-0007", UnitKind::Villa),
        unit(SUNSET, "V-12", "Daniel Lee", "+1 (555) 222-0012", UnitKind::Villa),
    ]
}

fn bill(
    id: &str,
    society: &str,
    number: &str,
    due_date: NaiveDate,
    status: BillStatus,
    paid_on: Option<NaiveDate>,
    month: &str,
) -> MaintenanceBill {
    MaintenanceBill {
        id: BillId::new(id),
        society_id: SocietyId::new(society),
        unit_id: unit_id(number),
        amount: 4500,
        due_date,
        status,
        description: format!("Monthly Maintenance - {month}"),
        created_at: due_date
            .with_day(1)
            .unwrap_or(due_date)
            .and_time(NaiveTime::MIN)
            .and_utc(),
        paid_on,
    }
}

fn demo_bills() -> Vec<MaintenanceBill> {
    vec![
        bill(
            "bill-1",
            GREEN_VALLEY,
            "A-101",
            day(2024, 11, 15),
            BillStatus::Paid,
            Some(day(2024, 11, 10)),
            "November 2024",
        ),
        bill(
            "bill-2",
            GREEN_VALLEY,
            "B-205",
            day(2024, 11, 15),
            BillStatus::Pending,
            None,
            "November 2024",
        ),
        bill(
            "bill-3",
            GREEN_VALLEY,
            "C-302",
            day(2024, 10, 15),
            BillStatus::Overdue,
            None,
            "October 2024",
        ),
        bill(
            "bill-4",
            GREEN_VALLEY,
            "D-401",
            day(2024, 11, 15),
            BillStatus::Paid,
            Some(day(2024, 11, 8)),
            "November 2024",
        ),
        bill(
            "bill-5",
            SUNSET,
            "V-07",
            day(2024, 11, 10),
            BillStatus::Paid,
            Some(day(2024, 11, 4)),
            "November 2024",
        ),
        bill(
            "bill-6",
            SUNSET,
            "V-12",
            day(2024, 11, 10),
            BillStatus::Pending,
            None,
            "November 2024",
        ),
    ]
}

#[allow(clippy::too_many_arguments)]
fn complaint(
    id: &str,
    number: &str,
    category: ComplaintCategory,
    priority: ComplaintPriority,
    status: ComplaintStatus,
    title: &str,
    description: &str,
    created_at: &str,
) -> Complaint {
    let unit = unit_id(number);
    Complaint {
        id: ComplaintId::new(id),
        society_id: SocietyId::new(GREEN_VALLEY),
        resident_id: UserId::new(format!(
            "resident-{}",
            unit.as_str().trim_start_matches("unit-")
        )),
        unit_id: unit,
        category,
        title: title.to_string(),
        description: description.to_string(),
        status,
        priority,
        created_at: at(created_at),
        resolved_at: None,
        manager_response: None,
    }
}

fn demo_complaints() -> Vec<Complaint> {
    let mut leak = complaint(
        "complaint-1",
        "B-203",
        ComplaintCategory::Maintenance,
        ComplaintPriority::High,
        ComplaintStatus::InProgress,
        "Water leakage in bathroom",
        "There is a continuous water leakage from the bathroom ceiling. It has been going on for 3 days now.",
        "2024-11-10T10:30:00Z",
    );
    leak.manager_response =
        Some("Plumber has been contacted and will visit tomorrow morning.".to_string());

    let mut elevator = complaint(
        "complaint-3",
        "C-405",
        ComplaintCategory::Maintenance,
        ComplaintPriority::Urgent,
        ComplaintStatus::Resolved,
        "Elevator not working",
        "The main elevator has been out of order since yesterday. This is causing inconvenience for elderly residents.",
        "2024-11-08T09:00:00Z",
    );
    elevator.resolved_at = Some(at("2024-11-10T16:30:00Z"));
    elevator.manager_response =
        Some("Elevator has been repaired and is now fully functional.".to_string());

    vec![
        leak,
        complaint(
            "complaint-2",
            "A-101",
            ComplaintCategory::Noise,
            ComplaintPriority::Medium,
            ComplaintStatus::Open,
            "Noise complaint from upstairs neighbor",
            "The upstairs neighbor is making excessive noise during night hours, disturbing sleep.",
            "2024-11-09T22:15:00Z",
        ),
        elevator,
        complaint(
            "complaint-4",
            "D-301",
            ComplaintCategory::Security,
            ComplaintPriority::Medium,
            ComplaintStatus::Open,
            "Security gate not closing properly",
            "The main security gate is not closing automatically and needs manual intervention.",
            "2024-11-11T08:45:00Z",
        ),
    ]
}

#[allow(clippy::too_many_arguments)]
fn visitor(
    id: &str,
    number: &str,
    name: &str,
    phone: &str,
    purpose: &str,
    vehicle: Option<&str>,
    check_in: &str,
    check_out: Option<&str>,
    approved_by: &str,
    notes: &str,
) -> Visitor {
    Visitor {
        id: VisitorId::new(id),
        society_id: SocietyId::new(GREEN_VALLEY),
        unit_id: unit_id(number),
        name: name.to_string(),
        phone: phone.to_string(),
        purpose: purpose.to_string(),
        vehicle_number: vehicle.map(str::to_string),
        check_in_time: at(check_in),
        check_out_time: check_out.map(at),
        approved_by: approved_by.to_string(),
        security_notes: Some(notes.to_string()),
    }
}

fn demo_visitors() -> Vec<Visitor> {
    vec![
        visitor(
            "visitor-1",
            "A-101",
            "David Johnson",
            "+1 (555) 987-6543",
            "Delivery - Amazon Package",
            Some("MH12AB1234"),
            "2024-11-12T10:30:00Z",
            None,
            "Security Guard",
            "Valid ID verified, package delivery confirmed",
        ),
        visitor(
            "visitor-2",
            "B-205",
            "Maria Garcia",
            "+1 (555) 876-5432",
            "Personal Visit",
            None,
            "2024-11-12T14:15:00Z",
            Some("2024-11-12T16:45:00Z"),
            "Sarah Johnson",
            "Pre-approved visitor, family member",
        ),
        visitor(
            "visitor-3",
            "C-302",
            "Tech Support Team",
            "+1 (555) 765-4321",
            "Internet Installation",
            Some("MH14CD5678"),
            "2024-11-12T09:00:00Z",
            Some("2024-11-12T12:30:00Z"),
            "Mike Wilson",
            "Service provider, work completed successfully",
        ),
        visitor(
            "visitor-4",
            "D-401",
            "Dr. Priya Sharma",
            "+1 (555) 654-3210",
            "Medical Consultation",
            None,
            "2024-11-12T11:00:00Z",
            None,
            "Emily Davis",
            "Doctor visit, emergency consultation",
        ),
    ]
}

#[allow(clippy::too_many_arguments)]
fn event(
    id: &str,
    title: &str,
    description: &str,
    date: &str,
    location: &str,
    organizer: &str,
    category: EventCategory,
    contribution: u64,
    contributors: u32,
    capacity: u32,
    attendees: usize,
    status: EventStatus,
) -> Event {
    Event {
        id: EventId::new(id),
        society_id: SocietyId::new(GREEN_VALLEY),
        title: title.to_string(),
        description: description.to_string(),
        date: at(date),
        location: location.to_string(),
        organizer: organizer.to_string(),
        category,
        contribution_required: Some(contribution).filter(|amount| *amount > 0),
        contributions_paid: contribution * u64::from(contributors),
        total_contributors: contributors,
        attendees: (1..=attendees)
            .map(|n| format!("resident-{n:03}"))
            .collect(),
        max_attendees: Some(capacity),
        status,
    }
}

fn demo_events() -> Vec<Event> {
    vec![
        event(
            "event-1",
            "Diwali Celebration 2024",
            "Join us for a grand Diwali celebration with traditional decorations, cultural performances, and delicious food.",
            "2024-11-13T18:00:00Z",
            "Community Hall",
            "Cultural Committee",
            EventCategory::Festival,
            500,
            25,
            150,
            89,
            EventStatus::Upcoming,
        ),
        event(
            "event-2",
            "Society Annual Meeting",
            "Annual general meeting to discuss society matters, budget approval, and committee elections.",
            "2024-11-15T19:00:00Z",
            "Conference Room",
            "Management Committee",
            EventCategory::Meeting,
            0,
            0,
            50,
            32,
            EventStatus::Upcoming,
        ),
        event(
            "event-3",
            "Health & Wellness Camp",
            "Free health checkup camp with qualified doctors and health screening facilities.",
            "2024-11-20T09:00:00Z",
            "Garden Area",
            "Health Committee",
            EventCategory::Health,
            200,
            42,
            100,
            67,
            EventStatus::Upcoming,
        ),
        event(
            "event-4",
            "Children's Day Celebration",
            "Fun-filled day with games, competitions, and prizes for all children in the society.",
            "2024-11-14T16:00:00Z",
            "Playground",
            "Kids Club",
            EventCategory::Celebration,
            300,
            24,
            80,
            45,
            EventStatus::Completed,
        ),
    ]
}
