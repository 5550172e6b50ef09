//! Built-in collections of the bootcamp back office

use crate::schema::{CollectionSchema, FieldSpec, SchemaRegistry};

/// Curated learning resources
pub fn resources() -> CollectionSchema {
    CollectionSchema::new("resources")
        .field("title", FieldSpec::string().required())
        .field("info", FieldSpec::string())
        .field("url", FieldSpec::string().required())
        .field("org", FieldSpec::reference("resource-orgs"))
        .field("tags", FieldSpec::array(FieldSpec::string().lowercase()))
        .field("rating", FieldSpec::number().min(0.0).max(5.0))
        .field("upvotes", FieldSpec::number().default_value(0))
        .field("downvotes", FieldSpec::number().default_value(0))
        .field(
            "github",
            FieldSpec::object([
                ("created_at", FieldSpec::date()),
                ("updated_at", FieldSpec::date()),
                ("open_issues_count", FieldSpec::number()),
                ("forks_count", FieldSpec::number()),
            ]),
        )
        .with_timestamps()
}

/// Organisations publishing resources
pub fn resource_orgs() -> CollectionSchema {
    CollectionSchema::new("resource-orgs")
        .field("name", FieldSpec::string().required())
        .field("url", FieldSpec::string())
        .field("info", FieldSpec::string())
}

/// Cohorts of students
pub fn cohorts() -> CollectionSchema {
    CollectionSchema::new("cohorts")
        .field("name", FieldSpec::string().required())
        .field("startDate", FieldSpec::date())
        .field("endDate", FieldSpec::date())
}

/// Squads within a cohort
pub fn squads() -> CollectionSchema {
    CollectionSchema::new("squads")
        .field("name", FieldSpec::string().required())
        .field("cohort", FieldSpec::reference("cohorts"))
        .populate("cohort")
}

/// Homework assigned to a cohort
pub fn homeworks() -> CollectionSchema {
    CollectionSchema::new("homeworks")
        .field("title", FieldSpec::string())
        .field("info", FieldSpec::string())
        .field("url", FieldSpec::string())
        .field("cohort", FieldSpec::reference("cohorts"))
        .field("assignedOnDate", FieldSpec::date())
        .field("dueDate", FieldSpec::date())
        .populate("cohort")
}

fn attendance_entry() -> FieldSpec {
    FieldSpec::object([
        ("date", FieldSpec::date().required()),
        (
            "status",
            FieldSpec::string()
                .lowercase()
                .one_of(["present", "absent", "late", "excused"]),
        ),
    ])
}

fn project_entry() -> FieldSpec {
    FieldSpec::object([
        ("name", FieldSpec::string().required()),
        ("info", FieldSpec::string()),
        ("url", FieldSpec::string()),
        ("repo", FieldSpec::string()),
    ])
}

/// Daily attendance entries
pub fn attendances() -> CollectionSchema {
    CollectionSchema::new("attendances")
        .field("date", FieldSpec::date().required())
        .field(
            "status",
            FieldSpec::string()
                .lowercase()
                .one_of(["present", "absent", "late", "excused"])
                .default_value("present"),
        )
}

/// Individual projects
pub fn projects() -> CollectionSchema {
    CollectionSchema::new("projects")
        .field("name", FieldSpec::string().required())
        .field("info", FieldSpec::string())
        .field("url", FieldSpec::string())
        .field("repo", FieldSpec::string())
}

/// Team projects
pub fn group_projects() -> CollectionSchema {
    CollectionSchema::new("group-projects")
        .field("name", FieldSpec::string().required())
        .field("info", FieldSpec::string())
        .field("url", FieldSpec::string())
        .field("repo", FieldSpec::string())
        .field("cohort", FieldSpec::reference("cohorts"))
        .field("team", FieldSpec::array(FieldSpec::reference("users")))
        .populate("team")
}

/// Students, instructors and admins
pub fn users() -> CollectionSchema {
    CollectionSchema::new("users")
        .field("name", FieldSpec::string())
        .field(
            "email",
            FieldSpec::string()
                .lowercase()
                .unique_message("The specified email address is already in use."),
        )
        .field(
            "role",
            FieldSpec::string()
                .one_of(["student", "instructor", "admin"])
                .default_value("student"),
        )
        .field("cohort", FieldSpec::reference("cohorts"))
        .field("squad", FieldSpec::reference("squads"))
        .field("attendance", FieldSpec::array(attendance_entry()))
        .field("projects", FieldSpec::array(project_entry()))
        .field("password", FieldSpec::string().hidden())
        .field("provider", FieldSpec::string())
        .field("salt", FieldSpec::string().hidden())
        .field("facebook", FieldSpec::any())
        .field("twitter", FieldSpec::any())
        .field("google", FieldSpec::any())
        .field("github", FieldSpec::any())
        .populate("cohort")
        .populate("squad")
        .with_credentials()
}

/// Every built-in collection
pub fn builtin_registry() -> SchemaRegistry {
    SchemaRegistry::new()
        .with(resources())
        .with(resource_orgs())
        .with(cohorts())
        .with(squads())
        .with(homeworks())
        .with(attendances())
        .with(projects())
        .with(group_projects())
        .with(users())
}
