use std::collections::BTreeMap;
use std::fmt;

use serde_json::Value;

use crate::domain::entities::entity::{
    coerce_dates, entities_from_json, DataShapeError, Entity, FieldValue,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityKind {
    Domain,
    NumberSystem,
    Department,
    Employee,
    JobDepartment,
    ProductSpec,
    Member,
    Task,
    ActivityLog,
}

impl EntityKind {
    pub const ALL: [EntityKind; 9] = [
        EntityKind::Domain,
        EntityKind::NumberSystem,
        EntityKind::Department,
        EntityKind::Employee,
        EntityKind::JobDepartment,
        EntityKind::ProductSpec,
        EntityKind::Member,
        EntityKind::Task,
        EntityKind::ActivityLog,
    ];

    pub fn slug(self) -> &'static str {
        self.schema().slug
    }

    pub fn from_slug(slug: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.slug() == slug)
    }

    pub fn schema(self) -> &'static EntitySchema {
        match self {
            EntityKind::Domain => &DOMAIN,
            EntityKind::NumberSystem => &NUMBER_SYSTEM,
            EntityKind::Department => &DEPARTMENT,
            EntityKind::Employee => &EMPLOYEE,
            EntityKind::JobDepartment => &JOB_DEPARTMENT,
            EntityKind::ProductSpec => &PRODUCT_SPEC,
            EntityKind::Member => &MEMBER,
            EntityKind::Task => &TASK,
            EntityKind::ActivityLog => &ACTIVITY_LOG,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.schema().label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnDef {
    pub header: &'static str,
    pub field: &'static str,
}

const fn col(header: &'static str, field: &'static str) -> ColumnDef {
    ColumnDef { header, field }
}

/// Per-kind configuration shared by the table view, the query engine and
/// the add/edit form.
#[derive(Debug)]
pub struct EntitySchema {
    pub kind: EntityKind,
    pub slug: &'static str,
    pub label: &'static str,
    pub search_fields: &'static [&'static str],
    pub columns: &'static [ColumnDef],
    pub date_fields: &'static [&'static str],
    pub filter_fields: &'static [&'static str],
    pub required_fields: &'static [&'static str],
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl EntitySchema {
    pub fn entity_from_json(&self, value: &Value) -> Entity {
        let mut entity = Entity::from_json(value);
        coerce_dates(&mut entity, self.date_fields);
        entity
    }

    pub fn entities_from_json(&self, value: &Value) -> Result<Vec<Entity>, DataShapeError> {
        entities_from_json(value, self.date_fields)
    }

    /// Date fields arriving as text are parsed; everything else is kept.
    pub fn normalize(&self, fields: BTreeMap<String, FieldValue>) -> BTreeMap<String, FieldValue> {
        let mut entity = Entity::from_fields(fields);
        coerce_dates(&mut entity, self.date_fields);
        entity.into_fields()
    }

    pub fn validate(&self, fields: &BTreeMap<String, FieldValue>) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();
        for field in self.required_fields {
            let blank = fields
                .get(*field)
                .map(|value| value.display_text().trim().is_empty())
                .unwrap_or(true);
            if blank {
                errors.push(FieldError {
                    field: (*field).to_string(),
                    message: "is required".to_string(),
                });
            }
        }

        if let Some(FieldValue::Text(email)) = fields.get("email") {
            if !email.trim().is_empty() && !is_valid_email(email.trim()) {
                errors.push(FieldError {
                    field: "email".to_string(),
                    message: "is not a valid email address".to_string(),
                });
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

fn is_valid_email(value: &str) -> bool {
    let mut parts = value.split('@');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) => {
            !local.is_empty() && !domain.is_empty() && !value.contains(char::is_whitespace)
        }
        _ => false,
    }
}

static DOMAIN: EntitySchema = EntitySchema {
    kind: EntityKind::Domain,
    slug: "domains",
    label: "Domains",
    search_fields: &["id", "name", "code", "status"],
    columns: &[
        col("ID", "id"),
        col("Name", "name"),
        col("Code", "code"),
        col("Status", "status"),
        col("Description", "description"),
        col("Created", "createdAt"),
    ],
    date_fields: &["createdAt"],
    filter_fields: &["status"],
    required_fields: &["name", "code"],
};

static NUMBER_SYSTEM: EntitySchema = EntitySchema {
    kind: EntityKind::NumberSystem,
    slug: "number-systems",
    label: "Number systems",
    search_fields: &["id", "name", "prefix", "status"],
    columns: &[
        col("ID", "id"),
        col("Name", "name"),
        col("Prefix", "prefix"),
        col("Current number", "currentNumber"),
        col("Domain", "domainId"),
        col("Status", "status"),
    ],
    date_fields: &[],
    filter_fields: &["status", "domainId"],
    required_fields: &["name", "prefix"],
};

static DEPARTMENT: EntitySchema = EntitySchema {
    kind: EntityKind::Department,
    slug: "departments",
    label: "Departments",
    search_fields: &["id", "name", "code", "managerName", "status"],
    columns: &[
        col("ID", "id"),
        col("Name", "name"),
        col("Code", "code"),
        col("Manager", "managerName"),
        col("Status", "status"),
        col("Created", "createdAt"),
    ],
    date_fields: &["createdAt"],
    filter_fields: &["status"],
    required_fields: &["name"],
};

static EMPLOYEE: EntitySchema = EntitySchema {
    kind: EntityKind::Employee,
    slug: "employees",
    label: "Employees",
    search_fields: &["id", "name", "email", "phone", "jobTitle", "status"],
    columns: &[
        col("ID", "id"),
        col("Name", "name"),
        col("Email", "email"),
        col("Phone", "phone"),
        col("Job title", "jobTitle"),
        col("Departments", "departmentIds"),
        col("Status", "status"),
        col("Hired", "hireDate"),
    ],
    date_fields: &["hireDate"],
    filter_fields: &["status", "departmentIds"],
    required_fields: &["name", "email"],
};

static JOB_DEPARTMENT: EntitySchema = EntitySchema {
    kind: EntityKind::JobDepartment,
    slug: "job-departments",
    label: "Job departments",
    search_fields: &["id", "name", "departmentId", "status"],
    columns: &[
        col("ID", "id"),
        col("Name", "name"),
        col("Department", "departmentId"),
        col("Headcount", "headcount"),
        col("Status", "status"),
    ],
    date_fields: &[],
    filter_fields: &["status", "departmentId"],
    required_fields: &["name", "departmentId"],
};

static PRODUCT_SPEC: EntitySchema = EntitySchema {
    kind: EntityKind::ProductSpec,
    slug: "product-specs",
    label: "Product specifications",
    search_fields: &["id", "name", "sku", "status"],
    columns: &[
        col("ID", "id"),
        col("Name", "name"),
        col("SKU", "sku"),
        col("Unit", "unit"),
        col("Price", "price"),
        col("Status", "status"),
        col("Updated", "updatedAt"),
    ],
    date_fields: &["updatedAt"],
    filter_fields: &["status", "unit"],
    required_fields: &["name", "sku"],
};

static MEMBER: EntitySchema = EntitySchema {
    kind: EntityKind::Member,
    slug: "members",
    label: "Members",
    search_fields: &["id", "name", "email", "status"],
    columns: &[
        col("ID", "id"),
        col("Name", "name"),
        col("Email", "email"),
        col("Roles", "roles"),
        col("Status", "status"),
        col("Joined", "joinedAt"),
    ],
    date_fields: &["joinedAt"],
    filter_fields: &["status", "roles"],
    required_fields: &["name", "email"],
};

static TASK: EntitySchema = EntitySchema {
    kind: EntityKind::Task,
    slug: "tasks",
    label: "Tasks",
    search_fields: &["id", "title", "assignee", "priority", "status"],
    columns: &[
        col("ID", "id"),
        col("Title", "title"),
        col("Assignee", "assignee"),
        col("Priority", "priority"),
        col("Tags", "tagIds"),
        col("Status", "status"),
        col("Due", "dueDate"),
    ],
    date_fields: &["dueDate"],
    filter_fields: &["status", "priority", "tagIds"],
    required_fields: &["title"],
};

static ACTIVITY_LOG: EntitySchema = EntitySchema {
    kind: EntityKind::ActivityLog,
    slug: "activity-logs",
    label: "Activity logs",
    search_fields: &["id", "action", "actor", "target"],
    columns: &[
        col("ID", "id"),
        col("Action", "action"),
        col("Actor", "actor"),
        col("Target", "target"),
        col("Time", "createdAt"),
    ],
    date_fields: &["createdAt"],
    filter_fields: &["action", "actor"],
    required_fields: &["action", "actor"],
};
