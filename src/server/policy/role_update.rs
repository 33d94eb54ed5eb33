//! Role update methods and the role set transforms they apply.
//!
//! Every transform is a pure function of the record's current roles, the operator's
//! selection and the community taxonomy. Transforms are idempotent so an operator can
//! safely rerun a bulk update that partially failed.

use std::{fmt, str::FromStr};

use crate::server::{
    error::fault::Fault,
    model::platform::RoleSet,
    policy::taxonomy::{RoleTaxonomy, COHORT_PREFIX, STACK_PREFIX},
};

/// Method applied to a record's roles by a bulk role update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoleUpdateMethod {
    Add,
    Remove,
    ToAlumni,
    Postpone,
    ChangeCohort,
}

impl RoleUpdateMethod {
    pub const ALL: [RoleUpdateMethod; 5] = [
        RoleUpdateMethod::Add,
        RoleUpdateMethod::ChangeCohort,
        RoleUpdateMethod::Postpone,
        RoleUpdateMethod::Remove,
        RoleUpdateMethod::ToAlumni,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Remove => "remove",
            Self::ToAlumni => "to-alumni",
            Self::Postpone => "postpone",
            Self::ChangeCohort => "change-cohort",
        }
    }

    /// Comma separated list of every accepted method name.
    pub fn valid_names() -> String {
        Self::ALL
            .iter()
            .map(|method| method.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for RoleUpdateMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RoleUpdateMethod {
    type Err = Fault;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|method| method.as_str() == value)
            .ok_or_else(|| Fault::InvalidRoleUpdateMethod(value.to_string()))
    }
}

/// Checks that a selection is usable with the given method before any record is touched.
///
/// # Arguments
/// - `method` - Update method about to be applied
/// - `selection` - Roles chosen by the operator
/// - `taxonomy` - Taxonomy of the community the roles belong to
///
/// # Returns
/// - `Ok(())` - The selection is valid for the method
/// - `Err(Fault::InvalidRoleSelection)` - `change-cohort` is missing a cohort or a stack role
pub fn validate_selection(
    method: RoleUpdateMethod,
    selection: &RoleSet,
    taxonomy: &RoleTaxonomy,
) -> Result<(), Fault> {
    if method != RoleUpdateMethod::ChangeCohort {
        return Ok(());
    }

    let has_cohort = selection.iter().any(|id| taxonomy.is_cohort_role(*id));
    let has_stack = selection.iter().any(|id| taxonomy.is_stack_role(*id));

    if has_cohort && has_stack {
        Ok(())
    } else {
        Err(Fault::InvalidRoleSelection(format!(
            "A role that starts with {} and one that starts with {} is required.",
            COHORT_PREFIX, STACK_PREFIX
        )))
    }
}

/// Removes administrator roles from a selection made by a caller without elevated access.
pub fn filter_admin_roles(selection: &RoleSet, taxonomy: &RoleTaxonomy, elevated: bool) -> RoleSet {
    if elevated {
        return selection.clone();
    }

    selection
        .iter()
        .filter(|id| !taxonomy.is_admin_role(**id))
        .copied()
        .collect()
}

/// Computes a record's roles after applying an update method.
///
/// # Arguments
/// - `method` - Update method to apply
/// - `roles` - The record's current roles
/// - `selection` - Roles chosen by the operator, ignored by `to-alumni` and `postpone`
/// - `taxonomy` - Taxonomy of the community the roles belong to
///
/// # Returns
/// - `Ok(RoleSet)` - The updated role set
/// - `Err(Fault::InvalidRoleSelection)` - `postpone` was applied to an employee record
pub fn apply(
    method: RoleUpdateMethod,
    roles: &RoleSet,
    selection: &RoleSet,
    taxonomy: &RoleTaxonomy,
) -> Result<RoleSet, Fault> {
    let updated = match method {
        RoleUpdateMethod::Add => roles.union(selection).copied().collect(),
        RoleUpdateMethod::Remove => roles.difference(selection).copied().collect(),
        RoleUpdateMethod::ToAlumni => roles
            .iter()
            .copied()
            .chain(std::iter::once(taxonomy.key.alumni))
            .filter(|id| !(taxonomy.student_related.contains(id) || taxonomy.is_employee_access(*id)))
            .collect(),
        RoleUpdateMethod::Postpone => {
            if taxonomy.is_employee(roles) {
                return Err(Fault::InvalidRoleSelection(
                    "postpone only applies to student records, not employees.".to_string(),
                ));
            }

            roles
                .iter()
                .filter(|id| !(taxonomy.is_cohort_role(**id) || taxonomy.is_stack_role(**id)))
                .copied()
                .collect()
        }
        RoleUpdateMethod::ChangeCohort => change_cohort(roles, selection, taxonomy),
    };

    Ok(updated)
}

fn change_cohort(roles: &RoleSet, selection: &RoleSet, taxonomy: &RoleTaxonomy) -> RoleSet {
    let cohort_selected = selection.iter().any(|id| taxonomy.is_cohort_role(*id));
    let stack_selected = selection.iter().any(|id| taxonomy.is_stack_role(*id));

    // Current cohort and stack roles are only dropped when a replacement is selected.
    let mut updated: RoleSet = roles
        .iter()
        .filter(|id| {
            !((cohort_selected && taxonomy.is_cohort_role(**id))
                || (stack_selected && taxonomy.is_stack_role(**id)))
        })
        .copied()
        .collect();

    updated.extend(selection.iter().copied());

    if !taxonomy.is_employee(roles) {
        updated.insert(taxonomy.key.student);
    }

    updated
}

/// Baseline roles a member is reset to right before being kicked.
///
/// Employees lose every employee and student class role. Students go back to the
/// pre-enrollment roles. Any other record keeps its roles.
pub fn kick_reset(roles: &RoleSet, taxonomy: &RoleTaxonomy) -> RoleSet {
    if taxonomy.is_employee(roles) {
        return roles
            .iter()
            .filter(|id| !(taxonomy.is_employee_access(**id) || taxonomy.student_related.contains(*id)))
            .copied()
            .collect();
    }

    if !taxonomy.is_student(roles) {
        return roles.clone();
    }

    roles
        .iter()
        .filter(|id| !taxonomy.student_related.contains(*id))
        .copied()
        .chain(taxonomy.initial_student_roles())
        .collect()
}
