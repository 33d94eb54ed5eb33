//! Role taxonomy resolved from a community's role names.
//!
//! Communities follow a naming convention for the roles the bot reasons about: stack
//! roles start with `stack-`, cohort roles with `cohort-`, part-time variants end in
//! `-pt`, and a fixed set of key roles (`student`, `alumni`, `employee`, ...) must exist
//! by name. Resolution matches names case-insensitively after trimming and fails if any
//! key role is missing, since commands relying on it would otherwise act on the wrong
//! roles.

use crate::server::{
    error::taxonomy::TaxonomyError,
    model::platform::{Community, RoleSet},
};

pub const STACK_PREFIX: &str = "stack-";
pub const INTERNAL_STACK_PREFIX: &str = "internal-stack-";
pub const INTERNAL_COHORT_PREFIX: &str = "internal-cohort-";
pub const COHORT_PREFIX: &str = "cohort-";
pub const PART_TIME_SUFFIX: &str = "-pt";
pub const FULL_TIME_SUFFIX: &str = "-ft";

const INTERNAL_STACK_ALL: &str = "internal-stack-all";
const INTERNAL_STACK_ALL_INTERNATIONAL: &str = "internal-stack-all-international";
const STACK_PREBOOTCAMP: &str = "stack-prebootcamp";
const STACK_PROGRAMMING_BASICS_FT: &str = "stack-programming-basics-ft";
const STACK_PROGRAMMING_BASICS_PT: &str = "stack-programming-basics-pt";
const EMPLOYEE: &str = "employee";
const INSTRUCTOR: &str = "instructor";
const TEACHER_ASSISTANT: &str = "teacher-assistant";
const TA_PROG_FT: &str = "ta-prog-ft";
const TA_PROG_PT: &str = "ta-prog-pt";
const STUDENT: &str = "student";
const ALUMNI: &str = "alumni";

/// Key roles that must exist by name in every community the bot manages.
pub const KEY_ROLE_NAMES: [&str; 12] = [
    INTERNAL_STACK_ALL,
    INTERNAL_STACK_ALL_INTERNATIONAL,
    STACK_PREBOOTCAMP,
    STACK_PROGRAMMING_BASICS_FT,
    STACK_PROGRAMMING_BASICS_PT,
    EMPLOYEE,
    INSTRUCTOR,
    TEACHER_ASSISTANT,
    TA_PROG_FT,
    TA_PROG_PT,
    STUDENT,
    ALUMNI,
];

/// Ids of the named key roles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyRoles {
    pub internal_stack_all: u64,
    pub internal_stack_all_international: u64,
    /// Baseline stack role for both full and part time enrollments.
    pub stack_prebootcamp: u64,
    pub stack_programming_basics_ft: u64,
    pub stack_programming_basics_pt: u64,
    pub employee: u64,
    pub instructor: u64,
    pub teacher_assistant: u64,
    pub ta_prog_ft: u64,
    pub ta_prog_pt: u64,
    pub student: u64,
    pub alumni: u64,
}

impl KeyRoles {
    pub fn ids(&self) -> [u64; 12] {
        [
            self.internal_stack_all,
            self.internal_stack_all_international,
            self.stack_prebootcamp,
            self.stack_programming_basics_ft,
            self.stack_programming_basics_pt,
            self.employee,
            self.instructor,
            self.teacher_assistant,
            self.ta_prog_ft,
            self.ta_prog_pt,
            self.student,
            self.alumni,
        ]
    }
}

/// Lowercases a typed name and joins its words with hyphens.
pub fn hyphenate(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .to_lowercase()
}

/// Name of a cohort role or channel typed with or without its `cohort-` prefix.
///
/// Returns `None` when nothing is left besides the prefix.
pub fn cohort_name(raw: &str) -> Option<String> {
    let hyphenated = hyphenate(raw);
    let bare = hyphenated.strip_prefix(COHORT_PREFIX).unwrap_or(&hyphenated);

    (!bare.is_empty()).then(|| format!("{}{}", COHORT_PREFIX, bare))
}

/// Classification of a community's roles into the classes the policy reasons about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleTaxonomy {
    pub key: KeyRoles,
    /// Student stack roles, `stack-*`.
    pub stacks: RoleSet,
    /// Part-time student stack roles, `stack-*-pt`.
    pub stacks_part_time: RoleSet,
    /// Cohort roles, `cohort-*`.
    pub cohorts: RoleSet,
    /// Staff stack roles, `internal-stack-*`.
    pub internal_stacks: RoleSet,
    /// Staff international cohort roles, `internal-cohort-*`.
    pub internal_cohorts: RoleSet,
    /// Roles granting staff access: move-members permission and cohorts.
    ///
    /// The `employee` key role itself is not part of this class, see
    /// [`RoleTaxonomy::is_employee_access`].
    pub employee_related: RoleSet,
    /// Roles removed on graduation: student, cohorts, and stacks.
    pub student_related: RoleSet,
    /// Roles granting administrator permission.
    pub admins: RoleSet,
}

fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}

fn roles_where(community: &Community, predicate: impl Fn(&str) -> bool) -> RoleSet {
    community
        .roles
        .iter()
        .filter(|role| predicate(&normalize(&role.name)))
        .map(|role| role.id)
        .collect()
}

impl RoleTaxonomy {
    /// Resolves the taxonomy for a community.
    ///
    /// # Arguments
    /// - `community` - Community snapshot with its declared roles
    ///
    /// # Returns
    /// - `Ok(RoleTaxonomy)` - Every key role was found
    /// - `Err(TaxonomyError::MissingKeyRoles)` - One or more key roles are missing, listed
    ///   in declaration order
    pub fn resolve(community: &Community) -> Result<Self, TaxonomyError> {
        let mut missing = Vec::new();

        let mut find = |name: &str| -> u64 {
            match community
                .roles
                .iter()
                .find(|role| normalize(&role.name) == name)
            {
                Some(role) => role.id,
                None => {
                    missing.push(name.to_string());
                    0
                }
            }
        };

        let key = KeyRoles {
            internal_stack_all: find(INTERNAL_STACK_ALL),
            internal_stack_all_international: find(INTERNAL_STACK_ALL_INTERNATIONAL),
            stack_prebootcamp: find(STACK_PREBOOTCAMP),
            stack_programming_basics_ft: find(STACK_PROGRAMMING_BASICS_FT),
            stack_programming_basics_pt: find(STACK_PROGRAMMING_BASICS_PT),
            employee: find(EMPLOYEE),
            instructor: find(INSTRUCTOR),
            teacher_assistant: find(TEACHER_ASSISTANT),
            ta_prog_ft: find(TA_PROG_FT),
            ta_prog_pt: find(TA_PROG_PT),
            student: find(STUDENT),
            alumni: find(ALUMNI),
        };

        if !missing.is_empty() {
            return Err(TaxonomyError::MissingKeyRoles(missing));
        }

        let stacks = roles_where(community, |name| name.starts_with(STACK_PREFIX));
        let stacks_part_time = roles_where(community, |name| {
            name.starts_with(STACK_PREFIX) && name.ends_with(PART_TIME_SUFFIX)
        });
        let cohorts = roles_where(community, |name| name.starts_with(COHORT_PREFIX));
        let internal_stacks = roles_where(community, |name| name.starts_with(INTERNAL_STACK_PREFIX));
        let internal_cohorts =
            roles_where(community, |name| name.starts_with(INTERNAL_COHORT_PREFIX));

        let employee_related = community
            .roles
            .iter()
            .filter(|role| role.move_members)
            .map(|role| role.id)
            .chain(cohorts.iter().copied())
            .collect();

        let student_related = std::iter::once(key.student)
            .chain(cohorts.iter().copied())
            .chain(stacks.iter().copied())
            .collect();

        let admins = community
            .roles
            .iter()
            .filter(|role| role.administrator)
            .map(|role| role.id)
            .collect();

        Ok(Self {
            key,
            stacks,
            stacks_part_time,
            cohorts,
            internal_stacks,
            internal_cohorts,
            employee_related,
            student_related,
            admins,
        })
    }

    pub fn is_stack_role(&self, role_id: u64) -> bool {
        self.stacks.contains(&role_id)
    }

    pub fn is_cohort_role(&self, role_id: u64) -> bool {
        self.cohorts.contains(&role_id)
    }

    pub fn is_admin_role(&self, role_id: u64) -> bool {
        self.admins.contains(&role_id)
    }

    pub fn is_student(&self, roles: &RoleSet) -> bool {
        roles.contains(&self.key.student)
    }

    pub fn is_employee(&self, roles: &RoleSet) -> bool {
        roles.contains(&self.key.employee)
    }

    /// Named key role, which the taxonomy can't resolve without.
    pub fn is_key_role(&self, role_id: u64) -> bool {
        self.key.ids().contains(&role_id)
    }

    /// Role granting staff access, including the `employee` key role.
    pub fn is_employee_access(&self, role_id: u64) -> bool {
        role_id == self.key.employee || self.employee_related.contains(&role_id)
    }

    /// Staff stack role a domestic program category is scoped to.
    pub fn is_internal_stack_role(&self, role_id: u64) -> bool {
        self.internal_stacks.contains(&role_id)
    }

    /// Staff cohort role an international program category is scoped to.
    pub fn is_internal_cohort_role(&self, role_id: u64) -> bool {
        self.internal_cohorts.contains(&role_id)
    }

    /// Pre-enrollment baseline roles for a student.
    ///
    /// Full and part time programs currently share the same prebootcamp stack role.
    pub fn initial_student_roles(&self) -> RoleSet {
        RoleSet::from([self.key.student, self.key.stack_prebootcamp])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::policy::test_support::{community_with_key_roles, role_id};

    #[test]
    fn resolves_key_roles_case_insensitively() {
        let community = community_with_key_roles();

        let taxonomy = RoleTaxonomy::resolve(&community).unwrap();

        assert_eq!(taxonomy.key.student, role_id(&community, "student"));
        assert_eq!(taxonomy.key.alumni, role_id(&community, "alumni"));
    }

    #[test]
    fn reports_every_missing_key_role() {
        let mut community = community_with_key_roles();
        community
            .roles
            .retain(|role| !matches!(role.name.trim().to_lowercase().as_str(), "alumni" | "student"));

        let err = RoleTaxonomy::resolve(&community).unwrap_err();

        assert_eq!(
            err.to_string(),
            "Key roles not found by case-insensitive name match, make sure they haven't been renamed: student, alumni."
        );
    }

    #[test]
    fn classifies_stack_cohort_and_related_roles() {
        let community = community_with_key_roles();
        let taxonomy = RoleTaxonomy::resolve(&community).unwrap();

        let backend = role_id(&community, "stack-backend");
        let backend_pt = role_id(&community, "stack-backend-pt");
        let cohort = role_id(&community, "cohort-42");
        let staff = role_id(&community, "staff");
        let admin = role_id(&community, "admin");

        assert!(taxonomy.is_stack_role(backend));
        assert!(taxonomy.stacks_part_time.contains(&backend_pt));
        assert!(taxonomy.is_cohort_role(cohort));
        assert!(taxonomy.student_related.contains(&cohort));
        assert!(taxonomy.student_related.contains(&backend));
        assert!(taxonomy.employee_related.contains(&staff));
        assert!(taxonomy.employee_related.contains(&cohort));
        assert!(taxonomy.is_admin_role(admin));
        assert!(!taxonomy.is_stack_role(taxonomy.key.internal_stack_all));
    }

    #[test]
    fn employee_key_role_is_access_but_not_employee_related() {
        let community = community_with_key_roles();
        let taxonomy = RoleTaxonomy::resolve(&community).unwrap();

        let staff = role_id(&community, "staff");
        let other = role_id(&community, "announcements");

        assert!(!taxonomy.employee_related.contains(&taxonomy.key.employee));
        assert!(taxonomy.is_employee_access(taxonomy.key.employee));
        assert!(taxonomy.is_employee_access(staff));
        assert!(!taxonomy.is_employee_access(other));
    }

    #[test]
    fn classifies_internal_stack_and_cohort_roles() {
        let community = community_with_key_roles();
        let taxonomy = RoleTaxonomy::resolve(&community).unwrap();

        let internal_cohort = role_id(&community, "internal-cohort-international");

        assert!(taxonomy.is_internal_stack_role(taxonomy.key.internal_stack_all));
        assert!(taxonomy.is_internal_cohort_role(internal_cohort));
        assert!(!taxonomy.is_internal_stack_role(internal_cohort));
        assert!(!taxonomy.is_internal_cohort_role(role_id(&community, "cohort-42")));
    }

    #[test]
    fn cohort_names_are_prefixed_once() {
        assert_eq!(cohort_name("Neil M").as_deref(), Some("cohort-neil-m"));
        assert_eq!(cohort_name(" cohort-neil-m ").as_deref(), Some("cohort-neil-m"));
        assert_eq!(cohort_name("Cohort-"), None);
        assert_eq!(cohort_name("  "), None);
    }

    #[test]
    fn key_roles_are_recognized() {
        let community = community_with_key_roles();
        let taxonomy = RoleTaxonomy::resolve(&community).unwrap();

        assert!(taxonomy.is_key_role(taxonomy.key.instructor));
        assert!(taxonomy.is_key_role(taxonomy.key.alumni));
        assert!(!taxonomy.is_key_role(role_id(&community, "cohort-42")));
    }
}
