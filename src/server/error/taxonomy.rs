use thiserror::Error;

/// Failure to resolve a community's role taxonomy.
///
/// Raised when key roles can't be found by name, which usually means someone renamed
/// them. Commands depending on the taxonomy would otherwise act on the wrong roles.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TaxonomyError {
    #[error(
        "Key roles not found by case-insensitive name match, make sure they haven't been renamed: {}.",
        .0.join(", ")
    )]
    MissingKeyRoles(Vec<String>),
}
