//! Repository factory trait
//!
//! Repositories are created from a database client through a factory so the
//! backend can build every repository from one pool without knowing the
//! concrete SQL implementation.

/// A trait for database repository factories
///
/// Generic over the repository type and the configuration type (usually a `DbClient`).
pub trait RepositoryFactory<R, C> {
    /// Create a new repository instance
    fn create_repository(&self, config: C) -> R;
}
