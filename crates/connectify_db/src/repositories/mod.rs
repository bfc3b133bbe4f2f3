//! Repository modules for database access
//!
//! Each entity has a trait (`connect`, `commission`), an SQL implementation
//! (`*_sql`) and a factory (`*_factory`).

pub mod commission;
pub mod commission_factory;
pub mod commission_sql;
pub mod connect;
pub mod connect_factory;
pub mod connect_sql;
pub(crate) mod sql;

pub use commission::{Commission, CommissionRepository};
pub use commission_factory::CommissionRepositoryFactory;
pub use commission_sql::SqlCommissionRepository;
pub use connect::{Connect, ConnectQuery, ConnectRepository, ProductType};
pub use connect_factory::ConnectRepositoryFactory;
pub use connect_sql::SqlConnectRepository;
